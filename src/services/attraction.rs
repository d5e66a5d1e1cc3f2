use super::{required_text, resolve_assistance_ids};
use crate::domain::{parse_enum, Attraction, AttractionType, Page, PageRequest};
use crate::dto::AttractionDto;
use crate::error::{CatalogError, Result};
use crate::storage::Storage;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// CRUD operations for attractions. The only slice with cross-entity
/// validation: the locality reference must resolve at create and, when
/// changed, at update.
pub struct AttractionService {
    storage: Arc<dyn Storage>,
}

impl AttractionService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn add(&self, dto: AttractionDto) -> Result<AttractionDto> {
        let name = required_text(dto.name, "Attraction name")?;
        info!("Adding attraction: {}", name);

        let type_raw = required_text(dto.attraction_type, "Attraction type")?;
        let attraction_type: AttractionType = parse_enum("attraction", &type_raw)?;

        let locality_id = dto.locality_id.ok_or_else(|| {
            CatalogError::InvalidArgument("Locality ID is required".to_string())
        })?;
        self.require_locality(locality_id).await?;

        let assistance_ids = match dto.assistance_ids {
            Some(ids) => resolve_assistance_ids(self.storage.as_ref(), &ids).await?,
            None => Vec::new(),
        };

        let mut attraction = Attraction {
            id: None,
            name,
            // Creation timestamp is server-assigned, never taken from the caller
            creation_date: Utc::now(),
            short_description: dto.short_description,
            attraction_type,
            locality_id,
            assistance_ids,
        };
        self.storage.create_attraction(&mut attraction).await?;

        info!("Attraction added with ID: {:?}", attraction.id);
        Ok(to_dto(attraction))
    }

    /// Lists attractions, optionally filtered by type. An unparseable
    /// filter value fails the call rather than returning an empty page.
    pub async fn list(
        &self,
        type_filter: Option<String>,
        request: PageRequest,
    ) -> Result<Page<AttractionDto>> {
        info!("Listing attractions with type filter: {:?}", type_filter);

        let type_filter = match type_filter {
            Some(raw) => Some(parse_enum::<AttractionType>("attraction", &raw)?),
            None => None,
        };

        let page = self.storage.list_attractions(type_filter, &request).await?;
        Ok(page.map(to_dto))
    }

    /// No existence check on the locality id; an unknown id yields an
    /// empty page.
    pub async fn list_by_locality(
        &self,
        locality_id: Uuid,
        request: PageRequest,
    ) -> Result<Page<AttractionDto>> {
        info!("Listing attractions for locality with ID: {}", locality_id);
        let page = self
            .storage
            .list_attractions_by_locality(locality_id, &request)
            .await?;
        Ok(page.map(to_dto))
    }

    pub async fn update(&self, id: Uuid, dto: AttractionDto) -> Result<AttractionDto> {
        info!("Updating attraction with ID: {}", id);
        let mut existing = self.require(id).await?;

        existing.name = required_text(dto.name, "Attraction name")?;
        existing.short_description = dto.short_description;

        if let Some(type_raw) = dto.attraction_type {
            existing.attraction_type = parse_enum("attraction", &type_raw)?;
        }

        if let Some(locality_id) = dto.locality_id {
            self.require_locality(locality_id).await?;
            existing.locality_id = locality_id;
        }

        if let Some(ids) = dto.assistance_ids {
            existing.assistance_ids = resolve_assistance_ids(self.storage.as_ref(), &ids).await?;
        }

        self.storage.update_attraction(&existing).await?;
        Ok(to_dto(existing))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        info!("Deleting attraction with ID: {}", id);
        self.require(id).await?;
        self.storage.delete_attraction(id).await
    }

    async fn require(&self, id: Uuid) -> Result<Attraction> {
        self.storage
            .get_attraction_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Attraction not found with ID: {id}")))
    }

    async fn require_locality(&self, id: Uuid) -> Result<()> {
        self.storage
            .get_locality_by_id(id)
            .await?
            .map(|_| ())
            .ok_or_else(|| CatalogError::NotFound(format!("Locality not found with ID: {id}")))
    }
}

fn to_dto(attraction: Attraction) -> AttractionDto {
    AttractionDto {
        id: attraction.id,
        name: Some(attraction.name),
        creation_date: Some(attraction.creation_date),
        short_description: attraction.short_description,
        attraction_type: Some(attraction.attraction_type.to_string()),
        locality_id: Some(attraction.locality_id),
        assistance_ids: Some(attraction.assistance_ids),
    }
}
