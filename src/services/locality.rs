use super::{required_text, resolve_assistance_ids};
use crate::domain::{Locality, Page, PageRequest};
use crate::dto::LocalityDto;
use crate::error::{CatalogError, Result};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// CRUD operations for localities.
pub struct LocalityService {
    storage: Arc<dyn Storage>,
}

impl LocalityService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn add(&self, dto: LocalityDto) -> Result<LocalityDto> {
        let name = required_text(dto.name, "Locality name")?;
        let region = required_text(dto.region, "Locality region")?;
        info!("Adding locality: {}", name);

        let assistance_ids = match dto.assistance_ids {
            Some(ids) => resolve_assistance_ids(self.storage.as_ref(), &ids).await?,
            None => Vec::new(),
        };

        let mut locality = Locality {
            id: None,
            name,
            region,
            latitude: dto.latitude,
            longitude: dto.longitude,
            short_description: dto.short_description,
            assistance_ids,
        };
        self.storage.create_locality(&mut locality).await?;

        self.to_dto(locality).await
    }

    pub async fn get(&self, id: Uuid) -> Result<LocalityDto> {
        info!("Fetching locality by ID: {}", id);
        let locality = self.require(id).await?;
        self.to_dto(locality).await
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<LocalityDto>> {
        info!("Listing localities");
        let page = self.storage.list_localities(&request).await?;

        let mut content = Vec::with_capacity(page.content.len());
        for locality in page.content {
            content.push(self.to_dto(locality).await?);
        }
        Ok(Page {
            content,
            page: page.page,
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
        })
    }

    /// Replaces the short description and, when supplied, the full
    /// assistance association set. Name and region are not touched.
    pub async fn update(&self, id: Uuid, dto: LocalityDto) -> Result<LocalityDto> {
        info!("Updating locality with ID: {}", id);
        let mut existing = self.require(id).await?;

        existing.short_description = dto.short_description;
        if let Some(ids) = dto.assistance_ids {
            existing.assistance_ids = resolve_assistance_ids(self.storage.as_ref(), &ids).await?;
        }

        self.storage.update_locality(&existing).await?;
        self.to_dto(existing).await
    }

    /// Removes the locality; its attractions go with it (documented
    /// cascade policy).
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        info!("Deleting locality with ID: {}", id);
        self.require(id).await?;
        self.storage.delete_locality(id).await
    }

    async fn require(&self, id: Uuid) -> Result<Locality> {
        self.storage
            .get_locality_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Locality not found with ID: {id}")))
    }

    async fn to_dto(&self, locality: Locality) -> Result<LocalityDto> {
        let attraction_ids = match locality.id {
            Some(id) => self.storage.get_attraction_ids_by_locality(id).await?,
            None => Vec::new(),
        };

        Ok(LocalityDto {
            id: locality.id,
            name: Some(locality.name),
            region: Some(locality.region),
            latitude: locality.latitude,
            longitude: locality.longitude,
            short_description: locality.short_description,
            attraction_ids: Some(attraction_ids),
            assistance_ids: Some(locality.assistance_ids),
        })
    }
}
