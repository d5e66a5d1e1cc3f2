use super::required_text;
use crate::domain::{parse_enum, Assistance, AssistanceType, Page, PageRequest};
use crate::dto::AssistanceDto;
use crate::error::{CatalogError, Result};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// CRUD operations for assistance offerings.
pub struct AssistanceService {
    storage: Arc<dyn Storage>,
}

impl AssistanceService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn add(&self, dto: AssistanceDto) -> Result<AssistanceDto> {
        let type_raw = required_text(dto.assistance_type, "Assistance type")?;
        let assistance_type: AssistanceType = parse_enum("assistance", &type_raw)?;
        info!("Adding assistance: {}", assistance_type);

        let mut assistance = Assistance {
            id: None,
            assistance_type,
            short_description: dto.short_description,
            executor: dto.executor,
        };
        self.storage.create_assistance(&mut assistance).await?;

        self.to_dto(assistance).await
    }

    pub async fn get(&self, id: Uuid) -> Result<AssistanceDto> {
        info!("Fetching assistance by ID: {}", id);
        let assistance = self.require(id).await?;
        self.to_dto(assistance).await
    }

    pub async fn list(&self, request: PageRequest) -> Result<Page<AssistanceDto>> {
        info!("Listing assistances");
        let page = self.storage.list_assistances(&request).await?;

        let mut content = Vec::with_capacity(page.content.len());
        for assistance in page.content {
            content.push(self.to_dto(assistance).await?);
        }
        Ok(Page {
            content,
            page: page.page,
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
        })
    }

    /// Re-validates the type on every update; short description and
    /// executor are replaced unconditionally.
    pub async fn update(&self, id: Uuid, dto: AssistanceDto) -> Result<AssistanceDto> {
        info!("Updating assistance with ID: {}", id);
        let mut existing = self.require(id).await?;

        let type_raw = required_text(dto.assistance_type, "Assistance type")?;
        existing.assistance_type = parse_enum("assistance", &type_raw)?;
        existing.short_description = dto.short_description;
        existing.executor = dto.executor;

        self.storage.update_assistance(&existing).await?;
        self.to_dto(existing).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        info!("Deleting assistance with ID: {}", id);
        self.require(id).await?;
        self.storage.delete_assistance(id).await
    }

    async fn require(&self, id: Uuid) -> Result<Assistance> {
        self.storage
            .get_assistance_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Assistance not found with ID: {id}")))
    }

    async fn to_dto(&self, assistance: Assistance) -> Result<AssistanceDto> {
        let attraction_ids = match assistance.id {
            Some(id) => self.storage.get_attraction_ids_by_assistance(id).await?,
            None => Vec::new(),
        };

        Ok(AssistanceDto {
            id: assistance.id,
            assistance_type: Some(assistance.assistance_type.to_string()),
            short_description: assistance.short_description,
            executor: assistance.executor,
            attraction_ids: Some(attraction_ids),
        })
    }
}
