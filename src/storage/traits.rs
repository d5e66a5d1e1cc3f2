use crate::domain::*;
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage trait for persisting catalog data (localities, assistances and
/// attractions). Gets return `None` for unknown ids; the service layer turns
/// that into a NotFound. Deletes assume the row exists (the service checks
/// first) and carry out the documented cascades.
#[async_trait]
pub trait Storage: Send + Sync {
    // Locality operations
    async fn create_locality(&self, locality: &mut Locality) -> Result<()>;
    async fn get_locality_by_id(&self, id: Uuid) -> Result<Option<Locality>>;
    async fn list_localities(&self, request: &PageRequest) -> Result<Page<Locality>>;
    async fn update_locality(&self, locality: &Locality) -> Result<()>;
    /// Removes the locality and, by cascade, every attraction that
    /// references it.
    async fn delete_locality(&self, id: Uuid) -> Result<()>;

    // Assistance operations
    async fn create_assistance(&self, assistance: &mut Assistance) -> Result<()>;
    async fn get_assistance_by_id(&self, id: Uuid) -> Result<Option<Assistance>>;
    /// Bulk lookup used when resolving association id lists.
    async fn get_assistances_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Assistance>>;
    async fn list_assistances(&self, request: &PageRequest) -> Result<Page<Assistance>>;
    async fn update_assistance(&self, assistance: &Assistance) -> Result<()>;
    /// Removes the assistance and detaches it from every locality and
    /// attraction association set.
    async fn delete_assistance(&self, id: Uuid) -> Result<()>;

    // Attraction operations
    async fn create_attraction(&self, attraction: &mut Attraction) -> Result<()>;
    async fn get_attraction_by_id(&self, id: Uuid) -> Result<Option<Attraction>>;
    async fn list_attractions(
        &self,
        type_filter: Option<AttractionType>,
        request: &PageRequest,
    ) -> Result<Page<Attraction>>;
    async fn list_attractions_by_locality(
        &self,
        locality_id: Uuid,
        request: &PageRequest,
    ) -> Result<Page<Attraction>>;
    async fn update_attraction(&self, attraction: &Attraction) -> Result<()>;
    async fn delete_attraction(&self, id: Uuid) -> Result<()>;

    // Reverse id lookups for DTO back-reference sets
    async fn get_attraction_ids_by_locality(&self, locality_id: Uuid) -> Result<Vec<Uuid>>;
    async fn get_attraction_ids_by_assistance(&self, assistance_id: Uuid) -> Result<Vec<Uuid>>;
}
