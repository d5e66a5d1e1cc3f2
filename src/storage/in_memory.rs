use super::traits::Storage;
use crate::domain::*;
use crate::error::{CatalogError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// In-memory storage implementation for development/testing.
pub struct InMemoryStorage {
    localities: Arc<Mutex<HashMap<Uuid, Locality>>>,
    assistances: Arc<Mutex<HashMap<Uuid, Assistance>>>,
    attractions: Arc<Mutex<HashMap<Uuid, Attraction>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            localities: Arc::new(Mutex::new(HashMap::new())),
            assistances: Arc::new(Mutex::new(HashMap::new())),
            attractions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

fn paginate<T>(mut items: Vec<T>, request: &PageRequest) -> Page<T> {
    let total = items.len();
    let start = request.offset().min(total);
    let end = (start + request.size).min(total);
    let content = items.drain(start..end).collect();
    Page::new(content, request, total)
}

fn sort_localities(items: &mut [Locality], sort: &str) {
    match sort {
        "region" => items.sort_by(|a, b| a.region.cmp(&b.region)),
        // Unknown fields fall back to the default sort
        _ => items.sort_by(|a, b| a.name.cmp(&b.name)),
    }
}

fn sort_assistances(items: &mut [Assistance], sort: &str) {
    match sort {
        "executor" => items.sort_by(|a, b| a.executor.cmp(&b.executor)),
        _ => items.sort_by(|a, b| a.assistance_type.as_str().cmp(b.assistance_type.as_str())),
    }
}

fn sort_attractions(items: &mut [Attraction], sort: &str) {
    match sort {
        "creationDate" => items.sort_by(|a, b| a.creation_date.cmp(&b.creation_date)),
        "type" => items.sort_by(|a, b| a.attraction_type.as_str().cmp(b.attraction_type.as_str())),
        _ => items.sort_by(|a, b| a.name.cmp(&b.name)),
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_locality(&self, locality: &mut Locality) -> Result<()> {
        let id = Uuid::new_v4();
        locality.id = Some(id);

        let mut localities = self.localities.lock().unwrap();
        localities.insert(id, locality.clone());

        debug!("Created locality: {} with id {}", locality.name, id);
        Ok(())
    }

    async fn get_locality_by_id(&self, id: Uuid) -> Result<Option<Locality>> {
        let localities = self.localities.lock().unwrap();
        Ok(localities.get(&id).cloned())
    }

    async fn list_localities(&self, request: &PageRequest) -> Result<Page<Locality>> {
        let localities = self.localities.lock().unwrap();
        let mut items: Vec<Locality> = localities.values().cloned().collect();
        sort_localities(&mut items, &request.sort);
        Ok(paginate(items, request))
    }

    async fn update_locality(&self, locality: &Locality) -> Result<()> {
        let id = locality.id.ok_or_else(|| CatalogError::Database {
            message: "Cannot update locality without ID".to_string(),
        })?;
        let mut localities = self.localities.lock().unwrap();
        localities.insert(id, locality.clone());

        debug!("Updated locality: {} with id {}", locality.name, id);
        Ok(())
    }

    async fn delete_locality(&self, id: Uuid) -> Result<()> {
        let mut localities = self.localities.lock().unwrap();
        localities.remove(&id);
        drop(localities);

        // Cascade: attractions require an existing locality
        let mut attractions = self.attractions.lock().unwrap();
        attractions.retain(|_, a| a.locality_id != id);

        debug!("Deleted locality with id {}", id);
        Ok(())
    }

    async fn create_assistance(&self, assistance: &mut Assistance) -> Result<()> {
        let id = Uuid::new_v4();
        assistance.id = Some(id);

        let mut assistances = self.assistances.lock().unwrap();
        assistances.insert(id, assistance.clone());

        debug!("Created assistance: {} with id {}", assistance.assistance_type, id);
        Ok(())
    }

    async fn get_assistance_by_id(&self, id: Uuid) -> Result<Option<Assistance>> {
        let assistances = self.assistances.lock().unwrap();
        Ok(assistances.get(&id).cloned())
    }

    async fn get_assistances_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Assistance>> {
        let assistances = self.assistances.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| assistances.get(id).cloned())
            .collect())
    }

    async fn list_assistances(&self, request: &PageRequest) -> Result<Page<Assistance>> {
        let assistances = self.assistances.lock().unwrap();
        let mut items: Vec<Assistance> = assistances.values().cloned().collect();
        sort_assistances(&mut items, &request.sort);
        Ok(paginate(items, request))
    }

    async fn update_assistance(&self, assistance: &Assistance) -> Result<()> {
        let id = assistance.id.ok_or_else(|| CatalogError::Database {
            message: "Cannot update assistance without ID".to_string(),
        })?;
        let mut assistances = self.assistances.lock().unwrap();
        assistances.insert(id, assistance.clone());

        debug!("Updated assistance with id {}", id);
        Ok(())
    }

    async fn delete_assistance(&self, id: Uuid) -> Result<()> {
        let mut assistances = self.assistances.lock().unwrap();
        assistances.remove(&id);
        drop(assistances);

        // Detach from association sets on both sides
        let mut localities = self.localities.lock().unwrap();
        for locality in localities.values_mut() {
            locality.assistance_ids.retain(|a| *a != id);
        }
        drop(localities);

        let mut attractions = self.attractions.lock().unwrap();
        for attraction in attractions.values_mut() {
            attraction.assistance_ids.retain(|a| *a != id);
        }

        debug!("Deleted assistance with id {}", id);
        Ok(())
    }

    async fn create_attraction(&self, attraction: &mut Attraction) -> Result<()> {
        let id = Uuid::new_v4();
        attraction.id = Some(id);

        let mut attractions = self.attractions.lock().unwrap();
        attractions.insert(id, attraction.clone());

        debug!("Created attraction: {} with id {}", attraction.name, id);
        Ok(())
    }

    async fn get_attraction_by_id(&self, id: Uuid) -> Result<Option<Attraction>> {
        let attractions = self.attractions.lock().unwrap();
        Ok(attractions.get(&id).cloned())
    }

    async fn list_attractions(
        &self,
        type_filter: Option<AttractionType>,
        request: &PageRequest,
    ) -> Result<Page<Attraction>> {
        let attractions = self.attractions.lock().unwrap();
        let mut items: Vec<Attraction> = attractions
            .values()
            .filter(|a| type_filter.map_or(true, |t| a.attraction_type == t))
            .cloned()
            .collect();
        sort_attractions(&mut items, &request.sort);
        Ok(paginate(items, request))
    }

    async fn list_attractions_by_locality(
        &self,
        locality_id: Uuid,
        request: &PageRequest,
    ) -> Result<Page<Attraction>> {
        let attractions = self.attractions.lock().unwrap();
        let mut items: Vec<Attraction> = attractions
            .values()
            .filter(|a| a.locality_id == locality_id)
            .cloned()
            .collect();
        sort_attractions(&mut items, &request.sort);
        Ok(paginate(items, request))
    }

    async fn update_attraction(&self, attraction: &Attraction) -> Result<()> {
        let id = attraction.id.ok_or_else(|| CatalogError::Database {
            message: "Cannot update attraction without ID".to_string(),
        })?;
        let mut attractions = self.attractions.lock().unwrap();
        attractions.insert(id, attraction.clone());

        debug!("Updated attraction: {} with id {}", attraction.name, id);
        Ok(())
    }

    async fn delete_attraction(&self, id: Uuid) -> Result<()> {
        let mut attractions = self.attractions.lock().unwrap();
        attractions.remove(&id);

        debug!("Deleted attraction with id {}", id);
        Ok(())
    }

    async fn get_attraction_ids_by_locality(&self, locality_id: Uuid) -> Result<Vec<Uuid>> {
        let attractions = self.attractions.lock().unwrap();
        let mut ids: Vec<Uuid> = attractions
            .values()
            .filter(|a| a.locality_id == locality_id)
            .filter_map(|a| a.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn get_attraction_ids_by_assistance(&self, assistance_id: Uuid) -> Result<Vec<Uuid>> {
        let attractions = self.attractions.lock().unwrap();
        let mut ids: Vec<Uuid> = attractions
            .values()
            .filter(|a| a.assistance_ids.contains(&assistance_id))
            .filter_map(|a| a.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
