use crate::error::{CatalogError, Result};
use crate::storage::Storage;
use std::collections::HashSet;
use uuid::Uuid;

pub mod assistance;
pub mod attraction;
pub mod locality;

pub use assistance::AssistanceService;
pub use attraction::AttractionService;
pub use locality::LocalityService;

/// Validates a required text field, rejecting missing and blank values.
pub(crate) fn required_text(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CatalogError::InvalidArgument(format!("{field} is required"))),
    }
}

/// Resolves an assistance association list, failing fast: every id must
/// refer to an existing Assistance or the whole call is rejected.
/// Associations are a set, so repeated ids collapse to one entry.
pub(crate) async fn resolve_assistance_ids(
    storage: &dyn Storage,
    ids: &[Uuid],
) -> Result<Vec<Uuid>> {
    let found = storage.get_assistances_by_ids(ids).await?;
    let found_ids: HashSet<Uuid> = found.iter().filter_map(|a| a.id).collect();

    let mut seen = HashSet::new();
    let mut resolved = Vec::new();
    for id in ids {
        if !found_ids.contains(id) {
            return Err(CatalogError::NotFound(format!(
                "Assistance not found with ID: {id}"
            )));
        }
        if seen.insert(*id) {
            resolved.push(*id);
        }
    }
    Ok(resolved)
}
