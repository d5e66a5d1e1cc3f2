use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire representation of a Locality. The same shape is accepted on create
/// and update; `id` and `attraction_ids` are server-populated and ignored
/// on input.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocalityDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub attraction_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub assistance_ids: Option<Vec<Uuid>>,
}

/// Wire representation of an Assistance offering. `type` travels as a
/// string and is validated against the closed enumeration in the service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssistanceDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, rename = "type")]
    pub assistance_type: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub executor: Option<String>,
    #[serde(default)]
    pub attraction_ids: Option<Vec<Uuid>>,
}

/// Wire representation of an Attraction. `creation_date` is always
/// server-assigned; a caller-supplied value is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AttractionDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default, rename = "type")]
    pub attraction_type: Option<String>,
    #[serde(default)]
    pub locality_id: Option<Uuid>,
    #[serde(default)]
    pub assistance_ids: Option<Vec<Uuid>>,
}
