use crate::error::{CatalogError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Attraction kinds. Values outside this set are rejected at the service
/// boundary, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttractionType {
    Palace,
    Park,
    Museum,
    ArchaeologicalSite,
    Reserve,
}

impl AttractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Palace => "PALACE",
            Self::Park => "PARK",
            Self::Museum => "MUSEUM",
            Self::ArchaeologicalSite => "ARCHAEOLOGICAL_SITE",
            Self::Reserve => "RESERVE",
        }
    }
}

impl FromStr for AttractionType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PALACE" => Ok(Self::Palace),
            "PARK" => Ok(Self::Park),
            "MUSEUM" => Ok(Self::Museum),
            "ARCHAEOLOGICAL_SITE" => Ok(Self::ArchaeologicalSite),
            "RESERVE" => Ok(Self::Reserve),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AttractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assistance service kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssistanceType {
    Guide,
    Interpreter,
    Transport,
    Meals,
    Safety,
}

impl AssistanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guide => "GUIDE",
            Self::Interpreter => "INTERPRETER",
            Self::Transport => "TRANSPORT",
            Self::Meals => "MEALS",
            Self::Safety => "SAFETY",
        }
    }
}

impl FromStr for AssistanceType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "GUIDE" => Ok(Self::Guide),
            "INTERPRETER" => Ok(Self::Interpreter),
            "TRANSPORT" => Ok(Self::Transport),
            "MEALS" => Ok(Self::Meals),
            "SAFETY" => Ok(Self::Safety),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AssistanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a string against a closed enumeration, case-insensitively.
/// Both typed slices (Assistance, Attraction) validate through this single
/// helper so invalid values fail uniformly with `InvalidArgument`.
pub fn parse_enum<T>(kind: &str, value: &str) -> Result<T>
where
    T: FromStr,
{
    T::from_str(&value.to_uppercase())
        .map_err(|_| CatalogError::InvalidArgument(format!("Invalid {} type: {}", kind, value)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Locality {
    pub id: Option<Uuid>,
    pub name: String,
    pub region: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub short_description: Option<String>,
    pub assistance_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistance {
    pub id: Option<Uuid>,
    pub assistance_type: AssistanceType,
    pub short_description: Option<String>,
    pub executor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attraction {
    pub id: Option<Uuid>,
    pub name: String,
    pub creation_date: DateTime<Utc>,
    pub short_description: Option<String>,
    pub attraction_type: AttractionType,
    pub locality_id: Uuid,
    pub assistance_ids: Vec<Uuid>,
}

/// Page/size/sort triple carried from the query string down to storage.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
    pub sort: String,
}

impl PageRequest {
    pub fn new(page: Option<usize>, size: Option<usize>, sort: Option<String>, default_sort: &str) -> Self {
        Self {
            page: page.unwrap_or(0),
            size: size.unwrap_or(10).max(1),
            sort: sort.unwrap_or_else(|| default_sort.to_string()),
        }
    }

    pub fn offset(&self) -> usize {
        // page comes straight from the query string; don't overflow on
        // absurd values
        self.page.saturating_mul(self.size)
    }
}

/// One page of results plus the totals the caller needs for paging.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: usize) -> Self {
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: total_elements.div_ceil(request.size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_enum_is_case_insensitive() {
        let t: AttractionType = parse_enum("attraction", "museum").unwrap();
        assert_eq!(t, AttractionType::Museum);
        let t: AssistanceType = parse_enum("assistance", "Guide").unwrap();
        assert_eq!(t, AssistanceType::Guide);
    }

    #[test]
    fn parse_enum_rejects_unknown_values() {
        let err = parse_enum::<AttractionType>("attraction", "CASTLE").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
    }

    #[test]
    fn offset_saturates_on_huge_page_numbers() {
        let request = PageRequest::new(Some(usize::MAX), Some(10), None, "name");
        assert_eq!(request.offset(), usize::MAX);
    }

    #[test]
    fn page_totals() {
        let request = PageRequest::new(Some(1), Some(10), None, "name");
        let page = Page::new(vec![1, 2], &request, 12);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.total_elements, 12);
        assert_eq!(page.page, 1);
    }
}
