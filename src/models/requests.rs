use serde::{Deserialize, Serialize};
use validator::Validate;

use super::domain::{Company, Coordinates, SearchContext, SearchFilters};

/// Rank a caller-supplied list of companies
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default)]
    pub context: SearchContext,
}

/// Query string of `GET /companies/search`, mirroring the listing page URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompanySearchQuery {
    #[validate(length(max = 200))]
    #[serde(default, alias = "query")]
    pub search: Option<String>,
    #[serde(default)]
    pub space_type: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub price_range: Option<String>,
    /// User's selected city
    #[validate(length(max = 100))]
    #[serde(default)]
    pub location: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub hide_distance: bool,
}

impl CompanySearchQuery {
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            search: self.search.clone(),
            space_type: self.space_type.clone(),
            project_type: self.project_type.clone(),
            size: self.size.clone(),
            price_range: self.price_range.clone(),
        }
    }

    pub fn context(&self) -> SearchContext {
        let user_coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng),
            _ => None,
        };

        SearchContext {
            suppress_distance: self.hide_distance,
            user_coordinates,
            user_city: self.location.clone().filter(|c| !c.trim().is_empty()),
        }
    }
}

/// `GET /cities/nearest` query
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearestCityQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builds_context() {
        let query = CompanySearchQuery {
            location: Some("Pune".into()),
            latitude: Some(18.52),
            longitude: Some(73.85),
            ..Default::default()
        };

        let context = query.context();
        assert!(!context.suppress_distance);
        assert_eq!(context.user_city.as_deref(), Some("Pune"));
        assert_eq!(context.user_coordinates, Coordinates::new(18.52, 73.85));
    }

    #[test]
    fn test_query_validation_rejects_bad_latitude() {
        let query = CompanySearchQuery {
            latitude: Some(123.0),
            longitude: Some(73.85),
            ..Default::default()
        };

        assert!(query.validate().is_err());
    }
}
