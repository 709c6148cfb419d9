use thiserror::Error;

use crate::models::lenient::{parse_float_prefix, parse_int_prefix};
use crate::models::{Company, SearchFilters};

/// Placeholder texts the search bar sends when a dropdown is untouched
pub const PROJECT_TYPE_PLACEHOLDER: &str = "Project Type";
pub const SIZE_PLACEHOLDER: &str = "Size (sq ft)";
pub const PRICE_RANGE_PLACEHOLDER: &str = "Price Range";

/// One Lakh in rupees
pub const LAKH: f64 = 100_000.0;

pub const ROOM_TYPES: [&str; 4] = ["Office", "Kitchen", "Bathroom", "Living Room"];
pub const BHK_SIZES: [&str; 5] = ["1 BHK", "2 BHK", "3 BHK", "4 BHK", "5+ BHK"];

/// Why a filter value could not be used
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("size must look like \"<min>-<max>\", got {0:?}")]
    MalformedSize(String),

    #[error("area bounds must be positive, got {min}-{max}")]
    NonPositiveArea { min: i64, max: i64 },

    #[error("price range must look like \"<N>Lakh to <M>Lakh\", got {0:?}")]
    MalformedPriceRange(String),

    #[error("budget bounds must be positive, got {min}-{max}")]
    NonPositiveBudget { min: f64, max: f64 },
}

/// Area range in square feet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaRange {
    pub min_sqft: i64,
    pub max_sqft: i64,
}

/// Budget range in rupees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    pub min: f64,
    pub max: f64,
}

/// How the project type narrows the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectTypeFilter<'a> {
    /// Room specialization, applied before pricing
    Room(&'a str),
    /// Home size, applied after pricing
    Bhk(&'a str),
    /// Anything else narrows nothing
    Unrecognized(&'a str),
}

fn active<'a>(value: &'a Option<String>, placeholder: Option<&str>) -> Option<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .filter(|v| Some(*v) != placeholder)
}

impl SearchFilters {
    pub fn search_term(&self) -> Option<&str> {
        active(&self.search, None)
    }

    pub fn space_type_value(&self) -> Option<&str> {
        active(&self.space_type, None)
    }

    pub fn project_type_value(&self) -> Option<&str> {
        active(&self.project_type, Some(PROJECT_TYPE_PLACEHOLDER))
    }

    pub fn size_value(&self) -> Option<&str> {
        active(&self.size, Some(SIZE_PLACEHOLDER))
    }

    pub fn price_range_value(&self) -> Option<&str> {
        active(&self.price_range, Some(PRICE_RANGE_PLACEHOLDER))
    }

    /// True when nothing narrows the search
    pub fn is_empty(&self) -> bool {
        self.search_term().is_none()
            && self.space_type_value().is_none()
            && self.project_type_value().is_none()
            && self.size_value().is_none()
            && self.price_range_value().is_none()
    }

    pub fn project_type_filter(&self) -> Option<ProjectTypeFilter<'_>> {
        self.project_type_value().map(classify_project_type)
    }

    /// Area range from `size`, if set and well-formed
    pub fn area_range(&self) -> Option<Result<AreaRange, FilterError>> {
        self.size_value().map(parse_area_range)
    }

    /// Budget from `priceRange`, if set and well-formed
    pub fn budget(&self) -> Option<Result<Budget, FilterError>> {
        self.price_range_value().map(parse_budget)
    }
}

pub fn classify_project_type(value: &str) -> ProjectTypeFilter<'_> {
    if BHK_SIZES.contains(&value) {
        ProjectTypeFilter::Bhk(value)
    } else if ROOM_TYPES.contains(&value) {
        ProjectTypeFilter::Room(value)
    } else {
        ProjectTypeFilter::Unrecognized(value)
    }
}

/// Parse `"800-1000"`
pub fn parse_area_range(value: &str) -> Result<AreaRange, FilterError> {
    let mut parts = value.split('-');
    let (min, max) = match (parts.next(), parts.next(), parts.next()) {
        (Some(min), Some(max), None) => (min, max),
        _ => return Err(FilterError::MalformedSize(value.to_string())),
    };

    let min_sqft = parse_int_prefix(min).unwrap_or(0);
    let max_sqft = parse_int_prefix(max).unwrap_or(0);

    if min_sqft <= 0 || max_sqft <= 0 {
        return Err(FilterError::NonPositiveArea { min: min_sqft, max: max_sqft });
    }

    Ok(AreaRange { min_sqft, max_sqft })
}

/// Parse `"2Lakh to 5Lakh"`
pub fn parse_budget(value: &str) -> Result<Budget, FilterError> {
    let mut parts = value.split(" to ");
    let (low, high) = match (parts.next(), parts.next(), parts.next()) {
        (Some(low), Some(high), None) => (low, high),
        _ => return Err(FilterError::MalformedPriceRange(value.to_string())),
    };

    let lakhs = |part: &str| parse_float_prefix(&part.replace("Lakh", "")).unwrap_or(0.0);
    let min = lakhs(low) * LAKH;
    let max = lakhs(high) * LAKH;

    if min <= 0.0 || max <= 0.0 {
        return Err(FilterError::NonPositiveBudget { min, max });
    }

    Ok(Budget { min, max })
}

/// `type` carries the requested space type
#[inline]
pub fn matches_space_type(company: &Company, space_type: &str) -> bool {
    company
        .space_type
        .as_ref()
        .is_some_and(|tags| tags.includes(space_type))
}

/// Some service category mentions the room type
#[inline]
pub fn matches_specialization(company: &Company, room_type: &str) -> bool {
    company
        .service_categories
        .as_ref()
        .is_some_and(|categories| categories.any_entry_contains(room_type))
}

/// `projectType` carries the requested BHK size
#[inline]
pub fn matches_bhk(company: &Company, bhk: &str) -> bool {
    company
        .project_type
        .as_ref()
        .is_some_and(|tags| tags.includes(bhk))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagField;

    #[test]
    fn test_placeholders_read_as_unset() {
        let filters = SearchFilters {
            search: Some("   ".into()),
            space_type: None,
            project_type: Some(PROJECT_TYPE_PLACEHOLDER.into()),
            size: Some(SIZE_PLACEHOLDER.into()),
            price_range: Some(PRICE_RANGE_PLACEHOLDER.into()),
        };

        assert!(filters.is_empty());
        assert!(filters.area_range().is_none());
        assert!(filters.budget().is_none());
    }

    #[test]
    fn test_space_type_alone_is_a_filter() {
        let filters = SearchFilters {
            space_type: Some("Commercial".into()),
            ..Default::default()
        };
        assert!(!filters.is_empty());
    }

    #[test]
    fn test_parse_area_range() {
        assert_eq!(
            parse_area_range("800-1000"),
            Ok(AreaRange { min_sqft: 800, max_sqft: 1000 })
        );
        assert_eq!(
            parse_area_range("0-1000"),
            Err(FilterError::NonPositiveArea { min: 0, max: 1000 })
        );
        assert!(matches!(parse_area_range("2000+"), Err(FilterError::MalformedSize(_))));
        assert!(matches!(parse_area_range("a-b"), Err(FilterError::NonPositiveArea { .. })));
    }

    #[test]
    fn test_parse_budget() {
        assert_eq!(
            parse_budget("2Lakh to 5Lakh"),
            Ok(Budget { min: 200_000.0, max: 500_000.0 })
        );
        assert_eq!(
            parse_budget("1.5Lakh to 3Lakh"),
            Ok(Budget { min: 150_000.0, max: 300_000.0 })
        );
        assert!(matches!(parse_budget("cheap"), Err(FilterError::MalformedPriceRange(_))));
        assert!(matches!(parse_budget("0Lakh to 3Lakh"), Err(FilterError::NonPositiveBudget { .. })));
    }

    #[test]
    fn test_classify_project_type() {
        assert_eq!(classify_project_type("Kitchen"), ProjectTypeFilter::Room("Kitchen"));
        assert_eq!(classify_project_type("5+ BHK"), ProjectTypeFilter::Bhk("5+ BHK"));
        assert_eq!(classify_project_type("Villa"), ProjectTypeFilter::Unrecognized("Villa"));
    }

    #[test]
    fn test_company_predicates() {
        let company = Company {
            space_type: Some(TagField::text("Residential")),
            service_categories: Some(TagField::list(["Modular Kitchen", "Wardrobes"])),
            project_type: Some(TagField::text("2 BHK, 3 BHK")),
            ..Default::default()
        };

        assert!(matches_space_type(&company, "Residential"));
        assert!(!matches_space_type(&company, "Commercial"));
        assert!(matches_specialization(&company, "Kitchen"));
        assert!(!matches_specialization(&company, "Office"));
        assert!(matches_bhk(&company, "3 BHK"));
        assert!(!matches_bhk(&company, "1 BHK"));
        assert!(!matches_space_type(&Company::default(), "Residential"));
    }
}
