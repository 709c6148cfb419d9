//! Inty search - ranking and filtering for the Inty interior-design directory
//!
//! This library turns a list of design companies plus the user's filters and
//! location into the ordered card list shown on the listing page: text and
//! category filters, budget tiers, area and BHK filters, a 0-3 quality score,
//! distance to the user, and assured / top-rated grouping.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{haversine_distance, search_companies, Searcher};
pub use crate::models::{Company, RankedCompany, SearchContext, SearchFilters, SearchOutcome};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let outcome = search_companies(&[], &SearchFilters::default(), &SearchContext::default());
        assert!(outcome.companies.is_empty());
        assert!(haversine_distance(12.97, 77.59, 12.97, 77.59) < 1e-9);
    }
}
