// Model exports
pub mod domain;
pub mod lenient;
pub mod requests;
pub mod responses;

pub use domain::{
    Company, CoordinateField, CoordinatePoint, Coordinates, PriceMatch, PriceTiers, RankedCompany,
    SearchContext, SearchFilters, SearchOutcome, Tier, TierPrice,
};
pub use lenient::{LooseNumber, TagField};
pub use requests::{CompanySearchQuery, NearestCityQuery, SearchRequest};
pub use responses::{ErrorResponse, HealthResponse, NearestCityResponse, SearchResponse};
