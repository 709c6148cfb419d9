// Core algorithm exports
pub mod coordinates;
pub mod distance;
pub mod filters;
pub mod pricing;
pub mod scoring;
pub mod search;

pub use coordinates::{
    find_city, locate, nearest_city, resolve_coordinates, stated_coordinates, City, Jitter,
    NoJitter, RngJitter, CITIES,
};
pub use distance::{distance_between, haversine_distance, round_for_display};
pub use filters::{FilterError, ProjectTypeFilter};
pub use pricing::{compute_price_tiers, match_price_range};
pub use scoring::score_company;
pub use search::{search_companies, Searcher, WithinGroupOrder};
