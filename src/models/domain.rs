use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient::{self, LooseNumber, TagField};

/// A resolved point on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
}

impl Coordinates {
    /// Build a point, rejecting non-finite or out-of-range degrees
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        valid.then_some(Self { latitude, longitude })
    }
}

fn valid_coordinates<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let point = Option::<Coordinates>::deserialize(deserializer)?;
    Ok(point.and_then(|p| Coordinates::new(p.latitude, p.longitude)))
}

/// Object form of the `coordinates` field; either naming convention may be used
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<LooseNumber>,
}

/// The `coordinates` field as stored: an object, a `"lat,lng"` string, or junk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordinateField {
    Point(CoordinatePoint),
    Text(String),
    Other(Value),
}

impl From<Coordinates> for CoordinateField {
    fn from(value: Coordinates) -> Self {
        CoordinateField::Point(CoordinatePoint {
            latitude: Some(value.latitude.into()),
            longitude: Some(value.longitude.into()),
            lat: None,
            lng: None,
        })
    }
}

/// Interior-design company listing as served by the catalog API
///
/// Fields the ranking pipeline does not read are kept in `extra` and written
/// back out untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// "Residential" / "Commercial" tags
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub space_type: Option<TagField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_categories: Option<TagField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<TagField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<CoordinateField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// City name
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_rating: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_reviews: Option<LooseNumber>,
    /// Legacy name of `googleReviews`, still present on older records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_review_count: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounts_offer_timeline: Option<TagField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_award_won: Option<TagField>,

    /// Rate per sq ft for each tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_price_range: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_price_range: Option<LooseNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luxury_price_range: Option<LooseNumber>,

    #[serde(default, deserialize_with = "lenient::flag")]
    pub assured: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub top_rated: bool,
    #[serde(default, deserialize_with = "lenient::opt_flag", skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keys the search pipeline writes on each ranked card
pub const DERIVED_KEYS: [&str; 7] = [
    "score",
    "priceCalculations",
    "priceMatch",
    "calculatedDistance",
    "displayDistance",
    "isNearest",
    "isFirstCard",
];

impl Company {
    /// Drop pipeline output echoed back in the input, e.g. a re-ranked page
    pub fn strip_derived_keys(&mut self) {
        for key in DERIVED_KEYS {
            self.extra.remove(key);
        }
    }

    /// Display label for logs
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("<unnamed>")
    }

    /// Review count, falling back to the legacy field when `googleReviews` is blank
    pub fn review_count(&self) -> Option<i64> {
        let current = self
            .google_reviews
            .as_ref()
            .filter(|value| value.is_truthy());

        current
            .or(self.google_review_count.as_ref())
            .and_then(LooseNumber::as_i64)
    }
}

/// Search criteria as typed into the search bar
///
/// Each field may hold the dropdown's placeholder text, which means "unset".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub space_type: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    /// `"<min>-<max>"` in square feet
    #[serde(default)]
    pub size: Option<String>,
    /// `"<N>Lakh to <M>Lakh"`
    #[serde(default)]
    pub price_range: Option<String>,
}

/// Where the user is and whether distances should be used at all
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContext {
    /// Set when the user turned distance display off
    #[serde(default)]
    pub suppress_distance: bool,
    /// Out-of-range points read as absent
    #[serde(default, deserialize_with = "valid_coordinates")]
    pub user_coordinates: Option<Coordinates>,
    /// Selected city; also the fallback location for companies without one
    #[serde(default)]
    pub user_city: Option<String>,
}

/// Pricing tier, in matching order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Standard,
    Premium,
    Luxe,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Basic, Tier::Standard, Tier::Premium, Tier::Luxe];
}

/// Estimated project cost for one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierPrice {
    pub min: f64,
    pub max: f64,
    pub price_per_sqft: f64,
}

/// Estimated project cost per tier; `standard` has no rate source and stays empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTiers {
    pub basic: Option<TierPrice>,
    pub standard: Option<TierPrice>,
    pub premium: Option<TierPrice>,
    pub luxe: Option<TierPrice>,
}

impl PriceTiers {
    pub fn get(&self, tier: Tier) -> Option<&TierPrice> {
        match tier {
            Tier::Basic => self.basic.as_ref(),
            Tier::Standard => self.standard.as_ref(),
            Tier::Premium => self.premium.as_ref(),
            Tier::Luxe => self.luxe.as_ref(),
        }
    }
}

/// Outcome of comparing a company's tiers with the user's budget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceMatch {
    pub matches: bool,
    pub tier: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_unreasonable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smallest_diff: Option<f64>,
}

impl PriceMatch {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn unreasonable(&self) -> bool {
        self.is_unreasonable.unwrap_or(false)
    }
}

/// Company annotated by the search pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCompany {
    #[serde(flatten)]
    pub company: Company,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_calculations: Option<PriceTiers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_match: Option<PriceMatch>,
    /// Kilometres from the user, unrounded; drives ordering
    #[serde(default)]
    pub calculated_distance: Option<f64>,
    /// Same distance rounded to one decimal for display
    #[serde(default)]
    pub display_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_nearest: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_first_card: bool,
}

/// Ordered result list plus the flags the listing page reacts to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub companies: Vec<RankedCompany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unreasonable_pricing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_matching_companies: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
