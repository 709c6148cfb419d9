//! Coordinate resolution for company listings.
//!
//! Listings carry their location in one of several shapes. [`locate`] walks
//! them in a fixed order and returns the first one that parses; the city
//! table is the last resort and gets a small random offset so that companies
//! in the same city don't stack on one point.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::core::distance::distance_between;
use crate::models::{Company, CoordinateField, Coordinates, LooseNumber};

/// Known city centres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

pub static CITIES: [City; 12] = [
    City { name: "Bengaluru", latitude: 12.9716, longitude: 77.5946 },
    City { name: "Indore", latitude: 22.7196, longitude: 75.8577 },
    City { name: "Nagpur", latitude: 21.1458, longitude: 79.0882 },
    City { name: "Mumbai", latitude: 19.0760, longitude: 72.8777 },
    City { name: "Delhi", latitude: 28.6139, longitude: 77.2090 },
    City { name: "Chennai", latitude: 13.0827, longitude: 80.2707 },
    City { name: "Kolkata", latitude: 22.5726, longitude: 88.3639 },
    City { name: "Hyderabad", latitude: 17.3850, longitude: 78.4867 },
    City { name: "Pune", latitude: 18.5204, longitude: 73.8567 },
    City { name: "Jaipur", latitude: 26.9124, longitude: 75.7873 },
    City { name: "Lucknow", latitude: 26.8467, longitude: 80.9462 },
    City { name: "Ahmedabad", latitude: 23.0225, longitude: 72.5714 },
];

/// Max offset in degrees for a company placed at its own city's centre (~2.5 km)
pub const CITY_JITTER_DEG: f64 = 0.025;

/// Max offset in degrees for a company placed at the user's city (~5 km)
pub const FALLBACK_JITTER_DEG: f64 = 0.05;

static ADDRESS_COORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(-?\d+\.?\d*),\s*(-?\d+\.?\d*)\]").expect("valid address coordinate regex")
});

/// Source of per-axis offsets applied to city-table coordinates
pub trait Jitter {
    /// Offset uniformly drawn from `[-max_abs_deg, max_abs_deg]`
    fn offset(&mut self, max_abs_deg: f64) -> f64;
}

/// Always zero; keeps ordering reproducible
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn offset(&mut self, _max_abs_deg: f64) -> f64 {
        0.0
    }
}

/// Random offsets from any `rand` generator
#[derive(Debug, Clone)]
pub struct RngJitter<R>(pub R);

impl RngJitter<rand::rngs::ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::rng())
    }
}

impl<R: Rng> Jitter for RngJitter<R> {
    fn offset(&mut self, max_abs_deg: f64) -> f64 {
        if max_abs_deg <= 0.0 {
            return 0.0;
        }
        self.0.random_range(-max_abs_deg..=max_abs_deg)
    }
}

/// Which part of the record a location came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSource {
    CoordinatesField,
    LatLngFields,
    LatitudeLongitudeFields,
    Address,
    CompanyCity,
    FallbackCity,
}

/// Look up a city centre by name (case-insensitive)
pub fn find_city(name: &str) -> Option<&'static City> {
    let name = name.trim();
    CITIES.iter().find(|city| city.name.eq_ignore_ascii_case(name))
}

/// Nearest table city to a point
pub fn nearest_city(point: &Coordinates) -> (&'static City, f64) {
    CITIES
        .iter()
        .map(|city| (city, distance_between(point, &city.coordinates())))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((&CITIES[0], distance_between(point, &CITIES[0].coordinates())))
}

/// Coordinates stated on the record itself (no city lookup, no jitter)
pub fn stated_coordinates(company: &Company) -> Option<(Coordinates, CoordinateSource)> {
    if let Some(point) = company.coordinates.as_ref().and_then(parse_coordinate_field) {
        return Some((point, CoordinateSource::CoordinatesField));
    }

    if let Some(point) = truthy_pair(company.lat.as_ref(), company.lng.as_ref()) {
        return Some((point, CoordinateSource::LatLngFields));
    }

    if let Some(point) = truthy_pair(company.latitude.as_ref(), company.longitude.as_ref()) {
        return Some((point, CoordinateSource::LatitudeLongitudeFields));
    }

    if let Some(point) = company.address.as_deref().and_then(parse_address_coordinates) {
        return Some((point, CoordinateSource::Address));
    }

    None
}

/// Resolve a company's location, falling back to the city table
///
/// `fallback_city` is used, with a wider offset, only when the company has
/// no usable location of its own.
pub fn locate<J: Jitter + ?Sized>(
    company: &Company,
    fallback_city: Option<&str>,
    jitter: &mut J,
) -> Option<(Coordinates, CoordinateSource)> {
    if let Some(found) = stated_coordinates(company) {
        return Some(found);
    }

    if let Some(city) = company.location.as_deref().and_then(find_city) {
        let point = offset_city(city, CITY_JITTER_DEG, jitter)?;
        return Some((point, CoordinateSource::CompanyCity));
    }

    if let Some(city) = fallback_city.and_then(find_city) {
        let point = offset_city(city, FALLBACK_JITTER_DEG, jitter)?;
        return Some((point, CoordinateSource::FallbackCity));
    }

    None
}

/// Copy of `company` with normalized `coordinates`, or an unchanged copy
/// when nothing resolves
pub fn resolve_coordinates<J: Jitter + ?Sized>(
    company: &Company,
    fallback_city: Option<&str>,
    jitter: &mut J,
) -> Company {
    let mut resolved = company.clone();

    match locate(company, fallback_city, jitter) {
        Some((point, source)) => {
            tracing::trace!("Located {} via {:?}", company.label(), source);
            resolved.coordinates = Some(CoordinateField::from(point));
            if source == CoordinateSource::FallbackCity {
                resolved.location = fallback_city.and_then(find_city).map(|c| c.name.to_string());
            }
        }
        None => {
            tracing::trace!("No location for {}", company.label());
        }
    }

    resolved
}

fn offset_city<J: Jitter + ?Sized>(city: &City, max_abs_deg: f64, jitter: &mut J) -> Option<Coordinates> {
    Coordinates::new(
        city.latitude + jitter.offset(max_abs_deg),
        city.longitude + jitter.offset(max_abs_deg),
    )
}

fn parse_coordinate_field(field: &CoordinateField) -> Option<Coordinates> {
    match field {
        CoordinateField::Point(point) => {
            let latitude = point
                .latitude
                .as_ref()
                .and_then(LooseNumber::as_f64)
                .or_else(|| point.lat.as_ref().and_then(LooseNumber::as_f64))?;
            let longitude = point
                .longitude
                .as_ref()
                .and_then(LooseNumber::as_f64)
                .or_else(|| point.lng.as_ref().and_then(LooseNumber::as_f64))?;
            Coordinates::new(latitude, longitude)
        }
        CoordinateField::Text(text) => {
            let (lat, lng) = text.split_once(',')?;
            if lng.contains(',') {
                return None;
            }
            Coordinates::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?)
        }
        CoordinateField::Other(_) => None,
    }
}

fn truthy_pair(lat: Option<&LooseNumber>, lng: Option<&LooseNumber>) -> Option<Coordinates> {
    let (lat, lng) = (lat?, lng?);
    if !lat.is_truthy() || !lng.is_truthy() {
        return None;
    }
    Coordinates::new(lat.as_f64()?, lng.as_f64()?)
}

fn parse_address_coordinates(address: &str) -> Option<Coordinates> {
    let captures = ADDRESS_COORDS_RE.captures(address)?;
    let lat: f64 = captures.get(1)?.as_str().parse().ok()?;
    let lng: f64 = captures.get(2)?.as_str().parse().ok()?;
    Coordinates::new(lat, lng)
}
