use std::cmp::Ordering;

use crate::core::{
    coordinates::{find_city, resolve_coordinates, stated_coordinates, Jitter, NoJitter, RngJitter},
    distance::{distance_between, round_for_display},
    filters::{matches_bhk, matches_space_type, matches_specialization, ProjectTypeFilter},
    pricing::{compute_price_tiers, match_price_range},
    scoring::score_company,
};
use crate::models::{Company, Coordinates, RankedCompany, SearchContext, SearchFilters, SearchOutcome};

/// Shown when the search bar was submitted empty
pub const REFINE_SEARCH_MESSAGE: &str = "Please provide search criteria for more relevant results.";

/// How companies are ordered inside each priority group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithinGroupOrder {
    /// Nearest first, companies without a distance last
    Distance,
    /// Highest quality score first
    Score,
}

/// Search orchestrator - filters, prices, scores and orders company listings
///
/// # Pipeline Stages
/// 1. Space type filter
/// 2. Room specialization filter
/// 3. Pricing against the requested area and budget
/// 4. Budget filter (falls back to everything when nothing fits)
/// 5. BHK filter
/// 6. Grouped ordering: assured, then top rated, then the rest
#[derive(Debug, Clone)]
pub struct Searcher {
    default_city: Option<String>,
    city_jitter: bool,
}

impl Searcher {
    pub fn new(default_city: Option<String>, city_jitter: bool) -> Self {
        Self {
            default_city,
            city_jitter,
        }
    }

    /// Deterministic searcher: no default city, no jitter
    pub fn deterministic() -> Self {
        Self::new(None, false)
    }

    /// Run a search, drawing city jitter from the thread RNG when enabled
    pub fn search(
        &self,
        companies: &[Company],
        filters: &SearchFilters,
        context: &SearchContext,
    ) -> SearchOutcome {
        if self.city_jitter {
            self.search_with(companies, filters, context, &mut RngJitter::thread())
        } else {
            self.search_with(companies, filters, context, &mut NoJitter)
        }
    }

    /// Run a search with an explicit jitter source
    pub fn search_with<J: Jitter + ?Sized>(
        &self,
        companies: &[Company],
        filters: &SearchFilters,
        context: &SearchContext,
        jitter: &mut J,
    ) -> SearchOutcome {
        if companies.is_empty() {
            return SearchOutcome {
                companies: Vec::new(),
                unreasonable_pricing: Some(false),
                no_matching_companies: Some(true),
                message: None,
            };
        }

        let fallback_city = context
            .user_city
            .as_deref()
            .or(self.default_city.as_deref());
        let origin = user_origin(context);

        // Nothing to narrow by: everything, best first
        if filters.is_empty() {
            let ranked = companies
                .iter()
                .map(|company| annotate(company, fallback_city, origin, jitter))
                .collect();

            return SearchOutcome {
                companies: order_grouped(ranked, WithinGroupOrder::Score),
                unreasonable_pricing: None,
                no_matching_companies: None,
                message: Some(REFINE_SEARCH_MESSAGE.to_string()),
            };
        }

        let mut candidates: Vec<&Company> = companies.iter().collect();

        // Stage 1: Residential / Commercial
        if let Some(space_type) = filters.space_type_value() {
            candidates.retain(|company| matches_space_type(company, space_type));
            tracing::debug!("{} companies after space type {:?}", candidates.len(), space_type);
        }

        // Stage 2: room specialization, before pricing
        let project_type = filters.project_type_filter();
        if let Some(ProjectTypeFilter::Room(room)) = project_type {
            candidates.retain(|company| matches_specialization(company, room));
            tracing::debug!("{} companies after specialization {:?}", candidates.len(), room);
        }

        // Stage 3: pricing
        let mut unreasonable_pricing = false;
        let mut ranked: Vec<RankedCompany> = Vec::with_capacity(candidates.len());

        for company in candidates {
            let tiers = compute_price_tiers(company, filters);
            let price_match = match_price_range(tiers.as_ref(), filters);
            unreasonable_pricing |= price_match.unreasonable();

            let mut entry = annotate(company, fallback_city, origin, jitter);
            entry.price_calculations = tiers;
            entry.price_match = Some(price_match);
            ranked.push(entry);
        }

        // Stage 4: budget
        if filters.price_range_value().is_some() {
            let within_budget = |entry: &RankedCompany| {
                entry.price_match.as_ref().is_some_and(|m| m.matches)
            };

            if ranked.iter().any(within_budget) {
                ranked.retain(within_budget);
                tracing::debug!("{} companies within budget", ranked.len());
            } else {
                tracing::debug!(
                    "No company within budget, keeping all {} (unreasonable: {})",
                    ranked.len(),
                    unreasonable_pricing
                );
            }
        }

        // Stage 5: BHK, after pricing
        if let Some(ProjectTypeFilter::Bhk(bhk)) = project_type {
            ranked.retain(|entry| matches_bhk(&entry.company, bhk));
            tracing::debug!("{} companies after BHK {:?}", ranked.len(), bhk);
        }

        // Stage 6: ordering
        let order = if origin.is_some() {
            WithinGroupOrder::Distance
        } else {
            WithinGroupOrder::Score
        };
        let companies = order_grouped(ranked, order);
        let no_matching_companies = companies.is_empty();

        SearchOutcome {
            companies,
            unreasonable_pricing: Some(unreasonable_pricing),
            no_matching_companies: Some(no_matching_companies),
            message: None,
        }
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(None, true)
    }
}

/// Point distances are measured from, unless the user turned distances off
pub fn user_origin(context: &SearchContext) -> Option<Coordinates> {
    if context.suppress_distance {
        return None;
    }

    let stated = context
        .user_coordinates
        .and_then(|point| Coordinates::new(point.latitude, point.longitude));

    stated.or_else(|| {
        context
            .user_city
            .as_deref()
            .and_then(find_city)
            .map(|city| city.coordinates())
    })
}

fn annotate<J: Jitter + ?Sized>(
    company: &Company,
    fallback_city: Option<&str>,
    origin: Option<Coordinates>,
    jitter: &mut J,
) -> RankedCompany {
    let mut company = resolve_coordinates(company, fallback_city, jitter);
    company.strip_derived_keys();
    let calculated_distance = origin.and_then(|origin| {
        stated_coordinates(&company).map(|(point, _)| distance_between(&origin, &point))
    });

    RankedCompany {
        score: score_company(&company),
        company,
        price_calculations: None,
        price_match: None,
        calculated_distance,
        display_distance: calculated_distance.map(round_for_display),
        is_nearest: false,
        is_first_card: false,
    }
}

#[inline]
fn priority_group(entry: &RankedCompany) -> u8 {
    if entry.company.assured {
        0
    } else if entry.company.top_rated {
        1
    } else {
        2
    }
}

fn compare_within_group(a: &RankedCompany, b: &RankedCompany, order: WithinGroupOrder) -> Ordering {
    let by_score = || b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal);

    match order {
        WithinGroupOrder::Score => by_score(),
        WithinGroupOrder::Distance => match (a.calculated_distance, b.calculated_distance) {
            (Some(da), Some(db)) => da
                .partial_cmp(&db)
                .unwrap_or(Ordering::Equal)
                .then_with(by_score),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Stable sort into assured / top rated / other, then mark the display flags
pub fn order_grouped(mut ranked: Vec<RankedCompany>, order: WithinGroupOrder) -> Vec<RankedCompany> {
    ranked.sort_by(|a, b| {
        priority_group(a)
            .cmp(&priority_group(b))
            .then_with(|| compare_within_group(a, b, order))
    });

    let nearest_assured = ranked
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.company.assured)
        .filter_map(|(i, entry)| entry.calculated_distance.map(|d| (i, d)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .map(|(i, _)| i);

    if let Some(i) = nearest_assured {
        ranked[i].is_nearest = true;
    }
    if let Some(first) = ranked.first_mut() {
        first.is_first_card = true;
    }

    ranked
}

/// Search with a default [`Searcher`]
pub fn search_companies(
    companies: &[Company],
    filters: &SearchFilters,
    context: &SearchContext,
) -> SearchOutcome {
    Searcher::default().search(companies, filters, context)
}
