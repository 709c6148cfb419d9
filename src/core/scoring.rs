use crate::models::{Company, LooseNumber};

/// Marker that flags an award as recent
pub const RECENT_AWARD_MARKER: &str = "recent";

const REVIEW_SATURATION: f64 = 100.0;
const MAX_RATING: f64 = 5.0;

/// Calculate a company's quality score (0-3)
///
/// Scoring formula:
/// score = (
///     rating/5 * min(reviews/100, 1) +   # 0-1, no reviews = 0
///     min(experience * 0.1, 0.5) +       # saturates at 5 years
///     min(projects * 0.01, 0.5) +        # saturates at 50 projects
///     0.5 if an offer is running +
///     0.5 recent award / 0.25 any award
/// )
pub fn score_company(company: &Company) -> f64 {
    let rating = company
        .google_rating
        .as_ref()
        .and_then(LooseNumber::as_f64)
        .unwrap_or(0.0);
    let reviews = company.review_count().unwrap_or(0);
    let experience = whole(company.experience.as_ref());
    let projects = whole(company.projects.as_ref());

    calculate_rating_score(rating, reviews)
        + calculate_experience_score(experience)
        + calculate_projects_score(projects)
        + calculate_offer_score(company)
        + calculate_award_score(company)
}

#[inline]
fn whole(value: Option<&LooseNumber>) -> i64 {
    value.and_then(LooseNumber::as_i64).unwrap_or(0)
}

/// Rating dampened by review volume (0-1)
#[inline]
fn calculate_rating_score(rating: f64, reviews: i64) -> f64 {
    if reviews <= 0 {
        return 0.0;
    }

    let confidence = (reviews as f64 / REVIEW_SATURATION).min(1.0);
    (rating.clamp(0.0, MAX_RATING) / MAX_RATING) * confidence
}

/// 0.1 per year, capped at 0.5
#[inline]
fn calculate_experience_score(years: i64) -> f64 {
    if years <= 0 {
        return 0.0;
    }
    (years as f64 * 0.1).min(0.5)
}

/// 0.01 per completed project, capped at 0.5
#[inline]
fn calculate_projects_score(projects: i64) -> f64 {
    if projects <= 0 {
        return 0.0;
    }
    (projects as f64 * 0.01).min(0.5)
}

#[inline]
fn calculate_offer_score(company: &Company) -> f64 {
    let has_offer = company
        .discounts_offer_timeline
        .as_ref()
        .is_some_and(|offer| offer.is_present());

    if has_offer { 0.5 } else { 0.0 }
}

// TODO: replace the "recent" marker with a date check once award entries carry the year won.
#[inline]
fn calculate_award_score(company: &Company) -> f64 {
    match company.any_award_won.as_ref().filter(|awards| awards.is_present()) {
        Some(awards) if awards.any_entry_contains(RECENT_AWARD_MARKER) => 0.5,
        Some(_) => 0.25,
        None => 0.0,
    }
}
