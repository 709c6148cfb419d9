use crate::core::filters::{AreaRange, Budget, LAKH};
use crate::models::{Company, LooseNumber, PriceMatch, PriceTiers, SearchFilters, Tier, TierPrice};

/// How far above the budget the cheapest offer may sit before the budget is
/// flagged as unrealistic
pub const UNREASONABLE_GAP: f64 = LAKH;

/// Estimate each tier's project cost for the requested area
///
/// Returns `None` when the size filter is missing or unusable.
pub fn compute_price_tiers(company: &Company, filters: &SearchFilters) -> Option<PriceTiers> {
    let area = match filters.area_range()? {
        Ok(area) => area,
        Err(e) => {
            tracing::debug!("Ignoring size filter: {}", e);
            return None;
        }
    };

    Some(PriceTiers {
        basic: tier_price(company.basic_price_range.as_ref(), area),
        standard: None,
        premium: tier_price(company.premium_price_range.as_ref(), area),
        luxe: tier_price(company.luxury_price_range.as_ref(), area),
    })
}

#[inline]
fn tier_price(rate: Option<&LooseNumber>, area: AreaRange) -> Option<TierPrice> {
    let price_per_sqft = rate?.as_f64().filter(|r| *r > 0.0)?;

    Some(TierPrice {
        min: price_per_sqft * area.min_sqft as f64,
        max: price_per_sqft * area.max_sqft as f64,
        price_per_sqft,
    })
}

/// Compare estimated tier costs with the user's budget
///
/// The first tier (basic → luxe) whose range overlaps the budget wins. With no
/// overlap the tier whose minimum is closest to the budget's minimum is
/// reported instead.
pub fn match_price_range(tiers: Option<&PriceTiers>, filters: &SearchFilters) -> PriceMatch {
    let Some(tiers) = tiers else {
        return PriceMatch::none();
    };

    let budget = match filters.budget() {
        Some(Ok(budget)) => budget,
        Some(Err(e)) => {
            tracing::debug!("Ignoring price range filter: {}", e);
            return PriceMatch::none();
        }
        None => return PriceMatch::none(),
    };

    for tier in Tier::ALL {
        if let Some(price) = tiers.get(tier) {
            if overlaps(price, budget) {
                return PriceMatch {
                    matches: true,
                    tier: Some(tier),
                    min: Some(price.min),
                    max: Some(price.max),
                    is_unreasonable: None,
                    smallest_diff: None,
                };
            }
        }
    }

    let mut closest: Option<(Tier, &TierPrice)> = None;
    let mut smallest_diff = f64::MAX;

    for tier in Tier::ALL {
        if let Some(price) = tiers.get(tier) {
            let diff = (price.min - budget.min).abs();
            if diff < smallest_diff {
                smallest_diff = diff;
                closest = Some((tier, price));
            }
        }
    }

    match closest {
        Some((tier, price)) => PriceMatch {
            matches: false,
            tier: Some(tier),
            min: Some(price.min),
            max: Some(price.max),
            is_unreasonable: Some(price.min - budget.max > UNREASONABLE_GAP),
            smallest_diff: Some(smallest_diff),
        },
        None => PriceMatch {
            is_unreasonable: Some(false),
            ..PriceMatch::none()
        },
    }
}

#[inline]
fn overlaps(price: &TierPrice, budget: Budget) -> bool {
    let min_inside = price.min >= budget.min && price.min <= budget.max;
    let max_inside = price.max >= budget.min && price.max <= budget.max;
    let covers = price.min <= budget.min && price.max >= budget.max;

    min_inside || max_inside || covers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(basic: Option<&str>, premium: Option<&str>, luxury: Option<&str>) -> Company {
        Company {
            basic_price_range: basic.map(LooseNumber::from),
            premium_price_range: premium.map(LooseNumber::from),
            luxury_price_range: luxury.map(LooseNumber::from),
            ..Default::default()
        }
    }

    fn filters(size: Option<&str>, price_range: Option<&str>) -> SearchFilters {
        SearchFilters {
            size: size.map(String::from),
            price_range: price_range.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_basic_tier_from_rate() {
        let tiers = compute_price_tiers(&company(Some("10"), None, None), &filters(Some("1000-2000"), None))
            .unwrap();

        assert_eq!(
            tiers.basic,
            Some(TierPrice { min: 10_000.0, max: 20_000.0, price_per_sqft: 10.0 })
        );
        assert_eq!(tiers.standard, None);
        assert_eq!(tiers.premium, None);
    }

    #[test]
    fn test_no_tiers_without_size() {
        let c = company(Some("1500"), Some("2500"), Some("4000"));

        assert!(compute_price_tiers(&c, &filters(None, None)).is_none());
        assert!(compute_price_tiers(&c, &filters(Some("Size (sq ft)"), None)).is_none());
        assert!(compute_price_tiers(&c, &filters(Some("big"), None)).is_none());
        assert!(compute_price_tiers(&c, &filters(Some("0-900"), None)).is_none());
    }

    #[test]
    fn test_standard_tier_never_priced() {
        let c = company(Some("1500"), Some("2500"), Some("4000"));
        let tiers = compute_price_tiers(&c, &filters(Some("800-1000"), None)).unwrap();

        assert!(tiers.standard.is_none());
        assert!(tiers.luxe.is_some());
    }

    #[test]
    fn test_zero_or_garbage_rate_skipped() {
        let c = company(Some("0"), Some("n/a"), Some("4000"));
        let tiers = compute_price_tiers(&c, &filters(Some("800-1000"), None)).unwrap();

        assert!(tiers.basic.is_none());
        assert!(tiers.premium.is_none());
        assert!(tiers.luxe.is_some());
    }

    #[test]
    fn test_first_overlapping_tier_wins() {
        // basic 12-15 lakh, premium 20-25 lakh
        let c = company(Some("1500"), Some("2500"), None);
        let f = filters(Some("800-1000"), Some("10Lakh to 30Lakh"));
        let tiers = compute_price_tiers(&c, &f);

        let result = match_price_range(tiers.as_ref(), &f);
        assert!(result.matches);
        assert_eq!(result.tier, Some(Tier::Basic));
        assert_eq!(result.min, Some(1_200_000.0));
    }

    #[test]
    fn test_tier_covering_whole_budget_matches() {
        let c = company(None, Some("2500"), None);
        let f = filters(Some("800-1000"), Some("21Lakh to 22Lakh"));
        let tiers = compute_price_tiers(&c, &f);

        let result = match_price_range(tiers.as_ref(), &f);
        assert!(result.matches);
        assert_eq!(result.tier, Some(Tier::Premium));
    }

    #[test]
    fn test_unreasonable_budget() {
        // basic 12-15 lakh against a 1-3 lakh budget
        let c = company(Some("1500"), Some("2500"), None);
        let f = filters(Some("800-1000"), Some("1Lakh to 3Lakh"));
        let tiers = compute_price_tiers(&c, &f);

        let result = match_price_range(tiers.as_ref(), &f);
        assert!(!result.matches);
        assert_eq!(result.tier, Some(Tier::Basic));
        assert_eq!(result.smallest_diff, Some(1_100_000.0));
        assert!(result.unreasonable());
    }

    #[test]
    fn test_near_miss_is_not_unreasonable() {
        // basic 3.6-4.5 lakh against a 2-3 lakh budget: 60k above
        let c = company(Some("450"), None, None);
        let f = filters(Some("800-1000"), Some("2Lakh to 3Lakh"));
        let tiers = compute_price_tiers(&c, &f);

        let result = match_price_range(tiers.as_ref(), &f);
        assert!(!result.matches);
        assert_eq!(result.tier, Some(Tier::Basic));
        assert!(!result.unreasonable());
    }

    #[test]
    fn test_closest_tier_by_minimum() {
        // basic 0.8-1 lakh, luxe 40-50 lakh; budget 30-35 lakh
        let c = company(Some("100"), None, Some("5000"));
        let f = filters(Some("800-1000"), Some("30Lakh to 35Lakh"));
        let tiers = compute_price_tiers(&c, &f);

        let result = match_price_range(tiers.as_ref(), &f);
        assert!(!result.matches);
        assert_eq!(result.tier, Some(Tier::Luxe));
        assert!(result.unreasonable());
    }

    #[test]
    fn test_no_match_without_inputs() {
        let f = filters(Some("800-1000"), None);
        assert_eq!(match_price_range(None, &f), PriceMatch::none());

        let tiers = PriceTiers::default();
        assert_eq!(match_price_range(Some(&tiers), &f), PriceMatch::none());

        let bad = filters(Some("800-1000"), Some("whatever"));
        assert_eq!(match_price_range(Some(&tiers), &bad), PriceMatch::none());
    }
}
