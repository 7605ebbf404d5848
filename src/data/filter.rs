use super::model::{Listing, ListingDataset, ObservedRanges, RoomType, ValueRange};

// ---------------------------------------------------------------------------
// Filter predicates: categorical equality + inclusive numeric ranges
// ---------------------------------------------------------------------------

/// Closed numeric range predicate: `low <= value <= high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub low: f64,
    pub high: f64,
}

impl RangeFilter {
    /// Normalizing constructor. Bounds given in reverse order are swapped,
    /// so `low <= high` always holds.
    pub fn new(a: f64, b: f64) -> RangeFilter {
        if a <= b {
            RangeFilter { low: a, high: b }
        } else {
            RangeFilter { low: b, high: a }
        }
    }

    /// Full observed span of a column (the "no restriction" slider state).
    pub fn spanning(range: ValueRange) -> RangeFilter {
        RangeFilter::new(range.min, range.max)
    }

    pub fn contains(self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Immutable snapshot of the current filter selections.
///
/// Every predicate is optional; the present ones are combined with AND,
/// never OR. The sidebar produces a room-type equality plus four ranges;
/// the per-city chart panels produce a city equality alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterParams {
    pub room_type: Option<RoomType>,
    pub city: Option<String>,
    pub price: Option<RangeFilter>,
    pub bedrooms: Option<RangeFilter>,
    pub beds: Option<RangeFilter>,
    pub reviews: Option<RangeFilter>,
}

impl FilterParams {
    /// Initial sidebar state: the default room type selected and every
    /// range spanning its observed bounds, so the first render shows all
    /// listings of that room type.
    pub fn sidebar_defaults(ranges: &ObservedRanges) -> FilterParams {
        FilterParams {
            room_type: Some(RoomType::EntireHomeApt),
            city: None,
            price: Some(RangeFilter::spanning(ranges.price)),
            bedrooms: Some(RangeFilter::spanning(ranges.bedrooms)),
            beds: Some(RangeFilter::spanning(ranges.beds)),
            reviews: Some(RangeFilter::spanning(ranges.reviews)),
        }
    }

    /// A city equality with no other predicates.
    pub fn city_only(city: &str) -> FilterParams {
        FilterParams {
            city: Some(city.to_string()),
            ..FilterParams::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Whether a single listing satisfies every present predicate.
///
/// A listing with a missing value in a filtered column fails that
/// predicate: null never compares equal and never falls inside a range.
pub fn matches(listing: &Listing, params: &FilterParams) -> bool {
    if let Some(rt) = params.room_type {
        if listing.room_type != rt {
            return false;
        }
    }
    if let Some(city) = &params.city {
        if listing.city != *city {
            return false;
        }
    }
    if let Some(r) = params.price {
        if !r.contains(listing.price) {
            return false;
        }
    }
    if let Some(r) = params.bedrooms {
        if !listing.bedrooms.is_some_and(|v| r.contains(v)) {
            return false;
        }
    }
    if let Some(r) = params.beds {
        if !listing.beds.is_some_and(|v| r.contains(v)) {
            return false;
        }
    }
    if let Some(r) = params.reviews {
        if !r.contains(listing.number_of_reviews as f64) {
            return false;
        }
    }
    true
}

/// Return indices of listings passing all predicates, in input order.
///
/// Pure function of `(dataset, params)`; the output is always a stable
/// subsequence of `0..dataset.len()`.
pub fn filtered_indices(dataset: &ListingDataset, params: &FilterParams) -> Vec<usize> {
    dataset
        .listings
        .iter()
        .enumerate()
        .filter(|(_, l)| matches(l, params))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::listing;

    fn price_table() -> ListingDataset {
        ListingDataset::from_listings(vec![
            listing(1, "NYC", "Harlem", 50.0),
            listing(2, "NYC", "Chelsea", 100.0),
            listing(3, "SF", "Mission", 150.0),
        ])
    }

    #[test]
    fn test_price_range_keeps_matching_rows_in_order() {
        let ds = price_table();
        let params = FilterParams {
            price: Some(RangeFilter::new(60.0, 200.0)),
            ..FilterParams::default()
        };
        // Rows 2 and 3 match, in original order.
        assert_eq!(filtered_indices(&ds, &params), vec![1, 2]);
    }

    #[test]
    fn test_no_predicates_returns_everything() {
        let ds = price_table();
        assert_eq!(filtered_indices(&ds, &FilterParams::default()), vec![0, 1, 2]);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let ds = price_table();
        let params = FilterParams {
            price: Some(RangeFilter::new(50.0, 100.0)),
            ..FilterParams::default()
        };
        assert_eq!(filtered_indices(&ds, &params), vec![0, 1]);
    }

    #[test]
    fn test_conjunction_never_or() {
        let ds = price_table();
        // City NYC AND price >= 60: only row 2 satisfies both.
        let params = FilterParams {
            city: Some("NYC".to_string()),
            price: Some(RangeFilter::new(60.0, 1000.0)),
            ..FilterParams::default()
        };
        assert_eq!(filtered_indices(&ds, &params), vec![1]);
    }

    #[test]
    fn test_city_equality_is_exact() {
        let ds = price_table();
        assert!(filtered_indices(&ds, &FilterParams::city_only("NY")).is_empty());
        assert_eq!(
            filtered_indices(&ds, &FilterParams::city_only("NYC")),
            vec![0, 1]
        );
    }

    #[test]
    fn test_missing_values_fail_their_predicate() {
        let mut rows = vec![
            listing(1, "NYC", "Harlem", 50.0),
            listing(2, "NYC", "Chelsea", 60.0),
        ];
        rows[0].bedrooms = None;
        let ds = ListingDataset::from_listings(rows);

        let with_bedrooms = FilterParams {
            bedrooms: Some(RangeFilter::new(0.0, 10.0)),
            ..FilterParams::default()
        };
        assert_eq!(filtered_indices(&ds, &with_bedrooms), vec![1]);

        // Without a bedrooms predicate the null row passes.
        assert_eq!(
            filtered_indices(&ds, &FilterParams::default()),
            vec![0, 1]
        );
    }

    #[test]
    fn test_sequential_filters_equal_conjunction() {
        let mut rows = vec![
            listing(1, "NYC", "Harlem", 50.0),
            listing(2, "NYC", "Chelsea", 100.0),
            listing(3, "SF", "Mission", 150.0),
            listing(4, "SF", "Castro", 90.0),
        ];
        rows[2].room_type = RoomType::PrivateRoom;
        let ds = ListingDataset::from_listings(rows);

        let p1 = FilterParams {
            price: Some(RangeFilter::new(60.0, 200.0)),
            ..FilterParams::default()
        };
        let p2 = FilterParams {
            room_type: Some(RoomType::EntireHomeApt),
            ..FilterParams::default()
        };
        let both = FilterParams {
            price: p1.price,
            room_type: p2.room_type,
            ..FilterParams::default()
        };

        let sequential: Vec<usize> = filtered_indices(&ds, &p1)
            .into_iter()
            .filter(|&i| matches(&ds.listings[i], &p2))
            .collect();
        assert_eq!(sequential, filtered_indices(&ds, &both));
    }

    #[test]
    fn test_range_filter_normalizes_reversed_bounds() {
        let r = RangeFilter::new(10.0, 2.0);
        assert_eq!(r.low, 2.0);
        assert_eq!(r.high, 10.0);
        assert!(r.contains(2.0));
        assert!(r.contains(10.0));
        assert!(!r.contains(1.9));
    }
}
