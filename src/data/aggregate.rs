use std::collections::HashMap;

use super::error::DataError;
use super::model::Listing;

// ---------------------------------------------------------------------------
// Group-by aggregation: count / mean / median / min / max per group
// ---------------------------------------------------------------------------

/// Summary statistics of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// The group label (a value of the group-by column).
    pub key: String,
    /// Number of rows in the group.
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Categorical columns a request may group by.
#[derive(Debug, Clone, Copy, PartialEq)]
enum GroupColumn {
    City,
    Neighbourhood,
    RoomType,
    PropertyType,
    HostResponseRate,
}

impl GroupColumn {
    fn parse(name: &str) -> Result<GroupColumn, DataError> {
        match name {
            "city" => Ok(GroupColumn::City),
            "neighbourhood" => Ok(GroupColumn::Neighbourhood),
            "room_type" => Ok(GroupColumn::RoomType),
            "property_type" => Ok(GroupColumn::PropertyType),
            "host_response_rate" => Ok(GroupColumn::HostResponseRate),
            "id" | "price" | "accommodates" | "bathrooms" | "bedrooms" | "beds"
            | "number_of_reviews" | "latitude" | "longitude" => Err(DataError::InvalidColumn(
                format!("cannot group by numeric column '{name}'"),
            )),
            _ => Err(DataError::InvalidColumn(format!("no such column '{name}'"))),
        }
    }

    /// The group key of a row, `None` when the value is missing.
    fn key<'a>(self, l: &'a Listing) -> Option<&'a str> {
        match self {
            GroupColumn::City => Some(&l.city),
            GroupColumn::Neighbourhood => l.neighbourhood.as_deref(),
            GroupColumn::RoomType => Some(l.room_type.label()),
            GroupColumn::PropertyType => Some(&l.property_type),
            GroupColumn::HostResponseRate => l.host_response_rate.as_deref(),
        }
    }
}

/// Numeric columns a request may aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
enum MetricColumn {
    Id,
    Price,
    Accommodates,
    Bathrooms,
    Bedrooms,
    Beds,
    Reviews,
    Latitude,
    Longitude,
}

impl MetricColumn {
    fn parse(name: &str) -> Result<MetricColumn, DataError> {
        match name {
            "id" => Ok(MetricColumn::Id),
            "price" => Ok(MetricColumn::Price),
            "accommodates" => Ok(MetricColumn::Accommodates),
            "bathrooms" => Ok(MetricColumn::Bathrooms),
            "bedrooms" => Ok(MetricColumn::Bedrooms),
            "beds" => Ok(MetricColumn::Beds),
            "number_of_reviews" => Ok(MetricColumn::Reviews),
            "latitude" => Ok(MetricColumn::Latitude),
            "longitude" => Ok(MetricColumn::Longitude),
            "city" | "neighbourhood" | "room_type" | "property_type"
            | "host_response_rate" | "name" => Err(DataError::InvalidColumn(format!(
                "column '{name}' is not numeric"
            ))),
            _ => Err(DataError::InvalidColumn(format!("no such column '{name}'"))),
        }
    }

    /// The metric value of a row, `None` when the value is missing.
    fn value(self, l: &Listing) -> Option<f64> {
        match self {
            MetricColumn::Id => Some(l.id as f64),
            MetricColumn::Price => Some(l.price),
            MetricColumn::Accommodates => Some(l.accommodates as f64),
            MetricColumn::Bathrooms => l.bathrooms,
            MetricColumn::Bedrooms => l.bedrooms,
            MetricColumn::Beds => l.beds,
            MetricColumn::Reviews => Some(l.number_of_reviews as f64),
            MetricColumn::Latitude => Some(l.latitude),
            MetricColumn::Longitude => Some(l.longitude),
        }
    }
}

/// Group `rows` by the distinct values of `group_by` and summarize `metric`
/// per group.
///
/// Rows with a missing group key are skipped. Groups appear in
/// first-encountered input order; only groups present in the input are
/// emitted. `count` is the group's row count; the statistics are computed
/// over the group's non-missing metric values, and a group whose metric
/// values are all missing is omitted.
pub fn group_summaries<'a, I>(
    rows: I,
    group_by: &str,
    metric: &str,
) -> Result<Vec<GroupSummary>, DataError>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let group_col = GroupColumn::parse(group_by)?;
    let metric_col = MetricColumn::parse(metric)?;

    // Vec keeps first-encounter order; the map locates a group's slot.
    let mut order: Vec<(String, usize, Vec<f64>)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for l in rows {
        let Some(key) = group_col.key(l) else {
            continue;
        };
        let slot = match slots.get(key) {
            Some(&i) => i,
            None => {
                slots.insert(key.to_string(), order.len());
                order.push((key.to_string(), 0, Vec::new()));
                order.len() - 1
            }
        };
        order[slot].1 += 1;
        if let Some(v) = metric_col.value(l) {
            order[slot].2.push(v);
        }
    }

    Ok(order
        .into_iter()
        .filter(|(_, _, values)| !values.is_empty())
        .map(|(key, count, mut values)| {
            values.sort_by(f64::total_cmp);
            GroupSummary {
                key,
                count,
                mean: mean(&values),
                median: median_of_sorted(&values),
                min: values[0],
                max: values[values.len() - 1],
            }
        })
        .collect())
}

/// Count rows per distinct group value, in first-encountered input order.
pub fn group_counts<'a, I>(rows: I, group_by: &str) -> Result<Vec<(String, usize)>, DataError>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let group_col = GroupColumn::parse(group_by)?;

    let mut order: Vec<(String, usize)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for l in rows {
        let Some(key) = group_col.key(l) else {
            continue;
        };
        match slots.get(key) {
            Some(&i) => order[i].1 += 1,
            None => {
                slots.insert(key.to_string(), order.len());
                order.push((key.to_string(), 1));
            }
        }
    }

    Ok(order)
}

/// Sort summaries by descending mean for chart ordering.
///
/// The sort is stable, so groups with equal means keep their
/// first-encountered input order. This is the only nontrivial ordering
/// policy in the dashboard.
pub fn sort_by_mean_desc(summaries: &mut [GroupSummary]) {
    summaries.sort_by(|a, b| b.mean.total_cmp(&a.mean));
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of an already-sorted slice; even sizes average the two middles.
fn median_of_sorted(values: &[f64]) -> f64 {
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::listing;
    use crate::data::model::Listing;

    fn with_accommodates(id: u64, city: &str, accommodates: u32) -> Listing {
        let mut l = listing(id, city, "Downtown", 100.0);
        l.accommodates = accommodates;
        l
    }

    #[test]
    fn test_group_by_city_statistics() {
        let rows = vec![
            with_accommodates(1, "NYC", 2),
            with_accommodates(2, "NYC", 4),
            with_accommodates(3, "SF", 10),
        ];
        let summaries =
            group_summaries(rows.iter(), "city", "accommodates").unwrap();

        assert_eq!(summaries.len(), 2);
        let nyc = &summaries[0];
        assert_eq!(nyc.key, "NYC");
        assert_eq!(nyc.count, 2);
        assert_eq!(nyc.mean, 3.0);
        assert_eq!(nyc.median, 3.0);
        assert_eq!(nyc.min, 2.0);
        assert_eq!(nyc.max, 4.0);

        let sf = &summaries[1];
        assert_eq!(sf.key, "SF");
        assert_eq!(sf.mean, 10.0);
        assert_eq!(sf.min, 10.0);
        assert_eq!(sf.max, 10.0);
    }

    #[test]
    fn test_group_sizes_sum_to_non_null_key_rows() {
        let mut rows = vec![
            listing(1, "NYC", "Harlem", 80.0),
            listing(2, "NYC", "Harlem", 90.0),
            listing(3, "NYC", "Chelsea", 70.0),
            listing(4, "SF", "Mission", 60.0),
        ];
        rows.push(listing(5, "SF", "Mission", 65.0));
        rows[4].neighbourhood = None; // null key, skipped

        let summaries =
            group_summaries(rows.iter(), "neighbourhood", "price").unwrap();

        let total: usize = summaries.iter().map(|s| s.count).sum();
        let non_null_keys = rows.iter().filter(|l| l.neighbourhood.is_some()).count();
        assert_eq!(total, non_null_keys);

        for s in &summaries {
            assert!(s.min <= s.mean && s.mean <= s.max);
        }
    }

    #[test]
    fn test_first_encounter_order_and_stable_mean_sort() {
        let rows = vec![
            with_accommodates(1, "SF", 4),
            with_accommodates(2, "NYC", 4),
            with_accommodates(3, "Boston", 8),
        ];
        let mut summaries =
            group_summaries(rows.iter(), "city", "accommodates").unwrap();

        // First-encounter order before sorting.
        let keys: Vec<&str> = summaries.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["SF", "NYC", "Boston"]);

        // Descending mean; the SF/NYC tie keeps input order.
        sort_by_mean_desc(&mut summaries);
        let keys: Vec<&str> = summaries.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["Boston", "SF", "NYC"]);
    }

    #[test]
    fn test_even_sized_group_median_averages_middles() {
        let rows = vec![
            with_accommodates(1, "NYC", 1),
            with_accommodates(2, "NYC", 2),
            with_accommodates(3, "NYC", 3),
            with_accommodates(4, "NYC", 10),
        ];
        let summaries =
            group_summaries(rows.iter(), "city", "accommodates").unwrap();
        assert_eq!(summaries[0].median, 2.5);
    }

    #[test]
    fn test_missing_metric_values_are_skipped() {
        let mut rows = vec![
            listing(1, "NYC", "Harlem", 80.0),
            listing(2, "NYC", "Harlem", 90.0),
            listing(3, "NYC", "Chelsea", 70.0),
        ];
        rows[1].bedrooms = None;
        rows[2].bedrooms = None; // Chelsea has no observations at all

        let summaries =
            group_summaries(rows.iter(), "neighbourhood", "bedrooms").unwrap();

        // Harlem keeps its row count but aggregates one observation;
        // Chelsea is omitted entirely.
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].key, "Harlem");
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[0].mean, 1.0);
    }

    #[test]
    fn test_invalid_columns_are_rejected() {
        let rows = vec![listing(1, "NYC", "Harlem", 80.0)];

        let err = group_summaries(rows.iter(), "city", "no_such").unwrap_err();
        assert!(matches!(err, DataError::InvalidColumn(_)));

        let err = group_summaries(rows.iter(), "city", "room_type").unwrap_err();
        assert!(matches!(err, DataError::InvalidColumn(_)));

        let err = group_summaries(rows.iter(), "bogus", "price").unwrap_err();
        assert!(matches!(err, DataError::InvalidColumn(_)));

        let err = group_summaries(rows.iter(), "price", "price").unwrap_err();
        assert!(matches!(err, DataError::InvalidColumn(_)));
    }

    #[test]
    fn test_group_counts_in_input_order() {
        let rows = vec![
            listing(1, "NYC", "Harlem", 80.0),
            listing(2, "NYC", "Chelsea", 90.0),
            listing(3, "NYC", "Harlem", 70.0),
        ];
        let counts = group_counts(rows.iter(), "neighbourhood").unwrap();
        assert_eq!(
            counts,
            vec![("Harlem".to_string(), 2), ("Chelsea".to_string(), 1)]
        );
    }
}
