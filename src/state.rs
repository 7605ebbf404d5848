use std::sync::Arc;

use crate::data::aggregate::{GroupSummary, group_counts, group_summaries, sort_by_mean_desc};
use crate::data::filter::{FilterParams, filtered_indices};
use crate::data::model::{ListingDataset, RoomType};
use crate::data::predict::{InferenceRecord, LinearPriceModel, PricePredictor};

// ---------------------------------------------------------------------------
// Metric selector for the neighbourhood-stats panel
// ---------------------------------------------------------------------------

/// Listing attribute the stats panel aggregates, with its display label and
/// the column name the aggregation engine resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Accommodates,
    Bedrooms,
    Beds,
    Bathrooms,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Accommodates,
        Metric::Bedrooms,
        Metric::Beds,
        Metric::Bathrooms,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Accommodates => "Accommodates",
            Metric::Bedrooms => "Bedrooms",
            Metric::Beds => "Beds",
            Metric::Bathrooms => "Bathrooms",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Metric::Accommodates => "accommodates",
            Metric::Bedrooms => "bedrooms",
            Metric::Beds => "beds",
            Metric::Bathrooms => "bathrooms",
        }
    }
}

// ---------------------------------------------------------------------------
// Per-panel cached results
// ---------------------------------------------------------------------------

/// Listing counts per neighbourhood of one selected city.
#[derive(Debug, Default)]
pub struct CountsPanel {
    pub city: String,
    pub counts: Vec<(String, usize)>,
    pub total: usize,
}

/// Per-neighbourhood metric summaries of one selected city, sorted by
/// descending mean for the bar chart.
#[derive(Debug)]
pub struct StatsPanel {
    pub city: String,
    pub metric: Metric,
    pub summaries: Vec<GroupSummary>,
    pub total: usize,
}

impl Default for StatsPanel {
    fn default() -> Self {
        StatsPanel {
            city: String::new(),
            metric: Metric::Accommodates,
            summaries: Vec::new(),
            total: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction form
// ---------------------------------------------------------------------------

/// Current selections of the price-prediction form. Every model feature is
/// sourced from here; nothing is copied from dataset rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionForm {
    pub room_type: RoomType,
    pub city: String,
    pub neighbourhood: String,
    pub property_type: String,
    pub host_response_rate: String,
    pub accommodates: u32,
    pub bathrooms: f64,
    pub bedrooms: f64,
    pub beds: f64,
}

impl Default for PredictionForm {
    fn default() -> Self {
        PredictionForm {
            room_type: RoomType::EntireHomeApt,
            city: String::new(),
            neighbourhood: String::new(),
            property_type: String::new(),
            host_response_rate: String::new(),
            accommodates: 2,
            bathrooms: 1.0,
            bedrooms: 1.0,
            beds: 1.0,
        }
    }
}

impl PredictionForm {
    /// Seed the form from the dataset's derived lookup state: first city and
    /// its first neighbourhood, first property type and response rate, and
    /// mid-range numeric defaults.
    pub fn seeded(dataset: &ListingDataset) -> PredictionForm {
        let city = dataset.cities.first().cloned().unwrap_or_default();
        let neighbourhood = dataset
            .neighbourhoods_of(&city)
            .first()
            .cloned()
            .unwrap_or_default();
        let midpoint = |r: crate::data::model::ValueRange| (r.min + r.max) / 2.0;
        PredictionForm {
            room_type: RoomType::EntireHomeApt,
            city,
            neighbourhood,
            property_type: dataset.property_types.first().cloned().unwrap_or_default(),
            host_response_rate: dataset.response_rates.first().cloned().unwrap_or_default(),
            accommodates: midpoint(dataset.ranges.accommodates).round().max(1.0) as u32,
            bathrooms: midpoint(dataset.ranges.bathrooms).round(),
            bedrooms: midpoint(dataset.ranges.bedrooms).round(),
            beds: midpoint(dataset.ranges.beds).round(),
        }
    }

    /// Assemble the inference record from the current selections.
    pub fn record(&self) -> InferenceRecord {
        InferenceRecord {
            room_type: self.room_type,
            city: self.city.clone(),
            neighbourhood: self.neighbourhood.clone(),
            property_type: self.property_type.clone(),
            host_response_rate: self.host_response_rate.clone(),
            accommodates: self.accommodates,
            bathrooms: self.bathrooms,
            bedrooms: self.bedrooms,
            beds: self.beds,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The dataset is loaded once and held behind an `Arc`, never mutated; the
/// cached values below (visible indices, panel aggregates, last prediction)
/// are recomputed by the `set_*` methods that change their inputs, so a
/// plain frame redraw never recomputes anything.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<ListingDataset>>,

    /// Sidebar filter selections.
    pub filters: FilterParams,

    /// Indices of listings passing the sidebar filters (cached).
    pub visible_indices: Vec<usize>,

    /// Neighbourhood listing counts for a selected city.
    pub counts_panel: CountsPanel,

    /// Neighbourhood metric summaries for a selected city.
    pub stats_panel: StatsPanel,

    /// Price-prediction form selections.
    pub prediction_form: PredictionForm,

    /// Prediction adapter (None while no model artifact is loaded).
    pub predictor: Option<PricePredictor>,

    /// Why the prediction panel is disabled, when it is.
    pub model_error: Option<String>,

    /// Result for the last submitted inference record. Keyed by the record
    /// so failures are retried only when the form actually changes.
    last_prediction: Option<(InferenceRecord, Result<f64, String>)>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            filters: FilterParams::default(),
            visible_indices: Vec::new(),
            counts_panel: CountsPanel::default(),
            stats_panel: StatsPanel::default(),
            prediction_form: PredictionForm::default(),
            predictor: None,
            model_error: None,
            last_prediction: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: reset filters to their defaults,
    /// pick a default city for the per-city panels, seed the prediction
    /// form, and recompute every cache.
    pub fn set_dataset(&mut self, dataset: ListingDataset) {
        self.filters = FilterParams::sidebar_defaults(&dataset.ranges);
        let default_city = dataset
            .cities
            .iter()
            .find(|c| c.as_str() == "NYC")
            .or_else(|| dataset.cities.first())
            .cloned()
            .unwrap_or_default();
        self.counts_panel.city = default_city.clone();
        self.stats_panel.city = default_city;
        self.prediction_form = PredictionForm::seeded(&dataset);
        self.last_prediction = None;

        self.dataset = Some(Arc::new(dataset));
        self.refilter();
        self.recompute_counts();
        self.recompute_stats();
        self.status_message = None;
    }

    /// Install a freshly loaded model artifact.
    pub fn set_model(&mut self, model: LinearPriceModel) {
        self.predictor = Some(PricePredictor::new(Box::new(model)));
        self.model_error = None;
        self.last_prediction = None;
    }

    /// Recompute `visible_indices` after a sidebar filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filters);
        }
    }

    pub fn set_counts_city(&mut self, city: String) {
        self.counts_panel.city = city;
        self.recompute_counts();
    }

    pub fn set_stats_city(&mut self, city: String) {
        self.stats_panel.city = city;
        self.recompute_stats();
    }

    pub fn set_stats_metric(&mut self, metric: Metric) {
        self.stats_panel.metric = metric;
        self.recompute_stats();
    }

    fn recompute_counts(&mut self) {
        let Some(ds) = &self.dataset else { return };
        let city = self.counts_panel.city.clone();
        let rows = ds.listings.iter().filter(|l| l.city == city);
        match group_counts(rows, "neighbourhood") {
            Ok(counts) => {
                self.counts_panel.total =
                    ds.listings.iter().filter(|l| l.city == city).count();
                self.counts_panel.counts = counts;
            }
            Err(e) => {
                // Static wiring; reaching this is a programming error.
                log::error!("neighbourhood count aggregation: {e}");
                self.counts_panel.counts.clear();
                self.counts_panel.total = 0;
                self.status_message = Some(e.to_string());
            }
        }
    }

    fn recompute_stats(&mut self) {
        let Some(ds) = &self.dataset else { return };
        let city = self.stats_panel.city.clone();
        let metric = self.stats_panel.metric;
        let rows = ds.listings.iter().filter(|l| l.city == city);
        match group_summaries(rows, "neighbourhood", metric.column()) {
            Ok(mut summaries) => {
                sort_by_mean_desc(&mut summaries);
                self.stats_panel.total =
                    ds.listings.iter().filter(|l| l.city == city).count();
                self.stats_panel.summaries = summaries;
            }
            Err(e) => {
                log::error!("neighbourhood stats aggregation: {e}");
                self.stats_panel.summaries.clear();
                self.stats_panel.total = 0;
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Predicted price for the current form, recomputed only when the form
    /// changes. A failed prediction is held until the user adjusts an
    /// input, then retried.
    pub fn prediction(&mut self) -> Option<Result<f64, String>> {
        let predictor = self.predictor.as_mut()?;
        let record = self.prediction_form.record();
        let stale = self
            .last_prediction
            .as_ref()
            .is_none_or(|(prev, _)| *prev != record);
        if stale {
            let result = predictor.predict(&record).map_err(|e| {
                log::warn!("prediction failed: {e}");
                e.to_string()
            });
            self.last_prediction = Some((record, result));
        }
        self.last_prediction.as_ref().map(|(_, r)| r.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ListingDataset;
    use crate::data::model::tests::listing;

    fn dataset() -> ListingDataset {
        ListingDataset::from_listings(vec![
            listing(1, "Boston", "Fenway", 90.0),
            listing(2, "NYC", "Harlem", 120.0),
            listing(3, "NYC", "Chelsea", 150.0),
        ])
    }

    #[test]
    fn test_set_dataset_initializes_caches() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        // Defaults keep every row visible: all rows share the default room
        // type and the ranges span the observed bounds.
        assert_eq!(state.visible_indices, vec![0, 1, 2]);

        // NYC is preferred as the default city when present.
        assert_eq!(state.counts_panel.city, "NYC");
        assert_eq!(state.counts_panel.total, 2);
        assert_eq!(state.counts_panel.counts.len(), 2);
        assert_eq!(state.stats_panel.summaries.len(), 2);
    }

    #[test]
    fn test_city_change_recomputes_counts() {
        let mut state = AppState::default();
        state.set_dataset(dataset());

        state.set_counts_city("Boston".to_string());
        assert_eq!(state.counts_panel.total, 1);
        assert_eq!(state.counts_panel.counts, vec![("Fenway".to_string(), 1)]);
    }

    #[test]
    fn test_prediction_requires_a_model() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        assert!(state.prediction().is_none());
    }
}
