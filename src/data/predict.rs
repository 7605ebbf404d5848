use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::error::DataError;
use super::model::RoomType;

// ---------------------------------------------------------------------------
// InferenceRecord – the single feature row submitted to the model
// ---------------------------------------------------------------------------

/// One inference input. Every feature the model consumes is enumerated here
/// and sourced from the prediction form — nothing is copied from dataset
/// rows.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRecord {
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

impl Eq for InferenceRecord {}

// f64 fields hash by bit pattern so full record contents can key the memo.
impl Hash for InferenceRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.room_type.hash(state);
        self.city.hash(state);
        self.neighbourhood.hash(state);
        self.property_type.hash(state);
        self.host_response_rate.hash(state);
        self.accommodates.hash(state);
        self.bathrooms.to_bits().hash(state);
        self.bedrooms.to_bits().hash(state);
        self.beds.to_bits().hash(state);
    }
}

impl InferenceRecord {
    /// Look up a numeric feature by the name the model artifact uses.
    fn numeric_feature(&self, name: &str) -> Option<f64> {
        match name {
            "accommodates" => Some(self.accommodates as f64),
            "bathrooms" => Some(self.bathrooms),
            "bedrooms" => Some(self.bedrooms),
            "beds" => Some(self.beds),
            _ => None,
        }
    }

    /// Look up a categorical feature by the name the model artifact uses.
    fn categorical_feature(&self, name: &str) -> Option<&str> {
        match name {
            "room_type" => Some(self.room_type.label()),
            "city" => Some(&self.city),
            "neighbourhood" => Some(&self.neighbourhood),
            "property_type" => Some(&self.property_type),
            "host_response_rate" => Some(&self.host_response_rate),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RegressionModel – the opaque pre-trained collaborator
// ---------------------------------------------------------------------------

/// A pre-trained regression model: one operation, record → predicted price.
pub trait RegressionModel {
    fn predict(&self, record: &InferenceRecord) -> Result<f64, DataError>;
}

/// The on-disk model artifact: a linear regression serialized as JSON, with
/// an intercept, one weight per numeric feature, and one weight per level
/// of each categorical feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPriceModel {
    pub intercept: f64,
    pub numeric: BTreeMap<String, f64>,
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

impl RegressionModel for LinearPriceModel {
    /// A feature the record cannot supply, or a categorical level the model
    /// has no weight for, is a schema mismatch.
    fn predict(&self, record: &InferenceRecord) -> Result<f64, DataError> {
        let mut total = self.intercept;

        for (name, weight) in &self.numeric {
            let v = record.numeric_feature(name).ok_or_else(|| {
                DataError::InferenceError(format!("record has no numeric feature '{name}'"))
            })?;
            total += weight * v;
        }

        for (name, levels) in &self.categorical {
            let value = record.categorical_feature(name).ok_or_else(|| {
                DataError::InferenceError(format!("record has no categorical feature '{name}'"))
            })?;
            let weight = levels.get(value).ok_or_else(|| {
                DataError::InferenceError(format!("model has no weight for {name} = '{value}'"))
            })?;
            total += *weight;
        }

        Ok(total)
    }
}

/// Load the model artifact from disk.
pub fn load_price_model(path: &Path) -> Result<LinearPriceModel, DataError> {
    let run = || -> Result<LinearPriceModel> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("opening {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    };
    run().map_err(|e| DataError::ModelUnavailable(format!("{e:#}")))
}

// ---------------------------------------------------------------------------
// PricePredictor – memoized adapter around the model
// ---------------------------------------------------------------------------

/// Prediction adapter: submits records to the model and memoizes results by
/// the record's full contents, so redrawing the form every frame never hits
/// the model twice for the same inputs. Failed predictions are not cached;
/// the user can adjust the form and retry.
pub struct PricePredictor {
    model: Box<dyn RegressionModel>,
    cache: HashMap<InferenceRecord, f64>,
}

impl PricePredictor {
    pub fn new(model: Box<dyn RegressionModel>) -> PricePredictor {
        PricePredictor {
            model,
            cache: HashMap::new(),
        }
    }

    pub fn predict(&mut self, record: &InferenceRecord) -> Result<f64, DataError> {
        if let Some(&price) = self.cache.get(record) {
            return Ok(price);
        }
        let price = self.model.predict(record)?;
        self.cache.insert(record.clone(), price);
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn record() -> InferenceRecord {
        InferenceRecord {
            room_type: RoomType::PrivateRoom,
            city: "SF".to_string(),
            neighbourhood: "Mission".to_string(),
            property_type: "Apartment".to_string(),
            host_response_rate: "100%".to_string(),
            accommodates: 2,
            bathrooms: 1.0,
            bedrooms: 1.0,
            beds: 1.0,
        }
    }

    /// Stub that echoes `accommodates * 100`.
    struct EchoModel;

    impl RegressionModel for EchoModel {
        fn predict(&self, record: &InferenceRecord) -> Result<f64, DataError> {
            Ok(record.accommodates as f64 * 100.0)
        }
    }

    /// Stub that counts how often the model is actually consulted.
    struct CountingModel {
        calls: Rc<Cell<usize>>,
    }

    impl RegressionModel for CountingModel {
        fn predict(&self, _record: &InferenceRecord) -> Result<f64, DataError> {
            self.calls.set(self.calls.get() + 1);
            Ok(42.0)
        }
    }

    fn small_model() -> LinearPriceModel {
        let mut numeric = BTreeMap::new();
        numeric.insert("accommodates".to_string(), 10.0);
        numeric.insert("bedrooms".to_string(), 5.0);

        let mut room_type = BTreeMap::new();
        room_type.insert("Entire home/apt".to_string(), 50.0);
        room_type.insert("Private room".to_string(), 20.0);
        room_type.insert("Shared room".to_string(), 5.0);

        let mut city = BTreeMap::new();
        city.insert("SF".to_string(), 30.0);
        city.insert("NYC".to_string(), 40.0);

        let mut categorical = BTreeMap::new();
        categorical.insert("room_type".to_string(), room_type);
        categorical.insert("city".to_string(), city);

        LinearPriceModel {
            intercept: 7.0,
            numeric,
            categorical,
        }
    }

    #[test]
    fn test_stub_model_echoes_accommodates() {
        let mut predictor = PricePredictor::new(Box::new(EchoModel));
        let price = predictor.predict(&record()).unwrap();
        assert_eq!(price, 200.0);
    }

    #[test]
    fn test_identical_records_hit_the_cache() {
        let calls = Rc::new(Cell::new(0));
        let mut predictor = PricePredictor::new(Box::new(CountingModel {
            calls: Rc::clone(&calls),
        }));

        let a = record();
        let b = record(); // separate allocation, identical contents
        predictor.predict(&a).unwrap();
        predictor.predict(&b).unwrap();
        assert_eq!(calls.get(), 1);

        let mut c = record();
        c.accommodates = 3;
        predictor.predict(&c).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_linear_model_prediction() {
        let model = small_model();
        let mut rec = record();
        rec.room_type = RoomType::EntireHomeApt;
        rec.city = "NYC".to_string();
        rec.accommodates = 4;
        rec.bedrooms = 2.0;

        // 7 + 10*4 + 5*2 + 50 + 40
        let price = model.predict(&rec).unwrap();
        assert_eq!(price, 147.0);
    }

    #[test]
    fn test_unknown_categorical_level_is_inference_error() {
        let model = small_model();
        let mut rec = record();
        rec.city = "Atlantis".to_string();
        let err = model.predict(&rec).unwrap_err();
        assert!(matches!(err, DataError::InferenceError(_)));
    }

    #[test]
    fn test_unknown_feature_name_is_inference_error() {
        let mut model = small_model();
        model
            .numeric
            .insert("swimming_pools".to_string(), 3.0);
        let err = model.predict(&record()).unwrap_err();
        assert!(matches!(err, DataError::InferenceError(_)));
    }

    #[test]
    fn test_missing_artifact_is_model_unavailable() {
        let err = load_price_model(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, DataError::ModelUnavailable(_)));
    }

    #[test]
    fn test_artifact_round_trip() {
        let model = small_model();
        let json = serde_json::to_string_pretty(&model).unwrap();
        let parsed: LinearPriceModel = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, model);
    }
}
