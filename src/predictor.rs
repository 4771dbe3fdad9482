use serde::Serialize;
use tracing::{debug, info};

use crate::analytics::{self, ChartData, HistorySummary};
use crate::encoder;
use crate::fallback;
use crate::history::HistoryStore;
use crate::invoker;
use crate::model::{LoadedModel, ModelInfo};
use crate::pattern;
use crate::types::{now_ms, CategoricalInput, PredictionResult, PredictionSource};

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub model_loaded: bool,
    pub model_info: Option<ModelInfo>,
    pub history_count: usize,
}

/// Process-wide prediction state: the model picked at startup and the
/// shared history log. Share it behind an `Arc`.
pub struct TrafficPredictor {
    model: Option<LoadedModel>,
    history: HistoryStore,
    log_predictions: bool,
}

impl TrafficPredictor {
    pub fn new(model: Option<LoadedModel>) -> Self {
        Self {
            model,
            history: HistoryStore::new(),
            log_predictions: false,
        }
    }

    /// Log every encoded feature vector at info level.
    pub fn with_prediction_logging(mut self, on: bool) -> Self {
        self.log_predictions = on;
        self
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Never fails: without a usable model answer the fallback table
    /// supplies the base value. The result is recorded before returning.
    pub fn predict_day(&self, day: &str, season: &str, location: &str) -> PredictionResult {
        let input = CategoricalInput::resolve(day, season, location);

        let from_model = self.model.as_ref().and_then(|m| {
            let candidates = encoder::encode(&input);
            if self.log_predictions {
                info!(
                    "encoded day={} season={} location={} features={:?}",
                    input.day.name(),
                    input.season.name(),
                    input.location.name(),
                    candidates[0].values().as_slice()
                );
            }
            invoker::invoke(Some(&m.capability), &candidates)
        });

        let (base, source) = match from_model {
            Some(base) => (base, PredictionSource::Model),
            None => (fallback::fallback(&input), PredictionSource::Fallback),
        };
        debug!(source = source.label(), base, "base traffic value");

        let result = PredictionResult {
            hourly: pattern::expand(base, &input),
            input,
            source,
            base,
            timestamp_ms: now_ms(),
        };
        self.history.append(result.clone());
        result
    }

    pub fn history_summary(&self, window: usize) -> HistorySummary {
        analytics::summarize(&self.history.all(), window)
    }

    pub fn chart_data(&self) -> ChartData {
        analytics::chart_data(&self.history.all())
    }

    pub fn health(&self) -> Health {
        Health {
            model_loaded: self.model.is_some(),
            model_info: self.model.as_ref().map(|m| m.info.clone()),
            history_count: self.history.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ModelInput;
    use crate::error::ModelError;
    use crate::model::{DiscretePredictor, ModelCapability};
    use std::sync::Arc;

    struct AlwaysFails;

    impl DiscretePredictor for AlwaysFails {
        fn predict(&self, _input: &ModelInput) -> Result<Vec<f64>, ModelError> {
            Err(ModelError::Backend("boom".into()))
        }
    }

    struct FixedClass(f64);

    impl DiscretePredictor for FixedClass {
        fn predict(&self, _input: &ModelInput) -> Result<Vec<f64>, ModelError> {
            Ok(vec![self.0])
        }
    }

    fn loaded(cap: ModelCapability) -> LoadedModel {
        LoadedModel {
            capability: cap,
            info: ModelInfo {
                file_name: "stub.json".into(),
                file_size_mb: 0.0,
                model_type: "stub".into(),
            },
        }
    }

    #[test]
    fn test_no_model_uses_fallback() {
        let p = TrafficPredictor::new(None);
        let r = p.predict_day("Friday", "Summer", "East");
        assert_eq!(r.source, PredictionSource::Fallback);
        assert_eq!(r.hourly.len(), 13);
        assert_eq!(r.base, fallback::fallback(&r.input));
        assert_eq!(p.history().len(), 1);
    }

    #[test]
    fn test_model_path() {
        let p = TrafficPredictor::new(Some(loaded(ModelCapability::Discrete(Arc::new(FixedClass(2.0))))));
        let r = p.predict_day("Monday", "Spring", "East");
        assert_eq!(r.source, PredictionSource::Model);
        assert_eq!(r.base, 75.0);
    }

    #[test]
    fn test_failing_model_degrades_to_fallback() {
        let p = TrafficPredictor::new(Some(loaded(ModelCapability::Discrete(Arc::new(AlwaysFails)))));
        let r = p.predict_day("Saturday", "Winter", "South");
        assert_eq!(r.source, PredictionSource::Fallback);
        assert_eq!(r.hourly.len(), 13);
        assert_eq!(p.history().len(), 1);
    }

    #[test]
    fn test_health_reflects_state() {
        let p = TrafficPredictor::new(None);
        p.predict_day("Monday", "Spring", "East");
        let h = p.health();
        assert!(!h.model_loaded);
        assert!(h.model_info.is_none());
        assert_eq!(h.history_count, 1);
    }
}
