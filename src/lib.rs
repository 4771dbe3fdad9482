//! Traffic-volume prediction service: hourly traffic profiles for a day of
//! week, season and location, from a loaded model when one answers and from
//! a deterministic heuristic otherwise.

pub mod analytics;
pub mod config;
pub mod encoder;
pub mod error;
pub mod fallback;
pub mod history;
pub mod invoker;
pub mod loader;
pub mod model;
pub mod pattern;
pub mod predictor;
pub mod server;
pub mod types;

pub use predictor::TrafficPredictor;
pub use types::{CategoricalInput, HourlyRecord, PredictionResult, PredictionSource, TrafficLevel};
