use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::RequestError;
use crate::predictor::TrafficPredictor;
use crate::types::{DayOfWeek, HourlyRecord, Location, PredictionResult, Season};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<TrafficPredictor>,
    pub window: usize, // analytics window
}

// ---------- Request/Response types ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictRequest {
    pub day_of_week: String,
    pub season: String,
    pub location: String,
}

fn string_field(
    obj: &serde_json::Map<String, Value>,
    key: &'static str,
    default: &str,
) -> Result<String, RequestError> {
    match obj.get(key) {
        None => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(RequestError::InvalidField(key)),
    }
}

impl PredictRequest {
    /// Absent, empty or non-object bodies count as "no input". Missing
    /// keys fall back to Monday / Spring / East; a present key must hold a
    /// string, `null` included.
    pub fn from_body(body: Option<Value>) -> Result<Self, RequestError> {
        let obj = match body {
            Some(Value::Object(obj)) if !obj.is_empty() => obj,
            _ => return Err(RequestError::MissingInput),
        };
        Ok(Self {
            day_of_week: string_field(&obj, "day_of_week", "Monday")?,
            season: string_field(&obj, "season", "Spring")?,
            location: string_field(&obj, "location", "East")?,
        })
    }
}

#[derive(Serialize)]
pub struct PredictionView {
    pub day_of_week: &'static str,
    pub season: &'static str,
    pub location: &'static str,
    pub hourly_predictions: Vec<HourlyRecord>,
    pub total_hours: usize,
    pub peak_hours: Vec<u8>,
    pub heavy_traffic_hours: Vec<u8>,
    pub timestamp_ms: i64,
}

impl From<&PredictionResult> for PredictionView {
    fn from(r: &PredictionResult) -> Self {
        Self {
            day_of_week: r.input.day.name(),
            season: r.input.season.name(),
            location: r.input.location.name(),
            hourly_predictions: r.hourly.clone(),
            total_hours: r.hourly.len(),
            peak_hours: r.peak_hours(),
            heavy_traffic_hours: r.heavy_hours(),
            timestamp_ms: r.timestamp_ms,
        }
    }
}

/// `{}` when no model is loaded.
fn model_info_json(predictor: &TrafficPredictor) -> Value {
    predictor
        .model()
        .map_or_else(|| json!({}), |m| json!(m.info))
}

fn failure(msg: impl ToString) -> Json<Value> {
    Json(json!({ "success": false, "error": msg.to_string() }))
}

// ---------- Handlers ----------

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let h = state.predictor.health();
    Json(json!({
        "status": "healthy",
        "model_loaded": h.model_loaded,
        "model_info": model_info_json(&state.predictor),
        "prediction_method": if h.model_loaded { "ML Model" } else { "Fallback" },
        "prediction_history_count": h.history_count,
        "available_days": DayOfWeek::ALL.map(DayOfWeek::name),
        "available_seasons": Season::ALL.map(Season::name),
        "available_locations": Location::ALL.map(Location::name),
    }))
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Json<Value> {
    let body = payload.ok().map(|Json(v)| v);
    let req = match PredictRequest::from_body(body) {
        Ok(req) => req,
        Err(e) => return failure(e),
    };

    // The model call may be slow; keep it off the async workers
    let predictor = Arc::clone(&state.predictor);
    let joined = tokio::task::spawn_blocking(move || {
        predictor.predict_day(&req.day_of_week, &req.season, &req.location)
    })
    .await;

    match joined {
        Ok(result) => Json(json!({
            "success": true,
            "prediction": PredictionView::from(&result),
            "model_used": result.source.label(),
        })),
        Err(e) => {
            tracing::error!("prediction task failed: {}", e);
            failure("Prediction failed")
        }
    }
}

pub async fn analytics_dashboard(State(state): State<AppState>) -> Json<Value> {
    let summary = state.predictor.history_summary(state.window);
    Json(json!({
        "success": true,
        "analytics": summary,
        "model_info": model_info_json(&state.predictor),
        "timestamp_ms": crate::types::now_ms(),
    }))
}

pub async fn graphs(State(state): State<AppState>) -> Json<Value> {
    let chart = state.predictor.chart_data();
    Json(json!({
        "success": true,
        "chart": chart,
        "prediction_count": state.predictor.history().len(),
        "timestamp_ms": crate::types::now_ms(),
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/analytics-dashboard", get(analytics_dashboard))
        .route("/graphs", get(graphs))
        .with_state(state)
}
