use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use traffic_predictor::config::Config;
use traffic_predictor::server::{self, AppState};
use traffic_predictor::{loader, TrafficPredictor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = match std::env::var("TRAFFIC_CONFIG") {
        Ok(path) => Config::load(&path)
            .with_context(|| format!("failed to load config from {}", path))?
            .with_env(),
        Err(_) => Config::from_env(),
    };

    tracing::info!("starting traffic prediction server");
    let model = loader::load_model(&cfg);
    match &model {
        Some(m) => tracing::info!("prediction method: ML Model ({})", m.info.file_name),
        None => tracing::warn!("prediction method: Fallback (no model loaded)"),
    }

    let predictor = TrafficPredictor::new(model).with_prediction_logging(cfg.log_predictions);
    let state = AppState {
        predictor: Arc::new(predictor),
        window: cfg.history_window,
    };

    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
