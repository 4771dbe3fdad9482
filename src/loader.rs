//! Model provider: finds a model file next to the service and turns it into
//! a [`LoadedModel`] with its capability fixed up front.

use anyhow::Context;
use std::{fs, path::Path};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::LoadError;
use crate::model::{LinearModel, LinearModelDef, LoadedModel, ModelInfo};

/// Probed in order; the first one that loads wins.
pub fn candidate_files() -> Vec<&'static str> {
    let mut files = vec!["traffic_predictor.json", "traffic_model.json", "model.json"];
    if cfg!(feature = "torch") {
        files.extend(["traffic_predictor.pt", "traffic_model.pt", "model.pt"]);
    }
    files
}

fn file_size_mb(path: &Path) -> Result<f64, LoadError> {
    let meta = fs::metadata(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(meta.len() as f64 / (1024.0 * 1024.0))
}

fn load_json(path: &Path) -> Result<LoadedModel, LoadError> {
    let txt = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let def: LinearModelDef = serde_json::from_str(&txt).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let (model, output) = LinearModel::from_def(def)?;
    let capability = model.into_capability(output);
    Ok(LoadedModel {
        info: ModelInfo {
            file_name: file_name(path),
            file_size_mb: file_size_mb(path)?,
            model_type: format!("LinearModel<{}>", capability.kind()),
        },
        capability,
    })
}

#[cfg(feature = "torch")]
fn load_torch(path: &Path) -> Result<LoadedModel, LoadError> {
    use crate::model::{torch::TorchModel, ModelCapability};
    use std::sync::Arc;

    let model = TorchModel::load(path)?;
    Ok(LoadedModel {
        capability: ModelCapability::Probability(Arc::new(model)),
        info: ModelInfo {
            file_name: file_name(path),
            file_size_mb: file_size_mb(path)?,
            model_type: "TorchScript".to_string(),
        },
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Loads one model file, picking the format from its extension.
pub fn load_file(path: &Path) -> Result<LoadedModel, LoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        #[cfg(feature = "torch")]
        Some("pt") => load_torch(path),
        other => Err(LoadError::UnsupportedFormat(other.unwrap_or("<none>").to_string())),
    }
}

/// Tries every candidate file in `dir`; load failures are logged and
/// skipped.
pub fn discover(dir: &Path) -> Result<LoadedModel, LoadError> {
    for name in candidate_files() {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_file(&path) {
            Ok(model) => {
                info!(
                    "model loaded: {} ({:.2} MB, {})",
                    model.info.file_name, model.info.file_size_mb, model.info.model_type
                );
                return Ok(model);
            }
            Err(e) => warn!("failed to load {}: {}", path.display(), e),
        }
    }
    Err(LoadError::NotFound(dir.to_path_buf()))
}

/// Startup entry: explicit `model_path` if configured, otherwise discovery
/// in `model_dir`. `None` means the service runs on the fallback path.
pub fn load_model(cfg: &Config) -> Option<LoadedModel> {
    let loaded = match &cfg.model_path {
        Some(path) => load_file(path)
            .with_context(|| format!("failed to load configured model {}", path.display())),
        None => discover(&cfg.model_dir).context("model discovery failed"),
    };
    match loaded {
        Ok(model) => Some(model),
        Err(e) => {
            warn!("no valid model, using fallback predictions: {:#}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use crate::types::CategoricalInput;
    use std::path::PathBuf;

    const CLASS_MODEL: &str = r#"{
        "output": "class",
        "weights": [[0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,1]],
        "bias": [0, 0, 0, 0]
    }"#;

    const PROBA_MODEL: &str = r#"{
        "output": "proba",
        "weights": [[1,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0],[0,0,0,0,0,0,0,0,0]],
        "bias": [0, 0, 0, 0]
    }"#;

    #[test]
    fn test_discovers_first_candidate() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model.json"), PROBA_MODEL).unwrap();
        fs::write(dir.path().join("traffic_model.json"), CLASS_MODEL).unwrap();

        let model = discover(dir.path()).unwrap();
        assert_eq!(model.info.file_name, "traffic_model.json");
        assert_eq!(model.capability.kind(), "discrete");
        assert!(model.info.file_size_mb > 0.0);

        let candidates = encode(&CategoricalInput::resolve("Friday", "Summer", "East"));
        assert_eq!(model.capability.run(&candidates[0]).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_broken_candidate_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("traffic_predictor.json"), "{ not json").unwrap();
        fs::write(dir.path().join("model.json"), PROBA_MODEL).unwrap();

        let model = discover(dir.path()).unwrap();
        assert_eq!(model.info.file_name, "model.json");
        assert_eq!(model.capability.kind(), "probability");
    }

    #[test]
    fn test_empty_dir_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(discover(dir.path()), Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(&PathBuf::from("weights.onnx")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_model_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, CLASS_MODEL).unwrap();

        let cfg = Config {
            model_path: Some(path),
            ..Config::default()
        };
        assert!(load_model(&cfg).is_some());

        let missing = Config {
            model_dir: dir.path().join("nowhere"),
            ..Config::default()
        };
        assert!(load_model(&missing).is_none());
    }
}
