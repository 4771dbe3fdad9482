use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::encoder::{ModelInput, FEATURE_COUNT};
use crate::error::{LoadError, ModelError};

/// A model that answers with class labels (one value per row).
pub trait DiscretePredictor: Send + Sync {
    fn predict(&self, input: &ModelInput) -> Result<Vec<f64>, ModelError>;
}

/// A model that answers with per-class scores.
pub trait ProbabilityPredictor: Send + Sync {
    fn predict_proba(&self, input: &ModelInput) -> Result<Vec<f64>, ModelError>;
}

/// What a loaded model can do. Chosen once, when the model is loaded.
#[derive(Clone)]
pub enum ModelCapability {
    Discrete(Arc<dyn DiscretePredictor>),
    Probability(Arc<dyn ProbabilityPredictor>),
}

impl ModelCapability {
    /// Flattened model output for a single row.
    pub fn run(&self, input: &ModelInput) -> Result<Vec<f64>, ModelError> {
        match self {
            ModelCapability::Discrete(m) => m.predict(input),
            ModelCapability::Probability(m) => m.predict_proba(input),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelCapability::Discrete(_) => "discrete",
            ModelCapability::Probability(_) => "probability",
        }
    }
}

impl std::fmt::Debug for ModelCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ModelCapability::{}", self.kind())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub file_name: String,
    pub file_size_mb: f64,
    pub model_type: String,
}

#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub capability: ModelCapability,
    pub info: ModelInfo,
}

// ---------- JSON linear model ----------

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Class,
    Proba,
}

#[derive(Deserialize, Debug)]
pub struct LinearModelDef {
    pub output: OutputKind,
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

/// Per-class linear scores: `bias[k] + weights[k] . x`.
#[derive(Debug)]
pub struct LinearModel {
    weights: Vec<[f64; FEATURE_COUNT]>,
    bias: Vec<f64>,
    feature_names: Option<Vec<String>>,
}

impl LinearModel {
    pub fn from_def(def: LinearModelDef) -> Result<(Self, OutputKind), LoadError> {
        if def.weights.is_empty() {
            return Err(LoadError::Invalid("weights must not be empty".into()));
        }
        if def.bias.len() != def.weights.len() {
            return Err(LoadError::Invalid(format!(
                "bias has {} entries, weights has {} rows",
                def.bias.len(),
                def.weights.len()
            )));
        }
        let mut weights = Vec::with_capacity(def.weights.len());
        for (k, row) in def.weights.iter().enumerate() {
            let row: [f64; FEATURE_COUNT] = row.as_slice().try_into().map_err(|_| {
                LoadError::Invalid(format!(
                    "weights row {} has {} columns, expected {}",
                    k,
                    row.len(),
                    FEATURE_COUNT
                ))
            })?;
            weights.push(row);
        }
        if let Some(names) = &def.feature_names {
            if names.len() != FEATURE_COUNT {
                return Err(LoadError::Invalid(format!(
                    "feature_names has {} entries, expected {}",
                    names.len(),
                    FEATURE_COUNT
                )));
            }
        }
        Ok((
            Self {
                weights,
                bias: def.bias,
                feature_names: def.feature_names,
            },
            def.output,
        ))
    }

    pub fn into_capability(self, output: OutputKind) -> ModelCapability {
        let model = Arc::new(self);
        match output {
            OutputKind::Class => ModelCapability::Discrete(model),
            OutputKind::Proba => ModelCapability::Probability(model),
        }
    }

    /// A model fitted on named columns only takes a table with those names.
    fn check_layout(&self, input: &ModelInput) -> Result<(), ModelError> {
        let Some(expected) = &self.feature_names else {
            return Ok(());
        };
        match input.columns() {
            Some(cols) if cols.iter().zip(expected).all(|(a, b)| *a == b.as_str()) => Ok(()),
            Some(cols) => Err(ModelError::FeatureMismatch {
                expected: expected.join(","),
                found: cols.join(","),
            }),
            None => Err(ModelError::FeatureMismatch {
                expected: expected.join(","),
                found: "unnamed array".into(),
            }),
        }
    }

    fn scores(&self, input: &ModelInput) -> Result<Vec<f64>, ModelError> {
        self.check_layout(input)?;
        let x = input.values().as_slice();
        Ok(self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| b + w.iter().zip(x).map(|(wi, xi)| wi * xi).sum::<f64>())
            .collect())
    }
}

impl DiscretePredictor for LinearModel {
    fn predict(&self, input: &ModelInput) -> Result<Vec<f64>, ModelError> {
        let scores = self.scores(input)?;
        let class = argmax(&scores)
            .ok_or_else(|| ModelError::InvalidOutput("no class scores".into()))?;
        Ok(vec![class as f64])
    }
}

impl ProbabilityPredictor for LinearModel {
    fn predict_proba(&self, input: &ModelInput) -> Result<Vec<f64>, ModelError> {
        let scores = self.scores(input)?;
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(ModelError::InvalidOutput("softmax did not normalise".into()));
        }
        Ok(exp.into_iter().map(|e| e / total).collect())
    }
}

/// Index of the first maximum, like `argmax` on a score row.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b || v.is_nan() => {}
            None if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

// ---------- TorchScript model ----------

#[cfg(feature = "torch")]
pub mod torch {
    use tch::{kind::Kind, CModule, Device, Tensor};

    use super::ProbabilityPredictor;
    use crate::encoder::{ModelInput, FEATURE_COUNT};
    use crate::error::{LoadError, ModelError};

    pub struct TorchModel {
        model: CModule,
        device: Device,
    }

    impl TorchModel {
        pub fn load(model_path: &std::path::Path) -> Result<Self, LoadError> {
            let device = Device::Cpu;
            let model = CModule::load_on_device(model_path, device)
                .map_err(|e| LoadError::UnsupportedFormat(e.to_string()))?;

            // Probe with a dummy forward so a broken export fails at load time
            let dummy = Tensor::zeros([1, FEATURE_COUNT as i64], (Kind::Float, device));
            model
                .forward_ts(&[dummy])
                .map_err(|e| LoadError::Invalid(format!("probe forward failed: {}", e)))?;

            Ok(Self { model, device })
        }
    }

    impl ProbabilityPredictor for TorchModel {
        fn predict_proba(&self, input: &ModelInput) -> Result<Vec<f64>, ModelError> {
            let ModelInput::Array(values) = input else {
                return Err(ModelError::UnsupportedInput("torchscript takes raw arrays only"));
            };
            let x: Vec<f32> = values.as_slice().iter().map(|v| *v as f32).collect();
            let t = Tensor::from_slice(&x)
                .reshape([1, FEATURE_COUNT as i64])
                .to_device(self.device);

            let out = self
                .model
                .forward_ts(&[t])
                .map_err(|e| ModelError::Backend(e.to_string()))?
                .to_kind(Kind::Double)
                .flatten(0, -1);
            Vec::<f64>::try_from(&out).map_err(|e| ModelError::InvalidOutput(e.to_string()))
        }
    }
}
