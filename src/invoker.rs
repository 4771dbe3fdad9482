//! Runs the encoded candidates against a model until one of them produces
//! a usable answer, then turns that answer into a base traffic value.

use tracing::{debug, warn};

use crate::encoder::ModelInput;
use crate::error::ModelError;
use crate::model::{argmax, ModelCapability};

/// Base value per discrete class (0..=3).
const CLASS_BASE: [f64; 4] = [25.0, 50.0, 75.0, 100.0];
const DEFAULT_BASE: f64 = 50.0;

/// First candidate that yields a normalised base value, or `None` when the
/// model is absent or every candidate failed.
pub fn invoke(model: Option<&ModelCapability>, candidates: &[ModelInput]) -> Option<f64> {
    let model = model?;
    for candidate in candidates {
        let outcome = model.run(candidate).and_then(|out| normalize(&out));
        match outcome {
            Ok(base) => {
                debug!(layout = candidate.label(), base, "model prediction accepted");
                return Some(base);
            }
            Err(e) => {
                debug!(layout = candidate.label(), error = %e, "candidate failed, trying next");
            }
        }
    }
    warn!(
        candidates = candidates.len(),
        kind = model.kind(),
        "no candidate layout produced a model prediction"
    );
    None
}

/// Maps flattened model output to a base value.
///
/// One value is a class label, four values are per-class scores, anything
/// else gets the generic default.
pub fn normalize(output: &[f64]) -> Result<f64, ModelError> {
    match output.len() {
        1 => {
            let v = output[0];
            if !v.is_finite() {
                return Err(ModelError::InvalidOutput(format!("class label {} is not finite", v)));
            }
            let class = v.trunc() as i64;
            let base = usize::try_from(class)
                .ok()
                .and_then(|i| CLASS_BASE.get(i).copied())
                .unwrap_or(DEFAULT_BASE);
            Ok(base)
        }
        4 => {
            let idx = argmax(output).unwrap_or(0);
            Ok((idx as f64 + 1.0) * 25.0)
        }
        _ => Ok(DEFAULT_BASE),
    }
}
