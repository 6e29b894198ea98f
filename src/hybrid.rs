//! Hybrid classification: pluggable probability model first, rules as fallback.
//!
//! The model is never allowed to break classification. A failing call, a
//! malformed probability vector or a low-confidence argmax all fall through to
//! [`classify_rule_based`]. Negation is always computed by the rule heuristic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::concepts::extract_snomed_candidates;
use crate::normalize::normalize;
use crate::rule_classifier::{classify_rule_based, detect_negation};
use crate::utterance::{ClassifiedUtterance, UtteranceClass};

/// Default minimum argmax probability for accepting a model prediction
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Errors a probability model may report
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("Model inference failed: {0}")]
    Inference(String),
    #[error("Model unavailable: {0}")]
    Unavailable(String),
}

/// A classifier producing `[p_complaint, p_advice, p_other]` for one utterance.
///
/// `Ok(None)` means the model declined to predict.
#[async_trait]
pub trait ProbabilityModel: Send + Sync {
    async fn predict_probabilities(&self, text: &str) -> Result<Option<Vec<f64>>, ModelError>;
}

/// Options for [`classify_hybrid`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridOptions {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Attach concept candidates to complaint results
    #[serde(default)]
    pub with_concepts: bool,
}

fn default_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

impl Default for HybridOptions {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            with_concepts: false,
        }
    }
}

/// Classify one utterance with the model when it is confident, rules otherwise.
pub async fn classify_hybrid(
    raw: &str,
    model: Option<&dyn ProbabilityModel>,
    options: &HybridOptions,
) -> ClassifiedUtterance {
    if let Some(model) = model {
        match model.predict_probabilities(raw).await {
            Ok(Some(probs)) => match validate_probabilities(&probs) {
                Some(valid) => {
                    let (index, probability) = argmax(&valid);
                    if probability >= options.threshold {
                        let class = UtteranceClass::ORDER[index];
                        let mut result = ClassifiedUtterance::new(raw, class);
                        result.negated = detect_negation(&normalize(raw));
                        result.confidence = Some(probability);
                        attach_concepts(&mut result, options);
                        return result;
                    }
                    debug!(
                        "Model confidence {:.2} below threshold {:.2}, using rules",
                        probability, options.threshold
                    );
                }
                None => warn!("Model returned malformed probabilities {:?}, using rules", probs),
            },
            Ok(None) => debug!("Model returned no prediction, using rules"),
            Err(e) => warn!("Probability model failed, using rules: {}", e),
        }
    }

    let mut result = classify_rule_based(raw);
    attach_concepts(&mut result, options);
    result
}

fn attach_concepts(result: &mut ClassifiedUtterance, options: &HybridOptions) {
    if options.with_concepts && result.class == UtteranceClass::Complaint {
        result.concepts = extract_snomed_candidates(&result.text);
    }
}

/// Exactly three finite probabilities in `[0, 1]`
fn validate_probabilities(probs: &[f64]) -> Option<[f64; 3]> {
    let valid: [f64; 3] = probs.try_into().ok()?;
    if valid.iter().all(|p| p.is_finite() && (0.0..=1.0).contains(p)) {
        Some(valid)
    } else {
        None
    }
}

/// Index and value of the largest probability; the first index wins ties.
fn argmax(probs: &[f64; 3]) -> (usize, f64) {
    let mut best = (0, probs[0]);
    for (i, &p) in probs.iter().enumerate().skip(1) {
        if p > best.1 {
            best = (i, p);
        }
    }
    best
}
