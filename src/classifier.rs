//! Batch classification seam used by the review session's "Analyze" step.
//!
//! One call classifies every sentence of one analysis pass with the same
//! language tag and configuration, returning results in input order.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::hybrid::{classify_hybrid, HybridOptions, ProbabilityModel};
use crate::utterance::ClassifiedUtterance;

/// Classification service errors
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Invalid classification service URL: {0}")]
    InvalidUrl(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Classification service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed classification response: {0}")]
    MalformedResponse(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Classifies all sentences of one analysis pass
#[async_trait]
pub trait UtteranceClassifier: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &str;

    async fn classify_batch(
        &self,
        lang: &str,
        sentences: &[String],
    ) -> Result<Vec<ClassifiedUtterance>, ClassifyError>;
}

/// In-process classifier: optional probability model plus rule fallback
#[derive(Clone, Default)]
pub struct LocalClassifier {
    model: Option<Arc<dyn ProbabilityModel>>,
    options: HybridOptions,
}

impl LocalClassifier {
    /// Rules only
    pub fn rules(options: HybridOptions) -> Self {
        Self { model: None, options }
    }

    pub fn with_model(model: Arc<dyn ProbabilityModel>, options: HybridOptions) -> Self {
        Self {
            model: Some(model),
            options,
        }
    }

    pub fn options(&self) -> &HybridOptions {
        &self.options
    }
}

impl std::fmt::Debug for LocalClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalClassifier")
            .field("has_model", &self.model.is_some())
            .field("options", &self.options)
            .finish()
    }
}

#[async_trait]
impl UtteranceClassifier for LocalClassifier {
    fn name(&self) -> &str {
        if self.model.is_some() {
            "hybrid"
        } else {
            "rules"
        }
    }

    async fn classify_batch(
        &self,
        lang: &str,
        sentences: &[String],
    ) -> Result<Vec<ClassifiedUtterance>, ClassifyError> {
        debug!(
            "Classifying {} sentences locally (lang={}, classifier={})",
            sentences.len(),
            lang,
            self.name()
        );
        let mut results = Vec::with_capacity(sentences.len());
        for sentence in sentences {
            results.push(classify_hybrid(sentence, self.model.as_deref(), &self.options).await);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hybrid::ModelError;
    use crate::utterance::UtteranceClass;

    struct AlwaysOther;

    #[async_trait]
    impl ProbabilityModel for AlwaysOther {
        async fn predict_probabilities(&self, _text: &str) -> Result<Option<Vec<f64>>, ModelError> {
            Ok(Some(vec![0.0, 0.0, 1.0]))
        }
    }

    fn sentences() -> Vec<String> {
        vec![
            "I have had a headache since yesterday.".to_string(),
            "Please take ibuprofen 400mg twice daily for 3 days.".to_string(),
            "Blood pressure is normal.".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_rules_keep_input_order() {
        let classifier = LocalClassifier::rules(HybridOptions::default());
        assert_eq!(classifier.name(), "rules");

        let results = classifier.classify_batch("en", &sentences()).await.unwrap();
        let classes: Vec<UtteranceClass> = results.iter().map(|r| r.class).collect();
        assert_eq!(
            classes,
            vec![UtteranceClass::Complaint, UtteranceClass::Advice, UtteranceClass::Other]
        );
        assert_eq!(results[0].text, "I have had a headache since yesterday.");
    }

    #[tokio::test]
    async fn test_model_applies_to_whole_batch() {
        let classifier = LocalClassifier::with_model(Arc::new(AlwaysOther), HybridOptions::default());
        assert_eq!(classifier.name(), "hybrid");

        let results = classifier.classify_batch("hi", &sentences()).await.unwrap();
        assert!(results.iter().all(|r| r.class == UtteranceClass::Other));
        assert!(results.iter().all(|r| r.confidence == Some(1.0)));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let classifier = LocalClassifier::default();
        assert!(classifier.classify_batch("en", &[]).await.unwrap().is_empty());
    }
}
