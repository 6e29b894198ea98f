use serde::{Deserialize, Serialize};

/// The three mutually exclusive categories an utterance can fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtteranceClass {
    Complaint,
    Advice,
    Other,
}

impl UtteranceClass {
    /// Index order used by probability models: complaint, advice, other
    pub const ORDER: [UtteranceClass; 3] = [
        UtteranceClass::Complaint,
        UtteranceClass::Advice,
        UtteranceClass::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UtteranceClass::Complaint => "complaint",
            UtteranceClass::Advice => "advice",
            UtteranceClass::Other => "other",
        }
    }
}

impl std::fmt::Display for UtteranceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clinical concept matched inside an utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptCandidate {
    /// External terminology identifier (SNOMED CT concept id)
    pub code: String,
    pub display: String,
    /// Exact substring of the raw utterance that matched
    pub match_text: String,
    /// Byte offset into the raw utterance
    pub start: usize,
    /// Exclusive byte offset into the raw utterance
    pub end: usize,
}

/// One sentence after classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedUtterance {
    /// Raw sentence text, kept as spoken/typed for display and merge
    pub text: String,
    pub class: UtteranceClass,
    #[serde(default)]
    pub negated: bool,
    /// Only set when a probability model produced the class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<ConceptCandidate>,
}

impl ClassifiedUtterance {
    pub fn new(text: impl Into<String>, class: UtteranceClass) -> Self {
        Self {
            text: text.into(),
            class,
            negated: false,
            confidence: None,
            concepts: Vec::new(),
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self.class, UtteranceClass::Complaint | UtteranceClass::Advice)
    }
}
