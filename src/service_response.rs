//! Adapter for classification service responses.
//!
//! The service does not commit to one response shape: the sentence may be under
//! `text` or `sentence`, and the label under any of `class`, `label`, `type`,
//! `category`, `tag`, `kind` or `group`, each either a string or an object
//! carrying `name`, `label`, `value` or `type`. Everything is folded into
//! [`LabeledItem`] here so nothing downstream probes JSON.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::classifier::ClassifyError;
use crate::concepts::extract_snomed_candidates;
use crate::normalize::normalize;
use crate::rule_classifier::detect_negation;
use crate::signals::has_instruction_signals;
use crate::utterance::{ClassifiedUtterance, UtteranceClass};

/// Word count at or below which a bare "advice" phrase is read as a symptom mention
const SOFT_RELABEL_MAX_WORDS: usize = 6;

/// One service result reduced to its sentence and the label string, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledItem {
    pub text: String,
    pub raw_label: Option<String>,
}

/// A label field as sent by the service
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelField {
    Plain(String),
    Nested(NestedLabel),
    Unknown(Value),
}

#[derive(Debug, Deserialize)]
struct NestedLabel {
    name: Option<String>,
    label: Option<String>,
    value: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl LabelField {
    fn as_label(&self) -> Option<&str> {
        let label = match self {
            LabelField::Plain(s) => Some(s.as_str()),
            LabelField::Nested(n) => n
                .name
                .as_deref()
                .or(n.label.as_deref())
                .or(n.value.as_deref())
                .or(n.kind.as_deref()),
            LabelField::Unknown(_) => None,
        };
        label.filter(|l| !l.trim().is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ServiceItem {
    text: Option<Value>,
    sentence: Option<Value>,
    class: Option<LabelField>,
    label: Option<LabelField>,
    #[serde(rename = "type")]
    kind_type: Option<LabelField>,
    category: Option<LabelField>,
    tag: Option<LabelField>,
    kind: Option<LabelField>,
    group: Option<LabelField>,
}

impl ServiceItem {
    fn text(&self) -> Option<&str> {
        self.text
            .as_ref()
            .and_then(Value::as_str)
            .or_else(|| self.sentence.as_ref().and_then(Value::as_str))
    }

    fn label(&self) -> Option<&str> {
        [
            &self.class,
            &self.label,
            &self.kind_type,
            &self.category,
            &self.tag,
            &self.kind,
            &self.group,
        ]
        .into_iter()
        .find_map(|field| field.as_ref().and_then(LabelField::as_label))
    }
}

/// Parse a service response body.
///
/// `sentences` is the request payload; an item without its own text falls back
/// to the sentence at the same position. Items with no usable text are dropped.
pub fn parse_service_response(
    body: &Value,
    sentences: &[String],
) -> Result<Vec<LabeledItem>, ClassifyError> {
    let results = body
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| ClassifyError::MalformedResponse("missing \"results\" array".to_string()))?;

    let mut items = Vec::with_capacity(results.len());
    for (i, raw_item) in results.iter().enumerate() {
        let item = match raw_item {
            Value::Object(_) => serde_json::from_value::<ServiceItem>(raw_item.clone())
                .unwrap_or_else(|e| {
                    warn!("Unreadable classification item {}: {}", i, e);
                    ServiceItem::default()
                }),
            _ => {
                warn!("Classification item {} is not an object", i);
                ServiceItem::default()
            }
        };

        let text = item
            .text()
            .or_else(|| sentences.get(i).map(String::as_str))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let Some(text) = text else {
            debug!("Dropping classification item {} with no text", i);
            continue;
        };

        items.push(LabeledItem {
            text: text.to_string(),
            raw_label: item.label().map(str::to_string),
        });
    }

    Ok(items)
}

/// Map a service label onto a canonical class. `None` means unrecognized.
pub fn normalize_label(raw: &str) -> Option<UtteranceClass> {
    let key = raw.trim().to_lowercase().replace(['-', ' '], "_");
    match key.as_str() {
        "complaint" | "complaints" | "chief_complaint" | "chief_complaints" | "cc" | "symptom"
        | "symptoms" => Some(UtteranceClass::Complaint),
        k if k.starts_with("complain") => Some(UtteranceClass::Complaint),
        "advice" | "advise" | "plan" | "instruction" | "instructions" | "doctor_note"
        | "doctor_notes" | "recommendation" | "recommendations" | "note" | "notes"
        | "follow_up" | "followup" => Some(UtteranceClass::Advice),
        "other" | "others" => Some(UtteranceClass::Other),
        _ => None,
    }
}

/// Decide the final class of one service item.
///
/// Without refinement an unrecognized label is `other`. With refinement
/// (voice overlay), `other`/unrecognized becomes advice or complaint from the
/// sentence structure, and short signal-free "advice" is demoted to complaint.
pub fn resolve_class(text: &str, raw_label: Option<&str>, refine: bool) -> UtteranceClass {
    let recognized = raw_label.and_then(normalize_label);
    if !refine {
        return recognized.unwrap_or(UtteranceClass::Other);
    }

    let normalized = normalize(text);
    let class = match recognized {
        Some(UtteranceClass::Complaint) => UtteranceClass::Complaint,
        Some(UtteranceClass::Advice) => UtteranceClass::Advice,
        Some(UtteranceClass::Other) | None => {
            if has_instruction_signals(&normalized) {
                UtteranceClass::Advice
            } else {
                UtteranceClass::Complaint
            }
        }
    };

    if class == UtteranceClass::Advice && is_short_symptom_mention(text, &normalized) {
        UtteranceClass::Complaint
    } else {
        class
    }
}

fn is_short_symptom_mention(raw: &str, normalized: &str) -> bool {
    normalized.split_whitespace().count() <= SOFT_RELABEL_MAX_WORDS
        && !raw.contains(['.', '!', '?'])
        && !has_instruction_signals(normalized)
}

/// Turn a labeled item into a review entry
pub fn into_classified(item: LabeledItem, refine: bool, with_concepts: bool) -> ClassifiedUtterance {
    let class = resolve_class(&item.text, item.raw_label.as_deref(), refine);
    let mut result = ClassifiedUtterance::new(item.text, class);
    result.negated = detect_negation(&normalize(&result.text));
    if with_concepts && class == UtteranceClass::Complaint {
        result.concepts = extract_snomed_candidates(&result.text);
    }
    result
}
