//! Voice/scribe transcript classification and clinical note merging.
//!
//! A dictated or pasted transcript is split into sentences, each sentence is
//! labelled complaint / advice / other (rules, an optional probability model,
//! or a remote classification service), and accepted items are merged into
//! the owning note's chief-complaint rows and follow-up text.

pub mod classifier;
pub mod classify_service;
pub mod concepts;
pub mod config;
pub mod hybrid;
pub mod lexicon;
pub mod normalize;
pub mod note_merge;
pub mod review_session;
pub mod rule_classifier;
pub mod segmenter;
pub mod service_response;
pub mod signals;
pub mod speech;
pub mod utterance;


pub use classifier::{ClassifyError, LocalClassifier, UtteranceClassifier};
pub use classify_service::{ClassifyServiceClient, RemoteClassifier};
pub use concepts::extract_snomed_candidates;
pub use config::Config;
pub use hybrid::{classify_hybrid, HybridOptions, ModelError, ProbabilityModel};
pub use normalize::normalize;
pub use note_merge::{merge_bullets, NoteFields};
pub use review_session::{ReviewSession, ReviewState, SessionError, SessionOptions, SubmitPayload};
pub use rule_classifier::classify_rule_based;
pub use segmenter::{segment_transcript, split_sentences};
pub use speech::{speech_locale, SpeechBridge, SpeechEvent};
pub use utterance::{ClassifiedUtterance, ConceptCandidate, UtteranceClass};
