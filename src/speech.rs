//! Speech recognition bridge contract.
//!
//! The platform recognizer is a black box. It runs continuous recognition with
//! interim results and reports what it hears as [`SpeechEvent`]s on a channel.
//! The review session drains that channel and owns the routing rules (final
//! segments append to the transcript, interim text only overwrites the
//! transient buffer).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Events emitted by a speech bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeechEvent {
    /// Recognition started and the microphone is live
    Started,
    /// In-progress hypothesis; replaces the previous interim text
    InterimUpdate { text: String },
    /// Finalized segment
    FinalSegment { text: String },
    /// Recognition failed (e.g. "not-allowed", "no-speech", "aborted")
    Error { code: String },
    /// Recognition ended
    Ended,
}

/// Errors starting a speech bridge
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum SpeechError {
    #[error("Speech recognition unavailable: {0}")]
    Unavailable(String),
    #[error("Microphone permission denied")]
    PermissionDenied,
}

impl SpeechError {
    /// Short code shown next to the mic control
    pub fn code(&self) -> &'static str {
        match self {
            SpeechError::Unavailable(_) => "unavailable",
            SpeechError::PermissionDenied => "not-allowed",
        }
    }
}

/// A platform speech recognizer
pub trait SpeechBridge: Send {
    /// Start continuous recognition in `locale`, delivering events on `events`.
    fn start(
        &mut self,
        locale: &str,
        events: mpsc::UnboundedSender<SpeechEvent>,
    ) -> Result<(), SpeechError>;

    /// Stop recognition and release the microphone. Must be safe to call twice.
    fn stop(&mut self);
}

/// Map a language tag to the recognizer locale.
///
/// Region-qualified tags ("en-US") pass through; bare tags get the Indian
/// region; anything unknown falls back to `en-IN`.
pub fn speech_locale(lang: &str) -> String {
    let lang = lang.trim();
    if lang.contains('-') {
        return lang.to_string();
    }
    let locale = match lang.to_lowercase().as_str() {
        "en" => "en-IN",
        "hi" => "hi-IN",
        "mr" => "mr-IN",
        "gu" => "gu-IN",
        "bn" => "bn-IN",
        "ta" => "ta-IN",
        "te" => "te-IN",
        "kn" => "kn-IN",
        "ml" => "ml-IN",
        "pa" => "pa-IN",
        _ => "en-IN",
    };
    locale.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_locale() {
        assert_eq!(speech_locale("en"), "en-IN");
        assert_eq!(speech_locale("hi"), "hi-IN");
        assert_eq!(speech_locale(" TA "), "ta-IN");
        assert_eq!(speech_locale("en-US"), "en-US");
        assert_eq!(speech_locale("xx"), "en-IN");
        assert_eq!(speech_locale(""), "en-IN");
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(SpeechEvent::FinalSegment {
            text: "fever".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "final_segment");
        assert_eq!(json["text"], "fever");

        let back: SpeechEvent = serde_json::from_str(r#"{"type":"error","code":"no-speech"}"#).unwrap();
        assert_eq!(back, SpeechEvent::Error { code: "no-speech".to_string() });
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SpeechError::PermissionDenied.code(), "not-allowed");
        assert_eq!(SpeechError::Unavailable("x".to_string()).code(), "unavailable");
    }
}
