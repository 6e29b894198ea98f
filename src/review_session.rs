//! Review session behind the scribe panel and voice overlay.
//!
//! Lifecycle: Idle -> Recording -> Captured -> Analyzed -> Submitted | Cancelled.
//!
//! Notes on behavior callers rely on:
//! - `results` is tri-state: `None` = never analyzed, `Some([])` = analyzed,
//!   nothing found.
//! - Editing the transcript does not clear `results`. Stale results stay
//!   reviewable until "Analyze" runs again.
//! - A cancel while an analysis is in flight bumps the generation; the late
//!   result is discarded when it lands.
//! - The microphone is released on `stop_listening`, `close` and drop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::classifier::{ClassifyError, UtteranceClassifier};
use crate::segmenter::{segment_transcript_with_limit, DEFAULT_LONG_CLAUSE_CHARS};
use crate::speech::{speech_locale, SpeechBridge, SpeechError, SpeechEvent};
use crate::utterance::{ClassifiedUtterance, UtteranceClass};

/// Review session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewState {
    Idle,
    Recording,
    Captured,
    Analyzed,
    Submitted,
    Cancelled,
}

/// Review session error types
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),
    #[error("Analysis already in progress")]
    AnalysisInProgress,
    #[error("Nothing to submit: no complaint or advice items")]
    NothingToSubmit,
    #[error("No speech bridge attached")]
    NoSpeechBridge,
    #[error("Speech recognition error: {0}")]
    Speech(#[from] SpeechError),
}

/// Per-session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Language tag sent with every analysis and used for the speech locale
    pub language: String,
    /// Reset `results` to "not analyzed" after a successful submit
    pub clear_after_submit: bool,
    pub long_clause_chars: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            clear_after_submit: true,
            long_clause_chars: DEFAULT_LONG_CLAUSE_CHARS,
        }
    }
}

/// Snapshot of one analysis pass, taken when "Analyze" is pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub generation: u64,
    pub lang: String,
    pub sentences: Vec<String>,
}

/// Bucketed review results handed to the owning note on submit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitPayload {
    pub complaints: Vec<String>,
    pub advice: Vec<String>,
}

impl SubmitPayload {
    /// Bucket results by class in encounter order; `other` is dropped.
    pub fn from_results(results: &[ClassifiedUtterance]) -> Self {
        let mut payload = Self::default();
        for item in results {
            match item.class {
                UtteranceClass::Complaint => payload.complaints.push(item.text.clone()),
                UtteranceClass::Advice => payload.advice.push(item.text.clone()),
                UtteranceClass::Other => {}
            }
        }
        payload
    }
}

/// Status snapshot for the panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStatus {
    pub session_id: String,
    pub opened_at: DateTime<Utc>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub state: ReviewState,
    pub listening: bool,
    pub is_analyzing: bool,
    pub transcript_chars: usize,
    /// `None` when never analyzed
    pub result_count: Option<usize>,
    pub can_submit: bool,
    pub mic_error: Option<String>,
}

/// One voice/scribe review session
pub struct ReviewSession {
    session_id: String,
    opened_at: DateTime<Utc>,
    analyzed_at: Option<DateTime<Utc>>,
    options: SessionOptions,
    state: ReviewState,
    transcript: String,
    interim: String,
    results: Option<Vec<ClassifiedUtterance>>,
    is_analyzing: bool,
    /// Bumped on every analysis start, cancel and close; stale completions are dropped
    generation: u64,
    listening: bool,
    mic_error: Option<String>,
    bridge: Option<Box<dyn SpeechBridge>>,
    events: Option<mpsc::UnboundedReceiver<SpeechEvent>>,
}

impl ReviewSession {
    pub fn new(options: SessionOptions) -> Self {
        let session_id = uuid::Uuid::new_v4().to_string();
        info!("Review session {} opened (lang={})", session_id, options.language);
        Self {
            session_id,
            opened_at: Utc::now(),
            analyzed_at: None,
            options,
            state: ReviewState::Idle,
            transcript: String::new(),
            interim: String::new(),
            results: None,
            is_analyzing: false,
            generation: 0,
            listening: false,
            mic_error: None,
            bridge: None,
            events: None,
        }
    }

    pub fn with_bridge(options: SessionOptions, bridge: Box<dyn SpeechBridge>) -> Self {
        let mut session = Self::new(options);
        session.bridge = Some(bridge);
        session
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    pub fn results(&self) -> Option<&[ClassifiedUtterance]> {
        self.results.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.is_analyzing
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn mic_error(&self) -> Option<&str> {
        self.mic_error.as_deref()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Submit is enabled once results hold at least one complaint or advice item
    pub fn can_submit(&self) -> bool {
        self.results
            .as_ref()
            .is_some_and(|r| r.iter().any(ClassifiedUtterance::is_actionable))
    }

    pub fn status(&self) -> ReviewStatus {
        ReviewStatus {
            session_id: self.session_id.clone(),
            opened_at: self.opened_at,
            analyzed_at: self.analyzed_at,
            state: self.state,
            listening: self.listening,
            is_analyzing: self.is_analyzing,
            transcript_chars: self.transcript.chars().count(),
            result_count: self.results.as_ref().map(Vec::len),
            can_submit: self.can_submit(),
            mic_error: self.mic_error.clone(),
        }
    }

    /// Manual edit. Replaces the transcript; analysis results are kept.
    pub fn set_transcript(&mut self, text: impl Into<String>) {
        self.transcript = text.into();
        if !self.listening {
            self.settle_state();
        }
        debug!("Transcript edited ({} chars)", self.transcript.len());
    }

    /// Start speech recognition through the attached bridge.
    pub fn start_listening(&mut self) -> Result<(), SessionError> {
        if self.listening {
            return Err(SessionError::InvalidTransition(
                "Already listening".to_string(),
            ));
        }
        let locale = speech_locale(&self.options.language);
        let bridge = self.bridge.as_mut().ok_or(SessionError::NoSpeechBridge)?;

        let (tx, rx) = mpsc::unbounded_channel();
        if let Err(e) = bridge.start(&locale, tx) {
            warn!("Speech bridge failed to start: {}", e);
            self.mic_error = Some(e.code().to_string());
            return Err(e.into());
        }

        info!("Session {} listening ({})", self.session_id, locale);
        self.events = Some(rx);
        self.listening = true;
        self.mic_error = None;
        self.state = ReviewState::Recording;
        Ok(())
    }

    /// Stop speech recognition. Segments already delivered are applied first.
    pub fn stop_listening(&mut self) {
        self.pump_speech_events();
        if self.listening {
            info!("Session {} stopped listening", self.session_id);
        }
        self.release_microphone();
        self.settle_state();
    }

    /// Apply every event waiting on the bridge channel. Returns how many were applied.
    pub fn pump_speech_events(&mut self) -> usize {
        let mut pending = Vec::new();
        if let Some(rx) = self.events.as_mut() {
            while let Ok(event) = rx.try_recv() {
                pending.push(event);
            }
        }
        let count = pending.len();
        for event in pending {
            self.handle_speech_event(event);
        }
        count
    }

    /// Route one recognition event.
    pub fn handle_speech_event(&mut self, event: SpeechEvent) {
        match event {
            SpeechEvent::Started => {
                self.listening = true;
                self.mic_error = None;
                self.state = ReviewState::Recording;
            }
            SpeechEvent::InterimUpdate { text } => {
                if self.listening {
                    self.interim = text;
                }
            }
            SpeechEvent::FinalSegment { text } => {
                let text = text.trim();
                if !text.is_empty() {
                    if !self.transcript.is_empty() {
                        self.transcript.push('\n');
                    }
                    self.transcript.push_str(text);
                }
                self.interim.clear();
                if !self.listening {
                    self.settle_state();
                }
            }
            SpeechEvent::Error { code } => {
                warn!("Speech recognition error: {}", code);
                self.mic_error = Some(code);
                self.end_recognition();
            }
            SpeechEvent::Ended => {
                debug!("Speech recognition ended");
                self.end_recognition();
            }
        }
    }

    /// Start an analysis pass.
    ///
    /// Returns `Ok(None)` when the transcript has no sentences; the session is
    /// then already `Analyzed` with empty results and nothing needs classifying.
    pub fn begin_analysis(&mut self) -> Result<Option<AnalysisRequest>, SessionError> {
        if self.is_analyzing {
            return Err(SessionError::AnalysisInProgress);
        }
        if self.listening {
            return Err(SessionError::InvalidTransition(
                "Cannot analyze while recording".to_string(),
            ));
        }

        let sentences =
            segment_transcript_with_limit(&self.transcript, self.options.long_clause_chars);
        self.generation += 1;

        if sentences.is_empty() {
            info!("Analyze on empty transcript, no items");
            self.results = Some(Vec::new());
            self.analyzed_at = Some(Utc::now());
            self.state = ReviewState::Analyzed;
            return Ok(None);
        }

        debug!(
            "Analysis {} started with {} sentences",
            self.generation,
            sentences.len()
        );
        self.is_analyzing = true;
        Ok(Some(AnalysisRequest {
            generation: self.generation,
            lang: self.options.language.clone(),
            sentences,
        }))
    }

    /// Land the outcome of an analysis pass.
    ///
    /// A service failure becomes empty results. Returns `false` when the pass
    /// was superseded (cancelled or closed) and its outcome was discarded.
    pub fn complete_analysis(
        &mut self,
        generation: u64,
        outcome: Result<Vec<ClassifiedUtterance>, ClassifyError>,
    ) -> bool {
        if !self.is_analyzing || generation != self.generation {
            debug!("Discarding stale analysis {}", generation);
            return false;
        }

        self.is_analyzing = false;
        let results = match outcome {
            Ok(results) => results,
            Err(e) => {
                warn!("Classification failed, showing no items: {}", e);
                Vec::new()
            }
        };
        info!("Analysis {} complete: {} items", generation, results.len());
        self.results = Some(results);
        self.analyzed_at = Some(Utc::now());
        self.state = ReviewState::Analyzed;
        true
    }

    /// Segment, classify and land results in one call.
    pub async fn analyze(&mut self, classifier: &dyn UtteranceClassifier) -> Result<(), SessionError> {
        let Some(request) = self.begin_analysis()? else {
            return Ok(());
        };
        let outcome = classifier
            .classify_batch(&request.lang, &request.sentences)
            .await;
        self.complete_analysis(request.generation, outcome);
        Ok(())
    }

    /// Bucket results for the owning note.
    ///
    /// The transcript is left alone so dictation can continue.
    pub fn submit(&mut self) -> Result<SubmitPayload, SessionError> {
        if !self.can_submit() {
            return Err(SessionError::NothingToSubmit);
        }
        let payload = SubmitPayload::from_results(self.results.as_deref().unwrap_or_default());
        info!(
            "Session {} submitted {} complaints, {} advice",
            self.session_id,
            payload.complaints.len(),
            payload.advice.len()
        );
        if self.options.clear_after_submit {
            self.results = None;
        }
        self.state = ReviewState::Submitted;
        Ok(payload)
    }

    /// Discard results without touching the note. An in-flight analysis is
    /// left to finish and then ignored. A live microphone is stopped; segments
    /// already delivered still land in the transcript.
    pub fn cancel(&mut self) {
        if self.listening {
            self.pump_speech_events();
            self.release_microphone();
        }
        if self.is_analyzing {
            self.generation += 1;
            self.is_analyzing = false;
        }
        self.results = None;
        self.state = ReviewState::Cancelled;
        info!("Session {} review cancelled", self.session_id);
    }

    /// Close the panel: release the microphone and reset every field.
    pub fn close(&mut self) {
        self.release_microphone();
        self.transcript.clear();
        self.results = None;
        self.analyzed_at = None;
        self.is_analyzing = false;
        self.generation += 1;
        self.mic_error = None;
        self.state = ReviewState::Idle;
        info!("Review session {} closed", self.session_id);
    }

    fn end_recognition(&mut self) {
        self.listening = false;
        self.interim.clear();
        self.settle_state();
    }

    fn release_microphone(&mut self) {
        if self.listening {
            if let Some(bridge) = self.bridge.as_mut() {
                bridge.stop();
            }
        }
        self.listening = false;
        self.interim.clear();
        self.events = None;
    }

    /// State when not recording: Captured with content, Idle without
    fn settle_state(&mut self) {
        self.state = if self.transcript.trim().is_empty() {
            ReviewState::Idle
        } else {
            ReviewState::Captured
        };
    }
}

impl Drop for ReviewSession {
    fn drop(&mut self) {
        self.release_microphone();
    }
}

impl std::fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewSession")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("listening", &self.listening)
            .field("is_analyzing", &self.is_analyzing)
            .field("results", &self.results.as_ref().map(Vec::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LocalClassifier;
    use crate::hybrid::HybridOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Bridge that hands its sender to the test and counts start/stop calls
    #[derive(Clone, Default)]
    struct ScriptedBridge {
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
        locale: Arc<Mutex<Option<String>>>,
        sender: Arc<Mutex<Option<mpsc::UnboundedSender<SpeechEvent>>>>,
        deny: bool,
    }

    impl ScriptedBridge {
        /// Deliver an event; a session that already hung up just drops it
        fn send(&self, event: SpeechEvent) {
            if let Some(tx) = self.sender.lock().unwrap().as_ref() {
                let _ = tx.send(event);
            }
        }
    }

    impl SpeechBridge for ScriptedBridge {
        fn start(
            &mut self,
            locale: &str,
            events: mpsc::UnboundedSender<SpeechEvent>,
        ) -> Result<(), SpeechError> {
            if self.deny {
                return Err(SpeechError::PermissionDenied);
            }
            self.starts.fetch_add(1, Ordering::SeqCst);
            *self.locale.lock().unwrap() = Some(locale.to_string());
            *self.sender.lock().unwrap() = Some(events);
            Ok(())
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session_with_bridge() -> (ReviewSession, ScriptedBridge) {
        let bridge = ScriptedBridge::default();
        let session = ReviewSession::with_bridge(SessionOptions::default(), Box::new(bridge.clone()));
        (session, bridge)
    }

    fn rules() -> LocalClassifier {
        LocalClassifier::rules(HybridOptions::default())
    }

    #[test]
    fn test_new_session_is_idle_and_unanalyzed() {
        let session = ReviewSession::new(SessionOptions::default());
        assert_eq!(session.state(), ReviewState::Idle);
        assert!(session.results().is_none());
        assert!(!session.can_submit());
        assert!(!session.session_id().is_empty());
    }

    #[test]
    fn test_final_segments_append_with_newlines() {
        let (mut session, bridge) = session_with_bridge();
        session.start_listening().unwrap();
        assert_eq!(session.state(), ReviewState::Recording);
        assert_eq!(bridge.locale.lock().unwrap().as_deref(), Some("en-IN"));

        bridge.send(SpeechEvent::Started);
        bridge.send(SpeechEvent::InterimUpdate { text: "head".to_string() });
        bridge.send(SpeechEvent::InterimUpdate { text: "headache since".to_string() });
        assert_eq!(session.pump_speech_events(), 3);
        assert_eq!(session.interim(), "headache since");
        assert_eq!(session.transcript(), "");

        bridge.send(SpeechEvent::FinalSegment { text: "Headache since Monday".to_string() });
        bridge.send(SpeechEvent::FinalSegment { text: " take rest ".to_string() });
        session.pump_speech_events();
        assert_eq!(session.transcript(), "Headache since Monday\ntake rest");
        assert_eq!(session.interim(), "");
    }

    #[test]
    fn test_stop_listening_applies_pending_and_releases_mic() {
        let (mut session, bridge) = session_with_bridge();
        session.start_listening().unwrap();
        bridge.send(SpeechEvent::InterimUpdate { text: "co".to_string() });
        bridge.send(SpeechEvent::FinalSegment { text: "Cough".to_string() });
        bridge.send(SpeechEvent::InterimUpdate { text: "and fe".to_string() });

        session.stop_listening();
        assert_eq!(bridge.stops.load(Ordering::SeqCst), 1);
        assert!(!session.is_listening());
        assert_eq!(session.interim(), "");
        assert_eq!(session.transcript(), "Cough");
        assert_eq!(session.state(), ReviewState::Captured);
    }

    #[test]
    fn test_stop_without_speech_returns_to_idle() {
        let (mut session, _bridge) = session_with_bridge();
        session.start_listening().unwrap();
        session.stop_listening();
        assert_eq!(session.state(), ReviewState::Idle);
    }

    #[test]
    fn test_cannot_start_twice_or_without_bridge() {
        let (mut session, bridge) = session_with_bridge();
        session.start_listening().unwrap();
        assert!(matches!(session.start_listening(), Err(SessionError::InvalidTransition(_))));
        assert_eq!(bridge.starts.load(Ordering::SeqCst), 1);

        let mut bare = ReviewSession::new(SessionOptions::default());
        assert!(matches!(bare.start_listening(), Err(SessionError::NoSpeechBridge)));
    }

    #[test]
    fn test_start_failure_sets_mic_error() {
        let bridge = ScriptedBridge {
            deny: true,
            ..Default::default()
        };
        let mut session = ReviewSession::with_bridge(SessionOptions::default(), Box::new(bridge));
        assert!(matches!(session.start_listening(), Err(SessionError::Speech(_))));
        assert_eq!(session.mic_error(), Some("not-allowed"));
        assert!(!session.is_listening());
    }

    #[test]
    fn test_recognition_error_keeps_transcript() {
        let (mut session, bridge) = session_with_bridge();
        session.start_listening().unwrap();
        bridge.send(SpeechEvent::FinalSegment { text: "Fever".to_string() });
        bridge.send(SpeechEvent::InterimUpdate { text: "and".to_string() });
        bridge.send(SpeechEvent::Error { code: "no-speech".to_string() });
        session.pump_speech_events();

        assert_eq!(session.mic_error(), Some("no-speech"));
        assert!(!session.is_listening());
        assert_eq!(session.interim(), "");
        assert_eq!(session.transcript(), "Fever");
        assert_eq!(session.state(), ReviewState::Captured);
    }

    #[test]
    fn test_drop_releases_microphone() {
        let (mut session, bridge) = session_with_bridge();
        session.start_listening().unwrap();
        drop(session);
        assert_eq!(bridge.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_releases_and_resets() {
        let (mut session, bridge) = session_with_bridge();
        session.start_listening().unwrap();
        bridge.send(SpeechEvent::FinalSegment { text: "Fever".to_string() });
        session.pump_speech_events();

        session.close();
        assert_eq!(bridge.stops.load(Ordering::SeqCst), 1);
        assert_eq!(session.transcript(), "");
        assert!(session.results().is_none());
        assert_eq!(session.state(), ReviewState::Idle);

        // Dropping after close does not stop the bridge again
        drop(session);
        assert_eq!(bridge.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_transcript_analyzes_to_empty() {
        let mut session = ReviewSession::new(SessionOptions::default());
        session.set_transcript("   \n  ");
        session.analyze(&rules()).await.unwrap();
        assert_eq!(session.state(), ReviewState::Analyzed);
        assert_eq!(session.results(), Some(&[][..]));
        assert!(!session.can_submit());
        assert!(matches!(session.submit(), Err(SessionError::NothingToSubmit)));
    }

    #[tokio::test]
    async fn test_other_only_results_disable_submit() {
        let mut session = ReviewSession::new(SessionOptions::default());
        session.set_transcript("Blood pressure is 120 over 80.");
        session.analyze(&rules()).await.unwrap();
        assert_eq!(session.results().map(<[_]>::len), Some(1));
        assert!(!session.can_submit());
    }

    #[tokio::test]
    async fn test_analyze_and_submit_buckets_in_order() {
        let mut session = ReviewSession::new(SessionOptions::default());
        session.set_transcript(
            "Fever since two days. Blood pressure is normal.\nTake paracetamol 650 mg. I also have a cough.",
        );
        session.analyze(&rules()).await.unwrap();
        assert!(session.can_submit());

        let payload = session.submit().unwrap();
        assert_eq!(payload.complaints, vec!["Fever since two days.", "I also have a cough."]);
        assert_eq!(payload.advice, vec!["Take paracetamol 650 mg."]);
        assert_eq!(session.state(), ReviewState::Submitted);
        // Cleared after submit by default, transcript kept
        assert!(session.results().is_none());
        assert!(session.transcript().starts_with("Fever since two days."));
    }

    #[tokio::test]
    async fn test_submit_can_keep_results() {
        let options = SessionOptions {
            clear_after_submit: false,
            ..Default::default()
        };
        let mut session = ReviewSession::new(options);
        session.set_transcript("Cough for a week");
        session.analyze(&rules()).await.unwrap();
        session.submit().unwrap();
        assert!(session.results().is_some());
    }

    #[tokio::test]
    async fn test_edit_keeps_stale_results() {
        let mut session = ReviewSession::new(SessionOptions::default());
        session.set_transcript("I have a headache.");
        session.analyze(&rules()).await.unwrap();

        session.set_transcript("Completely different text");
        assert_eq!(session.state(), ReviewState::Captured);
        let results = session.results().unwrap();
        assert_eq!(results[0].text, "I have a headache.");
        assert!(session.can_submit());
    }

    #[test]
    fn test_reentrant_analysis_rejected() {
        let mut session = ReviewSession::new(SessionOptions::default());
        session.set_transcript("Cough");
        let request = session.begin_analysis().unwrap().unwrap();
        assert!(session.is_analyzing());
        assert!(matches!(session.begin_analysis(), Err(SessionError::AnalysisInProgress)));
        assert_eq!(request.sentences, vec!["Cough"]);
        assert_eq!(request.lang, "en");
    }

    #[test]
    fn test_cancel_discards_in_flight_result() {
        let mut session = ReviewSession::new(SessionOptions::default());
        session.set_transcript("Cough");
        let request = session.begin_analysis().unwrap().unwrap();

        session.cancel();
        assert_eq!(session.state(), ReviewState::Cancelled);
        assert!(!session.is_analyzing());

        let landed = session.complete_analysis(
            request.generation,
            Ok(vec![ClassifiedUtterance::new("Cough", UtteranceClass::Complaint)]),
        );
        assert!(!landed);
        assert!(session.results().is_none());
        assert_eq!(session.state(), ReviewState::Cancelled);
        assert_eq!(session.transcript(), "Cough");
    }

    #[test]
    fn test_cancel_while_recording_stops_microphone() {
        let (mut session, bridge) = session_with_bridge();
        session.start_listening().unwrap();
        bridge.send(SpeechEvent::FinalSegment { text: "Fever".to_string() });
        bridge.send(SpeechEvent::InterimUpdate { text: "and co".to_string() });

        session.cancel();
        assert_eq!(bridge.stops.load(Ordering::SeqCst), 1);
        assert!(!session.is_listening());
        assert_eq!(session.interim(), "");
        assert_eq!(session.transcript(), "Fever");
        assert_eq!(session.state(), ReviewState::Cancelled);

        // The bridge channel is closed, so late speech cannot reach the transcript
        bridge.send(SpeechEvent::FinalSegment { text: "Cough".to_string() });
        assert_eq!(session.pump_speech_events(), 0);
        assert_eq!(session.transcript(), "Fever");

        drop(session);
        assert_eq!(bridge.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_service_failure_lands_as_empty() {
        let mut session = ReviewSession::new(SessionOptions::default());
        session.set_transcript("Cough");
        let request = session.begin_analysis().unwrap().unwrap();
        let landed = session.complete_analysis(
            request.generation,
            Err(ClassifyError::MalformedResponse("boom".to_string())),
        );
        assert!(landed);
        assert_eq!(session.results(), Some(&[][..]));
        assert_eq!(session.state(), ReviewState::Analyzed);
        assert!(!session.is_analyzing());
    }

    #[test]
    fn test_cannot_analyze_while_recording() {
        let (mut session, _bridge) = session_with_bridge();
        session.start_listening().unwrap();
        assert!(matches!(session.begin_analysis(), Err(SessionError::InvalidTransition(_))));
    }

    #[test]
    fn test_language_reaches_request_and_locale() {
        let bridge = ScriptedBridge::default();
        let options = SessionOptions {
            language: "hi".to_string(),
            ..Default::default()
        };
        let mut session = ReviewSession::with_bridge(options, Box::new(bridge.clone()));
        session.start_listening().unwrap();
        assert_eq!(bridge.locale.lock().unwrap().as_deref(), Some("hi-IN"));
        session.stop_listening();

        session.set_transcript("Sar dard hai");
        let request = session.begin_analysis().unwrap().unwrap();
        assert_eq!(request.lang, "hi");
    }

    #[test]
    fn test_status_snapshot() {
        let mut session = ReviewSession::new(SessionOptions::default());
        let status = session.status();
        assert_eq!(status.result_count, None);
        assert!(status.analyzed_at.is_none());
        assert!(!status.can_submit);

        session.set_transcript("Rest well");
        let request = session.begin_analysis().unwrap().unwrap();
        assert!(session.status().is_analyzing);
        session.complete_analysis(
            request.generation,
            Ok(vec![ClassifiedUtterance::new("Rest well", UtteranceClass::Advice)]),
        );
        let status = session.status();
        assert_eq!(status.state, ReviewState::Analyzed);
        assert_eq!(status.result_count, Some(1));
        assert!(status.analyzed_at.unwrap() >= status.opened_at);
        assert!(status.can_submit);
        assert_eq!(status.transcript_chars, 9);
    }
}
