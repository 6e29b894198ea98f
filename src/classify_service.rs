//! HTTP client for the classify-utterances service.
//!
//! Request: `POST {base}/classify-utterances` with `{"lang": ..., "sentences": [...]}`.
//! The response is handed to [`parse_service_response`] which copes with the
//! service's inconsistent label shapes.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::classifier::{ClassifyError, UtteranceClassifier};
use crate::service_response::{into_classified, parse_service_response, LabeledItem};
use crate::utterance::ClassifiedUtterance;

/// Path of the classification endpoint under the configured base URL
pub const CLASSIFY_PATH: &str = "/classify-utterances";

/// Default timeout for one classification request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts for transient failures
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 250;

/// Maximum backoff delay
const MAX_BACKOFF_MS: u64 = 2000;

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    lang: &'a str,
    sentences: &'a [String],
}

/// Check if a reqwest error is retryable (transient network issues)
fn is_retryable_error(err: &reqwest::Error) -> bool {
    if err.is_connect() || err.is_timeout() {
        return true;
    }
    if let Some(status) = err.status() {
        return is_retryable_status(status);
    }
    false
}

fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
}

/// Exponential backoff with a little jitter
fn calculate_backoff(attempt: u32) -> Duration {
    let base_delay = INITIAL_BACKOFF_MS.saturating_mul(2u64.saturating_pow(attempt));
    let capped_delay = base_delay.min(MAX_BACKOFF_MS);
    let jitter = u64::from(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_millis(),
    ) % 50;
    Duration::from_millis(capped_delay + jitter)
}

/// Client for the external classification service
#[derive(Debug, Clone)]
pub struct ClassifyServiceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_attempts: u32,
}

impl ClassifyServiceClient {
    /// Create a client, validating the base URL.
    ///
    /// Only `http`/`https` URLs without embedded credentials are accepted.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ClassifyError> {
        let cleaned_url = base_url.trim().trim_end_matches('/');

        let parsed = reqwest::Url::parse(cleaned_url)
            .map_err(|e| ClassifyError::InvalidUrl(format!("'{}': {}", cleaned_url, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClassifyError::InvalidUrl(format!(
                "scheme must be http or https, got: {}",
                parsed.scheme()
            )));
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(ClassifyError::InvalidUrl(
                "URL must not contain credentials".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(DEFAULT_TIMEOUT)
            .build()?;

        info!("Classification client created for {}", cleaned_url);

        Ok(Self {
            client,
            base_url: cleaned_url.to_string(),
            api_key: api_key.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    /// Override the number of attempts (at least one)
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if !self.api_key.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Classify all sentences in one request, retrying transient failures.
    pub async fn classify_utterances(
        &self,
        lang: &str,
        sentences: &[String],
    ) -> Result<Vec<LabeledItem>, ClassifyError> {
        let url = format!("{}{}", self.base_url, CLASSIFY_PATH);
        let request = ClassifyRequest { lang, sentences };
        debug!("Classifying {} sentences via {} (lang={})", sentences.len(), url, lang);

        let mut last_error: Option<ClassifyError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let backoff = calculate_backoff(attempt - 1);
                warn!(
                    "Classification attempt {} failed, retrying in {:?}",
                    attempt, backoff
                );
                tokio::time::sleep(backoff).await;
            }

            match self
                .client
                .post(&url)
                .headers(self.headers())
                .json(&request)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body: Value = response.json().await?;
                        let items = parse_service_response(&body, sentences)?;
                        info!("Classification service returned {} items", items.len());
                        return Ok(items);
                    }

                    let body = response.text().await.unwrap_or_default();
                    let err = ClassifyError::Status {
                        status: status.as_u16(),
                        body,
                    };
                    if is_retryable_status(status) {
                        last_error = Some(err);
                        continue;
                    }
                    error!("Classification service returned {}", status);
                    return Err(err);
                }
                Err(e) => {
                    if is_retryable_error(&e) {
                        last_error = Some(ClassifyError::Network(e));
                        continue;
                    }
                    error!("Failed to reach classification service: {}", e);
                    return Err(ClassifyError::Network(e));
                }
            }
        }

        error!(
            "Classification failed after {} attempts",
            self.max_attempts
        );
        Err(last_error.unwrap_or_else(|| {
            ClassifyError::MalformedResponse("no classification attempt was made".to_string())
        }))
    }
}

/// Batch classifier backed by the remote service
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    client: ClassifyServiceClient,
    /// Voice-overlay relabeling of `other`/unrecognized and short advice
    refine: bool,
    with_concepts: bool,
}

impl RemoteClassifier {
    pub fn new(client: ClassifyServiceClient, refine: bool, with_concepts: bool) -> Self {
        Self {
            client,
            refine,
            with_concepts,
        }
    }
}

#[async_trait]
impl UtteranceClassifier for RemoteClassifier {
    fn name(&self) -> &str {
        "remote"
    }

    async fn classify_batch(
        &self,
        lang: &str,
        sentences: &[String],
    ) -> Result<Vec<ClassifiedUtterance>, ClassifyError> {
        let items = self.client.classify_utterances(lang, sentences).await?;
        Ok(items
            .into_iter()
            .map(|item| into_classified(item, self.refine, self.with_concepts))
            .collect())
    }
}
