// Sentiment Classifier Implementations

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::kernel::traits::BaseSentimentClassifier;

// =============================================================================
// HTTP Classifier (external model service)
// =============================================================================

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

/// Accepts either a numeric score or a label, so label-only models
/// (POSITIVE / NEGATIVE) can be plugged in unchanged.
#[derive(Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    label: Option<String>,
}

impl ClassifyResponse {
    fn polarity(&self) -> Result<f64> {
        if let Some(score) = self.score {
            return Ok(score);
        }
        match self.label.as_deref().map(str::to_ascii_uppercase).as_deref() {
            Some("POSITIVE") => Ok(1.0),
            Some("NEGATIVE") => Ok(-1.0),
            Some(_) => Ok(0.0),
            None => anyhow::bail!("classifier response had neither score nor label"),
        }
    }
}

/// Posts `{"text": ...}` to a classifier endpoint
pub struct HttpSentimentClassifier {
    client: reqwest::Client,
    url: String,
}

impl HttpSentimentClassifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build sentiment HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl BaseSentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<f64> {
        let response = self
            .client
            .post(&self.url)
            .json(&ClassifyRequest { text })
            .send()
            .await
            .context("Sentiment request failed")?
            .error_for_status()
            .context("Sentiment service returned an error")?
            .json::<ClassifyResponse>()
            .await
            .context("Failed to parse sentiment response")?;

        response.polarity()
    }
}

// =============================================================================
// No-op Classifier (auto-rewards disabled)
// =============================================================================

/// Scores every message as neutral
pub struct NoopSentimentClassifier;

#[async_trait]
impl BaseSentimentClassifier for NoopSentimentClassifier {
    async fn classify(&self, _text: &str) -> Result<f64> {
        Ok(0.0)
    }
}

/// Pick a classifier based on configuration
pub fn create_sentiment_classifier(url: Option<String>) -> Result<Arc<dyn BaseSentimentClassifier>> {
    match url {
        Some(url) => {
            tracing::info!(url = %url, "Using HTTP sentiment classifier");
            Ok(Arc::new(HttpSentimentClassifier::new(url)?))
        }
        None => {
            tracing::info!("SENTIMENT_URL not set, auto-rewards disabled");
            Ok(Arc::new(NoopSentimentClassifier))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_takes_precedence_over_label() {
        let resp: ClassifyResponse =
            serde_json::from_str(r#"{"score": -0.4, "label": "POSITIVE"}"#).unwrap();
        assert_eq!(resp.polarity().unwrap(), -0.4);
    }

    #[test]
    fn label_only_responses_map_to_polarity() {
        let positive: ClassifyResponse = serde_json::from_str(r#"{"label": "positive"}"#).unwrap();
        let neutral: ClassifyResponse =
            serde_json::from_str(r#"{"label": "NEUTRAL_OR_NEGATIVE"}"#).unwrap();

        assert_eq!(positive.polarity().unwrap(), 1.0);
        assert_eq!(neutral.polarity().unwrap(), 0.0);
    }

    #[test]
    fn empty_response_is_an_error() {
        let resp: ClassifyResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.polarity().is_err());
    }

    #[tokio::test]
    async fn noop_classifier_is_neutral() {
        let classifier = create_sentiment_classifier(None).unwrap();
        assert_eq!(classifier.classify("This is amazing!").await.unwrap(), 0.0);
    }
}
