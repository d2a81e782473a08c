//! Cat fact HTTP client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::field::{display, Empty};
use tracing::Instrument;

use crate::application::errors::BackendError;
use crate::domain::traits::FactSource;

/// Default fact endpoint
pub const DEFAULT_URL: &str = "https://catfact.ninja/fact";

#[derive(Debug, Deserialize)]
struct FactResponse {
    fact: String,
    #[serde(default)]
    #[allow(dead_code)]
    length: usize,
}

/// Fetches one fact per call, no caching or retry
pub struct HttpFactClient {
    client: Client,
    url: String,
}

impl HttpFactClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .user_agent(concat!("otterbot/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn request(&self) -> Result<String, BackendError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        parse_fact(&body)
    }
}

/// Decode a fact service body
fn parse_fact(body: &str) -> Result<String, BackendError> {
    let data: FactResponse =
        serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))?;
    Ok(data.fact)
}

#[async_trait]
impl FactSource for HttpFactClient {
    async fn fetch(&self) -> Result<String, BackendError> {
        let span = tracing::info_span!(
            "get_cat_fact",
            url = %self.url,
            cat_fact.response = Empty,
            cat_fact.error = Empty,
        );
        let recorder = span.clone();

        let result = self.request().instrument(span).await;
        match &result {
            Ok(fact) => {
                recorder.record("cat_fact.response", fact.as_str());
                tracing::debug!("Fetched fact: {}", fact);
            }
            Err(e) => {
                recorder.record("cat_fact.error", display(e));
            }
        }
        result
    }
}
