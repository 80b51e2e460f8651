use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::models::difficulty::{DifficultyRequest, DifficultyResponse};
use crate::utils::retry::{retry_async, RetryPolicy};

use super::difficulty_service::PhrasingClient;

/// Phrasing collaborator reached over HTTP at `{base_url}/v1/difficulty`.
pub struct HttpPhrasingClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl HttpPhrasingClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build difficulty collaborator HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    async fn post_once(
        &self,
        url: &str,
        request: &DifficultyRequest,
    ) -> Result<DifficultyResponse> {
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .context("Failed to call difficulty collaborator")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Difficulty collaborator returned error {}: {}",
                status,
                body
            ));
        }

        response
            .json::<DifficultyResponse>()
            .await
            .context("Failed to parse difficulty collaborator response")
    }
}

#[async_trait]
impl PhrasingClient for HttpPhrasingClient {
    async fn phrase(&self, request: &DifficultyRequest) -> Result<DifficultyResponse> {
        let url = format!("{}/v1/difficulty", self.base_url);
        tracing::debug!("Requesting difficulty phrasing from {}", url);

        let url = url.as_str();
        retry_async(&self.retry, || self.post_once(url, request)).await
    }
}
