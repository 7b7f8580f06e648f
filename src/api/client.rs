//! HTTP client for the Finch API server
//!
//! JSON over HTTP. Submission responses are mapped into `SubmitOutcome`
//! rather than errors so the form engine can surface them in place;
//! transport failures stay `anyhow` errors.

use crate::api::ApiClientTrait;
use crate::forms::{FieldValue, FormEvent, SubmitHandler, SubmitOutcome};
use crate::state::{Investment, Transaction};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default API address
const DEFAULT_ADDRESS: &str = "http://127.0.0.1:8000";

/// Request timeout for every call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Finch API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// The address comes from `FINCH_API_URL`, then the config file, then
    /// the default.
    pub fn new(configured_url: Option<String>) -> Result<Self> {
        let base_url = std::env::var("FINCH_API_URL")
            .ok()
            .or(configured_url)
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url.trim_end_matches('/'))
    }

    /// Check if the API server is reachable
    pub async fn check_connection(&self) -> bool {
        match self.http.get(self.url("/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// List the user's transactions
    pub async fn list_transactions(&mut self) -> Result<Vec<Transaction>> {
        let response = self
            .http
            .get(self.url("/finance/transactions"))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to list transactions: {e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to list transactions: {e}"))?;
        Ok(response.json().await?)
    }

    /// List the user's investments
    pub async fn list_investments(&mut self) -> Result<Vec<Investment>> {
        let response = self
            .http
            .get(self.url("/invest/investments"))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to list investments: {e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to list investments: {e}"))?;
        Ok(response.json().await?)
    }

    /// Submit validated, sanitized form data
    pub async fn submit_form(
        &mut self,
        form_id: &str,
        data: BTreeMap<String, FieldValue>,
    ) -> Result<SubmitOutcome> {
        let response = self
            .http
            .post(self.url(&format!("/forms/{form_id}/submissions")))
            .json(&data)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach the Finch API: {e}"))?;

        let status = response.status();
        if status.is_success() {
            // 2xx bodies may omit the outcome fields entirely
            Ok(response
                .json::<SubmitOutcome>()
                .await
                .unwrap_or_else(|_| SubmitOutcome::accepted()))
        } else if let Ok(outcome) = response.json::<SubmitOutcome>().await {
            // Backend rejections carry per-field errors in the body
            Ok(outcome)
        } else {
            Ok(SubmitOutcome {
                success: false,
                errors: BTreeMap::new(),
                message: Some(format!("The server rejected the submission ({status})")),
            })
        }
    }

    /// Deliver recorded form interaction events (best effort)
    pub async fn track_events(&mut self, events: Vec<FormEvent>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.http
            .post(self.url("/forms/analytics"))
            .json(&events)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to deliver analytics events: {e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to deliver analytics events: {e}"))?;
        Ok(())
    }
}

#[async_trait]
impl ApiClientTrait for ApiClient {
    async fn check_connection(&self) -> bool {
        ApiClient::check_connection(self).await
    }

    async fn list_transactions(&mut self) -> Result<Vec<Transaction>> {
        ApiClient::list_transactions(self).await
    }

    async fn list_investments(&mut self) -> Result<Vec<Investment>> {
        ApiClient::list_investments(self).await
    }

    async fn submit_form(
        &mut self,
        form_id: &str,
        data: BTreeMap<String, FieldValue>,
    ) -> Result<SubmitOutcome> {
        ApiClient::submit_form(self, form_id, data).await
    }

    async fn track_events(&mut self, events: Vec<FormEvent>) -> Result<()> {
        ApiClient::track_events(self, events).await
    }
}

/// The form engine submits through the same client
#[async_trait]
impl SubmitHandler for ApiClient {
    async fn submit(
        &mut self,
        form_id: &str,
        data: BTreeMap<String, FieldValue>,
    ) -> Result<SubmitOutcome> {
        ApiClient::submit_form(self, form_id, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient {
            http: reqwest::Client::new(),
            base_url: "http://localhost:8000/".to_string(),
        };
        assert_eq!(
            client.url("/finance/transactions"),
            "http://localhost:8000/api/v1/finance/transactions"
        );
    }

    #[tokio::test]
    async fn test_check_connection_false_when_unreachable() {
        // Reserved TEST-NET-1 address; nothing listens there
        let client = ApiClient {
            http: reqwest::Client::builder()
                .timeout(Duration::from_millis(200))
                .build()
                .unwrap(),
            base_url: "http://192.0.2.1:1".to_string(),
        };
        assert!(!client.check_connection().await);
    }
}
