//! Trait abstraction for the API client to enable mocking in tests

use crate::forms::{FieldValue, FormEvent, SubmitOutcome};
use crate::state::{Investment, Transaction};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Trait for Finch API operations, enabling mocking in tests
#[allow(dead_code)]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiClientTrait: Send + Sync {
    /// Check if the API server is reachable
    async fn check_connection(&self) -> bool;

    /// List the user's transactions
    async fn list_transactions(&mut self) -> Result<Vec<Transaction>>;

    /// List the user's investments
    async fn list_investments(&mut self) -> Result<Vec<Investment>>;

    /// Submit validated, sanitized form data
    async fn submit_form(
        &mut self,
        form_id: &str,
        data: BTreeMap<String, FieldValue>,
    ) -> Result<SubmitOutcome>;

    /// Deliver recorded form interaction events (best effort)
    async fn track_events(&mut self, events: Vec<FormEvent>) -> Result<()>;
}
