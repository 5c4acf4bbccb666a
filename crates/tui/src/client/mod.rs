//! Typed HTTP client for the expense service.
//!
//! One method per service route. Every failure is classified into
//! [`ApiError`] and returned to the caller; nothing here retries.

use std::time::Duration;

use api_types::expense::{Expense, ExpenseCreate, ExpenseUpdate};
use api_types::summary::{CategorySummary, MonthlySummary};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

/// Why a single request failed.
///
/// `Timeout` and `Unreachable` are transport-level: the service never
/// answered. `Rejected` means the service did answer and either refused the
/// request or produced a body this client cannot decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request timed out - is the backend reachable?")]
    Timeout,
    #[error("cannot connect to the backend: {0}")]
    Unreachable(String),
    #[error("request rejected ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Terminal(format!("invalid base_url: {err}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    pub async fn list(&self) -> std::result::Result<Vec<Expense>, ApiError> {
        let res = self
            .http
            .get(self.endpoint("expenses")?)
            .send()
            .await
            .map_err(classify)?;
        decode(res).await
    }

    pub async fn get(&self, id: i64) -> std::result::Result<Expense, ApiError> {
        let res = self
            .http
            .get(self.endpoint(&format!("expenses/{id}"))?)
            .send()
            .await
            .map_err(classify)?;
        decode(res).await
    }

    pub async fn create(
        &self,
        payload: &ExpenseCreate,
    ) -> std::result::Result<Expense, ApiError> {
        let res = self
            .http
            .post(self.endpoint("expenses")?)
            .json(payload)
            .send()
            .await
            .map_err(classify)?;
        decode(res).await
    }

    pub async fn update(
        &self,
        id: i64,
        payload: &ExpenseUpdate,
    ) -> std::result::Result<Expense, ApiError> {
        let res = self
            .http
            .put(self.endpoint(&format!("expenses/{id}"))?)
            .json(payload)
            .send()
            .await
            .map_err(classify)?;
        decode(res).await
    }

    pub async fn delete(&self, id: i64) -> std::result::Result<(), ApiError> {
        let res = self
            .http
            .delete(self.endpoint(&format!("expenses/{id}"))?)
            .send()
            .await
            .map_err(classify)?;
        let status = res.status();
        if status.is_success() {
            return Ok(());
        }
        Err(ApiError::Rejected {
            status,
            body: rejected_body(res).await,
        })
    }

    pub async fn category_summary(
        &self,
    ) -> std::result::Result<Vec<CategorySummary>, ApiError> {
        let res = self
            .http
            .get(self.endpoint("expenses/summary/category")?)
            .send()
            .await
            .map_err(classify)?;
        decode(res).await
    }

    pub async fn monthly_summary(
        &self,
    ) -> std::result::Result<Vec<MonthlySummary>, ApiError> {
        let res = self
            .http
            .get(self.endpoint("expenses/summary/monthly")?)
            .send()
            .await
            .map_err(classify)?;
        decode(res).await
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::Unreachable(format!("invalid request url: {err}")))
    }
}

/// Maps a transport failure onto the error taxonomy.
fn classify(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        tracing::warn!("request timed out");
        return ApiError::Timeout;
    }
    tracing::warn!("transport failure: {err}");
    ApiError::Unreachable(err.to_string())
}

/// Reads a response to completion and decodes the expected body.
///
/// A non-success status becomes `Rejected` carrying the raw body text; so
/// does a success status whose body does not decode, since a malformed
/// answer is indistinguishable from a refused request for the caller.
async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> std::result::Result<T, ApiError> {
    let status = res.status();
    if !status.is_success() {
        return Err(ApiError::Rejected {
            status,
            body: rejected_body(res).await,
        });
    }

    let body = res.text().await.map_err(classify)?;
    serde_json::from_str(&body).map_err(|err| {
        tracing::warn!("undecodable response body: {err}");
        ApiError::Rejected {
            status,
            body: format!("unparseable response body: {err}"),
        }
    })
}

async fn rejected_body(res: reqwest::Response) -> String {
    let body = res.text().await.unwrap_or_default();
    if body.is_empty() {
        "unknown error".to_string()
    } else {
        body
    }
}
