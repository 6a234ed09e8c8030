use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::config::join_segments;
use crate::error::AutoDuoError;
use crate::types::Account;

/// Header carrying the pre-shared backend key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Client for the AutoDuo accounts backend.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    secret: Arc<str>,
}

impl BackendClient {
    pub fn new(http: reqwest::Client, base_url: Url, secret: impl Into<Arc<str>>) -> Self {
        Self {
            http,
            base_url,
            secret: secret.into(),
        }
    }

    /// Accounts enrolled for `id`. Any fetch or parse failure yields an empty
    /// list so the page still renders.
    pub async fn get_active_accounts(&self, id: &str) -> Vec<Account> {
        match self.fetch_accounts(id).await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!(id, error = %e, "listing accounts failed; rendering none");
                Vec::new()
            }
        }
    }

    async fn fetch_accounts(&self, id: &str) -> Result<Vec<Account>, AutoDuoError> {
        let url = join_segments(&self.base_url, &["get_accounts", id])?;
        let body = self
            .http
            .get(url)
            .header(API_KEY_HEADER, self.secret.as_ref())
            .send()
            .await?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn add_account(&self, uid: &str, code: &str) -> Result<(), AutoDuoError> {
        self.post_enrollment("add_account", uid, code).await?;
        info!(uid, "account added");
        Ok(())
    }

    pub async fn remove_account(&self, uid: &str, code: &str) -> Result<(), AutoDuoError> {
        self.post_enrollment("remove_account", uid, code).await?;
        info!(uid, "account removed");
        Ok(())
    }

    /// `POST {base}/{op}?uid=..&code=..`; non-2xx becomes [`AutoDuoError::Upstream`].
    async fn post_enrollment(&self, op: &str, uid: &str, code: &str) -> Result<(), AutoDuoError> {
        let mut url = join_segments(&self.base_url, &[op])?;
        url.query_pairs_mut()
            .append_pair("uid", uid)
            .append_pair("code", code);

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, self.secret.as_ref())
            .send()
            .await?;
        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status();
        let message = match resp.bytes().await {
            Ok(body) => message_from_body(&body).unwrap_or_else(|| status_text(status)),
            Err(_) => status_text(status),
        };
        warn!(op, %status, upstream_message = %message, "backend rejected request");
        Err(AutoDuoError::Upstream(message))
    }
}

/// The `message` field of a JSON error body, if there is one.
pub fn message_from_body(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("message")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Reason phrase for `status`, or the bare code when it has none.
pub fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}
