use crate::application::ports::{RemoteBackend, SessionProvider};
use crate::shared::error::RemoteError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// PostgREST-style backend client. Upserts are keyed on the row's `id`
/// column, so replaying the same write converges instead of duplicating.
pub struct RestRemoteBackend {
    http: Client,
    base_url: String,
    session: Arc<dyn SessionProvider>,
}

impl RestRemoteBackend {
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| RemoteError::Network(format!("http client init failed: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, RemoteError> {
        let token = self.session.access_token().await?;
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                RemoteError::Network(format!("request timed out: {err}"))
            } else {
                RemoteError::Network(err.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::from_status(status.as_u16(), body))
    }
}

#[async_trait]
impl RemoteBackend for RestRemoteBackend {
    async fn upsert(&self, table: &str, row: Value) -> Result<Value, RemoteError> {
        debug!("upsert into {}", table);
        let request = self
            .http
            .post(self.table_url(table))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row);
        let response = self.send(self.authorize(request).await?).await?;

        let stored: Value = response
            .json()
            .await
            .map_err(|err| RemoteError::Schema(format!("{table}: invalid upsert response: {err}")))?;
        // Representation comes back as a one-row array.
        match stored {
            Value::Array(mut rows) if rows.len() == 1 => Ok(rows.remove(0)),
            other => Ok(other),
        }
    }

    async fn update(&self, table: &str, patch: Value, key: &str) -> Result<(), RemoteError> {
        debug!("update {} id={}", table, key);
        let request = self
            .http
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{key}"))])
            .json(&patch);
        self.send(self.authorize(request).await?).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteError> {
        debug!("delete from {} id={}", table, id);
        let request = self
            .http
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))]);
        match self.send(self.authorize(request).await?).await {
            Ok(_) => Ok(()),
            // The row being gone already is the desired end state.
            Err(RemoteError::Schema(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn select(&self, table: &str, limit: u32) -> Result<Vec<Value>, RemoteError> {
        debug!("select from {} limit {}", table, limit);
        let request = self
            .http
            .get(self.table_url(table))
            .query(&[("select", "*".to_string()), ("limit", limit.to_string())]);
        let response = self.send(self.authorize(request).await?).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let rows: Value = response
            .json()
            .await
            .map_err(|err| RemoteError::Schema(format!("{table}: invalid select response: {err}")))?;
        match rows {
            Value::Array(rows) => Ok(rows),
            other => Err(RemoteError::Schema(format!(
                "{table}: expected a row array, got {other}"
            ))),
        }
    }
}
