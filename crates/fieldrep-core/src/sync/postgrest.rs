//! Remote gateway for a PostgREST (Supabase) backend.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::gateway::{FetchFilter, GatewayError, GatewayResult, RemoteGateway};
use crate::config::EngineConfig;
use crate::models::{RecordId, Table};
use crate::util::{compact_text, is_http_url, normalize_text_option};

/// [`RemoteGateway`] over the PostgREST HTTP API at `{base}/rest/v1`.
#[derive(Clone)]
pub struct PostgrestGateway {
    rest_url: String,
    api_key: String,
    client: Client,
}

impl PostgrestGateway {
    pub fn new(
        base_url: impl AsRef<str>,
        api_key: impl Into<String>,
        timeout: std::time::Duration,
    ) -> GatewayResult<Self> {
        let rest_url = normalize_rest_url(base_url.as_ref())?;
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(GatewayError::InvalidConfiguration(
                "API key must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| GatewayError::InvalidConfiguration(error.to_string()))?;

        Ok(Self {
            rest_url,
            api_key,
            client,
        })
    }

    /// Build from engine settings; `None` when the remote is not configured.
    pub fn from_config(config: &EngineConfig) -> GatewayResult<Option<Self>> {
        match (&config.remote_url, &config.remote_api_key) {
            (Some(url), Some(key)) => {
                Self::new(url, key.clone(), config.request_timeout()).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table.name()))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(request: RequestBuilder) -> GatewayResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|error| GatewayError::Unavailable(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_api_error(status, &body);
        if is_transient(status) {
            Err(GatewayError::Unavailable(message))
        } else {
            Err(GatewayError::Rejected(message))
        }
    }
}

#[async_trait]
impl RemoteGateway for PostgrestGateway {
    async fn upsert(&self, table: Table, record: &Value) -> GatewayResult<Value> {
        let request = self
            .request(Method::POST, table)
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[record]);

        let rows = Self::send(request)
            .await?
            .json::<Vec<Value>>()
            .await
            .map_err(|error| GatewayError::Unavailable(error.to_string()))?;

        Ok(rows.into_iter().next().unwrap_or_else(|| record.clone()))
    }

    async fn fetch(&self, table: Table, filter: Option<&FetchFilter>) -> GatewayResult<Vec<Value>> {
        let mut request = self
            .request(Method::GET, table)
            .query(&[("select", "*")]);
        if let Some(filter) = filter {
            request = request.query(&[(filter.column.as_str(), format!("eq.{}", filter.value))]);
        }

        Self::send(request)
            .await?
            .json::<Vec<Value>>()
            .await
            .map_err(|error| GatewayError::Unavailable(error.to_string()))
    }

    async fn delete(&self, table: Table, record_id: &RecordId) -> GatewayResult<()> {
        let request = self
            .request(Method::DELETE, table)
            .query(&[("id", format!("eq.{record_id}"))]);

        Self::send(request).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.details).or(payload.hint) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

fn normalize_rest_url(raw: &str) -> GatewayResult<String> {
    let base = normalize_text_option(Some(raw.to_string())).ok_or_else(|| {
        GatewayError::InvalidConfiguration("remote URL must not be empty".to_string())
    })?;
    if !is_http_url(&base) {
        return Err(GatewayError::InvalidConfiguration(
            "remote URL must include http:// or https://".to_string(),
        ));
    }

    let base = base.trim_end_matches('/');
    if base.ends_with("/rest/v1") {
        Ok(base.to_string())
    } else {
        Ok(format!("{base}/rest/v1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn normalize_rest_url_appends_rest_prefix() {
        assert_eq!(
            normalize_rest_url("https://project.supabase.co/").unwrap(),
            "https://project.supabase.co/rest/v1"
        );
        assert_eq!(
            normalize_rest_url("https://project.supabase.co/rest/v1/").unwrap(),
            "https://project.supabase.co/rest/v1"
        );
    }

    #[test]
    fn normalize_rest_url_rejects_invalid_values() {
        assert!(normalize_rest_url("  ").is_err());
        assert!(normalize_rest_url("project.supabase.co").is_err());
    }

    #[test]
    fn new_rejects_empty_key() {
        let result = PostgrestGateway::new("https://x.io", " ", Duration::from_secs(1));
        assert!(matches!(result, Err(GatewayError::InvalidConfiguration(_))));
    }

    #[test]
    fn from_config_requires_url_and_key() {
        let config = EngineConfig {
            remote_url: Some("https://x.io".to_string()),
            ..EngineConfig::default()
        };
        assert!(PostgrestGateway::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn parse_api_error_prefers_message() {
        let message = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{"code":"23502","message":"null value in column \"client_id\"","details":null}"#,
        );
        assert_eq!(message, "null value in column \"client_id\" (400)");
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
    }

    #[test]
    fn transient_statuses() {
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_transient(StatusCode::CONFLICT));
    }
}
