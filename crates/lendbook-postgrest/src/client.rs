//! The reqwest-backed [`Backend`] implementation.

use async_trait::async_trait;
use lendbook_store::{Backend, BackendError, Criteria, Range, RecordId, Rows};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use serde_json::Value;

use crate::config::PostgrestConfig;
use crate::error::PostgrestError;
use crate::request::TableRequest;
use crate::response::{error_from_response, error_from_transport, parse_content_range};

/// Backend talking to the managed Postgres REST API.
///
/// Performs no retries and no caching; both belong to the
/// [`RecordStore`](lendbook_store::RecordStore) wrapping it.
#[derive(Debug, Clone)]
pub struct PostgrestBackend {
    http: reqwest::Client,
    base_url: String,
    schema: Option<String>,
    order: Option<String>,
}

impl PostgrestBackend {
    /// Build a backend from connection settings.
    pub fn new(config: &PostgrestConfig) -> Result<Self, PostgrestError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value("apikey", &config.api_key)?);
        headers.insert(
            AUTHORIZATION,
            header_value("Authorization", &format!("Bearer {}", config.bearer_token()))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.rest_url(),
            schema: config.schema.clone(),
            order: config.order.clone(),
        })
    }

    /// Base URL of the REST API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: TableRequest) -> Result<reqwest::Response, BackendError> {
        let url = format!("{}/{}", self.base_url, request.table);
        tracing::debug!(method = %request.method, table = %request.table, "Sending request");

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .query(&request.query);
        if let Some(prefer) = request.prefer_header() {
            builder = builder.header("Prefer", prefer);
        }
        if let Some(schema) = &self.schema {
            builder = builder.header("Accept-Profile", schema);
            if request.writes() {
                builder = builder.header("Content-Profile", schema);
            }
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| error_from_transport(&e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = error_from_response(status, &body);
        tracing::debug!(
            status = status.as_u16(),
            code = ?error.code,
            table = %request.table,
            "Request failed"
        );
        Err(error)
    }

    async fn rows(response: reqwest::Response) -> Result<Vec<Value>, BackendError> {
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| error_from_transport(&e))
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, PostgrestError> {
    let mut value = HeaderValue::from_str(value).map_err(|_| PostgrestError::InvalidHeader(name))?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl Backend for PostgrestBackend {
    async fn insert_one(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        let response = self.send(TableRequest::insert(table, row)).await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::permanent("insert returned no row"))
    }

    async fn select_by_id(
        &self,
        table: &str,
        id: &RecordId,
    ) -> Result<Option<Value>, BackendError> {
        let response = self.send(TableRequest::select_by_id(table, id)).await?;
        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn select_range(
        &self,
        table: &str,
        criteria: &Criteria,
        range: Range,
    ) -> Result<Rows, BackendError> {
        let request = TableRequest::select_range(table, criteria, range, self.order.as_deref());
        let response = self.send(request).await?;

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);
        let rows = Rows::new(Self::rows(response).await?);

        Ok(match total {
            Some(total) => rows.with_total(total),
            None => rows,
        })
    }

    async fn update_by_id(
        &self,
        table: &str,
        id: &RecordId,
        patch: Value,
    ) -> Result<Option<Value>, BackendError> {
        let response = self
            .send(TableRequest::update_by_id(table, id, patch))
            .await?;
        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn delete_by_id(&self, table: &str, id: &RecordId) -> Result<(), BackendError> {
        self.send(TableRequest::delete_by_id(table, id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_rest_url() {
        let backend =
            PostgrestBackend::new(&PostgrestConfig::new("https://abc.example.co/", "anon")).unwrap();
        assert_eq!(backend.base_url(), "https://abc.example.co/rest/v1");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = PostgrestBackend::new(&PostgrestConfig::new("", "anon"));
        assert!(matches!(result, Err(PostgrestError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_rejects_unprintable_key() {
        let result = PostgrestBackend::new(&PostgrestConfig::new("https://abc.example.co", "bad\nkey"));
        assert!(matches!(result, Err(PostgrestError::InvalidHeader("apikey"))));
    }
}
