use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::row::Dataset;
use crate::http::dto::StatusBody;

#[derive(Serialize)]
struct ReplaceBody<'a> {
    data: &'a Dataset,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Rejected { status: StatusCode, message: String },
}

/// The row collection over HTTP, for shells that keep their dataset on a server.
#[derive(Debug, Clone)]
pub struct RowCollectionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RowCollectionClient {
    /// `base_url` like `http://127.0.0.1:3000`; `resource` is the path segment after `/api/`.
    pub fn new(base_url: &str, resource: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, resource)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, resource: &str) -> Self {
        Self {
            http,
            endpoint: format!(
                "{}/api/{}",
                base_url.trim_end_matches('/'),
                resource.trim_matches('/')
            ),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch_all(&self) -> Result<Dataset, ClientError> {
        let response = self.http.get(&self.endpoint).send().await?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(response.json::<Dataset>().await?)
    }

    pub async fn replace_all(&self, rows: &Dataset) -> Result<(), ClientError> {
        let response = self
            .http
            .put(&self.endpoint)
            .json(&ReplaceBody { data: rows })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(rejected(response).await);
        }
        Ok(())
    }
}

async fn rejected(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<StatusBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);
    ClientError::Rejected { status, message }
}
