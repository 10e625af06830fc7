use crate::config::DashboardConfig;
use crate::error::AppError;
use crate::models::api_types::{
    AckResponse, ActivityResponse, DetailsResponse, HistoryResponse, UploadResponse,
};
use crate::models::history_types::HistoryRequestParams;
use crate::services::fs_service::StagedFile;
use crate::services::transport::{AuthToken, ClassificationTransport, HistoryTransport, ProgressFn};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for the classification API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &DashboardConfig) -> Result<Self, AppError> {
        Self::with_base_url(&config.api_base_url, config.timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Non-2xx becomes `Http`; a 2xx body that isn't the expected JSON becomes `Decode`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let mut body = body;
        body.truncate(floor_char_boundary(&body, MAX_ERROR_BODY));
        return Err(AppError::Http {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(AppError::from)
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|i| s.is_char_boundary(*i)).unwrap_or(0)
}

fn percent_of(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.min(total) * 100) / total) as u8
}

/// Multipart part whose body reports bytes handed to the connection.
fn progress_part(file: &StagedFile, progress: ProgressFn) -> Result<Part, AppError> {
    let data = Arc::clone(&file.bytes);
    let total = data.len();
    let mut sent = 0usize;

    let chunks = futures::stream::iter((0..total).step_by(UPLOAD_CHUNK_SIZE)).map(move |start| {
        let end = (start + UPLOAD_CHUNK_SIZE).min(total);
        let chunk = data[start..end].to_vec();
        sent += chunk.len();
        progress(percent_of(sent, total));
        Ok::<_, std::io::Error>(chunk)
    });

    Part::stream_with_length(Body::wrap_stream(chunks), total as u64)
        .file_name(file.name.clone())
        .mime_str(&file.mime_type)
        .map_err(AppError::from)
}

#[async_trait]
impl ClassificationTransport for ApiClient {
    async fn upload_image(
        &self,
        file: &StagedFile,
        token: &AuthToken,
        progress: ProgressFn,
    ) -> Result<UploadResponse, AppError> {
        tracing::info!(file = %file.name, size = file.size(), "uploading image for classification");

        let form = Form::new().part("image", progress_part(file, progress)?);
        let response = self
            .client
            .post(self.url("/classify-image"))
            .bearer_auth(token.as_str())
            .multipart(form)
            .send()
            .await?;

        let parsed: UploadResponse = read_json(response).await?;
        tracing::debug!(success = parsed.success, "classification response received");
        Ok(parsed)
    }
}

#[async_trait]
impl HistoryTransport for ApiClient {
    async fn fetch_history(
        &self,
        params: &HistoryRequestParams,
        token: &AuthToken,
    ) -> Result<HistoryResponse, AppError> {
        tracing::debug!(page = params.page, sort = params.sort.as_str(), "fetching history page");
        let response = self
            .client
            .get(self.url("/classification-history"))
            .bearer_auth(token.as_str())
            .query(&params.to_query_pairs())
            .send()
            .await?;
        read_json(response).await
    }

    async fn fetch_details(&self, id: &str, token: &AuthToken) -> Result<DetailsResponse, AppError> {
        let response = self
            .client
            .get(self.url(&format!("/classification/{}", id)))
            .bearer_auth(token.as_str())
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_classification(&self, id: &str, token: &AuthToken) -> Result<AckResponse, AppError> {
        tracing::info!(id, "deleting classification");
        let response = self
            .client
            .delete(self.url(&format!("/classification/{}", id)))
            .bearer_auth(token.as_str())
            .send()
            .await?;
        read_json(response).await
    }

    async fn fetch_activity_stats(&self, token: &AuthToken) -> Result<ActivityResponse, AppError> {
        let response = self
            .client
            .get(self.url("/user-activity"))
            .bearer_auth(token.as_str())
            .send()
            .await?;
        read_json(response).await
    }
}
