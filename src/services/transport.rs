//! Collaborator seams: the classification upload and the paged history list.
//!
//! Both return the wire payloads untouched; callers decide what
//! `success: false` means for them.

use crate::error::AppError;
use crate::models::api_types::{
    AckResponse, ActivityResponse, DetailsResponse, HistoryResponse, UploadResponse,
};
use crate::models::history_types::HistoryRequestParams;
use crate::services::fs_service::StagedFile;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Upload progress callback, percent in `0..=100`.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Opaque bearer token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.trim().to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[async_trait]
pub trait ClassificationTransport: Send + Sync {
    async fn upload_image(
        &self,
        file: &StagedFile,
        token: &AuthToken,
        progress: ProgressFn,
    ) -> Result<UploadResponse, AppError>;
}

#[async_trait]
pub trait HistoryTransport: Send + Sync {
    async fn fetch_history(
        &self,
        params: &HistoryRequestParams,
        token: &AuthToken,
    ) -> Result<HistoryResponse, AppError>;

    async fn fetch_details(&self, id: &str, token: &AuthToken) -> Result<DetailsResponse, AppError>;

    async fn delete_classification(&self, id: &str, token: &AuthToken) -> Result<AckResponse, AppError>;

    async fn fetch_activity_stats(&self, token: &AuthToken) -> Result<ActivityResponse, AppError>;
}
