use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::services::localization::Locale;

/// Every failure the dashboard core can produce.
///
/// Payloads are plain strings so the error can be cloned into the session
/// state and serialized for the UI shell.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    #[error("invalid file: {reason}")]
    InvalidFile { reason: InvalidFileReason },

    #[error("an upload is already in progress")]
    SessionBusy,

    #[error("no file has been selected")]
    NoFileSelected,

    #[error("cannot aggregate an empty detection list")]
    EmptyInput,

    #[error("classification response contained no detections")]
    NoDetections,

    #[error("no authentication token available")]
    Unauthenticated,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("result arrived after the session was cancelled")]
    StaleResult,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidFileReason {
    UnsupportedType,
    TooLarge { max_bytes: u64 },
    Unreadable,
}

impl std::fmt::Display for InvalidFileReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidFileReason::UnsupportedType => write!(f, "unsupported file type"),
            InvalidFileReason::TooLarge { max_bytes } => {
                write!(f, "file exceeds the {} byte limit", max_bytes)
            }
            InvalidFileReason::Unreadable => write!(f, "file could not be read"),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidFile { .. } => "invalid_file",
            AppError::SessionBusy => "session_busy",
            AppError::NoFileSelected => "no_file_selected",
            AppError::EmptyInput => "empty_input",
            AppError::NoDetections => "no_detections",
            AppError::Unauthenticated => "unauthenticated",
            AppError::Transport(_) => "transport",
            AppError::Http { .. } => "http",
            AppError::Decode(_) => "decode",
            AppError::StaleResult => "stale_result",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
        }
    }

    /// Stale results are dropped without telling the user anything.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, AppError::StaleResult)
    }

    /// Text shown to the user for this error.
    pub fn user_message(&self, locale: Locale) -> String {
        let text = locale.texts();
        match self {
            AppError::InvalidFile {
                reason: InvalidFileReason::TooLarge { .. },
            } => text.file_too_large.to_string(),
            AppError::InvalidFile { .. } => text.unsupported_file.to_string(),
            AppError::SessionBusy => text.session_busy.to_string(),
            AppError::NoFileSelected => text.select_image_first.to_string(),
            AppError::Unauthenticated => text.login_required.to_string(),
            AppError::Transport(message) if !message.is_empty() => message.clone(),
            _ => text.analysis_failed.to_string(),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AppError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Io(format!("image: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return AppError::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => AppError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => AppError::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}
