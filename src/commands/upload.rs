use crate::commands::Notice;
use crate::config::DashboardConfig;
use crate::models::classify_types::{progress_steps, UploadSessionState};
use crate::models::view_types::ClassificationView;
use crate::services::fs_service::{SelectedFile, StagedFile};
use crate::services::localization::Locale;
use crate::services::preview;
use crate::services::report::{self, ReportFile};
use crate::services::transport::{AuthToken, ClassificationTransport};
use crate::services::upload_session::UploadSession;
use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

/// File card shown once an image is staged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileCard {
    pub name: String,
    pub size: String,
    pub mime_type: String,
}

impl From<&StagedFile> for FileCard {
    fn from(file: &StagedFile) -> Self {
        Self {
            name: file.name.clone(),
            size: file.size_label(),
            mime_type: file.mime_type.clone(),
        }
    }
}

/// The upload screen. Dropping it cancels any upload still in flight.
pub struct UploadScreen {
    session: UploadSession,
    transport: Arc<dyn ClassificationTransport>,
    token: Option<AuthToken>,
    locale: Locale,
}

impl UploadScreen {
    pub fn mount(config: &DashboardConfig, transport: Arc<dyn ClassificationTransport>) -> Self {
        tracing::debug!("upload screen mounted");
        Self {
            session: UploadSession::from_config(config),
            transport,
            token: config.auth_token.clone(),
            locale: config.locale,
        }
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn state(&self) -> UploadSessionState {
        self.session.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadSessionState> {
        self.session.subscribe()
    }

    /// Replaces the token after the user signs in or out.
    pub fn set_token(&mut self, token: Option<AuthToken>) {
        self.token = token;
    }

    /// Stages a picked or dropped file. A finished or failed analysis is
    /// cleared first so a new pick starts over.
    pub fn select_file(&self, file: SelectedFile) -> Notice {
        if matches!(
            self.session.state(),
            UploadSessionState::Ready(_) | UploadSessionState::Failed(_)
        ) {
            self.session.reset();
        }

        match self.session.select_file(file) {
            Ok(_) => Notice::info(self.locale.texts().file_ready),
            Err(e) => Notice::from_error(&e, self.locale)
                .unwrap_or_else(|| Notice::error(self.locale.texts().unsupported_file)),
        }
    }

    pub async fn select_path(&self, path: &Path) -> Notice {
        match SelectedFile::from_path(path).await {
            Ok(file) => self.select_file(file),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read selected file");
                Notice::error(e.user_message(self.locale))
            }
        }
    }

    pub fn file_card(&self) -> Option<FileCard> {
        self.session.staged_file().as_ref().map(FileCard::from)
    }

    /// Thumbnail data URI for the staged file. Unrenderable images get no preview.
    pub async fn preview(&self) -> Option<String> {
        let staged = self.session.staged_file()?;
        match preview::generate_preview_async(&staged).await {
            Ok(uri) => Some(uri),
            Err(e) => {
                tracing::warn!(file = %staged.name, error = %e, "preview generation failed");
                None
            }
        }
    }

    /// Runs the analysis. `None` when the result was discarded by a reset.
    pub async fn analyze(&self) -> Option<Notice> {
        match self.session.upload(&*self.transport, self.token.as_ref()).await {
            Ok(_) => Some(Notice::success(self.locale.texts().analysis_succeeded)),
            Err(e) => Notice::from_error(&e, self.locale),
        }
    }

    /// "New analysis": back to an empty upload area.
    pub fn new_analysis(&self) {
        self.session.reset();
    }

    pub fn result_view(&self) -> Option<ClassificationView> {
        match self.session.state() {
            UploadSessionState::Ready(view) => Some(*view),
            _ => None,
        }
    }

    /// Status line under the progress bar.
    pub fn status_text(&self) -> Option<&'static str> {
        let texts = self.locale.texts();
        match self.session.state() {
            UploadSessionState::Validating => Some(texts.preparing),
            UploadSessionState::Uploading { progress: 0 } => Some(texts.preparing),
            UploadSessionState::Uploading { .. } => Some(texts.uploading),
            UploadSessionState::Analyzing => Some(texts.analyzing),
            _ => None,
        }
    }

    pub fn progress_steps(&self) -> [bool; 3] {
        progress_steps(self.session.state().progress().unwrap_or(0))
    }

    pub fn download_report(&self) -> Result<ReportFile, Notice> {
        let texts = self.locale.texts();
        let result = self
            .session
            .last_result()
            .ok_or_else(|| Notice::error(texts.select_image_first))?;
        let filename = self
            .session
            .staged_file()
            .map(|f| f.name)
            .unwrap_or_else(|| result.filename.clone());

        report::analysis_report(&filename, &result, Utc::now()).map_err(|e| {
            tracing::warn!(error = %e, "analysis report failed");
            Notice::error(texts.report_failed)
        })
    }

    pub fn share_text(&self) -> Option<String> {
        self.result_view()
            .map(|view| report::share_text(&view, self.locale))
    }
}

impl Drop for UploadScreen {
    fn drop(&mut self) {
        self.session.reset();
        tracing::debug!("upload screen unmounted");
    }
}
