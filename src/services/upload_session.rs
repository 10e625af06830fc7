use crate::config::DashboardConfig;
use crate::error::AppError;
use crate::models::classify_types::{ClassificationResult, UploadSessionState};
use crate::models::view_types::ClassificationView;
use crate::services::classifier::presenter;
use crate::services::fs_service::{self, SelectedFile, StagedFile, DEFAULT_MAX_UPLOAD_BYTES};
use crate::services::localization::Locale;
use crate::services::transport::{AuthToken, ClassificationTransport, ProgressFn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Cancellation flag for one upload. A fresh token is issued per upload so a
/// reset can never be undone by a later upload.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

struct SessionInner {
    state: UploadSessionState,
    staged: Option<StagedFile>,
    result: Option<ClassificationResult>,
    cancel: CancelToken,
}

/// Upload-to-result lifecycle for one screen.
///
/// Cloning shares the same session. State changes are published on a watch
/// channel so the screen can render progress while an upload is awaited.
#[derive(Clone)]
pub struct UploadSession {
    inner: Arc<Mutex<SessionInner>>,
    events: Arc<watch::Sender<UploadSessionState>>,
    max_upload_bytes: u64,
    locale: Locale,
}

impl UploadSession {
    pub fn new(max_upload_bytes: u64, locale: Locale) -> Self {
        let (events, _) = watch::channel(UploadSessionState::Idle);
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                state: UploadSessionState::Idle,
                staged: None,
                result: None,
                cancel: CancelToken::default(),
            })),
            events: Arc::new(events),
            max_upload_bytes,
            locale,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.max_upload_bytes, config.locale)
    }

    pub fn state(&self) -> UploadSessionState {
        self.lock().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadSessionState> {
        self.events.subscribe()
    }

    pub fn staged_file(&self) -> Option<StagedFile> {
        self.lock().staged.clone()
    }

    /// Classification behind the `Ready` view, for report downloads.
    pub fn last_result(&self) -> Option<ClassificationResult> {
        self.lock().result.clone()
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Validates and stages a file. The session is back in `Idle` either way;
    /// a rejected file leaves any previously staged file in place.
    pub fn select_file(&self, file: SelectedFile) -> Result<StagedFile, AppError> {
        let mut inner = self.lock();
        if inner.state != UploadSessionState::Idle {
            return Err(AppError::SessionBusy);
        }

        self.set_state(&mut inner, UploadSessionState::Validating);
        let outcome = fs_service::validate(&file, self.max_upload_bytes);
        self.set_state(&mut inner, UploadSessionState::Idle);

        match outcome {
            Ok(staged) => {
                tracing::debug!(file = %staged.name, mime = %staged.mime_type, "file staged");
                inner.staged = Some(staged.clone());
                Ok(staged)
            }
            Err(e) => {
                tracing::debug!(file = %file.name, error = %e, "file rejected");
                Err(e)
            }
        }
    }

    /// Uploads the staged file and presents the result.
    ///
    /// The transport is called exactly once. If the session is reset while the
    /// call is pending, its outcome is discarded and `StaleResult` is returned.
    pub async fn upload<T>(&self, transport: &T, token: Option<&AuthToken>) -> Result<ClassificationView, AppError>
    where
        T: ClassificationTransport + ?Sized,
    {
        let (staged, cancel) = self.begin(token.is_some())?;
        let token = token.ok_or(AppError::Unauthenticated)?;

        let progress: ProgressFn = {
            let session = self.clone();
            let cancel = cancel.clone();
            Arc::new(move |p| session.report_progress(&cancel, p))
        };

        let outcome = transport.upload_image(&staged, token, progress).await;

        if cancel.is_cancelled() {
            tracing::debug!(file = %staged.name, "discarding result of cancelled upload");
            return Err(AppError::StaleResult);
        }

        let response = match outcome {
            Ok(response) => response,
            Err(e) => return Err(self.fail(&cancel, e)),
        };

        let raw = match (response.success, response.results) {
            (true, Some(raw)) => raw,
            (_, _) => {
                let message = response.message.unwrap_or_default();
                return Err(self.fail(&cancel, AppError::Transport(message)));
            }
        };

        self.enter_analyzing(&cancel)?;

        let reported = raw.reported_risk();
        let result = raw.into_domain();
        if let Some(reported) = reported.filter(|r| *r != result.overall_risk()) {
            tracing::warn!(
                reported = %reported,
                derived = %result.overall_risk(),
                "server risk differs from risk derived from detections"
            );
        }

        match presenter::present_or_safe(&result, self.locale) {
            Ok(view) => {
                self.finish(&cancel, &view, result)?;
                tracing::info!(file = %staged.name, risk = %view.risk.level, "classification ready");
                Ok(view)
            }
            Err(e) => Err(self.fail(&cancel, e)),
        }
    }

    /// Moves the progress bar forward. Lower values than the current one are ignored.
    pub fn report_progress(&self, cancel: &CancelToken, progress: u8) {
        let mut inner = self.lock();
        if cancel.is_cancelled() {
            return;
        }
        let progress = progress.min(100);
        if let UploadSessionState::Uploading { progress: current } = inner.state {
            if progress > current {
                self.set_state(&mut inner, UploadSessionState::Uploading { progress });
            }
            if progress == 100 {
                self.set_state(&mut inner, UploadSessionState::Analyzing);
            }
        }
    }

    /// Back to `Idle`, dropping the staged file. Any upload in flight is cancelled.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.cancel.cancel();
        if inner.state.is_in_flight() {
            tracing::debug!(state = inner.state.name(), "cancelling in-flight upload");
        }
        inner.staged = None;
        inner.result = None;
        self.set_state(&mut inner, UploadSessionState::Idle);
    }

    fn begin(&self, has_token: bool) -> Result<(StagedFile, CancelToken), AppError> {
        let mut inner = self.lock();
        if inner.state != UploadSessionState::Idle {
            return Err(AppError::SessionBusy);
        }
        let staged = inner.staged.clone().ok_or(AppError::NoFileSelected)?;
        if !has_token {
            return Err(AppError::Unauthenticated);
        }

        let cancel = CancelToken::default();
        inner.cancel = cancel.clone();
        self.set_state(&mut inner, UploadSessionState::Uploading { progress: 0 });
        Ok((staged, cancel))
    }

    fn enter_analyzing(&self, cancel: &CancelToken) -> Result<(), AppError> {
        let mut inner = self.lock();
        if cancel.is_cancelled() {
            return Err(AppError::StaleResult);
        }
        if let UploadSessionState::Uploading { progress } = inner.state {
            if progress < 100 {
                self.set_state(&mut inner, UploadSessionState::Uploading { progress: 100 });
            }
            self.set_state(&mut inner, UploadSessionState::Analyzing);
        }
        Ok(())
    }

    fn apply(&self, cancel: &CancelToken, state: UploadSessionState) -> Result<(), AppError> {
        let mut inner = self.lock();
        if cancel.is_cancelled() {
            tracing::debug!("discarding state change of cancelled upload");
            return Err(AppError::StaleResult);
        }
        self.set_state(&mut inner, state);
        Ok(())
    }

    fn finish(
        &self,
        cancel: &CancelToken,
        view: &ClassificationView,
        result: ClassificationResult,
    ) -> Result<(), AppError> {
        let mut inner = self.lock();
        if cancel.is_cancelled() {
            tracing::debug!("discarding result of cancelled upload");
            return Err(AppError::StaleResult);
        }
        inner.result = Some(result);
        self.set_state(&mut inner, UploadSessionState::Ready(Box::new(view.clone())));
        Ok(())
    }

    /// Records a failure unless the upload was cancelled meanwhile.
    fn fail(&self, cancel: &CancelToken, error: AppError) -> AppError {
        match self.apply(cancel, UploadSessionState::Failed(error.clone())) {
            Ok(()) => {
                tracing::warn!(error = %error, "upload failed");
                error
            }
            Err(stale) => {
                tracing::debug!(error = %error, "ignoring failure of cancelled upload");
                stale
            }
        }
    }

    fn set_state(&self, inner: &mut SessionInner, state: UploadSessionState) {
        tracing::debug!(from = inner.state.name(), to = state.name(), "upload session transition");
        inner.state = state.clone();
        self.events.send_replace(state);
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES, Locale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api_types::{RawClassificationResult, RawDetection, UploadResponse};
    use crate::models::classify_types::RiskLevel;
    use crate::services::classifier::risk;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    struct GatedTransport {
        gate: Notify,
        calls: AtomicUsize,
        report: Option<u8>,
        outcome: Result<UploadResponse, AppError>,
    }

    impl GatedTransport {
        fn new(outcome: Result<UploadResponse, AppError>) -> Self {
            Self {
                gate: Notify::new(),
                calls: AtomicUsize::new(0),
                report: None,
                outcome,
            }
        }

        /// Resolves immediately.
        fn open(outcome: Result<UploadResponse, AppError>) -> Self {
            let transport = Self::new(outcome);
            transport.gate.notify_one();
            transport
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClassificationTransport for GatedTransport {
        async fn upload_image(
            &self,
            _file: &StagedFile,
            _token: &AuthToken,
            progress: ProgressFn,
        ) -> Result<UploadResponse, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(p) = self.report {
                progress(p);
            }
            self.gate.notified().await;
            self.outcome.clone()
        }
    }

    fn response(detections: &[(&str, f64)]) -> UploadResponse {
        UploadResponse {
            success: true,
            results: Some(RawClassificationResult {
                filename: Some("cam.png".to_string()),
                overall_risk: Some("low".to_string()),
                detections: detections
                    .iter()
                    .map(|(category, confidence)| RawDetection {
                        category: Some(category.to_string()),
                        subcategory: None,
                        confidence: Some(*confidence),
                    })
                    .collect(),
                ..Default::default()
            }),
            message: None,
        }
    }

    fn png() -> SelectedFile {
        SelectedFile::new("cam.png", Some("image/png"), vec![0u8; 64])
    }

    fn token() -> AuthToken {
        AuthToken::new("tok").unwrap()
    }

    fn staged_session() -> UploadSession {
        let session = UploadSession::new(DEFAULT_MAX_UPLOAD_BYTES, Locale::En);
        session.select_file(png()).unwrap();
        session
    }

    #[tokio::test]
    async fn text_file_never_reaches_transport() {
        let session = UploadSession::new(DEFAULT_MAX_UPLOAD_BYTES, Locale::En);
        let transport = GatedTransport::open(Ok(response(&[("fire", 0.9)])));

        let err = session
            .select_file(SelectedFile::new("notes.txt", Some("text/plain"), b"hi".to_vec()))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFile { .. }));
        assert_eq!(session.state(), UploadSessionState::Idle);
        assert!(session.staged_file().is_none());

        let err = session.upload(&transport, Some(&token())).await.unwrap_err();
        assert_eq!(err, AppError::NoFileSelected);
        assert_eq!(transport.calls(), 0);
        assert_eq!(session.state(), UploadSessionState::Idle);
    }

    #[tokio::test]
    async fn missing_token_short_circuits() {
        let session = staged_session();
        let transport = GatedTransport::open(Ok(response(&[("fire", 0.9)])));

        let err = session.upload(&transport, None).await.unwrap_err();
        assert_eq!(err, AppError::Unauthenticated);
        assert_eq!(transport.calls(), 0);
        assert_eq!(session.state(), UploadSessionState::Idle);
    }

    #[tokio::test]
    async fn successful_upload_ends_ready_with_derived_risk() {
        let session = staged_session();
        let transport = GatedTransport::open(Ok(response(&[("traffic", 0.72), ("fire", 0.85)])));

        let view = session.upload(&transport, Some(&token())).await.unwrap();
        assert_eq!(transport.calls(), 1);
        assert_eq!(view.risk.level, RiskLevel::High);

        match session.state() {
            UploadSessionState::Ready(ready) => assert_eq!(*ready, view),
            other => panic!("expected ready, got {other:?}"),
        }
        assert_eq!(session.last_result().unwrap().overall_risk(), RiskLevel::High);

        let domain = response(&[("traffic", 0.72), ("fire", 0.85)])
            .results
            .unwrap()
            .into_domain();
        let primary = risk::primary_detection(domain.detections()).unwrap();
        assert_eq!(view.risk.level, risk::classify(&primary.category, primary.confidence));
    }

    #[tokio::test]
    async fn empty_detections_recover_as_safe_result() {
        let session = staged_session();
        let transport = GatedTransport::open(Ok(response(&[])));

        let view = session.upload(&transport, Some(&token())).await.unwrap();
        assert!(view.recovered_default);
        assert_eq!(view.risk.level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn transport_failure_is_terminal_until_reset() {
        let session = staged_session();
        let transport = GatedTransport::open(Err(AppError::Transport("offline".to_string())));

        let err = session.upload(&transport, Some(&token())).await.unwrap_err();
        assert_eq!(err, AppError::Transport("offline".to_string()));
        assert_eq!(session.state(), UploadSessionState::Failed(err.clone()));

        let again = session.upload(&transport, Some(&token())).await.unwrap_err();
        assert_eq!(again, AppError::SessionBusy);
        assert_eq!(transport.calls(), 1);

        session.reset();
        assert_eq!(session.state(), UploadSessionState::Idle);
        assert!(session.staged_file().is_none());
    }

    #[tokio::test]
    async fn unsuccessful_response_fails_with_server_message() {
        let session = staged_session();
        let transport = GatedTransport::open(Ok(UploadResponse {
            success: false,
            results: None,
            message: Some("quota exceeded".to_string()),
        }));

        let err = session.upload(&transport, Some(&token())).await.unwrap_err();
        assert_eq!(err, AppError::Transport("quota exceeded".to_string()));
    }

    #[tokio::test]
    async fn second_upload_while_in_flight_is_rejected() {
        let session = staged_session();
        let transport = Arc::new(GatedTransport::new(Ok(response(&[("normal", 0.99)]))));

        let task = {
            let session = session.clone();
            let transport = Arc::clone(&transport);
            tokio::spawn(async move { session.upload(&*transport, Some(&token())).await })
        };

        let mut rx = session.subscribe();
        rx.wait_for(|s| s.is_in_flight()).await.unwrap();

        let err = session.upload(&*transport, Some(&token())).await.unwrap_err();
        assert_eq!(err, AppError::SessionBusy);

        transport.gate.notify_one();
        let view = task.await.unwrap().unwrap();
        assert_eq!(view.risk.level, RiskLevel::Low);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn reset_while_analyzing_discards_late_result() {
        let session = staged_session();
        let mut transport = GatedTransport::new(Ok(response(&[("violence", 0.95)])));
        transport.report = Some(100);
        let transport = Arc::new(transport);

        let task = {
            let session = session.clone();
            let transport = Arc::clone(&transport);
            tokio::spawn(async move { session.upload(&*transport, Some(&token())).await })
        };

        let mut rx = session.subscribe();
        rx.wait_for(|s| *s == UploadSessionState::Analyzing).await.unwrap();

        session.reset();
        transport.gate.notify_one();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err, AppError::StaleResult);
        assert!(!err.is_user_visible());
        assert_eq!(session.state(), UploadSessionState::Idle);
    }

    #[tokio::test]
    async fn reset_while_uploading_discards_late_failure() {
        let session = staged_session();
        let transport = Arc::new(GatedTransport::new(Err(AppError::Transport("late".to_string()))));

        let task = {
            let session = session.clone();
            let transport = Arc::clone(&transport);
            tokio::spawn(async move { session.upload(&*transport, Some(&token())).await })
        };

        let mut rx = session.subscribe();
        rx.wait_for(|s| s.is_in_flight()).await.unwrap();
        session.reset();
        transport.gate.notify_one();

        assert_eq!(task.await.unwrap().unwrap_err(), AppError::StaleResult);
        assert_eq!(session.state(), UploadSessionState::Idle);
    }

    #[test]
    fn failure_after_reset_is_stale_and_keeps_idle() {
        let session = staged_session();
        let (_, cancel) = session.begin(true).unwrap();
        session.reset();

        let err = session.fail(&cancel, AppError::Transport("late".to_string()));
        assert_eq!(err, AppError::StaleResult);
        assert_eq!(session.state(), UploadSessionState::Idle);
    }

    #[test]
    fn failure_while_live_is_recorded() {
        let session = staged_session();
        let (_, cancel) = session.begin(true).unwrap();

        let err = session.fail(&cancel, AppError::Transport("offline".to_string()));
        assert_eq!(err, AppError::Transport("offline".to_string()));
        assert_eq!(session.state(), UploadSessionState::Failed(err));
    }

    #[test]
    fn progress_never_moves_backwards() {
        let session = staged_session();
        let (_, cancel) = session.begin(true).unwrap();

        session.report_progress(&cancel, 40);
        session.report_progress(&cancel, 25);
        assert_eq!(session.state(), UploadSessionState::Uploading { progress: 40 });

        session.report_progress(&cancel, 100);
        assert_eq!(session.state(), UploadSessionState::Analyzing);

        cancel.cancel();
        session.reset();
        session.report_progress(&cancel, 100);
        assert_eq!(session.state(), UploadSessionState::Idle);
    }

    #[test]
    fn selecting_while_not_idle_is_busy() {
        let session = staged_session();
        let _ = session.begin(true).unwrap();
        assert_eq!(session.select_file(png()), Err(AppError::SessionBusy));
    }
}
