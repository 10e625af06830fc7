use crate::commands::Notice;
use crate::config::DashboardConfig;
use crate::models::history_types::{
    ActivityStats, FilterField, HistoryEntry, HistoryRow, HistoryView, SortKey, ViewMode,
};
use crate::services::debounce::Debouncer;
use crate::services::fs_service::format_file_size;
use crate::services::history_query::{HistoryQueryEngine, DEFAULT_VISIBLE_PAGES};
use crate::services::localization::Locale;
use crate::services::report::{self, ReportFile};
use crate::services::transport::{AuthToken, HistoryTransport};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Table/grid row for one stored classification.
pub fn history_row(entry: &HistoryEntry, locale: Locale, now: DateTime<Utc>) -> HistoryRow {
    let texts = locale.texts();
    HistoryRow {
        id: entry.id.clone(),
        filename: entry.filename.clone(),
        file_size: format_file_size(entry.file_size),
        result_class: entry.result.badge_class(),
        result_text: locale.category_title(&entry.result).to_string(),
        confidence_percent: entry.confidence.round() as u8,
        age: entry
            .created_at
            .map(|created| locale.relative_age((now - created).num_minutes()))
            .unwrap_or_default(),
        alert_status_class: if entry.alert_sent { "sent" } else { "not-sent" },
        alert_status_text: if entry.alert_sent {
            texts.alert_sent.to_string()
        } else {
            texts.alert_not_sent.to_string()
        },
    }
}

struct HistoryCore {
    transport: Arc<dyn HistoryTransport>,
    token: Option<AuthToken>,
    locale: Locale,
    engine: Mutex<HistoryQueryEngine>,
    // Bumped per list request; only the latest request may publish.
    generation: AtomicU64,
    view: watch::Sender<Option<HistoryView>>,
    notices: watch::Sender<Option<Notice>>,
}

impl HistoryCore {
    fn engine(&self) -> MutexGuard<'_, HistoryQueryEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn token(&self) -> Result<&AuthToken, Notice> {
        self.token
            .as_ref()
            .ok_or_else(|| Notice::error(self.locale.texts().login_required))
    }

    fn publish(&self, notice: Option<Notice>) -> Option<Notice> {
        if notice.is_some() {
            self.notices.send_replace(notice.clone());
        }
        notice
    }

    async fn load(&self) -> Option<Notice> {
        let token = match self.token() {
            Ok(token) => token,
            Err(notice) => return self.publish(Some(notice)),
        };

        let (params, generation) = {
            let engine = self.engine();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (engine.build_request_params(), generation)
        };

        let response = self.transport.fetch_history(&params, token).await;

        let mut engine = self.engine();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "dropping superseded history page");
            return None;
        }

        let texts = self.locale.texts();
        match response {
            Ok(response) if response.success => {
                let page = response.into_page(params.limit);
                engine.apply_pagination(&page.pagination);
                let now = Utc::now();
                let rows: Vec<HistoryRow> = page
                    .entries
                    .iter()
                    .map(|entry| history_row(entry, self.locale, now))
                    .collect();
                let view = HistoryView {
                    mode: engine.view_mode(),
                    is_empty: rows.is_empty(),
                    rows,
                    pagination: engine.pagination_view(DEFAULT_VISIBLE_PAGES),
                };
                drop(engine);
                tracing::debug!(page = params.page, rows = view.rows.len(), "history page loaded");
                self.view.send_replace(Some(view));
                None
            }
            Ok(response) => {
                drop(engine);
                tracing::warn!(message = ?response.message, "history request rejected");
                self.publish(Some(Notice::error(
                    response
                        .message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| texts.history_load_failed.to_string()),
                )))
            }
            Err(e) => {
                drop(engine);
                tracing::warn!(error = %e, "history request failed");
                self.publish(Some(Notice::error(texts.history_load_failed)))
            }
        }
    }
}

/// The history screen: paged list, filters, search, per-entry actions.
///
/// Must be mounted inside a Tokio runtime; dropping it stops the pending
/// search debounce.
pub struct HistoryScreen {
    core: Arc<HistoryCore>,
    search: Debouncer<String>,
}

impl HistoryScreen {
    pub fn mount(config: &DashboardConfig, transport: Arc<dyn HistoryTransport>) -> Self {
        let (view, _) = watch::channel(None);
        let (notices, _) = watch::channel(None);
        let core = Arc::new(HistoryCore {
            transport,
            token: config.auth_token.clone(),
            locale: config.locale,
            engine: Mutex::new(HistoryQueryEngine::new(config.history_page_size)),
            generation: AtomicU64::new(0),
            view,
            notices,
        });

        let search = {
            let core = Arc::clone(&core);
            Debouncer::new(config.search_debounce, move |query: String| {
                let core = Arc::clone(&core);
                async move {
                    core.engine().set_filter(FilterField::Search, query);
                    core.load().await;
                }
            })
        };

        tracing::debug!("history screen mounted");
        Self { core, search }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<HistoryView>> {
        self.core.view.subscribe()
    }

    /// Notices from loads the caller did not await, such as debounced searches.
    pub fn subscribe_notices(&self) -> watch::Receiver<Option<Notice>> {
        self.core.notices.subscribe()
    }

    pub fn view(&self) -> Option<HistoryView> {
        self.core.view.borrow().clone()
    }

    pub fn query(&self) -> HistoryQueryEngine {
        self.core.engine().clone()
    }

    pub async fn load(&self) -> Option<Notice> {
        self.core.load().await
    }

    /// Search box input. The list reloads once typing pauses.
    pub fn search(&self, query: impl Into<String>) {
        self.search.push(query.into());
    }

    pub async fn set_filter(&self, field: FilterField, value: impl Into<String>) -> Option<Notice> {
        self.core.engine().set_filter(field, value);
        self.core.load().await
    }

    pub async fn clear_filters(&self) -> Option<Notice> {
        self.core.engine().clear_filters();
        self.core.load().await
    }

    pub async fn set_sort(&self, sort: SortKey) -> Option<Notice> {
        self.core.engine().set_sort(sort);
        self.core.load().await
    }

    /// Out-of-range pages are ignored without a request.
    pub async fn go_to_page(&self, page: u32) -> Option<Notice> {
        let moved = self.core.engine().set_page(page);
        if !moved {
            return None;
        }
        self.core.load().await
    }

    pub async fn change_page(&self, delta: i32) -> Option<Notice> {
        let moved = self.core.engine().change_page(delta);
        if !moved {
            return None;
        }
        self.core.load().await
    }

    pub async fn set_view_mode(&self, mode: ViewMode) -> Option<Notice> {
        self.core.engine().set_view_mode(mode);
        self.core.load().await
    }

    pub async fn details(&self, id: &str) -> Result<HistoryEntry, Notice> {
        let token = self.core.token()?;
        let failed = || Notice::error(self.core.locale.texts().details_load_failed);

        match self.core.transport.fetch_details(id, token).await {
            Ok(response) if response.success => response
                .classification
                .map(|raw| raw.into_domain())
                .ok_or_else(failed),
            Ok(_) => Err(failed()),
            Err(e) => {
                tracing::warn!(id, error = %e, "details request failed");
                Err(failed())
            }
        }
    }

    /// Deletes one entry and reloads the current page.
    pub async fn delete(&self, id: &str) -> Notice {
        let texts = self.core.locale.texts();
        let token = match self.core.token() {
            Ok(token) => token,
            Err(notice) => return notice,
        };

        match self.core.transport.delete_classification(id, token).await {
            Ok(ack) if ack.success => {
                if let Some(notice) = self.core.load().await {
                    tracing::debug!(text = %notice.text, "reload after delete failed");
                }
                Notice::success(texts.delete_succeeded)
            }
            Ok(_) => Notice::error(texts.delete_failed),
            Err(e) => {
                tracing::warn!(id, error = %e, "delete request failed");
                Notice::error(texts.delete_failed)
            }
        }
    }

    pub async fn download_report(&self, id: &str) -> Result<ReportFile, Notice> {
        let entry = self.details(id).await?;
        report::details_report(&entry, Utc::now()).map_err(|e| {
            tracing::warn!(id, error = %e, "details report failed");
            Notice::error(self.core.locale.texts().report_failed)
        })
    }

    pub async fn activity_stats(&self) -> Result<ActivityStats, Notice> {
        let token = self.core.token()?;
        let failed = || Notice::error(self.core.locale.texts().history_load_failed);

        match self.core.transport.fetch_activity_stats(token).await {
            Ok(response) if response.success => Ok(response.stats.unwrap_or_default()),
            Ok(_) => Err(failed()),
            Err(e) => {
                tracing::warn!(error = %e, "activity stats request failed");
                Err(failed())
            }
        }
    }
}

impl Drop for HistoryScreen {
    fn drop(&mut self) {
        // Late list responses must not publish after unmount.
        self.core.generation.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("history screen unmounted");
    }
}
