//! Screen-level handlers. Each screen owns its state for as long as it is
//! mounted and turns every failure into a [`Notice`] for the shell.

pub mod history;
pub mod upload;

use crate::error::AppError;
use crate::services::localization::Locale;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Toast shown by the shell after a handler runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    /// `None` for errors the user never sees.
    pub fn from_error(err: &AppError, locale: Locale) -> Option<Self> {
        err.is_user_visible()
            .then(|| Self::error(err.user_message(locale)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_results_produce_no_notice() {
        assert_eq!(Notice::from_error(&AppError::StaleResult, Locale::En), None);
    }

    #[test]
    fn errors_are_localized() {
        let notice = Notice::from_error(&AppError::Unauthenticated, Locale::En).unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, Locale::En.texts().login_required);
    }
}
