//! Downloadable JSON reports and the share text for a finished analysis.

use crate::error::AppError;
use crate::models::classify_types::ClassificationResult;
use crate::models::history_types::HistoryEntry;
use crate::models::view_types::ClassificationView;
use crate::services::localization::Locale;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

const DETAILS_REPORT_TYPE: &str = "classification_details";

/// A report ready to be written to disk by the shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub contents: String,
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    filename: &'a str,
    timestamp: String,
    results: &'a ClassificationResult,
}

#[derive(Serialize)]
struct DetailsReport<'a> {
    classification: &'a HistoryEntry,
    generated_at: String,
    report_type: &'static str,
}

fn iso(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn day(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Report for the result currently shown on the upload screen.
pub fn analysis_report(
    filename: &str,
    result: &ClassificationResult,
    now: DateTime<Utc>,
) -> Result<ReportFile, AppError> {
    let report = AnalysisReport {
        filename,
        timestamp: iso(now),
        results: result,
    };
    Ok(ReportFile {
        filename: format!("analysis_report_{}.json", day(now)),
        mime_type: "application/json",
        contents: serde_json::to_string_pretty(&report)?,
    })
}

/// Report for one stored classification fetched by id.
pub fn details_report(entry: &HistoryEntry, now: DateTime<Utc>) -> Result<ReportFile, AppError> {
    let report = DetailsReport {
        classification: entry,
        generated_at: iso(now),
        report_type: DETAILS_REPORT_TYPE,
    };
    Ok(ReportFile {
        filename: format!("report_{}_{}.json", entry.filename, day(now)),
        mime_type: "application/json",
        contents: serde_json::to_string_pretty(&report)?,
    })
}

/// Title line and sentence for the share sheet / clipboard.
pub fn share_text(view: &ClassificationView, locale: Locale) -> String {
    let title = locale.texts().share_title;
    let body = match locale {
        Locale::Ar => format!(
            "تم تحليل الصورة وتصنيفها كـ: {} بنسبة ثقة {}%",
            view.summary.title, view.summary.confidence_percent
        ),
        Locale::En => format!(
            "The image was classified as: {} with {}% confidence",
            view.summary.title, view.summary.confidence_percent
        ),
    };
    format!("{}\n{}", title, body)
}
