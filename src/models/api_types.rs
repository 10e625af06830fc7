//! Response shapes of the classification API as they arrive on the wire.
//!
//! Every field is optional; conversion into the domain types happens here so
//! nothing past the transport has to guess. Detection confidences are sent as
//! fractions (`0..1`) and are scaled to percent; alert and history confidences
//! are already percent.

use crate::models::classify_types::{
    clamp_percent, AlertDetail, Category, ClassificationResult, Detection, RiskLevel,
};
use crate::models::history_types::{ActivityStats, HistoryEntry, HistoryPage, Pagination};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UploadResponse {
    pub success: bool,
    pub results: Option<RawClassificationResult>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawClassificationResult {
    pub filename: Option<String>,
    pub file_path: Option<String>,
    pub classification_id: Option<serde_json::Value>,
    #[serde(alias = "processing_time")]
    pub processing_time_seconds: Option<f64>,
    #[serde(alias = "results")]
    pub detections: Vec<RawDetection>,
    pub overall_risk: Option<String>,
    pub alerts_triggered: Vec<String>,
    pub alerts_sent: Option<u32>,
    pub alert_details: Vec<RawAlertDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDetection {
    pub category: Option<String>,
    #[serde(alias = "class_name")]
    pub subcategory: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAlertDetail {
    pub title: Option<String>,
    pub message: Option<String>,
    pub category: Option<String>,
    pub confidence: Option<f64>,
    pub sent_methods: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryResponse {
    pub success: bool,
    pub classifications: Vec<RawHistoryEntry>,
    pub pagination: Option<RawPagination>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHistoryEntry {
    pub id: Option<serde_json::Value>,
    pub filename: Option<String>,
    pub file_size: Option<u64>,
    pub result: Option<String>,
    pub subcategory: Option<String>,
    pub confidence: Option<f64>,
    pub created_at: Option<String>,
    pub alert_sent: Option<bool>,
    pub processing_time: Option<f64>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPagination {
    pub current_page: Option<u32>,
    pub total_pages: Option<u32>,
    pub per_page: Option<u32>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetailsResponse {
    pub success: bool,
    pub classification: Option<RawHistoryEntry>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActivityResponse {
    pub success: bool,
    pub stats: Option<ActivityStats>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AckResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// Ids arrive as numbers or strings depending on the endpoint.
fn id_to_string(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn fraction_to_percent(value: Option<f64>) -> f64 {
    clamp_percent(value.unwrap_or(0.0) * 100.0)
}

fn category_or_unknown(raw: Option<String>) -> Category {
    raw.map(Category::from)
        .unwrap_or_else(|| Category::Unknown(String::new()))
}

/// Accepts RFC 3339 or the naive ISO form the backend writes (`2025-09-21T21:13:40.123`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

impl RawDetection {
    pub fn into_domain(self) -> Detection {
        Detection {
            category: category_or_unknown(self.category),
            subcategory: self.subcategory,
            confidence: fraction_to_percent(self.confidence),
        }
    }
}

impl RawAlertDetail {
    pub fn into_domain(self) -> AlertDetail {
        AlertDetail {
            title: self.title.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            category: category_or_unknown(self.category),
            confidence: clamp_percent(self.confidence.unwrap_or(0.0)),
            sent_methods: self.sent_methods,
        }
    }
}

impl RawClassificationResult {
    /// Server-side risk label, kept only to detect drift against the recomputed one.
    pub fn reported_risk(&self) -> Option<RiskLevel> {
        self.overall_risk.as_deref().and_then(RiskLevel::parse)
    }

    pub fn into_domain(self) -> ClassificationResult {
        let detections = self
            .detections
            .into_iter()
            .map(RawDetection::into_domain)
            .collect();
        let mut result = ClassificationResult::new(self.filename.unwrap_or_default(), detections);
        result.file_path = self.file_path.unwrap_or_default();
        result.classification_id = id_to_string(self.classification_id);
        result.processing_time_seconds = self.processing_time_seconds.unwrap_or(0.0).max(0.0);
        result.alerts_sent = self.alerts_sent.unwrap_or(0);
        result.alerts_triggered = self.alerts_triggered;
        result.alert_details = self
            .alert_details
            .into_iter()
            .map(RawAlertDetail::into_domain)
            .collect();
        result
    }
}

impl RawHistoryEntry {
    pub fn into_domain(self) -> HistoryEntry {
        HistoryEntry {
            id: id_to_string(self.id),
            filename: self.filename.unwrap_or_default(),
            file_size: self.file_size.unwrap_or(0),
            result: self
                .result
                .map(Category::from)
                .unwrap_or(Category::Normal),
            subcategory: self.subcategory,
            confidence: clamp_percent(self.confidence.unwrap_or(0.0)),
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            alert_sent: self.alert_sent.unwrap_or(false),
            processing_time: self.processing_time,
            location: self.location,
        }
    }
}

impl RawPagination {
    pub fn into_domain(self, fallback_per_page: u32) -> Pagination {
        let total_pages = self.total_pages.unwrap_or(1).max(1);
        Pagination {
            current_page: self.current_page.unwrap_or(1).clamp(1, total_pages),
            total_pages,
            per_page: self.per_page.unwrap_or(fallback_per_page).max(1),
            total: self.total.unwrap_or(0),
        }
    }
}

impl HistoryResponse {
    pub fn into_page(self, fallback_per_page: u32) -> HistoryPage {
        HistoryPage {
            entries: self
                .classifications
                .into_iter()
                .map(RawHistoryEntry::into_domain)
                .collect(),
            pagination: self
                .pagination
                .unwrap_or_default()
                .into_domain(fallback_per_page),
        }
    }
}
