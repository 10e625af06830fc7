use crate::models::classify_types::{Category, RiskLevel};
use serde::Serialize;

/// Everything the results card needs, already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationView {
    pub file: FileInfoView,
    pub summary: SummaryView,
    pub risk: RiskBadge,
    pub stats: ConfidenceStatsView,
    pub detections: Vec<DetectionRow>,
    pub recommendations: Vec<String>,
    pub alerts_triggered: Vec<String>,
    pub alerts_sent: u32,
    pub alert_cards: Vec<AlertCard>,
    /// True when the service reported nothing and a safe result was shown instead.
    pub recovered_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfoView {
    pub filename: String,
    pub file_path: String,
    pub classification_id: String,
    pub processing_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub category: Category,
    pub title: String,
    pub description: String,
    pub icon: &'static str,
    pub color_class: &'static str,
    pub confidence_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskBadge {
    pub level: RiskLevel,
    pub label: String,
    pub color: &'static str,
    pub css_class: &'static str,
    pub scale_percent: u8,
}

impl RiskBadge {
    pub fn new(level: RiskLevel, label: impl Into<String>) -> Self {
        Self {
            level,
            label: label.into(),
            color: level.color(),
            css_class: level.css_class(),
            scale_percent: level.scale_percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceStatsView {
    pub entity_count: usize,
    pub mean: String,
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRow {
    pub category: Category,
    pub title: String,
    pub icon: &'static str,
    pub confidence_compact: String,
    pub confidence_detailed: String,
    pub confidence_width: f64,
    pub risk: RiskBadge,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCard {
    pub title: String,
    pub message: String,
    pub category: Category,
    pub confidence: String,
    pub method_badges: Vec<String>,
}
