use crate::error::AppError;
use crate::models::view_types::ClassificationView;
use crate::services::classifier::risk;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Incident category reported by the classification service.
///
/// Values outside the known set are kept as `Unknown` instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Fire,
    Traffic,
    Accident,
    Violence,
    Normal,
    Unknown(String),
}

impl Category {
    pub const KNOWN: [Category; 5] = [
        Category::Fire,
        Category::Traffic,
        Category::Accident,
        Category::Violence,
        Category::Normal,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Fire => "fire",
            Category::Traffic => "traffic",
            Category::Accident => "accident",
            Category::Violence => "violence",
            Category::Normal => "normal",
            Category::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Unknown(_))
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Fire => "fas fa-fire",
            Category::Traffic => "fas fa-car",
            Category::Accident => "fas fa-exclamation-triangle",
            Category::Violence => "fas fa-fist-raised",
            Category::Normal => "fas fa-check-circle",
            Category::Unknown(_) => "fas fa-question-circle",
        }
    }

    pub fn color_class(&self) -> &'static str {
        match self {
            Category::Fire | Category::Violence => "danger",
            Category::Traffic | Category::Accident => "warning",
            Category::Normal => "success",
            Category::Unknown(_) => "info",
        }
    }

    /// CSS class of the history result badge.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Category::Fire => "fire",
            Category::Traffic => "traffic",
            Category::Accident => "accident",
            Category::Violence => "violence",
            Category::Normal | Category::Unknown(_) => "normal",
        }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fire" => Category::Fire,
            "traffic" => Category::Traffic,
            "accident" => Category::Accident,
            "violence" => Category::Violence,
            "normal" => Category::Normal,
            _ => Category::Unknown(raw),
        }
    }
}

impl From<&str> for Category {
    fn from(raw: &str) -> Self {
        Category::from(raw.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            "critical" => Some(RiskLevel::Critical),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// Fill width of the risk meter.
    pub fn scale_percent(self) -> u8 {
        match self {
            RiskLevel::Low => 25,
            RiskLevel::Medium => 50,
            RiskLevel::High => 75,
            RiskLevel::Critical => 100,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            RiskLevel::Low => "#10b981",
            RiskLevel::Medium => "#f59e0b",
            RiskLevel::High => "#ef4444",
            RiskLevel::Critical => "#7c2d12",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            RiskLevel::Low => "risk-low",
            RiskLevel::Medium => "risk-medium",
            RiskLevel::High => "risk-high",
            RiskLevel::Critical => "risk-critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified entity within an image. Confidence is a percentage in `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub category: Category,
    pub subcategory: Option<String>,
    pub confidence: f64,
}

impl Detection {
    pub fn new(category: impl Into<Category>, confidence: f64) -> Self {
        Self {
            category: category.into(),
            subcategory: None,
            confidence: clamp_percent(confidence),
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    /// Placeholder used when the service reports nothing at all.
    pub fn safe_default() -> Self {
        Detection::new(Category::Normal, 0.0).with_subcategory("safe")
    }
}

pub(crate) fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertDetail {
    pub title: String,
    pub message: String,
    pub category: Category,
    pub confidence: f64,
    pub sent_methods: Vec<String>,
}

/// Classification of one uploaded image.
///
/// `overall_risk` is computed from the detections when the value is built and
/// cannot be set on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub filename: String,
    pub file_path: String,
    pub classification_id: String,
    pub processing_time_seconds: f64,
    detections: Vec<Detection>,
    overall_risk: RiskLevel,
    pub alerts_triggered: Vec<String>,
    pub alerts_sent: u32,
    pub alert_details: Vec<AlertDetail>,
}

impl ClassificationResult {
    pub fn new(filename: impl Into<String>, detections: Vec<Detection>) -> Self {
        let overall_risk = risk::overall_risk(&detections);
        Self {
            filename: filename.into(),
            file_path: String::new(),
            classification_id: String::new(),
            processing_time_seconds: 0.0,
            detections,
            overall_risk,
            alerts_triggered: Vec::new(),
            alerts_sent: 0,
            alert_details: Vec::new(),
        }
    }

    /// Same result with a different detection list; the risk is recomputed.
    pub fn with_detections(&self, detections: Vec<Detection>) -> Self {
        let mut next = self.clone();
        next.overall_risk = risk::overall_risk(&detections);
        next.detections = detections;
        next
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn overall_risk(&self) -> RiskLevel {
        self.overall_risk
    }
}

/// State of one upload-to-result lifecycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UploadSessionState {
    #[default]
    Idle,
    Validating,
    Uploading { progress: u8 },
    Analyzing,
    Ready(Box<ClassificationView>),
    Failed(AppError),
}

impl UploadSessionState {
    pub fn name(&self) -> &'static str {
        match self {
            UploadSessionState::Idle => "idle",
            UploadSessionState::Validating => "validating",
            UploadSessionState::Uploading { .. } => "uploading",
            UploadSessionState::Analyzing => "analyzing",
            UploadSessionState::Ready(_) => "ready",
            UploadSessionState::Failed(_) => "failed",
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            UploadSessionState::Uploading { .. } | UploadSessionState::Analyzing
        )
    }

    /// Progress bar value for the current state.
    pub fn progress(&self) -> Option<u8> {
        match self {
            UploadSessionState::Uploading { progress } => Some(*progress),
            UploadSessionState::Analyzing | UploadSessionState::Ready(_) => Some(100),
            _ => None,
        }
    }
}

/// Which of the three upload/analyze/results step markers are lit.
pub fn progress_steps(progress: u8) -> [bool; 3] {
    let p = f64::from(progress);
    [p >= 33.33, p >= 66.66, p >= 99.99]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_is_preserved() {
        let category = Category::from("flood");
        assert_eq!(category, Category::Unknown("flood".to_string()));
        assert_eq!(category.as_str(), "flood");
        assert!(!category.is_known());
        assert_eq!(Category::from(" FIRE "), Category::Fire);
    }

    #[test]
    fn category_round_trips_through_json_as_string() {
        let parsed: Category = serde_json::from_str("\"violence\"").unwrap();
        assert_eq!(parsed, Category::Violence);
        assert_eq!(serde_json::to_string(&Category::Traffic).unwrap(), "\"traffic\"");
    }

    #[test]
    fn risk_levels_are_totally_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
        assert_eq!(RiskLevel::High.scale_percent(), 75);
    }

    #[test]
    fn detection_confidence_is_clamped() {
        assert_eq!(Detection::new("fire", 140.0).confidence, 100.0);
        assert_eq!(Detection::new("fire", -3.0).confidence, 0.0);
        assert_eq!(Detection::new("fire", f64::NAN).confidence, 0.0);
    }

    #[test]
    fn overall_risk_follows_detections() {
        let result = ClassificationResult::new(
            "street.jpg",
            vec![Detection::new("traffic", 75.0), Detection::new("fire", 60.0)],
        );
        assert_eq!(result.overall_risk(), RiskLevel::Medium);
    }

    #[test]
    fn step_markers_follow_thirds() {
        assert_eq!(progress_steps(0), [false, false, false]);
        assert_eq!(progress_steps(34), [true, false, false]);
        assert_eq!(progress_steps(67), [true, true, false]);
        assert_eq!(progress_steps(100), [true, true, true]);
    }
}
