use crate::models::classify_types::{Category, Detection, RiskLevel};

const TRAFFIC_MEDIUM_AT: f64 = 70.0;
const HAZARD_HIGH_AT: f64 = 80.0;

/// Risk of a single category at `confidence` percent.
///
/// Thresholds are inclusive on the upper side: traffic at exactly 70 is medium,
/// fire or accident at exactly 80 is high.
pub fn classify(category: &Category, confidence: f64) -> RiskLevel {
    match category {
        Category::Normal => RiskLevel::Low,
        Category::Traffic if confidence < TRAFFIC_MEDIUM_AT => RiskLevel::Low,
        Category::Traffic => RiskLevel::Medium,
        Category::Accident | Category::Fire if confidence < HAZARD_HIGH_AT => RiskLevel::Medium,
        Category::Accident | Category::Fire => RiskLevel::High,
        Category::Violence => RiskLevel::Critical,
        Category::Unknown(_) => RiskLevel::Medium,
    }
}

/// Highest-confidence detection; the earliest one wins a tie.
pub fn primary_detection(detections: &[Detection]) -> Option<&Detection> {
    let mut best: Option<&Detection> = None;
    for detection in detections {
        match best {
            Some(current) if detection.confidence <= current.confidence => {}
            _ => best = Some(detection),
        }
    }
    best
}

/// Overall risk of a result: the primary detection's risk, or low when there is none.
pub fn overall_risk(detections: &[Detection]) -> RiskLevel {
    primary_detection(detections)
        .map(|primary| classify(&primary.category, primary.confidence))
        .unwrap_or(RiskLevel::Low)
}
