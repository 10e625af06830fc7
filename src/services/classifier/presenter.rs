use crate::error::AppError;
use crate::models::classify_types::{ClassificationResult, Detection};
use crate::models::view_types::{
    AlertCard, ClassificationView, ConfidenceStatsView, DetectionRow, FileInfoView, RiskBadge,
    SummaryView,
};
use crate::services::classifier::{confidence, recommendations, risk};
use crate::services::localization::Locale;

/// Builds the results view for one classification. Pure; no I/O.
///
/// Fails with `NoDetections` when the service reported nothing; callers that
/// want the safe placeholder instead use [`present_or_safe`].
pub fn present(result: &ClassificationResult, locale: Locale) -> Result<ClassificationView, AppError> {
    let detections = result.detections();
    if detections.is_empty() {
        return Err(AppError::NoDetections);
    }

    let stats = confidence::aggregate(detections)?;
    let primary = risk::primary_detection(detections).ok_or(AppError::NoDetections)?;
    let level = risk::classify(&primary.category, primary.confidence);
    let actions = recommendations::recommend(&primary.category, locale);

    let rows = detections
        .iter()
        .map(|detection| detection_row(detection, std::ptr::eq(detection, primary), locale))
        .collect();

    let alert_cards = result
        .alert_details
        .iter()
        .map(|alert| AlertCard {
            title: alert.title.clone(),
            message: alert.message.clone(),
            category: alert.category.clone(),
            confidence: format!("{}%", alert.confidence.round()),
            method_badges: alert
                .sent_methods
                .iter()
                .map(|method| locale.delivery_method(method))
                .collect(),
        })
        .collect();

    Ok(ClassificationView {
        file: FileInfoView {
            filename: result.filename.clone(),
            file_path: result.file_path.clone(),
            classification_id: result.classification_id.clone(),
            processing_time: format!(
                "{:.2} {}",
                result.processing_time_seconds,
                locale.texts().seconds
            ),
        },
        summary: SummaryView {
            category: primary.category.clone(),
            title: locale.category_title(&primary.category).to_string(),
            description: locale
                .description(&primary.category, primary.subcategory.as_deref())
                .to_string(),
            icon: primary.category.icon(),
            color_class: primary.category.color_class(),
            confidence_percent: primary.confidence.round() as u8,
        },
        risk: RiskBadge::new(level, locale.risk_text(level)),
        stats: ConfidenceStatsView {
            entity_count: stats.count,
            mean: format!("{:.2}%", stats.mean),
            min: format!("{:.2}%", stats.min),
            max: format!("{:.2}%", stats.max),
        },
        detections: rows,
        recommendations: actions.iter().map(|a| a.to_string()).collect(),
        alerts_triggered: result.alerts_triggered.clone(),
        alerts_sent: result.alerts_sent,
        alert_cards,
        recovered_default: false,
    })
}

/// Like [`present`], but an empty response is shown as a normal, safe result.
pub fn present_or_safe(result: &ClassificationResult, locale: Locale) -> Result<ClassificationView, AppError> {
    match present(result, locale) {
        Err(AppError::NoDetections) | Err(AppError::EmptyInput) => {
            tracing::debug!(
                filename = %result.filename,
                "no detections in response, presenting safe default"
            );
            let fallback = result.with_detections(vec![Detection::safe_default()]);
            let mut view = present(&fallback, locale)?;
            view.recovered_default = true;
            Ok(view)
        }
        other => other,
    }
}

fn detection_row(detection: &Detection, is_primary: bool, locale: Locale) -> DetectionRow {
    let level = risk::classify(&detection.category, detection.confidence);
    DetectionRow {
        category: detection.category.clone(),
        title: locale.category_title(&detection.category).to_string(),
        icon: detection.category.icon(),
        confidence_compact: format!("{}%", detection.confidence.round()),
        confidence_detailed: format!("{:.2}%", detection.confidence),
        confidence_width: detection.confidence,
        risk: RiskBadge::new(level, locale.risk_text(level)),
        is_primary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classify_types::{AlertDetail, Category, RiskLevel};

    fn sample() -> ClassificationResult {
        let mut result = ClassificationResult::new(
            "junction.jpg",
            vec![
                Detection::new("traffic", 72.456).with_subcategory("heavy"),
                Detection::new("accident", 88.5).with_subcategory("major"),
                Detection::new("normal", 10.0),
            ],
        );
        result.file_path = "uploads/junction.jpg".to_string();
        result.classification_id = "17".to_string();
        result.processing_time_seconds = 1.2345;
        result.alerts_triggered = vec!["accident detected".to_string()];
        result.alerts_sent = 1;
        result.alert_details = vec![AlertDetail {
            title: "Accident".to_string(),
            message: "Major accident at junction".to_string(),
            category: Category::Accident,
            confidence: 88.5,
            sent_methods: vec!["email".to_string(), "sms".to_string()],
        }];
        result
    }

    #[test]
    fn builds_full_view() {
        let view = present(&sample(), Locale::En).unwrap();

        assert_eq!(view.file.processing_time, "1.23 seconds");
        assert_eq!(view.summary.category, Category::Accident);
        assert_eq!(view.summary.description, "Serious accident requiring emergency services");
        assert_eq!(view.summary.confidence_percent, 89);
        assert_eq!(view.risk.level, RiskLevel::High);
        assert_eq!(view.risk.scale_percent, 75);
        assert_eq!(view.risk.color, "#ef4444");
        assert_eq!(view.stats.entity_count, 3);
        assert_eq!(view.stats.max, "88.50%");
        assert_eq!(view.stats.min, "10.00%");
        assert_eq!(view.recommendations[0], "Call an ambulance on 997");
        assert_eq!(view.recommendations.len(), 4);
        assert!(!view.recovered_default);
    }

    #[test]
    fn detection_rows_keep_input_order_and_mark_primary() {
        let view = present(&sample(), Locale::En).unwrap();
        let primaries: Vec<bool> = view.detections.iter().map(|r| r.is_primary).collect();
        assert_eq!(primaries, vec![false, true, false]);
        assert_eq!(view.detections[0].confidence_compact, "72%");
        assert_eq!(view.detections[0].confidence_detailed, "72.46%");
        assert_eq!(view.detections[0].risk.level, RiskLevel::Medium);
    }

    #[test]
    fn alert_cards_localize_email_badge() {
        let view = present(&sample(), Locale::Ar).unwrap();
        assert_eq!(
            view.alert_cards[0].method_badges,
            vec!["البريد الإلكتروني".to_string(), "sms".to_string()]
        );
        assert_eq!(view.alert_cards[0].confidence, "89%");
    }

    #[test]
    fn view_risk_matches_recomputed_risk() {
        let result = sample();
        let view = present(&result, Locale::En).unwrap();
        let primary = risk::primary_detection(result.detections()).unwrap();
        assert_eq!(view.risk.level, risk::classify(&primary.category, primary.confidence));
        assert_eq!(view.risk.level, result.overall_risk());
    }

    #[test]
    fn empty_response_is_an_error_for_present() {
        let result = ClassificationResult::new("blank.jpg", Vec::new());
        assert_eq!(present(&result, Locale::En), Err(AppError::NoDetections));
    }

    #[test]
    fn empty_response_is_recovered_as_safe() {
        let result = ClassificationResult::new("blank.jpg", Vec::new());
        let view = present_or_safe(&result, Locale::En).unwrap();
        assert!(view.recovered_default);
        assert_eq!(view.summary.category, Category::Normal);
        assert_eq!(view.summary.description, "The situation is normal and safe");
        assert_eq!(view.risk.level, RiskLevel::Low);
        assert_eq!(view.detections.len(), 1);
    }
}
