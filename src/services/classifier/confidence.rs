use crate::error::AppError;
use crate::models::classify_types::Detection;
use serde::Serialize;

/// Summary of detection confidences, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Single pass over the detections. Fails on an empty slice.
pub fn aggregate(detections: &[Detection]) -> Result<ConfidenceStats, AppError> {
    let first = detections.first().ok_or(AppError::EmptyInput)?;

    let mut min = first.confidence;
    let mut max = first.confidence;
    let mut sum = 0.0;
    for detection in detections {
        min = min.min(detection.confidence);
        max = max.max(detection.confidence);
        sum += detection.confidence;
    }

    // Float summation can land a hair outside [min, max] for equal values.
    let mean = sum / detections.len() as f64;
    let mean = if mean < min {
        min
    } else if mean > max {
        max
    } else {
        mean
    };

    Ok(ConfidenceStats {
        mean,
        min,
        max,
        count: detections.len(),
    })
}
