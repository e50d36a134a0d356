//! Request checks run before any coordinate data is touched.

use crate::{
    keypoints::KeypointId,
    signal::{AnalysisMethod, Selection},
    time_range::TimeRange,
    Error, Result,
};

/// Reject ranges whose start is not strictly before their end
///
/// # Errors
///
/// Returns `InvalidRange` when `start >= end` in total seconds
pub fn check_range(range: &TimeRange) -> Result<()> {
    if range.is_ordered() {
        Ok(())
    } else {
        Err(Error::InvalidRange {
            start: range.start.to_string(),
            end: range.end.to_string(),
        })
    }
}

/// Match the keypoint count against the method and build a typed selection
///
/// # Errors
///
/// Returns `KeypointCountMismatch` when the count differs from the method's arity
pub fn check_arity(method: AnalysisMethod, keypoints: &[KeypointId]) -> Result<Selection> {
    match (method, keypoints) {
        (AnalysisMethod::Track, &[a]) => Ok(Selection::Track(a)),
        (AnalysisMethod::Distance, &[a, b]) => Ok(Selection::Distance(a, b)),
        (AnalysisMethod::Angle, &[a, b, c]) => Ok(Selection::Angle(a, b, c)),
        _ => Err(Error::KeypointCountMismatch {
            method: method.name().to_string(),
            expected: method.arity(),
            actual: keypoints.len(),
        }),
    }
}

/// Run every check; the range is checked first
///
/// # Errors
///
/// Returns the first failing check's error
pub fn validate(range: &TimeRange, method: AnalysisMethod, keypoints: &[KeypointId]) -> Result<Selection> {
    check_range(range)?;
    check_arity(method, keypoints)
}
