//! Small numeric helpers shared by extraction, plotting and summaries.

pub mod safe_cast;

/// Smallest and largest non-NaN value, or `None` if every value is NaN
pub fn nan_min_max(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Widen a degenerate `[lo, hi]` interval so it can be mapped onto pixels
#[must_use]
pub fn padded_span(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        let pad = if lo.abs() > 0.0 { lo.abs() * 0.05 } else { 0.5 };
        (lo - pad, hi + pad)
    }
}
