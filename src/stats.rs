//! Descriptive statistics for latency samples.
//!
//! Quantiles use linear interpolation between closest ranks, so the quartiles of
//! `[1, 2, 3, 4, 100]` are `2` and `4`.

/// Factor applied to the interquartile range when deciding what counts as an outlier.
pub const IQR_FACTOR: f64 = 1.5;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

// q in [0, 1], sorted must not be empty
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// First quartile, median and third quartile.
pub fn quartiles(values: &[f64]) -> Option<(f64, f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let s = sorted(values);
    Some((quantile_sorted(&s, 0.25), quantile_sorted(&s, 0.5), quantile_sorted(&s, 0.75)))
}

/// Inclusive range `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]` outside of which samples are outliers.
pub fn inlier_bounds(values: &[f64]) -> Option<(f64, f64)> {
    let (q1, _, q3) = quartiles(values)?;
    let iqr = q3 - q1;
    Some((q1 - IQR_FACTOR * iqr, q3 + IQR_FACTOR * iqr))
}

/// The samples that lie within [`inlier_bounds`], in their original order.
pub fn without_outliers(values: &[f64]) -> Vec<f64> {
    match inlier_bounds(values) {
        Some((lo, hi)) => values.iter().copied().filter(|v| (lo..=hi).contains(v)).collect(),
        None => Vec::new(),
    }
}

/// Mean of the samples after interquartile range filtering.
pub fn trimmed_mean(values: &[f64]) -> Option<f64> {
    mean(&without_outliers(values))
}
