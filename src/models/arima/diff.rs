//! Differencing and integration of raw value sequences.

/// Apply `d` ordinary first differences.
///
/// Each pass drops the leading undefined value, so the result has
/// `len - d` entries (or is empty when the input is too short).
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply `d` seasonal differences at lag `period`.
///
/// Each pass drops the leading `period` values. A zero period is a no-op.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result[period..]
            .iter()
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Continue a `d`-times differenced sequence from the end of `original`.
///
/// Used to turn forecasts made on the differenced scale back into levels.
pub fn integrate(differenced: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    let mut result = differenced.to_vec();
    for level in (0..d).rev() {
        let anchor = difference(original, level).last().copied().unwrap_or(0.0);
        result = result
            .iter()
            .scan(anchor, |acc, &step| {
                *acc += step;
                Some(*acc)
            })
            .collect();
    }
    result
}

/// Rebuild a series from its first value and its first difference.
///
/// `inverse_difference(s[0], &difference(s, 1)) == s` for any finite `s`.
pub fn inverse_difference(first: f64, diffs: &[f64]) -> Vec<f64> {
    std::iter::once(first)
        .chain(diffs.iter().scan(first, |acc, &step| {
            *acc += step;
            Some(*acc)
        }))
        .collect()
}
