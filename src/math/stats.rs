//! Column statistics.
//!
//! All functions return `None` for empty input instead of producing NaN.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let var = values.iter().map(|v| (v - mu) * (v - mu)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Median (mean of the two middle values for even-length input).
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    median_mut(&mut sorted)
}

fn median_mut(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// `(min, max)` of the input.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for &v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    Some((lo, hi))
}

/// Coefficient of determination of `predicted` against `observed`.
///
/// A constant `observed` column gives `1.0` for a perfect fit and `0.0` otherwise.
pub fn r_squared(observed: &[f64], predicted: &[f64]) -> Option<f64> {
    if observed.len() != predicted.len() {
        return None;
    }
    let mu = mean(observed)?;
    let ss_res: f64 = observed.iter().zip(predicted).map(|(o, p)| (o - p) * (o - p)).sum();
    let ss_tot: f64 = observed.iter().map(|o| (o - mu) * (o - mu)).sum();
    if ss_tot <= f64::EPSILON {
        return Some(if ss_res <= f64::EPSILON { 1.0 } else { 0.0 });
    }
    Some(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_population_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&v).unwrap() - 5.0).abs() < 1e-12);
        assert!((population_std(&v).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn empty_input_has_no_statistics() {
        assert!(mean(&[]).is_none());
        assert!(population_std(&[]).is_none());
        assert!(median(&[]).is_none());
        assert!(min_max(&[]).is_none());
    }

    #[test]
    fn r_squared_perfect_and_mean_only() {
        let obs = [1.0, 2.0, 3.0];
        assert!((r_squared(&obs, &obs).unwrap() - 1.0).abs() < 1e-12);
        assert!(r_squared(&obs, &[2.0, 2.0, 2.0]).unwrap().abs() < 1e-12);
    }
}
