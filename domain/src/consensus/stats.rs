//! Small statistics helpers for consensus merging.
//!
//! Sums run over an ascending copy of the input so that permuting the
//! responses cannot change a merged value in its last bits.

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(sorted(values).iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`)
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let squared: Vec<f64> = values.iter().map(|v| (v - mean).powi(2)).collect();
    Some((sorted(&squared).iter().sum::<f64>() / values.len() as f64).sqrt())
}

/// Sample standard deviation (divides by `n - 1`), `None` below two values
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let squared: Vec<f64> = values.iter().map(|v| (v - mean).powi(2)).collect();
    Some((sorted(&squared).iter().sum::<f64>() / (values.len() - 1) as f64).sqrt())
}

/// Median, averaging the two middle values for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Round to a fixed number of decimals (half away from zero)
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn test_std_devs() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(population_std_dev(&values), Some(2.0));
        let sample = sample_std_dev(&values).unwrap();
        assert!((sample - 2.138).abs() < 0.001);
        assert_eq!(sample_std_dev(&[1.0]), None);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.956, 2), 0.96);
        assert_eq!(round_to(510.04, 1), 510.0);
        assert_eq!(round_to(37.5, 0), 38.0);
    }

    #[test]
    fn test_mean_is_permutation_stable() {
        let a = [0.1, 0.2, 0.3, 1e16, -1e16];
        let b = [1e16, 0.3, -1e16, 0.1, 0.2];
        assert_eq!(mean(&a), mean(&b));
    }
}
