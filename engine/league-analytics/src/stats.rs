//! Small numeric helpers shared by the engines.
//!
//! Every helper returns 0.0 for empty input instead of dividing by zero.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (N denominator)
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Interpolated median: the mean of the two middle values for even counts
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Min-max scale `values` into [0, 1]. A set with no spread maps to 0.5.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    values
        .iter()
        .map(|v| if spread > f64::EPSILON { (v - min) / spread } else { 0.5 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[110.0, 80.0, 100.0, 90.0]), 95.0);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_population_std_dev() {
        let sd = population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.0).abs() < 1e-12);
        assert_eq!(population_std_dev(&[]), 0.0);
    }

    #[test]
    fn test_min_max_normalize() {
        assert_eq!(min_max_normalize(&[10.0, 20.0, 15.0]), vec![0.0, 1.0, 0.5]);
        assert_eq!(min_max_normalize(&[7.0, 7.0]), vec![0.5, 0.5]);
        assert!(min_max_normalize(&[]).is_empty());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(12.35, 0), 12.0);
    }
}
