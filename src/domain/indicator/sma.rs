//! Simple Moving Average.
//!
//! SMA(n) = (P[last-n+1] + ... + P[last]) / n
//! Undefined when fewer than n values exist or n == 0.

pub fn calculate_sma(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sma_of_last_window() {
        let prices = [100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 112.0];
        assert_relative_eq!(calculate_sma(&prices, 3).unwrap(), 110.0);
    }

    #[test]
    fn sma_full_series() {
        let prices = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(calculate_sma(&prices, 4).unwrap(), 2.5);
    }

    #[test]
    fn sma_undefined_when_short() {
        assert_eq!(calculate_sma(&[1.0, 2.0], 3), None);
        assert_eq!(calculate_sma(&[], 1), None);
    }

    #[test]
    fn sma_zero_window() {
        assert_eq!(calculate_sma(&[1.0, 2.0], 0), None);
    }
}
