//! Core body temperature estimation from heart rate.
//!
//! Combines a bounded sigmoid prediction with a scalar Kalman update. The
//! sigmoid is driven by the running estimate; heart rates and estimates are
//! kept in rolling windows for trend display.

use std::collections::VecDeque;

/// Lower bound of the predicted core temperature (°C).
pub const MIN_CORE_TEMP: f64 = 36.5;
/// Upper bound of the predicted core temperature (°C).
pub const MAX_CORE_TEMP: f64 = 40.0;
/// Baseline core temperature and sigmoid midpoint (°C).
pub const BASELINE_CORE_TEMP: f64 = 37.0;

const SIGMOID_GROWTH_RATE: f64 = 0.05;
const SIGMOID_SHAPE_FACTOR: f64 = 1.5;
const INITIAL_VARIANCE: f64 = 0.02;
const SENSOR_NOISE_VARIANCE: f64 = 0.02;

/// Observations kept per window (one hour at one per minute).
pub const HEART_RATE_WINDOW: usize = 60;

/// Running core temperature estimator.
#[derive(Debug, Clone)]
pub struct CoreTempEstimator {
    estimate: f64,
    variance: f64,
    heart_rates: VecDeque<f64>,
    estimates: VecDeque<f64>,
}

impl CoreTempEstimator {
    /// Creates an estimator at the baseline temperature.
    #[must_use]
    pub fn new() -> Self {
        Self {
            estimate: BASELINE_CORE_TEMP,
            variance: INITIAL_VARIANCE,
            heart_rates: VecDeque::with_capacity(HEART_RATE_WINDOW),
            estimates: VecDeque::with_capacity(HEART_RATE_WINDOW),
        }
    }

    /// Current estimate in °C.
    #[must_use]
    pub const fn estimate(&self) -> f64 {
        self.estimate
    }

    /// Current estimate variance.
    #[must_use]
    pub const fn variance(&self) -> f64 {
        self.variance
    }

    fn predict(&self) -> f64 {
        MIN_CORE_TEMP
            + (MAX_CORE_TEMP - MIN_CORE_TEMP)
                / (1.0
                    + SIGMOID_SHAPE_FACTOR
                        * (-SIGMOID_GROWTH_RATE * (self.estimate - BASELINE_CORE_TEMP)).exp())
    }

    /// Feeds one heart-rate observation and returns the updated estimate.
    ///
    /// Non-finite heart rates are ignored.
    pub fn update(&mut self, heart_rate: f64) -> f64 {
        if !heart_rate.is_finite() {
            return self.estimate;
        }

        let predicted = self.predict();
        let gain = self.variance / (self.variance + SENSOR_NOISE_VARIANCE);
        self.estimate += gain * (predicted - self.estimate);
        self.variance *= 1.0 - gain;

        push_bounded(&mut self.heart_rates, heart_rate);
        push_bounded(&mut self.estimates, self.estimate);

        self.estimate
    }

    /// Heart rates in the rolling window, oldest first.
    pub fn recent_heart_rates(&self) -> impl Iterator<Item = f64> + '_ {
        self.heart_rates.iter().copied()
    }

    /// Estimates in °C produced by recent updates, oldest first.
    pub fn recent_estimates(&self) -> impl Iterator<Item = f64> + '_ {
        self.estimates.iter().copied()
    }

    /// Mean of the rolling heart-rate window.
    #[must_use]
    pub fn mean_heart_rate(&self) -> Option<f64> {
        if self.heart_rates.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.heart_rates.iter().sum::<f64>() / self.heart_rates.len() as f64;
        Some(mean)
    }
}

fn push_bounded(window: &mut VecDeque<f64>, value: f64) {
    if window.len() == HEART_RATE_WINDOW {
        window.pop_front();
    }
    window.push_back(value);
}

impl Default for CoreTempEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_starts_at_baseline() {
        let estimator = CoreTempEstimator::new();
        assert_eq!(estimator.estimate(), BASELINE_CORE_TEMP);
        assert!(estimator.mean_heart_rate().is_none());
    }

    #[test]
    fn test_first_update() {
        let mut estimator = CoreTempEstimator::new();
        // Prediction at baseline is 36.5 + 3.5 / 2.5 = 37.9, gain is 0.5.
        let estimate = estimator.update(72.0);
        assert!((estimate - 37.45).abs() < 1e-9);
        assert!((estimator.variance() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_stays_bounded() {
        let mut estimator = CoreTempEstimator::new();
        for hr in [72.0, 78.0, 85.0, 90.0, 95.0, 100.0, 110.0, 120.0] {
            let estimate = estimator.update(hr);
            assert!((MIN_CORE_TEMP..=MAX_CORE_TEMP).contains(&estimate));
        }
        assert!(estimator.variance() < INITIAL_VARIANCE);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_ignores_non_finite() {
        let mut estimator = CoreTempEstimator::new();
        let before = estimator.estimate();
        assert_eq!(estimator.update(f64::NAN), before);
        assert_eq!(estimator.recent_heart_rates().count(), 0);
        assert_eq!(estimator.recent_estimates().count(), 0);
    }

    #[test]
    fn test_estimates_follow_updates() {
        let mut estimator = CoreTempEstimator::new();
        let produced: Vec<f64> = [72.0, 78.0, 85.0].iter().map(|&hr| estimator.update(hr)).collect();

        let history: Vec<f64> = estimator.recent_estimates().collect();
        assert_eq!(history, produced);
        assert!(history.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_window_is_bounded() {
        let mut estimator = CoreTempEstimator::new();
        for i in 0..100 {
            estimator.update(f64::from(i));
        }

        let window: Vec<f64> = estimator.recent_heart_rates().collect();
        assert_eq!(window.len(), HEART_RATE_WINDOW);
        assert_eq!(estimator.recent_estimates().count(), HEART_RATE_WINDOW);
        assert!((window[0] - 40.0).abs() < f64::EPSILON);
        assert!((estimator.mean_heart_rate().unwrap() - 69.5).abs() < 1e-9);
    }
}
