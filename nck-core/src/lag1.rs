//! Streaming lag-1 autocorrelation estimator.
//!
//! The reference implementation kept this as file-scope mutable state; here
//! it is an owned value the caller threads through explicitly, so two
//! demodulations never share (or race on) estimator state. `push` costs
//! `O(w)` per sample: the running mean is updated incrementally, while the
//! lag-1 sums are recomputed over the centered window each call to keep
//! drift compensation simple and exact.

const RECENTER_INTERVAL: usize = 4096;

/// Incremental lag-1 autocorrelation over a trailing window of `w` samples.
#[derive(Debug, Clone)]
pub struct Lag1Estimator {
    window: usize,
    history: std::collections::VecDeque<f64>,
    mean: f64,
    count_since_recenter: usize,
    sum: f64,
}

impl Lag1Estimator {
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "lag-1 window must hold at least 2 samples");
        Self {
            window,
            history: std::collections::VecDeque::with_capacity(window),
            mean: 0.0,
            count_since_recenter: 0,
            sum: 0.0,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Feed one new sample, evicting the oldest if the window is full, and
    /// return the current lag-1 autocorrelation estimate (`0.0` until the
    /// window first fills).
    pub fn push(&mut self, sample: f64) -> f64 {
        self.history.push_back(sample);
        self.sum += sample;
        self.count_since_recenter += 1;

        if self.history.len() > self.window {
            if let Some(evicted) = self.history.pop_front() {
                self.sum -= evicted;
            }
        }

        // Periodically recompute the running mean from scratch to bound
        // floating point drift from the incremental running sum.
        if self.count_since_recenter >= RECENTER_INTERVAL {
            self.mean = self.sum / self.history.len() as f64;
            self.count_since_recenter = 0;
        } else if !self.history.is_empty() {
            self.mean = self.sum / self.history.len() as f64;
        }

        self.lag1_from_window()
    }

    fn lag1_from_window(&self) -> f64 {
        if self.history.len() < self.window {
            return 0.0;
        }

        let m = self.mean;
        let mut num = 0.0;
        let mut den = 0.0;
        let mut prev: Option<f64> = None;
        for &x in self.history.iter() {
            let centered = x - m;
            if let Some(p) = prev {
                num += p * centered;
            }
            den += centered * centered;
            prev = Some(centered);
        }

        if den.abs() < 1e-12 {
            0.0
        } else {
            num / den
        }
    }

    pub fn is_full(&self) -> bool {
        self.history.len() >= self.window
    }
}

/// Run a full lag-1 stream over `samples`, returning one estimate per input
/// sample (`0.0` for the first `window-1` samples while the window fills).
pub fn lag1_stream(samples: &[f64], window: usize) -> Vec<f64> {
    let mut estimator = Lag1Estimator::new(window);
    samples.iter().map(|&s| estimator.push(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_signal_has_zero_autocorrelation_denominator() {
        let samples = vec![1.0; 100];
        let out = lag1_stream(&samples, 16);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn alternating_signal_has_negative_lag1() {
        let samples: Vec<f64> = (0..200).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let out = lag1_stream(&samples, 32);
        let last = *out.last().unwrap();
        assert!(last < -0.9, "expected strongly negative lag-1, got {last}");
    }

    #[test]
    fn ramp_signal_has_positive_lag1() {
        let samples: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let out = lag1_stream(&samples, 32);
        let last = *out.last().unwrap();
        assert!(last > 0.5, "expected strongly positive lag-1, got {last}");
    }

    #[test]
    fn independent_estimators_do_not_share_state() {
        let mut a = Lag1Estimator::new(8);
        let mut b = Lag1Estimator::new(8);
        for i in 0..20 {
            a.push(i as f64);
        }
        for _ in 0..20 {
            b.push(0.0);
        }
        assert_ne!(a.push(1.0), b.push(1.0));
    }
}
