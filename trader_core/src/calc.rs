use std::collections::VecDeque;

/// Exponential moving average with a fixed smoothing factor.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    /// Weight of the newest sample.
    alpha: f64,
    /// EMA of the value.
    mean: Option<f64>,
}

impl Ema {
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0. && alpha <= 1., "alpha must be in (0, 1]");
        Self { alpha, mean: None }
    }

    /// Overwrite the mean, used when restoring carried state.
    pub fn reset(&mut self, init: f64) {
        self.mean = Some(init);
    }

    /// The first sample seeds the mean.
    pub fn update(&mut self, sample: f64) -> f64 {
        let new_mean = match self.mean {
            Some(m) => self.alpha * sample + (1. - self.alpha) * m,
            None => sample,
        };
        self.mean = Some(new_mean);

        new_mean
    }

    pub fn mean(&self) -> Option<f64> {
        self.mean
    }
}

/// The most recent `lookback` samples of a series, used for the backward
/// difference between the newest and the oldest of them.
#[derive(Debug, Clone)]
pub struct SlopeWindow {
    lookback: usize,
    samples: VecDeque<f64>,
}

impl SlopeWindow {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 2, "lookback must cover at least two samples");
        Self {
            lookback,
            samples: VecDeque::with_capacity(lookback),
        }
    }

    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.lookback {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_warm(&self) -> bool {
        self.samples.len() == self.lookback
    }

    /// `latest - oldest` once the window is full.
    pub fn slope(&self) -> Option<f64> {
        if !self.is_warm() {
            return None;
        }
        Some(self.samples.back()? - self.samples.front()?)
    }

    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}
