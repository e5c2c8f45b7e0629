use datamodel::ConversionObservation;
use serde::{Deserialize, Serialize};

use crate::calc::SlopeWindow;

/// Rolling sunlight and humidity readings of one product.
#[derive(Debug, Clone)]
pub struct ObservationHistory {
    pub sunlight: SlopeWindow,
    pub humidity: SlopeWindow,
}

/// Serializable form of [`ObservationHistory`], oldest sample first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    #[serde(default)]
    pub sunlight: Vec<f64>,
    #[serde(default)]
    pub humidity: Vec<f64>,
}

impl ObservationHistory {
    pub fn new(lookback: usize) -> Self {
        Self {
            sunlight: SlopeWindow::new(lookback),
            humidity: SlopeWindow::new(lookback),
        }
    }

    pub fn record(&mut self, observation: &ConversionObservation) {
        self.sunlight.push(observation.sunlight);
        self.humidity.push(observation.humidity);
    }

    /// Sunlight and humidity slopes, once both windows are full.
    pub fn slopes(&self) -> Option<(f64, f64)> {
        Some((self.sunlight.slope()?, self.humidity.slope()?))
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            sunlight: self.sunlight.samples().collect(),
            humidity: self.humidity.samples().collect(),
        }
    }

    pub fn from_snapshot(lookback: usize, snapshot: &HistorySnapshot) -> Self {
        let mut history = Self::new(lookback);
        snapshot
            .sunlight
            .iter()
            .for_each(|sample| history.sunlight.push(*sample));
        snapshot
            .humidity
            .iter()
            .for_each(|sample| history.humidity.push(*sample));
        history
    }
}
