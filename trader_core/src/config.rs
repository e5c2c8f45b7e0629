use anyhow::{Result, ensure};
use datamodel::Quantity;
use serde::Deserialize;

/// Runtime knobs, read from `TRADER_*` environment variables (a `.env` file
/// is honoured). Every field has a default.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TraderConfig {
    /// Weight of the newest mid-price in the reference EMA.
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f64,
    /// Samples between the two ends of the observation slope, inclusive.
    #[serde(default = "default_signal_lookback")]
    pub signal_lookback: usize,
    /// Largest sell size the observation signal quotes when the two series disagree.
    #[serde(default = "default_signal_ask_cap")]
    pub signal_ask_cap: Quantity,
    /// Cap on the compressed per-step log line.
    #[serde(default = "default_log_max_length")]
    pub log_max_length: usize,
}

fn default_ema_alpha() -> f64 {
    0.5
}

fn default_signal_lookback() -> usize {
    10
}

fn default_signal_ask_cap() -> Quantity {
    100
}

fn default_log_max_length() -> usize {
    3750
}

impl Default for TraderConfig {
    fn default() -> Self {
        Self {
            ema_alpha: default_ema_alpha(),
            signal_lookback: default_signal_lookback(),
            signal_ask_cap: default_signal_ask_cap(),
            log_max_length: default_log_max_length(),
        }
    }
}

impl TraderConfig {
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env loaded: {e}");
        }
        let config: Self = envy::prefixed("TRADER_").from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.ema_alpha > 0. && self.ema_alpha <= 1.,
            "ema_alpha must be in (0, 1], got {}",
            self.ema_alpha
        );
        ensure!(
            self.signal_lookback >= 2,
            "signal_lookback must be at least 2, got {}",
            self.signal_lookback
        );
        ensure!(
            self.signal_ask_cap > 0,
            "signal_ask_cap must be positive, got {}",
            self.signal_ask_cap
        );
        Ok(())
    }
}
