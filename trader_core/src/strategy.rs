use anyhow::{Context, Result};
use datamodel::{Order, OrderDepth, Price, Quantity};

use crate::{config::TraderConfig, history::ObservationHistory, profile::StrategyKind};

pub mod anchor;
pub mod signal;
pub mod trend;

pub use anchor::FixedAnchor;
pub use signal::ObservationSignal;
pub use trend::EmaTrend;

/// Everything a strategy may look at for one product in one step.
pub struct QuoteContext<'a> {
    pub symbol: &'a str,
    pub depth: Option<&'a OrderDepth>,
    pub position: Quantity,
    pub position_limit: Quantity,
    pub default_price: Price,
    /// EMA of the mid-price, or the default price before the first mid.
    pub reference_price: f64,
    pub history: Option<&'a ObservationHistory>,
}

impl QuoteContext<'_> {
    /// Largest buy that keeps the position at or below the limit.
    pub fn bid_volume(&self) -> Quantity {
        (self.position_limit - self.position).max(0)
    }

    /// Largest sell (negative) that keeps the position at or above minus the limit.
    pub fn ask_volume(&self) -> Quantity {
        (-self.position_limit - self.position).min(0)
    }

    pub fn best_bid_ask(&self) -> Result<(Price, Price)> {
        self.depth
            .and_then(OrderDepth::best_bid_ask)
            .with_context(|| format!("no two-sided book for {}", self.symbol))
    }

    pub fn order(&self, price: Price, quantity: Quantity) -> Order {
        Order::new(self.symbol, price, quantity)
    }
}

/// Quoting rule for one product. Called once per step and never sees
/// other products.
pub trait Strategy {
    fn name(&self) -> &'static str;

    /// At most two orders. Zero quantities are dropped by the caller.
    fn quote(&self, ctx: &QuoteContext<'_>) -> Result<Vec<Order>>;
}

pub fn build_strategy(kind: StrategyKind, config: &TraderConfig) -> Box<dyn Strategy> {
    match kind {
        StrategyKind::FixedAnchor => Box::new(FixedAnchor),
        StrategyKind::EmaTrend => Box::new(EmaTrend),
        StrategyKind::ObservationSignal => Box::new(ObservationSignal::new(config.signal_ask_cap)),
    }
}
