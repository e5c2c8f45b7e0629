use datamodel::{Symbol, TradingState};
use rustc_hash::FxHashMap;

use crate::calc::Ema;

/// Reference price per product: the EMA of observed mid-prices, with the
/// profile's default price standing in until a two-sided book shows up.
#[derive(Debug, Clone)]
pub struct PriceTracker {
    default_prices: FxHashMap<Symbol, f64>,
    emas: FxHashMap<Symbol, Ema>,
}

impl PriceTracker {
    pub fn new<I>(alpha: f64, default_prices: I) -> Self
    where
        I: IntoIterator<Item = (Symbol, f64)>,
    {
        let default_prices: FxHashMap<Symbol, f64> = default_prices.into_iter().collect();
        let emas = default_prices
            .keys()
            .map(|symbol| (symbol.clone(), Ema::new(alpha)))
            .collect();
        Self {
            default_prices,
            emas,
        }
    }

    pub fn ema(&self, symbol: &str) -> Option<f64> {
        self.emas.get(symbol).and_then(Ema::mean)
    }

    /// EMA if one exists, otherwise the default price.
    pub fn reference_price(&self, symbol: &str) -> Option<f64> {
        self.ema(symbol)
            .or_else(|| self.default_prices.get(symbol).copied())
    }

    /// Mid of the visible book, falling back to [`Self::reference_price`] when
    /// the book is missing or one-sided. Does not touch the EMA.
    pub fn mid_price(&self, symbol: &str, state: &TradingState) -> Option<f64> {
        state
            .order_depth(symbol)
            .and_then(|depth| depth.mid_price())
            .or_else(|| self.reference_price(symbol))
    }

    /// Folds this step's mid-prices into the EMAs. Products without a
    /// two-sided book keep their previous value.
    pub fn update(&mut self, state: &TradingState) {
        for (symbol, ema) in self.emas.iter_mut() {
            let Some(mid_price) = state.order_depth(symbol).and_then(|d| d.mid_price()) else {
                continue;
            };
            let new_mean = ema.update(mid_price);
            tracing::debug!("{symbol}: mid {mid_price}, ema {new_mean}");
        }
    }

    /// Seeded EMAs, for carrying state to the next step.
    pub fn snapshot(&self) -> FxHashMap<Symbol, f64> {
        self.emas
            .iter()
            .filter_map(|(symbol, ema)| ema.mean().map(|mean| (symbol.clone(), mean)))
            .collect()
    }

    /// Reseeds EMAs from a snapshot. Products not tracked here are ignored.
    pub fn restore(&mut self, snapshot: &FxHashMap<Symbol, f64>) {
        for (symbol, mean) in snapshot {
            match self.emas.get_mut(symbol) {
                Some(ema) => ema.reset(*mean),
                None => tracing::warn!("Carried EMA for untracked product {symbol} ignored"),
            }
        }
    }
}
