use std::collections::BTreeMap;

use anyhow::{Context, Result};
use datamodel::{Order, SUBMISSION, Symbol, Timestamp, TradingState};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    config::TraderConfig,
    history::{HistorySnapshot, ObservationHistory},
    pricing::PriceTracker,
    profile::{PRODUCT_PROFILES, ProductProfile, ProductProfiles},
    strategy::{QuoteContext, Strategy, build_strategy},
    visualizer::Visualizer,
};

/// What the trader hands back to the harness after a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraderOutput {
    pub orders: FxHashMap<Symbol, Vec<Order>>,
    pub conversions: i64,
    pub trader_data: String,
}

/// State written to `trader_data` so a fresh process can pick up where the
/// last one stopped.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CarriedState {
    #[serde(default)]
    ema: FxHashMap<Symbol, f64>,
    #[serde(default)]
    history: FxHashMap<Symbol, HistorySnapshot>,
    #[serde(default)]
    cash: f64,
    #[serde(default)]
    last_timestamp: Option<Timestamp>,
}

struct Desk {
    symbol: Symbol,
    profile: ProductProfile,
    strategy: Box<dyn Strategy>,
}

pub struct Trader {
    config: TraderConfig,
    desks: Vec<Desk>,
    tracker: PriceTracker,
    histories: FxHashMap<Symbol, ObservationHistory>,
    visualizer: Visualizer,
    round: u64,
    last_timestamp: Option<Timestamp>,
    /// Cash moved by our own fills, starting from zero.
    cash: f64,
    /// Cash plus positions marked at the mid, as of the last step.
    pnl: f64,
}

impl Trader {
    pub fn new(profiles: &ProductProfiles, config: TraderConfig) -> Self {
        let desks: Vec<Desk> = profiles
            .iter()
            .map(|(symbol, profile)| Desk {
                symbol: symbol.clone(),
                profile: *profile,
                strategy: build_strategy(profile.strategy, &config),
            })
            .collect();
        let tracker = PriceTracker::new(
            config.ema_alpha,
            desks
                .iter()
                .map(|desk| (desk.symbol.clone(), desk.profile.default_price as f64)),
        );
        tracing::info!(
            "Trader ready for {}",
            desks
                .iter()
                .map(|desk| format!("{} ({})", desk.symbol, desk.strategy.name()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self {
            visualizer: Visualizer::new(config.log_max_length),
            config,
            desks,
            tracker,
            histories: FxHashMap::default(),
            round: 0,
            last_timestamp: None,
            cash: 0.,
            pnl: 0.,
        }
    }

    /// A trader over the profiles shipped in `products.toml`.
    pub fn with_builtin_profiles(config: TraderConfig) -> Self {
        Self::new(&PRODUCT_PROFILES, config)
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn tracker(&self) -> &PriceTracker {
        &self.tracker
    }

    pub fn history(&self, symbol: &str) -> Option<&ObservationHistory> {
        self.histories.get(symbol)
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Own estimate of profit and loss after the last step.
    pub fn pnl(&self) -> f64 {
        self.pnl
    }

    /// One step. Never fails: a product whose strategy errors is logged and
    /// left without orders for this step.
    pub fn run(&mut self, state: &TradingState) -> TraderOutput {
        if self.round == 0 && !state.trader_data.is_empty() {
            if let Err(e) = self.restore(&state.trader_data) {
                tracing::warn!("Ignoring carried trader data: {e:#}");
                self.visualizer.print(format!("Ignoring carried trader data: {e:#}"));
            }
        }
        self.round += 1;
        tracing::info!("Round: {}, Timestamp: {}", self.round, state.timestamp);
        self.visualizer
            .print(format!("Round: {}, Timestamp: {}", self.round, state.timestamp));

        self.settle_own_fills(state);
        self.tracker.update(state);
        let emas: BTreeMap<_, _> = self.tracker.snapshot().into_iter().collect();
        self.visualizer.print(format!("Updated EMA Prices: {emas:?}"));
        self.update_pnl(state);
        self.record_observations(state);

        let mut orders = FxHashMap::default();
        for desk in &self.desks {
            self.visualizer
                .print(format!("Executing {} strategy", desk.symbol));
            match self.quote_desk(desk, state) {
                Ok(desk_orders) => {
                    tracing::debug!("{}: {desk_orders:?}", desk.symbol);
                    orders.insert(desk.symbol.clone(), desk_orders);
                }
                Err(e) => {
                    tracing::error!("Error in {} strategy: {e:#}", desk.symbol);
                    self.visualizer
                        .print(format!("Error in {} strategy: {e:#}", desk.symbol));
                }
            }
        }

        self.last_timestamp = Some(state.timestamp);
        TraderOutput {
            orders,
            conversions: 0,
            trader_data: self.carried_state(),
        }
    }

    /// The compressed log line of the step `output` answered. Clears the
    /// step's log buffer.
    pub fn log_line(&mut self, state: &TradingState, output: &TraderOutput) -> String {
        self.visualizer
            .flush(state, &output.orders, output.conversions, &output.trader_data)
    }

    fn quote_desk(&self, desk: &Desk, state: &TradingState) -> Result<Vec<Order>> {
        let reference_price = self
            .tracker
            .reference_price(&desk.symbol)
            .with_context(|| format!("no reference price for {}", desk.symbol))?;
        let ctx = QuoteContext {
            symbol: &desk.symbol,
            depth: state.order_depth(&desk.symbol),
            position: state.position_of(&desk.symbol),
            position_limit: desk.profile.position_limit,
            default_price: desk.profile.default_price,
            reference_price,
            history: self.histories.get(&desk.symbol),
        };
        let mut orders = desk.strategy.quote(&ctx)?;
        orders.retain(|order| order.quantity != 0);
        Ok(orders)
    }

    fn record_observations(&mut self, state: &TradingState) {
        let lookback = self.config.signal_lookback;
        for (product, observation) in &state.observations.conversion_observations {
            self.histories
                .entry(product.clone())
                .or_insert_with(|| ObservationHistory::new(lookback))
                .record(observation);
        }
        for desk in &self.desks {
            if state.conversion_observation(&desk.symbol).is_none()
                && self.histories.contains_key(&desk.symbol)
            {
                tracing::warn!("No conversion observation for {} this step", desk.symbol);
                self.visualizer
                    .print(format!("No conversion observation for {} this step", desk.symbol));
            }
        }
    }

    /// Books the cash of our own trades from the previous step. Older trades
    /// were settled on earlier steps.
    fn settle_own_fills(&mut self, state: &TradingState) {
        let Some(last_timestamp) = self.last_timestamp else {
            return;
        };
        for trades in state.own_trades.values() {
            for trade in utils::stamped_at(trades, last_timestamp) {
                let notional = (trade.quantity * trade.price) as f64;
                if trade.buyer.as_deref() == Some(SUBMISSION) {
                    self.cash -= notional;
                    tracing::info!("Bought {} {} @ {}", trade.quantity, trade.symbol, trade.price);
                }
                if trade.seller.as_deref() == Some(SUBMISSION) {
                    self.cash += notional;
                    tracing::info!("Sold {} {} @ {}", trade.quantity, trade.symbol, trade.price);
                }
            }
        }
    }

    /// Cash plus every reported position marked at its mid-price.
    fn update_pnl(&mut self, state: &TradingState) {
        let mut value = 0.;
        for (product, position) in &state.position {
            match self.tracker.mid_price(product, state) {
                Some(mid_price) => value += *position as f64 * mid_price,
                None => tracing::warn!("No price to mark {position} {product}"),
            }
        }
        self.pnl = self.cash + value;
        tracing::info!("PnL estimate: {:.1} (cash {:.1})", self.pnl, self.cash);
        self.visualizer
            .print(format!("PnL: {:.1}, Cash: {:.1}", self.pnl, self.cash));
    }

    fn restore(&mut self, trader_data: &str) -> Result<()> {
        let carried: CarriedState =
            serde_json::from_str(trader_data).context("malformed trader data")?;
        self.tracker.restore(&carried.ema);
        self.cash = carried.cash;
        self.last_timestamp = carried.last_timestamp;
        let lookback = self.config.signal_lookback;
        for (symbol, snapshot) in &carried.history {
            self.histories.insert(
                symbol.clone(),
                ObservationHistory::from_snapshot(lookback, snapshot),
            );
        }
        tracing::info!(
            "Restored {} EMAs and {} observation histories",
            carried.ema.len(),
            carried.history.len()
        );
        Ok(())
    }

    fn carried_state(&self) -> String {
        let carried = CarriedState {
            ema: self.tracker.snapshot(),
            history: self
                .histories
                .iter()
                .map(|(symbol, history)| (symbol.clone(), history.snapshot()))
                .collect(),
            cash: self.cash,
            last_timestamp: self.last_timestamp,
        };
        serde_json::to_string(&carried).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize trader data: {e}");
            String::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use datamodel::{ConversionObservation, OrderDepth, Trade};
    use float_cmp::assert_approx_eq;

    use super::*;

    fn trader() -> Trader {
        Trader::with_builtin_profiles(TraderConfig::default())
    }

    fn state(timestamp: Timestamp) -> TradingState {
        TradingState {
            timestamp,
            ..Default::default()
        }
    }

    fn observe(state: &mut TradingState, sunlight: f64, humidity: f64) {
        state.observations.conversion_observations.insert(
            "ORCHIDS".into(),
            ConversionObservation {
                sunlight,
                humidity,
                ..Default::default()
            },
        );
    }

    #[test]
    fn test_anchor_orders_through_run() {
        let mut trader = trader();
        let mut state = state(0);
        state.order_depths.insert(
            "AMETHYSTS".into(),
            OrderDepth::new([(10_005, 2)], [(10_010, -2)]),
        );

        let output = trader.run(&state);
        assert_eq!(
            output.orders["AMETHYSTS"],
            vec![
                Order::new("AMETHYSTS", 10_000, 20),
                Order::new("AMETHYSTS", 10_005, -20),
            ]
        );
        assert_eq!(output.conversions, 0);
        assert_eq!(trader.round(), 1);
    }

    #[test]
    fn test_failing_product_does_not_block_others() {
        let mut trader = trader();
        // No AMETHYSTS book: that desk fails, STARFRUIT still quotes off its default.
        let output = trader.run(&state(0));
        assert!(!output.orders.contains_key("AMETHYSTS"));
        assert_eq!(
            output.orders["STARFRUIT"],
            vec![
                Order::new("STARFRUIT", 4_999, 20),
                Order::new("STARFRUIT", 5_001, -20),
            ]
        );
        assert!(output.orders["ORCHIDS"].is_empty());
    }

    #[test]
    fn test_zero_sizes_dropped() {
        let mut trader = trader();
        let mut state = state(0);
        state.position.insert("STARFRUIT".into(), 20);
        let output = trader.run(&state);
        assert_eq!(
            output.orders["STARFRUIT"],
            vec![Order::new("STARFRUIT", 5_000, -40)]
        );
    }

    #[test]
    fn test_ema_follows_book() {
        let mut trader = trader();
        let mut state = state(0);
        state.order_depths.insert(
            "STARFRUIT".into(),
            OrderDepth::new([(99, 1)], [(101, -1)]),
        );
        trader.run(&state);
        state.order_depths.insert(
            "STARFRUIT".into(),
            OrderDepth::new([(199, 1)], [(201, -1)]),
        );
        let output = trader.run(&state);
        assert_approx_eq!(f64, trader.tracker().ema("STARFRUIT").unwrap(), 150.);
        assert_eq!(output.orders["STARFRUIT"][0].price, 149);
        assert_eq!(output.orders["STARFRUIT"][1].price, 151);
    }

    #[test]
    fn test_orchids_signal_after_ten_samples() {
        let mut trader = trader();
        for step in 0..10 {
            let mut state = state(step * 100);
            state.order_depths.insert(
                "ORCHIDS".into(),
                OrderDepth::new([(1_095, 5)], [(1_101, -5)]),
            );
            observe(&mut state, 2_000. + step as f64, 60. + step as f64);
            let output = trader.run(&state);
            if step < 9 {
                assert!(output.orders["ORCHIDS"].is_empty(), "step {step}");
            } else {
                assert_eq!(output.orders["ORCHIDS"], vec![Order::new("ORCHIDS", 1_101, 100)]);
            }
        }
    }

    #[test]
    fn test_carried_state_round_trip() {
        let mut trader = trader();
        let mut state = state(0);
        state.order_depths.insert(
            "STARFRUIT".into(),
            OrderDepth::new([(5_010, 1)], [(5_014, -1)]),
        );
        for step in 0..10 {
            state.timestamp = step * 100;
            observe(&mut state, 2_000. - step as f64, 60. - step as f64);
            state.order_depths.insert(
                "ORCHIDS".into(),
                OrderDepth::new([(1_095, 5)], [(1_101, -5)]),
            );
            state.trader_data = trader.run(&state).trader_data;
        }

        // A fresh process resumes from the carried string.
        let mut resumed = self::trader();
        state.timestamp = 1_000;
        observe(&mut state, 1_990., 50.);
        let output = resumed.run(&state);
        assert_approx_eq!(f64, resumed.tracker().ema("STARFRUIT").unwrap(), 5_012.);
        assert_eq!(resumed.history("ORCHIDS").unwrap().sunlight.len(), 10);
        assert_eq!(output.orders["ORCHIDS"], vec![Order::new("ORCHIDS", 1_095, -100)]);
    }

    #[test]
    fn test_malformed_trader_data_ignored() {
        let mut trader = trader();
        let mut state = state(0);
        state.trader_data = "SAMPLE".to_string();
        let output = trader.run(&state);
        assert_eq!(trader.round(), 1);
        assert!(output.orders.contains_key("STARFRUIT"));

        let line = trader.log_line(&state, &output);
        assert!(line.contains("Ignoring carried trader data"));
    }

    #[test]
    fn test_log_line_clears_buffer() {
        let mut trader = trader();
        let state = state(0);
        let output = trader.run(&state);
        let line = trader.log_line(&state, &output);
        assert!(line.contains("Round: 1, Timestamp: 0"));
        assert!(line.contains("Error in AMETHYSTS strategy"));

        let output = trader.run(&state);
        let line = trader.log_line(&state, &output);
        assert!(line.contains("Round: 2"));
        assert!(!line.contains("Round: 1,"));
    }

    fn fill(
        price: i64,
        quantity: i64,
        buyer: Option<&str>,
        seller: Option<&str>,
        timestamp: Timestamp,
    ) -> Trade {
        Trade {
            symbol: "STARFRUIT".into(),
            price,
            quantity,
            buyer: buyer.map(Into::into),
            seller: seller.map(Into::into),
            timestamp,
        }
    }

    #[test]
    fn test_pnl_from_own_fills() {
        let mut trader = trader();
        trader.run(&state(100));
        let mut state = state(200);
        state.own_trades.insert(
            "STARFRUIT".into(),
            vec![
                // Settled on an earlier step.
                fill(4_000, 7, Some(SUBMISSION), None, 0),
                fill(4_999, 3, Some(SUBMISSION), Some("BOB"), 100),
                fill(5_003, 2, Some("ALICE"), Some(SUBMISSION), 100),
            ],
        );
        state.position.insert("STARFRUIT".into(), 1);
        state.order_depths.insert(
            "STARFRUIT".into(),
            OrderDepth::new([(4_999, 4)], [(5_003, -4)]),
        );

        let output = trader.run(&state);
        assert_approx_eq!(f64, trader.cash(), -4_991.);
        assert_approx_eq!(f64, trader.pnl(), 10.);

        let line = trader.log_line(&state, &output);
        assert!(line.contains("PnL: 10.0, Cash: -4991.0"), "{line}");
    }

    #[test]
    fn test_pnl_marks_without_book() {
        let mut trader = trader();
        let mut state = state(0);
        state.position.insert("AMETHYSTS".into(), -2);
        trader.run(&state);
        // No book: AMETHYSTS is marked at its default price.
        assert_approx_eq!(f64, trader.pnl(), -20_000.);
    }

    #[test]
    fn test_cash_carried_across_resume() {
        let mut trader = trader();
        let mut state = state(100);
        state.trader_data = trader.run(&state).trader_data;

        state.timestamp = 200;
        state.own_trades.insert(
            "STARFRUIT".into(),
            vec![fill(5_000, 2, None, Some(SUBMISSION), 100)],
        );
        // The fills at 100 are settled by the resumed trader exactly once.
        let mut resumed = self::trader();
        let output = resumed.run(&state);
        assert_approx_eq!(f64, resumed.cash(), 10_000.);

        let mut again = self::trader();
        state.timestamp = 300;
        state.trader_data = output.trader_data;
        again.run(&state);
        assert_approx_eq!(f64, again.cash(), 10_000.);
    }

    #[test]
    fn test_step_log_names_emas_and_desks() {
        let mut trader = trader();
        let mut state = state(0);
        state.order_depths.insert(
            "STARFRUIT".into(),
            OrderDepth::new([(5_010, 1)], [(5_014, -1)]),
        );
        let output = trader.run(&state);
        let line = trader.log_line(&state, &output);
        assert!(line.contains("Updated EMA Prices:"), "{line}");
        assert!(line.contains("5012"), "{line}");
        for symbol in ["AMETHYSTS", "ORCHIDS", "STARFRUIT"] {
            assert!(line.contains(&format!("Executing {symbol} strategy")), "{line}");
        }
    }

    #[test]
    fn test_missing_orchids_observation_skips_sample() {
        let mut trader = trader();
        for step in 0..3 {
            let mut state = state(step * 100);
            observe(&mut state, 2_000., 60.);
            trader.run(&state);
        }
        assert_eq!(trader.history("ORCHIDS").unwrap().sunlight.len(), 3);

        let mut state = state(300);
        state.order_depths.insert(
            "ORCHIDS".into(),
            OrderDepth::new([(1_095, 5)], [(1_101, -5)]),
        );
        let output = trader.run(&state);
        let history = trader.history("ORCHIDS").unwrap();
        assert_eq!(history.sunlight.len(), 3);
        assert_eq!(history.humidity.len(), 3);
        assert!(output.orders["ORCHIDS"].is_empty());

        let line = trader.log_line(&state, &output);
        assert!(line.contains("No conversion observation for ORCHIDS this step"));
    }
}
