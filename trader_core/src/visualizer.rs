//! One compressed JSON line per step, in the layout the competition's
//! visualiser reads: `[state, orders, conversions, trader_data, logs]`.

use std::fmt::Display;

use datamodel::{Listing, Observation, Order, OrderDepth, Symbol, Trade, TradingState};
use rustc_hash::FxHashMap;
use serde_json::{Value, json};

pub struct Visualizer {
    logs: String,
    max_log_length: usize,
}

impl Visualizer {
    pub fn new(max_log_length: usize) -> Self {
        Self {
            logs: String::new(),
            max_log_length,
        }
    }

    /// Appends a line to this step's log buffer.
    pub fn print(&mut self, line: impl Display) {
        self.logs.push_str(&line.to_string());
        self.logs.push('\n');
    }

    /// Renders the step and clears the log buffer. The incoming trader data,
    /// the outgoing trader data and the logs share whatever room is left
    /// under the length cap, a third each.
    pub fn flush(
        &mut self,
        state: &TradingState,
        orders: &FxHashMap<Symbol, Vec<Order>>,
        conversions: i64,
        trader_data: &str,
    ) -> String {
        let base_length = json!([
            compress_state(state, ""),
            compress_orders(orders),
            conversions,
            "",
            "",
        ])
        .to_string()
        .chars()
        .count();

        let max_item_length = self.max_log_length.saturating_sub(base_length) / 3;

        let line = json!([
            compress_state(state, &truncate(&state.trader_data, max_item_length)),
            compress_orders(orders),
            conversions,
            truncate(trader_data, max_item_length),
            truncate(&self.logs, max_item_length),
        ])
        .to_string();

        self.logs.clear();
        line
    }
}

fn compress_state(state: &TradingState, trader_data: &str) -> Value {
    json!([
        state.timestamp,
        trader_data,
        compress_listings(&state.listings),
        compress_order_depths(&state.order_depths),
        compress_trades(&state.own_trades),
        compress_trades(&state.market_trades),
        state.position,
        compress_observations(&state.observations),
    ])
}

fn compress_listings(listings: &FxHashMap<Symbol, Listing>) -> Value {
    let mut listings: Vec<_> = listings.values().collect();
    listings.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    listings
        .into_iter()
        .map(|listing| json!([listing.symbol, listing.product, listing.denomination]))
        .collect()
}

fn compress_order_depths(order_depths: &FxHashMap<Symbol, OrderDepth>) -> Value {
    order_depths
        .iter()
        .map(|(symbol, depth)| {
            (
                symbol.to_string(),
                json!([depth.buy_orders, depth.sell_orders]),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn compress_trades(trades: &FxHashMap<Symbol, Vec<Trade>>) -> Value {
    let mut symbols: Vec<_> = trades.keys().collect();
    symbols.sort();
    symbols
        .into_iter()
        .flat_map(|symbol| &trades[symbol])
        .map(|trade| {
            json!([
                trade.symbol,
                trade.price,
                trade.quantity,
                trade.buyer,
                trade.seller,
                trade.timestamp,
            ])
        })
        .collect()
}

fn compress_observations(observations: &Observation) -> Value {
    let conversion_observations = observations
        .conversion_observations
        .iter()
        .map(|(product, o)| {
            (
                product.to_string(),
                json!([
                    o.bid_price,
                    o.ask_price,
                    o.transport_fees,
                    o.export_tariff,
                    o.import_tariff,
                    o.sunlight,
                    o.humidity,
                ]),
            )
        })
        .collect::<serde_json::Map<_, _>>();

    json!([observations.plain_value_observations, conversion_observations])
}

fn compress_orders(orders: &FxHashMap<Symbol, Vec<Order>>) -> Value {
    let mut symbols: Vec<_> = orders.keys().collect();
    symbols.sort();
    symbols
        .into_iter()
        .flat_map(|symbol| &orders[symbol])
        .map(|order| json!([order.symbol, order.price, order.quantity]))
        .collect()
}

/// Cuts `value` to `max_length` characters, the last three being `...`.
fn truncate(value: &str, max_length: usize) -> String {
    if value.chars().count() <= max_length {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(max_length.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
