use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use utils::Timestamped;

pub type Symbol = smartstring::alias::String;
pub type Product = smartstring::alias::String;
pub type UserId = smartstring::alias::String;

pub type Price = i64;
pub type Quantity = i64;
/// Harness clock. Consecutive steps are usually 100 apart.
pub type Timestamp = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub symbol: Symbol,
    pub product: Product,
    pub denomination: Product,
}

/// Visible book of one symbol. Sell quantities arrive negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDepth {
    #[serde(default)]
    pub buy_orders: BTreeMap<Price, Quantity>,
    #[serde(default)]
    pub sell_orders: BTreeMap<Price, Quantity>,
}

impl OrderDepth {
    pub fn new<B, S>(buy_orders: B, sell_orders: S) -> Self
    where
        B: IntoIterator<Item = (Price, Quantity)>,
        S: IntoIterator<Item = (Price, Quantity)>,
    {
        Self {
            buy_orders: buy_orders.into_iter().collect(),
            sell_orders: sell_orders.into_iter().collect(),
        }
    }

    /// Highest resting bid.
    pub fn best_bid(&self) -> Option<Price> {
        self.buy_orders.last_key_value().map(|(price, _)| *price)
    }

    /// Lowest resting ask.
    pub fn best_ask(&self) -> Option<Price> {
        self.sell_orders.first_key_value().map(|(price, _)| *price)
    }

    /// Both sides of the top of book, or `None` if either side is empty.
    pub fn best_bid_ask(&self) -> Option<(Price, Price)> {
        Some((self.best_bid()?, self.best_ask()?))
    }

    pub fn mid_price(&self) -> Option<f64> {
        self.best_bid_ask()
            .map(|(bid, ask)| (bid + ask) as f64 / 2.)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,
    #[serde(default)]
    pub buyer: Option<UserId>,
    #[serde(default)]
    pub seller: Option<UserId>,
    pub timestamp: Timestamp,
}

impl Timestamped for Trade {
    fn get_ts(&self) -> i64 {
        self.timestamp
    }
}

/// Environmental and tariff readings published for goods that can be
/// converted on a foreign island.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionObservation {
    pub bid_price: f64,
    pub ask_price: f64,
    pub transport_fees: f64,
    pub export_tariff: f64,
    pub import_tariff: f64,
    pub sunlight: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    #[serde(default)]
    pub plain_value_observations: FxHashMap<Product, i64>,
    #[serde(default)]
    pub conversion_observations: FxHashMap<Product, ConversionObservation>,
}

/// Snapshot handed to the trader once per step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingState {
    #[serde(rename = "traderData", default)]
    pub trader_data: String,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub listings: FxHashMap<Symbol, Listing>,
    #[serde(default)]
    pub order_depths: FxHashMap<Symbol, OrderDepth>,
    #[serde(default)]
    pub own_trades: FxHashMap<Symbol, Vec<Trade>>,
    #[serde(default)]
    pub market_trades: FxHashMap<Symbol, Vec<Trade>>,
    #[serde(default)]
    pub position: FxHashMap<Product, Quantity>,
    #[serde(default)]
    pub observations: Observation,
}

impl TradingState {
    /// Net position, zero when the harness reports none.
    pub fn position_of(&self, product: &str) -> Quantity {
        self.position.get(product).copied().unwrap_or(0)
    }

    pub fn order_depth(&self, symbol: &str) -> Option<&OrderDepth> {
        self.order_depths.get(symbol)
    }

    pub fn conversion_observation(&self, product: &str) -> Option<&ConversionObservation> {
        self.observations.conversion_observations.get(product)
    }
}

/// Limit order sent back to the harness. Positive quantity bids, negative asks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,
}

impl Order {
    pub fn new(symbol: impl Into<Symbol>, price: Price, quantity: Quantity) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            quantity,
        }
    }
}
