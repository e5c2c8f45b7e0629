pub mod types;

pub use types::{
    ConversionObservation, Listing, Observation, Order, OrderDepth, Price, Product, Quantity,
    Symbol, Timestamp, Trade, TradingState, UserId,
};

/// Our own name on the harness' trade records.
pub const SUBMISSION: &str = "SUBMISSION";
