use anyhow::Result;
use datamodel::{Order, Price};

use super::{QuoteContext, Strategy};

/// Quotes around the reference EMA, leaning against inventory: a long book
/// moves both quotes down a tick, a short book moves them up.
pub struct EmaTrend;

impl EmaTrend {
    fn prices(reference: f64, position: i64) -> (Price, Price) {
        let (bid, ask) = match position.signum() {
            0 => ((reference - 1.).floor(), (reference + 1.).ceil()),
            1 => ((reference - 2.).floor(), reference.ceil()),
            _ => (reference.floor(), (reference + 2.).ceil()),
        };
        (bid as Price, ask as Price)
    }
}

impl Strategy for EmaTrend {
    fn name(&self) -> &'static str {
        "ema_trend"
    }

    fn quote(&self, ctx: &QuoteContext<'_>) -> Result<Vec<Order>> {
        let (bid_price, ask_price) = Self::prices(ctx.reference_price, ctx.position);
        Ok(vec![
            ctx.order(bid_price, ctx.bid_volume()),
            ctx.order(ask_price, ctx.ask_volume()),
        ])
    }
}
