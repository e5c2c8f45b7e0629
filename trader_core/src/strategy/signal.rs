use anyhow::Result;
use datamodel::{Order, Quantity};

use super::{QuoteContext, Strategy};

/// Trades on the slope of the sunlight and humidity series.
///
/// Both rising: lift the best ask. Both falling: hit the best bid. Opposite
/// signs: quote one tick inside the touch on both sides, sell size capped.
/// Anything else, including a cold history, stays out of the market.
pub struct ObservationSignal {
    ask_cap: Quantity,
}

impl ObservationSignal {
    pub fn new(ask_cap: Quantity) -> Self {
        Self { ask_cap }
    }
}

impl Strategy for ObservationSignal {
    fn name(&self) -> &'static str {
        "observation_signal"
    }

    fn quote(&self, ctx: &QuoteContext<'_>) -> Result<Vec<Order>> {
        let Some((sunlight_slope, humidity_slope)) = ctx.history.and_then(|h| h.slopes()) else {
            tracing::debug!("{}: observation history not warm yet", ctx.symbol);
            return Ok(vec![]);
        };

        let orders = if sunlight_slope > 0. && humidity_slope > 0. {
            let (_, best_ask) = ctx.best_bid_ask()?;
            vec![ctx.order(best_ask, ctx.bid_volume())]
        } else if sunlight_slope < 0. && humidity_slope < 0. {
            let (best_bid, _) = ctx.best_bid_ask()?;
            vec![ctx.order(best_bid, ctx.ask_volume())]
        } else if sunlight_slope * humidity_slope < 0. {
            let (best_bid, best_ask) = ctx.best_bid_ask()?;
            vec![
                ctx.order(best_bid + 1, ctx.bid_volume()),
                ctx.order(best_ask - 1, ctx.ask_volume().max(-self.ask_cap)),
            ]
        } else {
            vec![]
        };
        Ok(orders)
    }
}
