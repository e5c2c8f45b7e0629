use anyhow::Result;
use datamodel::Order;

use super::{QuoteContext, Strategy};

/// Market making around a known fair value (the profile's default price).
///
/// - Whole book above the anchor: buy at the anchor, sell into the best bid.
/// - Whole book below the anchor: buy the best ask, sell at the anchor.
/// - Book straddling the anchor: quote symmetrically, one tick inside the
///   nearer of the two touches.
pub struct FixedAnchor;

impl Strategy for FixedAnchor {
    fn name(&self) -> &'static str {
        "fixed_anchor"
    }

    fn quote(&self, ctx: &QuoteContext<'_>) -> Result<Vec<Order>> {
        let anchor = ctx.default_price;
        let (best_bid, best_ask) = ctx.best_bid_ask()?;
        let bid_volume = ctx.bid_volume();
        let ask_volume = ctx.ask_volume();

        let orders = if best_bid > anchor && best_ask > anchor {
            vec![ctx.order(anchor, bid_volume), ctx.order(best_bid, ask_volume)]
        } else if best_bid < anchor && best_ask < anchor {
            vec![ctx.order(best_ask, bid_volume), ctx.order(anchor, ask_volume)]
        } else {
            let min_diff = (best_bid - anchor).abs().min((anchor - best_ask).abs());
            // A touch sitting on the anchor gives min_diff 0 and a crossed quote.
            vec![
                ctx.order(anchor - min_diff + 1, bid_volume),
                ctx.order(anchor + min_diff - 1, ask_volume),
            ]
        };
        Ok(orders)
    }
}
