//! Two-sided quoting strategy
//!
//! Quotes a bid and an ask around the tick price every N ticks, cancels
//! the previous pair before re-quoting, and stops quoting a side once
//! its inventory cap is reached. Stale quotes from before a cancel may
//! already have filled; cancelling a filled id is a quiet no-op, so the
//! requote path needs no bookkeeping beyond the live-quote list.

use matching_engine::{EngineContext, Strategy};
use std::collections::HashSet;
use types::ids::{OrderId, UserId};
use types::numeric::{Price, Quantity};
use types::order::{OrderType, Side};
use types::tick::{Symbol, Tick};
use types::trade::Trade;

/// Tuning for [`MarketMaker`].
#[derive(Debug, Clone)]
pub struct MarketMakerConfig {
    /// Full bid-ask spread quoted around the tick price.
    pub spread: Price,
    /// Size of each quote.
    pub quote_size: Quantity,
    /// Absolute net inventory cap per side.
    pub max_position: i64,
    /// Quote once every this many ticks.
    pub quote_interval: u64,
    /// Owner tag stamped on submitted orders.
    pub user_id: UserId,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            spread: Price::from_raw(100),
            quote_size: Quantity::new(50),
            max_position: 500,
            quote_interval: 10,
            user_id: 2,
        }
    }
}

/// Spread-capturing market maker.
pub struct MarketMaker {
    config: MarketMakerConfig,
    tick_count: u64,
    my_orders: HashSet<OrderId>,
    live_quotes: Vec<(Symbol, OrderId)>,
    position: i64,
    net_cash: i128,
    fills: u64,
}

impl MarketMaker {
    pub fn new(config: MarketMakerConfig) -> Self {
        Self {
            config,
            tick_count: 0,
            my_orders: HashSet::new(),
            live_quotes: Vec::new(),
            position: 0,
            net_cash: 0,
            fills: 0,
        }
    }

    /// Net position from attributed fills.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Signed cash flow from attributed fills, in raw price units.
    pub fn net_cash(&self) -> i128 {
        self.net_cash
    }

    pub fn fills(&self) -> u64 {
        self.fills
    }

    fn quote(
        &mut self,
        engine: &mut EngineContext,
        symbol: &Symbol,
        side: Side,
        price: Price,
    ) {
        if let Ok(id) = engine.submit_order(
            symbol,
            side,
            OrderType::Limit,
            price,
            self.config.quote_size,
            self.config.user_id,
        ) {
            self.my_orders.insert(id);
            self.live_quotes.push((symbol.clone(), id));
        }
    }
}

impl Strategy for MarketMaker {
    fn on_tick(&mut self, tick: &Tick, engine: &mut EngineContext) {
        self.tick_count += 1;
        if self.tick_count % self.config.quote_interval != 0 {
            return;
        }

        for (symbol, id) in std::mem::take(&mut self.live_quotes) {
            engine.cancel_order(symbol.as_str(), id);
        }

        let mid = tick.price;
        let half = self.config.spread / 2;

        if self.position < self.config.max_position {
            self.quote(engine, &tick.symbol, Side::Buy, mid - half);
        }
        if self.position > -self.config.max_position {
            self.quote(engine, &tick.symbol, Side::Sell, mid + half);
        }
    }

    fn on_trade(&mut self, trade: &Trade) {
        if self.my_orders.contains(&trade.buy_order_id) {
            self.position += trade.quantity.raw();
            self.net_cash -= trade.notional();
            self.fills += 1;
        }
        if self.my_orders.contains(&trade.sell_order_id) {
            self.position -= trade.quantity.raw();
            self.net_cash += trade.notional();
            self.fills += 1;
        }
    }

    fn name(&self) -> &str {
        "market-maker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matching_engine::TickEngine;
    use types::ids::Timestamp;

    fn tick(price: i64, timestamp: Timestamp) -> Tick {
        Tick {
            symbol: Symbol::new("AAPL"),
            price: Price::from_raw(price),
            volume: Quantity::new(100),
            timestamp,
            side: Side::Buy,
        }
    }

    fn fast_config() -> MarketMakerConfig {
        MarketMakerConfig {
            spread: Price::from_raw(100),
            quote_size: Quantity::new(50),
            max_position: 500,
            quote_interval: 2,
            user_id: 2,
        }
    }

    #[test]
    fn test_quotes_only_on_interval() {
        let mut engine = TickEngine::new();
        engine.add_strategy(Box::new(MarketMaker::new(fast_config())));

        engine.process_tick(&tick(1_000_000, 1_000));
        assert_eq!(engine.get_stats().orders_submitted, 0);

        engine.process_tick(&tick(1_000_000, 2_000));
        assert_eq!(engine.get_stats().orders_submitted, 2);

        let book = engine.get_order_book("AAPL").unwrap();
        assert_eq!(book.best_bid(), Some(Price::from_raw(999_950)));
        assert_eq!(book.best_ask(), Some(Price::from_raw(1_000_050)));
        assert_eq!(book.bid_volume(), Quantity::new(50));
        assert_eq!(book.ask_volume(), Quantity::new(50));
    }

    #[test]
    fn test_requote_cancels_previous_pair() {
        let mut engine = TickEngine::new();
        engine.add_strategy(Box::new(MarketMaker::new(fast_config())));

        for i in 1..=6u64 {
            engine.process_tick(&tick(1_000_000 + i as i64 * 100, i * 1_000));
        }

        // Three quoting rounds, but only the last pair is still resting
        assert_eq!(engine.get_stats().orders_submitted, 6);
        let book = engine.get_order_book("AAPL").unwrap();
        assert_eq!(book.bid_volume(), Quantity::new(50));
        assert_eq!(book.ask_volume(), Quantity::new(50));
        assert_eq!(book.resting_orders(), 2);
    }

    #[test]
    fn test_zero_cap_never_quotes() {
        let mut engine = TickEngine::new();
        let config = MarketMakerConfig {
            max_position: 0,
            ..fast_config()
        };
        engine.add_strategy(Box::new(MarketMaker::new(config)));

        for i in 1..=4u64 {
            engine.process_tick(&tick(1_000_000, i * 1_000));
        }

        assert_eq!(engine.get_stats().orders_submitted, 0);
    }

    #[test]
    fn test_fill_attribution_updates_position() {
        let mut engine = TickEngine::new();

        let mut maker = MarketMaker::new(fast_config());
        let ctx = engine.context_mut();
        maker.on_tick(&tick(1_000_000, 1_000), ctx);
        maker.on_tick(&tick(1_000_000, 2_000), ctx);

        // Lift the maker's ask at 100.0050
        ctx.submit_order(
            &Symbol::new("AAPL"),
            Side::Buy,
            OrderType::Limit,
            Price::from_raw(1_000_050),
            Quantity::new(20),
            9,
        )
        .unwrap();

        let trades: Vec<Trade> = ctx.trades().to_vec();
        assert_eq!(trades.len(), 1);
        for trade in &trades {
            maker.on_trade(trade);
        }

        assert_eq!(maker.position(), -20);
        assert_eq!(maker.fills(), 1);
        assert_eq!(maker.net_cash(), 1_000_050i128 * 20);
    }
}
