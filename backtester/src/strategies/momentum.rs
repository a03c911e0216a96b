//! Moving-average momentum strategy
//!
//! Keeps a rolling window of tick prices and trades breakouts: buy when
//! the price clears the average by a band, sell when it drops below by
//! the same band. Position flips close the old exposure first, the way
//! a live desk would, with a separate closing order.

use matching_engine::{EngineContext, Strategy};
use std::collections::{HashSet, VecDeque};
use types::ids::{OrderId, UserId};
use types::numeric::{Price, Quantity, PRICE_SCALE};
use types::order::{OrderType, Side};
use types::tick::{Symbol, Tick};
use types::trade::Trade;

/// Tuning for [`Momentum`].
#[derive(Debug, Clone)]
pub struct MomentumConfig {
    /// Ticks in the moving-average window.
    pub window: usize,
    /// Size of each entry order.
    pub order_size: Quantity,
    /// Breakout band around the average, in basis points.
    pub band_bps: i64,
    /// Owner tag stamped on submitted orders.
    pub user_id: UserId,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            window: 20,
            order_size: Quantity::new(100),
            band_bps: 200,
            user_id: 1,
        }
    }
}

/// Momentum breakout strategy.
pub struct Momentum {
    config: MomentumConfig,
    prices: VecDeque<Price>,
    my_orders: HashSet<OrderId>,
    position: i64,
    net_cash: i128,
    fills: u64,
}

impl Momentum {
    pub fn new(config: MomentumConfig) -> Self {
        let window = config.window;
        Self {
            config,
            prices: VecDeque::with_capacity(window + 1),
            my_orders: HashSet::new(),
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

    fn submit(
        &mut self,
        engine: &mut EngineContext,
        symbol: &Symbol,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) {
        if let Ok(id) = engine.submit_order(
            symbol,
            side,
            OrderType::Limit,
            price,
            quantity,
            self.config.user_id,
        ) {
            self.my_orders.insert(id);
        }
    }
}

impl Strategy for Momentum {
    fn on_tick(&mut self, tick: &Tick, engine: &mut EngineContext) {
        self.prices.push_back(tick.price);
        if self.prices.len() > self.config.window {
            self.prices.pop_front();
        }
        if self.prices.len() < self.config.window {
            return;
        }

        let sum: Price = self.prices.iter().copied().sum();
        let average = sum / self.prices.len() as i64;
        let upper = average * (PRICE_SCALE + self.config.band_bps) / PRICE_SCALE;
        let lower = average * (PRICE_SCALE - self.config.band_bps) / PRICE_SCALE;

        if tick.price > upper && self.position <= 0 {
            if self.position < 0 {
                let cover = Quantity::new(-self.position);
                self.submit(engine, &tick.symbol, Side::Buy, tick.price, cover);
            }
            self.submit(
                engine,
                &tick.symbol,
                Side::Buy,
                tick.price,
                self.config.order_size,
            );
        } else if tick.price < lower && self.position >= 0 {
            if self.position > 0 {
                let unwind = Quantity::new(self.position);
                self.submit(engine, &tick.symbol, Side::Sell, tick.price, unwind);
            }
            self.submit(
                engine,
                &tick.symbol,
                Side::Sell,
                tick.price,
                self.config.order_size,
            );
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
        "momentum"
    }
}
