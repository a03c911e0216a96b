//! Tick-driven dispatch engine
//!
//! Owns the order arena, the per-symbol books, and the registered
//! strategies. One `process_tick` call advances engine time, guarantees
//! the tick symbol's book exists, and fans the tick out to every
//! strategy in registration order. Orders submitted from a strategy are
//! sequenced, stamped with engine time, and matched synchronously; the
//! resulting trades reach every strategy before the next strategy's
//! `on_tick` begins, so all events in a run are totally ordered.

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use tracing::debug;
use types::errors::SubmitError;
use types::ids::{OrderId, Timestamp, UserId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};
use types::symbol::SymbolRegistry;
use types::tick::{Symbol, Tick};
use types::trade::Trade;

use crate::arena::{OrderArena, OrderSlot};
use crate::book::OrderBook;
use crate::strategy::Strategy;

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub ticks_processed: u64,
    pub orders_submitted: u64,
    pub trades_executed: u64,
    pub total_latency_ns: u64,
}

impl EngineStats {
    /// Mean dispatch latency per tick, in microseconds.
    pub fn avg_latency_us(&self) -> f64 {
        if self.ticks_processed > 0 {
            (self.total_latency_ns as f64 / self.ticks_processed as f64) / 1_000.0
        } else {
            0.0
        }
    }
}

/// Engine state reachable from strategies during dispatch.
///
/// Exposes order submission, cancellation, and read access to books and
/// past orders. The strategy list itself lives outside this handle.
pub struct EngineContext {
    arena: OrderArena,
    registry: SymbolRegistry,
    /// Books indexed by interned symbol id, created on first sight.
    books: Vec<OrderBook>,
    /// Every order ever sequenced, for status inspection by id.
    orders: HashMap<OrderId, OrderSlot>,
    /// All trades of the run, in execution order.
    trade_log: Vec<Trade>,
    /// Trades not yet fanned out to strategies.
    undispatched: usize,
    next_order_id: u64,
    current_time: Timestamp,
    stats: EngineStats,
}

impl EngineContext {
    fn new() -> Self {
        Self {
            arena: OrderArena::new(),
            registry: SymbolRegistry::new(),
            books: Vec::new(),
            orders: HashMap::new(),
            trade_log: Vec::new(),
            undispatched: 0,
            next_order_id: 1,
            current_time: 0,
            stats: EngineStats::default(),
        }
    }

    /// Sequence an order and match it against `symbol`'s book.
    ///
    /// The engine assigns the id (strictly increasing from 1) and stamps
    /// the order with current engine time; `price` is ignored for market
    /// orders. Returns the assigned id.
    pub fn submit_order(
        &mut self,
        symbol: &Symbol,
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
        user_id: UserId,
    ) -> Result<OrderId, SubmitError> {
        if !quantity.is_positive() {
            return Err(SubmitError::InvalidQuantity(quantity));
        }
        if order_type == OrderType::Limit && !price.is_positive() {
            return Err(SubmitError::InvalidPrice(price));
        }

        let book_index = self.ensure_book(symbol);

        let id = OrderId::new(self.next_order_id);
        self.next_order_id += 1;

        let mut order = Order::new(price, quantity, side, order_type, user_id);
        order.id = id;
        order.timestamp = self.current_time;

        let slot = self.arena.insert(order);
        self.orders.insert(id, slot);

        let trades = self.books[book_index].add_order(&mut self.arena, slot);
        self.stats.orders_submitted += 1;
        self.stats.trades_executed += trades.len() as u64;
        self.trade_log.extend(trades);

        Ok(id)
    }

    /// Cancel a resting order. `false` when the symbol has no book or
    /// the id is not resting there.
    pub fn cancel_order(&mut self, symbol: &str, order_id: OrderId) -> bool {
        let Some(symbol_id) = self.registry.lookup(symbol) else {
            return false;
        };
        self.books[symbol_id.index()].cancel_order(&mut self.arena, order_id)
    }

    /// The book for `symbol`, if any tick or order has touched it.
    pub fn get_order_book(&self, symbol: &str) -> Option<&OrderBook> {
        self.registry
            .lookup(symbol)
            .map(|id| &self.books[id.index()])
    }

    /// A sequenced order by id.
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id).map(|slot| self.arena.get(*slot))
    }

    /// All trades of the run so far, in execution order.
    pub fn trades(&self) -> &[Trade] {
        &self.trade_log
    }

    pub fn books(&self) -> impl Iterator<Item = &OrderBook> {
        self.books.iter()
    }

    pub fn arena(&self) -> &OrderArena {
        &self.arena
    }

    pub fn current_time(&self) -> Timestamp {
        self.current_time
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Index of `symbol`'s book, creating the book on first sight.
    fn ensure_book(&mut self, symbol: &Symbol) -> usize {
        let id = self.registry.intern(symbol);
        if id.index() == self.books.len() {
            debug!(symbol = %symbol, "creating order book");
            self.books.push(OrderBook::new(symbol.clone()));
        }
        id.index()
    }
}

/// Top-level backtest driver.
pub struct TickEngine {
    ctx: EngineContext,
    strategies: Vec<Box<dyn Strategy>>,
}

impl TickEngine {
    pub fn new() -> Self {
        Self {
            ctx: EngineContext::new(),
            strategies: Vec::new(),
        }
    }

    /// Register a strategy. Strategies added mid-run see only subsequent
    /// ticks.
    pub fn add_strategy(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
    }

    /// Dispatch one tick: advance engine time, ensure the symbol's book,
    /// then drive every strategy in registration order. Trades triggered
    /// by a strategy reach all strategies before the next one runs.
    pub fn process_tick(&mut self, tick: &Tick) {
        let started = Instant::now();

        self.ctx.current_time = tick.timestamp;
        self.ctx.ensure_book(&tick.symbol);

        for index in 0..self.strategies.len() {
            self.strategies[index].on_tick(tick, &mut self.ctx);
            self.dispatch_trades();
        }

        self.ctx.stats.ticks_processed += 1;
        self.ctx.stats.total_latency_ns += started.elapsed().as_nanos() as u64;
    }

    /// Run the whole stream in order.
    pub fn run_backtest(&mut self, ticks: &[Tick]) {
        for tick in ticks {
            self.process_tick(tick);
        }
    }

    pub fn get_stats(&self) -> &EngineStats {
        self.ctx.stats()
    }

    pub fn get_order_book(&self, symbol: &str) -> Option<&OrderBook> {
        self.ctx.get_order_book(symbol)
    }

    /// Read access to engine state (orders, trades, books, arena).
    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Direct mutable access for drivers that submit orders without a
    /// strategy, e.g. tests and replay tools.
    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.ctx
    }

    /// Fan undispatched trades out to every strategy, oldest first.
    fn dispatch_trades(&mut self) {
        while self.ctx.undispatched < self.ctx.trade_log.len() {
            let trade = self.ctx.trade_log[self.ctx.undispatched];
            self.ctx.undispatched += 1;
            for strategy in &mut self.strategies {
                strategy.on_trade(&trade);
            }
        }
    }
}

impl Default for TickEngine {
    fn default() -> Self {
        Self::new()
    }
}
