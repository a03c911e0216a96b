//! Per-symbol limit order book
//!
//! Matches incoming orders against resting liquidity under price-time
//! priority: better prices first, FIFO within a level. Trades always
//! print at the resting (maker) price. A resting-order index keyed by id
//! backs cancellation.

pub mod ask_book;
pub mod bid_book;
pub mod price_level;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
pub use price_level::PriceLevel;

use std::collections::HashMap;
use tracing::debug;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, OrderType, Side};
use types::tick::Symbol;
use types::trade::Trade;

use crate::arena::{OrderArena, OrderSlot};

/// Limit order book for one symbol.
///
/// The book references order records by arena slot and never owns them;
/// the arena must be the one every slot came from.
pub struct OrderBook {
    symbol: Symbol,
    bids: BidBook,
    asks: AskBook,
    /// Resting orders only: id → (side, price). Entries leave the index
    /// the moment an order fully fills or is cancelled.
    resting: HashMap<OrderId, (Side, Price)>,
    total_trades: u64,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BidBook::new(),
            asks: AskBook::new(),
            resting: HashMap::new(),
            total_trades: 0,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Match an incoming order, rest any limit residual, and return the
    /// trades produced, oldest first.
    ///
    /// The record behind `slot` must carry id, timestamp, and terms, with
    /// `filled` zero. On return its status is the terminal result of the
    /// call: `Filled`, `Partial` (resting with fills), `Pending` (resting
    /// untouched), or `Cancelled` for a market order that ran out of
    /// liquidity.
    pub fn add_order(&mut self, arena: &mut OrderArena, slot: OrderSlot) -> Vec<Trade> {
        let mut taker = *arena.get(slot);
        debug_assert!(taker.id.is_assigned());
        debug_assert!(taker.filled.is_zero());

        let mut trades = Vec::new();
        match taker.side {
            Side::Buy => self.match_against_asks(arena, &mut taker, &mut trades),
            Side::Sell => self.match_against_bids(arena, &mut taker, &mut trades),
        }
        taker.resolve_status();

        match taker.order_type {
            OrderType::Market => {
                // Whatever a market order cannot fill is abandoned
                if !taker.is_filled() {
                    taker.status = OrderStatus::Cancelled;
                }
            }
            OrderType::Limit => {
                if !taker.is_filled() {
                    let remaining = taker.remaining();
                    match taker.side {
                        Side::Buy => self.bids.insert(taker.price, slot, remaining),
                        Side::Sell => self.asks.insert(taker.price, slot, remaining),
                    }
                    self.resting.insert(taker.id, (taker.side, taker.price));
                }
            }
        }

        *arena.get_mut(slot) = taker;
        trades
    }

    fn match_against_asks(
        &mut self,
        arena: &mut OrderArena,
        taker: &mut Order,
        trades: &mut Vec<Trade>,
    ) {
        while taker.remaining().is_positive() {
            let Some(level_price) = self.asks.best_price() else {
                break;
            };
            if taker.order_type == OrderType::Limit && level_price > taker.price {
                break;
            }
            let emptied = {
                let level = self
                    .asks
                    .level_mut(level_price)
                    .expect("best ask level present");
                Self::match_level(
                    arena,
                    level_price,
                    level,
                    taker,
                    trades,
                    &mut self.resting,
                    &mut self.total_trades,
                );
                level.is_empty()
            };
            if emptied {
                self.asks.remove_level(level_price);
            }
        }
    }

    fn match_against_bids(
        &mut self,
        arena: &mut OrderArena,
        taker: &mut Order,
        trades: &mut Vec<Trade>,
    ) {
        while taker.remaining().is_positive() {
            let Some(level_price) = self.bids.best_price() else {
                break;
            };
            if taker.order_type == OrderType::Limit && level_price < taker.price {
                break;
            }
            let emptied = {
                let level = self
                    .bids
                    .level_mut(level_price)
                    .expect("best bid level present");
                Self::match_level(
                    arena,
                    level_price,
                    level,
                    taker,
                    trades,
                    &mut self.resting,
                    &mut self.total_trades,
                );
                level.is_empty()
            };
            if emptied {
                self.bids.remove_level(level_price);
            }
        }
    }

    /// Consume the FIFO queue at one level until the taker or the level
    /// is exhausted.
    fn match_level(
        arena: &mut OrderArena,
        level_price: Price,
        level: &mut PriceLevel,
        taker: &mut Order,
        trades: &mut Vec<Trade>,
        resting: &mut HashMap<OrderId, (Side, Price)>,
        total_trades: &mut u64,
    ) {
        while taker.remaining().is_positive() {
            let Some(maker_slot) = level.front() else {
                break;
            };
            let maker = arena.get_mut(maker_slot);
            let trade_qty = taker.remaining().min(maker.remaining());
            let timestamp = taker.timestamp.max(maker.timestamp);
            let (buy_id, sell_id) = match taker.side {
                Side::Buy => (taker.id, maker.id),
                Side::Sell => (maker.id, taker.id),
            };

            maker.apply_fill(trade_qty);
            taker.apply_fill(trade_qty);
            level.reduce(trade_qty);
            trades.push(Trade::new(buy_id, sell_id, level_price, trade_qty, timestamp));
            *total_trades += 1;

            if maker.is_filled() {
                resting.remove(&maker.id);
                level.pop_front();
            }
        }
    }

    /// Cancel a resting order by id, releasing its remaining quantity.
    /// Unknown ids (never rested, already filled or cancelled) are a
    /// quiet no-op.
    pub fn cancel_order(&mut self, arena: &mut OrderArena, order_id: OrderId) -> bool {
        let Some((side, price)) = self.resting.remove(&order_id) else {
            debug!(order_id = %order_id, symbol = %self.symbol, "cancel miss");
            return false;
        };
        match side {
            Side::Buy => {
                let level = self
                    .bids
                    .level_mut(price)
                    .expect("resting index points at live bid level");
                let (index, slot) = level
                    .iter()
                    .enumerate()
                    .find(|&(_, s)| arena.get(s).id == order_id)
                    .expect("resting order queued at its level");
                let remaining = arena.get(slot).remaining();
                level.remove_at(index, remaining);
                let emptied = level.is_empty();
                arena.get_mut(slot).status = OrderStatus::Cancelled;
                if emptied {
                    self.bids.remove_level(price);
                }
            }
            Side::Sell => {
                let level = self
                    .asks
                    .level_mut(price)
                    .expect("resting index points at live ask level");
                let (index, slot) = level
                    .iter()
                    .enumerate()
                    .find(|&(_, s)| arena.get(s).id == order_id)
                    .expect("resting order queued at its level");
                let remaining = arena.get(slot).remaining();
                level.remove_at(index, remaining);
                let emptied = level.is_empty();
                arena.get_mut(slot).status = OrderStatus::Cancelled;
                if emptied {
                    self.asks.remove_level(price);
                }
            }
        }
        true
    }

    /// Highest resting bid, if any.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Lowest resting ask, if any.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    pub fn bid_volume(&self) -> Quantity {
        self.bids.volume()
    }

    pub fn ask_volume(&self) -> Quantity {
        self.asks.volume()
    }

    /// Top `depth` bid levels, best first.
    pub fn bid_depth(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.bids.depth(depth)
    }

    /// Top `depth` ask levels, best first.
    pub fn ask_depth(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.asks.depth(depth)
    }

    /// Trades executed by this book over its lifetime.
    pub fn total_trades(&self) -> u64 {
        self.total_trades
    }

    /// Number of resting orders across both sides.
    pub fn resting_orders(&self) -> usize {
        self.resting.len()
    }

    /// Verify level bookkeeping against the arena: every level non-empty
    /// with an exact quantity total, and the book uncrossed. Test support.
    pub fn check_invariants(&self, arena: &OrderArena) -> bool {
        for (_, level) in self.bids.levels().chain(self.asks.levels()) {
            if level.is_empty() {
                return false;
            }
            let sum: Quantity = level.iter().map(|s| arena.get(s).remaining()).sum();
            if sum != level.total_quantity() {
                return false;
            }
        }
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid < ask,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::Timestamp;

    fn setup() -> (OrderArena, OrderBook) {
        (OrderArena::new(), OrderBook::new(Symbol::new("TEST")))
    }

    fn submit(
        arena: &mut OrderArena,
        book: &mut OrderBook,
        id: u64,
        side: Side,
        order_type: OrderType,
        price: i64,
        quantity: i64,
        timestamp: Timestamp,
    ) -> (OrderSlot, Vec<Trade>) {
        let mut order = Order::new(
            Price::from_raw(price),
            Quantity::new(quantity),
            side,
            order_type,
            1,
        );
        order.id = OrderId::new(id);
        order.timestamp = timestamp;
        let slot = arena.insert(order);
        let trades = book.add_order(arena, slot);
        assert!(book.check_invariants(arena));
        (slot, trades)
    }

    #[test]
    fn test_partial_fills_shrink_ask_volume() {
        let (mut arena, mut book) = setup();

        let (sell, _) = submit(
            &mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_000_000, 100, 1_000,
        );
        assert_eq!(book.ask_volume(), Quantity::new(100));
        assert_eq!(book.best_ask(), Some(Price::from_raw(1_000_000)));

        submit(
            &mut arena, &mut book, 2, Side::Buy, OrderType::Limit, 1_000_000, 30, 2_000,
        );
        assert_eq!(book.ask_volume(), Quantity::new(70));
        assert_eq!(arena.get(sell).status, OrderStatus::Partial);
        assert_eq!(arena.get(sell).filled, Quantity::new(30));

        submit(
            &mut arena, &mut book, 3, Side::Buy, OrderType::Limit, 1_000_000, 40, 3_000,
        );
        assert_eq!(book.ask_volume(), Quantity::new(30));

        submit(
            &mut arena, &mut book, 4, Side::Buy, OrderType::Limit, 1_000_000, 30, 4_000,
        );
        assert_eq!(book.ask_volume(), Quantity::ZERO);
        assert_eq!(book.best_ask(), None);
        assert_eq!(arena.get(sell).status, OrderStatus::Filled);
    }

    #[test]
    fn test_market_order_sweeps_levels() {
        let (mut arena, mut book) = setup();

        submit(&mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_000_000, 100, 1_000);
        submit(&mut arena, &mut book, 2, Side::Sell, OrderType::Limit, 1_010_000, 200, 1_000);
        submit(&mut arena, &mut book, 3, Side::Sell, OrderType::Limit, 1_020_000, 300, 1_000);
        assert_eq!(book.ask_volume(), Quantity::new(600));

        let (buy, trades) = submit(
            &mut arena, &mut book, 4, Side::Buy, OrderType::Market, 0, 250, 2_000,
        );

        let quantities: Vec<i64> = trades.iter().map(|t| t.quantity.raw()).collect();
        let prices: Vec<i64> = trades.iter().map(|t| t.price.raw()).collect();
        assert_eq!(quantities, vec![100, 150]);
        assert_eq!(prices, vec![1_000_000, 1_010_000]);
        assert_eq!(book.ask_volume(), Quantity::new(350));
        assert_eq!(book.best_ask(), Some(Price::from_raw(1_010_000)));
        assert_eq!(arena.get(buy).status, OrderStatus::Filled);
    }

    #[test]
    fn test_fifo_within_price_level() {
        let (mut arena, mut book) = setup();

        let (first, _) = submit(&mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_000_000, 100, 1_000);
        let (second, _) = submit(&mut arena, &mut book, 2, Side::Sell, OrderType::Limit, 1_000_000, 100, 2_000);
        let (third, _) = submit(&mut arena, &mut book, 3, Side::Sell, OrderType::Limit, 1_000_000, 100, 3_000);

        let (_, trades) = submit(
            &mut arena, &mut book, 4, Side::Buy, OrderType::Market, 0, 250, 4_000,
        );

        let quantities: Vec<i64> = trades.iter().map(|t| t.quantity.raw()).collect();
        assert_eq!(quantities, vec![100, 100, 50]);
        let sellers: Vec<OrderId> = trades.iter().map(|t| t.sell_order_id).collect();
        assert_eq!(sellers, vec![OrderId::new(1), OrderId::new(2), OrderId::new(3)]);

        assert_eq!(arena.get(first).status, OrderStatus::Filled);
        assert_eq!(arena.get(second).status, OrderStatus::Filled);
        assert_eq!(arena.get(third).status, OrderStatus::Partial);
        assert_eq!(arena.get(third).filled, Quantity::new(50));
    }

    #[test]
    fn test_market_order_against_empty_book_is_cancelled() {
        let (mut arena, mut book) = setup();

        let (buy, trades) = submit(
            &mut arena, &mut book, 1, Side::Buy, OrderType::Market, 0, 10, 1_000,
        );

        assert!(trades.is_empty());
        assert_eq!(arena.get(buy).status, OrderStatus::Cancelled);
        assert_eq!(arena.get(buy).filled, Quantity::ZERO);
        assert_eq!(book.total_trades(), 0);
    }

    #[test]
    fn test_trades_print_at_maker_price() {
        let (mut arena, mut book) = setup();

        submit(&mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_005_000, 50, 1_000);
        let (buy, trades) = submit(
            &mut arena, &mut book, 2, Side::Buy, OrderType::Limit, 1_010_000, 50, 2_000,
        );

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].price, Price::from_raw(1_005_000));
        assert_eq!(trades[0].buy_order_id, OrderId::new(2));
        assert_eq!(trades[0].sell_order_id, OrderId::new(1));
        assert_eq!(arena.get(buy).status, OrderStatus::Filled);
    }

    #[test]
    fn test_trade_timestamp_is_later_arrival() {
        let (mut arena, mut book) = setup();

        submit(&mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_000_000, 10, 1_000);
        let (_, trades) = submit(
            &mut arena, &mut book, 2, Side::Buy, OrderType::Limit, 1_000_000, 10, 5_000,
        );
        assert_eq!(trades[0].timestamp, 5_000);
    }

    #[test]
    fn test_non_crossing_limit_rests() {
        let (mut arena, mut book) = setup();

        submit(&mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_010_000, 100, 1_000);
        let (buy, trades) = submit(
            &mut arena, &mut book, 2, Side::Buy, OrderType::Limit, 1_000_000, 40, 2_000,
        );

        assert!(trades.is_empty());
        assert_eq!(arena.get(buy).status, OrderStatus::Pending);
        assert_eq!(book.ask_volume(), Quantity::new(100));
        assert_eq!(book.bid_volume(), Quantity::new(40));
        assert_eq!(book.best_bid(), Some(Price::from_raw(1_000_000)));
        assert_eq!(book.best_ask(), Some(Price::from_raw(1_010_000)));
    }

    #[test]
    fn test_crossing_limit_rests_residual_on_own_side() {
        let (mut arena, mut book) = setup();

        submit(&mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_000_000, 100, 1_000);
        let (buy, trades) = submit(
            &mut arena, &mut book, 2, Side::Buy, OrderType::Limit, 1_000_000, 150, 2_000,
        );

        assert_eq!(trades.len(), 1);
        assert_eq!(arena.get(buy).status, OrderStatus::Partial);
        assert_eq!(book.ask_volume(), Quantity::ZERO);
        assert_eq!(book.bid_volume(), Quantity::new(50));
        assert_eq!(book.best_bid(), Some(Price::from_raw(1_000_000)));
    }

    #[test]
    fn test_cancel_restores_volume() {
        let (mut arena, mut book) = setup();

        submit(&mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_010_000, 100, 1_000);
        let (bid, _) = submit(
            &mut arena, &mut book, 2, Side::Buy, OrderType::Limit, 1_000_000, 40, 2_000,
        );
        let volume_before = book.bid_volume() + book.ask_volume();

        let (extra, _) = submit(
            &mut arena, &mut book, 3, Side::Buy, OrderType::Limit, 990_000, 25, 3_000,
        );
        assert!(book.cancel_order(&mut arena, OrderId::new(3)));

        assert_eq!(book.bid_volume() + book.ask_volume(), volume_before);
        assert_eq!(arena.get(extra).status, OrderStatus::Cancelled);
        assert_eq!(arena.get(bid).status, OrderStatus::Pending);
        assert!(book.check_invariants(&arena));
    }

    #[test]
    fn test_cancel_partially_filled_order() {
        let (mut arena, mut book) = setup();

        let (sell, _) = submit(&mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_000_000, 100, 1_000);
        submit(&mut arena, &mut book, 2, Side::Buy, OrderType::Limit, 1_000_000, 30, 2_000);

        assert!(book.cancel_order(&mut arena, OrderId::new(1)));
        assert_eq!(book.ask_volume(), Quantity::ZERO);
        assert_eq!(book.best_ask(), None);
        assert_eq!(arena.get(sell).status, OrderStatus::Cancelled);
        assert_eq!(arena.get(sell).filled, Quantity::new(30));
    }

    #[test]
    fn test_cancel_unknown_id_is_noop() {
        let (mut arena, mut book) = setup();

        submit(&mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_000_000, 100, 1_000);
        assert!(!book.cancel_order(&mut arena, OrderId::new(999)));
        assert_eq!(book.ask_volume(), Quantity::new(100));
    }

    #[test]
    fn test_cancel_filled_id_is_noop() {
        let (mut arena, mut book) = setup();

        submit(&mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_000_000, 100, 1_000);
        submit(&mut arena, &mut book, 2, Side::Buy, OrderType::Limit, 1_000_000, 100, 2_000);

        assert!(!book.cancel_order(&mut arena, OrderId::new(1)));
    }

    #[test]
    fn test_total_trades_counts_fills() {
        let (mut arena, mut book) = setup();

        submit(&mut arena, &mut book, 1, Side::Sell, OrderType::Limit, 1_000_000, 100, 1_000);
        submit(&mut arena, &mut book, 2, Side::Sell, OrderType::Limit, 1_000_000, 100, 2_000);
        submit(&mut arena, &mut book, 3, Side::Buy, OrderType::Market, 0, 150, 3_000);

        assert_eq!(book.total_trades(), 2);
        assert_eq!(book.resting_orders(), 1);
    }

    #[test]
    fn test_incoming_sell_matches_best_bid_first() {
        let (mut arena, mut book) = setup();

        submit(&mut arena, &mut book, 1, Side::Buy, OrderType::Limit, 1_000_000, 100, 1_000);
        submit(&mut arena, &mut book, 2, Side::Buy, OrderType::Limit, 1_010_000, 100, 2_000);

        let (_, trades) = submit(
            &mut arena, &mut book, 3, Side::Sell, OrderType::Limit, 1_000_000, 150, 3_000,
        );

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].price, Price::from_raw(1_010_000));
        assert_eq!(trades[0].quantity, Quantity::new(100));
        assert_eq!(trades[0].buy_order_id, OrderId::new(2));
        assert_eq!(trades[1].price, Price::from_raw(1_000_000));
        assert_eq!(trades[1].quantity, Quantity::new(50));
        assert_eq!(book.bid_volume(), Quantity::new(50));
    }

    #[test]
    fn test_depth_snapshots() {
        let (mut arena, mut book) = setup();

        submit(&mut arena, &mut book, 1, Side::Buy, OrderType::Limit, 990_000, 10, 1_000);
        submit(&mut arena, &mut book, 2, Side::Buy, OrderType::Limit, 1_000_000, 20, 2_000);
        submit(&mut arena, &mut book, 3, Side::Sell, OrderType::Limit, 1_010_000, 30, 3_000);

        assert_eq!(
            book.bid_depth(1),
            vec![(Price::from_raw(1_000_000), Quantity::new(20))]
        );
        assert_eq!(
            book.ask_depth(2),
            vec![(Price::from_raw(1_010_000), Quantity::new(30))]
        );
    }
}
