//! Backtester CLI
//!
//! Replays a CSV tick file (or a synthetic stream) through the matching
//! engine with the example strategies attached and prints run
//! statistics. Exit code is non-zero only on I/O failures; an unreadable
//! tick file degrades to the synthetic feed.

use anyhow::Result;
use backtester::feed;
use backtester::strategies::{MarketMaker, MarketMakerConfig, Momentum, MomentumConfig};
use clap::Parser;
use matching_engine::TickEngine;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "backtester")]
#[command(about = "Event-driven limit-order-book backtester")]
struct Args {
    /// CSV tick file: symbol,timestamp,price,volume,side. Falls back to
    /// a synthetic stream when omitted or unreadable.
    ticks: Option<PathBuf>,

    /// Synthetic tick count when no file is used.
    #[arg(long, default_value_t = 1_000_000)]
    count: usize,

    /// Seed for the synthetic feed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write run statistics to this path as JSON.
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let ticks = match &args.ticks {
        Some(path) => feed::load_or_synthetic(path, args.count, args.seed),
        None => feed::synthetic_walk(args.count, args.seed),
    };
    info!(count = ticks.len(), "tick stream ready");

    let mut engine = TickEngine::new();
    engine.add_strategy(Box::new(Momentum::new(MomentumConfig::default())));
    engine.add_strategy(Box::new(MarketMaker::new(MarketMakerConfig::default())));

    info!("running backtest");
    let started = Instant::now();
    engine.run_backtest(&ticks);
    let elapsed = started.elapsed();

    let stats = *engine.get_stats();
    println!("ticks processed:  {}", stats.ticks_processed);
    println!("orders submitted: {}", stats.orders_submitted);
    println!("trades executed:  {}", stats.trades_executed);
    println!("wall clock:       {:.3} s", elapsed.as_secs_f64());
    println!(
        "throughput:       {:.0} ticks/s",
        stats.ticks_processed as f64 / elapsed.as_secs_f64()
    );
    println!("avg latency:      {:.3} µs/tick", stats.avg_latency_us());

    let arena = engine.context().arena();
    println!(
        "arena:            {} orders, {} KiB",
        arena.allocated_count(),
        arena.memory_usage() / 1024
    );

    for book in engine.context().books() {
        println!(
            "{}: bid {} | ask {} | {} resting | {} trades",
            book.symbol(),
            format_side(&book.bid_depth(1)),
            format_side(&book.ask_depth(1)),
            book.resting_orders(),
            book.total_trades()
        );
    }

    if let Some(path) = &args.stats_json {
        std::fs::write(path, serde_json::to_string_pretty(&stats)?)?;
        info!(path = %path.display(), "wrote stats");
    }

    Ok(())
}

/// Best level of one side as "price x quantity", or "-" when empty.
fn format_side(depth: &[(types::numeric::Price, types::numeric::Quantity)]) -> String {
    depth
        .first()
        .map_or_else(|| "-".to_string(), |(p, q)| format!("{} x {}", p, q))
}
