//! Legislator P&L Report Binary
//!
//! Rebuilds every legislator's position ledger from the trade log, values
//! open positions at current prices, and prints actors ranked by total
//! P&L with a position detail for the top performer.
//!
//! Valuation lookups go to the live chart API and are rate-limited; a
//! full history over many tickers takes a while by design.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin pnl_report
//! ```

use alphaflow::config::Config;
use alphaflow::signal_core::{
    compute_pnl, summarize_by_actor, ActorType, PositionLedger, TradeLogReader, YahooPriceSource,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = Config::from_env();

    log::info!("🚀 Starting legislator P&L report");
    log::info!("   Trade log: {}", config.db_path);

    let reader = TradeLogReader::open(&config.db_path)?;
    let trades = reader.read_trades()?;

    let legislator_trades: Vec<_> = trades
        .into_iter()
        .filter(|t| t.actor_type == ActorType::Legislator)
        .collect();

    log::info!("📊 Processing {} legislator trades", legislator_trades.len());

    // Price cache lives inside the source, scoped to this run only
    let mut prices = YahooPriceSource::new(
        Duration::from_millis(config.price_min_interval_ms),
        Duration::from_secs(config.price_backoff_secs),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let mut ledger = PositionLedger::new();
    let stats = ledger.ingest(&legislator_trades, &mut prices).await;
    log::info!(
        "📒 Ledger built: {} positions ({} trades applied, {} skipped)",
        ledger.len(),
        stats.applied,
        stats.skipped
    );

    let rows = compute_pnl(&ledger, &mut prices).await;
    let summaries = summarize_by_actor(&rows);

    println!("{}", "=".repeat(96));
    println!("LEGISLATOR P&L (full trading history)");
    println!("{}", "=".repeat(96));
    println!(
        "{:<4} {:<25} {:>14} {:>14} {:>14} {:>6} {:>7}",
        "#", "Legislator", "Total P&L", "Unrealized", "Realized", "Open", "Closed"
    );
    println!("{}", "-".repeat(96));

    for (i, summary) in summaries.iter().enumerate() {
        println!(
            "{:<4} {:<25} {:>14} {:>14} {:>14} {:>6} {:>7}",
            i + 1,
            truncate(&summary.actor_name, 24),
            format_usd(summary.total_pnl),
            format_usd(summary.total_unrealized_pnl),
            format_usd(summary.total_realized_pnl),
            summary.open_positions,
            summary.closed_positions
        );
    }

    if let Some(top) = summaries.first() {
        println!();
        println!("{}", "=".repeat(96));
        println!("Top performer positions: {}", top.actor_name);
        println!("{}", "=".repeat(96));
        println!(
            "{:<8} {:<20} {:<8} {:>10} {:>10} {:>10} {:>14} {:>8}",
            "Ticker", "Company", "Status", "Shares", "Avg Cost", "Current", "P&L", "P&L %"
        );
        println!("{}", "-".repeat(96));

        let mut top_rows: Vec<_> = rows.iter().filter(|r| r.actor_id == top.actor_id).collect();
        top_rows.sort_by(|a, b| {
            b.total_pnl
                .partial_cmp(&a.total_pnl)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for row in top_rows.iter().take(15) {
            println!(
                "{:<8} {:<20} {:<8} {:>10} {:>10} {:>10} {:>14} {:>7.1}%",
                row.ticker,
                truncate(row.company_name.as_deref().unwrap_or(""), 19),
                row.status.as_str(),
                if row.shares_held > 0.0 {
                    format!("{:.0}", row.shares_held)
                } else {
                    "-".to_string()
                },
                if row.avg_cost_basis > 0.0 {
                    format!("${:.2}", row.avg_cost_basis)
                } else {
                    "-".to_string()
                },
                format!("${:.2}", row.current_price),
                format_usd(row.total_pnl),
                row.return_percent
            );
        }
    }

    log::info!("✅ Report complete: {} positions across {} actors", rows.len(), summaries.len());

    Ok(())
}

fn format_usd(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.0}", value.abs())
    } else {
        format!("${:.0}", value)
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
