//! Signal Scan Binary
//!
//! One batch pass over the persisted trade log:
//! 1. Read the full trade + fund-holding snapshot (fatal if unreadable)
//! 2. Run per-class detectors and the quarter-over-quarter fund diff
//! 3. Correlate across sources (Trinity + temporal convergence)
//! 4. Suppress alert ids already emitted in previous runs
//! 5. Append new alerts to the JSONL sink and persist the seen set
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin alphaflow_signals
//! ```
//!
//! ## Environment Variables
//!
//! - ALPHAFLOW_DB_PATH - SQLite trade log (default: data/alphaflow.db)
//! - ALERTS_OUTPUT_PATH - alert JSONL sink (default: out/alerts.jsonl)
//! - SEEN_ALERTS_PATH - dedup state file (default: state/seen_alerts.json)
//! - TRINITY_WINDOW_DAYS, TIGHT_WINDOW_DAYS - correlation windows
//! - HIGH_CONVICTION_IDS - comma-separated canonical actor ids
//! - MIN_* thresholds - see config module
//! - RUST_LOG - logging level (optional, default: info)

use alphaflow::config::Config;
use alphaflow::signal_core::{run_signal_scan, AlertWriter, SeenAlertStore, TradeLogReader};
use chrono::Utc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = Config::from_env();

    log::info!("🚀 Starting alphaflow signal scan");
    log::info!("   Trade log: {}", config.db_path);
    log::info!("   Alert sink: {}", config.alerts_output_path);
    log::info!("   Trinity window: {}d", config.trinity_window_days);
    log::info!(
        "   High-conviction actors: {}",
        config.detector.high_conviction_ids.len()
    );

    // The one fatal failure mode: no readable trade log, no run
    let reader = TradeLogReader::open(&config.db_path)?;
    let trades = reader.read_trades()?;
    let holdings = reader.read_fund_holdings()?;

    log::info!(
        "📊 Snapshot: {} trades, {} fund holdings",
        trades.len(),
        holdings.len()
    );

    let as_of = Utc::now().date_naive();
    let alerts = run_signal_scan(&trades, &holdings, &config, as_of);

    let mut seen = SeenAlertStore::load(&config.seen_alerts_path);
    let mut writer = AlertWriter::new(config.alerts_output_path.clone().into())?;

    let mut emitted = 0usize;
    let mut suppressed = 0usize;

    for alert in &alerts {
        if !seen.insert(&alert.alert_id) {
            suppressed += 1;
            log::debug!(
                "⏭️  Suppressed repeat alert {} ({})",
                alert.alert_id,
                alert.ticker
            );
            continue;
        }

        writer.write_alert(alert)?;
        emitted += 1;
        log::info!(
            "🚨 {} {} [{}]",
            alert.signal_type.as_str(),
            alert.ticker,
            alert.alert_id
        );
    }

    writer.flush()?;
    seen.save()?;

    log::info!(
        "✅ Run complete: {} new alerts emitted, {} suppressed as repeats",
        emitted,
        suppressed
    );

    Ok(())
}
