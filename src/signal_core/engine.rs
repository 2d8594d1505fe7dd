//! One-run signal orchestration
//!
//! Pure computation over pre-loaded data: the binaries do the I/O (reader,
//! seen store, alert sink), this module turns a trade + holdings snapshot
//! into the run's alert list. Detectors are isolated - an empty result
//! from one never stops the others.

use super::alert::Alert;
use super::correlator::CrossSourceCorrelator;
use super::detector::SignalDetector;
use super::funds::{detect_fund_activity, FundHolding};
use super::record::TradeRecord;
use crate::config::Config;
use chrono::NaiveDate;

/// Run every detector and the cross-source correlator over one snapshot
///
/// `as_of` anchors the correlation window; binaries pass today, tests pin
/// a fixed date.
pub fn run_signal_scan(
    trades: &[TradeRecord],
    holdings: &[FundHolding],
    config: &Config,
    as_of: NaiveDate,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    // Per-class disclosure signals
    let detector = SignalDetector::new(config.detector.clone());
    alerts.extend(detector.detect_all(trades));

    // Quarter-over-quarter fund moves
    alerts.extend(
        detect_fund_activity(holdings)
            .into_iter()
            .map(|signal| signal.into_alert()),
    );

    // Cross-source convergence
    let correlator = CrossSourceCorrelator::new(
        config.trinity_window_days,
        config.tight_window_days,
        config.detector.high_conviction_ids.clone(),
    );

    let trinity_alerts = correlator.detect_trinity(trades, holdings, as_of);
    for trinity in &trinity_alerts {
        if let Some(report) =
            correlator.temporal_convergence(&trinity.ticker, trades, holdings, as_of)
        {
            log::info!(
                "🔺 {} convergence: score {}/10 ({})",
                report.ticker,
                report.score,
                report.pattern
            );
            alerts.push(report.into_alert());
        }
    }
    alerts.extend(trinity_alerts);

    log::info!("✅ Scan complete: {} alerts total", alerts.len());
    alerts
}
