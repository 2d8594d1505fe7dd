//! P&L snapshot calculator
//!
//! Combines ledger state with current-price lookups into read-only
//! snapshot rows. The output is a full recomputation each run - there is
//! no merge with a previous run's output. Positions whose ticker has no
//! available price are skipped (logged), never valued at zero.

use super::ledger::{Position, PositionLedger};
use super::valuation::PriceSource;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionStatus {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "CLOSED")]
    Closed,
}

impl PositionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionStatus::Open => "OPEN",
            PositionStatus::Closed => "CLOSED",
        }
    }
}

/// One position valued at current prices
#[derive(Debug, Clone, Serialize)]
pub struct PnLResult {
    pub actor_id: String,
    pub actor_name: String,
    pub ticker: String,
    pub company_name: Option<String>,
    pub shares_held: f64,
    pub avg_cost_basis: f64,
    pub current_price: f64,
    pub position_value: f64,
    pub unrealized_pnl: f64,
    pub realized_pnl: f64,
    pub total_pnl: f64,
    pub return_percent: f64,
    pub trades_count: u32,
    pub status: PositionStatus,
}

/// Value every position that is open or has realized P&L
///
/// Order-independent: rows come out keyed by the ledger's own iteration;
/// callers sort for presentation.
pub async fn compute_pnl(
    ledger: &PositionLedger,
    prices: &mut dyn PriceSource,
) -> Vec<PnLResult> {
    let mut results = Vec::new();

    for position in ledger.positions() {
        // Nothing held and nothing realized - nothing to report
        if position.shares_held == 0.0 && position.realized_pnl == 0.0 {
            continue;
        }

        let current_price = match prices.current_price(&position.ticker).await {
            Some(p) => p,
            None => {
                log::warn!("Could not get price for {}, skipping row", position.ticker);
                continue;
            }
        };

        results.push(value_position(position, current_price));
    }

    log::info!("📈 P&L calculation complete: {} positions valued", results.len());
    results
}

fn value_position(position: &Position, current_price: f64) -> PnLResult {
    let mut position_value = 0.0;
    let mut unrealized_pnl = 0.0;

    if position.shares_held > 0.0 && position.cost_basis > 0.0 {
        position_value = position.shares_held * current_price;
        unrealized_pnl = position_value - position.cost_basis;
    }

    let total_pnl = unrealized_pnl + position.realized_pnl;
    // Denominator floored at 1 so fully-skipped basis never divides by zero
    let total_invested = if position.cost_basis > 0.0 {
        position.cost_basis
    } else {
        1.0
    };
    let return_percent = total_pnl / total_invested * 100.0;

    let status = if position.shares_held > 0.0 {
        PositionStatus::Open
    } else {
        PositionStatus::Closed
    };

    PnLResult {
        actor_id: position.actor_id.clone(),
        actor_name: position.actor_name.clone(),
        ticker: position.ticker.clone(),
        company_name: position.company_name.clone(),
        shares_held: position.shares_held,
        avg_cost_basis: position.avg_cost(),
        current_price,
        position_value,
        unrealized_pnl,
        realized_pnl: position.realized_pnl,
        total_pnl,
        return_percent,
        trades_count: position.trades_count,
        status,
    }
}

/// Per-actor rollup across that actor's valued positions
#[derive(Debug, Clone, Serialize)]
pub struct ActorPnLSummary {
    pub actor_id: String,
    pub actor_name: String,
    pub total_unrealized_pnl: f64,
    pub total_realized_pnl: f64,
    pub total_pnl: f64,
    pub total_position_value: f64,
    pub open_positions: u32,
    pub closed_positions: u32,
    pub winning_positions: u32,
    pub losing_positions: u32,
    pub total_trades: u32,
}

/// Aggregate snapshot rows per actor, ranked by total P&L descending
pub fn summarize_by_actor(rows: &[PnLResult]) -> Vec<ActorPnLSummary> {
    let mut summaries: HashMap<&str, ActorPnLSummary> = HashMap::new();

    for row in rows {
        let summary = summaries
            .entry(row.actor_id.as_str())
            .or_insert_with(|| ActorPnLSummary {
                actor_id: row.actor_id.clone(),
                actor_name: row.actor_name.clone(),
                total_unrealized_pnl: 0.0,
                total_realized_pnl: 0.0,
                total_pnl: 0.0,
                total_position_value: 0.0,
                open_positions: 0,
                closed_positions: 0,
                winning_positions: 0,
                losing_positions: 0,
                total_trades: 0,
            });

        summary.total_unrealized_pnl += row.unrealized_pnl;
        summary.total_realized_pnl += row.realized_pnl;
        summary.total_pnl += row.total_pnl;
        summary.total_position_value += row.position_value;
        summary.total_trades += row.trades_count;

        match row.status {
            PositionStatus::Open => summary.open_positions += 1,
            PositionStatus::Closed => summary.closed_positions += 1,
        }

        if row.total_pnl > 0.0 {
            summary.winning_positions += 1;
        } else {
            summary.losing_positions += 1;
        }
    }

    let mut result: Vec<ActorPnLSummary> = summaries.into_values().collect();
    result.sort_by(|a, b| {
        b.total_pnl
            .partial_cmp(&a.total_pnl)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    result
}
