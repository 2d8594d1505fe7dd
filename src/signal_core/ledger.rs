//! Position ledger and cost-basis model
//!
//! Rebuilt from the trade log on every run: trades are applied in
//! trade-date order and accumulate into one Position per (actor, ticker).
//! Share counts are estimates by design - legislator disclosures only give
//! bucketed ranges, so estimated shares = range midpoint / trade price.
//!
//! Trades with no resolvable price or notional are dropped from the ledger
//! (never booked at $0); a SELL against an empty position still counts the
//! trade but realizes nothing.

use super::record::{TradeDirection, TradeRecord};
use super::valuation::PriceSource;
use std::collections::HashMap;

/// Running state for one (actor, ticker) pair
#[derive(Debug, Clone)]
pub struct Position {
    pub actor_id: String,
    pub actor_name: String,
    pub party: Option<String>,
    pub state: Option<String>,
    pub ticker: String,
    pub company_name: Option<String>,
    pub shares_held: f64,
    pub cost_basis: f64,
    pub realized_pnl: f64,
    pub trades_count: u32,
}

impl Position {
    fn new(trade: &TradeRecord) -> Self {
        Self {
            actor_id: trade.actor_id.clone(),
            actor_name: trade.actor_name.clone(),
            party: trade.party.clone(),
            state: trade.state.clone(),
            ticker: trade.ticker.clone(),
            company_name: trade.company_name.clone(),
            shares_held: 0.0,
            cost_basis: 0.0,
            realized_pnl: 0.0,
            trades_count: 0,
        }
    }

    /// Average cost per share, 0 when the position is empty
    pub fn avg_cost(&self) -> f64 {
        if self.shares_held > 0.0 && self.cost_basis > 0.0 {
            self.cost_basis / self.shares_held
        } else {
            0.0
        }
    }

    fn apply_buy(&mut self, estimated_shares: f64, midpoint_value: f64) {
        self.shares_held += estimated_shares;
        self.cost_basis += midpoint_value;
        self.trades_count += 1;
    }

    /// Realize P&L against the running average cost, clamping shares at 0.
    /// An oversell keeps cost_basis intact as the audit trail of dollars
    /// deployed; unrealized math guards on shares_held > 0.
    fn apply_sell(&mut self, estimated_shares: f64, price: f64) {
        if self.shares_held > 0.0 {
            let avg_cost_per_share = self.cost_basis / self.shares_held;
            self.realized_pnl += estimated_shares * (price - avg_cost_per_share);
            self.shares_held = (self.shares_held - estimated_shares).max(0.0);
        }
        self.trades_count += 1;
    }
}

/// All positions for one actor class, keyed by (actor_id, ticker)
#[derive(Debug, Default)]
pub struct PositionLedger {
    positions: HashMap<(String, String), Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch of trades in the order given
    ///
    /// Callers pass the reader's trade-date-ordered snapshot. Prices are
    /// resolved per trade: the disclosed price where present, otherwise a
    /// historical close for the trade date. Unresolvable trades are
    /// skipped and counted in the returned total.
    pub async fn ingest(
        &mut self,
        trades: &[TradeRecord],
        prices: &mut dyn PriceSource,
    ) -> IngestStats {
        let mut stats = IngestStats::default();

        for trade in trades {
            let price = match self.resolve_price(trade, prices).await {
                Some(p) if p > 0.0 => p,
                _ => {
                    log::debug!(
                        "Skipping {} {} on {} - no resolvable price",
                        trade.actor_id,
                        trade.ticker,
                        trade.trade_date
                    );
                    stats.skipped += 1;
                    continue;
                }
            };

            let midpoint_value = match trade.notional_value() {
                Some(v) => v,
                None => {
                    log::debug!(
                        "Skipping {} {} on {} - no resolvable size",
                        trade.actor_id,
                        trade.ticker,
                        trade.trade_date
                    );
                    stats.skipped += 1;
                    continue;
                }
            };

            let estimated_shares = midpoint_value / price;

            let key = (trade.actor_id.clone(), trade.ticker.clone());
            let position = self
                .positions
                .entry(key)
                .or_insert_with(|| Position::new(trade));

            match trade.direction {
                TradeDirection::Buy => position.apply_buy(estimated_shares, midpoint_value),
                TradeDirection::Sell => position.apply_sell(estimated_shares, price),
            }

            stats.applied += 1;
        }

        stats
    }

    async fn resolve_price(
        &self,
        trade: &TradeRecord,
        prices: &mut dyn PriceSource,
    ) -> Option<f64> {
        if let Some(p) = trade.price {
            return Some(p);
        }
        prices.historical_price(&trade.ticker, trade.trade_date).await
    }

    pub fn get(&self, actor_id: &str, ticker: &str) -> Option<&Position> {
        self.positions
            .get(&(actor_id.to_string(), ticker.to_string()))
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IngestStats {
    pub applied: usize,
    pub skipped: usize,
}
