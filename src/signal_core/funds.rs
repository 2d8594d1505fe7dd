//! Fund (13F) holding snapshots and quarter-over-quarter activity
//!
//! Superinvestor holdings arrive as quarterly snapshots. Activity is
//! classified by diffing the two most recent quarters per (manager,
//! ticker): a position absent last quarter is a NewBuy, a share count up
//! at least 50% is an Add. Comparisons are refused unless the two quarter
//! labels are actually adjacent - a skipped collection quarter would
//! otherwise stretch an "Add" over more time than it claims.

use super::alert::{Alert, SignalType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};

/// Share-count growth that qualifies as a deliberate Add
const ADD_THRESHOLD_PCT: f64 = 50.0;

/// One manager's position in one ticker for one reporting quarter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundHolding {
    pub manager_id: String,
    pub manager_name: String,
    pub ticker: String,
    pub company_name: Option<String>,
    pub shares: f64,
    pub portfolio_pct: Option<f64>,
    pub value_usd: Option<f64>,
    /// Reporting quarter label, e.g. "Q3 2025"
    pub quarter: String,
    /// Explicit filing-period end where recorded
    pub snapshot_date: Option<NaiveDate>,
}

impl FundHolding {
    /// The date this snapshot speaks for: the recorded period end, or the
    /// calendar end of the labelled quarter
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.snapshot_date
            .or_else(|| QuarterLabel::parse(&self.quarter).map(|q| q.end_date()))
    }
}

/// Parsed "Q<n> <year>" label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QuarterLabel {
    pub year: i32,
    pub quarter: u8,
}

impl QuarterLabel {
    pub fn parse(label: &str) -> Option<Self> {
        let mut parts = label.trim().split_whitespace();
        let q = parts.next()?;
        let year: i32 = parts.next()?.parse().ok()?;
        if !(1900..=9999).contains(&year) {
            return None;
        }

        let quarter: u8 = q
            .strip_prefix('Q')
            .or_else(|| q.strip_prefix('q'))?
            .parse()
            .ok()?;
        if !(1..=4).contains(&quarter) {
            return None;
        }

        Some(Self { year, quarter })
    }

    /// Calendar end of the quarter
    pub fn end_date(&self) -> NaiveDate {
        let (month, day) = match self.quarter {
            1 => (3, 31),
            2 => (6, 30),
            3 => (9, 30),
            _ => (12, 31),
        };
        // Valid by construction for quarter in 1..=4
        NaiveDate::from_ymd_opt(self.year, month, day).unwrap()
    }

    /// True when `self` is the quarter immediately after `previous`
    pub fn follows(&self, previous: &QuarterLabel) -> bool {
        if self.year == previous.year {
            self.quarter == previous.quarter + 1
        } else {
            self.year == previous.year + 1 && previous.quarter == 4 && self.quarter == 1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FundActivity {
    /// Position absent in the previous quarter
    #[serde(rename = "BUY")]
    NewBuy,
    /// Share count up ≥ 50% quarter over quarter
    #[serde(rename = "ADD")]
    Add,
}

/// One classified quarter-over-quarter move
#[derive(Debug, Clone, Serialize)]
pub struct FundActivitySignal {
    pub manager_id: String,
    pub manager_name: String,
    pub ticker: String,
    pub company_name: Option<String>,
    pub activity: FundActivity,
    pub current_shares: f64,
    pub previous_shares: f64,
    pub change_pct: f64,
    pub portfolio_pct: Option<f64>,
    pub quarter: String,
}

impl FundActivitySignal {
    pub fn into_alert(self) -> Alert {
        let signal_type = match self.activity {
            FundActivity::NewBuy => SignalType::FundNewBuy,
            FundActivity::Add => SignalType::FundAdd,
        };

        let participants = vec![self.manager_name.clone()];

        let mut details = BTreeMap::new();
        details.insert("manager".to_string(), json!(self.manager_name));
        details.insert("current_shares".to_string(), json!(self.current_shares));
        details.insert("previous_shares".to_string(), json!(self.previous_shares));
        details.insert("change_pct".to_string(), json!(self.change_pct));
        details.insert("quarter".to_string(), json!(self.quarter));
        if let Some(pct) = self.portfolio_pct {
            details.insert("portfolio_pct".to_string(), json!(pct));
        }

        let dates = QuarterLabel::parse(&self.quarter)
            .map(|q| vec![q.end_date()])
            .unwrap_or_default();

        Alert::with_identity(
            signal_type,
            self.ticker,
            self.company_name,
            details,
            &participants,
            &dates,
        )
    }
}

/// The two most recent distinct quarter labels present in the snapshot set
pub fn latest_two_quarters(holdings: &[FundHolding]) -> Option<(QuarterLabel, QuarterLabel)> {
    let mut quarters: Vec<QuarterLabel> = holdings
        .iter()
        .filter_map(|h| QuarterLabel::parse(&h.quarter))
        .collect();
    quarters.sort();
    quarters.dedup();

    if quarters.len() < 2 {
        return None;
    }
    let current = quarters[quarters.len() - 1];
    let previous = quarters[quarters.len() - 2];
    Some((previous, current))
}

/// Classify activity between the two most recent quarters on record
///
/// Returns nothing (with a warning) when fewer than two quarters exist or
/// the latest two are not adjacent.
pub fn detect_fund_activity(holdings: &[FundHolding]) -> Vec<FundActivitySignal> {
    let (previous_q, current_q) = match latest_two_quarters(holdings) {
        Some(pair) => pair,
        None => {
            log::warn!("Need at least 2 quarters of fund holdings, skipping fund activity");
            return Vec::new();
        }
    };

    if !current_q.follows(&previous_q) {
        log::warn!(
            "⚠️  Latest fund quarters are not adjacent (Q{} {} vs Q{} {}), refusing comparison",
            previous_q.quarter,
            previous_q.year,
            current_q.quarter,
            current_q.year
        );
        return Vec::new();
    }

    compare_quarters(holdings, previous_q, current_q)
}

fn compare_quarters(
    holdings: &[FundHolding],
    previous_q: QuarterLabel,
    current_q: QuarterLabel,
) -> Vec<FundActivitySignal> {
    let of_quarter = |q: QuarterLabel| {
        holdings
            .iter()
            .filter(move |h| QuarterLabel::parse(&h.quarter) == Some(q))
    };

    let previous: HashMap<(&str, &str), &FundHolding> = of_quarter(previous_q)
        .map(|h| ((h.manager_id.as_str(), h.ticker.as_str()), h))
        .collect();

    let mut signals = Vec::new();

    for current in of_quarter(current_q) {
        let key = (current.manager_id.as_str(), current.ticker.as_str());

        let (activity, previous_shares, change_pct) = match previous.get(&key) {
            None => (FundActivity::NewBuy, 0.0, 100.0),
            Some(prev) if prev.shares > 0.0 && current.shares > prev.shares => {
                let change = (current.shares - prev.shares) / prev.shares * 100.0;
                if change < ADD_THRESHOLD_PCT {
                    continue;
                }
                (FundActivity::Add, prev.shares, change)
            }
            Some(_) => continue,
        };

        signals.push(FundActivitySignal {
            manager_id: current.manager_id.clone(),
            manager_name: current.manager_name.clone(),
            ticker: current.ticker.clone(),
            company_name: current.company_name.clone(),
            activity,
            current_shares: current.shares,
            previous_shares,
            change_pct: (change_pct * 10.0).round() / 10.0,
            portfolio_pct: current.portfolio_pct,
            quarter: current.quarter.clone(),
        });
    }

    log::info!(
        "💼 Fund activity: {} signals (Q{} {} vs Q{} {})",
        signals.len(),
        current_q.quarter,
        current_q.year,
        previous_q.quarter,
        previous_q.year
    );

    signals
}
