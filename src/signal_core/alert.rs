//! Alert model and content-hash identity
//!
//! An alert's id is a hash of what it is about - signal type, ticker,
//! who participated, and on which dates - not of how the evidence happened
//! to be ordered. Re-running a scan over the same log yields the same ids,
//! which is the contract the downstream delivery layer relies on to
//! suppress repeat notifications.

use super::record::TradeRecord;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// Identity folds in at most this many participants/dates
const MAX_ID_PARTICIPANTS: usize = 5;
const MAX_ID_DATES: usize = 10;
const PARTICIPANT_TRUNCATE: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SignalType {
    #[serde(rename = "CLUSTER_BUY")]
    ClusterBuy,
    #[serde(rename = "HIGH_CONVICTION_BUY")]
    HighConvictionBuy,
    #[serde(rename = "BEARISH_CLUSTER_SELL")]
    BearishClusterSell,
    #[serde(rename = "CEO_CFO_BUY")]
    CeoCfoBuy,
    #[serde(rename = "LARGE_SINGLE_BUY")]
    LargeSingleBuy,
    #[serde(rename = "FIRST_BUY_12M")]
    FirstBuyIn12Months,
    #[serde(rename = "STRATEGIC_INVESTOR_BUY")]
    StrategicInvestorBuy,
    #[serde(rename = "FUND_NEW_BUY")]
    FundNewBuy,
    #[serde(rename = "FUND_ADD")]
    FundAdd,
    #[serde(rename = "TRINITY")]
    Trinity,
    #[serde(rename = "TEMPORAL_CONVERGENCE")]
    TemporalConvergence,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::ClusterBuy => "CLUSTER_BUY",
            SignalType::HighConvictionBuy => "HIGH_CONVICTION_BUY",
            SignalType::BearishClusterSell => "BEARISH_CLUSTER_SELL",
            SignalType::CeoCfoBuy => "CEO_CFO_BUY",
            SignalType::LargeSingleBuy => "LARGE_SINGLE_BUY",
            SignalType::FirstBuyIn12Months => "FIRST_BUY_12M",
            SignalType::StrategicInvestorBuy => "STRATEGIC_INVESTOR_BUY",
            SignalType::FundNewBuy => "FUND_NEW_BUY",
            SignalType::FundAdd => "FUND_ADD",
            SignalType::Trinity => "TRINITY",
            SignalType::TemporalConvergence => "TEMPORAL_CONVERGENCE",
        }
    }
}

/// A detected conviction signal with its supporting evidence
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub signal_type: SignalType,
    pub ticker: String,
    pub company_name: Option<String>,
    pub evidence: Vec<TradeRecord>,
    pub details: BTreeMap<String, Value>,
    pub alert_id: String,
}

impl Alert {
    /// Build an alert whose identity derives from its trade evidence
    pub fn from_trades(
        signal_type: SignalType,
        ticker: String,
        company_name: Option<String>,
        evidence: Vec<TradeRecord>,
        details: BTreeMap<String, Value>,
    ) -> Self {
        let participants: Vec<String> =
            evidence.iter().map(|t| t.actor_name.clone()).collect();
        let dates: Vec<NaiveDate> = evidence.iter().map(|t| t.trade_date).collect();

        let alert_id = compute_alert_id(signal_type, &ticker, &participants, &dates);

        Self {
            signal_type,
            ticker,
            company_name,
            evidence,
            details,
            alert_id,
        }
    }

    /// Build an alert whose identity is supplied explicitly - used for
    /// fund signals, whose evidence is quarterly holdings, not trades
    pub fn with_identity(
        signal_type: SignalType,
        ticker: String,
        company_name: Option<String>,
        details: BTreeMap<String, Value>,
        participants: &[String],
        dates: &[NaiveDate],
    ) -> Self {
        let alert_id = compute_alert_id(signal_type, &ticker, participants, dates);

        Self {
            signal_type,
            ticker,
            company_name,
            evidence: Vec::new(),
            details,
            alert_id,
        }
    }
}

/// Deterministic, order-independent content hash
///
/// Participants and dates are deduplicated and sorted before hashing, so
/// permuting the evidence input order cannot change the id.
pub fn compute_alert_id(
    signal_type: SignalType,
    ticker: &str,
    participants: &[String],
    dates: &[NaiveDate],
) -> String {
    let mut names: Vec<String> = participants
        .iter()
        .map(|name| name.trim().chars().take(PARTICIPANT_TRUNCATE).collect())
        .collect();
    names.sort();
    names.dedup();
    names.truncate(MAX_ID_PARTICIPANTS);

    let mut days: Vec<String> = dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
    days.sort();
    days.dedup();
    days.truncate(MAX_ID_DATES);

    let canonical = format!(
        "{}|{}|{}|{}",
        signal_type.as_str(),
        ticker,
        names.join(","),
        days.join(",")
    );

    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(digest)[..16].to_string()
}
