//! Normalized trade-record model
//!
//! One TradeRecord variant is constructed at the ingestion boundary (the
//! SQLite reader); everything downstream depends only on this type. The
//! raw sources differ wildly - insider filings carry exact dollar values,
//! legislator disclosures only bucketed size ranges - so valuation is
//! resolved through [`TradeRecord::notional_value`], which never substitutes
//! zero for an unknown amount.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorType {
    #[serde(rename = "LEGISLATOR")]
    Legislator,
    #[serde(rename = "CORPORATE_INSIDER")]
    CorporateInsider,
    #[serde(rename = "FUND")]
    Fund,
}

impl ActorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorType::Legislator => "LEGISLATOR",
            ActorType::CorporateInsider => "CORPORATE_INSIDER",
            ActorType::Fund => "FUND",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "LEGISLATOR" => Some(ActorType::Legislator),
            "CORPORATE_INSIDER" => Some(ActorType::CorporateInsider),
            "FUND" => Some(ActorType::Fund),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl TradeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Buy => "BUY",
            TradeDirection::Sell => "SELL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BUY" => Some(TradeDirection::Buy),
            "SELL" => Some(TradeDirection::Sell),
            _ => None,
        }
    }
}

/// A single normalized trade disclosure, immutable once ingested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    pub actor_type: ActorType,
    pub actor_id: String,
    pub actor_name: String,
    pub party: Option<String>,
    pub chamber: Option<String>,
    pub state: Option<String>,
    pub ticker: String,
    pub company_name: Option<String>,
    pub direction: TradeDirection,
    /// Bucketed notional text, e.g. "15K-50K" (legislator disclosures)
    pub size_range: Option<String>,
    /// Exact dollar value where disclosed (insider filings)
    pub value: Option<f64>,
    /// Exact trade price where disclosed
    pub price: Option<f64>,
    pub trade_date: NaiveDate,
    pub disclosure_date: Option<NaiveDate>,
    pub title: Option<String>,
    pub owner_type: Option<String>,
}

impl TradeRecord {
    pub fn is_buy(&self) -> bool {
        matches!(self.direction, TradeDirection::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self.direction, TradeDirection::Sell)
    }

    /// Dollar value of this trade: exact value where disclosed, otherwise
    /// the size-range midpoint. None when neither resolves - an unvalued
    /// trade is excluded from threshold math, never treated as $0.
    pub fn notional_value(&self) -> Option<f64> {
        if let Some(v) = self.value {
            return Some(v);
        }
        self.size_range
            .as_deref()
            .and_then(parse_size_range)
            .map(|(lo, hi)| (lo + hi) / 2.0)
    }

    /// Canonical insider role, e.g. "Chief Exec. Officer" -> "CEO"
    pub fn normalized_title(&self) -> Option<&'static str> {
        self.title.as_deref().and_then(normalize_title)
    }
}

/// Parse a bucketed size range like "15K-50K" or "1M-5M" into dollar bounds
///
/// Accepts either a plain hyphen or an en-dash separator, case-insensitive
/// suffixes. Returns None on anything that does not match the grammar.
pub fn parse_size_range(raw: &str) -> Option<(f64, f64)> {
    let cleaned = raw.trim().to_uppercase().replace('\u{2013}', "-");

    let mut parts = cleaned.splitn(2, '-');
    let lo = parse_amount(parts.next()?)?;
    let hi = parse_amount(parts.next()?)?;

    Some((lo, hi))
}

fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim().trim_start_matches('$');
    if let Some(num) = s.strip_suffix('K') {
        return num.trim().parse::<f64>().ok().map(|n| n * 1_000.0);
    }
    if let Some(num) = s.strip_suffix('M') {
        return num.trim().parse::<f64>().ok().map(|n| n * 1_000_000.0);
    }
    s.parse::<f64>().ok()
}

/// Map a free-text insider title to its canonical role
pub fn normalize_title(title: &str) -> Option<&'static str> {
    match title.trim().to_lowercase().as_str() {
        "chief executive officer" | "chief exec officer" | "ceo" | "president and ceo"
        | "pres. & ceo" => Some("CEO"),
        "chief financial officer" | "chief fin officer" | "cfo" | "vp & cfo" => Some("CFO"),
        "chief operating officer" | "coo" => Some("COO"),
        "chief technology officer" | "cto" => Some("CTO"),
        "director" | "dir" | "board member" => Some("Director"),
        "chairman" | "chair" => Some("Chairman"),
        "president" | "pres" => Some("President"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MajorParty {
    Democratic,
    Republican,
}

/// Classify a disclosed party label into one of the two major parties
pub fn major_party(party: &str) -> Option<MajorParty> {
    let p = party.trim();
    if p.starts_with('D') || p.starts_with('d') {
        Some(MajorParty::Democratic)
    } else if p.starts_with('R') || p.starts_with('r') {
        Some(MajorParty::Republican)
    } else {
        None
    }
}
