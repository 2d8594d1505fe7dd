//! Cross-source correlation engine
//!
//! Joins evidence from the three actor classes per ticker:
//!
//! - Trinity: insider buying + allow-listed legislator buying inside the
//!   correlation window, plus any recorded fund holding.
//! - Temporal convergence: orders the three sources' anchor dates into a
//!   timeline and scores how ideal the cascade is.
//!
//! Missing evidence from any source is a normal "no signal" outcome, never
//! an error.

use super::alert::{Alert, SignalType};
use super::funds::FundHolding;
use super::record::{major_party, ActorType, TradeRecord};
use super::scorer::{ConvergenceScorer, EvidenceSource, TimelinePoint};
use chrono::{Duration, NaiveDate};
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};

const MAX_NAMED_PARTICIPANTS: usize = 5;

pub struct CrossSourceCorrelator {
    window_days: i64,
    scorer: ConvergenceScorer,
    high_conviction_ids: HashSet<String>,
}

impl CrossSourceCorrelator {
    pub fn new(
        window_days: i64,
        tight_window_days: i64,
        high_conviction_ids: HashSet<String>,
    ) -> Self {
        Self {
            window_days,
            scorer: ConvergenceScorer::new(tight_window_days),
            high_conviction_ids,
        }
    }

    /// Tickers with buy/hold evidence from all three sources in the window
    pub fn detect_trinity(
        &self,
        trades: &[TradeRecord],
        holdings: &[FundHolding],
        as_of: NaiveDate,
    ) -> Vec<Alert> {
        let evidence = self.gather(trades, holdings, as_of);

        let mut tickers: Vec<&String> = evidence.keys().collect();
        tickers.sort();

        let mut alerts = Vec::new();
        for ticker in tickers {
            let ev = &evidence[ticker];
            if !ev.is_complete() {
                continue;
            }

            let insider_value: f64 = ev
                .insider_buys
                .iter()
                .filter_map(|t| t.notional_value())
                .sum();

            let mut details = BTreeMap::new();
            details.insert("insider_count".to_string(), json!(ev.insider_buys.len()));
            details.insert("insider_value".to_string(), json!(insider_value));
            details.insert(
                "legislator_count".to_string(),
                json!(ev.legislator_buys.len()),
            );
            details.insert(
                "legislators".to_string(),
                json!(named(ev.legislator_buys.iter().map(|t| t.actor_name.as_str()))),
            );
            details.insert("fund_count".to_string(), json!(ev.fund_holdings.len()));
            details.insert(
                "managers".to_string(),
                json!(named(ev.fund_holdings.iter().map(|h| h.manager_name.as_str()))),
            );
            details.insert("window_days".to_string(), json!(self.window_days));

            let evidence_trades: Vec<TradeRecord> = ev
                .legislator_buys
                .iter()
                .chain(ev.insider_buys.iter())
                .map(|t| (*t).clone())
                .collect();

            alerts.push(Alert::from_trades(
                SignalType::Trinity,
                ticker.clone(),
                evidence_trades.iter().find_map(|t| t.company_name.clone()),
                evidence_trades,
                details,
            ));
        }

        log::info!("🔺 Trinity detection: {} tickers qualified", alerts.len());
        alerts
    }

    /// Timeline and score for one ticker, None unless all three sources
    /// contributed evidence
    pub fn temporal_convergence(
        &self,
        ticker: &str,
        trades: &[TradeRecord],
        holdings: &[FundHolding],
        as_of: NaiveDate,
    ) -> Option<ConvergenceReport> {
        let evidence = self.gather(trades, holdings, as_of);
        let ev = evidence.get(ticker)?;
        if !ev.is_complete() {
            return None;
        }

        // Earliest action per trade source, latest snapshot for funds
        let legislator_date = ev.legislator_buys.iter().map(|t| t.trade_date).min()?;
        let insider_date = ev.insider_buys.iter().map(|t| t.trade_date).min()?;
        let fund_date = ev
            .fund_holdings
            .iter()
            .filter_map(|h| h.effective_date())
            .max()?;

        let mut timeline = vec![
            TimelinePoint {
                source: EvidenceSource::Legislator,
                date: legislator_date,
                count: ev.legislator_buys.len(),
            },
            TimelinePoint {
                source: EvidenceSource::Insider,
                date: insider_date,
                count: ev.insider_buys.len(),
            },
            TimelinePoint {
                source: EvidenceSource::Fund,
                date: fund_date,
                count: ev.fund_holdings.len(),
            },
        ];
        timeline.sort_by_key(|p| p.date);

        let bipartisan = is_bipartisan(&ev.legislator_buys);
        let (score, pattern) = self.scorer.score(&timeline, bipartisan);
        let span_days = (timeline[2].date - timeline[0].date).num_days();

        let evidence_trades: Vec<TradeRecord> = ev
            .legislator_buys
            .iter()
            .chain(ev.insider_buys.iter())
            .map(|t| (*t).clone())
            .collect();

        Some(ConvergenceReport {
            ticker: ticker.to_string(),
            score,
            pattern,
            timeline,
            span_days,
            bipartisan,
            evidence: evidence_trades,
        })
    }

    /// Bucket window-qualified evidence per ticker
    fn gather<'a>(
        &self,
        trades: &'a [TradeRecord],
        holdings: &'a [FundHolding],
        as_of: NaiveDate,
    ) -> HashMap<String, TickerEvidence<'a>> {
        let window_start = as_of - Duration::days(self.window_days);
        let in_window = |d: NaiveDate| d >= window_start && d <= as_of;

        let mut evidence: HashMap<String, TickerEvidence<'a>> = HashMap::new();

        for trade in trades {
            if !trade.is_buy() || !in_window(trade.trade_date) {
                continue;
            }
            match trade.actor_type {
                ActorType::CorporateInsider => {
                    evidence
                        .entry(trade.ticker.clone())
                        .or_default()
                        .insider_buys
                        .push(trade);
                }
                ActorType::Legislator if self.high_conviction_ids.contains(&trade.actor_id) => {
                    evidence
                        .entry(trade.ticker.clone())
                        .or_default()
                        .legislator_buys
                        .push(trade);
                }
                _ => {}
            }
        }

        // Holdings qualify from any quarter - 13F filings are too coarse to
        // window the way trades are
        for holding in holdings {
            evidence
                .entry(holding.ticker.clone())
                .or_default()
                .fund_holdings
                .push(holding);
        }

        evidence
    }
}

#[derive(Default)]
struct TickerEvidence<'a> {
    insider_buys: Vec<&'a TradeRecord>,
    legislator_buys: Vec<&'a TradeRecord>,
    fund_holdings: Vec<&'a FundHolding>,
}

impl TickerEvidence<'_> {
    fn is_complete(&self) -> bool {
        !self.insider_buys.is_empty()
            && !self.legislator_buys.is_empty()
            && !self.fund_holdings.is_empty()
    }
}

/// Scored convergence outcome for one ticker
#[derive(Debug, Clone)]
pub struct ConvergenceReport {
    pub ticker: String,
    pub score: u8,
    pub pattern: String,
    pub timeline: Vec<TimelinePoint>,
    pub span_days: i64,
    pub bipartisan: bool,
    pub evidence: Vec<TradeRecord>,
}

impl ConvergenceReport {
    pub fn into_alert(self) -> Alert {
        let timeline_json: Vec<serde_json::Value> = self
            .timeline
            .iter()
            .map(|p| {
                json!({
                    "source": p.source.as_str(),
                    "date": p.date.format("%Y-%m-%d").to_string(),
                    "count": p.count,
                })
            })
            .collect();

        let mut details = BTreeMap::new();
        details.insert("convergence_score".to_string(), json!(self.score));
        details.insert("pattern".to_string(), json!(self.pattern));
        details.insert("timeline".to_string(), json!(timeline_json));
        details.insert("span_days".to_string(), json!(self.span_days));
        details.insert("bipartisan".to_string(), json!(self.bipartisan));

        let company_name = self.evidence.iter().find_map(|t| t.company_name.clone());

        Alert::from_trades(
            SignalType::TemporalConvergence,
            self.ticker,
            company_name,
            self.evidence,
            details,
        )
    }
}

fn named<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut unique: Vec<String> = names.map(String::from).collect();
    unique.sort();
    unique.dedup();
    unique.truncate(MAX_NAMED_PARTICIPANTS);
    unique
}

fn is_bipartisan(legislator_buys: &[&TradeRecord]) -> bool {
    let parties: HashSet<_> = legislator_buys
        .iter()
        .filter_map(|t| t.party.as_deref())
        .filter_map(major_party)
        .collect();
    parties.len() == 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal_core::record::TradeDirection;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 30).unwrap()
    }

    fn insider_buy(actor_id: &str, ticker: &str, day: u32) -> TradeRecord {
        TradeRecord {
            actor_type: ActorType::CorporateInsider,
            actor_id: actor_id.to_string(),
            actor_name: actor_id.to_uppercase(),
            party: None,
            chamber: None,
            state: None,
            ticker: ticker.to_string(),
            company_name: Some(format!("{} Inc", ticker)),
            direction: TradeDirection::Buy,
            size_range: None,
            value: Some(300_000.0),
            price: None,
            trade_date: NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
            disclosure_date: None,
            title: None,
            owner_type: None,
        }
    }

    fn legislator_buy(actor_id: &str, party: &str, ticker: &str, day: u32) -> TradeRecord {
        TradeRecord {
            actor_type: ActorType::Legislator,
            actor_id: actor_id.to_string(),
            actor_name: actor_id.to_uppercase(),
            party: Some(party.to_string()),
            chamber: Some("House".to_string()),
            state: None,
            ticker: ticker.to_string(),
            company_name: None,
            direction: TradeDirection::Buy,
            size_range: Some("15K-50K".to_string()),
            value: None,
            price: None,
            trade_date: NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
            disclosure_date: None,
            title: None,
            owner_type: None,
        }
    }

    fn fund_holding(manager: &str, ticker: &str, snapshot_day: u32) -> FundHolding {
        FundHolding {
            manager_id: manager.to_string(),
            manager_name: manager.to_uppercase(),
            ticker: ticker.to_string(),
            company_name: None,
            shares: 1_000.0,
            portfolio_pct: Some(4.0),
            value_usd: None,
            quarter: "Q3 2025".to_string(),
            snapshot_date: NaiveDate::from_ymd_opt(2025, 10, snapshot_day),
        }
    }

    fn correlator() -> CrossSourceCorrelator {
        let allow: HashSet<String> =
            ["jane-doe", "john-roe"].iter().map(|s| s.to_string()).collect();
        CrossSourceCorrelator::new(30, 14, allow)
    }

    #[test]
    fn test_trinity_requires_all_three_sources() {
        let c = correlator();

        let trades = vec![
            insider_buy("ins-1", "NVDA", 5),
            legislator_buy("jane-doe", "Democratic", "NVDA", 10),
        ];
        // No fund holding yet: no signal
        assert!(c.detect_trinity(&trades, &[], as_of()).is_empty());

        let holdings = vec![fund_holding("BRK", "NVDA", 20)];
        let alerts = c.detect_trinity(&trades, &holdings, as_of());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].ticker, "NVDA");
        assert_eq!(alerts[0].signal_type, SignalType::Trinity);
        assert_eq!(alerts[0].details["insider_count"], json!(1));
        assert_eq!(alerts[0].details["legislator_count"], json!(1));
    }

    #[test]
    fn test_trinity_ignores_non_allowlisted_legislators() {
        let c = correlator();

        let trades = vec![
            insider_buy("ins-1", "NVDA", 5),
            legislator_buy("someone-else", "Democratic", "NVDA", 10),
        ];
        let holdings = vec![fund_holding("BRK", "NVDA", 20)];

        assert!(c.detect_trinity(&trades, &holdings, as_of()).is_empty());
    }

    #[test]
    fn test_trinity_window_excludes_old_trades() {
        let c = correlator();

        let mut old_insider = insider_buy("ins-1", "NVDA", 1);
        old_insider.trade_date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();

        let trades = vec![old_insider, legislator_buy("jane-doe", "Democratic", "NVDA", 10)];
        let holdings = vec![fund_holding("BRK", "NVDA", 20)];

        assert!(c.detect_trinity(&trades, &holdings, as_of()).is_empty());
    }

    #[test]
    fn test_convergence_missing_source_is_no_signal() {
        let c = correlator();

        // Two of three sources only
        let trades = vec![insider_buy("ins-1", "NVDA", 5)];
        let holdings = vec![fund_holding("BRK", "NVDA", 20)];

        assert!(c
            .temporal_convergence("NVDA", &trades, &holdings, as_of())
            .is_none());
    }

    #[test]
    fn test_convergence_ideal_cascade() {
        let c = correlator();

        let trades = vec![
            legislator_buy("jane-doe", "Democratic", "NVDA", 2),
            insider_buy("ins-1", "NVDA", 8),
        ];
        let holdings = vec![fund_holding("BRK", "NVDA", 12)];

        let report = c
            .temporal_convergence("NVDA", &trades, &holdings, as_of())
            .unwrap();

        // 5 base + 3 sequential + 2 tight (10-day span) = 10
        assert_eq!(report.score, 10);
        assert_eq!(report.timeline[0].source, EvidenceSource::Legislator);
        assert_eq!(report.timeline[2].source, EvidenceSource::Fund);
        assert_eq!(report.span_days, 10);
        assert!(!report.bipartisan);
    }

    #[test]
    fn test_convergence_bipartisan_bonus() {
        let c = correlator();

        // Wide span kills the tight bonus; mixed order kills sequential
        let trades = vec![
            insider_buy("ins-1", "NVDA", 1),
            legislator_buy("jane-doe", "Democratic", "NVDA", 10),
            legislator_buy("john-roe", "Republican", "NVDA", 15),
        ];
        let holdings = vec![fund_holding("BRK", "NVDA", 28)];

        let report = c
            .temporal_convergence("NVDA", &trades, &holdings, as_of())
            .unwrap();

        assert!(report.bipartisan);
        assert_eq!(report.score, 6); // 5 concurrent + 1 bipartisan
    }

    #[test]
    fn test_convergence_alert_round_trip() {
        let c = correlator();

        let trades = vec![
            legislator_buy("jane-doe", "Democratic", "NVDA", 2),
            insider_buy("ins-1", "NVDA", 8),
        ];
        let holdings = vec![fund_holding("BRK", "NVDA", 12)];

        let report = c
            .temporal_convergence("NVDA", &trades, &holdings, as_of())
            .unwrap();
        let alert = report.into_alert();

        assert_eq!(alert.signal_type, SignalType::TemporalConvergence);
        assert_eq!(alert.details["convergence_score"], json!(10));
        assert_eq!(alert.details["timeline"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_fund_date_falls_back_to_quarter_end() {
        let c = correlator();

        let trades = vec![
            legislator_buy("jane-doe", "Democratic", "NVDA", 2),
            insider_buy("ins-1", "NVDA", 8),
        ];
        let mut holding = fund_holding("BRK", "NVDA", 1);
        holding.snapshot_date = None; // "Q3 2025" -> 2025-09-30

        let report = c
            .temporal_convergence("NVDA", &trades, &[holding], as_of())
            .unwrap();

        assert_eq!(
            report.timeline[0].date,
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()
        );
        assert_eq!(report.timeline[0].source, EvidenceSource::Fund);
    }
}
