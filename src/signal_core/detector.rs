//! Conviction-signal detection with configurable thresholds
//!
//! Every detector is a pure pass over a trade collection: no input
//! mutation, no I/O. Sell-side clusters run with stricter thresholds than
//! buy-side because routine diversification and tax-driven sales make
//! sell clusters noisier.
//!
//! Valuation policy: a trade whose notional cannot be resolved is invisible
//! to every detector - it is excluded from aggregate sums, threshold
//! comparisons, and distinct-actor tallies alike.

use super::alert::{Alert, SignalType};
use super::record::{major_party, ActorType, TradeRecord};
use chrono::Duration;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Detection thresholds; defaults mirror the production alert profile
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Rolling window for insider clusters (days)
    pub cluster_window_days: i64,
    /// Distinct insiders required for a buy cluster
    pub min_insider_cluster: usize,
    /// Aggregate notional required for an insider buy cluster
    pub min_cluster_buy_value: f64,
    /// Rolling window for legislator clusters (days)
    pub legislator_cluster_window_days: i64,
    /// Distinct legislators required for a buy cluster
    pub min_legislator_cluster: usize,
    /// Aggregate notional required for a legislator buy cluster
    /// (0 by default: bucketed midpoints make a dollar bar unreliable)
    pub min_legislator_cluster_value: f64,
    /// Distinct insiders required for a sell cluster (stricter)
    pub min_bearish_cluster: usize,
    /// Aggregate notional required for a sell cluster (stricter)
    pub min_bearish_cluster_value: f64,
    pub min_ceo_cfo_buy: f64,
    pub min_large_buy: f64,
    pub min_first_buy_12m: f64,
    /// Canonical actor ids with a proven track record
    pub high_conviction_ids: HashSet<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cluster_window_days: 5,
            min_insider_cluster: 3,
            min_cluster_buy_value: 300_000.0,
            legislator_cluster_window_days: 7,
            min_legislator_cluster: 2,
            min_legislator_cluster_value: 0.0,
            min_bearish_cluster: 4,
            min_bearish_cluster_value: 1_000_000.0,
            min_ceo_cfo_buy: 100_000.0,
            min_large_buy: 250_000.0,
            min_first_buy_12m: 50_000.0,
            high_conviction_ids: [
                "nancy-pelosi",
                "josh-gottheimer",
                "ro-khanna",
                "michael-mccaul",
                "tommy-tuberville",
                "markwayne-mullin",
                "dan-crenshaw",
                "brian-higgins",
                "richard-blumenthal",
                "marjorie-taylor-greene",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

pub struct SignalDetector {
    config: DetectorConfig,
}

impl SignalDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(DetectorConfig::default())
    }

    /// Run every detector over a mixed-class trade collection
    pub fn detect_all(&self, trades: &[TradeRecord]) -> Vec<Alert> {
        let insiders: Vec<&TradeRecord> = trades
            .iter()
            .filter(|t| t.actor_type == ActorType::CorporateInsider)
            .collect();
        let legislators: Vec<&TradeRecord> = trades
            .iter()
            .filter(|t| t.actor_type == ActorType::Legislator)
            .collect();

        let mut alerts = Vec::new();
        alerts.extend(self.detect_insider_cluster_buys(&insiders));
        alerts.extend(self.detect_bearish_cluster_sells(&insiders));
        alerts.extend(self.detect_ceo_cfo_buys(&insiders));
        alerts.extend(self.detect_large_single_buys(&insiders));
        alerts.extend(self.detect_first_buys_12m(&insiders));
        alerts.extend(self.detect_strategic_investor_buys(&insiders));
        alerts.extend(self.detect_legislator_cluster_buys(&legislators));
        alerts.extend(self.detect_high_conviction_buys(&legislators));

        log::info!("🎯 Signal detection complete: {} alerts", alerts.len());
        alerts
    }

    /// ≥ N distinct insiders buying the same ticker inside the window
    pub fn detect_insider_cluster_buys(&self, trades: &[&TradeRecord]) -> Vec<Alert> {
        self.detect_clusters(
            trades,
            true,
            self.config.cluster_window_days,
            self.config.min_insider_cluster,
            self.config.min_cluster_buy_value,
            SignalType::ClusterBuy,
        )
    }

    /// Legislator buy clusters: lower actor bar, wider window
    pub fn detect_legislator_cluster_buys(&self, trades: &[&TradeRecord]) -> Vec<Alert> {
        self.detect_clusters(
            trades,
            true,
            self.config.legislator_cluster_window_days,
            self.config.min_legislator_cluster,
            self.config.min_legislator_cluster_value,
            SignalType::ClusterBuy,
        )
    }

    /// Sell clusters with the stricter bearish thresholds
    pub fn detect_bearish_cluster_sells(&self, trades: &[&TradeRecord]) -> Vec<Alert> {
        self.detect_clusters(
            trades,
            false,
            self.config.cluster_window_days,
            self.config.min_bearish_cluster,
            self.config.min_bearish_cluster_value,
            SignalType::BearishClusterSell,
        )
    }

    fn detect_clusters(
        &self,
        trades: &[&TradeRecord],
        buys: bool,
        window_days: i64,
        min_actors: usize,
        min_value: f64,
        signal_type: SignalType,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        // Unvalued trades are invisible to cluster math
        let mut by_ticker: HashMap<&str, Vec<&TradeRecord>> = HashMap::new();
        for trade in trades {
            if trade.is_buy() == buys && trade.notional_value().is_some() {
                by_ticker.entry(trade.ticker.as_str()).or_default().push(*trade);
            }
        }

        for (ticker, mut ticker_trades) in by_ticker {
            ticker_trades.sort_by_key(|t| t.trade_date);

            for anchor in &ticker_trades {
                let window_start = anchor.trade_date - Duration::days(window_days);
                let window_end = anchor.trade_date;

                let window_trades: Vec<&TradeRecord> = ticker_trades
                    .iter()
                    .filter(|t| t.trade_date >= window_start && t.trade_date <= window_end)
                    .copied()
                    .collect();

                let unique_actors: HashSet<&str> =
                    window_trades.iter().map(|t| t.actor_id.as_str()).collect();
                let total_value: f64 = window_trades
                    .iter()
                    .filter_map(|t| t.notional_value())
                    .sum();

                if unique_actors.len() >= min_actors && total_value >= min_value {
                    let mut details = BTreeMap::new();
                    details.insert("num_actors".to_string(), json!(unique_actors.len()));
                    details.insert("total_value".to_string(), json!(total_value));
                    details.insert("window_days".to_string(), json!(window_days));
                    details.insert(
                        "window_start".to_string(),
                        json!(window_start.format("%Y-%m-%d").to_string()),
                    );
                    details.insert(
                        "window_end".to_string(),
                        json!(window_end.format("%Y-%m-%d").to_string()),
                    );
                    if let Some(bipartisan) = bipartisan_flag(&window_trades) {
                        details.insert("bipartisan".to_string(), json!(bipartisan));
                    }

                    alerts.push(Alert::from_trades(
                        signal_type,
                        ticker.to_string(),
                        window_trades.iter().find_map(|t| t.company_name.clone()),
                        window_trades.into_iter().cloned().collect(),
                        details,
                    ));

                    // One alert per ticker per scan
                    break;
                }
            }
        }

        alerts
    }

    /// Any CEO or CFO buying above the threshold
    pub fn detect_ceo_cfo_buys(&self, trades: &[&TradeRecord]) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for trade in trades {
            if !trade.is_buy() {
                continue;
            }
            let title = match trade.normalized_title() {
                Some(t @ ("CEO" | "CFO")) => t,
                _ => continue,
            };
            let value = match trade.notional_value() {
                Some(v) if v >= self.config.min_ceo_cfo_buy => v,
                _ => continue,
            };

            let mut details = BTreeMap::new();
            details.insert("insider".to_string(), json!(trade.actor_name));
            details.insert("title".to_string(), json!(title));
            details.insert("value".to_string(), json!(value));
            details.insert(
                "trade_date".to_string(),
                json!(trade.trade_date.format("%Y-%m-%d").to_string()),
            );

            alerts.push(Alert::from_trades(
                SignalType::CeoCfoBuy,
                trade.ticker.clone(),
                trade.company_name.clone(),
                vec![(*trade).clone()],
                details,
            ));
        }

        alerts
    }

    /// Any single buy above the large-buy threshold
    pub fn detect_large_single_buys(&self, trades: &[&TradeRecord]) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for trade in trades {
            if !trade.is_buy() {
                continue;
            }
            let value = match trade.notional_value() {
                Some(v) if v >= self.config.min_large_buy => v,
                _ => continue,
            };

            let mut details = BTreeMap::new();
            details.insert("insider".to_string(), json!(trade.actor_name));
            details.insert("value".to_string(), json!(value));
            details.insert(
                "trade_date".to_string(),
                json!(trade.trade_date.format("%Y-%m-%d").to_string()),
            );
            if let Some(price) = trade.price {
                details.insert("price".to_string(), json!(price));
            }

            alerts.push(Alert::from_trades(
                SignalType::LargeSingleBuy,
                trade.ticker.clone(),
                trade.company_name.clone(),
                vec![(*trade).clone()],
                details,
            ));
        }

        alerts
    }

    /// First buy by this actor for this ticker in the preceding 12 months
    pub fn detect_first_buys_12m(&self, trades: &[&TradeRecord]) -> Vec<Alert> {
        let mut alerts = Vec::new();

        // History considers every buy on record, valued or not - a prior
        // purchase exists whether or not we can price it
        let mut buy_history: HashMap<(&str, &str), Vec<chrono::NaiveDate>> = HashMap::new();
        for trade in trades {
            if trade.is_buy() {
                buy_history
                    .entry((trade.actor_id.as_str(), trade.ticker.as_str()))
                    .or_default()
                    .push(trade.trade_date);
            }
        }

        for trade in trades {
            if !trade.is_buy() {
                continue;
            }
            let value = match trade.notional_value() {
                Some(v) if v >= self.config.min_first_buy_12m => v,
                _ => continue,
            };

            let lookback_start = trade.trade_date - Duration::days(365);
            let has_prior = buy_history
                .get(&(trade.actor_id.as_str(), trade.ticker.as_str()))
                .map(|dates| {
                    dates
                        .iter()
                        .any(|d| *d >= lookback_start && *d < trade.trade_date)
                })
                .unwrap_or(false);

            if has_prior {
                continue;
            }

            let mut details = BTreeMap::new();
            details.insert("insider".to_string(), json!(trade.actor_name));
            details.insert("value".to_string(), json!(value));
            details.insert(
                "trade_date".to_string(),
                json!(trade.trade_date.format("%Y-%m-%d").to_string()),
            );
            if let Some(title) = trade.normalized_title() {
                details.insert("title".to_string(), json!(title));
            }

            alerts.push(Alert::from_trades(
                SignalType::FirstBuyIn12Months,
                trade.ticker.clone(),
                trade.company_name.clone(),
                vec![(*trade).clone()],
                details,
            ));
        }

        alerts
    }

    /// A corporate entity (not an individual) buying on its own book -
    /// NVIDIA into SERV, Amazon into RIVN. Flagged via the normalizer's
    /// owner_type where present, else by corporate-suffix tokens in the
    /// actor name.
    pub fn detect_strategic_investor_buys(&self, trades: &[&TradeRecord]) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for trade in trades {
            if !trade.is_buy() || !is_entity_actor(trade) {
                continue;
            }

            let mut details = BTreeMap::new();
            details.insert("investor".to_string(), json!(trade.actor_name));
            details.insert(
                "trade_date".to_string(),
                json!(trade.trade_date.format("%Y-%m-%d").to_string()),
            );
            if let Some(value) = trade.notional_value() {
                details.insert("value".to_string(), json!(value));
            }
            if let Some(price) = trade.price {
                details.insert("price".to_string(), json!(price));
            }

            alerts.push(Alert::from_trades(
                SignalType::StrategicInvestorBuy,
                trade.ticker.clone(),
                trade.company_name.clone(),
                vec![(*trade).clone()],
                details,
            ));
        }

        alerts
    }

    /// Any buy by an allow-listed actor, independent of size or clustering
    pub fn detect_high_conviction_buys(&self, trades: &[&TradeRecord]) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for trade in trades {
            if !trade.is_buy() || !self.config.high_conviction_ids.contains(&trade.actor_id) {
                continue;
            }

            let mut details = BTreeMap::new();
            details.insert("actor".to_string(), json!(trade.actor_name));
            details.insert(
                "trade_date".to_string(),
                json!(trade.trade_date.format("%Y-%m-%d").to_string()),
            );
            if let Some(ref size) = trade.size_range {
                details.insert("size_range".to_string(), json!(size));
            }

            alerts.push(Alert::from_trades(
                SignalType::HighConvictionBuy,
                trade.ticker.clone(),
                trade.company_name.clone(),
                vec![(*trade).clone()],
                details,
            ));
        }

        alerts
    }
}

const CORPORATE_TOKENS: [&str; 12] = [
    "Corp", "Corporation", "Inc", "Incorporated", "LLC", "Ltd", "Holdings", "Partners",
    "Capital", "Ventures", "Fund", "Trust",
];

fn is_entity_actor(trade: &TradeRecord) -> bool {
    if let Some(owner_type) = trade.owner_type.as_deref() {
        let o = owner_type.to_lowercase();
        if o == "entity" || o == "corporation" || o == "company" {
            return true;
        }
    }

    trade
        .actor_name
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| c == ',' || c == '.'))
        .any(|word| CORPORATE_TOKENS.contains(&word))
}

/// Some(true/false) when party data is present in the window, None otherwise
fn bipartisan_flag(trades: &[&TradeRecord]) -> Option<bool> {
    let parties: HashSet<_> = trades
        .iter()
        .filter_map(|t| t.party.as_deref())
        .filter_map(major_party)
        .collect();

    if parties.is_empty() {
        None
    } else {
        Some(parties.len() == 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal_core::record::TradeDirection;
    use chrono::NaiveDate;

    fn insider_trade(
        actor_id: &str,
        ticker: &str,
        direction: TradeDirection,
        value: Option<f64>,
        day: u32,
    ) -> TradeRecord {
        TradeRecord {
            actor_type: ActorType::CorporateInsider,
            actor_id: actor_id.to_string(),
            actor_name: actor_id.to_uppercase(),
            party: None,
            chamber: None,
            state: None,
            ticker: ticker.to_string(),
            company_name: Some(format!("{} Inc", ticker)),
            direction,
            size_range: None,
            value,
            price: None,
            trade_date: NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
            disclosure_date: None,
            title: None,
            owner_type: None,
        }
    }

    fn legislator_trade(actor_id: &str, party: &str, ticker: &str, day: u32) -> TradeRecord {
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

    fn refs(trades: &[TradeRecord]) -> Vec<&TradeRecord> {
        trades.iter().collect()
    }

    #[test]
    fn test_cluster_fires_at_exact_minimum() {
        let detector = SignalDetector::with_defaults();

        // Exactly 3 distinct insiders, total $300K - both thresholds met
        let trades = vec![
            insider_trade("a", "NVDA", TradeDirection::Buy, Some(100_000.0), 1),
            insider_trade("b", "NVDA", TradeDirection::Buy, Some(100_000.0), 2),
            insider_trade("c", "NVDA", TradeDirection::Buy, Some(100_000.0), 3),
        ];

        let alerts = detector.detect_insider_cluster_buys(&refs(&trades));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].signal_type, SignalType::ClusterBuy);
        assert_eq!(alerts[0].details["num_actors"], json!(3));
    }

    #[test]
    fn test_cluster_silent_below_minimum_actors() {
        let detector = SignalDetector::with_defaults();

        // 2 distinct insiders (min is 3), value well above the bar
        let trades = vec![
            insider_trade("a", "NVDA", TradeDirection::Buy, Some(500_000.0), 1),
            insider_trade("b", "NVDA", TradeDirection::Buy, Some(500_000.0), 2),
            insider_trade("a", "NVDA", TradeDirection::Buy, Some(500_000.0), 3),
        ];

        let alerts = detector.detect_insider_cluster_buys(&refs(&trades));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_cluster_silent_below_minimum_value() {
        let detector = SignalDetector::with_defaults();

        let trades = vec![
            insider_trade("a", "NVDA", TradeDirection::Buy, Some(50_000.0), 1),
            insider_trade("b", "NVDA", TradeDirection::Buy, Some(50_000.0), 2),
            insider_trade("c", "NVDA", TradeDirection::Buy, Some(50_000.0), 3),
        ];

        let alerts = detector.detect_insider_cluster_buys(&refs(&trades));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_cluster_window_excludes_stale_trades() {
        let detector = SignalDetector::with_defaults();

        // Third insider trades 20 days after the first two - outside window
        let trades = vec![
            insider_trade("a", "NVDA", TradeDirection::Buy, Some(200_000.0), 1),
            insider_trade("b", "NVDA", TradeDirection::Buy, Some(200_000.0), 2),
            insider_trade("c", "NVDA", TradeDirection::Buy, Some(200_000.0), 22),
        ];

        let alerts = detector.detect_insider_cluster_buys(&refs(&trades));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_unvalued_trade_invisible_to_cluster() {
        let detector = SignalDetector::with_defaults();

        // Third insider has no resolvable notional: not counted toward the
        // actor tally, not summed
        let trades = vec![
            insider_trade("a", "NVDA", TradeDirection::Buy, Some(200_000.0), 1),
            insider_trade("b", "NVDA", TradeDirection::Buy, Some(200_000.0), 2),
            insider_trade("c", "NVDA", TradeDirection::Buy, None, 3),
        ];

        let alerts = detector.detect_insider_cluster_buys(&refs(&trades));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_legislator_cluster_fires_at_two() {
        let detector = SignalDetector::with_defaults();

        let trades = vec![
            legislator_trade("jane-doe", "Democratic", "NVDA", 1),
            legislator_trade("john-roe", "Republican", "NVDA", 4),
        ];

        let alerts = detector.detect_legislator_cluster_buys(&refs(&trades));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].details["bipartisan"], json!(true));
    }

    #[test]
    fn test_same_party_cluster_not_bipartisan() {
        let detector = SignalDetector::with_defaults();

        let trades = vec![
            legislator_trade("jane-doe", "Democratic", "NVDA", 1),
            legislator_trade("mary-moe", "Democratic", "NVDA", 3),
        ];

        let alerts = detector.detect_legislator_cluster_buys(&refs(&trades));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].details["bipartisan"], json!(false));
    }

    #[test]
    fn test_bearish_cluster_needs_stricter_thresholds() {
        let detector = SignalDetector::with_defaults();

        // 3 sellers, $1.2M total - enough for a buy cluster, not a sell one
        let trades = vec![
            insider_trade("a", "NVDA", TradeDirection::Sell, Some(400_000.0), 1),
            insider_trade("b", "NVDA", TradeDirection::Sell, Some(400_000.0), 2),
            insider_trade("c", "NVDA", TradeDirection::Sell, Some(400_000.0), 3),
        ];
        assert!(detector.detect_bearish_cluster_sells(&refs(&trades)).is_empty());

        // Fourth distinct seller tips it over
        let mut trades = trades;
        trades.push(insider_trade("d", "NVDA", TradeDirection::Sell, Some(400_000.0), 4));
        let alerts = detector.detect_bearish_cluster_sells(&refs(&trades));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].signal_type, SignalType::BearishClusterSell);
    }

    #[test]
    fn test_ceo_cfo_buy_normalizes_title() {
        let detector = SignalDetector::with_defaults();

        let mut ceo = insider_trade("a", "NVDA", TradeDirection::Buy, Some(150_000.0), 1);
        ceo.title = Some("Chief Executive Officer".to_string());
        let mut evp = insider_trade("b", "NVDA", TradeDirection::Buy, Some(150_000.0), 1);
        evp.title = Some("EVP Engineering".to_string());
        let mut small_cfo = insider_trade("c", "NVDA", TradeDirection::Buy, Some(50_000.0), 1);
        small_cfo.title = Some("CFO".to_string());

        let trades = vec![ceo, evp, small_cfo];
        let alerts = detector.detect_ceo_cfo_buys(&refs(&trades));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].details["title"], json!("CEO"));
    }

    #[test]
    fn test_large_single_buy_threshold() {
        let detector = SignalDetector::with_defaults();

        let trades = vec![
            insider_trade("a", "NVDA", TradeDirection::Buy, Some(250_000.0), 1),
            insider_trade("b", "NVDA", TradeDirection::Buy, Some(249_999.0), 1),
            insider_trade("c", "NVDA", TradeDirection::Sell, Some(900_000.0), 1),
        ];

        let alerts = detector.detect_large_single_buys(&refs(&trades));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].evidence[0].actor_id, "a");
    }

    #[test]
    fn test_first_buy_12m_respects_lookback() {
        let detector = SignalDetector::with_defaults();

        // Prior buy 13 months back does not suppress; 11 months back does
        let fresh = TradeRecord {
            trade_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            ..insider_trade("a", "NVDA", TradeDirection::Buy, Some(60_000.0), 1)
        };
        let stale_prior = TradeRecord {
            trade_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            ..insider_trade("a", "NVDA", TradeDirection::Buy, Some(10_000.0), 1)
        };

        let trades = vec![stale_prior.clone(), fresh.clone()];
        let alerts = detector.detect_first_buys_12m(&refs(&trades));
        // stale_prior is itself a first buy but below threshold ($10K)
        assert_eq!(alerts.len(), 1);
        assert_eq!(
            alerts[0].evidence[0].trade_date,
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
        );

        let recent_prior = TradeRecord {
            trade_date: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            ..stale_prior
        };
        let trades = vec![recent_prior, fresh];
        let alerts = detector.detect_first_buys_12m(&refs(&trades));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_strategic_investor_detected_by_owner_type_or_name() {
        let detector = SignalDetector::with_defaults();

        let mut by_owner_type = insider_trade("ent-1", "SERV", TradeDirection::Buy, Some(5_000_000.0), 1);
        by_owner_type.actor_name = "Nvidia".to_string();
        by_owner_type.owner_type = Some("Entity".to_string());

        let mut by_name = insider_trade("ent-2", "RIVN", TradeDirection::Buy, Some(1_000_000.0), 2);
        by_name.actor_name = "Amazon Holdings LLC".to_string();

        let individual = insider_trade("a", "NVDA", TradeDirection::Buy, Some(1_000_000.0), 3);

        let trades = vec![by_owner_type, by_name, individual];
        let alerts = detector.detect_strategic_investor_buys(&refs(&trades));

        assert_eq!(alerts.len(), 2);
        let tickers: Vec<&str> = alerts.iter().map(|a| a.ticker.as_str()).collect();
        assert!(tickers.contains(&"SERV"));
        assert!(tickers.contains(&"RIVN"));
        assert_eq!(alerts[0].signal_type, SignalType::StrategicInvestorBuy);
    }

    #[test]
    fn test_high_conviction_matches_canonical_id() {
        let detector = SignalDetector::with_defaults();

        let listed = legislator_trade("nancy-pelosi", "Democratic", "NVDA", 1);
        // Same display name, different canonical id - must not match
        let mut impostor = legislator_trade("nancy-pelosi-2", "Democratic", "NVDA", 2);
        impostor.actor_name = "NANCY-PELOSI".to_string();

        let trades = vec![listed, impostor];
        let alerts = detector.detect_high_conviction_buys(&refs(&trades));

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].evidence[0].actor_id, "nancy-pelosi");
        assert_eq!(alerts[0].signal_type, SignalType::HighConvictionBuy);
    }

    #[test]
    fn test_detect_all_routes_by_actor_class() {
        let detector = SignalDetector::with_defaults();

        let trades = vec![
            // Insider cluster on NVDA
            insider_trade("a", "NVDA", TradeDirection::Buy, Some(200_000.0), 1),
            insider_trade("b", "NVDA", TradeDirection::Buy, Some(200_000.0), 2),
            insider_trade("c", "NVDA", TradeDirection::Buy, Some(200_000.0), 3),
            // Legislator pair on AAPL
            legislator_trade("jane-doe", "Democratic", "AAPL", 1),
            legislator_trade("john-roe", "Republican", "AAPL", 2),
        ];

        let alerts = detector.detect_all(&trades);

        let tickers: Vec<(&SignalType, &str)> = alerts
            .iter()
            .map(|a| (&a.signal_type, a.ticker.as_str()))
            .collect();
        assert!(tickers.contains(&(&SignalType::ClusterBuy, "NVDA")));
        assert!(tickers.contains(&(&SignalType::ClusterBuy, "AAPL")));
        // Legislator trades never feed insider-only detectors
        assert!(!alerts
            .iter()
            .any(|a| a.signal_type == SignalType::FirstBuyIn12Months && a.ticker == "AAPL"));
    }
}
