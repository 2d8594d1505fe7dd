//! Market valuation lookups
//!
//! Prices come from the Yahoo Finance chart API: the latest regular-market
//! price for open positions and daily closes around a target date for
//! trades disclosed without a price. Lookups are synchronous from the
//! batch's point of view - awaited one at a time - and rate-limited with an
//! enforced minimum spacing between requests plus an extended sleep when
//! the upstream answers 429.
//!
//! A failed lookup resolves to None for that ticker only; it never aborts
//! the batch and is never reported as $0. The cache inside a source lives
//! for one run and is not authoritative across runs.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveTime};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::{sleep, Instant};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) alphaflow/0.1";

/// Price lookups for the ledger and the P&L calculator
///
/// `&mut self` because implementations cache within a run.
#[async_trait]
pub trait PriceSource: Send {
    /// Latest market price for a ticker, None when unavailable
    async fn current_price(&mut self, ticker: &str) -> Option<f64>;

    /// Daily close nearest to `date`, None when unavailable
    async fn historical_price(&mut self, ticker: &str, date: NaiveDate) -> Option<f64>;
}

/// Yahoo chart API price source with a run-scoped cache
pub struct YahooPriceSource {
    client: reqwest::Client,
    min_interval: Duration,
    backoff: Duration,
    last_request: Option<Instant>,
    current_cache: HashMap<String, Option<f64>>,
    historical_cache: HashMap<(String, NaiveDate), Option<f64>>,
}

impl YahooPriceSource {
    pub fn new(
        min_interval: Duration,
        backoff: Duration,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            min_interval,
            backoff,
            last_request: None,
            current_cache: HashMap::new(),
            historical_cache: HashMap::new(),
        })
    }

    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(
            Duration::from_millis(500),
            Duration::from_secs(60),
            Duration::from_secs(10),
        )
    }

    /// Enforce the minimum spacing between upstream requests
    async fn throttle(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    async fn fetch_chart(&mut self, url: &str) -> Option<ChartResult> {
        self.throttle().await;

        let response = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                log::debug!("Valuation request failed: {}", e);
                return None;
            }
        };

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            log::warn!(
                "⏳ Valuation upstream rate-limited, backing off {}s",
                self.backoff.as_secs()
            );
            sleep(self.backoff).await;
            return None;
        }

        if !response.status().is_success() {
            log::debug!("Valuation upstream returned {}", response.status());
            return None;
        }

        let parsed: ChartResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                log::debug!("Valuation response parse failed: {}", e);
                return None;
            }
        };

        parsed.chart.result.and_then(|mut r| {
            if r.is_empty() {
                None
            } else {
                Some(r.remove(0))
            }
        })
    }
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    async fn current_price(&mut self, ticker: &str) -> Option<f64> {
        if let Some(cached) = self.current_cache.get(ticker) {
            return *cached;
        }

        let url = format!("{}/{}?range=5d&interval=1d", CHART_URL, ticker);
        let price = self.fetch_chart(&url).await.and_then(|result| {
            result
                .meta
                .regular_market_price
                .or_else(|| result.last_close())
        });

        if price.is_none() {
            log::debug!("No current price available for {}", ticker);
        }

        // Misses are cached too - one unavailable ticker should not be
        // retried for every position in the batch
        self.current_cache.insert(ticker.to_string(), price);
        price
    }

    async fn historical_price(&mut self, ticker: &str, date: NaiveDate) -> Option<f64> {
        let key = (ticker.to_string(), date);
        if let Some(cached) = self.historical_cache.get(&key) {
            return *cached;
        }

        // A few days either side to cover weekends and market holidays
        let period1 = to_unix(date - ChronoDuration::days(5));
        let period2 = to_unix(date + ChronoDuration::days(2));
        let url = format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            CHART_URL, ticker, period1, period2
        );

        let price = self
            .fetch_chart(&url)
            .await
            .and_then(|result| result.close_nearest(date));

        if price.is_none() {
            log::debug!("No historical price for {} on {}", ticker, date);
        }

        self.historical_cache.insert(key, price);
        price
    }
}

fn to_unix(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

impl ChartResult {
    fn last_close(&self) -> Option<f64> {
        self.indicators
            .quote
            .first()?
            .close
            .as_ref()?
            .iter()
            .rev()
            .find_map(|c| *c)
    }

    /// Close whose bar date is nearest to the target date
    fn close_nearest(&self, date: NaiveDate) -> Option<f64> {
        let timestamps = self.timestamp.as_ref()?;
        let closes = self.indicators.quote.first()?.close.as_ref()?;

        timestamps
            .iter()
            .zip(closes.iter())
            .filter_map(|(ts, close)| {
                let close = (*close)?;
                let bar_date = chrono::DateTime::from_timestamp(*ts, 0)?.date_naive();
                let distance = (bar_date - date).num_days().abs();
                Some((distance, close))
            })
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, close)| close)
    }
}

/// Fixed in-memory price source for tests and offline runs
#[derive(Debug, Default)]
pub struct StaticPriceSource {
    current: HashMap<String, f64>,
    historical: HashMap<(String, NaiveDate), f64>,
    /// Fallback close used for any (ticker, date) not explicitly set
    flat_history: Option<f64>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current(&mut self, ticker: &str, price: f64) -> &mut Self {
        self.current.insert(ticker.to_string(), price);
        self
    }

    pub fn set_historical(&mut self, ticker: &str, date: NaiveDate, price: f64) -> &mut Self {
        self.historical.insert((ticker.to_string(), date), price);
        self
    }

    pub fn set_flat_history(&mut self, price: f64) -> &mut Self {
        self.flat_history = Some(price);
        self
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn current_price(&mut self, ticker: &str) -> Option<f64> {
        self.current.get(ticker).copied()
    }

    async fn historical_price(&mut self, ticker: &str, date: NaiveDate) -> Option<f64> {
        self.historical
            .get(&(ticker.to_string(), date))
            .copied()
            .or(self.flat_history)
    }
}
