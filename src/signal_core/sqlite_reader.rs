//! SQLite trade-log reader
//!
//! The normalizer (external collaborator) writes disclosures into the
//! `trades` and `fund_holdings` tables; this reader pulls a full ordered
//! snapshot for one run. Every run recomputes from the log, so the reader
//! has no cursor state - it opens read-only and hands back everything.
//!
//! A failure to open or read the log is the one fatal condition in the
//! system; every other malformed row is skipped with a debug log.

use super::funds::FundHolding;
use super::record::{ActorType, TradeDirection, TradeRecord};
use crate::sqlite_pragma::apply_optimized_pragmas;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;

#[derive(Debug)]
pub enum ReaderError {
    Database(rusqlite::Error),
    InvalidActorType(String),
    InvalidDirection(String),
    InvalidDate(String),
}

impl From<rusqlite::Error> for ReaderError {
    fn from(err: rusqlite::Error) -> Self {
        ReaderError::Database(err)
    }
}

impl std::fmt::Display for ReaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReaderError::Database(e) => write!(f, "Database error: {}", e),
            ReaderError::InvalidActorType(a) => write!(f, "Invalid actor type: {}", a),
            ReaderError::InvalidDirection(d) => write!(f, "Invalid direction: {}", d),
            ReaderError::InvalidDate(d) => write!(f, "Invalid date: {}", d),
        }
    }
}

impl std::error::Error for ReaderError {}

/// Read-only snapshot reader over the persisted trade log
pub struct TradeLogReader {
    conn: Connection,
}

impl TradeLogReader {
    /// Open the trade log read-only with the shared PRAGMA tuning
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, ReaderError> {
        let conn = Connection::open(db_path)?;

        apply_optimized_pragmas(&conn).map_err(ReaderError::Database)?;

        // Read-only mode prevents write locks against the normalizer
        conn.execute("PRAGMA query_only = ON", [])?;

        let trade_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM trades", [], |row| row.get(0))?;
        log::info!("📥 Trade log opened: {} trades on record", trade_count);

        Ok(Self { conn })
    }

    /// Read all trades ordered by trade date ascending
    ///
    /// Rows whose enum/date columns fail to decode are skipped and counted,
    /// not fatal - the normalizer owns row hygiene, we own not letting one
    /// bad row stop the batch.
    pub fn read_trades(&self) -> Result<Vec<TradeRecord>, ReaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT actor_type, actor_id, actor_name, party, chamber, state,
                    ticker, company_name, direction, size_range, value, price,
                    trade_date, disclosure_date, title, owner_type
             FROM trades
             ORDER BY trade_date ASC, id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(RawTradeRow {
                actor_type: row.get(0)?,
                actor_id: row.get(1)?,
                actor_name: row.get(2)?,
                party: row.get(3)?,
                chamber: row.get(4)?,
                state: row.get(5)?,
                ticker: row.get(6)?,
                company_name: row.get(7)?,
                direction: row.get(8)?,
                size_range: row.get(9)?,
                value: row.get(10)?,
                price: row.get(11)?,
                trade_date: row.get(12)?,
                disclosure_date: row.get(13)?,
                title: row.get(14)?,
                owner_type: row.get(15)?,
            })
        })?;

        let mut trades = Vec::new();
        let mut skipped = 0usize;

        for row in rows {
            let raw = row?;
            match raw.into_record() {
                Ok(trade) => trades.push(trade),
                Err(e) => {
                    log::debug!("Skipping malformed trade row: {}", e);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            log::warn!("⚠️  Skipped {} malformed trade rows", skipped);
        }
        log::debug!("📥 Read {} trades from log", trades.len());

        Ok(trades)
    }

    /// Read all fund holdings across recorded quarters
    pub fn read_fund_holdings(&self) -> Result<Vec<FundHolding>, ReaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT manager_id, manager_name, ticker, company_name,
                    shares, portfolio_pct, value_usd, quarter, snapshot_date
             FROM fund_holdings
             ORDER BY quarter ASC, manager_id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                FundHolding {
                    manager_id: row.get(0)?,
                    manager_name: row.get(1)?,
                    ticker: row.get(2)?,
                    company_name: row.get(3)?,
                    shares: row.get(4)?,
                    portfolio_pct: row.get(5)?,
                    value_usd: row.get(6)?,
                    quarter: row.get(7)?,
                    snapshot_date: None,
                },
                row.get::<_, Option<String>>(8)?,
            ))
        })?;

        let mut holdings = Vec::new();
        let mut skipped = 0usize;

        for row in rows {
            let (mut holding, snapshot_date) = row?;
            match parse_opt_date(snapshot_date) {
                Ok(date) => {
                    holding.snapshot_date = date;
                    holdings.push(holding);
                }
                Err(e) => {
                    log::debug!("Skipping fund holding with bad snapshot date: {}", e);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            log::warn!("⚠️  Skipped {} malformed fund holding rows", skipped);
        }
        log::debug!("📥 Read {} fund holdings from log", holdings.len());

        Ok(holdings)
    }
}

/// Raw row as stored; decoded into the normalized record in a second step
/// so a bad enum value skips one row instead of poisoning the statement.
struct RawTradeRow {
    actor_type: String,
    actor_id: String,
    actor_name: String,
    party: Option<String>,
    chamber: Option<String>,
    state: Option<String>,
    ticker: String,
    company_name: Option<String>,
    direction: String,
    size_range: Option<String>,
    value: Option<f64>,
    price: Option<f64>,
    trade_date: String,
    disclosure_date: Option<String>,
    title: Option<String>,
    owner_type: Option<String>,
}

impl RawTradeRow {
    fn into_record(self) -> Result<TradeRecord, ReaderError> {
        let actor_type = ActorType::from_str(&self.actor_type)
            .ok_or(ReaderError::InvalidActorType(self.actor_type))?;
        let direction = TradeDirection::from_str(&self.direction)
            .ok_or(ReaderError::InvalidDirection(self.direction))?;
        let trade_date = parse_date(&self.trade_date)?;
        let disclosure_date = parse_opt_date(self.disclosure_date)?;

        // A disclosure can only follow the trade it discloses
        if let Some(d) = disclosure_date {
            if d < trade_date {
                return Err(ReaderError::InvalidDate(format!(
                    "disclosure {} precedes trade {}",
                    d, trade_date
                )));
            }
        }

        Ok(TradeRecord {
            actor_type,
            actor_id: self.actor_id,
            actor_name: self.actor_name,
            party: self.party,
            chamber: self.chamber,
            state: self.state,
            ticker: self.ticker,
            company_name: self.company_name,
            direction,
            size_range: self.size_range,
            value: self.value,
            price: self.price,
            trade_date,
            disclosure_date,
            title: self.title,
            owner_type: self.owner_type,
        })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ReaderError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ReaderError::InvalidDate(s.to_string()))
}

fn parse_opt_date(s: Option<String>) -> Result<Option<NaiveDate>, ReaderError> {
    match s {
        Some(s) if !s.is_empty() => parse_date(&s).map(Some),
        _ => Ok(None),
    }
}


#[cfg(test)]
mod tests {
    use super::test_db::{create_schema, insert_holding, insert_trade};
    use super::*;
    use tempfile::tempdir;

    fn setup_test_db() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let conn = Connection::open(&db_path).unwrap();
        create_schema(&conn);

        (dir, db_path)
    }

    #[test]
    fn test_read_trades_ordered_by_date() {
        let (_dir, db_path) = setup_test_db();
        let conn = Connection::open(&db_path).unwrap();

        insert_trade(
            &conn,
            "LEGISLATOR",
            "jane-doe",
            "Jane Doe",
            "NVDA",
            "BUY",
            Some("15K-50K"),
            None,
            "2025-10-20",
        );
        insert_trade(
            &conn,
            "CORPORATE_INSIDER",
            "ins-1",
            "Sam Smith",
            "NVDA",
            "BUY",
            None,
            Some(250_000.0),
            "2025-10-08",
        );
        drop(conn);

        let reader = TradeLogReader::open(&db_path).unwrap();
        let trades = reader.read_trades().unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].actor_id, "ins-1");
        assert_eq!(trades[0].actor_type, ActorType::CorporateInsider);
        assert_eq!(trades[1].actor_id, "jane-doe");
        assert_eq!(trades[1].size_range.as_deref(), Some("15K-50K"));
    }

    #[test]
    fn test_malformed_rows_skipped_not_fatal() {
        let (_dir, db_path) = setup_test_db();
        let conn = Connection::open(&db_path).unwrap();

        insert_trade(
            &conn,
            "LEGISLATOR",
            "jane-doe",
            "Jane Doe",
            "NVDA",
            "BUY",
            Some("15K-50K"),
            None,
            "2025-10-20",
        );
        // Unknown direction and garbage date, one each
        insert_trade(
            &conn, "LEGISLATOR", "p2", "P Two", "NVDA", "EXCHANGE", None, None, "2025-10-21",
        );
        insert_trade(
            &conn, "LEGISLATOR", "p3", "P Three", "NVDA", "BUY", None, None, "soon",
        );
        drop(conn);

        let reader = TradeLogReader::open(&db_path).unwrap();
        let trades = reader.read_trades().unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].actor_id, "jane-doe");
    }

    #[test]
    fn test_disclosure_before_trade_is_malformed() {
        let (_dir, db_path) = setup_test_db();
        let conn = Connection::open(&db_path).unwrap();

        conn.execute(
            "INSERT INTO trades (actor_type, actor_id, actor_name, ticker,
                                 direction, trade_date, disclosure_date)
             VALUES ('LEGISLATOR', 'p1', 'P One', 'NVDA', 'BUY',
                     '2025-10-20', '2025-10-01')",
            [],
        )
        .unwrap();
        drop(conn);

        let reader = TradeLogReader::open(&db_path).unwrap();
        assert!(reader.read_trades().unwrap().is_empty());
    }

    #[test]
    fn test_read_fund_holdings() {
        let (_dir, db_path) = setup_test_db();
        let conn = Connection::open(&db_path).unwrap();

        insert_holding(&conn, "BRK", "Warren Buffett", "NVDA", 1_000.0, "Q2 2025", None);
        insert_holding(
            &conn,
            "BRK",
            "Warren Buffett",
            "NVDA",
            2_000.0,
            "Q3 2025",
            Some("2025-09-30"),
        );
        drop(conn);

        let reader = TradeLogReader::open(&db_path).unwrap();
        let holdings = reader.read_fund_holdings().unwrap();

        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].quarter, "Q2 2025");
        assert!(holdings[0].snapshot_date.is_none());
        assert_eq!(
            holdings[1].snapshot_date,
            Some(NaiveDate::from_ymd_opt(2025, 9, 30).unwrap())
        );
    }

    #[test]
    fn test_open_missing_parent_is_fatal() {
        let result = TradeLogReader::open("/nonexistent/dir/alphaflow.db");
        assert!(result.is_err());
    }

    #[test]
    fn test_read_only_mode() {
        let (_dir, db_path) = setup_test_db();

        let reader = TradeLogReader::open(&db_path).unwrap();

        let result = reader.conn.execute(
            "INSERT INTO trades (actor_type, actor_id, actor_name, ticker,
                                 direction, trade_date)
             VALUES ('LEGISLATOR', 'x', 'X', 'TST', 'BUY', '2025-01-01')",
            [],
        );

        assert!(result.is_err());
    }
}
