//! Signal Core - Conviction-Signal Engine
//!
//! Computational core over normalized trade disclosures from three actor
//! classes: corporate insiders, legislators, and institutional funds.
//!
//! # Architecture
//!
//! ```text
//! SQLite trade log → TradeLogReader
//!     ↓                        ↓
//! PositionLedger          SignalDetector (clusters, CEO/CFO, large,
//!     ↓                        ↓          first-buy, high-conviction)
//! P&L Calculator           FundActivity (quarter-over-quarter 13F)
//! (valuation lookups)          ↓
//!                     CrossSourceCorrelator + ConvergenceScorer
//!                              ↓
//!                  Alert (content-hash id) → SeenAlertStore → AlertWriter
//! ```

pub mod alert;
pub mod alert_writer;
pub mod correlator;
pub mod detector;
pub mod engine;
pub mod funds;
pub mod ledger;
pub mod pnl;
pub mod record;
pub mod scorer;
pub mod seen_store;
pub mod sqlite_reader;
pub mod valuation;

pub use alert::{Alert, SignalType};
pub use alert_writer::AlertWriter;
pub use correlator::{ConvergenceReport, CrossSourceCorrelator};
pub use detector::{DetectorConfig, SignalDetector};
pub use engine::run_signal_scan;
pub use funds::{detect_fund_activity, FundActivity, FundActivitySignal, FundHolding, QuarterLabel};
pub use ledger::{Position, PositionLedger};
pub use pnl::{compute_pnl, summarize_by_actor, ActorPnLSummary, PnLResult, PositionStatus};
pub use record::{ActorType, TradeDirection, TradeRecord};
pub use scorer::{ConvergenceScorer, EvidenceSource, TimelinePoint};
pub use seen_store::SeenAlertStore;
pub use sqlite_reader::{ReaderError, TradeLogReader};
pub use valuation::{PriceSource, StaticPriceSource, YahooPriceSource};
