//! alphaflow - conviction-signal engine over informed-actor trade disclosures
//!
//! Ingests normalized trade disclosures from three actor classes (corporate
//! insiders, legislators, institutional funds), rebuilds per-actor position
//! ledgers, attributes P&L, and derives conviction alerts: buy/sell clusters,
//! high-conviction actor matches, and cross-source Trinity/convergence
//! signals.
//!
//! Scraping, storage schema management, scheduling, and notification delivery
//! live outside this crate; the binaries here read the persisted trade log,
//! compute, and emit.

pub mod config;
pub mod signal_core;
pub mod sqlite_pragma;
