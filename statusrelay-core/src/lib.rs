//! Core pipeline for relaying MySQL status counters to Zabbix.
//!
//! A relay cycle is three stages run in sequence:
//! - **collect**: one `SHOW GLOBAL STATUS` style query restricted to the
//!   counters named in a [`MetricCatalog`], translated into a
//!   [`StatusSnapshot`]
//! - **build**: one [`MetricRecord`] per snapshot entry, stamped with a shared
//!   host name and clock
//! - **send**: a framed `sender data` request to a Zabbix server, with the
//!   server's response checked for success
//!
//! The database and the Zabbix server sit behind the [`StatusSource`] and
//! [`MetricSink`] traits, so each stage can be tested without either.
//!
//! # Guarantees
//! - Nothing is sent unless collection fully succeeded
//! - A server-side rejection is reported distinctly from a network failure
//! - Database passwords never appear in logs, `Debug` output or errors
//! - No function in this crate exits the process

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::arithmetic_side_effects,
        clippy::uninlined_format_args
    )
)]

pub mod catalog;
pub mod collector;
pub mod config;
pub mod error;
pub mod logging;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod packet;
pub mod pipeline;
pub mod protocol;
pub mod security;
pub mod sender;

// Re-export commonly used types
pub use catalog::MetricCatalog;
pub use collector::{StatusRow, StatusSnapshot, StatusSource, StatusView, collect};
pub use config::{DatabaseConfig, SenderConfig};
pub use error::{RelayError, Result};
pub use logging::init_logging;
pub use packet::{MetricRecord, SenderPacket, build_records};
pub use pipeline::{CycleOptions, CycleReport, run_cycle};
pub use protocol::{Acknowledgement, SubmissionSummary};
pub use sender::{MetricSink, ZabbixSender};
