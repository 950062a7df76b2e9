//! One collect → build → send cycle.
//!
//! Stages run strictly in sequence and the first error ends the cycle: a
//! failed collection never reaches the sink, and a failed send is returned
//! as-is rather than reported as a partial success.

use crate::{
    Result,
    catalog::MetricCatalog,
    collector::{self, StatusSource, StatusView},
    packet::build_records,
    protocol::Acknowledgement,
    sender::MetricSink,
};
use tracing::{info, warn};

/// Per-cycle inputs besides the two endpoints.
#[derive(Debug, Clone)]
pub struct CycleOptions {
    /// Zabbix host name the metrics are attributed to
    pub host: String,
    /// Status view to query
    pub view: StatusView,
    /// Batch timestamp, Unix seconds
    pub clock: i64,
}

impl CycleOptions {
    /// Options stamped with the current time.
    pub fn now(host: impl Into<String>, view: StatusView) -> Self {
        Self {
            host: host.into(),
            view,
            clock: chrono::Utc::now().timestamp(),
        }
    }
}

/// Outcome of a successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Number of records sent
    pub sent: usize,
    /// What the server reported
    pub acknowledgement: Acknowledgement,
}

/// Collects status from `source` and delivers it to `sink`.
///
/// # Errors
/// Returns the first error from collection or delivery.
pub async fn run_cycle<S, K>(
    source: &S,
    sink: &K,
    catalog: &MetricCatalog,
    options: &CycleOptions,
) -> Result<CycleReport>
where
    S: StatusSource + ?Sized,
    K: MetricSink + ?Sized,
{
    let snapshot = collector::collect(source, catalog, options.view).await?;
    let records = build_records(&options.host, snapshot, options.clock);

    let acknowledgement = sink.send(&records).await?;

    match &acknowledgement.summary {
        Some(summary) if summary.failed > 0 => warn!(
            "Server accepted the packet but failed {} of {} items ({})",
            summary.failed, summary.total, acknowledgement.info
        ),
        _ => info!("Server acknowledged: {}", acknowledgement.info),
    }

    Ok(CycleReport {
        sent: records.len(),
        acknowledgement,
    })
}
