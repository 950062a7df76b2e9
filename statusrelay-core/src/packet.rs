//! Translation of a status snapshot into Zabbix sender records.

use crate::collector::StatusSnapshot;
use serde::{Deserialize, Serialize};

/// Request type string identifying a trapper submission.
pub const SENDER_REQUEST: &str = "sender data";

/// A single trapper item value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Host name as configured in the Zabbix frontend
    pub host: String,
    /// Item key
    pub key: String,
    /// Raw value, passed through untouched
    pub value: String,
    /// Unix timestamp in seconds, shared by the whole batch
    pub clock: i64,
}

impl MetricRecord {
    /// Creates a record.
    pub fn new(
        host: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        clock: i64,
    ) -> Self {
        Self {
            host: host.into(),
            key: key.into(),
            value: value.into(),
            clock,
        }
    }
}

/// Builds one record per snapshot entry, in metric-key order.
///
/// The snapshot is consumed; its values move into the records.
pub fn build_records(host: &str, snapshot: StatusSnapshot, clock: i64) -> Vec<MetricRecord> {
    snapshot
        .into_iter()
        .map(|(key, value)| MetricRecord {
            host: host.to_string(),
            key,
            value,
            clock,
        })
        .collect()
}

/// JSON body of a sender request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderPacket {
    /// Always [`SENDER_REQUEST`]
    pub request: String,
    /// Item values in the batch
    pub data: Vec<MetricRecord>,
    /// Packet-level clock; the server uses it to correct for clock skew.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<i64>,
}

impl SenderPacket {
    /// Wraps records in a `sender data` request stamped with `clock`.
    pub fn new(data: Vec<MetricRecord>, clock: i64) -> Self {
        Self {
            request: SENDER_REQUEST.to_string(),
            data,
            clock: Some(clock),
        }
    }
}
