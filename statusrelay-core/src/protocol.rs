//! Zabbix sender protocol framing.
//!
//! Every message, request or response, is laid out as:
//!
//! ```text
//! +------+-------+----------------------+------------------+
//! | ZBXD | flags | data length (8 B LE) | JSON payload ... |
//! +------+-------+----------------------+------------------+
//!   4 B    1 B
//! ```
//!
//! The length field is the 4-byte payload length followed by a 4-byte
//! reserved field, which is zero unless compression is in use. Only the
//! plain protocol flag (`0x01`) is produced or accepted here; compressed and
//! large-packet frames are refused.

use crate::{Result, error::RelayError, packet::SenderPacket};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Frame magic.
pub const MAGIC: &[u8; 4] = b"ZBXD";
/// Plain Zabbix protocol flag.
pub const FLAG_PROTOCOL: u8 = 0x01;
/// zlib-compressed payload.
pub const FLAG_COMPRESSED: u8 = 0x02;
/// 8-byte length and reserved fields.
pub const FLAG_LARGE: u8 = 0x04;
/// Magic, flags and length field.
pub const HEADER_LEN: usize = 13;
/// Largest payload the server accepts without the large-packet flag.
pub const MAX_REQUEST_PAYLOAD: usize = 1 << 30;
/// Largest response payload this client will buffer.
pub const MAX_RESPONSE_PAYLOAD: usize = 16 << 20;

/// Response string prefix the server uses for an accepted submission.
const SUCCESS_PREFIX: &str = "success";

/// Frames a JSON payload.
///
/// # Errors
/// Returns a protocol error if the payload exceeds [`MAX_REQUEST_PAYLOAD`].
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_REQUEST_PAYLOAD {
        return Err(RelayError::protocol(format!(
            "payload of {} bytes exceeds the {} byte limit",
            payload.len(),
            MAX_REQUEST_PAYLOAD
        )));
    }
    let data_len = u32::try_from(payload.len())
        .map_err(|_| RelayError::protocol("payload length does not fit the length field"))?;

    let mut frame = Vec::with_capacity(HEADER_LEN.saturating_add(payload.len()));
    frame.extend_from_slice(MAGIC);
    frame.push(FLAG_PROTOCOL);
    frame.extend_from_slice(&data_len.to_le_bytes());
    frame.extend_from_slice(&0u32.to_le_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Serializes and frames a sender packet.
///
/// # Errors
/// Returns a serialization error if the packet cannot be encoded, or a
/// protocol error if it is too large to send.
pub fn encode_packet(packet: &SenderPacket) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(packet).map_err(|e| RelayError::Serialization {
        context: "Failed to encode sender packet".to_string(),
        source: e,
    })?;
    encode_frame(&payload)
}

/// Validates a frame header and returns the payload length it announces.
///
/// # Errors
/// Returns a protocol error for a bad magic, unsupported flags, or a length
/// above `max_payload`.
pub fn parse_header(header: &[u8; HEADER_LEN], max_payload: usize) -> Result<usize> {
    if &header[..4] != MAGIC {
        return Err(RelayError::protocol(format!(
            "bad frame magic {:02x?}",
            &header[..4]
        )));
    }

    let flags = header[4];
    if flags & FLAG_PROTOCOL == 0 {
        return Err(RelayError::protocol(format!(
            "protocol flag missing from frame flags {:#04x}",
            flags
        )));
    }
    if flags & (FLAG_COMPRESSED | FLAG_LARGE) != 0 {
        return Err(RelayError::protocol(format!(
            "unsupported frame flags {:#04x}",
            flags
        )));
    }

    let data_len = u32::from_le_bytes([header[5], header[6], header[7], header[8]]);
    let data_len = usize::try_from(data_len)
        .map_err(|_| RelayError::protocol("frame length does not fit in memory"))?;
    if data_len > max_payload {
        return Err(RelayError::protocol(format!(
            "frame announces {} bytes, limit is {}",
            data_len, max_payload
        )));
    }
    Ok(data_len)
}

/// Splits a complete in-memory frame into its payload.
///
/// # Errors
/// Returns a protocol error if the header is invalid or the buffer length
/// does not match the announced length.
pub fn decode_frame(frame: &[u8]) -> Result<&[u8]> {
    let header: &[u8; HEADER_LEN] = frame
        .get(..HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(|| {
            RelayError::protocol(format!("frame of {} bytes is truncated", frame.len()))
        })?;
    let data_len = parse_header(header, MAX_REQUEST_PAYLOAD)?;
    let payload = &frame[HEADER_LEN..];
    if payload.len() != data_len {
        return Err(RelayError::protocol(format!(
            "frame announces {} payload bytes but carries {}",
            data_len,
            payload.len()
        )));
    }
    Ok(payload)
}

/// Reads one frame from `reader` and returns its payload.
///
/// # Errors
/// Returns a transport error if the stream ends or fails mid-frame, or a
/// protocol error if the header is invalid.
pub async fn read_frame<R>(reader: &mut R, max_payload: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    reader
        .read_exact(&mut header)
        .await
        .map_err(|e| RelayError::transport("Failed to read response header", e))?;

    let data_len = parse_header(&header, max_payload)?;

    let mut payload = vec![0u8; data_len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| RelayError::transport("Failed to read response payload", e))?;
    Ok(payload)
}

/// JSON body of a server response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerResponse {
    /// `success` or `failed`
    pub response: String,
    /// Free-form detail; counts on success, a reason on failure
    #[serde(default)]
    pub info: String,
}

impl ServerResponse {
    /// Parses a response payload.
    ///
    /// # Errors
    /// Returns a serialization error if the payload is not a response object.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(|e| RelayError::Serialization {
            context: "Failed to decode server response".to_string(),
            source: e,
        })
    }

    /// Whether the server reported `success`.
    pub fn is_success(&self) -> bool {
        self.response.starts_with(SUCCESS_PREFIX)
    }

    /// Converts an accepted response into an acknowledgement.
    ///
    /// A `success` reply that processed nothing and failed at least one item
    /// counts as a rejection. Zabbix answers that way for an unknown host or
    /// for items the host does not define.
    ///
    /// # Errors
    /// Returns [`RelayError::Rejected`] when the response is not a success or
    /// every submitted item failed.
    pub fn into_acknowledgement(self) -> Result<Acknowledgement> {
        if !self.is_success() {
            return Err(RelayError::Rejected {
                response: self.response,
                info: self.info,
            });
        }
        let summary = SubmissionSummary::parse(&self.info);
        if summary.is_some_and(|s| s.is_total_failure()) {
            return Err(RelayError::Rejected {
                response: self.response,
                info: self.info,
            });
        }
        Ok(Acknowledgement {
            response: self.response,
            info: self.info,
            summary,
        })
    }
}

/// A submission the server accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledgement {
    /// Response status, always a `success` variant
    pub response: String,
    /// Raw `info` text
    pub info: String,
    /// Parsed counts, when `info` has the usual layout
    pub summary: Option<SubmissionSummary>,
}

/// Counts reported in the `info` field, e.g.
/// `processed: 1; failed: 0; total: 1; seconds spent: 0.000055`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmissionSummary {
    /// Items stored by the server
    pub processed: u64,
    /// Items the server refused
    pub failed: u64,
    /// Items received
    pub total: u64,
    /// Server-side processing time
    pub seconds_spent: f64,
}

impl SubmissionSummary {
    /// True when no item was stored and at least one was refused.
    pub const fn is_total_failure(&self) -> bool {
        self.processed == 0 && self.failed > 0
    }

    /// Parses an `info` string; `None` if any of the counts is missing.
    pub fn parse(info: &str) -> Option<Self> {
        let mut processed = None;
        let mut failed = None;
        let mut total = None;
        let mut seconds_spent = None;

        for field in info.split(';') {
            let Some((name, value)) = field.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match name.trim() {
                "processed" => processed = value.parse().ok(),
                "failed" => failed = value.parse().ok(),
                "total" => total = value.parse().ok(),
                "seconds spent" => seconds_spent = value.parse().ok(),
                _ => {}
            }
        }

        Some(Self {
            processed: processed?,
            failed: failed?,
            total: total?,
            seconds_spent: seconds_spent.unwrap_or(0.0),
        })
    }
}
