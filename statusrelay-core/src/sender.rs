//! Transport of metric records to a Zabbix server or proxy.
//!
//! One call to [`MetricSink::send`] is one complete exchange: encode, connect,
//! write, read the acknowledgement, close. There are no retries; the stream is
//! dropped on every exit path.

use crate::{
    Result,
    config::SenderConfig,
    error::RelayError,
    packet::{MetricRecord, SenderPacket},
    protocol::{self, Acknowledgement, ServerResponse},
};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Destination for a batch of metric records.
#[async_trait]
pub trait MetricSink: Send + Sync {
    /// Delivers `records` as a single submission.
    ///
    /// # Errors
    /// Returns [`RelayError::Rejected`] if the server refused the submission,
    /// or a transport, protocol or serialization error if no acknowledgement
    /// could be obtained.
    async fn send(&self, records: &[MetricRecord]) -> Result<Acknowledgement>;
}

/// Zabbix trapper client speaking the sender protocol over TCP.
#[derive(Debug, Clone)]
pub struct ZabbixSender {
    config: SenderConfig,
}

impl ZabbixSender {
    /// Creates a sender for the configured server.
    ///
    /// # Errors
    /// Returns a configuration error if `config` does not validate.
    pub fn new(config: SenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Destination settings.
    pub const fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Sends an already-built packet and waits for the acknowledgement.
    ///
    /// # Errors
    /// See [`MetricSink::send`].
    pub async fn send_packet(&self, packet: &SenderPacket) -> Result<Acknowledgement> {
        // Encode before connecting so an unencodable batch never opens a socket.
        let frame = protocol::encode_packet(packet)?;
        let address = self.config.address();
        debug!("Encoded {} records into {} bytes", packet.data.len(), frame.len());

        let mut stream = with_timeout(
            self.config.connect_timeout,
            "connect",
            TcpStream::connect((self.config.server.as_str(), self.config.port)),
        )
        .await
        .map_err(|e| RelayError::transport(format!("Failed to connect to {}", address), e))?;

        with_timeout(self.config.io_timeout, "write", stream.write_all(&frame))
            .await
            .map_err(|e| RelayError::transport(format!("Failed to send packet to {}", address), e))?;

        let payload = tokio::time::timeout(
            self.config.io_timeout,
            protocol::read_frame(&mut stream, protocol::MAX_RESPONSE_PAYLOAD),
        )
        .await
        .map_err(|_| {
            RelayError::transport(
                format!("Timed out waiting for response from {}", address),
                std::io::Error::new(std::io::ErrorKind::TimedOut, "response timed out"),
            )
        })??;

        // The exchange is complete; a failed shutdown does not change the outcome.
        let _ = stream.shutdown().await;

        let response = ServerResponse::from_payload(&payload)?;
        debug!(
            "Server response: response={:?}, info={:?}",
            response.response, response.info
        );
        response.into_acknowledgement()
    }
}

#[async_trait]
impl MetricSink for ZabbixSender {
    async fn send(&self, records: &[MetricRecord]) -> Result<Acknowledgement> {
        let clock = records
            .first()
            .map_or_else(|| chrono::Utc::now().timestamp(), |r| r.clock);
        let packet = SenderPacket::new(records.to_vec(), clock);

        info!(
            "Sending {} metrics to {}",
            records.len(),
            self.config.address()
        );
        self.send_packet(&packet).await
    }
}

/// Runs an I/O future with a deadline, folding the elapsed case into `io::Error`.
async fn with_timeout<T, F>(limit: Duration, operation: &str, fut: F) -> std::io::Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("{} timed out after {:?}", operation, limit),
        )
    })?
}
