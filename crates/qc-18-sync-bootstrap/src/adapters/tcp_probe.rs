//! TCP Head Probe Adapter
//!
//! Implements `HeadProbe` over a plain TCP connection: one request per
//! connection, every step bounded by the same deadline.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::codec::{decode_head_response, encode_request, RequestKind, HEAD_RESPONSE_LEN};
use crate::domain::ProbeError;
use crate::ports::outbound::HeadProbe;

/// Probe peers over TCP.
#[derive(Clone, Debug)]
pub struct TcpHeadProbe {
    /// Deadline for connect, write and read individually.
    step_timeout: Duration,
}

impl TcpHeadProbe {
    /// Create a probe with the given per-step deadline.
    pub fn new(step_timeout: Duration) -> Self {
        Self { step_timeout }
    }

    /// Per-step deadline.
    pub fn step_timeout(&self) -> Duration {
        self.step_timeout
    }

    async fn bounded<T, F>(
        &self,
        address: &str,
        step: &'static str,
        fut: F,
    ) -> Result<T, ProbeError>
    where
        F: Future<Output = std::io::Result<T>>,
    {
        match timeout(self.step_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ProbeError::ConnectionFailed {
                address: address.to_string(),
                reason: format!("{}: {}", step, e),
            }),
            Err(_) => Err(self.timed_out(address, step)),
        }
    }

    fn timed_out(&self, address: &str, step: &'static str) -> ProbeError {
        ProbeError::Timeout {
            address: address.to_string(),
            step,
            after_ms: u64::try_from(self.step_timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Read the head reply up to EOF, keeping at most one byte past it.
    ///
    /// A peer that answers in full but holds the connection open is
    /// accepted once the read deadline passes.
    async fn read_reply(
        &self,
        address: &str,
        stream: &mut TcpStream,
    ) -> Result<u64, ProbeError> {
        let mut reply = [0u8; HEAD_RESPONSE_LEN + 1];
        let mut filled = 0;

        let read_to_end = async {
            while filled < reply.len() {
                let n = stream.read(&mut reply[filled..]).await?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            Ok::<(), std::io::Error>(())
        };
        let outcome = timeout(self.step_timeout, read_to_end).await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ProbeError::ConnectionFailed {
                    address: address.to_string(),
                    reason: format!("read: {}", e),
                })
            }
            Err(_) if filled == HEAD_RESPONSE_LEN => {}
            Err(_) => return Err(self.timed_out(address, "read")),
        }

        // Short, long and empty replies all fail the exact-length check
        decode_head_response(&reply[..filled]).map_err(|source| ProbeError::Malformed {
            address: address.to_string(),
            source,
        })
    }
}

impl Default for TcpHeadProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl HeadProbe for TcpHeadProbe {
    async fn probe(&self, address: &str) -> Result<u64, ProbeError> {
        debug!("[qc-18] Probing {} for its head block", address);

        let mut stream = self
            .bounded(address, "connect", TcpStream::connect(address))
            .await?;

        let request = encode_request(RequestKind::MaxBlockId);
        self.bounded(address, "write", stream.write_all(&request))
            .await?;

        self.read_reply(address, &mut stream).await
    }
}
