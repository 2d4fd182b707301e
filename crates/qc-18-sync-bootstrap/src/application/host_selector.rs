//! # Host Selector
//!
//! Probes every candidate peer concurrently and picks the one with the
//! highest head block id.
//!
//! All probes run to completion (or their deadline) before the answer is
//! chosen, so the result is the global maximum for this call rather than
//! the first responder.

use async_trait::async_trait;
use futures::future::join_all;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapters::TcpHeadProbe;
use crate::config::SyncConfig;
use crate::domain::{BestHost, PeerAddress, ProbeFailure, ProbeResult, SyncError};
use crate::ports::{HeadProbe, HostSelectionApi};

/// Best-peer selector.
pub struct HostSelector<P: HeadProbe> {
    /// Transport used per peer.
    probe: Arc<P>,
    /// Port appended to bare hosts.
    default_port: u16,
}

impl<P: HeadProbe> HostSelector<P> {
    /// Create a selector over an arbitrary probe transport.
    pub fn new(probe: Arc<P>, default_port: u16) -> Self {
        Self {
            probe,
            default_port,
        }
    }

    /// Probe transport.
    pub fn probe(&self) -> &Arc<P> {
        &self.probe
    }

    async fn probe_one(&self, address: PeerAddress) -> ProbeResult {
        match self.probe.probe(&address).await {
            Ok(head) => {
                debug!("[qc-18] {} reports head {}", address, head);
                ProbeResult::head(address, head)
            }
            Err(e) => {
                warn!("[qc-18] Probe failed: {}", e);
                ProbeResult::failed(address, e)
            }
        }
    }
}

impl HostSelector<TcpHeadProbe> {
    /// TCP selector using the configured deadline and default port.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            Arc::new(TcpHeadProbe::new(config.probe_timeout())),
            config.default_peer_port,
        )
    }
}

#[async_trait]
impl<P: HeadProbe + 'static> HostSelectionApi for HostSelector<P> {
    async fn choose_best_host(
        &self,
        cancel: &CancellationToken,
        hosts: &[PeerAddress],
    ) -> Result<BestHost, SyncError> {
        if hosts.is_empty() {
            return Err(SyncError::NoHostsProvided);
        }
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        debug!("[qc-18] Probing {} hosts", hosts.len());

        let probes = hosts
            .iter()
            .map(|host| self.probe_one(with_default_port(host, self.default_port)));

        // join_all keeps input order, which the tie-break relies on
        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("[qc-18] Host selection cancelled");
                return Err(SyncError::Cancelled);
            }
            results = join_all(probes) => results,
        };

        let best = select_best(results)?;
        info!(
            "[qc-18] Best host {} at block {}",
            best.address, best.head_block_id
        );
        Ok(best)
    }
}

/// Reduce probe results to the best host.
///
/// Strict maximum wins; equal heads keep the earliest result. When nothing
/// succeeded, every failure is returned in input order.
pub fn select_best(results: Vec<ProbeResult>) -> Result<BestHost, SyncError> {
    let mut best: Option<BestHost> = None;
    let mut failures = Vec::new();

    for result in results {
        match result.outcome {
            Ok(head) => {
                if best.as_ref().map_or(true, |b| head > b.head_block_id) {
                    best = Some(BestHost {
                        address: result.address,
                        head_block_id: head,
                    });
                }
            }
            Err(error) => failures.push(ProbeFailure {
                address: result.address,
                error,
            }),
        }
    }

    best.ok_or(SyncError::AllHostsUnreachable(failures))
}

/// Append `port` to an address that does not carry one.
pub fn with_default_port(address: &str, port: u16) -> String {
    if address.parse::<SocketAddr>().is_ok() {
        return address.to_string();
    }
    if let Ok(ip) = address.parse::<IpAddr>() {
        return SocketAddr::new(ip, port).to_string();
    }
    // Bracketed IPv6 literal without a port
    if address.starts_with('[') && address.ends_with(']') {
        return format!("{}:{}", address, port);
    }
    // Anything else with a port segment, valid or not, is left for the
    // probe to accept or reject
    if address.contains(':') {
        return address.to_string();
    }
    format!("{}:{}", address, port)
}
