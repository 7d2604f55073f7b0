//! Peer Directory & Snapshot RPC Gateway
//!
//! The coordination loops never talk HTTP directly; they go through two
//! seams so tests can substitute deterministic fakes:
//!
//! - [`PeerDirectory`] answers "which peers of this type are ready".
//!   Its internals (whitelisting, liveness probing) live elsewhere.
//! - [`PeerGateway`] performs the two snapshot RPCs against one peer.
//!
//! [`HttpPeerGateway`] is the production gateway: a shared
//! `reqwest::Client` with a per-request timeout. A timed-out or failed
//! call surfaces as an error for the caller to log and count as a
//! missing reply; it never aborts a whole fan-out.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use concord_common::{NodeType, PeerData, PeerId, RecentSnapshot, SnapshotCreated, SnapshotVerification};

/// Errors from a single peer RPC.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("peer {endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },
}

/// Read access to the cluster membership view.
#[async_trait]
pub trait PeerDirectory: Send + Sync {
    /// Peers of the given type currently reported ready.
    async fn ready_peers(&self, node_type: NodeType) -> HashMap<PeerId, PeerData>;
}

/// The two snapshot RPCs the coordination layer performs against peers.
#[async_trait]
pub trait PeerGateway: Send + Sync {
    /// `POST /snapshot/verify` — announce a created snapshot and collect
    /// the peer's verdict plus its recent history.
    async fn verify_snapshot(
        &self,
        peer: &PeerData,
        request: &SnapshotCreated,
    ) -> Result<SnapshotVerification, PeerError>;

    /// `GET /snapshot/recent` — fetch the peer's recent-snapshot list.
    async fn recent_snapshots(&self, peer: &PeerData) -> Result<Vec<RecentSnapshot>, PeerError>;
}

/// Production [`PeerGateway`] over HTTP/JSON.
pub struct HttpPeerGateway {
    client: reqwest::Client,
}

impl HttpPeerGateway {
    /// Build a gateway whose requests all carry `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, PeerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PeerError::ClientBuild)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PeerGateway for HttpPeerGateway {
    async fn verify_snapshot(
        &self,
        peer: &PeerData,
        request: &SnapshotCreated,
    ) -> Result<SnapshotVerification, PeerError> {
        let url = format!("{}/snapshot/verify", peer.endpoint);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| PeerError::Transport {
                endpoint: peer.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PeerError::Status {
                endpoint: peer.endpoint.clone(),
                status: status.as_u16(),
            });
        }
        response
            .json::<SnapshotVerification>()
            .await
            .map_err(|source| PeerError::Transport {
                endpoint: peer.endpoint.clone(),
                source,
            })
    }

    async fn recent_snapshots(&self, peer: &PeerData) -> Result<Vec<RecentSnapshot>, PeerError> {
        let url = format!("{}/snapshot/recent", peer.endpoint);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| PeerError::Transport {
                endpoint: peer.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PeerError::Status {
                endpoint: peer.endpoint.clone(),
                status: status.as_u16(),
            });
        }
        response
            .json::<Vec<RecentSnapshot>>()
            .await
            .map_err(|source| PeerError::Transport {
                endpoint: peer.endpoint.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_common::PeerState;

    #[test]
    fn test_gateway_builds_with_timeout() {
        let gateway = HttpPeerGateway::new(Duration::from_secs(5));
        assert!(gateway.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_transport_error() {
        let gateway =
            HttpPeerGateway::new(Duration::from_millis(200)).expect("client builds");
        // Reserved TEST-NET address; nothing listens there.
        let peer = PeerData::new("http://192.0.2.1:1", NodeType::Full, PeerState::Ready);

        let result = gateway.recent_snapshots(&peer).await;
        assert!(matches!(result, Err(PeerError::Transport { .. })));
    }
}
