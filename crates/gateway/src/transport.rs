//! Connection from the gateway to a peer
//!
//! [`PeerTransport`] is the seam between call semantics (timeouts, error
//! taxonomy) and the wire. [`HttpTransport`] speaks the peer's REST API over a
//! single long-lived `reqwest::Client`.

use async_trait::async_trait;
use passport_common::{
    CommitStatus, Envelope, ErrorBody, ErrorDetail, ProposalRequest, ProposalResponse,
    SubmitResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::error::GatewayError;

/// A failed peer request
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportFault {
    pub message: String,
    pub details: Vec<ErrorDetail>,
}

impl TransportFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Vec::new(),
        }
    }
}

impl From<ErrorBody> for TransportFault {
    fn from(body: ErrorBody) -> Self {
        Self {
            message: body.error,
            details: body.details,
        }
    }
}

#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Run a read-only proposal on one peer
    async fn evaluate(
        &self,
        channel: &str,
        chaincode: &str,
        proposal: &ProposalRequest,
    ) -> Result<ProposalResponse, TransportFault>;

    /// Simulate a proposal and collect the endorsed envelope
    async fn endorse(
        &self,
        channel: &str,
        chaincode: &str,
        proposal: &ProposalRequest,
    ) -> Result<Envelope, TransportFault>;

    /// Hand an endorsed envelope to the ordering service
    async fn submit(&self, envelope: &Envelope) -> Result<SubmitResponse, TransportFault>;

    /// Block until the transaction is committed
    async fn commit_status(
        &self,
        channel: &str,
        tx_id: &str,
    ) -> Result<CommitStatus, TransportFault>;
}

/// REST transport to a single peer
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport trusting the system root certificates
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            base_url: endpoint.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport that verifies the peer against a PEM root certificate
    pub fn with_tls_root(endpoint: impl Into<String>, pem: &[u8]) -> Result<Self, GatewayError> {
        let cert = reqwest::Certificate::from_pem(pem)
            .map_err(|e| GatewayError::Transport(format!("Invalid TLS certificate: {}", e)))?;

        let client = reqwest::Client::builder()
            .add_root_certificate(cert)
            .build()
            .map_err(|e| GatewayError::Transport(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            base_url: endpoint.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, TransportFault>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportFault::new(format!("Failed to reach peer {}: {}", url, e)))?;

        Self::read(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportFault> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportFault::new(format!("Failed to reach peer {}: {}", url, e)))?;

        Self::read(response).await
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportFault> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => body.into(),
                Err(_) => TransportFault::new(format!("Peer responded with {}: {}", status, text)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportFault::new(format!("Failed to parse peer response: {}", e)))
    }
}

#[async_trait]
impl PeerTransport for HttpTransport {
    async fn evaluate(
        &self,
        channel: &str,
        chaincode: &str,
        proposal: &ProposalRequest,
    ) -> Result<ProposalResponse, TransportFault> {
        let path = format!("/api/channels/{}/chaincodes/{}/evaluate", channel, chaincode);
        self.post(&path, proposal).await
    }

    async fn endorse(
        &self,
        channel: &str,
        chaincode: &str,
        proposal: &ProposalRequest,
    ) -> Result<Envelope, TransportFault> {
        let path = format!("/api/channels/{}/chaincodes/{}/endorse", channel, chaincode);
        self.post(&path, proposal).await
    }

    async fn submit(&self, envelope: &Envelope) -> Result<SubmitResponse, TransportFault> {
        let path = format!("/api/channels/{}/submit", envelope.channel);
        self.post(&path, envelope).await
    }

    async fn commit_status(
        &self,
        channel: &str,
        tx_id: &str,
    ) -> Result<CommitStatus, TransportFault> {
        let path = format!("/api/channels/{}/transactions/{}/status", channel, tx_id);
        self.get(&path).await
    }
}
