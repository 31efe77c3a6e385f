//! Gateway → Network → Contract hierarchy
//!
//! A [`Gateway`] owns the identity, its signing key and the peer connection
//! for the life of the process. [`Network`] and [`Contract`] are cheap
//! handles that share it.

use std::sync::Arc;
use std::time::Duration;

use ed25519_dalek::SigningKey;
use passport_common::{new_transaction_id, signing, ProposalRequest};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::Timeouts;
use crate::error::{CommitStatusFault, GatewayError};
use crate::identity::Identity;
use crate::transport::PeerTransport;

struct Connection {
    identity: Identity,
    signing_key: SigningKey,
    transport: Box<dyn PeerTransport>,
    timeouts: Timeouts,
}

/// Connection to a peer on behalf of one client identity
#[derive(Clone)]
pub struct Gateway {
    connection: Arc<Connection>,
}

impl Gateway {
    /// Every proposal sent through the gateway is signed with `signing_key`
    pub fn connect(
        identity: Identity,
        signing_key: SigningKey,
        transport: impl PeerTransport + 'static,
        timeouts: Timeouts,
    ) -> Self {
        info!("Gateway connected as {}", identity.msp_id());

        Self {
            connection: Arc::new(Connection {
                identity,
                signing_key,
                transport: Box::new(transport),
                timeouts,
            }),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.connection.identity
    }

    pub fn network(&self, channel: impl Into<String>) -> Network {
        Network {
            connection: Arc::clone(&self.connection),
            channel: channel.into(),
        }
    }
}

/// A channel reachable through the gateway
#[derive(Clone)]
pub struct Network {
    connection: Arc<Connection>,
    channel: String,
}

impl Network {
    pub fn name(&self) -> &str {
        &self.channel
    }

    pub fn contract(&self, chaincode: impl Into<String>) -> Contract {
        Contract {
            connection: Arc::clone(&self.connection),
            channel: self.channel.clone(),
            chaincode: chaincode.into(),
        }
    }
}

/// A chaincode deployed on a channel
#[derive(Clone)]
pub struct Contract {
    connection: Arc<Connection>,
    channel: String,
    chaincode: String,
}

impl Contract {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn name(&self) -> &str {
        &self.chaincode
    }

    fn proposal(&self, function: &str, args: &[String]) -> ProposalRequest {
        let mut proposal = ProposalRequest {
            tx_id: new_transaction_id(),
            creator: self.connection.identity.creator(),
            function: function.to_string(),
            args: args.to_vec(),
            signature: Vec::new(),
        };
        signing::sign_proposal(&mut proposal, &self.connection.signing_key);
        proposal
    }

    /// Run a read-only function on one peer and return its payload.
    ///
    /// Nothing is ordered or written to the ledger.
    pub async fn evaluate_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, GatewayError> {
        let proposal = self.proposal(function, args);
        let limit = self.connection.timeouts.evaluate;

        debug!("Evaluating {} as tx {}", function, proposal.tx_id);

        let response = timeout(
            limit,
            self.connection
                .transport
                .evaluate(&self.channel, &self.chaincode, &proposal),
        )
        .await
        .map_err(|_| GatewayError::Evaluate {
            message: deadline_exceeded(limit),
            details: Vec::new(),
        })?
        .map_err(|fault| GatewayError::Evaluate {
            message: fault.message,
            details: fault.details,
        })?;

        Ok(response.payload)
    }

    /// Endorse, order and commit a function, returning its payload once the
    /// transaction is committed as valid.
    pub async fn submit_transaction(
        &self,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, GatewayError> {
        let proposal = self.proposal(function, args);
        let tx_id = proposal.tx_id.clone();
        let timeouts = self.connection.timeouts;
        let transport = &self.connection.transport;

        debug!("Endorsing {} as tx {}", function, tx_id);

        let envelope = timeout(
            timeouts.endorse,
            transport.endorse(&self.channel, &self.chaincode, &proposal),
        )
        .await
        .map_err(|_| GatewayError::Endorse {
            tx_id: tx_id.clone(),
            message: deadline_exceeded(timeouts.endorse),
            details: Vec::new(),
        })?
        .map_err(|fault| GatewayError::Endorse {
            tx_id: tx_id.clone(),
            message: fault.message,
            details: fault.details,
        })?;

        timeout(timeouts.submit, transport.submit(&envelope))
            .await
            .map_err(|_| GatewayError::Submit {
                tx_id: tx_id.clone(),
                message: deadline_exceeded(timeouts.submit),
                details: Vec::new(),
            })?
            .map_err(|fault| GatewayError::Submit {
                tx_id: tx_id.clone(),
                message: fault.message,
                details: fault.details,
            })?;

        debug!("Waiting for commit of tx {}", tx_id);

        let status = timeout(
            timeouts.commit_status,
            transport.commit_status(&self.channel, &tx_id),
        )
        .await
        .map_err(|_| GatewayError::CommitStatus {
            tx_id: tx_id.clone(),
            fault: CommitStatusFault::Timeout(timeouts.commit_status),
        })?
        .map_err(|fault| GatewayError::CommitStatus {
            tx_id: tx_id.clone(),
            fault: CommitStatusFault::Other(fault.message),
        })?;

        if !status.is_successful() {
            warn!("Transaction {} invalidated: {}", tx_id, status.code);
            return Err(GatewayError::Commit {
                tx_id,
                code: status.code,
            });
        }

        info!(
            "Transaction {} ({}) committed in block {}",
            tx_id, function, status.block_number
        );

        Ok(envelope.payload)
    }
}

fn deadline_exceeded(limit: Duration) -> String {
    format!("deadline of {:?} exceeded", limit)
}
