//! Failure taxonomy of gateway calls

use std::time::Duration;

use passport_common::{ErrorDetail, TxValidationCode};
use thiserror::Error;

/// Why waiting for a commit status failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitStatusFault {
    #[error("deadline of {0:?} exceeded")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The evaluating peer failed or refused the proposal
    #[error("evaluate failed: {message}")]
    Evaluate {
        message: String,
        details: Vec<ErrorDetail>,
    },

    /// A peer refused to endorse the transaction
    #[error("endorse failed for transaction {tx_id}: {message}")]
    Endorse {
        tx_id: String,
        message: String,
        details: Vec<ErrorDetail>,
    },

    /// The ordering service did not accept the transaction
    #[error("submit failed for transaction {tx_id}: {message}")]
    Submit {
        tx_id: String,
        message: String,
        details: Vec<ErrorDetail>,
    },

    #[error("failed to obtain commit status of transaction {tx_id}: {fault}")]
    CommitStatus {
        tx_id: String,
        fault: CommitStatusFault,
    },

    /// Ordered but invalidated at commit
    #[error("transaction {tx_id} failed to commit with status code {} ({code})", .code.code())]
    Commit {
        tx_id: String,
        code: TxValidationCode,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Evaluate { .. } => "evaluate",
            GatewayError::Endorse { .. } => "endorse",
            GatewayError::Submit { .. } => "submit",
            GatewayError::CommitStatus { .. } => "commit_status",
            GatewayError::Commit { .. } => "commit",
            GatewayError::Serialization(_) => "serialization",
            GatewayError::Transport(_) => "transport",
        }
    }

    /// Per-endpoint details reported by peers, if any
    pub fn details(&self) -> &[ErrorDetail] {
        match self {
            GatewayError::Evaluate { details, .. }
            | GatewayError::Endorse { details, .. }
            | GatewayError::Submit { details, .. } => details,
            _ => &[],
        }
    }

    pub fn tx_id(&self) -> Option<&str> {
        match self {
            GatewayError::Endorse { tx_id, .. }
            | GatewayError::Submit { tx_id, .. }
            | GatewayError::CommitStatus { tx_id, .. }
            | GatewayError::Commit { tx_id, .. } => Some(tx_id),
            _ => None,
        }
    }

    /// True when a commit status wait ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            GatewayError::CommitStatus {
                fault: CommitStatusFault::Timeout(_),
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_error_carries_code() {
        let err = GatewayError::Commit {
            tx_id: "abc".to_string(),
            code: TxValidationCode::MvccReadConflict,
        };
        assert_eq!(
            err.to_string(),
            "transaction abc failed to commit with status code 11 (MVCC_READ_CONFLICT)"
        );
        assert_eq!(err.kind(), "commit");
        assert_eq!(err.tx_id(), Some("abc"));
    }

    #[test]
    fn test_timeout_is_distinguishable() {
        let timeout = GatewayError::CommitStatus {
            tx_id: "abc".to_string(),
            fault: CommitStatusFault::Timeout(Duration::from_secs(60)),
        };
        let other = GatewayError::CommitStatus {
            tx_id: "abc".to_string(),
            fault: CommitStatusFault::Other("connection reset".to_string()),
        };

        assert!(timeout.is_timeout());
        assert!(!other.is_timeout());
        assert_eq!(timeout.kind(), other.kind());
    }

    #[test]
    fn test_endorse_details() {
        let err = GatewayError::Endorse {
            tx_id: "abc".to_string(),
            message: "chaincode response 500".to_string(),
            details: vec![ErrorDetail {
                address: "peer0:7051".to_string(),
                msp_id: "Org1MSP".to_string(),
                message: "the person p1 already exists".to_string(),
            }],
        };

        assert_eq!(err.details().len(), 1);
        assert_eq!(
            err.details()[0].to_string(),
            "Error from endpoint: peer0:7051, mspId: Org1MSP, message: the person p1 already exists"
        );
    }
}
