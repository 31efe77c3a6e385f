//! Output formatting for the shell

use passport_gateway::{CommitStatusFault, GatewayError};
use serde::Serialize;

/// Pretty-printed JSON with two-space indentation
pub fn pretty<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Describe a gateway failure with its kind-specific detail, one line per
/// endpoint that reported an error.
pub fn describe_error(err: &GatewayError) -> String {
    let mut lines = vec![match err {
        GatewayError::Evaluate { message, .. } => {
            format!("failed to evaluate transaction: {}", message)
        }
        GatewayError::Endorse { tx_id, message, .. } => {
            format!("Endorse error for transaction {}: {}", tx_id, message)
        }
        GatewayError::Submit { tx_id, message, .. } => {
            format!("Submit error for transaction {}: {}", tx_id, message)
        }
        GatewayError::CommitStatus {
            tx_id,
            fault: CommitStatusFault::Timeout(limit),
        } => format!(
            "Timeout waiting for transaction {} commit status after {:?}",
            tx_id, limit
        ),
        GatewayError::CommitStatus {
            tx_id,
            fault: CommitStatusFault::Other(message),
        } => format!(
            "Error obtaining commit status for transaction {}: {}",
            tx_id, message
        ),
        GatewayError::Commit { tx_id, code } => format!(
            "Transaction {} failed to commit with status {}: {}",
            tx_id,
            code.code(),
            code
        ),
        other => other.to_string(),
    }];

    lines.extend(err.details().iter().map(|detail| detail.to_string()));
    lines.join("\n")
}
