//! JSON messages exchanged between the gateway client and a peer

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// Generate a fresh transaction ID
pub fn new_transaction_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Serde adapter storing byte payloads as hex strings
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

/// Identity of the client that created a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Membership service provider ID (e.g. `Org1MSP`)
    pub msp_id: String,

    /// X.509 certificate in PEM form
    pub certificate: String,

    /// Ed25519 key that signs the creator's proposals
    #[serde(with = "hex_bytes")]
    pub public_key: Vec<u8>,
}

/// Proposal sent to a peer for evaluation or endorsement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub tx_id: String,
    pub creator: Creator,
    pub function: String,
    pub args: Vec<String>,

    /// Creator's signature over [`crate::signing::proposal_digest`]
    #[serde(with = "hex_bytes", default)]
    pub signature: Vec<u8>,
}

/// Result of evaluating a proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalResponse {
    pub tx_id: String,

    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,
}

/// Position of the transaction that last wrote a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub block_num: u64,
    pub tx_num: u64,
}

/// A key read during simulation and the version it was read at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvRead {
    pub key: String,

    /// `None` when the key did not exist
    pub version: Option<Version>,
}

/// A buffered write produced by simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvWrite {
    pub key: String,
    pub is_delete: bool,

    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
}

/// A range scan and every key it observed, used for phantom detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeQueryInfo {
    pub start_key: String,
    pub end_key: String,

    /// Whether the scan ran to the end of the range
    pub itr_exhausted: bool,
    pub reads: Vec<KvRead>,
}

/// Read/write set of a simulated transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadWriteSet {
    pub reads: Vec<KvRead>,
    pub range_queries: Vec<RangeQueryInfo>,
    pub writes: Vec<KvWrite>,
}

impl ReadWriteSet {
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Endorsement attached by a peer that simulated the proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    pub msp_id: String,
    pub endpoint: String,

    /// Endorsing peer's Ed25519 key
    #[serde(with = "hex_bytes")]
    pub public_key: Vec<u8>,

    /// Peer's signature over [`crate::signing::endorsement_digest`]
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

/// Endorsed transaction, ready to be sent for ordering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub tx_id: String,
    pub channel: String,
    pub chaincode: String,
    pub creator: Creator,
    pub function: String,
    pub timestamp: DateTime<Utc>,
    pub rwset: ReadWriteSet,

    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,

    pub endorsements: Vec<Endorsement>,
}

/// Acknowledgement from the ordering service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub tx_id: String,
}

/// Validation outcome of a committed transaction.
///
/// Numeric codes follow the platform's transaction validation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxValidationCode {
    Valid,
    DuplicateTxid,
    EndorsementPolicyFailure,
    MvccReadConflict,
    PhantomReadConflict,
    TargetChainNotFound,
}

impl TxValidationCode {
    pub fn code(&self) -> i32 {
        match self {
            TxValidationCode::Valid => 0,
            TxValidationCode::DuplicateTxid => 9,
            TxValidationCode::EndorsementPolicyFailure => 10,
            TxValidationCode::MvccReadConflict => 11,
            TxValidationCode::PhantomReadConflict => 12,
            TxValidationCode::TargetChainNotFound => 14,
        }
    }

    pub fn is_valid(&self) -> bool {
        *self == TxValidationCode::Valid
    }
}

impl fmt::Display for TxValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TxValidationCode::Valid => "VALID",
            TxValidationCode::DuplicateTxid => "DUPLICATE_TXID",
            TxValidationCode::EndorsementPolicyFailure => "ENDORSEMENT_POLICY_FAILURE",
            TxValidationCode::MvccReadConflict => "MVCC_READ_CONFLICT",
            TxValidationCode::PhantomReadConflict => "PHANTOM_READ_CONFLICT",
            TxValidationCode::TargetChainNotFound => "TARGET_CHAIN_NOT_FOUND",
        };
        f.write_str(name)
    }
}

/// Commit status of a transaction, reported once its block is committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    pub tx_id: String,
    pub code: TxValidationCode,
    pub block_number: u64,
}

impl CommitStatus {
    pub fn is_successful(&self) -> bool {
        self.code.is_valid()
    }
}

/// Per-endpoint failure detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Network address of the endpoint that reported the error
    pub address: String,
    pub msp_id: String,
    pub message: String,
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error from endpoint: {}, mspId: {}, message: {}",
            self.address, self.msp_id, self.message
        )
    }
}

/// JSON body of a failed peer request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,

    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

impl ProposalResponse {
    /// Decode the payload as JSON of the operation's known return shape
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}
