//! Channel ledger: simulation, validation and commit
//!
//! Transactions are validated in block order against the state left by the
//! transactions before them:
//! 1. Transaction ID not seen before (`DUPLICATE_TXID`)
//! 2. Envelope targets this channel (`TARGET_CHAIN_NOT_FOUND`)
//! 3. Every endorsement signature matches the envelope, and at least one is
//!    from a trusted endorser (`ENDORSEMENT_POLICY_FAILURE`)
//! 4. Every read still at the version simulated against (`MVCC_READ_CONFLICT`)
//! 5. Every range scan still yields the same keys (`PHANTOM_READ_CONFLICT`)
//!
//! Only valid transactions touch the world state.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use ed25519_dalek::VerifyingKey;
use passport_chaincode::PassportContract;
use passport_common::{
    signing, CommitStatus, Envelope, KvRead, ProposalRequest, RangeQueryInfo, ReadWriteSet,
    Result, TxValidationCode, Version,
};
use tracing::{debug, info, warn};

use crate::simulator::TxSimulator;
use crate::state::WorldState;

/// Output of simulating a proposal
#[derive(Debug, Clone)]
pub struct Simulation {
    pub payload: Vec<u8>,
    pub rwset: ReadWriteSet,
}

/// A committed block
#[derive(Debug, Clone)]
pub struct BlockSummary {
    pub number: u64,
    pub timestamp: DateTime<Utc>,
    pub statuses: Vec<CommitStatus>,
}

/// Ledger of a single channel with one deployed chaincode
pub struct Ledger {
    channel: String,
    endorsers: Vec<VerifyingKey>,
    contract: PassportContract,
    state: WorldState,
    height: u64,
    last_block_time: Option<DateTime<Utc>>,
    statuses: HashMap<String, CommitStatus>,
}

impl Ledger {
    /// `endorsers` are the keys whose endorsements satisfy the channel policy
    pub fn new(channel: impl Into<String>, endorsers: Vec<VerifyingKey>) -> Self {
        Self {
            channel: channel.into(),
            endorsers,
            contract: PassportContract::new(),
            state: WorldState::new(),
            height: 0,
            last_block_time: None,
            statuses: HashMap::new(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Number of committed blocks
    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Commit status of a transaction, once its block is committed
    pub fn status(&self, tx_id: &str) -> Option<&CommitStatus> {
        self.statuses.get(tx_id)
    }

    /// Execute a proposal against committed state without changing it
    pub fn simulate(
        &self,
        proposal: &ProposalRequest,
        timestamp: DateTime<Utc>,
    ) -> Result<Simulation> {
        let mut simulator = TxSimulator::new(&self.state, proposal.tx_id.clone(), timestamp);
        let payload = self
            .contract
            .invoke(&mut simulator, &proposal.function, &proposal.args)?;

        Ok(Simulation {
            payload,
            rwset: simulator.into_rwset(),
        })
    }

    /// Validate and commit a batch of transactions as the next block
    pub fn commit_block(&mut self, envelopes: Vec<Envelope>) -> BlockSummary {
        let number = self.height + 1;
        let timestamp = self.next_block_time();
        let mut in_block = HashSet::new();
        let mut statuses = Vec::with_capacity(envelopes.len());

        for (tx_num, envelope) in envelopes.iter().enumerate() {
            let duplicate =
                self.statuses.contains_key(&envelope.tx_id) || !in_block.insert(&envelope.tx_id);

            let code = if duplicate {
                TxValidationCode::DuplicateTxid
            } else {
                self.validate(envelope)
            };

            if code.is_valid() {
                let version = Version {
                    block_num: number,
                    tx_num: tx_num as u64,
                };
                self.state
                    .apply(&envelope.tx_id, timestamp, version, &envelope.rwset.writes);
                debug!(
                    "Applied {} write(s) from tx {}",
                    envelope.rwset.writes.len(),
                    envelope.tx_id
                );
            } else {
                warn!(
                    "Transaction {} ({}) invalidated: {}",
                    envelope.tx_id, envelope.function, code
                );
            }

            let status = CommitStatus {
                tx_id: envelope.tx_id.clone(),
                code,
                block_number: number,
            };

            // A duplicate never replaces the status of the first submission
            if !duplicate {
                self.statuses.insert(envelope.tx_id.clone(), status.clone());
            }
            statuses.push(status);
        }

        self.height = number;
        self.last_block_time = Some(timestamp);

        info!(
            "Committed block {} with {} transaction(s) on channel {}",
            number,
            statuses.len(),
            self.channel
        );

        BlockSummary {
            number,
            timestamp,
            statuses,
        }
    }

    fn validate(&self, envelope: &Envelope) -> TxValidationCode {
        if envelope.channel != self.channel {
            return TxValidationCode::TargetChainNotFound;
        }

        if !self.endorsement_policy_met(envelope) {
            return TxValidationCode::EndorsementPolicyFailure;
        }

        if !envelope.rwset.reads.iter().all(|read| self.read_is_current(read)) {
            return TxValidationCode::MvccReadConflict;
        }

        if !envelope
            .rwset
            .range_queries
            .iter()
            .all(|query| self.range_is_unchanged(query))
        {
            return TxValidationCode::PhantomReadConflict;
        }

        TxValidationCode::Valid
    }

    fn endorsement_policy_met(&self, envelope: &Envelope) -> bool {
        let mut trusted = false;

        for endorsement in &envelope.endorsements {
            if let Err(e) = signing::verify_endorsement(envelope, endorsement) {
                debug!(
                    "Endorsement by {} on tx {} rejected: {}",
                    endorsement.endpoint, envelope.tx_id, e
                );
                return false;
            }

            trusted |= self
                .endorsers
                .iter()
                .any(|key| key.as_bytes()[..] == endorsement.public_key[..]);
        }

        trusted
    }

    fn read_is_current(&self, read: &KvRead) -> bool {
        self.state.version(&read.key) == read.version
    }

    fn range_is_unchanged(&self, query: &RangeQueryInfo) -> bool {
        let current: Vec<KvRead> = self
            .state
            .range(&query.start_key, &query.end_key)
            .map(|(key, versioned)| KvRead {
                key: key.clone(),
                version: Some(versioned.version),
            })
            .collect();

        if query.itr_exhausted {
            current == query.reads
        } else {
            current.len() >= query.reads.len() && current[..query.reads.len()] == query.reads[..]
        }
    }

    /// Block timestamps never go backwards, so history stays ordered
    fn next_block_time(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.last_block_time {
            Some(last) if last > now => last,
            _ => now,
        }
    }
}
