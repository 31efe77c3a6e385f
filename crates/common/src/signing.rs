//! Proposal and endorsement signatures
//!
//! Clients sign a SHA-256 digest of each proposal with their Ed25519 key.
//! Peers sign a digest of every envelope they endorse, covering the creator,
//! the read/write set and the payload, so an envelope cannot be altered or
//! fabricated between endorsement and commit.
//!
//! Digest fields are length-prefixed so that no two field sequences hash to
//! the same input.

use std::path::Path;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::{Endorsement, Envelope, Error, ProposalRequest, Result};

fn update_field(hasher: &mut Sha256, field: &[u8]) {
    hasher.update((field.len() as u64).to_be_bytes());
    hasher.update(field);
}

/// Digest of everything a proposal asks the peer to do
pub fn proposal_digest(proposal: &ProposalRequest) -> [u8; 32] {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, proposal.tx_id.as_bytes());
    update_field(&mut hasher, proposal.creator.msp_id.as_bytes());
    update_field(&mut hasher, proposal.creator.certificate.as_bytes());
    update_field(&mut hasher, &proposal.creator.public_key);
    update_field(&mut hasher, proposal.function.as_bytes());
    hasher.update((proposal.args.len() as u64).to_be_bytes());
    for arg in &proposal.args {
        update_field(&mut hasher, arg.as_bytes());
    }
    hasher.finalize().into()
}

/// Digest of an endorsed envelope, excluding its endorsements
pub fn endorsement_digest(envelope: &Envelope) -> Result<[u8; 32]> {
    let rwset = serde_json::to_vec(&envelope.rwset)?;

    let mut hasher = Sha256::new();
    update_field(&mut hasher, envelope.tx_id.as_bytes());
    update_field(&mut hasher, envelope.channel.as_bytes());
    update_field(&mut hasher, envelope.chaincode.as_bytes());
    update_field(&mut hasher, envelope.creator.msp_id.as_bytes());
    update_field(&mut hasher, envelope.creator.certificate.as_bytes());
    update_field(&mut hasher, &envelope.creator.public_key);
    update_field(&mut hasher, envelope.function.as_bytes());
    update_field(&mut hasher, envelope.timestamp.to_rfc3339().as_bytes());
    update_field(&mut hasher, &rwset);
    update_field(&mut hasher, &envelope.payload);
    Ok(hasher.finalize().into())
}

/// Set the creator key and signature of `proposal`
pub fn sign_proposal(proposal: &mut ProposalRequest, key: &SigningKey) {
    proposal.creator.public_key = key.verifying_key().to_bytes().to_vec();
    let digest = proposal_digest(proposal);
    proposal.signature = key.sign(&digest).to_bytes().to_vec();
}

/// Check that the proposal was signed by the key its creator presents
pub fn verify_proposal(proposal: &ProposalRequest) -> Result<()> {
    let key = verifying_key(&proposal.creator.public_key)?;
    verify(&key, &proposal_digest(proposal), &proposal.signature)
}

/// Endorse `envelope` as the peer owning `key`
pub fn endorse(
    envelope: &Envelope,
    msp_id: &str,
    endpoint: &str,
    key: &SigningKey,
) -> Result<Endorsement> {
    let digest = endorsement_digest(envelope)?;

    Ok(Endorsement {
        msp_id: msp_id.to_string(),
        endpoint: endpoint.to_string(),
        public_key: key.verifying_key().to_bytes().to_vec(),
        signature: key.sign(&digest).to_bytes().to_vec(),
    })
}

/// Check one endorsement against the envelope it is attached to
pub fn verify_endorsement(envelope: &Envelope, endorsement: &Endorsement) -> Result<()> {
    let key = verifying_key(&endorsement.public_key)?;
    verify(&key, &endorsement_digest(envelope)?, &endorsement.signature)
}

pub fn verifying_key(bytes: &[u8]) -> Result<VerifyingKey> {
    let bytes: &[u8; 32] = bytes
        .try_into()
        .map_err(|_| Error::InvalidSignature("public key must be 32 bytes".to_string()))?;
    VerifyingKey::from_bytes(bytes).map_err(|e| Error::InvalidSignature(e.to_string()))
}

fn verify(key: &VerifyingKey, digest: &[u8; 32], signature: &[u8]) -> Result<()> {
    let signature: &[u8; 64] = signature
        .try_into()
        .map_err(|_| Error::InvalidSignature("signature must be 64 bytes".to_string()))?;

    key.verify(digest, &Signature::from_bytes(signature))
        .map_err(|e| Error::InvalidSignature(e.to_string()))
}

/// Parse a hex-encoded 32-byte Ed25519 secret key
pub fn signing_key_from_hex(text: &str) -> Result<SigningKey> {
    let bytes = hex::decode(text.trim())
        .map_err(|e| Error::InvalidArgument(format!("signing key is not hex: {}", e)))?;
    let seed: [u8; 32] = bytes
        .try_into()
        .map_err(|_| Error::InvalidArgument("signing key must be 32 bytes".to_string()))?;
    Ok(SigningKey::from_bytes(&seed))
}

/// Load a signing key file holding the hex-encoded secret key
pub fn load_signing_key(path: impl AsRef<Path>) -> anyhow::Result<SigningKey> {
    use anyhow::Context;

    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read signing key {}", path.display()))?;

    signing_key_from_hex(&text).with_context(|| format!("Invalid signing key {}", path.display()))
}
