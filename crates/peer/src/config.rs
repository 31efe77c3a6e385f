//! Configuration management for the passport peer
//!
//! Loads configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use ed25519_dalek::SigningKey;
use std::env;
use tracing::warn;

use crate::orderer::OrdererConfig;

/// Peer configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen host
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Endpoint reported in endorsements and error details
    pub peer_address: String,

    /// Organization this peer belongs to
    pub msp_id: String,

    /// Channel served by this peer
    pub channel: String,

    /// Chaincode deployed on the channel
    pub chaincode: String,

    /// Transactions per block
    pub max_batch_size: usize,

    /// Envelopes waiting for ordering before submissions are refused
    pub queue_depth: usize,

    /// File holding the hex-encoded key this peer endorses with
    pub key_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7051,
            peer_address: "peer0.org1.example.com:7051".to_string(),
            msp_id: "Org1MSP".to_string(),
            channel: "mychannel".to_string(),
            chaincode: "passport".to_string(),
            max_batch_size: 10,
            queue_depth: 256,
            key_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let config = Config {
            host: env::var("PEER_HOST").unwrap_or(defaults.host),

            port: env::var("PEER_PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .context("Invalid PEER_PORT")?,

            peer_address: env::var("PEER_ADDRESS").unwrap_or(defaults.peer_address),

            msp_id: env::var("PEER_MSP_ID").unwrap_or(defaults.msp_id),

            channel: env::var("CHANNEL_NAME").unwrap_or(defaults.channel),

            chaincode: env::var("CHAINCODE_NAME").unwrap_or(defaults.chaincode),

            max_batch_size: env::var("MAX_BATCH_SIZE")
                .unwrap_or_else(|_| defaults.max_batch_size.to_string())
                .parse()
                .context("Invalid MAX_BATCH_SIZE")?,

            queue_depth: env::var("ORDERER_QUEUE_DEPTH")
                .unwrap_or_else(|_| defaults.queue_depth.to_string())
                .parse()
                .context("Invalid ORDERER_QUEUE_DEPTH")?,

            key_path: env::var("PEER_KEY_PATH").ok().filter(|path| !path.is_empty()),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("PEER_PORT must be greater than 0");
        }

        if self.max_batch_size == 0 {
            anyhow::bail!("MAX_BATCH_SIZE must be greater than 0");
        }

        if self.channel.is_empty() || self.chaincode.is_empty() {
            anyhow::bail!("CHANNEL_NAME and CHAINCODE_NAME must not be empty");
        }

        if self.msp_id.is_empty() {
            anyhow::bail!("PEER_MSP_ID must not be empty");
        }

        Ok(())
    }

    /// Get the listen address
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Endorsement key from `PEER_KEY_PATH`, or a fresh one when unset
    pub fn signing_key(&self) -> Result<SigningKey> {
        match &self.key_path {
            Some(path) => passport_common::signing::load_signing_key(path),
            None => {
                warn!("PEER_KEY_PATH not set, endorsing with an ephemeral key");
                Ok(SigningKey::generate(&mut rand::rngs::OsRng))
            }
        }
    }

    pub fn orderer(&self) -> OrdererConfig {
        OrdererConfig {
            max_batch_size: self.max_batch_size,
            queue_depth: self.queue_depth,
        }
    }
}
