//! Connection configuration for the gateway client
//!
//! Identity material and endpoints are injected through the environment.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Timeout tiers of the two call kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Single-peer evaluation
    pub evaluate: Duration,

    /// Collecting the endorsement of a submitted transaction
    pub endorse: Duration,

    /// Handing the endorsed transaction to the ordering service
    pub submit: Duration,

    /// Waiting for the transaction to be committed
    pub commit_status: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            evaluate: Duration::from_secs(5),
            endorse: Duration::from_secs(15),
            submit: Duration::from_secs(5),
            commit_status: Duration::from_secs(60),
        }
    }
}

/// Gateway connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Organization of the client identity
    pub msp_id: String,

    /// PEM certificate of the client identity
    pub cert_path: PathBuf,

    /// Hex-encoded Ed25519 key that signs proposals
    pub key_path: PathBuf,

    /// Root certificate used to verify the peer's TLS certificate
    pub tls_cert_path: Option<PathBuf>,

    /// Peer base URL
    pub peer_endpoint: String,

    pub channel: String,
    pub chaincode: String,
    pub timeouts: Timeouts,
}

impl ConnectionConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let defaults = Timeouts::default();

        let config = ConnectionConfig {
            msp_id: env::var("MSP_ID").unwrap_or_else(|_| "Org1MSP".to_string()),

            cert_path: env::var("CERT_PATH")
                .map(PathBuf::from)
                .context("CERT_PATH must be set to the client certificate")?,

            key_path: env::var("KEY_PATH")
                .map(PathBuf::from)
                .context("KEY_PATH must be set to the client signing key")?,

            tls_cert_path: env::var("TLS_CERT_PATH").ok().map(PathBuf::from),

            peer_endpoint: env::var("PEER_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:7051".to_string()),

            channel: env::var("CHANNEL_NAME").unwrap_or_else(|_| "mychannel".to_string()),

            chaincode: env::var("CHAINCODE_NAME").unwrap_or_else(|_| "passport".to_string()),

            timeouts: Timeouts {
                evaluate: secs_from_env("EVALUATE_TIMEOUT_SECS", defaults.evaluate)?,
                endorse: secs_from_env("ENDORSE_TIMEOUT_SECS", defaults.endorse)?,
                submit: secs_from_env("SUBMIT_TIMEOUT_SECS", defaults.submit)?,
                commit_status: secs_from_env("COMMIT_STATUS_TIMEOUT_SECS", defaults.commit_status)?,
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.msp_id.is_empty() {
            anyhow::bail!("MSP_ID must not be empty");
        }

        if !self.peer_endpoint.starts_with("http://") && !self.peer_endpoint.starts_with("https://")
        {
            anyhow::bail!("PEER_ENDPOINT must be an http:// or https:// URL");
        }

        if self.channel.is_empty() || self.chaincode.is_empty() {
            anyhow::bail!("CHANNEL_NAME and CHAINCODE_NAME must not be empty");
        }

        let t = &self.timeouts;
        if [t.evaluate, t.endorse, t.submit, t.commit_status].contains(&Duration::ZERO) {
            anyhow::bail!("Timeouts must be greater than 0");
        }

        Ok(())
    }

    /// Get the peer address
    pub fn peer_address(&self) -> &str {
        self.peer_endpoint.trim_end_matches('/')
    }
}

fn secs_from_env(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(value) => {
            let secs: u64 = value.parse().with_context(|| format!("Invalid {}", name))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(default),
    }
}
