//! Passport Gateway
//!
//! Client side of the ledger: turns typed passport operations into evaluate
//! or submit calls against a peer.
//!
//! **Call kinds:**
//! - Evaluate: read-only, single peer, no ordering, bounded by one timeout
//! - Submit: endorse, order and wait for commit, each step with its own timeout
//!
//! Failures are surfaced as [`GatewayError`] and never retried here.

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod transport;

pub use client::PassportClient;
pub use config::{ConnectionConfig, Timeouts};
pub use error::{CommitStatusFault, GatewayError};
pub use gateway::{Contract, Gateway, Network};
pub use identity::Identity;
pub use transport::{HttpTransport, PeerTransport, TransportFault};
