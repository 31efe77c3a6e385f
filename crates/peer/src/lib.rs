//! Passport Peer
//!
//! Single-node ledger peer for the passport chaincode. Simulates proposals
//! against a versioned world state, orders endorsed transactions into blocks
//! and validates them with MVCC and phantom-read checks before commit.

pub mod config;
pub mod handlers;
pub mod ledger;
pub mod orderer;
pub mod simulator;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use handlers::AppState;
pub use ledger::{BlockSummary, Ledger, Simulation};
pub use orderer::{Orderer, OrdererConfig, OrdererError};

/// Create the peer router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/api/channels/{channel}/chaincodes/{chaincode}/evaluate",
            post(handlers::evaluate_handler),
        )
        .route(
            "/api/channels/{channel}/chaincodes/{chaincode}/endorse",
            post(handlers::endorse_handler),
        )
        .route(
            "/api/channels/{channel}/submit",
            post(handlers::submit_handler),
        )
        .route(
            "/api/channels/{channel}/transactions/{tx_id}/status",
            get(handlers::commit_status_handler),
        )
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
