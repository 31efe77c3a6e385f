//! API request handlers for the passport peer

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use ed25519_dalek::SigningKey;
use passport_common::{
    signing, CommitStatus, Envelope, ErrorBody, ErrorDetail, ProposalRequest, ProposalResponse,
    SubmitResponse,
};
use tokio::sync::{Notify, RwLock};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::ledger::{Ledger, Simulation};
use crate::orderer::{Orderer, OrdererError};

/// Shared application state
pub struct AppState {
    pub config: Config,
    signing_key: SigningKey,
    pub ledger: Arc<RwLock<Ledger>>,
    pub commits: Arc<Notify>,
    pub orderer: Orderer,
}

impl AppState {
    /// Create the ledger and start its committer. Must run inside a tokio runtime.
    ///
    /// The ledger accepts endorsements made with `signing_key`.
    pub fn new(config: Config, signing_key: SigningKey) -> Self {
        let endorsers = vec![signing_key.verifying_key()];
        let ledger = Arc::new(RwLock::new(Ledger::new(config.channel.clone(), endorsers)));
        let commits = Arc::new(Notify::new());
        let (orderer, _committer) =
            Orderer::start(config.orderer(), Arc::clone(&ledger), Arc::clone(&commits));

        Self {
            config,
            signing_key,
            ledger,
            commits,
            orderer,
        }
    }

    fn error_detail(&self, message: String) -> ErrorDetail {
        ErrorDetail {
            address: self.config.peer_address.clone(),
            msp_id: self.config.msp_id.clone(),
            message,
        }
    }
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Vec<ErrorDetail>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let height = state.ledger.read().await.height();

    Json(serde_json::json!({
        "status": "healthy",
        "service": "passport-peer",
        "channel": state.config.channel,
        "height": height
    }))
}

/// Evaluate a read-only proposal on this peer
pub async fn evaluate_handler(
    State(state): State<Arc<AppState>>,
    Path((channel, chaincode)): Path<(String, String)>,
    Json(proposal): Json<ProposalRequest>,
) -> Result<Json<ProposalResponse>, ApiError> {
    debug!("Evaluating {} for tx {}", proposal.function, proposal.tx_id);

    let simulation = simulate(&state, &channel, &chaincode, &proposal).await?;

    Ok(Json(ProposalResponse {
        tx_id: proposal.tx_id,
        payload: simulation.payload,
    }))
}

/// Simulate a proposal and return the endorsed envelope
pub async fn endorse_handler(
    State(state): State<Arc<AppState>>,
    Path((channel, chaincode)): Path<(String, String)>,
    Json(proposal): Json<ProposalRequest>,
) -> Result<Json<Envelope>, ApiError> {
    info!("Endorsing {} for tx {}", proposal.function, proposal.tx_id);

    let simulation = simulate(&state, &channel, &chaincode, &proposal).await?;

    let mut envelope = Envelope {
        tx_id: proposal.tx_id,
        channel,
        chaincode,
        creator: proposal.creator,
        function: proposal.function,
        timestamp: Utc::now(),
        rwset: simulation.rwset,
        payload: simulation.payload,
        endorsements: Vec::new(),
    };

    let endorsement = signing::endorse(
        &envelope,
        &state.config.msp_id,
        &state.config.peer_address,
        &state.signing_key,
    )
    .map_err(|e| {
        let message = format!("Failed to sign endorsement: {}", e);
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.clone(),
            details: vec![state.error_detail(message)],
        }
    })?;
    envelope.endorsements.push(endorsement);

    Ok(Json(envelope))
}

/// Hand an endorsed envelope to the ordering service
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Path(channel): Path<String>,
    Json(envelope): Json<Envelope>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    info!("Submitting tx {} for ordering", envelope.tx_id);

    if channel != envelope.channel {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            format!(
                "Envelope for channel {} submitted to channel {}",
                envelope.channel, channel
            ),
        ));
    }

    let tx_id = envelope.tx_id.clone();
    state.orderer.broadcast(envelope).map_err(|e| {
        warn!("Rejected tx {}: {}", tx_id, e);
        let status = match e {
            OrdererError::QueueFull | OrdererError::Stopped => StatusCode::SERVICE_UNAVAILABLE,
        };
        ApiError {
            status,
            message: e.to_string(),
            details: vec![state.error_detail(e.to_string())],
        }
    })?;

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { tx_id })))
}

/// Wait until a transaction is committed and report its status
pub async fn commit_status_handler(
    State(state): State<Arc<AppState>>,
    Path((channel, tx_id)): Path<(String, String)>,
) -> Result<Json<CommitStatus>, ApiError> {
    if channel != state.config.channel {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Channel not found: {}", channel),
        ));
    }

    debug!("Waiting for commit status of tx {}", tx_id);

    loop {
        let notified = state.commits.notified();
        if let Some(status) = state.ledger.read().await.status(&tx_id).cloned() {
            return Ok(Json(status));
        }
        notified.await;
    }
}

async fn simulate(
    state: &AppState,
    channel: &str,
    chaincode: &str,
    proposal: &ProposalRequest,
) -> Result<Simulation, ApiError> {
    if channel != state.config.channel {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Channel not found: {}", channel),
        ));
    }

    if chaincode != state.config.chaincode {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Chaincode not found: {}", chaincode),
        ));
    }

    if proposal.creator.msp_id.is_empty() {
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "Proposal creator has no MSP ID",
        ));
    }

    if let Err(e) = signing::verify_proposal(proposal) {
        warn!("Rejected proposal {}: {}", proposal.tx_id, e);
        return Err(ApiError::new(
            StatusCode::FORBIDDEN,
            format!("Proposal signature rejected: {}", e),
        ));
    }

    let ledger = state.ledger.read().await;
    ledger.simulate(proposal, Utc::now()).map_err(|e| {
        warn!("Chaincode {} failed for tx {}: {}", proposal.function, proposal.tx_id, e);
        let message = format!("chaincode response 500, {}", e);
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.clone(),
            details: vec![state.error_detail(message)],
        }
    })
}
