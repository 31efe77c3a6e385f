//! Integration tests for the passport peer API

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use ed25519_dalek::SigningKey;
use passport_common::{
    signing, CommitStatus, Creator, Endorsement, Envelope, ErrorBody, KvWrite, Person, PersonArgs,
    ProposalRequest, ProposalResponse, ReadWriteSet, SubmitResponse, TxValidationCode,
};
use passport_peer::{create_router, AppState, Config};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tower::ServiceExt; // for `oneshot`

fn create_test_app() -> Router {
    create_router(AppState::new(
        Config::default(),
        SigningKey::from_bytes(&[3; 32]),
    ))
}

fn client_key() -> SigningKey {
    SigningKey::from_bytes(&[1; 32])
}

fn proposal(tx_id: &str, function: &str, args: Vec<String>) -> ProposalRequest {
    let mut request = ProposalRequest {
        tx_id: tx_id.to_string(),
        creator: Creator {
            msp_id: "Org1MSP".to_string(),
            certificate: "-----BEGIN CERTIFICATE-----".to_string(),
            public_key: Vec::new(),
        },
        function: function.to_string(),
        args,
        signature: Vec::new(),
    };
    signing::sign_proposal(&mut request, &client_key());
    request
}

async fn post_json<B: Serialize>(app: &Router, uri: &str, body: &B) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json<T: DeserializeOwned>(app: &Router, uri: &str) -> (StatusCode, T) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn endorse(app: &Router, request: &ProposalRequest) -> Envelope {
    let (status, body) = post_json(
        app,
        "/api/channels/mychannel/chaincodes/passport/endorse",
        request,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

/// Endorse, submit and wait for the commit status of one transaction
async fn submit(app: &Router, request: ProposalRequest) -> CommitStatus {
    let envelope = endorse(app, &request).await;
    submit_envelope(app, &envelope).await
}

/// Submit an envelope as is and wait for its commit status
async fn submit_envelope(app: &Router, envelope: &Envelope) -> CommitStatus {
    let (status, body) = post_json(app, "/api/channels/mychannel/submit", envelope).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let ack: SubmitResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(ack.tx_id, envelope.tx_id);

    let uri = format!("/api/channels/mychannel/transactions/{}/status", ack.tx_id);
    let (status, commit) = tokio::time::timeout(Duration::from_secs(5), get_json(app, &uri))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    commit
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();

    let (status, json): (_, serde_json::Value) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "passport-peer");
    assert_eq!(json["channel"], "mychannel");
}

#[tokio::test]
async fn test_submit_then_evaluate() {
    let app = create_test_app();

    let commit = submit(&app, proposal("tx1", "InitLedger", vec![])).await;
    assert_eq!(commit.code, TxValidationCode::Valid);
    assert_eq!(commit.block_number, 1);

    let (status, body) = post_json(
        &app,
        "/api/channels/mychannel/chaincodes/passport/evaluate",
        &proposal("tx2", "ReadPerson", vec!["person0".to_string()]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response: ProposalResponse = serde_json::from_slice(&body).unwrap();
    let person: Person = response.decode().unwrap();
    assert_eq!(person.name, "Igor");
}

#[tokio::test]
async fn test_evaluate_does_not_commit() {
    let app = create_test_app();

    let (status, _) = post_json(
        &app,
        "/api/channels/mychannel/chaincodes/passport/evaluate",
        &proposal("tx1", "InitLedger", vec![]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &app,
        "/api/channels/mychannel/chaincodes/passport/evaluate",
        &proposal("tx2", "PersonExists", vec!["person0".to_string()]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response: ProposalResponse = serde_json::from_slice(&body).unwrap();
    let exists: bool = response.decode().unwrap();
    assert!(!exists);
}

#[tokio::test]
async fn test_chaincode_error_carries_details() {
    let app = create_test_app();

    let (status, body) = post_json(
        &app,
        "/api/channels/mychannel/chaincodes/passport/evaluate",
        &proposal("tx1", "ReadPerson", vec!["ghost".to_string()]),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert!(error.error.contains("the person ghost does not exist"));
    assert_eq!(error.details.len(), 1);
    assert_eq!(error.details[0].msp_id, "Org1MSP");
    assert_eq!(error.details[0].address, "peer0.org1.example.com:7051");
}

#[tokio::test]
async fn test_unknown_channel_and_chaincode() {
    let app = create_test_app();
    let request = proposal("tx1", "GetAllPersons", vec![]);

    let (status, _) = post_json(
        &app,
        "/api/channels/otherchannel/chaincodes/passport/evaluate",
        &request,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_json(
        &app,
        "/api/channels/mychannel/chaincodes/basic/evaluate",
        &request,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_proposal_without_msp_is_forbidden() {
    let app = create_test_app();
    let mut request = proposal("tx1", "GetAllPersons", vec![]);
    request.creator.msp_id.clear();

    let (status, _) = post_json(
        &app,
        "/api/channels/mychannel/chaincodes/passport/evaluate",
        &request,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_badly_signed_proposal_is_forbidden() {
    let app = create_test_app();

    let mut tampered = proposal("tx1", "ReadPerson", vec!["person0".to_string()]);
    tampered.args[0] = "person1".to_string();

    let mut unsigned = proposal("tx2", "GetAllPersons", vec![]);
    unsigned.signature.clear();

    for request in [tampered, unsigned] {
        let (status, body) = post_json(
            &app,
            "/api/channels/mychannel/chaincodes/passport/endorse",
            &request,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert!(error.error.contains("signature"));
    }
}

#[tokio::test]
async fn test_forged_envelope_is_invalidated() {
    let app = create_test_app();
    assert!(submit(&app, proposal("tx1", "InitLedger", vec![]))
        .await
        .is_successful());

    // Never endorsed by the peer: the write set overwrites a record with garbage
    let mut forged = Envelope {
        tx_id: "forged".to_string(),
        channel: "mychannel".to_string(),
        chaincode: "passport".to_string(),
        creator: proposal("forged", "UpdatePerson", vec![]).creator,
        function: "UpdatePerson".to_string(),
        timestamp: Utc::now(),
        rwset: ReadWriteSet {
            writes: vec![KvWrite {
                key: "person0".to_string(),
                is_delete: false,
                value: b"not json".to_vec(),
            }],
            ..ReadWriteSet::default()
        },
        payload: Vec::new(),
        endorsements: vec![Endorsement {
            msp_id: "Org1MSP".to_string(),
            endpoint: "peer0.org1.example.com:7051".to_string(),
            public_key: Vec::new(),
            signature: Vec::new(),
        }],
    };
    let commit = submit_envelope(&app, &forged).await;
    assert_eq!(commit.code, TxValidationCode::EndorsementPolicyFailure);

    // Signed, but with a key the peer does not trust
    forged.tx_id = "self-endorsed".to_string();
    forged.endorsements.clear();
    let stranger = SigningKey::from_bytes(&[9; 32]);
    let endorsement = signing::endorse(&forged, "Org1MSP", "peer9:7051", &stranger).unwrap();
    forged.endorsements.push(endorsement);
    let commit = submit_envelope(&app, &forged).await;
    assert_eq!(commit.code, TxValidationCode::EndorsementPolicyFailure);

    let (status, body) = post_json(
        &app,
        "/api/channels/mychannel/chaincodes/passport/evaluate",
        &proposal("tx2", "ReadPerson", vec!["person0".to_string()]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response: ProposalResponse = serde_json::from_slice(&body).unwrap();
    let person: Person = response.decode().unwrap();
    assert_eq!(person.name, "Igor");
}

#[tokio::test]
async fn test_tampered_endorsed_envelope_is_invalidated() {
    let app = create_test_app();

    let mut envelope = endorse(&app, &proposal("tx1", "InitLedger", vec![])).await;
    envelope.rwset.writes.push(KvWrite {
        key: "person9".to_string(),
        is_delete: false,
        value: b"not json".to_vec(),
    });

    let commit = submit_envelope(&app, &envelope).await;
    assert_eq!(commit.code, TxValidationCode::EndorsementPolicyFailure);

    let (status, body) = post_json(
        &app,
        "/api/channels/mychannel/chaincodes/passport/evaluate",
        &proposal("tx2", "GetAllPersons", vec![]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response: ProposalResponse = serde_json::from_slice(&body).unwrap();
    let persons: Vec<Person> = response.decode().unwrap();
    assert!(persons.is_empty());
}

#[tokio::test]
async fn test_duplicate_create_is_rejected_at_endorsement() {
    let app = create_test_app();
    let person = Person::seed().remove(0);

    let commit = submit(
        &app,
        proposal("tx1", "CreatePerson", PersonArgs(person.clone()).to_args()),
    )
    .await;
    assert!(commit.is_successful());

    let (status, body) = post_json(
        &app,
        "/api/channels/mychannel/chaincodes/passport/endorse",
        &proposal("tx2", "CreatePerson", PersonArgs(person).to_args()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert!(error.error.contains("already exists"));
}

#[tokio::test]
async fn test_resubmitted_envelope_is_duplicate() {
    let app = create_test_app();

    let (_, body) = post_json(
        &app,
        "/api/channels/mychannel/chaincodes/passport/endorse",
        &proposal("tx1", "InitLedger", vec![]),
    )
    .await;
    let envelope: Envelope = serde_json::from_slice(&body).unwrap();

    let (status, _) = post_json(&app, "/api/channels/mychannel/submit", &envelope).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let uri = "/api/channels/mychannel/transactions/tx1/status";
    let (_, first): (_, CommitStatus) = get_json(&app, uri).await;
    assert!(first.is_successful());

    let (status, _) = post_json(&app, "/api/channels/mychannel/submit", &envelope).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    // A duplicate never replaces the status of the first submission
    let (_, again): (_, CommitStatus) = get_json(&app, uri).await;
    assert_eq!(again.code, TxValidationCode::Valid);
}

#[tokio::test]
async fn test_submit_to_wrong_channel() {
    let app = create_test_app();

    let (_, body) = post_json(
        &app,
        "/api/channels/mychannel/chaincodes/passport/endorse",
        &proposal("tx1", "InitLedger", vec![]),
    )
    .await;
    let envelope: Envelope = serde_json::from_slice(&body).unwrap();

    let (status, _) = post_json(&app, "/api/channels/otherchannel/submit", &envelope).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
