#![allow(clippy::unwrap_used)]
// Integration tests for `QueueClient` using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fencelink_api::{DeviceQueueItem, EnqueueResponse, Error, QueueClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

const DEV_EUI: &str = "0011223344556677";

async fn setup_with_timeout(timeout: Duration) -> (MockServer, QueueClient) {
    let server = MockServer::start().await;
    let token: SecretString = "test-token".to_string().into();
    let transport = TransportConfig::default().with_timeout(timeout);
    let client = QueueClient::from_token(&format!("{}/api", server.uri()), &token, &transport)
        .unwrap();
    (server, client)
}

async fn setup() -> (MockServer, QueueClient) {
    setup_with_timeout(Duration::from_secs(5)).await
}

fn item() -> DeviceQueueItem {
    DeviceQueueItem {
        confirmed: false,
        data: "AQAAAAAAAAAAZAA=".into(),
        dev_eui: DEV_EUI.into(),
        f_port: 10,
    }
}

fn queue_path() -> String {
    format!("/api/devices/{DEV_EUI}/queue")
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_enqueue_sends_bearer_token_and_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(queue_path()))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "deviceQueueItem": {
                "confirmed": false,
                "data": "AQAAAAAAAAAAZAA=",
                "devEUI": DEV_EUI,
                "fPort": 10
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "fCnt": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.enqueue(&item()).await.unwrap();
    assert_eq!(resp.f_cnt, Some(7));
}

#[tokio::test]
async fn test_enqueue_accepts_empty_success_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(queue_path()))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let resp = client.enqueue(&item()).await.unwrap();
    assert_eq!(resp, EnqueueResponse::default());
}

// ── Rejections ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_non_200_success_codes_are_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(queue_path()))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let result = client.enqueue(&item()).await;
    assert!(
        matches!(result, Err(Error::Rejected { status: 204, .. })),
        "expected Rejected(204), got: {result:?}"
    );
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(queue_path()))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let err = client.enqueue(&item()).await.unwrap_err();
    assert!(err.is_auth_rejected(), "expected auth rejection, got: {err:?}");
}

#[tokio::test]
async fn test_server_error_keeps_body_preview() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(queue_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("object does not exist"))
        .mount(&server)
        .await;

    match client.enqueue(&item()).await {
        Err(Error::Rejected { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("object does not exist"));
        }
        other => panic!("expected Rejected, got: {other:?}"),
    }
}

// ── Timeouts ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_slow_server_times_out() {
    let (server, client) = setup_with_timeout(Duration::from_millis(100)).await;

    Mock::given(method("POST"))
        .and(path(queue_path()))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let err = client.enqueue(&item()).await.unwrap_err();
    assert!(
        matches!(err, Error::Timeout { timeout_ms: 100 }),
        "expected Timeout, got: {err:?}"
    );
    assert!(err.is_transient());
}
