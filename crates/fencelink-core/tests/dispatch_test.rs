// Integration tests for the geofence write + dispatch path against a
// wiremock network server.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fencelink_core::{
    DeviceGroup, DeviceId, DispatchConfig, DispatchPool, DispatchReporter, Dispatcher,
    EntityId, Frame, GeofenceDraft, GeofenceService, Geometry, MemoryStore, Orchestrator,
    RecordingReporter, Scheduling, SkipReason,
};

// ── Helpers ─────────────────────────────────────────────────────────

struct Harness {
    service: GeofenceService<MemoryStore, MemoryStore>,
    pool: Arc<DispatchPool>,
    reporter: Arc<RecordingReporter>,
}

fn harness(server: &MockServer, timeout: Duration, groups: Vec<DeviceGroup>) -> Harness {
    let mut config = DispatchConfig::new(
        format!("{}/api", server.uri()).parse().unwrap(),
        SecretString::from("test-token".to_string()),
    );
    config.timeout = timeout;

    let reporter = Arc::new(RecordingReporter::new());
    let shared: Arc<dyn DispatchReporter> = reporter.clone();

    let dispatcher = Dispatcher::from_config(&config, Arc::clone(&shared)).unwrap();
    let pool = Arc::new(DispatchPool::start(dispatcher, config.pool));
    let store = Arc::new(MemoryStore::with_groups(groups));
    let orchestrator = Orchestrator::new(Arc::clone(&store), Arc::clone(&pool), shared);

    Harness {
        service: GeofenceService::new(store, orchestrator),
        pool,
        reporter,
    }
}

fn devices(euis: &[&str]) -> Vec<DeviceId> {
    euis.iter().copied().map(DeviceId::from).collect()
}

fn santiago_circle(group: i64) -> GeofenceDraft {
    GeofenceDraft::new(group, Geometry::circle(-33.45, -70.66, Some(50)))
}

fn expected_payload() -> String {
    let mut raw = vec![0x01];
    raw.extend_from_slice(&(-33.45_f32).to_le_bytes());
    raw.extend_from_slice(&(-70.66_f32).to_le_bytes());
    raw.extend_from_slice(&50_u16.to_le_bytes());
    Frame::try_from(raw.as_slice()).unwrap().to_base64()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_end_to_end_circle_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/devices/0011223344556677/queue"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "deviceQueueItem": {
                "confirmed": false,
                "data": expected_payload(),
                "devEUI": "0011223344556677",
                "fPort": 10
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fCnt": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(
        &server,
        Duration::from_secs(5),
        vec![DeviceGroup::new(1, devices(&["0011223344556677"]))],
    );

    let geofence = h.service.create(santiago_circle(1)).await.unwrap();
    h.pool.shutdown().await;

    assert_eq!(geofence.id, EntityId::Int(1));
    let outcome = h
        .reporter
        .outcome_for(&DeviceId::from("0011223344556677"))
        .unwrap();
    assert!(outcome.delivered);
    assert_eq!(outcome.f_cnt, Some(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_device_does_not_affect_others() {
    let server = MockServer::start().await;

    for eui in ["dev1", "dev3"] {
        Mock::given(method("POST"))
            .and(path(format!("/api/devices/{eui}/queue")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/api/devices/dev2/queue"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let h = harness(
        &server,
        Duration::from_millis(200),
        vec![DeviceGroup::new(7, devices(&["dev1", "dev2", "dev3"]))],
    );

    let created = h.service.create(santiago_circle(7)).await;
    assert!(created.is_ok());

    h.pool.shutdown().await;

    let delivered = |eui: &str| {
        h.reporter
            .outcome_for(&DeviceId::from(eui))
            .unwrap()
            .delivered
    };
    assert!(delivered("dev1"));
    assert!(!delivered("dev2"));
    assert!(delivered("dev3"));

    let slow = h.reporter.outcome_for(&DeviceId::from("dev2")).unwrap();
    assert!(slow.error.unwrap().contains("timed out"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_write_returns_without_waiting_for_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let h = harness(
        &server,
        Duration::from_millis(500),
        vec![DeviceGroup::new(1, devices(&["aa", "bb"]))],
    );

    let started = Instant::now();
    h.service.create(santiago_circle(1)).await.unwrap();
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(250),
        "create waited {elapsed:?} for dispatch"
    );
    assert!(h.reporter.outcomes().is_empty());

    h.pool.shutdown().await;
    assert_eq!(h.reporter.outcomes().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_devices_beyond_worker_count_do_not_delay_others() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/devices/zfast/queue"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    // Default pool: four workers, all of them handed a slow device first.
    let h = harness(
        &server,
        Duration::from_millis(1500),
        vec![DeviceGroup::new(
            1,
            devices(&["s1", "s2", "s3", "s4", "zfast"]),
        )],
    );

    let started = Instant::now();
    h.service.create(santiago_circle(1)).await.unwrap();

    let fast = DeviceId::from("zfast");
    while h.reporter.outcome_for(&fast).is_none() {
        assert!(
            started.elapsed() < Duration::from_secs(1),
            "fast device held back by slow peers"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(h.reporter.outcome_for(&fast).unwrap().delivered);

    h.pool.shutdown().await;
    assert_eq!(h.reporter.outcomes().len(), 5);
    for eui in ["s1", "s2", "s3", "s4"] {
        assert!(!h.reporter.outcome_for(&DeviceId::from(eui)).unwrap().delivered);
    }
}

#[tokio::test]
async fn test_non_200_is_a_failed_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let h = harness(
        &server,
        Duration::from_secs(5),
        vec![DeviceGroup::new(1, devices(&["aa"]))],
    );
    h.service.create(santiago_circle(1)).await.unwrap();
    h.pool.shutdown().await;

    let outcome = h.reporter.outcome_for(&DeviceId::from("aa")).unwrap();
    assert!(!outcome.delivered);
    assert!(outcome.error.unwrap().contains("202"));
}

#[tokio::test]
async fn test_empty_group_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(
        &server,
        Duration::from_secs(5),
        vec![DeviceGroup::new(1, Vec::<DeviceId>::new())],
    );
    let geofence = h.service.create(santiago_circle(1)).await.unwrap();

    let scheduling = h.service.orchestrator().on_geofence_write(&geofence).await;
    assert_eq!(scheduling, Scheduling::Skipped(SkipReason::EmptyGroup));

    h.pool.shutdown().await;
    assert_eq!(
        h.reporter.skips(),
        vec![SkipReason::EmptyGroup, SkipReason::EmptyGroup]
    );
    assert!(h.reporter.outcomes().is_empty());
}

#[tokio::test]
async fn test_missing_group_write_still_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, Duration::from_secs(5), Vec::new());
    let geofence = h.service.create(santiago_circle(42)).await.unwrap();
    h.pool.shutdown().await;

    assert_eq!(h.service.get(&geofence.id).await.unwrap(), geofence);
    assert_eq!(h.reporter.skips(), vec![SkipReason::GroupNotFound]);
}

#[tokio::test]
async fn test_update_redispatches_and_delete_does_not() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/devices/aa/queue"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let h = harness(
        &server,
        Duration::from_secs(5),
        vec![DeviceGroup::new(1, devices(&["aa"]))],
    );

    let created = h.service.create(santiago_circle(1)).await.unwrap();
    let polygon = GeofenceDraft::new(1, Geometry::polygon([(0.0, 0.0), (0.0, 2.0), (2.0, 0.0)]));
    let updated = h.service.update(&created.id, polygon).await.unwrap();
    assert_eq!(updated.id, created.id);

    h.service.delete(&created.id).await.unwrap();
    assert!(h.service.list_by_group(&EntityId::Int(1)).await.unwrap().is_empty());

    h.pool.shutdown().await;
    assert_eq!(h.reporter.outcomes().len(), 2);
}

#[tokio::test]
async fn test_update_unknown_geofence_is_not_found() {
    let server = MockServer::start().await;
    let h = harness(&server, Duration::from_secs(5), Vec::new());

    let err = h
        .service
        .update(&EntityId::Int(5), santiago_circle(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        fencelink_core::CoreError::GeofenceNotFound { .. }
    ));

    assert!(h.service.delete(&EntityId::Int(5)).await.is_err());
    h.pool.shutdown().await;
    assert!(h.reporter.outcomes().is_empty());
}
