mod common;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weaver_cockpit::domain::models::{LEGACY_OUTLINE_ARTIFACT_PATH, OUTLINE_ARTIFACT_PATH};
use weaver_cockpit::services::{CockpitState, SharedCockpitState};
use weaver_cockpit::{CockpitStorage, MemoryKeyValueStore, Phase, PhaseRun, PollOutcome, WorkflowPoller};

const STATUS_PATH_P4: &str = "/api/projects/p1/phases/4/status";
const STATUS_PATH_P6: &str = "/api/projects/p1/phases/6/status";

async fn watching(server: &MockServer, phase: Phase, run_id: &str) -> (SharedCockpitState, WorkflowPoller, PhaseRun) {
    let store = Arc::new(MemoryKeyValueStore::new());
    let state = CockpitState::shared(CockpitStorage::open(store, Some("p1")).await);
    state.lock().await.begin_run(phase, run_id);

    let poller = WorkflowPoller::new(common::api_client(server), Arc::clone(&state), common::fast_poller());
    (state, poller, PhaseRun::new("p1", phase, run_id))
}

#[tokio::test]
async fn test_running_then_completed_with_serialized_outputs() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH_P4))
        .and(query_param("workflow_id", "run-4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::status_body("run-4", "running", json!(null))))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH_P4))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::status_body(
            "run-4",
            "completed",
            json!("{\"word_count\":500}"),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/projects/p1/progress"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::progress_body("p1", 25.0)))
        .mount(&server)
        .await;

    let phase = Phase::new(4).unwrap();
    let (state, poller, run) = watching(&server, phase, "run-4").await;

    let outcome = poller.start(run).wait().await;
    assert_eq!(outcome, PollOutcome::Completed(json!({"word_count": 500})));

    let state = state.lock().await;
    assert!(state.active_run(phase).is_none());
    assert!(state.running_phases().is_empty());
    assert!(state.dialog().open);
    assert_eq!(state.dialog().phase, Some(phase));
    assert_eq!(state.dialog().output, Some(json!({"word_count": 500})));
    assert_eq!(state.storage().phase_outputs()[&phase], json!({"word_count": 500}));
    assert_eq!(state.progress().map(|p| p.total_chapters), Some(12));

    assert_eq!(common::request_count(&server, STATUS_PATH_P4).await, 2);
    assert_eq!(common::request_count(&server, "/api/projects/p1/progress").await, 3);
}

#[tokio::test]
async fn test_outline_falls_back_to_legacy_artifact() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH_P6))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::status_body("run-6", "completed", json!({"a": 1}))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/projects/p1/artifacts/{OUTLINE_ARTIFACT_PATH}")))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/projects/p1/artifacts/{LEGACY_OUTLINE_ARTIFACT_PATH}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": "OUTLINE",
            "path": LEGACY_OUTLINE_ARTIFACT_PATH,
        })))
        .mount(&server)
        .await;

    let (state, poller, run) = watching(&server, Phase::OUTLINE, "run-6").await;
    poller.start(run).wait().await;

    let expected = json!({"a": 1, "outline": "OUTLINE"});
    let state = state.lock().await;
    assert_eq!(state.dialog().output.as_ref(), Some(&expected));
    assert_eq!(state.storage().phase_outputs()[&Phase::OUTLINE], expected);
}

#[tokio::test]
async fn test_outline_uses_primary_artifact_when_present() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH_P6))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::status_body("run-6", "completed", json!(null))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/projects/p1/artifacts/{OUTLINE_ARTIFACT_PATH}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "# Act I"})))
        .mount(&server)
        .await;

    let (state, poller, run) = watching(&server, Phase::OUTLINE, "run-6").await;
    poller.start(run).wait().await;

    let state = state.lock().await;
    assert_eq!(state.storage().phase_outputs()[&Phase::OUTLINE], json!({"outline": "# Act I"}));
    assert_eq!(
        common::request_count(&server, &format!("/api/projects/p1/artifacts/{LEGACY_OUTLINE_ARTIFACT_PATH}")).await,
        0
    );
}

#[tokio::test]
async fn test_fetch_errors_do_not_stop_polling() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH_P4))
        .respond_with(ResponseTemplate::new(503).set_body_string("engine restarting"))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH_P4))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH_P4))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::status_body("run-4", "completed", json!({"ok": true}))))
        .mount(&server)
        .await;

    let (state, poller, run) = watching(&server, Phase::new(4).unwrap(), "run-4").await;
    let outcome = poller.start(run).wait().await;

    assert_eq!(outcome, PollOutcome::Completed(json!({"ok": true})));
    assert_eq!(common::request_count(&server, STATUS_PATH_P4).await, 4);
    assert!(state.lock().await.dialog().open);
}

#[tokio::test]
async fn test_cancel_stops_further_fetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH_P4))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::status_body("run-4", "in-progress", json!(null))))
        .mount(&server)
        .await;

    let phase = Phase::new(4).unwrap();
    let (state, poller, run) = watching(&server, phase, "run-4").await;

    let handle = poller.start(run);
    tokio::time::sleep(Duration::from_millis(70)).await;
    handle.cancel();
    handle.cancel();
    assert_eq!(handle.wait().await, PollOutcome::Cancelled);

    let fetched = common::request_count(&server, STATUS_PATH_P4).await;
    assert!(fetched >= 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(common::request_count(&server, STATUS_PATH_P4).await, fetched);

    let state = state.lock().await;
    assert!(!state.dialog().open);
    assert!(state.storage().phase_outputs().is_empty());
    assert_eq!(state.activity(phase).map(|a| a.progress), Some(40.0));
}

#[tokio::test]
async fn test_first_probe_does_not_wait_for_interval() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH_P4))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::status_body("run-4", "in-progress", json!(null))))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryKeyValueStore::new());
    let state = CockpitState::shared(CockpitStorage::open(store, Some("p1")).await);
    state.lock().await.begin_run(Phase::new(4).unwrap(), "run-4");

    let mut slow = common::fast_poller();
    slow.interval = Duration::from_secs(60);
    let poller = WorkflowPoller::new(common::api_client(&server), state, slow);

    let handle = poller.start(PhaseRun::new("p1", Phase::new(4).unwrap(), "run-4"));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(common::request_count(&server, STATUS_PATH_P4).await, 1);
    drop(handle);
}
