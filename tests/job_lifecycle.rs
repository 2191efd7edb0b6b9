//! Integration tests for the job orchestrator
//!
//! These tests run a full job against a scripted transport under paused
//! time, so progress ticks, deadlines and the settle delay are deterministic.

mod common;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde_json::json;

use junction_client::app::{
    Direction, JobConfig, JobOrchestrator, JobPhase, JobState, ProgressConfig, RequestBody,
    Transition,
};
use junction_client::errors::{ErrorKind, JobError, TransportError, ValidationError};

use common::{flat_payload, nested_payload, videos, Reply, ScriptedTransport};

fn job_config() -> JobConfig {
    JobConfig::default().with_progress(ProgressConfig::default().with_seed(7))
}

fn orchestrator(transport: &Arc<ScriptedTransport>) -> JobOrchestrator<ScriptedTransport> {
    JobOrchestrator::new(Arc::clone(transport), job_config())
}

/// Record every published state until the job ends
fn collect_states(orchestrator: &JobOrchestrator<ScriptedTransport>) -> tokio::task::JoinHandle<Vec<JobState>> {
    let mut updates = orchestrator.subscribe();
    tokio::spawn(async move {
        let mut seen = Vec::new();
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            let done = state.phase.is_terminal();
            seen.push(state);
            if done {
                break;
            }
        }
        seen
    })
}

#[tokio::test(start_paused = true)]
async fn test_wrong_file_count_never_calls_backend() {
    let transport = Arc::new(ScriptedTransport::always(Reply::ok(
        Duration::ZERO,
        flat_payload(),
    )));
    let orchestrator = orchestrator(&transport);

    for count in [0, 3, 5] {
        orchestrator.select_files(videos(count));
        let error = orchestrator.submit().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(
            error,
            JobError::Validation(ValidationError::WrongFileCount {
                expected: 4,
                actual: count
            })
        );
        assert_eq!(orchestrator.snapshot().phase, JobPhase::Idle);
    }

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_successful_job_progress_and_result() {
    // Well inside the 15 s default deadline, long enough for a dozen ticks
    let transport = Arc::new(ScriptedTransport::always(Reply::ok(
        Duration::from_secs(10),
        flat_payload(),
    )));
    let orchestrator = orchestrator(&transport);
    assert!(orchestrator.config().request_timeout > Duration::from_secs(10));
    let states = collect_states(&orchestrator);

    orchestrator.select_files(videos(4));
    assert_eq!(orchestrator.submit().unwrap(), Transition::Applied);

    let finished = orchestrator.wait_for_terminal().await;
    let states = states.await.unwrap();

    assert_eq!(finished.phase, JobPhase::Completed);
    assert_eq!(finished.job_id, 1);
    assert!(finished.error.is_none());
    let result = finished.result.unwrap();
    assert_eq!(result.seconds(Direction::South), 12);
    assert_eq!(result.cycle_seconds(), 39);

    // Simulated progress stays below the cap and never goes backwards
    let uploading: Vec<f64> = states
        .iter()
        .filter(|s| s.phase == JobPhase::Uploading)
        .map(|s| s.progress)
        .collect();
    assert!(!uploading.is_empty());
    assert!(uploading.iter().all(|p| *p <= 90.0));
    assert!(uploading.windows(2).all(|pair| pair[0] <= pair[1]));

    let settling = states
        .iter()
        .find(|s| s.phase == JobPhase::Settling)
        .expect("settling state published");
    assert_eq!(settling.progress, 100.0);
    assert_eq!(states.last().unwrap().progress, 100.0);
}

#[tokio::test(start_paused = true)]
async fn test_upload_request_shape() {
    let transport = Arc::new(ScriptedTransport::always(Reply::ok(
        Duration::ZERO,
        flat_payload(),
    )));
    let orchestrator = JobOrchestrator::new(
        Arc::clone(&transport),
        job_config().with_request_timeout(Duration::from_secs(42)),
    );

    orchestrator.select_files(videos(4));
    orchestrator.submit().unwrap();
    orchestrator.wait_for_terminal().await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let upload = &requests[0];
    assert_eq!(upload.method, Method::POST);
    assert_eq!(upload.path, "/upload");
    assert_eq!(upload.timeout, Some(Duration::from_secs(42)));
    match &upload.body {
        RequestBody::Multipart(parts) => {
            assert_eq!(parts.len(), 4);
            assert!(parts.iter().all(|p| p.field == "videos"));
            assert_eq!(parts[2].file.name, "lane_2.mp4");
        }
        other => panic!("Expected multipart body, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_submit_while_active_is_ignored() {
    let transport = Arc::new(ScriptedTransport::always(Reply::ok(
        Duration::from_secs(3),
        flat_payload(),
    )));
    let orchestrator = orchestrator(&transport);
    orchestrator.select_files(videos(4));
    orchestrator.submit().unwrap();

    assert_eq!(orchestrator.submit().unwrap(), Transition::Ignored);
    assert_eq!(orchestrator.select_files(videos(2)), Transition::Ignored);

    let mut updates = orchestrator.subscribe();
    let phase = updates
        .wait_for(|s| s.phase == JobPhase::Settling)
        .await
        .map(|s| s.phase)
        .unwrap();
    assert_eq!(phase, JobPhase::Settling);
    assert_eq!(orchestrator.submit().unwrap(), Transition::Ignored);

    let finished = orchestrator.wait_for_terminal().await;
    assert_eq!(finished.phase, JobPhase::Completed);
    assert_eq!(finished.job_id, 1);
    assert_eq!(finished.selection.len(), 4);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_fails_and_stops_progress() {
    let transport = Arc::new(ScriptedTransport::always(Reply::Never));
    let orchestrator = JobOrchestrator::new(
        Arc::clone(&transport),
        job_config().with_request_timeout(Duration::from_secs(2)),
    );

    orchestrator.select_files(videos(4));
    orchestrator.submit().unwrap();
    let finished = orchestrator.wait_for_terminal().await;

    assert_eq!(finished.phase, JobPhase::Failed);
    let error = finished.error.clone().unwrap();
    assert_eq!(error.kind(), ErrorKind::Timeout);
    assert!(finished.result.is_none());
    assert!(finished.progress < 100.0);

    // No progress tick lands after the failure
    let mut updates = orchestrator.subscribe();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(!updates.has_changed().unwrap());
    assert_eq!(orchestrator.snapshot(), finished);
}

#[tokio::test(start_paused = true)]
async fn test_http_error_keeps_status_and_body() {
    let body = json!({"error": "Please upload exactly 4 videos", "detail": "got 3"});
    let transport = Arc::new(ScriptedTransport::always(Reply::err(
        Duration::from_millis(300),
        TransportError::Http {
            status: 400,
            message: "Please upload exactly 4 videos".to_string(),
            body: Some(body.clone()),
        },
    )));
    let orchestrator = orchestrator(&transport);

    orchestrator.select_files(videos(4));
    orchestrator.submit().unwrap();
    let finished = orchestrator.wait_for_terminal().await;

    let error = finished.error.unwrap();
    assert_eq!(error.kind(), ErrorKind::Http);
    assert_eq!(error.status_code(), Some(400));
    assert_eq!(error.body(), Some(&body));
}

#[tokio::test(start_paused = true)]
async fn test_nested_payload_with_recommendation() {
    let transport = Arc::new(ScriptedTransport::always(Reply::ok(
        Duration::from_secs(1),
        nested_payload(),
    )));
    let orchestrator = orchestrator(&transport);

    orchestrator.select_files(videos(4));
    orchestrator.submit().unwrap();
    let finished = orchestrator.wait_for_terminal().await;

    let result = finished.result.unwrap();
    assert_eq!(result.seconds(Direction::North), 20);
    assert_eq!(result.seconds(Direction::West), 18);
    assert_eq!(result.cycle_seconds(), 75);
    let recommendation = result.recommendation.unwrap();
    assert_eq!(recommendation.direction, "East");
    assert_eq!(recommendation.timer_seconds, 25);
}

#[tokio::test(start_paused = true)]
async fn test_backend_reported_error_payload() {
    let transport = Arc::new(ScriptedTransport::always(Reply::ok(
        Duration::from_secs(1),
        json!({"error": "Optimizer crashed"}),
    )));
    let orchestrator = orchestrator(&transport);

    orchestrator.select_files(videos(4));
    orchestrator.submit().unwrap();
    let finished = orchestrator.wait_for_terminal().await;

    assert_eq!(finished.phase, JobPhase::Failed);
    let error = finished.error.unwrap();
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert_eq!(error.message(), "Optimizer crashed");
}

#[tokio::test(start_paused = true)]
async fn test_reset_then_resubmit() {
    let transport = Arc::new(ScriptedTransport::scripted(
        vec![Reply::err(
            Duration::from_millis(500),
            TransportError::network("connection refused"),
        )],
        Reply::ok(Duration::from_millis(500), flat_payload()),
    ));
    let orchestrator = orchestrator(&transport);

    orchestrator.select_files(videos(4));
    orchestrator.submit().unwrap();
    let failed = orchestrator.wait_for_terminal().await;
    assert_eq!(failed.error.unwrap().kind(), ErrorKind::Network);

    // A finished job must be reset before the next submission
    let error = orchestrator.submit().unwrap_err();
    assert!(matches!(
        error,
        JobError::Validation(ValidationError::NotIdle {
            phase: JobPhase::Failed
        })
    ));

    assert_eq!(orchestrator.reset(), Transition::Applied);
    let idle = orchestrator.snapshot();
    assert_eq!(idle.phase, JobPhase::Idle);
    assert_eq!(idle.progress, 0.0);
    assert!(idle.error.is_none());
    assert_eq!(idle.selection.len(), 4);

    orchestrator.submit().unwrap();
    let finished = orchestrator.wait_for_terminal().await;
    assert_eq!(finished.phase, JobPhase::Completed);
    assert_eq!(finished.job_id, 2);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_running_job() {
    let transport = Arc::new(ScriptedTransport::always(Reply::Never));
    let orchestrator = JobOrchestrator::new(
        Arc::clone(&transport),
        job_config().with_request_timeout(Duration::from_secs(600)),
    );
    orchestrator.select_files(videos(4));
    orchestrator.submit().unwrap();

    let mut updates = orchestrator.subscribe();
    let progress = updates
        .wait_for(|s| s.progress > 0.0)
        .await
        .map(|s| s.progress)
        .unwrap();
    assert!(progress > 0.0);

    drop(orchestrator);
    let cancelled = updates.borrow_and_update().clone();
    assert_eq!(cancelled.phase, JobPhase::Idle);
    assert_eq!(cancelled.progress, 0.0);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(*updates.borrow(), cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_then_reset_and_resubmit() {
    let transport = Arc::new(ScriptedTransport::scripted(
        vec![Reply::Never],
        Reply::ok(Duration::from_secs(2), flat_payload()),
    ));
    let orchestrator = orchestrator(&transport);
    orchestrator.select_files(videos(4));
    orchestrator.submit().unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    orchestrator.shutdown();
    tokio::time::sleep(Duration::from_secs(10)).await;

    let cancelled = orchestrator.snapshot();
    assert_eq!(cancelled.phase, JobPhase::Idle);
    assert!(cancelled.error.is_none());
    assert_eq!(cancelled.selection.len(), 4);

    orchestrator.reset();
    assert_eq!(orchestrator.submit().unwrap(), Transition::Applied);
    let finished = orchestrator.wait_for_terminal().await;

    assert_eq!(finished.phase, JobPhase::Completed);
    assert_eq!(finished.job_id, 2);
    assert_eq!(transport.calls(), 2);
}
