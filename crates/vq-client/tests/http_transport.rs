// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transport-level tests against a mock platform: headers, organization
//! scoping, retry behaviour, and error classification.

use std::time::Duration;
use vq_client::{ClientConfig, HttpPlatformClient, PlatformApi, RetryPolicy};
use vq_core::{CheckpointId, GoalId, JourneyId, ProjectId, ResourceKind};
use vq_error::ErrorKind;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpPlatformClient {
    let config = ClientConfig::new("tok-123", "org-9", "cli-id", "api-cli")
        .with_base_url(server.uri());
    HttpPlatformClient::new(config).unwrap()
}

fn fast_retry_client(server: &MockServer) -> HttpPlatformClient {
    let mut config = ClientConfig::new("tok-123", "org-9", "cli-id", "api-cli")
        .with_base_url(server.uri());
    config.retry = RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::from_millis(1),
        jitter_factor: 0.0,
    };
    HttpPlatformClient::new(config).unwrap()
}

#[tokio::test]
async fn requests_carry_all_three_headers_and_org_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(header("Authorization", "Bearer tok-123"))
        .and(header("X-Virtuoso-Client-ID", "cli-id"))
        .and(header("X-Virtuoso-Client-Name", "api-cli"))
        .and(query_param("organizationId", "org-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "name": "Demo"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let projects = client_for(&server).list_projects().await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, ProjectId(1));
}

#[tokio::test]
async fn create_goal_posts_body_and_parses_implicit_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/goals"))
        .and(body_partial_json(serde_json::json!({
            "projectId": 5,
            "name": "Login",
            "url": "https://app.example/login"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 9, "name": "Login", "snapshotId": 31, "initialJourneyId": 12
        })))
        .mount(&server)
        .await;

    let created = client_for(&server)
        .create_goal(ProjectId(5), "Login", Some("https://app.example/login"))
        .await
        .unwrap();
    assert_eq!(created.id, GoalId(9));
    assert_eq!(created.snapshot_id.as_u32(), 31);
    assert_eq!(created.initial_journey_id.as_u32(), 12);
}

#[tokio::test]
async fn add_step_retries_5xx_when_run_tagged() {
    let server = MockServer::start().await;
    // First two attempts fail with 503, the third succeeds.
    Mock::given(method("POST"))
        .and(path("/teststeps"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/teststeps"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 777})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_retry_client(&server).tagged("r1");
    let payload = vq_catalog_payload();
    let created = client.add_step(&payload).await.unwrap();
    assert_eq!(created.id.as_u32(), 777);
}

#[tokio::test]
async fn untagged_add_step_does_not_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/teststeps"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_retry_client(&server);
    let err = client.add_step(&vq_catalog_payload()).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Remote5xx);
    assert_eq!(err.attempts, Some(1));
}

#[tokio::test]
async fn auth_failure_is_classified_with_hint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).list_projects().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Auth);
    assert_eq!(err.remote_status, Some(401));
    assert!(err.hint.as_deref().unwrap().contains("VIRTUOSO_API_TOKEN"));
}

#[tokio::test]
async fn not_found_and_conflict_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/goals/404"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = fast_retry_client(&server)
        .get_goal(GoalId(404))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn rate_limit_honours_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/executions/3"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/executions/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"id": 3, "status": "PASSED"}),
        ))
        .mount(&server)
        .await;

    let started = std::time::Instant::now();
    let execution = fast_retry_client(&server)
        .get_execution(vq_core::ExecutionId(3))
        .await
        .unwrap();
    assert_eq!(execution.status, vq_client::ExecutionStatus::Passed);
    // Server advised 1 s; the classifier clamps to at least that.
    assert!(started.elapsed() >= Duration::from_millis(900));
}

#[tokio::test]
async fn attach_accepts_empty_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/testsuites/12/checkpoints/attach"))
        .and(body_partial_json(serde_json::json!({
            "checkpointId": 50, "position": 1
        })))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client_for(&server)
        .attach_checkpoint(JourneyId(12), CheckpointId(50), 1)
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_uses_canonical_collection_paths() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/testcases/8"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .delete_resource(ResourceKind::Checkpoint, 8)
        .await
        .unwrap();
}

#[tokio::test]
async fn run_tag_is_embedded_in_create_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects"))
        .and(body_partial_json(serde_json::json!({
            "name": "P", "tags": ["run:r42"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"id": 1, "name": "P", "tags": ["run:r42"]}),
        ))
        .mount(&server)
        .await;

    let project = client_for(&server)
        .tagged("r42")
        .create_project("P")
        .await
        .unwrap();
    assert_eq!(project.tags, vec!["run:r42".to_string()]);
}

#[tokio::test]
async fn connection_refused_is_transport() {
    // Nothing is listening on this port.
    let mut config = ClientConfig::new("t", "o", "c", "n")
        .with_base_url("http://127.0.0.1:1");
    config.retry = RetryPolicy::no_retries();
    let client = HttpPlatformClient::new(config).unwrap();
    let err = client.list_projects().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Transport);
}

fn vq_catalog_payload() -> vq_core::StepPayload {
    vq_core::StepPayload {
        checkpoint_id: CheckpointId(1),
        position: 1,
        parsed_step: vq_core::ParsedStep::bare(vq_core::ActionCode::Navigate),
    }
}
