//! End-to-end runs through the Orchestrator against a mock task API.

use apiprobe::config::HarnessConfig;
use apiprobe::error::{HarnessError, SessionError};
use apiprobe::fuzzer::HeaderPayload;
use apiprobe::models::{Classification, PhaseKind};
use apiprobe::scanner::{Orchestrator, OrchestratorState, RunMode};
use serde_json::json;
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(mock_server: &MockServer) -> HarnessConfig {
    let mut config = HarnessConfig::default().with_base_url(mock_server.uri());
    config.timeout_ms = 2000;
    config.identity.username = Some("alice".to_string());
    config.identity.email = Some("alice@example.com".to_string());
    config.identity.password = "pw123456".to_string();
    config
}

/// A well-behaved target: accepts the configured identity only.
async fn mount_task_api(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(201))
        .mount(mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_partial_json(json!({
            "identifier": "alice@example.com",
            "password": "pw123456"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"token": "tok"}})))
        .with_priority(1)
        .mount(mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(1)
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(401))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_auth_mode_on_well_behaved_target() {
    let mock_server = MockServer::start().await;
    mount_task_api(&mock_server).await;

    let mut orchestrator = Orchestrator::new(config(&mock_server), false).expect("orchestrator");
    let report = orchestrator.run(RunMode::Auth).await.expect("report");

    assert!(report.success);
    assert!(report.error.is_none());
    assert_eq!(report.score(PhaseKind::Authentication), Some(100));
    assert_eq!(report.composite_score, 100);
    assert_eq!(report.classification, Classification::Excellent);
    assert_eq!(report.phase_results.len(), 1);
    assert_eq!(orchestrator.state(), OrchestratorState::Done);
}

#[tokio::test]
async fn test_quick_mode_adds_baseline() {
    let mock_server = MockServer::start().await;
    mount_task_api(&mock_server).await;

    let mut orchestrator = Orchestrator::new(config(&mock_server), false).expect("orchestrator");
    let report = orchestrator.run(RunMode::Quick).await.expect("report");

    let baseline = report.baseline.as_ref().expect("baseline");
    assert!(baseline.connectivity);
    assert!(baseline.auth_protection);
    assert!(!baseline.rate_protection);

    let phase = &report.phase_results[&PhaseKind::Baseline];
    assert_eq!(phase.tested, 3);
    assert_eq!(phase.flagged, 1);
    assert_eq!(phase.score, 100);
    assert!(report.load.is_none());
    assert!(report.security.is_none());
}

#[tokio::test]
async fn test_failed_registration_aborts_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let mut orchestrator = Orchestrator::new(config(&mock_server), false).expect("orchestrator");
    let result = orchestrator.run(RunMode::Auth).await;

    assert!(matches!(
        result,
        Err(HarnessError::Session(SessionError::Registration(_)))
    ));
    assert_eq!(orchestrator.state(), OrchestratorState::Aborted);
}

#[tokio::test]
async fn test_failed_phase_keeps_completed_phases() {
    let mock_server = MockServer::start().await;
    mount_task_api(&mock_server).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(404))
        .with_priority(10)
        .mount(&mock_server)
        .await;

    let mut config = config(&mock_server);
    config.security.sql_injection = vec!["' OR 1=1--".into()];
    config.security.xss = vec!["<script>alert('XSS')</script>".into()];
    config.security.path_traversal = vec!["../../etc/passwd".into()];
    config.security.jwt_bypass = vec!["Bearer null".into()];
    config.security.brute_force_passwords = vec!["admin".into()];
    config.security.brute_force_delay_ms = 0;
    // reqwest refuses to send a header value containing CRLF, so every
    // header case fails before reaching the target.
    config.security.headers = vec![HeaderPayload {
        name: "X-Forwarded-For".into(),
        value: "127.0.0.1\r\nX-Injected: yes".into(),
    }];

    let mut orchestrator = Orchestrator::new(config, false).expect("orchestrator");
    let report = orchestrator.run(RunMode::Security).await.expect("partial report");

    assert!(!report.success);
    assert!(
        report
            .error
            .as_deref()
            .is_some_and(|e| e.contains("unreachable"))
    );
    assert_eq!(report.score(PhaseKind::Authentication), Some(100));
    assert!(!report.phase_results.contains_key(&PhaseKind::Security));
    assert!(report.security.is_none());
    assert_eq!(report.composite_score, 100);
    assert_eq!(orchestrator.state(), OrchestratorState::Aborted);
}
