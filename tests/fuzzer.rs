//! Attack campaigns against mock targets with known weaknesses.

use std::sync::Arc;

use apiprobe::config::HarnessConfig;
use apiprobe::http::ProbeDispatcher;
use apiprobe::models::{BearerCredential, CampaignKind, EvidenceKind, Severity};
use apiprobe::scanner::PayloadFuzzer;
use serde_json::json;
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(mock_server: &MockServer) -> HarnessConfig {
    let mut config = HarnessConfig::default().with_base_url(mock_server.uri());
    config.timeout_ms = 2000;
    config.security.brute_force_delay_ms = 0;
    config
}

fn fuzzer(config: HarnessConfig) -> PayloadFuzzer {
    let dispatcher = ProbeDispatcher::new(&config.base_url, 16).expect("client");
    let credential = BearerCredential::from_login_body(r#"{"token":"valid"}"#).expect("token");
    PayloadFuzzer::new(Arc::new(dispatcher), config, credential, false)
}

#[tokio::test]
async fn test_brute_force_counts_rate_limited_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_partial_json(json!({"password": "password"})))
        .respond_with(ResponseTemplate::new(429))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let mut config = config(&mock_server);
    config.security.brute_force_passwords =
        vec!["admin".into(), "password".into(), "123456".into()];

    let result = fuzzer(config).run_campaign(CampaignKind::BruteForce).await;

    assert_eq!(result.tested, 3);
    assert_eq!(result.rate_limited, 1);
    assert_eq!(result.rejected, 2);
    assert!(!result.is_vulnerable());

    let received = mock_server.received_requests().await.expect("recording");
    assert_eq!(received.len(), 3);
}

#[tokio::test]
async fn test_brute_force_success_is_critical() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_partial_json(json!({"password": "admin123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "stolen"})))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let mut config = config(&mock_server);
    config.security.brute_force_passwords = vec!["admin".into(), "admin123".into()];

    let result = fuzzer(config).run_campaign(CampaignKind::BruteForce).await;
    assert_eq!(result.flagged, 1);
    assert_eq!(result.findings[0].severity, Severity::Critical);
    assert_eq!(result.findings[0].status, Some(200));
}

#[tokio::test]
async fn test_forged_token_accepted_is_flagged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(header("Authorization", "Bearer null"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let mut config = config(&mock_server);
    config.security.jwt_bypass = vec!["Bearer null".into(), "Bearer invalid.token.here".into()];

    let result = fuzzer(config).run_campaign(CampaignKind::JwtBypass).await;

    assert_eq!(result.tested, 2);
    assert_eq!(result.flagged, 1);
    assert_eq!(result.rejected, 1);
    assert_eq!(
        result.findings[0].evidence_kind,
        EvidenceKind::UnauthorizedSuccess
    );
    assert_eq!(result.findings[0].payload_excerpt, "Bearer null");
}

#[tokio::test]
async fn test_leaked_database_error_is_flagged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("You have an error in your SQL syntax near '' OR 1=1--'"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Dados inválidos"})))
        .mount(&mock_server)
        .await;

    let mut config = config(&mock_server);
    config.security.sql_injection = vec!["' OR 1=1--".into()];

    let result = fuzzer(config).run_campaign(CampaignKind::SqlInjection).await;

    assert_eq!(result.tested, 4);
    assert_eq!(result.flagged, 2);
    assert!(
        result
            .findings
            .iter()
            .all(|f| f.evidence_kind == EvidenceKind::ErrorLeak && f.endpoint.contains("login"))
    );
}

#[tokio::test]
async fn test_hardened_target_has_no_findings() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let assessment = fuzzer(config(&mock_server))
        .run_all()
        .await
        .expect("assessment");

    assert_eq!(assessment.campaigns.len(), CampaignKind::ALL.len());
    assert_eq!(assessment.total_flagged(), 0);
    assert_eq!(assessment.total_tested(), 147);
    assert!(assessment.findings().is_empty());
}

#[tokio::test]
async fn test_stored_payload_found_deep_in_task_listing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let listing = format!(
        "[{}{{\"title\":\"<script>alert('XSS')</script>\"}}]",
        r#"{"title":"Test task","completed":false},"#.repeat(120)
    );
    assert!(listing.len() > 4096);
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing))
        .mount(&mock_server)
        .await;

    let mut config = config(&mock_server);
    config.security.xss = vec!["<script>alert('XSS')</script>".into()];
    config.security.sql_injection = vec!["' OR 1=1--".into()];

    let result = fuzzer(config)
        .run_campaign(CampaignKind::AuthenticatedRoutes)
        .await;

    assert_eq!(result.tested, 2);
    assert_eq!(result.flagged, 2);
    assert!(
        result
            .findings
            .iter()
            .all(|f| f.evidence_kind == EvidenceKind::StoredPayload)
    );
    assert_eq!(
        result.notes,
        vec!["payload returned unescaped in task list: <script>alert('XSS')</script>"]
    );
}
