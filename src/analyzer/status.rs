use crate::models::{BearerCredential, EvidenceKind, ProbeOutcome};

use super::Verdict;

/// Verdicts that depend only on the response status.
pub struct StatusAnalyzer;

impl StatusAnalyzer {
    /// A forged or missing token must be refused. Any 2xx is a bypass; other
    /// unexpected statuses are noted but not flagged.
    pub fn jwt_bypass(outcome: &ProbeOutcome) -> Verdict {
        match outcome.status() {
            Some(200..=299) => Verdict::Vulnerable(EvidenceKind::UnauthorizedSuccess),
            Some(401 | 403) => Verdict::Rejected,
            Some(429) => Verdict::RateLimited,
            Some(status) => Verdict::Unexpected(status),
            None => Verdict::Clean,
        }
    }

    /// A guessed password that yields a token is a successful break-in.
    pub fn brute_force(outcome: &ProbeOutcome) -> Verdict {
        match outcome {
            ProbeOutcome::Success {
                status: 200,
                body_snippet,
                ..
            } if BearerCredential::from_login_body(body_snippet).is_some() => {
                Verdict::Vulnerable(EvidenceKind::UnauthorizedSuccess)
            }
            ProbeOutcome::Success { status: 429, .. } => Verdict::RateLimited,
            ProbeOutcome::Success { status: 401, .. } => Verdict::Rejected,
            _ => Verdict::Clean,
        }
    }

    /// Replayed task titles: the target accepted and stored the payload.
    pub fn task_created(outcome: &ProbeOutcome) -> Verdict {
        match outcome.status() {
            Some(201) => Verdict::Vulnerable(EvidenceKind::StoredPayload),
            Some(429) => Verdict::RateLimited,
            Some(401 | 403) => Verdict::Rejected,
            _ => Verdict::Clean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn mock_response(status: u16, body: &str) -> ProbeOutcome {
        ProbeOutcome::Success {
            status,
            body_snippet: body.to_string(),
            headers: BTreeMap::new(),
            latency_ms: 4,
        }
    }

    #[test]
    fn test_jwt_bypass_on_success() {
        assert_eq!(
            StatusAnalyzer::jwt_bypass(&mock_response(200, "[]")),
            Verdict::Vulnerable(EvidenceKind::UnauthorizedSuccess)
        );
    }

    #[test]
    fn test_jwt_proper_enforcement() {
        assert_eq!(StatusAnalyzer::jwt_bypass(&mock_response(403, "")), Verdict::Rejected);
        assert_eq!(StatusAnalyzer::jwt_bypass(&mock_response(401, "")), Verdict::Rejected);
    }

    #[test]
    fn test_jwt_unexpected_status_is_only_noted() {
        assert_eq!(
            StatusAnalyzer::jwt_bypass(&mock_response(404, "")),
            Verdict::Unexpected(404)
        );
        let server = ProbeOutcome::ServerError {
            status: 500,
            body_snippet: String::new(),
            latency_ms: 1,
        };
        assert_eq!(StatusAnalyzer::jwt_bypass(&server), Verdict::Unexpected(500));
        assert_eq!(
            StatusAnalyzer::jwt_bypass(&ProbeOutcome::Timeout { latency_ms: 1 }),
            Verdict::Clean
        );
    }

    #[test]
    fn test_brute_force_needs_token() {
        let hit = mock_response(200, r#"{"data":{"token":"abc"}}"#);
        assert_eq!(
            StatusAnalyzer::brute_force(&hit),
            Verdict::Vulnerable(EvidenceKind::UnauthorizedSuccess)
        );
        assert_eq!(
            StatusAnalyzer::brute_force(&mock_response(200, r#"{"ok":true}"#)),
            Verdict::Clean
        );
        assert_eq!(StatusAnalyzer::brute_force(&mock_response(429, "")), Verdict::RateLimited);
        assert_eq!(StatusAnalyzer::brute_force(&mock_response(401, "")), Verdict::Rejected);
    }

    #[test]
    fn test_task_created() {
        assert!(StatusAnalyzer::task_created(&mock_response(201, "")).is_vulnerable());
        assert!(!StatusAnalyzer::task_created(&mock_response(400, "")).is_vulnerable());
    }
}
