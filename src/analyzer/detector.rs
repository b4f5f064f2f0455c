use regex::Regex;

use crate::models::{EvidenceKind, PayloadCase, PayloadCategory, ProbeOutcome};

use super::Verdict;
use super::status::StatusAnalyzer;

/// Heuristic, per-category response classifier. Matching is substring based
/// and will miss anything that does not leak a recognisable fingerprint.
pub struct VulnerabilityClassifier {
    db_error_patterns: Vec<Regex>,
    script_markers: Vec<Regex>,
    system_file_patterns: Vec<Regex>,
}

impl VulnerabilityClassifier {
    pub fn new() -> Self {
        let db_error_patterns = vec![
            Regex::new(r"(?i)sql syntax").unwrap(),
            Regex::new(r"(?i)mysql").unwrap(),
            Regex::new(r"(?i)sqlite").unwrap(),
            Regex::new(r"(?i)postgres").unwrap(),
            Regex::new(r"(?i)oracle").unwrap(),
            Regex::new(r"(?i)syntax error").unwrap(),
            Regex::new(r"(?i)unexpected").unwrap(),
            Regex::new(r"(?i)column").unwrap(),
            Regex::new(r"(?i)table").unwrap(),
            Regex::new(r"(?i)database error").unwrap(),
            Regex::new(r"(?i)query failed").unwrap(),
        ];

        let script_markers = vec![
            Regex::new(r"(?i)<script>").unwrap(),
            Regex::new(r"(?i)javascript:").unwrap(),
            Regex::new(r"(?i)onerror").unwrap(),
        ];

        let system_file_patterns = vec![
            Regex::new(r"(?i)passwd").unwrap(),
            Regex::new(r"(?i)shadow").unwrap(),
            Regex::new(r"(?i)hosts").unwrap(),
            Regex::new(r"(?i)boot\.ini").unwrap(),
            Regex::new(r"(?i)system32").unwrap(),
        ];

        Self {
            db_error_patterns,
            script_markers,
            system_file_patterns,
        }
    }

    /// Timeouts and transport failures are never flagged.
    pub fn classify(&self, case: &PayloadCase, outcome: &ProbeOutcome) -> Verdict {
        if outcome.is_lost() {
            return Verdict::Clean;
        }

        match case.category {
            PayloadCategory::SqlInjection => self.sql_injection(outcome),
            PayloadCategory::Xss => self.xss(&case.payload_value, outcome),
            PayloadCategory::PathTraversal => self.path_traversal(outcome),
            PayloadCategory::HeaderInjection => self.header_injection(outcome),
            PayloadCategory::JwtBypass => StatusAnalyzer::jwt_bypass(outcome),
            PayloadCategory::BruteForce => StatusAnalyzer::brute_force(outcome),
        }
    }

    fn sql_injection(&self, outcome: &ProbeOutcome) -> Verdict {
        let body = outcome.body().unwrap_or_default();

        if self.db_error_patterns.iter().any(|p| p.is_match(body)) {
            return Verdict::Vulnerable(EvidenceKind::ErrorLeak);
        }

        if outcome.status() == Some(500) && body.to_lowercase().contains("error") {
            return Verdict::Vulnerable(EvidenceKind::AnomalousStatus);
        }

        Self::refusal(outcome)
    }

    fn xss(&self, payload: &str, outcome: &ProbeOutcome) -> Verdict {
        if let ProbeOutcome::Success { body_snippet, .. } = outcome {
            let executable = self.script_markers.iter().any(|p| p.is_match(payload));
            if executable && body_snippet.contains(payload) {
                return Verdict::Vulnerable(EvidenceKind::ReflectedPayload);
            }
        }
        Self::refusal(outcome)
    }

    fn path_traversal(&self, outcome: &ProbeOutcome) -> Verdict {
        match outcome {
            ProbeOutcome::Success {
                status: 200,
                body_snippet,
                ..
            } if self.system_file_patterns.iter().any(|p| p.is_match(body_snippet)) => {
                Verdict::Vulnerable(EvidenceKind::ErrorLeak)
            }
            _ => Self::refusal(outcome),
        }
    }

    fn header_injection(&self, outcome: &ProbeOutcome) -> Verdict {
        match outcome {
            ProbeOutcome::ServerError { .. } => Verdict::Vulnerable(EvidenceKind::AnomalousStatus),
            ProbeOutcome::Success { headers, .. } => {
                let reflected = headers.iter().any(|(name, value)| {
                    name.to_lowercase().contains("x-injected")
                        || value.to_lowercase().contains("<script>")
                });
                if reflected {
                    Verdict::Vulnerable(EvidenceKind::ReflectedPayload)
                } else {
                    Self::refusal(outcome)
                }
            }
            _ => Verdict::Clean,
        }
    }

    fn refusal(outcome: &ProbeOutcome) -> Verdict {
        match outcome.status() {
            Some(429) => Verdict::RateLimited,
            Some(401 | 403) => Verdict::Rejected,
            _ => Verdict::Clean,
        }
    }
}

impl Default for VulnerabilityClassifier {
    fn default() -> Self {
        Self::new()
    }
}
