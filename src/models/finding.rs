use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use super::{BearerCredential, HttpMethod, ProbeRequest, login_body};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
}

impl Severity {
    pub fn numeric_value(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PayloadCategory {
    SqlInjection,
    Xss,
    PathTraversal,
    HeaderInjection,
    JwtBypass,
    BruteForce,
}

impl fmt::Display for PayloadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PayloadCategory::SqlInjection => "SQL Injection",
            PayloadCategory::Xss => "XSS",
            PayloadCategory::PathTraversal => "Path Traversal",
            PayloadCategory::HeaderInjection => "Header Injection",
            PayloadCategory::JwtBypass => "JWT Bypass",
            PayloadCategory::BruteForce => "Brute Force",
        };
        write!(f, "{}", s)
    }
}

impl PayloadCategory {
    pub fn severity(&self) -> Severity {
        match self {
            PayloadCategory::BruteForce | PayloadCategory::JwtBypass => Severity::Critical,
            PayloadCategory::SqlInjection | PayloadCategory::Xss | PayloadCategory::PathTraversal => {
                Severity::High
            }
            PayloadCategory::HeaderInjection => Severity::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceKind {
    ReflectedPayload,
    ErrorLeak,
    UnauthorizedSuccess,
    AnomalousStatus,
    /// The target stored the payload without rejecting it.
    StoredPayload,
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvidenceKind::ReflectedPayload => "reflected payload",
            EvidenceKind::ErrorLeak => "error leak",
            EvidenceKind::UnauthorizedSuccess => "unauthorized success",
            EvidenceKind::AnomalousStatus => "anomalous status",
            EvidenceKind::StoredPayload => "stored payload",
        };
        write!(f, "{}", s)
    }
}

/// Where a payload is placed in the outgoing probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjectionPoint {
    /// One field of the sample form record.
    BodyField(String),
    /// URL-encoded and appended to the endpoint path.
    PathSuffix,
    /// Value of the named request header.
    Header(String),
    /// Raw `Authorization` header value.
    Authorization,
    /// Password of a login attempt for the given identifier.
    LoginPassword(String),
    /// Title of a task created through the protected API.
    TaskTitle,
}

/// One payload aimed at one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadCase {
    pub category: PayloadCategory,
    pub method: HttpMethod,
    pub target_endpoint: String,
    pub injection: InjectionPoint,
    pub payload_value: String,
    pub requires_auth: bool,
}

impl PayloadCase {
    pub fn target_field(&self) -> Option<&str> {
        match &self.injection {
            InjectionPoint::BodyField(field) => Some(field),
            InjectionPoint::Header(name) => Some(name),
            InjectionPoint::LoginPassword(_) => Some("password"),
            InjectionPoint::TaskTitle => Some("title"),
            InjectionPoint::PathSuffix | InjectionPoint::Authorization => None,
        }
    }

    /// Builds the probe. The credential is attached only when the case needs it.
    pub fn to_probe(&self, timeout_ms: u64, credential: &BearerCredential) -> ProbeRequest {
        let request = match &self.injection {
            InjectionPoint::BodyField(field) => {
                ProbeRequest::new(self.method, self.target_endpoint.clone(), timeout_ms)
                    .with_body(sample_record(field, &self.payload_value))
            }
            InjectionPoint::PathSuffix => ProbeRequest::new(
                self.method,
                format!(
                    "{}{}",
                    self.target_endpoint,
                    urlencoding::encode(&self.payload_value)
                ),
                timeout_ms,
            ),
            InjectionPoint::Header(name) => {
                ProbeRequest::new(self.method, self.target_endpoint.clone(), timeout_ms)
                    .with_header(name.clone(), self.payload_value.clone())
            }
            InjectionPoint::Authorization => {
                let request =
                    ProbeRequest::new(self.method, self.target_endpoint.clone(), timeout_ms);
                if matches!(self.payload_value.as_str(), "null" | "undefined" | "") {
                    request
                } else {
                    request.with_header("Authorization", self.payload_value.clone())
                }
            }
            InjectionPoint::LoginPassword(identifier) => {
                ProbeRequest::new(self.method, self.target_endpoint.clone(), timeout_ms)
                    .with_body(login_body(identifier, &self.payload_value))
            }
            InjectionPoint::TaskTitle => {
                ProbeRequest::new(self.method, self.target_endpoint.clone(), timeout_ms).with_body(
                    json!({
                        "title": self.payload_value,
                        "description": format!("Test task with payload: {}", self.payload_value),
                        "completed": false,
                    }),
                )
            }
        };

        if self.requires_auth {
            request.authorized(credential)
        } else {
            request
        }
    }
}

/// Form record used by field injection cases, with `field` replaced.
pub fn sample_record(field: &str, payload: &str) -> serde_json::Value {
    let mut record = json!({
        "username": "testuser",
        "email": "test@example.com",
        "password": "testpassword",
        "name": "Test User",
        "title": "Test Task",
        "description": "Test Description",
    });
    record[field] = serde_json::Value::String(payload.to_string());
    record
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityFinding {
    pub category: PayloadCategory,
    pub endpoint: String,
    pub payload_excerpt: String,
    pub evidence_kind: EvidenceKind,
    pub severity: Severity,
    pub status: Option<u16>,
}

impl VulnerabilityFinding {
    pub fn new(
        case: &PayloadCase,
        evidence_kind: EvidenceKind,
        status: Option<u16>,
        excerpt_len: usize,
    ) -> Self {
        Self {
            category: case.category,
            endpoint: format!("{} {}", case.method, case.target_endpoint),
            payload_excerpt: excerpt(&case.payload_value, excerpt_len),
            evidence_kind,
            severity: case.category.severity(),
            status,
        }
    }
}

/// First `len` characters of `payload`, with `...` when cut.
pub fn excerpt(payload: &str, len: usize) -> String {
    if payload.chars().count() <= len {
        payload.to_string()
    } else {
        let mut cut: String = payload.chars().take(len).collect();
        cut.push_str("...");
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> BearerCredential {
        BearerCredential::from_login_body(r#"{"data":{"token":"tok"}}"#).unwrap()
    }

    fn case(injection: InjectionPoint, payload: &str, requires_auth: bool) -> PayloadCase {
        PayloadCase {
            category: PayloadCategory::Xss,
            method: HttpMethod::Post,
            target_endpoint: "/api/tasks".to_string(),
            injection,
            payload_value: payload.to_string(),
            requires_auth,
        }
    }

    #[test]
    fn test_body_field_replaces_only_target() {
        let probe = case(InjectionPoint::BodyField("title".into()), "<b>", true)
            .to_probe(1000, &credential());
        let body = probe.body.unwrap();
        assert_eq!(body["title"], "<b>");
        assert_eq!(body["description"], "Test Description");
        assert_eq!(
            probe.headers.get("Authorization").map(String::as_str),
            Some("Bearer tok")
        );
    }

    #[test]
    fn test_unauthenticated_case_has_no_credential() {
        let probe = case(InjectionPoint::BodyField("username".into()), "x", false)
            .to_probe(1000, &credential());
        assert!(!probe.headers.contains_key("Authorization"));
    }

    #[test]
    fn test_path_suffix_is_encoded() {
        let mut c = case(InjectionPoint::PathSuffix, "../../../etc/passwd", false);
        c.method = HttpMethod::Get;
        c.target_endpoint = "/api/tasks/".into();
        let probe = c.to_probe(1000, &credential());
        assert_eq!(probe.path, "/api/tasks/..%2F..%2F..%2Fetc%2Fpasswd");
        assert!(probe.body.is_none());
        assert_eq!(c.target_field(), None);
    }

    #[test]
    fn test_placeholder_authorization_is_omitted() {
        for payload in ["null", "undefined", ""] {
            let probe =
                case(InjectionPoint::Authorization, payload, false).to_probe(1000, &credential());
            assert!(!probe.headers.contains_key("Authorization"));
        }
        let probe = case(InjectionPoint::Authorization, "Bearer null", false)
            .to_probe(1000, &credential());
        assert_eq!(
            probe.headers.get("Authorization").map(String::as_str),
            Some("Bearer null")
        );
    }

    #[test]
    fn test_excerpt_truncates() {
        assert_eq!(excerpt("short", 50), "short");
        let long = "x".repeat(60);
        let cut = excerpt(&long, 50);
        assert_eq!(cut.len(), 53);
        assert!(cut.ends_with("..."));
    }
}
