use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use super::BearerCredential;

/// Upper bound on the response body kept per probe.
pub const BODY_SNIPPET_LIMIT: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        };
        f.pad(s)
    }
}

/// A single outbound request. Builder methods consume `self`, so a probe
/// handed to the dispatcher is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
    pub timeout_ms: u64,
    /// Bytes of the response body read before the rest is dropped.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

fn default_body_limit() -> usize {
    BODY_SNIPPET_LIMIT
}

impl ProbeRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout_ms,
            body_limit: BODY_SNIPPET_LIMIT,
        }
    }

    pub fn get(path: impl Into<String>, timeout_ms: u64) -> Self {
        Self::new(HttpMethod::Get, path, timeout_ms)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value, timeout_ms: u64) -> Self {
        Self::new(HttpMethod::Post, path, timeout_ms).with_body(body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// Attaches `Authorization: Bearer <token>`.
    pub fn authorized(self, credential: &BearerCredential) -> Self {
        self.with_header("Authorization", credential.header_value())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn display_path(&self) -> String {
        format!("{:6} {}", self.method, self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    Success,
    Timeout,
    NetworkError,
    ServerError,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Timeout => "timeout",
            OutcomeKind::NetworkError => "network error",
            OutcomeKind::ServerError => "server error",
        };
        write!(f, "{}", s)
    }
}

/// Classified result of one probe.
///
/// `Success` covers every status below 500, including 401/403/429: those are
/// signals for the caller, not dispatch failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Success {
        status: u16,
        body_snippet: String,
        headers: BTreeMap<String, String>,
        latency_ms: u64,
    },
    Timeout {
        latency_ms: u64,
    },
    NetworkError {
        reason: String,
    },
    ServerError {
        status: u16,
        body_snippet: String,
        latency_ms: u64,
    },
}

impl ProbeOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            ProbeOutcome::Success { .. } => OutcomeKind::Success,
            ProbeOutcome::Timeout { .. } => OutcomeKind::Timeout,
            ProbeOutcome::NetworkError { .. } => OutcomeKind::NetworkError,
            ProbeOutcome::ServerError { .. } => OutcomeKind::ServerError,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeOutcome::Success { status, .. } | ProbeOutcome::ServerError { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn latency_ms(&self) -> Option<u64> {
        match self {
            ProbeOutcome::Success { latency_ms, .. }
            | ProbeOutcome::Timeout { latency_ms }
            | ProbeOutcome::ServerError { latency_ms, .. } => Some(*latency_ms),
            ProbeOutcome::NetworkError { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ProbeOutcome::Success { body_snippet, .. }
            | ProbeOutcome::ServerError { body_snippet, .. } => Some(body_snippet),
            _ => None,
        }
    }

    pub fn headers(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ProbeOutcome::Success { headers, .. } => Some(headers),
            _ => None,
        }
    }

    pub fn has_status(&self, expected: u16) -> bool {
        matches!(self, ProbeOutcome::Success { status, .. } if *status == expected)
    }

    /// 2xx response.
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { status, .. } if (200..300).contains(status))
    }

    pub fn is_rate_limited(&self) -> bool {
        self.has_status(429)
    }

    /// Counted as lost by packet-loss sampling.
    pub fn is_lost(&self) -> bool {
        matches!(
            self,
            ProbeOutcome::Timeout { .. } | ProbeOutcome::NetworkError { .. }
        )
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, ProbeOutcome::NetworkError { .. })
    }
}

/// Decodes at most `limit` bytes of `body`. A character cut in half at the
/// limit is dropped rather than replaced.
pub fn snippet(body: &[u8], limit: usize) -> String {
    let bounded = &body[..body.len().min(limit)];
    match std::str::from_utf8(bounded) {
        Ok(text) => text.to_string(),
        Err(e) if e.error_len().is_none() => {
            String::from_utf8_lossy(&bounded[..e.valid_up_to()]).into_owned()
        }
        Err(_) => String::from_utf8_lossy(bounded).into_owned(),
    }
}
