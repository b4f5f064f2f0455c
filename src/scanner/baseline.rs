use std::sync::Arc;
use tracing::{debug, info};

use crate::fuzzer::{LOGIN_ENDPOINT, PROTECTED_ENDPOINT};
use crate::http::{BatchMode, ProbeDispatcher};
use crate::load::{HEALTH_ENDPOINT, ROOT_ENDPOINT};
use crate::models::{BaselineReport, PhaseResult, ProbeRequest};
use crate::scoring::ScoreAggregator;

const BASELINE_TIMEOUT_MS: u64 = 5000;
const RATE_PROBE_COUNT: usize = 10;
const FOREIGN_ORIGIN: &str = "http://evil.com";

/// Quick reachability and protection check used by quick mode.
pub struct BaselineCheck {
    dispatcher: Arc<ProbeDispatcher>,
}

impl BaselineCheck {
    pub fn new(dispatcher: Arc<ProbeDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn run(&self) -> BaselineReport {
        info!("running baseline checks");

        let mut endpoints = Vec::new();
        for path in [ROOT_ENDPOINT, HEALTH_ENDPOINT, LOGIN_ENDPOINT] {
            let outcome = self
                .dispatcher
                .dispatch(&ProbeRequest::get(path, BASELINE_TIMEOUT_MS))
                .await;
            let alive = matches!(outcome.status(), Some(status) if status < 500);
            debug!(path, status = ?outcome.status(), alive, "connectivity");
            endpoints.push((path.to_string(), outcome.status(), alive));
        }
        let connectivity = endpoints.iter().any(|(_, _, alive)| *alive);

        let preflight =
            ProbeRequest::get(ROOT_ENDPOINT, BASELINE_TIMEOUT_MS).with_header("Origin", FOREIGN_ORIGIN);
        let cors = self.dispatcher.dispatch(&preflight).await;
        let cors_enabled = cors
            .headers()
            .is_some_and(|h| h.contains_key("access-control-allow-origin"));

        let anonymous = self
            .dispatcher
            .dispatch(&ProbeRequest::get(PROTECTED_ENDPOINT, BASELINE_TIMEOUT_MS))
            .await;
        let auth_protection = anonymous.has_status(401) || anonymous.has_status(403);

        let burst = vec![ProbeRequest::get(HEALTH_ENDPOINT, BASELINE_TIMEOUT_MS); RATE_PROBE_COUNT];
        let rate_protection = self
            .dispatcher
            .dispatch_batch(&burst, BatchMode::Concurrent)
            .await
            .iter()
            .any(|o| o.is_rate_limited());

        BaselineReport {
            endpoints,
            connectivity,
            cors_enabled,
            auth_protection,
            rate_protection,
        }
    }
}

impl BaselineReport {
    /// Connectivity and auth protection are scored; rate protection only counts
    /// toward `flagged`, CORS only toward the notes.
    pub fn to_phase_result(&self) -> PhaseResult {
        let checks = [
            ("connectivity", self.connectivity),
            ("auth protection", self.auth_protection),
            ("rate protection", self.rate_protection),
        ];

        let mut notes: Vec<String> = checks
            .iter()
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| format!("failed: {}", name))
            .collect();
        if self.cors_enabled {
            notes.push(format!("CORS headers returned for {}", FOREIGN_ORIGIN));
        }

        let failed = checks.iter().filter(|(_, ok)| !ok).count();
        PhaseResult::new(checks.len(), failed, ScoreAggregator::baseline_score(self)).with_notes(notes)
    }
}
