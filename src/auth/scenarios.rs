use std::sync::Arc;
use tracing::{debug, info};

use crate::fuzzer::{LOGIN_ENDPOINT, PROTECTED_ENDPOINT};
use crate::http::ProbeDispatcher;
use crate::models::{
    AuthCheck, AuthReport, PhaseResult, ProbeRequest, Session, TestIdentity, login_body,
};

const POINTS_PER_CHECK: u8 = 20;

/// Scores the target's authentication behaviour after a session exists.
pub struct AuthScenarios {
    dispatcher: Arc<ProbeDispatcher>,
    timeout_ms: u64,
}

impl AuthScenarios {
    pub fn new(dispatcher: Arc<ProbeDispatcher>, timeout_ms: u64) -> Self {
        Self {
            dispatcher,
            timeout_ms,
        }
    }

    pub async fn run(&self, session: &Session, identity: &TestIdentity) -> AuthReport {
        info!("running authentication scenarios");

        let invalid_login = ProbeRequest::post(
            LOGIN_ENDPOINT,
            login_body(&identity.email, "wrong-password"),
            self.timeout_ms,
        );
        let invalid_rejected = self.dispatcher.dispatch(&invalid_login).await.has_status(401);

        let anonymous = ProbeRequest::get(PROTECTED_ENDPOINT, self.timeout_ms);
        let outcome = self.dispatcher.dispatch(&anonymous).await;
        let no_token_rejected = outcome.has_status(401) || outcome.has_status(403);

        let checks = vec![
            (AuthCheck::Registration, session.registration.is_some()),
            (AuthCheck::Login, session.is_authenticated()),
            (AuthCheck::ProtectedAccess, session.verified),
            (AuthCheck::InvalidLoginRejected, invalid_rejected),
            (AuthCheck::NoTokenRejected, no_token_rejected),
        ];

        for (check, passed) in &checks {
            debug!(%check, passed, "auth check");
        }

        AuthReport { checks }
    }
}

impl AuthReport {
    pub fn to_phase_result(&self) -> PhaseResult {
        let passed = self.passed();
        let notes = self
            .checks
            .iter()
            .filter(|(_, ok)| !ok)
            .map(|(check, _)| format!("failed: {}", check))
            .collect();

        PhaseResult::new(
            self.checks.len(),
            self.checks.len() - passed,
            passed as u8 * POINTS_PER_CHECK,
        )
        .with_notes(notes)
    }
}
