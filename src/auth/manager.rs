use std::sync::Arc;
use tracing::{info, warn};

use crate::error::SessionError;
use crate::fuzzer::{LOGIN_ENDPOINT, PROTECTED_ENDPOINT, REGISTER_ENDPOINT};
use crate::http::ProbeDispatcher;
use crate::models::{
    BearerCredential, ProbeOutcome, ProbeRequest, Registration, Session, TestIdentity,
};

/// Registers and logs in the run's throwaway identity.
pub struct SessionManager {
    dispatcher: Arc<ProbeDispatcher>,
    identity: TestIdentity,
    timeout_ms: u64,
}

impl SessionManager {
    pub fn new(dispatcher: Arc<ProbeDispatcher>, identity: TestIdentity, timeout_ms: u64) -> Self {
        Self {
            dispatcher,
            identity,
            timeout_ms,
        }
    }

    pub fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    /// Register (409 counts as success), log in, then check the token against
    /// a protected resource. Only the first two steps can fail.
    pub async fn establish(&self) -> Result<Session, SessionError> {
        info!(username = %self.identity.username, "setting up test identity");

        let registration = self.register().await?;
        let credential = self.login().await?;
        let verified = self.verify(&credential).await;

        if verified {
            info!("authentication configured and verified");
        } else {
            warn!("protected route check failed, but a token was obtained; continuing");
        }

        Ok(Session::authenticated(credential, registration, verified))
    }

    async fn register(&self) -> Result<Registration, SessionError> {
        let request = ProbeRequest::post(
            REGISTER_ENDPOINT,
            self.identity.registration_body(),
            self.timeout_ms,
        );

        match self.dispatcher.dispatch(&request).await {
            ProbeOutcome::Success { status: 409, .. } => {
                info!("test identity already exists, continuing");
                Ok(Registration::AlreadyExisted)
            }
            outcome if outcome.is_success() => Ok(Registration::Created),
            outcome => Err(SessionError::Registration(describe(&outcome))),
        }
    }

    async fn login(&self) -> Result<BearerCredential, SessionError> {
        let request =
            ProbeRequest::post(LOGIN_ENDPOINT, self.identity.login_body(), self.timeout_ms);

        match self.dispatcher.dispatch(&request).await {
            ProbeOutcome::Success {
                status: 200,
                body_snippet,
                ..
            } => BearerCredential::from_login_body(&body_snippet).ok_or_else(|| {
                SessionError::Login("response did not contain a token".to_string())
            }),
            outcome => Err(SessionError::Login(describe(&outcome))),
        }
    }

    async fn verify(&self, credential: &BearerCredential) -> bool {
        let request = ProbeRequest::get(PROTECTED_ENDPOINT, self.timeout_ms).authorized(credential);
        self.dispatcher.dispatch(&request).await.is_success()
    }
}

/// Short human-readable reason for a failed step.
pub(crate) fn describe(outcome: &ProbeOutcome) -> String {
    match outcome {
        ProbeOutcome::Success {
            status,
            body_snippet,
            ..
        }
        | ProbeOutcome::ServerError {
            status,
            body_snippet,
            ..
        } => {
            let message = serde_json::from_str::<serde_json::Value>(body_snippet)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
            match message {
                Some(message) => format!("status {} - {}", status, message),
                None => format!("status {}", status),
            }
        }
        ProbeOutcome::Timeout { latency_ms } => format!("timed out after {}ms", latency_ms),
        ProbeOutcome::NetworkError { reason } => format!("no connection ({})", reason),
    }
}
