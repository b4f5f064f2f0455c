use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::{AuthScenarios, SessionManager};
use crate::config::HarnessConfig;
use crate::error::{ConfigError, HarnessError, SessionError};
use crate::http::ProbeDispatcher;
use crate::load::LoadAssessor;
use crate::models::{BearerCredential, FinalReport, PhaseKind, Session, TestIdentity};
use crate::scoring::ScoreAggregator;

use super::{BaselineCheck, PayloadFuzzer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Quick,
    Stress,
    Security,
    Auth,
    Full {
        skip_auth: bool,
        skip_stress: bool,
        skip_security: bool,
    },
}

impl RunMode {
    /// Ordered phases for this mode. The session is established regardless.
    pub fn plan(&self) -> Vec<PhaseKind> {
        match *self {
            RunMode::Quick => vec![PhaseKind::Authentication, PhaseKind::Baseline],
            RunMode::Stress => vec![PhaseKind::Authentication, PhaseKind::Load],
            RunMode::Security => vec![PhaseKind::Authentication, PhaseKind::Security],
            RunMode::Auth => vec![PhaseKind::Authentication],
            RunMode::Full {
                skip_auth,
                skip_stress,
                skip_security,
            } => [
                (PhaseKind::Authentication, skip_auth),
                (PhaseKind::Load, skip_stress),
                (PhaseKind::Security, skip_security),
            ]
            .into_iter()
            .filter(|(_, skipped)| !skipped)
            .map(|(phase, _)| phase)
            .collect(),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunMode::Quick => "quick",
            RunMode::Stress => "stress",
            RunMode::Security => "security",
            RunMode::Auth => "auth",
            RunMode::Full { .. } => "full",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    AuthPhase,
    BaselinePhase,
    LoadPhase,
    SecurityPhase,
    Done,
    Aborted,
}

impl From<PhaseKind> for OrchestratorState {
    fn from(phase: PhaseKind) -> Self {
        match phase {
            PhaseKind::Authentication => OrchestratorState::AuthPhase,
            PhaseKind::Baseline => OrchestratorState::BaselinePhase,
            PhaseKind::Load => OrchestratorState::LoadPhase,
            PhaseKind::Security => OrchestratorState::SecurityPhase,
        }
    }
}

/// Runs phases in order and assembles the final report.
pub struct Orchestrator {
    config: HarnessConfig,
    dispatcher: Arc<ProbeDispatcher>,
    state: OrchestratorState,
    verbose: bool,
}

impl Orchestrator {
    /// Rejects an invalid configuration before any probe is sent.
    pub fn new(config: HarnessConfig, verbose: bool) -> Result<Self, HarnessError> {
        config.validate()?;
        let dispatcher = Arc::new(ProbeDispatcher::new(&config.base_url, config.max_in_flight)?);

        Ok(Self {
            config,
            dispatcher,
            state: OrchestratorState::Idle,
            verbose,
        })
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// A session failure aborts the run with an error. A failure in a later
    /// phase stops the remaining phases but still returns the partial report.
    /// A mode that skips every phase is rejected before any probe is sent.
    pub async fn run(&mut self, mode: RunMode) -> Result<FinalReport, HarnessError> {
        let plan = mode.plan();
        if plan.is_empty() {
            return Err(ConfigError::NoPhasesSelected.into());
        }
        let mut report = FinalReport::new(self.config.base_url.clone(), Utc::now());
        info!(%mode, target = %self.config.base_url, phases = ?plan, "starting run");

        self.state = OrchestratorState::AuthPhase;
        let identity = self.config.identity.resolve();
        let (session, credential) = match self.establish(&identity).await {
            Ok(established) => established,
            Err(e) => {
                error!(error = %e, "session setup failed, aborting");
                self.state = OrchestratorState::Aborted;
                return Err(e.into());
            }
        };

        for phase in plan {
            self.state = phase.into();
            if let Err(e) = self
                .run_phase(phase, &session, &credential, &identity, &mut report)
                .await
            {
                warn!(%phase, error = %e, "phase failed, skipping remaining phases");
                report.error = Some(e.to_string());
                break;
            }
        }

        finalize(&mut report);
        self.state = if report.success {
            OrchestratorState::Done
        } else {
            OrchestratorState::Aborted
        };

        info!(
            score = report.composite_score,
            classification = %report.classification,
            "run finished"
        );
        Ok(report)
    }

    async fn establish(
        &self,
        identity: &TestIdentity,
    ) -> Result<(Session, BearerCredential), SessionError> {
        let manager =
            SessionManager::new(self.dispatcher.clone(), identity.clone(), self.config.timeout_ms);
        let session = manager.establish().await?;
        let credential = session
            .credential()
            .ok_or_else(|| SessionError::Login("session holds no token".to_string()))?;
        Ok((session, credential))
    }

    async fn run_phase(
        &self,
        phase: PhaseKind,
        session: &Session,
        credential: &BearerCredential,
        identity: &TestIdentity,
        report: &mut FinalReport,
    ) -> Result<(), HarnessError> {
        info!(%phase, "phase started");

        let result = match phase {
            PhaseKind::Authentication => {
                let scenarios = AuthScenarios::new(self.dispatcher.clone(), self.config.timeout_ms);
                let auth = scenarios.run(session, identity).await;
                let result = auth.to_phase_result();
                report.authentication = Some(auth);
                result
            }
            PhaseKind::Baseline => {
                let baseline = BaselineCheck::new(self.dispatcher.clone()).run().await;
                let result = baseline.to_phase_result();
                report.baseline = Some(baseline);
                result
            }
            PhaseKind::Load => {
                let assessor = LoadAssessor::new(self.dispatcher.clone(), self.config.clone());
                let load = assessor.assess(credential).await?;
                let result = ScoreAggregator::load_phase(&load);
                report.load = Some(load);
                result
            }
            PhaseKind::Security => {
                let fuzzer = PayloadFuzzer::new(
                    self.dispatcher.clone(),
                    self.config.clone(),
                    credential.clone(),
                    self.verbose,
                );
                let security = fuzzer.run_all().await?;
                let result = ScoreAggregator::security_phase(&security);
                report.security = Some(security);
                result
            }
        };

        info!(%phase, score = result.score, tested = result.tested, flagged = result.flagged, "phase finished");
        report.phase_results.insert(phase, result);
        Ok(())
    }
}

/// Scores whatever phases completed.
fn finalize(report: &mut FinalReport) {
    report.finished_at = Utc::now();
    report.composite_score = ScoreAggregator::composite(&report.phase_results);
    report.classification = ScoreAggregator::classify(report.composite_score);
    report.success = report.error.is_none();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classification, PhaseResult};

    #[test]
    fn test_plans() {
        assert_eq!(
            RunMode::Quick.plan(),
            vec![PhaseKind::Authentication, PhaseKind::Baseline]
        );
        assert_eq!(RunMode::Auth.plan(), vec![PhaseKind::Authentication]);
        assert_eq!(
            RunMode::Full {
                skip_auth: false,
                skip_stress: false,
                skip_security: false
            }
            .plan(),
            vec![PhaseKind::Authentication, PhaseKind::Load, PhaseKind::Security]
        );
        assert_eq!(
            RunMode::Full {
                skip_auth: true,
                skip_stress: true,
                skip_security: false
            }
            .plan(),
            vec![PhaseKind::Security]
        );
    }

    #[test]
    fn test_invalid_config_rejected_before_run() {
        let mut config = HarnessConfig::default();
        config.timeout_ms = 10;
        assert!(matches!(
            Orchestrator::new(config, false),
            Err(HarnessError::Config(_))
        ));
    }

    #[test]
    fn test_partial_report_keeps_completed_phases() {
        let mut report = FinalReport::new("http://localhost:3000", Utc::now());
        report
            .phase_results
            .insert(PhaseKind::Authentication, PhaseResult::new(5, 1, 80));
        report.error = Some("target http://localhost:3000 is unreachable: refused".into());

        finalize(&mut report);
        assert!(!report.success);
        assert_eq!(report.composite_score, 80);
        assert_eq!(report.classification, Classification::Good);
        assert!(report.load.is_none());
    }

    #[test]
    fn test_no_completed_phase_scores_zero() {
        let mut report = FinalReport::new("http://localhost:3000", Utc::now());
        finalize(&mut report);
        assert!(report.success);
        assert_eq!(report.composite_score, 0);
        assert_eq!(report.classification, Classification::Critical);
    }

    #[tokio::test]
    async fn test_empty_plan_is_rejected() {
        let mode = RunMode::Full {
            skip_auth: true,
            skip_stress: true,
            skip_security: true,
        };
        assert!(mode.plan().is_empty());

        let mut orchestrator = Orchestrator::new(HarnessConfig::default(), false).unwrap();
        assert!(matches!(
            orchestrator.run(mode).await,
            Err(HarnessError::Config(ConfigError::NoPhasesSelected))
        ));
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
    }

    #[test]
    fn test_starts_idle() {
        let orchestrator = Orchestrator::new(HarnessConfig::default(), false).unwrap();
        assert_eq!(orchestrator.state(), OrchestratorState::Idle);
    }
}
