use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::analyzer::{StatusAnalyzer, Verdict, VulnerabilityClassifier};
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::fuzzer::{
    CaseBuilder, PATH_TRAVERSAL_BASES, PROTECTED_ENDPOINT, SQL_INJECTION_TARGETS, XSS_TARGETS,
};
use crate::http::{BatchMode, PaceSchedule, ProbeDispatcher};
use crate::load::ROOT_ENDPOINT;
use crate::models::{
    BearerCredential, CampaignKind, CampaignResult, OutcomeKind, PayloadCase, PayloadCategory,
    ProbeOutcome, ProbeRequest, SecurityAssessment, VulnerabilityFinding, excerpt,
};

/// The task listing grows with every stored payload, so it is read well past
/// the usual snippet.
const LISTING_BODY_LIMIT: usize = 1024 * 1024;

/// Runs every attack campaign against the target and classifies the responses.
pub struct PayloadFuzzer {
    dispatcher: Arc<ProbeDispatcher>,
    config: HarnessConfig,
    credential: BearerCredential,
    classifier: VulnerabilityClassifier,
    verbose: bool,
}

impl PayloadFuzzer {
    pub fn new(
        dispatcher: Arc<ProbeDispatcher>,
        config: HarnessConfig,
        credential: BearerCredential,
        verbose: bool,
    ) -> Self {
        Self {
            dispatcher,
            config,
            credential,
            classifier: VulnerabilityClassifier::new(),
            verbose,
        }
    }

    /// Campaigns run one after another; a campaign whose every probe failed to
    /// connect aborts the rest.
    pub async fn run_all(&self) -> Result<SecurityAssessment, HarnessError> {
        info!("starting security campaigns");
        let pb = self.create_progress_bar(CampaignKind::ALL.len());
        let mut assessment = SecurityAssessment::default();

        for kind in CampaignKind::ALL {
            pb.set_message(kind.to_string());
            let result = self.run_campaign(kind).await;

            if result.unreachable() {
                pb.abandon_with_message("Target unreachable");
                return Err(HarnessError::TargetUnreachable {
                    url: self.dispatcher.base_url().to_string(),
                    reason: format!("every {} probe failed to connect", kind),
                });
            }

            assessment.campaigns.push(result);
            pb.inc(1);
        }

        pb.finish_with_message("Campaigns complete");
        info!(
            tested = assessment.total_tested(),
            flagged = assessment.total_flagged(),
            "security campaigns complete"
        );
        Ok(assessment)
    }

    pub fn cases(&self, kind: CampaignKind) -> Vec<PayloadCase> {
        let security = &self.config.security;
        match kind {
            CampaignKind::SqlInjection => CaseBuilder::field_cases(
                PayloadCategory::SqlInjection,
                SQL_INJECTION_TARGETS,
                &security.sql_injection,
            ),
            CampaignKind::Xss => {
                CaseBuilder::field_cases(PayloadCategory::Xss, XSS_TARGETS, &security.xss)
            }
            CampaignKind::PathTraversal => {
                CaseBuilder::path_cases(PATH_TRAVERSAL_BASES, &security.path_traversal)
            }
            CampaignKind::BruteForce => CaseBuilder::brute_force_cases(
                &security.brute_force_login,
                &self.config.brute_force_passwords(),
            ),
            CampaignKind::JwtBypass => {
                CaseBuilder::jwt_cases(PROTECTED_ENDPOINT, &security.jwt_bypass)
            }
            CampaignKind::HeaderInjection => {
                CaseBuilder::header_cases(ROOT_ENDPOINT, &security.headers)
            }
            CampaignKind::AuthenticatedRoutes => {
                CaseBuilder::task_replay_cases(&security.xss, &security.sql_injection)
            }
        }
    }

    pub async fn run_campaign(&self, kind: CampaignKind) -> CampaignResult {
        let cases = self.cases(kind);
        debug!(campaign = %kind, cases = cases.len(), "running campaign");

        let requests: Vec<ProbeRequest> = cases
            .iter()
            .map(|case| case.to_probe(self.config.timeout_ms, &self.credential))
            .collect();

        let outcomes = self.dispatcher.dispatch_batch(&requests, self.batch_mode(kind)).await;
        let mut result = self.tally(kind, &cases, &outcomes);

        if kind == CampaignKind::AuthenticatedRoutes {
            self.check_stored_payloads(&cases, &mut result).await;
        }

        if result.is_vulnerable() {
            warn!(campaign = %kind, flagged = result.flagged, "campaign flagged responses");
        }
        result
    }

    fn batch_mode(&self, kind: CampaignKind) -> BatchMode {
        match kind {
            CampaignKind::BruteForce => BatchMode::Paced(PaceSchedule::fixed(Duration::from_millis(
                self.config.security.brute_force_delay_ms,
            ))),
            _ => BatchMode::Concurrent,
        }
    }

    fn verdict(&self, kind: CampaignKind, case: &PayloadCase, outcome: &ProbeOutcome) -> Verdict {
        match kind {
            CampaignKind::AuthenticatedRoutes => StatusAnalyzer::task_created(outcome),
            _ => self.classifier.classify(case, outcome),
        }
    }

    /// Outcomes line up with cases by position.
    fn tally(
        &self,
        kind: CampaignKind,
        cases: &[PayloadCase],
        outcomes: &[ProbeOutcome],
    ) -> CampaignResult {
        let excerpt_len = self.config.security.excerpt_len;
        let mut result = CampaignResult::new(kind);

        for (case, outcome) in cases.iter().zip(outcomes) {
            result.tested += 1;
            match outcome.kind() {
                OutcomeKind::Timeout => result.timeouts += 1,
                OutcomeKind::NetworkError => result.network_errors += 1,
                OutcomeKind::Success | OutcomeKind::ServerError => {}
            }

            match self.verdict(kind, case, outcome) {
                Verdict::Vulnerable(evidence) => {
                    debug!(campaign = %kind, %evidence, payload = %excerpt(&case.payload_value, excerpt_len), "flagged");
                    result.add_finding(VulnerabilityFinding::new(
                        case,
                        evidence,
                        outcome.status(),
                        excerpt_len,
                    ));
                }
                Verdict::Unexpected(status) => result.notes.push(format!(
                    "unexpected status {} for {}",
                    status,
                    excerpt(&case.payload_value, excerpt_len)
                )),
                Verdict::RateLimited => result.rate_limited += 1,
                Verdict::Rejected => result.rejected += 1,
                Verdict::Clean => {}
            }
        }

        result
    }

    /// Lists the tasks and notes every replayed payload that comes back verbatim.
    async fn check_stored_payloads(&self, cases: &[PayloadCase], result: &mut CampaignResult) {
        let request = ProbeRequest::get(PROTECTED_ENDPOINT, self.config.timeout_ms)
            .authorized(&self.credential)
            .with_body_limit(LISTING_BODY_LIMIT);
        let outcome = self.dispatcher.dispatch(&request).await;

        let Some(body) = outcome.body() else {
            return;
        };

        for case in cases {
            if body.contains(&case.payload_value) {
                result.notes.push(format!(
                    "payload returned unescaped in task list: {}",
                    excerpt(&case.payload_value, self.config.security.excerpt_len)
                ));
            }
        }
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        if !self.verbose {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        pb
    }
}
