//! Rate limiting, concurrency, throughput and packet-loss measurements.

mod packet_loss;
mod performance;
mod rate_limit;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::fuzzer::{LOGIN_ENDPOINT, PROTECTED_ENDPOINT};
use crate::http::{BatchMode, PaceSchedule, ProbeDispatcher};
use crate::models::{
    BearerCredential, ConcurrencyReport, LatencyProfile, LoadAssessment, PacketLossReport,
    ProbeOutcome, ProbeRequest, RateLimitReport, SubAssessment, ThroughputReport, login_body,
};
use crate::scoring::ScoreAggregator;

pub use packet_loss::evaluate as evaluate_packet_loss;
pub use performance::{evaluate_concurrency, evaluate_throughput};
pub use rate_limit::{evaluate_authenticated, evaluate_public};

pub const HEALTH_ENDPOINT: &str = "/health";
pub const ROOT_ENDPOINT: &str = "/";

/// Each measurement can run on its own; [`LoadAssessor::assess`] runs them all
/// in a fixed order.
pub struct LoadAssessor {
    dispatcher: Arc<ProbeDispatcher>,
    config: HarnessConfig,
}

impl LoadAssessor {
    pub fn new(dispatcher: Arc<ProbeDispatcher>, config: HarnessConfig) -> Self {
        Self { dispatcher, config }
    }

    pub async fn assess(&self, credential: &BearerCredential) -> Result<LoadAssessment, HarnessError> {
        info!("starting load assessment");

        let public_rate_limit = self.public_rate_limit().await;
        tokio::time::sleep(Duration::from_millis(self.config.rate_limit.cooldown_ms)).await;
        let authenticated_rate_limit = self.authenticated_rate_limit(credential).await;
        let concurrency = self.concurrency().await?;
        let throughput = self.throughput().await;
        let packet_loss = self.packet_loss().await;
        let response_times = self.response_times().await;

        info!(
            public = public_rate_limit.report.working,
            authenticated = authenticated_rate_limit.report.working,
            rps = throughput.report.requests_per_second,
            loss = packet_loss.report.loss_rate,
            "load assessment complete"
        );

        Ok(LoadAssessment {
            public_rate_limit: public_rate_limit.report,
            authenticated_rate_limit: authenticated_rate_limit.report,
            concurrency: concurrency.report,
            throughput: throughput.report,
            packet_loss: packet_loss.report,
            response_times,
        })
    }

    /// `public_limit + margin` concurrent probes against `/health`.
    pub async fn public_rate_limit(&self) -> SubAssessment<RateLimitReport> {
        let limits = &self.config.rate_limit;
        let count = limits.public_limit + limits.margin;
        debug!(count, "probing public rate limit");

        let requests = repeat(ProbeRequest::get(HEALTH_ENDPOINT, self.config.timeout_ms), count);
        let (outcomes, elapsed) = self.timed_batch(&requests, BatchMode::Concurrent).await;
        let report = evaluate_public(&outcomes, limits.public_limit, limits.tolerance, elapsed);
        let score = ScoreAggregator::rate_limit_points(report.working);
        SubAssessment { report, score }
    }

    pub async fn authenticated_rate_limit(
        &self,
        credential: &BearerCredential,
    ) -> SubAssessment<RateLimitReport> {
        let limits = &self.config.rate_limit;
        let count = (limits.authenticated_limit + limits.authenticated_margin).min(limits.authenticated_cap);
        debug!(count, "probing authenticated rate limit");

        let request = ProbeRequest::get(PROTECTED_ENDPOINT, self.config.timeout_ms).authorized(credential);
        let (outcomes, elapsed) = self
            .timed_batch(&repeat(request, count), BatchMode::Concurrent)
            .await;
        let report = evaluate_authenticated(&outcomes, limits.public_limit, elapsed);
        let score = ScoreAggregator::rate_limit_points(report.working);
        SubAssessment { report, score }
    }

    /// Fails when no probe of the burst reached the target.
    pub async fn concurrency(&self) -> Result<SubAssessment<ConcurrencyReport>, HarnessError> {
        let burst = repeat(
            ProbeRequest::get(HEALTH_ENDPOINT, self.config.timeout_ms),
            self.config.stress.concurrent_requests,
        );
        let (outcomes, elapsed) = self.timed_batch(&burst, BatchMode::Concurrent).await;
        if let Some(reason) = all_unreachable(&outcomes) {
            return Err(HarnessError::TargetUnreachable {
                url: self.dispatcher.base_url().to_string(),
                reason,
            });
        }

        let report = evaluate_concurrency(&outcomes, elapsed);
        debug!(
            success_rate = report.success_rate,
            avg_ms = report.avg_latency_ms,
            "concurrency burst done"
        );
        let score = ScoreAggregator::concurrency_points(report.success_rate, report.avg_latency_ms);
        Ok(SubAssessment { report, score })
    }

    pub async fn throughput(&self) -> SubAssessment<ThroughputReport> {
        let stress = &self.config.stress;
        let schedule = PaceSchedule::new(stress.pacing_every, Duration::from_millis(stress.pacing_delay_ms));
        let requests = repeat(ProbeRequest::get(ROOT_ENDPOINT, self.config.timeout_ms), stress.iterations);

        let (outcomes, elapsed) = self.timed_batch(&requests, BatchMode::Paced(schedule)).await;
        let report = evaluate_throughput(&outcomes, elapsed);
        let score = ScoreAggregator::throughput_points(report.requests_per_second);
        SubAssessment { report, score }
    }

    pub async fn packet_loss(&self) -> SubAssessment<PacketLossReport> {
        let stress = &self.config.stress;
        let requests = repeat(
            ProbeRequest::get(HEALTH_ENDPOINT, stress.packet_loss_timeout_ms),
            stress.packet_loss_samples,
        );
        let outcomes = self.dispatcher.dispatch_batch(&requests, BatchMode::Concurrent).await;
        let report = evaluate_packet_loss(&outcomes, stress.packet_loss_threshold);
        let score = ScoreAggregator::packet_loss_points(report.loss_rate);
        SubAssessment { report, score }
    }

    /// Informational latency profiles, keyed by `"METHOD path"`.
    pub async fn response_times(&self) -> BTreeMap<String, LatencyProfile> {
        let stress = &self.config.stress;
        let schedule = PaceSchedule::fixed(Duration::from_millis(stress.response_time_pause_ms));
        let timeout = self.config.timeout_ms;

        let samples = [
            ProbeRequest::get(ROOT_ENDPOINT, timeout),
            ProbeRequest::get(HEALTH_ENDPOINT, timeout),
            ProbeRequest::post(LOGIN_ENDPOINT, login_body("invalid@example.com", "wrong"), timeout),
        ];

        let mut profiles = BTreeMap::new();
        for request in samples {
            let label = format!("{} {}", request.method, request.path);
            let requests = repeat(request, stress.response_time_attempts);
            let outcomes = self.dispatcher.dispatch_batch(&requests, BatchMode::Paced(schedule)).await;
            if let Some(profile) = performance::profile(&outcomes) {
                profiles.insert(label, profile);
            }
        }
        profiles
    }

    async fn timed_batch(&self, requests: &[ProbeRequest], mode: BatchMode) -> (Vec<ProbeOutcome>, u64) {
        let start = Instant::now();
        let outcomes = self.dispatcher.dispatch_batch(requests, mode).await;
        (outcomes, start.elapsed().as_millis() as u64)
    }
}

fn repeat(request: ProbeRequest, count: usize) -> Vec<ProbeRequest> {
    vec![request; count]
}

/// The first transport error, when every outcome is one.
fn all_unreachable(outcomes: &[ProbeOutcome]) -> Option<String> {
    if outcomes.is_empty() || !outcomes.iter().all(ProbeOutcome::is_network_error) {
        return None;
    }
    match &outcomes[0] {
        ProbeOutcome::NetworkError { reason } => Some(reason.clone()),
        _ => None,
    }
}
