use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateLimitScope {
    Public,
    Authenticated,
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitScope::Public => write!(f, "public"),
            RateLimitScope::Authenticated => write!(f, "authenticated"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitReport {
    pub scope: RateLimitScope,
    pub total_requests: usize,
    pub successful: usize,
    pub blocked: usize,
    pub errors: usize,
    pub duration_ms: u64,
    pub rate_per_second: f64,
    pub working: bool,
}

impl RateLimitReport {
    pub fn block_rate(&self) -> f64 {
        percentage(self.blocked, self.total_requests)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencyReport {
    pub total_requests: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
    pub avg_latency_ms: u64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThroughputReport {
    pub total_requests: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
    pub requests_per_second: f64,
    pub avg_latency_ms: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketLossReport {
    pub total_requests: usize,
    pub successful: usize,
    pub client_errors: usize,
    pub timeouts: usize,
    pub network_errors: usize,
    pub server_errors: usize,
    pub loss_rate: f64,
    pub within_threshold: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyProfile {
    pub avg_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
    pub median_ms: u64,
}

impl LatencyProfile {
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let sum: u64 = sorted.iter().sum();
        Some(Self {
            avg_ms: (sum as f64 / sorted.len() as f64).round() as u64,
            min_ms: sorted[0],
            max_ms: sorted[sorted.len() - 1],
            median_ms: sorted[sorted.len() / 2],
        })
    }
}

/// Everything the load phase measured, plus its sub-scores.
/// One load measurement and the points it contributes to the load score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubAssessment<R> {
    pub report: R,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadAssessment {
    pub public_rate_limit: RateLimitReport,
    pub authenticated_rate_limit: RateLimitReport,
    pub concurrency: ConcurrencyReport,
    pub throughput: ThroughputReport,
    pub packet_loss: PacketLossReport,
    pub response_times: BTreeMap<String, LatencyProfile>,
}

pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}
