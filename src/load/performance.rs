use crate::models::{ConcurrencyReport, LatencyProfile, ProbeOutcome, ThroughputReport, percentage};

/// Every timed probe counts, timeouts included. Transport failures carry no latency.
fn latencies(outcomes: &[ProbeOutcome]) -> Vec<u64> {
    outcomes.iter().filter_map(ProbeOutcome::latency_ms).collect()
}

fn mean(samples: &[u64]) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    (samples.iter().sum::<u64>() as f64 / samples.len() as f64).round() as u64
}

/// Only a 200 counts as a successful burst response.
pub fn evaluate_concurrency(outcomes: &[ProbeOutcome], total_duration_ms: u64) -> ConcurrencyReport {
    let total = outcomes.len();
    let successful = outcomes.iter().filter(|o| o.has_status(200)).count();
    let samples = latencies(outcomes);

    ConcurrencyReport {
        total_requests: total,
        successful,
        failed: total - successful,
        total_duration_ms,
        avg_latency_ms: mean(&samples),
        min_latency_ms: samples.iter().copied().min().unwrap_or(0),
        max_latency_ms: samples.iter().copied().max().unwrap_or(0),
        success_rate: percentage(successful, total),
    }
}

pub fn evaluate_throughput(outcomes: &[ProbeOutcome], total_duration_ms: u64) -> ThroughputReport {
    let total = outcomes.len();
    let successful = outcomes.iter().filter(|o| o.is_success()).count();
    let seconds = total_duration_ms as f64 / 1000.0;
    let requests_per_second = if seconds > 0.0 {
        successful as f64 / seconds
    } else {
        0.0
    };

    ThroughputReport {
        total_requests: total,
        successful,
        failed: total - successful,
        total_duration_ms,
        requests_per_second,
        avg_latency_ms: mean(&latencies(outcomes)),
        success_rate: percentage(successful, total),
    }
}

pub fn profile(outcomes: &[ProbeOutcome]) -> Option<LatencyProfile> {
    LatencyProfile::from_samples(&latencies(outcomes))
}
