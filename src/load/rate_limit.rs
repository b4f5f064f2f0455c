use crate::models::{ProbeOutcome, RateLimitReport, RateLimitScope};

#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    successful: usize,
    blocked: usize,
    errors: usize,
}

fn tally(outcomes: &[ProbeOutcome]) -> Tally {
    outcomes.iter().fold(Tally::default(), |mut t, outcome| {
        if outcome.is_success() {
            t.successful += 1;
        } else if outcome.is_rate_limited() {
            t.blocked += 1;
        } else {
            t.errors += 1;
        }
        t
    })
}

fn rate(total: usize, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return total as f64;
    }
    total as f64 / (duration_ms as f64 / 1000.0)
}

/// Enforcing when something was blocked and no more than `limit + tolerance`
/// probes got through unblocked.
pub fn evaluate_public(
    outcomes: &[ProbeOutcome],
    limit: usize,
    tolerance: usize,
    duration_ms: u64,
) -> RateLimitReport {
    let t = tally(outcomes);
    let total = outcomes.len();
    let working = t.blocked > 0 && t.blocked >= total.saturating_sub(limit + tolerance);

    RateLimitReport {
        scope: RateLimitScope::Public,
        total_requests: total,
        successful: t.successful,
        blocked: t.blocked,
        errors: t.errors,
        duration_ms,
        rate_per_second: rate(total, duration_ms),
        working,
    }
}

/// Authenticated callers should get a higher allowance than anonymous ones,
/// so more than `public_limit` successes counts as working.
pub fn evaluate_authenticated(
    outcomes: &[ProbeOutcome],
    public_limit: usize,
    duration_ms: u64,
) -> RateLimitReport {
    let t = tally(outcomes);
    let total = outcomes.len();

    RateLimitReport {
        scope: RateLimitScope::Authenticated,
        total_requests: total,
        successful: t.successful,
        blocked: t.blocked,
        errors: t.errors,
        duration_ms,
        rate_per_second: rate(total, duration_ms),
        working: t.successful > public_limit,
    }
}
