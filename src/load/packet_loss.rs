use crate::models::{PacketLossReport, ProbeOutcome, percentage};

/// Loss counts timeouts and transport failures. Any HTTP response, even a
/// 5xx, arrived.
pub fn evaluate(outcomes: &[ProbeOutcome], threshold: f64) -> PacketLossReport {
    let mut report = PacketLossReport {
        total_requests: outcomes.len(),
        successful: 0,
        client_errors: 0,
        timeouts: 0,
        network_errors: 0,
        server_errors: 0,
        loss_rate: 0.0,
        within_threshold: true,
    };

    for outcome in outcomes {
        match outcome {
            ProbeOutcome::Success { status, .. } if *status < 400 => report.successful += 1,
            ProbeOutcome::Success { .. } => report.client_errors += 1,
            ProbeOutcome::ServerError { .. } => report.server_errors += 1,
            ProbeOutcome::Timeout { .. } => report.timeouts += 1,
            ProbeOutcome::NetworkError { .. } => report.network_errors += 1,
        }
    }

    report.loss_rate = percentage(report.timeouts + report.network_errors, outcomes.len());
    report.within_threshold = report.loss_rate / 100.0 <= threshold;
    report
}
