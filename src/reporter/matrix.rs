use crate::models::{CampaignKind, Classification, FinalReport, PhaseKind, SecurityAssessment};

/// One row per completed phase, in plan order.
pub struct PhaseMatrix {
    entries: Vec<PhaseEntry>,
}

pub struct PhaseEntry {
    pub phase: PhaseKind,
    pub tested: usize,
    pub flagged: usize,
    pub score: u8,
    pub classification: Classification,
}

impl PhaseMatrix {
    pub fn from_report(report: &FinalReport) -> Self {
        let entries = report
            .phase_results
            .iter()
            .map(|(phase, result)| PhaseEntry {
                phase: *phase,
                tested: result.tested,
                flagged: result.flagged,
                score: result.score,
                classification: Classification::from_score(result.score),
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[PhaseEntry] {
        &self.entries
    }
}

/// Per-campaign verdict line.
pub struct CampaignEntry {
    pub kind: CampaignKind,
    pub tested: usize,
    pub flagged: usize,
    pub rate_limited: usize,
    pub vulnerable: bool,
}

pub fn campaign_entries(security: &SecurityAssessment) -> Vec<CampaignEntry> {
    security
        .campaigns
        .iter()
        .map(|c| CampaignEntry {
            kind: c.kind,
            tested: c.tested,
            flagged: c.flagged,
            rate_limited: c.rate_limited,
            vulnerable: c.is_vulnerable(),
        })
        .collect()
}

pub fn verdict_label(vulnerable: bool) -> &'static str {
    if vulnerable { "VULNERABLE" } else { "SECURE" }
}

/// Remediation advice for everything the run flagged.
pub fn recommendations(report: &FinalReport) -> Vec<&'static str> {
    let mut advice = Vec::new();

    if report
        .authentication
        .as_ref()
        .is_some_and(|auth| auth.passed() < auth.checks.len())
    {
        advice.push("Review the authentication flow: registration, login and token checks must all hold");
    }

    if let Some(load) = &report.load {
        if !load.public_rate_limit.working {
            advice.push("Enforce rate limiting on public endpoints");
        }
        if !load.authenticated_rate_limit.working {
            advice.push("Give authenticated clients a separate, higher rate limit");
        }
        if !load.packet_loss.within_threshold {
            advice.push("Investigate dropped connections and timeouts under load");
        }
    }

    if let Some(security) = &report.security {
        for campaign in security.campaigns.iter().filter(|c| c.is_vulnerable()) {
            advice.push(get_recommendation(campaign.kind));
        }
    }

    advice
}

fn get_recommendation(kind: CampaignKind) -> &'static str {
    match kind {
        CampaignKind::SqlInjection => "Use parameterized queries and hide database errors from responses",
        CampaignKind::Xss => "Escape user input on output and validate it on input",
        CampaignKind::PathTraversal => "Normalize and whitelist file paths before resolving them",
        CampaignKind::BruteForce => "Lock out or throttle repeated failed logins and forbid weak passwords",
        CampaignKind::JwtBypass => "Verify token signature and expiry on every protected route",
        CampaignKind::HeaderInjection => "Strip CR/LF from header values and never echo request headers",
        CampaignKind::AuthenticatedRoutes => "Sanitize stored fields before persisting them",
    }
}
