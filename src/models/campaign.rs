use serde::{Deserialize, Serialize};
use std::fmt;

use super::VulnerabilityFinding;

/// The security phase's attack campaigns, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CampaignKind {
    SqlInjection,
    Xss,
    PathTraversal,
    BruteForce,
    JwtBypass,
    HeaderInjection,
    AuthenticatedRoutes,
}

impl CampaignKind {
    pub const ALL: [CampaignKind; 7] = [
        CampaignKind::SqlInjection,
        CampaignKind::Xss,
        CampaignKind::PathTraversal,
        CampaignKind::BruteForce,
        CampaignKind::JwtBypass,
        CampaignKind::HeaderInjection,
        CampaignKind::AuthenticatedRoutes,
    ];
}

impl fmt::Display for CampaignKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CampaignKind::SqlInjection => "SQL Injection",
            CampaignKind::Xss => "XSS",
            CampaignKind::PathTraversal => "Path Traversal",
            CampaignKind::BruteForce => "Brute Force",
            CampaignKind::JwtBypass => "JWT Bypass",
            CampaignKind::HeaderInjection => "Header Injection",
            CampaignKind::AuthenticatedRoutes => "Authenticated Routes",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignResult {
    pub kind: CampaignKind,
    pub tested: usize,
    pub flagged: usize,
    pub findings: Vec<VulnerabilityFinding>,
    pub notes: Vec<String>,
    /// Responses with status 429.
    pub rate_limited: usize,
    /// Responses that correctly refused the attempt (401/403).
    pub rejected: usize,
    pub timeouts: usize,
    pub network_errors: usize,
}

impl CampaignResult {
    pub fn new(kind: CampaignKind) -> Self {
        Self {
            kind,
            tested: 0,
            flagged: 0,
            findings: Vec::new(),
            notes: Vec::new(),
            rate_limited: 0,
            rejected: 0,
            timeouts: 0,
            network_errors: 0,
        }
    }

    pub fn add_finding(&mut self, finding: VulnerabilityFinding) {
        self.flagged += 1;
        self.findings.push(finding);
    }

    pub fn is_vulnerable(&self) -> bool {
        self.flagged > 0
    }

    /// Every probe failed at the transport layer.
    pub fn unreachable(&self) -> bool {
        self.tested > 0 && self.network_errors == self.tested
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityAssessment {
    pub campaigns: Vec<CampaignResult>,
}

impl SecurityAssessment {
    pub fn get(&self, kind: CampaignKind) -> Option<&CampaignResult> {
        self.campaigns.iter().find(|c| c.kind == kind)
    }

    pub fn flagged(&self, kind: CampaignKind) -> usize {
        self.get(kind).map(|c| c.flagged).unwrap_or(0)
    }

    pub fn total_tested(&self) -> usize {
        self.campaigns.iter().map(|c| c.tested).sum()
    }

    pub fn total_flagged(&self) -> usize {
        self.campaigns.iter().map(|c| c.flagged).sum()
    }

    pub fn findings(&self) -> Vec<VulnerabilityFinding> {
        let mut all: Vec<_> = self
            .campaigns
            .iter()
            .flat_map(|c| c.findings.iter().cloned())
            .collect();
        all.sort_by(|a, b| b.severity.numeric_value().cmp(&a.severity.numeric_value()));
        all
    }
}
