use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{LoadAssessment, SecurityAssessment, VulnerabilityFinding};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhaseKind {
    Authentication,
    Baseline,
    Load,
    Security,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhaseKind::Authentication => "Authentication",
            PhaseKind::Baseline => "Baseline",
            PhaseKind::Load => "Load/Stress",
            PhaseKind::Security => "Security",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of one phase. `flagged` never exceeds `tested`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseResult {
    pub tested: usize,
    pub flagged: usize,
    pub details: Vec<VulnerabilityFinding>,
    pub notes: Vec<String>,
    pub score: u8,
}

impl PhaseResult {
    pub fn new(tested: usize, flagged: usize, score: u8) -> Self {
        Self {
            tested,
            flagged: flagged.min(tested),
            details: Vec::new(),
            notes: Vec::new(),
            score: score.min(100),
        }
    }

    pub fn with_details(mut self, details: Vec<VulnerabilityFinding>) -> Self {
        self.details = details;
        self
    }

    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes = notes;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Excellent,
    Good,
    Average,
    Poor,
    Critical,
}

impl Classification {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Classification::Excellent,
            75..=89 => Classification::Good,
            60..=74 => Classification::Average,
            40..=59 => Classification::Poor,
            _ => Classification::Critical,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Classification::Excellent => "EXCELLENT",
            Classification::Good => "GOOD",
            Classification::Average => "AVERAGE",
            Classification::Poor => "POOR",
            Classification::Critical => "CRITICAL",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthCheck {
    Registration,
    Login,
    ProtectedAccess,
    InvalidLoginRejected,
    NoTokenRejected,
}

impl fmt::Display for AuthCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthCheck::Registration => "registration",
            AuthCheck::Login => "login",
            AuthCheck::ProtectedAccess => "protected access with token",
            AuthCheck::InvalidLoginRejected => "invalid login rejected",
            AuthCheck::NoTokenRejected => "access without token rejected",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthReport {
    pub checks: Vec<(AuthCheck, bool)>,
}

impl AuthReport {
    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|(_, ok)| *ok).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineReport {
    pub endpoints: Vec<(String, Option<u16>, bool)>,
    pub connectivity: bool,
    pub cors_enabled: bool,
    pub auth_protection: bool,
    pub rate_protection: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalReport {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub phase_results: BTreeMap<PhaseKind, PhaseResult>,
    pub composite_score: u8,
    pub classification: Classification,
    pub success: bool,
    pub error: Option<String>,
    pub authentication: Option<AuthReport>,
    pub baseline: Option<BaselineReport>,
    pub load: Option<LoadAssessment>,
    pub security: Option<SecurityAssessment>,
}

impl FinalReport {
    /// Empty report for a run that has just started.
    pub fn new(target: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            target: target.into(),
            started_at,
            finished_at: started_at,
            phase_results: BTreeMap::new(),
            composite_score: 0,
            classification: Classification::Critical,
            success: false,
            error: None,
            authentication: None,
            baseline: None,
            load: None,
            security: None,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    pub fn score(&self, phase: PhaseKind) -> Option<u8> {
        self.phase_results.get(&phase).map(|r| r.score)
    }
}
