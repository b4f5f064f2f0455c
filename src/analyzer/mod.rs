mod detector;
mod status;

pub use detector::VulnerabilityClassifier;
pub use status::StatusAnalyzer;

use crate::models::EvidenceKind;

/// What a single response says about the payload that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Vulnerable(EvidenceKind),
    /// Neither flagged nor a refusal; recorded as a note.
    Unexpected(u16),
    RateLimited,
    Rejected,
    Clean,
}

impl Verdict {
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Verdict::Vulnerable(_))
    }
}
