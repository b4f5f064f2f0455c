mod campaign;
mod finding;
mod load;
mod probe;
mod result;
mod session;

pub use campaign::{CampaignKind, CampaignResult, SecurityAssessment};
pub use finding::{
    EvidenceKind, InjectionPoint, PayloadCase, PayloadCategory, Severity, VulnerabilityFinding,
    excerpt, sample_record,
};
pub use load::{
    ConcurrencyReport, LatencyProfile, LoadAssessment, PacketLossReport, RateLimitReport,
    RateLimitScope, SubAssessment, ThroughputReport, percentage,
};
pub use probe::{BODY_SNIPPET_LIMIT, HttpMethod, OutcomeKind, ProbeOutcome, ProbeRequest, snippet};
pub use result::{
    AuthCheck, AuthReport, BaselineReport, Classification, FinalReport, PhaseKind, PhaseResult,
};
pub use session::{BearerCredential, Registration, Session, TestIdentity, login_body};
