pub mod analyzer;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod fuzzer;
pub mod http;
pub mod load;
pub mod models;
pub mod reporter;
pub mod scanner;
pub mod scoring;

pub use analyzer::{Verdict, VulnerabilityClassifier};
pub use auth::{AuthScenarios, SessionManager};
pub use config::HarnessConfig;
pub use error::{ConfigError, HarnessError, SessionError};
pub use fuzzer::{HeaderFuzzer, PayloadLibrary};
pub use http::{BatchMode, PaceSchedule, ProbeDispatcher};
pub use load::LoadAssessor;
pub use models::{
    FinalReport, PhaseKind, PhaseResult, ProbeOutcome, ProbeRequest, SecurityAssessment, Session,
    Severity, VulnerabilityFinding,
};
pub use reporter::{ConsoleReporter, HtmlExporter, JsonExporter};
pub use scanner::{Orchestrator, PayloadFuzzer, RunMode};
pub use scoring::ScoreAggregator;
