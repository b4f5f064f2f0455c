mod baseline;
mod engine;
mod fuzzer_engine;

pub use baseline::BaselineCheck;
pub use engine::{Orchestrator, OrchestratorState, RunMode};
pub use fuzzer_engine::PayloadFuzzer;
