mod client;
mod pacing;

pub use client::ProbeDispatcher;
pub use pacing::{BatchMode, PaceSchedule, Tick, Ticks};
