use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("base URL is required")]
    MissingBaseUrl,

    #[error("base URL '{0}' is not a valid http(s) URL")]
    InvalidBaseUrl(String),

    #[error("timeout must be at least 1000ms (got {0}ms)")]
    TimeoutTooShort(u64),

    #[error("{0} must be at least 1")]
    ZeroCount(&'static str),

    #[error("packet loss threshold must be between 0 and 1 (got {0})")]
    ThresholdOutOfRange(f64),

    #[error("packet loss timeout must be at least 1000ms (got {0}ms)")]
    PacketLossTimeoutTooShort(u64),

    #[error("rate limit margin must be at least {min} (got {got})")]
    MarginTooSmall { min: usize, got: usize },

    #[error("rate limit tolerance {tolerance} exceeds the margin {margin}")]
    ToleranceExceedsMargin { tolerance: usize, margin: usize },

    #[error("no phase selected to run")]
    NoPhasesSelected,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("registration failed: {0}")]
    Registration(String),

    #[error("login failed: {0}")]
    Login(String),
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("session could not be established: {0}")]
    Session(#[from] SessionError),

    #[error("target {url} is unreachable: {reason}")]
    TargetUnreachable { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
