use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::ConfigError;
use crate::fuzzer::{HeaderFuzzer, HeaderPayload, PayloadLibrary};
use crate::models::TestIdentity;

/// Probes sent past the public limit must leave room to observe blocking.
pub const MIN_RATE_LIMIT_MARGIN: usize = 20;

/// Resolved harness configuration. Every field has a default, so a config
/// file only needs the values it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Width of the in-flight window for concurrent batches.
    pub max_in_flight: usize,
    pub rate_limit: RateLimitConfig,
    pub stress: StressConfig,
    pub security: SecurityConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub public_limit: usize,
    pub authenticated_limit: usize,
    /// Probes sent beyond the public limit.
    pub margin: usize,
    /// Unblocked probes above the limit that still count as enforcement.
    pub tolerance: usize,
    pub authenticated_margin: usize,
    pub authenticated_cap: usize,
    pub cooldown_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub concurrent_requests: usize,
    pub iterations: usize,
    pub pacing_every: usize,
    pub pacing_delay_ms: u64,
    pub packet_loss_samples: usize,
    pub packet_loss_timeout_ms: u64,
    pub packet_loss_threshold: f64,
    pub response_time_attempts: usize,
    pub response_time_pause_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub sql_injection: Vec<String>,
    pub xss: Vec<String>,
    pub path_traversal: Vec<String>,
    pub headers: Vec<HeaderPayload>,
    pub jwt_bypass: Vec<String>,
    pub brute_force_login: String,
    pub brute_force_passwords: Vec<String>,
    pub brute_force_attempts: usize,
    pub brute_force_delay_ms: u64,
    pub excerpt_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_ms: 10_000,
            max_in_flight: 256,
            rate_limit: RateLimitConfig::default(),
            stress: StressConfig::default(),
            security: SecurityConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            public_limit: 100,
            authenticated_limit: 500,
            margin: 20,
            tolerance: 10,
            authenticated_margin: 50,
            authenticated_cap: 200,
            cooldown_ms: 2000,
        }
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: 50,
            iterations: 100,
            pacing_every: 10,
            pacing_delay_ms: 10,
            packet_loss_samples: 100,
            packet_loss_timeout_ms: 5000,
            packet_loss_threshold: 0.05,
            response_time_attempts: 10,
            response_time_pause_ms: 100,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            sql_injection: PayloadLibrary::sql_injection(),
            xss: PayloadLibrary::xss(),
            path_traversal: PayloadLibrary::path_traversal(),
            headers: HeaderFuzzer::get_injection_headers(),
            jwt_bypass: PayloadLibrary::jwt_bypass(),
            brute_force_login: "admin@example.com".to_string(),
            brute_force_passwords: PayloadLibrary::brute_force_passwords(),
            brute_force_attempts: 20,
            brute_force_delay_ms: 100,
            excerpt_len: 50,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            username: None,
            email: None,
            password: "TestPassword123!".to_string(),
        }
    }
}

impl IdentityConfig {
    /// Fixed credentials when both are configured, otherwise a fresh synthetic identity.
    pub fn resolve(&self) -> TestIdentity {
        match (&self.username, &self.email) {
            (Some(username), Some(email)) => {
                TestIdentity::new(username.clone(), email.clone(), self.password.clone())
            }
            _ => {
                let mut identity = TestIdentity::synthetic(&self.password);
                if let Some(username) = &self.username {
                    identity.username = username.clone();
                }
                if let Some(email) = &self.email {
                    identity.email = email.clone();
                }
                identity
            }
        }
    }
}

impl HarnessConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config: {}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config as JSON: {}", path))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        match reqwest::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidBaseUrl(self.base_url.clone())),
        }
        if self.timeout_ms < 1000 {
            return Err(ConfigError::TimeoutTooShort(self.timeout_ms));
        }
        if self.stress.concurrent_requests < 1 {
            return Err(ConfigError::ZeroCount("concurrent_requests"));
        }
        if self.stress.iterations < 1 {
            return Err(ConfigError::ZeroCount("iterations"));
        }
        if self.stress.packet_loss_samples < 1 {
            return Err(ConfigError::ZeroCount("packet_loss_samples"));
        }
        if self.max_in_flight < 1 {
            return Err(ConfigError::ZeroCount("max_in_flight"));
        }
        if self.stress.packet_loss_timeout_ms < 1000 {
            return Err(ConfigError::PacketLossTimeoutTooShort(
                self.stress.packet_loss_timeout_ms,
            ));
        }
        let limits = &self.rate_limit;
        if limits.public_limit < 1 {
            return Err(ConfigError::ZeroCount("public_limit"));
        }
        if limits.margin < MIN_RATE_LIMIT_MARGIN {
            return Err(ConfigError::MarginTooSmall {
                min: MIN_RATE_LIMIT_MARGIN,
                got: limits.margin,
            });
        }
        if limits.tolerance > limits.margin {
            return Err(ConfigError::ToleranceExceedsMargin {
                tolerance: limits.tolerance,
                margin: limits.margin,
            });
        }
        if !(0.0..=1.0).contains(&self.stress.packet_loss_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(
                self.stress.packet_loss_threshold,
            ));
        }
        Ok(())
    }

    /// Brute-force candidates, capped at the configured attempt count.
    pub fn brute_force_passwords(&self) -> Vec<String> {
        self.security
            .brute_force_passwords
            .iter()
            .take(self.security.brute_force_attempts)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = HarnessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_limit.public_limit, 100);
        assert_eq!(config.security.sql_injection.len(), 10);
        assert_eq!(config.security.headers.len(), 10);
    }

    #[test]
    fn test_rejects_short_timeout() {
        let mut config = HarnessConfig::default();
        config.timeout_ms = 500;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TimeoutTooShort(500))
        ));
    }

    #[test]
    fn test_rejects_bad_url_and_threshold() {
        let config = HarnessConfig::default().with_base_url("ftp://example.com");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));

        let mut config = HarnessConfig::default();
        config.stress.packet_loss_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOutOfRange(_))
        ));
    }

    #[test]
    fn test_rejects_unusable_rate_limit_settings() {
        let mut config = HarnessConfig::default();
        config.rate_limit.margin = 5;
        config.rate_limit.tolerance = 2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MarginTooSmall { min: 20, got: 5 })
        ));

        let mut config = HarnessConfig::default();
        config.rate_limit.tolerance = 25;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ToleranceExceedsMargin {
                tolerance: 25,
                margin: 20
            })
        ));

        let mut config = HarnessConfig::default();
        config.rate_limit.public_limit = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroCount("public_limit"))
        ));
    }

    #[test]
    fn test_rejects_zero_packet_loss_timeout() {
        let mut config = HarnessConfig::default();
        config.stress.packet_loss_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PacketLossTimeoutTooShort(0))
        ));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"base_url": "http://127.0.0.1:8080", "rate_limit": {{"public_limit": 30}}}}"#
        )
        .unwrap();

        let config = HarnessConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.rate_limit.public_limit, 30);
        assert_eq!(config.rate_limit.tolerance, 10);
        assert_eq!(config.stress.iterations, 100);
    }

    #[test]
    fn test_brute_force_attempt_cap() {
        let mut config = HarnessConfig::default();
        config.security.brute_force_attempts = 3;
        assert_eq!(
            config.brute_force_passwords(),
            vec!["admin", "password", "123456"]
        );
    }

    #[test]
    fn test_fixed_identity() {
        let identity = IdentityConfig {
            username: Some("alice".into()),
            email: Some("alice@example.com".into()),
            password: "pw".into(),
        }
        .resolve();
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.email, "alice@example.com");
    }
}
