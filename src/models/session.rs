use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Throwaway account registered against the target for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestIdentity {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl TestIdentity {
    pub fn new(username: String, email: String, password: String) -> Self {
        Self {
            username,
            email,
            password,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        }
    }

    /// `testuser123456` / `test123456@example.com`.
    pub fn synthetic(password: &str) -> Self {
        let suffix: u32 = rand::rng().random_range(100_000..1_000_000);
        Self::new(
            format!("testuser{}", suffix),
            format!("test{}@example.com", suffix),
            password.to_string(),
        )
    }

    pub fn registration_body(&self) -> Value {
        json!({
            "username": self.username,
            "email": self.email,
            "password": self.password,
            "firstName": self.first_name,
            "lastName": self.last_name,
        })
    }

    pub fn login_body(&self) -> Value {
        login_body(&self.email, &self.password)
    }
}

pub fn login_body(identifier: &str, password: &str) -> Value {
    json!({
        "identifier": identifier,
        "password": password,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Registration {
    Created,
    AlreadyExisted,
}

/// Opaque login token. Only obtainable from a [`Session`] that holds one,
/// which is the only way to authorize a probe.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential(String);

impl BearerCredential {
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// Pulls `data.token` (or a top-level `token`) out of a login response.
    pub fn from_login_body(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        value
            .pointer("/data/token")
            .or_else(|| value.get("token"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(|token| Self(token.to_string()))
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerCredential(***)")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(skip_serializing)]
    bearer_token: Option<String>,
    pub registration: Option<Registration>,
    pub verified: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(
        credential: BearerCredential,
        registration: Registration,
        verified: bool,
    ) -> Self {
        Self {
            bearer_token: Some(credential.0),
            registration: Some(registration),
            verified,
        }
    }

    pub fn credential(&self) -> Option<BearerCredential> {
        self.bearer_token.clone().map(BearerCredential)
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer_token.is_some()
    }
}
