use crate::models::{HttpMethod, InjectionPoint, PayloadCase, PayloadCategory};

use super::HeaderPayload;

/// An (endpoint, field) pair that receives payloads in its JSON body.
#[derive(Debug, Clone, Copy)]
pub struct FieldTarget {
    pub method: HttpMethod,
    pub endpoint: &'static str,
    pub field: &'static str,
    pub requires_auth: bool,
}

impl FieldTarget {
    const fn public(endpoint: &'static str, field: &'static str) -> Self {
        Self {
            method: HttpMethod::Post,
            endpoint,
            field,
            requires_auth: false,
        }
    }

    const fn protected(endpoint: &'static str, field: &'static str) -> Self {
        Self {
            method: HttpMethod::Post,
            endpoint,
            field,
            requires_auth: true,
        }
    }
}

pub const SQL_INJECTION_TARGETS: &[FieldTarget] = &[
    FieldTarget::public("/api/auth/login", "email"),
    FieldTarget::public("/api/auth/login", "password"),
    FieldTarget::public("/api/auth/register", "username"),
    FieldTarget::public("/api/auth/register", "email"),
];

pub const XSS_TARGETS: &[FieldTarget] = &[
    FieldTarget::public("/api/auth/register", "name"),
    FieldTarget::public("/api/auth/register", "username"),
    FieldTarget::protected("/api/tasks", "title"),
    FieldTarget::protected("/api/tasks", "description"),
];

pub const PATH_TRAVERSAL_BASES: &[&str] = &["/api/tasks/", "/", "/api/auth/"];

pub const PROTECTED_ENDPOINT: &str = "/api/tasks";
pub const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub const REGISTER_ENDPOINT: &str = "/api/auth/register";

/// Expands targets and payload lists into ordered [`PayloadCase`] lists.
/// Order is target-major, then payload, so outcomes can be matched by position.
pub struct CaseBuilder;

impl CaseBuilder {
    pub fn field_cases(
        category: PayloadCategory,
        targets: &[FieldTarget],
        payloads: &[String],
    ) -> Vec<PayloadCase> {
        targets
            .iter()
            .flat_map(|target| {
                payloads.iter().map(move |payload| PayloadCase {
                    category,
                    method: target.method,
                    target_endpoint: target.endpoint.to_string(),
                    injection: InjectionPoint::BodyField(target.field.to_string()),
                    payload_value: payload.clone(),
                    requires_auth: target.requires_auth,
                })
            })
            .collect()
    }

    pub fn path_cases(bases: &[&str], payloads: &[String]) -> Vec<PayloadCase> {
        bases
            .iter()
            .flat_map(|base| {
                payloads.iter().map(move |payload| PayloadCase {
                    category: PayloadCategory::PathTraversal,
                    method: HttpMethod::Get,
                    target_endpoint: base.to_string(),
                    injection: InjectionPoint::PathSuffix,
                    payload_value: payload.clone(),
                    requires_auth: false,
                })
            })
            .collect()
    }

    pub fn header_cases(endpoint: &str, headers: &[HeaderPayload]) -> Vec<PayloadCase> {
        headers
            .iter()
            .map(|header| PayloadCase {
                category: PayloadCategory::HeaderInjection,
                method: HttpMethod::Get,
                target_endpoint: endpoint.to_string(),
                injection: InjectionPoint::Header(header.name.clone()),
                payload_value: header.value.clone(),
                requires_auth: false,
            })
            .collect()
    }

    pub fn jwt_cases(endpoint: &str, payloads: &[String]) -> Vec<PayloadCase> {
        payloads
            .iter()
            .map(|payload| PayloadCase {
                category: PayloadCategory::JwtBypass,
                method: HttpMethod::Get,
                target_endpoint: endpoint.to_string(),
                injection: InjectionPoint::Authorization,
                payload_value: payload.clone(),
                requires_auth: false,
            })
            .collect()
    }

    pub fn brute_force_cases(identifier: &str, passwords: &[String]) -> Vec<PayloadCase> {
        passwords
            .iter()
            .map(|password| PayloadCase {
                category: PayloadCategory::BruteForce,
                method: HttpMethod::Post,
                target_endpoint: LOGIN_ENDPOINT.to_string(),
                injection: InjectionPoint::LoginPassword(identifier.to_string()),
                payload_value: password.clone(),
                requires_auth: false,
            })
            .collect()
    }

    /// First three XSS and first three SQLi payloads, replayed as task titles.
    pub fn task_replay_cases(xss: &[String], sql_injection: &[String]) -> Vec<PayloadCase> {
        let xss = xss.iter().take(3).map(|p| (PayloadCategory::Xss, p));
        let sqli = sql_injection
            .iter()
            .take(3)
            .map(|p| (PayloadCategory::SqlInjection, p));

        xss.chain(sqli)
            .map(|(category, payload)| PayloadCase {
                category,
                method: HttpMethod::Post,
                target_endpoint: PROTECTED_ENDPOINT.to_string(),
                injection: InjectionPoint::TaskTitle,
                payload_value: payload.clone(),
                requires_auth: true,
            })
            .collect()
    }
}
