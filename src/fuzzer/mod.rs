mod cases;
mod headers;
mod payloads;

pub use cases::{
    CaseBuilder, FieldTarget, LOGIN_ENDPOINT, PATH_TRAVERSAL_BASES, PROTECTED_ENDPOINT,
    REGISTER_ENDPOINT, SQL_INJECTION_TARGETS, XSS_TARGETS,
};
pub use headers::{HeaderFuzzer, HeaderPayload};
pub use payloads::PayloadLibrary;
