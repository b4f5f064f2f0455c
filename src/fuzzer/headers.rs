use serde::{Deserialize, Serialize};

/// One malicious request header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPayload {
    pub name: String,
    pub value: String,
}

pub struct HeaderFuzzer;

impl HeaderFuzzer {
    const COMMAND_HEADERS: &'static [(&'static str, &'static str)] =
        &[("X-Forwarded-For", "127.0.0.1; rm -rf /")];

    const SCRIPT_HEADERS: &'static [(&'static str, &'static str)] = &[
        ("User-Agent", "<script>alert(\"XSS\")</script>"),
        ("Referer", "javascript:alert(\"XSS\")"),
    ];

    const IP_SPOOF_HEADERS: &'static [(&'static str, &'static str)] = &[
        ("X-Real-IP", "0.0.0.0"),
        ("X-Originating-IP", "127.0.0.1"),
        ("X-Remote-IP", "127.0.0.1"),
        ("X-Remote-Addr", "127.0.0.1"),
        ("X-Cluster-Client-IP", "127.0.0.1"),
    ];

    const PROTOCOL_HEADERS: &'static [(&'static str, &'static str)] = &[
        ("Host", "evil.com"),
        ("Content-Type", "application/json; charset=utf-7"),
    ];

    pub fn get_ip_spoof_headers() -> Vec<HeaderPayload> {
        Self::headers_to_vec(Self::IP_SPOOF_HEADERS)
    }

    pub fn get_injection_headers() -> Vec<HeaderPayload> {
        let mut all = Vec::new();
        all.extend(Self::headers_to_vec(Self::COMMAND_HEADERS));
        all.extend(Self::headers_to_vec(Self::SCRIPT_HEADERS));
        all.extend(Self::get_ip_spoof_headers());
        all.extend(Self::headers_to_vec(Self::PROTOCOL_HEADERS));
        all
    }

    fn headers_to_vec(headers: &[(&str, &str)]) -> Vec<HeaderPayload> {
        headers
            .iter()
            .map(|(k, v)| HeaderPayload {
                name: k.to_string(),
                value: v.to_string(),
            })
            .collect()
    }
}
