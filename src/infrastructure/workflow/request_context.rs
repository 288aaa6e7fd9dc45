//! Read-only per-request context
//!
//! Established by the caller before a run starts and passed explicitly to
//! the engine. Replaces any ambient request-scoped storage: everything a
//! node may need about the inbound request travels through this value.

use std::collections::HashMap;

use crate::domain::traits::UserIdentity;

const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "x-api-key"];

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Authenticated caller, when the request carried one. Attributed to
    /// persisted interactions.
    pub user: Option<UserIdentity>,

    /// Inbound request headers, lowercased keys.
    pub headers: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserIdentity) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Headers safe to include in telemetry events.
    pub fn sanitized_headers(&self) -> HashMap<&str, &str> {
        self.headers
            .iter()
            .filter(|(k, _)| !SENSITIVE_HEADERS.contains(&k.as_str()))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_headers_drop_credentials() {
        let ctx = RequestContext::new()
            .with_header("Authorization", "Bearer secret")
            .with_header("Cookie", "session=abc")
            .with_header("User-Agent", "test");

        let headers = ctx.sanitized_headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("user-agent"), Some(&"test"));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let ctx = RequestContext::new().with_header("X-Request-Id", "abc-123");
        assert_eq!(ctx.header("x-request-id"), Some("abc-123"));
        assert_eq!(ctx.header("X-Request-Id"), Some("abc-123"));
    }
}
