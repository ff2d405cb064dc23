use crate::config::IdentityConfig;
use axum::http::HeaderMap;

/// The signed-in user making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
}

impl Caller {
    /// Label stored on records the caller creates: email when known, id otherwise.
    pub fn label(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<Caller>;
}

/// Trusts the headers an authenticating gateway sets in front of this service.
pub struct GatewayIdentity {
    config: IdentityConfig,
}

impl GatewayIdentity {
    pub fn new(config: IdentityConfig) -> Self {
        Self { config }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl IdentityResolver for GatewayIdentity {
    fn resolve(&self, headers: &HeaderMap) -> Option<Caller> {
        let id = header_value(headers, &self.config.user_id_header)?;
        Some(Caller {
            id,
            email: header_value(headers, &self.config.email_header),
            first_name: header_value(headers, &self.config.first_name_header),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_resolves_from_configured_headers() {
        let resolver = GatewayIdentity::new(IdentityConfig::default());
        let mut headers = HeaderMap::new();
        assert!(resolver.resolve(&headers).is_none());

        headers.insert("x-user-id", HeaderValue::from_static("  "));
        assert!(resolver.resolve(&headers).is_none());

        headers.insert("x-user-id", HeaderValue::from_static("user_1"));
        headers.insert("x-user-email", HeaderValue::from_static("ada@example.com"));
        let caller = resolver.resolve(&headers).unwrap();
        assert_eq!(caller.id, "user_1");
        assert_eq!(caller.label(), "ada@example.com");
        assert_eq!(caller.first_name, None);
    }
}
