/// Session resolution
///
/// Turns an inbound request's credentials into an [`Identity`] or a
/// well-defined absence. Absence ("not logged in", expired token, revoked
/// session) is a normal outcome and is returned as `Ok(None)`. Only a
/// failure of the auth provider itself is an error.
///
/// # Credentials
///
/// Checked in order:
/// 1. `Authorization: Bearer <token>`
/// 2. `sb-access-token` cookie
///
/// # Status mapping
///
/// | Outcome | Status |
/// |---|---|
/// | `Ok(Some(identity))` | continue |
/// | `Ok(None)` | 401 |
/// | `Err(SessionError)` | 500 |
///
/// # Example
///
/// ```no_run
/// use axum::http::HeaderMap;
/// use fitcoach_shared::auth::session::SessionResolver;
///
/// # async fn example(resolver: SessionResolver, headers: HeaderMap) {
/// match resolver.resolve(&headers).await {
///     Ok(Some(identity)) => println!("user {}", identity.id),
///     Ok(None) => println!("not signed in"),
///     Err(e) => eprintln!("auth provider failed: {}", e),
/// }
/// # }
/// ```

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::user::Identity;

/// Cookie carrying the provider access token
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Cookie carrying the provider refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "sb-refresh-token";

/// Cookie carrying the PKCE code verifier set when the OAuth flow started
pub const CODE_VERIFIER_COOKIE: &str = "sb-code-verifier";

/// Errors reported by an auth provider
#[derive(Debug, thiserror::Error)]
pub enum AuthProviderError {
    /// Provider could not be reached
    #[error("Auth provider unreachable: {0}")]
    Transport(String),

    /// Provider answered with an unexpected status or body
    #[error("Auth provider error: {0}")]
    Upstream(String),

    /// Provider refused the request (bad or expired code)
    #[error("Auth provider rejected the request: {0}")]
    Rejected(String),
}

/// Session tokens issued by the provider after a code exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Subject the session belongs to
    pub user: Identity,
}

/// External authentication provider
///
/// Implemented by [`super::supabase::SupabaseAuth`] in production.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the subject for a valid access token, `None` if the token is
    /// invalid or expired
    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthProviderError>;

    /// Exchanges an OAuth authorization code (plus the PKCE verifier, when
    /// the flow used one) for a session
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<AuthSession, AuthProviderError>;
}

/// Session resolution failure (provider down, not "logged out")
#[derive(Debug, thiserror::Error)]
#[error("Session lookup failed: {0}")]
pub struct SessionError(#[from] pub AuthProviderError);

/// Resolves request credentials against an [`AuthProvider`]
#[derive(Clone)]
pub struct SessionResolver {
    provider: Arc<dyn AuthProvider>,
}

impl SessionResolver {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// The provider this resolver consults
    pub fn provider(&self) -> &Arc<dyn AuthProvider> {
        &self.provider
    }

    /// Resolves the caller's identity
    ///
    /// Requests without credentials are answered without contacting the
    /// provider.
    pub async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Identity>, SessionError> {
        let Some(token) = extract_access_token(headers) else {
            tracing::debug!("No session credentials on request");
            return Ok(None);
        };

        match self.provider.get_user(&token).await {
            Ok(Some(identity)) => {
                tracing::debug!(user_id = %identity.id, "Session resolved");
                Ok(Some(identity))
            }
            Ok(None) => {
                tracing::debug!("Session token rejected by provider");
                Ok(None)
            }
            Err(e) => {
                tracing::error!(error = %e, "Auth provider failure during session lookup");
                Err(SessionError(e))
            }
        }
    }
}

/// Extracts the access token from the bearer header or session cookie
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    get_cookie_value(headers, ACCESS_TOKEN_COOKIE).filter(|token| !token.is_empty())
}

/// Reads a cookie value from the `Cookie` header(s)
pub fn get_cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name.trim() == cookie_name).then(|| value.trim().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Provider that accepts exactly one token
    struct OneTokenProvider {
        token: String,
        identity: Identity,
        calls: AtomicUsize,
        fail: bool,
    }

    impl OneTokenProvider {
        fn new(token: &str) -> Self {
            Self {
                token: token.to_string(),
                identity: Identity::new(Uuid::new_v4(), Some("a@example.com".to_string())),
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl AuthProvider for OneTokenProvider {
        async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AuthProviderError::Transport("connection refused".to_string()));
            }
            Ok((access_token == self.token).then(|| self.identity.clone()))
        }

        async fn exchange_code_for_session(
            &self,
            _code: &str,
            _code_verifier: Option<&str>,
        ) -> Result<AuthSession, AuthProviderError> {
            Err(AuthProviderError::Rejected("unsupported".to_string()))
        }
    }

    fn headers_with(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        let headers = headers_with(header::AUTHORIZATION, "Bearer abc.def");
        assert_eq!(extract_access_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_extract_cookie_token() {
        let headers = headers_with(header::COOKIE, "theme=dark; sb-access-token=tok123; other=1");
        assert_eq!(extract_access_token(&headers).as_deref(), Some("tok123"));
    }

    #[test]
    fn test_bearer_takes_precedence_over_cookie() {
        let mut headers = headers_with(header::COOKIE, "sb-access-token=cookie");
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer header"));
        assert_eq!(extract_access_token(&headers).as_deref(), Some("header"));
    }

    #[test]
    fn test_extract_ignores_non_bearer_and_empty() {
        assert!(extract_access_token(&headers_with(header::AUTHORIZATION, "Basic Zm9v")).is_none());
        assert!(extract_access_token(&headers_with(header::AUTHORIZATION, "Bearer   ")).is_none());
        assert!(extract_access_token(&headers_with(header::COOKIE, "sb-access-token=")).is_none());
        assert!(extract_access_token(&HeaderMap::new()).is_none());
    }

    #[tokio::test]
    async fn test_resolve_without_credentials_skips_provider() {
        let provider = Arc::new(OneTokenProvider::new("good"));
        let resolver = SessionResolver::new(provider.clone());

        let outcome = resolver.resolve(&HeaderMap::new()).await.unwrap();

        assert!(outcome.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_valid_and_invalid_tokens() {
        let provider = Arc::new(OneTokenProvider::new("good"));
        let expected = provider.identity.clone();
        let resolver = SessionResolver::new(provider);

        let ok = resolver
            .resolve(&headers_with(header::AUTHORIZATION, "Bearer good"))
            .await
            .unwrap();
        assert_eq!(ok, Some(expected));

        let absent = resolver
            .resolve(&headers_with(header::AUTHORIZATION, "Bearer stale"))
            .await
            .unwrap();
        assert!(absent.is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_is_an_error_not_absence() {
        let mut provider = OneTokenProvider::new("good");
        provider.fail = true;
        let resolver = SessionResolver::new(Arc::new(provider));

        let result = resolver
            .resolve(&headers_with(header::AUTHORIZATION, "Bearer good"))
            .await;

        assert!(result.is_err());
    }
}
