/// Supabase (GoTrue) auth provider client
///
/// Thin `reqwest` client over the two GoTrue endpoints the API needs:
///
/// - `GET  {url}/auth/v1/user`: resolve an access token to a user
/// - `POST {url}/auth/v1/token?grant_type=pkce`: exchange an OAuth code
///
/// Every request carries the project's anon key in the `apikey` header.
///
/// # Example
///
/// ```no_run
/// use fitcoach_shared::auth::session::AuthProvider;
/// use fitcoach_shared::auth::supabase::SupabaseAuth;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let auth = SupabaseAuth::new("https://project.supabase.co", "anon-key");
/// if let Some(identity) = auth.get_user("access-token").await? {
///     println!("signed in as {}", identity.id);
/// }
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use super::session::{AuthProvider, AuthProviderError, AuthSession};
use crate::models::user::Identity;

/// GoTrue user payload (subset)
#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    email: Option<String>,
}

impl From<GoTrueUser> for Identity {
    fn from(user: GoTrueUser) -> Self {
        Identity::new(user.id, user.email.filter(|e| !e.is_empty()))
    }
}

/// GoTrue token response (subset)
#[derive(Debug, Deserialize)]
struct GoTrueSession {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: GoTrueUser,
}

/// Supabase auth client
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
    /// Creates a client for a Supabase project
    ///
    /// # Arguments
    ///
    /// * `base_url` - Project URL, e.g. `https://xyz.supabase.co`
    /// * `anon_key` - Public anon key
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, anon_key)
    }

    /// Creates a client reusing an existing `reqwest::Client`
    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthProviderError> {
        let response = self
            .http
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthProviderError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let user: GoTrueUser = response
                    .json()
                    .await
                    .map_err(|e| AuthProviderError::Upstream(format!("Invalid user payload: {}", e)))?;
                Ok(Some(user.into()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(AuthProviderError::Upstream(format!(
                "Unexpected status {} from user endpoint",
                status
            ))),
        }
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<AuthSession, AuthProviderError> {
        let body = serde_json::json!({
            "auth_code": code,
            "code_verifier": code_verifier,
        });

        let response = self
            .http
            .post(self.endpoint("token"))
            .query(&[("grant_type", "pkce")])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let session: GoTrueSession = response
                .json()
                .await
                .map_err(|e| AuthProviderError::Upstream(format!("Invalid session payload: {}", e)))?;

            return Ok(AuthSession {
                access_token: session.access_token,
                refresh_token: session.refresh_token,
                expires_in: session.expires_in,
                user: session.user.into(),
            });
        }

        let detail = response.text().await.unwrap_or_default();
        match status {
            StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND => Err(AuthProviderError::Rejected(detail)),
            _ => Err(AuthProviderError::Upstream(format!(
                "Unexpected status {} from token endpoint: {}",
                status, detail
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_user_returns_identity() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer good-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "email": "coach@example.com",
                "aud": "authenticated"
            })))
            .mount(&server)
            .await;

        let auth = SupabaseAuth::new(server.uri(), "anon");
        let identity = auth.get_user("good-token").await.unwrap().unwrap();

        assert_eq!(identity.id, id);
        assert_eq!(identity.email.as_deref(), Some("coach@example.com"));
    }

    #[tokio::test]
    async fn test_get_user_invalid_token_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "invalid JWT"})))
            .mount(&server)
            .await;

        let auth = SupabaseAuth::new(server.uri(), "anon");
        assert!(auth.get_user("expired").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_user_server_error_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let auth = SupabaseAuth::new(server.uri(), "anon");
        let err = auth.get_user("any").await.unwrap_err();
        assert!(matches!(err, AuthProviderError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_exchange_code_for_session() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "pkce"))
            .and(body_partial_json(json!({"auth_code": "abc", "code_verifier": "v"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at",
                "refresh_token": "rt",
                "expires_in": 3600,
                "token_type": "bearer",
                "user": {"id": id, "email": "new@example.com"}
            })))
            .mount(&server)
            .await;

        let auth = SupabaseAuth::new(format!("{}/", server.uri()), "anon");
        let session = auth.exchange_code_for_session("abc", Some("v")).await.unwrap();

        assert_eq!(session.access_token, "at");
        assert_eq!(session.refresh_token, "rt");
        assert_eq!(session.expires_in, 3600);
        assert_eq!(session.user.id, id);
    }

    #[tokio::test]
    async fn test_exchange_bad_code_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid flow state"))
            .mount(&server)
            .await;

        let auth = SupabaseAuth::new(server.uri(), "anon");
        let err = auth.exchange_code_for_session("bad", None).await.unwrap_err();
        assert!(matches!(err, AuthProviderError::Rejected(ref msg) if msg.contains("invalid flow state")));
    }
}
