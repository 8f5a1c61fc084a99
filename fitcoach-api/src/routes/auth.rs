/// OAuth callback endpoint
///
/// Completes the provider's authorization-code flow: exchanges the code for
/// a session, stores the tokens in HttpOnly cookies, projects the identity,
/// and redirects the browser into the app.
///
/// # Endpoint
///
/// ```text
/// GET /auth/callback?code=<code>&next=/dashboard
/// ```
///
/// # Redirects (303)
///
/// | Outcome | Location |
/// |---|---|
/// | no `code` | `/login?message=...` |
/// | exchange or projection failed | `/login?message=...` |
/// | onboarding incomplete | `/onboarding` |
/// | otherwise | `next` if it is a same-site path, else `/chat` |
///
/// Every location is prefixed with the configured site URL.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
};
use fitcoach_shared::auth::projector::project;
use fitcoach_shared::auth::session::{
    get_cookie_value, AuthSession, ACCESS_TOKEN_COOKIE, CODE_VERIFIER_COOKIE,
    REFRESH_TOKEN_COOKIE,
};
use serde::Deserialize;

const MISSING_CODE_PATH: &str = "/login?message=Missing%20authorization%20code";
const EXCHANGE_FAILED_PATH: &str = "/login?message=Could%20not%20authenticate%20user";
const ONBOARDING_PATH: &str = "/onboarding";
const DEFAULT_NEXT_PATH: &str = "/chat";

/// Refresh cookie lifetime
const REFRESH_TOKEN_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 30;

/// Callback query parameters
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub next: Option<String>,
}

/// OAuth callback handler
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let site = state.config.site.url.as_str();

    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        tracing::debug!("OAuth callback without code");
        return redirect(site, MISSING_CODE_PATH);
    };

    let verifier = get_cookie_value(&headers, CODE_VERIFIER_COOKIE);
    let session = match state
        .sessions
        .provider()
        .exchange_code_for_session(&code, verifier.as_deref())
        .await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "OAuth code exchange failed");
            return redirect(site, EXCHANGE_FAILED_PATH);
        }
    };

    if !is_cookie_value(&session.access_token) || !is_cookie_value(&session.refresh_token) {
        tracing::warn!(user_id = %session.user.id, "Provider issued tokens that are not cookie-safe");
        return redirect(site, EXCHANGE_FAILED_PATH);
    }

    let user = match project(state.store.as_ref(), &session.user).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user.id, "Projection failed during OAuth callback");
            return redirect(site, EXCHANGE_FAILED_PATH);
        }
    };

    let target = if user.onboarding_completed {
        params
            .next
            .as_deref()
            .filter(|next| is_safe_next(next))
            .unwrap_or(DEFAULT_NEXT_PATH)
    } else {
        ONBOARDING_PATH
    };

    tracing::info!(user_id = %user.id, %target, "OAuth sign-in completed");

    let response = redirect(site, target);
    if !response.status().is_redirection() {
        return response;
    }

    let cookies = session_cookies(&session, state.config.api.production);
    (
        AppendHeaders(cookies.map(|cookie| (header::SET_COOKIE, cookie))),
        response,
    )
        .into_response()
}

/// 303 to `{site}{path}`
fn redirect(site: &str, path: &str) -> Response {
    match HeaderValue::from_str(&format!("{}{}", site, path)) {
        Ok(location) => (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response(),
        Err(e) => {
            ApiError::InternalError(format!("Invalid redirect location {}{}: {}", site, path, e))
                .into_response()
        }
    }
}

/// A `next` target must be a path on this site made of visible ASCII
fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && next.bytes().all(|b| b.is_ascii_graphic())
}

/// RFC 6265 `cookie-octet`
fn is_cookie_value(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b.is_ascii_graphic() && !matches!(b, b'"' | b',' | b';' | b'\\'))
}

/// Session cookies, plus clearing the spent PKCE verifier
fn session_cookies(session: &AuthSession, secure: bool) -> [String; 3] {
    let secure = if secure { "; Secure" } else { "" };
    let cookie = |name: &str, value: &str, max_age: i64| {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
            name, value, max_age, secure
        )
    };

    [
        cookie(ACCESS_TOKEN_COOKIE, &session.access_token, session.expires_in),
        cookie(
            REFRESH_TOKEN_COOKIE,
            &session.refresh_token,
            REFRESH_TOKEN_MAX_AGE_SECS,
        ),
        cookie(CODE_VERIFIER_COOKIE, "", 0),
    ]
}
