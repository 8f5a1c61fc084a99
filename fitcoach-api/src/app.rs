/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use fitcoach_api::{app::{build_router, AppState}, config::Config};
/// use fitcoach_shared::auth::session::SessionResolver;
/// use fitcoach_shared::auth::supabase::SupabaseAuth;
/// use fitcoach_shared::llm::GeminiClient;
/// use fitcoach_shared::store::MemoryStore;
/// use std::sync::Arc;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let sessions = SessionResolver::new(Arc::new(SupabaseAuth::new(
///     config.supabase.url.clone(),
///     config.supabase.anon_key.clone(),
/// )));
/// let llm = Arc::new(GeminiClient::new(
///     config.gemini.base_url.clone(),
///     config.gemini.model.clone(),
///     config.gemini.api_key.clone(),
/// ));
///
/// let state = AppState::new(Arc::new(MemoryStore::new()), sessions, llm, config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use fitcoach_shared::auth::gate::{GateContext, MaintenanceState};
use fitcoach_shared::auth::session::SessionResolver;
use fitcoach_shared::llm::ChatModel;
use fitcoach_shared::store::SharedStore;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Every
/// field is read-only for the lifetime of the process.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend
    pub store: SharedStore,

    /// Session resolver over the auth provider
    pub sessions: SessionResolver,

    /// Conversational model
    pub llm: Arc<dyn ChatModel>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Maintenance flag, fixed at startup
    pub maintenance: MaintenanceState,
}

impl AppState {
    pub fn new(
        store: SharedStore,
        sessions: SessionResolver,
        llm: Arc<dyn ChatModel>,
        config: Config,
    ) -> Self {
        Self {
            store,
            sessions,
            llm,
            maintenance: MaintenanceState::new(config.maintenance_mode),
            config: Arc::new(config),
        }
    }

    /// Gate inputs for this process
    pub fn gate_context(&self) -> GateContext {
        GateContext::new(self.maintenance)
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                          # public
/// ├── GET  /auth/callback                   # OAuth code exchange
/// └── /api/
///     ├── GET    /maintenance/status        # self-describing, optional session
///     ├── GET    /user/role                 # session required from here on
///     ├── POST   /user/onboarding
///     ├── GET    /conversations
///     ├── GET    /conversations/:id
///     ├── DELETE /conversations/:id
///     ├── POST   /chat
///     ├── GET    /programs
///     ├── GET    /programs/purchases
///     ├── GET    /admin/check-status
///     └── GET    /admin/users
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Session resolution (session routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/callback", get(routes::auth::callback))
        .route("/api/maintenance/status", get(routes::maintenance::status));

    let session_routes = Router::new()
        .route("/user/role", get(routes::user::get_role))
        .route("/user/onboarding", post(routes::user::complete_onboarding))
        .route("/conversations", get(routes::conversations::list_conversations))
        .route(
            "/conversations/:id",
            get(routes::conversations::get_conversation)
                .delete(routes::conversations::delete_conversation),
        )
        .route("/chat", post(routes::chat::send_message))
        .route("/programs", get(routes::programs::list_programs))
        .route("/programs/purchases", get(routes::programs::list_purchases))
        .route("/admin/check-status", get(routes::admin::check_status))
        .route("/admin/users", get(routes::admin::list_users))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .merge(public_routes)
        .nest("/api", session_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Session middleware layer
///
/// Resolves the caller's [`Identity`](fitcoach_shared::models::user::Identity)
/// and injects it into request extensions. No identity is 401, a provider
/// failure is 500; neither reaches the handler.
async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = state
        .sessions
        .resolve(req.headers())
        .await?
        .ok_or_else(ApiError::unauthenticated)?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
