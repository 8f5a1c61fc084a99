//! Common test utilities for integration tests
//!
//! Builds the real router over in-process collaborators:
//! - `MemoryStore` for persistence
//! - `ScriptedAuth`, an auth provider driven by token and code tables
//! - `CannedModel`, a chat model that answers with a fixed reply
//!
//! No database or network access is needed.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use chrono::Utc;
use fitcoach_api::app::{build_router, AppState};
use fitcoach_api::config::Config;
use fitcoach_shared::auth::session::{AuthProvider, AuthProviderError, AuthSession, SessionResolver};
use fitcoach_shared::llm::{ChatModel, LlmError};
use fitcoach_shared::models::chat::{Chat, ChatMessage};
use fitcoach_shared::models::user::{ApplicationUser, Identity, PlanTier, UserRole};
use fitcoach_shared::store::MemoryStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const SITE_URL: &str = "https://fitcoach.test";
pub const CANNED_REPLY: &str = "Train legs twice a week.";

/// Auth provider answering from fixed tables
#[derive(Default)]
pub struct ScriptedAuth {
    tokens: Mutex<HashMap<String, Identity>>,
    codes: Mutex<HashMap<String, Identity>>,
    unavailable: Mutex<bool>,
    pub lookups: AtomicUsize,
    pub verifiers: Mutex<Vec<Option<String>>>,
}

impl ScriptedAuth {
    pub fn add_token(&self, token: &str, identity: Identity) {
        self.tokens.lock().unwrap().insert(token.to_string(), identity);
    }

    pub fn add_code(&self, code: &str, identity: Identity) {
        self.codes.lock().unwrap().insert(code.to_string(), identity);
    }

    /// Makes every call fail as if the provider were down
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), AuthProviderError> {
        if *self.unavailable.lock().unwrap() {
            return Err(AuthProviderError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for ScriptedAuth {
    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthProviderError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.tokens.lock().unwrap().get(access_token).cloned())
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<AuthSession, AuthProviderError> {
        self.check_available()?;
        self.verifiers
            .lock()
            .unwrap()
            .push(code_verifier.map(String::from));

        let user = self
            .codes
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or_else(|| AuthProviderError::Rejected("invalid flow state".to_string()))?;

        Ok(AuthSession {
            access_token: format!("access-{}", code),
            refresh_token: format!("refresh-{}", code),
            expires_in: 3600,
            user,
        })
    }
}

/// Chat model with a fixed answer that records what it was sent
#[derive(Default)]
pub struct CannedModel {
    pub conversations: Mutex<Vec<Vec<ChatMessage>>>,
    failing: Mutex<bool>,
}

impl CannedModel {
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn call_count(&self) -> usize {
        self.conversations.lock().unwrap().len()
    }

    pub fn last_conversation(&self) -> Option<Vec<ChatMessage>> {
        self.conversations.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatModel for CannedModel {
    async fn send(&self, conversation: &[ChatMessage], _user_id: Option<Uuid>) -> Result<String, LlmError> {
        self.conversations.lock().unwrap().push(conversation.to_vec());
        if *self.failing.lock().unwrap() {
            return Err(LlmError::Upstream {
                status: 503,
                message: "overloaded".to_string(),
            });
        }
        Ok(CANNED_REPLY.to_string())
    }
}

/// Switches applied on top of the default test configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct TestOptions {
    pub maintenance: bool,
    pub chat_coming_soon: bool,
}

pub fn test_config(options: TestOptions) -> Config {
    let flag = |on: bool| (if on { "true" } else { "false" }).to_string();
    let vars: HashMap<&str, String> = HashMap::from([
        ("DATABASE_URL", "postgresql://unused/fitcoach".to_string()),
        ("SUPABASE_URL", "https://project.supabase.test".to_string()),
        ("SUPABASE_ANON_KEY", "anon".to_string()),
        ("GEMINI_API_KEY", "gemini".to_string()),
        ("NEXT_PUBLIC_SITE_URL", SITE_URL.to_string()),
        ("MAINTENANCE_MODE", flag(options.maintenance)),
        ("NEXT_PUBLIC_CHAT_COMING_SOON", flag(options.chat_coming_soon)),
    ]);

    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config is valid")
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryStore>,
    pub auth: Arc<ScriptedAuth>,
    pub llm: Arc<CannedModel>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_options(TestOptions::default())
    }

    pub fn with_options(options: TestOptions) -> Self {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(ScriptedAuth::default());
        let llm = Arc::new(CannedModel::default());

        let state = AppState::new(
            store.clone(),
            SessionResolver::new(auth.clone()),
            llm.clone(),
            test_config(options),
        );

        Self {
            app: build_router(state),
            store,
            auth,
            llm,
        }
    }

    /// Registers a signed-in identity and returns its bearer token
    pub fn sign_in(&self) -> (String, Identity) {
        let identity = Identity::new(Uuid::new_v4(), Some("athlete@example.com".to_string()));
        let token = format!("token-{}", identity.id);
        self.auth.add_token(&token, identity.clone());
        (token, identity)
    }

    /// Signs in and stores an application user with the given role
    pub async fn sign_in_as(&self, role: UserRole, onboarding_completed: bool) -> (String, ApplicationUser) {
        let (token, identity) = self.sign_in();
        let now = Utc::now();
        let user = ApplicationUser {
            id: identity.id,
            email: identity.email,
            role,
            plan: PlanTier::Free,
            onboarding_completed,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_user(user.clone()).await;
        (token, user)
    }

    /// Stores a chat owned by `user_id`
    pub async fn seed_chat(&self, user_id: Uuid, title: &str) -> Chat {
        let now = Utc::now();
        let chat = Chat {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            messages: vec![
                ChatMessage::user("What should I eat before training?"),
                ChatMessage::assistant("Carbs and some protein."),
            ],
            created_at: now,
            updated_at: now,
        };
        self.store.insert_chat(chat.clone()).await;
        chat
    }

    /// Sends a request and returns the raw response
    pub async fn call(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Sends a request and decodes a JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.call(request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }
}

/// Collects `Set-Cookie` headers
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(String::from)
        .collect()
}

/// Reads the `Location` header
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
