/// Storage boundary
///
/// Every durable read and write goes through these traits. Two backends
/// implement them:
///
/// - [`postgres::PgStore`]: the production PostgreSQL store (sqlx)
/// - [`memory::MemoryStore`]: an in-process store used by tests
///
/// # Upsert contract
///
/// [`UserStore::upsert_user`] must be an atomic "insert on absent, no-op on
/// present". Two concurrent first visits for the same identity must both
/// succeed and observe the same single row. Application code never does
/// check-then-create.
///
/// # Ownership filters
///
/// Chat lookups, updates and deletes always take `(id, user_id)`. A chat
/// owned by someone else is reported exactly like a missing chat.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::chat::{Chat, ChatMessage, ChatSummary};
use crate::models::program::{TrainingSplit, UserPurchase};
use crate::models::user::{ApplicationUser, NewApplicationUser};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database driver error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Row could not be mapped into a model
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Any other backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Application user persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a user by ID
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<ApplicationUser>>;

    /// Creates the user with default role/plan/onboarding if absent and
    /// returns the surviving row
    async fn upsert_user(&self, user: NewApplicationUser) -> StoreResult<ApplicationUser>;

    /// Marks onboarding as completed; `None` if the user does not exist
    async fn complete_onboarding(&self, id: Uuid) -> StoreResult<Option<ApplicationUser>>;

    /// Lists users, newest first
    async fn list_users(&self, limit: i64, offset: i64) -> StoreResult<Vec<ApplicationUser>>;
}

/// Chat persistence, always scoped by owner
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Lists a user's chats, most recently updated first
    async fn list_chats(&self, user_id: Uuid) -> StoreResult<Vec<ChatSummary>>;

    /// Finds a chat by `(id, user_id)`
    async fn find_chat(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<Chat>>;

    /// Creates a new chat
    async fn create_chat(
        &self,
        user_id: Uuid,
        title: String,
        messages: Vec<ChatMessage>,
    ) -> StoreResult<Chat>;

    /// Appends messages to a chat matched by `(id, user_id)`
    async fn append_messages(
        &self,
        id: Uuid,
        user_id: Uuid,
        messages: Vec<ChatMessage>,
    ) -> StoreResult<Option<Chat>>;

    /// Deletes a chat matched by `(id, user_id)`; false if nothing matched
    async fn delete_chat(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool>;
}

/// Training program reads
#[async_trait]
pub trait ProgramStore: Send + Sync {
    /// Lists all training splits by name
    async fn list_training_splits(&self) -> StoreResult<Vec<TrainingSplit>>;

    /// Lists a user's purchases, newest first
    async fn list_purchases(&self, user_id: Uuid) -> StoreResult<Vec<UserPurchase>>;
}

/// Everything the API needs from storage
#[async_trait]
pub trait Store: UserStore + ChatStore + ProgramStore {
    /// Verifies the backend is reachable
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Shared handle to a store backend
pub type SharedStore = Arc<dyn Store>;
