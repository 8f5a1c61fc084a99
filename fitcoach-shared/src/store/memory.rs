/// In-memory store
///
/// Keeps all tables behind one `RwLock`, so every trait method is atomic
/// with respect to the others. In particular `upsert_user` checks and
/// inserts under a single write guard, matching the PostgreSQL
/// `ON CONFLICT` guarantee.
///
/// Used by the test suites and for running the API without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChatStore, ProgramStore, Store, StoreResult, UserStore};
use crate::models::chat::{Chat, ChatMessage, ChatSummary};
use crate::models::program::{TrainingSplit, UserPurchase};
use crate::models::user::{ApplicationUser, NewApplicationUser, PlanTier, UserRole};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, ApplicationUser>,
    chats: HashMap<Uuid, Chat>,
    training_splits: Vec<TrainingSplit>,
    purchases: Vec<UserPurchase>,
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user row verbatim
    pub async fn insert_user(&self, user: ApplicationUser) {
        self.tables.write().await.users.insert(user.id, user);
    }

    /// Inserts or replaces a chat verbatim
    pub async fn insert_chat(&self, chat: Chat) {
        self.tables.write().await.chats.insert(chat.id, chat);
    }

    pub async fn insert_training_split(&self, split: TrainingSplit) {
        self.tables.write().await.training_splits.push(split);
    }

    pub async fn insert_purchase(&self, purchase: UserPurchase) {
        self.tables.write().await.purchases.push(purchase);
    }

    /// Number of user rows
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Number of chat rows across all users
    pub async fn chat_count(&self) -> usize {
        self.tables.read().await.chats.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<ApplicationUser>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn upsert_user(&self, user: NewApplicationUser) -> StoreResult<ApplicationUser> {
        let mut tables = self.tables.write().await;
        let row = tables.users.entry(user.id).or_insert_with(|| {
            let now = Utc::now();
            ApplicationUser {
                id: user.id,
                email: user.email,
                role: UserRole::User,
                plan: PlanTier::Free,
                onboarding_completed: false,
                created_at: now,
                updated_at: now,
            }
        });

        Ok(row.clone())
    }

    async fn complete_onboarding(&self, id: Uuid) -> StoreResult<Option<ApplicationUser>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            user.onboarding_completed = true;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn list_users(&self, limit: i64, offset: i64) -> StoreResult<Vec<ApplicationUser>> {
        let tables = self.tables.read().await;
        let mut users: Vec<_> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(users
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn list_chats(&self, user_id: Uuid) -> StoreResult<Vec<ChatSummary>> {
        let tables = self.tables.read().await;
        let mut chats: Vec<_> = tables
            .chats
            .values()
            .filter(|chat| chat.user_id == user_id)
            .map(Chat::summary)
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(chats)
    }

    async fn find_chat(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<Chat>> {
        let tables = self.tables.read().await;
        Ok(tables
            .chats
            .get(&id)
            .filter(|chat| chat.user_id == user_id)
            .cloned())
    }

    async fn create_chat(
        &self,
        user_id: Uuid,
        title: String,
        messages: Vec<ChatMessage>,
    ) -> StoreResult<Chat> {
        let now = Utc::now();
        let chat = Chat {
            id: Uuid::new_v4(),
            user_id,
            title,
            messages,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.chats.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn append_messages(
        &self,
        id: Uuid,
        user_id: Uuid,
        messages: Vec<ChatMessage>,
    ) -> StoreResult<Option<Chat>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .chats
            .get_mut(&id)
            .filter(|chat| chat.user_id == user_id)
            .map(|chat| {
                chat.messages.extend(messages);
                chat.updated_at = Utc::now();
                chat.clone()
            }))
    }

    async fn delete_chat(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .chats
            .get(&id)
            .map_or(false, |chat| chat.user_id == user_id);

        if owned {
            tables.chats.remove(&id);
        }

        Ok(owned)
    }
}

#[async_trait]
impl ProgramStore for MemoryStore {
    async fn list_training_splits(&self) -> StoreResult<Vec<TrainingSplit>> {
        let mut splits = self.tables.read().await.training_splits.clone();
        splits.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(splits)
    }

    async fn list_purchases(&self, user_id: Uuid) -> StoreResult<Vec<UserPurchase>> {
        let tables = self.tables.read().await;
        let mut purchases: Vec<_> = tables
            .purchases
            .iter()
            .filter(|purchase| purchase.user_id == user_id)
            .cloned()
            .collect();
        purchases.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(purchases)
    }
}

impl Store for MemoryStore {}
