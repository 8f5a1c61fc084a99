/// PostgreSQL store
///
/// Implements the storage traits with sqlx against the schema in
/// `migrations/`. Enum-like columns (`role`, `plan`) are stored as TEXT and
/// parsed on read; chat messages are stored as a JSONB array.
///
/// # Example
///
/// ```no_run
/// use fitcoach_shared::db::pool::{create_pool, DatabaseConfig};
/// use fitcoach_shared::store::{PgStore, UserStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let user = store.find_user(Uuid::new_v4()).await?;
/// assert!(user.is_none());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ChatStore, ProgramStore, Store, StoreError, StoreResult, UserStore};
use crate::db::pool;
use crate::models::chat::{Chat, ChatMessage, ChatSummary};
use crate::models::program::{TrainingSplit, UserPurchase};
use crate::models::user::{ApplicationUser, NewApplicationUser};

const USER_COLUMNS: &str =
    "id, email, role, plan, onboarding_completed, created_at, updated_at";

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: Option<String>,
    role: String,
    plan: String,
    onboarding_completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for ApplicationUser {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(ApplicationUser {
            id: row.id,
            email: row.email,
            role: row.role.parse().map_err(StoreError::CorruptRow)?,
            plan: row.plan.parse().map_err(StoreError::CorruptRow)?,
            onboarding_completed: row.onboarding_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChatRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    messages: Json<Vec<ChatMessage>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ChatRow> for Chat {
    fn from(row: ChatRow) -> Self {
        Chat {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            messages: row.messages.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<ApplicationUser>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ApplicationUser::try_from).transpose()
    }

    async fn upsert_user(&self, user: NewApplicationUser) -> StoreResult<ApplicationUser> {
        let inserted = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, role, plan, onboarding_completed)
            VALUES ($1, $2, 'user', 'free', FALSE)
            ON CONFLICT (id) DO NOTHING
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(user.email)
        .fetch_optional(&self.pool)
        .await?;

        // A conflict means the row is committed, so a fresh statement sees it
        let row = match inserted {
            Some(row) => row,
            None => {
                sqlx::query_as::<_, UserRow>(&format!(
                    "SELECT {} FROM users WHERE id = $1",
                    USER_COLUMNS
                ))
                .bind(user.id)
                .fetch_one(&self.pool)
                .await?
            }
        };

        ApplicationUser::try_from(row)
    }

    async fn complete_onboarding(&self, id: Uuid) -> StoreResult<Option<ApplicationUser>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET onboarding_completed = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ApplicationUser::try_from).transpose()
    }

    async fn list_users(&self, limit: i64, offset: i64) -> StoreResult<Vec<ApplicationUser>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {}
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
            USER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ApplicationUser::try_from).collect()
    }
}

#[async_trait]
impl ChatStore for PgStore {
    async fn list_chats(&self, user_id: Uuid) -> StoreResult<Vec<ChatSummary>> {
        let chats = sqlx::query_as::<_, (Uuid, String, DateTime<Utc>, DateTime<Utc>)>(
            r#"
            SELECT id, title, created_at, updated_at
            FROM chats
            WHERE user_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(id, title, created_at, updated_at)| ChatSummary {
            id,
            title,
            created_at,
            updated_at,
        })
        .collect();

        Ok(chats)
    }

    async fn find_chat(&self, id: Uuid, user_id: Uuid) -> StoreResult<Option<Chat>> {
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            SELECT id, user_id, title, messages, created_at, updated_at
            FROM chats
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Chat::from))
    }

    async fn create_chat(
        &self,
        user_id: Uuid,
        title: String,
        messages: Vec<ChatMessage>,
    ) -> StoreResult<Chat> {
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            INSERT INTO chats (user_id, title, messages)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, messages, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(Json(messages))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn append_messages(
        &self,
        id: Uuid,
        user_id: Uuid,
        messages: Vec<ChatMessage>,
    ) -> StoreResult<Option<Chat>> {
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            UPDATE chats
            SET messages = messages || $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, messages, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(Json(messages))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Chat::from))
    }

    async fn delete_chat(&self, id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM chats WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProgramStore for PgStore {
    async fn list_training_splits(&self) -> StoreResult<Vec<TrainingSplit>> {
        let splits = sqlx::query_as::<_, TrainingSplit>(
            r#"
            SELECT id, name, description, days_per_week, price_cents, is_premium, created_at
            FROM training_splits
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(splits)
    }

    async fn list_purchases(&self, user_id: Uuid) -> StoreResult<Vec<UserPurchase>> {
        let purchases = sqlx::query_as::<_, UserPurchase>(
            r#"
            SELECT id, user_id, training_split_id, order_id, status, created_at
            FROM user_purchases
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        pool::health_check(&self.pool).await?;
        Ok(())
    }
}
