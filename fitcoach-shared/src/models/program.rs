/// Training program models
///
/// Training splits are the purchasable programs. Purchases are written by
/// the payment integration and only read here.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE training_splits (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL,
///     description TEXT,
///     days_per_week INTEGER NOT NULL,
///     price_cents INTEGER NOT NULL DEFAULT 0,
///     is_premium BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE user_purchases (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     training_split_id UUID NOT NULL REFERENCES training_splits(id),
///     order_id TEXT NOT NULL UNIQUE,
///     status TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchasable training program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSplit {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub days_per_week: i32,
    pub price_cents: i32,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
}

/// A user's purchase of a training split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserPurchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub training_split_id: Uuid,

    /// Order reference from the payment provider
    pub order_id: String,

    /// Provider order status, e.g. "paid" or "refunded"
    pub status: String,

    pub created_at: DateTime<Utc>,
}
