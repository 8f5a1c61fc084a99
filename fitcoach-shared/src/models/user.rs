/// Application user model
///
/// An `ApplicationUser` is the app-owned record for an externally
/// authenticated subject. Rows are keyed by the auth provider's user ID and
/// are created lazily on first authenticated access, never at signup.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     email TEXT,
///     role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
///     plan TEXT NOT NULL DEFAULT 'free' CHECK (plan IN ('free', 'premium')),
///     onboarding_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Externally authenticated subject
///
/// Produced by the auth provider. Not owned by this system and never
/// persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Auth provider user ID
    pub id: Uuid,

    /// Email address reported by the provider, if any
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: Uuid, email: Option<String>) -> Self {
        Self { id, email }
    }
}

/// Application-level role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user
    User,

    /// Administrator (bypasses maintenance mode, sees admin endpoints)
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("Unknown user role: {}", other)),
        }
    }
}

/// Subscription plan tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Premium,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Premium => "premium",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanTier::Free),
            "premium" => Ok(PlanTier::Premium),
            other => Err(format!("Unknown plan tier: {}", other)),
        }
    }
}

impl Default for PlanTier {
    fn default() -> Self {
        PlanTier::Free
    }
}

/// Persisted application user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationUser {
    /// Same as the auth provider's user ID
    pub id: Uuid,

    /// Email captured at creation time
    pub email: Option<String>,

    /// Application role
    pub role: UserRole,

    /// Plan tier
    pub plan: PlanTier,

    /// Whether the onboarding flow has been completed
    pub onboarding_completed: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ApplicationUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Input for the create-on-absent upsert
///
/// Role, plan and onboarding always start at their defaults; an existing row
/// is never modified by an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplicationUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl From<&Identity> for NewApplicationUser {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email.clone(),
        }
    }
}
