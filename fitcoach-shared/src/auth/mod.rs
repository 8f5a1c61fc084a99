/// Authentication and authorization
///
/// Requests pass through three stages before a handler runs:
///
/// 1. [`session`]: resolve credentials to an [`Identity`] or absence
/// 2. [`projector`]: map the identity onto an [`ApplicationUser`], creating
///    it on first sight
/// 3. [`gate`]: evaluate access policies and emit an allow/deny decision
///
/// [`supabase`] provides the production [`session::AuthProvider`].
///
/// [`Identity`]: crate::models::user::Identity
/// [`ApplicationUser`]: crate::models::user::ApplicationUser

pub mod gate;
pub mod projector;
pub mod session;
pub mod supabase;
