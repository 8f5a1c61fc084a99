/// Data models for FitCoach
///
/// # Models
///
/// - `user`: external identities and application users
/// - `chat`: AI coaching conversations
/// - `program`: training splits and purchases
///
/// Persistence lives behind the [`crate::store`] traits; these types carry
/// no database handles.

pub mod chat;
pub mod program;
pub mod user;
