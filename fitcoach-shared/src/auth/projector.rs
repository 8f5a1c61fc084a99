/// Identity projection
///
/// Maps an authenticated [`Identity`] onto its [`ApplicationUser`], creating
/// the row on first sight. This is the only place that decides whether a
/// caller is a known user; every policy downstream reads its output.
///
/// Creation relies on the store's atomic upsert, so sequential or
/// concurrent first requests for the same identity leave exactly one row
/// with role `user` and onboarding `false`.

use crate::models::user::{ApplicationUser, Identity, NewApplicationUser};
use crate::store::{StoreResult, UserStore};

/// Returns the application user for `identity`, creating it if absent
///
/// # Errors
///
/// Propagates store failures; the caller maps them to 500.
///
/// # Example
///
/// ```no_run
/// use fitcoach_shared::auth::projector::project;
/// use fitcoach_shared::models::user::Identity;
/// use fitcoach_shared::store::MemoryStore;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let identity = Identity::new(Uuid::new_v4(), None);
/// let user = project(&store, &identity).await?;
/// assert!(!user.onboarding_completed);
/// # Ok(())
/// # }
/// ```
pub async fn project<S>(store: &S, identity: &Identity) -> StoreResult<ApplicationUser>
where
    S: UserStore + ?Sized,
{
    let user = store.upsert_user(NewApplicationUser::from(identity)).await?;

    tracing::debug!(
        user_id = %user.id,
        role = %user.role,
        onboarding_completed = user.onboarding_completed,
        "Identity projected"
    );

    Ok(user)
}
