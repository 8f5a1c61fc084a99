/// Access gate
///
/// Evaluates access policies against a projected [`ApplicationUser`] and
/// emits an [`AccessDecision`]. The gate never performs the guarded action;
/// handlers consume the decision.
///
/// # Policies
///
/// | Policy | Allowed when | Denial |
/// |---|---|---|
/// | `AdminOnly` | role is admin | `admin_required` |
/// | `MaintenanceGate` | maintenance off, or role is admin | `maintenance_user_blocked` |
/// | `Ownership { owner_id }` | `owner_id == user.id` | `not_owner` |
///
/// Without any resolved identity, [`maintenance_access`] reports
/// `maintenance_not_authenticated` while maintenance is on.
///
/// Policies are independent; [`evaluate_all`] composes them with logical
/// AND and reports the first denial.
///
/// # Example
///
/// ```no_run
/// use fitcoach_shared::auth::gate::{evaluate_all, GateContext, MaintenanceState, Policy};
/// use fitcoach_shared::models::user::ApplicationUser;
///
/// # fn example(user: &ApplicationUser) -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = GateContext::new(MaintenanceState::new(true));
/// evaluate_all(user, &[Policy::MaintenanceGate, Policy::AdminOnly], &ctx).into_result()?;
/// # Ok(())
/// # }
/// ```

use serde::{Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use crate::models::user::ApplicationUser;

/// Process-wide maintenance flag
///
/// Read once from configuration at startup and never mutated in-process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceState {
    enabled: bool,
}

impl MaintenanceState {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Inputs to policy evaluation other than the user
#[derive(Debug, Clone, Copy, Default)]
pub struct GateContext {
    pub maintenance: MaintenanceState,
}

impl GateContext {
    pub fn new(maintenance: MaintenanceState) -> Self {
        Self { maintenance }
    }
}

/// Access policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Caller must be an admin
    AdminOnly,

    /// Caller must be an admin while maintenance mode is on
    MaintenanceGate,

    /// Caller must own the resource
    Ownership { owner_id: Uuid },
}

/// Why access was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// No policy applied
    Unrestricted,

    /// Caller is an admin
    Admin,

    /// Maintenance mode is off
    MaintenanceOff,

    /// Maintenance mode is on and the caller is an admin
    AdminBypass,

    /// Caller owns the resource
    Owner,
}

impl AllowReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllowReason::Unrestricted => "unrestricted",
            AllowReason::Admin => "admin",
            AllowReason::MaintenanceOff => "maintenance_off",
            AllowReason::AdminBypass => "admin_bypass",
            AllowReason::Owner => "owner",
        }
    }
}

/// Why access was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    /// Caller is not an admin
    #[error("Admin role required")]
    AdminRequired,

    /// Maintenance mode is on and the caller is not an admin
    #[error("Service is under maintenance")]
    MaintenanceUserBlocked,

    /// Maintenance mode is on and no session was resolved
    #[error("Service is under maintenance and no session was found")]
    MaintenanceNotAuthenticated,

    /// Caller does not own the resource
    #[error("Resource not owned by caller")]
    NotOwner,
}

impl Denial {
    /// Machine-readable reason code
    pub fn as_str(&self) -> &'static str {
        match self {
            Denial::AdminRequired => "admin_required",
            Denial::MaintenanceUserBlocked => "maintenance_user_blocked",
            Denial::MaintenanceNotAuthenticated => "maintenance_not_authenticated",
            Denial::NotOwner => "not_owner",
        }
    }

    /// Whether the denial comes from maintenance mode
    pub fn is_maintenance(&self) -> bool {
        matches!(
            self,
            Denial::MaintenanceUserBlocked | Denial::MaintenanceNotAuthenticated
        )
    }
}

/// Result of evaluating one or more policies
///
/// Serializes as `{ "allowed": bool, "reason": "<code>" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow(AllowReason),
    Deny(Denial),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow(_))
    }

    /// Reason code for either outcome
    pub fn reason(&self) -> &'static str {
        match self {
            AccessDecision::Allow(reason) => reason.as_str(),
            AccessDecision::Deny(denial) => denial.as_str(),
        }
    }

    /// Converts into a `Result` so handlers can use `?`
    pub fn into_result(self) -> Result<AllowReason, Denial> {
        match self {
            AccessDecision::Allow(reason) => Ok(reason),
            AccessDecision::Deny(denial) => Err(denial),
        }
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.is_allowed() { "allow" } else { "deny" };
        write!(f, "{} ({})", verdict, self.reason())
    }
}

impl Serialize for AccessDecision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire {
            allowed: bool,
            reason: &'static str,
        }

        Wire {
            allowed: self.is_allowed(),
            reason: self.reason(),
        }
        .serialize(serializer)
    }
}

/// Evaluates a single policy
pub fn evaluate(user: &ApplicationUser, policy: &Policy, ctx: &GateContext) -> AccessDecision {
    match policy {
        Policy::AdminOnly => {
            if user.is_admin() {
                AccessDecision::Allow(AllowReason::Admin)
            } else {
                AccessDecision::Deny(Denial::AdminRequired)
            }
        }
        Policy::MaintenanceGate => maintenance_access(ctx.maintenance, Some(user)),
        Policy::Ownership { owner_id } => {
            if *owner_id == user.id {
                AccessDecision::Allow(AllowReason::Owner)
            } else {
                AccessDecision::Deny(Denial::NotOwner)
            }
        }
    }
}

/// Evaluates policies with logical AND
///
/// Returns the first denial, otherwise the last allow reason
/// (`unrestricted` for an empty set).
pub fn evaluate_all(user: &ApplicationUser, policies: &[Policy], ctx: &GateContext) -> AccessDecision {
    let mut decision = AccessDecision::Allow(AllowReason::Unrestricted);

    for policy in policies {
        decision = evaluate(user, policy, ctx);
        if !decision.is_allowed() {
            tracing::debug!(user_id = %user.id, ?policy, %decision, "Access denied");
            return decision;
        }
    }

    decision
}

/// Maintenance check that also covers callers without a session
pub fn maintenance_access(state: MaintenanceState, user: Option<&ApplicationUser>) -> AccessDecision {
    if !state.is_enabled() {
        return AccessDecision::Allow(AllowReason::MaintenanceOff);
    }

    match user {
        None => AccessDecision::Deny(Denial::MaintenanceNotAuthenticated),
        Some(user) if user.is_admin() => AccessDecision::Allow(AllowReason::AdminBypass),
        Some(_) => AccessDecision::Deny(Denial::MaintenanceUserBlocked),
    }
}
