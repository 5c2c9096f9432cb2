/// Authorization module for admin-only chat actions
///
/// Provides a fluent API for authorization checks in the dispatcher:
///
/// ```ignore
/// use crate::common::auth::{Actor, AdminCapability};
///
/// Actor::new(&actor_id, message.is_admin)
///     .can(AdminCapability::CreateProposals)
///     .check(deps.as_ref())?;
/// ```
///
/// Admin status is supplied per message by the transport, so the core never
/// queries chat metadata itself.

mod errors;
mod capability;
mod builder;

pub use errors::AuthError;
pub use capability::AdminCapability;
pub use builder::{Actor, CapabilityBuilder, HasAuthContext};
