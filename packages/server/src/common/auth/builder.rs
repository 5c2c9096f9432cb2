use super::{AdminCapability, AuthError};
use crate::common::entity_ids::MemberId;

/// Entry point for authorization checks
///
/// Usage:
/// ```ignore
/// Actor::new(&actor_id, message.is_admin)
///     .can(AdminCapability::RewardMembers)
///     .check(deps)?;
/// ```
pub struct Actor<'a> {
    actor_id: &'a MemberId,
    is_admin: bool,
}

impl<'a> Actor<'a> {
    /// Create a new actor for authorization checks
    ///
    /// # Arguments
    /// * `actor_id` - The member handle of the actor
    /// * `is_admin` - Admin flag supplied by the transport for this message
    pub fn new(actor_id: &'a MemberId, is_admin: bool) -> Self {
        Self { actor_id, is_admin }
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: AdminCapability) -> CapabilityBuilder<'a> {
        CapabilityBuilder {
            actor_id: self.actor_id,
            is_admin: self.is_admin,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder<'a> {
    actor_id: &'a MemberId,
    is_admin: bool,
    capability: AdminCapability,
}

impl CapabilityBuilder<'_> {
    /// Perform the authorization check
    pub fn check<D>(self, deps: &D) -> Result<(), AuthError>
    where
        D: HasAuthContext + ?Sized,
    {
        check_admin_permission(self.actor_id, self.is_admin, self.capability, deps)
    }
}

/// Trait for dependencies that can perform auth checks
pub trait HasAuthContext: Send + Sync {
    /// Handles treated as admins in every chat, regardless of chat metadata.
    fn admin_identifiers(&self) -> &[MemberId];
}

/// Core permission check function
///
/// The transport's `is_admin` flag is authoritative for the chat the message
/// came from. Configured operator handles are admins everywhere.
fn check_admin_permission<D>(
    actor_id: &MemberId,
    is_admin: bool,
    capability: AdminCapability,
    deps: &D,
) -> Result<(), AuthError>
where
    D: HasAuthContext + ?Sized,
{
    if is_admin || deps.admin_identifiers().contains(actor_id) {
        return Ok(());
    }

    Err(AuthError::AdminRequired(capability))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestDeps {
        admin_identifiers: Vec<MemberId>,
    }

    impl HasAuthContext for TestDeps {
        fn admin_identifiers(&self) -> &[MemberId] {
            &self.admin_identifiers
        }
    }

    #[test]
    fn test_admin_check() {
        let deps = TestDeps {
            admin_identifiers: vec![],
        };

        let actor_id = MemberId::new("ops");
        let result = Actor::new(&actor_id, true) // is_admin = true
            .can(AdminCapability::RewardMembers)
            .check(&deps);

        assert!(result.is_ok());
    }

    #[test]
    fn test_non_admin_rejected() {
        let deps = TestDeps {
            admin_identifiers: vec![],
        };

        let actor_id = MemberId::new("mallory");
        let result = Actor::new(&actor_id, false)
            .can(AdminCapability::CreateProposals)
            .check(&deps);

        assert_eq!(
            result,
            Err(AuthError::AdminRequired(AdminCapability::CreateProposals))
        );
    }

    #[test]
    fn test_configured_operator_is_admin_everywhere() {
        let deps = TestDeps {
            admin_identifiers: vec![MemberId::new("ops")],
        };

        let actor_id = MemberId::new("@ops");
        let result = Actor::new(&actor_id, false)
            .can(AdminCapability::RewardMembers)
            .check(&deps);

        assert!(result.is_ok());
    }
}
