use thiserror::Error;

use super::AdminCapability;

/// Authorization errors for admin-only chat actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Admin access required to {0}")]
    AdminRequired(AdminCapability),
}
