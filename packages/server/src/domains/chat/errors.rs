use std::time::Duration;

use thiserror::Error;

use crate::common::{AuthError, LedgerError};
use crate::kernel::SettlementFailure;

/// Why a chat action did not complete. Every variant is recoverable; the
/// dispatcher turns it into a reply and moves on.
#[derive(Error, Debug)]
pub enum ActionError {
    /// Malformed or missing input. The message is the reply.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Authorization(#[from] AuthError),

    /// Unknown member or proposal. The message is the reply.
    #[error("{0}")]
    NotFound(String),

    #[error("Error sending {action}: {failure}")]
    Settlement {
        action: &'static str,
        failure: SettlementFailure,
    },

    #[error("Rate limit exceeded, retry in {retry_after:?}")]
    RateLimitExceeded { retry_after: Duration },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ActionError {
    pub fn validation(message: impl Into<String>) -> Self {
        ActionError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ActionError::NotFound(message.into())
    }

    /// Text sent back to the chat
    pub fn user_message(&self) -> String {
        match self {
            ActionError::Validation(message) | ActionError::NotFound(message) => message.clone(),
            ActionError::Authorization(AuthError::AdminRequired(capability)) => {
                format!("Only admins can {}!", capability.verb())
            }
            ActionError::Settlement { .. } => self.to_string(),
            ActionError::RateLimitExceeded { .. } => {
                "Slow down! Try again in a moment.".to_string()
            }
            ActionError::Ledger(LedgerError::EmptyDescription) => {
                "Usage: /propose <description>".to_string()
            }
            ActionError::Ledger(LedgerError::Database(_)) => {
                "Something went wrong, please try again.".to_string()
            }
            ActionError::Ledger(e) => e.to_string(),
        }
    }

    /// Infrastructure failures, as opposed to the user getting something wrong
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ActionError::Ledger(LedgerError::Database(_)) | ActionError::Settlement { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AdminCapability, ProposalId};

    #[test]
    fn admin_errors_name_the_action() {
        let err = ActionError::from(AuthError::AdminRequired(AdminCapability::RewardMembers));
        assert_eq!(err.user_message(), "Only admins can reward!");

        let err = ActionError::from(AuthError::AdminRequired(AdminCapability::CreateProposals));
        assert_eq!(err.user_message(), "Only admins can propose!");
    }

    #[test]
    fn settlement_failure_reason_is_verbatim() {
        let err = ActionError::Settlement {
            action: "tip",
            failure: SettlementFailure::Rejected("Insufficient funds".to_string()),
        };
        assert_eq!(err.user_message(), "Error sending tip: Insufficient funds");
        assert!(err.is_internal());
    }

    #[test]
    fn ledger_errors_become_replies() {
        let err = ActionError::from(LedgerError::UnknownProposal(ProposalId::new(9)));
        assert_eq!(err.user_message(), "Proposal #9 not found");
        assert!(!err.is_internal());

        let err = ActionError::from(LedgerError::from(sqlx::Error::RowNotFound));
        assert_eq!(err.user_message(), "Something went wrong, please try again.");
    }
}
