use std::fmt;

/// Capabilities reserved for chat admins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCapability {
    /// Send rewards from the shared wallet
    RewardMembers,

    /// Open proposals for the group to vote on
    CreateProposals,
}

impl AdminCapability {
    /// Verb used in replies ("Only admins can reward!")
    pub fn verb(&self) -> &'static str {
        match self {
            AdminCapability::RewardMembers => "reward",
            AdminCapability::CreateProposals => "propose",
        }
    }
}

impl fmt::Display for AdminCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminCapability::RewardMembers => f.write_str("reward members"),
            AdminCapability::CreateProposals => f.write_str("create proposals"),
        }
    }
}
