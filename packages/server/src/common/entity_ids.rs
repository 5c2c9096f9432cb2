//! Typed ID definitions for ledger entities.
//!
//! Members are keyed by their chat handle rather than a generated id, so
//! `MemberId` wraps a normalized string. Proposal ids are assigned by the
//! database and wrap an `i64`.
//!
//! ```rust
//! use tipbot_core::common::{MemberId, ProposalId};
//!
//! let alice = MemberId::new("@alice");
//! assert_eq!(alice.as_str(), "alice");
//!
//! let proposal: ProposalId = "7".parse().unwrap();
//! assert_eq!(proposal.get(), 7);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::num::ParseIntError;
use std::str::FromStr;

/// Chat handle of a member, without the leading `@`.
///
/// Deserialization normalizes the same way `new` does, so handles arriving
/// from the transport as `@alice` and `alice` are the same member.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(from = "String", into = "String")]
#[sqlx(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Normalize a handle: trims whitespace and strips one leading `@`.
    pub fn new(handle: impl AsRef<str>) -> Self {
        let handle = handle.as_ref().trim();
        Self(handle.strip_prefix('@').unwrap_or(handle).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(handle: &str) -> Self {
        Self::new(handle)
    }
}

impl From<String> for MemberId {
    fn from(handle: String) -> Self {
        Self::new(handle)
    }
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        id.0
    }
}

/// Database-assigned proposal number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ProposalId(i64);

impl ProposalId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProposalId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}
