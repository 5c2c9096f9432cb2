//! Register member action - upserts a payout address for a chat handle

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::common::{LedgerError, MemberId};
use crate::domains::member::models::member::Member;

/// Check an address against the network's prefix convention.
///
/// Returns the trimmed address. The format is otherwise opaque: only
/// emptiness, embedded whitespace, and the leading prefix are checked.
pub fn validate_address<'a>(address: &'a str, prefixes: &[String]) -> Result<&'a str, LedgerError> {
    let address = address.trim();

    if address.is_empty() {
        return Err(LedgerError::InvalidAddress("address is empty".to_string()));
    }

    if address.chars().any(char::is_whitespace) {
        return Err(LedgerError::InvalidAddress(
            "address may not contain whitespace".to_string(),
        ));
    }

    if !prefixes.is_empty() && !prefixes.iter().any(|p| address.starts_with(p.as_str())) {
        return Err(LedgerError::InvalidAddress(format!(
            "address must start with {}",
            prefixes.join(" or ")
        )));
    }

    Ok(address)
}

/// Register (or re-register) a member's payout address.
///
/// Last write wins: a second registration replaces the first, no history kept.
pub async fn register_member(
    member_id: &MemberId,
    address: &str,
    prefixes: &[String],
    pool: &SqlitePool,
) -> Result<Member, LedgerError> {
    if member_id.is_empty() {
        return Err(LedgerError::InvalidAddress(
            "a chat username is required to register".to_string(),
        ));
    }

    let address = validate_address(address, prefixes)?;
    debug!(member = %member_id, "Registering payout address");

    let member = Member::upsert(member_id, address, pool).await?;

    info!(
        member = %member.id,
        updated = member.updated_at != member.created_at,
        "Member registered"
    );
    Ok(member)
}

/// Resolve a member's payout address
pub async fn lookup_address(
    member_id: &MemberId,
    pool: &SqlitePool,
) -> Result<Option<String>, LedgerError> {
    Ok(Member::find_address(member_id, pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> Vec<String> {
        vec!["W".to_string(), "H".to_string()]
    }

    #[test]
    fn accepts_testnet_and_mainnet_prefixes() {
        assert_eq!(validate_address("W123", &prefixes()).unwrap(), "W123");
        assert_eq!(
            validate_address("  HH5As5aLtzFkcbmbXZmE65wSd22GqPWq2T ", &prefixes()).unwrap(),
            "HH5As5aLtzFkcbmbXZmE65wSd22GqPWq2T"
        );
    }

    #[test]
    fn rejects_empty_address() {
        assert!(matches!(
            validate_address("   ", &prefixes()),
            Err(LedgerError::InvalidAddress(_))
        ));
    }

    #[test]
    fn rejects_wrong_prefix() {
        let err = validate_address("0xabc", &prefixes()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid address: address must start with W or H");
    }

    #[test]
    fn rejects_embedded_whitespace() {
        let err = validate_address("W12 34", &prefixes()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid address: address may not contain whitespace");
        assert!(validate_address("W12\t34", &[]).is_err());
    }

    #[test]
    fn address_format_is_otherwise_opaque() {
        assert_eq!(validate_address("W12-x_9.z", &prefixes()).unwrap(), "W12-x_9.z");
        assert!(validate_address("abc123", &[]).is_ok());
    }
}
