//! Slash-command parsing.
//!
//! Parsing only checks shape: argument counts, amounts, vote choices. Whether
//! a member or proposal exists is left to the dispatcher.

use crate::common::{MemberId, ProposalId};
use crate::domains::chat::errors::ActionError;
use crate::domains::governance::VoteChoice;

pub const HELP_TEXT: &str = "Welcome! Commands:\n\
/register <address>\n\
/tip @username <amount>\n\
/reward @username <amount> (admins)\n\
/propose <description> (admins)\n\
/vote <proposal_id> <yes/no>\n\
/tally <proposal_id>";

const REGISTER_USAGE: &str = "Usage: /register <hathor_address>";
const TIP_USAGE: &str = "Usage: /tip @username <amount>";
const REWARD_USAGE: &str = "Usage: /reward @username <amount>";
const PROPOSE_USAGE: &str = "Usage: /propose <description>";
const VOTE_USAGE: &str = "Usage: /vote <proposal_id> <yes/no>";
const TALLY_USAGE: &str = "Usage: /tally <proposal_id>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register {
        address: String,
    },
    Tip {
        recipient: MemberId,
        amount: u64,
    },
    Reward {
        recipient: MemberId,
        amount: u64,
    },
    Propose {
        description: String,
    },
    Vote {
        proposal_id: ProposalId,
        choice: VoteChoice,
    },
    Tally {
        proposal_id: ProposalId,
    },
    /// `/start`, `/help`, and anything unrecognized
    Help,
}

impl Command {
    /// Parse a chat message.
    ///
    /// Returns `None` for plain text (not a command). A `/command@botname`
    /// suffix is ignored, and command words match case-insensitively.
    pub fn parse(text: &str) -> Option<Result<Command, ActionError>> {
        let text = text.trim();
        let body = text.strip_prefix('/')?;

        let (head, rest) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };
        let name = head.split('@').next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let parsed = match name.as_str() {
            "register" => parse_register(&args),
            "tip" => parse_transfer(&args, TIP_USAGE)
                .map(|(recipient, amount)| Command::Tip { recipient, amount }),
            "reward" => parse_transfer(&args, REWARD_USAGE)
                .map(|(recipient, amount)| Command::Reward { recipient, amount }),
            "propose" => parse_propose(rest),
            "vote" => parse_vote(&args),
            "tally" => parse_tally(&args),
            _ => Ok(Command::Help),
        };
        Some(parsed)
    }

    /// Name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::Tip { .. } => "tip",
            Command::Reward { .. } => "reward",
            Command::Propose { .. } => "propose",
            Command::Vote { .. } => "vote",
            Command::Tally { .. } => "tally",
            Command::Help => "help",
        }
    }
}

/// Largest amount the transfer journal can record
pub const MAX_AMOUNT: u64 = i64::MAX as u64;

/// Strict whole-unit amount: digits only, in `1..=MAX_AMOUNT`
pub fn parse_amount(raw: &str) -> Result<u64, ActionError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ActionError::validation("Invalid amount."));
    }
    match raw.parse::<u64>() {
        Ok(amount) if (1..=MAX_AMOUNT).contains(&amount) => Ok(amount),
        _ => Err(ActionError::validation("Invalid amount.")),
    }
}

fn parse_register(args: &[&str]) -> Result<Command, ActionError> {
    match args.first() {
        Some(address) => Ok(Command::Register {
            address: address.to_string(),
        }),
        None => Err(ActionError::validation(REGISTER_USAGE)),
    }
}

fn parse_transfer(args: &[&str], usage: &str) -> Result<(MemberId, u64), ActionError> {
    let (recipient, amount) = match args {
        [recipient, amount, ..] => (MemberId::new(recipient), amount),
        _ => return Err(ActionError::validation(usage)),
    };
    if recipient.is_empty() {
        return Err(ActionError::validation(usage));
    }
    Ok((recipient, parse_amount(amount)?))
}

fn parse_propose(rest: &str) -> Result<Command, ActionError> {
    if rest.is_empty() {
        return Err(ActionError::validation(PROPOSE_USAGE));
    }
    Ok(Command::Propose {
        description: rest.to_string(),
    })
}

fn parse_vote(args: &[&str]) -> Result<Command, ActionError> {
    let [proposal_id, choice, ..] = args else {
        return Err(ActionError::validation(VOTE_USAGE));
    };
    let proposal_id = proposal_id
        .parse::<ProposalId>()
        .map_err(|_| ActionError::validation(VOTE_USAGE))?;
    let choice = choice
        .parse::<VoteChoice>()
        .map_err(|_| ActionError::validation("Vote must be \"yes\" or \"no\"."))?;
    Ok(Command::Vote {
        proposal_id,
        choice,
    })
}

fn parse_tally(args: &[&str]) -> Result<Command, ActionError> {
    args.first()
        .and_then(|raw| raw.parse::<ProposalId>().ok())
        .map(|proposal_id| Command::Tally { proposal_id })
        .ok_or_else(|| ActionError::validation(TALLY_USAGE))
}
