//! Action dispatcher - routes one inbound chat message to the ledger and the
//! disbursement coordinator.
//!
//! Per action: parse → authorize → admit → resolve identity → execute.
//! Admission runs before any store lookup, so a rate-limited action never
//! touches the ledger or the coordinator.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::common::{Actor, AdminCapability, MemberId};
use crate::domains::chat::command::{Command, HELP_TEXT};
use crate::domains::chat::errors::ActionError;
use crate::domains::governance::{cast_vote, create_proposal, tally};
use crate::domains::member::{lookup_address, register_member};
use crate::domains::transfers::disburse;
use crate::kernel::{Admission, ServerDeps, TransferKind, TransferRequest};

/// One message as delivered by the chat transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub actor_id: MemberId,
    #[serde(default)]
    pub chat_id: String,
    /// Whether the transport reports the actor as an admin of this chat
    #[serde(default)]
    pub is_admin: bool,
    pub text: String,
}

impl InboundMessage {
    pub fn new(actor_id: impl Into<MemberId>, text: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            chat_id: String::new(),
            is_admin: false,
            text: text.into(),
        }
    }

    pub fn as_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }
}

#[derive(Clone)]
pub struct ActionDispatcher {
    deps: Arc<ServerDeps>,
}

impl ActionDispatcher {
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self { deps }
    }

    pub fn deps(&self) -> &ServerDeps {
        &self.deps
    }

    /// Handle one message and produce the reply, if any.
    ///
    /// Commands always get a reply. Plain text only gets one when it earned an
    /// auto-reward.
    #[instrument(skip(self, message), fields(actor = %message.actor_id, chat = %message.chat_id))]
    pub async fn handle(&self, message: &InboundMessage) -> Option<String> {
        match Command::parse(&message.text) {
            Some(parsed) => Some(self.handle_command(message, parsed).await),
            None => self.auto_reward(message).await,
        }
    }

    async fn handle_command(
        &self,
        message: &InboundMessage,
        parsed: Result<Command, ActionError>,
    ) -> String {
        match self.run_command(message, parsed).await {
            Ok(reply) => reply,
            Err(e) if e.is_internal() => {
                error!(error = %e, "Command failed");
                e.user_message()
            }
            Err(e) => {
                debug!(error = %e, "Command rejected");
                e.user_message()
            }
        }
    }

    async fn run_command(
        &self,
        message: &InboundMessage,
        parsed: Result<Command, ActionError>,
    ) -> Result<String, ActionError> {
        let command = parsed?;
        let actor = &message.actor_id;

        match &command {
            Command::Reward { .. } => Actor::new(actor, message.is_admin)
                .can(AdminCapability::RewardMembers)
                .check(self.deps.as_ref())?,
            Command::Propose { .. } => Actor::new(actor, message.is_admin)
                .can(AdminCapability::CreateProposals)
                .check(self.deps.as_ref())?,
            _ => {}
        }

        if let Admission::Rejected { retry_after } =
            self.deps.rate_limiter.admit(actor, Instant::now())
        {
            info!(command = command.name(), ?retry_after, "Action rate limited");
            return Err(ActionError::RateLimitExceeded { retry_after });
        }

        let pool = &self.deps.db_pool;
        let symbol = &self.deps.settings.token_symbol;

        match command {
            Command::Register { address } => {
                register_member(actor, &address, &self.deps.settings.address_prefixes, pool)
                    .await?;
                Ok("Address registered!".to_string())
            }
            Command::Tip { recipient, amount } => {
                let tx_id = self
                    .send(TransferKind::Tip, actor, &recipient, amount)
                    .await?;
                Ok(format!(
                    "Tipped {amount} {symbol} to @{recipient}! Tx ID: {tx_id}"
                ))
            }
            Command::Reward { recipient, amount } => {
                let tx_id = self
                    .send(TransferKind::Reward, actor, &recipient, amount)
                    .await?;
                Ok(format!(
                    "Rewarded {amount} {symbol} to @{recipient}! Tx ID: {tx_id}"
                ))
            }
            Command::Propose { description } => {
                let proposal = create_proposal(&description, actor, pool).await?;
                Ok(format!(
                    "Proposal #{} created: {}",
                    proposal.id, proposal.description
                ))
            }
            Command::Vote {
                proposal_id,
                choice,
            } => {
                if lookup_address(actor, pool).await?.is_none() {
                    return Err(ActionError::not_found("Register first: /register <address>"));
                }
                cast_vote(proposal_id, actor, choice, pool).await?;
                Ok(format!("Voted {choice} on proposal #{proposal_id}!"))
            }
            Command::Tally { proposal_id } => {
                let tally = tally(proposal_id, pool).await?;
                Ok(format!(
                    "Proposal #{proposal_id}: {} yes, {} no",
                    tally.yes, tally.no
                ))
            }
            Command::Help => Ok(HELP_TEXT.to_string()),
        }
    }

    /// Resolve the recipient and push the transfer through the coordinator
    async fn send(
        &self,
        kind: TransferKind,
        actor: &MemberId,
        recipient: &MemberId,
        amount: u64,
    ) -> Result<String, ActionError> {
        let recipient_address = lookup_address(recipient, &self.deps.db_pool)
            .await?
            .ok_or_else(|| ActionError::not_found("Receiver not registered."))?;

        let request = TransferRequest {
            kind,
            actor_id: actor.clone(),
            recipient_id: recipient.clone(),
            recipient_address,
            amount,
        };

        disburse(&request, &self.deps)
            .await
            .map(|tx_id| tx_id.to_string())
            .map_err(|failure| ActionError::Settlement {
                action: kind.as_str(),
                failure,
            })
    }

    /// Sentiment-triggered reward for plain text.
    ///
    /// Runs under the same rate limit and coordinator as explicit commands.
    /// There is no one to notify on failure, so failures are logged and the
    /// message gets no reply.
    async fn auto_reward(&self, message: &InboundMessage) -> Option<String> {
        let text = message.text.trim();
        if text.is_empty() {
            return None;
        }
        let actor = &message.actor_id;

        let score = match self.deps.sentiment.classify(text).await {
            Ok(score) => score,
            Err(e) => {
                warn!(error = %e, "Sentiment classification failed");
                return None;
            }
        };
        if score.is_nan() || score <= 0.0 {
            debug!(score, "No auto-reward for non-positive message");
            return None;
        }

        if let Admission::Rejected { retry_after } =
            self.deps.rate_limiter.admit(actor, Instant::now())
        {
            warn!(?retry_after, "Auto-reward rate limited");
            return None;
        }

        let recipient_address = match lookup_address(actor, &self.deps.db_pool).await {
            Ok(Some(address)) => address,
            Ok(None) => {
                debug!("Skipping auto-reward for unregistered member");
                return None;
            }
            Err(e) => {
                error!(error = %e, "Auto-reward address lookup failed");
                return None;
            }
        };

        let amount = self.deps.settings.auto_reward_amount;
        let request = TransferRequest {
            kind: TransferKind::AutoReward,
            actor_id: actor.clone(),
            recipient_id: actor.clone(),
            recipient_address,
            amount,
        };

        match disburse(&request, &self.deps).await {
            Ok(tx_id) => Some(format!(
                "Auto-rewarded {amount} {} to @{actor}! Tx ID: {tx_id}",
                self.deps.settings.token_symbol
            )),
            Err(failure) => {
                error!(error = %failure, score, "Auto-reward failed");
                None
            }
        }
    }
}
