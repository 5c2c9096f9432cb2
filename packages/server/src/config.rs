use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::common::MemberId;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub hathor_wallet_url: String,
    pub hathor_wallet_id: String,
    pub hathor_seed_key: String,
    pub sentiment_url: Option<String>,
    pub admin_identifiers: Vec<MemberId>,
    pub address_prefixes: Vec<String>,
    pub token_symbol: String,
    pub rate_limit_max_actions: usize,
    pub rate_limit_window: Duration,
    pub auto_reward_amount: u64,
    pub settlement_connect_timeout: Duration,
    pub settlement_request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://tipbot.db?mode=rwc".to_string()),
            port: parse_or("PORT", 8080)?,
            hathor_wallet_url: env::var("HATHOR_WALLET_URL")
                .context("HATHOR_WALLET_URL must be set")?,
            hathor_wallet_id: env::var("HATHOR_WALLET_ID")
                .context("HATHOR_WALLET_ID must be set")?,
            hathor_seed_key: env::var("HATHOR_SEED_KEY")
                .context("HATHOR_SEED_KEY must be set")?,
            sentiment_url: env::var("SENTIMENT_URL").ok().filter(|s| !s.is_empty()),
            admin_identifiers: split_list(&env::var("ADMIN_IDS").unwrap_or_default())
                .into_iter()
                .map(MemberId::new)
                .collect(),
            address_prefixes: split_list(
                &env::var("ADDRESS_PREFIXES").unwrap_or_else(|_| "W,H".to_string()),
            ),
            token_symbol: env::var("TOKEN_SYMBOL").unwrap_or_else(|_| "HTR".to_string()),
            rate_limit_max_actions: parse_or("RATE_LIMIT_MAX_ACTIONS", 5)?,
            rate_limit_window: Duration::from_millis(parse_or("RATE_LIMIT_WINDOW_MS", 1000)?),
            auto_reward_amount: parse_or("AUTO_REWARD_AMOUNT", 5)?,
            settlement_connect_timeout: Duration::from_secs(parse_or(
                "SETTLEMENT_CONNECT_TIMEOUT_SECS",
                30,
            )?),
            settlement_request_timeout: Duration::from_secs(parse_or(
                "SETTLEMENT_REQUEST_TIMEOUT_SECS",
                10,
            )?),
        };

        anyhow::ensure!(
            config.auto_reward_amount > 0,
            "AUTO_REWARD_AMOUNT must be greater than zero"
        );
        anyhow::ensure!(
            config.rate_limit_max_actions > 0,
            "RATE_LIMIT_MAX_ACTIONS must be greater than zero"
        );

        Ok(config)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        Err(_) => Ok(default),
    }
}

/// Comma-separated list, blanks dropped
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
