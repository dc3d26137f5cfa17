// Runtime configuration, read from the environment (and `.env` via dotenv).

use crate::core::comments::ModerationConfig;
use crate::core::users::DEFAULT_ADMIN_EMAIL;
use anyhow::Context;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "data/blog.db";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
const DEFAULT_SWEEP_BATCH: usize = 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub admin_email: String,
    pub moderation: ModerationConfig,
    pub sweep_interval: Duration,
    pub sweep_batch: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key -> value source. Unset or blank values
    /// fall back to defaults; values that don't parse are an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let defaults = ModerationConfig::default();
        let spam_keywords = match get("MODERATION_SPAM_KEYWORDS") {
            Some(list) => list
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            None => defaults.spam_keywords,
        };

        let moderation = ModerationConfig {
            trust_threshold: parse_or(
                &get,
                "MODERATION_TRUST_THRESHOLD",
                defaults.trust_threshold,
            )?,
            max_links: parse_or(&get, "MODERATION_MAX_LINKS", defaults.max_links)?,
            min_body_chars: parse_or(&get, "MODERATION_MIN_BODY_CHARS", defaults.min_body_chars)?,
            spam_keywords,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            admin_email: get("ADMIN_EMAIL").unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
            moderation,
            sweep_interval: Duration::from_secs(positive_or(
                &get,
                "REVIEW_SWEEP_INTERVAL_SECS",
                DEFAULT_SWEEP_INTERVAL_SECS,
            )?),
            sweep_batch: positive_or(&get, "REVIEW_SWEEP_BATCH", DEFAULT_SWEEP_BATCH)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

/// Like `parse_or`, but zero is rejected too.
fn positive_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr + Default + PartialEq,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    let value = parse_or(get, key, default)?;
    if value == T::default() {
        anyhow::bail!("Invalid value for {key}: must be greater than 0");
    }
    Ok(value)
}
