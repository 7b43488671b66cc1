use std::env;
use std::time::Duration;

use nostr_sdk::prelude::*;

use crate::signing::parse_keys;
use crate::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MIN_ACKS: usize = 1;

#[derive(Clone)]
pub struct PublisherConfig {
    pub relays: Vec<String>,
    pub secret_key: String,
    pub min_acks: usize,
    pub timeout: Duration,
}

impl std::fmt::Debug for PublisherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherConfig")
            .field("relays", &self.relays)
            .field("secret_key", &"<redacted>")
            .field("min_acks", &self.min_acks)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PublisherConfig {
    pub fn new(relays: Vec<String>, secret_key: impl Into<String>) -> Self {
        Self {
            relays,
            secret_key: secret_key.into(),
            min_acks: DEFAULT_MIN_ACKS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `NOSTR_RELAYS` and `NOSTR_SECRET_KEY`. Returns `None` when no
    /// relays are configured.
    pub fn from_env() -> Result<Option<Self>, Error> {
        let relays = match env::var("NOSTR_RELAYS") {
            Ok(value) => parse_relays(&value),
            Err(_) => Vec::new(),
        };
        if relays.is_empty() {
            return Ok(None);
        }

        let secret_key =
            env::var("NOSTR_SECRET_KEY").map_err(|_| Error::MissingEnv("NOSTR_SECRET_KEY"))?;

        Ok(Some(Self::new(relays, secret_key)))
    }

    /// Command-line values first, then `NOSTR_RELAYS` / `NOSTR_SECRET_KEY`.
    /// Each setting falls back on its own, so `--key` works with env relays
    /// and vice versa.
    pub fn resolve(relays: Vec<String>, secret_key: Option<String>) -> Result<Self, Error> {
        Self::merge(
            relays,
            secret_key,
            env::var("NOSTR_RELAYS").ok(),
            env::var("NOSTR_SECRET_KEY").ok(),
        )
    }

    fn merge(
        relays: Vec<String>,
        secret_key: Option<String>,
        env_relays: Option<String>,
        env_secret_key: Option<String>,
    ) -> Result<Self, Error> {
        let relays = if relays.is_empty() {
            env_relays.as_deref().map(parse_relays).unwrap_or_default()
        } else {
            relays
        };
        let secret_key = secret_key
            .or(env_secret_key)
            .ok_or(Error::MissingEnv("NOSTR_SECRET_KEY"))?;
        Ok(Self::new(relays, secret_key))
    }

    pub fn keys(&self) -> Result<Keys, Error> {
        parse_keys(&self.secret_key)
    }
}

pub fn parse_relays(value: &str) -> Vec<String> {
    value
        .split(',')
        .flat_map(|chunk| chunk.split_whitespace())
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
