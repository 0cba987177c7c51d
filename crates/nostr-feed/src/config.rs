use std::env;
use std::time::Duration;

use nostr_sdk::prelude::*;

use crate::Error;

const DEFAULT_PUBLIC_RELAYS: &str = "wss://nos.lol";
const DEFAULT_PROFILE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_ROUND_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POST_LIMIT: usize = 100;
const DEFAULT_VIEWER_LIMIT: usize = 10;

/// Deadline for each subscription round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTimeouts {
    pub profiles: Duration,
    pub posts: Duration,
    pub media: Duration,
    pub replies: Duration,
}

impl FetchTimeouts {
    /// Same deadline for every round.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            profiles: timeout,
            posts: timeout,
            media: timeout,
            replies: timeout,
        }
    }
}

impl Default for FetchTimeouts {
    fn default() -> Self {
        let round = Duration::from_secs(DEFAULT_ROUND_TIMEOUT_SECS);
        Self {
            profiles: Duration::from_secs(DEFAULT_PROFILE_TIMEOUT_SECS),
            posts: round,
            media: round,
            replies: round,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Relay every read round goes to.
    pub primary_relay: String,
    pub timeouts: FetchTimeouts,
    /// Top-level posts kept per author feed.
    pub post_limit: usize,
    /// Relay-side limit for the multi-author viewer.
    pub viewer_limit: usize,
}

impl FeedConfig {
    pub fn new(primary_relay: impl Into<String>) -> Self {
        Self {
            primary_relay: primary_relay.into(),
            timeouts: FetchTimeouts::default(),
            post_limit: DEFAULT_POST_LIMIT,
            viewer_limit: DEFAULT_VIEWER_LIMIT,
        }
    }

    pub fn from_env() -> Result<Self, Error> {
        let primary_relay = env::var("NOSTR_PRIMARY_RELAY")
            .map_err(|_| Error::MissingEnv("NOSTR_PRIMARY_RELAY"))?;
        Ok(Self::new(primary_relay))
    }
}

#[derive(Debug, Clone)]
pub struct PublisherConfig {
    pub primary_relay: String,
    pub public_relays: Vec<String>,
    pub secret_key: String,
    /// Upper bound on each per-relay publish attempt.
    pub timeout: Duration,
}

impl PublisherConfig {
    pub fn new(primary_relay: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            primary_relay: primary_relay.into(),
            public_relays: parse_relays(DEFAULT_PUBLIC_RELAYS),
            secret_key: secret_key.into(),
            timeout: Duration::from_secs(DEFAULT_PUBLISH_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, Error> {
        let primary_relay = env::var("NOSTR_PRIMARY_RELAY")
            .map_err(|_| Error::MissingEnv("NOSTR_PRIMARY_RELAY"))?;
        let secret_key =
            env::var("NOSTR_SECRET_KEY").map_err(|_| Error::MissingEnv("NOSTR_SECRET_KEY"))?;
        let mut config = Self::new(primary_relay, secret_key);
        if let Ok(value) = env::var("NOSTR_PUBLIC_RELAYS") {
            config.public_relays = parse_relays(&value);
        }
        Ok(config)
    }

    pub fn keys(&self) -> Result<Keys, Error> {
        Ok(Keys::parse(&self.secret_key)?)
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
