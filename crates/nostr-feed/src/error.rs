use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("nostr client error: {0}")]
    NostrClient(#[from] nostr_sdk::client::Error),
    #[error("nostr key error: {0}")]
    NostrKey(#[from] nostr_sdk::nostr::key::Error),
    #[error("nostr tag error: {0}")]
    NostrTag(#[from] nostr_sdk::nostr::event::tag::Error),
    #[error("nostr event error: {0}")]
    NostrEvent(#[from] nostr_sdk::nostr::event::Error),
    #[error("nostr event builder error: {0}")]
    NostrBuilder(#[from] nostr_sdk::nostr::event::builder::Error),
    #[error("serde json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing env var: {0}")]
    MissingEnv(&'static str),
    #[error("invalid profile metadata: {0}")]
    InvalidProfile(String),
    #[error("invalid tag filter key: {0}")]
    InvalidTagFilter(String),
    #[error("relay {relay} unavailable: {reason}")]
    RelayUnavailable { relay: String, reason: String },
    #[error("relay {relay} rejected event: {reason}")]
    Rejected { relay: String, reason: String },
    #[error("operation timed out")]
    Timeout,
}
