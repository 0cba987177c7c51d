//! Relay-backed feed aggregation for Nostr posts, media records and replies.
//!
//! This crate fetches an author's posts from a relay, follows the reference
//! tags to attached media records and replies, and correlates everything
//! into per-post threads. It also composes and publishes replies.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          NOSTR-FEED                              │
//! │                                                                  │
//! │  ┌─────────────────────┐       ┌─────────────────────┐          │
//! │  │    FeedFetcher      │       │   FeedPublisher     │          │
//! │  │    (read path)      │       │   (write path)      │          │
//! │  │                     │       │                     │          │
//! │  │ - profiles          │       │ - compose reply     │          │
//! │  │ - top-level posts   │       │ - media record      │          │
//! │  │ - media / replies   │       │ - fan-out publish   │          │
//! │  └──────────┬──────────┘       └──────────┬──────────┘          │
//! │             │  correlate::build_threads   │                      │
//! │             ▼                             ▼                      │
//! │                    RelayConnector (nostr-sdk)                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Event Kinds
//!
//! | Kind | Constant | Purpose | Reference |
//! |------|----------|---------|-----------|
//! | 0 | `KIND_METADATA` | Profile metadata (JSON content) | - |
//! | 1 | `KIND_TEXT_NOTE` | Post, or reply when it has an `e` tag | `e=parent` |
//! | 30001 | `KIND_MEDIA_RECORD` | Media attached to a note | `e=note,root` |
//!
//! # Rounds
//!
//! A feed is fetched in dependent rounds: posts, then media and replies for
//! those posts, then media for the replies. Every round races the relay's
//! end-of-stored-events against a deadline and reports a [`RoundStatus`]
//! next to whatever data it gathered, so a slow or broken relay degrades the
//! result instead of hanging or failing it.
//!
//! # Example: Reading
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nostr_feed::{FeedConfig, FeedFetcher, SdkRelayConnector};
//!
//! let config = FeedConfig::new("wss://relay.example");
//! let fetcher = FeedFetcher::new(Arc::new(SdkRelayConnector::new()), config);
//! let snapshot = fetcher.fetch_author_feed("<hex pubkey>", 100).await;
//! for thread in &snapshot.threads {
//!     println!("{} ({} replies)", thread.post.content, thread.replies.len());
//! }
//! ```
//!
//! # Example: Replying
//!
//! ```rust,ignore
//! use nostr_feed::{FeedPublisher, PublisherConfig, ReplyRequest, SdkRelayConnector};
//!
//! let config = PublisherConfig::from_env()?;
//! let publisher = FeedPublisher::new(Arc::new(SdkRelayConnector::new()), config)?;
//! let request = ReplyRequest::new("<parent id>", "Nice!").with_media("https://cdn/a.jpg");
//! let report = publisher.reply(&request).await?;
//! ```

mod collection;
mod config;
pub mod correlate;
pub mod display;
mod error;
mod events;
mod fetch;
mod filter;
pub mod mock;
mod publish;
mod relay;
mod round;
mod signer;

pub use collection::{EventCollection, ProfileMap};
pub use config::{parse_relays, FeedConfig, FetchTimeouts, PublisherConfig};
pub use correlate::{
    build_threads, children_of, classify_media_url, media_fields_of, sort_by_recency,
    FeedThread, MediaFields, MediaItem, MediaRender, ReplyThread,
};
pub use error::Error;
pub use events::{
    event_tag, named_tag, root_tag, tag_value, tag_values, unix_timestamp, FeedEvent, Profile,
    KIND_MEDIA_RECORD, KIND_METADATA, KIND_TEXT_NOTE, MARKER_ROOT, TAG_EVENT, TAG_IDENTIFIER,
    TAG_MEDIA_TYPE, TAG_REFERENCE, TAG_URL, TAG_VIDEO,
};
pub use fetch::{FeedFetcher, FeedSnapshot, RoundReport, ViewerSnapshot};
pub use filter::SubscriptionFilter;
pub use publish::{
    Audience, ComposedReply, FeedPublisher, PublishReport, ReplyReport, ReplyRequest,
};
pub use relay::{RelayConnector, SdkRelayConnector, Subscription, SubscriptionMessage};
pub use round::{drain, ErrorRecord, Flow, RoundOutcome, RoundStatus, Termination};
pub use signer::{EventDraft, EventSigner, KeySigner};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
