use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collection::{EventCollection, ProfileMap};
use crate::config::FeedConfig;
use crate::correlate::{build_threads, FeedThread};
use crate::events::{
    FeedEvent, Profile, KIND_MEDIA_RECORD, KIND_METADATA, KIND_TEXT_NOTE, TAG_EVENT, TAG_REFERENCE,
};
use crate::filter::SubscriptionFilter;
use crate::relay::RelayConnector;
use crate::round::{drain, ErrorRecord, Flow, RoundOutcome, RoundStatus};

/// Relay-side cap for the top-level post query; replies are filtered locally.
const TOP_LEVEL_QUERY_LIMIT: usize = 1000;

/// Summary of one round for callers that only need the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub round: &'static str,
    pub status: RoundStatus,
    pub events: usize,
    pub errors: Vec<ErrorRecord>,
}

impl RoundReport {
    fn from_outcome(round: &'static str, outcome: &RoundOutcome<Vec<FeedEvent>>) -> Self {
        Self {
            round,
            status: outcome.status,
            events: outcome.data.len(),
            errors: outcome.errors.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub threads: Vec<FeedThread>,
    pub rounds: Vec<RoundReport>,
}

impl FeedSnapshot {
    /// True when every round finished with end-of-stored-events.
    pub fn is_complete(&self) -> bool {
        self.rounds
            .iter()
            .all(|round| round.status == RoundStatus::Complete)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewerSnapshot {
    pub profiles: RoundOutcome<ProfileMap>,
    /// Threads per author, newest post first.
    pub authors: BTreeMap<String, Vec<FeedThread>>,
    pub rounds: Vec<RoundReport>,
}

/// Runs the dependent subscription rounds that make up a feed.
#[derive(Clone)]
pub struct FeedFetcher {
    connector: Arc<dyn RelayConnector>,
    config: FeedConfig,
}

impl FeedFetcher {
    pub fn new(connector: Arc<dyn RelayConnector>, config: FeedConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Kind-0 metadata for `pubkeys` from `relay`.
    ///
    /// Resolves on end-of-stored-events or after the profile timeout. Content
    /// that is not valid profile JSON is skipped and recorded in `errors`.
    pub async fn fetch_profiles(&self, pubkeys: &[String], relay: &str) -> RoundOutcome<ProfileMap> {
        if pubkeys.is_empty() {
            return RoundOutcome::complete(ProfileMap::new());
        }

        let filter = SubscriptionFilter::new()
            .kind(KIND_METADATA)
            .authors(pubkeys.iter().cloned());
        let mut subscription = match self.connector.subscribe(relay, vec![filter]).await {
            Ok(subscription) => subscription,
            Err(err) => {
                warn!(relay = %relay, error = %err, "Profile subscription failed");
                return RoundOutcome::failed(ProfileMap::new(), ErrorRecord::relay(relay, err.to_string()));
            }
        };

        let mut seen = EventCollection::new();
        let mut profiles = ProfileMap::new();
        let mut errors = Vec::new();
        let termination = drain(&mut subscription, self.config.timeouts.profiles, |event| {
            if event.kind != KIND_METADATA || !seen.insert(event.clone()) {
                return Flow::Continue;
            }
            match Profile::from_event(&event) {
                Ok(profile) => {
                    debug!(pubkey = %event.pubkey, "Parsed profile");
                    profiles.insert(event.pubkey.clone(), profile);
                }
                Err(err) => {
                    warn!(pubkey = %event.pubkey, event_id = %event.id, error = %err, "Invalid profile metadata");
                    errors.push(ErrorRecord::event(relay, &event.id, err.to_string()));
                }
            }
            Flow::Continue
        })
        .await;

        if termination.status() == RoundStatus::TimedOut {
            warn!(relay = %relay, profiles = profiles.len(), "Profile fetch timed out");
        }
        errors.extend(termination.error(relay));
        info!(relay = %relay, profiles = profiles.len(), status = ?termination.status(), "Fetched profiles");

        RoundOutcome {
            status: termination.status(),
            data: profiles,
            errors,
        }
    }

    /// Up to `limit` notes by `author` that reference no other event.
    ///
    /// The subscription is closed as soon as `limit` posts have arrived.
    pub async fn fetch_top_level_posts(&self, author: &str, limit: usize) -> RoundOutcome<Vec<FeedEvent>> {
        if limit == 0 {
            return RoundOutcome::complete(Vec::new());
        }

        let filter = SubscriptionFilter::new()
            .kind(KIND_TEXT_NOTE)
            .authors([author])
            .limit(TOP_LEVEL_QUERY_LIMIT);
        self.collect(
            "posts",
            vec![filter],
            self.config.timeouts.posts,
            Some(limit),
            |event| event.kind == KIND_TEXT_NOTE && !event.is_reply(),
        )
        .await
    }

    /// Media records attached to any of `parent_ids`, one filter per parent.
    pub async fn fetch_media_notes_for_events(&self, parent_ids: &[String]) -> RoundOutcome<Vec<FeedEvent>> {
        if parent_ids.is_empty() {
            return RoundOutcome::complete(Vec::new());
        }

        let filters = parent_ids
            .iter()
            .map(|id| {
                SubscriptionFilter::new()
                    .kind(KIND_MEDIA_RECORD)
                    .tag(TAG_EVENT, [id.as_str()])
            })
            .collect();
        self.collect("media", filters, self.config.timeouts.media, None, |event| {
            event.kind == KIND_MEDIA_RECORD
        })
        .await
    }

    /// Text notes replying to any of `parent_ids`.
    pub async fn fetch_replies_to_event_ids(&self, parent_ids: &[String]) -> RoundOutcome<Vec<FeedEvent>> {
        if parent_ids.is_empty() {
            return RoundOutcome::complete(Vec::new());
        }

        let filter = SubscriptionFilter::new()
            .kind(KIND_TEXT_NOTE)
            .tag(TAG_EVENT, parent_ids.iter().cloned());
        self.collect("replies", vec![filter], self.config.timeouts.replies, None, |event| {
            event.kind == KIND_TEXT_NOTE
        })
        .await
    }

    /// Text notes carrying an `r` tag for any of `urls`.
    pub async fn fetch_notes_referencing_urls(&self, urls: &[String]) -> RoundOutcome<Vec<FeedEvent>> {
        if urls.is_empty() {
            return RoundOutcome::complete(Vec::new());
        }

        let filter = SubscriptionFilter::new()
            .kind(KIND_TEXT_NOTE)
            .tag(TAG_REFERENCE, urls.iter().cloned());
        self.collect("referencing", vec![filter], self.config.timeouts.posts, None, |event| {
            event.kind == KIND_TEXT_NOTE
        })
        .await
    }

    /// Posts by `author` with their media, replies, and reply media.
    pub async fn fetch_author_feed(&self, author: &str, limit: usize) -> FeedSnapshot {
        let posts = self.fetch_top_level_posts(author, limit).await;
        self.expand_posts("posts", posts).await
    }

    /// Notes referencing `urls`, expanded the same way as an author feed.
    pub async fn fetch_url_feed(&self, urls: &[String]) -> FeedSnapshot {
        let notes = self.fetch_notes_referencing_urls(urls).await;
        self.expand_posts("referencing", notes).await
    }

    /// Profiles and recent notes for several authors at once.
    pub async fn fetch_profiles_feed(&self, pubkeys: &[String]) -> ViewerSnapshot {
        let profiles = self
            .fetch_profiles(pubkeys, &self.config.primary_relay)
            .await;

        let notes = if pubkeys.is_empty() {
            RoundOutcome::complete(Vec::new())
        } else {
            let filter = SubscriptionFilter::new()
                .kind(KIND_TEXT_NOTE)
                .authors(pubkeys.iter().cloned())
                .limit(self.config.viewer_limit);
            self.collect("notes", vec![filter], self.config.timeouts.posts, None, |event| {
                event.kind == KIND_TEXT_NOTE
            })
            .await
        };

        let snapshot = self.expand_posts("notes", notes).await;
        let mut authors: BTreeMap<String, Vec<FeedThread>> = BTreeMap::new();
        for thread in snapshot.threads {
            authors
                .entry(thread.post.pubkey.clone())
                .or_default()
                .push(thread);
        }
        for threads in authors.values_mut() {
            threads.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
        }

        ViewerSnapshot {
            profiles,
            authors,
            rounds: snapshot.rounds,
        }
    }

    /// Run the media, reply and reply-media rounds for an already fetched
    /// set of posts. Each stage is deduplicated before the next reads it.
    async fn expand_posts(&self, round: &'static str, posts: RoundOutcome<Vec<FeedEvent>>) -> FeedSnapshot {
        let mut rounds = vec![RoundReport::from_outcome(round, &posts)];
        let posts: EventCollection = posts.data.into_iter().collect();
        let post_ids = posts.ids();

        let media_outcome = self.fetch_media_notes_for_events(&post_ids).await;
        rounds.push(RoundReport::from_outcome("media", &media_outcome));
        let media: EventCollection = media_outcome.data.into_iter().collect();

        let replies_outcome = self.fetch_replies_to_event_ids(&post_ids).await;
        rounds.push(RoundReport::from_outcome("replies", &replies_outcome));
        let replies: EventCollection = replies_outcome.data.into_iter().collect();

        let reply_media_outcome = self.fetch_media_notes_for_events(&replies.ids()).await;
        rounds.push(RoundReport::from_outcome("reply_media", &reply_media_outcome));
        let reply_media: EventCollection = reply_media_outcome.data.into_iter().collect();

        let threads = build_threads(
            &posts.into_vec(),
            &media.into_vec(),
            &replies.into_vec(),
            &reply_media.into_vec(),
        );
        info!(threads = threads.len(), "Assembled feed");

        FeedSnapshot { threads, rounds }
    }

    async fn collect<F>(
        &self,
        round: &'static str,
        filters: Vec<SubscriptionFilter>,
        timeout: Duration,
        limit: Option<usize>,
        accept: F,
    ) -> RoundOutcome<Vec<FeedEvent>>
    where
        F: Fn(&FeedEvent) -> bool,
    {
        let relay = self.config.primary_relay.as_str();
        let mut subscription = match self.connector.subscribe(relay, filters).await {
            Ok(subscription) => subscription,
            Err(err) => {
                warn!(round, relay = %relay, error = %err, "Subscription failed");
                return RoundOutcome::failed(Vec::new(), ErrorRecord::relay(relay, err.to_string()));
            }
        };

        let mut events = EventCollection::new();
        let termination = drain(&mut subscription, timeout, |event| {
            if !accept(&event) {
                return Flow::Continue;
            }
            if !events.insert(event) {
                debug!(round, "Dropped duplicate event");
            }
            match limit {
                Some(limit) if events.len() >= limit => Flow::Stop,
                _ => Flow::Continue,
            }
        })
        .await;

        let status = termination.status();
        if status != RoundStatus::Complete {
            warn!(round, relay = %relay, events = events.len(), status = ?status, "Round ended early");
        } else {
            info!(round, relay = %relay, events = events.len(), "Round complete");
        }

        RoundOutcome {
            status,
            data: events.into_vec(),
            errors: termination.error(relay).into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchTimeouts;
    use crate::mock::{event, MockRelayConnector};
    use crate::relay::SubscriptionMessage;

    const RELAY: &str = "wss://primary.test";

    fn fetcher(mock: &MockRelayConnector) -> FeedFetcher {
        FeedFetcher::new(Arc::new(mock.clone()), FeedConfig::new(RELAY))
    }

    fn wants(kind: u16) -> impl Fn(&[SubscriptionFilter]) -> bool + Send + Sync + 'static {
        move |filters: &[SubscriptionFilter]| filters.iter().all(|filter| filter.has_kind(kind))
    }

    #[tokio::test]
    async fn test_empty_inputs_short_circuit() {
        let mock = MockRelayConnector::new();
        let fetcher = fetcher(&mock);

        let media = fetcher.fetch_media_notes_for_events(&[]).await;
        let replies = fetcher.fetch_replies_to_event_ids(&[]).await;
        let urls = fetcher.fetch_notes_referencing_urls(&[]).await;
        let profiles = fetcher.fetch_profiles(&[], RELAY).await;

        assert!(media.data.is_empty() && media.is_complete());
        assert!(replies.data.is_empty() && replies.is_complete());
        assert!(urls.data.is_empty());
        assert!(profiles.data.is_empty());
        assert!(mock.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn test_top_level_posts_stop_at_limit() {
        let mock = MockRelayConnector::new();
        mock.respond(
            wants(KIND_TEXT_NOTE),
            vec![
                event("p1", 1, "alice", 1, &[], "one"),
                event("r1", 1, "alice", 2, &[&["e", "x"]], "reply"),
                event("p2", 1, "alice", 3, &[], "two"),
                event("p2", 1, "alice", 3, &[], "two"),
                event("r2", 1, "alice", 4, &[&["e", "y"]], "reply"),
                event("p3", 1, "alice", 5, &[], "three"),
                event("p4", 1, "alice", 6, &[], "four"),
                event("p5", 1, "alice", 7, &[], "five"),
            ],
        );
        let fetcher = fetcher(&mock);

        let outcome = fetcher.fetch_top_level_posts("alice", 3).await;

        let ids: Vec<&str> = outcome.data.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
        assert!(outcome.data.iter().all(|event| !event.is_reply()));
        assert_eq!(outcome.status, RoundStatus::Complete);
        assert!(mock.is_closed(0));

        let filter = &mock.subscriptions()[0].filters[0];
        assert_eq!(filter.authors, Some(vec!["alice".to_string()]));
        assert_eq!(filter.limit, Some(TOP_LEVEL_QUERY_LIMIT));
    }

    #[tokio::test]
    async fn test_top_level_posts_resolve_on_eose_below_limit() {
        let mock = MockRelayConnector::new();
        mock.respond(
            wants(KIND_TEXT_NOTE),
            vec![event("p1", 1, "alice", 1, &[], "one")],
        );
        let outcome = fetcher(&mock).fetch_top_level_posts("alice", 100).await;
        assert_eq!(outcome.data.len(), 1);
        assert!(outcome.is_complete());
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn test_media_uses_one_filter_per_parent() {
        let mock = MockRelayConnector::new();
        mock.respond(
            wants(KIND_MEDIA_RECORD),
            vec![
                event("m1", KIND_MEDIA_RECORD, "alice", 1, &[&["e", "p1"]], ""),
                event("m1", KIND_MEDIA_RECORD, "alice", 1, &[&["e", "p1"]], ""),
                event("m2", KIND_MEDIA_RECORD, "alice", 2, &[&["e", "p2"]], ""),
            ],
        );
        let fetcher = fetcher(&mock);

        let outcome = fetcher
            .fetch_media_notes_for_events(&["p1".to_string(), "p2".to_string()])
            .await;

        assert_eq!(outcome.data.len(), 2);
        let recorded = mock.subscriptions();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].filters.len(), 2);
        assert_eq!(recorded[0].filters[1].tag_values("e"), ["p2".to_string()]);
    }

    #[tokio::test]
    async fn test_replies_use_single_filter() {
        let mock = MockRelayConnector::new();
        mock.respond(
            wants(KIND_TEXT_NOTE),
            vec![event("r1", 1, "bob", 5, &[&["e", "p1"]], "hi")],
        );
        let fetcher = fetcher(&mock);

        let outcome = fetcher
            .fetch_replies_to_event_ids(&["p1".to_string(), "p2".to_string()])
            .await;

        assert_eq!(outcome.data.len(), 1);
        let filters = &mock.subscriptions()[0].filters;
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].tag_values("e").len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_profile_is_skipped() {
        let mock = MockRelayConnector::new();
        mock.respond(
            wants(KIND_METADATA),
            vec![
                event("k1", 0, "alice", 1, &[], "{not json"),
                event("k2", 0, "bob", 2, &[], r#"{"name":"bob"}"#),
            ],
        );
        let fetcher = fetcher(&mock);

        let outcome = fetcher
            .fetch_profiles(&["alice".to_string(), "bob".to_string()], RELAY)
            .await;

        assert!(outcome.is_complete());
        assert!(!outcome.data.contains_key("alice"));
        assert_eq!(outcome.data["bob"].name.as_deref(), Some("bob"));
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].event_id.as_deref(), Some("k1"));
    }

    #[tokio::test]
    async fn test_profile_with_odd_field_types_is_kept() {
        let mock = MockRelayConnector::new();
        mock.respond(
            wants(KIND_METADATA),
            vec![event("k1", 0, "alice", 1, &[], r#"{"name":"alice","website":42}"#)],
        );

        let outcome = fetcher(&mock)
            .fetch_profiles(&["alice".to_string()], RELAY)
            .await;
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.data["alice"].name.as_deref(), Some("alice"));
        assert!(outcome.data["alice"].website.is_none());
    }

    #[tokio::test]
    async fn test_later_profile_wins() {
        let mock = MockRelayConnector::new();
        mock.respond(
            wants(KIND_METADATA),
            vec![
                event("k1", 0, "alice", 1, &[], r#"{"name":"old"}"#),
                event("k2", 0, "alice", 2, &[], r#"{"name":"new"}"#),
            ],
        );

        let outcome = fetcher(&mock)
            .fetch_profiles(&["alice".to_string()], RELAY)
            .await;
        assert_eq!(outcome.data.len(), 1);
        assert_eq!(outcome.data["alice"].name.as_deref(), Some("new"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_profiles_time_out_without_eose() {
        let mock = MockRelayConnector::new();
        mock.respond_without_eose(
            wants(KIND_METADATA),
            vec![event("k1", 0, "alice", 1, &[], r#"{"name":"alice"}"#)],
        );
        let fetcher = fetcher(&mock);

        let started = tokio::time::Instant::now();
        let outcome = fetcher.fetch_profiles(&["alice".to_string()], RELAY).await;

        assert_eq!(outcome.status, RoundStatus::TimedOut);
        assert_eq!(outcome.data["alice"].name.as_deref(), Some("alice"));
        assert!(started.elapsed() <= Duration::from_secs(5) + Duration::from_millis(10));
        assert!(mock.is_closed(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_round_times_out() {
        let mock = MockRelayConnector::new();
        mock.respond_without_eose(|_| true, vec![]);
        let mut config = FeedConfig::new(RELAY);
        config.timeouts = FetchTimeouts::uniform(Duration::from_secs(2));
        let fetcher = FeedFetcher::new(Arc::new(mock.clone()), config);

        let replies = fetcher.fetch_replies_to_event_ids(&["p1".to_string()]).await;
        let media = fetcher.fetch_media_notes_for_events(&["p1".to_string()]).await;
        let posts = fetcher.fetch_top_level_posts("alice", 5).await;

        for outcome in [replies, media, posts] {
            assert_eq!(outcome.status, RoundStatus::TimedOut);
            assert_eq!(outcome.errors.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_unreachable_relay_fails_round() {
        let mock = MockRelayConnector::new();
        mock.set_unreachable(RELAY);
        let fetcher = fetcher(&mock);

        let outcome = fetcher.fetch_replies_to_event_ids(&["p1".to_string()]).await;
        assert_eq!(outcome.status, RoundStatus::Failed);
        assert!(outcome.data.is_empty());
        assert_eq!(outcome.errors[0].relay.as_deref(), Some(RELAY));

        let profiles = fetcher.fetch_profiles(&["alice".to_string()], RELAY).await;
        assert_eq!(profiles.status, RoundStatus::Failed);
    }

    #[tokio::test]
    async fn test_relay_close_is_partial() {
        let mock = MockRelayConnector::new();
        mock.script(
            wants(KIND_TEXT_NOTE),
            vec![
                SubscriptionMessage::Event(event("r1", 1, "bob", 5, &[&["e", "p1"]], "hi")),
                SubscriptionMessage::Closed("error: shutting down".to_string()),
            ],
            false,
        );

        let outcome = fetcher(&mock)
            .fetch_replies_to_event_ids(&["p1".to_string()])
            .await;
        assert_eq!(outcome.status, RoundStatus::Partial);
        assert_eq!(outcome.data.len(), 1);
    }

    #[tokio::test]
    async fn test_author_feed_sequences_rounds() {
        let mock = MockRelayConnector::new();
        mock.respond(
            |filters| filters[0].has_kind(KIND_TEXT_NOTE) && filters[0].authors.is_some(),
            vec![
                event("p1", 1, "alice", 10, &[], "post one"),
                event("p2", 1, "alice", 20, &[], "post two"),
            ],
        )
        .respond(
            |filters| {
                filters[0].has_kind(KIND_MEDIA_RECORD)
                    && filters.iter().any(|f| f.tag_values("e").contains(&"p1".to_string()))
            },
            vec![event(
                "m1",
                KIND_MEDIA_RECORD,
                "alice",
                11,
                &[&["e", "p1", "root"], &["url", "http://x/a.jpg"], &["m", "photo"]],
                "",
            )],
        )
        .respond(
            |filters| filters[0].has_kind(KIND_TEXT_NOTE),
            vec![
                event("r1", 1, "bob", 30, &[&["e", "p1"]], "first"),
                event("r2", 1, "carol", 40, &[&["e", "p1"]], "second"),
            ],
        )
        .respond(
            |filters| filters[0].has_kind(KIND_MEDIA_RECORD),
            vec![event(
                "rm1",
                KIND_MEDIA_RECORD,
                "bob",
                31,
                &[&["e", "r1", "root"], &["url", "http://x/clip.mp4"], &["m", "video"]],
                "",
            )],
        );
        let fetcher = fetcher(&mock);

        let snapshot = fetcher.fetch_author_feed("alice", 10).await;

        assert!(snapshot.is_complete());
        let names: Vec<&str> = snapshot.rounds.iter().map(|round| round.round).collect();
        assert_eq!(names, vec!["posts", "media", "replies", "reply_media"]);
        assert_eq!(snapshot.threads.len(), 2);

        let first = &snapshot.threads[0];
        assert_eq!(first.media.len(), 1);
        assert_eq!(first.replies[0].reply.id, "r2");
        assert_eq!(first.replies[1].media.len(), 1);
        assert!(snapshot.threads[1].replies.is_empty());

        let recorded = mock.subscriptions();
        assert_eq!(recorded.len(), 4);
        assert_eq!(recorded[3].filters.len(), 2);
    }

    #[tokio::test]
    async fn test_author_feed_without_posts_skips_later_rounds() {
        let mock = MockRelayConnector::new();
        let snapshot = fetcher(&mock).fetch_author_feed("alice", 10).await;

        assert!(snapshot.threads.is_empty());
        assert_eq!(mock.subscriptions().len(), 1);
        assert!(snapshot.is_complete());
    }

    #[tokio::test]
    async fn test_profiles_feed_groups_by_author() {
        let mock = MockRelayConnector::new();
        mock.respond(
            wants(KIND_METADATA),
            vec![event("k1", 0, "alice", 1, &[], r#"{"display_name":"Alice"}"#)],
        )
        .respond(
            |filters| filters[0].has_kind(KIND_TEXT_NOTE) && filters[0].authors.is_some(),
            vec![
                event("a1", 1, "alice", 10, &[], "older"),
                event("b1", 1, "bob", 15, &[], "bob"),
                event("a2", 1, "alice", 20, &[], "newer"),
            ],
        );
        let fetcher = fetcher(&mock);

        let viewer = fetcher
            .fetch_profiles_feed(&["alice".to_string(), "bob".to_string()])
            .await;

        assert_eq!(viewer.profiles.data["alice"].label(), Some("Alice"));
        let alice: Vec<&str> = viewer.authors["alice"]
            .iter()
            .map(|thread| thread.post.id.as_str())
            .collect();
        assert_eq!(alice, vec!["a2", "a1"]);
        assert_eq!(viewer.authors["bob"].len(), 1);
        assert_eq!(
            mock.subscriptions()[1].filters[0].limit,
            Some(fetcher.config().viewer_limit)
        );
    }
}
