//! In-memory relay connector for tests and offline demos.
//!
//! Responses are scripted per filter shape. Subscriptions that match no
//! script get an immediate end-of-stored-events.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::events::FeedEvent;
use crate::filter::SubscriptionFilter;
use crate::relay::{RelayConnector, Subscription, SubscriptionMessage};
use crate::Error;

type Matcher = Box<dyn Fn(&[SubscriptionFilter]) -> bool + Send + Sync>;

struct Script {
    matcher: Matcher,
    messages: Vec<SubscriptionMessage>,
    hold_open: bool,
}

/// A subscription the mock has handed out.
#[derive(Debug, Clone)]
pub struct RecordedSubscription {
    pub relay: String,
    pub filters: Vec<SubscriptionFilter>,
}

struct OpenSubscription {
    close_rx: oneshot::Receiver<()>,
    closed: bool,
    // Kept alive so a held-open stream never reports disconnection.
    _sender: Option<mpsc::UnboundedSender<SubscriptionMessage>>,
}

#[derive(Default)]
struct MockState {
    scripts: Vec<Script>,
    subscriptions: Vec<RecordedSubscription>,
    open: Vec<OpenSubscription>,
    published: Vec<(String, FeedEvent)>,
    unreachable: HashSet<String>,
    rejecting: HashSet<String>,
}

#[derive(Clone, Default)]
pub struct MockRelayConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockRelayConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer subscriptions accepted by `matcher` with `events` followed by
    /// end-of-stored-events.
    pub fn respond<M>(&self, matcher: M, events: Vec<FeedEvent>) -> &Self
    where
        M: Fn(&[SubscriptionFilter]) -> bool + Send + Sync + 'static,
    {
        let mut messages: Vec<_> = events.into_iter().map(SubscriptionMessage::Event).collect();
        messages.push(SubscriptionMessage::EndOfStoredEvents);
        self.script(matcher, messages, false)
    }

    /// Answer with `events` and then leave the stream open forever.
    pub fn respond_without_eose<M>(&self, matcher: M, events: Vec<FeedEvent>) -> &Self
    where
        M: Fn(&[SubscriptionFilter]) -> bool + Send + Sync + 'static,
    {
        let messages = events.into_iter().map(SubscriptionMessage::Event).collect();
        self.script(matcher, messages, true)
    }

    pub fn script<M>(&self, matcher: M, messages: Vec<SubscriptionMessage>, hold_open: bool) -> &Self
    where
        M: Fn(&[SubscriptionFilter]) -> bool + Send + Sync + 'static,
    {
        self.lock().scripts.push(Script {
            matcher: Box::new(matcher),
            messages,
            hold_open,
        });
        self
    }

    /// Make `subscribe` and `publish` fail for `relay`.
    pub fn set_unreachable(&self, relay: &str) -> &Self {
        self.lock().unreachable.insert(relay.to_string());
        self
    }

    /// Make `publish` to `relay` come back rejected.
    pub fn set_rejecting(&self, relay: &str) -> &Self {
        self.lock().rejecting.insert(relay.to_string());
        self
    }

    pub fn subscriptions(&self) -> Vec<RecordedSubscription> {
        self.lock().subscriptions.clone()
    }

    pub fn published(&self) -> Vec<(String, FeedEvent)> {
        self.lock().published.clone()
    }

    /// Whether the `index`-th subscription has been closed by its holder.
    pub fn is_closed(&self, index: usize) -> bool {
        let mut state = self.lock();
        let Some(open) = state.open.get_mut(index) else {
            return false;
        };
        if !open.closed {
            open.closed = !matches!(
                open.close_rx.try_recv(),
                Err(oneshot::error::TryRecvError::Empty)
            );
        }
        open.closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the state from the others.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RelayConnector for MockRelayConnector {
    async fn subscribe(
        &self,
        relay: &str,
        filters: Vec<SubscriptionFilter>,
    ) -> Result<Subscription, Error> {
        let mut state = self.lock();
        if state.unreachable.contains(relay) {
            return Err(Error::RelayUnavailable {
                relay: relay.to_string(),
                reason: "connection refused".to_string(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = oneshot::channel();

        let script = state.scripts.iter().find(|script| (script.matcher)(&filters));
        let hold_open = match script {
            Some(script) => {
                for message in &script.messages {
                    let _ = tx.send(message.clone());
                }
                script.hold_open
            }
            None => {
                let _ = tx.send(SubscriptionMessage::EndOfStoredEvents);
                false
            }
        };

        state.subscriptions.push(RecordedSubscription {
            relay: relay.to_string(),
            filters,
        });
        state.open.push(OpenSubscription {
            close_rx,
            closed: false,
            _sender: hold_open.then_some(tx),
        });

        Ok(Subscription::new(relay, rx, close_tx))
    }

    async fn publish(&self, relay: &str, event: &FeedEvent) -> Result<(), Error> {
        let mut state = self.lock();
        if state.unreachable.contains(relay) {
            return Err(Error::RelayUnavailable {
                relay: relay.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        if state.rejecting.contains(relay) {
            return Err(Error::Rejected {
                relay: relay.to_string(),
                reason: "blocked: not on allow list".to_string(),
            });
        }
        state.published.push((relay.to_string(), event.clone()));
        Ok(())
    }
}

/// Build an unsigned event for fixtures. `tags` are given as string slices.
pub fn event(
    id: &str,
    kind: u16,
    pubkey: &str,
    created_at: u64,
    tags: &[&[&str]],
    content: &str,
) -> FeedEvent {
    FeedEvent {
        id: id.to_string(),
        pubkey: pubkey.to_string(),
        created_at,
        kind,
        tags: tags
            .iter()
            .map(|tag| tag.iter().map(|value| value.to_string()).collect())
            .collect(),
        content: content.to_string(),
        sig: String::new(),
    }
}
