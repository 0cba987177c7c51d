use async_trait::async_trait;
use nostr_sdk::prelude::*;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::events::FeedEvent;
use crate::filter::SubscriptionFilter;
use crate::Error;

/// Message delivered on an open subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionMessage {
    /// A matching event. Relays may deliver the same event more than once.
    Event(FeedEvent),
    /// The relay has exhausted its stored backlog. Not guaranteed to arrive.
    EndOfStoredEvents,
    /// The relay closed the subscription.
    Closed(String),
}

/// Handle to a live subscription.
///
/// Dropping the handle closes the subscription.
#[derive(Debug)]
pub struct Subscription {
    relay: String,
    messages: mpsc::UnboundedReceiver<SubscriptionMessage>,
    close_tx: Option<oneshot::Sender<()>>,
}

impl Subscription {
    pub fn new(
        relay: impl Into<String>,
        messages: mpsc::UnboundedReceiver<SubscriptionMessage>,
        close_tx: oneshot::Sender<()>,
    ) -> Self {
        Self {
            relay: relay.into(),
            messages,
            close_tx: Some(close_tx),
        }
    }

    /// Next message, or `None` once the relay side has gone away.
    pub async fn next(&mut self) -> Option<SubscriptionMessage> {
        self.messages.recv().await
    }

    /// Close the subscription. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(close_tx) = self.close_tx.take() {
            let _ = close_tx.send(());
            self.messages.close();
            debug!(relay = %self.relay, "Closed subscription");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.close_tx.is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Relay transport used by the fetcher and publisher.
#[async_trait]
pub trait RelayConnector: Send + Sync {
    /// Open one subscription carrying every filter in `filters`.
    async fn subscribe(
        &self,
        relay: &str,
        filters: Vec<SubscriptionFilter>,
    ) -> Result<Subscription, Error>;

    /// Deliver a signed event to a single relay.
    async fn publish(&self, relay: &str, event: &FeedEvent) -> Result<(), Error>;
}

/// [`RelayConnector`] backed by a `nostr-sdk` client per call.
#[derive(Debug, Clone, Default)]
pub struct SdkRelayConnector;

impl SdkRelayConnector {
    pub fn new() -> Self {
        Self
    }

    async fn connect(relay: &str) -> Result<Client, Error> {
        let client = Client::default();
        client
            .add_relay(relay)
            .await
            .map_err(|err| Error::RelayUnavailable {
                relay: relay.to_string(),
                reason: err.to_string(),
            })?;
        client.connect().await;
        Ok(client)
    }
}

#[async_trait]
impl RelayConnector for SdkRelayConnector {
    async fn subscribe(
        &self,
        relay: &str,
        filters: Vec<SubscriptionFilter>,
    ) -> Result<Subscription, Error> {
        let sdk_filters = filters
            .iter()
            .map(SubscriptionFilter::to_sdk_filter)
            .collect::<Result<Vec<_>, _>>()?;

        let client = Self::connect(relay).await?;
        let notifications = client.notifications();

        // All filters travel in a single REQ so the relay counts one subscription.
        let id = SubscriptionId::generate();
        client
            .pool()
            .subscribe_with_id(id.clone(), sdk_filters, SubscribeOptions::default())
            .await
            .map_err(nostr_sdk::client::Error::from)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = oneshot::channel();
        info!(relay = %relay, filters = filters.len(), "Opened relay subscription");

        tokio::spawn(forward_notifications(
            client,
            relay.to_string(),
            id,
            notifications,
            tx,
            close_rx,
        ));

        Ok(Subscription::new(relay, rx, close_tx))
    }

    async fn publish(&self, relay: &str, event: &FeedEvent) -> Result<(), Error> {
        let sdk_event = event.to_sdk_event()?;
        let client = Self::connect(relay).await?;
        let result = client.send_event(&sdk_event).await;
        client.disconnect().await;

        let output = result?;
        if output.success.is_empty() {
            let reason = output
                .failed
                .values()
                .next()
                .cloned()
                .unwrap_or_else(|| "no acknowledgement".to_string());
            return Err(Error::Rejected {
                relay: relay.to_string(),
                reason,
            });
        }
        Ok(())
    }
}

async fn forward_notifications(
    client: Client,
    relay: String,
    id: SubscriptionId,
    mut notifications: tokio::sync::broadcast::Receiver<RelayPoolNotification>,
    tx: mpsc::UnboundedSender<SubscriptionMessage>,
    mut close_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut close_rx => break,
            notification = notifications.recv() => match notification {
                Ok(RelayPoolNotification::Event { subscription_id, event, .. }) => {
                    if subscription_id != id {
                        continue;
                    }
                    let message = SubscriptionMessage::Event(FeedEvent::from_event(&event));
                    if tx.send(message).is_err() {
                        break;
                    }
                }
                Ok(RelayPoolNotification::Message { message, .. }) => match message {
                    RelayMessage::EndOfStoredEvents(subscription_id) if *subscription_id == id => {
                        let _ = tx.send(SubscriptionMessage::EndOfStoredEvents);
                    }
                    RelayMessage::Closed { subscription_id, message } if *subscription_id == id => {
                        let _ = tx.send(SubscriptionMessage::Closed(message.to_string()));
                        break;
                    }
                    _ => {}
                },
                Ok(RelayPoolNotification::Shutdown) => break,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(relay = %relay, skipped, "Relay notifications lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    client.unsubscribe(&id).await;
    client.disconnect().await;
    debug!(relay = %relay, "Relay subscription torn down");
}
