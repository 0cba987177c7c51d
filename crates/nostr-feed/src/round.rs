//! Per-round results and the completion/timeout race shared by every fetch.

use std::time::Duration;

use serde::Serialize;

use crate::events::FeedEvent;
use crate::relay::{Subscription, SubscriptionMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// The relay signalled end-of-stored-events, or the round had what it needed.
    Complete,
    /// The stream ended early; `data` holds what arrived before it did.
    Partial,
    /// The deadline passed before end-of-stored-events.
    TimedOut,
    /// No subscription could be opened.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub message: String,
}

impl ErrorRecord {
    pub fn relay(relay: &str, message: impl Into<String>) -> Self {
        Self {
            relay: Some(relay.to_string()),
            event_id: None,
            message: message.into(),
        }
    }

    pub fn event(relay: &str, event_id: &str, message: impl Into<String>) -> Self {
        Self {
            relay: Some(relay.to_string()),
            event_id: Some(event_id.to_string()),
            message: message.into(),
        }
    }
}

/// Data gathered by one subscription round together with how the round ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundOutcome<T> {
    pub status: RoundStatus,
    pub data: T,
    pub errors: Vec<ErrorRecord>,
}

impl<T> RoundOutcome<T> {
    pub fn complete(data: T) -> Self {
        Self {
            status: RoundStatus::Complete,
            data,
            errors: Vec::new(),
        }
    }

    pub fn failed(data: T, error: ErrorRecord) -> Self {
        Self {
            status: RoundStatus::Failed,
            data,
            errors: vec![error],
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == RoundStatus::Complete
    }
}

/// Whether the drain loop should keep reading after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    EndOfStoredEvents,
    Stopped,
    TimedOut,
    Closed(String),
    Disconnected,
}

impl Termination {
    pub fn status(&self) -> RoundStatus {
        match self {
            Termination::EndOfStoredEvents | Termination::Stopped => RoundStatus::Complete,
            Termination::TimedOut => RoundStatus::TimedOut,
            Termination::Closed(_) | Termination::Disconnected => RoundStatus::Partial,
        }
    }

    pub fn error(&self, relay: &str) -> Option<ErrorRecord> {
        match self {
            Termination::EndOfStoredEvents | Termination::Stopped => None,
            Termination::TimedOut => Some(ErrorRecord::relay(
                relay,
                "timed out waiting for end of stored events",
            )),
            Termination::Closed(reason) => Some(ErrorRecord::relay(
                relay,
                format!("subscription closed by relay: {reason}"),
            )),
            Termination::Disconnected => Some(ErrorRecord::relay(
                relay,
                "relay stream ended before end of stored events",
            )),
        }
    }
}

/// Feed subscription messages to `on_event` until end-of-stored-events,
/// `Flow::Stop`, the stream ending, or `timeout` elapsing, whichever comes
/// first. The subscription is closed before returning.
pub async fn drain<F>(subscription: &mut Subscription, timeout: Duration, mut on_event: F) -> Termination
where
    F: FnMut(FeedEvent) -> Flow,
{
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    let termination = loop {
        tokio::select! {
            biased;
            message = subscription.next() => match message {
                Some(SubscriptionMessage::Event(event)) => {
                    if on_event(event) == Flow::Stop {
                        break Termination::Stopped;
                    }
                }
                Some(SubscriptionMessage::EndOfStoredEvents) => break Termination::EndOfStoredEvents,
                Some(SubscriptionMessage::Closed(reason)) => break Termination::Closed(reason),
                None => break Termination::Disconnected,
            },
            _ = &mut deadline => break Termination::TimedOut,
        }
    };

    subscription.close();
    termination
}
