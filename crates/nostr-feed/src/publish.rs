use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::PublisherConfig;
use crate::events::{
    event_tag, named_tag, root_tag, unix_timestamp, FeedEvent, KIND_MEDIA_RECORD,
    KIND_TEXT_NOTE, TAG_IDENTIFIER, TAG_MEDIA_TYPE, TAG_URL,
};
use crate::relay::RelayConnector;
use crate::round::ErrorRecord;
use crate::signer::{EventDraft, EventSigner, KeySigner};
use crate::Error;

const VIDEO_EXTENSION: &str = ".mp4";

/// Where a reply should be visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Audience {
    /// Only the primary relay.
    #[default]
    Primary,
    /// The primary relay plus the public relay set.
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    pub parent_id: String,
    pub content: String,
    pub media_url: Option<String>,
    pub audience: Audience,
}

impl ReplyRequest {
    pub fn new(parent_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            content: content.into(),
            media_url: None,
            audience: Audience::Primary,
        }
    }

    pub fn with_media(mut self, media_url: impl Into<String>) -> Self {
        self.media_url = Some(media_url.into());
        self
    }

    pub fn public(mut self) -> Self {
        self.audience = Audience::Public;
        self
    }
}

/// A reply and, when media was attached, the media record rooted at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedReply {
    pub reply: FeedEvent,
    pub media_record: Option<FeedEvent>,
}

/// Per-relay delivery of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub event_id: String,
    pub delivered: Vec<String>,
    pub failed: Vec<ErrorRecord>,
}

impl PublishReport {
    pub fn is_fully_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_note: Option<PublishReport>,
    pub reply: PublishReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_record: Option<PublishReport>,
}

impl ReplyReport {
    pub fn failures(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.public_note
            .iter()
            .chain(std::iter::once(&self.reply))
            .chain(self.media_record.iter())
            .flat_map(|report| report.failed.iter())
    }
}

#[derive(Clone)]
pub struct FeedPublisher {
    connector: Arc<dyn RelayConnector>,
    signer: Arc<dyn EventSigner>,
    config: PublisherConfig,
}

impl FeedPublisher {
    pub fn new(connector: Arc<dyn RelayConnector>, config: PublisherConfig) -> Result<Self, Error> {
        let signer = Arc::new(KeySigner::new(config.keys()?));
        Ok(Self::with_signer(connector, signer, config))
    }

    pub fn with_signer(
        connector: Arc<dyn RelayConnector>,
        signer: Arc<dyn EventSigner>,
        config: PublisherConfig,
    ) -> Self {
        Self {
            connector,
            signer,
            config,
        }
    }

    pub fn public_key(&self) -> String {
        self.signer.public_key()
    }

    /// Reply note tagged at `parent_id`. A media URL becomes a separate media
    /// record rooted at the reply rather than part of its content.
    pub fn compose_reply(
        &self,
        parent_id: &str,
        content: &str,
        media_url: Option<&str>,
    ) -> Result<ComposedReply, Error> {
        let reply = self.signer.sign(EventDraft {
            kind: KIND_TEXT_NOTE,
            created_at: unix_timestamp(),
            tags: vec![event_tag(parent_id)],
            content: content.to_string(),
        })?;

        let media_record = media_url
            .map(|url| self.compose_media_record(&reply.id, url, content))
            .transpose()?;

        Ok(ComposedReply {
            reply,
            media_record,
        })
    }

    /// Untagged note for the public relays, with any media URL appended to
    /// the text.
    pub fn compose_public_note(&self, content: &str, media_url: Option<&str>) -> Result<FeedEvent, Error> {
        let content = match media_url {
            Some(url) => format!("{content}\n\n{url}"),
            None => content.to_string(),
        };
        self.signer.sign(EventDraft {
            kind: KIND_TEXT_NOTE,
            created_at: unix_timestamp(),
            tags: Vec::new(),
            content,
        })
    }

    pub fn compose_media_record(
        &self,
        root_event_id: &str,
        media_url: &str,
        content: &str,
    ) -> Result<FeedEvent, Error> {
        self.signer.sign(EventDraft {
            kind: KIND_MEDIA_RECORD,
            created_at: unix_timestamp(),
            tags: vec![
                root_tag(root_event_id),
                named_tag(TAG_URL, media_url),
                named_tag(TAG_MEDIA_TYPE, media_type_for(media_url)),
                named_tag(TAG_IDENTIFIER, root_event_id),
            ],
            content: content.to_string(),
        })
    }

    /// Send `event` to each relay independently. A failing relay does not
    /// stop delivery to the rest.
    pub async fn publish(&self, event: &FeedEvent, relays: &[String]) -> PublishReport {
        let mut delivered = Vec::new();
        let mut failed = Vec::new();

        for relay in relays {
            let attempt = tokio::time::timeout(self.config.timeout, self.connector.publish(relay, event))
                .await
                .map_err(|_| Error::Timeout)
                .and_then(|result| result);
            match attempt {
                Ok(()) => delivered.push(relay.clone()),
                Err(err) => {
                    warn!(relay = %relay, event_id = %event.id, error = %err, "Publish failed");
                    failed.push(ErrorRecord::event(relay, &event.id, err.to_string()));
                }
            }
        }

        info!(
            event_id = %event.id,
            kind = event.kind,
            success = delivered.len(),
            failed = failed.len(),
            "Published nostr event"
        );

        PublishReport {
            event_id: event.id.clone(),
            delivered,
            failed,
        }
    }

    /// Publish a reply following the audience policy.
    ///
    /// Public replies also go out as an untagged note to the public relays.
    /// The tagged reply and any media record go to the primary relay. There
    /// is no rollback if a later step fails; the report carries every
    /// per-relay result.
    pub async fn reply(&self, request: &ReplyRequest) -> Result<ReplyReport, Error> {
        let media_url = request.media_url.as_deref().filter(|url| !url.is_empty());
        let primary = std::slice::from_ref(&self.config.primary_relay);

        let public_note = match request.audience {
            Audience::Public => {
                let note = self.compose_public_note(&request.content, media_url)?;
                Some(self.publish(&note, &self.config.public_relays).await)
            }
            Audience::Primary => None,
        };

        let composed = self.compose_reply(&request.parent_id, &request.content, media_url)?;
        let reply = self.publish(&composed.reply, primary).await;

        let media_record = match &composed.media_record {
            Some(record) => Some(self.publish(record, primary).await),
            None => None,
        };

        Ok(ReplyReport {
            public_note,
            reply,
            media_record,
        })
    }
}

fn media_type_for(url: &str) -> &'static str {
    if url.to_ascii_lowercase().ends_with(VIDEO_EXTENSION) {
        "video"
    } else {
        "photo"
    }
}
