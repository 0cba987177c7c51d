use std::time::{SystemTime, UNIX_EPOCH};

use nostr_sdk::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Error;

pub const KIND_METADATA: u16 = 0;
pub const KIND_TEXT_NOTE: u16 = 1;
pub const KIND_MEDIA_RECORD: u16 = 30001;

pub const TAG_EVENT: &str = "e";
pub const TAG_URL: &str = "url";
pub const TAG_VIDEO: &str = "video";
pub const TAG_MEDIA_TYPE: &str = "m";
pub const TAG_REFERENCE: &str = "r";
pub const TAG_IDENTIFIER: &str = "d";
pub const MARKER_ROOT: &str = "root";

/// A relay event as received over the wire.
///
/// Field names and layout match the NIP-01 JSON object so the struct can be
/// deserialized straight from relay traffic and converted back for publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub id: String,
    pub pubkey: String,
    pub created_at: u64,
    pub kind: u16,
    pub tags: Vec<Vec<String>>,
    pub content: String,
    pub sig: String,
}

impl FeedEvent {
    pub fn from_event(event: &Event) -> Self {
        let tags = event.tags.iter().map(|tag| tag.clone().to_vec()).collect();

        Self {
            id: event.id.to_hex(),
            pubkey: event.pubkey.to_hex(),
            created_at: event.created_at.as_secs(),
            kind: event.kind.as_u16(),
            tags,
            content: event.content.clone(),
            sig: event.sig.to_string(),
        }
    }

    pub fn to_sdk_event(&self) -> Result<Event, Error> {
        let json = serde_json::to_string(self)?;
        Ok(Event::from_json(json)?)
    }

    pub fn tag_value(&self, name: &str) -> Option<&str> {
        tag_value(&self.tags, name)
    }

    /// True when any `e` tag on this event points at `event_id`.
    pub fn references(&self, event_id: &str) -> bool {
        tag_values(&self.tags, TAG_EVENT).any(|value| value == event_id)
    }

    /// Kind-1 notes carrying an `e` tag are replies rather than top-level posts.
    pub fn is_reply(&self) -> bool {
        self.tags
            .iter()
            .any(|tag| tag.first().map(String::as_str) == Some(TAG_EVENT))
    }
}

/// Profile metadata carried in the content of a kind-0 event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Profile {
    /// Any JSON object is accepted. Attributes that are missing or not
    /// strings are left unset.
    pub fn from_event(event: &FeedEvent) -> Result<Self, Error> {
        let value: serde_json::Value = serde_json::from_str(&event.content)?;
        let fields = value
            .as_object()
            .ok_or_else(|| Error::InvalidProfile("metadata is not a JSON object".to_string()))?;
        let text = |key: &str| fields.get(key).and_then(|value| value.as_str()).map(str::to_string);

        Ok(Self {
            name: text("name"),
            display_name: text("display_name"),
            picture: text("picture"),
            about: text("about"),
            website: text("website"),
        })
    }

    /// Name to show for this profile, preferring `display_name` over `name`.
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|value| !value.is_empty())
            .or_else(|| self.name.as_deref().filter(|value| !value.is_empty()))
    }
}

pub fn event_tag(event_id: &str) -> Vec<String> {
    vec![TAG_EVENT.to_string(), event_id.to_string()]
}

pub fn root_tag(event_id: &str) -> Vec<String> {
    vec![
        TAG_EVENT.to_string(),
        event_id.to_string(),
        MARKER_ROOT.to_string(),
    ]
}

pub fn named_tag(name: &str, value: &str) -> Vec<String> {
    vec![name.to_string(), value.to_string()]
}

pub fn tag_value<'a>(tags: &'a [Vec<String>], name: &str) -> Option<&'a str> {
    tag_values(tags, name).next()
}

pub fn tag_values<'a, 'n>(
    tags: &'a [Vec<String>],
    name: &'n str,
) -> impl Iterator<Item = &'a str> + 'n
where
    'a: 'n,
{
    tags.iter()
        .filter(move |tag| tag.first().map(|value| value == name).unwrap_or(false))
        .filter_map(|tag| tag.get(1).map(|value| value.as_str()))
}

pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
