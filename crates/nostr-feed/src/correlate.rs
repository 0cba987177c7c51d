//! Grouping of fetched events into post → media/reply trees.
//!
//! Everything here is pure and recomputed from the round collections on
//! demand; nothing is cached.

use serde::Serialize;

use crate::events::{FeedEvent, TAG_MEDIA_TYPE, TAG_URL, TAG_VIDEO};

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];
const VIDEO_EXTENSIONS: [&str; 2] = ["mp4", "webm"];

/// Media tags extracted from a media record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "src", rename_all = "snake_case")]
pub enum MediaRender {
    Image(String),
    Video(String),
}

impl MediaFields {
    /// How to show this media, if at all. Unknown media types render nothing.
    pub fn render(&self) -> Option<MediaRender> {
        match self.kind.as_deref() {
            Some("photo") | Some("animated_gif") => self.url.clone().map(MediaRender::Image),
            Some("video") => self
                .video
                .clone()
                .or_else(|| self.url.clone())
                .map(MediaRender::Video),
            _ => None,
        }
    }
}

pub fn media_fields_of(event: &FeedEvent) -> MediaFields {
    MediaFields {
        url: event.tag_value(TAG_URL).map(str::to_string),
        video: event.tag_value(TAG_VIDEO).map(str::to_string),
        kind: event.tag_value(TAG_MEDIA_TYPE).map(str::to_string),
    }
}

/// Render policy keyed on the URL's file extension, used for media attached
/// to replies. A trailing query string is ignored; a fragment is not.
pub fn classify_media_url(url: &str) -> Option<MediaRender> {
    let path = url.split('?').next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let (_, extension) = file.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaRender::Image(url.to_string()))
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaRender::Video(url.to_string()))
    } else {
        None
    }
}

/// Candidates carrying an `e` tag equal to `parent_id`, in input order.
pub fn children_of<'a>(parent_id: &str, candidates: &'a [FeedEvent]) -> Vec<&'a FeedEvent> {
    candidates
        .iter()
        .filter(|event| event.references(parent_id))
        .collect()
}

/// Newest first. Equal timestamps keep their input order.
pub fn sort_by_recency(events: &mut [FeedEvent]) {
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub event: FeedEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<MediaRender>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyThread {
    pub reply: FeedEvent,
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedThread {
    pub post: FeedEvent,
    pub media: Vec<MediaItem>,
    pub replies: Vec<ReplyThread>,
}

/// Assemble one thread per post. Replies are ordered newest first.
///
/// Post media renders by its `m` tag; reply media by URL extension.
pub fn build_threads(
    posts: &[FeedEvent],
    media: &[FeedEvent],
    replies: &[FeedEvent],
    reply_media: &[FeedEvent],
) -> Vec<FeedThread> {
    posts
        .iter()
        .map(|post| {
            let post_media = children_of(&post.id, media)
                .into_iter()
                .map(|event| MediaItem {
                    render: media_fields_of(event).render(),
                    event: event.clone(),
                })
                .collect();

            let mut post_replies: Vec<FeedEvent> =
                children_of(&post.id, replies).into_iter().cloned().collect();
            sort_by_recency(&mut post_replies);

            let reply_threads = post_replies
                .into_iter()
                .map(|reply| {
                    let media = children_of(&reply.id, reply_media)
                        .into_iter()
                        .map(|event| MediaItem {
                            render: media_fields_of(event)
                                .url
                                .as_deref()
                                .and_then(classify_media_url),
                            event: event.clone(),
                        })
                        .collect();
                    ReplyThread { reply, media }
                })
                .collect();

            FeedThread {
                post: post.clone(),
                media: post_media,
                replies: reply_threads,
            }
        })
        .collect()
}
