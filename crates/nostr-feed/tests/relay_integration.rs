use std::sync::Arc;
use std::time::Duration;

use nostr_feed::{
    FeedConfig, FeedFetcher, FeedPublisher, FetchTimeouts, MediaRender, PublisherConfig,
    ReplyRequest, RoundStatus, SdkRelayConnector,
};

#[tokio::test]
#[ignore]
async fn publish_reply_and_fetch_thread() {
    let relay = std::env::var("NOSTR_TEST_RELAY").expect("NOSTR_TEST_RELAY missing");
    let secret = std::env::var("NOSTR_TEST_KEY").expect("NOSTR_TEST_KEY missing");

    let connector = Arc::new(SdkRelayConnector::new());
    let mut config = PublisherConfig::new(relay.clone(), secret);
    config.public_relays = vec![relay.clone()];
    config.timeout = Duration::from_secs(10);
    let publisher = FeedPublisher::new(connector.clone(), config).unwrap();
    let author = publisher.public_key();

    let marker = format!("feed_test_{}", nostr_feed::unix_timestamp());
    let post = publisher.compose_public_note(&marker, None).unwrap();
    let report = publisher.publish(&post, &[relay.clone()]).await;
    assert!(report.is_fully_delivered(), "post rejected: {:?}", report.failed);

    let request = ReplyRequest::new(post.id.clone(), "reply").with_media("https://cdn.example/clip.mp4");
    let replied = publisher.reply(&request).await.unwrap();
    assert!(replied.reply.is_fully_delivered());
    assert!(replied.media_record.is_some());

    let mut feed = FeedConfig::new(relay);
    feed.timeouts = FetchTimeouts::uniform(Duration::from_secs(10));
    let fetcher = FeedFetcher::new(connector, feed);
    let snapshot = fetcher.fetch_author_feed(&author, 20).await;

    assert_eq!(snapshot.rounds[0].status, RoundStatus::Complete);
    let thread = snapshot
        .threads
        .iter()
        .find(|thread| thread.post.id == post.id)
        .expect("published post missing from feed");
    assert_eq!(thread.post.content, marker);
    assert_eq!(thread.replies.len(), 1);
    assert_eq!(thread.replies[0].reply.id, replied.reply.event_id);
    assert_eq!(
        thread.replies[0].media[0].render,
        Some(MediaRender::Video("https://cdn.example/clip.mp4".to_string()))
    );
}
