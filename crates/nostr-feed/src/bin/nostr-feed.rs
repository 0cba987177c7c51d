use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};

use nostr_feed::display::{npub, profile_label, relative_time};
use nostr_feed::{
    FeedConfig, FeedFetcher, FeedThread, FeedPublisher, PublisherConfig, RelayConnector,
    ReplyRequest, SdkRelayConnector,
};

#[derive(Debug, Parser)]
#[command(name = "nostr-feed")]
#[command(about = "Fetch correlated Nostr feeds and publish replies")]
struct Args {
    /// Overrides NOSTR_PRIMARY_RELAY.
    #[arg(long, global = true)]
    relay: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Profiles and recent notes for one or more authors.
    Profiles {
        #[arg(long = "pubkey", required = true)]
        pubkeys: Vec<String>,
    },
    /// Top-level posts by an author with media and replies.
    Feed {
        #[arg(long)]
        author: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Notes that reference external URLs.
    Urls {
        #[arg(long = "url", required = true)]
        urls: Vec<String>,
    },
    /// Reply to a note.
    Reply {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        media_url: Option<String>,
        /// Also post an untagged copy to the public relays.
        #[arg(long)]
        public: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let connector: Arc<dyn RelayConnector> = Arc::new(SdkRelayConnector::new());

    match args.command {
        Command::Reply {
            parent,
            content,
            media_url,
            public,
        } => {
            let mut config = PublisherConfig::from_env()?;
            if let Some(relay) = args.relay {
                config.primary_relay = relay;
            }
            let publisher = FeedPublisher::new(connector, config)?;

            let mut request = ReplyRequest::new(parent, content);
            if let Some(url) = media_url {
                request = request.with_media(url);
            }
            if public {
                request = request.public();
            }

            let report = publisher.reply(&request).await?;
            for failure in report.failures() {
                warn!(relay = ?failure.relay, error = %failure.message, "Relay did not accept event");
            }
            info!(event_id = %report.reply.event_id, "Reply published");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        command => {
            let config = match args.relay {
                Some(relay) => FeedConfig::new(relay),
                None => FeedConfig::from_env()?,
            };
            let fetcher = FeedFetcher::new(connector, config);
            let output = run_fetch(&fetcher, command).await;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

async fn run_fetch(fetcher: &FeedFetcher, command: Command) -> serde_json::Value {
    match command {
        Command::Profiles { pubkeys } => {
            let viewer = fetcher.fetch_profiles_feed(&pubkeys).await;
            let authors: Vec<_> = pubkeys
                .iter()
                .map(|pubkey| {
                    let profile = viewer.profiles.data.get(pubkey);
                    let threads = viewer.authors.get(pubkey).map(Vec::as_slice).unwrap_or(&[]);
                    json!({
                        "pubkey": pubkey,
                        "npub": npub(pubkey),
                        "label": profile_label(profile),
                        "profile": profile,
                        "threads": threads_json(threads),
                    })
                })
                .collect();
            json!({
                "profiles_status": viewer.profiles.status,
                "profile_errors": viewer.profiles.errors,
                "authors": authors,
                "rounds": viewer.rounds,
            })
        }
        Command::Feed { author, limit } => {
            let limit = limit.unwrap_or(fetcher.config().post_limit);
            let snapshot = fetcher.fetch_author_feed(&author, limit).await;
            json!({
                "author": author,
                "threads": threads_json(&snapshot.threads),
                "rounds": snapshot.rounds,
            })
        }
        Command::Urls { urls } => {
            let snapshot = fetcher.fetch_url_feed(&urls).await;
            json!({
                "urls": urls,
                "threads": threads_json(&snapshot.threads),
                "rounds": snapshot.rounds,
            })
        }
        Command::Reply { .. } => serde_json::Value::Null,
    }
}

fn threads_json(threads: &[FeedThread]) -> Vec<serde_json::Value> {
    let now = Utc::now();
    threads
        .iter()
        .map(|thread| {
            let replies: Vec<_> = thread
                .replies
                .iter()
                .map(|reply| {
                    json!({
                        "id": reply.reply.id,
                        "author": npub(&reply.reply.pubkey),
                        "when": relative_time(reply.reply.created_at, now),
                        "content": reply.reply.content,
                        "media": reply.media.iter().filter_map(|item| item.render.as_ref()).collect::<Vec<_>>(),
                    })
                })
                .collect();
            json!({
                "id": thread.post.id,
                "when": relative_time(thread.post.created_at, now),
                "content": thread.post.content,
                "media": thread.media.iter().filter_map(|item| item.render.as_ref()).collect::<Vec<_>>(),
                "replies": replies,
            })
        })
        .collect()
}
