//! Helpers for presenting feed data.

use chrono::{DateTime, Utc};
use nostr_sdk::prelude::*;

use crate::events::Profile;

const UNNAMED: &str = "Unnamed";
const DAY_SECS: i64 = 24 * 60 * 60;

pub fn profile_label(profile: Option<&Profile>) -> &str {
    profile.and_then(Profile::label).unwrap_or(UNNAMED)
}

/// Bech32 `npub` form of a hex pubkey, if it parses.
pub fn npub(pubkey: &str) -> Option<String> {
    PublicKey::parse(pubkey).ok()?.to_bech32().ok()
}

/// `Nm ago` / `Nh ago` within a day of `now`, otherwise a calendar date.
pub fn relative_time(created_at: u64, now: DateTime<Utc>) -> String {
    let created = i64::try_from(created_at).unwrap_or(i64::MAX);
    let elapsed = (now.timestamp() - created).max(0);

    if elapsed < DAY_SECS {
        let minutes = elapsed / 60;
        if minutes < 60 {
            return format!("{minutes}m ago");
        }
        return format!("{}h ago", minutes / 60);
    }

    match DateTime::<Utc>::from_timestamp(created, 0) {
        Some(time) => time.format("%-m/%-d/%Y, %-I:%M %p").to_string(),
        None => created_at.to_string(),
    }
}
