use std::collections::BTreeMap;

use nostr_sdk::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Subscription filter in NIP-01 shape.
///
/// Tag filters are keyed `"#" + letter` (for example `"#e"`) and match the
/// first value of tags with that letter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<u16>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(flatten)]
    pub tags: BTreeMap<String, Vec<String>>,
}

impl SubscriptionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: u16) -> Self {
        self.kinds.get_or_insert_with(Vec::new).push(kind);
        self
    }

    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors
            .get_or_insert_with(Vec::new)
            .extend(authors.into_iter().map(Into::into));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Match events whose `name` tag has any of `values`. `name` is a single
    /// letter such as `"e"`.
    pub fn tag<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .entry(format!("#{name}"))
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn tag_values(&self, name: &str) -> &[String] {
        self.tags
            .get(&format!("#{name}"))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_kind(&self, kind: u16) -> bool {
        self.kinds
            .as_ref()
            .map(|kinds| kinds.contains(&kind))
            .unwrap_or(false)
    }

    pub fn to_sdk_filter(&self) -> Result<Filter, Error> {
        let mut filter = Filter::new();

        if let Some(kinds) = &self.kinds {
            filter = filter.kinds(kinds.iter().copied().map(Kind::from));
        }

        if let Some(authors) = &self.authors {
            let keys = authors
                .iter()
                .map(|value| PublicKey::parse(value).map_err(Error::from))
                .collect::<Result<Vec<_>, _>>()?;
            filter = filter.authors(keys);
        }

        if let Some(limit) = self.limit {
            filter = filter.limit(limit);
        }

        for (key, values) in &self.tags {
            let letter = parse_tag_key(key)?;
            filter = filter.custom_tags(letter, values.iter().cloned());
        }

        Ok(filter)
    }
}

fn parse_tag_key(key: &str) -> Result<SingleLetterTag, Error> {
    let mut chars = key.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('#'), Some(letter), None) => SingleLetterTag::from_char(letter)
            .map_err(|_| Error::InvalidTagFilter(key.to_string())),
        _ => Err(Error::InvalidTagFilter(key.to_string())),
    }
}
