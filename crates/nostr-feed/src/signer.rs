use nostr_sdk::prelude::*;

use crate::events::FeedEvent;
use crate::Error;

/// Unsigned event fields handed to an [`EventSigner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub kind: u16,
    pub created_at: u64,
    pub tags: Vec<Vec<String>>,
    pub content: String,
}

/// Turns a draft into a signed event with its id and signature filled in.
pub trait EventSigner: Send + Sync {
    fn public_key(&self) -> String;
    fn sign(&self, draft: EventDraft) -> Result<FeedEvent, Error>;
}

/// Signs with a local secp256k1 key.
#[derive(Debug, Clone)]
pub struct KeySigner {
    keys: Keys,
}

impl KeySigner {
    pub fn new(keys: Keys) -> Self {
        Self { keys }
    }
}

impl EventSigner for KeySigner {
    fn public_key(&self) -> String {
        self.keys.public_key().to_hex()
    }

    fn sign(&self, draft: EventDraft) -> Result<FeedEvent, Error> {
        let tags = draft
            .tags
            .into_iter()
            .map(Tag::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let event = EventBuilder::new(Kind::from(draft.kind), draft.content)
            .tags(tags)
            .custom_created_at(Timestamp::from(draft.created_at))
            .sign_with_keys(&self.keys)?;
        Ok(FeedEvent::from_event(&event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_is_deterministic_in_id() {
        let signer = KeySigner::new(Keys::generate());
        let draft = EventDraft {
            kind: 1,
            created_at: 1_700_000_000,
            tags: vec![vec!["e".to_string(), "abc".to_string()]],
            content: "hello".to_string(),
        };

        let first = signer.sign(draft.clone()).unwrap();
        let second = signer.sign(draft).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.pubkey, signer.public_key());
        assert_eq!(first.created_at, 1_700_000_000);
        assert_eq!(first.tags, vec![vec!["e".to_string(), "abc".to_string()]]);
        assert!(first.to_sdk_event().unwrap().verify().is_ok());
    }

    #[test]
    fn test_rejects_empty_tag() {
        let signer = KeySigner::new(Keys::generate());
        let draft = EventDraft {
            kind: 1,
            created_at: 1,
            tags: vec![vec![]],
            content: String::new(),
        };
        assert!(signer.sign(draft).is_err());
    }
}
