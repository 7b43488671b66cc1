use std::time::{SystemTime, UNIX_EPOCH};

use nostr_sdk::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Error;

pub const KIND_ARTICLE_SAVE: u16 = 30000;
pub const KIND_ARTICLE_CONTENT: u16 = 30001;

pub const TAG_URL: &str = "url";
pub const TAG_DESCRIPTION: &str = "description";
pub const TAG_IMAGE: &str = "image";
pub const TAG_AUTHOR: &str = "author";
pub const TAG_TOPIC: &str = "t";
pub const TAG_PRIVACY: &str = "kind";
pub const TAG_OMNIVORE_ID: &str = "omnivore_id";
pub const TAG_RECIPIENT: &str = "p";
pub const TAG_PARENT: &str = "e";

/// A tag is an ordered list of strings whose first element is its key.
///
/// Serialized as a bare JSON array (`["t", "news"]`) so the canonical form
/// matches what relays hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct RecordTag {
    pub name: String,
    pub values: Vec<String>,
}

impl RecordTag {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, vec![value.into()])
    }

    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        let mut parts = Vec::with_capacity(1 + self.values.len());
        parts.push(self.name.clone());
        parts.extend(self.values.iter().cloned());
        parts
    }

    pub fn to_sdk_tag(&self) -> Result<Tag, Error> {
        Tag::parse(self.to_vec()).map_err(|err| Error::InvalidEncoding(err.to_string()))
    }
}

impl From<RecordTag> for Vec<String> {
    fn from(tag: RecordTag) -> Self {
        let mut parts = Vec::with_capacity(1 + tag.values.len());
        parts.push(tag.name);
        parts.extend(tag.values);
        parts
    }
}

impl TryFrom<Vec<String>> for RecordTag {
    type Error = Error;

    fn try_from(parts: Vec<String>) -> Result<Self, Self::Error> {
        let mut iter = parts.into_iter();
        let name = iter
            .next()
            .ok_or_else(|| Error::InvalidEncoding("empty tag".to_string()))?;
        Ok(Self {
            name,
            values: iter.collect(),
        })
    }
}

/// Record fields before an id and signature are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedRecord {
    pub pubkey: String,
    pub created_at: u64,
    pub kind: u16,
    pub tags: Vec<RecordTag>,
    pub content: String,
}

/// A finalized record in NIP-01 wire shape.
///
/// Only produced by [`crate::finalize`] or by decoding JSON that passes
/// verification, so `id` and `sig` always match the other fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireRecord")]
pub struct SignedRecord {
    id: String,
    pubkey: String,
    created_at: u64,
    kind: u16,
    tags: Vec<RecordTag>,
    content: String,
    sig: String,
}

/// Unverified wire form, only used while decoding a [`SignedRecord`].
#[derive(Deserialize)]
pub struct WireRecord {
    id: String,
    pubkey: String,
    created_at: u64,
    kind: u16,
    tags: Vec<RecordTag>,
    content: String,
    sig: String,
}

impl TryFrom<WireRecord> for SignedRecord {
    type Error = Error;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        let record = SignedRecord {
            id: wire.id,
            pubkey: wire.pubkey,
            created_at: wire.created_at,
            kind: wire.kind,
            tags: wire.tags,
            content: wire.content,
            sig: wire.sig,
        };
        crate::signing::verify(&record)?;
        Ok(record)
    }
}

impl SignedRecord {
    pub(crate) fn from_parts(unsigned: UnsignedRecord, id: String, sig: String) -> Self {
        Self {
            id,
            pubkey: unsigned.pubkey,
            created_at: unsigned.created_at,
            kind: unsigned.kind,
            tags: unsigned.tags,
            content: unsigned.content,
            sig,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pubkey(&self) -> &str {
        &self.pubkey
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn kind(&self) -> u16 {
        self.kind
    }

    pub fn tags(&self) -> &[RecordTag] {
        &self.tags
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sig(&self) -> &str {
        &self.sig
    }

    pub fn tag_value(&self, name: &str) -> Option<&str> {
        tag_value(&self.tags, name)
    }

    /// True if a tag with exactly these parts is present.
    pub fn has_tag(&self, parts: &[&str]) -> bool {
        self.tags.iter().any(|tag| {
            let full = tag.to_vec();
            full.len() == parts.len() && full.iter().zip(parts).all(|(a, b)| a.as_str() == *b)
        })
    }

    pub fn count_tags(&self, name: &str) -> usize {
        self.tags.iter().filter(|tag| tag.name == name).count()
    }

    pub fn as_unsigned(&self) -> UnsignedRecord {
        UnsignedRecord {
            pubkey: self.pubkey.clone(),
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags.clone(),
            content: self.content.clone(),
        }
    }

    pub fn as_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_sdk_event(&self) -> Result<Event, Error> {
        let json = self.as_json()?;
        Event::from_json(json).map_err(|err| Error::InvalidEncoding(err.to_string()))
    }
}

pub fn url_tag(url: &str) -> RecordTag {
    RecordTag::single(TAG_URL, url)
}

pub fn topic_tag(topic: &str) -> RecordTag {
    RecordTag::single(TAG_TOPIC, topic)
}

pub fn omnivore_id_tag(id: &str) -> RecordTag {
    RecordTag::single(TAG_OMNIVORE_ID, id)
}

pub fn recipient_tag(pubkey_hex: &str) -> RecordTag {
    RecordTag::single(TAG_RECIPIENT, pubkey_hex)
}

pub fn parent_tag(event_id: &str) -> RecordTag {
    RecordTag::single(TAG_PARENT, event_id)
}

pub fn tag_value<'a>(tags: &'a [RecordTag], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.name == name)
        .and_then(RecordTag::first_value)
}

pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Source of `created_at` values, captured once per record.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        unix_timestamp()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}
