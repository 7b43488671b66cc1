//! NIP-01 canonical form.
//!
//! A record is hashed as the compact JSON array
//! `[0, <pubkey>, <created_at>, <kind>, <tags>, <content>]`. `serde_json`
//! writes integers as plain decimals, keeps tag order and escapes strings the
//! way relays expect, so the bytes are stable across runs and platforms.

use serde_json::json;

use crate::events::{RecordTag, UnsignedRecord};
use crate::Error;

const PUBKEY_HEX_LEN: usize = 64;

pub fn serialize(
    pubkey: &str,
    created_at: u64,
    kind: u16,
    tags: &[RecordTag],
    content: &str,
) -> Result<Vec<u8>, Error> {
    if !is_hex_of_len(pubkey, PUBKEY_HEX_LEN) {
        return Err(Error::InvalidEncoding(format!(
            "author key must be {PUBKEY_HEX_LEN} hex chars, got {pubkey:?}"
        )));
    }

    let value = json!([0, pubkey, created_at, kind, tags, content]);
    serde_json::to_vec(&value).map_err(|err| Error::InvalidEncoding(err.to_string()))
}

pub fn serialize_record(record: &UnsignedRecord) -> Result<Vec<u8>, Error> {
    serialize(
        &record.pubkey,
        record.created_at,
        record.kind,
        &record.tags,
        &record.content,
    )
}

/// Lowercase hex only; relays reject uppercase keys and ids.
pub(crate) fn is_hex_of_len(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
