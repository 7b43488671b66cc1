use nostr_sdk::prelude::*;
use nostr_sdk::secp256k1::Message;
use sha2::{Digest, Sha256};

use crate::canonical::{is_hex_of_len, serialize_record};
use crate::events::{SignedRecord, UnsignedRecord};
use crate::Error;

const ID_HEX_LEN: usize = 64;

/// Lowercase hex SHA-256 of the canonical bytes.
pub fn compute_id(serialized: &[u8]) -> String {
    hex::encode(Sha256::digest(serialized))
}

/// Schnorr signature over the raw 32 id bytes, not over the record content.
pub fn sign_id(id_hex: &str, keys: &Keys) -> Result<String, Error> {
    let bytes = hex::decode(id_hex).map_err(|err| Error::Signing(err.to_string()))?;
    let digest: [u8; 32] = bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| Error::Signing(format!("id is {} bytes, expected 32", bytes.len())))?;
    let message = Message::from_digest(digest);
    let sig = keys.sign_schnorr(&message);
    Ok(hex::encode(sig.serialize()))
}

pub fn parse_keys(secret: &str) -> Result<Keys, Error> {
    Keys::parse(secret).map_err(|err| Error::Signing(err.to_string()))
}

pub fn is_valid_id(id: &str) -> bool {
    is_hex_of_len(id, ID_HEX_LEN)
}

pub fn finalize(unsigned: UnsignedRecord, keys: &Keys) -> Result<SignedRecord, Error> {
    let author = keys.public_key().to_hex();
    if author != unsigned.pubkey {
        return Err(Error::Signing(format!(
            "keys for {author} cannot sign for {}",
            unsigned.pubkey
        )));
    }

    let serialized = serialize_record(&unsigned)?;
    let id = compute_id(&serialized);
    if !is_valid_id(&id) {
        return Err(Error::IdentifierMissing);
    }
    let sig = sign_id(&id, keys)?;
    Ok(SignedRecord::from_parts(unsigned, id, sig))
}

/// Recompute the id from the record fields and check the signature against
/// the author key.
pub fn verify(record: &SignedRecord) -> Result<(), Error> {
    let expected = compute_id(&serialize_record(&record.as_unsigned())?);
    if expected != record.id() {
        return Err(Error::IdentifierMismatch {
            expected,
            actual: record.id().to_string(),
        });
    }
    record
        .to_sdk_event()?
        .verify()
        .map_err(|err| Error::Signing(err.to_string()))
}
