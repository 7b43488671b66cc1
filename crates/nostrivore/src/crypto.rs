use std::fmt;

use nostr_sdk::nips::nip04;
use nostr_sdk::prelude::*;
use serde::{Deserialize, Serialize};

use crate::events::{recipient_tag, RecordTag, SignedRecord, TAG_RECIPIENT};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Private,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Private => "private",
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Privacy::Private)
    }

    pub fn from_flag(is_private: bool) -> Self {
        if is_private {
            Privacy::Private
        } else {
            Privacy::Public
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cipher used for private record content.
pub trait ContentCipher: Send + Sync {
    fn encrypt(&self, keys: &Keys, recipient: &PublicKey, plaintext: &str)
        -> Result<String, Error>;
    fn decrypt(&self, keys: &Keys, sender: &PublicKey, ciphertext: &str) -> Result<String, Error>;
}

/// NIP-04 (`base64(ciphertext)?iv=base64(iv)`) shared-secret encryption.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nip04Cipher;

impl ContentCipher for Nip04Cipher {
    fn encrypt(
        &self,
        keys: &Keys,
        recipient: &PublicKey,
        plaintext: &str,
    ) -> Result<String, Error> {
        nip04::encrypt(keys.secret_key(), recipient, plaintext)
            .map_err(|err| Error::Encryption(err.to_string()))
    }

    fn decrypt(&self, keys: &Keys, sender: &PublicKey, ciphertext: &str) -> Result<String, Error> {
        nip04::decrypt(keys.secret_key(), sender, ciphertext)
            .map_err(|err| Error::Encryption(err.to_string()))
    }
}

/// Public content passes through untouched. Private content is encrypted to
/// `recipient` and a `p` tag naming it is returned for the caller to append.
pub fn apply_privacy(
    content: &str,
    privacy: Privacy,
    keys: &Keys,
    recipient: &PublicKey,
    cipher: &dyn ContentCipher,
) -> Result<(String, Vec<RecordTag>), Error> {
    match privacy {
        Privacy::Public => Ok((content.to_string(), Vec::new())),
        Privacy::Private => {
            let ciphertext = cipher.encrypt(keys, recipient, content)?;
            Ok((ciphertext, vec![recipient_tag(&recipient.to_hex())]))
        }
    }
}

/// Recover the plaintext of a record. Records without a `p` tag are public
/// and returned as-is.
pub fn decrypt_content(
    record: &SignedRecord,
    keys: &Keys,
    cipher: &dyn ContentCipher,
) -> Result<String, Error> {
    if record.tag_value(TAG_RECIPIENT).is_none() {
        return Ok(record.content().to_string());
    }
    let author = PublicKey::from_hex(record.pubkey())
        .map_err(|err| Error::Encryption(err.to_string()))?;
    cipher.decrypt(keys, &author, record.content())
}
