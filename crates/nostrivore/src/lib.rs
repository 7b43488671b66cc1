//! Publish read-it-later articles to Nostr relays.
//!
//! Every article becomes two signed events: a metadata record with the title
//! and descriptive tags, and a content record carrying the article body that
//! points back at the metadata record through an `e` tag. Private articles
//! are NIP-04 encrypted to the author's own key and tagged with `p`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           NOSTRIVORE                              │
//! │                                                                   │
//! │  ArticleSave / ArticleContent        ArticlePublisher             │
//! │  (tag schema, privacy)               (metadata → content)         │
//! │            │                                 │                    │
//! │            ▼                                 ▼                    │
//! │  apply_privacy → canonical::serialize → signing::finalize         │
//! │                                              │                    │
//! │                                              ▼                    │
//! │                                   Transport (relays / memory)     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Event Kinds
//!
//! | Kind | Constant | Purpose | Link |
//! |------|----------|---------|------|
//! | 30000 | `KIND_ARTICLE_SAVE` | Article metadata | - |
//! | 30001 | `KIND_ARTICLE_CONTENT` | Article body | `e=<metadata id>` |
//!
//! # Example
//!
//! ```rust,ignore
//! use nostrivore::{ArticlePublisher, ArticleSave, ArticleContent, Privacy, PublisherConfig, RelayTransport};
//!
//! let config = PublisherConfig::new(vec!["wss://relay.damus.io".to_string()], "hex:...");
//! let keys = config.keys()?;
//! let publisher = ArticlePublisher::new(RelayTransport::new(config).await?);
//!
//! let save = ArticleSave::new("Title", "https://example.com/a", "omni-1", Privacy::Private);
//! let mut content = ArticleContent::new("Full text");
//! let outcome = publisher.publish(&keys, &save, &mut content).await?;
//! ```

mod article;
mod canonical;
mod config;
mod crypto;
mod error;
mod events;
mod publish;
mod signing;
mod transport;

pub use article::{ArticleContent, ArticleDraft, ArticleSave};
pub use canonical::{serialize, serialize_record};
pub use config::{parse_relays, PublisherConfig, DEFAULT_MIN_ACKS, DEFAULT_TIMEOUT_SECS};
pub use crypto::{apply_privacy, decrypt_content, ContentCipher, Nip04Cipher, Privacy};
pub use error::Error;
pub use events::{
    omnivore_id_tag, parent_tag, recipient_tag, tag_value, topic_tag, unix_timestamp, url_tag,
    Clock, FixedClock, RecordTag, SignedRecord, SystemClock, UnsignedRecord,
    KIND_ARTICLE_CONTENT, KIND_ARTICLE_SAVE, TAG_AUTHOR, TAG_DESCRIPTION, TAG_IMAGE,
    TAG_OMNIVORE_ID, TAG_PARENT, TAG_PRIVACY, TAG_RECIPIENT, TAG_TOPIC, TAG_URL,
};
pub use publish::{ArticlePublisher, PublishFailure, PublishOutcome, RecordRole, Stage};
pub use signing::{compute_id, finalize, is_valid_id, parse_keys, sign_id, verify};
pub use transport::{MemoryTransport, RelayTransport, SendReport, Transport};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
