//! Article records.
//!
//! | Kind | Record | Content | Tags |
//! |------|--------|---------|------|
//! | 30000 | [`ArticleSave`] | title | `url`, `description`?, `image`?, `author`?, `t`*, `kind`, `omnivore_id`, `p`? |
//! | 30001 | [`ArticleContent`] | body | `e`, `p`? |
//!
//! `p` is only present on private records and always names the author, who is
//! the sole recipient of the encrypted content.

use std::path::Path;

use nostr_sdk::prelude::*;
use serde::{Deserialize, Serialize};

use crate::crypto::{apply_privacy, ContentCipher, Privacy};
use crate::events::{
    omnivore_id_tag, parent_tag, topic_tag, url_tag, Clock, RecordTag, SignedRecord,
    UnsignedRecord, KIND_ARTICLE_CONTENT, KIND_ARTICLE_SAVE, TAG_AUTHOR, TAG_DESCRIPTION,
    TAG_IMAGE, TAG_PRIVACY,
};
use crate::signing::{finalize, is_valid_id, verify};
use crate::Error;

/// Metadata for a saved article (kind 30000).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSave {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub privacy: Privacy,
    pub omnivore_id: String,
}

type FieldAccessor = fn(&ArticleSave) -> Option<&str>;

/// Optional fields in tag order. A field is emitted only when it is set and
/// non-empty.
const OPTIONAL_FIELDS: [(&str, FieldAccessor); 3] = [
    (TAG_DESCRIPTION, description_field),
    (TAG_IMAGE, image_field),
    (TAG_AUTHOR, author_field),
];

fn description_field(save: &ArticleSave) -> Option<&str> {
    save.description.as_deref()
}

fn image_field(save: &ArticleSave) -> Option<&str> {
    save.image.as_deref()
}

fn author_field(save: &ArticleSave) -> Option<&str> {
    save.author.as_deref()
}

impl ArticleSave {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        omnivore_id: impl Into<String>,
        privacy: Privacy,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: None,
            image: None,
            author: None,
            topics: Vec::new(),
            privacy,
            omnivore_id: omnivore_id.into(),
        }
    }

    /// Tags before the privacy transform appends its recipient tag.
    pub fn base_tags(&self) -> Vec<RecordTag> {
        let mut tags = vec![url_tag(&self.url)];
        tags.extend(
            OPTIONAL_FIELDS
                .iter()
                .filter_map(|(name, field)| {
                    field(self)
                        .filter(|value| !value.is_empty())
                        .map(|value| RecordTag::single(*name, value))
                }),
        );
        tags.extend(self.topics.iter().map(|topic| topic_tag(topic)));
        tags.push(RecordTag::single(TAG_PRIVACY, self.privacy.as_str()));
        tags.push(omnivore_id_tag(&self.omnivore_id));
        tags
    }

    pub fn to_unsigned(
        &self,
        keys: &Keys,
        created_at: u64,
        cipher: &dyn ContentCipher,
    ) -> Result<UnsignedRecord, Error> {
        let author = keys.public_key();
        let (content, extra_tags) = apply_privacy(&self.title, self.privacy, keys, &author, cipher)?;
        let mut tags = self.base_tags();
        tags.extend(extra_tags);

        Ok(UnsignedRecord {
            pubkey: author.to_hex(),
            created_at,
            kind: KIND_ARTICLE_SAVE,
            tags,
            content,
        })
    }

    pub fn to_record(
        &self,
        keys: &Keys,
        clock: &dyn Clock,
        cipher: &dyn ContentCipher,
    ) -> Result<SignedRecord, Error> {
        let unsigned = self.to_unsigned(keys, clock.now(), cipher)?;
        finalize(unsigned, keys)
    }
}

/// Full text of a saved article (kind 30001), always tied to an
/// [`ArticleSave`] record through an `e` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContent {
    pub body: String,
    is_private: bool,
    parent_event_id: Option<String>,
}

impl ArticleContent {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            is_private: false,
            parent_event_id: None,
        }
    }

    /// Requested privacy. Replaced by the parent's privacy in
    /// [`ArticleContent::bind_parent`] and frozen once a parent is bound.
    pub fn with_private(mut self, is_private: bool) -> Self {
        if self.parent_event_id.is_none() {
            self.is_private = is_private;
        }
        self
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    pub fn parent_event_id(&self) -> Option<&str> {
        self.parent_event_id.as_deref()
    }

    /// Link to a finalized metadata record and adopt its privacy mode.
    pub fn bind_parent(&mut self, parent: &SignedRecord) -> Result<(), Error> {
        if parent.kind() != KIND_ARTICLE_SAVE {
            return Err(Error::LinkIntegrity(format!(
                "parent {} has kind {}, expected {KIND_ARTICLE_SAVE}",
                parent.id(),
                parent.kind()
            )));
        }
        verify(parent).map_err(|err| {
            Error::LinkIntegrity(format!("parent {} does not verify: {err}", parent.id()))
        })?;
        let privacy = match parent.tag_value(TAG_PRIVACY) {
            Some("public") => Privacy::Public,
            Some("private") => Privacy::Private,
            other => {
                return Err(Error::LinkIntegrity(format!(
                    "parent {} has privacy tag {other:?}",
                    parent.id()
                )))
            }
        };

        self.parent_event_id = Some(parent.id().to_string());
        self.is_private = privacy.is_private();
        Ok(())
    }

    pub fn to_unsigned(
        &self,
        keys: &Keys,
        created_at: u64,
        cipher: &dyn ContentCipher,
    ) -> Result<UnsignedRecord, Error> {
        let parent_id = self
            .parent_event_id
            .as_deref()
            .ok_or_else(|| Error::LinkIntegrity("content record has no parent".to_string()))?;
        if !is_valid_id(parent_id) {
            return Err(Error::LinkIntegrity(format!(
                "parent id {parent_id:?} is not an event id"
            )));
        }

        let author = keys.public_key();
        let privacy = Privacy::from_flag(self.is_private);
        let (content, extra_tags) = apply_privacy(&self.body, privacy, keys, &author, cipher)?;
        let mut tags = vec![parent_tag(parent_id)];
        tags.extend(extra_tags);

        Ok(UnsignedRecord {
            pubkey: author.to_hex(),
            created_at,
            kind: KIND_ARTICLE_CONTENT,
            tags,
            content,
        })
    }

    pub fn to_record(
        &self,
        keys: &Keys,
        clock: &dyn Clock,
        cipher: &dyn ContentCipher,
    ) -> Result<SignedRecord, Error> {
        let unsigned = self.to_unsigned(keys, clock.now(), cipher)?;
        finalize(unsigned, keys)
    }
}

/// One article as handed over by the ingestion side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub privacy: Privacy,
    pub omnivore_id: String,
    pub body: String,
}

impl ArticleDraft {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn into_parts(self) -> (ArticleSave, ArticleContent) {
        let content = ArticleContent {
            body: self.body,
            is_private: self.privacy.is_private(),
            parent_event_id: None,
        };
        let save = ArticleSave {
            title: self.title,
            url: self.url,
            description: self.description,
            image: self.image,
            author: self.author,
            topics: self.topics,
            privacy: self.privacy,
            omnivore_id: self.omnivore_id,
        };
        (save, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{decrypt_content, Nip04Cipher};
    use crate::events::{FixedClock, TAG_RECIPIENT, TAG_TOPIC};

    const NOW: u64 = 1_700_000_000;

    fn full_save(privacy: Privacy) -> ArticleSave {
        ArticleSave {
            title: "Test Public Article".to_string(),
            url: "http://example.com/public".to_string(),
            description: Some("A public test article.".to_string()),
            image: Some("http://example.com/public.jpg".to_string()),
            author: Some("Public Author".to_string()),
            topics: vec!["news".to_string(), "tech".to_string()],
            privacy,
            omnivore_id: "omni-public-123".to_string(),
        }
    }

    fn tag_parts(record: &SignedRecord) -> Vec<Vec<String>> {
        record.tags().iter().map(RecordTag::to_vec).collect()
    }

    fn parts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_public_save_tag_order() {
        let keys = Keys::generate();
        let record = full_save(Privacy::Public)
            .to_record(&keys, &FixedClock(NOW), &Nip04Cipher)
            .unwrap();

        assert_eq!(record.kind(), KIND_ARTICLE_SAVE);
        assert_eq!(record.content(), "Test Public Article");
        assert_eq!(record.created_at(), NOW);
        assert_eq!(record.pubkey(), keys.public_key().to_hex());
        assert_eq!(
            tag_parts(&record),
            vec![
                parts(&["url", "http://example.com/public"]),
                parts(&["description", "A public test article."]),
                parts(&["image", "http://example.com/public.jpg"]),
                parts(&["author", "Public Author"]),
                parts(&["t", "news"]),
                parts(&["t", "tech"]),
                parts(&["kind", "public"]),
                parts(&["omnivore_id", "omni-public-123"]),
            ]
        );
        assert_eq!(record.count_tags(TAG_RECIPIENT), 0);
    }

    #[test]
    fn test_private_save() {
        let keys = Keys::generate();
        let pubkey = keys.public_key().to_hex();
        let mut save = full_save(Privacy::Private);
        save.image = None;
        save.author = None;
        let record = save.to_record(&keys, &FixedClock(NOW), &Nip04Cipher).unwrap();

        assert_ne!(record.content(), save.title);
        assert_eq!(decrypt_content(&record, &keys, &Nip04Cipher).unwrap(), save.title);
        assert!(record.has_tag(&["kind", "private"]));
        assert!(record.has_tag(&["p", pubkey.as_str()]));
        assert_eq!(record.count_tags(TAG_RECIPIENT), 1);
        assert_eq!(record.tags().last().unwrap().to_vec(), parts(&["p", pubkey.as_str()]));
        assert_eq!(record.count_tags(TAG_IMAGE), 0);
        assert_eq!(record.count_tags(TAG_AUTHOR), 0);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let keys = Keys::generate();
        let mut save = ArticleSave::new(
            "Test Public Article Minimal",
            "http://example.com/public-minimal",
            "omni-public-min-789",
            Privacy::Public,
        );
        save.description = Some(String::new());
        let record = save.to_record(&keys, &FixedClock(NOW), &Nip04Cipher).unwrap();

        for name in [TAG_DESCRIPTION, TAG_IMAGE, TAG_AUTHOR, TAG_TOPIC] {
            assert_eq!(record.count_tags(name), 0, "unexpected {name} tag");
        }
        assert_eq!(record.tags().len(), 3);
    }

    #[test]
    fn test_same_input_same_id() {
        let keys = Keys::generate();
        let save = full_save(Privacy::Public);
        let first = save.to_record(&keys, &FixedClock(NOW), &Nip04Cipher).unwrap();
        let second = save.to_record(&keys, &FixedClock(NOW), &Nip04Cipher).unwrap();
        assert_eq!(first.id(), second.id());

        let later = save
            .to_record(&keys, &FixedClock(NOW + 1), &Nip04Cipher)
            .unwrap();
        assert_ne!(first.id(), later.id());
    }

    #[test]
    fn test_content_requires_parent() {
        let keys = Keys::generate();
        let content = ArticleContent::new("Hello public world");
        let err = content
            .to_record(&keys, &FixedClock(NOW), &Nip04Cipher)
            .unwrap_err();
        assert!(matches!(err, Error::LinkIntegrity(_)));
    }

    #[test]
    fn test_bind_parent_public() {
        let keys = Keys::generate();
        let parent = full_save(Privacy::Public)
            .to_record(&keys, &FixedClock(NOW), &Nip04Cipher)
            .unwrap();
        let mut content = ArticleContent::new("Hello public world").with_private(true);
        content.bind_parent(&parent).unwrap();
        assert!(!content.is_private());
        assert_eq!(content.parent_event_id(), Some(parent.id()));

        let record = content
            .to_record(&keys, &FixedClock(NOW), &Nip04Cipher)
            .unwrap();
        assert_eq!(record.kind(), KIND_ARTICLE_CONTENT);
        assert_eq!(record.content(), "Hello public world");
        assert_eq!(tag_parts(&record), vec![parts(&["e", parent.id()])]);
    }

    #[test]
    fn test_bind_parent_private() {
        let keys = Keys::generate();
        let pubkey = keys.public_key().to_hex();
        let parent = full_save(Privacy::Private)
            .to_record(&keys, &FixedClock(NOW), &Nip04Cipher)
            .unwrap();
        let mut content = ArticleContent::new("Hello secret world");
        content.bind_parent(&parent).unwrap();
        assert!(content.is_private());

        let record = content
            .to_record(&keys, &FixedClock(NOW), &Nip04Cipher)
            .unwrap();
        assert_ne!(record.content(), "Hello secret world");
        assert_eq!(
            decrypt_content(&record, &keys, &Nip04Cipher).unwrap(),
            "Hello secret world"
        );
        assert_eq!(
            tag_parts(&record),
            vec![parts(&["e", parent.id()]), parts(&["p", pubkey.as_str()])]
        );
    }

    #[test]
    fn test_privacy_frozen_after_bind() {
        let keys = Keys::generate();
        let parent = full_save(Privacy::Private)
            .to_record(&keys, &FixedClock(NOW), &Nip04Cipher)
            .unwrap();
        let mut content = ArticleContent::new("Hello secret world");
        content.bind_parent(&parent).unwrap();
        let content = content.with_private(false);
        assert!(content.is_private());

        let record = content
            .to_record(&keys, &FixedClock(NOW), &Nip04Cipher)
            .unwrap();
        assert_ne!(record.content(), "Hello secret world");
        assert_eq!(record.count_tags(TAG_RECIPIENT), 1);
    }

    #[test]
    fn test_bind_parent_rejects_content_record() {
        let keys = Keys::generate();
        let parent = full_save(Privacy::Public)
            .to_record(&keys, &FixedClock(NOW), &Nip04Cipher)
            .unwrap();
        let mut first = ArticleContent::new("body");
        first.bind_parent(&parent).unwrap();
        let content_record = first
            .to_record(&keys, &FixedClock(NOW), &Nip04Cipher)
            .unwrap();

        let mut second = ArticleContent::new("body");
        let err = second.bind_parent(&content_record).unwrap_err();
        assert!(matches!(err, Error::LinkIntegrity(_)));
        assert!(second.parent_event_id().is_none());
    }

    #[test]
    fn test_draft_from_json() {
        let json = r#"{
            "title": "Test Title",
            "url": "http://example.com/article",
            "privacy": "private",
            "omnivore_id": "omni123",
            "topics": ["rust"],
            "body": "Test content."
        }"#;
        let draft: ArticleDraft = serde_json::from_str(json).unwrap();
        let (save, content) = draft.into_parts();
        assert_eq!(save.privacy, Privacy::Private);
        assert_eq!(save.topics, vec!["rust".to_string()]);
        assert!(save.description.is_none());
        assert_eq!(content.body, "Test content.");
        assert!(content.parent_event_id().is_none());
    }

    #[test]
    fn test_draft_from_path() {
        let dir = std::env::temp_dir().join(format!("nostrivore-draft-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("article.json");
        std::fs::write(
            &path,
            r#"{"title":"T","url":"http://example.com","privacy":"public","omnivore_id":"omni-9","body":"B"}"#,
        )
        .unwrap();
        let (save, content) = ArticleDraft::from_path(&path).unwrap().into_parts();
        assert_eq!(save.omnivore_id, "omni-9");
        assert_eq!(content.body, "B");

        let missing = ArticleDraft::from_path(dir.join("absent.json")).unwrap_err();
        assert!(matches!(missing, Error::Io(_)));

        std::fs::write(&path, "not json").unwrap();
        let garbled = ArticleDraft::from_path(&path).unwrap_err();
        assert!(matches!(garbled, Error::Json(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
