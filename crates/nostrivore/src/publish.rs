use std::fmt;
use std::sync::Arc;

use nostr_sdk::prelude::*;
use tracing::{info, warn};

use crate::article::{ArticleContent, ArticleSave};
use crate::crypto::{ContentCipher, Nip04Cipher};
use crate::events::{Clock, SignedRecord, SystemClock};
use crate::signing::is_valid_id;
use crate::transport::Transport;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRole {
    Metadata,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Finalize,
    Transport,
}

/// A failure pinned to one record and one stage.
#[derive(Debug, thiserror::Error)]
#[error("{role:?} record failed at {stage:?}: {error}")]
pub struct PublishFailure {
    pub role: RecordRole,
    pub stage: Stage,
    #[source]
    pub error: Error,
}

impl PublishFailure {
    fn new(role: RecordRole, stage: Stage, error: Error) -> Self {
        Self { role, stage, error }
    }
}

/// Result of a publish that got the metadata record out.
///
/// A failed publish that sent nothing is the `Err` side of
/// [`ArticlePublisher::publish`].
#[derive(Debug)]
pub enum PublishOutcome {
    Complete {
        metadata: SignedRecord,
        content: SignedRecord,
    },
    MetadataOnly {
        metadata: SignedRecord,
        failure: PublishFailure,
    },
}

impl PublishOutcome {
    pub fn metadata(&self) -> &SignedRecord {
        match self {
            PublishOutcome::Complete { metadata, .. } => metadata,
            PublishOutcome::MetadataOnly { metadata, .. } => metadata,
        }
    }

    pub fn content(&self) -> Option<&SignedRecord> {
        match self {
            PublishOutcome::Complete { content, .. } => Some(content),
            PublishOutcome::MetadataOnly { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&PublishFailure> {
        match self {
            PublishOutcome::Complete { .. } => None,
            PublishOutcome::MetadataOnly { failure, .. } => Some(failure),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, PublishOutcome::Complete { .. })
    }

    pub fn records(&self) -> (Option<&SignedRecord>, Option<&SignedRecord>) {
        (Some(self.metadata()), self.content())
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOutcome::Complete { metadata, content } => {
                write!(f, "published {} and {}", metadata.id(), content.id())
            }
            PublishOutcome::MetadataOnly { metadata, failure } => {
                write!(f, "published {} only ({failure})", metadata.id())
            }
        }
    }
}

/// Publishes an article as a metadata record followed by a content record
/// that references it. Sends are sequential and never retried.
pub struct ArticlePublisher<T: Transport> {
    transport: T,
    clock: Arc<dyn Clock>,
    cipher: Arc<dyn ContentCipher>,
}

impl<T: Transport> ArticlePublisher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            clock: Arc::new(SystemClock),
            cipher: Arc::new(Nip04Cipher),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cipher(mut self, cipher: Arc<dyn ContentCipher>) -> Self {
        self.cipher = cipher;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn publish(
        &self,
        keys: &Keys,
        save: &ArticleSave,
        content: &mut ArticleContent,
    ) -> Result<PublishOutcome, PublishFailure> {
        let metadata = save
            .to_record(keys, self.clock.as_ref(), self.cipher.as_ref())
            .map_err(|err| PublishFailure::new(RecordRole::Metadata, Stage::Finalize, err))?;
        if !is_valid_id(metadata.id()) {
            return Err(PublishFailure::new(
                RecordRole::Metadata,
                Stage::Finalize,
                Error::IdentifierMissing,
            ));
        }

        if let Err(err) = self.transport.send(&metadata).await {
            warn!(event_id = %metadata.id(), error = %err, "Metadata record not delivered");
            return Err(PublishFailure::new(
                RecordRole::Metadata,
                Stage::Transport,
                err,
            ));
        }
        info!(event_id = %metadata.id(), omnivore_id = %save.omnivore_id, "Metadata record published");

        let record = match content
            .bind_parent(&metadata)
            .and_then(|()| content.to_record(keys, self.clock.as_ref(), self.cipher.as_ref()))
        {
            Ok(record) => record,
            Err(err) => {
                warn!(parent = %metadata.id(), error = %err, "Content record not finalized");
                return Ok(PublishOutcome::MetadataOnly {
                    metadata,
                    failure: PublishFailure::new(RecordRole::Content, Stage::Finalize, err),
                });
            }
        };

        if let Err(err) = self.transport.send(&record).await {
            warn!(parent = %metadata.id(), event_id = %record.id(), error = %err, "Content record not delivered");
            return Ok(PublishOutcome::MetadataOnly {
                metadata,
                failure: PublishFailure::new(RecordRole::Content, Stage::Transport, err),
            });
        }
        info!(parent = %metadata.id(), event_id = %record.id(), "Content record published");

        Ok(PublishOutcome::Complete {
            metadata,
            content: record,
        })
    }
}
