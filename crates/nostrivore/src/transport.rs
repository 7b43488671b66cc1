use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use nostr_sdk::prelude::*;
use tracing::{info, warn};

use crate::config::PublisherConfig;
use crate::events::SignedRecord;
use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub event_id: String,
    pub success: usize,
    pub failed: usize,
}

/// Delivery of finalized records. Ordering across calls and retry policy are
/// the implementation's concern; callers await one send at a time.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, record: &SignedRecord) -> Result<SendReport, Error>;
}

/// Sends records to the configured relays through a `nostr-sdk` client.
///
/// The client owns the relay pool; every connection lives as long as this
/// transport.
#[derive(Clone)]
pub struct RelayTransport {
    client: Client,
    config: PublisherConfig,
}

impl RelayTransport {
    pub async fn new(config: PublisherConfig) -> Result<Self, Error> {
        let client = Client::builder().build();

        for relay in &config.relays {
            client.add_relay(relay).await?;
        }

        client.connect().await;
        info!(relays = config.relays.len(), "Relay transport connected");
        Ok(Self { client, config })
    }

    pub fn relays(&self) -> &[String] {
        &self.config.relays
    }

    pub async fn disconnect(&self) {
        self.client.disconnect().await;
    }
}

#[async_trait]
impl Transport for RelayTransport {
    async fn send(&self, record: &SignedRecord) -> Result<SendReport, Error> {
        let event = record.to_sdk_event()?;
        let output = tokio::time::timeout(self.config.timeout, self.client.send_event(&event))
            .await
            .map_err(|_| Error::Timeout)??;

        let success = output.success.len();
        let failed = output.failed.len();
        for (relay, reason) in &output.failed {
            warn!(relay = %relay, reason = %reason, event_id = %record.id(), "Relay rejected event");
        }
        if self.config.min_acks > 0 && success < self.config.min_acks {
            return Err(Error::Quorum {
                required: self.config.min_acks,
                actual: success,
            });
        }

        let event_id = output.id().to_string();
        info!(event_id = %event_id, kind = record.kind(), success, failed, "Published nostr event");

        Ok(SendReport {
            event_id,
            success,
            failed,
        })
    }
}

/// Keeps sent records in memory. Sends listed in `fail_on` (zero-based call
/// index) fail with [`Error::Transport`] and are not recorded.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<SignedRecord>>,
    attempts: Mutex<usize>,
    fail_on: HashSet<usize>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        Self {
            fail_on: calls.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Result<Vec<SignedRecord>, Error> {
        Ok(self.sent.lock().map_err(|_| Error::MutexPoisoned)?.clone())
    }

    pub fn attempts(&self) -> Result<usize, Error> {
        Ok(*self.attempts.lock().map_err(|_| Error::MutexPoisoned)?)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, record: &SignedRecord) -> Result<SendReport, Error> {
        let call = {
            let mut attempts = self.attempts.lock().map_err(|_| Error::MutexPoisoned)?;
            let call = *attempts;
            *attempts += 1;
            call
        };

        if self.fail_on.contains(&call) {
            return Err(Error::Transport(format!(
                "send #{call} of {} refused",
                record.id()
            )));
        }

        self.sent
            .lock()
            .map_err(|_| Error::MutexPoisoned)?
            .push(record.clone());

        Ok(SendReport {
            event_id: record.id().to_string(),
            success: 1,
            failed: 0,
        })
    }
}
