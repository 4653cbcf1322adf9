//! Job queue: where settlement requests arrive.
//!
//! Delivery is at-least-once. A received message stays hidden until it is
//! deleted by its receipt handle; a message that is never deleted is
//! eventually handed out again.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{QueueError, QueueResult};

/// A delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Stable across redeliveries.
    pub message_id: String,
    /// Unique per delivery; pass to [`JobQueue::delete`] to acknowledge.
    pub receipt_handle: String,
    pub body: String,
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Receive up to `max_messages`, waiting at most `wait_time` for the
    /// first one. An empty batch means nothing arrived in time.
    async fn receive(&self, max_messages: usize, wait_time: Duration) -> QueueResult<Vec<QueueMessage>>;

    /// Acknowledge a delivery so it is never handed out again.
    async fn delete(&self, receipt_handle: &str) -> QueueResult<()>;
}

// ---------------------------------------------------------------------------
// InMemoryQueue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct StoredMessage {
    message_id: String,
    body: String,
}

#[derive(Default)]
struct QueueState {
    ready: VecDeque<StoredMessage>,
    /// Receipt handle -> message handed out but not yet deleted.
    in_flight: HashMap<String, StoredMessage>,
}

/// FIFO queue held in memory.
///
/// In-flight messages stay hidden until deleted or handed back with
/// [`InMemoryQueue::release_in_flight`], which plays the role of a
/// visibility timeout expiring.
#[derive(Default)]
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
    arrivals: Notify,
}

impl InMemoryQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a body. Returns the new message id.
    pub async fn send(&self, body: impl Into<String>) -> String {
        let message_id = Uuid::now_v7().to_string();
        self.state.lock().await.ready.push_back(StoredMessage {
            message_id: message_id.clone(),
            body: body.into(),
        });
        self.arrivals.notify_one();
        message_id
    }

    /// Messages waiting to be received.
    pub async fn ready_len(&self) -> usize {
        self.state.lock().await.ready.len()
    }

    /// Messages received but not yet deleted.
    pub async fn in_flight_len(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }

    /// Return every in-flight message to the front of the queue. Returns how
    /// many were released.
    pub async fn release_in_flight(&self) -> usize {
        let mut state = self.state.lock().await;
        let mut released: Vec<StoredMessage> = state.in_flight.drain().map(|(_, m)| m).collect();
        // UUIDv7 ids sort by send time.
        released.sort_by(|a, b| b.message_id.cmp(&a.message_id));
        let count = released.len();
        for message in released {
            state.ready.push_front(message);
        }
        if count > 0 {
            self.arrivals.notify_one();
        }
        count
    }

    async fn take_ready(&self, max_messages: usize) -> Vec<QueueMessage> {
        let mut state = self.state.lock().await;
        let mut delivered = Vec::new();
        while delivered.len() < max_messages {
            let Some(message) = state.ready.pop_front() else {
                break;
            };
            let receipt_handle = Uuid::now_v7().to_string();
            delivered.push(QueueMessage {
                message_id: message.message_id.clone(),
                receipt_handle: receipt_handle.clone(),
                body: message.body.clone(),
            });
            state.in_flight.insert(receipt_handle, message);
        }
        delivered
    }
}

#[async_trait]
impl JobQueue for InMemoryQueue {
    async fn receive(&self, max_messages: usize, wait_time: Duration) -> QueueResult<Vec<QueueMessage>> {
        let deadline = Instant::now() + wait_time;
        loop {
            let delivered = self.take_ready(max_messages).await;
            let now = Instant::now();
            if !delivered.is_empty() || now >= deadline {
                return Ok(delivered);
            }
            // A permit left by an earlier send can wake this with nothing
            // ready; the loop keeps waiting until the deadline.
            let _ = tokio::time::timeout(deadline - now, self.arrivals.notified()).await;
        }
    }

    async fn delete(&self, receipt_handle: &str) -> QueueResult<()> {
        self.state
            .lock()
            .await
            .in_flight
            .remove(receipt_handle)
            .map(|_| ())
            .ok_or_else(|| QueueError::UnknownReceipt(receipt_handle.to_string()))
    }
}

// ---------------------------------------------------------------------------
// SpoolQueue
// ---------------------------------------------------------------------------

const READY_EXT: &str = "json";
const IN_FLIGHT_EXT: &str = "inflight";
const SPOOL_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A directory of message files.
///
/// - `<id>.json`: ready
/// - `<id>.json.inflight`: received, not yet deleted; the file name is the
///   receipt handle
///
/// Opening the spool moves leftover in-flight files back to ready, so a
/// crash between receive and delete leads to redelivery.
pub struct SpoolQueue {
    dir: PathBuf,
    /// Serializes directory scans so two receivers never claim one file.
    claim: Mutex<()>,
}

impl SpoolQueue {
    /// Open (creating if needed) a spool directory and recover orphaned
    /// in-flight messages.
    pub async fn open(dir: impl Into<PathBuf>) -> QueueResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| io_error(&dir, &e))?;

        let queue = Self {
            dir,
            claim: Mutex::new(()),
        };
        let recovered = queue.recover_in_flight().await?;
        if recovered > 0 {
            warn!(recovered, dir = %queue.dir.display(), "Requeued in-flight messages from a previous run");
        }
        Ok(queue)
    }

    /// Write a new ready message. Returns its id.
    pub async fn send(&self, body: &str) -> QueueResult<String> {
        let message_id = Uuid::now_v7().to_string();
        let tmp = self.dir.join(format!(".{message_id}.tmp"));
        let ready = self.dir.join(format!("{message_id}.{READY_EXT}"));
        tokio::fs::write(&tmp, body).await.map_err(|e| io_error(&tmp, &e))?;
        tokio::fs::rename(&tmp, &ready).await.map_err(|e| io_error(&ready, &e))?;
        Ok(message_id)
    }

    async fn recover_in_flight(&self) -> QueueResult<usize> {
        let mut recovered = 0;
        for name in self.list(IN_FLIGHT_EXT).await? {
            let from = self.dir.join(&name);
            let to = self.dir.join(name.trim_end_matches(&format!(".{IN_FLIGHT_EXT}")));
            tokio::fs::rename(&from, &to).await.map_err(|e| io_error(&from, &e))?;
            recovered += 1;
        }
        Ok(recovered)
    }

    /// File names in the spool ending in `.{ext}`, sorted (UUIDv7 names
    /// sort by send time).
    async fn list(&self, ext: &str) -> QueueResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, &e))?;
        let suffix = format!(".{ext}");
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&self.dir, &e))? {
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(&suffix) && !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn claim_ready(&self, max_messages: usize) -> QueueResult<Vec<QueueMessage>> {
        let _guard = self.claim.lock().await;
        let mut delivered = Vec::new();
        for name in self.list(READY_EXT).await?.into_iter().take(max_messages) {
            let ready = self.dir.join(&name);
            let receipt_handle = format!("{name}.{IN_FLIGHT_EXT}");
            let in_flight = self.dir.join(&receipt_handle);
            tokio::fs::rename(&ready, &in_flight)
                .await
                .map_err(|e| io_error(&ready, &e))?;
            let body = tokio::fs::read_to_string(&in_flight)
                .await
                .map_err(|e| io_error(&in_flight, &e))?;
            let message_id = name.trim_end_matches(&format!(".{READY_EXT}")).to_string();
            debug!(message_id, "Spool message claimed");
            delivered.push(QueueMessage {
                message_id,
                receipt_handle,
                body,
            });
        }
        Ok(delivered)
    }
}

#[async_trait]
impl JobQueue for SpoolQueue {
    async fn receive(&self, max_messages: usize, wait_time: Duration) -> QueueResult<Vec<QueueMessage>> {
        let deadline = Instant::now() + wait_time;
        loop {
            let delivered = self.claim_ready(max_messages).await?;
            let now = Instant::now();
            if !delivered.is_empty() || now >= deadline {
                return Ok(delivered);
            }
            tokio::time::sleep(SPOOL_POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn delete(&self, receipt_handle: &str) -> QueueResult<()> {
        let valid = receipt_handle.ends_with(&format!(".{IN_FLIGHT_EXT}"))
            && !receipt_handle.contains(['/', '\\'])
            && !receipt_handle.starts_with('.');
        if !valid {
            return Err(QueueError::InvalidReceipt(receipt_handle.to_string()));
        }
        let path = self.dir.join(receipt_handle);
        tokio::fs::remove_file(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => QueueError::UnknownReceipt(receipt_handle.to_string()),
            _ => io_error(&path, &e),
        })
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> QueueError {
    QueueError::Io(format!("{}: {err}", path.display()))
}
