//! # settleup-worker
//!
//! **Job Runner**: feeds ledgers from an object store into the core and
//! stores the settlements back.
//!
//! ## Flow
//!
//! ```text
//! JobQueue.receive() -> {"debts_id": id} -> ObjectStore.get(id)
//!     -> decode -> aggregate -> settle -> verify -> encode
//!     -> ObjectStore.put("{id}_results") -> JobQueue.delete(receipt)
//! ```
//!
//! A message is deleted only after its result is stored. Anything that
//! fails stays on the queue for redelivery; the core is pure, so
//! reprocessing is safe.
//!
//! ## Backends
//!
//! - [`InMemoryObjectStore`] / [`InMemoryQueue`]: tests and embedding
//! - [`FsObjectStore`] / [`SpoolQueue`]: local directories, used by the
//!   `settleup-worker` binary

pub mod error;
pub mod job;
pub mod queue;
pub mod runner;
pub mod store;

pub use error::{QueueError, QueueResult, StoreError, StoreResult, WorkerError};
pub use job::{JobMessage, JobOutcome};
pub use queue::{InMemoryQueue, JobQueue, QueueMessage, SpoolQueue};
pub use runner::{JobRunner, PollReport};
pub use store::{FsObjectStore, InMemoryObjectStore, ObjectStore};
