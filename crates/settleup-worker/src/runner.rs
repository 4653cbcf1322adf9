//! The job runner loop.

use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Duration;

use settleup_codec::{read_transactions, write_settlements_to_string};
use settleup_core::{aggregate, compute_settlement_digest, settle, verify_settlements};
use settleup_types::{WorkerConfig, constants};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{JobMessage, JobOutcome, JobQueue, ObjectStore, QueueMessage, WorkerError};

/// Pause after a poll that failed outright (queue unreachable).
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Pause after an empty poll when the queue does not long-poll.
const IDLE_BACKOFF: Duration = Duration::from_millis(250);

/// Counts from one or more polls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub received: usize,
    pub acknowledged: usize,
    pub failed: usize,
}

impl AddAssign for PollReport {
    fn add_assign(&mut self, other: Self) {
        self.received += other.received;
        self.acknowledged += other.acknowledged;
        self.failed += other.failed;
    }
}

/// Pulls jobs off a queue and settles the ledgers they reference.
pub struct JobRunner<S, Q> {
    store: Arc<S>,
    queue: Arc<Q>,
    max_messages: usize,
    wait_time: Duration,
}

impl<S: ObjectStore, Q: JobQueue> JobRunner<S, Q> {
    /// Runner with default polling (5 messages, 20 s long poll).
    #[must_use]
    pub fn new(store: Arc<S>, queue: Arc<Q>) -> Self {
        Self {
            store,
            queue,
            max_messages: constants::DEFAULT_MAX_MESSAGES,
            wait_time: Duration::from_secs(constants::DEFAULT_WAIT_TIME_SECS),
        }
    }

    /// Runner with polling taken from a validated config.
    #[must_use]
    pub fn from_config(store: Arc<S>, queue: Arc<Q>, config: &WorkerConfig) -> Self {
        Self::new(store, queue).with_polling(config.max_messages, config.wait_time())
    }

    #[must_use]
    pub fn with_polling(mut self, max_messages: usize, wait_time: Duration) -> Self {
        self.max_messages = max_messages.max(1);
        self.wait_time = wait_time;
        self
    }

    /// Settle the ledger one message refers to and store the result.
    ///
    /// Does not touch the queue: acknowledging is the caller's decision.
    ///
    /// # Errors
    /// - `InvalidMessage` if the body is not a job message
    /// - `Store` if the ledger cannot be fetched or the result stored
    /// - `Settle` if the ledger is malformed or the settlements fail their
    ///   self-check
    pub async fn process_message(&self, message: &QueueMessage) -> Result<JobOutcome, WorkerError> {
        let job = JobMessage::parse(&message.body)?;
        let ledger_id = job.debts_id;
        info!(ledger_id = %ledger_id, message_id = %message.message_id, "Processing ledger");

        let bytes = self.store.get(ledger_id.as_str()).await?;
        let transactions = read_transactions(bytes.as_slice())?;

        let balances = aggregate(&transactions);
        let settlements = settle(balances.clone())?;
        verify_settlements(&balances, &settlements)?;
        let digest = compute_settlement_digest(&settlements);

        let results_key = ledger_id.results_key();
        let content = write_settlements_to_string(&settlements)?;
        self.store.put(&results_key, content.into_bytes()).await?;

        info!(
            ledger_id = %ledger_id,
            transactions = transactions.len(),
            participants = balances.len(),
            settlements = settlements.len(),
            digest = %digest.short(),
            "Ledger settled"
        );

        Ok(JobOutcome {
            ledger_id,
            results_key,
            transactions: transactions.len(),
            settlements: settlements.len(),
            digest,
        })
    }

    /// Receive one batch and process each message in turn.
    ///
    /// Successful jobs are acknowledged; failed ones are left for
    /// redelivery.
    ///
    /// # Errors
    /// Only if the receive itself fails. Per-message failures are counted in
    /// the report.
    pub async fn poll_once(&self) -> Result<PollReport, WorkerError> {
        let messages = self.queue.receive(self.max_messages, self.wait_time).await?;
        let mut report = PollReport {
            received: messages.len(),
            ..PollReport::default()
        };
        if !messages.is_empty() {
            info!(received = messages.len(), "Received messages");
        }

        for message in &messages {
            match self.process_message(message).await {
                Ok(_) => match self.queue.delete(&message.receipt_handle).await {
                    Ok(()) => report.acknowledged += 1,
                    Err(err) => {
                        // Result is stored; a redelivery rewrites the same bytes.
                        warn!(message_id = %message.message_id, error = %err, "Failed to acknowledge message");
                        report.failed += 1;
                    }
                },
                Err(err) => {
                    error!(
                        message_id = %message.message_id,
                        error = %err,
                        "Job failed, leaving message for redelivery"
                    );
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Poll until the shutdown flag flips to `true` or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> PollReport {
        let mut total = PollReport::default();
        info!(
            max_messages = self.max_messages,
            wait_secs = self.wait_time.as_secs(),
            "Worker polling"
        );

        while !*shutdown.borrow() {
            let pause = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                result = self.poll_once() => match result {
                    Ok(report) => {
                        total += report;
                        (report.received == 0 && self.wait_time.is_zero()).then_some(IDLE_BACKOFF)
                    }
                    Err(err) => {
                        error!(error = %err, "Poll failed");
                        Some(ERROR_BACKOFF)
                    }
                },
            };

            if let Some(pause) = pause {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    () = tokio::time::sleep(pause) => {}
                }
            }
        }

        info!(
            received = total.received,
            acknowledged = total.acknowledged,
            failed = total.failed,
            "Worker stopped"
        );
        total
    }

    /// Poll until a receive comes back empty.
    ///
    /// # Errors
    /// The first receive failure.
    pub async fn run_until_idle(&self) -> Result<PollReport, WorkerError> {
        let mut total = PollReport::default();
        loop {
            let report = self.poll_once().await?;
            if report.received == 0 {
                return Ok(total);
            }
            total += report;
        }
    }
}
