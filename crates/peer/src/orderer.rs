//! Ordering service and committer
//!
//! Endorsed envelopes are queued on a bounded channel and drained by a
//! single committer task. That task is the only writer of the ledger, so
//! transactions touching the same key are serialized in queue order.

use std::sync::Arc;

use passport_common::Envelope;
use thiserror::Error;
use tokio::sync::{mpsc, Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::ledger::Ledger;

/// Ordering configuration
#[derive(Debug, Clone)]
pub struct OrdererConfig {
    /// Maximum transactions cut into one block
    pub max_batch_size: usize,

    /// Envelopes that may wait for ordering before submissions are refused
    pub queue_depth: usize,
}

impl Default for OrdererConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 10,
            queue_depth: 256,
        }
    }
}

#[derive(Debug, Error)]
pub enum OrdererError {
    #[error("Ordering queue is full")]
    QueueFull,

    #[error("Ordering service stopped")]
    Stopped,
}

/// Client side of the ordering queue
#[derive(Clone)]
pub struct Orderer {
    sender: mpsc::Sender<Envelope>,
}

impl Orderer {
    /// Start the committer task for `ledger`.
    ///
    /// `commits` is notified after every committed block.
    pub fn start(
        config: OrdererConfig,
        ledger: Arc<RwLock<Ledger>>,
        commits: Arc<Notify>,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(config.queue_depth.max(1));

        let committer = Committer {
            receiver,
            ledger,
            commits,
            max_batch_size: config.max_batch_size.max(1),
        };
        let handle = tokio::spawn(committer.run());

        (Self { sender }, handle)
    }

    /// Enqueue an endorsed envelope for ordering
    pub fn broadcast(&self, envelope: Envelope) -> Result<(), OrdererError> {
        self.sender.try_send(envelope).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => OrdererError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => OrdererError::Stopped,
        })
    }
}

struct Committer {
    receiver: mpsc::Receiver<Envelope>,
    ledger: Arc<RwLock<Ledger>>,
    commits: Arc<Notify>,
    max_batch_size: usize,
}

impl Committer {
    async fn run(mut self) {
        info!("Committer started, waiting for transactions...");

        while let Some(first) = self.receiver.recv().await {
            let mut batch = vec![first];
            while batch.len() < self.max_batch_size {
                match self.receiver.try_recv() {
                    Ok(envelope) => batch.push(envelope),
                    Err(_) => break,
                }
            }

            let block = {
                let mut ledger = self.ledger.write().await;
                ledger.commit_block(batch)
            };

            let invalid = block
                .statuses
                .iter()
                .filter(|s| !s.is_successful())
                .count();
            if invalid > 0 {
                warn!(
                    "Block {} carried {} invalid transaction(s)",
                    block.number, invalid
                );
            }

            self.commits.notify_waiters();
        }

        info!("Ordering queue closed, committer stopped");
    }
}
