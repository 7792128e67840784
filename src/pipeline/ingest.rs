//! Ingestion task: moves lines from one `LogStream` into the actor's queue
//!
//! One task per attached stream. Every message is stamped with the stream's
//! generation so the actor can discard anything that arrives after a reattach.

use crate::source::LogStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Messages from ingestion tasks to the pipeline actor
#[derive(Debug)]
pub(crate) enum Ingested {
    Line { generation: u64, text: String },
    /// The source closed its stream
    Ended { generation: u64 },
}

impl Ingested {
    pub(crate) fn generation(&self) -> u64 {
        match self {
            Ingested::Line { generation, .. } | Ingested::Ended { generation } => *generation,
        }
    }
}

/// Running ingestion task. Dropping it cancels the task.
pub(crate) struct IngestTask {
    generation: u64,
    cancel: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl IngestTask {
    pub(crate) fn spawn(generation: u64, stream: LogStream, tx: mpsc::Sender<Ingested>) -> Self {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let join = tokio::spawn(run(generation, stream, tx, cancel_rx));
        Self {
            generation,
            cancel: Some(cancel_tx),
            join,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Signal the task to stop. It drops its stream on the way out.
    pub(crate) fn cancel(mut self) -> JoinHandle<()> {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        tracing::debug!(generation = self.generation, "Ingestion task cancelled");
        self.join
    }
}

async fn run(
    generation: u64,
    mut stream: LogStream,
    tx: mpsc::Sender<Ingested>,
    mut cancel: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            // A dropped sender counts as cancellation too
            _ = &mut cancel => return,
            next = stream.recv() => match next {
                Some(text) => {
                    // The queue is bounded: stay cancellable while blocked on it
                    tokio::select! {
                        _ = &mut cancel => return,
                        sent = tx.send(Ingested::Line { generation, text }) => {
                            if sent.is_err() {
                                return;
                            }
                        }
                    }
                }
                None => {
                    tracing::debug!(generation, "Log stream ended");
                    let _ = tx.send(Ingested::Ended { generation }).await;
                    return;
                }
            }
        }
    }
}
