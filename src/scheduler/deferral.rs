//! # Default FIFO deferral queue.
//!
//! [`Deferral`] drains an unbounded queue on a single spawned worker task,
//! preserving submission order across every handle cloned from it.
//!
//! ## Architecture
//! ```text
//! defer(job)          defer(job)          flush()
//!     │                   │                  │
//!     └───────────────────┴──────────────────┘
//!                         ▼
//!              [unbounded mpsc queue]
//!                         ▼
//!                   worker task ──► job() (panics caught)
//!                         └───────► flush ack
//! ```
//!
//! ## Rules
//! - One worker per `Deferral::new`; clones share the queue and the
//!   worker, which is what gives cross-observer FIFO.
//! - A panicking job is caught and logged; the worker keeps draining.
//! - The worker exits when every handle has been dropped.
//!
//! ## Example
//! ```rust
//! use eventmatch::{Defer, Deferral};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let queue = Deferral::new();
//! queue.defer(Box::new(|| println!("ran later")));
//! queue.flush().await; // everything enqueued so far has run
//! # }
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio::sync::{mpsc, oneshot};

use crate::error::panic_message;
use crate::scheduler::defer::{Defer, Job};

enum QueueItem {
    Run(Job),
    Flush(oneshot::Sender<()>),
}

/// Cloneable handle over a FIFO job queue drained by one worker task.
///
/// Observers default to a private `Deferral`; sharing one handle across
/// several observers serializes their dispatches into a single order.
#[derive(Clone)]
pub struct Deferral {
    tx: mpsc::UnboundedSender<QueueItem>,
}

impl Default for Deferral {
    fn default() -> Self {
        Self::new()
    }
}

impl Deferral {
    /// Creates the queue and spawns its worker task.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueueItem>();

        tokio::spawn(async move {
            while let Some(item) = rx.recv().await {
                match item {
                    QueueItem::Run(job) => {
                        if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
                            log::warn!("deferred job panicked: {}", panic_message(&*payload));
                        }
                    }
                    QueueItem::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });

        Self { tx }
    }

    /// Waits until every job enqueued before this call has run.
    ///
    /// Jobs enqueued *by* those jobs may still be pending; call again to
    /// settle cascades.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(QueueItem::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

impl Defer for Deferral {
    fn defer(&self, job: Job) {
        if self.tx.send(QueueItem::Run(job)).is_err() {
            log::warn!("deferral worker is gone; dropping job");
        }
    }
}
