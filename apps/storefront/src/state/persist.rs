//! # Background Persistence
//!
//! Fire-and-forget writer shared by the cart and favorites stores.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  store mutation ──► Persister::save(snapshot)   (never blocks)          │
//! │                          │                                              │
//! │                          │ unbounded mpsc                               │
//! │                          ▼                                              │
//! │                   writer task (one per store)                           │
//! │                   ├── Save(snapshot) ──► repository.save().await        │
//! │                   │                      failure → warn!, carry on      │
//! │                   └── Flush(ack) ──────► ack once earlier saves ran     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One writer per store keeps writes in mutation order. A store without
//! storage uses [`Persister::disabled`] and keeps working in memory.

use std::future::Future;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use biosynth_db::DbResult;

enum PersistCommand<T> {
    Save(T),
    Flush(oneshot::Sender<()>),
}

/// Handle to a store's writer task.
#[derive(Debug)]
pub struct Persister<T> {
    tx: Option<mpsc::UnboundedSender<PersistCommand<T>>>,
}

impl<T> Clone for Persister<T> {
    fn clone(&self) -> Self {
        Persister {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Send + 'static> Persister<T> {
    /// Spawns the writer task. Must be called inside a tokio runtime.
    pub fn spawn<F, Fut>(label: &'static str, save: F) -> Self
    where
        F: Fn(T) -> Fut + Send + 'static,
        Fut: Future<Output = DbResult<()>> + Send,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<PersistCommand<T>>();

        tokio::spawn(async move {
            debug!(store = label, "Persistence writer started");

            while let Some(command) = rx.recv().await {
                match command {
                    PersistCommand::Save(snapshot) => {
                        if let Err(e) = save(snapshot).await {
                            warn!(store = label, error = %e, "Failed to persist; keeping in-memory state");
                        }
                    }
                    PersistCommand::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }

            debug!(store = label, "Persistence writer stopped");
        });

        Persister { tx: Some(tx) }
    }

    /// A persister that drops every snapshot.
    pub fn disabled() -> Self {
        Persister { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queues `snapshot` for writing.
    pub fn save(&self, snapshot: T) {
        if let Some(tx) = &self.tx {
            if tx.send(PersistCommand::Save(snapshot)).is_err() {
                warn!("Persistence writer is gone; change not saved");
            }
        }
    }

    /// Waits until every snapshot queued so far has been handled.
    pub async fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        if tx.send(PersistCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosynth_db::DbError;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_saves_in_order_and_flushes() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let sink = written.clone();

        let persister = Persister::spawn("test", move |value: u32| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(value);
                Ok(())
            }
        });

        for value in 1..=5 {
            persister.save(value);
        }
        persister.flush().await;

        assert_eq!(*written.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_writer() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let sink = written.clone();

        let persister = Persister::spawn("test", move |value: u32| {
            let sink = sink.clone();
            async move {
                if value == 2 {
                    return Err(DbError::Internal("disk full".into()));
                }
                sink.lock().unwrap().push(value);
                Ok(())
            }
        });

        persister.save(1);
        persister.save(2);
        persister.save(3);
        persister.flush().await;

        assert_eq!(*written.lock().unwrap(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let persister = Persister::<u32>::disabled();
        assert!(!persister.is_enabled());
        persister.save(1);
        persister.flush().await;
    }
}
