//! # Toast Notifier
//!
//! Single-slot transient notifications with a visible phase and an exit
//! phase.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  notify("Added 2x KLOW to Requisition")                                 │
//! │       │                                                                 │
//! │       ├── abort previous timer task (if any)                            │
//! │       ▼                                                                 │
//! │  Some(Toast { phase: Visible })                                         │
//! │       │  sleep(display)                                                 │
//! │       ▼                                                                 │
//! │  Some(Toast { phase: Exiting })                                         │
//! │       │  sleep(exit)                                                    │
//! │       ▼                                                                 │
//! │  None                                                                   │
//! │                                                                         │
//! │  A newer notify() supersedes the whole chain; the aborted task never   │
//! │  touches the slot again, and each step also checks the toast id.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastPhase {
    Visible,
    Exiting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub phase: ToastPhase,
}

/// Owns the toast slot and its timer.
#[derive(Debug)]
pub struct Notifier {
    slot: Arc<watch::Sender<Option<Toast>>>,
    timer: Option<JoinHandle<()>>,
    next_id: u64,
    display: Duration,
    exit: Duration,
}

impl Notifier {
    pub fn new(display: Duration, exit: Duration) -> Self {
        Notifier {
            slot: Arc::new(watch::Sender::new(None)),
            timer: None,
            next_id: 1,
            display,
            exit,
        }
    }

    /// Shows `message`, replacing any current toast and its timers.
    ///
    /// Must be called inside a tokio runtime.
    pub fn notify(&mut self, message: impl Into<String>) -> u64 {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let id = self.next_id;
        self.next_id += 1;

        let message = message.into();
        debug!(toast_id = id, message = %message, "Toast shown");

        self.slot.send_replace(Some(Toast {
            id,
            message,
            phase: ToastPhase::Visible,
        }));

        let slot = Arc::clone(&self.slot);
        let (display, exit) = (self.display, self.exit);
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(display).await;
            slot.send_if_modified(|current| match current {
                Some(toast) if toast.id == id => {
                    toast.phase = ToastPhase::Exiting;
                    true
                }
                _ => false,
            });

            tokio::time::sleep(exit).await;
            slot.send_if_modified(|current| {
                if current.as_ref().is_some_and(|toast| toast.id == id) {
                    *current = None;
                    true
                } else {
                    false
                }
            });
        }));

        id
    }

    /// Removes the current toast immediately.
    pub fn dismiss(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.slot.send_replace(None);
    }

    pub fn current(&self) -> Option<Toast> {
        self.slot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.slot.subscribe()
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> Notifier {
        Notifier::new(Duration::from_millis(4000), Duration::from_millis(500))
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_visible_then_exiting_then_gone() {
        let mut toasts = notifier();
        toasts.notify("Added 1x KLOW to Requisition");

        assert_eq!(toasts.current().unwrap().phase, ToastPhase::Visible);

        advance(3999).await;
        assert_eq!(toasts.current().unwrap().phase, ToastPhase::Visible);

        advance(2).await;
        assert_eq!(toasts.current().unwrap().phase, ToastPhase::Exiting);

        advance(500).await;
        assert_eq!(toasts.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_toast_supersedes_old_timers() {
        let mut toasts = notifier();
        toasts.notify("first");

        advance(3000).await;
        let second = toasts.notify("second");

        // the first toast's exit time passes without touching the second
        advance(1500).await;
        let current = toasts.current().unwrap();
        assert_eq!(current.id, second);
        assert_eq!(current.message, "second");
        assert_eq!(current.phase, ToastPhase::Visible);

        advance(4000).await;
        assert_eq!(toasts.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss() {
        let mut toasts = notifier();
        let mut rx = toasts.subscribe();

        toasts.notify("CoA Download Started");
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        toasts.dismiss();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), None);

        advance(10_000).await;
        assert!(!rx.has_changed().unwrap());
    }
}
