//! Contains code pertaining to the communication between the response listener and the command
//! dispatcher.

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Sent by the response listener once a reply line completes the command that is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// The reply code of the line that completed the command
    pub code: u16,
}

/// What happened to a release handed to [`CompletionSender::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Released {
    /// The release now sits in the slot.
    Delivered,
    /// The slot already held a release that the dispatcher has not observed yet. The two fold into one.
    AlreadyPending,
}

/// The dispatcher side of the channel went away.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("command dispatcher is gone")]
pub struct DispatcherGone;

/// Waiting for a completion was interrupted because the listener side went away.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("wait for reply interrupted, response listener is gone")]
pub struct WaitInterrupted;

/// Creates the single-slot handoff shared by the listener and the dispatcher. A release sent before
/// the dispatcher starts waiting stays in the slot until it does.
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (CompletionSender { tx }, CompletionReceiver { rx })
}

/// Held by the response listener.
#[derive(Debug, Clone)]
pub struct CompletionSender {
    tx: mpsc::Sender<Completion>,
}

impl CompletionSender {
    /// Releases the dispatcher. Never blocks the listener.
    pub fn release(&self, completion: Completion) -> Result<Released, DispatcherGone> {
        match self.tx.try_send(completion) {
            Ok(()) => Ok(Released::Delivered),
            Err(TrySendError::Full(_)) => Ok(Released::AlreadyPending),
            Err(TrySendError::Closed(_)) => Err(DispatcherGone),
        }
    }
}

/// Held by the command dispatcher.
#[derive(Debug)]
pub struct CompletionReceiver {
    rx: mpsc::Receiver<Completion>,
}

impl CompletionReceiver {
    /// Suspends until the listener releases the pending command.
    pub async fn wait(&mut self) -> Result<Completion, WaitInterrupted> {
        self.rx.recv().await.ok_or(WaitInterrupted)
    }

    #[cfg(test)]
    pub fn try_take(&mut self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }
}
