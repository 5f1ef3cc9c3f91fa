//! The session state shared by the response listener and the command dispatcher.

use super::controlchan::{Command, ControlChanError, ControlChanErrorKind, ControlCodec};
use crate::options;

use futures_util::SinkExt;
use std::{fmt, sync::Arc};
use tokio::io::AsyncWrite;
use tokio_util::codec::FramedWrite;

/// The write half of the control connection.
pub type ControlSink = FramedWrite<Box<dyn AsyncWrite + Send + Unpin>, ControlCodec>;

/// Frames the write half of the control connection.
pub fn control_sink<W>(writer: W) -> ControlSink
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    let writer: Box<dyn AsyncWrite + Send + Unpin> = Box::new(writer);
    FramedWrite::new(writer, ControlCodec::new())
}

/// The session as handed to both tasks. All mutation happens under this lock.
pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingGreeting,
    Idle,
    Sent,
    Closed,
}

/// What a `150` streams the data connection into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferTarget {
    Listing,
    File(String),
}

impl Default for TransferTarget {
    fn default() -> Self {
        TransferTarget::File(options::DEFAULT_TRANSFER_TARGET.to_string())
    }
}

impl fmt::Display for TransferTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferTarget::Listing => f.write_str("listing"),
            TransferTarget::File(name) => f.write_str(name),
        }
    }
}

// This is where we keep the state for a client session.
pub struct Session {
    control: Option<ControlSink>,
    pub state: SessionState,
    // The verb of the command in flight, or of the last one sent.
    pub pending_verb: Option<String>,
    pub transfer_target: TransferTarget,
    // Set once a data channel failure has been reported for the current command.
    pub last_failure_reported: bool,
    // True between a successful passive mode connect and the end of the transfer.
    pub data_connected: bool,
    logger: slog::Logger,
}

impl Session {
    pub fn new(control: ControlSink, logger: slog::Logger) -> Self {
        Session {
            control: Some(control),
            state: SessionState::AwaitingGreeting,
            pending_verb: None,
            transfer_target: TransferTarget::default(),
            last_failure_reported: false,
            data_connected: false,
            logger,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    /// Writes the command to the control connection and makes it the pending command.
    pub async fn send(&mut self, command: &Command) -> Result<(), ControlChanError> {
        let control = self.control.as_mut().ok_or(ControlChanErrorKind::ConnectionClosed)?;
        self.pending_verb = Some(command.verb().to_string());
        self.state = SessionState::Sent;
        self.last_failure_reported = false;
        slog::debug!(self.logger, "Sending command"; "verb" => command.verb(), "friendly_name" => command.friendly_name());
        control.send(command.clone()).await
    }

    /// Tells if the pending command is one of the data transfer verbs.
    pub fn transfer_pending(&self) -> bool {
        matches!(self.pending_verb.as_deref(), Some("LIST") | Some("RETR"))
    }

    /// Closes the control connection. Returns `true` only for the call that actually closed it.
    pub async fn shut_down(&mut self) -> bool {
        self.state = SessionState::Closed;
        match self.control.take() {
            Some(mut control) => {
                if let Err(err) = control.close().await {
                    slog::debug!(self.logger, "Error closing control connection: {}", err);
                }
                true
            }
            None => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.control.is_none()
    }
}
