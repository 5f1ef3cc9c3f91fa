//! Contains the [`Report`] enum: every failure the client tells its user about.

use thiserror::Error;

/// A user-visible failure report. The `Display` output is the exact line shown to the user, starting
/// with the report's hexadecimal code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The control connection could not be established.
    #[error("0xFFFC Control connection to {host} on port {port} failed to open.")]
    ControlConnectionFailed {
        /// The host we tried to reach
        host: String,
        /// The port we tried to reach
        port: u16,
    },
    /// Reading from or writing to the control connection failed, or the server told us it is
    /// going away. Always ends the session.
    #[error("0xFFFD Control connection I/O error, closing control connection.")]
    ControlConnectionIo,
    /// The interactive input could not be read. Always ends the session.
    #[error("0xFFFE Input error while reading commands, terminating.")]
    InputError,
    /// Waiting for a command to complete was interrupted.
    #[error("0xFFFF Processing error. {0}.")]
    ProcessingError(String),
    /// The user typed a command we don't know.
    #[error("0x001 Invalid command.")]
    InvalidCommand,
    /// The user typed a known command with the wrong number of arguments, or a line that is too long.
    #[error("0x002 Incorrect number of arguments.")]
    IncorrectArgumentCount,
    /// The passive mode data connection could not be established.
    #[error("0x3A2 Data transfer connection to {host} on port {port} failed to open.")]
    DataConnectionFailed {
        /// The host advertised by the server
        host: String,
        /// The port advertised by the server
        port: u16,
    },
    /// The server's passive mode reply did not contain an address we could use.
    #[error("0x3A2 Data transfer connection failed to open.")]
    DataConnectionUnavailable,
    /// Reading from the data connection failed.
    #[error("0x3A7 Data transfer connection I/O error, closing data connection.")]
    DataConnectionIo,
    /// The local file for a download could not be created or written.
    #[error("0x38E Access to local file {0} denied.")]
    AccessDenied(String),
}

impl Report {
    /// The numeric code of this report.
    pub fn code(&self) -> u16 {
        match self {
            Report::ControlConnectionFailed { .. } => 0xFFFC,
            Report::ControlConnectionIo => 0xFFFD,
            Report::InputError => 0xFFFE,
            Report::ProcessingError(_) => 0xFFFF,
            Report::InvalidCommand => 0x001,
            Report::IncorrectArgumentCount => 0x002,
            Report::DataConnectionFailed { .. } | Report::DataConnectionUnavailable => 0x3A2,
            Report::DataConnectionIo => 0x3A7,
            Report::AccessDenied(_) => 0x38E,
        }
    }
}
