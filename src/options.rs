//! Contains the defaults that apply when a [`ClientBuilder`](crate::ClientBuilder) option is not set.

use std::time::Duration;

/// The control connection port used when none is given.
pub const DEFAULT_PORT: u16 = 21;

/// How long we wait for the control connection to be established.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// How long we wait for a passive mode data connection to be established.
pub const DEFAULT_DATA_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Interactive lines longer than this many characters are rejected.
pub const DEFAULT_MAX_COMMAND_LEN: usize = 255;

/// Shown before every interactive read.
pub const DEFAULT_PROMPT: &str = "csftp> ";

/// The transfer target a session falls back to once a transfer is over.
pub const DEFAULT_TRANSFER_TARGET: &str = "file";
