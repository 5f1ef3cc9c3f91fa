//! unftp-client is an interactive, async FTP client built on [tokio](https://tokio.rs).
//!
//! A user types friendly commands (`user`, `pw`, `dir`, `get`, ...) at a prompt. The client turns
//! them into FTP verbs on a persistent control connection and lets the server's replies drive what
//! happens next: opening a passive mode data connection, streaming a directory listing or a file
//! over it, or ending the session.
//!
//! Two tasks cooperate for the lifetime of a session. The *command dispatcher* reads user input and
//! sends at most one command at a time. The *response listener* reads reply lines, acts on them and
//! releases the dispatcher once a reply completes the pending command.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use unftp_client::{Client, Console, StdioCommandSource, StdoutConsole};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::builder("ftp.example.com").port(21).connect().await.unwrap();
//!     let console: Arc<dyn Console> = Arc::new(StdoutConsole);
//!     let end = client.run(&mut StdioCommandSource::new(), console).await;
//!     std::process::exit(end.exit_code());
//! }
//! ```

pub mod client;
pub mod options;

pub use crate::client::{
    Client,
    ClientBuilder,
    CommandSource,
    ConnectError,
    Console,
    DataEndpoint,
    Directive,
    Reply,
    Report,
    SessionEnd,
    StdioCommandSource,
    StdoutConsole,
    classify,
};
