//! Contains the [`Client`] that is used to configure and run an interactive FTP session, and the
//! pieces it is built from.

mod chancomms;
mod console;
mod controlchan;
mod datachan;
mod ftpclient;
mod report;
mod session;
#[cfg(test)]
mod testing;

pub use console::{CommandSource, Console, StdioCommandSource, StdoutConsole};
pub use controlchan::{Directive, Reply, classify};
pub use datachan::DataEndpoint;
pub use ftpclient::{Client, ClientBuilder, ConnectError, SessionEnd};
pub use report::Report;
