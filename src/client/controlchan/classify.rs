//! The response classifier. Maps a raw reply line to a [`Reply`] and the [`Directive`] the
//! response listener has to carry out for it.

use super::{Reply, ReplyCode};
use crate::client::datachan::DataEndpoint;

/// What the response listener does with a classified reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// The server closes the session (`221`). The session ends successfully; nothing is released.
    Terminate,
    /// The data connection is opening (`150`). Run the pending transfer, close the data channel and
    /// hold the release back: a later reply line reports the outcome of the transfer.
    RunTransferThenDeferSignal,
    /// The server entered passive mode (`227`). Connect the data channel to the advertised endpoint,
    /// then release. `None` if the reply carried no usable endpoint.
    OpenDataChannel(Option<DataEndpoint>),
    /// The server reported a condition that makes the control connection unusable (`421`, `425`,
    /// `426`, `450`, `451`, `452`). Close the control connection and end the session with a failure.
    Abort,
    /// Nothing to do but release the pending command.
    Signal,
}

/// Classifies one line received on the control connection.
///
/// Only lines that start with three digits followed by a space are classified. Everything else,
/// including the continuation lines of a multi-line reply, yields `None` and is ignored.
pub fn classify(line: &str) -> Option<(Reply, Directive)> {
    let code = parse_code(line)?;
    let directive = match ReplyCode::from_code(code) {
        Some(ReplyCode::ClosingControlConnection) => Directive::Terminate,
        Some(ReplyCode::FileStatusOkay) => Directive::RunTransferThenDeferSignal,
        Some(ReplyCode::EnteringPassiveMode) => Directive::OpenDataChannel(DataEndpoint::from_pasv_reply(line)),
        Some(code) if code.is_fatal() => Directive::Abort,
        _ => Directive::Signal,
    };
    Some((Reply::new(code, line), directive))
}

fn parse_code(line: &str) -> Option<u16> {
    match line.as_bytes() {
        [a, b, c, b' ', ..] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() => line[..3].parse().ok(),
        _ => None,
    }
}
