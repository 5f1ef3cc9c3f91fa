use std::fmt;

/// A reply line received from the FTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    code: u16,
    text: String,
}

impl Reply {
    /// Creates a reply from its code and the raw line it was read from.
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Reply { code, text: text.into() }
    }

    /// The three digit reply code.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The raw line as received, code included.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The reply codes (RFC 959) that make the client do more than release the pending command.
//
// Codes between 100 and 199 indicate marks; codes between 200 and 399 indicate acceptance; codes
// between 400 and 599 indicate rejection. The 4xx codes below are the ones after which we don't
// trust the control connection any longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ReplyCode {
    FileStatusOkay = 150,
    ClosingControlConnection = 221,
    EnteringPassiveMode = 227,
    ServiceNotAvailable = 421,
    CantOpenDataConnection = 425,
    ConnectionClosed = 426,
    TransientFileError = 450,
    LocalError = 451,
    OutOfSpace = 452,
}

impl ReplyCode {
    /// Looks up the reply code with special meaning to us, if any.
    pub fn from_code(code: u16) -> Option<ReplyCode> {
        let code = match code {
            150 => ReplyCode::FileStatusOkay,
            221 => ReplyCode::ClosingControlConnection,
            227 => ReplyCode::EnteringPassiveMode,
            421 => ReplyCode::ServiceNotAvailable,
            425 => ReplyCode::CantOpenDataConnection,
            426 => ReplyCode::ConnectionClosed,
            450 => ReplyCode::TransientFileError,
            451 => ReplyCode::LocalError,
            452 => ReplyCode::OutOfSpace,
            _ => return None,
        };
        Some(code)
    }

    /// Tells if this code ends the session.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            ReplyCode::ServiceNotAvailable
                | ReplyCode::CantOpenDataConnection
                | ReplyCode::ConnectionClosed
                | ReplyCode::TransientFileError
                | ReplyCode::LocalError
                | ReplyCode::OutOfSpace
        )
    }
}
