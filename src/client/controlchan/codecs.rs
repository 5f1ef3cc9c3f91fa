use super::{command::Command, error::ControlChanError};

use bytes::BytesMut;
use std::io::Write;
use tokio_util::codec::{Decoder, Encoder};

// ControlCodec implements tokio's `Decoder` and `Encoder` traits for the control channel, that we'll
// use to decode reply lines from the server and encode our commands.
#[derive(Debug, Default)]
pub struct ControlCodec {
    // Stored index of the next index to examine for a '\n' character. This is used to optimize
    // searching. For example, if `decode` was called with `abc`, it would hold `3`, because that
    // is the next index to examine. The next time `decode` is called with `abcde\n`, we will only
    // look at `de\n` before returning.
    next_index: usize,
}

impl ControlCodec {
    pub fn new() -> Self {
        ControlCodec { next_index: 0 }
    }
}

impl Decoder for ControlCodec {
    type Item = String;
    type Error = ControlChanError;

    // Splits on newlines. The line is handed over as is, minus its line ending: deciding whether
    // it means anything is up to the classifier.
    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        if let Some(newline_offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let newline_index = newline_offset + self.next_index;
            let line = buf.split_to(newline_index + 1);
            self.next_index = 0;
            Ok(Some(to_line(&line)))
        } else {
            self.next_index = buf.len();
            Ok(None)
        }
    }

    // A server may close the connection right after a last line without a line ending.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        match self.decode(buf)? {
            Some(line) => Ok(Some(line)),
            None if buf.is_empty() => Ok(None),
            None => {
                let line = buf.split_to(buf.len());
                self.next_index = 0;
                Ok(Some(to_line(&line)))
            }
        }
    }
}

impl Encoder<Command> for ControlCodec {
    type Error = ControlChanError;

    fn encode(&mut self, command: Command, buf: &mut BytesMut) -> Result<(), Self::Error> {
        let mut buffer = vec![];
        write!(buffer, "{}\r\n", command)?;
        buf.extend(&buffer);
        Ok(())
    }
}

fn to_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    while end > 0 && (raw[end - 1] == b'\n' || raw[end - 1] == b'\r') {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
