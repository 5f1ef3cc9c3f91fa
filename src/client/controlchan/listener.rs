//! The response listener: reads reply lines from the control connection, acts on them and releases
//! the command dispatcher once a reply completes the pending command.

use super::{ControlCodec, Directive, Reply, classify};
use crate::client::{
    Console, Report, SessionEnd,
    chancomms::{Completion, CompletionSender, Released},
    datachan::{DataChannel, DataEndpoint},
    session::{SharedSession, TransferTarget},
};

use futures_util::StreamExt;
use std::{path::PathBuf, sync::Arc};
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

/// The read half of the control connection.
pub type ReplyStream = FramedRead<Box<dyn AsyncRead + Send + Unpin>, ControlCodec>;

/// Frames the read half of the control connection.
pub fn reply_stream<R>(reader: R) -> ReplyStream
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let reader: Box<dyn AsyncRead + Send + Unpin> = Box::new(reader);
    FramedRead::new(reader, ControlCodec::new())
}

pub struct ResponseListener {
    pub replies: ReplyStream,
    pub session: SharedSession,
    pub completions: CompletionSender,
    pub data_chan: DataChannel,
    pub console: Arc<dyn Console>,
    pub download_dir: PathBuf,
    pub logger: slog::Logger,
}

impl ResponseListener {
    /// Processes reply lines one at a time, in arrival order, until the session ends.
    pub async fn run(mut self) -> SessionEnd {
        loop {
            let line = match self.replies.next().await {
                Some(Ok(line)) => line,
                Some(Err(err)) => {
                    slog::warn!(self.logger, "Error reading from control connection: {}", err);
                    return self.fail().await;
                }
                None => {
                    slog::warn!(self.logger, "Control connection closed by server");
                    return self.fail().await;
                }
            };
            self.console.print(&format!("<-- {}", line));

            let Some((reply, directive)) = classify(&line) else {
                slog::trace!(self.logger, "Ignoring unclassified line"; "line" => &line);
                continue;
            };
            slog::debug!(self.logger, "Received reply"; "code" => reply.code(), "directive" => ?directive);

            match directive {
                Directive::Terminate => {
                    self.data_chan.close().await;
                    self.session.lock().await.shut_down().await;
                    slog::info!(self.logger, "Server closed the session");
                    return SessionEnd::Closed;
                }
                Directive::RunTransferThenDeferSignal => self.run_transfer().await,
                Directive::OpenDataChannel(endpoint) => {
                    self.open_data_channel(endpoint).await;
                    self.release(&reply);
                }
                Directive::Abort => {
                    slog::warn!(self.logger, "Server reported a fatal condition"; "code" => reply.code());
                    return self.fail().await;
                }
                Directive::Signal => {
                    self.discard_unused_data_channel().await;
                    self.release(&reply);
                }
            }
        }
    }

    // Runs the transfer for the pending verb. The release is left to the reply that follows.
    async fn run_transfer(&mut self) {
        let (verb, target) = {
            let session = self.session.lock().await;
            (session.pending_verb.clone(), session.transfer_target.clone())
        };
        let result = match (verb.as_deref(), &target) {
            (Some("LIST"), _) => self.data_chan.run_listing(self.console.as_ref()).await.map(drop),
            (Some("RETR"), TransferTarget::File(name)) => self.data_chan.run_download(&self.download_dir, name).await.map(drop),
            _ => {
                slog::debug!(self.logger, "No transfer to run"; "verb" => ?verb, "target" => %target);
                Ok(())
            }
        };
        if let Err(err) = result {
            slog::warn!(self.logger, "Transfer failed: {}", err; "target" => %target);
            self.report_data_failure(err.report()).await;
        }

        self.data_chan.close().await;
        let mut session = self.session.lock().await;
        session.transfer_target = TransferTarget::default();
        session.data_connected = false;
    }

    async fn open_data_channel(&mut self, endpoint: Option<DataEndpoint>) {
        let connected = match endpoint {
            Some(endpoint) => match self.data_chan.connect(&endpoint).await {
                Ok(()) => true,
                Err(err) => {
                    slog::warn!(self.logger, "{}", err);
                    self.report_data_failure(err.report()).await;
                    false
                }
            },
            None => {
                self.data_chan.close().await;
                self.report_data_failure(Report::DataConnectionUnavailable).await;
                false
            }
        };
        self.session.lock().await.data_connected = connected;
    }

    // A transfer command that completes without a 150 never used its data connection.
    async fn discard_unused_data_channel(&mut self) {
        let mut session = self.session.lock().await;
        if session.transfer_pending() && self.data_chan.is_connected() {
            slog::debug!(self.logger, "Closing unused data channel"; "target" => %session.transfer_target);
            self.data_chan.close().await;
            session.transfer_target = TransferTarget::default();
            session.data_connected = false;
        }
    }

    async fn report_data_failure(&mut self, report: Report) {
        self.console.print(&report.to_string());
        self.session.lock().await.last_failure_reported = true;
    }

    fn release(&self, reply: &Reply) {
        match self.completions.release(Completion { code: reply.code() }) {
            Ok(Released::Delivered) => {}
            Ok(Released::AlreadyPending) => {
                slog::debug!(self.logger, "Release already pending"; "code" => reply.code());
            }
            Err(err) => {
                slog::debug!(self.logger, "{}", err; "code" => reply.code());
            }
        }
    }

    async fn fail(&mut self) -> SessionEnd {
        self.data_chan.close().await;
        if self.session.lock().await.shut_down().await {
            self.console.print(&Report::ControlConnectionIo.to_string());
        }
        SessionEnd::ControlChannelFailed
    }
}
