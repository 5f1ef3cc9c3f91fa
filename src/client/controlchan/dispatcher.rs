//! The command dispatcher: reads interactive lines, turns them into wire commands and sends them one
//! at a time, waiting for the response listener to release each before going on.

use super::{
    Command, ControlChanError, UserCommand,
    line_parser::{self, Input},
};
use crate::client::{
    CommandSource, Console, Report, SessionEnd,
    chancomms::{CompletionReceiver, WaitInterrupted},
    session::{SessionState, SharedSession, TransferTarget},
};

use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
enum DispatchError {
    #[error("could not send command")]
    ControlChan(#[from] ControlChanError),
    #[error(transparent)]
    Interrupted(#[from] WaitInterrupted),
}

pub struct CommandDispatcher {
    pub session: SharedSession,
    pub completions: CompletionReceiver,
    pub console: Arc<dyn Console>,
    pub prompt: String,
    pub max_command_len: usize,
    pub logger: slog::Logger,
}

impl CommandDispatcher {
    /// Waits for the greeting, then serves interactive commands until the input ends or the control
    /// connection fails.
    pub async fn run<S>(mut self, input: &mut S) -> SessionEnd
    where
        S: CommandSource + ?Sized,
    {
        match self.completions.wait().await {
            Ok(greeting) => {
                slog::debug!(self.logger, "Greeting received"; "code" => greeting.code);
            }
            Err(err) => self.interrupted(err).await,
        }
        self.session.lock().await.state = SessionState::Idle;

        loop {
            let line = match input.read_command(&self.prompt).await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    slog::info!(self.logger, "End of interactive input");
                    self.console.print(&Report::InputError.to_string());
                    return SessionEnd::InputFailed;
                }
                Err(err) => {
                    slog::warn!(self.logger, "Error reading interactive input: {}", err);
                    self.console.print(&Report::InputError.to_string());
                    return SessionEnd::InputFailed;
                }
            };

            let cmd = match line_parser::parse(&line, self.max_command_len) {
                Ok(Input::Command(cmd)) => cmd,
                Ok(Input::Blank) | Ok(Input::Comment) => continue,
                Err(err) => {
                    slog::debug!(self.logger, "Rejected interactive line"; "kind" => %err.kind());
                    self.console.print(&err.report().to_string());
                    continue;
                }
            };

            match self.execute(cmd).await {
                Ok(()) => {}
                Err(DispatchError::Interrupted(err)) => self.interrupted(err).await,
                Err(DispatchError::ControlChan(err)) => {
                    slog::warn!(self.logger, "{}", err);
                    if self.session.lock().await.shut_down().await {
                        self.console.print(&Report::ControlConnectionIo.to_string());
                    }
                    return SessionEnd::ControlChannelFailed;
                }
            }
        }
    }

    // A wait ends early when the listener is gone. If it closed the session on its way out the
    // outcome is the listener's to tell, so we park until the controller picks it up.
    async fn interrupted(&self, err: WaitInterrupted) {
        if self.session.lock().await.is_closed() {
            slog::debug!(self.logger, "Session closed while waiting for a reply");
            std::future::pending::<()>().await;
        }
        self.console.print(&Report::ProcessingError(err.to_string()).to_string());
    }

    async fn execute(&mut self, cmd: UserCommand) -> Result<(), DispatchError> {
        let name = cmd.friendly_name();
        match cmd {
            UserCommand::User { username } => self.transact(Command::with_argument(name, "USER", username)).await,
            UserCommand::Pw { password } => self.transact(Command::with_argument(name, "PASS", password)).await,
            UserCommand::Quit => self.transact(Command::new(name, "QUIT")).await,
            UserCommand::Features => self.transact(Command::new(name, "FEAT")).await,
            UserCommand::Cd { path } => self.transact(Command::with_argument(name, "CWD", path)).await,
            UserCommand::Get { name: file } => {
                self.transact(Command::new(name, "PASV")).await?;
                self.transact(Command::with_argument(name, "TYPE", "I")).await?;
                if self.prepare_transfer(TransferTarget::File(file.clone())).await {
                    self.transact(Command::with_argument(name, "RETR", file)).await
                } else {
                    self.skip_transfer("RETR").await;
                    Ok(())
                }
            }
            UserCommand::Dir => {
                self.transact(Command::new(name, "PASV")).await?;
                if self.prepare_transfer(TransferTarget::Listing).await {
                    self.transact(Command::new(name, "LIST")).await
                } else {
                    self.skip_transfer("LIST").await;
                    Ok(())
                }
            }
        }
    }

    // Echoes and sends a single command, then blocks until the listener releases it.
    async fn transact(&mut self, command: Command) -> Result<(), DispatchError> {
        self.console.print(&format!("--> {}", command));
        self.session.lock().await.send(&command).await?;
        let completion = self.completions.wait().await?;
        slog::debug!(self.logger, "Command completed"; "verb" => command.verb(), "code" => completion.code);

        let mut session = self.session.lock().await;
        if session.state == SessionState::Sent {
            session.state = SessionState::Idle;
        }
        Ok(())
    }

    // Records the transfer target and tells if the data channel is there to use it.
    async fn prepare_transfer(&self, target: TransferTarget) -> bool {
        let mut session = self.session.lock().await;
        session.transfer_target = target;
        session.data_connected
    }

    async fn skip_transfer(&self, verb: &str) {
        let mut session = self.session.lock().await;
        slog::debug!(self.logger, "No data channel, not sending transfer command"; "verb" => verb, "reported" => session.last_failure_reported);
        session.transfer_target = TransferTarget::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        chancomms::{Completion, CompletionSender, completion_channel},
        session::{Session, control_sink},
        testing::{CapturingConsole, ScriptedSource},
    };
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream, Lines};

    fn dispatcher() -> (CommandDispatcher, CompletionSender, Lines<BufReader<DuplexStream>>, Arc<CapturingConsole>) {
        let logger = slog::Logger::root(slog::Discard, slog::o!());
        let (ours, theirs) = tokio::io::duplex(4096);
        let (tx, rx) = completion_channel();
        let console = Arc::new(CapturingConsole::default());
        let dispatcher = CommandDispatcher {
            session: Session::new(control_sink(ours), logger.clone()).into_shared(),
            completions: rx,
            console: console.clone(),
            prompt: "csftp> ".into(),
            max_command_len: 255,
            logger,
        };
        (dispatcher, tx, BufReader::new(theirs).lines(), console)
    }

    #[tokio::test]
    async fn invalid_lines_send_nothing() {
        let (dispatcher, tx, mut server, console) = dispatcher();
        tx.release(Completion { code: 220 }).unwrap();
        let mut input = ScriptedSource::new(["get", "get a b", "", "   \t ", "# get readme.txt", "put readme.txt", "USER dolores"]);

        assert_eq!(dispatcher.run(&mut input).await, SessionEnd::InputFailed);
        assert_eq!(input.prompts, 8);
        assert_eq!(
            console.lines(),
            vec![
                "0x002 Incorrect number of arguments.",
                "0x002 Incorrect number of arguments.",
                "0x001 Invalid command.",
                "0x001 Invalid command.",
                "0xFFFE Input error while reading commands, terminating.",
            ]
        );
        // The dispatcher and with it the write half are gone: nothing was ever written.
        assert_eq!(server.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn overlong_line_is_an_argument_count_error() {
        let (dispatcher, tx, _server, console) = dispatcher();
        tx.release(Completion { code: 220 }).unwrap();
        let long = format!("cd {}", "x".repeat(300));
        let mut input = ScriptedSource::new([long.as_str()]);

        dispatcher.run(&mut input).await;
        assert_eq!(console.lines()[0], "0x002 Incorrect number of arguments.");
    }

    #[tokio::test]
    async fn commands_translate_to_verbs() {
        let (dispatcher, tx, mut server, console) = dispatcher();
        tx.release(Completion { code: 220 }).unwrap();
        let session = dispatcher.session.clone();
        let mut input = ScriptedSource::new(["user dolores", "pw secret", "cd /pub", "features", "quit"]);

        let run = tokio::spawn(async move { dispatcher.run(&mut input).await });
        for expected in ["USER dolores", "PASS secret", "CWD /pub", "FEAT", "QUIT"] {
            assert_eq!(server.next_line().await.unwrap().as_deref(), Some(expected));
            assert_eq!(session.lock().await.state, SessionState::Sent);
            tx.release(Completion { code: 200 }).unwrap();
        }
        assert_eq!(run.await.unwrap(), SessionEnd::InputFailed);
        assert_eq!(
            console.lines()[..5].to_vec(),
            vec!["--> USER dolores", "--> PASS secret", "--> CWD /pub", "--> FEAT", "--> QUIT"]
        );
    }

    #[tokio::test]
    async fn get_without_data_channel_skips_retr() {
        let (dispatcher, tx, mut server, _console) = dispatcher();
        tx.release(Completion { code: 220 }).unwrap();
        let mut input = ScriptedSource::new(["get readme.txt", "dir"]);

        let run = tokio::spawn(async move { dispatcher.run(&mut input).await });
        for expected in ["PASV", "TYPE I", "PASV"] {
            assert_eq!(server.next_line().await.unwrap().as_deref(), Some(expected));
            tx.release(Completion { code: 200 }).unwrap();
        }
        assert_eq!(run.await.unwrap(), SessionEnd::InputFailed);
        assert_eq!(server.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn get_with_data_channel_sends_retr() {
        let (dispatcher, tx, mut server, _console) = dispatcher();
        tx.release(Completion { code: 220 }).unwrap();
        let session = dispatcher.session.clone();
        let mut input = ScriptedSource::new(["get readme.txt"]);

        let run = tokio::spawn(async move { dispatcher.run(&mut input).await });
        assert_eq!(server.next_line().await.unwrap().as_deref(), Some("PASV"));
        session.lock().await.data_connected = true;
        tx.release(Completion { code: 227 }).unwrap();
        assert_eq!(server.next_line().await.unwrap().as_deref(), Some("TYPE I"));
        tx.release(Completion { code: 200 }).unwrap();
        assert_eq!(server.next_line().await.unwrap().as_deref(), Some("RETR readme.txt"));
        assert_eq!(session.lock().await.transfer_target, TransferTarget::File("readme.txt".into()));
        tx.release(Completion { code: 226 }).unwrap();
        assert_eq!(run.await.unwrap(), SessionEnd::InputFailed);
    }

    #[tokio::test]
    async fn interrupted_wait_is_reported() {
        let (dispatcher, tx, _server, console) = dispatcher();
        drop(tx);
        let mut input = ScriptedSource::new([]);

        assert_eq!(dispatcher.run(&mut input).await, SessionEnd::InputFailed);
        assert_eq!(
            console.lines(),
            vec![
                "0xFFFF Processing error. wait for reply interrupted, response listener is gone.",
                "0xFFFE Input error while reading commands, terminating.",
            ]
        );
    }

    #[tokio::test]
    async fn interrupted_wait_on_closed_session_is_silent() {
        let (dispatcher, tx, _server, console) = dispatcher();
        dispatcher.session.lock().await.shut_down().await;
        drop(tx);
        let mut input = ScriptedSource::new([]);

        let parked = tokio::time::timeout(std::time::Duration::from_millis(200), dispatcher.run(&mut input)).await;
        assert!(parked.is_err());
        assert_eq!(console.lines(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn send_on_closed_connection_fails_the_session() {
        let (dispatcher, tx, _server, console) = dispatcher();
        tx.release(Completion { code: 220 }).unwrap();
        dispatcher.session.lock().await.shut_down().await;
        let mut input = ScriptedSource::new(["features"]);

        assert_eq!(dispatcher.run(&mut input).await, SessionEnd::ControlChannelFailed);
        assert_eq!(console.lines(), vec!["--> FEAT"]);
    }
}
