//! Contains the session controller: the [`Client`] and the [`ClientBuilder`] used to configure it.

use super::{
    CommandSource, Console, Report,
    chancomms::completion_channel,
    controlchan::{CommandDispatcher, ResponseListener, listener::reply_stream},
    datachan::DataChannel,
    session::{Session, control_sink},
};
use crate::options;

use slog::Drain;
use std::{io, path::PathBuf, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::net::TcpStream;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The server closed the session with a `221` reply.
    Closed,
    /// The control connection failed or the server reported a condition that makes it unusable.
    ControlChannelFailed,
    /// The interactive input could not be read any further.
    InputFailed,
}

impl SessionEnd {
    /// The process exit status that goes with this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            SessionEnd::Closed => 0,
            SessionEnd::ControlChannelFailed | SessionEnd::InputFailed => 1,
        }
    }
}

/// The error returned when the control connection could not be established.
#[derive(Error, Debug)]
#[error("{report}")]
pub struct ConnectError {
    report: Report,
    #[source]
    source: io::Error,
}

impl ConnectError {
    /// The report to show the user.
    pub fn report(&self) -> &Report {
        &self.report
    }
}

/// Used to configure a [`Client`] before connecting it.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use unftp_client::Client;
///
/// let builder = Client::builder("127.0.0.1")
///     .port(2121)
///     .data_connect_timeout(Duration::from_secs(5))
///     .download_dir("/tmp");
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    host: String,
    port: u16,
    connect_timeout: Duration,
    data_connect_timeout: Duration,
    max_command_len: usize,
    prompt: String,
    download_dir: PathBuf,
    logger: slog::Logger,
}

impl ClientBuilder {
    /// Creates a builder for a session with the given server. The other parameters are set to the
    /// defaults in [`options`](crate::options).
    pub fn new(host: impl Into<String>) -> Self {
        ClientBuilder {
            host: host.into(),
            port: options::DEFAULT_PORT,
            connect_timeout: options::DEFAULT_CONNECT_TIMEOUT,
            data_connect_timeout: options::DEFAULT_DATA_CONNECT_TIMEOUT,
            max_command_len: options::DEFAULT_MAX_COMMAND_LEN,
            prompt: options::DEFAULT_PROMPT.to_string(),
            download_dir: PathBuf::from("."),
            logger: slog::Logger::root(slog_stdlog::StdLog.fuse(), slog::o!()),
        }
    }

    /// Sets the control connection port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets how long to wait for the control connection to be established.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets how long to wait for a passive mode data connection to be established.
    pub fn data_connect_timeout(mut self, timeout: Duration) -> Self {
        self.data_connect_timeout = timeout;
        self
    }

    /// Sets the maximum length, in characters, of an interactive line.
    pub fn max_command_len(mut self, len: usize) -> Self {
        self.max_command_len = len;
        self
    }

    /// Sets the prompt shown before every interactive read.
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Sets the directory downloaded files are written to. Defaults to the current directory. A
    /// `get` with an absolute name writes to that path instead.
    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Sets the structured logger. By default records go to the `log` crate.
    ///
    /// # Example
    ///
    /// ```rust
    /// use unftp_client::Client;
    ///
    /// let builder = Client::builder("127.0.0.1").logger(slog::Logger::root(slog::Discard, slog::o!()));
    /// ```
    pub fn logger(mut self, logger: slog::Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Opens the control connection.
    pub async fn connect(self) -> Result<Client, ConnectError> {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        let result = match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out connecting control channel")),
        };
        match result {
            Ok(stream) => {
                slog::info!(self.logger, "Control connection established"; "host" => &self.host, "port" => self.port);
                Ok(Client { config: self, stream })
            }
            Err(source) => {
                slog::warn!(self.logger, "Could not open control connection: {}", source; "host" => &self.host, "port" => self.port);
                Err(ConnectError {
                    report: Report::ControlConnectionFailed {
                        host: self.host,
                        port: self.port,
                    },
                    source,
                })
            }
        }
    }
}

/// A connected FTP client session.
///
/// Running it starts the response listener on its own task and the command dispatcher on the
/// current one. The session ends when either of them is done.
#[derive(Debug)]
pub struct Client {
    config: ClientBuilder,
    stream: TcpStream,
}

impl Client {
    /// Starts configuring a client for the given server.
    pub fn builder(host: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(host)
    }

    /// Runs the interactive session to its end: waits for the greeting, then serves commands from
    /// `input`. Everything meant for the user goes to `console`.
    pub async fn run<S>(self, input: &mut S, console: Arc<dyn Console>) -> SessionEnd
    where
        S: CommandSource + ?Sized,
    {
        let Client { config, stream } = self;
        let logger = config.logger.new(slog::o!("host" => config.host.clone(), "port" => config.port));

        let (read_half, write_half) = stream.into_split();
        let session = Session::new(control_sink(write_half), logger.new(slog::o!("task" => "session"))).into_shared();
        let (completion_tx, completion_rx) = completion_channel();

        let listener = ResponseListener {
            replies: reply_stream(read_half),
            session: session.clone(),
            completions: completion_tx,
            data_chan: DataChannel::new(config.data_connect_timeout, logger.new(slog::o!("task" => "datachan"))),
            console: console.clone(),
            download_dir: config.download_dir.clone(),
            logger: logger.new(slog::o!("task" => "listener")),
        };
        let dispatcher = CommandDispatcher {
            session: session.clone(),
            completions: completion_rx,
            console,
            prompt: config.prompt.clone(),
            max_command_len: config.max_command_len,
            logger: logger.new(slog::o!("task" => "dispatcher")),
        };

        let mut listener_task = tokio::spawn(listener.run());
        let end = tokio::select! {
            joined = &mut listener_task => match joined {
                Ok(end) => end,
                Err(err) => {
                    slog::error!(logger, "Response listener died: {}", err);
                    SessionEnd::ControlChannelFailed
                }
            },
            end = dispatcher.run(input) => end,
        };
        listener_task.abort();
        session.lock().await.shut_down().await;

        slog::info!(logger, "Session ended"; "end" => ?end);
        end
    }
}
