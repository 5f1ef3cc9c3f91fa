//! Contains code pertaining to the FTP *data* channel

use super::{Console, Report};

use lazy_static::lazy_static;
use regex::Regex;
use std::{fmt, io, path::Path, time::Duration};
use thiserror::Error;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
};

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// The address a server advertises in its passive mode (`227`) reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEndpoint {
    /// Dotted IPv4 address, e.g. `127.0.0.1`
    pub host: String,
    /// The port, computed as `p1 * 256 + p2`
    pub port: u16,
}

impl DataEndpoint {
    /// Extracts the endpoint from the text of a passive mode reply, i.e. the first six comma
    /// separated numbers `h1,h2,h3,h4,p1,p2`. Returns `None` if there are no such numbers or one of
    /// them does not fit in a byte.
    pub fn from_pasv_reply(text: &str) -> Option<DataEndpoint> {
        lazy_static! {
            static ref RE_PASSIVE_ADDRESS: Regex = Regex::new(r"(\d+),(\d+),(\d+),(\d+),(\d+),(\d+)").unwrap();
        }
        let captures = RE_PASSIVE_ADDRESS.captures(text)?;
        let mut numbers = [0u8; 6];
        for (i, number) in numbers.iter_mut().enumerate() {
            *number = captures.get(i + 1)?.as_str().parse().ok()?;
        }
        let [h1, h2, h3, h4, p1, p2] = numbers;
        Some(DataEndpoint {
            host: format!("{}.{}.{}.{}", h1, h2, h3, h4),
            port: u16::from(p1) * 256 + u16::from(p2),
        })
    }
}

impl fmt::Display for DataEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Errors that abandon the current transfer but leave the session running.
#[derive(Error, Debug)]
pub enum DataChanError {
    /// Connecting to the advertised endpoint failed.
    #[error("could not connect data channel to {endpoint}")]
    ConnectFailed {
        endpoint: DataEndpoint,
        #[source]
        source: io::Error,
    },
    /// Connecting to the advertised endpoint took too long.
    #[error("timed out connecting data channel to {endpoint}")]
    ConnectTimeout { endpoint: DataEndpoint },
    /// A transfer was started while no data connection was open.
    #[error("data channel is not connected")]
    NotConnected,
    /// Reading from the data connection failed.
    #[error("data channel I/O error")]
    Io(#[source] io::Error),
    /// The local file for a download could not be created or written.
    #[error("could not write local file {name}")]
    LocalFile {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl DataChanError {
    /// The report shown to the user for this error.
    pub fn report(&self) -> Report {
        match self {
            DataChanError::ConnectFailed { endpoint, .. } | DataChanError::ConnectTimeout { endpoint } => Report::DataConnectionFailed {
                host: endpoint.host.clone(),
                port: endpoint.port,
            },
            DataChanError::NotConnected | DataChanError::Io(_) => Report::DataConnectionIo,
            DataChanError::LocalFile { name, .. } => Report::AccessDenied(name.clone()),
        }
    }
}

/// The passive mode data connection. Opened once per transfer by the response listener, consumed
/// by a listing or a download, then closed.
#[derive(Debug)]
pub struct DataChannel {
    socket: Option<TcpStream>,
    connect_timeout: Duration,
    logger: slog::Logger,
}

impl DataChannel {
    pub fn new(connect_timeout: Duration, logger: slog::Logger) -> Self {
        DataChannel {
            socket: None,
            connect_timeout,
            logger,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Connects to the given endpoint. A data connection still open from before is closed first.
    #[tracing_attributes::instrument(skip(self))]
    pub async fn connect(&mut self, endpoint: &DataEndpoint) -> Result<(), DataChanError> {
        self.close().await;
        let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(socket)) => {
                slog::debug!(self.logger, "Data channel connected"; "endpoint" => %endpoint);
                self.socket = Some(socket);
                Ok(())
            }
            Ok(Err(source)) => Err(DataChanError::ConnectFailed {
                endpoint: endpoint.clone(),
                source,
            }),
            Err(_) => Err(DataChanError::ConnectTimeout { endpoint: endpoint.clone() }),
        }
    }

    /// Reads text lines until the server closes the data connection and prints each of them.
    /// Returns the number of lines.
    #[tracing_attributes::instrument(skip(self, console))]
    pub async fn run_listing(&mut self, console: &dyn Console) -> Result<usize, DataChanError> {
        let socket = self.socket.take().ok_or(DataChanError::NotConnected)?;
        let mut reader = BufReader::new(socket);
        let mut line = Vec::new();
        let mut count = 0;
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await.map_err(DataChanError::Io)? == 0 {
                break;
            }
            while matches!(line.last(), Some(b'\n') | Some(b'\r')) {
                line.pop();
            }
            console.print(&String::from_utf8_lossy(&line));
            count += 1;
        }
        slog::debug!(self.logger, "Listing received"; "lines" => count);
        Ok(count)
    }

    /// Streams the data connection into the file `name` inside `dir`, verbatim. Returns the number
    /// of bytes written. An absolute `name` is used as it is and `dir` does not apply.
    #[tracing_attributes::instrument(skip(self))]
    pub async fn run_download(&mut self, dir: &Path, name: &str) -> Result<u64, DataChanError> {
        let mut socket = self.socket.take().ok_or(DataChanError::NotConnected)?;
        let local_file = |source: io::Error| DataChanError::LocalFile { name: name.to_string(), source };

        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        let mut n = socket.read(&mut buffer).await.map_err(DataChanError::Io)?;
        let mut file = File::create(dir.join(name)).await.map_err(local_file)?;
        let mut total = 0u64;
        while n > 0 {
            file.write_all(&buffer[..n]).await.map_err(local_file)?;
            total += n as u64;
            n = socket.read(&mut buffer).await.map_err(DataChanError::Io)?;
        }
        file.flush().await.map_err(local_file)?;
        slog::debug!(self.logger, "Download complete"; "file" => name, "bytes" => total);
        Ok(total)
    }

    /// Closes the data connection if it is still open.
    pub async fn close(&mut self) {
        if let Some(mut socket) = self.socket.take()
            && let Err(err) = socket.shutdown().await
        {
            slog::debug!(self.logger, "Could not shut down data connection: {}", err);
        }
    }
}
