//! A scripted FTP server and scripted user for exercising the client end to end.
#![allow(dead_code, missing_docs)]

use async_trait::async_trait;
use std::{
    collections::{HashMap, VecDeque},
    io,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream, tcp::OwnedWriteHalf},
    task::JoinHandle,
};
use unftp_client::{Client, CommandSource, Console, SessionEnd};

/// How the fake server behaves.
#[derive(Debug, Clone)]
pub struct Script {
    pub files: HashMap<String, Vec<u8>>,
    pub listing: Vec<String>,
    pub cwd_reply: String,
    pub hang_up_after_greeting: bool,
    pub pasv_unreachable: bool,
}

impl Default for Script {
    fn default() -> Self {
        Script {
            files: HashMap::new(),
            listing: vec![],
            cwd_reply: "250 Directory successfully changed.".to_string(),
            hang_up_after_greeting: false,
            pasv_unreachable: false,
        }
    }
}

pub struct FakeServer {
    pub port: u16,
    commands: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl FakeServer {
    /// Serves a single control connection on an ephemeral port.
    pub async fn start(script: Script) -> FakeServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let commands = Arc::new(Mutex::new(vec![]));
        let recorded = commands.clone();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            serve(stream, script, recorded).await.unwrap();
        });
        FakeServer { port, commands, handle }
    }

    /// Waits for the client to go away and returns every command line it sent.
    pub async fn finish(self) -> Vec<String> {
        tokio::time::timeout(Duration::from_secs(10), self.handle).await.unwrap().unwrap();
        self.commands.lock().unwrap().clone()
    }
}

async fn reply(w: &mut OwnedWriteHalf, text: &str) -> io::Result<()> {
    w.write_all(format!("{}\r\n", text).as_bytes()).await
}

async fn serve(stream: TcpStream, script: Script, commands: Arc<Mutex<Vec<String>>>) -> io::Result<()> {
    let (r, mut w) = stream.into_split();
    let mut lines = BufReader::new(r).lines();
    reply(&mut w, "220 Fake FTP server ready").await?;
    if script.hang_up_after_greeting {
        return Ok(());
    }

    let mut passive: Option<TcpListener> = None;
    while let Some(line) = lines.next_line().await? {
        commands.lock().unwrap().push(line.clone());
        let (verb, arg) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        match verb {
            "USER" => reply(&mut w, "331 Please specify the password.").await?,
            "PASS" => reply(&mut w, "230 Login successful.").await?,
            "FEAT" => reply(&mut w, "211-Features:\r\n MDTM\r\n PASV\r\n SIZE\r\n211 End").await?,
            "CWD" => reply(&mut w, &script.cwd_reply).await?,
            "TYPE" => reply(&mut w, "200 Switching to Binary mode.").await?,
            "PASV" => {
                let listener = TcpListener::bind("127.0.0.1:0").await?;
                let port = listener.local_addr()?.port();
                if script.pasv_unreachable {
                    drop(listener);
                } else {
                    passive = Some(listener);
                }
                let text = format!("227 Entering Passive Mode (127,0,0,1,{},{}).", port / 256, port % 256);
                reply(&mut w, &text).await?;
            }
            "RETR" => match (script.files.get(arg), passive.take()) {
                (Some(data), Some(listener)) => {
                    let (mut socket, _) = listener.accept().await?;
                    reply(&mut w, &format!("150 Opening BINARY mode data connection for {} ({} bytes).", arg, data.len())).await?;
                    socket.write_all(data).await?;
                    socket.shutdown().await?;
                    drop(socket);
                    reply(&mut w, "226 Transfer complete.").await?;
                }
                _ => reply(&mut w, "550 Failed to open file.").await?,
            },
            "LIST" => match passive.take() {
                Some(listener) => {
                    let (mut socket, _) = listener.accept().await?;
                    reply(&mut w, "150 Here comes the directory listing.").await?;
                    for entry in &script.listing {
                        socket.write_all(format!("{}\r\n", entry).as_bytes()).await?;
                    }
                    socket.shutdown().await?;
                    drop(socket);
                    reply(&mut w, "226 Directory send OK.").await?;
                }
                None => reply(&mut w, "425 Use PORT or PASV first.").await?,
            },
            "QUIT" => {
                reply(&mut w, "221 Goodbye.").await?;
                return Ok(());
            }
            _ => reply(&mut w, "502 Command not implemented.").await?,
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct CapturingConsole {
    lines: Mutex<Vec<String>>,
}

impl CapturingConsole {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn reports(&self) -> Vec<String> {
        self.lines().into_iter().filter(|line| line.starts_with("0x")).collect()
    }
}

impl Console for CapturingConsole {
    fn print(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

/// Types the scripted lines. Once they run out the input either ends or, when held open, never
/// yields again.
pub struct ScriptedUser {
    lines: VecDeque<String>,
    hold_open: bool,
}

impl ScriptedUser {
    pub fn new(lines: &[&str]) -> Self {
        ScriptedUser {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            hold_open: false,
        }
    }

    pub fn held_open(mut self) -> Self {
        self.hold_open = true;
        self
    }
}

#[async_trait]
impl CommandSource for ScriptedUser {
    async fn read_command(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        match self.lines.pop_front() {
            Some(line) => Ok(Some(line)),
            None if self.hold_open => std::future::pending().await,
            None => Ok(None),
        }
    }
}

/// Connects a client to the fake server and runs the session to its end.
pub async fn run_session(server: &FakeServer, user: &mut ScriptedUser, download_dir: &std::path::Path) -> (SessionEnd, Arc<CapturingConsole>) {
    let console = Arc::new(CapturingConsole::default());
    let client = Client::builder("127.0.0.1")
        .port(server.port)
        .download_dir(download_dir)
        .logger(slog::Logger::root(slog::Discard, slog::o!()))
        .connect()
        .await
        .unwrap();
    let end = tokio::time::timeout(Duration::from_secs(10), client.run(user, console.clone()))
        .await
        .unwrap();
    (end, console)
}
