//! The user facing side of the client: where interactive commands come from and where output goes.

use async_trait::async_trait;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// A source of interactive command lines.
#[async_trait]
pub trait CommandSource: Send {
    /// Shows the prompt and reads the next line, without its line ending. `Ok(None)` means the
    /// input is exhausted.
    async fn read_command(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Receives every line meant for the user: protocol echoes, listings and reports.
pub trait Console: Send + Sync {
    /// Prints a single line.
    fn print(&self, line: &str);
}

/// Reads commands from standard input, prompting on standard output.
#[derive(Debug)]
pub struct StdioCommandSource {
    lines: Lines<BufReader<Stdin>>,
}

impl StdioCommandSource {
    /// Creates a source reading from the process' standard input.
    pub fn new() -> Self {
        StdioCommandSource {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdioCommandSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandSource for StdioCommandSource {
    async fn read_command(&mut self, prompt: &str) -> io::Result<Option<String>> {
        {
            let mut stdout = io::stdout().lock();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
        }
        self.lines.next_line().await
    }
}

/// Prints to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn print(&self, line: &str) {
        println!("{}", line);
    }
}
