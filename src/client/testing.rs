//! Test doubles for the user facing seams.

use super::{CommandSource, Console};

use async_trait::async_trait;
use std::{collections::VecDeque, io, sync::Mutex};

#[derive(Debug, Default)]
pub struct CapturingConsole {
    lines: Mutex<Vec<String>>,
}

impl CapturingConsole {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Console for CapturingConsole {
    fn print(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

/// Hands out the scripted lines, then reports the end of input.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    lines: VecDeque<String>,
    pub prompts: usize,
}

impl ScriptedSource {
    pub fn new<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        ScriptedSource {
            lines: lines.into_iter().map(String::from).collect(),
            prompts: 0,
        }
    }
}

#[async_trait]
impl CommandSource for ScriptedSource {
    async fn read_command(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        self.prompts += 1;
        Ok(self.lines.pop_front())
    }
}
