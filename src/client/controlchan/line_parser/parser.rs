use super::error::{ParseErrorKind, Result};
use crate::client::controlchan::command::UserCommand;

/// What a line typed at the prompt turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Nothing but whitespace.
    Blank,
    /// The first word starts with `#`.
    Comment,
    /// A command to send.
    Command(UserCommand),
}

/// Parse the given interactive line into an [`Input`].
///
/// Words are separated by runs of spaces and tabs. Command names are case sensitive.
pub fn parse(line: &str, max_len: usize) -> Result<Input> {
    if line.chars().count() > max_len {
        return Err(ParseErrorKind::TooLong { max: max_len }.into());
    }

    let mut words = line.split([' ', '\t']).filter(|word| !word.is_empty());
    let name = match words.next() {
        None => return Ok(Input::Blank),
        Some(name) if name.starts_with('#') => return Ok(Input::Comment),
        Some(name) => name,
    };
    let args: Vec<&str> = words.collect();

    let expected = UserCommand::arity(name).ok_or_else(|| ParseErrorKind::UnknownCommand { command: name.to_string() })?;
    if args.len() != expected {
        return Err(ParseErrorKind::IncorrectArgumentCount {
            command: name.to_string(),
            expected,
            found: args.len(),
        }
        .into());
    }

    let arg = || args.first().map(|arg| arg.to_string()).unwrap_or_default();
    let cmd = match name {
        "user" => UserCommand::User { username: arg() },
        "pw" => UserCommand::Pw { password: arg() },
        "quit" => UserCommand::Quit,
        "get" => UserCommand::Get { name: arg() },
        "features" => UserCommand::Features,
        "cd" => UserCommand::Cd { path: arg() },
        "dir" => UserCommand::Dir,
        _ => return Err(ParseErrorKind::UnknownCommand { command: name.to_string() }.into()),
    };
    Ok(Input::Command(cmd))
}
