use std::fmt;

/// A command as it goes over the wire: an FTP verb with an optional argument, and the name of the
/// interactive command it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: &'static str,
    argument: Option<String>,
    friendly_name: &'static str,
}

impl Command {
    pub fn new(friendly_name: &'static str, verb: &'static str) -> Self {
        Command {
            verb,
            argument: None,
            friendly_name,
        }
    }

    pub fn with_argument(friendly_name: &'static str, verb: &'static str, argument: impl Into<String>) -> Self {
        Command {
            verb,
            argument: Some(argument.into()),
            friendly_name,
        }
    }

    pub fn verb(&self) -> &'static str {
        self.verb
    }

    pub fn friendly_name(&self) -> &'static str {
        self.friendly_name
    }
}

// Formats the command the way it is written to the server, without the line ending.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "{} {}", self.verb, argument),
            None => f.write_str(self.verb),
        }
    }
}

/// The commands a user can type at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    User { username: String },
    Pw { password: String },
    Quit,
    Get { name: String },
    Features,
    Cd { path: String },
    Dir,
}

impl UserCommand {
    /// The number of arguments the named command takes, or `None` for a name we don't know.
    pub fn arity(friendly_name: &str) -> Option<usize> {
        match friendly_name {
            "user" | "pw" | "get" | "cd" => Some(1),
            "quit" | "features" | "dir" => Some(0),
            _ => None,
        }
    }

    pub fn friendly_name(&self) -> &'static str {
        match self {
            UserCommand::User { .. } => "user",
            UserCommand::Pw { .. } => "pw",
            UserCommand::Quit => "quit",
            UserCommand::Get { .. } => "get",
            UserCommand::Features => "features",
            UserCommand::Cd { .. } => "cd",
            UserCommand::Dir => "dir",
        }
    }
}
