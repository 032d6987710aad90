//! Error types for command registration and dispatch

use std::fmt::Write as _;

use super::flags::FlagScope;

/// Configuration-time errors raised while filling the registries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid name '{0}': names must be non-empty and contain no whitespace")]
    InvalidName(String),

    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),

    #[error("flag '{name}' is already registered for {scope}")]
    DuplicateFlag { name: String, scope: FlagScope },

    #[error("flag '{0}' is reserved for built-in help")]
    ReservedFlag(String),

    #[error("flag '{flag}' is scoped to unknown command '{command}'")]
    UnknownScope { flag: String, command: String },
}

/// Errors raised while parsing and executing a command line
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{}", unknown_command_message(.app, .token, .suggestions))]
    UnknownCommand {
        app: String,
        token: String,
        suggestions: Vec<String>,
    },

    #[error(transparent)]
    Arguments(#[from] clap::Error),

    #[error("{0:#}")]
    Action(#[from] anyhow::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn unknown_command(app: &str, token: &str, suggestions: Vec<String>) -> Self {
        Self::UnknownCommand {
            app: app.to_string(),
            token: token.to_string(),
            suggestions,
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Arguments(err) => err.exit_code(),
            _ => 1,
        }
    }
}

fn unknown_command_message(app: &str, token: &str, suggestions: &[String]) -> String {
    let mut msg = format!("‘{}’ is not a {} sub-command. See ‘{} help’.", token, app, app);
    if !suggestions.is_empty() {
        msg.push_str("\n\nDid you mean one of these?\n");
        for cmd in suggestions {
            let _ = writeln!(msg, "        ‘{}’", cmd);
        }
    }
    msg
}
