//! Command Registry Implementation
//!
//! 管理所有子命令与参数的注册

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::app::Invocation;
use crate::command_registry::errors::RegistryError;
use crate::command_registry::flags::{Flag, FlagRegistry, FlagScope};
use crate::command_registry::trie::PrefixTrie;

/// Handler run when a command is dispatched
pub type CommandAction = Arc<dyn Fn(&mut Invocation<'_>) -> anyhow::Result<()> + Send + Sync>;

/// A named sub-command of the binary
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub usage: String,
    pub description: String,
    action: CommandAction,
}

impl Command {
    /// Create a command with its one-line usage summary and action
    pub fn new<F>(name: &str, usage: &str, action: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            usage: usage.to_string(),
            description: String::new(),
            action: Arc::new(action),
        }
    }

    /// Add a longer description shown in command help
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Run the command's action
    pub fn run(&self, invocation: &mut Invocation<'_>) -> anyhow::Result<()> {
        (self.action)(invocation)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered set of commands plus the prefix trie over their names
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    index: HashMap<String, usize>,
    trie: PrefixTrie,
}

impl CommandRegistry {
    /// Create a new command registry
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            index: HashMap::new(),
            trie: PrefixTrie::new(),
        }
    }

    /// Register a command with the registry.
    ///
    /// Nothing is modified when registration fails.
    pub fn register(&mut self, command: Command) -> Result<(), RegistryError> {
        if command.name.is_empty() || command.name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(command.name));
        }
        if self.index.contains_key(&command.name) {
            return Err(RegistryError::DuplicateCommand(command.name));
        }

        log::debug!("registered command '{}'", command.name);
        self.trie.insert(&command.name, command.name.as_str());
        self.index.insert(command.name.clone(), self.commands.len());
        self.commands.push(command);
        Ok(())
    }

    /// Get a command by exact name
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    /// Check if a command exists
    pub fn has_command(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Commands in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Command names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }

    /// Registered commands starting with `token`, ordered by name
    pub fn closest_commands(&self, token: &str) -> Vec<String> {
        self.trie.prefix_match(token)
    }

    pub fn trie(&self) -> &PrefixTrie {
        &self.trie
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// The command and flag registries built during bootstrap.
///
/// Filled once before argument parsing and only read afterwards, so it can
/// be shared behind an `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: CommandRegistry,
    flags: FlagRegistry,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_command(&mut self, command: Command) -> Result<(), RegistryError> {
        self.commands.register(command)
    }

    /// Register a flag; command-scoped flags must name a registered command
    pub fn register_flag(&mut self, flag: Flag) -> Result<(), RegistryError> {
        if let FlagScope::Command(command) = &flag.scope {
            if !self.commands.has_command(command) {
                return Err(RegistryError::UnknownScope {
                    flag: flag.name.clone(),
                    command: command.clone(),
                });
            }
        }
        self.flags.register(flag)
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn flags(&self) -> &FlagRegistry {
        &self.flags
    }
}
