//! Flag descriptors and the ordered flag registry

use std::fmt;

use crate::command_registry::errors::RegistryError;

/// Where a flag is accepted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlagScope {
    Global,
    Command(String),
}

impl FlagScope {
    /// Whether two scopes can see the same flag names.
    ///
    /// Global flags are visible inside every command, so they overlap with
    /// every scope.
    pub fn overlaps(&self, other: &FlagScope) -> bool {
        matches!((self, other), (FlagScope::Global, _) | (_, FlagScope::Global)) || self == other
    }
}

impl fmt::Display for FlagScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagScope::Global => write!(f, "global scope"),
            FlagScope::Command(name) => write!(f, "command '{}'", name),
        }
    }
}

/// Whether a flag is a boolean switch or takes a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Switch,
    Value,
}

/// A registered command-line flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    pub name: String,
    pub short: Option<char>,
    pub aliases: Vec<String>,
    pub default: Option<String>,
    pub description: String,
    pub scope: FlagScope,
    pub kind: FlagKind,
    pub value_name: Option<String>,
    pub hidden: bool,
}

impl Flag {
    /// Create a global boolean switch
    pub fn switch(name: &str, description: &str) -> Self {
        Self::new(name, description, FlagKind::Switch)
    }

    /// Create a global flag that takes a value
    pub fn value(name: &str, description: &str) -> Self {
        Self::new(name, description, FlagKind::Value)
    }

    fn new(name: &str, description: &str, kind: FlagKind) -> Self {
        Self {
            name: name.to_string(),
            short: None,
            aliases: Vec::new(),
            default: None,
            description: description.to_string(),
            scope: FlagScope::Global,
            kind,
            value_name: None,
            hidden: false,
        }
    }

    pub fn with_short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn with_value_name(mut self, value_name: &str) -> Self {
        self.value_name = Some(value_name.to_string());
        self
    }

    /// Restrict the flag to a single command
    pub fn for_command(mut self, command: &str) -> Self {
        self.scope = FlagScope::Command(command.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn is_global(&self) -> bool {
        self.scope == FlagScope::Global
    }

    /// Long name followed by its long aliases
    pub fn long_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Help-text synopsis, e.g. `--address value, -a value`
    pub fn synopsis(&self) -> String {
        let placeholder = match self.kind {
            FlagKind::Switch => String::new(),
            FlagKind::Value => format!(" {}", self.value_name.as_deref().unwrap_or("value")),
        };

        let mut parts: Vec<String> = self
            .long_names()
            .map(|name| format!("--{}{}", name, placeholder))
            .collect();
        if let Some(short) = self.short {
            parts.push(format!("-{}{}", short, placeholder));
        }
        parts.join(", ")
    }

    /// Description with the default appended, as shown in help output
    pub fn help_line(&self) -> String {
        match &self.default {
            Some(default) => format!("{} (default: \"{}\")", self.description, default),
            None => self.description.clone(),
        }
    }

    fn collides_with(&self, other: &Flag) -> bool {
        if !self.scope.overlaps(&other.scope) {
            return false;
        }
        let short_clash = matches!((self.short, other.short), (Some(a), Some(b)) if a == b);
        short_clash || self.long_names().any(|name| other.long_names().any(|o| o == name))
    }
}

/// Ordered collection of flags, kept in registration order
#[derive(Debug, Clone, Default)]
pub struct FlagRegistry {
    flags: Vec<Flag>,
}

impl FlagRegistry {
    pub fn new() -> Self {
        Self { flags: Vec::new() }
    }

    /// Register a flag.
    ///
    /// Fails when any spelling of the flag clashes with a flag whose scope
    /// overlaps, or when it claims the built-in help spellings. The registry is
    /// left untouched on failure.
    pub fn register(&mut self, flag: Flag) -> Result<(), RegistryError> {
        if flag.long_names().any(|name| name.is_empty() || name.chars().any(char::is_whitespace)) {
            return Err(RegistryError::InvalidName(flag.name));
        }
        if flag.long_names().any(|name| name == "help") || flag.short == Some('h') {
            return Err(RegistryError::ReservedFlag(flag.name));
        }
        if let Some(existing) = self.flags.iter().find(|f| f.collides_with(&flag)) {
            let scope = if flag.is_global() {
                existing.scope.clone()
            } else {
                flag.scope.clone()
            };
            return Err(RegistryError::DuplicateFlag {
                name: flag.name,
                scope,
            });
        }

        log::debug!("registered flag --{} ({})", flag.name, flag.scope);
        self.flags.push(flag);
        Ok(())
    }

    /// All flags in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, Flag> {
        self.flags.iter()
    }

    /// Global flags in registration order
    pub fn global(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter().filter(|f| f.is_global())
    }

    /// Flags scoped to one command, in registration order
    pub fn for_command<'a>(&'a self, command: &'a str) -> impl Iterator<Item = &'a Flag> + 'a {
        self.flags
            .iter()
            .filter(move |f| matches!(&f.scope, FlagScope::Command(name) if name == command))
    }

    pub fn get(&self, scope: &FlagScope, name: &str) -> Option<&Flag> {
        self.flags
            .iter()
            .find(|f| &f.scope == scope && f.name == name)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
