//! Application Startup Module
//!
//! Runs the ordered bootstrap sequence: environment checks, command and flag
//! registration, then construction of the [`App`] that parses arguments.
//! Each step must finish before the next starts; the first failure stops the
//! sequence.

use crate::app::App;
use crate::build_info::{self, RustcVersion, MIN_RUSTC_VERSION};
use crate::command_registry::{Command, Flag, Registry, RegistryError};
use crate::commands;
use crate::identity::{IdentityProvider, UserIdentity};
use crate::logging::Timer;

/// Fatal startup failures
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Unable to determine the invoking user.\nError: {0}")]
    IdentityUnavailable(String),

    #[error("Please run ‘{app}’ as a non-root user.")]
    ElevatedPrivileges { app: String, user: String },

    #[error("{app} was built with {found}; rustc {minimum} or newer is required.")]
    UnsupportedRuntime {
        app: String,
        found: String,
        minimum: RustcVersion,
    },

    #[error("invalid command registration: {0}")]
    Registry(#[from] RegistryError),
}

/// Builder for the startup sequence
pub struct Bootstrap<'a> {
    app_name: String,
    identity: &'a dyn IdentityProvider,
    runtime_version: String,
    minimum_runtime: RustcVersion,
    commands: Vec<Command>,
    flags: Vec<Flag>,
}

impl<'a> Bootstrap<'a> {
    /// Bootstrap the built-in command set for the given identity source
    pub fn new(identity: &'a dyn IdentityProvider) -> Self {
        Self {
            app_name: commands::APP_NAME.to_string(),
            identity,
            runtime_version: build_info::rustc_version().to_string(),
            minimum_runtime: MIN_RUSTC_VERSION,
            commands: commands::default_commands(),
            flags: commands::default_flags(),
        }
    }

    /// Override the toolchain version string that is checked
    pub fn with_runtime_version(mut self, version: &str) -> Self {
        self.runtime_version = version.to_string();
        self
    }

    pub fn with_minimum_runtime(mut self, minimum: RustcVersion) -> Self {
        self.minimum_runtime = minimum;
        self
    }

    pub fn with_commands(mut self, commands: Vec<Command>) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_flags(mut self, flags: Vec<Flag>) -> Self {
        self.flags = flags;
        self
    }

    /// Steps 1-3: identity, privilege and toolchain checks
    pub fn check_environment(&self) -> Result<UserIdentity, BootstrapError> {
        let user = self
            .identity
            .current_user()
            .map_err(|e| BootstrapError::IdentityUnavailable(format!("{:#}", e)))?;

        if user.is_elevated() {
            return Err(BootstrapError::ElevatedPrivileges {
                app: self.app_name.clone(),
                user: user.name,
            });
        }

        match RustcVersion::parse(&self.runtime_version) {
            Some(found) if found < self.minimum_runtime => {
                return Err(BootstrapError::UnsupportedRuntime {
                    app: self.app_name.clone(),
                    found: self.runtime_version.clone(),
                    minimum: self.minimum_runtime,
                });
            }
            Some(_) => {}
            None => log::warn!(
                "could not read toolchain version from '{}', skipping the check",
                self.runtime_version
            ),
        }

        Ok(user)
    }

    /// Run the whole sequence and return the ready-to-run application
    pub fn build(self) -> Result<App, BootstrapError> {
        let timer = Timer::start("environment checks");
        let checked = self.check_environment();
        timer.stop(checked.is_ok());
        let user = checked?;
        log::debug!("running as '{}'", user.name);

        let timer = Timer::start("registration");
        let registered = register_all(self.commands, self.flags);
        timer.stop(registered.is_ok());
        let registry = registered?;

        log::info!(
            "registered {} commands and {} flags",
            registry.commands().len(),
            registry.flags().len()
        );

        Ok(App::new(&self.app_name, registry)
            .with_usage(commands::APP_USAGE)
            .with_description(commands::APP_DESCRIPTION))
    }
}

/// Step 4: every command, then every flag
pub fn register_all(commands: Vec<Command>, flags: Vec<Flag>) -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    for command in commands {
        registry.register_command(command)?;
    }
    for flag in flags {
        registry.register_flag(flag)?;
    }
    Ok(registry)
}
