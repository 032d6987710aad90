//! Application descriptor and dispatch
//!
//! Translates the registries into a `clap::Command`, parses the arguments and
//! either renders help, runs the matching command, or hands the unknown token
//! to the not-found hook.

use std::ffi::OsString;
use std::io::Write;
use std::sync::Arc;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches};

use crate::build_info;
use crate::command_registry::{CliError, Command, Flag, FlagKind, Registry};
use crate::diagnostic::{DiagnosticsCollector, DiagnosticsSnapshot};
use crate::help;

/// Called with an unrecognised sub-command; the returned error ends the run
pub type NotFoundHook = Box<dyn Fn(&str) -> CliError + Send + Sync>;

/// Produces a fresh diagnostics snapshot for help/version output
pub type DiagnosticsHook = Box<dyn Fn() -> DiagnosticsSnapshot + Send + Sync>;

/// Built-in help flag id (`-h/--help`)
pub const HELP_FLAG: &str = "help";

/// Built-in help sub-command
pub const HELP_COMMAND: &str = "help";

/// Optional positional of the help sub-command naming a command
pub const HELP_TOPIC: &str = "command";

/// Top-level application: metadata, registries and hooks
pub struct App {
    name: String,
    usage: String,
    description: String,
    version: String,
    help_template: String,
    registry: Arc<Registry>,
    diagnostics: DiagnosticsHook,
    not_found: NotFoundHook,
}

impl App {
    /// Create an application over a fully populated registry.
    ///
    /// Defaults: live diagnostics from [`DiagnosticsCollector`] and the
    /// prefix-suggestion not-found hook.
    pub fn new(name: &str, registry: Registry) -> Self {
        let registry = Arc::new(registry);
        let collector = DiagnosticsCollector::new();

        Self {
            name: name.to_string(),
            usage: String::new(),
            description: String::new(),
            version: build_info::VERSION.to_string(),
            help_template: help::APP_HELP_TEMPLATE.to_string(),
            not_found: suggest_closest(name, Arc::clone(&registry)),
            diagnostics: Box::new(move || collector.collect()),
            registry,
        }
    }

    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn with_help_template(mut self, template: &str) -> Self {
        self.help_template = template.to_string();
        self
    }

    pub fn with_diagnostics<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> DiagnosticsSnapshot + Send + Sync + 'static,
    {
        self.diagnostics = Box::new(hook);
        self
    }

    pub fn with_not_found<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> CliError + Send + Sync + 'static,
    {
        self.not_found = Box::new(hook);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn help_template(&self) -> &str {
        &self.help_template
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Shared handle to the read-only registry
    pub fn shared_registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        (self.diagnostics)()
    }

    /// Run the not-found hook for `token`
    pub fn command_not_found(&self, token: &str) -> CliError {
        (self.not_found)(token)
    }

    /// Build the `clap` command tree from the registries
    pub fn to_clap(&self) -> clap::Command {
        let mut root = clap::Command::new(self.name.clone())
            .about(self.usage.clone())
            .disable_help_flag(true)
            .disable_help_subcommand(true)
            .disable_version_flag(true)
            .allow_external_subcommands(true)
            .external_subcommand_value_parser(clap::value_parser!(String))
            .arg(
                Arg::new(HELP_FLAG)
                    .short('h')
                    .long("help")
                    .help("show help")
                    .action(ArgAction::SetTrue)
                    .global(true),
            );

        for flag in self.registry.flags().global() {
            root = root.arg(flag_to_arg(flag).global(true));
        }

        for command in self.registry.commands().iter() {
            let mut sub = clap::Command::new(command.name.clone())
                .about(command.usage.clone())
                .disable_help_flag(true);
            for flag in self.registry.flags().for_command(&command.name) {
                sub = sub.arg(flag_to_arg(flag));
            }
            root = root.subcommand(sub);
        }

        if !self.registry.commands().has_command(HELP_COMMAND) {
            root = root.subcommand(
                clap::Command::new(HELP_COMMAND)
                    .about(help::HELP_COMMAND_USAGE)
                    .disable_help_flag(true)
                    .arg(Arg::new(HELP_TOPIC).value_name("command").action(ArgAction::Set)),
            );
        }

        root
    }

    /// Parse `args` (program name first) and execute.
    ///
    /// Output goes to `out`. Any returned error is fatal for this invocation.
    pub fn run<I, T>(&self, args: I, out: &mut dyn Write) -> Result<(), CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.to_clap().try_get_matches_from(args)?;

        match matches.subcommand() {
            None => self.render_help(out),
            Some((HELP_COMMAND, sub)) if !self.registry.commands().has_command(HELP_COMMAND) => {
                match sub.get_one::<String>(HELP_TOPIC) {
                    None => self.render_help(out),
                    Some(topic) => match self.registry.commands().get(topic) {
                        Some(command) => self.render_command_help(command, out),
                        None => Err(self.command_not_found(topic)),
                    },
                }
            }
            Some((name, sub)) => match self.registry.commands().get(name) {
                Some(command) => {
                    if is_set(sub, HELP_FLAG) || is_set(&matches, HELP_FLAG) {
                        return self.render_command_help(command, out);
                    }

                    log::debug!("dispatching '{}'", command.name);
                    let mut invocation = Invocation {
                        app: self,
                        command,
                        root: &matches,
                        matches: sub,
                        out,
                    };
                    command.run(&mut invocation)?;
                    Ok(())
                }
                None => Err(self.command_not_found(name)),
            },
        }
    }

    /// Render top-level help with a fresh diagnostics snapshot
    pub fn render_help(&self, out: &mut dyn Write) -> Result<(), CliError> {
        let snapshot = self.diagnostics();
        out.write_all(help::render_app_help(self, &snapshot).as_bytes())?;
        Ok(())
    }

    pub fn render_command_help(&self, command: &Command, out: &mut dyn Write) -> Result<(), CliError> {
        out.write_all(help::render_command_help(self, command).as_bytes())?;
        Ok(())
    }
}

/// Report a finished run on `err` and return the process exit status.
///
/// Argument errors carry clap's own status; every other failure is 1.
pub fn exit_status(result: Result<(), CliError>, err: &mut dyn Write) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            let code = e.exit_code();
            let _ = match &e {
                CliError::Arguments(clap_err) => write!(err, "{}", clap_err.render()),
                other => writeln!(err, "{}", other),
            };
            u8::try_from(code).unwrap_or(1)
        }
    }
}

/// The default not-found hook: suggest registered commands sharing the
/// token as a prefix, then fail.
pub fn suggest_closest(app: &str, registry: Arc<Registry>) -> NotFoundHook {
    let app = app.to_string();
    Box::new(move |token| {
        let suggestions = registry.commands().closest_commands(token);
        log::debug!(
            "unknown command '{}', {} suggestion(s)",
            token,
            suggestions.len()
        );
        CliError::unknown_command(&app, token, suggestions)
    })
}

/// Everything a command action can see while it runs
pub struct Invocation<'a> {
    pub app: &'a App,
    pub command: &'a Command,
    root: &'a ArgMatches,
    matches: &'a ArgMatches,
    pub out: &'a mut dyn Write,
}

impl<'a> Invocation<'a> {
    /// Value of a flag, including its default
    pub fn value(&self, name: &str) -> Option<String> {
        [self.matches, self.root]
            .into_iter()
            .find_map(|m| m.try_get_one::<String>(name).ok().flatten().cloned())
    }

    /// Value of a flag only when given on the command line
    pub fn explicit_value(&self, name: &str) -> Option<String> {
        [self.matches, self.root].into_iter().find_map(|m| {
            match m.try_contains_id(name) {
                Ok(true) if m.value_source(name) == Some(ValueSource::CommandLine) => {
                    m.try_get_one::<String>(name).ok().flatten().cloned()
                }
                _ => None,
            }
        })
    }

    /// Whether a switch flag is on
    pub fn switch(&self, name: &str) -> bool {
        is_set(self.matches, name) || is_set(self.root, name)
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.app.diagnostics()
    }
}

fn is_set(matches: &ArgMatches, id: &str) -> bool {
    matches!(matches.try_get_one::<bool>(id), Ok(Some(true)))
}

fn flag_to_arg(flag: &Flag) -> Arg {
    let mut arg = Arg::new(flag.name.clone())
        .long(flag.name.clone())
        .help(flag.help_line())
        .hide(flag.hidden);

    if let Some(short) = flag.short {
        arg = arg.short(short);
    }
    if !flag.aliases.is_empty() {
        arg = arg.aliases(flag.aliases.clone());
    }

    match flag.kind {
        FlagKind::Switch => arg.action(ArgAction::SetTrue),
        FlagKind::Value => {
            arg = arg
                .action(ArgAction::Set)
                .value_name(flag.value_name.clone().unwrap_or_else(|| "value".to_string()));
            if let Some(default) = &flag.default {
                arg = arg.default_value(default.clone());
            }
            arg
        }
    }
}
