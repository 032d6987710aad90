//! Help text rendering
//!
//! The application help template uses `{{placeholder}}` slots that are filled
//! from the registries (in registration order) and a diagnostics snapshot.

use crate::app::{App, HELP_COMMAND};
use crate::command_registry::{Command, Flag};
use crate::diagnostic::DiagnosticsSnapshot;

pub const APP_HELP_TEMPLATE: &str = "NAME:
  {{name}} - {{usage}}

DESCRIPTION:
  {{description}}

USAGE:
  {{usage_line}}

COMMANDS:
{{commands}}
{{global_flags}}VERSION:
  {{version}}

{{diagnostics}}";

pub const HELP_COMMAND_USAGE: &str = "Shows a list of commands or help for one command";

/// Fill the application's help template
pub fn render_app_help(app: &App, snapshot: &DiagnosticsSnapshot) -> String {
    let registry = app.registry();
    let has_flags = registry.flags().global().any(|f| !f.hidden);

    let usage_line = if has_flags {
        format!(
            "{} [global flags] command [command flags] [arguments...]",
            app.name()
        )
    } else {
        format!("{} command [command flags] [arguments...]", app.name())
    };

    let mut command_rows: Vec<(String, String)> = registry
        .commands()
        .iter()
        .map(|c| (c.name.clone(), c.usage.clone()))
        .collect();
    if !registry.commands().has_command(HELP_COMMAND) {
        command_rows.push((HELP_COMMAND.to_string(), HELP_COMMAND_USAGE.to_string()));
    }

    let global_flags = if has_flags {
        let visible: Vec<&Flag> = registry.flags().global().filter(|f| !f.hidden).collect();
        format!("GLOBAL FLAGS:\n{}\n", flag_table(&visible, true))
    } else {
        String::new()
    };

    app.help_template()
        .replace("{{name}}", app.name())
        .replace("{{usage}}", app.usage())
        .replace("{{description}}", app.description())
        .replace("{{usage_line}}", &usage_line)
        .replace("{{commands}}", &table(&command_rows))
        .replace("{{global_flags}}", &global_flags)
        .replace("{{version}}", app.version())
        .replace("{{diagnostics}}", &snapshot.render_sections())
}

/// Help for a single command: its usage, description and scoped flags
pub fn render_command_help(app: &App, command: &Command) -> String {
    let flags: Vec<&Flag> = app
        .registry()
        .flags()
        .for_command(&command.name)
        .filter(|f| !f.hidden)
        .collect();

    let mut text = format!(
        "NAME:\n  {} {} - {}\n\nUSAGE:\n  {} {}{} [arguments...]\n",
        app.name(),
        command.name,
        command.usage,
        app.name(),
        command.name,
        if flags.is_empty() { "" } else { " [command flags]" }
    );

    if !command.description.is_empty() {
        text.push_str(&format!("\nDESCRIPTION:\n  {}\n", command.description));
    }
    if !flags.is_empty() {
        text.push_str(&format!("\nFLAGS:\n{}", flag_table(&flags, false)));
    }
    text
}

fn flag_table(flags: &[&Flag], with_help: bool) -> String {
    let mut rows: Vec<(String, String)> = flags
        .iter()
        .map(|f| (f.synopsis(), f.help_line()))
        .collect();
    if with_help {
        rows.push(("--help, -h".to_string(), "show help".to_string()));
    }
    table(&rows)
}

/// Two aligned columns, two-space indent, one row per line
fn table(rows: &[(String, String)]) -> String {
    let width = rows
        .iter()
        .map(|(left, _)| left.chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|(left, right)| {
            let pad = width - left.chars().count();
            format!("  {}{}  {}\n", left, " ".repeat(pad), right)
        })
        .collect()
}
