//! Built-in commands and flags of the `strata` binary
//!
//! The storage engine itself runs outside this crate; the service commands
//! resolve and validate the configuration that is handed to it.

use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

use crate::app::Invocation;
use crate::build_info::VersionInfo;
use crate::command_registry::{Command, Flag};
use crate::config::{self, ServerConfig};
use crate::diagnostic::DiagnosticsSnapshot;
use crate::output;

pub const APP_NAME: &str = "strata";
pub const APP_USAGE: &str = "Strata Cloud Storage";
pub const APP_DESCRIPTION: &str = "This build of Strata uses the XL distributed erasure code backend. \
XL erasure codes each data block with 8 data and 8 parity blocks and is designed for immutable objects.";

pub const JSON_FLAG: &str = "json";
pub const CONFIG_FLAG: &str = "config";
pub const DEBUG_FLAG: &str = "debug";

/// Commands in the order they appear in help
pub fn default_commands() -> Vec<Command> {
    vec![
        server_command(),
        gateway_command(),
        controller_command(),
        version_command(),
    ]
}

/// Flags in the order they appear in help; command-scoped flags need their
/// command registered first
pub fn default_flags() -> Vec<Flag> {
    vec![
        // server
        Flag::value("address", "Bind to a specific IP:PORT.")
            .with_default(config::DEFAULT_ADDRESS)
            .for_command("server"),
        Flag::value("address-server-rpc", "Bind the RPC service to a specific IP:PORT.")
            .with_default(config::DEFAULT_RPC_ADDRESS)
            .for_command("server"),
        Flag::value("ratelimit", "Limit for total concurrent requests.")
            .with_value_name("count")
            .with_default("16")
            .for_command("server"),
        Flag::switch(
            "anonymous",
            "Make server run in anonymous mode where all client connections are accepted.",
        )
        .for_command("server"),
        Flag::value("cert", "Provide your domain certificate.")
            .with_value_name("path")
            .for_command("server"),
        Flag::value("key", "Provide your domain private key.")
            .with_value_name("path")
            .for_command("server"),
        // gateway
        Flag::value("address", "Bind to a specific IP:PORT.")
            .with_default(config::DEFAULT_ADDRESS)
            .for_command("gateway"),
        Flag::value("ratelimit", "Limit for total concurrent requests.")
            .with_value_name("count")
            .with_default("16")
            .for_command("gateway"),
        // controller
        Flag::value("address-controller", "Bind the controller to a specific IP:PORT.")
            .with_default(config::DEFAULT_CONTROLLER_ADDRESS)
            .for_command("controller"),
        // global
        Flag::switch(JSON_FLAG, "Enable json formatted output."),
        Flag::value(CONFIG_FLAG, "Path to a TOML configuration file.").with_value_name("path"),
        Flag::switch(DEBUG_FLAG, "Enable debug logging."),
    ]
}

fn server_command() -> Command {
    Command::new("server", "Start object storage server.", |inv| {
        let config = resolve_config(inv)?;
        report_service(inv, "server", &config.address, &config)
    })
    .with_description(
        "Serve objects from the local erasure-coded backend on the given address, \
with a separate listener for peer RPC.",
    )
}

fn gateway_command() -> Command {
    Command::new("gateway", "Start object storage gateway.", |inv| {
        let config = resolve_config(inv)?;
        report_service(inv, "gateway", &config.address, &config)
    })
    .with_description("Expose the object API in front of remote storage servers.")
}

fn controller_command() -> Command {
    Command::new("controller", "Start management controller.", |inv| {
        let config = resolve_config(inv)?;
        report_service(inv, "controller", &config.controller_address, &config)
    })
    .with_description("Run the controller that manages a fleet of storage servers.")
}

fn version_command() -> Command {
    Command::new("version", "Print version.", |inv| {
        let report = VersionReport {
            info: VersionInfo::current(),
            diagnostics: inv.diagnostics(),
        };

        if inv.switch(JSON_FLAG) {
            return output::print_json(&mut *inv.out, report);
        }

        let out = &mut *inv.out;
        writeln!(out, "Version: {}", report.info.version)?;
        writeln!(out, "Release-Tag: {}", report.info.release_tag)?;
        writeln!(out, "Commit-ID: {}", report.info.commit_id)?;
        writeln!(out, "Build-Time: {}", report.info.build_timestamp)?;
        writeln!(out)?;
        write!(out, "{}", report.diagnostics.render_sections())?;
        Ok(())
    })
}

#[derive(Serialize)]
struct VersionReport {
    #[serde(flatten)]
    info: VersionInfo,
    diagnostics: DiagnosticsSnapshot,
}

#[derive(Serialize)]
struct ServiceReport<'a> {
    service: &'a str,
    endpoint: &'a str,
    config: &'a ServerConfig,
}

/// Config file values overlaid with explicitly given flags
fn resolve_config(inv: &Invocation<'_>) -> anyhow::Result<ServerConfig> {
    let path = inv.value(CONFIG_FLAG).map(PathBuf::from);
    let mut config = ServerConfig::load(path.as_deref())?;

    if let Some(address) = inv.explicit_value("address") {
        config.address = address;
    }
    if let Some(address) = inv.explicit_value("address-server-rpc") {
        config.rpc_address = address;
    }
    if let Some(address) = inv.explicit_value("address-controller") {
        config.controller_address = address;
    }
    if let Some(limit) = inv.explicit_value("ratelimit") {
        config.rate_limit = limit
            .parse()
            .with_context(|| format!("invalid --ratelimit value '{}'", limit))?;
    }
    if inv.switch("anonymous") {
        config.anonymous = true;
    }
    if let Some(cert) = inv.explicit_value("cert") {
        config.cert_file = Some(PathBuf::from(cert));
    }
    if let Some(key) = inv.explicit_value("key") {
        config.key_file = Some(PathBuf::from(key));
    }

    config.finalize()
}

fn report_service(
    inv: &mut Invocation<'_>,
    service: &str,
    endpoint: &str,
    config: &ServerConfig,
) -> anyhow::Result<()> {
    log::info!("{} configured on {}", service, endpoint);

    let report = ServiceReport {
        service,
        endpoint,
        config,
    };
    let json = inv.switch(JSON_FLAG);
    output::print_one(&mut *inv.out, json, report, |r| {
        format!(
            "{}: endpoint {} | rate limit {} | anonymous {} | tls {}",
            r.service,
            r.endpoint,
            r.config.rate_limit,
            on_off(r.config.anonymous),
            on_off(r.config.tls)
        )
    })
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::command_registry::Registry;
    use tempfile::TempDir;

    fn app() -> App {
        let mut registry = Registry::new();
        for command in default_commands() {
            registry.register_command(command).unwrap();
        }
        for flag in default_flags() {
            registry.register_flag(flag).unwrap();
        }
        App::new(APP_NAME, registry)
    }

    fn run(args: &[&str]) -> anyhow::Result<String> {
        let mut out = Vec::new();
        let mut argv = vec![APP_NAME];
        argv.extend_from_slice(args);
        app().run(argv, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn empty_config(dir: &TempDir) -> String {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_default_set_registers_cleanly() {
        let app = app();
        assert_eq!(
            app.registry().commands().names(),
            vec!["server", "gateway", "controller", "version"]
        );
        let globals: Vec<_> = app.registry().flags().global().map(|f| f.name.as_str()).collect();
        assert_eq!(globals, vec![JSON_FLAG, CONFIG_FLAG, DEBUG_FLAG]);
    }

    #[test]
    fn test_server_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "address = \":7000\"\nrate_limit = 4\n").unwrap();
        let path = path.display().to_string();

        let out = run(&["--config", &path, "server"]).unwrap();
        assert_eq!(
            out,
            "server: endpoint :7000 | rate limit 4 | anonymous off | tls off\n"
        );

        let out = run(&["--config", &path, "server", "--address", ":7100", "--anonymous"]).unwrap();
        assert_eq!(
            out,
            "server: endpoint :7100 | rate limit 4 | anonymous on | tls off\n"
        );
    }

    #[test]
    fn test_server_tls_and_json() {
        let dir = TempDir::new().unwrap();
        let config = empty_config(&dir);
        let out = run(&[
            "--json", "--config", &config, "server", "--cert", "public.crt", "--key", "private.key",
        ])
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["service"], "server");
        assert_eq!(value["data"]["config"]["tls"], true);
        assert_eq!(value["data"]["config"]["rpc_address"], ":9002");
    }

    #[test]
    fn test_invalid_ratelimit_is_an_action_error() {
        let dir = TempDir::new().unwrap();
        let config = empty_config(&dir);
        let err = run(&["--config", &config, "server", "--ratelimit", "many"]).unwrap_err();
        assert!(err.to_string().contains("invalid --ratelimit value 'many'"));

        let err = run(&["--config", &config, "server", "--cert", "public.crt"]).unwrap_err();
        assert!(err.to_string().contains("both a certificate and a key file"));
    }

    #[test]
    fn test_controller_uses_controller_address() {
        let dir = TempDir::new().unwrap();
        let config = empty_config(&dir);
        let out = run(&["--config", &config, "controller"]).unwrap();
        assert!(out.starts_with("controller: endpoint :9001 |"));

        let out = run(&["--config", &config, "controller", "--address-controller", ":9500"]).unwrap();
        assert!(out.starts_with("controller: endpoint :9500 |"));
    }

    #[test]
    fn test_version_text_and_json() {
        let out = run(&["version"]).unwrap();
        assert!(out.starts_with(&format!("Version: {}\n", crate::build_info::VERSION)));
        assert!(out.contains("Release-Tag: "));
        assert!(out.contains("\nPLATFORM:\n  Host: "));

        let out = run(&["--json", "version"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["data"]["version"], crate::build_info::VERSION);
        assert!(value["data"]["diagnostics"]["MEM"].is_string());
        assert!(value["data"]["diagnostics"]["RUNTIME"].is_string());
    }
}
