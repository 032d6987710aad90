//! End-to-end runs of the bootstrap sequence under simulated users

use strata::app::exit_status;
use strata::command_registry::CliError;
use strata::identity::FixedIdentity;
use strata::{App, Bootstrap, BootstrapError};

fn bootstrap() -> App {
    let identity = FixedIdentity::user("minio", 1000);
    Bootstrap::new(&identity).build().unwrap()
}

fn run(app: &App, args: &[&str]) -> (Result<(), CliError>, String) {
    let mut out = Vec::new();
    let mut argv = vec!["strata"];
    argv.extend_from_slice(args);
    let result = app.run(argv, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn elevated_user_never_reaches_registration() {
    let identity = FixedIdentity::user("root", 0);
    let err = Bootstrap::new(&identity).build().err().unwrap();
    assert!(matches!(err, BootstrapError::ElevatedPrivileges { ref user, .. } if user == "root"));
    assert_eq!(err.to_string(), "Please run ‘strata’ as a non-root user.");
}

#[test]
fn unknown_command_with_suggestion() {
    let app = bootstrap();
    let (result, out) = run(&app, &["contro"]);
    assert!(out.is_empty());

    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert_eq!(
        err.to_string(),
        "‘contro’ is not a strata sub-command. See ‘strata help’.\n\n\
         Did you mean one of these?\n        ‘controller’\n"
    );
}

#[test]
fn unknown_command_without_suggestion() {
    let app = bootstrap();
    let (result, _) = run(&app, &["zzz"]);
    assert_eq!(
        result.unwrap_err().to_string(),
        "‘zzz’ is not a strata sub-command. See ‘strata help’."
    );
}

#[test]
fn bare_invocation_prints_full_help() {
    let app = bootstrap();
    let (result, out) = run(&app, &[]);
    result.unwrap();

    assert!(out.starts_with("NAME:\n  strata - Strata Cloud Storage\n"));
    for section in ["DESCRIPTION:", "USAGE:", "COMMANDS:", "GLOBAL FLAGS:", "VERSION:"] {
        assert!(out.contains(section), "missing {}", section);
    }
    for command in ["server", "gateway", "controller", "version", "help"] {
        assert!(out.contains(&format!("\n  {} ", command)), "missing {}", command);
    }
    assert!(out.contains("--json"));
    assert!(out.contains("MEM:\n"));
    assert!(out.contains("PLATFORM:\n"));
    assert!(out.contains("RUNTIME:\n"));
}

#[test]
fn scoped_flags_stay_with_their_command() {
    let app = bootstrap();
    let (result, _) = run(&app, &["version", "--address", ":1"]);
    assert!(matches!(result, Err(CliError::Arguments(_))));

    let (result, out) = run(&app, &["help", "controller"]);
    result.unwrap();
    assert!(out.contains("--address-controller value"));
    assert!(!out.contains("--address-server-rpc"));
}

#[test]
fn version_reports_build_metadata() {
    let app = bootstrap();
    let (result, out) = run(&app, &["--json", "version"]);
    result.unwrap();

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["ok"], true);
    assert_eq!(value["data"]["version"], strata::build_info::VERSION);
    assert!(value["data"]["commitId"].is_string());
    assert!(value["data"]["releaseTag"].is_string());
}

#[test]
fn exit_status_follows_the_failure_kind() {
    let app = bootstrap();
    let mut err = Vec::new();

    assert_eq!(exit_status(run(&app, &["help", "--json"]).0, &mut err), 0);
    assert_eq!(exit_status(run(&app, &["serv"]).0, &mut err), 1);
    assert_eq!(exit_status(run(&app, &["help", "version", "extra"]).0, &mut err), 2);

    let text = String::from_utf8(err).unwrap();
    assert!(text.contains("‘serv’ is not a strata sub-command."));
    assert!(text.contains("extra"));
}
