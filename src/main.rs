use std::io::Write;
use std::process::ExitCode;

use strata::app::exit_status;
use strata::identity::SystemIdentity;
use strata::{logging, Bootstrap};

fn main() -> ExitCode {
    let args: Vec<_> = std::env::args_os().collect();

    logging::init(logging::debug_requested(&args));

    let app = match Bootstrap::new(&SystemIdentity).build() {
        Ok(app) => app,
        Err(e) => {
            log::error!("startup failed: {:?}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = app.run(args, &mut out);
    let _ = out.flush();

    ExitCode::from(exit_status(result, &mut std::io::stderr().lock()))
}
