use std::process::ExitCode;

use clap::Parser;

use service_runner::cli::Cli;
use service_runner::config::ProcessEnv;
use service_runner::error::exit_code;
use service_runner::lifecycle::Termination;
use service_runner::{AppRegistry, Supervisor};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Registered before startup so a SIGTERM during boot is not lost.
    let termination = match Termination::install() {
        Ok(termination) => termination,
        Err(e) => {
            eprintln!("service-runner: failed to install signal handlers: {e}");
            return ExitCode::from(exit_code::OS_ERROR);
        }
    };

    let supervisor = Supervisor::new(cli.overrides(), AppRegistry::builtin());
    match supervisor.run(&ProcessEnv, termination.wait()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            // Failures before logging is installed have no subscriber to report them.
            if !tracing::dispatcher::has_been_set() {
                eprintln!("service-runner: startup failed: {err}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
