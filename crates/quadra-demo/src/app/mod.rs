mod bootstrap;
mod config;
mod gameplay;

use std::process::ExitCode;

use tracing::error;

pub(crate) fn run() -> ExitCode {
    let mut engine = match bootstrap::build_app() {
        Ok(engine) => engine,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    engine.run();
    ExitCode::SUCCESS
}
