use std::process::ExitCode;

use engine::run_app;
use tracing::error;

mod adventure;
mod bootstrap;

pub(crate) fn run() -> ExitCode {
    let wiring = bootstrap::build_app();
    if let Err(err) = run_app(wiring.config, wiring.scene) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
