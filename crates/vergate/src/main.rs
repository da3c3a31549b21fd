mod error;
mod logging;
mod prompt;
mod settings;
mod wiring;

use std::process::ExitCode;

use log::{error, warn};
use vergate_platform::AppPaths;

use crate::error::AppError;
use crate::prompt::TerminalPrompt;
use crate::settings::AppSettings;

/// Exit status when a forced update was started.
const EXIT_UPDATE_REQUIRED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match AppPaths::new() {
        Ok(paths) => {
            let settings = AppSettings::load(&paths);
            logging::init_logging(&paths, settings.debug_logging, settings.max_log_size_bytes);
            if !paths.settings_file().exists()
                && let Err(error) = settings.save(&paths)
            {
                warn!("Could not write default settings: {error}");
            }
            settings
        }
        Err(error) => {
            eprintln!("vergate: {error}, using default settings");
            AppSettings::default()
        }
    };

    match run(&settings).await {
        Ok(code) => code,
        Err(error) => {
            error!("{error}");
            eprintln!("vergate: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: &AppSettings) -> Result<ExitCode, AppError> {
    let gate = wiring::build_gate(settings, env!("CARGO_PKG_VERSION"))?;
    let mut prompt = TerminalPrompt::new(std::io::stdout());

    let decision = match gate.run(&mut prompt).await {
        Ok(decision) => decision,
        Err(gate_error) => {
            // A broken installed version must not lock the user out.
            let error = AppError::update_check_failed(gate.app_id(), gate_error);
            warn!("{error}");
            return Ok(ExitCode::SUCCESS);
        }
    };
    prompt.finish().await;

    if decision.is_update_available() && decision.forced {
        Ok(ExitCode::from(EXIT_UPDATE_REQUIRED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
