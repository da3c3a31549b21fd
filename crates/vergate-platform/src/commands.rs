use async_trait::async_trait;
use log::{debug, info};
use tokio::process::Command;

use crate::remediation::NativeUpdateTrigger;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

trait HideWindow {
    fn hide_window(&mut self) -> &mut Self;
}

impl HideWindow for Command {
    #[cfg(windows)]
    fn hide_window(&mut self) -> &mut Self {
        self.creation_flags(CREATE_NO_WINDOW)
    }

    #[cfg(not(windows))]
    fn hide_window(&mut self) -> &mut Self {
        self
    }
}

/// Native update flow provided by an external program, such as a package
/// manager or the application's own updater.
///
/// The update counts as started when the program exits successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandUpdateTrigger {
    program: String,
    args: Vec<String>,
}

impl CommandUpdateTrigger {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from `[program, args...]`. Returns `None` when no program is
    /// named.
    #[must_use]
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self::new(program.clone(), args.to_vec()))
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl NativeUpdateTrigger for CommandUpdateTrigger {
    fn describe(&self) -> String {
        format!("run `{}`", self.command_line())
    }

    async fn start_update(&self) -> Result<(), String> {
        debug!("Running update command: {}", self.command_line());
        let status = Command::new(&self.program)
            .args(&self.args)
            .hide_window()
            .status()
            .await
            .map_err(|error| format!("could not run {}: {error}", self.program))?;

        if status.success() {
            info!("Update command {} finished", self.program);
            Ok(())
        } else {
            Err(format!("{} exited with {status}", self.program))
        }
    }
}
