use std::io::Write;

use log::warn;
use tokio::task::JoinHandle;
use vergate_core::{DecisionConsumer, RemediationHandle, UpdateDecision};

/// Terminal presentation of update decisions.
///
/// A forced update cannot be dismissed here, so the prompt starts remediation
/// straight away; an optional update only prints where to get it.
pub struct TerminalPrompt<W: Write> {
    out: W,
    pending: Option<JoinHandle<()>>,
}

impl<W: Write> TerminalPrompt<W> {
    pub fn new(out: W) -> Self {
        Self { out, pending: None }
    }

    /// Wait for a started remediation so it is not cut off at process exit.
    pub async fn finish(&mut self) {
        if let Some(task) = self.pending.take()
            && let Err(error) = task.await
        {
            warn!("Remediation task ended abnormally: {error}");
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn render(
        &mut self,
        decision: &UpdateDecision,
        remediate: &RemediationHandle,
    ) -> std::io::Result<()> {
        let Some(latest) = decision.latest.filter(|_| decision.is_update_available()) else {
            return writeln!(self.out, "Version {} is up to date.", decision.installed);
        };

        if decision.forced {
            writeln!(self.out, "Update required")?;
            writeln!(
                self.out,
                "Version {latest} is available and version {} can no longer be used.",
                decision.installed
            )?;
            writeln!(self.out, "Updating: {}", remediate.describe())
        } else {
            writeln!(
                self.out,
                "Version {latest} is available (installed {}). To update: {}",
                decision.installed,
                remediate.describe()
            )
        }
    }
}

impl<W: Write> DecisionConsumer for TerminalPrompt<W> {
    fn on_decision(&mut self, decision: &UpdateDecision, remediate: RemediationHandle) {
        if let Err(error) = self.render(decision, &remediate) {
            warn!("Could not write update prompt: {error}");
        }

        if decision.is_update_available() && decision.forced {
            self.pending = Some(remediate.invoke());
        }
    }
}
