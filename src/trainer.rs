use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("trainer did not finish within {0:?}")]
    TimedOut(Duration),
}

/// The external program that retrains the forecasting model.
#[async_trait]
pub trait Trainer: Send + Sync {
    /// Runs one training pass and returns its standard output.
    async fn run(&self) -> Result<String, TrainerError>;
}

pub struct CommandTrainer {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl CommandTrainer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
            timeout,
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Trainer for CommandTrainer {
    async fn run(&self) -> Result<String, TrainerError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| TrainerError::TimedOut(self.timeout))?
            .map_err(|source| TrainerError::Spawn {
                command: self.command_line(),
                source,
            })?;

        if !output.status.success() {
            return Err(TrainerError::Failed {
                command: self.command_line(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Runs the trainer once and logs the outcome.
pub async fn recalibrate(trainer: &dyn Trainer) -> Result<String, TrainerError> {
    info!("recalibration started");
    match trainer.run().await {
        Ok(output) => {
            info!(output_bytes = output.len(), "recalibration complete");
            Ok(output)
        }
        Err(err) => {
            error!("recalibration failed: {err}");
            Err(err)
        }
    }
}
