//! External process execution
//!
//! Runs child processes to completion, capturing their output so that a
//! failure can be reported together with what the tool printed.

use std::fmt;
use std::process::{Command, Output};
use thiserror::Error;

/// Child process errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started
    #[error("failed to run '{program}': {error}")]
    Spawn { program: String, error: String },

    /// The program exited unsuccessfully
    #[error("'{program}' exited with {status}{}", format_output(.output))]
    Failed {
        program: String,
        status: String,
        output: CapturedOutput,
    },
}

impl ProcessError {
    /// Captured output of a failed process
    pub fn output(&self) -> Option<&CapturedOutput> {
        match self {
            Self::Failed { output, .. } => Some(output),
            Self::Spawn { .. } => None,
        }
    }
}

/// Stdout and stderr of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

impl CapturedOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    /// Whether both streams are empty
    pub fn is_empty(&self) -> bool {
        self.stdout.trim().is_empty() && self.stderr.trim().is_empty()
    }
}

impl fmt::Display for CapturedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stdout = self.stdout.trim_end();
        let stderr = self.stderr.trim_end();
        if !stdout.is_empty() {
            writeln!(f, "--- stdout ---")?;
            writeln!(f, "{stdout}")?;
        }
        if !stderr.is_empty() {
            writeln!(f, "--- stderr ---")?;
            writeln!(f, "{stderr}")?;
        }
        Ok(())
    }
}

fn format_output(output: &CapturedOutput) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!("\n{output}")
    }
}

/// Human-readable rendering of a command line
pub fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Run a command to completion and fail on a non-zero exit
pub fn run(cmd: &mut Command) -> Result<CapturedOutput, ProcessError> {
    let program = describe(cmd);
    tracing::debug!("Running: {program}");

    let output = cmd.output().map_err(|e| ProcessError::Spawn {
        program: program.clone(),
        error: e.to_string(),
    })?;
    let captured = CapturedOutput::from_output(&output);

    if output.status.success() {
        if !captured.is_empty() {
            tracing::debug!("{program}:\n{captured}");
        }
        Ok(captured)
    } else {
        Err(ProcessError::Failed {
            program,
            status: output.status.to_string(),
            output: captured,
        })
    }
}
