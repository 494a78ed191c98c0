//! Fail-fast command execution.
//!
//! Every external tool the sequencer shells out to goes through
//! [`CommandExt`]: spawn, block until exit, and convert a non-zero status
//! into a typed [`CommandError`]. No call site inspects exit codes by hand,
//! which keeps the fail-fast propagation policy in one place.

use crate::error::CommandError;
use std::process::Command;
use tracing::{debug, error};

/// Extension trait adding checked execution to `std::process::Command`.
pub trait CommandExt {
    /// Run the command, inheriting stdio, and fail on non-zero exit.
    fn run_checked(&mut self) -> Result<(), CommandError>;

    /// Run the command, capture stdout as UTF-8, and fail on non-zero exit.
    /// Stderr is logged on failure.
    fn run_output(&mut self) -> Result<String, CommandError>;
}

fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().into_owned()
}

impl CommandExt for Command {
    fn run_checked(&mut self) -> Result<(), CommandError> {
        let program = program_name(self);
        debug!(command = ?self, "running");

        let status = self
            .spawn()
            .and_then(|mut child| child.wait())
            .map_err(|source| CommandError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(CommandError::BadExitStatus { program, status });
        }

        Ok(())
    }

    fn run_output(&mut self) -> Result<String, CommandError> {
        let program = program_name(self);
        debug!(command = ?self, "running (captured)");

        let output = self.output().map_err(|source| CommandError::Spawn {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(%program, status = %output.status, stderr = %stderr.trim(), "command failed");
            return Err(CommandError::BadExitStatus {
                program,
                status: output.status,
            });
        }

        String::from_utf8(output.stdout).map_err(|_| CommandError::InvalidUtf8 { program })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_checked_success() {
        Command::new("true").run_checked().expect("true exits 0");
    }

    #[test]
    fn test_run_checked_bad_exit() {
        let err = Command::new("false").run_checked().unwrap_err();
        match err {
            CommandError::BadExitStatus { program, status } => {
                assert_eq!(program, "false");
                assert!(!status.success());
            }
            other => panic!("expected BadExitStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_run_checked_missing_binary() {
        let err = Command::new("definitely_not_a_real_binary_2718")
            .run_checked()
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[test]
    fn test_run_output_captures_stdout() {
        let out = Command::new("echo")
            .arg("hello")
            .run_output()
            .expect("echo succeeds");
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_run_output_bad_exit() {
        let err = Command::new("false").run_output().unwrap_err();
        assert!(matches!(err, CommandError::BadExitStatus { .. }));
    }
}
