use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{ExecError, ExecResult};
use crate::invocation::{CommandOutput, Invocation, OutputMode};

/// Runs external commands to completion.
///
/// Implementations block until the child exits. A non-zero exit is *not* an
/// error at this level; callers decide what a failed exit means via
/// [`CommandOutput::is_success`] or [`CommandOutput::into_result`].
pub trait CommandRunner: Send + Sync {
    /// Run the command and wait for it.
    ///
    /// Returns `Err` only when the process could not be started.
    fn run(&self, invocation: &Invocation) -> ExecResult<CommandOutput>;
}

/// [`CommandRunner`] backed by `std::process`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> ExecResult<CommandOutput> {
        debug!(command = %invocation.display(), "running");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).envs(&invocation.env);
        if let Some(cwd) = &invocation.cwd {
            if !cwd.is_dir() {
                return Err(ExecError::MissingWorkingDir(cwd.clone()));
            }
            command.current_dir(cwd);
        }

        let spawn_err = |source| ExecError::Spawn {
            program: invocation.program_name(),
            source,
        };

        match invocation.output {
            OutputMode::Inherit => {
                let status = command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(spawn_err)?;
                Ok(CommandOutput {
                    code: status.code(),
                    ..Default::default()
                })
            }
            OutputMode::Capture => {
                let output = command.stdin(Stdio::null()).output().map_err(spawn_err)?;
                Ok(CommandOutput {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_exit_code() {
        let inv = Invocation::new("sh").args(["-c", "echo hello; exit 3"]);
        let out = SystemRunner.run(&inv).unwrap();
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout.trim(), "hello");
        assert!(!out.is_success());
    }

    #[test]
    fn passes_environment() {
        let inv = Invocation::new("sh")
            .args(["-c", "printf %s \"$FWPUB_TEST\""])
            .env("FWPUB_TEST", "value");
        let out = SystemRunner.run(&inv).unwrap();
        assert_eq!(out.stdout, "value");
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let inv = Invocation::new("fwpub-definitely-not-installed");
        let err = SystemRunner.run(&inv).unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[test]
    fn missing_working_dir() {
        let inv = Invocation::new("sh").current_dir("/nonexistent/fwpub");
        let err = SystemRunner.run(&inv).unwrap_err();
        assert!(matches!(err, ExecError::MissingWorkingDir(_)));
    }
}
