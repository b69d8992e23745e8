use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{ExecError, ExecResult};

/// How a child's stdout/stderr are handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Collect output into the returned [`CommandOutput`].
    #[default]
    Capture,
    /// Stream output straight to the operator's terminal.
    Inherit,
}

/// A fully described external command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub output: OutputMode,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            output: OutputMode::Capture,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Stream output to the terminal instead of capturing it.
    pub fn inherit_output(mut self) -> Self {
        self.output = OutputMode::Inherit;
        self
    }

    /// Program file name without directory or extension (`gh`, `gsutil`).
    pub fn program_name(&self) -> String {
        program_stem(&self.program)
    }

    /// `program arg1 arg2 ...`, for logs.
    pub fn display(&self) -> String {
        let mut s = self.program.display().to_string();
        for arg in &self.args {
            s.push(' ');
            s.push_str(arg);
        }
        s
    }
}

pub(crate) fn program_stem(program: &Path) -> String {
    program
        .file_stem()
        .unwrap_or_else(|| OsStr::new(""))
        .to_string_lossy()
        .into_owned()
}

/// What a finished process left behind.
///
/// With [`OutputMode::Inherit`] both streams are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable exit status.
    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "signal".to_string(),
        }
    }

    /// Convert a non-zero exit into [`ExecError::Failed`].
    pub fn into_result(self, invocation: &Invocation) -> ExecResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ExecError::Failed {
                program: invocation.program_name(),
                status: self.status_text(),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_display() {
        let inv = Invocation::new("/usr/bin/gh")
            .args(["release", "view", "v1.2.2"])
            .arg("--repo")
            .arg("owner/repo")
            .env("A", "1");
        assert_eq!(inv.program_name(), "gh");
        assert_eq!(inv.display(), "/usr/bin/gh release view v1.2.2 --repo owner/repo");
        assert_eq!(inv.output, OutputMode::Capture);
        assert_eq!(inv.env.get("A").map(String::as_str), Some("1"));
    }

    #[test]
    fn windows_style_program_name() {
        let inv = Invocation::new("gh.exe");
        assert_eq!(inv.program_name(), "gh");
    }

    #[test]
    fn failure_into_result_keeps_stderr() {
        let inv = Invocation::new("gsutil");
        let err = CommandOutput::failure(1, "AccessDenied\n").into_result(&inv).unwrap_err();
        assert_eq!(err.to_string(), "gsutil exited with exit code 1: AccessDenied");
    }
}
