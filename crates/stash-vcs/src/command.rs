//! Child-process execution for backend tools
//!
//! Every backend call is a blocking `hg`/`svn` process run from the
//! working-copy root. Failures keep the tool's stderr verbatim.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::{Error, Result};

/// A command-line tool with the environment it always runs with.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tool {
    program: &'static str,
    envs: &'static [(&'static str, &'static str)],
}

impl Tool {
    pub(crate) const fn new(
        program: &'static str,
        envs: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self { program, envs }
    }

    /// Run the tool in `cwd` and return its stdout.
    pub(crate) fn run<I, S>(&self, cwd: &Path, args: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_os_string())
            .collect();
        let rendered = args
            .iter()
            .map(|arg| arg.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(program = self.program, args = %rendered, cwd = %cwd.display(), "Running");

        let output = Command::new(self.program)
            .args(&args)
            .current_dir(cwd)
            .envs(self.envs.iter().copied())
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::ToolUnavailable {
                program: self.program.to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(Error::CommandFailed {
                program: self.program.to_string(),
                args: rendered,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            })
        }
    }

    /// Run the tool and decode stdout as UTF-8.
    pub(crate) fn run_text<I, S>(&self, cwd: &Path, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let stdout = self.run(cwd, args)?;
        String::from_utf8(stdout).map_err(|_| Error::NonUtf8Output {
            program: self.program.to_string(),
        })
    }
}
