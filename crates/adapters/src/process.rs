// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Script process execution.
//!
//! Each script runs as `<shell> <script-file>` in its own process group so
//! that termination reaches every process the script started. Without that,
//! a killed shell leaves children such as `sleep` holding the output pipes
//! open and the drain never sees EOF.

use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio_util::sync::CancellationToken;

/// Errors from script processes
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {shell}: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    #[error("child process has no {0} pipe")]
    MissingPipe(&'static str),

    #[error("output capture failed: {0}")]
    Io(#[from] std::io::Error),
}

/// How a script process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    /// Terminating signal, if any
    pub signal: Option<i32>,
    /// Termination was requested through the cancel token
    pub terminated: bool,
}

impl ExitReport {
    fn from_status(status: ExitStatus, terminated: bool) -> Self {
        Self { code: status.code(), signal: status.signal(), terminated }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Line appended to the captured output for an unsuccessful exit.
    pub fn diagnostic(&self) -> Option<String> {
        match (self.code, self.signal) {
            (Some(0), _) => None,
            (Some(code), _) => Some(format!("Script execution failed with exit code: {code}")),
            (None, Some(signal)) => Some(format!("Script terminated by signal {signal}")),
            (None, None) => Some("Script terminated with unknown status".to_string()),
        }
    }
}

/// A live script process with both output pipes attached.
pub struct ScriptProcess {
    child: Child,
    stdout: ChildStdout,
    stderr: ChildStderr,
}

/// Spawn `shell script` with `cwd` as working directory and piped output.
pub fn spawn_script(shell: &Path, script: &Path, cwd: &Path) -> Result<ScriptProcess, ProcessError> {
    let mut cmd = Command::new(shell);
    cmd.arg(script)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|source| ProcessError::Spawn { shell: shell.display().to_string(), source })?;
    let stdout = child.stdout.take().ok_or(ProcessError::MissingPipe("stdout"))?;
    let stderr = child.stderr.take().ok_or(ProcessError::MissingPipe("stderr"))?;
    Ok(ScriptProcess { child, stdout, stderr })
}

impl ScriptProcess {
    /// OS process ID (also the process group ID).
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Drain output into `sink` and wait for exit.
    ///
    /// stdout is copied to the sink as it arrives; stderr is drained
    /// concurrently into memory and appended after stdout. When `cancel`
    /// fires the whole process group is killed and draining continues until
    /// the pipes close, so the caller always gets an exit report.
    pub async fn run_to_end<W>(
        self,
        sink: &mut W,
        cancel: &CancellationToken,
    ) -> Result<ExitReport, ProcessError>
    where
        W: AsyncWrite + Unpin,
    {
        let ScriptProcess { mut child, stdout, stderr } = self;
        let pgid = child.id();

        let mut terminated = false;
        let status = {
            let work = async {
                let (drained, status) =
                    tokio::join!(drain_into(stdout, stderr, &mut *sink), child.wait());
                drained?;
                Ok::<_, std::io::Error>(status?)
            };
            tokio::pin!(work);

            loop {
                tokio::select! {
                    result = &mut work => break result?,
                    _ = cancel.cancelled(), if !terminated => {
                        terminated = true;
                        terminate_group(pgid);
                    }
                }
            }
        };
        sink.flush().await?;
        Ok(ExitReport::from_status(status, terminated))
    }
}

async fn drain_into<W>(
    mut stdout: ChildStdout,
    mut stderr: ChildStderr,
    sink: &mut W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut err_buf = Vec::new();
    let (copied, read) =
        tokio::join!(tokio::io::copy(&mut stdout, sink), read_all(&mut stderr, &mut err_buf));
    copied?;
    read?;
    sink.write_all(&err_buf).await
}

async fn read_all<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<()> {
    reader.read_to_end(buf).await.map(|_| ())
}

/// Kill the process group led by `pgid`. Errors (already exited) are ignored.
fn terminate_group(pgid: Option<u32>) {
    let Some(pgid) = pgid else {
        return;
    };
    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        tracing::debug!(pgid, error = %e, "killpg failed (process group already gone?)");
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
