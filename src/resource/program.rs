//! Program capability: run an executable and stream its standard output.
//!
//! The reply head is handed in already serialized and is only written once
//! the child produces output or exits. That leaves room to answer with a
//! clean 504 page when the child never says anything before the deadline.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, ChildStdout, Command};
use tokio::time::{Instant, timeout_at};

use crate::resource::resolve_path;

/// Default buffer size for streaming
const BUFFER_SIZE: usize = 8192;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot run {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The command line for one program run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable, resolved against the root
    pub command: PathBuf,
    /// `argv[0]`: the path as configured
    pub argv0: OsString,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(path: &Path, arg: Option<&Path>, root: &Path, query: Option<&str>) -> Self {
        let mut args = Vec::new();
        if let Some(arg) = arg {
            args.push(resolve_path(root, arg).into_os_string());
        }
        if let Some(query) = query {
            args.push(OsString::from(query));
        }

        Self {
            command: resolve_path(root, path),
            argv0: path.as_os_str().to_os_string(),
            args,
        }
    }
}

/// How a streamed run ended.
#[derive(Debug)]
pub enum Outcome {
    Exited(ExitStatus),
    /// The child was killed at the deadline
    TimedOut { head_sent: bool },
}

/// A spawned child whose output has not been read yet.
#[derive(Debug)]
pub struct Running {
    child: Child,
    stdout: ChildStdout,
}

/// Starts the program with exactly the given environment.
pub fn spawn(invocation: &Invocation, env: &BTreeMap<String, String>) -> Result<Running, ExecError> {
    let mut cmd = Command::new(&invocation.command);
    #[cfg(unix)]
    cmd.arg0(&invocation.argv0);
    cmd.args(&invocation.args)
        .env_clear()
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
        path: invocation.command.clone(),
        source,
    })?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("child stdout was not captured"))?;

    tracing::debug!(
        command = %invocation.command.display(),
        args = ?invocation.args,
        pid = child.id(),
        "Program started"
    );

    Ok(Running { child, stdout })
}

impl Running {
    /// Writes `head` followed by everything the child prints, then waits for
    /// it to exit. Both the output and the exit are bounded by `limit`.
    pub async fn stream<W>(mut self, head: &[u8], out: &mut W, limit: Duration) -> Result<Outcome, ExecError>
    where
        W: AsyncWrite + Unpin,
    {
        let deadline = Instant::now() + limit;
        let mut buf = vec![0u8; BUFFER_SIZE];
        let mut head_sent = false;

        loop {
            let n = match timeout_at(deadline, self.stdout.read(&mut buf)).await {
                Ok(read) => read?,
                Err(_) => {
                    self.kill().await;
                    return Ok(Outcome::TimedOut { head_sent });
                }
            };

            if !head_sent {
                out.write_all(head).await?;
                head_sent = true;
            }
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n]).await?;
        }
        out.flush().await?;

        match timeout_at(deadline, self.child.wait()).await {
            Ok(status) => Ok(Outcome::Exited(status?)),
            Err(_) => {
                self.kill().await;
                Ok(Outcome::TimedOut { head_sent })
            }
        }
    }

    async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::warn!(error = %e, "Failed to kill program");
        }
    }
}
