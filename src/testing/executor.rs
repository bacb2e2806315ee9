//! Subprocess execution
//!
//! The program under test is started directly (never through a shell) as
//! `program <script> <args...>`. Its three pipes are serviced by separate
//! tasks so a large stdin payload cannot deadlock against full output
//! buffers.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};

use crate::common::{Error, Result};

use super::scenario::{Scenario, TestOutput};

/// How long pipes may stay open after the process has exited or been killed
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Everything observed while running one scenario
#[derive(Debug, Clone)]
pub struct Execution {
    /// Command line, rendered for display only
    pub command: String,
    /// Captured output; `exit_code` is always set
    pub output: TestOutput,
    pub duration: Duration,
    /// The limit that expired, if the process had to be killed
    pub timed_out: Option<Duration>,
}

/// Runs scenarios against a program under test
#[async_trait]
pub trait ScenarioExecutor: Send + Sync {
    async fn run(&self, scenario: &Scenario) -> Result<Execution>;
}

#[async_trait]
impl<'a, T: ScenarioExecutor + ?Sized> ScenarioExecutor for &'a T {
    async fn run(&self, scenario: &Scenario) -> Result<Execution> {
        (**self).run(scenario).await
    }
}

/// Executor that spawns the program under test as a child process
#[derive(Debug, Clone)]
pub struct SubprocessExecutor {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl SubprocessExecutor {
    /// Create an executor, verifying that `program` is executable
    ///
    /// Bare names (no directory part) that don't exist relative to the
    /// working directory are looked up on PATH.
    pub fn new(program: impl AsRef<Path>, timeout: Option<Duration>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let program = resolve_program(program.as_ref(), &cwd)?;
        Ok(Self { program, timeout })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn render(&self, scenario: &Scenario) -> String {
        let mut words = vec![
            self.program.display().to_string(),
            scenario.path().display().to_string(),
        ];
        words.extend(scenario.args().iter().cloned());
        shell_words::join(words)
    }
}

#[async_trait]
impl ScenarioExecutor for SubprocessExecutor {
    async fn run(&self, scenario: &Scenario) -> Result<Execution> {
        let command = self.render(scenario);
        tracing::debug!("Invoke: `{}`", command);

        let started = Instant::now();
        let deadline = self.timeout.map(|limit| started + limit);

        let mut cmd = Command::new(&self.program);
        cmd.arg(scenario.path())
            .args(scenario.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so background children can be signalled too
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|error| Error::Spawn {
            program: self.program.display().to_string(),
            error,
        })?;
        let group = child.id();

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Internal("Failed to get child stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Internal("Failed to get child stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Internal("Failed to get child stderr".to_string()))?;

        let captured_out = Captured::default();
        let captured_err = Captured::default();
        let writer = tokio::spawn(feed(stdin, scenario.stdin().to_vec()));
        let out_reader = tokio::spawn(drain(stdout, captured_out.clone()));
        let err_reader = tokio::spawn(drain(stderr, captured_err.clone()));

        let (status, timed_out) = match deadline {
            Some(deadline) => match timeout_at(deadline, child.wait()).await {
                Ok(status) => (status?, None),
                Err(_) => {
                    tracing::warn!(
                        "Scenario '{}' timed out after {:?}, killing it",
                        scenario.name(),
                        self.timeout.unwrap_or_default()
                    );
                    (terminate(&mut child, group).await?, self.timeout)
                }
            },
            None => (child.wait().await?, None),
        };

        let grace = Instant::now() + DRAIN_GRACE;
        let drain_deadline = deadline.map_or(grace, |d| d.max(grace));
        let mut abandoned = false;
        for task in [writer, out_reader, err_reader] {
            match join(task, drain_deadline).await? {
                Some(result) => result?,
                None => abandoned = true,
            }
        }
        if abandoned {
            // Background children still hold a pipe; don't leave them running
            kill_group(group);
        }
        let stdout = captured_out.take();
        let stderr = captured_err.take();

        let duration = started.elapsed();
        tracing::debug!(
            "'{}' exited with {} in {:?}",
            scenario.name(),
            status,
            duration
        );

        Ok(Execution {
            command,
            output: TestOutput::new(stdout, stderr, Some(exit_code(status))),
            duration,
            timed_out,
        })
    }
}

/// Kill the child with its process group, then reap it
///
/// The child may have exited on its own since the deadline fired, in which
/// case the kill fails and its real status is returned.
async fn terminate(child: &mut Child, group: Option<u32>) -> io::Result<ExitStatus> {
    kill_group(group);
    if let Err(e) = child.start_kill() {
        tracing::debug!("Kill after timeout failed: {}", e);
    }
    child.wait().await
}

/// Write the whole payload, then close the pipe
async fn feed(mut stdin: ChildStdin, payload: Vec<u8>) -> io::Result<()> {
    let result = match stdin.write_all(&payload).await {
        // The program exited (or closed stdin) without reading everything
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("Program closed stdin before reading all input");
            Ok(())
        }
        other => other,
    };
    drop(stdin);
    result
}

/// Output collected by a pipe task, readable even if the task is aborted
#[derive(Debug, Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn extend(&self, bytes: &[u8]) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(bytes);
    }

    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}

async fn drain(mut pipe: impl AsyncRead + Unpin, captured: Captured) -> io::Result<()> {
    let mut chunk = vec![0u8; 8192];
    loop {
        let n = pipe.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        captured.extend(&chunk[..n]);
    }
}

/// SIGKILL every process in the group led by the child
#[cfg(unix)]
fn kill_group(group: Option<u32>) {
    let Some(pgid) = group.and_then(|id| libc::pid_t::try_from(id).ok()) else {
        return;
    };
    // SAFETY: killpg has no memory-safety preconditions
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } != 0 {
        tracing::debug!(
            "killpg({}) failed: {}",
            pgid,
            io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn kill_group(_group: Option<u32>) {}

/// Wait for a pipe task, abandoning it once `deadline` passes
///
/// Returns `None` when abandoned, which happens when a process left behind
/// by the program under test still holds the pipe open.
async fn join<T>(mut task: JoinHandle<T>, deadline: Instant) -> Result<Option<T>> {
    let joined = match timeout_at(deadline, &mut task).await {
        Ok(joined) => joined,
        Err(_) => {
            task.abort();
            tracing::warn!("Abandoning a pipe still held open after the program finished");
            return Ok(None);
        }
    };
    joined
        .map(Some)
        .map_err(|e| Error::Internal(format!("Pipe task failed: {}", e)))
}

/// Exit code of a finished process; signals map to `128 + signal`
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Resolve `program` against `cwd`, falling back to PATH for bare names
///
/// Existing files come back absolute: a bare relative name handed to
/// `Command::new` would be searched on PATH instead.
fn resolve_program(program: &Path, cwd: &Path) -> Result<PathBuf> {
    let local = cwd.join(program);
    let path = if local.exists() {
        local
    } else if program.components().count() == 1 {
        which::which(program).map_err(|_| Error::ProgramNotFound(program.to_path_buf()))?
    } else {
        return Err(Error::ProgramNotFound(program.to_path_buf()));
    };

    if !is_executable(&path) {
        return Err(Error::ProgramNotExecutable(path));
    }
    Ok(path)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
