//! Bounded execution of external toolchains.
//!
//! Every compiler and disassembler run goes through [`run`]: the child gets
//! a null stdin, both output streams are drained on their own threads up to
//! a byte cap, and the wall clock is polled against a hard deadline. On Unix
//! the child leads its own process group, and the whole group is killed once
//! the child is done or out of time, so helpers a compiler driver leaves
//! behind can neither outlive the request nor hold its pipes open.

use std::ffi::OsStr;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::error::{Result, StudioError};
use crate::workspace::Workspace;


const POLL_INTERVAL: Duration = Duration::from_millis(5);
/// How long a stream may stay open after the child is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(100);
const CHUNK: usize = 8 * 1024;
#[cfg(unix)]
const SPAWN_RETRIES: u32 = 20;

/// Appended to a captured stream that hit [`Limits::output_bytes`].
pub const TRUNCATION_MARKER: &str = "\n...<output truncated>...\n";

/// Resource bounds for one child process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Wall-clock limit, measured from spawn.
    pub time: Duration,
    /// Bytes kept per stream; the rest is read and discarded.
    pub output_bytes: usize,
}

/// What a finished process left behind.
#[derive(Clone, Debug)]
pub struct RawInvocation {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl RawInvocation {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit 0 yields stdout; anything else becomes a [`StudioError::Tool`].
    pub fn into_result(self, program: &str) -> Result<String> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(StudioError::tool(
                program,
                self.exit_code,
                &self.stdout,
                &self.stderr,
            ))
        }
    }
}

/// Stage `source_text` at `source_path` inside the workspace, then run
/// `program` with the workspace as its working directory.
pub fn invoke<I, S>(
    workspace: &Workspace,
    source_path: &Path,
    source_text: &str,
    program: &Path,
    args: I,
    limits: Limits,
) -> Result<RawInvocation>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    workspace.write(source_path, source_text)?;
    run(program, args, workspace.path(), limits)
}

/// Run `program` to completion or until `limits.time` elapses.
pub fn run<I, S>(program: &Path, args: I, cwd: &Path, limits: Limits) -> Result<RawInvocation>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let name = program.display().to_string();
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt as _;
        cmd.process_group(0);
    }
    log::debug!("spawning {:?} in {}", cmd, cwd.display());

    let start = Instant::now();
    let deadline = start.checked_add(limits.time);
    let mut child = spawn(&mut cmd).map_err(|source| StudioError::Launch {
        program: name.clone(),
        source,
    })?;

    let stdout = child.stdout.take().map(|s| capture(s, limits.output_bytes));
    let stderr = child.stderr.take().map(|s| capture(s, limits.output_bytes));

    let waited = wait_with_deadline(&mut child, deadline);
    let elapsed = start.elapsed();
    kill_tree(&mut child);

    let drain_by = drain_deadline(deadline);
    let stdout = collect(stdout, drain_by, &name);
    let stderr = collect(stderr, drain_by, &name);

    match waited {
        Ok(Some(status)) => {
            log::debug!("'{}' exited with {} in {:?}", name, status, elapsed);
            Ok(RawInvocation {
                exit_code: status.code(),
                stdout,
                stderr,
                elapsed,
            })
        }
        Ok(None) => {
            log::warn!("'{}' killed after exceeding {:?}", name, limits.time);
            Err(StudioError::Timeout {
                program: name,
                limit: limits.time,
            })
        }
        Err(source) => Err(StudioError::Wait {
            program: name,
            source,
        }),
    }
}

/// Spawn, retrying briefly while the executable is still open for writing
/// somewhere (ETXTBSY), which happens right after a tool is replaced.
fn spawn(cmd: &mut Command) -> std::io::Result<Child> {
    let mut attempts = 0;
    loop {
        match cmd.spawn() {
            #[cfg(unix)]
            Err(e) if e.raw_os_error() == Some(libc::ETXTBSY) && attempts < SPAWN_RETRIES => {
                attempts += 1;
                std::thread::sleep(POLL_INTERVAL);
            }
            result => return result,
        }
    }
}

/// Poll until the child exits (`Some`) or the deadline passes (`None`).
fn wait_with_deadline(
    child: &mut Child,
    deadline: Option<Instant>,
) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Kill the child's process group, then the child itself, and reap it.
///
/// Also called after a normal exit: anything still in the group is a
/// leftover helper.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: plain syscall on a group created by `process_group(0)`.
            // While any member is alive the id cannot be reissued; if the
            // group is already empty the call fails with ESRCH.
            unsafe {
                libc::kill(-pgid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Read `stream` to EOF on its own thread, keeping at most `cap` bytes.
fn capture<R: Read + Send + 'static>(stream: R, cap: usize) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(drain(stream, cap));
    });
    rx
}

fn drain(mut stream: impl Read, cap: usize) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; CHUNK];
    let mut truncated = false;
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            // A read error just truncates the capture.
            Err(_) => break,
        };
        // Keep reading past the cap so the writer never blocks on a full pipe.
        if truncated {
            continue;
        }
        let room = cap.saturating_sub(buf.len());
        if n <= room {
            buf.extend_from_slice(&chunk[..n]);
        } else {
            buf.extend_from_slice(&chunk[..room]);
            truncated = true;
        }
    }

    let mut text = String::from_utf8_lossy(&buf).into_owned();
    if truncated {
        text.push_str(TRUNCATION_MARKER);
    }
    text
}

/// The run's own deadline, but never less than a short grace from now.
fn drain_deadline(deadline: Option<Instant>) -> Option<Instant> {
    let now = Instant::now();
    deadline.map(|d| now.checked_add(DRAIN_GRACE).map_or(d, |grace| d.max(grace)))
}

fn collect(rx: Option<Receiver<String>>, deadline: Option<Instant>, program: &str) -> String {
    let Some(rx) = rx else {
        return String::new();
    };
    let received = match deadline {
        Some(d) => rx.recv_timeout(d.saturating_duration_since(Instant::now())),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(text) => text,
        Err(RecvTimeoutError::Timeout) => {
            log::warn!("'{}' left an output stream open; dropping it", program);
            String::new()
        }
        Err(RecvTimeoutError::Disconnected) => String::new(),
    }
}
