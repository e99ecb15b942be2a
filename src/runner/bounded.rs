//! Bounded-time capture of a child process.

use std::io::{Read, Write};
use std::process::{Child, ChildStdin, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::core::ExecutionOutcome;
use crate::util::process::ProcessBuilder;

/// Default wall-clock budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long output may keep arriving after the child is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

const CHUNK_SIZE: usize = 8192;

/// Runs a command for at most a fixed duration and classifies the outcome.
///
/// Output streams are drained while the program runs. When the deadline
/// passes the child and everything in its process group are killed and
/// reaped; the output collected so far decides between a timeout with
/// output (a long-running program, treated as success) and a silent timeout.
///
/// A descendant that left the group (`setsid`, double fork) can keep the
/// pipes open after the kill. Collection stops a short grace period after
/// the child is gone and the reader threads are left to finish on their own.
#[derive(Debug, Clone, Copy)]
pub struct BoundedExecutor {
    timeout: Duration,
}

impl Default for BoundedExecutor {
    fn default() -> Self {
        BoundedExecutor::new(DEFAULT_TIMEOUT)
    }
}

impl BoundedExecutor {
    pub fn new(timeout: Duration) -> Self {
        BoundedExecutor { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `cmd`, optionally feeding it `stdin`.
    ///
    /// Supplied input is written and the stream is then closed. Without
    /// input the stream stays open, so a program waiting for a line behaves
    /// like any other interactive program and runs into the deadline.
    pub fn execute(&self, cmd: &ProcessBuilder, stdin: Option<&str>) -> ExecutionOutcome {
        let program = cmd.get_program().display().to_string();
        tracing::debug!("Running: {}", cmd.display_command());

        let mut command = cmd.build_command();
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("Failed to spawn `{}`: {}", program, e);
                return ExecutionOutcome::failed(format!("failed to spawn `{}`: {}", program, e));
            }
        };

        let (tx, rx) = mpsc::channel();
        if let Some(pipe) = child.stdout.take() {
            drain(pipe, Stream::Stdout, tx.clone());
        }
        if let Some(pipe) = child.stderr.take() {
            drain(pipe, Stream::Stderr, tx.clone());
        }
        drop(tx);

        let mut held_stdin: Option<ChildStdin> = None;
        match (stdin.filter(|s| !s.is_empty()), child.stdin.take()) {
            (Some(text), Some(pipe)) => feed(pipe, text.to_owned()),
            (_, pipe) => held_stdin = pipe,
        }

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break Ok(Some(status)),
                Ok(None) if Instant::now() >= deadline => break Ok(None),
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => break Err(e),
            }
        };

        match status {
            // The leader is reaped, so its pid no longer pins the group id.
            Ok(Some(_)) => {
                if group_alive(&child) {
                    kill_tree(&mut child);
                }
            }
            _ => {
                kill_tree(&mut child);
                let _ = child.wait();
            }
        }
        drop(held_stdin);

        let captured = collect(&rx, Instant::now() + DRAIN_GRACE);
        let stdout = String::from_utf8_lossy(&captured.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&captured.stderr).into_owned();

        match status {
            Ok(Some(status)) => {
                tracing::debug!("`{}` exited with {}", program, status);
                ExecutionOutcome::completed(stdout, stderr, status.code())
            }
            Ok(None) => {
                tracing::info!(
                    "`{}` still running after {:?}, killed",
                    program,
                    self.timeout
                );
                ExecutionOutcome::timed_out(stdout, stderr)
            }
            Err(e) => ExecutionOutcome::failed(format!("failed to wait for `{}`: {}", program, e)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug, Default)]
struct Captured {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl Captured {
    fn push(&mut self, stream: Stream, chunk: Vec<u8>) {
        match stream {
            Stream::Stdout => self.stdout.extend_from_slice(&chunk),
            Stream::Stderr => self.stderr.extend_from_slice(&chunk),
        }
    }
}

/// Forward chunks read from `reader` until EOF or until nobody listens.
fn drain<R: Read + Send + 'static>(mut reader: R, stream: Stream, tx: Sender<(Stream, Vec<u8>)>) {
    thread::spawn(move || {
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            match reader.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send((stream, buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
            }
        }
    });
}

fn feed(mut pipe: ChildStdin, text: String) {
    thread::spawn(move || {
        // A program that exits without reading closes the pipe; that is fine.
        let _ = pipe.write_all(text.as_bytes());
    });
}

/// Gather output until every reader hit EOF or `until` passes.
fn collect(rx: &Receiver<(Stream, Vec<u8>)>, until: Instant) -> Captured {
    let mut captured = Captured::default();
    loop {
        let remaining = until.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((stream, chunk)) => captured.push(stream, chunk),
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                // Whatever is already queued still counts.
                for (stream, chunk) in rx.try_iter() {
                    captured.push(stream, chunk);
                }
                tracing::warn!("Output pipes still open after the child exited, detaching readers");
                break;
            }
        }
    }
    captured
}

/// Whether any process is left in the child's group.
///
/// A process group id is not reused while a member is alive, so when this
/// holds the group still belongs to the child's descendants.
#[cfg(unix)]
fn group_alive(child: &Child) -> bool {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return false;
    };
    // SAFETY: kill(2) with signal 0 only checks for existence.
    unsafe { libc::kill(-pgid, 0) == 0 }
}

#[cfg(not(unix))]
fn group_alive(_child: &Child) -> bool {
    false
}

/// Kill the child's whole process group.
#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        let _ = child.kill();
        return;
    };
    // SAFETY: kill(2) takes no pointers; the group was created at spawn.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}
