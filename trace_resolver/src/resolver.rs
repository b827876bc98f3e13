//! Address resolution through an external addr2line binary.

use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Child, Command, Output, Stdio},
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};

use log::debug;

use crate::error::{ResolveError, TraceError};

/// Tool names searched on `PATH` when no resolver is configured.
pub const DEFAULT_RESOLVERS: [&str; 2] = ["riscv64-unknown-elf-addr2line", "addr2line"];

/// Interval between checks on a resolver running under a timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Turns a return address into the resolver's text for it.
pub trait Symbolize {
    /// Resolve one `0x`-prefixed address, returning the trimmed output.
    fn symbolize(&mut self, address: &str) -> Result<String, ResolveError>;
}

/// Find the resolver binary to run.
///
/// An explicit path is used as-is once it is known to exist. Otherwise
/// `<prefix>addr2line` is searched on `PATH`, or [`DEFAULT_RESOLVERS`] in order
/// when no prefix is given.
pub fn locate_resolver(
    explicit: Option<&Path>,
    prefix: Option<&str>,
) -> Result<PathBuf, TraceError> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(TraceError::ResolverNotFound {
            tried: vec![path.display().to_string()],
        });
    }

    let candidates = match prefix {
        Some(prefix) => vec![format!("{prefix}addr2line")],
        None => DEFAULT_RESOLVERS.iter().map(|s| s.to_string()).collect(),
    };
    for name in &candidates {
        match which::which(name) {
            Ok(path) => return Ok(path),
            Err(e) => debug!("resolver candidate '{name}' not usable: {e}"),
        }
    }
    Err(TraceError::ResolverNotFound { tried: candidates })
}

/// Runs addr2line once per address against a fixed executable.
#[derive(Debug, Clone)]
pub struct Addr2Line {
    tool: PathBuf,
    executable: PathBuf,
    demangle: bool,
    timeout: Option<Duration>,
}

impl Addr2Line {
    pub fn new(tool: PathBuf, executable: PathBuf) -> Self {
        Self {
            tool,
            executable,
            demangle: false,
            timeout: None,
        }
    }

    /// Ask the resolver to demangle function names.
    pub fn demangle(mut self, demangle: bool) -> Self {
        self.demangle = demangle;
        self
    }

    /// Kill the resolver when a lookup takes longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, address: &str) -> Command {
        let mut cmd = Command::new(&self.tool);
        cmd.arg("-e").arg(&self.executable).arg("-a").arg("-f");
        if self.demangle {
            cmd.arg("-C");
        }
        cmd.arg(address).stdin(Stdio::null());
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> ResolveError {
        ResolveError::Spawn {
            tool: self.tool.clone(),
            source,
        }
    }

    /// Run `cmd` with `limit` covering both the child and its output pipes, so a
    /// descendant that keeps a pipe open cannot outlast the deadline either.
    fn output_with_timeout(
        &self,
        mut cmd: Command,
        address: &str,
        limit: Duration,
    ) -> Result<Output, ResolveError> {
        let mut child = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + limit;
        let timed_out = || ResolveError::TimedOut {
            address: address.to_string(),
            timeout: limit,
        };
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    kill(&mut child);
                    return Err(timed_out());
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    kill(&mut child);
                    return Err(ResolveError::Wait {
                        tool: self.tool.clone(),
                        source,
                    });
                }
            }
        };

        let remaining = || deadline.saturating_duration_since(Instant::now());
        let stdout = stdout.recv_timeout(remaining()).map_err(|_| timed_out())?;
        let stderr = stderr.recv_timeout(remaining()).map_err(|_| timed_out())?;
        Ok(Output {
            status,
            stdout,
            stderr,
        })
    }
}

impl Symbolize for Addr2Line {
    fn symbolize(&mut self, address: &str) -> Result<String, ResolveError> {
        debug!(
            "Resolving {address} in '{}' with '{}'",
            self.executable.display(),
            self.tool.display()
        );
        let mut cmd = self.command(address);
        let output = match self.timeout {
            Some(limit) => self.output_with_timeout(cmd, address, limit)?,
            None => cmd.output().map_err(|e| self.spawn_error(e))?,
        };

        if !output.status.success() {
            return Err(ResolveError::Failed {
                address: address.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Read a child pipe to the end on a helper thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            // A read error only truncates diagnostics; the exit status decides.
            let _ = pipe.read_to_end(&mut buf);
        }
        // The receiver is gone once the lookup has timed out.
        let _ = tx.send(buf);
    });
    rx
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
