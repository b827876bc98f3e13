//! Error types for address resolution and trace processing.

use std::{io, path::PathBuf, process::ExitStatus, time::Duration};

/// Error type for resolving a single address.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The resolver process could not be started.
    #[error("failed to spawn resolver '{}'", tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Waiting on the resolver process failed.
    #[error("failed to wait for resolver '{}'", tool.display())]
    Wait {
        tool: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The resolver ran but reported failure.
    #[error("resolver exited with {status} for address {address}: {stderr}")]
    Failed {
        address: String,
        status: ExitStatus,
        stderr: String,
    },
    /// The resolver did not finish within the configured limit.
    #[error("resolver timed out after {}s for address {address}", timeout.as_secs_f64())]
    TimedOut { address: String, timeout: Duration },
}

impl ResolveError {
    /// Whether the error means no further address can be resolved either.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ResolveError::Spawn { .. } | ResolveError::Wait { .. })
    }
}

/// Error type for a whole run over a crash file.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The crash file could not be opened.
    #[error("failed to open crash file '{}'", path.display())]
    OpenCrashFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Reading the crash file failed partway through.
    #[error("failed to read crash file at line {line}")]
    ReadCrashFile {
        line: usize,
        #[source]
        source: io::Error,
    },
    /// The executable to resolve against is missing.
    #[error("executable '{}' does not exist", .0.display())]
    MissingExecutable(PathBuf),
    /// No resolver binary was found.
    #[error("could not locate resolver, tried: {}", tried.join(", "))]
    ResolverNotFound { tried: Vec<String> },
    /// The resolver could not be run at all.
    #[error(transparent)]
    Resolver(ResolveError),
    /// Frames were left unresolved in strict mode.
    #[error("{count} frame(s) could not be resolved")]
    Unresolved { count: usize },
    /// Writing a report line failed.
    #[error("failed to write report")]
    Write(#[source] io::Error),
}

impl TraceError {
    /// Process exit status for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            TraceError::Write(_) => 1,
            TraceError::OpenCrashFile { .. }
            | TraceError::ReadCrashFile { .. }
            | TraceError::MissingExecutable(_) => 3,
            TraceError::ResolverNotFound { .. } | TraceError::Resolver(_) => 4,
            TraceError::Unresolved { .. } => 5,
        }
    }
}
