//! Command-line argument parsing.

use std::{path::PathBuf, time::Duration};

use clap::Parser;

/// Parse a crash file and resolve its return addresses using addr2line.
#[derive(Parser, Debug)]
#[command(version)]
pub(crate) struct Args {
    /// Path to the crash file containing the stack trace.
    #[arg(short = 'c', long = "crash_file", alias = "crash-file")]
    pub crash_file: PathBuf,

    /// Path to the executable file used to generate the stack trace.
    #[arg(short, long)]
    pub executable: PathBuf,

    /// Resolver binary to run. If not specified, searched on PATH.
    #[arg(long, env = "ADDR2LINE")]
    pub addr2line: Option<PathBuf>,

    /// Toolchain prefix for the PATH search, e.g. `riscv64-unknown-elf-`.
    #[arg(long)]
    pub toolchain_prefix: Option<String>,

    /// Seconds to wait for each lookup before giving up on it.
    #[arg(long, value_name = "SECONDS", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Demangle function names.
    #[arg(long)]
    pub demangle: bool,

    /// Fail the run if any frame could not be resolved.
    #[arg(long)]
    pub strict: bool,

    /// Log debug diagnostics.
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    value
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .filter(|limit| !limit.is_zero())
        .ok_or_else(|| format!("expected a positive number of seconds, got '{value}'"))
}
