use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};
use trace_resolver::{Addr2Line, TraceError, locate_resolver, resolve_crash_file};

mod cli;

use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(
                e.downcast_ref::<TraceError>()
                    .map_or(1, TraceError::exit_code),
            )
        }
    }
}

fn run(args: &Args) -> Result<()> {
    if !args.executable.exists() {
        return Err(TraceError::MissingExecutable(args.executable.clone()).into());
    }
    let tool = locate_resolver(args.addr2line.as_deref(), args.toolchain_prefix.as_deref())?;
    info!("Using resolver '{}'", tool.display());
    if let Some(limit) = args.timeout {
        info!("Resolver lookups limited to {}s", limit.as_secs_f64());
    }

    let mut addr2line = Addr2Line::new(tool, args.executable.clone())
        .demangle(args.demangle)
        .timeout(args.timeout);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = resolve_crash_file(&args.crash_file, &mut addr2line, &mut out)?;
    out.flush().context("failed to flush stdout")?;

    info!(
        "Resolved {} of {} frames in '{}'",
        summary.resolved,
        summary.matched,
        args.crash_file.display()
    );
    if args.strict && summary.unresolved > 0 {
        return Err(TraceError::Unresolved {
            count: summary.unresolved,
        }
        .into());
    }
    Ok(())
}
