//! The scan, resolve and report pipeline over a crash file.

use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use log::{debug, warn};

use crate::{
    error::TraceError,
    report::{select_token, write_frame},
    resolver::Symbolize,
    scanner::scan_line,
};

/// Counts gathered over one crash file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Lines recognised as frame records.
    pub matched: usize,
    /// Frames written to the report.
    pub resolved: usize,
    /// Frames skipped because their lookup failed.
    pub unresolved: usize,
}

/// Open `path` and resolve every frame in it, in file order.
pub fn resolve_crash_file<S: Symbolize, W: Write>(
    path: &Path,
    symbolizer: &mut S,
    out: &mut W,
) -> Result<Summary, TraceError> {
    let file = File::open(path).map_err(|source| TraceError::OpenCrashFile {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Scanning crash file '{}'", path.display());
    resolve_trace(BufReader::new(file), symbolizer, out)
}

/// Resolve every frame read from `reader`, writing one line per frame to `out`.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`. Lines that are not frame records
/// are skipped. A lookup that fails or whose output has no function field is
/// logged and counted as unresolved; only failures to run the resolver at all
/// end the run.
pub fn resolve_trace<R: BufRead, S: Symbolize, W: Write>(
    mut reader: R,
    symbolizer: &mut S,
    out: &mut W,
) -> Result<Summary, TraceError> {
    let mut summary = Summary::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| TraceError::ReadCrashFile {
                line: line_no + 1,
                source,
            })?;
        if read == 0 {
            break;
        }

        for line in strip_terminator(&buf).split(|&b| b == b'\r') {
            line_no += 1;
            let line = String::from_utf8_lossy(line);
            resolve_line(&line, line_no, symbolizer, out, &mut summary)?;
        }
    }

    Ok(summary)
}

fn resolve_line<S: Symbolize, W: Write>(
    line: &str,
    line_no: usize,
    symbolizer: &mut S,
    out: &mut W,
    summary: &mut Summary,
) -> Result<(), TraceError> {
    let Some(frame) = scan_line(line) else {
        return Ok(());
    };
    summary.matched += 1;

    let output = match symbolizer.symbolize(frame.address) {
        Ok(output) => output,
        Err(e) if e.is_fatal() => return Err(TraceError::Resolver(e)),
        Err(e) => {
            warn!("frame {} on line {line_no} unresolved: {e}", frame.index);
            summary.unresolved += 1;
            return Ok(());
        }
    };
    let Some(token) = select_token(&output) else {
        warn!(
            "frame {} on line {line_no} unresolved: no function field for {} in {output:?}",
            frame.index, frame.address
        );
        summary.unresolved += 1;
        return Ok(());
    };

    write_frame(out, frame.index, token).map_err(TraceError::Write)?;
    summary.resolved += 1;
    Ok(())
}

/// Drop the `\n` or `\r\n` ending a chunk read up to `\n`.
fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
