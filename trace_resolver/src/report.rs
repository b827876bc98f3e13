//! Output lines for resolved frames.

use std::io::{self, Write};

/// Pick the field reported for a frame from the resolver output.
///
/// With `-a -f` addr2line prints the address first and the function name
/// second, so the second whitespace-separated token is taken. `None` when the
/// output has fewer than two tokens.
pub fn select_token(output: &str) -> Option<&str> {
    output.split_whitespace().nth(1)
}

/// Write one report line: `<index> <token>`.
pub fn write_frame<W: Write>(out: &mut W, index: &str, token: &str) -> io::Result<()> {
    writeln!(out, "{index} {token}")
}
