//! Resolve return addresses in a kernel crash trace to function names.
//!
//! # Pipeline
//!
//! Each line of the crash file goes through three stages:
//!
//! ```text
//! scanner::scan_line -> Symbolize::symbolize -> report::write_frame
//! ```
//!
//! - **scanner**: recognises `N: ... ra: 0x<hex>` frame lines, skipping the rest
//! - **resolver**: runs addr2line once per frame against the executable
//! - **report**: prints `N: <function>` in the order frames appear
//!
//! # Failure Policy
//!
//! Problems with the run as a whole (unreadable crash file, resolver that
//! cannot be started) stop processing and map to a distinct exit code via
//! [`TraceError::exit_code`]. Problems with a single lookup (non-zero exit,
//! timeout, output without a function field) are logged as warnings and the
//! frame is left out of the report.

mod error;
mod report;
mod resolver;
mod scanner;
mod trace;

pub use error::{ResolveError, TraceError};
pub use report::{select_token, write_frame};
pub use resolver::{Addr2Line, DEFAULT_RESOLVERS, Symbolize, locate_resolver};
pub use scanner::{FrameRecord, scan_line};
pub use trace::{Summary, resolve_crash_file, resolve_trace};
