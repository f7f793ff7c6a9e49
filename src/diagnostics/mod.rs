//! Structured warnings and events collected while running a path.
//!
//! Every path owns a [`DiagnosticLog`]. Entries are also forwarded to the
//! `log` facade so they show up in whatever logger the caller installed,
//! but the log itself is the record a caller should inspect.
//!
//! # Example
//!
//! ```rust,ignore
//! let result = path.fit(None)?;
//! for d in &result.diagnostics {
//!     println!("{:?}: {}", d.kind, d.message);
//! }
//! ```

mod channel;

pub use channel::{Diagnostic, DiagnosticKind, DiagnosticLog};
