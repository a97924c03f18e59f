//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Write a default `lambdakit.toml` |
//! | `build <KEYWORD>...` | Assemble one Lambda bundle per keyword plus `triggers` |
//! | `generate <SERVICE> <FUNCTION> <METHOD> [ROUTE]` | Scaffold an endpoint |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable progress
//! - `json` - The full build or generate report
//!
//! ## Verbose Mode
//!
//! `--verbose` (or `-v`) logs every copied file and the digest of each
//! finished bundle to stderr:
//! ```bash
//! lambdakit --verbose build user
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod build_cmd;
mod generate_cmd;
mod output;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
