//! Domain logic for lambdakit
//!
//! Keyword matching, file classification and entry document rewriting,
//! without any I/O concerns.

mod classify;
mod entrypoint;
mod keyword;

pub use classify::{Decision, Destination, PlacementRule, RuleSet};
pub use entrypoint::{
    EntrypointRewriter, Rewrite, RewriteMode, RewriteStats, DEFAULT_IMPORT_PATTERN,
    DEFAULT_MOUNT_PATTERN,
};
pub use keyword::{Keyword, KeywordError};
