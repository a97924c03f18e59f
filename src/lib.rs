//! lambdakit - Lambda bundle partitioning for serverless Express projects
//!
//! One Express app is compiled once, then split into one deployment bundle
//! per service keyword. Each bundle carries the shared folders, its own
//! routes, controllers and handlers, and an entry file rewritten so that
//! only its own routes are mounted. A scaffolding command adds new
//! endpoints to the sources in the layout the splitter expects.

pub mod build;
pub mod cli;
pub mod domain;
pub mod scaffold;
pub mod storage;

pub use build::{BuildLayout, BuildReport, Orchestrator, TargetReport};
pub use domain::{Decision, Destination, EntrypointRewriter, Keyword, RewriteMode, RuleSet};
pub use storage::{BuildConfig, Config, Project};
