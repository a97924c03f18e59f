//! # Storage Layer
//!
//! Everything that touches the disk: filesystem primitives, configuration
//! and project layout.
//!
//! ## Project Layout
//!
//! ```text
//! project/
//! ├── lambdakit.toml        # Optional configuration
//! ├── package.json          # Copied into every bundle
//! ├── template.yaml         # SAM template, edited by `generate`
//! ├── src/                  # TypeScript sources, edited by `generate`
//! ├── dist/                 # Compiled output, read by `build`
//! └── build/
//!     ├── .lambdakit.lock   # Held while a build runs
//!     ├── user/             # One BuildTarget per keyword
//!     └── triggers/         # Shared triggers bundle
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Resolves project paths and guards the build root
//! - [`Config`] - Project configuration from `lambdakit.toml`
//! - [`fsops`] - Copy, delete and list primitives used by the build

mod config;
pub mod fsops;
mod project;

pub use config::{BuildConfig, Config, ConfigError, EntryConfig, GenerateConfig, ProjectConfig, CONFIG_FILE};
pub use fsops::FsError;
pub use project::{BuildLock, Project, ProjectError};
