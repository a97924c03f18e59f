//! # Build Pipeline
//!
//! Partitions a compiled source tree into one deployment bundle per
//! keyword plus a shared triggers bundle.
//!
//! ```text
//! dist/                         build/
//! ├── app.js           ──┬──▶   ├── user/      app.js rewritten for "user",
//! ├── controllers/       │      │              user* files sorted into subfolders,
//! ├── routes/            │      │              bulk folders and root files copied
//! ├── models/   (bulk)   ├──▶   ├── fabric/
//! ├── utils/    (bulk)   │      │
//! └── triggers/          └──▶   └── triggers/  copied verbatim
//! ```

mod orchestrator;
mod report;

pub use orchestrator::{BuildLayout, Orchestrator};
pub use report::{BuildReport, CopyAction, CopyKind, PlanReport, PlannedFile, TargetReport};
