//! Build results
//!
//! The orchestrator never prints. It returns these reports and the CLI
//! renders them as text or JSON.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{Decision, RewriteStats};

/// Why a file was copied into a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyKind {
    BulkFolder,
    Entry,
    RootFile,
    ProjectFile,
    Matched,
    Triggers,
}

impl CopyKind {
    pub fn as_str(&self) -> &str {
        match self {
            CopyKind::BulkFolder => "bulk",
            CopyKind::Entry => "entry",
            CopyKind::RootFile => "root",
            CopyKind::ProjectFile => "project",
            CopyKind::Matched => "matched",
            CopyKind::Triggers => "triggers",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyAction {
    pub kind: CopyKind,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// What happened to one BuildTarget
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub name: String,
    pub dir: PathBuf,
    /// A previous build was deleted first
    pub reset: bool,
    pub copies: Vec<CopyAction>,
    /// Entry rewrite counts, if the entry file existed
    pub entry: Option<RewriteStats>,
    /// Files seen while scanning the source tree
    pub scanned: usize,
    pub warnings: Vec<String>,
    /// blake3 digest of the finished target's contents
    pub digest: String,
}

impl TargetReport {
    pub fn new(name: &str, dir: &Path) -> Self {
        Self {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            reset: false,
            copies: Vec::new(),
            entry: None,
            scanned: 0,
            warnings: Vec::new(),
            digest: String::new(),
        }
    }

    pub fn record(&mut self, kind: CopyKind, from: PathBuf, to: PathBuf) {
        self.copies.push(CopyAction { kind, from, to });
    }

    /// Number of copies of the given kind
    pub fn count(&self, kind: CopyKind) -> usize {
        self.copies.iter().filter(|c| c.kind == kind).count()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Result of a whole `build` run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub targets: Vec<TargetReport>,
    pub triggers: Option<TargetReport>,
    pub warnings: Vec<String>,
}

impl BuildReport {
    pub fn target(&self, name: &str) -> Option<&TargetReport> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Warnings from every target plus run-level ones
    pub fn all_warnings(&self) -> impl Iterator<Item = &str> {
        self.targets
            .iter()
            .chain(self.triggers.iter())
            .flat_map(|t| t.warnings.iter())
            .chain(self.warnings.iter())
            .map(|w| w.as_str())
    }
}

/// One file's classification in a dry run
#[derive(Debug, Clone, Serialize)]
pub struct PlannedFile {
    pub path: String,
    #[serde(flatten)]
    pub decision: Decision,
}

/// Classification of the whole source tree for one keyword
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub keyword: String,
    pub target: PathBuf,
    pub files: Vec<PlannedFile>,
}

impl PlanReport {
    /// Files that would be copied by keyword match
    pub fn placed(&self) -> impl Iterator<Item = &PlannedFile> {
        self.files.iter().filter(|f| f.decision.is_placed())
    }
}
