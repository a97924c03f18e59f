//! Per-keyword bundle assembly
//!
//! For every keyword the orchestrator walks the same fixed sequence:
//!
//! ```text
//! Reset -> Scaffold -> CopyBulk -> RewriteEntry -> CopyRootFiles
//!       -> CopyProjectFiles -> ScanAndCopyMatched -> Done
//! ```
//!
//! After all keywords, the triggers folder is bundled verbatim into its own
//! target. Any I/O failure aborts the whole run; targets finished before
//! the failure stay on disk and a half-written target is left as is, since
//! the next run deletes it first.
//!
//! Only one run may use a build root at a time. [`Orchestrator::run`] holds
//! the build root lock for its whole duration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::report::{BuildReport, CopyKind, PlanReport, PlannedFile, TargetReport};
use crate::domain::{Decision, Destination, EntrypointRewriter, Keyword, RuleSet};
use crate::storage::fsops;
use crate::storage::{BuildConfig, BuildLock, ConfigError, Project};

/// The three directories a build works with
#[derive(Debug, Clone)]
pub struct BuildLayout {
    /// Compiled output that gets partitioned
    pub source_dir: PathBuf,
    /// Parent of every BuildTarget
    pub build_dir: PathBuf,
    /// Where manifests and deployment templates live
    pub project_root: PathBuf,
}

impl BuildLayout {
    pub fn for_project(project: &Project) -> Self {
        Self {
            source_dir: project.source_dir(),
            build_dir: project.build_dir(),
            project_root: project.root().to_path_buf(),
        }
    }

    /// Directory of the BuildTarget for `name`
    pub fn target_dir(&self, name: &str) -> PathBuf {
        self.build_dir.join(name)
    }
}

/// Builds per-keyword deployment bundles from a compiled source tree
pub struct Orchestrator {
    layout: BuildLayout,
    config: BuildConfig,
    rules: RuleSet,
    rewriter: EntrypointRewriter,
}

impl Orchestrator {
    pub fn new(layout: BuildLayout, config: BuildConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rules = config.rules();
        let rewriter = config.rewriter()?;

        Ok(Self {
            layout,
            config,
            rules,
            rewriter,
        })
    }

    pub fn for_project(project: &Project) -> Result<Self> {
        let config = project.config().project.build.clone();
        Ok(Self::new(BuildLayout::for_project(project), config)?)
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    /// Builds every keyword in order, then the triggers bundle
    pub fn run(&self, keywords: &[Keyword], with_triggers: bool) -> Result<BuildReport> {
        self.run_with(keywords, with_triggers, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_target` as each target finishes
    pub fn run_with(
        &self,
        keywords: &[Keyword],
        with_triggers: bool,
        mut on_target: impl FnMut(&TargetReport),
    ) -> Result<BuildReport> {
        if keywords.is_empty() {
            bail!("At least one keyword is required");
        }
        self.require_source()?;
        self.check_target_names(keywords)?;

        let _lock = BuildLock::acquire(&self.layout.build_dir)?;
        let mut report = BuildReport::default();

        for keyword in keywords {
            let target = self.build_keyword(keyword)?;
            on_target(&target);
            report.targets.push(target);
        }

        if with_triggers && !self.config.triggers_folder.is_empty() {
            match self.build_triggers()? {
                Some(triggers) => {
                    on_target(&triggers);
                    report.triggers = Some(triggers);
                }
                None => report.warnings.push(format!(
                    "Triggers folder not found in {}",
                    self.layout.source_dir.display()
                )),
            }
        }

        Ok(report)
    }

    /// Rebuilds the BuildTarget for one keyword from scratch
    pub fn build_keyword(&self, keyword: &Keyword) -> Result<TargetReport> {
        let source = &self.layout.source_dir;
        let target = self.layout.target_dir(keyword.as_str());
        let mut report = TargetReport::new(keyword.as_str(), &target);

        // Reset
        report.reset = fsops::remove_tree(&target)?;

        // Scaffold
        fsops::ensure_dir(&target)?;
        for sub in &self.config.subfolders {
            fsops::ensure_dir(&target.join(sub))?;
        }

        // CopyBulk
        for folder in &self.config.bulk_folders {
            let src = source.join(folder);
            if src.is_dir() {
                for (from, to) in fsops::copy_tree(&src, &target.join(folder))? {
                    report.record(CopyKind::BulkFolder, from, to);
                }
            }
        }

        // RewriteEntry
        let entry_src = source.join(&self.config.entry_file);
        if entry_src.is_file() {
            let entry_dest = target.join(&self.config.entry_file);
            fsops::copy_file(&entry_src, &entry_dest)?;

            let text = fsops::read_text(&entry_dest)?;
            let rewrite = self.rewriter.rewrite(&text, keyword);
            fsops::write_atomic(&entry_dest, &rewrite.text)?;

            report.entry = Some(rewrite.stats);
            report.record(CopyKind::Entry, entry_src, entry_dest);
        } else {
            report.warn(format!(
                "{} not found in {}",
                self.config.entry_file,
                source.display()
            ));
        }

        // CopyRootFiles
        for name in &self.config.root_files {
            if *name == self.config.entry_file {
                continue;
            }
            let src = source.join(name);
            if src.is_file() {
                let dest = target.join(name);
                fsops::copy_file(&src, &dest)?;
                report.record(CopyKind::RootFile, src, dest);
            }
        }

        // CopyProjectFiles
        for name in &self.config.project_files {
            let src = self.layout.project_root.join(name);
            if src.is_file() {
                let dest = target.join(name);
                fsops::copy_file(&src, &dest)?;
                report.record(CopyKind::ProjectFile, src, dest);
            } else {
                report.warn(format!("{} not found in project root", name));
            }
        }

        // ScanAndCopyMatched
        let files = fsops::list_files_recursive(source)?;
        report.scanned = files.len();

        for path in files {
            let relative = fsops::relative_slash_path(source, &path);
            if let Decision::Place { destination } = self.rules.classify(&relative, keyword) {
                let dest = placement_path(&target, &destination, &path);
                fsops::copy_file(&path, &dest)?;
                report.record(CopyKind::Matched, path, dest);
            }
        }

        // Done
        report.digest = fsops::tree_digest(&target)
            .with_context(|| format!("Failed to digest {}", target.display()))?;

        Ok(report)
    }

    /// Rebuilds the triggers bundle. Returns `None` if the source has no triggers folder.
    pub fn build_triggers(&self) -> Result<Option<TargetReport>> {
        let folder = &self.config.triggers_folder;
        let src = self.layout.source_dir.join(folder);
        if folder.is_empty() || !src.is_dir() {
            return Ok(None);
        }

        let target = self.layout.target_dir(folder);
        let mut report = TargetReport::new(folder, &target);

        report.reset = fsops::remove_tree(&target)?;
        for (from, to) in fsops::copy_tree(&src, &target)? {
            report.record(CopyKind::Triggers, from, to);
        }
        report.scanned = report.copies.len();
        report.digest = fsops::tree_digest(&target)?;

        Ok(Some(report))
    }

    /// Classifies the source tree for `keyword` without touching the disk
    pub fn plan(&self, keyword: &Keyword) -> Result<PlanReport> {
        self.require_source()?;
        let source = &self.layout.source_dir;

        let files = fsops::list_files_recursive(source)?
            .iter()
            .map(|path| {
                let relative = fsops::relative_slash_path(source, path);
                let decision = self.rules.classify(&relative, keyword);
                PlannedFile {
                    path: relative,
                    decision,
                }
            })
            .collect();

        Ok(PlanReport {
            keyword: keyword.to_string(),
            target: self.layout.target_dir(keyword.as_str()),
            files,
        })
    }

    /// A keyword target must not share its directory with the triggers bundle
    fn check_target_names(&self, keywords: &[Keyword]) -> Result<()> {
        let triggers = &self.config.triggers_folder;
        if triggers.is_empty() {
            return Ok(());
        }
        if let Some(keyword) = keywords.iter().find(|k| k.as_str().eq_ignore_ascii_case(triggers)) {
            bail!(
                "Keyword '{}' collides with the triggers bundle at {}",
                keyword,
                self.layout.target_dir(triggers).display()
            );
        }
        Ok(())
    }

    fn require_source(&self) -> Result<()> {
        if !self.layout.source_dir.is_dir() {
            bail!(
                "Source directory not found: {} (compile the project first)",
                self.layout.source_dir.display()
            );
        }
        Ok(())
    }
}

/// Matched files are flattened into their destination folder by file name
fn placement_path(target: &Path, destination: &Destination, file: &Path) -> PathBuf {
    let dir = match destination {
        Destination::Subfolder(name) => target.join(name),
        Destination::Root => target.to_path_buf(),
    };
    dir.join(file.file_name().unwrap_or_default())
}
