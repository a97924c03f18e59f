//! `lambdakit build`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use super::output::Output;
use crate::build::{CopyKind, Orchestrator, PlanReport, TargetReport};
use crate::domain::{Decision, Destination, Keyword};
use crate::storage::Project;

#[derive(Args)]
pub struct BuildArgs {
    /// Service keywords, e.g. `user fabric`
    #[arg(required = true, value_name = "KEYWORD")]
    pub keywords: Vec<Keyword>,

    /// Compiled source tree (overrides build.source_dir)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Build root (overrides build.build_dir)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Skip the triggers bundle
    #[arg(long)]
    pub no_triggers: bool,

    /// Show which files each keyword would take, without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: BuildArgs, project_root: Option<&Path>, output: &Output) -> Result<()> {
    let mut project = Project::open_or_current(project_root)?;
    output.verbose_ctx("build", &format!("Project root: {}", project.root().display()));

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let build = &mut project.config_mut().project.build;
    if let Some(source) = args.source {
        build.source_dir = cwd.join(source);
    }
    if let Some(out) = args.out {
        build.build_dir = cwd.join(out);
    }

    let orchestrator = Orchestrator::for_project(&project)?;
    let layout = orchestrator.layout();
    output.verbose_ctx("build", &format!("Source: {}", layout.source_dir.display()));
    output.verbose_ctx("build", &format!("Output: {}", layout.build_dir.display()));
    output.verbose_ctx(
        "build",
        &format!("Entry rewrite mode: {}", project.config().project.build.entry.mode.as_str()),
    );

    if args.dry_run {
        return plan(&orchestrator, &args.keywords, output);
    }

    let names: Vec<&str> = args.keywords.iter().map(|k| k.as_str()).collect();
    output.line(&format!("Starting build process for keywords: {}", names.join(", ")));

    let report = orchestrator.run_with(&args.keywords, !args.no_triggers, |target| {
        print_target(output, target)
    })?;

    for warning in &report.warnings {
        output.warn(warning);
    }

    if output.is_json() {
        output.data(&report);
    } else {
        output.success("All builds completed successfully!");
    }

    Ok(())
}

fn print_target(output: &Output, target: &TargetReport) {
    if output.is_verbose() {
        for copy in &target.copies {
            output.verbose_ctx(
                copy.kind.as_str(),
                &format!("Copied file: {} -> {}", copy.from.display(), copy.to.display()),
            );
        }
    }
    for warning in &target.warnings {
        output.warn(warning);
    }

    if let Some(stats) = target.entry {
        output.line(&format!(
            "[{}] entry: kept {} of {} route imports, {} of {} route mounts",
            target.name, stats.imports_kept, stats.imports_found, stats.mounts_kept, stats.mounts_found
        ));
    }

    let matched = target.count(CopyKind::Matched);
    let summary = if target.count(CopyKind::Triggers) > 0 {
        format!("{} files", target.count(CopyKind::Triggers))
    } else {
        format!(
            "{} matched of {} scanned, {} from bulk folders",
            matched,
            target.scanned,
            target.count(CopyKind::BulkFolder)
        )
    };
    output.line(&format!(
        "[{}] built {} ({})",
        target.name,
        target.dir.display(),
        summary
    ));
    output.verbose_ctx("build", &format!("{} digest {}", target.name, target.digest));
}

fn plan(orchestrator: &Orchestrator, keywords: &[Keyword], output: &Output) -> Result<()> {
    let mut plans: Vec<PlanReport> = Vec::new();
    for keyword in keywords {
        plans.push(orchestrator.plan(keyword)?);
    }

    if output.is_json() {
        output.data(&plans);
        return Ok(());
    }

    for plan in &plans {
        output.line(&format!("{} -> {}", plan.keyword, plan.target.display()));
        for file in &plan.files {
            match &file.decision {
                Decision::Place { destination } => {
                    let dest = match destination {
                        Destination::Subfolder(name) => format!("{}/", name),
                        Destination::Root => "./".to_string(),
                    };
                    output.line(&format!("  {:<40} {}", file.path, dest));
                }
                other => output.verbose_ctx("plan", &format!("{} {:?}", file.path, other)),
            }
        }
        if plan.placed().next().is_none() {
            output.line("  (no matching files)");
        }
    }

    Ok(())
}
