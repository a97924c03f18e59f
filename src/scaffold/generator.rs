//! Applies an [`EndpointSpec`] to a project's sources
//!
//! Each step checks whether its piece is already present before writing, so
//! running the generator twice with the same arguments changes nothing the
//! second time.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{templates, EndpointSpec, GenerateError};
use crate::storage::fsops;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Controller,
    Route,
    Handler,
    Template,
    Entry,
}

impl Step {
    pub fn as_str(&self) -> &str {
        match self {
            Step::Controller => "controller",
            Step::Route => "route",
            Step::Handler => "handler",
            Step::Template => "template",
            Step::Entry => "entry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub path: PathBuf,
    pub change: Change,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub endpoint: EndpointSpec,
    pub steps: Vec<StepReport>,
}

impl GenerateReport {
    /// True if no file was modified
    pub fn is_noop(&self) -> bool {
        self.steps.iter().all(|s| s.change == Change::Unchanged)
    }
}

/// Where the generator reads and writes
#[derive(Debug, Clone)]
pub struct SourceLayout {
    /// TypeScript source root (`src/`)
    pub src_dir: PathBuf,
    /// Entry file inside `src_dir`
    pub entry_file: String,
    /// SAM template
    pub template: PathBuf,
    /// Build folder name used for `CodeUri`
    pub build_dir: String,
}

pub struct Generator {
    layout: SourceLayout,
}

impl Generator {
    pub fn new(layout: SourceLayout) -> Self {
        Self { layout }
    }

    /// Runs all steps in order; the first failure stops the run
    pub fn generate(&self, spec: &EndpointSpec) -> Result<GenerateReport, GenerateError> {
        // Fail before touching anything if the shared files are missing
        let template = &self.layout.template;
        if !template.is_file() {
            return Err(GenerateError::TemplateMissing(template.clone()));
        }
        let entry = self.layout.src_dir.join(&self.layout.entry_file);
        if !entry.is_file() {
            return Err(GenerateError::EntryMissing(entry));
        }

        let steps = vec![
            self.add_controller(spec)?,
            self.add_route(spec)?,
            self.add_handler(spec)?,
            self.add_template_function(spec)?,
            self.register_in_entry(spec, &entry)?,
        ];

        Ok(GenerateReport {
            endpoint: spec.clone(),
            steps,
        })
    }

    fn add_controller(&self, spec: &EndpointSpec) -> Result<StepReport, GenerateError> {
        let path = self
            .layout
            .src_dir
            .join("controllers")
            .join(format!("{}.ts", spec.controller_name()));
        let marker = format!("export const {} =", spec.function);

        let change = append_or_create(
            &path,
            &marker,
            || templates::controller_function(spec),
            || templates::controller_file(spec),
        )?;
        Ok(report(Step::Controller, path, change))
    }

    fn add_route(&self, spec: &EndpointSpec) -> Result<StepReport, GenerateError> {
        let path = self
            .layout
            .src_dir
            .join("routes")
            .join(format!("{}.ts", spec.routes_name()));

        if !path.is_file() {
            fsops::write_atomic(&path, &templates::routes_file(spec))?;
            return Ok(report(Step::Route, path, Change::Created));
        }

        let content = fsops::read_text(&path)?;
        let line = templates::route_line(spec);
        if content.contains(&line) {
            return Ok(report(Step::Route, path, Change::Unchanged));
        }

        let export = "export default router;";
        let updated = if content.contains(export) {
            content.replacen(export, &format!("{}\n\n{}", line, export), 1)
        } else {
            append_line(&content, &line)
        };
        fsops::write_atomic(&path, &updated)?;
        Ok(report(Step::Route, path, Change::Updated))
    }

    fn add_handler(&self, spec: &EndpointSpec) -> Result<StepReport, GenerateError> {
        let path = self
            .layout
            .src_dir
            .join("handlers")
            .join(format!("{}.ts", spec.handler_module()));
        let marker = format!("export const {} =", spec.handler_fn());

        let change = append_or_create(
            &path,
            &marker,
            || templates::handler_function(spec),
            || templates::handler_file(spec),
        )?;
        Ok(report(Step::Handler, path, change))
    }

    fn add_template_function(&self, spec: &EndpointSpec) -> Result<StepReport, GenerateError> {
        let path = self.layout.template.clone();
        let content = fsops::read_text(&path)?;

        if content.contains(&format!("{}:", spec.lambda_name())) {
            return Ok(report(Step::Template, path, Change::Unchanged));
        }

        let block = templates::sam_function(spec, &self.layout.build_dir);
        let updated = match find_top_level_key(&content, "Outputs:") {
            Some(at) => format!("{}{}\n{}", &content[..at], block, &content[at..]),
            None => format!("{}{}", content, block),
        };
        fsops::write_atomic(&path, &updated)?;
        Ok(report(Step::Template, path, Change::Updated))
    }

    fn register_in_entry(&self, spec: &EndpointSpec, path: &Path) -> Result<StepReport, GenerateError> {
        let content = fsops::read_text(path)?;
        let import = templates::entry_import(spec);
        let mount = templates::entry_mount(spec);

        let mut updated = content.clone();

        if !updated.contains(&import) {
            let mut lines: Vec<&str> = updated.split('\n').collect();
            let insert_at = lines
                .iter()
                .rposition(|l| l.trim_start().starts_with("import "))
                .map(|i| i + 1)
                .unwrap_or(0);
            lines.insert(insert_at, &import);
            updated = lines.join("\n");
        }

        if !updated.contains(&mount) {
            let export = "export default app;";
            updated = if updated.contains(export) {
                updated.replacen(export, &format!("{}\n\n{}", mount, export), 1)
            } else {
                append_line(&updated, &mount)
            };
        }

        if updated == content {
            return Ok(report(Step::Entry, path.to_path_buf(), Change::Unchanged));
        }

        fsops::write_atomic(path, &updated)?;
        Ok(report(Step::Entry, path.to_path_buf(), Change::Updated))
    }
}

fn report(step: Step, path: PathBuf, change: Change) -> StepReport {
    StepReport { step, path, change }
}

/// Appends `snippet()` unless `marker` is present; creates the file with `whole()` if missing
fn append_or_create(
    path: &Path,
    marker: &str,
    snippet: impl FnOnce() -> String,
    whole: impl FnOnce() -> String,
) -> Result<Change, GenerateError> {
    if !path.is_file() {
        fsops::write_atomic(path, &whole())?;
        return Ok(Change::Created);
    }

    let content = fsops::read_text(path)?;
    if content.contains(marker) {
        return Ok(Change::Unchanged);
    }

    fsops::write_atomic(path, &format!("{}{}", content, snippet()))?;
    Ok(Change::Updated)
}

fn append_line(content: &str, line: &str) -> String {
    if content.is_empty() || content.ends_with('\n') {
        format!("{}{}\n", content, line)
    } else {
        format!("{}\n{}\n", content, line)
    }
}

/// Byte offset of `key` at the start of a line
fn find_top_level_key(content: &str, key: &str) -> Option<usize> {
    if content.starts_with(key) {
        return Some(0);
    }
    content.find(&format!("\n{}", key)).map(|i| i + 1)
}
