//! `lambdakit generate`

use std::path::Path;

use anyhow::Result;
use clap::Args;

use super::output::Output;
use crate::scaffold::{Change, EndpointSpec, Generator, SourceLayout};
use crate::storage::Project;

#[derive(Args)]
pub struct GenerateArgs {
    /// Service name, e.g. `student`
    pub service: String,

    /// Function name, e.g. `createStudent`
    pub function: String,

    /// HTTP method: GET, POST, PUT, PATCH or DELETE
    pub method: String,

    /// Route path (defaults to /<service>)
    pub route: Option<String>,
}

pub fn run(args: GenerateArgs, project_root: Option<&Path>, output: &Output) -> Result<()> {
    let spec = EndpointSpec::new(&args.service, &args.function, &args.method, args.route.as_deref())?;
    let project = Project::open_or_current(project_root)?;
    let config = &project.config().project;

    let generator = Generator::new(SourceLayout {
        src_dir: project.generate_src_dir(),
        entry_file: config.generate.entry_file.clone(),
        template: project.template_path(),
        build_dir: config.build.build_dir.to_string_lossy().into_owned(),
    });

    output.verbose_ctx(
        "generate",
        &format!("Generating endpoint: {} {} ({})", spec.method, spec.route, spec.function),
    );
    let report = generator.generate(&spec)?;

    if output.is_json() {
        output.data(&report);
        return Ok(());
    }

    for step in &report.steps {
        let verb = match step.change {
            Change::Created => "created",
            Change::Updated => "updated",
            Change::Unchanged => "exists ",
        };
        let shown = step.path.strip_prefix(project.root()).unwrap_or(&step.path);
        output.line(&format!("{} {:<10} {}", verb, step.step.as_str(), shown.display()));
    }

    if report.is_noop() {
        output.success(&format!("{} is already fully generated", spec.function));
        return Ok(());
    }

    output.success(&format!("Generated {} {} ({})", spec.method, spec.route, spec.function));
    output.line("");
    output.line("Next steps:");
    output.line(&format!(
        "  1. Implement the logic in {}",
        report.steps[0].path.strip_prefix(project.root()).unwrap_or(&report.steps[0].path).display()
    ));
    output.line("  2. Compile the project");
    output.line(&format!("  3. Run: lambdakit build {}", spec.service));
    output.line("  4. Run: sam build && sam deploy");

    Ok(())
}
