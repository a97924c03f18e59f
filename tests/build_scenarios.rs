//! End-to-end build scenarios against the library API
//!
//! Each test lays out a small compiled project in a temp directory and
//! checks the bundles the orchestrator produces.

use std::fs;
use std::path::Path;

use lambdakit_cli::build::{BuildLayout, CopyKind, Orchestrator};
use lambdakit_cli::storage::fsops;
use lambdakit_cli::{BuildConfig, Keyword, RewriteMode};
use tempfile::TempDir;

const APP_JS: &str = "import express from 'express';
import studentRoutes from './routes/studentRoutes';
import teacherRoutes from './routes/teacherRoutes';

const app = express();

app.use('/student', studentRoutes);
app.use('/teacher', teacherRoutes);

export default app;
";

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn kw(s: &str) -> Keyword {
    s.parse().unwrap()
}

/// A compiled project with a student and a teacher service
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let dist = dir.path().join("dist");

    write(&dist.join("app.js"), APP_JS);
    write(&dist.join("lambda.js"), "exports.handler = () => {};");
    write(&dist.join("local.js"), "app.listen(3000);");
    write(&dist.join("routes/studentRoutes.js"), "student routes");
    write(&dist.join("routes/teacherRoutes.js"), "teacher routes");
    write(&dist.join("controllers/studentController.js"), "student controller");
    write(&dist.join("controllers/teacherController.js"), "teacher controller");
    write(&dist.join("handlers/studentHandler.js"), "student handler");
    write(&dist.join("models/studentModel.js"), "student model");
    write(&dist.join("models/teacherModel.js"), "teacher model");
    write(&dist.join("configs/db.js"), "db config");
    write(&dist.join("utils/corsUtils.js"), "cors");
    write(&dist.join("triggers/streamHandler.js"), "stream");
    write(&dir.path().join("package.json"), "{\"name\":\"school\"}");
    write(&dir.path().join("template.yml"), "Resources: {}");

    dir
}

fn orchestrator(dir: &TempDir, config: BuildConfig) -> Orchestrator {
    let layout = BuildLayout {
        source_dir: dir.path().join("dist"),
        build_dir: dir.path().join("build"),
        project_root: dir.path().to_path_buf(),
    };
    Orchestrator::new(layout, config).unwrap()
}

fn list(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = fsops::list_files_recursive(dir)
        .unwrap()
        .iter()
        .map(|p| fsops::relative_slash_path(dir, p))
        .collect();
    files.sort();
    files
}

#[test]
fn student_build_contains_only_student_routes() {
    let dir = setup_project();
    let orch = orchestrator(&dir, BuildConfig::default());

    orch.run(&[kw("student")], true).unwrap();

    let target = dir.path().join("build/student");
    let entry = fs::read_to_string(target.join("app.js")).unwrap();

    assert!(entry.contains("import studentRoutes from './routes/studentRoutes';"));
    assert!(!entry.contains("import teacherRoutes"));
    assert!(entry.contains("\napp.use('/student', studentRoutes);"));
    assert!(entry.contains("// app.use('/teacher', teacherRoutes); // Removed by build script"));

    assert_eq!(list(&target.join("routes")), vec!["studentRoutes.js"]);
    assert_eq!(list(&target.join("controllers")), vec!["studentController.js"]);
    assert_eq!(list(&target.join("handlers")), vec!["studentHandler.js"]);
}

#[test]
fn bulk_folders_are_complete_for_every_keyword() {
    let dir = setup_project();
    let orch = orchestrator(&dir, BuildConfig::default());

    orch.run(&[kw("student"), kw("teacher"), kw("zzz")], false).unwrap();

    for name in ["student", "teacher", "zzz"] {
        let target = dir.path().join("build").join(name);
        assert_eq!(
            list(&target.join("models")),
            vec!["studentModel.js", "teacherModel.js"]
        );
        assert_eq!(list(&target.join("configs")), vec!["db.js"]);
        assert_eq!(list(&target.join("utils")), vec!["corsUtils.js"]);
    }
}

#[test]
fn unknown_keyword_yields_empty_service() {
    let dir = setup_project();
    let orch = orchestrator(&dir, BuildConfig::default());

    let report = orch.run(&[kw("zzz")], false).unwrap();
    let target = dir.path().join("build/zzz");

    for sub in ["controllers", "routes", "handlers", "middlewares", "services"] {
        assert!(target.join(sub).is_dir(), "{} missing", sub);
        assert!(list(&target.join(sub)).is_empty(), "{} not empty", sub);
    }

    let entry = fs::read_to_string(target.join("app.js")).unwrap();
    assert!(!entry.contains("./routes/"));
    let active_mounts = entry
        .lines()
        .filter(|l| l.contains("app.use('/") && !l.starts_with("//"))
        .count();
    assert_eq!(active_mounts, 0);

    let stats = report.target("zzz").unwrap().entry.unwrap();
    assert_eq!(stats.imports_kept, 0);
    assert_eq!(stats.mounts_kept, 0);
}

#[test]
fn rebuilding_is_byte_identical() {
    let dir = setup_project();
    let orch = orchestrator(&dir, BuildConfig::default());

    let first = orch.run(&[kw("student")], true).unwrap();
    let second = orch.run(&[kw("student")], true).unwrap();

    assert_eq!(
        first.target("student").unwrap().digest,
        second.target("student").unwrap().digest
    );
    assert_eq!(
        first.triggers.as_ref().unwrap().digest,
        second.triggers.as_ref().unwrap().digest
    );
}

#[test]
fn manually_deleted_target_is_reproduced() {
    let dir = setup_project();
    let orch = orchestrator(&dir, BuildConfig::default());

    let first = orch.run(&[kw("teacher")], false).unwrap();
    let before = list(&dir.path().join("build/teacher"));

    fs::remove_dir_all(dir.path().join("build/teacher")).unwrap();
    let second = orch.run(&[kw("teacher")], false).unwrap();

    assert_eq!(list(&dir.path().join("build/teacher")), before);
    assert_eq!(
        first.target("teacher").unwrap().digest,
        second.target("teacher").unwrap().digest
    );
}

#[test]
fn no_destination_is_written_twice() {
    let dir = setup_project();
    let orch = orchestrator(&dir, BuildConfig::default());

    let report = orch.run(&[kw("student")], false).unwrap();
    let target = report.target("student").unwrap();

    let mut destinations: Vec<_> = target.copies.iter().map(|c| c.to.clone()).collect();
    let total = destinations.len();
    destinations.sort();
    destinations.dedup();

    assert_eq!(destinations.len(), total);
}

#[test]
fn uppercase_file_names_match_lowercase_keyword() {
    let dir = setup_project();
    write(&dir.path().join("dist/controllers/StudentController.ts"), "ts");
    let orch = orchestrator(&dir, BuildConfig::default());

    orch.run(&[kw("student")], false).unwrap();

    assert!(dir
        .path()
        .join("build/student/controllers/StudentController.ts")
        .is_file());
}

#[test]
fn root_and_project_files_are_copied() {
    let dir = setup_project();
    let orch = orchestrator(&dir, BuildConfig::default());

    let report = orch.run(&[kw("teacher")], false).unwrap();
    let target = dir.path().join("build/teacher");

    assert!(target.join("lambda.js").is_file());
    assert!(target.join("local.js").is_file());
    assert!(target.join("package.json").is_file());
    assert!(target.join("template.yml").is_file());

    let teacher = report.target("teacher").unwrap();
    assert_eq!(teacher.count(CopyKind::RootFile), 2);
    assert_eq!(teacher.count(CopyKind::ProjectFile), 2);
    assert!(teacher
        .warnings
        .iter()
        .any(|w| w.contains("samconfig.toml not found in project root")));
}

#[test]
fn triggers_bundle_is_unfiltered() {
    let dir = setup_project();
    let orch = orchestrator(&dir, BuildConfig::default());

    let report = orch.run(&[kw("student")], true).unwrap();

    assert_eq!(list(&dir.path().join("build/triggers")), vec!["streamHandler.js"]);
    assert!(report.warnings.is_empty());
}

#[test]
fn lines_mode_keeps_comments_between_imports() {
    let dir = setup_project();
    write(
        &dir.path().join("dist/app.js"),
        "import studentRoutes from './routes/studentRoutes';\n// teacher service\nimport teacherRoutes from './routes/teacherRoutes';\n",
    );

    let mut config = BuildConfig::default();
    config.entry.mode = RewriteMode::Lines;
    let orch = orchestrator(&dir, config);

    orch.run(&[kw("student")], false).unwrap();

    let entry = fs::read_to_string(dir.path().join("build/student/app.js")).unwrap();
    assert_eq!(
        entry,
        "import studentRoutes from './routes/studentRoutes';\n// teacher service\n"
    );
}

#[test]
fn missing_entry_file_is_a_warning() {
    let dir = setup_project();
    fs::remove_file(dir.path().join("dist/app.js")).unwrap();
    let orch = orchestrator(&dir, BuildConfig::default());

    let report = orch.run(&[kw("student")], false).unwrap();
    let student = report.target("student").unwrap();

    assert!(student.entry.is_none());
    assert!(student.warnings.iter().any(|w| w.starts_with("app.js not found")));
    assert!(dir.path().join("build/student/routes/studentRoutes.js").is_file());
}

#[test]
fn guarded_mounts_of_other_services_are_commented() {
    let dir = setup_project();
    write(
        &dir.path().join("dist/app.js"),
        "import studentRoutes from './routes/studentRoutes';\nimport teacherRoutes from './routes/teacherRoutes';\n\napp.use('/student', studentRoutes);\napp.use('/teacher', authenticate, teacherRoutes);\n",
    );
    let orch = orchestrator(&dir, BuildConfig::default());

    let report = orch.run(&[kw("student")], false).unwrap();

    let entry = fs::read_to_string(dir.path().join("build/student/app.js")).unwrap();
    assert!(entry.contains(
        "// app.use('/teacher', authenticate, teacherRoutes); // Removed by build script"
    ));
    let stats = report.target("student").unwrap().entry.unwrap();
    assert_eq!(stats.mounts_found, 2);
    assert_eq!(stats.mounts_kept, 1);
}
