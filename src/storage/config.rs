//! Configuration handling for lambdakit
//!
//! Configuration is stored in `lambdakit.toml` at the project root. Every
//! key is optional; a missing file means the defaults below, which match
//! the layout of an Express app compiled to `dist/` and deployed with SAM.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    EntrypointRewriter, PlacementRule, RewriteMode, RuleSet, DEFAULT_IMPORT_PATTERN,
    DEFAULT_MOUNT_PATTERN,
};

/// File name of the project configuration
pub const CONFIG_FILE: &str = "lambdakit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// How the entry document is rewritten
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    /// `span` (replace the whole import block) or `lines`
    pub mode: RewriteMode,

    /// Regex matching one route import line
    pub import_pattern: String,

    /// Regex matching one route mount line
    pub mount_pattern: String,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            mode: RewriteMode::Span,
            import_pattern: DEFAULT_IMPORT_PATTERN.to_string(),
            mount_pattern: DEFAULT_MOUNT_PATTERN.to_string(),
        }
    }
}

/// Settings for `lambdakit build`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Compiled output to partition, relative to the project root
    pub source_dir: PathBuf,

    /// Where BuildTargets are created, relative to the project root
    pub build_dir: PathBuf,

    /// Shared entry file inside the source tree
    pub entry_file: String,

    /// Subfolders every BuildTarget gets, even when empty
    pub subfolders: Vec<String>,

    /// Folders copied whole into every BuildTarget
    pub bulk_folders: Vec<String>,

    /// Source-root files copied into every BuildTarget
    pub root_files: Vec<String>,

    /// Project-root files (manifests, deployment templates) copied into every BuildTarget
    pub project_files: Vec<String>,

    /// Folder bundled verbatim as the `triggers` target; empty disables it
    pub triggers_folder: String,

    /// Entry document rewriting
    pub entry: EntryConfig,

    /// Ordered placement rules for keyword-matched files
    pub placement: Vec<PlacementRule>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("dist"),
            build_dir: PathBuf::from("build"),
            entry_file: "app.js".to_string(),
            subfolders: strings(&[
                "controllers",
                "routes",
                "middlewares",
                "models",
                "services",
                "configs",
                "handlers",
            ]),
            bulk_folders: strings(&["models", "configs", "services", "middlewares", "utils"]),
            root_files: strings(&["app.js", "lambda.js", "local.js"]),
            project_files: strings(&[
                "package.json",
                "package-lock.json",
                "samconfig.toml",
                "template.yml",
            ]),
            triggers_folder: "triggers".to_string(),
            entry: EntryConfig::default(),
            placement: vec![
                PlacementRule::new("controller", "controllers"),
                PlacementRule::new("routes", "routes"),
                PlacementRule::new("handler", "handlers"),
            ],
        }
    }
}

impl BuildConfig {
    /// Checks names and compiles the entry patterns
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entry_file.trim().is_empty() {
            return Err(ConfigError::Invalid("entry_file must not be empty".into()));
        }

        let named = [
            ("subfolders", &self.subfolders),
            ("bulk_folders", &self.bulk_folders),
            ("root_files", &self.root_files),
            ("project_files", &self.project_files),
        ];
        for (key, names) in named {
            if names.iter().any(|n| n.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "{} must not contain empty names",
                    key
                )));
            }
        }

        for rule in &self.placement {
            if rule.contains.is_empty() || rule.destination.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "placement rules need both 'contains' and 'destination'".into(),
                ));
            }
        }

        self.rewriter().map(|_| ())
    }

    /// Builds the classification rule set
    pub fn rules(&self) -> RuleSet {
        RuleSet::new(
            self.bulk_folders.clone(),
            self.root_files.clone(),
            self.placement.clone(),
        )
    }

    /// Builds the entry document rewriter
    pub fn rewriter(&self) -> Result<EntrypointRewriter, ConfigError> {
        EntrypointRewriter::new(
            &self.entry.import_pattern,
            &self.entry.mount_pattern,
            self.entry.mode,
        )
        .map_err(|e| ConfigError::Invalid(format!("entry pattern: {}", e)))
    }
}

/// Settings for `lambdakit generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// TypeScript source folder, relative to the project root
    pub src_dir: PathBuf,

    /// Entry file inside `src_dir`
    pub entry_file: String,

    /// SAM template, relative to the project root
    pub template_file: PathBuf,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            entry_file: "app.ts".to_string(),
            template_file: PathBuf::from("template.yaml"),
        }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    pub build: BuildConfig,
    pub generate: GenerateConfig,
}

/// Loaded configuration plus where it came from
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub project_root: PathBuf,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            project_root: project_root.to_path_buf(),
        })
    }

    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config
            .build
            .validate()
            .with_context(|| format!("Invalid build settings in {}", config_path.display()))?;

        Ok(config)
    }

    /// Finds the project root by looking for `lambdakit.toml`, then `package.json`
    pub fn find_project_root() -> Option<PathBuf> {
        let start = std::env::current_dir().ok()?;

        for marker in [CONFIG_FILE, "package.json"] {
            let mut current = start.clone();
            loop {
                if current.join(marker).is_file() {
                    return Some(current);
                }

                if !current.pop() {
                    break;
                }
            }
        }

        None
    }

    /// Renders the default configuration as commented TOML
    pub fn default_toml() -> Result<String> {
        let body = toml::to_string_pretty(&ProjectConfig::default())
            .context("Failed to serialize default config")?;

        Ok(format!(
            "# lambdakit configuration\n\
             # Every key is optional; removing one falls back to its default.\n\n{}",
            body
        ))
    }
}
