//! Project management
//!
//! Resolves the directories a build reads from and writes to, and guards
//! the build root against concurrent runs.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use thiserror::Error;

use super::config::CONFIG_FILE;
use super::Config;

/// Lock file kept in the build root while a build runs
const LOCK_FILE: &str = ".lambdakit.lock";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("No project found. Run inside a directory with lambdakit.toml or package.json, or pass --project.")]
    NotInProject,

    #[error("Project directory does not exist: {0}")]
    Missing(PathBuf),

    #[error("Another build is already running in {0}")]
    Locked(PathBuf),
}

/// A serverless project on disk
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens the project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.is_dir() {
            return Err(ProjectError::Missing(root).into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Opens `root` if given, otherwise searches from the current directory
    pub fn open_or_current(root: Option<&Path>) -> Result<Self> {
        match root {
            Some(root) => Self::open(root),
            None => Self::open_current(),
        }
    }

    /// Writes a default `lambdakit.toml` unless one exists. Returns true if written.
    pub fn init(root: impl Into<PathBuf>) -> Result<(Self, bool)> {
        let root = root.into();

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create project directory: {}", root.display()))?;

        let config_path = root.join(CONFIG_FILE);
        let created = !config_path.exists();
        if created {
            fs::write(&config_path, Config::default_toml()?)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Ok((Self::open(root)?, created))
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Resolves a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// The compiled output tree the build partitions
    pub fn source_dir(&self) -> PathBuf {
        self.resolve(&self.config.project.build.source_dir)
    }

    /// The directory holding all BuildTargets
    pub fn build_dir(&self) -> PathBuf {
        self.resolve(&self.config.project.build.build_dir)
    }

    /// The TypeScript sources the endpoint generator edits
    pub fn generate_src_dir(&self) -> PathBuf {
        self.resolve(&self.config.project.generate.src_dir)
    }

    /// The SAM template the endpoint generator edits
    pub fn template_path(&self) -> PathBuf {
        self.resolve(&self.config.project.generate.template_file)
    }
}

/// Exclusive advisory lock on a build root
#[derive(Debug)]
pub struct BuildLock {
    _file: File,
    path: PathBuf,
}

impl BuildLock {
    pub fn acquire(build_dir: &Path) -> Result<Self> {
        fs::create_dir_all(build_dir)
            .with_context(|| format!("Failed to create build directory: {}", build_dir.display()))?;

        let path = build_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        file.try_lock_exclusive()
            .map_err(|_| ProjectError::Locked(build_dir.to_path_buf()))?;

        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
