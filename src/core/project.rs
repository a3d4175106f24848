//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents a CFT project: a directory tree holding catalog and form files
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .cft/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(".cft").is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open a project at an explicitly given root
    pub fn at(path: &Path) -> Result<Self, ProjectError> {
        if !path.join(".cft").is_dir() {
            return Err(ProjectError::NotFound {
                searched_from: path.to_path_buf(),
            });
        }
        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(".cft").exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::create_structure(&root)?;
        Ok(Self { root })
    }

    /// Force initialization even if .cft/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(&root)?;
        Ok(Self { root })
    }

    fn create_structure(root: &Path) -> Result<(), ProjectError> {
        let cft_dir = root.join(".cft");
        std::fs::create_dir_all(&cft_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

        std::fs::write(cft_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        for dir in ["catalog/regions", "forms"] {
            std::fs::create_dir_all(root.join(dir))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    fn default_config() -> &'static str {
        r#"# CFT Project Configuration

# Default output format (auto, table, yaml, json, csv)
# default_format: auto

# Editor to use for `cft form edit` (default: $EDITOR)
# editor: ""
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .cft configuration directory
    pub fn cft_dir(&self) -> PathBuf {
        self.root.join(".cft")
    }

    /// Catalog directory
    pub fn catalog_dir(&self) -> PathBuf {
        self.root.join("catalog")
    }

    /// The root countries file
    pub fn countries_file(&self) -> PathBuf {
        self.catalog_dir().join("countries.yaml")
    }

    /// Directory of per-country region files
    pub fn regions_dir(&self) -> PathBuf {
        self.catalog_dir().join("regions")
    }

    /// Directory of form definition files
    pub fn forms_dir(&self) -> PathBuf {
        self.root.join("forms")
    }

    /// Path of a form definition by name
    pub fn form_file(&self, name: &str) -> PathBuf {
        self.forms_dir().join(format!("{}.yaml", name))
    }

    /// Iterate all region files
    pub fn iter_region_files(&self) -> impl Iterator<Item = PathBuf> {
        Self::iter_yaml_files(self.regions_dir())
    }

    /// Iterate all form definition files
    pub fn iter_form_files(&self) -> impl Iterator<Item = PathBuf> {
        Self::iter_yaml_files(self.forms_dir())
    }

    fn iter_yaml_files(dir: PathBuf) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "yaml"))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a CFT project (searched from {searched_from:?}). Run 'cft init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("CFT project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
