//! Resolved run settings.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::environment::environment_dir_or_default;
use crate::formatters::REQUIREMENTS_FILE;
use crate::parsers::ParseMode;

pub const DEFAULT_PACKAGE_MANAGER: &str = "pip";

#[derive(Debug, Clone)]
pub struct Settings {
    pub project_dir: PathBuf,
    /// `None` means detect from the package manager's location.
    pub environment_dir: Option<PathBuf>,
    pub package_manager: String,
    pub parse_mode: ParseMode,
    pub output_file: Option<PathBuf>,
    pub dry_run: bool,
}

impl Settings {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            environment_dir: None,
            package_manager: DEFAULT_PACKAGE_MANAGER.to_string(),
            parse_mode: ParseMode::default(),
            output_file: None,
            dry_run: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.project_dir.is_dir() {
            anyhow::bail!(
                "Project directory does not exist: {}",
                self.project_dir.display()
            );
        }
        if self.package_manager.trim().is_empty() {
            anyhow::bail!("Package manager program must not be empty");
        }
        if let Some(parent) = self.output_file.as_deref().and_then(Path::parent) {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                anyhow::bail!("Output directory does not exist: {}", parent.display());
            }
        }
        Ok(())
    }

    /// Explicit environment directory, or the detected one.
    pub fn resolve_environment_dir(&self) -> PathBuf {
        match &self.environment_dir {
            Some(dir) => dir.clone(),
            None => environment_dir_or_default(&self.package_manager, &self.project_dir),
        }
    }

    /// Where the manifest goes: `--output`, else `<project>/requirements.txt`.
    pub fn output_path(&self) -> PathBuf {
        self.output_file
            .clone()
            .unwrap_or_else(|| self.project_dir.join(REQUIREMENTS_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_is_inside_project() {
        let settings = Settings::new("/work/app");
        assert_eq!(
            settings.output_path(),
            PathBuf::from("/work/app/requirements.txt")
        );
    }

    #[test]
    fn missing_project_dir_is_rejected() {
        let settings = Settings::new("/definitely/not/here/head-require");
        assert!(settings.validate().is_err());
    }
}
