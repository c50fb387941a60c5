use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::core::Requirements;

pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Renders pinned `name==version` lines.
pub struct RequirementsFormatter;

impl RequirementsFormatter {
    pub fn new() -> Self {
        Self
    }

    /// One line per package in name order, each terminated by `\n`.
    pub fn format(&self, requirements: &Requirements) -> String {
        let mut out = String::new();
        for (package, version) in requirements {
            let _ = writeln!(out, "{package}=={version}");
        }
        out
    }

    /// Write (overwrite) the manifest at `output_path`.
    pub fn format_to_file(&self, requirements: &Requirements, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format(requirements))
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        Ok(())
    }
}

impl Default for RequirementsFormatter {
    fn default() -> Self {
        Self::new()
    }
}
