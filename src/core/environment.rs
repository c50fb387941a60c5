use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Installed distribution name (as the package manager spells it) -> version.
pub type InstalledPackages = BTreeMap<String, String>;

/// Fallback environment directory, relative to the project root.
pub const DEFAULT_ENVIRONMENT_DIR: &str = ".venv";

/// Something that can report the packages installed in the target environment.
pub trait PackageSource {
    fn installed_packages(&self) -> Result<InstalledPackages>;
    fn describe(&self) -> String;
}

/// Lists packages through `<program> list`.
pub struct PipList {
    program: String,
}

impl PipList {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PackageSource for PipList {
    fn installed_packages(&self) -> Result<InstalledPackages> {
        let output = Command::new(&self.program)
            .arg("list")
            .output()
            .with_context(|| format!("Failed to run `{} list`", self.program))?;

        if !output.status.success() {
            anyhow::bail!(
                "`{} list` exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_pip_list(&stdout)
    }

    fn describe(&self) -> String {
        format!("{} list", self.program)
    }
}

/// Parse the columnar `pip list` output.
///
/// The first two lines are the column header and its underline; every other
/// non-blank line starts with a name and a version separated by whitespace.
pub fn parse_pip_list(output: &str) -> Result<InstalledPackages> {
    let row = Regex::new(r"^(\S+)\s+(\S+)")?;
    let mut packages = InstalledPackages::new();

    for line in output.lines().skip(2) {
        if line.trim().is_empty() {
            continue;
        }
        match row.captures(line) {
            Some(caps) => {
                packages.insert(caps[1].to_string(), caps[2].to_string());
            }
            None => debug!(line, "Ignoring unrecognized package listing line"),
        }
    }

    Ok(packages)
}

/// Locate the environment the package manager belongs to.
///
/// An active `VIRTUAL_ENV` wins; otherwise `program` is looked up on `PATH`
/// and the directory two levels above the executable is used
/// (`<env>/bin/pip`, `<env>/Scripts/pip.exe`).
pub fn detect_environment_dir(program: &str) -> Result<PathBuf> {
    if let Some(venv) = env::var_os("VIRTUAL_ENV").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(venv));
    }

    let executable = find_executable(program)
        .with_context(|| format!("`{}` was not found on PATH", program))?;
    let executable = executable.canonicalize().unwrap_or(executable);

    environment_of_executable(&executable).with_context(|| {
        format!(
            "Cannot derive an environment directory from {}",
            executable.display()
        )
    })
}

/// `<env>/bin/pip` -> `<env>`.
fn environment_of_executable(executable: &Path) -> Option<PathBuf> {
    executable
        .parent()
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Like [`detect_environment_dir`], falling back to `<project>/.venv`.
pub fn environment_dir_or_default(program: &str, project_dir: &Path) -> PathBuf {
    match detect_environment_dir(program) {
        Ok(dir) => dir,
        Err(err) => {
            warn!(error = %err, "Could not determine environment directory, using {}", DEFAULT_ENVIRONMENT_DIR);
            project_dir.join(DEFAULT_ENVIRONMENT_DIR)
        }
    }
}

fn find_executable(program: &str) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var).find_map(|dir| {
        let candidates = [dir.join(program), dir.join(format!("{program}.exe"))];
        candidates.into_iter().find(|candidate| candidate.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Run `f` with `VIRTUAL_ENV` set to `value` (or unset), restoring it afterwards.
    fn with_virtual_env<T>(value: Option<&Path>, f: impl FnOnce() -> T) -> T {
        let saved = env::var_os("VIRTUAL_ENV");
        match value {
            Some(path) => env::set_var("VIRTUAL_ENV", path),
            None => env::remove_var("VIRTUAL_ENV"),
        }
        let result = f();
        match saved {
            Some(previous) => env::set_var("VIRTUAL_ENV", previous),
            None => env::remove_var("VIRTUAL_ENV"),
        }
        result
    }

    #[test]
    fn parses_columnar_listing() {
        let output = "\
Package            Version
------------------ ---------
PyYAML             6.0.1
requests           2.31.0
scikit-learn       1.3.2

";
        let packages = parse_pip_list(output).unwrap();
        assert_eq!(packages.len(), 3);
        assert_eq!(packages["PyYAML"], "6.0.1");
        assert_eq!(packages["scikit-learn"], "1.3.2");
    }

    #[test]
    fn editable_location_column_is_ignored() {
        let output = "\
Package    Version Editable project location
---------- ------- -------------------------
mytool     0.1.0   /home/dev/mytool
";
        let packages = parse_pip_list(output).unwrap();
        assert_eq!(packages["mytool"], "0.1.0");
    }

    #[test]
    fn executable_path_resolves_to_its_environment() {
        let dir = tempfile::TempDir::new().unwrap();
        let bin = dir.path().join("proj-env").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let pip = bin.join("pip");
        std::fs::write(&pip, "#!/bin/sh\n").unwrap();

        let found = find_executable(pip.to_str().unwrap()).unwrap();
        assert_eq!(found, pip);
        assert_eq!(
            environment_of_executable(&found).unwrap(),
            dir.path().join("proj-env")
        );
    }

    #[test]
    fn bare_name_has_no_environment() {
        assert!(environment_of_executable(Path::new("pip")).is_none());
    }

    #[test]
    fn missing_program_is_an_error() {
        let source = PipList::new("definitely-not-a-package-manager-xyz");
        assert!(source.installed_packages().is_err());
    }

    #[test]
    #[serial]
    fn active_virtual_env_wins_over_path_lookup() {
        let venv = tempfile::TempDir::new().unwrap();
        let detected = with_virtual_env(Some(venv.path()), || {
            detect_environment_dir("definitely-not-a-package-manager-xyz")
        });
        assert_eq!(detected.unwrap(), venv.path());
    }

    #[test]
    #[serial]
    fn undetectable_environment_falls_back_to_project_venv() {
        let project = tempfile::TempDir::new().unwrap();
        let dir = with_virtual_env(None, || {
            environment_dir_or_default("definitely-not-a-package-manager-xyz", project.path())
        });
        assert_eq!(dir, project.path().join(".venv"));
    }
}
