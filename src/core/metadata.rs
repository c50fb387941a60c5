use anyhow::{Context, Result};
use glob::{glob, Pattern};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Distribution name -> top-level modules it declares in `top_level.txt`.
pub type TopLevelIndex = BTreeMap<String, Vec<String>>;

const TOP_LEVEL_FILE: &str = "top_level.txt";

/// `site-packages` directories of an environment, Windows layout first.
pub fn site_packages_dirs(env_dir: &Path) -> Result<Vec<PathBuf>> {
    let root = Pattern::escape(&env_dir.to_string_lossy());
    let layouts = [
        format!("{root}/Lib/site-packages"),
        format!("{root}/lib/python*/site-packages"),
        format!("{root}/lib64/python*/site-packages"),
    ];

    let mut dirs = Vec::new();
    for layout in &layouts {
        for entry in glob(layout).with_context(|| format!("Invalid glob pattern {layout}"))? {
            match entry {
                Ok(path) if path.is_dir() => {
                    if !dirs.contains(&path) {
                        dirs.push(path);
                    }
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "Skipping unreadable site-packages candidate"),
            }
        }
    }

    Ok(dirs)
}

/// Collect the declared top-level modules of every installed distribution.
pub fn find_top_level_text(env_dir: &Path) -> Result<TopLevelIndex> {
    let site_dirs = site_packages_dirs(env_dir)?;
    if site_dirs.is_empty() {
        anyhow::bail!("No site-packages directory under {}", env_dir.display());
    }

    let mut index = TopLevelIndex::new();
    for site_dir in &site_dirs {
        let root = Pattern::escape(&site_dir.to_string_lossy());
        for suffix in ["dist-info", "egg-info"] {
            let pattern = format!("{root}/*.{suffix}");
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern {pattern}"))? {
                let info_dir = match entry {
                    Ok(path) => path,
                    Err(err) => {
                        warn!(error = %err, "Skipping unreadable metadata directory");
                        continue;
                    }
                };

                let top_level_path = info_dir.join(TOP_LEVEL_FILE);
                if !top_level_path.is_file() {
                    continue;
                }

                let Some(name) = distribution_name(&info_dir) else {
                    continue;
                };
                let contents = match fs::read_to_string(&top_level_path) {
                    Ok(contents) => contents,
                    Err(err) => {
                        warn!(
                            path = %top_level_path.display(),
                            error = %err,
                            "Skipping unreadable top-level metadata"
                        );
                        continue;
                    }
                };
                let modules: Vec<String> = contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();

                debug!(distribution = %name, ?modules, "Read top-level modules");
                index.insert(name, modules);
            }
        }
    }

    Ok(index)
}

/// `PyYAML-6.0.1.dist-info` -> `PyYAML`, `typing_extensions-4.8.0.dist-info` -> `typing-extensions`.
pub fn distribution_name(info_dir: &Path) -> Option<String> {
    let file_name = info_dir.file_name()?.to_str()?;
    let stem = file_name
        .strip_suffix(".dist-info")
        .or_else(|| file_name.strip_suffix(".egg-info"))
        .unwrap_or(file_name);
    let name = stem.split('-').next()?;
    if name.is_empty() {
        return None;
    }
    Some(name.replace('_', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_name_drops_version_and_suffix() {
        assert_eq!(
            distribution_name(Path::new("/x/PyYAML-6.0.1.dist-info")).as_deref(),
            Some("PyYAML")
        );
        assert_eq!(
            distribution_name(Path::new("/x/scikit_learn-1.3.2.dist-info")).as_deref(),
            Some("scikit-learn")
        );
        assert_eq!(
            distribution_name(Path::new("/x/legacy.egg-info")).as_deref(),
            Some("legacy")
        );
        assert_eq!(
            distribution_name(Path::new("/x/foo.dist-info")).as_deref(),
            Some("foo")
        );
        assert_eq!(
            distribution_name(Path::new("/x/zope.interface-6.1.dist-info")).as_deref(),
            Some("zope.interface")
        );
    }
}
