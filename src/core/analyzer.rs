use anyhow::Result;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::environment::{InstalledPackages, PackageSource, PipList};
use super::metadata::{find_top_level_text, TopLevelIndex};
use super::{FileInfo, FileScanner, ImportStatement, PackageResolver, Requirements};
use crate::config::Settings;
use crate::parsers::{ImportParser, ParserFactory};

/// Outcome of one run over a project.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub files_scanned: usize,
    pub statements: usize,
    pub modules: BTreeSet<String>,
    pub installed: usize,
    pub requirements: Requirements,
}

/// Where human-readable status lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Progress {
    #[default]
    Stdout,
    /// Keeps stdout for the manifest itself.
    Stderr,
    Silent,
}

impl Progress {
    pub fn report(self, message: impl fmt::Display) {
        match self {
            Progress::Stdout => println!("{message}"),
            Progress::Stderr => eprintln!("{message}"),
            Progress::Silent => {}
        }
    }
}

/// Runs scan -> extract -> match. Every step that fails is logged and
/// replaced by an empty result so the run always produces a manifest.
pub struct RequirementsAnalyzer {
    file_scanner: FileScanner,
    parser: Box<dyn ImportParser>,
    package_source: Box<dyn PackageSource>,
    environment_dir: PathBuf,
    progress: Progress,
}

impl RequirementsAnalyzer {
    pub fn new(
        parser: Box<dyn ImportParser>,
        package_source: Box<dyn PackageSource>,
        environment_dir: PathBuf,
    ) -> Self {
        let file_scanner = match environment_dir.file_name().and_then(|n| n.to_str()) {
            Some(name) => FileScanner::new().with_excluded_dir(name),
            None => FileScanner::new(),
        };

        Self {
            file_scanner,
            parser,
            package_source,
            environment_dir,
            progress: Progress::default(),
        }
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let parser = ParserFactory::new().get_parser(settings.parse_mode)?;
        let package_source = Box::new(PipList::new(settings.package_manager.clone()));
        Ok(Self::new(
            parser,
            package_source,
            settings.resolve_environment_dir(),
        ))
    }

    pub fn environment_dir(&self) -> &Path {
        &self.environment_dir
    }

    pub fn analyze(&self, project_dir: &Path) -> Analysis {
        self.progress.report("Scanning files...");
        let files = self.list_files(project_dir);
        self.progress
            .report(format_args!("Found {} files to analyze", files.len()));

        self.progress.report(format_args!(
            "Extracting imports with the {} parser...",
            self.parser.name()
        ));
        let statements = self.extract_imports(&files);
        let modules = derive_modules(&statements);
        debug!(?modules, "Derived top-level modules");

        self.progress.report("Matching against installed packages...");
        let installed = self.installed_packages();
        let top_levels = self.top_level_index();

        let resolver = PackageResolver::new(&installed, &top_levels);
        let requirements = resolver.resolve(&modules);

        Analysis {
            files_scanned: files.len(),
            statements: statements.len(),
            modules,
            installed: installed.len(),
            requirements,
        }
    }

    fn list_files(&self, project_dir: &Path) -> Vec<FileInfo> {
        self.file_scanner
            .scan_directory(project_dir)
            .unwrap_or_else(|err| {
                warn!(error = %err, "Listing files failed");
                Vec::new()
            })
    }

    fn extract_imports(&self, files: &[FileInfo]) -> Vec<ImportStatement> {
        let mut statements = Vec::new();
        for file_info in files {
            match self.parser.parse_file(&file_info.path) {
                Ok(found) => statements.extend(found),
                Err(err) => warn!(
                    path = %file_info.path.display(),
                    error = %err,
                    "Failed to extract imports"
                ),
            }
        }
        statements
    }

    fn installed_packages(&self) -> InstalledPackages {
        self.package_source
            .installed_packages()
            .unwrap_or_else(|err| {
                warn!(
                    source = %self.package_source.describe(),
                    error = %err,
                    "Getting installed packages failed"
                );
                InstalledPackages::new()
            })
    }

    fn top_level_index(&self) -> TopLevelIndex {
        find_top_level_text(&self.environment_dir).unwrap_or_else(|err| {
            warn!(
                env = %self.environment_dir.display(),
                error = %err,
                "Finding top-level metadata failed"
            );
            TopLevelIndex::new()
        })
    }
}

pub fn derive_modules(statements: &[ImportStatement]) -> BTreeSet<String> {
    statements
        .iter()
        .flat_map(ImportStatement::top_level_modules)
        .collect()
}
