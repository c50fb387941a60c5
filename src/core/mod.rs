pub mod analyzer;
pub mod environment;
pub mod imports;
pub mod metadata;
pub mod resolver;
pub mod scanner;

pub use analyzer::{Analysis, Progress, RequirementsAnalyzer};
pub use environment::{InstalledPackages, PackageSource, PipList};
pub use imports::ImportStatement;
pub use metadata::TopLevelIndex;
pub use resolver::{PackageResolver, Requirements};
pub use scanner::{FileInfo, FileKind, FileScanner};
