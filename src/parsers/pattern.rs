use anyhow::Result;
use regex::Regex;
use std::path::Path;

use super::common::read_source;
use super::ImportParser;
use crate::core::ImportStatement;

/// Column-0 `import ...` / `from ... import ...` lines, or the same statement
/// as a double-quoted string on an indented line (notebook JSON source).
const IMPORT_LINE_PATTERN: &str =
    r#"^(?:\s*"(?:from .+ import .+|import .+)"|import .+|from .*import .*)"#;

/// Line-oriented extraction that never looks past a single line.
pub struct PatternParser {
    pattern: Regex,
}

impl PatternParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(IMPORT_LINE_PATTERN)?,
        })
    }

    pub fn parse_source(&self, source: &str, file_path: &Path) -> Vec<ImportStatement> {
        source
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| {
                let matched = self.pattern.find(line)?;
                ImportStatement::from_text(matched.as_str(), file_path, idx + 1)
            })
            .collect()
    }
}

impl ImportParser for PatternParser {
    fn parse_file(&self, file_path: &Path) -> Result<Vec<ImportStatement>> {
        let source = read_source(file_path)?;
        Ok(self.parse_source(&source, file_path))
    }

    fn name(&self) -> &str {
        "pattern"
    }
}
