pub mod common;
pub mod pattern;
pub mod python;

use anyhow::Result;
use std::path::Path;

use crate::core::ImportStatement;

pub trait ImportParser {
    fn parse_file(&self, file_path: &Path) -> Result<Vec<ImportStatement>>;
    fn name(&self) -> &str;
}

/// How import statements are pulled out of source files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Line matching, top-level statements only.
    #[default]
    Pattern,
    /// Full syntax tree, imports at any depth.
    Syntax,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Pattern => "pattern",
            ParseMode::Syntax => "syntax",
        }
    }
}

pub struct ParserFactory;

impl ParserFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn get_parser(&self, mode: ParseMode) -> Result<Box<dyn ImportParser>> {
        match mode {
            ParseMode::Pattern => Ok(Box::new(pattern::PatternParser::new()?)),
            ParseMode::Syntax => Ok(Box::new(python::PythonParser::new()?)),
        }
    }
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}
