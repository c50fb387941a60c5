use anyhow::Result;
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser};

use super::common::{extract_text, notebook_code, read_source};
use super::ImportParser;
use crate::core::{FileKind, ImportStatement};

/// Syntax-tree extraction: finds imports at any nesting depth, including
/// multi-line parenthesized `from` imports.
pub struct PythonParser {
    language: Language,
}

impl PythonParser {
    pub fn new() -> Result<Self> {
        let language = tree_sitter_python::language();
        // Fail early on an ABI mismatch rather than on the first file.
        Parser::new().set_language(language)?;
        Ok(Self { language })
    }

    pub fn parse_source(&self, source: &str, file_path: &Path) -> Result<Vec<ImportStatement>> {
        let mut parser = Parser::new();
        parser.set_language(self.language)?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("Failed to parse file: {}", file_path.display()))?;

        let mut statements = Vec::new();
        self.collect_imports(&tree.root_node(), source.as_bytes(), file_path, &mut statements);
        Ok(statements)
    }

    fn collect_imports(
        &self,
        node: &TSNode,
        source: &[u8],
        file_path: &Path,
        statements: &mut Vec<ImportStatement>,
    ) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "import_statement" | "import_from_statement" => {
                    let text = extract_text(&child, source);
                    let line_number = child.start_position().row + 1;
                    if let Some(statement) = ImportStatement::from_text(text, file_path, line_number)
                    {
                        statements.push(statement);
                    }
                }
                // `from __future__ import ...` has its own node kind
                "future_import_statement" => {}
                _ => self.collect_imports(&child, source, file_path, statements),
            }
        }
    }
}

impl ImportParser for PythonParser {
    fn parse_file(&self, file_path: &Path) -> Result<Vec<ImportStatement>> {
        let raw = read_source(file_path)?;
        let source = match FileKind::from_path(file_path) {
            Some(FileKind::Notebook) => notebook_code(&raw)?,
            _ => raw,
        };
        self.parse_source(&source, file_path)
    }

    fn name(&self) -> &str {
        "syntax"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nested_and_multiline_imports() {
        let source = r#"
import os

try:
    import ujson as json
except ImportError:
    import json

from requests.adapters import (
    HTTPAdapter,
    Retry,
)

def lazy():
    import numpy
    return numpy
"#;
        let parser = PythonParser::new().unwrap();
        let stmts = parser.parse_source(source, Path::new("m.py")).unwrap();
        let modules: Vec<String> = stmts.iter().flat_map(|s| s.top_level_modules()).collect();
        assert_eq!(modules, vec!["os", "ujson", "json", "requests", "numpy"]);
        assert_eq!(stmts[3].line_number, 9);
    }
}
