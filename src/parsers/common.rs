use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tree_sitter::Node as TSNode;

/// Read a source file, replacing invalid UTF-8 rather than failing on it.
pub fn read_source(file_path: &Path) -> Result<String> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open {}", file_path.display()))?;
    let file_size = file.metadata()?.len() as usize;

    let mut reader = BufReader::with_capacity(file_size.clamp(1, 8192), file);
    let mut bytes = Vec::with_capacity(file_size);
    reader
        .read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Debug, Deserialize)]
struct Notebook {
    cells: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    cell_type: String,
    #[serde(default)]
    source: CellSource,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CellSource {
    Lines(Vec<String>),
    Text(String),
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Text(String::new())
    }
}

/// Concatenate the source of every code cell in a notebook document.
pub fn notebook_code(document: &str) -> Result<String> {
    let notebook: Notebook =
        serde_json::from_str(document).context("Invalid notebook document")?;

    let mut code = String::new();
    for cell in notebook.cells.iter().filter(|c| c.cell_type == "code") {
        let text = match &cell.source {
            CellSource::Lines(lines) => lines.concat(),
            CellSource::Text(text) => text.clone(),
        };
        for line in text.lines() {
            if !is_shell_line(line) {
                code.push_str(line);
            }
            code.push('\n');
        }
    }

    Ok(code)
}

/// IPython magics (`%time`) and shell escapes (`!pip install`) are not Python.
fn is_shell_line(line: &str) -> bool {
    matches!(line.trim_start().chars().next(), Some('%') | Some('!'))
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}
