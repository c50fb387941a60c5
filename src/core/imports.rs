use std::path::{Path, PathBuf};

/// A single import statement, split into whitespace-separated tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub tokens: Vec<String>,
    pub file_path: PathBuf,
    pub line_number: usize,
}

impl ImportStatement {
    /// Build a statement from raw matched text.
    ///
    /// Double quotes and literal `\n` escapes (as found in notebook JSON) are
    /// dropped before splitting. Returns `None` when nothing is left or the
    /// text does not start with `import` or `from`.
    pub fn from_text(text: &str, file_path: &Path, line_number: usize) -> Option<Self> {
        let cleaned = text.replace('"', "").replace("\\n", "");
        let tokens: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();

        match tokens.first().map(String::as_str) {
            Some("import") | Some("from") if tokens.len() >= 2 => Some(Self {
                tokens,
                file_path: file_path.to_path_buf(),
                line_number,
            }),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.tokens[0]
    }

    /// Top-level module names this statement pulls in, normalized.
    ///
    /// `from a.b import c` yields `a`; `import a.b, c as d` yields `a` and `c`.
    /// Statements chained with `;` on one line are each taken into account.
    /// Relative imports and `__future__` yield nothing.
    pub fn top_level_modules(&self) -> Vec<String> {
        let text = self.tokens.join(" ");
        let code = text.split('#').next().unwrap_or_default();
        code.split(';').flat_map(segment_modules).collect()
    }
}

fn segment_modules(segment: &str) -> Vec<String> {
    let mut words = segment.split_whitespace();
    match words.next() {
        Some("from") => match words.next() {
            Some(target) if !target.starts_with('.') => {
                normalize_module(target).into_iter().collect()
            }
            _ => Vec::new(),
        },
        Some("import") => {
            let rest = words.collect::<Vec<_>>().join(" ");
            rest.split(',')
                .filter_map(|part| part.split_whitespace().next())
                .filter_map(normalize_module)
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Reduce a dotted import target to its normalized top-level name.
///
/// The name is cut at the first `.`, stray punctuation is trimmed and `_`
/// becomes `-`, which is how distribution names are spelled.
pub fn normalize_module(raw: &str) -> Option<String> {
    let head = raw.split('.').next().unwrap_or_default();
    let head = head.trim_matches(|c: char| matches!(c, ',' | ';' | '(' | ')' | '\\'));

    if head.is_empty() || head == "__future__" {
        return None;
    }

    let mut chars = head.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_alphabetic() || c == '_')
        .unwrap_or(false);
    if !valid_start || !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    Some(head.replace('_', "-"))
}
