use std::path::Path;

/// Separator between filters in a dialog filter string.
pub const FILTER_SEPARATOR: &str = ";;";

/// A named set of file-name patterns offered when choosing a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    /// Glob patterns: `*` or `*.ext`.
    pub patterns: Vec<String>,
}

impl FileFilter {
    pub fn new(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The filters offered by open and save prompts.
    pub fn defaults() -> Vec<FileFilter> {
        vec![
            FileFilter::new("Python files", &["*.py"]),
            FileFilter::new("All Files", &["*"]),
        ]
    }

    /// e.g. `Python files (*.py)`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.patterns.join(" "))
    }

    /// All filters as one dialog string, e.g.
    /// `Python files (*.py);;All Files (*)`.
    pub fn dialog_string(filters: &[FileFilter]) -> String {
        filters
            .iter()
            .map(FileFilter::label)
            .collect::<Vec<_>>()
            .join(FILTER_SEPARATOR)
    }

    /// Whether the file name of `path` matches any pattern.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        self.patterns.iter().any(|p| glob_match(p, &name))
    }
}

/// Minimal glob: `*` matches any run of characters.
fn glob_match(pattern: &str, name: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == name;
    }
    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !name.starts_with(first) || name.len() < first.len() + last.len() {
        return false;
    }
    let mut rest = &name[first.len()..];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}
