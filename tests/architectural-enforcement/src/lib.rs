//! Architectural Enforcement
//!
//! Source scans that keep the workspace honest:
//! - no sleeping anywhere in production code or core tests; time is virtual
//!   in the engine and frame-paced by an interval in the terminal surface
//! - no blocking I/O inside async functions
//!
//! The helpers here are line-based heuristics, not a parser. They find the
//! nearest enclosing `fn` by scanning upwards and treat everything after a
//! `#[cfg(test)]` attribute as test code.

use std::path::{Path, PathBuf};

/// A Rust source file split into lines
#[derive(Debug)]
pub struct SourceFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// File content by line
    pub lines: Vec<String>,
}

impl SourceFile {
    /// Build from in-memory text, for detector self-tests
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        Self {
            path: path.into(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Code part of line `idx`, with any `//` comment removed
    pub fn code(&self, idx: usize) -> &str {
        let line = self.lines[idx].as_str();
        line.split("//").next().unwrap_or(line)
    }

    /// Whether line `idx` sits at or after the first `#[cfg(test)]`
    pub fn is_test_code(&self, idx: usize) -> bool {
        self.lines[..=idx]
            .iter()
            .any(|l| l.trim_start().starts_with("#[cfg(test)]"))
    }

    /// Kind of the nearest function above line `idx`
    pub fn enclosing_fn(&self, idx: usize) -> Option<FnKind> {
        for line in self.lines[..=idx].iter().rev() {
            let line = line.trim();
            if let Some(kind) = fn_signature(line) {
                return Some(kind);
            }
            // Stop at module/impl boundaries
            if line.starts_with("mod ") || (line.starts_with("impl") && line.contains('{')) {
                return None;
            }
        }
        None
    }

    /// `path:line - text` for a violation report
    pub fn describe(&self, idx: usize, what: &str) -> String {
        format!(
            "{}:{} - {}: {}",
            self.path.display(),
            idx + 1,
            what,
            self.lines[idx].trim()
        )
    }
}

/// Whether a function is `async`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnKind {
    /// `async fn`
    Async,
    /// Plain `fn`
    Sync,
}

/// Recognise a function signature, ignoring visibility and qualifiers
pub fn fn_signature(line: &str) -> Option<FnKind> {
    let mut rest = line;
    let mut is_async = false;

    loop {
        if let Some(r) = rest.strip_prefix("pub(crate) ") {
            rest = r;
        } else if let Some(r) = rest.strip_prefix("pub ") {
            rest = r;
        } else if let Some(r) = rest.strip_prefix("async ") {
            is_async = true;
            rest = r;
        } else if let Some(r) = rest
            .strip_prefix("const ")
            .or_else(|| rest.strip_prefix("unsafe "))
        {
            rest = r;
        } else {
            break;
        }
    }

    rest.starts_with("fn ").then_some(if is_async {
        FnKind::Async
    } else {
        FnKind::Sync
    })
}

/// Workspace root, two levels above this package
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under `dir` (relative to the workspace root)
///
/// Panics when the directory is missing, so a moved crate cannot make a
/// scan pass vacuously.
pub fn rust_sources(dir: &str) -> Vec<SourceFile> {
    let root = workspace_root();
    let base = root.join(dir);
    assert!(base.is_dir(), "scanned directory {dir} does not exist");

    walkdir::WalkDir::new(&base)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .filter_map(|e| {
            let text = std::fs::read_to_string(e.path()).ok()?;
            let rel = e.path().strip_prefix(&root).unwrap_or(e.path());
            Some(SourceFile::from_text(rel, &text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_signature_variants() {
        assert_eq!(fn_signature("fn main() {"), Some(FnKind::Sync));
        assert_eq!(fn_signature("pub fn load() -> X {"), Some(FnKind::Sync));
        assert_eq!(fn_signature("pub(crate) fn x() {"), Some(FnKind::Sync));
        assert_eq!(fn_signature("pub async fn run(&mut self) {"), Some(FnKind::Async));
        assert_eq!(fn_signature("async fn main() {"), Some(FnKind::Async));
        assert_eq!(fn_signature("let f = fn_ptr;"), None);
        assert_eq!(fn_signature("// fn commented"), None);
    }

    #[test]
    fn test_enclosing_fn() {
        let file = SourceFile::from_text(
            "x.rs",
            "impl Foo {\n    pub async fn a() {\n        body();\n    }\n    fn b() {\n        body();\n    }\n}\n",
        );
        assert_eq!(file.enclosing_fn(2), Some(FnKind::Async));
        assert_eq!(file.enclosing_fn(5), Some(FnKind::Sync));
        assert_eq!(file.enclosing_fn(0), None);
    }

    #[test]
    fn test_test_code_detection() {
        let file = SourceFile::from_text(
            "x.rs",
            "fn a() {}\n#[cfg(test)]\nmod tests {\n    fn t() {}\n}\n",
        );
        assert!(!file.is_test_code(0));
        assert!(file.is_test_code(3));
    }

    #[test]
    fn test_code_strips_comments() {
        let file = SourceFile::from_text("x.rs", "call(); // std::thread::sleep(d)\n");
        assert_eq!(file.code(0), "call(); ");
    }

    #[test]
    fn test_workspace_root_contains_members() {
        let root = workspace_root();
        assert!(root.join("conductor").join("core").is_dir());
        assert!(root.join("tui").is_dir());
    }
}
