//! Blocking I/O Prohibition
//!
//! Blocking calls are fine in plain functions that run before or beside
//! the runtime (config loading, FIFO creation). Inside an `async fn` they
//! stall every frame, so they must go through tokio instead.

use architectural_enforcement::{rust_sources, FnKind, SourceFile};

const SCANNED: &[&str] = &["conductor/core/src", "tui/src"];

const FORBIDDEN: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("reqwest::blocking", "Blocking HTTP client"),
    ("std::io::stdin()", "Blocking stdin"),
    ("std::io::stdout()", "Blocking stdout"),
];

fn blocking_violations(file: &SourceFile) -> Vec<String> {
    let mut violations = Vec::new();

    for idx in 0..file.lines.len() {
        if file.is_test_code(idx) {
            continue;
        }
        let code = file.code(idx);

        // Module-level imports make the blocking API available everywhere
        if code.trim_start().starts_with("use std::fs") || code.trim_start().starts_with("use std::net") {
            violations.push(file.describe(idx, "Blocking I/O import"));
            continue;
        }

        if file.enclosing_fn(idx) != Some(FnKind::Async) {
            continue;
        }
        for (pattern, what) in FORBIDDEN {
            if code.contains(pattern) {
                violations.push(file.describe(idx, what));
            }
        }
    }

    violations
}

#[test]
fn test_no_blocking_io_in_async_code() {
    let violations: Vec<String> = SCANNED
        .iter()
        .flat_map(|dir| rust_sources(dir))
        .flat_map(|file| blocking_violations(&file))
        .collect();

    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nUse tokio::fs, tokio::net, tokio::process in async code,");
        eprintln!("or move the call into a plain fn that runs outside the frame loop.");
        panic!("Found {} blocking I/O violation(s)", violations.len());
    }
}

#[test]
fn test_blocking_io_detection() {
    let file = SourceFile::from_text(
        "sample.rs",
        "async fn bad() {\n    let s = std::fs::read_to_string(p)?;\n}\nfn fine() {\n    let s = std::fs::read_to_string(p)?;\n}\n",
    );
    let found = blocking_violations(&file);
    assert_eq!(found.len(), 1);
    assert!(found[0].contains("sample.rs:2"));
}

#[test]
fn test_imports_are_flagged() {
    let file = SourceFile::from_text("sample.rs", "use std::fs;\nfn a() {}\n");
    assert_eq!(blocking_violations(&file).len(), 1);
}

#[test]
fn test_test_code_is_exempt() {
    let file = SourceFile::from_text(
        "sample.rs",
        "#[cfg(test)]\nmod tests {\n    use std::fs;\n    #[tokio::test]\n    async fn t() {\n        std::fs::write(p, b).unwrap();\n    }\n}\n",
    );
    assert!(blocking_violations(&file).is_empty());
}
