//! Sleep Prohibition
//!
//! The engine runs on virtual time fed in by frame ticks, and the terminal
//! surface paces frames with `tokio::time::interval`. Nothing sleeps: not
//! production code, and not the engine's tests, which advance time through
//! `Conductor::tick`.

use architectural_enforcement::{rust_sources, SourceFile};

const SCANNED: &[&str] = &["conductor/core/src", "conductor/core/tests", "tui/src"];

fn sleep_violations(file: &SourceFile) -> Vec<String> {
    (0..file.lines.len())
        .filter(|&idx| {
            let code = file.code(idx);
            code.contains("::sleep(") || code.contains(".sleep(") || code.contains("sleep_until(")
        })
        .map(|idx| file.describe(idx, "sleep call"))
        .collect()
}

#[test]
fn test_no_sleep_anywhere() {
    let violations: Vec<String> = SCANNED
        .iter()
        .flat_map(|dir| rust_sources(dir))
        .flat_map(|file| sleep_violations(&file))
        .collect();

    if !violations.is_empty() {
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nUse TimerSet / Conductor::tick for engine time and");
        eprintln!("tokio::time::interval for frame pacing.");
        panic!("Found {} sleep call(s)", violations.len());
    }
}

#[test]
fn test_sleep_detector() {
    let file = SourceFile::from_text(
        "sample.rs",
        "fn a() {\n    std::thread::sleep(d);\n    tokio::time::sleep(d).await;\n    // thread::sleep(d)\n    interval.tick().await;\n}\n",
    );
    let found = sleep_violations(&file);
    assert_eq!(found.len(), 2);
    assert!(found[0].contains("sample.rs:2"));
}
