//! Layering guardrails to keep the semantic core free of I/O-facing dependencies.
//!
//! `harness_core` holds the pure vocabulary (normalization, failure descriptions). This test scans its
//! `Cargo.toml` and fails if the root crate or any CLI/logging crate appears in `[dependencies]`.

const FORBIDDEN: [&str; 5] = ["script-harness", "clap", "tracing", "tracing-subscriber", "miette"];

#[test]
fn core_does_not_depend_on_harness_or_cli_stack() {
    let manifest = include_str!("../crates/harness_core/Cargo.toml");
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        let name = line_no_comment.split('=').next().unwrap_or("").trim();
        if FORBIDDEN.contains(&name) {
            panic!("`{name}` must not appear in harness_core's [dependencies]");
        }
    }
}

#[test]
fn core_has_no_path_dependency_on_root_crate() {
    let manifest = include_str!("../crates/harness_core/Cargo.toml");
    assert!(!manifest.contains("path = \"../..\""), "harness_core must not depend on the root crate");
}

#[test]
fn test_doubles_stay_out_of_the_default_library() {
    let lib = include_str!("../src/lib.rs");
    let gated = lib
        .lines()
        .collect::<Vec<_>>()
        .windows(2)
        .any(|w| w[0].trim() == "#[cfg(any(test, feature = \"testing\"))]" && w[1].trim() == "pub mod testing;");
    assert!(gated, "`pub mod testing;` must be gated behind the `testing` feature");

    let manifest = include_str!("../Cargo.toml");
    assert!(manifest.contains("\n[features]\n"), "root manifest must declare a [features] table");
    assert!(manifest.contains("\ntesting = []"), "root manifest must declare the `testing` feature");
}
