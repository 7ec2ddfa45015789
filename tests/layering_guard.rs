//! Layering guardrails to keep the bridge independent of any particular framework.
//!
//! The bridge modules (`driver`, `session`, `summary`, `errors`) may only reach the framework through dynamic
//! lookup; the reference framework crate is a host-side dependency used by the CLI. The semantic core must
//! stay free of workspace dependencies.

const BRIDGE_SOURCES: &[(&str, &str)] = &[
    ("src/driver.rs", include_str!("../src/driver.rs")),
    ("src/session.rs", include_str!("../src/session.rs")),
    ("src/summary.rs", include_str!("../src/summary.rs")),
    ("src/errors.rs", include_str!("../src/errors.rs")),
];

#[test]
fn bridge_modules_do_not_reference_the_reference_framework() {
    for (path, source) in BRIDGE_SOURCES {
        for (number, line) in source.lines().enumerate() {
            if line.contains("testbridge_framework") {
                panic!("{path}:{}: bridge modules must not name `testbridge_framework`", number + 1);
            }
        }
    }
}

#[test]
fn core_has_no_workspace_dependencies() {
    let manifest = include_str!("../crates/testbridge_core/Cargo.toml");
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
        if line_no_comment.starts_with("testbridge") || line_no_comment.contains("path =") {
            panic!("testbridge_core must not depend on other workspace crates: `{line_no_comment}`");
        }
    }
}
