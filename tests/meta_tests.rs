//! Meta-tests that verify test suite integrity
//!
//! These tests ensure that the E2E test files exist and that no test
//! in the tree is marked ignored.

use std::path::Path;

const E2E_FILES: [&str; 7] = [
    "e2e_paths.rs",
    "e2e_lifecycle.rs",
    "e2e_parameters.rs",
    "e2e_devices.rs",
    "e2e_changes.rs",
    "e2e_config.rs",
    "e2e_handle.rs",
];

fn tests_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests"))
}

/// Verify E2E test files exist and are not empty
#[test]
fn e2e_tests_exist() {
    for file in E2E_FILES {
        let path = tests_dir().join(file);
        let contents = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Missing E2E test file {}: {e}", path.display()));
        assert!(
            contents.contains("#[test]") || contents.contains("#[tokio::test"),
            "{file} contains no tests"
        );
    }
}

/// Verify no test is ignored
///
/// Ignored tests can hide regressions. All tests must run.
#[test]
fn no_ignored_tests() {
    let marker = ["#[", "ignore"].concat();
    let roots = [
        tests_dir().to_path_buf(),
        Path::new(env!("CARGO_MANIFEST_DIR")).join("crates/vmremote-core/src"),
    ];
    let mut offenders = Vec::new();
    for root in roots {
        collect_offenders(&root, &marker, &mut offenders);
    }
    assert!(offenders.is_empty(), "Ignored tests found in: {offenders:?}");
}

fn collect_offenders(dir: &Path, marker: &str, offenders: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_offenders(&path, marker, offenders);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let contents = std::fs::read_to_string(&path).unwrap_or_default();
            if contents.contains(marker) {
                offenders.push(path.display().to_string());
            }
        }
    }
}
