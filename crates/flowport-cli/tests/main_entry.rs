//! Integration tests for the `flowport` binary entry point.
//!
//! Each test builds a small package tree in a temporary directory and checks
//! the files written, the summary printed, and the exit status.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write fixture");
}

fn lexical_tree() -> TempDir {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    write(root, "packages/lexical/package.json", r#"{"name": "lexical"}"#);
    write(
        root,
        "packages/lexical-react/package.json",
        r#"{"name": "@lexical/react", "exports": {"./LexicalComposer": "./LexicalComposer.mjs"}}"#,
    );
    write(
        root,
        "packages/lexical-react/flow/LexicalComposer.js.flow",
        "/**\n * @flow strict\n */\n\nimport type {EditorState} from 'lexical';\nimport {LexicalComposer} from '@lexical/react/LexicalComposer';\n",
    );
    temp
}

#[test]
fn rewrites_package_tree() {
    let temp = lexical_tree();

    let mut command = cargo_bin_cmd!("flowport");
    command.current_dir(temp.path()).env_remove("FLOWPORT_PACKAGES_DIR");
    command
        .assert()
        .success()
        .stdout(contains("rewrote 1 of 1 files across 2 packages"));

    let written = fs::read_to_string(
        temp.path()
            .join("packages/lexical-react/dist/LexicalComposer.js.flow"),
    )
    .expect("output written");
    assert_eq!(
        written,
        "/**\n * @flow strict\n * @generated\n * @oncall lexical_web_text_editor\n */\n\nimport type {EditorState} from 'Lexical';\nimport {LexicalComposer} from 'LexicalComposer';\n"
    );
}

#[test]
fn config_flags_and_dry_run_combine() {
    let temp = lexical_tree();

    let mut command = cargo_bin_cmd!("flowport");
    command
        .arg("--dry-run")
        .arg("--packages-dir")
        .arg(temp.path().join("packages"))
        .arg("--oncall-tag=www_team");
    command
        .assert()
        .success()
        .stdout(contains("would rewrite 1 of 1 files"));

    assert!(!temp.path().join("packages/lexical-react/dist").exists());
}

#[test]
fn broken_declaration_fails_the_run() {
    let temp = lexical_tree();
    write(
        temp.path(),
        "packages/lexical/flow/Broken.js.flow",
        "import x from 'lexical",
    );

    let mut command = cargo_bin_cmd!("flowport");
    command.current_dir(temp.path());
    command
        .assert()
        .failure()
        .stderr(contains("Broken.js.flow"))
        .stdout(contains("1 failed"));
}

#[test]
fn missing_packages_directory_exits_with_failure() {
    let temp = tempfile::tempdir().expect("tempdir");

    let mut command = cargo_bin_cmd!("flowport");
    command.current_dir(temp.path());
    command
        .assert()
        .failure()
        .stderr(contains("failed to discover packages"));
}
