use super::*;

use std::ffi::OsString;
use std::fs;

use camino::Utf8PathBuf;
use flowport_config::Config;
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct StaticConfigLoader {
    config: Config,
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

struct Packages {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl Packages {
    fn write(&self, relative: &str, contents: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write fixture");
    }

    fn run(&self, args: &[&str]) -> Outcome {
        let loader = StaticConfigLoader {
            config: Config {
                packages_dir: self.root.clone(),
                ..Config::default()
            },
        };
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let exit = run_with_loader(
            std::iter::once("flowport")
                .chain(args.iter().copied())
                .map(OsString::from),
            &mut stdout,
            &mut stderr,
            &loader,
        );
        Outcome {
            exit,
            stdout: String::from_utf8(stdout).expect("stdout utf8"),
            stderr: String::from_utf8(stderr).expect("stderr utf8"),
        }
    }
}

#[fixture]
fn packages() -> Packages {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 tempdir");
    let packages = Packages { _temp: temp, root };
    packages.write("lexical/package.json", r#"{"name": "lexical"}"#);
    packages.write(
        "lexical/flow/Lexical.js.flow",
        "/**\n * @flow strict\n */\ndeclare export var VERSION: string;\n",
    );
    packages
}

#[rstest]
fn successful_run_prints_summary(packages: Packages) {
    let outcome = packages.run(&[]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(
        outcome.stdout,
        "rewrote 1 of 1 files across 1 packages (0 unchanged, 0 failed)\n"
    );
    assert!(outcome.stderr.is_empty());
    assert!(packages.root.join("lexical/dist/Lexical.js.flow").exists());
}

#[rstest]
fn dry_run_flag_is_parsed(packages: Packages) {
    let outcome = packages.run(&["--dry-run"]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.starts_with("would rewrite 1 of 1 files"));
    assert!(!packages.root.join("lexical/dist").exists());
}

#[rstest]
fn failed_file_sets_failure_exit(packages: Packages) {
    packages.write("lexical/flow/Broken.js.flow", "import x from 'lexical");

    let outcome = packages.run(&[]);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("Broken.js.flow"));
    assert!(outcome.stderr.contains("unterminated string literal"));
    assert!(outcome.stdout.contains("1 failed"));
}

#[rstest]
fn unknown_argument_is_a_usage_error(packages: Packages) {
    let outcome = packages.run(&["--frobnicate"]);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("--frobnicate"));
    assert!(outcome.stdout.is_empty());
}

#[rstest]
fn help_goes_to_stdout(packages: Packages) {
    let outcome = packages.run(&["--help"]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("--dry-run"));
}

#[test]
fn missing_packages_root_is_reported() {
    let loader = StaticConfigLoader {
        config: Config {
            packages_dir: Utf8PathBuf::from("/nonexistent/flowport/packages"),
            ..Config::default()
        },
    };
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let exit = run_with_loader(
        [OsString::from("flowport")],
        &mut stdout,
        &mut stderr,
        &loader,
    );

    assert_eq!(exit, ExitCode::FAILURE);
    let stderr = String::from_utf8(stderr).expect("stderr utf8");
    assert!(stderr.starts_with("failed to discover packages:"));
}
