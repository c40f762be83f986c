//! Discovery, rewrite, and persistence of declaration files.
//!
//! The pipeline builds the module mapping from the public packages, then
//! walks every package's source directory in order, rewriting each file and
//! writing the result to the package's output directory when anything
//! changed. A failing file is logged and recorded without stopping the run
//! unless `fail_fast` is set.

use std::fmt;
use std::io::{self, Write as _};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::Dir;
use flowport_config::Config;
use flowport_syntax::{DeclarationDialect, NameMapping, Rewriter, SyntaxError};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::names::build_mapping;
use crate::packages::{self, ManifestError, Package};

/// Failure attached to a single declaration file.
#[derive(Debug, Error)]
pub(crate) enum PipelineError {
    #[error("failed to list {path}: {source}")]
    ListSources { path: Utf8PathBuf, source: io::Error },
    #[error("failed to read {path}: {source}")]
    Read { path: Utf8PathBuf, source: io::Error },
    #[error("failed to rewrite {path}: {source}")]
    Rewrite {
        path: Utf8PathBuf,
        source: SyntaxError,
    },
    #[error("failed to create {path}: {source}")]
    CreateOutputDir { path: Utf8PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: Utf8PathBuf, source: io::Error },
}

impl PipelineError {
    /// Path of the file or directory that failed.
    pub(crate) fn path(&self) -> &Utf8Path {
        match self {
            Self::ListSources { path, .. }
            | Self::Read { path, .. }
            | Self::Rewrite { path, .. }
            | Self::CreateOutputDir { path, .. }
            | Self::Write { path, .. } => path,
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Written,
    Unchanged,
}

/// Totals reported at the end of a run.
#[derive(Debug, Default)]
pub(crate) struct RunSummary {
    dry_run: bool,
    packages: usize,
    scanned: usize,
    written: usize,
    unchanged: usize,
    failures: Vec<PipelineError>,
}

impl RunSummary {
    /// Number of files whose rewrite changed them.
    #[cfg(test)]
    pub(crate) const fn written(&self) -> usize {
        self.written
    }

    /// Number of files that needed no change.
    #[cfg(test)]
    pub(crate) const fn unchanged(&self) -> usize {
        self.unchanged
    }

    /// Files that could not be processed.
    pub(crate) fn failures(&self) -> &[PipelineError] {
        &self.failures
    }

    /// Whether every file was processed.
    pub(crate) fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run { "would rewrite" } else { "rewrote" };
        write!(
            f,
            "{verb} {} of {} files across {} packages ({} unchanged, {} failed)",
            self.written,
            self.scanned,
            self.packages,
            self.unchanged,
            self.failures.len()
        )
    }
}

/// Runs the export over every package under the configured root.
///
/// # Errors
///
/// Returns [`ManifestError`] when the packages root or a manifest cannot be
/// read, since the module mapping would otherwise be incomplete. Per-file
/// failures are collected in the returned summary instead.
pub(crate) fn run(config: &Config, dry_run: bool) -> Result<RunSummary, ManifestError> {
    let root_path = config.packages_dir();
    let root = packages::open_root(root_path)?;
    let packages = packages::discover(&root, root_path)?;
    let mapping = build_mapping(&packages, config.www_prefix());
    info!(
        packages = packages.len(),
        modules = mapping.len(),
        "built module mapping"
    );

    let exporter = Exporter {
        config,
        root: &root,
        mapping: &mapping,
        dry_run,
    };
    let mut summary = RunSummary {
        dry_run,
        packages: packages.len(),
        ..RunSummary::default()
    };

    for package in &packages {
        if exporter.export_package(package, &mut summary) == Flow::Stop {
            break;
        }
    }
    Ok(summary)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

struct Exporter<'a> {
    config: &'a Config,
    root: &'a Dir,
    mapping: &'a NameMapping,
    dry_run: bool,
}

impl Exporter<'_> {
    fn package_path(&self, package: &Package) -> Utf8PathBuf {
        self.config.packages_dir().join(package.directory())
    }

    fn export_package(&self, package: &Package, summary: &mut RunSummary) -> Flow {
        let package_path = self.package_path(package);
        let package_dir = match self.root.open_dir(package.directory()) {
            Ok(dir) => dir,
            Err(source) => {
                return self.record(
                    summary,
                    PipelineError::ListSources {
                        path: package_path,
                        source,
                    },
                );
            }
        };

        let sources = match self.list_sources(&package_dir, &package_path) {
            Ok(sources) => sources,
            Err(failure) => return self.record(summary, failure),
        };
        debug!(
            package = package.name(),
            files = sources.len(),
            "exporting package"
        );

        for file_name in sources {
            summary.scanned = summary.scanned.saturating_add(1);
            match self.export_file(&package_dir, &package_path, &file_name) {
                Ok(FileOutcome::Written) => summary.written = summary.written.saturating_add(1),
                Ok(FileOutcome::Unchanged) => {
                    summary.unchanged = summary.unchanged.saturating_add(1);
                }
                Err(failure) => {
                    if self.record(summary, failure) == Flow::Stop {
                        return Flow::Stop;
                    }
                }
            }
        }
        Flow::Continue
    }

    fn record(&self, summary: &mut RunSummary, failure: PipelineError) -> Flow {
        error!(path = %failure.path(), error = %failure, "file failed");
        summary.failures.push(failure);
        if self.config.fail_fast() {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    /// Source file names in the package's source directory, sorted.
    fn list_sources(
        &self,
        package_dir: &Dir,
        package_path: &Utf8Path,
    ) -> Result<Vec<String>, PipelineError> {
        let subdir = self.config.source_subdir();
        if !package_dir.is_dir(subdir) {
            return Ok(Vec::new());
        }
        let list_error = |source: io::Error| PipelineError::ListSources {
            path: package_path.join(subdir),
            source,
        };

        let source_dir = package_dir.open_dir(subdir).map_err(list_error)?;
        let mut names = Vec::new();
        for entry in source_dir.entries().map_err(list_error)? {
            let entry = entry.map_err(list_error)?;
            if !entry.file_type().map_err(list_error)?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if has_source_extension(&name, self.config.source_extension()) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn export_file(
        &self,
        package_dir: &Dir,
        package_path: &Utf8Path,
        file_name: &str,
    ) -> Result<FileOutcome, PipelineError> {
        let relative_source = Utf8Path::new(self.config.source_subdir()).join(file_name);
        let source_path = package_path.join(&relative_source);

        let text = package_dir
            .read_to_string(&relative_source)
            .map_err(|source| PipelineError::Read {
                path: source_path.clone(),
                source,
            })?;

        let rewrite_error = |source: SyntaxError| PipelineError::Rewrite {
            path: source_path.clone(),
            source,
        };
        let dialect =
            DeclarationDialect::try_from_path(source_path.as_std_path()).map_err(rewrite_error)?;
        let result = Rewriter::new(dialect)
            .with_oncall(self.config.oncall_tag())
            .rewrite(&text, self.mapping)
            .map_err(rewrite_error)?;

        if !result.has_changes() {
            debug!(path = %source_path, "no changes");
            return Ok(FileOutcome::Unchanged);
        }

        let output_subdir = self.config.output_subdir();
        let relative_output = Utf8Path::new(output_subdir).join(file_name);
        let output_path = package_path.join(&relative_output);
        if self.dry_run {
            info!(
                path = %output_path,
                imports = result.replaced_imports(),
                docblock = result.docblock_annotated(),
                "would write"
            );
            return Ok(FileOutcome::Written);
        }

        let output_dir = package_path.join(output_subdir);
        package_dir
            .create_dir_all(output_subdir)
            .map_err(|source| PipelineError::CreateOutputDir {
                path: output_dir.clone(),
                source,
            })?;
        write_file_atomic(&output_dir, &output_path, result.output()).map_err(|source| {
            PipelineError::Write {
                path: output_path.clone(),
                source,
            }
        })?;
        info!(
            path = %output_path,
            imports = result.replaced_imports(),
            docblock = result.docblock_annotated(),
            "wrote"
        );
        Ok(FileOutcome::Written)
    }
}

/// Matches `name` against a possibly multi-part extension such as `d.ts`.
fn has_source_extension(name: &str, extension: &str) -> bool {
    name.strip_suffix(extension)
        .and_then(|stem| stem.strip_suffix('.'))
        .is_some_and(|stem| !stem.is_empty())
}

/// Writes `contents` to a temporary file in `directory`, then renames it over
/// `path`, so readers never observe a partial file.
fn write_file_atomic(directory: &Utf8Path, path: &Utf8Path, contents: &str) -> io::Result<()> {
    let mut temp_file = tempfile::NamedTempFile::new_in(directory)?;
    temp_file.write_all(contents.as_bytes())?;
    temp_file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
