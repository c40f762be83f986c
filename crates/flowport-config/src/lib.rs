//! Layered configuration for the flowport exporter.
//!
//! Values resolve in increasing precedence from built-in defaults, a TOML
//! file named by `--config-path` (or `FLOWPORT_CONFIG_PATH`), `FLOWPORT_*`
//! environment variables, and finally command-line flags. Loading is handled
//! by `ortho_config`; this crate only declares the shape and the defaults.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_ONCALL_TAG, DEFAULT_OUTPUT_SUBDIR, DEFAULT_PACKAGES_DIR,
    DEFAULT_SOURCE_EXTENSION, DEFAULT_SOURCE_SUBDIR, DEFAULT_WWW_PREFIX, default_log_filter_string, default_log_format, default_oncall_tag, default_output_subdir,
    default_packages_dir, default_source_extension, default_source_subdir, default_www_prefix,
};
pub use logging::LogFormat;

/// Resolved configuration for one export run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "FLOWPORT")]
pub struct Config {
    /// Directory containing one subdirectory per package.
    #[serde(default = "default_packages_dir")]
    #[ortho_config(default = default_packages_dir())]
    pub packages_dir: Utf8PathBuf,

    /// Per-package directory holding the declaration files to export.
    #[serde(default = "default_source_subdir")]
    #[ortho_config(default = default_source_subdir())]
    pub source_subdir: String,

    /// Extension (without the dot) of the declaration files to export.
    #[serde(default = "default_source_extension")]
    #[ortho_config(default = default_source_extension())]
    pub source_extension: String,

    /// Per-package directory receiving rewritten files.
    #[serde(default = "default_output_subdir")]
    #[ortho_config(default = default_output_subdir())]
    pub output_subdir: String,

    /// Routing tag written after `@flow strict` docblock lines.
    #[serde(default = "default_oncall_tag")]
    #[ortho_config(default = default_oncall_tag())]
    pub oncall_tag: String,

    /// Prefix shared by every derived www module name.
    #[serde(default = "default_www_prefix")]
    #[ortho_config(default = default_www_prefix())]
    pub www_prefix: String,

    /// Stop at the first file that fails instead of reporting all failures.
    #[serde(default)]
    #[ortho_config(default = false)]
    pub fail_fast: bool,

    /// `tracing` filter directive, e.g. `info` or `flowport_cli=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,

    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            packages_dir: default_packages_dir(),
            source_subdir: default_source_subdir(),
            source_extension: default_source_extension(),
            output_subdir: default_output_subdir(),
            oncall_tag: default_oncall_tag(),
            www_prefix: default_www_prefix(),
            fail_fast: false,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Directory containing one subdirectory per package.
    #[must_use]
    pub fn packages_dir(&self) -> &Utf8Path {
        &self.packages_dir
    }

    /// Per-package declaration source directory.
    #[must_use]
    pub fn source_subdir(&self) -> &str {
        &self.source_subdir
    }

    /// Declaration file extension, with any leading dot removed.
    #[must_use]
    pub fn source_extension(&self) -> &str {
        self.source_extension.trim_start_matches('.')
    }

    /// Per-package output directory.
    #[must_use]
    pub fn output_subdir(&self) -> &str {
        &self.output_subdir
    }

    /// Routing tag for strict docblocks.
    #[must_use]
    pub fn oncall_tag(&self) -> &str {
        &self.oncall_tag
    }

    /// Prefix for derived www module names.
    #[must_use]
    pub fn www_prefix(&self) -> &str {
        &self.www_prefix
    }

    /// Whether the run stops at the first failing file.
    #[must_use]
    pub const fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// `tracing` filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_lexical_layout() {
        let config = Config::default();

        assert_eq!(config.packages_dir(), Utf8Path::new("packages"));
        assert_eq!(config.source_subdir(), "flow");
        assert_eq!(config.source_extension(), "flow");
        assert_eq!(config.output_subdir(), "dist");
        assert_eq!(config.oncall_tag(), "lexical_web_text_editor");
        assert_eq!(config.www_prefix(), "Lexical");
        assert!(!config.fail_fast());
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Compact);
    }

    #[test]
    fn source_extension_ignores_leading_dot() {
        let config = Config {
            source_extension: ".flow".to_owned(),
            ..Config::default()
        };
        assert_eq!(config.source_extension(), "flow");
    }

    #[test]
    fn default_oncall_tag_matches_the_rewriter_default() {
        let annotations = flowport_syntax::DocblockAnnotations::default();
        assert_eq!(Config::default().oncall_tag(), annotations.oncall());
    }
}
