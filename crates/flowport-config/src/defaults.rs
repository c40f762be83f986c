use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Directory holding one subdirectory per package.
pub const DEFAULT_PACKAGES_DIR: &str = "packages";

/// Per-package directory holding the hand-written declaration files.
pub const DEFAULT_SOURCE_SUBDIR: &str = "flow";

/// Extension of the declaration files to export.
pub const DEFAULT_SOURCE_EXTENSION: &str = "flow";

/// Per-package directory receiving the rewritten files.
pub const DEFAULT_OUTPUT_SUBDIR: &str = "dist";

/// Routing tag written into strict docblocks.
pub use flowport_syntax::DEFAULT_ONCALL as DEFAULT_ONCALL_TAG;

/// Prefix shared by every www module name.
pub const DEFAULT_WWW_PREFIX: &str = "Lexical";

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default packages root, relative to the working directory.
#[must_use]
pub fn default_packages_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PACKAGES_DIR)
}

/// Owned default for the declaration source subdirectory.
#[must_use]
pub fn default_source_subdir() -> String {
    DEFAULT_SOURCE_SUBDIR.to_owned()
}

/// Owned default for the declaration file extension.
#[must_use]
pub fn default_source_extension() -> String {
    DEFAULT_SOURCE_EXTENSION.to_owned()
}

/// Owned default for the output subdirectory.
#[must_use]
pub fn default_output_subdir() -> String {
    DEFAULT_OUTPUT_SUBDIR.to_owned()
}

/// Owned default for the `@oncall` routing tag.
#[must_use]
pub fn default_oncall_tag() -> String {
    DEFAULT_ONCALL_TAG.to_owned()
}

/// Owned default for the www module name prefix.
#[must_use]
pub fn default_www_prefix() -> String {
    DEFAULT_WWW_PREFIX.to_owned()
}
