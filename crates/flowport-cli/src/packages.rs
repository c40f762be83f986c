//! Package discovery under the packages root.
//!
//! Every direct subdirectory holding a `package.json` with a `name` is a
//! package. The manifest decides whether the package is public and which npm
//! module names it exports.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::Dir;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const MANIFEST_FILE: &str = "package.json";

/// Export keys naming files rather than modules.
const FILE_EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs", ".json", ".node"];

/// Errors raised while reading package manifests.
#[derive(Debug, Error)]
pub(crate) enum ManifestError {
    #[error("failed to open packages directory {path}: {source}")]
    OpenRoot { path: Utf8PathBuf, source: io::Error },
    #[error("failed to list packages in {path}: {source}")]
    ListPackages { path: Utf8PathBuf, source: io::Error },
    #[error("failed to read {path}: {source}")]
    Read { path: Utf8PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    name: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    exports: Option<Value>,
}

/// A package found under the packages root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Package {
    directory: String,
    name: String,
    private: bool,
    export_keys: Vec<String>,
}

impl Package {
    #[cfg(test)]
    pub(crate) fn from_manifest(directory: &str, manifest: &str) -> Self {
        parse_manifest(directory, manifest)
            .expect("valid json")
            .expect("named package")
    }

    /// Name of the package directory relative to the packages root.
    pub(crate) fn directory(&self) -> &str {
        &self.directory
    }

    /// npm package name.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Whether the package is published.
    pub(crate) const fn is_public(&self) -> bool {
        !self.private
    }

    /// npm module names importable from this package.
    ///
    /// `"."` maps to the package name and `"./X"` to `name/X`. File-like and
    /// wildcard keys are skipped. Without an exports map the package exports
    /// only its name.
    pub(crate) fn exported_module_names(&self) -> Vec<String> {
        if self.export_keys.is_empty() {
            return vec![self.name.clone()];
        }
        self.export_keys
            .iter()
            .filter_map(|key| module_name_for_export(&self.name, key))
            .collect()
    }
}

fn module_name_for_export(package: &str, key: &str) -> Option<String> {
    if key.contains('*') || FILE_EXTENSIONS.iter().any(|ext| key.ends_with(ext)) {
        return None;
    }
    if key == "." {
        return Some(package.to_owned());
    }
    let subpath = key.strip_prefix("./")?.trim_end_matches('/');
    if subpath.is_empty() {
        return None;
    }
    Some(format!("{package}/{subpath}"))
}

/// Subpath keys of an `exports` value; conditional or string exports have none.
fn export_keys(exports: Option<&Value>) -> Vec<String> {
    match exports {
        Some(Value::Object(map)) => map
            .keys()
            .filter(|key| key.starts_with('.'))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Opens the packages root with ambient authority.
pub(crate) fn open_root(path: &Utf8Path) -> Result<Dir, ManifestError> {
    Dir::open_ambient_dir(path, cap_std::ambient_authority()).map_err(|source| {
        ManifestError::OpenRoot {
            path: path.to_owned(),
            source,
        }
    })
}

/// Lists the packages below `root`, sorted by directory name.
pub(crate) fn discover(root: &Dir, root_path: &Utf8Path) -> Result<Vec<Package>, ManifestError> {
    let list_error = |source: io::Error| ManifestError::ListPackages {
        path: root_path.to_owned(),
        source,
    };

    let mut directories = Vec::new();
    for entry in root.entries().map_err(list_error)? {
        let entry = entry.map_err(list_error)?;
        if !entry.file_type().map_err(list_error)?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => directories.push(name),
            Err(raw) => debug!(name = ?raw, "skipping non-UTF-8 directory"),
        }
    }
    directories.sort();

    let mut packages = Vec::with_capacity(directories.len());
    for directory in directories {
        let manifest_path = Utf8Path::new(&directory).join(MANIFEST_FILE);
        if !root.exists(manifest_path.as_std_path()) {
            debug!(directory = %directory, "no manifest; not a package");
            continue;
        }
        let display_path = root_path.join(&manifest_path);
        let text = root
            .read_to_string(manifest_path.as_std_path())
            .map_err(|source| ManifestError::Read {
                path: display_path.clone(),
                source,
            })?;
        if let Some(package) = parse_manifest(&directory, &text).map_err(|source| {
            ManifestError::Parse {
                path: display_path,
                source,
            }
        })? {
            packages.push(package);
        } else {
            debug!(directory = %directory, "manifest has no name; not a package");
        }
    }
    Ok(packages)
}

fn parse_manifest(directory: &str, text: &str) -> Result<Option<Package>, serde_json::Error> {
    let raw: RawManifest = serde_json::from_str(text)?;
    Ok(raw.name.map(|name| Package {
        directory: directory.to_owned(),
        name,
        private: raw.private,
        export_keys: export_keys(raw.exports.as_ref()),
    }))
}
