//! Derivation of www module names from npm module names.

use std::collections::HashMap;

use flowport_syntax::NameMapping;
use tracing::{debug, warn};

use crate::packages::Package;

/// Derives the www name for an npm module name.
///
/// The package name loses its npm scope and is PascalCased, gaining `prefix`
/// unless it already starts with it. A sub-path module uses its last path
/// segment, kept verbatim when it already carries the prefix or is a React
/// hook (`useFoo`).
///
/// `lexical` becomes `Lexical`, `@lexical/rich-text` becomes
/// `LexicalRichText`, `@lexical/react/LexicalComposer` stays
/// `LexicalComposer`, and `lexical/Foo` becomes `LexicalFoo`.
pub(crate) fn www_name(npm: &str, prefix: &str) -> String {
    let unscoped = if npm.starts_with('@') {
        npm.split_once('/').map_or(npm, |(_, rest)| rest)
    } else {
        npm
    };

    match unscoped.rsplit_once('/') {
        Some((_, segment)) if segment.starts_with(prefix) || is_hook(segment) => {
            segment.to_owned()
        }
        Some((_, segment)) => with_prefix(&pascal_case(segment), prefix),
        None => with_prefix(&pascal_case(unscoped), prefix),
    }
}

fn with_prefix(name: &str, prefix: &str) -> String {
    if name.starts_with(prefix) {
        name.to_owned()
    } else {
        format!("{prefix}{name}")
    }
}

fn is_hook(segment: &str) -> bool {
    segment
        .strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}

fn pascal_case(name: &str) -> String {
    name.split(['-', '_', '.'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect()
}

/// Builds the public-to-www mapping from the public packages.
///
/// When two npm names derive the same www name both entries are kept; when
/// the same npm name is exported twice the later package wins and a warning
/// is logged.
pub(crate) fn build_mapping(packages: &[Package], prefix: &str) -> NameMapping {
    let mut entries: HashMap<String, String> = HashMap::new();
    for package in packages.iter().filter(|package| package.is_public()) {
        for npm in package.exported_module_names() {
            let www = www_name(&npm, prefix);
            debug!(npm = %npm, www = %www, package = package.directory(), "mapped module");
            if let Some(previous) = entries.insert(npm.clone(), www.clone()) {
                warn!(
                    npm = %npm,
                    previous = %previous,
                    replacement = %www,
                    "module exported by more than one package"
                );
            }
        }
    }
    NameMapping::from(entries)
}
