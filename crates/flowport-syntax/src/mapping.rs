//! The public-to-internal module name table.

use std::collections::HashMap;

/// Immutable mapping from public module references to internal ones.
///
/// Built once per run and shared by reference with every rewrite. Keys are
/// unique: when constructed from pairs with a repeated key, the last pair
/// wins.
///
/// ```
/// use flowport_syntax::NameMapping;
///
/// let mapping: NameMapping = [("lexical/Foo", "LexicalFoo")].into_iter().collect();
/// assert_eq!(mapping.get("lexical/Foo"), Some("LexicalFoo"));
/// assert_eq!(mapping.get("toString"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMapping {
    entries: HashMap<String, String>,
}

impl NameMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the internal reference for a public one.
    #[must_use]
    pub fn get(&self, public: &str) -> Option<&str> {
        self.entries.get(public).map(String::as_str)
    }

    /// Returns whether `public` has an entry.
    #[must_use]
    pub fn contains(&self, public: &str) -> bool {
        self.entries.contains_key(public)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(public, internal)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for NameMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for NameMapping {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}
