use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Brand key, doubling as the brand directory name and the remote folder
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandKey(String);

impl BrandKey {
    /// Derive the brand key from a catalog file name such as `samsung_page.html`.
    ///
    /// Only the final path component is considered. Returns `None` when the name
    /// does not end with `suffix` or nothing is left once the suffix is removed.
    pub fn from_catalog_file(file_name: &str, suffix: &str) -> Option<Self> {
        let name = Path::new(file_name).file_name()?.to_str()?;
        let stem = name.strip_suffix(suffix)?;
        if stem.trim().is_empty() {
            return None;
        }
        Some(Self(capitalize(stem)))
    }

    /// Wrap a brand directory name found on disk, keeping it verbatim.
    pub fn from_directory(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BrandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for BrandKey {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
