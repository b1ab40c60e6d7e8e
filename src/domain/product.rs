use serde::{Deserialize, Serialize};

use super::naming;

/// Product entry extracted from a catalog page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    /// Display name taken from the image element, e.g. `Galaxy S24 Ultra`
    pub display_name: String,
    /// Image locator as written in the page (absolute URL or path)
    pub locator: String,
}

impl ProductEntry {
    /// Build an entry from raw attribute values.
    ///
    /// Returns `None` unless both values are present and not blank. The
    /// display name is kept verbatim, surrounding whitespace included, since
    /// it feeds the file name and with it the remote public id.
    pub fn from_attributes(display_name: Option<&str>, locator: Option<&str>) -> Option<Self> {
        let display_name = display_name.filter(|s| !s.trim().is_empty())?;
        let locator = locator.map(str::trim).filter(|s| !s.is_empty())?;

        Some(Self {
            display_name: display_name.to_string(),
            locator: locator.to_string(),
        })
    }

    /// File name the image is stored under inside its brand directory.
    pub fn file_name(&self, default_extension: &str) -> String {
        naming::derive_filename(&self.display_name, &self.locator, default_extension)
    }
}
