//! Paint scheme lookup.

use std::collections::BTreeMap;
use std::path::Path;

use super::error::DomainError;

/// Color name → short numbers of the locomotives painted in that scheme.
///
/// Loaded from a JSON object such as
/// `{ "laky-cd-modra": ["380001", "380002"], "laky-ozz": ["749121"] }`.
/// Locomotives missing from every list have no color.
#[derive(Debug, Clone, Default)]
pub struct PaintSchemes {
    by_color: BTreeMap<String, Vec<String>>,
}

impl PaintSchemes {
    /// An empty lookup; every locomotive is uncolored.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the lookup from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let by_color = serde_json::from_str(json)?;
        Ok(Self { by_color })
    }

    /// Load the lookup from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DomainError::PaintSchemesIo {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json(&json).map_err(|source| DomainError::PaintSchemesFormat {
            path: path.display().to_string(),
            source,
        })
    }

    /// Color of the locomotive with the given short number.
    pub fn color_of(&self, short: &str) -> Option<&str> {
        self.by_color
            .iter()
            .find(|(_, numbers)| numbers.iter().any(|n| n == short))
            .map(|(color, _)| color.as_str())
    }

    /// Number of color schemes known.
    pub fn len(&self) -> usize {
        self.by_color.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_color.is_empty()
    }
}
