//! Partial collections and their JSON persistence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::{PartialsError, PartialsResult};
use crate::partial::Partial;

/// An unordered bag of Partials.
pub type PartialList = Vec<Partial>;

/// Format tag written into every persisted collection.
pub const FORMAT_NAME: &str = "partials";

/// Current version of the persisted collection layout.
pub const FORMAT_VERSION: u32 = 1;

/// On-disk representation of a Partial collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialsDocument {
    /// Format tag, always [`FORMAT_NAME`].
    pub format: String,
    /// Layout version, always [`FORMAT_VERSION`] when written.
    pub version: u32,
    /// The Partials.
    pub partials: PartialList,
}

impl PartialsDocument {
    /// Wraps a collection for persistence.
    pub fn new(partials: PartialList) -> Self {
        Self {
            format: FORMAT_NAME.to_string(),
            version: FORMAT_VERSION,
            partials,
        }
    }
}

/// Returns the first Partial carrying `label`.
pub fn find_label(partials: &[Partial], label: u32) -> Option<&Partial> {
    partials.iter().find(|p| p.label() == label)
}

/// Returns the distinct labels present, in ascending order.
pub fn labels(partials: &[Partial]) -> BTreeSet<u32> {
    partials.iter().map(Partial::label).collect()
}

/// Total number of breakpoints in a collection.
pub fn breakpoint_count(partials: &[Partial]) -> usize {
    partials.iter().map(Partial::len).sum()
}

/// Serializes a collection to a pretty-printed JSON document.
pub fn to_json_string(partials: &[Partial]) -> PartialsResult<String> {
    let doc = PartialsDocument::new(partials.to_vec());
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Parses a JSON document produced by [`to_json_string`].
pub fn from_json_str(text: &str) -> PartialsResult<PartialList> {
    let doc: PartialsDocument = serde_json::from_str(text)?;
    if doc.format != FORMAT_NAME {
        return Err(PartialsError::format(format!(
            "expected format '{}', found '{}'",
            FORMAT_NAME, doc.format
        )));
    }
    if doc.version != FORMAT_VERSION {
        return Err(PartialsError::format(format!(
            "unsupported version {} (expected {})",
            doc.version, FORMAT_VERSION
        )));
    }
    Ok(doc.partials)
}

/// Writes a collection to `path` as JSON.
pub fn write_json(path: impl AsRef<Path>, partials: &[Partial]) -> PartialsResult<()> {
    let text = to_json_string(partials)?;
    fs::write(path, text)?;
    Ok(())
}

/// Reads a collection from a JSON file.
pub fn read_json(path: impl AsRef<Path>) -> PartialsResult<PartialList> {
    let text = fs::read_to_string(path)?;
    from_json_str(&text)
}
