//! Shared value types used across the collection, ordering, and export layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// What identifies an image: file name, byte size, and modification time.
///
/// `(name, size)` is the deduplication key; `name` and `last_modified` are the
/// sort keys for [`OrderingCriterion::Name`] and [`OrderingCriterion::Date`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageIdentity {
    pub name: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl ImageIdentity {
    pub fn new(name: impl Into<String>, size: u64, last_modified: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            size,
            last_modified,
        }
    }

    /// True when both records would collide under the uniqueness rule.
    pub fn same_file(&self, other: &ImageIdentity) -> bool {
        self.name == other.name && self.size == other.size
    }
}

/// Opaque reference to the image bytes. Only the asset loader looks inside.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file on disk, read when the export pipeline reaches this image.
    Path(PathBuf),
    /// Bytes already in memory.
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    /// Short human-readable description used in errors and logs.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(p) => p.display().to_string(),
            ImageSource::Bytes(b) => format!("<{} bytes in memory>", b.len()),
        }
    }
}

/// An image offered by the input collaborator, not yet part of a collection.
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub identity: ImageIdentity,
    pub source: ImageSource,
}

impl ImageCandidate {
    pub fn new(identity: ImageIdentity, source: ImageSource) -> Self {
        Self { identity, source }
    }
}

/// How the collection is currently ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingCriterion {
    /// Insertion order, plus whatever the user did by hand.
    #[default]
    Manual,
    /// Locale-aware by file name.
    #[serde(alias = "byname")]
    Name,
    /// Newest modification time first.
    #[serde(alias = "bydatedesc")]
    Date,
}

impl fmt::Display for OrderingCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderingCriterion::Manual => "manual",
            OrderingCriterion::Name => "name",
            OrderingCriterion::Date => "date",
        };
        f.write_str(s)
    }
}

impl FromStr for OrderingCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(OrderingCriterion::Manual),
            "name" | "byname" => Ok(OrderingCriterion::Name),
            "date" | "bydatedesc" => Ok(OrderingCriterion::Date),
            other => Err(format!(
                "unknown ordering '{other}' (expected manual, name, or date)"
            )),
        }
    }
}

/// What a second click on a different image does with the first selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionResolution {
    /// Remove the selected image and reinsert it at the clicked index.
    #[default]
    Move,
    /// Exchange the selected and clicked images.
    Swap,
}
