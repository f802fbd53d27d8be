//! The ordered, deduplicated set of images a report is built from.
//!
//! ## Uniqueness
//!
//! No two records may share both name and byte size. Adding a candidate that
//! collides with an existing record is silently ignored, which is what a user
//! expects when picking the same files twice.
//!
//! ## Display URLs
//!
//! Every record gets a `blob:`-style display url from the collection's
//! [`DisplayRegistry`] when it is added. The record owns the url exclusively
//! and it is released when the record is removed or the collection is cleared,
//! so `registry().live_count()` always equals `len()`.
//!
//! ## Indices
//!
//! Indices are 0-based and contiguous after every mutation. [`ImageCollection::move_item`]
//! has splice-then-insert semantics: the target index is interpreted in the
//! sequence *after* the source element was taken out.
//!
//! ```text
//! [X, Y, Z]  move_item(2, 0)  →  [Z, X, Y]
//! [X, Y, Z]  move_item(0, 2)  →  [Y, Z, X]
//! ```

use crate::types::{ImageCandidate, ImageIdentity, ImageSource};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("index {index} is out of range for a collection of {len} images")]
    OutOfRange { index: usize, len: usize },
}

/// Engine-assigned url a UI can use to preview a record.
///
/// Not `Clone`: exactly one record owns each url.
#[derive(Debug, PartialEq, Eq)]
pub struct DisplayUrl {
    id: u64,
    url: String,
}

impl DisplayUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for DisplayUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Issues and releases display urls.
#[derive(Debug, Default)]
pub struct DisplayRegistry {
    next_id: u64,
    live: BTreeSet<u64>,
}

impl DisplayRegistry {
    fn issue(&mut self, identity: &ImageIdentity) -> DisplayUrl {
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id);
        DisplayUrl {
            id,
            url: format!("blob:photo-report/{id}/{}", identity.name),
        }
    }

    fn release(&mut self, url: DisplayUrl) {
        self.live.remove(&url.id);
    }

    /// Number of urls issued and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether `url` is still live.
    pub(crate) fn is_live(&self, url: &DisplayUrl) -> bool {
        self.live.contains(&url.id)
    }
}

/// One image in the collection.
#[derive(Debug)]
pub struct ImageRecord {
    pub identity: ImageIdentity,
    pub source: ImageSource,
    display_url: DisplayUrl,
}

impl ImageRecord {
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn display_url(&self) -> &DisplayUrl {
        &self.display_url
    }
}

/// An image taken out of the collection by [`ImageCollection::remove`].
///
/// Its display url has already been released.
#[derive(Debug, Clone)]
pub struct RemovedImage {
    pub identity: ImageIdentity,
    pub source: ImageSource,
}

#[derive(Debug, Default)]
pub struct ImageCollection {
    records: Vec<ImageRecord>,
    registry: DisplayRegistry,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageRecord> {
        self.records.iter()
    }

    /// File names in current order.
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name()).collect()
    }

    pub fn registry(&self) -> &DisplayRegistry {
        &self.registry
    }

    /// Whether a record with the same `(name, size)` is already present.
    pub fn contains(&self, identity: &ImageIdentity) -> bool {
        self.records.iter().any(|r| r.identity.same_file(identity))
    }

    /// Append `candidate` unless it duplicates an existing record.
    ///
    /// Returns `true` if the candidate was added.
    pub fn add(&mut self, candidate: ImageCandidate) -> bool {
        if self.contains(&candidate.identity) {
            debug!(name = %candidate.identity.name, "duplicate image ignored");
            return false;
        }
        let display_url = self.registry.issue(&candidate.identity);
        debug!(name = %candidate.identity.name, url = %display_url, "image added");
        self.records.push(ImageRecord {
            identity: candidate.identity,
            source: candidate.source,
            display_url,
        });
        true
    }

    /// Remove the record at `index`, releasing its display url.
    pub fn remove(&mut self, index: usize) -> Result<RemovedImage, CollectionError> {
        self.check_index(index)?;
        let record = self.records.remove(index);
        debug!(index, name = %record.identity.name, "image removed");
        self.registry.release(record.display_url);
        Ok(RemovedImage {
            identity: record.identity,
            source: record.source,
        })
    }

    /// Release every display url and empty the collection.
    pub fn clear(&mut self) {
        let count = self.records.len();
        for record in self.records.drain(..) {
            self.registry.release(record.display_url);
        }
        debug!(count, "collection cleared");
    }

    /// Take the record at `source` out and reinsert it at `target`.
    ///
    /// `target` is an index into the sequence after removal. Equal indices are
    /// a no-op.
    pub fn move_item(&mut self, source: usize, target: usize) -> Result<(), CollectionError> {
        self.check_index(source)?;
        self.check_index(target)?;
        if source == target {
            return Ok(());
        }
        let record = self.records.remove(source);
        self.records.insert(target, record);
        debug!(source, target, "image moved");
        Ok(())
    }

    /// Exchange the records at `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), CollectionError> {
        self.check_index(a)?;
        self.check_index(b)?;
        self.records.swap(a, b);
        Ok(())
    }

    /// Stable sort with a caller-supplied comparison on identities.
    pub(crate) fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&ImageIdentity, &ImageIdentity) -> std::cmp::Ordering,
    {
        self.records.sort_by(|a, b| compare(&a.identity, &b.identity));
    }

    fn check_index(&self, index: usize) -> Result<(), CollectionError> {
        if index < self.records.len() {
            Ok(())
        } else {
            Err(CollectionError::OutOfRange {
                index,
                len: self.records.len(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a ImageCollection {
    type Item = &'a ImageRecord;
    type IntoIter = std::slice::Iter<'a, ImageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
