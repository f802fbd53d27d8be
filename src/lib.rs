//! # Photo Report
//!
//! Orders a set of photos and exports them as a paginated A4 photo report:
//! two photos per row, a header with two logos and a title on every page,
//! and a "page p of total" footer.
//!
//! # Architecture: Ordered Collection → Layout → Document
//!
//! ```text
//! 1. Collect   files / bytes  →  ImageCollection      (dedup on name + size)
//! 2. Order     clicks, drags, sort criteria  →  same collection, new order
//! 3. Plan      collection length + PageGeometry  →  PageLayout
//! 4. Render    PageLayout + assets  →  DocumentSink  →  PDF bytes
//! ```
//!
//! Steps 1–3 are synchronous and pure apart from the collection's own state,
//! so ordering and pagination are unit-testable without touching the disk or
//! decoding an image. Step 4 is an async pipeline that awaits each asset in
//! turn; it never mutates the collection.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Shared value types: image identity and source, ordering criterion, click behaviour |
//! | [`collection`] | The ordered, deduplicated image sequence and its display-url registry |
//! | [`collation`] | Locale-aware file-name comparison for name ordering |
//! | [`ordering`] | Criterion, selection and drag handling on top of the collection |
//! | [`layout`] | Page geometry and the grid/pagination planner |
//! | [`render`] | Draw instructions, asset decoding, and the PDF sink |
//! | [`export`] | Validation, the sequential export pipeline, and atomic artifact writing |
//! | [`session`] | Owned session state with the export lock, and replayable edit events |
//! | [`scan`] | Discovers image files on disk and turns them into candidates |
//! | [`naming`] | Output file naming with a fallback default |
//! | [`config`] | `report.toml` loading, merging, and validation |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Page Count by Simulation
//!
//! The planner places images one by one and opens a new page when the next
//! row would cross the content boundary. The page count is whatever that loop
//! produces; there is no `ceil(n / per_page)` formula to drift away from the
//! geometry. [`layout::PageGeometry::capacity`] is itself derived by running
//! the planner.
//!
//! ## Export Lock Lives in the Core
//!
//! While an export job is out, [`session::ReportSession`] refuses every
//! mutation. Front ends do not have to remember to disable their controls to
//! keep the sequence from changing under the layout.
//!
//! ## Clearing After Export Is a Policy
//!
//! A successful export empties the collection by default, but that reset is a
//! separate [`export::PostExportPolicy`] applied by the session, not a side
//! effect buried in the pipeline. `Keep` leaves the collection alone.
//!
//! ## JPEGs Are Embedded, Not Re-encoded
//!
//! JPEG photos go into the PDF as their original DCT stream. Other formats are
//! decoded once and stored as Flate-compressed RGB with an optional soft mask.
//! No image is resized or recompressed.
//!
//! ## Base-14 Helvetica
//!
//! The only text is a title and a page label, so the PDF uses the standard
//! Helvetica font with WinAnsi encoding instead of embedding a font. Accented
//! Latin titles render correctly; text is centred with Helvetica's own
//! advance widths.

pub mod collation;
pub mod collection;
pub mod config;
pub mod export;
pub mod layout;
pub mod logging;
pub mod naming;
pub mod ordering;
pub mod output;
pub mod render;
pub mod scan;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
