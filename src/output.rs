//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Every image is shown by its position in the report and its file name; the
//! path it was read from is secondary context on an indented `Source:` line.
//! Positions are 1-based and zero-padded so listings line up and match the
//! numbers a reader sees in the exported document order.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Images (3, order: name)
//! 001 fachada.jpg  2.4 MB  2024-03-02 09:15
//!     Source: obra/fachada.jpg
//! 002 patio.png  812.0 KB  2024-03-01 17:40  [selected]
//!     Source: obra/patio.png
//! ```
//!
//! ## Plan
//!
//! ```text
//! Page 1 of 3 (6 images)
//!     001 fachada.jpg  left, row 1  @ 20.0, 25.6 mm
//!     002 patio.png  right, row 1  @ 110.0, 25.6 mm
//! ```
//!
//! ## Export
//!
//! ```text
//! Page 1 of 3
//!     001 fachada.jpg
//!     002 patio.png
//! Wrote Obra.pdf (3 pages, 13 images, 4.1 MB)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::collection::ImageCollection;
use crate::export::{ExportEvent, ExportedDocument};
use crate::layout::PageLayout;
use crate::ordering::OrderingEngine;
use crate::render::instructions::LogoSide;
use crate::types::ImageSource;
use serde::Serialize;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 0-based collection index as a 1-based, 3-digit position.
fn format_index(index: usize) -> String {
    format!("{:0>3}", index + 1)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count.
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn column_name(column: usize, columns: usize) -> String {
    match (column, columns) {
        (0, 2) => "left".to_string(),
        (1, 2) => "right".to_string(),
        _ => format!("col {}", column + 1),
    }
}

fn source_line(source: &ImageSource) -> String {
    format!("{}Source: {}", indent(1), source.describe())
}

// ============================================================================
// list
// ============================================================================

/// Format the collection in its current order.
pub fn format_collection(engine: &OrderingEngine) -> Vec<String> {
    let collection = engine.collection();
    let mut lines = vec![format!(
        "Images ({}, order: {})",
        collection.len(),
        engine.criterion()
    )];
    for (index, record) in collection.iter().enumerate() {
        let mut line = format!(
            "{} {}  {}  {}",
            format_index(index),
            record.name(),
            format_size(record.identity.size),
            record.identity.last_modified.format("%Y-%m-%d %H:%M")
        );
        if engine.selection() == Some(index) {
            line.push_str("  [selected]");
        }
        lines.push(line);
        lines.push(source_line(&record.source));
    }
    lines
}

/// Print the collection to stdout.
pub fn print_collection(engine: &OrderingEngine) {
    for line in format_collection(engine) {
        println!("{}", line);
    }
}

// ============================================================================
// plan
// ============================================================================

/// Format a page layout, naming each image from `collection`.
pub fn format_layout(layout: &PageLayout, collection: &ImageCollection) -> Vec<String> {
    let mut lines = Vec::new();
    let columns = layout
        .placements
        .iter()
        .map(|p| p.column + 1)
        .max()
        .unwrap_or(0);
    for (page, placements) in layout.pages() {
        lines.push(format!(
            "Page {} of {} ({} images)",
            page,
            layout.page_count,
            placements.len()
        ));
        for p in placements {
            let name = collection.get(p.index).map(|r| r.name()).unwrap_or("?");
            lines.push(format!(
                "{}{} {}  {}, row {}  @ {:.1}, {:.1} mm",
                indent(1),
                format_index(p.index),
                name,
                column_name(p.column, columns),
                p.row + 1,
                p.x,
                p.y
            ));
        }
    }
    if lines.is_empty() {
        lines.push("No images to lay out".to_string());
    }
    lines
}

#[derive(Serialize)]
struct PlannedImage<'a> {
    position: usize,
    name: &'a str,
    page: u32,
    column: usize,
    row: usize,
    x_mm: f64,
    y_mm: f64,
    width_mm: f64,
    height_mm: f64,
}

#[derive(Serialize)]
struct PlanReport<'a> {
    page_count: u32,
    images: Vec<PlannedImage<'a>>,
}

/// The layout as pretty JSON, for `plan --json`.
pub fn format_layout_json(
    layout: &PageLayout,
    collection: &ImageCollection,
) -> Result<String, serde_json::Error> {
    let report = PlanReport {
        page_count: layout.page_count,
        images: layout
            .placements
            .iter()
            .map(|p| PlannedImage {
                position: p.index + 1,
                name: collection.get(p.index).map(|r| r.name()).unwrap_or(""),
                page: p.page,
                column: p.column,
                row: p.row,
                x_mm: p.x,
                y_mm: p.y,
                width_mm: p.width,
                height_mm: p.height,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report)
}

/// Print a page layout to stdout.
pub fn print_layout(layout: &PageLayout, collection: &ImageCollection) {
    for line in format_layout(layout, collection) {
        println!("{}", line);
    }
}

// ============================================================================
// export
// ============================================================================

/// Format a single export progress event as display lines.
pub fn format_export_event(event: &ExportEvent) -> Vec<String> {
    match event {
        ExportEvent::Started { images, pages } => {
            vec![format!("Exporting {} images on {} pages", images, pages)]
        }
        ExportEvent::LogoOmitted { side, path } => {
            let side = match side {
                LogoSide::Left => "left",
                LogoSide::Right => "right",
            };
            vec![format!(
                "No {} logo at {}, slot left empty",
                side,
                path.display()
            )]
        }
        ExportEvent::PageStarted { page, total } => vec![format!("Page {} of {}", page, total)],
        ExportEvent::ImagePlaced { index, name, .. } => {
            vec![format!("{}{} {}", indent(1), format_index(*index), name)]
        }
        // The summary line is printed once the file is on disk.
        ExportEvent::Finished { .. } => Vec::new(),
    }
}

/// Format the final line after the artifact was written.
pub fn format_export_summary(document: &ExportedDocument, path: &Path) -> String {
    format!(
        "Wrote {} ({} pages, {} images, {})",
        path.display(),
        document.pages,
        document.images,
        format_size(document.bytes.len() as u64)
    )
}

pub fn print_export_summary(document: &ExportedDocument, path: &Path) {
    println!("{}", format_export_summary(document, path));
}
