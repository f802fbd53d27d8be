//! Page layout planning: where each image goes in the exported document.
//!
//! Layout is a pure function of the image count and a fixed [`PageGeometry`].
//! All coordinates are millimetres on an A4 portrait page with the origin at
//! the top-left corner, y growing downward.
//!
//! ```text
//!  ┌──────────────────────────────┐  ← header band (logos + title)
//!  │ [logo]    TITLE      [logo]  │
//!  ├──────────────────────────────┤  ← rule
//!  │   ┌──────┐      ┌──────┐     │  ← content_top
//!  │   │  1   │      │  2   │     │
//!  │   └──────┘      └──────┘     │
//!  │   ┌──────┐      ┌──────┐     │
//!  │   │  3   │      │  4   │     │
//!  │   └──────┘      └──────┘     │
//!  │   ┌──────┐      ┌──────┐     │
//!  │   │  5   │      │  6   │     │
//!  │   └──────┘      └──────┘     │
//!  │                              │  ← content_bottom
//!  │          Page 1 of 3         │  ← footer baseline
//!  └──────────────────────────────┘
//! ```
//!
//! ## Pagination
//!
//! Page breaks are found by simulating placement, never by dividing the count
//! by a fixed per-page constant. Items fill the left column then the right;
//! after a full row the vertical cursor advances by one cell plus the row gap.
//! Before each item, if a cell at the cursor (plus the row gap) would cross
//! `content_bottom`, a new page starts and the cursor returns to `content_top`.
//! A page that has no items yet always accepts one, so a geometry whose cell is
//! taller than the content band still terminates.
//!
//! With the stock geometry that yields six images per page (three rows of
//! two), and page numbers are assigned as pages are created.

use serde::Serialize;
use thiserror::Error;

/// Points per millimetre (72 pt per inch / 25.4 mm per inch).
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// CSS pixels to millimetres at 96 dpi.
pub fn px_to_mm(px: f64) -> f64 {
    px * 25.4 / 96.0
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("grid is {needed:.1}mm wide but only {available:.1}mm fit between the margins")]
    GridTooWide { needed: f64, available: f64 },
    #[error("a cell of {cell:.1}mm does not fit in a content band of {band:.1}mm")]
    CellTooTall { cell: f64, band: f64 },
    #[error("grid must have at least one column")]
    NoColumns,
}

/// Fixed page geometry of the photo report, in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    /// Left/right margin for the header logos and the rule.
    pub margin: f64,
    /// Distance from the top edge to the header band.
    pub header_top: f64,
    pub header_height: f64,
    /// Space between the header band and the rule.
    pub rule_gap: f64,
    /// Space between the rule and the first row of images.
    pub content_gap: f64,
    /// Distance from the bottom edge to the footer baseline.
    pub footer_offset: f64,
    /// Space kept clear above the footer baseline.
    pub footer_clearance: f64,
    pub columns: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub column_gap: f64,
    pub row_gap: f64,
    pub title_font_size: f64,
    pub footer_font_size: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4_photo_report()
    }
}

impl PageGeometry {
    /// A4 portrait, 40px header band, two columns of 80×75mm cells.
    pub fn a4_photo_report() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 15.0,
            header_top: 10.0,
            header_height: px_to_mm(40.0),
            rule_gap: 1.0,
            content_gap: 4.0,
            footer_offset: 10.0,
            footer_clearance: 10.0,
            columns: 2,
            cell_width: 80.0,
            cell_height: 75.0,
            column_gap: 10.0,
            row_gap: 5.0,
            title_font_size: 16.0,
            footer_font_size: 8.0,
        }
    }

    /// Y of the horizontal rule under the header band.
    pub fn rule_y(&self) -> f64 {
        self.header_top + self.header_height + self.rule_gap
    }

    /// Y where the first row of images starts on every page.
    pub fn content_top(&self) -> f64 {
        self.rule_y() + self.content_gap
    }

    /// Baseline of the page-number footer.
    pub fn footer_y(&self) -> f64 {
        self.page_height - self.footer_offset
    }

    /// Lowest y an image row (plus its row gap) may reach.
    pub fn content_bottom(&self) -> f64 {
        self.footer_y() - self.footer_clearance
    }

    /// Total width of the image grid.
    pub fn grid_width(&self) -> f64 {
        let cols = self.columns as f64;
        cols * self.cell_width + (cols - 1.0).max(0.0) * self.column_gap
    }

    /// X of the left edge of column `column`; the grid is centred on the page.
    pub fn column_x(&self, column: usize) -> f64 {
        let left = (self.page_width - self.grid_width()) / 2.0;
        left + column as f64 * (self.cell_width + self.column_gap)
    }

    /// How many images fit on one page, derived by running the planner.
    pub fn capacity(&self) -> usize {
        let probe = plan_pages(usize::from(u16::MAX), self);
        probe.images_on_page(1)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.columns == 0 {
            return Err(LayoutError::NoColumns);
        }
        let available = self.page_width - 2.0 * self.margin;
        if self.grid_width() > available {
            return Err(LayoutError::GridTooWide {
                needed: self.grid_width(),
                available,
            });
        }
        let band = self.content_bottom() - self.content_top();
        let cell = self.cell_height + self.row_gap;
        if cell > band {
            return Err(LayoutError::CellTooTall { cell, band });
        }
        Ok(())
    }
}

/// Where one image lands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    /// Position of the image in the collection.
    pub index: usize,
    /// 1-based page number.
    pub page: u32,
    /// 0-based column, left to right.
    pub column: usize,
    /// 0-based row within the page.
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Result of planning: every placement in collection order, plus the page count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    pub placements: Vec<Placement>,
    pub page_count: u32,
}

impl PageLayout {
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Placements grouped per page, in page order.
    pub fn pages(&self) -> impl Iterator<Item = (u32, &[Placement])> {
        self.placements
            .chunk_by(|a, b| a.page == b.page)
            .map(|chunk| (chunk[0].page, chunk))
    }

    pub fn images_on_page(&self, page: u32) -> usize {
        self.placements.iter().filter(|p| p.page == page).count()
    }
}

/// Lay out `count` images across as many pages as the geometry requires.
pub fn plan_pages(count: usize, geometry: &PageGeometry) -> PageLayout {
    let columns = geometry.columns.max(1);
    let mut placements = Vec::with_capacity(count);
    let mut page = 1u32;
    let mut y = geometry.content_top();
    let mut column = 0usize;
    let mut row = 0usize;
    let mut on_page = 0usize;

    for index in 0..count {
        let overflows = y + geometry.cell_height + geometry.row_gap > geometry.content_bottom();
        if overflows && on_page > 0 {
            page += 1;
            y = geometry.content_top();
            column = 0;
            row = 0;
            on_page = 0;
        }

        placements.push(Placement {
            index,
            page,
            column,
            row,
            x: geometry.column_x(column),
            y,
            width: geometry.cell_width,
            height: geometry.cell_height,
        });
        on_page += 1;

        column += 1;
        if column == columns {
            column = 0;
            row += 1;
            y += geometry.cell_height + geometry.row_gap;
        }
    }

    PageLayout {
        page_count: if placements.is_empty() { 0 } else { page },
        placements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock() -> PageGeometry {
        PageGeometry::a4_photo_report()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn stock_geometry_is_valid() {
        stock().validate().unwrap();
    }

    #[test]
    fn stock_geometry_derived_values() {
        let g = stock();
        assert!(approx(g.header_height, 10.583333333333334));
        assert!(approx(g.content_top(), 10.0 + 10.583333333333334 + 1.0 + 4.0));
        assert!(approx(g.footer_y(), 287.0));
        assert!(approx(g.content_bottom(), 277.0));
        assert!(approx(g.column_x(0), 20.0));
        assert!(approx(g.column_x(1), 110.0));
    }

    #[test]
    fn stock_capacity_is_six() {
        assert_eq!(stock().capacity(), 6);
    }

    #[test]
    fn zero_images_zero_pages() {
        let layout = plan_pages(0, &stock());
        assert!(layout.is_empty());
        assert_eq!(layout.page_count, 0);
        assert_eq!(layout.pages().count(), 0);
    }

    #[test]
    fn thirteen_images_make_three_pages() {
        let layout = plan_pages(13, &stock());
        assert_eq!(layout.page_count, 3);
        assert_eq!(layout.images_on_page(1), 6);
        assert_eq!(layout.images_on_page(2), 6);
        assert_eq!(layout.images_on_page(3), 1);
    }

    #[test]
    fn exactly_one_full_page() {
        let layout = plan_pages(6, &stock());
        assert_eq!(layout.page_count, 1);
    }

    #[test]
    fn seventh_image_starts_page_two_top_left() {
        let g = stock();
        let layout = plan_pages(7, &g);
        let p = &layout.placements[6];
        assert_eq!((p.page, p.column, p.row), (2, 0, 0));
        assert!(approx(p.x, g.column_x(0)));
        assert!(approx(p.y, g.content_top()));
    }

    #[test]
    fn fills_left_then_right() {
        let g = stock();
        let layout = plan_pages(3, &g);
        let cells: Vec<(usize, usize)> =
            layout.placements.iter().map(|p| (p.column, p.row)).collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1)]);
        assert!(approx(layout.placements[0].y, layout.placements[1].y));
        assert!(approx(
            layout.placements[2].y,
            g.content_top() + g.cell_height + g.row_gap
        ));
    }

    #[test]
    fn placements_keep_collection_order() {
        let layout = plan_pages(20, &stock());
        let indices: Vec<usize> = layout.placements.iter().map(|p| p.index).collect();
        assert_eq!(indices, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn pages_groups_by_page_number() {
        let layout = plan_pages(13, &stock());
        let groups: Vec<(u32, usize)> = layout.pages().map(|(n, p)| (n, p.len())).collect();
        assert_eq!(groups, vec![(1, 6), (2, 6), (3, 1)]);
    }

    #[test]
    fn shorter_cells_fit_more_per_page() {
        let g = PageGeometry {
            cell_height: 50.0,
            ..stock()
        };
        // rows at 25.58, 80.58, 135.58, 190.58; next would end at 300.58
        assert_eq!(g.capacity(), 8);
        let layout = plan_pages(17, &g);
        assert_eq!(layout.page_count, 3);
        assert_eq!(layout.images_on_page(3), 1);
    }

    #[test]
    fn single_column_geometry() {
        let g = PageGeometry {
            columns: 1,
            ..stock()
        };
        assert_eq!(g.capacity(), 3);
        assert!(approx(g.column_x(0), 65.0));
    }

    #[test]
    fn oversized_cell_still_terminates() {
        let g = PageGeometry {
            cell_height: 400.0,
            ..stock()
        };
        assert!(matches!(g.validate(), Err(LayoutError::CellTooTall { .. })));
        // Every cell overflows, so each page takes exactly one image.
        let layout = plan_pages(3, &g);
        assert_eq!(layout.page_count, 3);
        assert_eq!(layout.images_on_page(1), 1);
        assert_eq!(layout.images_on_page(3), 1);
    }

    #[test]
    fn too_wide_grid_is_rejected() {
        let g = PageGeometry {
            cell_width: 100.0,
            ..stock()
        };
        assert!(matches!(g.validate(), Err(LayoutError::GridTooWide { .. })));
    }
}
