//! Turns a [`PageLayout`] into per-page draw instructions.
//!
//! The renderer knows nothing about ordering: it receives final placements and
//! decorates every page with the same header (left logo, centred title, right
//! logo, horizontal rule) and a "page p of total" footer. All positions are
//! millimetres from the top-left corner, like the layout itself.

use crate::layout::{PT_PER_MM, PageGeometry, PageLayout};
use serde::Serialize;

/// Title used when the configured one is blank.
pub const DEFAULT_TITLE: &str = "REPORTE FOTOGRÁFICO";

/// Footer template; `{page}` and `{total}` are substituted.
pub const DEFAULT_PAGE_LABEL: &str = "Página {page} de {total}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoSide {
    Left,
    Right,
}

/// Where a header logo goes. Width follows the logo's own aspect ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogoSlot {
    pub side: LogoSide,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A single line of horizontally centred text. `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    pub text: String,
    pub center_x: f64,
    pub y: f64,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderInstruction {
    pub left_logo: Option<LogoSlot>,
    pub title: TextLine,
    pub right_logo: Option<LogoSlot>,
    pub rule: Rule,
}

/// One image in its cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInstruction {
    /// Position of the image in the collection.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything drawn on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInstructions {
    pub number: u32,
    pub total: u32,
    pub header: HeaderInstruction,
    pub footer: TextLine,
    pub images: Vec<ImageInstruction>,
}

/// Aspect ratios (width / height) of the logos that loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogoShapes {
    pub left: Option<f64>,
    pub right: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct DocumentRenderer<'a> {
    geometry: &'a PageGeometry,
    title: String,
    page_label: String,
    logos: LogoShapes,
}

/// `title`, or [`DEFAULT_TITLE`] if it is blank.
pub fn resolve_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Fill the `{page}` / `{total}` placeholders of a page label template.
pub fn format_page_label(template: &str, page: u32, total: u32) -> String {
    template
        .replace("{page}", &page.to_string())
        .replace("{total}", &total.to_string())
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(geometry: &'a PageGeometry, title: &str) -> Self {
        Self {
            geometry,
            title: resolve_title(title),
            page_label: DEFAULT_PAGE_LABEL.to_string(),
            logos: LogoShapes::default(),
        }
    }

    pub fn with_page_label(mut self, template: &str) -> Self {
        self.page_label = template.to_string();
        self
    }

    pub fn with_logos(mut self, logos: LogoShapes) -> Self {
        self.logos = logos;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn logo_slot(&self, side: LogoSide, aspect: f64) -> LogoSlot {
        let g = self.geometry;
        let height = g.header_height;
        let width = height * aspect;
        let x = match side {
            LogoSide::Left => g.margin,
            LogoSide::Right => g.page_width - g.margin - width,
        };
        LogoSlot {
            side,
            x,
            y: g.header_top,
            width,
            height,
        }
    }

    pub fn header(&self) -> HeaderInstruction {
        let g = self.geometry;
        let band_center = g.header_top + g.header_height / 2.0;
        // Drop the baseline by ~0.35em so the caps sit centred in the band.
        let baseline = band_center + g.title_font_size * 0.35 / PT_PER_MM;
        HeaderInstruction {
            left_logo: self.logos.left.map(|a| self.logo_slot(LogoSide::Left, a)),
            title: TextLine {
                text: self.title.clone(),
                center_x: g.page_width / 2.0,
                y: baseline,
                font_size: g.title_font_size,
            },
            right_logo: self.logos.right.map(|a| self.logo_slot(LogoSide::Right, a)),
            rule: Rule {
                x1: g.margin,
                x2: g.page_width - g.margin,
                y: g.rule_y(),
            },
        }
    }

    pub fn footer(&self, page: u32, total: u32) -> TextLine {
        let g = self.geometry;
        TextLine {
            text: format_page_label(&self.page_label, page, total),
            center_x: g.page_width / 2.0,
            y: g.footer_y(),
            font_size: g.footer_font_size,
        }
    }

    /// Instructions for every page of `layout`, in page order.
    pub fn render(&self, layout: &PageLayout) -> Vec<PageInstructions> {
        let total = layout.page_count;
        let header = self.header();
        layout
            .pages()
            .map(|(number, placements)| PageInstructions {
                number,
                total,
                header: header.clone(),
                footer: self.footer(number, total),
                images: placements
                    .iter()
                    .map(|p| ImageInstruction {
                        index: p.index,
                        x: p.x,
                        y: p.y,
                        width: p.width,
                        height: p.height,
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::plan_pages;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn blank_title_falls_back() {
        assert_eq!(resolve_title("   "), DEFAULT_TITLE);
        assert_eq!(resolve_title(" Obra 12 "), "Obra 12");
    }

    #[test]
    fn page_label_substitution() {
        assert_eq!(format_page_label("Page {page} of {total}", 2, 3), "Page 2 of 3");
        assert_eq!(format_page_label(DEFAULT_PAGE_LABEL, 1, 1), "Página 1 de 1");
    }

    #[test]
    fn one_header_and_footer_per_page() {
        let g = PageGeometry::a4_photo_report();
        let pages = DocumentRenderer::new(&g, "T").render(&plan_pages(13, &g));
        assert_eq!(pages.len(), 3);
        let footers: Vec<&str> = pages.iter().map(|p| p.footer.text.as_str()).collect();
        assert_eq!(footers, vec!["Página 1 de 3", "Página 2 de 3", "Página 3 de 3"]);
        assert!(pages.iter().all(|p| p.header.title.text == "T"));
        let counts: Vec<usize> = pages.iter().map(|p| p.images.len()).collect();
        assert_eq!(counts, vec![6, 6, 1]);
    }

    #[test]
    fn images_follow_layout_order() {
        let g = PageGeometry::a4_photo_report();
        let pages = DocumentRenderer::new(&g, "").render(&plan_pages(8, &g));
        let indices: Vec<usize> = pages
            .iter()
            .flat_map(|p| p.images.iter().map(|i| i.index))
            .collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn missing_logos_are_omitted() {
        let g = PageGeometry::a4_photo_report();
        let header = DocumentRenderer::new(&g, "").header();
        assert!(header.left_logo.is_none());
        assert!(header.right_logo.is_none());
        assert_eq!(header.title.text, DEFAULT_TITLE);
    }

    #[test]
    fn logos_sized_from_aspect_ratio() {
        let g = PageGeometry::a4_photo_report();
        let header = DocumentRenderer::new(&g, "")
            .with_logos(LogoShapes {
                left: Some(2.0),
                right: Some(1.0),
            })
            .header();
        let left = header.left_logo.unwrap();
        assert!(approx(left.x, 15.0));
        assert!(approx(left.height, g.header_height));
        assert!(approx(left.width, g.header_height * 2.0));
        let right = header.right_logo.unwrap();
        assert!(approx(right.x + right.width, 195.0));
        assert!(approx(right.y, 10.0));
    }

    #[test]
    fn header_rule_and_title_positions() {
        let g = PageGeometry::a4_photo_report();
        let header = DocumentRenderer::new(&g, "X").header();
        assert!(approx(header.rule.y, g.rule_y()));
        assert!(approx(header.rule.x1, 15.0));
        assert!(approx(header.rule.x2, 195.0));
        assert!(approx(header.title.center_x, 105.0));
        assert!(header.title.y > g.header_top && header.title.y < g.rule_y());
    }

    #[test]
    fn footer_sits_on_footer_baseline() {
        let g = PageGeometry::a4_photo_report();
        let footer = DocumentRenderer::new(&g, "")
            .with_page_label("{page}/{total}")
            .footer(4, 9);
        assert_eq!(footer.text, "4/9");
        assert!(approx(footer.y, 287.0));
        assert_eq!(footer.font_size, 8.0);
    }

    #[test]
    fn empty_layout_renders_no_pages() {
        let g = PageGeometry::a4_photo_report();
        assert!(DocumentRenderer::new(&g, "").render(&plan_pages(0, &g)).is_empty());
    }
}
