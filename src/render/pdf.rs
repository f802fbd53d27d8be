//! PDF document sink built on `pdf-writer`.
//!
//! | Concern | How |
//! |---|---|
//! | Pages | one content stream per page, Flate-compressed with `miniz_oxide` |
//! | Text | base-14 Helvetica, WinAnsi encoding (see [`text`](super::text)) |
//! | JPEG images | original bytes embedded as `DCTDecode` XObjects |
//! | Other images | raw RGB `FlateDecode` XObject, alpha as a soft mask |
//! | Logos | embedded once, referenced from every page |
//!
//! Instruction coordinates are millimetres from the top-left corner; PDF user
//! space is points from the bottom-left, so every y is flipped against the
//! current page height.

use super::assets::{LoadedImage, LogoAssets, PixelData};
use super::instructions::{HeaderInstruction, ImageInstruction, LogoSide, LogoSlot, TextLine};
use super::sink::{DocumentSink, SinkError};
use super::text::{text_width, to_winansi};
use crate::layout::{PT_PER_MM, PageGeometry};
use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};
use std::collections::HashMap;

const FONT_NAME: &[u8] = b"F1";
/// 0.2mm, the usual hairline for a header rule.
const RULE_WIDTH_MM: f64 = 0.2;
const COMPRESSION_LEVEL: u8 = 6;

struct PendingPage {
    width_pt: f32,
    height_pt: f32,
    content: Content,
    xobjects: Vec<(String, Ref)>,
}

pub struct PdfSink {
    pdf: Option<Pdf>,
    next_id: i32,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    title: Option<String>,
    pages: Vec<PendingPage>,
    logos: HashMap<LogoSide, Ref>,
    image_count: usize,
}

impl Default for PdfSink {
    fn default() -> Self {
        Self::new()
    }
}

fn mm(v: f64) -> f32 {
    (v * PT_PER_MM) as f32
}

impl PdfSink {
    pub fn new() -> Self {
        let mut sink = Self {
            pdf: Some(Pdf::new()),
            next_id: 1,
            catalog_id: Ref::new(1),
            pages_id: Ref::new(1),
            font_id: Ref::new(1),
            title: None,
            pages: Vec::new(),
            logos: HashMap::new(),
            image_count: 0,
        };
        sink.catalog_id = sink.alloc();
        sink.pages_id = sink.alloc();
        sink.font_id = sink.alloc();
        sink
    }

    /// Record `title` in the document information dictionary.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    fn alloc(&mut self) -> Ref {
        let id = Ref::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn current_page(&mut self) -> Result<&mut PendingPage, SinkError> {
        if self.pdf.is_none() {
            return Err(SinkError::Finished);
        }
        self.pages.last_mut().ok_or(SinkError::NoPage)
    }

    /// Write `image` as an XObject and return its reference.
    fn embed(&mut self, image: &LoadedImage) -> Result<Ref, SinkError> {
        let id = self.alloc();
        let mask_id = match &image.pixels {
            PixelData::Raw { alpha: Some(_), .. } => Some(self.alloc()),
            _ => None,
        };
        let pdf = self.pdf.as_mut().ok_or(SinkError::Finished)?;
        let (w, h) = (image.width as i32, image.height as i32);

        match &image.pixels {
            PixelData::Jpeg { data, grayscale } => {
                let mut xobj = pdf.image_xobject(id, data);
                xobj.filter(Filter::DctDecode);
                xobj.width(w);
                xobj.height(h);
                if *grayscale {
                    xobj.color_space().device_gray();
                } else {
                    xobj.color_space().device_rgb();
                }
                xobj.bits_per_component(8);
            }
            PixelData::Raw { rgb, alpha } => {
                if let (Some(alpha), Some(mask_id)) = (alpha, mask_id) {
                    let compressed = compress_to_vec_zlib(alpha, COMPRESSION_LEVEL);
                    let mut mask = pdf.image_xobject(mask_id, &compressed);
                    mask.filter(Filter::FlateDecode);
                    mask.width(w);
                    mask.height(h);
                    mask.color_space().device_gray();
                    mask.bits_per_component(8);
                }
                let compressed = compress_to_vec_zlib(rgb, COMPRESSION_LEVEL);
                let mut xobj = pdf.image_xobject(id, &compressed);
                xobj.filter(Filter::FlateDecode);
                xobj.width(w);
                xobj.height(h);
                xobj.color_space().device_rgb();
                xobj.bits_per_component(8);
                if let Some(mask_id) = mask_id {
                    xobj.s_mask(mask_id);
                }
            }
        }
        Ok(id)
    }

    /// Paint XObject `id` into a box given in millimetres from the top-left.
    fn place(&mut self, id: Ref, x: f64, y: f64, width: f64, height: f64) -> Result<(), SinkError> {
        let page = self.current_page()?;
        let name = format!("Im{}", page.xobjects.len() + 1);
        let bottom = page.height_pt - mm(y + height);
        page.content.save_state();
        page.content
            .transform([mm(width), 0.0, 0.0, mm(height), mm(x), bottom]);
        page.content.x_object(Name(name.as_bytes()));
        page.content.restore_state();
        page.xobjects.push((name, id));
        Ok(())
    }

    fn logo(&mut self, slot: &LogoSlot, image: &LoadedImage) -> Result<(), SinkError> {
        let id = match self.logos.get(&slot.side) {
            Some(id) => *id,
            None => {
                let id = self.embed(image)?;
                self.logos.insert(slot.side, id);
                id
            }
        };
        self.place(id, slot.x, slot.y, slot.width, slot.height)
    }

    fn text(&mut self, line: &TextLine) -> Result<(), SinkError> {
        let page = self.current_page()?;
        let encoded = to_winansi(&line.text);
        let width_pt = text_width(&encoded, line.font_size);
        let x = mm(line.center_x) - (width_pt / 2.0) as f32;
        let y = page.height_pt - mm(line.y);
        page.content
            .begin_text()
            .set_font(Name(FONT_NAME), line.font_size as f32)
            .next_line(x, y)
            .show(Str(&encoded))
            .end_text();
        Ok(())
    }
}

impl DocumentSink for PdfSink {
    fn begin_page(&mut self, geometry: &PageGeometry, _number: u32) -> Result<(), SinkError> {
        if self.pdf.is_none() {
            return Err(SinkError::Finished);
        }
        self.pages.push(PendingPage {
            width_pt: mm(geometry.page_width),
            height_pt: mm(geometry.page_height),
            content: Content::new(),
            xobjects: Vec::new(),
        });
        Ok(())
    }

    fn header(&mut self, header: &HeaderInstruction, logos: &LogoAssets) -> Result<(), SinkError> {
        if let (Some(slot), Some(image)) = (&header.left_logo, &logos.left) {
            self.logo(slot, image)?;
        }
        self.text(&header.title)?;
        if let (Some(slot), Some(image)) = (&header.right_logo, &logos.right) {
            self.logo(slot, image)?;
        }

        let page = self.current_page()?;
        let y = page.height_pt - mm(header.rule.y);
        page.content.set_line_width(mm(RULE_WIDTH_MM));
        page.content.move_to(mm(header.rule.x1), y);
        page.content.line_to(mm(header.rule.x2), y);
        page.content.stroke();
        Ok(())
    }

    fn footer(&mut self, footer: &TextLine) -> Result<(), SinkError> {
        self.text(footer)
    }

    fn image(
        &mut self,
        placement: &ImageInstruction,
        image: &LoadedImage,
    ) -> Result<(), SinkError> {
        self.current_page()?;
        let id = self.embed(image)?;
        self.image_count += 1;
        self.place(id, placement.x, placement.y, placement.width, placement.height)
    }

    fn finish(&mut self) -> Result<Vec<u8>, SinkError> {
        if self.pdf.is_none() {
            return Err(SinkError::Finished);
        }
        if self.pages.is_empty() {
            return Err(SinkError::Empty);
        }

        let pages = std::mem::take(&mut self.pages);
        let page_ids: Vec<Ref> = pages.iter().map(|_| self.alloc()).collect();
        let content_ids: Vec<Ref> = pages.iter().map(|_| self.alloc()).collect();
        let info_id = self.alloc();
        let mut pdf = self.pdf.take().ok_or(SinkError::Finished)?;

        pdf.catalog(self.catalog_id).pages(self.pages_id);
        pdf.pages(self.pages_id)
            .kids(page_ids.iter().copied())
            .count(pages.len() as i32);
        pdf.type1_font(self.font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        for ((page, page_id), content_id) in pages.into_iter().zip(&page_ids).zip(&content_ids) {
            let raw = page.content.finish();
            let compressed = compress_to_vec_zlib(&raw, COMPRESSION_LEVEL);
            pdf.stream(*content_id, &compressed)
                .filter(Filter::FlateDecode);

            let mut writer = pdf.page(*page_id);
            writer
                .media_box(Rect::new(0.0, 0.0, page.width_pt, page.height_pt))
                .parent(self.pages_id)
                .contents(*content_id);
            let mut resources = writer.resources();
            resources.fonts().pair(Name(FONT_NAME), self.font_id);
            if !page.xobjects.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, id) in &page.xobjects {
                    xobjects.pair(Name(name.as_bytes()), *id);
                }
            }
        }

        {
            let mut info = pdf.document_info(info_id);
            info.producer(TextStr(concat!("photo-report ", env!("CARGO_PKG_VERSION"))));
            if let Some(title) = &self.title {
                info.title(TextStr(title));
            }
        }

        tracing::debug!(
            pages = page_ids.len(),
            images = self.image_count,
            "pdf document assembled"
        );
        Ok(pdf.finish())
    }
}
