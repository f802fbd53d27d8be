//! The output side of the renderer.
//!
//! A [`DocumentSink`] receives pages in order: `begin_page`, one `header`, one
//! `footer`, then one `image` per placement. Nothing is observable until
//! `finish` returns the finished document bytes, so an export that fails
//! halfway leaves no partial artifact behind.
//!
//! The production implementation is [`PdfSink`](super::pdf::PdfSink).

use super::assets::{LoadedImage, LogoAssets};
use super::instructions::{HeaderInstruction, ImageInstruction, TextLine};
use crate::layout::PageGeometry;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Document already finished")]
    Finished,
    #[error("Drawing before the first page was started")]
    NoPage,
    #[error("Document has no pages")]
    Empty,
}

pub trait DocumentSink {
    /// Start a new page with the given geometry.
    fn begin_page(&mut self, geometry: &PageGeometry, number: u32) -> Result<(), SinkError>;

    /// Draw the header. Logos referenced by the instruction are taken from `logos`.
    fn header(&mut self, header: &HeaderInstruction, logos: &LogoAssets) -> Result<(), SinkError>;

    fn footer(&mut self, footer: &TextLine) -> Result<(), SinkError>;

    fn image(
        &mut self,
        placement: &ImageInstruction,
        image: &LoadedImage,
    ) -> Result<(), SinkError>;

    /// Serialize the document.
    fn finish(&mut self) -> Result<Vec<u8>, SinkError>;
}
