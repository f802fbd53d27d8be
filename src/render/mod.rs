//! Document rendering: from page layout to PDF bytes.
//!
//! | Stage | Module |
//! |---|---|
//! | **Decode** logos and photos | [`assets`] (`image` crate, `tokio::fs`) |
//! | **Describe** each page | [`instructions`] (pure, unit testable) |
//! | **Draw** | [`sink`] trait + [`pdf`] (`pdf-writer`) |
//! | **Text** encoding and metrics | [`text`] |
//!
//! ```text
//! PageLayout ──► DocumentRenderer ──► PageInstructions ──► DocumentSink ──► bytes
//!                                            ▲
//!                          AssetLoader ──────┘ (logos + photos)
//! ```

pub mod assets;
pub mod instructions;
pub mod pdf;
pub mod sink;
pub mod text;

pub use assets::{AssetError, AssetLoader, FsAssetLoader, LoadedImage, LogoAssets, PixelData};
pub use instructions::{
    DEFAULT_PAGE_LABEL, DEFAULT_TITLE, DocumentRenderer, HeaderInstruction, ImageInstruction,
    LogoShapes, PageInstructions, TextLine,
};
pub use pdf::PdfSink;
pub use sink::{DocumentSink, SinkError};
