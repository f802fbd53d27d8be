//! Shared test utilities for the photo-report test suite.
//!
//! Builders for candidates and pre-filled collections, plus tiny encoded
//! images for the decoding and PDF tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut engine = engine_of(&["b.jpg", "a.jpg"]);
//! engine.apply_criterion(OrderingCriterion::Name);
//! assert_eq!(engine.collection().names(), vec!["a.jpg", "b.jpg"]);
//!
//! let img = decode_image(jpeg_bytes(8, 6), "x.jpg").unwrap();
//! ```

use crate::collection::ImageCollection;
use crate::ordering::OrderingEngine;
use crate::types::{ImageCandidate, ImageIdentity, ImageSource};
use chrono::{TimeZone, Utc};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;

// =========================================================================
// Candidates and collections
// =========================================================================

/// A candidate named `name`, `size` bytes, modified `ts` seconds after the epoch.
///
/// The source is a path equal to the name, so loaders can identify it.
pub fn candidate(name: &str, size: u64, ts: i64) -> ImageCandidate {
    ImageCandidate::new(
        ImageIdentity::new(name, size, Utc.timestamp_opt(ts, 0).unwrap()),
        ImageSource::Path(PathBuf::from(name)),
    )
}

/// A collection holding `names` in order; sizes 100, timestamps 0, 1, 2...
pub fn collection_of(names: &[&str]) -> ImageCollection {
    let mut collection = ImageCollection::new();
    for (i, name) in names.iter().enumerate() {
        assert!(
            collection.add(candidate(name, 100, i as i64)),
            "duplicate fixture name {name}"
        );
    }
    collection
}

/// An engine whose collection holds `names`, criterion `Manual`.
pub fn engine_of(names: &[&str]) -> OrderingEngine {
    let mut engine = OrderingEngine::new();
    engine.add_all(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| candidate(name, 100, i as i64)),
    );
    engine
}

// =========================================================================
// Encoded images
// =========================================================================

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 31 % 256) as u8, (y * 47 % 256) as u8, 128])
    })
}

/// A baseline RGB JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Jpeg)
}

/// A single-component grayscale JPEG.
pub fn gray_jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(gradient(width, height)).to_luma8();
    encode(DynamicImage::ImageLuma8(img), ImageFormat::Jpeg)
}

/// A four-component (Adobe CMYK) JPEG.
pub fn cmyk_jpeg_bytes(width: u16, height: u16) -> Vec<u8> {
    let cmyk: Vec<u8> = (0..usize::from(width) * usize::from(height))
        .flat_map(|i| [(i * 17 % 256) as u8, 40, 200, 10])
        .collect();
    let mut buf = Vec::new();
    jpeg_encoder::Encoder::new(&mut buf, 90)
        .encode(&cmyk, width, height, jpeg_encoder::ColorType::Cmyk)
        .unwrap();
    buf
}

/// An opaque RGB PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Png)
}

/// An RGBA PNG where every pixel has the given alpha.
pub fn rgba_png_bytes(width: u32, height: u32, alpha: u8) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, alpha]));
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}
