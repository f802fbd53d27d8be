//! Loading and decoding of logos and source images.
//!
//! The export pipeline awaits one asset at a time through the [`AssetLoader`]
//! trait. [`FsAssetLoader`] is the production implementation: it reads bytes
//! with `tokio::fs` and decodes them with the `image` crate on the blocking
//! pool. Tests substitute in-memory loaders.
//!
//! Decoded images are kept in the form the PDF sink wants to embed:
//! 8-bit RGB and grayscale JPEGs stay as their original bytes (embedded as
//! DCT, no re-encoding); everything else, CMYK JPEGs included, becomes raw
//! 8-bit RGB plus an optional alpha channel.

use crate::types::ImageSource;
use image::{ColorType, DynamicImage, ImageFormat};
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to decode {0}: {1}")]
    Decode(String, String),
    #[error("Timed out after {timeout_ms}ms loading {asset}")]
    Timeout { asset: String, timeout_ms: u64 },
    #[error("Decoder task failed: {0}")]
    Task(String),
}

/// Pixel payload ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelData {
    /// Original JPEG stream.
    Jpeg { data: Vec<u8>, grayscale: bool },
    /// Interleaved RGB, one byte per channel, plus an optional alpha plane.
    Raw { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

/// A decoded image with its pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: PixelData,
}

impl LoadedImage {
    /// Width over height. Degenerate images report 1.0.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }
}

/// The two header logos. Either may be absent.
#[derive(Debug, Clone, Default)]
pub struct LogoAssets {
    pub left: Option<LoadedImage>,
    pub right: Option<LoadedImage>,
}

/// Source of decoded images for the export pipeline.
#[allow(async_fn_in_trait)]
pub trait AssetLoader {
    /// Load a logo. A logo that does not exist is `Ok(None)`, not an error.
    async fn load_logo(&self, path: &Path) -> Result<Option<LoadedImage>, AssetError>;

    /// Load and decode one source image.
    async fn load_image(&self, source: &ImageSource) -> Result<LoadedImage, AssetError>;
}

/// Sample precision and component count from a JPEG frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegFrame {
    precision: u8,
    components: u8,
}

/// Read the first SOF segment of a JPEG stream. `None` if none is found
/// before the data runs out.
fn jpeg_frame(bytes: &[u8]) -> Option<JpegFrame> {
    if !bytes.starts_with(&[0xff, 0xd8]) {
        return None;
    }
    let mut pos = 2;
    loop {
        if *bytes.get(pos)? != 0xff {
            return None;
        }
        // Fill bytes before the marker code.
        while *bytes.get(pos + 1)? == 0xff {
            pos += 1;
        }
        let marker = *bytes.get(pos + 1)?;
        match marker {
            0x01 | 0xd0..=0xd7 => {
                pos += 2;
                continue;
            }
            0xd9 | 0xda => return None,
            0xc0..=0xcf if !matches!(marker, 0xc4 | 0xc8 | 0xcc) => {
                return Some(JpegFrame {
                    precision: *bytes.get(pos + 4)?,
                    components: *bytes.get(pos + 9)?,
                });
            }
            _ => {}
        }
        let len = u16::from_be_bytes([*bytes.get(pos + 2)?, *bytes.get(pos + 3)?]);
        pos += 2 + usize::from(len);
    }
}

/// Decode `bytes` into a [`LoadedImage`]. `label` names the asset in errors.
pub fn decode_image(bytes: Vec<u8>, label: &str) -> Result<LoadedImage, AssetError> {
    let format =
        image::guess_format(&bytes).map_err(|e| AssetError::Decode(label.to_string(), e.to_string()))?;
    let decoded = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| AssetError::Decode(label.to_string(), e.to_string()))?;
    let (width, height) = (decoded.width(), decoded.height());

    let frame = (format == ImageFormat::Jpeg)
        .then(|| jpeg_frame(&bytes))
        .flatten();
    // PDF DCT streams are 8-bit; CMYK/YCCK need a different colour space.
    let pixels = match (frame, decoded.color()) {
        (Some(f), ColorType::Rgb8) if f.precision == 8 && f.components == 3 => PixelData::Jpeg {
            data: bytes,
            grayscale: false,
        },
        (Some(f), ColorType::L8) if f.precision == 8 && f.components == 1 => PixelData::Jpeg {
            data: bytes,
            grayscale: true,
        },
        _ => raw_pixels(&decoded),
    };

    Ok(LoadedImage {
        width,
        height,
        pixels,
    })
}

fn raw_pixels(decoded: &DynamicImage) -> PixelData {
    let rgba = decoded.to_rgba8();
    let has_alpha = decoded.color().has_alpha() && rgba.pixels().any(|p| p.0[3] < 255);
    let rgb: Vec<u8> = rgba.pixels().flat_map(|p| [p.0[0], p.0[1], p.0[2]]).collect();
    let alpha = has_alpha.then(|| rgba.pixels().map(|p| p.0[3]).collect());
    PixelData::Raw { rgb, alpha }
}

/// Reads assets from disk (or memory) and decodes them off the async thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAssetLoader;

impl FsAssetLoader {
    pub fn new() -> Self {
        Self
    }
}

async fn decode_blocking(bytes: Vec<u8>, label: String) -> Result<LoadedImage, AssetError> {
    tokio::task::spawn_blocking(move || decode_image(bytes, &label))
        .await
        .map_err(|e| AssetError::Task(e.to_string()))?
}

impl AssetLoader for FsAssetLoader {
    async fn load_logo(&self, path: &Path) -> Result<Option<LoadedImage>, AssetError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AssetError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        decode_blocking(bytes, path.display().to_string())
            .await
            .map(Some)
    }

    async fn load_image(&self, source: &ImageSource) -> Result<LoadedImage, AssetError> {
        let bytes = match source {
            ImageSource::Path(path) => {
                tokio::fs::read(path).await.map_err(|e| AssetError::Io {
                    path: path.display().to_string(),
                    source: e,
                })?
            }
            ImageSource::Bytes(bytes) => bytes.to_vec(),
        };
        decode_blocking(bytes, source.describe()).await
    }
}
