//! The export pipeline: from the current collection to one document artifact.
//!
//! Export runs in two phases with different failure classes:
//!
//! ```text
//! prepare()  ── synchronous validation, snapshot of the collection
//!    │          EmptyCollection / MissingFilename / Layout  → Validation
//!    ▼
//! run()      ── async, strictly sequential:
//!    │          left logo → right logo → plan → page 1 [header, footer, img…] → page 2 …
//!    │          AssetLoad / Sink                             → Runtime
//!    ▼
//! write_artifact() ── temp file + rename                     → Runtime (Io)
//! ```
//!
//! Nothing in this module mutates the collection. The job works on a snapshot
//! taken in [`prepare`]; what happens to the collection afterwards is decided
//! by a [`PostExportPolicy`] applied by the session.
//!
//! Every asset load is bounded by `asset_timeout`, so a stuck read or decode
//! surfaces as an `AssetLoad` error instead of hanging the export.

use crate::collection::ImageCollection;
use crate::config::ReportConfig;
use crate::layout::{LayoutError, PageGeometry, plan_pages};
use crate::naming::{ArtifactName, artifact_name};
use crate::render::instructions::{LogoSide, resolve_title};
use crate::render::{
    AssetError, AssetLoader, DEFAULT_PAGE_LABEL, DocumentRenderer, DocumentSink, LoadedImage,
    LogoAssets, LogoShapes, SinkError,
};
use crate::types::ImageSource;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default bound on a single asset load.
pub const DEFAULT_ASSET_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: the collection is empty")]
    EmptyCollection,
    #[error("An output filename is required")]
    MissingFilename,
    #[error("An export is already in progress")]
    InProgress,
    #[error("Invalid page geometry: {0}")]
    Layout(#[from] LayoutError),
    #[error("Failed to load {asset}: {source}")]
    AssetLoad {
        asset: String,
        #[source]
        source: AssetError,
    },
    #[error("Document error: {0}")]
    Sink(#[from] SinkError),
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whether an export failed before or after the pipeline started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorKind {
    /// Rejected synchronously; no asset was loaded.
    Validation,
    /// The pipeline started and was aborted.
    Runtime,
}

impl ExportError {
    pub fn kind(&self) -> ExportErrorKind {
        match self {
            ExportError::EmptyCollection
            | ExportError::MissingFilename
            | ExportError::InProgress
            | ExportError::Layout(_) => ExportErrorKind::Validation,
            ExportError::AssetLoad { .. } | ExportError::Sink(_) | ExportError::Io { .. } => {
                ExportErrorKind::Runtime
            }
        }
    }
}

/// What happens to the collection after a successful export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostExportPolicy {
    /// Release every image, leaving an empty collection.
    #[default]
    ClearCollection,
    /// Leave the collection as it was.
    Keep,
}

impl PostExportPolicy {
    pub fn from_clear_flag(clear: bool) -> Self {
        if clear {
            PostExportPolicy::ClearCollection
        } else {
            PostExportPolicy::Keep
        }
    }
}

/// Everything the pipeline needs besides the images themselves.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// User-supplied base filename. Must not be blank.
    pub base_name: String,
    /// Header title; blank means the default title.
    pub title: String,
    /// Footer template with `{page}` and `{total}` placeholders.
    pub page_label: String,
    pub left_logo: Option<PathBuf>,
    pub right_logo: Option<PathBuf>,
    pub asset_timeout: Duration,
    pub geometry: PageGeometry,
}

impl ExportRequest {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            title: String::new(),
            page_label: DEFAULT_PAGE_LABEL.to_string(),
            left_logo: None,
            right_logo: None,
            asset_timeout: DEFAULT_ASSET_TIMEOUT,
            geometry: PageGeometry::a4_photo_report(),
        }
    }

    /// A request for `base_name` with title, footer, logos and timeout taken
    /// from `config`. Relative logo paths resolve against `config_dir`.
    pub fn from_config(
        config: &ReportConfig,
        config_dir: &Path,
        base_name: impl Into<String>,
    ) -> Self {
        let (left, right) = config.logo_paths(config_dir);
        Self::new(base_name)
            .with_title(config.report.title.clone())
            .with_page_label(config.report.page_label.clone())
            .with_logos(left, right)
            .with_asset_timeout(config.asset_timeout())
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_page_label(mut self, template: impl Into<String>) -> Self {
        self.page_label = template.into();
        self
    }

    pub fn with_logos(mut self, left: Option<PathBuf>, right: Option<PathBuf>) -> Self {
        self.left_logo = left;
        self.right_logo = right;
        self
    }

    pub fn with_asset_timeout(mut self, timeout: Duration) -> Self {
        self.asset_timeout = timeout;
        self
    }
}

/// One image as captured when the export was prepared.
#[derive(Debug, Clone)]
pub struct ExportItem {
    pub name: String,
    pub source: ImageSource,
}

/// Progress notifications sent while a job runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Started { images: usize, pages: u32 },
    LogoOmitted { side: LogoSide, path: PathBuf },
    PageStarted { page: u32, total: u32 },
    ImagePlaced { index: usize, name: String, page: u32 },
    Finished { file_name: String, pages: u32, bytes: usize },
}

/// A finished document, not yet on disk.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub pages: u32,
    pub images: usize,
}

/// A validated export, ready to run.
#[derive(Debug, Clone)]
pub struct ExportJob {
    request: ExportRequest,
    artifact: ArtifactName,
    title: String,
    items: Vec<ExportItem>,
}

/// Validate `request` against `collection` and snapshot the images.
///
/// Fails fast, before any asset is touched.
pub fn prepare(
    collection: &ImageCollection,
    request: ExportRequest,
) -> Result<ExportJob, ExportError> {
    if collection.is_empty() {
        return Err(ExportError::EmptyCollection);
    }
    if request.base_name.trim().is_empty() {
        return Err(ExportError::MissingFilename);
    }
    request.geometry.validate()?;

    let items = collection
        .iter()
        .map(|record| ExportItem {
            name: record.name().to_string(),
            source: record.source.clone(),
        })
        .collect();
    let artifact = artifact_name(&request.base_name);
    if artifact.defaulted {
        warn!(
            requested = %request.base_name,
            file = %artifact.file_name,
            "output name has no usable characters, using the default"
        );
    }
    Ok(ExportJob {
        artifact,
        title: resolve_title(&request.title),
        items,
        request,
    })
}

fn emit(events: &Option<Sender<ExportEvent>>, event: ExportEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is watching.
        let _ = tx.send(event);
    }
}

/// Await `load`, bounded by `timeout`, attributing failures to `asset`.
async fn bounded<T, F>(timeout: Duration, asset: &str, load: F) -> Result<T, ExportError>
where
    F: Future<Output = Result<T, AssetError>>,
{
    match tokio::time::timeout(timeout, load).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(ExportError::AssetLoad {
            asset: asset.to_string(),
            source,
        }),
        Err(_) => Err(ExportError::AssetLoad {
            asset: asset.to_string(),
            source: AssetError::Timeout {
                asset: asset.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            },
        }),
    }
}

impl ExportJob {
    pub fn artifact(&self) -> &ArtifactName {
        &self.artifact
    }

    /// The header title after the blank-title fallback.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[ExportItem] {
        &self.items
    }

    pub fn request(&self) -> &ExportRequest {
        &self.request
    }

    async fn load_logo<L: AssetLoader>(
        &self,
        loader: &L,
        side: LogoSide,
        path: Option<&Path>,
        events: &Option<Sender<ExportEvent>>,
    ) -> Result<Option<LoadedImage>, ExportError> {
        let Some(path) = path else {
            return Ok(None);
        };
        let label = path.display().to_string();
        let logo = bounded(self.request.asset_timeout, &label, loader.load_logo(path)).await?;
        if logo.is_none() {
            warn!(?side, path = %label, "logo not found, slot omitted");
            emit(
                events,
                ExportEvent::LogoOmitted {
                    side,
                    path: path.to_path_buf(),
                },
            );
        }
        Ok(logo)
    }

    /// Run the pipeline, drawing into `sink`.
    ///
    /// Loads are awaited one at a time, in page order. The first failure
    /// aborts the run; the sink is then abandoned without being finished.
    pub async fn run<L, S>(
        &self,
        loader: &L,
        sink: &mut S,
        events: Option<Sender<ExportEvent>>,
    ) -> Result<ExportedDocument, ExportError>
    where
        L: AssetLoader,
        S: DocumentSink,
    {
        let request = &self.request;
        info!(
            images = self.items.len(),
            file = %self.artifact.file_name,
            "export started"
        );

        let logos = LogoAssets {
            left: self
                .load_logo(loader, LogoSide::Left, request.left_logo.as_deref(), &events)
                .await?,
            right: self
                .load_logo(loader, LogoSide::Right, request.right_logo.as_deref(), &events)
                .await?,
        };

        let layout = plan_pages(self.items.len(), &request.geometry);
        let shapes = LogoShapes {
            left: logos.left.as_ref().map(LoadedImage::aspect_ratio),
            right: logos.right.as_ref().map(LoadedImage::aspect_ratio),
        };
        let pages = DocumentRenderer::new(&request.geometry, &self.title)
            .with_page_label(&request.page_label)
            .with_logos(shapes)
            .render(&layout);
        emit(
            &events,
            ExportEvent::Started {
                images: self.items.len(),
                pages: layout.page_count,
            },
        );

        for page in &pages {
            emit(
                &events,
                ExportEvent::PageStarted {
                    page: page.number,
                    total: page.total,
                },
            );
            sink.begin_page(&request.geometry, page.number)?;
            sink.header(&page.header, &logos)?;
            sink.footer(&page.footer)?;

            for placement in &page.images {
                let item = &self.items[placement.index];
                let image = bounded(
                    request.asset_timeout,
                    &item.name,
                    loader.load_image(&item.source),
                )
                .await?;
                sink.image(placement, &image)?;
                debug!(
                    index = placement.index,
                    name = %item.name,
                    page = page.number,
                    "image placed"
                );
                emit(
                    &events,
                    ExportEvent::ImagePlaced {
                        index: placement.index,
                        name: item.name.clone(),
                        page: page.number,
                    },
                );
            }
        }

        let bytes = sink.finish()?;
        info!(
            pages = layout.page_count,
            bytes = bytes.len(),
            file = %self.artifact.file_name,
            "export finished"
        );
        emit(
            &events,
            ExportEvent::Finished {
                file_name: self.artifact.file_name.clone(),
                pages: layout.page_count,
                bytes: bytes.len(),
            },
        );
        Ok(ExportedDocument {
            file_name: self.artifact.file_name.clone(),
            bytes,
            pages: layout.page_count,
            images: self.items.len(),
        })
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `document` into `out_dir` atomically.
///
/// The bytes go to a hidden temporary sibling first and are renamed into
/// place, so a failed write never leaves a truncated document under the
/// final name.
pub async fn write_artifact(
    document: &ExportedDocument,
    out_dir: &Path,
) -> Result<PathBuf, ExportError> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(io_error(out_dir))?;
    let target = out_dir.join(&document.file_name);
    let temp = out_dir.join(format!(".{}.partial", document.file_name));

    if let Err(e) = tokio::fs::write(&temp, &document.bytes).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(io_error(&temp)(e));
    }
    if let Err(e) = tokio::fs::rename(&temp, &target).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(io_error(&target)(e));
    }
    debug!(path = %target.display(), bytes = document.bytes.len(), "artifact written");
    Ok(target)
}
