//! The owned state a front end drives: ordering engine plus export lock.
//!
//! A [`ReportSession`] is what a UI (here, the CLI) holds between events. It
//! forwards collection and ordering events to the [`OrderingEngine`] and owns
//! the "export in progress" flag: while an export job is out, every mutation
//! is refused with [`SessionError::ExportInProgress`] instead of relying on the
//! caller to disable its controls.
//!
//! ```text
//!   add / remove / sort / click / drag
//!                │
//!                ▼
//!        ┌───────────────┐  begin_export   ┌───────────┐
//!        │ ReportSession │ ──────────────► │ ExportJob │ ── run() ──► document
//!        │  (unlocked)   │ ◄────────────── │ (locked)  │
//!        └───────────────┘  finish_export  └───────────┘
//!                         + PostExportPolicy
//! ```
//!
//! Edits can also be replayed from a small text vocabulary ([`EditOp`]), which
//! is how the CLI expresses the clicks and drags a graphical front end would
//! send.

use crate::collection::{CollectionError, ImageCollection, RemovedImage};
use crate::config::ReportConfig;
use crate::export::{
    self, ExportError, ExportEvent, ExportJob, ExportRequest, ExportedDocument, PostExportPolicy,
};
use crate::ordering::{OrderingEngine, SelectionOutcome};
use crate::render::{AssetLoader, DocumentSink};
use crate::types::{ImageCandidate, OrderingCriterion, SelectionResolution};
use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("The collection is locked while an export is in progress")]
    ExportInProgress,
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

/// One UI event, as written on the command line.
///
/// | Text | Event |
/// |---|---|
/// | `drag:3:0` | drag image 3 onto position 0 |
/// | `click:2` | click image 2 (select, deselect, or resolve) |
/// | `remove:1` | remove image 1 |
/// | `sort:name` | choose an ordering criterion |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Drag { from: usize, to: usize },
    Click(usize),
    Remove(usize),
    Sort(OrderingCriterion),
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOp::Drag { from, to } => write!(f, "drag:{from}:{to}"),
            EditOp::Click(i) => write!(f, "click:{i}"),
            EditOp::Remove(i) => write!(f, "remove:{i}"),
            EditOp::Sort(c) => write!(f, "sort:{c}"),
        }
    }
}

fn parse_index(s: &str, op: &str) -> Result<usize, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a valid index for {op}"))
}

impl FromStr for EditOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();
        match (verb.as_str(), args.as_slice()) {
            ("drag", [from, to]) => Ok(EditOp::Drag {
                from: parse_index(from, "drag")?,
                to: parse_index(to, "drag")?,
            }),
            ("click", [i]) => Ok(EditOp::Click(parse_index(i, "click")?)),
            ("remove", [i]) => Ok(EditOp::Remove(parse_index(i, "remove")?)),
            ("sort", [c]) => Ok(EditOp::Sort(c.parse()?)),
            _ => Err(format!(
                "invalid edit '{s}' (expected drag:FROM:TO, click:I, remove:I, or sort:CRITERION)"
            )),
        }
    }
}

#[derive(Debug, Default)]
pub struct ReportSession {
    engine: OrderingEngine,
    export_in_progress: bool,
    post_export: PostExportPolicy,
}

impl ReportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(resolution: SelectionResolution, post_export: PostExportPolicy) -> Self {
        Self {
            engine: OrderingEngine::with_resolution(resolution),
            export_in_progress: false,
            post_export,
        }
    }

    /// A session using the click behaviour and post-export policy from `config`.
    pub fn from_config(config: &ReportConfig) -> Self {
        Self::with_settings(
            config.ordering.selection,
            PostExportPolicy::from_clear_flag(config.export.clear_on_success),
        )
    }

    pub fn engine(&self) -> &OrderingEngine {
        &self.engine
    }

    pub fn collection(&self) -> &ImageCollection {
        self.engine.collection()
    }

    pub fn is_export_in_progress(&self) -> bool {
        self.export_in_progress
    }

    pub fn post_export_policy(&self) -> PostExportPolicy {
        self.post_export
    }

    pub fn set_post_export_policy(&mut self, policy: PostExportPolicy) {
        self.post_export = policy;
    }

    fn unlocked(&mut self) -> Result<&mut OrderingEngine, SessionError> {
        if self.export_in_progress {
            Err(SessionError::ExportInProgress)
        } else {
            Ok(&mut self.engine)
        }
    }

    /// Add candidates from one file-picker event. Returns how many were new.
    pub fn add<I>(&mut self, candidates: I) -> Result<usize, SessionError>
    where
        I: IntoIterator<Item = ImageCandidate>,
    {
        Ok(self.unlocked()?.add_all(candidates))
    }

    pub fn remove(&mut self, index: usize) -> Result<RemovedImage, SessionError> {
        Ok(self.unlocked()?.remove(index)?)
    }

    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.unlocked()?.clear();
        Ok(())
    }

    pub fn apply_criterion(&mut self, criterion: OrderingCriterion) -> Result<(), SessionError> {
        self.unlocked()?.apply_criterion(criterion);
        Ok(())
    }

    pub fn click(&mut self, index: usize) -> Result<SelectionOutcome, SessionError> {
        Ok(self.unlocked()?.begin_or_resolve_selection(index)?)
    }

    pub fn drag(&mut self, source: usize, target: usize) -> Result<(), SessionError> {
        Ok(self.unlocked()?.reorder_by_drag(source, target)?)
    }

    /// Replay one edit event.
    pub fn apply(&mut self, op: EditOp) -> Result<(), SessionError> {
        match op {
            EditOp::Drag { from, to } => self.drag(from, to)?,
            EditOp::Click(i) => {
                let outcome = self.click(i)?;
                debug!(%op, ?outcome, "click handled");
            }
            EditOp::Remove(i) => {
                self.remove(i)?;
            }
            EditOp::Sort(c) => self.apply_criterion(c)?,
        }
        Ok(())
    }

    /// Validate `request` and lock the collection for the returned job.
    ///
    /// Validation failures leave the session unlocked.
    pub fn begin_export(&mut self, request: ExportRequest) -> Result<ExportJob, ExportError> {
        if self.export_in_progress {
            return Err(ExportError::InProgress);
        }
        let job = export::prepare(self.engine.collection(), request)?;
        self.export_in_progress = true;
        info!(images = job.items().len(), "collection locked for export");
        Ok(job)
    }

    /// Unlock after a job ran, applying the post-export policy on success.
    ///
    /// `result` is whatever the caller considers the end of the export (the
    /// document, or the document plus the path it was written to). A failed
    /// export leaves the collection exactly as it was.
    pub fn finish_export<T>(&mut self, result: Result<T, ExportError>) -> Result<T, ExportError> {
        self.export_in_progress = false;
        if result.is_ok() && self.post_export == PostExportPolicy::ClearCollection {
            self.engine.clear();
            debug!("collection cleared after export");
        }
        result
    }

    /// `begin_export`, `run` and `finish_export` in one call.
    pub async fn export<L, S>(
        &mut self,
        request: ExportRequest,
        loader: &L,
        sink: &mut S,
        events: Option<Sender<ExportEvent>>,
    ) -> Result<ExportedDocument, ExportError>
    where
        L: AssetLoader,
        S: DocumentSink,
    {
        let job = self.begin_export(request)?;
        let result = job.run(loader, sink, events).await;
        self.finish_export(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportErrorKind;
    use crate::export::tests::MockLoader;
    use crate::render::sink::tests::MockSink;
    use crate::test_helpers::candidate;

    fn session_of(names: &[&str]) -> ReportSession {
        let mut s = ReportSession::new();
        s.add(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| candidate(n, 100, i as i64)),
        )
        .unwrap();
        s
    }

    #[test]
    fn edit_ops_parse() {
        assert_eq!("drag:3:0".parse(), Ok(EditOp::Drag { from: 3, to: 0 }));
        assert_eq!("click:2".parse(), Ok(EditOp::Click(2)));
        assert_eq!("REMOVE:1".parse(), Ok(EditOp::Remove(1)));
        assert_eq!(
            "sort:byName".parse(),
            Ok(EditOp::Sort(OrderingCriterion::Name))
        );
    }

    #[test]
    fn bad_edit_ops_rejected() {
        assert!("drag:1".parse::<EditOp>().is_err());
        assert!("click:-1".parse::<EditOp>().is_err());
        assert!("sort:size".parse::<EditOp>().is_err());
        assert!("shuffle".parse::<EditOp>().is_err());
    }

    #[test]
    fn edit_op_display_round_trips() {
        for op in [
            EditOp::Drag { from: 4, to: 1 },
            EditOp::Click(0),
            EditOp::Remove(9),
            EditOp::Sort(OrderingCriterion::Date),
        ] {
            assert_eq!(op.to_string().parse(), Ok(op));
        }
    }

    #[test]
    fn settings_from_config() {
        let mut config = ReportConfig::default();
        config.ordering.selection = SelectionResolution::Swap;
        config.export.clear_on_success = false;
        let s = ReportSession::from_config(&config);
        assert_eq!(s.engine().resolution(), SelectionResolution::Swap);
        assert_eq!(s.post_export_policy(), PostExportPolicy::Keep);
    }

    #[test]
    fn replayed_edits_reorder() {
        let mut s = session_of(&["X", "Y", "Z"]);
        s.apply(EditOp::Drag { from: 2, to: 0 }).unwrap();
        assert_eq!(s.collection().names(), vec!["Z", "X", "Y"]);
        s.apply(EditOp::Click(0)).unwrap();
        s.apply(EditOp::Click(2)).unwrap();
        assert_eq!(s.collection().names(), vec!["X", "Y", "Z"]);
        s.apply(EditOp::Remove(1)).unwrap();
        assert_eq!(s.collection().names(), vec!["X", "Z"]);
    }

    #[test]
    fn out_of_range_edit_surfaces_collection_error() {
        let mut s = session_of(&["a"]);
        assert_eq!(
            s.apply(EditOp::Remove(5)),
            Err(SessionError::Collection(CollectionError::OutOfRange {
                index: 5,
                len: 1
            }))
        );
    }

    #[test]
    fn mutations_refused_while_exporting() {
        let mut s = session_of(&["a", "b"]);
        let _job = s.begin_export(ExportRequest::new("r")).unwrap();
        assert!(s.is_export_in_progress());
        assert_eq!(
            s.add([candidate("c", 1, 0)]),
            Err(SessionError::ExportInProgress)
        );
        assert_eq!(s.drag(0, 1), Err(SessionError::ExportInProgress));
        assert_eq!(s.click(0), Err(SessionError::ExportInProgress));
        assert!(matches!(s.remove(0), Err(SessionError::ExportInProgress)));
        assert_eq!(
            s.apply_criterion(OrderingCriterion::Name),
            Err(SessionError::ExportInProgress)
        );
        assert_eq!(s.clear(), Err(SessionError::ExportInProgress));
        assert_eq!(s.collection().names(), vec!["a", "b"]);
    }

    #[test]
    fn second_export_refused_while_first_runs() {
        let mut s = session_of(&["a"]);
        let _job = s.begin_export(ExportRequest::new("r")).unwrap();
        let err = s.begin_export(ExportRequest::new("r")).unwrap_err();
        assert!(matches!(err, ExportError::InProgress));
        assert_eq!(err.kind(), ExportErrorKind::Validation);
    }

    #[test]
    fn validation_failure_does_not_lock() {
        let mut s = ReportSession::new();
        let err = s.begin_export(ExportRequest::new("r")).unwrap_err();
        assert!(matches!(err, ExportError::EmptyCollection));
        assert!(!s.is_export_in_progress());

        let mut s = session_of(&["a"]);
        let err = s.begin_export(ExportRequest::new("")).unwrap_err();
        assert!(matches!(err, ExportError::MissingFilename));
        assert!(!s.is_export_in_progress());
    }

    #[tokio::test]
    async fn validation_failure_loads_nothing() {
        let loader = MockLoader::new();
        let mut s = ReportSession::new();
        let err = s
            .export(ExportRequest::new("r"), &loader, &mut MockSink::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::EmptyCollection));
        assert!(loader.get_calls().is_empty());
    }

    #[tokio::test]
    async fn blank_filename_loads_nothing() {
        let loader = MockLoader::new();
        let mut s = session_of(&["a", "b"]);
        let err = s
            .export(ExportRequest::new("  "), &loader, &mut MockSink::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::MissingFilename));
        assert!(loader.get_calls().is_empty());
        assert!(!s.is_export_in_progress());
        assert_eq!(s.collection().len(), 2);
    }

    #[tokio::test]
    async fn successful_export_clears_collection() {
        let mut s = session_of(&["a", "b", "c"]);
        let doc = s
            .export(
                ExportRequest::new("r"),
                &MockLoader::new(),
                &mut MockSink::new(),
                None,
            )
            .await
            .unwrap();
        assert_eq!(doc.images, 3);
        assert!(s.collection().is_empty());
        assert_eq!(s.collection().registry().live_count(), 0);
        assert!(!s.is_export_in_progress());
    }

    #[tokio::test]
    async fn keep_policy_leaves_collection() {
        let mut s = session_of(&["a", "b"]);
        s.set_post_export_policy(PostExportPolicy::Keep);
        s.export(
            ExportRequest::new("r"),
            &MockLoader::new(),
            &mut MockSink::new(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(s.collection().names(), vec!["a", "b"]);
        assert!(!s.is_export_in_progress());
    }

    #[tokio::test]
    async fn failed_export_unlocks_and_keeps_collection() {
        let loader = MockLoader {
            fail_on: Some("b".into()),
            ..MockLoader::default()
        };
        let mut s = session_of(&["a", "b", "c"]);
        let err = s
            .export(ExportRequest::new("r"), &loader, &mut MockSink::new(), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExportErrorKind::Runtime);
        assert_eq!(s.collection().names(), vec!["a", "b", "c"]);
        assert_eq!(s.collection().registry().live_count(), 3);
        assert!(!s.is_export_in_progress());
        s.drag(2, 0).unwrap();
    }
}
