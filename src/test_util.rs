// Test doubles for the browser-side collaborators. Kept in the library
// (not under tests/) so both the unit tests and the integration tests can
// share them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;

use crate::kif;
use crate::loader::{Transport, TransportError};
use crate::viewer::{ViewerFactory, ViewerHandle, ViewerOptions};

#[derive(Debug, Default)]
struct FakeViewerState {
    loaded: Vec<String>,
    seeks: Vec<usize>,
    current_move: Option<usize>,
    total_moves: Option<usize>,
    // Whether loading a record makes the move list available, the way the
    // real widget eventually does.
    ready_on_load: bool,
}

/// In-memory stand-in for the external viewer widget. Seeks and loads are
/// recorded; the move counters behave like the widget's: absent until ready,
/// then derived from the loaded record.
#[derive(Clone, Debug)]
pub struct FakeViewer(Rc<RefCell<FakeViewerState>>);

impl FakeViewer {
    pub fn ready(total_moves: usize) -> Self {
        FakeViewer(Rc::new(RefCell::new(FakeViewerState {
            current_move: Some(0),
            total_moves: Some(total_moves),
            ready_on_load: true,
            ..FakeViewerState::default()
        })))
    }

    /// A widget that never exposes its move list, like one still initializing.
    pub fn uninitialized() -> Self {
        FakeViewer(Rc::new(RefCell::new(FakeViewerState::default())))
    }

    pub fn loaded_texts(&self) -> Vec<String> { self.0.borrow().loaded.clone() }
    pub fn seeks(&self) -> Vec<usize> { self.0.borrow().seeks.clone() }

    pub fn set_total_moves(&self, total_moves: usize) {
        self.0.borrow_mut().total_moves = Some(total_moves);
    }

    pub fn is_same_viewer(&self, other: &FakeViewer) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl ViewerHandle for FakeViewer {
    fn load(&self, text: &str) {
        let mut state = self.0.borrow_mut();
        state.loaded.push(text.to_owned());
        if state.ready_on_load {
            state.total_moves = Some(kif::extract_info(text).move_count as usize);
            state.current_move = Some(0);
        }
    }

    fn seek(&self, index: usize) {
        let mut state = self.0.borrow_mut();
        state.seeks.push(index);
        if let Some(total) = state.total_moves {
            state.current_move = Some(index.min(total));
        }
    }

    fn current_move(&self) -> Option<usize> { self.0.borrow().current_move }
    fn total_moves(&self) -> Option<usize> { self.0.borrow().total_moves }
}

type CreationLog = Rc<RefCell<Vec<(String, ViewerOptions, FakeViewer)>>>;

/// Factory over a fixed set of mount point ids. Clones share the creation
/// log, so tests can keep a handle outside the object under test.
#[derive(Clone)]
pub struct FakeFactory {
    mounts: Vec<String>,
    created: CreationLog,
}

impl FakeFactory {
    pub fn with_mounts(mounts: impl IntoIterator<Item = &'static str>) -> Self {
        FakeFactory {
            mounts: mounts.into_iter().map(str::to_owned).collect(),
            created: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn created_count(&self) -> usize { self.created.borrow().len() }

    pub fn last_options(&self) -> Option<ViewerOptions> {
        self.created.borrow().last().map(|(_, options, _)| options.clone())
    }
}

impl ViewerFactory for FakeFactory {
    type Viewer = FakeViewer;

    fn create(&self, element_id: &str, options: &ViewerOptions) -> Option<FakeViewer> {
        if !self.mounts.iter().any(|mount| mount == element_id) {
            return None;
        }
        let viewer = FakeViewer::ready(0);
        self.created.borrow_mut().push((element_id.to_owned(), options.clone(), viewer.clone()));
        Some(viewer)
    }
}

/// Canned-response transport; unknown URLs yield a 404-style error.
#[derive(Clone, Default)]
pub struct FakeTransport {
    responses: HashMap<String, String>,
}

impl FakeTransport {
    pub fn new() -> Self { FakeTransport::default() }

    pub fn with_response(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_owned(), body.to_owned());
        self
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn fetch_text(&self, url: &str) -> Result<String, TransportError> {
        self.responses.get(url).cloned().ok_or(TransportError::Status(404))
    }
}
