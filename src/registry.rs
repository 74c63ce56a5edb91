// Multi-board bookkeeping: one viewer per mount point id, plus an optional
// "current" board that UI shortcuts act on.

use std::collections::HashMap;

use itertools::Itertools;

use crate::loader::{RecordLoader, Transport};
use crate::viewer::{ViewerFactory, ViewerHandle, ViewerOptions};

pub struct ViewerRegistry<F: ViewerFactory, T> {
    factory: F,
    transport: T,
    default_options: ViewerOptions,
    boards: HashMap<String, F::Viewer>,
    current: Option<String>,
}

impl<F: ViewerFactory, T: Transport> ViewerRegistry<F, T> {
    pub fn new(factory: F, transport: T) -> Self {
        Self::with_default_options(factory, transport, ViewerOptions::standard())
    }

    pub fn with_default_options(factory: F, transport: T, default_options: ViewerOptions) -> Self {
        ViewerRegistry {
            factory,
            transport,
            default_options,
            boards: HashMap::new(),
            current: None,
        }
    }

    fn loader(&self) -> RecordLoader<&F, &T> {
        RecordLoader::new(&self.factory, &self.transport)
    }

    /// Creates a viewer on `element_id` and registers it, replacing any prior
    /// entry for that id (last create wins). Options are the registry
    /// defaults with call-supplied keys winning. `None` when the mount point
    /// is absent.
    pub fn create_board(
        &mut self, element_id: &str, text: Option<&str>, options: Option<&ViewerOptions>,
    ) -> Option<&F::Viewer> {
        let merged = match options {
            Some(options) => self.default_options.merged_with(options),
            None => self.default_options.clone(),
        };
        let Some(viewer) = self.factory.create(element_id, &merged) else {
            log::error!("Cannot find mount point \"{element_id}\"");
            return None;
        };
        if let Some(text) = text {
            viewer.load(text);
        }
        if self.boards.insert(element_id.to_owned(), viewer).is_some() {
            log::debug!("Board \"{element_id}\" recreated, replacing the previous viewer");
        }
        self.boards.get(element_id)
    }

    /// Loads `text` into an already-registered board; unknown ids log and do
    /// nothing.
    pub fn load_into(&self, element_id: &str, text: &str) {
        match self.boards.get(element_id) {
            Some(board) => board.load(text),
            None => log::error!("Board \"{element_id}\" not found"),
        }
    }

    pub async fn load_from_file(&mut self, element_id: &str, path: &str) -> Option<&F::Viewer> {
        let viewer = self.loader().load_from_file(path, element_id, &ViewerOptions::new()).await;
        self.register_loaded(element_id, viewer)
    }

    pub async fn load_from_url(&mut self, element_id: &str, url: &str) -> Option<&F::Viewer> {
        let viewer = self.loader().load_from_url(url, element_id, &ViewerOptions::new()).await;
        self.register_loaded(element_id, viewer)
    }

    fn register_loaded(
        &mut self, element_id: &str, viewer: Option<F::Viewer>,
    ) -> Option<&F::Viewer> {
        let viewer = viewer?;
        self.boards.insert(element_id.to_owned(), viewer);
        self.boards.get(element_id)
    }

    /// Idempotent. Callers owning a playback timer for this board must stop
    /// it first; see `PlaybackController::pause`.
    pub fn remove(&mut self, element_id: &str) -> bool {
        self.boards.remove(element_id).is_some()
    }

    /// The id does not have to be registered yet; consumers treat a current
    /// id with no matching board as stale and ignore it.
    pub fn set_current(&mut self, element_id: &str) {
        self.current = Some(element_id.to_owned());
    }

    pub fn current(&self) -> Option<&str> { self.current.as_deref() }

    pub fn load_into_current(&self, text: &str) {
        if let Some(element_id) = &self.current {
            self.load_into(element_id, text);
        }
    }

    pub fn has(&self, element_id: &str) -> bool { self.boards.contains_key(element_id) }

    pub fn get(&self, element_id: &str) -> Option<&F::Viewer> { self.boards.get(element_id) }

    pub fn len(&self) -> usize { self.boards.len() }

    pub fn is_empty(&self) -> bool { self.boards.is_empty() }

    /// Read-only view of the registered ids, in stable order.
    pub fn board_ids(&self) -> Vec<&str> {
        self.boards.keys().map(String::as_str).sorted().collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_util::{FakeFactory, FakeTransport};

    // The factory clone shares creation bookkeeping with the registry's copy.
    fn sample_registry() -> (FakeFactory, ViewerRegistry<FakeFactory, FakeTransport>) {
        let factory = FakeFactory::with_mounts(["board-1", "board-2"]);
        let transport = FakeTransport::new().with_response("/records/a.kif", "1 ７六歩\n");
        (factory.clone(), ViewerRegistry::new(factory, transport))
    }

    #[test]
    fn create_board_registers_and_loads() {
        let (_factory, mut registry) = sample_registry();
        let viewer = registry.create_board("board-1", Some("1 ７六歩"), None).unwrap();
        assert_eq!(viewer.loaded_texts(), vec!["1 ７六歩".to_owned()]);
        assert!(registry.has("board-1"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn create_board_missing_mount_fails() {
        let (_factory, mut registry) = sample_registry();
        assert!(registry.create_board("no-such-board", None, None).is_none());
        assert!(!registry.has("no-such-board"));
    }

    #[test]
    fn duplicate_create_keeps_exactly_one_entry() {
        let (factory, mut registry) = sample_registry();
        registry.create_board("board-1", None, None).unwrap();
        let second = registry.create_board("board-1", None, None).unwrap().clone();
        assert_eq!(registry.len(), 1);
        // Last create wins: the registered handle is the second viewer.
        assert!(registry.get("board-1").unwrap().is_same_viewer(&second));
        assert_eq!(factory.created_count(), 2);
    }

    #[test]
    fn create_board_merges_options_with_defaults() {
        let (factory, mut registry) = sample_registry();
        let overrides = ViewerOptions::new().with("theme", "dark");
        registry.create_board("board-1", None, Some(&overrides)).unwrap();
        let options = factory.last_options().unwrap();
        assert_eq!(options.get("theme"), Some(&"dark".into()));
        assert_eq!(options.get("responsive"), Some(&true.into()));
    }

    #[test]
    fn load_into_unknown_board_is_a_no_op() {
        let (_factory, mut registry) = sample_registry();
        registry.create_board("board-1", None, None).unwrap();
        registry.load_into("board-2", "text");
        assert_eq!(registry.get("board-1").unwrap().loaded_texts(), Vec::<String>::new());
    }

    #[test]
    fn remove_is_idempotent() {
        let (_factory, mut registry) = sample_registry();
        registry.create_board("board-1", None, None).unwrap();
        assert!(registry.remove("board-1"));
        assert!(!registry.remove("board-1"));
        assert!(registry.is_empty());
    }

    #[test]
    fn current_board_shortcuts() {
        let (_factory, mut registry) = sample_registry();
        registry.create_board("board-1", None, None).unwrap();
        // No current id set: a silent no-op.
        registry.load_into_current("text");
        assert_eq!(registry.get("board-1").unwrap().loaded_texts(), Vec::<String>::new());

        registry.set_current("board-1");
        assert_eq!(registry.current(), Some("board-1"));
        registry.load_into_current("text");
        assert_eq!(registry.get("board-1").unwrap().loaded_texts(), vec!["text".to_owned()]);

        // A stale current id is ignored by consumers.
        registry.set_current("gone");
        registry.load_into_current("more");
        assert_eq!(registry.get("board-1").unwrap().loaded_texts(), vec!["text".to_owned()]);
    }

    #[async_std::test]
    async fn load_from_url_registers_the_result() {
        let (_factory, mut registry) = sample_registry();
        registry.load_from_url("board-1", "/records/a.kif").await.unwrap();
        assert!(registry.has("board-1"));
        assert_eq!(
            registry.get("board-1").unwrap().loaded_texts(),
            vec!["1 ７六歩\n".to_owned()]
        );
    }

    #[async_std::test]
    async fn load_from_url_failure_registers_nothing() {
        let (_factory, mut registry) = sample_registry();
        assert!(registry.load_from_url("board-1", "/missing.kif").await.is_none());
        assert!(!registry.has("board-1"));
    }

    #[test]
    fn board_ids_are_sorted() {
        let (_factory, mut registry) = sample_registry();
        registry.create_board("board-2", None, None).unwrap();
        registry.create_board("board-1", None, None).unwrap();
        assert_eq!(registry.board_ids(), vec!["board-1", "board-2"]);
    }
}
