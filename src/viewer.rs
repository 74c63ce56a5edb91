// Capability seams for the external viewer widget. The widget renders the
// board and owns move navigation; this crate only ever talks to it through
// these traits, which keeps the core testable without a DOM.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Handle to one externally-constructed viewer bound to one mount point.
///
/// The widget populates its move list asynchronously after construction, so
/// the query accessors return `None` while it is not ready. "Not ready" is an
/// ordinary state, not an error: callers keep their cached values and retry
/// on the next interaction.
pub trait ViewerHandle {
    fn load(&self, text: &str);
    fn seek(&self, index: usize);
    fn current_move(&self) -> Option<usize>;
    fn total_moves(&self) -> Option<usize>;
}

/// Constructs viewers against mount points. `None` means no mount point with
/// this id exists.
pub trait ViewerFactory {
    type Viewer: ViewerHandle;
    fn create(&self, element_id: &str, options: &ViewerOptions) -> Option<Self::Viewer>;
}

impl<F: ViewerFactory> ViewerFactory for &F {
    type Viewer = F::Viewer;
    fn create(&self, element_id: &str, options: &ViewerOptions) -> Option<Self::Viewer> {
        (*self).create(element_id, options)
    }
}

/// Widget construction options, kept as a JSON object because the widget's
/// option set is not ours to enumerate. Merging is key-wise with the
/// later-supplied side winning.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerOptions(Map<String, Value>);

impl ViewerOptions {
    pub fn new() -> Self { Self(Map::new()) }

    /// The option set applied to every board unless overridden per call.
    pub fn standard() -> Self { Self::new().with("theme", "default").with("responsive", true) }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }

    pub fn src(self, url: &str) -> Self { self.with("src", url) }

    /// Tsume (mating problem) records start from a mid-game diagram and the
    /// widget needs to be told so.
    pub fn tsume_mode(self) -> Self { self.with("mode", "tsume") }

    pub fn merged_with(&self, overrides: &ViewerOptions) -> ViewerOptions {
        let mut merged = self.0.clone();
        for (key, value) in &overrides.0 {
            merged.insert(key.clone(), value.clone());
        }
        ViewerOptions(merged)
    }

    pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }

    pub fn to_value(&self) -> Value { Value::Object(self.0.clone()) }
}

impl From<Map<String, Value>> for ViewerOptions {
    fn from(map: Map<String, Value>) -> Self { Self(map) }
}
