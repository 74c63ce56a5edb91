// Bindings to the external KifuForJS widget. The widget is an opaque
// collaborator: it renders the board, parses the record and owns move
// navigation. Older builds miss some of the navigation accessors, so every
// method beyond `load` is probed before use and the core sees the widget
// through the `ViewerHandle` "maybe not ready" contract.

use kifu_viewer::viewer::{ViewerFactory, ViewerHandle, ViewerOptions};
use wasm_bindgen::prelude::*;

use crate::web_document::web_document;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = KifuForJS)]
    pub type KifuWidget;

    #[wasm_bindgen(constructor, js_class = "KifuForJS")]
    fn new(element: &web_sys::Element, options: &JsValue) -> KifuWidget;

    #[wasm_bindgen(method, catch)]
    fn load(this: &KifuWidget, text: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = goTo)]
    fn go_to(this: &KifuWidget, index: u32) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = getCurrentMove)]
    fn get_current_move(this: &KifuWidget) -> Result<u32, JsValue>;

    #[wasm_bindgen(method, catch, js_name = getMoves)]
    fn get_moves(this: &KifuWidget) -> Result<js_sys::Array, JsValue>;
}

fn has_method(widget: &KifuWidget, name: &str) -> bool {
    js_sys::Reflect::get(widget.as_ref(), &JsValue::from_str(name))
        .map(|value| value.is_function())
        .unwrap_or(false)
}

/// `ViewerHandle` over a live widget instance. Failures inside the widget are
/// logged and swallowed; nothing here may throw back into an event handler.
#[derive(Clone)]
pub struct JsViewer(KifuWidget);

impl ViewerHandle for JsViewer {
    fn load(&self, text: &str) {
        if let Err(err) = self.0.load(text) {
            web_sys::console::error_2(&JsValue::from_str("Failed to load record:"), &err);
        }
    }

    fn seek(&self, index: usize) {
        if !has_method(&self.0, "goTo") {
            return;
        }
        if let Err(err) = self.0.go_to(index as u32) {
            web_sys::console::error_2(&JsValue::from_str("Failed to seek:"), &err);
        }
    }

    fn current_move(&self) -> Option<usize> {
        if !has_method(&self.0, "getCurrentMove") {
            return None;
        }
        self.0.get_current_move().ok().map(|index| index as usize)
    }

    fn total_moves(&self) -> Option<usize> {
        if !has_method(&self.0, "getMoves") {
            return None;
        }
        self.0.get_moves().ok().map(|moves| moves.length() as usize)
    }
}

/// Constructs widgets against real DOM mount points.
pub struct DomViewerFactory;

impl ViewerFactory for DomViewerFactory {
    type Viewer = JsViewer;

    fn create(&self, element_id: &str, options: &ViewerOptions) -> Option<JsViewer> {
        let element = web_document().get_element_by_id(element_id)?;
        Some(JsViewer(KifuWidget::new(&element, &options_to_js(options))))
    }
}

// The widget wants a plain JS object; round-tripping through JSON spares a
// dedicated conversion dependency.
fn options_to_js(options: &ViewerOptions) -> JsValue {
    let json = serde_json::to_string(&options.to_value()).unwrap_or_else(|_| "{}".to_owned());
    js_sys::JSON::parse(&json).unwrap_or_else(|_| js_sys::Object::new().into())
}
