// Browser glue for the KIF record viewer: binds the core registry and
// playback to real DOM mount points, the external KifuForJS widget, `fetch`
// and `setInterval`. Pages talk to one `KifuWeb` instance; nothing in here
// may throw out of an event handler, failures are logged or alerted instead.

extern crate console_error_panic_hook;

pub mod download;
pub mod notify;
pub mod transport;
pub mod web_document;
pub mod web_element_ext;
pub mod web_error_handling;
pub mod web_iterators;
pub mod web_logging;
pub mod widget;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use kifu_viewer::kif;
use kifu_viewer::loader::Transport;
use kifu_viewer::playback::{PlaybackController, Tick};
use kifu_viewer::registry::ViewerRegistry;
use kifu_viewer::viewer::ViewerOptions;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::notify::ToastSeverity;
use crate::transport::FetchTransport;
use crate::web_document::web_document;
use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::JsResult;
use crate::widget::{DomViewerFactory, JsViewer};

pub const DOWNLOAD_BUTTON_CLASS: &str = "download-kifu-btn";
// The widget populates its move list asynchronously; retry the counters once
// it has had time to parse.
const MOVE_INFO_RETRY_DELAY_MS: i32 = 2000;

type Player = Rc<RefCell<PlaybackController<JsViewer, i32>>>;

struct State {
    registry: ViewerRegistry<DomViewerFactory, FetchTransport>,
    players: HashMap<String, Player>,
}

#[wasm_bindgen]
pub struct KifuWeb {
    state: Rc<RefCell<State>>,
}

#[wasm_bindgen]
impl KifuWeb {
    #[wasm_bindgen(constructor)]
    pub fn new() -> KifuWeb {
        KifuWeb {
            state: Rc::new(RefCell::new(State {
                registry: ViewerRegistry::new(DomViewerFactory, FetchTransport),
                players: HashMap::new(),
            })),
        }
    }

    /// Creates (or recreates) a board on `element_id`, optionally loading
    /// `text` into it. `options` is a plain JS object merged over the
    /// defaults. Returns whether the board exists afterwards.
    pub fn create_board(
        &self, element_id: &str, text: Option<String>, options: &JsValue,
    ) -> JsResult<bool> {
        let options = options_from_js(options)?;
        let mut state = self.state.borrow_mut();
        let created = state
            .registry
            .create_board(element_id, text.as_deref(), options.as_ref())
            .is_some();
        if created {
            rebind_existing_player(&mut state, element_id);
        }
        Ok(created)
    }

    /// Loads record text into an already-registered board.
    pub fn load_kifu(&self, element_id: &str, text: &str) {
        let state = self.state.borrow();
        state.registry.load_into(element_id, text);
        if let Some(player) = state.players.get(element_id) {
            player.borrow_mut().refresh_move_info();
        }
    }

    /// Fetches a record over HTTP and (re)creates the board with it.
    /// Resolves to whether the load succeeded.
    pub fn load_from_url(&self, element_id: String, url: String) -> js_sys::Promise {
        let state = Rc::clone(&self.state);
        future_to_promise(load_board(state, element_id, url, ViewerOptions::new()))
    }

    /// Record files are served over the same transport as remote URLs.
    pub fn load_from_file(&self, element_id: String, path: String) -> js_sys::Promise {
        self.load_from_url(element_id, path)
    }

    /// Page-init entry point: the mount element's `data-filename` names the
    /// record to fetch from the server API. Tsume records (filename contains
    /// 詰 or "tsume") switch the widget into mating-problem mode.
    pub fn init_board(&self, element_id: String) -> js_sys::Promise {
        let state = Rc::clone(&self.state);
        future_to_promise(async move {
            let mount = web_document().get_existing_element_by_id(&element_id)?;
            let Some(filename) = mount.get_attribute("data-filename") else {
                return Err(rust_error!("Mount point \"{}\" has no data-filename", element_id));
            };
            let mut options = ViewerOptions::new();
            if is_tsume_record(&filename) {
                options = options.tsume_mode();
            }
            let url = format!("{}{}", download::RECORD_API_PREFIX, filename);
            let loaded = load_board(state, element_id, url, options).await?;
            if loaded == JsValue::FALSE {
                alert("Failed to load the record.")?;
            }
            Ok(loaded)
        })
    }

    /// Removes the board and cancels any playback timer bound to it; a live
    /// timer must not outlive its board.
    pub fn remove_board(&self, element_id: &str) -> bool {
        let mut state = self.state.borrow_mut();
        if let Some(player) = state.players.remove(element_id) {
            cancel_timer(&player);
        }
        state.registry.remove(element_id)
    }

    pub fn has_board(&self, element_id: &str) -> bool {
        self.state.borrow().registry.has(element_id)
    }

    pub fn board_ids(&self) -> Vec<String> {
        self.state.borrow().registry.board_ids().iter().map(|id| (*id).to_owned()).collect()
    }

    pub fn set_current_board(&self, element_id: &str) {
        self.state.borrow_mut().registry.set_current(element_id);
    }

    pub fn load_to_current_board(&self, text: &str) {
        self.state.borrow().registry.load_into_current(text);
    }

    /// Binds (or rebinds) playback controls to a registered board.
    pub fn bind_player(&self, element_id: &str) -> bool {
        let mut state = self.state.borrow_mut();
        bind_player(&mut state, element_id)
    }

    pub fn go_to_start(&self, element_id: &str) {
        self.with_player(element_id, |controller| controller.go_to_start());
    }
    pub fn go_to_previous(&self, element_id: &str) {
        self.with_player(element_id, |controller| controller.go_to_previous());
    }
    pub fn go_to_next(&self, element_id: &str) {
        self.with_player(element_id, |controller| controller.go_to_next());
    }
    pub fn go_to_end(&self, element_id: &str) {
        self.with_player(element_id, |controller| controller.go_to_end());
    }

    pub fn current_move(&self, element_id: &str) -> Option<u32> {
        self.state
            .borrow()
            .players
            .get(element_id)
            .map(|player| player.borrow().current_move() as u32)
    }

    pub fn total_moves(&self, element_id: &str) -> Option<u32> {
        self.state
            .borrow()
            .players
            .get(element_id)
            .map(|player| player.borrow().total_moves() as u32)
    }

    pub fn is_playing(&self, element_id: &str) -> bool {
        self.state
            .borrow()
            .players
            .get(element_id)
            .is_some_and(|player| player.borrow().is_playing())
    }

    pub fn refresh_move_info(&self, element_id: &str) {
        self.with_player(element_id, |controller| controller.refresh_move_info());
    }

    pub fn toggle_play_pause(&self, element_id: &str) -> JsResult<()> {
        let state = self.state.borrow();
        let Some(player) = state.players.get(element_id) else {
            log::error!("No player bound to \"{element_id}\"");
            return Ok(());
        };
        let window = web_sys::window().unwrap();
        let mut controller = player.borrow_mut();
        if controller.is_playing() {
            if let Some(handle) = controller.pause() {
                window.clear_interval_with_handle(handle);
            }
        } else if let Some(period) = controller.play() {
            let tick_player = Rc::clone(player);
            let closure = Closure::<dyn FnMut()>::new(move || {
                let tick = tick_player.borrow_mut().tick();
                if let Tick::Finished(Some(handle)) = tick {
                    if let Some(window) = web_sys::window() {
                        window.clear_interval_with_handle(handle);
                    }
                }
            });
            let handle = window.set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period.as_millis() as i32,
            )?;
            closure.forget();
            controller.attach_timer(handle);
        }
        Ok(())
    }

    /// Wires every `.download-kifu-btn` on the page to the download flow,
    /// taking the filename from the button's `data-filename` attribute.
    pub fn wire_download_buttons(&self) -> JsResult<()> {
        for button in web_document().get_elements_by_class_name(DOWNLOAD_BUTTON_CLASS) {
            let button_ref = button.clone();
            button.add_event_listener_and_forget("click", move |event: web_sys::Event| {
                event.prevent_default();
                download::download_record(button_ref.get_attribute("data-filename"))?;
                Ok(())
            })?;
        }
        Ok(())
    }

    fn with_player(
        &self, element_id: &str, action: impl FnOnce(&mut PlaybackController<JsViewer, i32>),
    ) {
        let state = self.state.borrow();
        match state.players.get(element_id) {
            Some(player) => action(&mut player.borrow_mut()),
            None => log::error!("No player bound to \"{element_id}\""),
        }
    }
}

async fn load_board(
    state: Rc<RefCell<State>>, element_id: String, url: String, options: ViewerOptions,
) -> JsResult<JsValue> {
    // Fetch before borrowing: nothing may hold the state across an await.
    let text = match FetchTransport.fetch_text(&url).await {
        Ok(text) => text,
        Err(err) => {
            log::error!("Failed to load record from \"{url}\": {err}");
            return Ok(JsValue::FALSE);
        }
    };
    let mut state = state.borrow_mut();
    let created = state.registry.create_board(&element_id, Some(&text), Some(&options)).is_some();
    if created {
        rebind_existing_player(&mut state, &element_id);
    }
    Ok(JsValue::from_bool(created))
}

fn bind_player(state: &mut State, element_id: &str) -> bool {
    let Some(viewer) = state.registry.get(element_id).cloned() else {
        log::error!("Board \"{element_id}\" not found");
        return false;
    };
    if let Some(previous) = state.players.remove(element_id) {
        cancel_timer(&previous);
    }
    let player: Player = Rc::new(RefCell::new(PlaybackController::new(viewer)));
    let _ = schedule_move_info_refresh(&player);
    state.players.insert(element_id.to_owned(), player);
    true
}

// A reloaded board gets a fresh controller over the new widget; the old
// timer, if any, is cancelled first.
fn rebind_existing_player(state: &mut State, element_id: &str) {
    if state.players.contains_key(element_id) {
        bind_player(state, element_id);
    }
}

fn cancel_timer(player: &Player) {
    if let Some(handle) = player.borrow_mut().pause() {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(handle);
        }
    }
}

fn schedule_move_info_refresh(player: &Player) -> JsResult<()> {
    let player = Rc::clone(player);
    let closure = Closure::once_into_js(move || player.borrow_mut().refresh_move_info());
    web_sys::window()
        .unwrap()
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.unchecked_ref(),
            MOVE_INFO_RETRY_DELAY_MS,
        )?;
    Ok(())
}

fn is_tsume_record(filename: &str) -> bool {
    filename.contains('詰') || filename.to_lowercase().contains("tsume")
}

fn options_from_js(value: &JsValue) -> JsResult<Option<ViewerOptions>> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let json = js_sys::JSON::stringify(value).map(String::from)?;
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|err| rust_error!("Bad viewer options: {}", err))
}

fn to_js<T: Serialize>(value: &T) -> JsResult<JsValue> {
    let json =
        serde_json::to_string(value).map_err(|err| rust_error!("Serialization failed: {}", err))?;
    js_sys::JSON::parse(&json)
}

fn alert(message: &str) -> JsResult<()> {
    web_sys::window().unwrap().alert_with_message(message)
}

// Record-text utilities, exported for pages that handle raw KIF text.

#[wasm_bindgen]
pub fn normalize_kifu(text: &str) -> String { kif::normalize(text) }

#[wasm_bindgen]
pub fn validate_kifu(text: &str) -> JsResult<JsValue> { to_js(&kif::validate(text)) }

#[wasm_bindgen]
pub fn extract_kifu_info(text: &str) -> JsResult<JsValue> { to_js(&kif::extract_info(text)) }

#[wasm_bindgen]
pub fn kifu_to_compact(text: &str) -> String { kif::to_compact(text) }

#[wasm_bindgen]
pub fn kifu_to_detailed(text: &str) -> String { kif::to_detailed(text) }

#[wasm_bindgen]
pub fn kifu_to_markup(text: &str) -> String { kif::to_markup(text) }

#[wasm_bindgen]
pub fn download_kifu(filename: Option<String>) -> JsResult<bool> {
    download::download_record(filename)
}

#[wasm_bindgen]
pub fn show_toast(message: &str, severity: Option<String>) -> JsResult<()> {
    let severity = severity.as_deref().map_or(ToastSeverity::Primary, ToastSeverity::from_name);
    notify::show_toast(message, severity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsume_records_are_recognized_by_filename() {
        assert!(is_tsume_record("三手詰.kif"));
        assert!(is_tsume_record("Tsume_001.kif"));
        assert!(!is_tsume_record("meijin_sen.kif"));
    }

    #[test]
    fn unknown_toast_severity_falls_back_to_primary() {
        assert_eq!(ToastSeverity::from_name("danger"), ToastSeverity::Danger);
        assert_eq!(ToastSeverity::from_name("sparkly"), ToastSeverity::Primary);
    }
}
