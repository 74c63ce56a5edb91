use async_trait::async_trait;
use kifu_viewer::loader::{Transport, TransportError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// `Transport` over the browser's `fetch`. Serves both remote URLs and
/// same-origin record files.
pub struct FetchTransport;

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn fetch_text(&self, url: &str) -> Result<String, TransportError> {
        let window = web_sys::window()
            .ok_or_else(|| TransportError::Failed("no window object".to_owned()))?;
        let response = JsFuture::from(window.fetch_with_str(url)).await.map_err(js_failure)?;
        let response: web_sys::Response = response
            .dyn_into()
            .map_err(|_| TransportError::Failed("fetch did not yield a Response".to_owned()))?;
        if !response.ok() {
            return Err(TransportError::Status(response.status()));
        }
        let text = JsFuture::from(response.text().map_err(js_failure)?).await.map_err(js_failure)?;
        text.as_string()
            .ok_or_else(|| TransportError::Failed("response body is not text".to_owned()))
    }
}

fn js_failure(err: JsValue) -> TransportError {
    TransportError::Failed(format!("{err:?}"))
}
