// Saving the displayed record as a file. Preferred source is the inline
// `kifu-text` element; when the page renders the board without the text, the
// record is fetched back from the server API instead. Failures here are
// user-facing and surface as blocking alerts, unlike the silent log-and-null
// contract of the loaders.

use kifu_viewer::loader::Transport;
use serde::Deserialize;
use wasm_bindgen::JsCast;

use crate::transport::FetchTransport;
use crate::web_document::web_document;
use crate::web_error_handling::JsResult;

pub const RECORD_TEXT_ELEMENT_ID: &str = "kifu-text";
pub const RECORD_API_PREFIX: &str = "/shogi/api/kifu/";

#[derive(Debug, Deserialize)]
struct RecordPayload {
    success: bool,
    content: Option<String>,
    error: Option<String>,
}

/// Offers the displayed record as a download. Filename comes from the
/// argument or the text element's `data-filename` attribute. Returns whether
/// a download was started.
pub fn download_record(filename: Option<String>) -> JsResult<bool> {
    let document = web_document();
    let Some(element) = document.get_element_by_id(RECORD_TEXT_ELEMENT_ID) else {
        // No inline text; fall back to the server API if we know the file.
        let Some(filename) = filename else {
            alert("Record text element not found and no filename was given.")?;
            return Ok(false);
        };
        wasm_bindgen_futures::spawn_local(fetch_and_download(filename));
        return Ok(true);
    };

    let content = element.text_content().unwrap_or_default();
    if content.trim().is_empty() {
        alert("There is no record content to download.")?;
        return Ok(false);
    }
    let Some(filename) = filename.or_else(|| element.get_attribute("data-filename")) else {
        alert("No filename to download the record as.")?;
        return Ok(false);
    };
    save_text_as_file(&content, &filename)?;
    Ok(true)
}

async fn fetch_and_download(filename: String) {
    let url = format!("{RECORD_API_PREFIX}{filename}");
    let failure = match FetchTransport.fetch_text(&url).await {
        Ok(body) => match serde_json::from_str::<RecordPayload>(&body) {
            Ok(RecordPayload { success: true, content: Some(content), .. }) => {
                match save_text_as_file(&content, &filename) {
                    Ok(()) => return,
                    Err(err) => format!("{err:?}"),
                }
            }
            Ok(payload) => payload.error.unwrap_or_else(|| "Unknown error".to_owned()),
            Err(err) => err.to_string(),
        },
        Err(err) => err.to_string(),
    };
    web_sys::console::error_1(&format!("Record download failed: {failure}").into());
    let _ = alert(&format!("Failed to download the record: {failure}"));
}

fn save_text_as_file(content: &str, filename: &str) -> JsResult<()> {
    let parts = js_sys::Array::new();
    parts.push(&content.into());
    let properties = web_sys::BlobPropertyBag::new();
    properties.set_type("text/plain;charset=utf-8");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &properties)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let document = web_document();
    let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(filename);
    document.body()?.append_child(&anchor)?;
    anchor.click();
    anchor.remove();
    web_sys::Url::revoke_object_url(&url)?;
    Ok(())
}

fn alert(message: &str) -> JsResult<()> {
    web_sys::window().unwrap().alert_with_message(message)
}
