// Transient toast messages, styled after Bootstrap 5 without depending on its
// JS. Toasts stack in DOM append order under the fixed `toast-stack` mount;
// each one can be dismissed by its close button and removes itself after a
// fixed delay either way.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::web_document::web_document;
use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::JsResult;

pub const TOAST_MOUNT_ID: &str = "toast-stack";
pub const TOAST_DISMISS_DELAY_MS: i32 = 3500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastSeverity {
    Primary,
    Success,
    Warning,
    Danger,
}

impl ToastSeverity {
    pub fn from_name(name: &str) -> ToastSeverity {
        match name {
            "success" => ToastSeverity::Success,
            "warning" => ToastSeverity::Warning,
            "danger" => ToastSeverity::Danger,
            _ => ToastSeverity::Primary,
        }
    }

    fn background_class(self) -> &'static str {
        match self {
            ToastSeverity::Primary => "text-bg-primary",
            ToastSeverity::Success => "text-bg-success",
            ToastSeverity::Warning => "text-bg-warning",
            ToastSeverity::Danger => "text-bg-danger",
        }
    }
}

/// Appends one toast to the stack; a missing mount point makes this a no-op.
pub fn show_toast(message: &str, severity: ToastSeverity) -> JsResult<()> {
    let document = web_document();
    let Some(stack) = document.get_element_by_id(TOAST_MOUNT_ID) else {
        return Ok(());
    };

    let toast = document
        .create_element("div")?
        .with_classes(["toast", "align-items-center", "border-0", "show"])?
        .with_classes([severity.background_class()])?
        .with_attribute("role", "alert")?
        .with_attribute("aria-live", "assertive")?
        .with_attribute("aria-atomic", "true")?;
    let row = toast.append_new_element("div")?.with_classes(["d-flex"])?;
    row.append_new_element("div")?
        .with_classes(["toast-body"])?
        .with_text_content(message);
    let close_button = row
        .append_new_element("button")?
        .with_classes(["btn-close", "btn-close-white", "me-2", "m-auto"])?
        .with_attribute("type", "button")?
        .with_attribute("aria-label", "Close")?;
    {
        let toast = toast.clone();
        close_button.add_event_listener_and_forget("click", move |_: web_sys::Event| {
            toast.remove();
            Ok(())
        })?;
    }
    stack.append_child(&toast)?;

    let closure = Closure::once_into_js(move || toast.remove());
    web_sys::window()
        .unwrap()
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.unchecked_ref(),
            TOAST_DISMISS_DELAY_MS,
        )?;
    Ok(())
}
