//! Bindings for the asynchronous Clipboard API.
//!
//! `navigator.clipboard` is looked up reflectively: browsers without it, or without its binary
//! `read`/`write` methods, are expected and must not trap.

use js_sys::{Array, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast as _;

#[wasm_bindgen]
extern "C" {
    pub(crate) type Clipboard;

    #[wasm_bindgen(method, catch)]
    pub(crate) fn write(this: &Clipboard, items: &Array) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    pub(crate) fn read(this: &Clipboard) -> Result<Promise, JsValue>;

    pub(crate) type ClipboardItem;

    #[wasm_bindgen(constructor, catch)]
    pub(crate) fn new(items: &Object) -> Result<ClipboardItem, JsValue>;

    #[wasm_bindgen(method, getter)]
    pub(crate) fn types(this: &ClipboardItem) -> Array;

    #[wasm_bindgen(method, catch, js_name = getType)]
    pub(crate) fn get_type(this: &ClipboardItem, mime_type: &str) -> Result<Promise, JsValue>;
}

pub(crate) fn clipboard(navigator: &web_sys::Navigator) -> Option<Clipboard> {
    let clipboard = Reflect::get(navigator, &JsValue::from_str("clipboard")).ok()?;

    if clipboard.is_undefined() || clipboard.is_null() {
        return None;
    }

    Some(clipboard.unchecked_into())
}

pub(crate) fn has_method(object: &JsValue, name: &str) -> bool {
    Reflect::get(object, &JsValue::from_str(name)).is_ok_and(|value| value.is_function())
}

pub(crate) fn string_property(object: &JsValue, name: &str) -> Option<String> {
    Reflect::get(object, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.as_string())
        .filter(|value| !value.is_empty())
}
