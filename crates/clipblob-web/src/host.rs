use core::cell::RefCell;

use anyhow::Context as _;
use clipblob::{
    BinaryItem, Blob, ClickHandler, ClipboardEntry, ClipboardSupport, Element, Host, LocalTask, OnceHandler,
    SelectorError,
};
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast as _;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AddEventListenerOptions, Document, Event, Response, Url, Window};

use crate::error::js_error;
use crate::sys;

thread_local! {
    // Listener currently installed by the bridge, with the body it is attached to.
    static CLICK_LISTENER: RefCell<Option<(web_sys::Element, Closure<dyn FnMut(Event)>)>> = const { RefCell::new(None) };
}

/// Browser implementation of the bridge host.
#[derive(Clone)]
pub(crate) struct WebHost {
    window: Window,
    document: Document,
}

impl WebHost {
    pub(crate) fn new() -> anyhow::Result<Self> {
        let window = web_sys::window().context("no window object available")?;
        let document = window.document().context("no document object available")?;

        Ok(Self { window, document })
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    fn clipboard(&self) -> Option<sys::Clipboard> {
        sys::clipboard(&self.window.navigator())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct DomElement(web_sys::Element);

impl Element for DomElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) -> anyhow::Result<()> {
        self.0.set_attribute(name, value).map_err(js_error)
    }

    fn add_class(&self, class: &str) -> anyhow::Result<()> {
        self.0.class_list().add_1(class).map_err(js_error)
    }

    fn remove_class(&self, class: &str) -> anyhow::Result<()> {
        self.0.class_list().remove_1(class).map_err(js_error)
    }

    fn source_url(&self) -> Option<String> {
        // DOM properties, not attributes: these are already resolved against the base URL.
        sys::string_property(&self.0, "src").or_else(|| sys::string_property(&self.0, "href"))
    }

    fn append_child(&self, child: &Self) -> anyhow::Result<()> {
        self.0.append_child(&child.0).map(|_| ()).map_err(js_error)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct DomBlob(web_sys::Blob);

impl Blob for DomBlob {
    fn mime_type(&self) -> String {
        self.0.type_()
    }
}

pub(crate) struct DomClipboardEntry(sys::ClipboardItem);

impl ClipboardEntry for DomClipboardEntry {
    type Blob = DomBlob;

    fn types(&self) -> Vec<String> {
        self.0.types().iter().filter_map(|value| value.as_string()).collect()
    }

    async fn get_type(&self, mime_type: &str) -> anyhow::Result<DomBlob> {
        let promise = self.0.get_type(mime_type).map_err(js_error)?;
        let blob = JsFuture::from(promise).await.map_err(js_error)?;

        blob.dyn_into::<web_sys::Blob>()
            .map(DomBlob)
            .map_err(|value| anyhow::anyhow!("clipboard returned a non-blob value: {value:?}"))
    }
}

impl Host for WebHost {
    type Element = DomElement;
    type Blob = DomBlob;
    type Entry = DomClipboardEntry;

    fn body(&self) -> Option<DomElement> {
        self.document.body().map(|body| DomElement(body.into()))
    }

    fn clipboard_support(&self) -> Option<ClipboardSupport> {
        let clipboard = self.clipboard()?;

        Some(ClipboardSupport {
            write: sys::has_method(&clipboard, "write"),
            read: sys::has_method(&clipboard, "read"),
        })
    }

    fn query_selector(&self, selector: &str) -> Result<Option<DomElement>, SelectorError> {
        self.document
            .query_selector(selector)
            .map(|element| element.map(DomElement))
            .map_err(|e| SelectorError::new(selector, format!("{e:?}")))
    }

    fn create_image(&self) -> anyhow::Result<DomElement> {
        self.document.create_element("img").map(DomElement).map_err(js_error)
    }

    fn create_object_url(&self, blob: &DomBlob) -> anyhow::Result<String> {
        Url::create_object_url_with_blob(&blob.0).map_err(js_error)
    }

    fn revoke_object_url(&self, url: &str) {
        if let Err(e) = Url::revoke_object_url(url) {
            warn!("Failed to revoke object URL {url}: {e:?}");
        }
    }

    fn listen_once(&self, element: &DomElement, event: &str, handler: OnceHandler) -> anyhow::Result<()> {
        // The browser drops the listener after the first call, and the closure frees itself then.
        let callback = Closure::once_into_js(move || handler());

        let options = AddEventListenerOptions::new();
        options.set_once(true);

        element
            .0
            .add_event_listener_with_callback_and_add_event_listener_options(event, callback.unchecked_ref(), &options)
            .map_err(js_error)
    }

    fn set_click_listener(&self, body: &DomElement, handler: ClickHandler<DomElement>) -> anyhow::Result<()> {
        let closure = Closure::wrap(Box::new(move |event: Event| {
            let Some(target) = event.target() else {
                return;
            };

            if let Ok(element) = target.dyn_into::<web_sys::Element>() {
                handler(DomElement(element));
            }
        }) as Box<dyn FnMut(Event)>);

        body.0
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(js_error)?;

        let previous = CLICK_LISTENER.with(|listener| listener.borrow_mut().replace((body.0.clone(), closure)));

        if let Some((previous_body, previous_closure)) = previous {
            trace!("Replacing previously installed click listener");

            if let Err(e) =
                previous_body.remove_event_listener_with_callback("click", previous_closure.as_ref().unchecked_ref())
            {
                warn!("Failed to remove previous click listener: {e:?}");

                // Still attached, so it must stay callable.
                previous_closure.forget();
            }
        }

        Ok(())
    }

    fn spawn(&self, task: LocalTask) {
        wasm_bindgen_futures::spawn_local(task);
    }

    async fn fetch(&self, url: &str) -> anyhow::Result<BinaryItem<DomBlob>> {
        let response = JsFuture::from(self.window.fetch_with_str(url))
            .await
            .map_err(js_error)?
            .dyn_into::<Response>()
            .map_err(js_error)?;

        let blob = JsFuture::from(response.blob().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .dyn_into::<web_sys::Blob>()
            .map_err(js_error)?;

        Ok(BinaryItem::new(DomBlob(blob)))
    }

    async fn write_clipboard(&self, items: Vec<BinaryItem<DomBlob>>) -> anyhow::Result<()> {
        let clipboard = self.clipboard().context("clipboard is gone")?;

        let clipboard_items = Array::new();

        for item in items {
            let record = Object::new();
            Reflect::set(&record, &JsValue::from_str(&item.mime_type), &item.blob.0).map_err(js_error)?;
            clipboard_items.push(&JsValue::from(sys::ClipboardItem::new(&record).map_err(js_error)?));
        }

        JsFuture::from(clipboard.write(&clipboard_items).map_err(js_error)?)
            .await
            .map_err(js_error)?;

        Ok(())
    }

    async fn read_clipboard(&self) -> anyhow::Result<Vec<DomClipboardEntry>> {
        let clipboard = self.clipboard().context("clipboard is gone")?;

        let items = JsFuture::from(clipboard.read().map_err(js_error)?)
            .await
            .map_err(js_error)?;

        let items = Array::from(&items);

        Ok(items
            .iter()
            .map(|item| DomClipboardEntry(item.unchecked_into()))
            .collect())
    }
}
