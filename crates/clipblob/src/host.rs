//! Capability surface the bridge consumes from its host.
//!
//! In a browser this is the document, `fetch`, `URL.createObjectURL` and `navigator.clipboard`.
//! Every asynchronous operation is a suspend point: nothing here is expected to block, and nothing
//! here applies a timeout.

use core::fmt;
use core::future::Future;
use core::pin::Pin;
use std::rc::Rc;

use serde::Serialize;

/// Task spawned on the host's single-threaded executor.
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Callback invoked with the element a click originated from.
pub type ClickHandler<E> = Rc<dyn Fn(E)>;

/// Callback invoked at most once, when the awaited event fires.
pub type OnceHandler = Box<dyn FnOnce()>;

/// Which binary clipboard operations the host exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClipboardSupport {
    pub write: bool,
    pub read: bool,
}

impl ClipboardSupport {
    pub const FULL: Self = Self { write: true, read: true };
}

/// Opaque host payload (a `Blob` in browsers).
pub trait Blob: Clone + 'static {
    fn mime_type(&self) -> String;
}

/// MIME type tag plus payload, as exchanged with the clipboard.
#[derive(Debug, Clone)]
pub struct BinaryItem<B> {
    pub mime_type: String,
    pub blob: B,
}

impl<B: Blob> BinaryItem<B> {
    pub fn new(blob: B) -> Self {
        Self {
            mime_type: blob.mime_type(),
            blob,
        }
    }
}

pub trait Element: Clone + 'static {
    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str) -> anyhow::Result<()>;

    fn add_class(&self, class: &str) -> anyhow::Result<()>;

    fn remove_class(&self, class: &str) -> anyhow::Result<()>;

    /// Resource location of the element: its `src` if non-empty, its `href` otherwise.
    fn source_url(&self) -> Option<String>;

    fn append_child(&self, child: &Self) -> anyhow::Result<()>;
}

/// One item read from the clipboard, offering its content under one or more MIME types.
pub trait ClipboardEntry: 'static {
    type Blob: Blob;

    /// Offered MIME types, in the order the host enumerates them.
    fn types(&self) -> Vec<String>;

    fn get_type(&self, mime_type: &str) -> impl Future<Output = anyhow::Result<Self::Blob>>;
}

pub trait Host: Clone + 'static {
    type Element: Element;
    type Blob: Blob;
    type Entry: ClipboardEntry<Blob = Self::Blob>;

    fn body(&self) -> Option<Self::Element>;

    /// `None` when the host has no clipboard object at all.
    fn clipboard_support(&self) -> Option<ClipboardSupport>;

    /// Returns the first element matching `selector` in document order.
    fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>, SelectorError>;

    fn create_image(&self) -> anyhow::Result<Self::Element>;

    fn create_object_url(&self, blob: &Self::Blob) -> anyhow::Result<String>;

    fn revoke_object_url(&self, url: &str);

    /// Registers `handler` for the next `event` fired on `element` only.
    fn listen_once(&self, element: &Self::Element, event: &str, handler: OnceHandler) -> anyhow::Result<()>;

    /// Installs the delegated click listener on `body`.
    ///
    /// A listener installed by an earlier call is replaced, so at most one is active at any time.
    fn set_click_listener(&self, body: &Self::Element, handler: ClickHandler<Self::Element>) -> anyhow::Result<()>;

    fn spawn(&self, task: LocalTask);

    fn fetch(&self, url: &str) -> impl Future<Output = anyhow::Result<BinaryItem<Self::Blob>>>;

    fn write_clipboard(&self, items: Vec<BinaryItem<Self::Blob>>) -> impl Future<Output = anyhow::Result<()>>;

    fn read_clipboard(&self) -> impl Future<Output = anyhow::Result<Vec<Self::Entry>>>;
}

/// The selector text is not valid selector syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}

impl SelectorError {
    pub fn new(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid selector {:?}: {}", self.selector, self.reason)
    }
}

impl core::error::Error for SelectorError {}
