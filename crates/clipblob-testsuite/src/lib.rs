#![allow(clippy::missing_panics_doc)]

//! In-memory host used to drive the clipboard bridge without a browser.
//!
//! The document is a flat arena of nodes rooted at `<body>`. Selectors are limited to a single
//! compound selector (`tag`, `#id`, `.class` and combinations such as `div.tray`); anything else is
//! reported as invalid syntax. Host operations that matter to the flows are recorded in a log.

use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use clipblob::{
    BinaryItem, Blob, ClickHandler, ClipboardBridge, ClipboardEntry, ClipboardSupport, Config, Element, Host,
    LocalTask, OnceHandler, SelectorError,
};

/// MIME types the fake clipboard accepts on write, like common browsers do.
const WRITABLE_TYPES: &[&str] = &["image/png", "text/plain", "text/html"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeBlob {
    pub mime_type: String,
    pub bytes: Rc<[u8]>,
}

impl FakeBlob {
    pub fn new(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_owned(),
            bytes: Rc::from(bytes),
        }
    }
}

impl Blob for FakeBlob {
    fn mime_type(&self) -> String {
        self.mime_type.clone()
    }
}

/// Clipboard item offering its content under one or more types.
#[derive(Debug, Clone, Default)]
pub struct FakeEntry {
    representations: Vec<FakeBlob>,
}

impl FakeEntry {
    pub fn new(representations: impl IntoIterator<Item = FakeBlob>) -> Self {
        Self {
            representations: representations.into_iter().collect(),
        }
    }
}

impl ClipboardEntry for FakeEntry {
    type Blob = FakeBlob;

    fn types(&self) -> Vec<String> {
        self.representations.iter().map(|blob| blob.mime_type.clone()).collect()
    }

    async fn get_type(&self, mime_type: &str) -> anyhow::Result<FakeBlob> {
        self.representations
            .iter()
            .find(|blob| blob.mime_type == mime_type)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("type {mime_type} not found"))
    }
}

struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    children: Vec<usize>,
    once_listeners: Vec<(String, OnceHandler)>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            children: Vec::new(),
            once_listeners: Vec::new(),
        }
    }
}

struct State {
    nodes: Vec<Node>,
    body: Option<usize>,
    support: Option<ClipboardSupport>,
    resources: HashMap<String, Result<FakeBlob, String>>,
    clipboard: Vec<FakeEntry>,
    read_error: Option<String>,
    write_error: Option<String>,
    suspend_fetches: bool,
    next_object_url: usize,
    live_object_urls: Vec<String>,
    click_listener: Option<ClickHandler<FakeElement>>,
    click_listener_installs: usize,
    tasks: Vec<LocalTask>,
    log: Vec<String>,
}

#[derive(Clone)]
pub struct FakeElement {
    state: Rc<RefCell<State>>,
    id: usize,
}

impl PartialEq for FakeElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state) && self.id == other.id
    }
}

impl core::fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "<{} #{}>", self.tag(), self.id)
    }
}

impl FakeElement {
    pub fn tag(&self) -> String {
        self.state.borrow().nodes[self.id].tag.clone()
    }

    pub fn children(&self) -> Vec<FakeElement> {
        self.state.borrow().nodes[self.id]
            .children
            .iter()
            .map(|&id| FakeElement {
                state: Rc::clone(&self.state),
                id,
            })
            .collect()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.state.borrow().nodes[self.id]
            .classes
            .iter()
            .any(|existing| existing == class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.state.borrow().nodes[self.id].classes.clone()
    }

    /// Number of one-shot listeners still waiting for `event`.
    pub fn pending_listeners(&self, event: &str) -> usize {
        self.state.borrow().nodes[self.id]
            .once_listeners
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }
}

impl Element for FakeElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.state.borrow().nodes[self.id].attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) -> anyhow::Result<()> {
        self.state.borrow_mut().nodes[self.id]
            .attributes
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn add_class(&self, class: &str) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        let classes = &mut state.nodes[self.id].classes;
        if !classes.iter().any(|existing| existing == class) {
            classes.push(class.to_owned());
        }
        Ok(())
    }

    fn remove_class(&self, class: &str) -> anyhow::Result<()> {
        self.state.borrow_mut().nodes[self.id]
            .classes
            .retain(|existing| existing != class);
        Ok(())
    }

    fn source_url(&self) -> Option<String> {
        let non_empty = |name: &str| self.attribute(name).filter(|value| !value.is_empty());
        non_empty("src").or_else(|| non_empty("href"))
    }

    fn append_child(&self, child: &Self) -> anyhow::Result<()> {
        self.state.borrow_mut().nodes[self.id].children.push(child.id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeHost {
    state: Rc<RefCell<State>>,
}

/// Bridge over `host` with the default configuration.
pub fn bridge(host: &FakeHost) -> ClipboardBridge<FakeHost> {
    ClipboardBridge::new(host.clone(), Config::default()).expect("default configuration is valid")
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeHost {
    /// A document with an empty body and a clipboard supporting binary reads and writes.
    pub fn new() -> Self {
        let state = State {
            nodes: vec![Node::new("body")],
            body: Some(0),
            support: Some(ClipboardSupport::FULL),
            resources: HashMap::new(),
            clipboard: Vec::new(),
            read_error: None,
            write_error: None,
            suspend_fetches: false,
            next_object_url: 0,
            live_object_urls: Vec::new(),
            click_listener: None,
            click_listener_installs: 0,
            tasks: Vec::new(),
            log: Vec::new(),
        };

        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    #[must_use]
    pub fn without_body(self) -> Self {
        self.state.borrow_mut().body = None;
        self
    }

    #[must_use]
    pub fn with_support(self, support: Option<ClipboardSupport>) -> Self {
        self.state.borrow_mut().support = support;
        self
    }

    pub fn body_element(&self) -> FakeElement {
        let id = self.state.borrow().body.expect("document has a body");
        self.element(id)
    }

    /// Creates an element and appends it to `parent`. A `class` attribute populates the class list.
    pub fn append(&self, parent: &FakeElement, tag: &str, attributes: &[(&str, &str)]) -> FakeElement {
        let mut node = Node::new(tag);

        for (name, value) in attributes {
            if *name == "class" {
                node.classes.extend(value.split_whitespace().map(str::to_owned));
            } else {
                node.attributes.insert((*name).to_owned(), (*value).to_owned());
            }
        }

        let id = {
            let mut state = self.state.borrow_mut();
            state.nodes.push(node);
            let id = state.nodes.len() - 1;
            state.nodes[parent.id].children.push(id);
            id
        };

        self.element(id)
    }

    pub fn serve(&self, url: &str, blob: FakeBlob) {
        self.state.borrow_mut().resources.insert(url.to_owned(), Ok(blob));
    }

    pub fn fail_fetch(&self, url: &str, reason: &str) {
        self.state
            .borrow_mut()
            .resources
            .insert(url.to_owned(), Err(reason.to_owned()));
    }

    pub fn set_clipboard(&self, entries: Vec<FakeEntry>) {
        self.state.borrow_mut().clipboard = entries;
    }

    pub fn clipboard(&self) -> Vec<FakeEntry> {
        self.state.borrow().clipboard.clone()
    }

    pub fn deny_clipboard_read(&self, reason: &str) {
        self.state.borrow_mut().read_error = Some(reason.to_owned());
    }

    pub fn deny_clipboard_write(&self, reason: &str) {
        self.state.borrow_mut().write_error = Some(reason.to_owned());
    }

    /// Makes every fetch suspend once before resolving, so that concurrent flows interleave.
    pub fn suspend_fetches(&self) {
        self.state.borrow_mut().suspend_fetches = true;
    }

    /// Delivers a click on `target` to the installed body listener, if any.
    pub fn click(&self, target: &FakeElement) {
        let listener = self.state.borrow().click_listener.clone();

        if let Some(listener) = listener {
            listener(target.clone());
        }
    }

    /// Runs spawned tasks to completion, including tasks spawned while running.
    ///
    /// Tasks are polled round-robin in spawn order: a task that suspends lets the next one progress.
    pub async fn run_tasks(&self) {
        let mut running: Vec<LocalTask> = Vec::new();

        core::future::poll_fn(|cx| loop {
            running.append(&mut self.state.borrow_mut().tasks);

            if running.is_empty() {
                return Poll::Ready(());
            }

            running.retain_mut(|task| task.as_mut().poll(cx).is_pending());

            if !running.is_empty() && self.state.borrow().tasks.is_empty() {
                return Poll::Pending;
            }
        })
        .await;
    }

    /// Fires `event` on `element`, consuming the one-shot listeners waiting for it.
    pub fn fire(&self, element: &FakeElement, event: &str) -> usize {
        let handlers: Vec<OnceHandler> = {
            let mut state = self.state.borrow_mut();
            let listeners = core::mem::take(&mut state.nodes[element.id].once_listeners);
            let (matching, remaining): (Vec<_>, Vec<_>) = listeners.into_iter().partition(|(name, _)| name == event);
            state.nodes[element.id].once_listeners = remaining;
            matching.into_iter().map(|(_, handler)| handler).collect()
        };

        let count = handlers.len();

        for handler in handlers {
            handler();
        }

        count
    }

    pub fn click_listener_installs(&self) -> usize {
        self.state.borrow().click_listener_installs
    }

    pub fn live_object_urls(&self) -> Vec<String> {
        self.state.borrow().live_object_urls.clone()
    }

    pub fn log(&self) -> String {
        self.state.borrow().log.join("\n")
    }

    pub fn count(&self, operation: &str) -> usize {
        self.state
            .borrow()
            .log
            .iter()
            .filter(|line| line.split_whitespace().next() == Some(operation))
            .count()
    }

    fn element(&self, id: usize) -> FakeElement {
        FakeElement {
            state: Rc::clone(&self.state),
            id,
        }
    }

    fn record(&self, line: String) {
        self.state.borrow_mut().log.push(line);
    }

    fn preorder(&self, root: usize) -> Vec<usize> {
        let state = self.state.borrow();
        let mut order = Vec::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(state.nodes[id].children.iter().rev());
        }

        order
    }
}

impl Host for FakeHost {
    type Element = FakeElement;
    type Blob = FakeBlob;
    type Entry = FakeEntry;

    fn body(&self) -> Option<FakeElement> {
        let body = self.state.borrow().body;
        body.map(|id| self.element(id))
    }

    fn clipboard_support(&self) -> Option<ClipboardSupport> {
        self.state.borrow().support
    }

    fn query_selector(&self, selector: &str) -> Result<Option<FakeElement>, SelectorError> {
        let compound = Compound::parse(selector).map_err(|reason| SelectorError::new(selector, reason))?;

        let Some(body) = self.state.borrow().body else {
            return Ok(None);
        };

        let found = self.preorder(body).into_iter().find(|&id| {
            let state = self.state.borrow();
            compound.matches(&state.nodes[id])
        });

        Ok(found.map(|id| self.element(id)))
    }

    fn create_image(&self) -> anyhow::Result<FakeElement> {
        let id = {
            let mut state = self.state.borrow_mut();
            state.nodes.push(Node::new("img"));
            state.nodes.len() - 1
        };

        Ok(self.element(id))
    }

    fn create_object_url(&self, blob: &FakeBlob) -> anyhow::Result<String> {
        let url = {
            let mut state = self.state.borrow_mut();
            state.next_object_url += 1;
            let url = format!("blob:fake/{}", state.next_object_url);
            state.live_object_urls.push(url.clone());
            url
        };

        self.record(format!("createObjectURL {url} {}", blob.mime_type));

        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        self.state.borrow_mut().live_object_urls.retain(|live| live != url);
        self.record(format!("revokeObjectURL {url}"));
    }

    fn listen_once(&self, element: &FakeElement, event: &str, handler: OnceHandler) -> anyhow::Result<()> {
        self.state.borrow_mut().nodes[element.id]
            .once_listeners
            .push((event.to_owned(), handler));
        Ok(())
    }

    fn set_click_listener(&self, body: &FakeElement, handler: ClickHandler<FakeElement>) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();

        anyhow::ensure!(state.body == Some(body.id), "click listener must go on the body");

        state.click_listener = Some(handler);
        state.click_listener_installs += 1;

        Ok(())
    }

    fn spawn(&self, task: LocalTask) {
        self.state.borrow_mut().tasks.push(task);
    }

    async fn fetch(&self, url: &str) -> anyhow::Result<BinaryItem<FakeBlob>> {
        self.record(format!("fetch {url}"));

        let suspend = self.state.borrow().suspend_fetches;
        if suspend {
            YieldNow(false).await;
        }

        let resource = self.state.borrow().resources.get(url).cloned();

        match resource {
            Some(Ok(blob)) => Ok(BinaryItem::new(blob)),
            Some(Err(reason)) => Err(anyhow::anyhow!("{reason}")),
            None => Err(anyhow::anyhow!("failed to fetch {url}")),
        }
    }

    async fn write_clipboard(&self, items: Vec<BinaryItem<FakeBlob>>) -> anyhow::Result<()> {
        let description = items
            .iter()
            .map(|item| format!("{} ({} bytes)", item.mime_type, item.blob.bytes.len()))
            .collect::<Vec<_>>()
            .join(", ");
        self.record(format!("write [{description}]"));

        let mut state = self.state.borrow_mut();

        if let Some(reason) = &state.write_error {
            anyhow::bail!("{reason}");
        }

        if let Some(item) = items
            .iter()
            .find(|item| !WRITABLE_TYPES.contains(&item.mime_type.as_str()))
        {
            anyhow::bail!("type {} not supported on write", item.mime_type);
        }

        state.clipboard = items.into_iter().map(|item| FakeEntry::new([item.blob])).collect();

        Ok(())
    }

    async fn read_clipboard(&self) -> anyhow::Result<Vec<FakeEntry>> {
        self.record("read".to_owned());

        let state = self.state.borrow();

        if let Some(reason) = &state.read_error {
            anyhow::bail!("{reason}");
        }

        Ok(state.clipboard.clone())
    }
}

/// Returns `Pending` once, waking itself right away.
struct YieldNow(bool);

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }

        self.0 = true;
        cx.waker().wake_by_ref();

        Poll::Pending
    }
}

/// `tag`, `#id` and `.class` parts of a single compound selector.
#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(selector: &str) -> Result<Self, String> {
        let selector = selector.trim();

        if selector.is_empty() {
            return Err("empty selector".to_owned());
        }

        let mut compound = Compound::default();
        let mut chars = selector.chars().peekable();

        if chars.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            compound.tag = Some(take_ident(&mut chars).to_ascii_lowercase());
        }

        while let Some(marker) = chars.next() {
            let ident = take_ident(&mut chars);

            if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
                return Err(format!("expected identifier after `{marker}`"));
            }

            match marker {
                '#' => compound.id = Some(ident),
                '.' => compound.classes.push(ident),
                other => return Err(format!("unexpected character `{other}`")),
            }
        }

        return Ok(compound);

        fn take_ident(chars: &mut core::iter::Peekable<core::str::Chars<'_>>) -> String {
            let mut ident = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    ident.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            ident
        }
    }

    fn matches(&self, node: &Node) -> bool {
        self.tag.as_ref().is_none_or(|tag| *tag == node.tag)
            && self
                .id
                .as_ref()
                .is_none_or(|id| node.attributes.get("id") == Some(id))
            && self
                .classes
                .iter()
                .all(|class| node.classes.iter().any(|existing| existing == class))
    }
}
