use std::rc::Rc;

use crate::{ClickHandler, ClipboardSupport, Config, ConfigError, Element, Host, Request, RequestKind};

const ANIMATION_END: &str = "animationend";

/// How a dispatched click ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The clicked element is not a trigger.
    Ignored,
    /// The flow reported failure; nothing visible happened.
    Failed(RequestKind),
    /// The flow succeeded and the done state was applied.
    Done(RequestKind),
}

/// Wires trigger elements of a page to the host clipboard.
///
/// Cloning is cheap; all clones share the same host handle and configuration.
pub struct ClipboardBridge<H: Host> {
    inner: Rc<BridgeInner<H>>,
}

struct BridgeInner<H> {
    host: H,
    config: Config,
}

impl<H: Host> Clone for ClipboardBridge<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: Host> ClipboardBridge<H> {
    pub fn new(host: H, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            inner: Rc::new(BridgeInner { host, config }),
        })
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Marks the body with the activation classes and installs the click listener.
    ///
    /// Safe to call repeatedly: the listener installed by a previous call is replaced. Returns
    /// `None` without touching the page when there is no body or no clipboard.
    pub fn initialize(&self) -> Option<ClipboardSupport> {
        let host = self.host();
        let config = self.config();

        let Some(body) = host.body() else {
            debug!("No document body, clipboard bridge disabled");
            return None;
        };

        let Some(support) = host.clipboard_support() else {
            debug!("No clipboard available, clipboard bridge disabled");
            return None;
        };

        if support.write {
            if let Err(e) = body.add_class(&config.copy.active_class) {
                warn!("Failed to mark body as copy-active: {e:#}");
            }
        }

        if support.read {
            if let Err(e) = body.add_class(&config.paste.active_class) {
                warn!("Failed to mark body as paste-active: {e:#}");
            }
        }

        let bridge = self.clone();
        let handler: ClickHandler<H::Element> = Rc::new(move |target: H::Element| {
            let host = bridge.host().clone();
            let bridge = bridge.clone();
            host.spawn(Box::pin(async move {
                bridge.dispatch(target).await;
            }));
        });

        if let Err(e) = host.set_click_listener(&body, handler) {
            warn!("Failed to install click listener: {e:#}");
        }

        debug!(
            copy = support.write,
            paste = support.read,
            "Clipboard bridge initialized"
        );

        Some(support)
    }

    /// Runs the flow requested by a click on `target`, then applies the done state on success.
    pub async fn dispatch(&self, target: H::Element) -> DispatchOutcome {
        let Some(request) = Request::from_element(&target, self.config()) else {
            return DispatchOutcome::Ignored;
        };

        trace!(kind = %request.kind, selector = %request.selector, "Dispatching");

        let select = self.resolve(&request.selector);

        let succeeded = match request.kind {
            RequestKind::Copy => self.copy(select.as_ref()).await,
            RequestKind::Paste => self.paste(select.as_ref()).await.is_some(),
        };

        if !succeeded {
            return DispatchOutcome::Failed(request.kind);
        }

        self.show_done(&target, request.kind);

        DispatchOutcome::Done(request.kind)
    }

    /// Copies the resource behind `select` (its `src`, else its `href`) to the clipboard.
    ///
    /// Returns `false` without side effects when `select` is absent or has no resource location,
    /// and `false` after logging when fetching or writing fails.
    pub async fn copy(&self, select: Option<&H::Element>) -> bool {
        crate::copy::copy(self.host(), select).await
    }

    /// Reads the clipboard, appending an image to `select` for every image type offered.
    ///
    /// Returns the payload retrieved last across all items and types, or `None` when the
    /// clipboard is empty or reading fails.
    pub async fn paste(&self, select: Option<&H::Element>) -> Option<H::Blob> {
        crate::paste::paste(self.host(), select).await
    }

    fn resolve(&self, selector: &str) -> Option<H::Element> {
        if selector.is_empty() {
            return None;
        }

        match self.host().query_selector(selector) {
            Ok(element) => element,
            Err(e) => {
                debug!("{e}");
                None
            }
        }
    }

    fn show_done(&self, target: &H::Element, kind: RequestKind) {
        let config = self.config();

        // An explicit message, even an empty one, is never overwritten.
        if target.attribute(&config.done_attribute).is_none() {
            if let Err(e) = target.set_attribute(&config.done_attribute, &config.kind(kind).done_message) {
                warn!("Failed to set done message: {e:#}");
            }
        }

        let done_class = config.done_class.clone();
        let animated = target.clone();
        let on_animation_end = Box::new(move || {
            if let Err(e) = animated.remove_class(&done_class) {
                warn!("Failed to clear done state: {e:#}");
            }
        });

        if let Err(e) = self.host().listen_once(target, ANIMATION_END, on_animation_end) {
            warn!("Failed to watch for animation end: {e:#}");
        }

        if let Err(e) = target.add_class(&config.done_class) {
            warn!("Failed to set done state: {e:#}");
        }
    }
}
