#![cfg_attr(doc, doc = include_str!("../README.md"))]

// Silence the unused_crate_dependencies lint.
// This crate is added just to enable additional WASM features.
extern crate time as _;

#[macro_use]
extern crate tracing;

mod error;
mod host;
mod sys;

use core::cell::RefCell;

use clipblob::{ClipboardBridge, Config, ConfigOverrides, Host as _};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast as _;
use web_sys::Event;

pub use crate::error::{ClipblobError, ClipblobErrorKind};
use crate::host::WebHost;

thread_local! {
    static CONFIG: RefCell<Config> = RefCell::new(Config::default());
}

/// Sets up the panic hook and the console logger.
///
/// `log_level` is one of `error`, `warn`, `info`, `debug` or `trace`, and replaces the `warn`
/// level installed when the module starts. Any other value keeps the current level.
#[wasm_bindgen]
pub fn clipblob_init(log_level: &str) {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    //
    // For more details see
    // https://github.com/rustwasm/console_error_panic_hook#readme
    #[cfg(feature = "panic_hook")]
    console_error_panic_hook::set_once();

    match log_level.parse::<tracing::Level>() {
        Ok(level) => set_log_level(level),
        Err(_) => warn!("Unknown log level {log_level:?}"),
    }
}

/// Installs the console logger on first use, then only adjusts its level.
fn set_log_level(level: tracing::Level) {
    use std::sync::OnceLock;

    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::fmt::time::UtcTime;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{reload, Registry};
    use tracing_web::MakeConsoleWriter;

    static LEVEL: OnceLock<reload::Handle<LevelFilter, Registry>> = OnceLock::new();

    let mut installed = false;

    let handle = LEVEL.get_or_init(|| {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_timer(UtcTime::rfc_3339()) // std::time is not available in browsers
            .with_writer(MakeConsoleWriter);

        let (level_filter, handle) = reload::Layer::new(LevelFilter::from_level(level));

        tracing_subscriber::registry().with(level_filter).with(fmt_layer).init();
        installed = true;

        handle
    });

    if !installed {
        if let Err(e) = handle.reload(LevelFilter::from_level(level)) {
            warn!("Failed to change log level: {e}");
        }
    }
}

/// (Re)initializes the clipboard triggers of the page with the current configuration.
///
/// Safe to call again after content has been injected: the click listener is replaced, not added twice.
#[wasm_bindgen]
pub fn init() {
    let host = match WebHost::new() {
        Ok(host) => host,
        Err(e) => {
            debug!("Clipboard bridge not initialized: {e:#}");
            return;
        }
    };

    let config = CONFIG.with(|config| config.borrow().clone());

    match ClipboardBridge::new(host, config) {
        Ok(bridge) => {
            bridge.initialize();
        }
        Err(e) => {
            // Configurations are validated before being stored.
            error!("Invalid stored configuration: {e}");
        }
    }
}

/// Replaces the configuration with `config` applied over the defaults, then calls [`init`].
///
/// `config` is a plain object such as `{ paste: { doneMessage: "inserted" }, doneClass: "flash" }`.
/// Missing keys keep their default value; unknown keys are rejected.
#[wasm_bindgen(js_name = initWithConfig)]
pub fn init_with_config(config: JsValue) -> Result<(), ClipblobError> {
    let overrides: ConfigOverrides = if config.is_undefined() || config.is_null() {
        ConfigOverrides::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };

    let config = Config::default().with_overrides(overrides);
    config.validate()?;

    CONFIG.with(|current| *current.borrow_mut() = config);

    init();

    Ok(())
}

/// Reports which binary clipboard operations are available right now, as `{ write, read }`.
#[wasm_bindgen]
pub fn capabilities() -> Result<JsValue, ClipblobError> {
    let host = WebHost::new().map_err(|e| ClipblobError::from(e).with_kind(ClipblobErrorKind::Unsupported))?;

    let support = host.clipboard_support().unwrap_or_default();

    serde_wasm_bindgen::to_value(&support).map_err(ClipblobError::from)
}

#[wasm_bindgen(start)]
pub fn start() {
    // Copy and paste failures reach the console even if the page never calls `clipblob_init`.
    set_log_level(clipblob::DEFAULT_LOG_LEVEL);

    let host = match WebHost::new() {
        Ok(host) => host,
        Err(_) => return,
    };

    let document = host.document();

    if document.ready_state() != "loading" {
        // The module may be instantiated after DOMContentLoaded already fired.
        init();
        return;
    }

    let on_ready = Closure::once_into_js(move |_: Event| init());

    if let Err(e) = document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref()) {
        warn!("Failed to wait for DOMContentLoaded: {e:?}");
    }
}
