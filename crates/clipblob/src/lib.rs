#![cfg_attr(doc, doc = include_str!("../README.md"))]

#[macro_use]
extern crate tracing;

mod bridge;
mod config;
mod copy;
mod host;
mod paste;
mod request;

pub use bridge::{ClipboardBridge, DispatchOutcome};
pub use config::{Config, ConfigError, ConfigOverrides, KindConfig, KindOverrides};
pub use host::{
    BinaryItem, Blob, ClickHandler, ClipboardEntry, ClipboardSupport, Element, Host, LocalTask, OnceHandler,
    SelectorError,
};
pub use request::{Request, RequestKind};

/// Level at which copy and paste failures are reported; used when the page never chooses one.
pub const DEFAULT_LOG_LEVEL: tracing::Level = tracing::Level::WARN;
