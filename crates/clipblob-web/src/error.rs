use clipblob::ConfigError;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipblobErrorKind {
    /// Catch-all error kind
    General,
    /// Configuration object could not be parsed or is inconsistent
    InvalidConfig,
    /// No window or document to attach to
    Unsupported,
}

#[wasm_bindgen]
pub struct ClipblobError {
    kind: ClipblobErrorKind,
    source: anyhow::Error,
}

impl ClipblobError {
    pub(crate) fn with_kind(mut self, kind: ClipblobErrorKind) -> Self {
        self.kind = kind;
        self
    }
}

#[wasm_bindgen]
impl ClipblobError {
    pub fn backtrace(&self) -> String {
        format!("{:?}", self.source)
    }

    pub fn kind(&self) -> ClipblobErrorKind {
        self.kind
    }
}

impl From<ConfigError> for ClipblobError {
    fn from(e: ConfigError) -> Self {
        Self {
            kind: ClipblobErrorKind::InvalidConfig,
            source: anyhow::Error::new(e),
        }
    }
}

impl From<serde_wasm_bindgen::Error> for ClipblobError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Self {
            kind: ClipblobErrorKind::InvalidConfig,
            source: anyhow::Error::msg(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for ClipblobError {
    fn from(e: anyhow::Error) -> Self {
        Self {
            kind: ClipblobErrorKind::General,
            source: e,
        }
    }
}

/// Converts a thrown JavaScript value into an error carrying its debug representation.
pub(crate) fn js_error(value: JsValue) -> anyhow::Error {
    anyhow::Error::msg(format!("{value:?}"))
}
