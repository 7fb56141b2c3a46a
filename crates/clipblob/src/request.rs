use core::fmt;

use crate::{Config, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Copy,
    Paste,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Copy => f.write_str("copy"),
            RequestKind::Paste => f.write_str("paste"),
        }
    }
}

/// What a single click asks for. Built at click time and consumed by the matching flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub kind: RequestKind,
    pub selector: String,
}

impl Request {
    /// Inspects the trigger attributes of `element`.
    ///
    /// The paste attribute wins when both are present. An element without the attribute of its
    /// kind produces no request, which is how clicks on unrelated elements are ignored.
    pub fn from_element<E: Element>(element: &E, config: &Config) -> Option<Self> {
        let kind = if element.attribute(&config.paste.attribute).is_some() {
            RequestKind::Paste
        } else {
            RequestKind::Copy
        };

        let selector = element.attribute(&config.kind(kind).attribute)?;

        Some(Self { kind, selector })
    }
}
