use core::fmt;

use serde::Deserialize;

use crate::RequestKind;

/// Names and messages used by one kind of trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindConfig {
    /// Attribute holding the target selector, e.g. `data-copyblob`.
    pub attribute: String,
    /// Class added to the body when the matching clipboard operation is available.
    pub active_class: String,
    /// Message stored in the done attribute after the first success.
    pub done_message: String,
}

impl KindConfig {
    pub fn copy() -> Self {
        Self {
            attribute: "data-copyblob".to_owned(),
            active_class: "copyblobactive".to_owned(),
            done_message: "copied".to_owned(),
        }
    }

    pub fn paste() -> Self {
        Self {
            attribute: "data-pasteblob".to_owned(),
            active_class: "pasteblobactive".to_owned(),
            done_message: "pasted".to_owned(),
        }
    }

    fn apply(&mut self, overrides: KindOverrides) {
        if let Some(attribute) = overrides.attribute {
            self.attribute = attribute;
        }

        if let Some(active_class) = overrides.active_class {
            self.active_class = active_class;
        }

        if let Some(done_message) = overrides.done_message {
            self.done_message = done_message;
        }
    }
}

/// Immutable configuration of a [`ClipboardBridge`](crate::ClipboardBridge).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub copy: KindConfig,
    pub paste: KindConfig,
    /// Class pulsed on a trigger after a successful action.
    pub done_class: String,
    /// Attribute receiving the default done message.
    pub done_attribute: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            copy: KindConfig::copy(),
            paste: KindConfig::paste(),
            done_class: "done".to_owned(),
            done_attribute: "data-done".to_owned(),
        }
    }
}

impl Config {
    pub fn kind(&self, kind: RequestKind) -> &KindConfig {
        match kind {
            RequestKind::Copy => &self.copy,
            RequestKind::Paste => &self.paste,
        }
    }

    /// Returns a copy of this configuration with every provided key replaced.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(copy) = overrides.copy {
            self.copy.apply(copy);
        }

        if let Some(paste) = overrides.paste {
            self.paste.apply(paste);
        }

        if let Some(done_class) = overrides.done_class {
            self.done_class = done_class;
        }

        if let Some(done_attribute) = overrides.done_attribute {
            self.done_attribute = done_attribute;
        }

        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("copy.attribute", &self.copy.attribute),
            ("copy.activeClass", &self.copy.active_class),
            ("paste.attribute", &self.paste.attribute),
            ("paste.activeClass", &self.paste.active_class),
            ("doneClass", &self.done_class),
            ("doneAttribute", &self.done_attribute),
        ];

        for (field, value) in names {
            if value.is_empty() {
                return Err(ConfigError::Empty { field });
            }

            if value.chars().any(char::is_whitespace) {
                return Err(ConfigError::Whitespace {
                    field,
                    value: value.clone(),
                });
            }
        }

        let attributes = [&self.copy.attribute, &self.paste.attribute, &self.done_attribute];

        for (idx, attribute) in attributes.iter().enumerate() {
            if attributes[idx + 1..].contains(attribute) {
                return Err(ConfigError::DuplicateAttribute((*attribute).clone()));
            }
        }

        Ok(())
    }
}

/// Partial configuration, as provided by JavaScript callers.
///
/// Every key is optional and missing keys keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigOverrides {
    pub copy: Option<KindOverrides>,
    pub paste: Option<KindOverrides>,
    pub done_class: Option<String>,
    pub done_attribute: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KindOverrides {
    pub attribute: Option<String>,
    pub active_class: Option<String>,
    pub done_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Empty { field: &'static str },
    Whitespace { field: &'static str, value: String },
    DuplicateAttribute(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Empty { field } => write!(f, "`{field}` must not be empty"),
            ConfigError::Whitespace { field, value } => {
                write!(f, "`{field}` must not contain whitespace (got {value:?})")
            }
            ConfigError::DuplicateAttribute(attribute) => {
                write!(f, "attribute `{attribute}` is used for more than one purpose")
            }
        }
    }
}

impl core::error::Error for ConfigError {}
