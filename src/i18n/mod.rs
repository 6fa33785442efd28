//! Message catalogue for Nimbus responses.
//!
//! Services only ever produce [`MessageKey`]s. The transport resolves them
//! to display text through a [`Localizer`], normally an [`I18n`] loaded
//! from `locales/<language>.toml`.
//!
//! # Usage
//!
//! ```no_run
//! use nimbus::envelope::MessageKey;
//! use nimbus::i18n::{I18n, Localizer};
//!
//! let i18n = I18n::load("en", "locales").unwrap();
//! let text = i18n.resolve(MessageKey::LoginSuccessful);
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::envelope::MessageKey;

/// Default locale.
pub const DEFAULT_LOCALE: &str = "en";

/// English catalogue compiled into the binary.
const EMBEDDED_EN: &str = include_str!("../../locales/en.toml");

/// I18n-related errors.
#[derive(Error, Debug)]
pub enum I18nError {
    /// Failed to read locale file.
    #[error("Failed to read locale file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse locale file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Locale not found.
    #[error("Locale not found: {0}")]
    LocaleNotFound(String),
}

/// Result type for i18n operations.
pub type Result<T> = std::result::Result<T, I18nError>;

/// Resolves message keys to display text.
pub trait Localizer: Send + Sync {
    /// Display text for `key`, or the key itself when unknown.
    fn resolve(&self, key: MessageKey) -> String;
}

/// Flat key/value message catalogue for one locale.
#[derive(Debug, Clone)]
pub struct I18n {
    locale: String,
    messages: HashMap<String, String>,
}

impl I18n {
    /// Load the catalogue for `locale` from `locales_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the locale file is missing or cannot be parsed.
    pub fn load<P: AsRef<Path>>(locale: &str, locales_dir: P) -> Result<Self> {
        let path = locales_dir.as_ref().join(format!("{locale}.toml"));

        if !path.exists() {
            return Err(I18nError::LocaleNotFound(locale.to_string()));
        }

        let content = fs::read_to_string(&path)?;
        Self::from_str(locale, &content)
    }

    /// Load a catalogue, falling back to the embedded English messages.
    ///
    /// Keys missing from the loaded catalogue also fall back to English.
    pub fn load_or_embedded<P: AsRef<Path>>(locale: &str, locales_dir: P) -> Self {
        let mut base = Self::embedded();
        match Self::load(locale, locales_dir) {
            Ok(loaded) => {
                base.merge(&loaded);
                base.locale = loaded.locale;
            }
            Err(e) => {
                tracing::warn!(locale, "Failed to load locale, using embedded English: {}", e);
            }
        }
        base
    }

    /// The English catalogue compiled into the binary.
    pub fn embedded() -> Self {
        Self::from_str(DEFAULT_LOCALE, EMBEDDED_EN).unwrap_or_else(|_| Self::empty(DEFAULT_LOCALE))
    }

    /// Create an I18n instance from a TOML string.
    pub fn from_str(locale: &str, content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)?;

        let mut messages = HashMap::new();
        flatten_toml("", &toml::Value::Table(table), &mut messages);

        Ok(Self {
            locale: locale.to_string(),
            messages,
        })
    }

    /// Create an empty catalogue. Every lookup returns the key.
    pub fn empty(locale: &str) -> Self {
        Self {
            locale: locale.to_string(),
            messages: HashMap::new(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Translate a key, returning the key itself if it is not found.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.messages.get(key).map(|s| s.as_str()).unwrap_or(key)
    }

    /// Check if a translation key exists.
    pub fn has_key(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    /// Merge another catalogue into this one, overriding existing keys.
    pub fn merge(&mut self, other: &I18n) {
        for (key, value) in &other.messages {
            self.messages.insert(key.clone(), value.clone());
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::embedded()
    }
}

impl Localizer for I18n {
    fn resolve(&self, key: MessageKey) -> String {
        self.t(key.as_str()).to_string()
    }
}

/// Flatten a TOML value into a map with dot-separated keys.
fn flatten_toml(prefix: &str, value: &toml::Value, map: &mut HashMap<String, String>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_toml(&new_prefix, val, map);
            }
        }
        toml::Value::String(s) => {
            map.insert(prefix.to_string(), s.clone());
        }
        // Only string messages are meaningful here.
        _ => {}
    }
}
