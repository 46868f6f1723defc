//! Engine options and typed access to configuration attributes.
//!
//! Collaborators configure widgets through attributes on the widget root
//! (`data-max-file-size`, `data-min-date`, `maxlength`, ...). Invalid values
//! never abort enhancement: [`attr_or`] logs them and falls back to the
//! widget's default.

use crate::dom::{Document, NodeId};
use chrono::{Local, NaiveDate};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// A configuration attribute held a value that does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid `{attr}` value `{value}`: {reason}")]
pub struct ConfigError {
    /// Attribute name.
    pub attr: String,
    /// Raw attribute value.
    pub value: String,
    /// Parser message.
    pub reason: String,
}

/// Configuration options for an [`Engine`](crate::Engine).
///
/// All fields have sensible defaults (see [`Default`] impl). Use struct
/// update syntax to override only the options you need:
///
/// ```rust,ignore
/// use std::time::Duration;
/// use uplift_core::EngineOptions;
///
/// let opts = EngineOptions {
///     scan_delay: Duration::from_millis(50),
///     ..EngineOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Delay between a structural insertion and the scan of the inserted subtree (default: 20ms).
    pub scan_delay: Duration,
    /// Debounce window for screen-reader status updates (default: 1s).
    pub announce_delay: Duration,
    /// Fixed "today" for date widgets; `None` uses the local clock.
    pub today: Option<NaiveDate>,
    /// Attribute prefix of the per-type enhanced marker (default: `data-enhanced-`).
    pub marker_prefix: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            scan_delay: Duration::from_millis(20),
            announce_delay: Duration::from_millis(1000),
            today: None,
            marker_prefix: "data-enhanced-".to_string(),
        }
    }
}

impl EngineOptions {
    /// Today's date.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Name of the enhanced-marker attribute for `kind`.
    pub fn marker(&self, kind: &str) -> String {
        format!("{}{}", self.marker_prefix, kind)
    }
}

/// Parse attribute `name` of `node` as `T`. `Ok(None)` when the attribute is absent or blank.
pub fn attr<T>(doc: &Document, node: NodeId, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match doc.attr(node, name).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| ConfigError {
            attr: name.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Parse attribute `name` as `T`, logging and returning `default` when it is invalid.
pub fn attr_or<T>(doc: &Document, node: NodeId, name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match attr(doc, node, name) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(err) => {
            log::warn!("{node}: {err}; using default");
            default
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date attribute.
pub fn date_attr(doc: &Document, node: NodeId, name: &str) -> Result<Option<NaiveDate>, ConfigError> {
    match doc.attr(node, name).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| ConfigError {
                attr: name.to_string(),
                value: raw.to_string(),
                reason: e.to_string(),
            }),
    }
}

/// Whether a boolean attribute is switched on (`""`, `"true"` or the attribute name).
pub fn flag(doc: &Document, node: NodeId, name: &str) -> bool {
    match doc.attr(node, name).map(str::trim) {
        Some(value) => value.is_empty() || value.eq_ignore_ascii_case("true") || value == name,
        None => false,
    }
}
