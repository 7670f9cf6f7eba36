//! Opaque action payloads handed to the downstream executor.
//!
//! A terminal menu entry carries a base64-encoded JSON document describing
//! what selecting it should do. The encoding is reversible; [`Action::decode`]
//! exists so the executor (and tests) can round-trip payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Copy `value` to the clipboard.
    Clipboard,
    /// Open `value` in the browser.
    Url,
    /// Open the INSPIRE record page for the id in `value`.
    InspireRecord,
    /// Wipe all cached search results.
    ClearCache,
}

/// Desktop notification shown by the executor after the action runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

#[derive(Error, Debug)]
pub enum ActionDecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid action JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Action {
    pub fn url(value: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Url,
            value: value.into(),
            notification: None,
        }
    }

    pub fn record_page(id: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::InspireRecord,
            value: id.into(),
            notification: None,
        }
    }

    pub fn clipboard(value: impl Into<String>, notification: Notification) -> Self {
        Self {
            kind: ActionKind::Clipboard,
            value: value.into(),
            notification: Some(notification),
        }
    }

    pub fn clear_cache(notification: Notification) -> Self {
        Self {
            kind: ActionKind::ClearCache,
            value: String::new(),
            notification: Some(notification),
        }
    }

    /// Encode as base64(JSON) for the feedback document.
    pub fn encode(&self) -> String {
        STANDARD.encode(serde_json::to_vec(self).unwrap_or_default())
    }

    /// Decode a payload produced by [`Action::encode`].
    pub fn decode(payload: &str) -> Result<Self, ActionDecodeError> {
        let bytes = STANDARD.decode(payload)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
