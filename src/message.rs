//! Inbound message model and payload classification
//!
//! A delivery either carries a pre-rendered notification object (handled
//! entirely by the transport SDK) or is data-only, in which case the fields
//! used for manual rendering are pulled out of the key/value map here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Title used when a data-only payload carries none.
pub const DEFAULT_TITLE: &str = "Notification";

/// One message as handed over by the push-delivery transport.
///
/// Lives for the duration of a single delivery callback; never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Pre-rendered notification object, present for standard payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<StandardNotification>,
    /// Application key/value data.
    #[serde(default)]
    pub data: HashMap<String, String>,
}

/// The notification object of a standard payload, as parsed by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardNotification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Outcome of classifying an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The transport's default handling applies; this crate renders nothing.
    Standard,
    /// Data-only payload; render from the extracted fields.
    DataOnly(RenderFields),
}

/// Fields driving manual rendering, derived from the data map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFields {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub action_url: Option<String>,
}

impl RenderFields {
    /// Extract render fields from a payload data map. Missing keys resolve
    /// to defaults; this never fails.
    pub fn from_data(data: &HashMap<String, String>) -> Self {
        Self {
            title: data
                .get("title")
                .cloned()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: data.get("body").cloned().unwrap_or_default(),
            image_url: data.get("image").cloned(),
            action_url: data.get("action_url").cloned(),
        }
    }
}

impl InboundMessage {
    /// Decide how this message is rendered: delegated to the transport
    /// (standard payload) or rendered manually from the data map.
    pub fn classify(&self) -> Classification {
        if self.notification.is_some() {
            Classification::Standard
        } else {
            Classification::DataOnly(RenderFields::from_data(&self.data))
        }
    }
}
