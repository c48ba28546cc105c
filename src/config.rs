//! Renderer configuration
//!
//! Everything that was a compile-time constant in earlier iterations
//! (channel ids, the notification id base) is carried here so hosts and
//! tests can vary it without touching global state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration injected into the renderer and the channel provisioner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Channel id notifications are posted under.
    pub channel_id: String,
    /// Channel id used by older app versions, deleted during provisioning.
    pub legacy_channel_id: String,
    /// User-visible channel name.
    pub channel_name: String,
    /// User-visible channel description.
    pub channel_description: String,
    /// Base added to every computed notification id.
    pub base_notification_id: u32,
    /// Range of the time-derived id offset (ids fall in
    /// `base..base + modulus`).
    pub id_modulus: u32,
    /// Upper bound on the image fetch. `None` leaves the fetch unbounded.
    pub fetch_timeout: Option<Duration>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            channel_id: "default_high".to_string(),
            legacy_channel_id: "default".to_string(),
            channel_name: "Notifications".to_string(),
            channel_description: "Push notifications".to_string(),
            base_notification_id: 1000,
            id_modulus: 10_000,
            fetch_timeout: Some(Duration::from_secs(10)),
        }
    }
}
