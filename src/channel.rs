//! Notification channel metadata and startup provisioning

use crate::backend::NotificationBackend;
use crate::config::RendererConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Channel importance as exposed by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Importance {
    Min,
    Low,
    Default,
    High,
}

/// How much of a notification is shown on the lock screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockscreenVisibility {
    Public,
    Private,
    Secret,
}

/// Full metadata for one notification channel.
///
/// Importance is immutable once the platform has created the channel; the
/// only way to change it is delete-then-recreate (see
/// [`ChannelProvisioner`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
    pub vibration: bool,
    pub lights: bool,
    pub show_badge: bool,
    pub lockscreen_visibility: LockscreenVisibility,
    pub bypass_dnd: bool,
}

impl ChannelSpec {
    /// The heads-up channel every rendered notification is posted under.
    pub fn high_importance(config: &RendererConfig) -> Self {
        Self {
            id: config.channel_id.clone(),
            name: config.channel_name.clone(),
            description: config.channel_description.clone(),
            importance: Importance::High,
            vibration: true,
            lights: true,
            show_badge: true,
            lockscreen_visibility: LockscreenVisibility::Public,
            bypass_dnd: false,
        }
    }
}

/// One-shot channel setup, run once per application start.
///
/// A channel created at lower importance in an earlier app version cannot be
/// upgraded in place, so provisioning deletes the legacy and target ids
/// before recreating the target at HIGH importance. Already-visible
/// notifications are unaffected; that is platform behavior.
pub struct ChannelProvisioner {
    config: RendererConfig,
    backend: Arc<dyn NotificationBackend>,
}

impl ChannelProvisioner {
    pub fn new(config: RendererConfig, backend: Arc<dyn NotificationBackend>) -> Self {
        Self { config, backend }
    }

    /// Delete-then-recreate the target channel at HIGH importance.
    /// Idempotent; a missing backend is a logged no-op.
    pub fn ensure_high_importance_channel(&self) {
        for id in [&self.config.legacy_channel_id, &self.config.channel_id] {
            if let Err(e) = self.backend.delete_channel(id) {
                tracing::warn!(error = %e, channel_id = %id, "could not delete channel");
            }
        }

        let spec = ChannelSpec::high_importance(&self.config);
        if let Err(e) = self.backend.create_channel(&spec) {
            tracing::warn!(error = %e, channel_id = %spec.id, "could not create channel");
        }
    }
}
