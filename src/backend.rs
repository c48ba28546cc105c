//! Capability traits at the platform seam
//!
//! The OS notification surface and the transport's own standard-payload
//! handling are collaborators the renderer calls into, not code this crate
//! owns. Hosts implement these traits against the real platform APIs.

use crate::channel::ChannelSpec;
use crate::message::InboundMessage;
use crate::notification::Notification;
use thiserror::Error;

/// Errors surfaced by a notification backend.
///
/// The renderer never propagates these to its caller; a failing backend
/// means the notification is logged and dropped.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("notification service unavailable")]
    Unavailable,
    #[error("backend error: {0}")]
    Other(String),
}

/// The OS notification surface.
///
/// Implementations are expected to mirror platform channel semantics:
/// creating a channel whose id already exists must leave the existing
/// channel untouched (importance is immutable in place), and posting under
/// an id that is already visible replaces that notification.
pub trait NotificationBackend: Send + Sync {
    /// Create a channel if no channel with the same id exists.
    fn create_channel(&self, spec: &ChannelSpec) -> Result<(), BackendError>;

    /// Delete the channel with the given id. Deleting an unknown id is not
    /// an error.
    fn delete_channel(&self, channel_id: &str) -> Result<(), BackendError>;

    /// Post a notification under `(channel_id, notification_id)`.
    fn post(
        &self,
        channel_id: &str,
        notification_id: u32,
        notification: Notification,
    ) -> Result<(), BackendError>;
}

/// The transport layer's own message handling.
///
/// For standard payloads the renderer calls [`handle`](Self::handle) exactly
/// once and takes no further action of its own. Data-only payloads are
/// rendered by this crate and then passed to [`forward`](Self::forward) so
/// the transport's plugin layer still sees the payload data.
#[async_trait::async_trait]
pub trait StandardNotificationDelegate: Send + Sync {
    /// Full handling of a standard payload.
    async fn handle(&self, message: InboundMessage);

    /// Bookkeeping forwarding of a data-only payload after rendering.
    async fn forward(&self, message: InboundMessage);
}
