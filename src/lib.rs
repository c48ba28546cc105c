//! Rendering bridge between a push-delivery transport and the OS
//! notification surface.
//!
//! The transport hands one [`message::InboundMessage`] per delivery to
//! [`renderer::NotificationRenderer::handle_message`]. Standard payloads are
//! delegated back to the transport untouched; data-only payloads are
//! rendered into a big-text or big-picture notification and posted through
//! the host's [`backend::NotificationBackend`] implementation.
//! [`channel::ChannelProvisioner`] runs once at startup to repair the
//! notification channel at HIGH importance.

pub mod backend;
pub mod channel;
pub mod config;
pub mod fetch;
pub mod message;
pub mod notification;
pub mod renderer;
pub mod test_helpers;

pub use backend::{BackendError, NotificationBackend, StandardNotificationDelegate};
pub use channel::{ChannelProvisioner, ChannelSpec, Importance, LockscreenVisibility};
pub use config::RendererConfig;
pub use fetch::{FetchError, HttpImageFetcher, ImageFetcher};
pub use message::{Classification, InboundMessage, RenderFields, StandardNotification};
pub use notification::{
    Notification, NotificationIdScheme, NotificationStyle, Priority, WallClockIdScheme,
};
pub use renderer::NotificationRenderer;
