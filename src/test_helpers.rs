//! A set of helpers for testing
//!
//! In-memory stand-ins for the capability traits, modeling the platform
//! semantics the renderer relies on (create-if-absent channels, posts
//! replacing each other under a shared id).

use crate::backend::{BackendError, NotificationBackend, StandardNotificationDelegate};
use crate::channel::{ChannelSpec, Importance, LockscreenVisibility};
use crate::fetch::{FetchError, ImageFetcher};
use crate::message::InboundMessage;
use crate::notification::{Notification, NotificationIdScheme};
use image::DynamicImage;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

/// One notification as received by the backend.
#[derive(Debug, Clone)]
pub struct PostedNotification {
    pub channel_id: String,
    pub notification_id: u32,
    pub notification: Notification,
}

/// In-memory notification backend.
pub struct MemoryBackend {
    available: bool,
    channels: Mutex<HashMap<String, ChannelSpec>>,
    posted: Mutex<Vec<PostedNotification>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            available: true,
            channels: Mutex::new(HashMap::new()),
            posted: Mutex::new(Vec::new()),
        }
    }

    /// A backend whose every operation fails, as when the platform service
    /// cannot be obtained.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Install a channel directly, bypassing the create-if-absent rule.
    pub fn seed_channel(&self, id: &str, importance: Importance) {
        let spec = ChannelSpec {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            importance,
            vibration: false,
            lights: false,
            show_badge: false,
            lockscreen_visibility: LockscreenVisibility::Private,
            bypass_dnd: false,
        };
        self.channels.lock().unwrap().insert(id.to_string(), spec);
    }

    pub fn channel(&self, id: &str) -> Option<ChannelSpec> {
        self.channels.lock().unwrap().get(id).cloned()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.lock().unwrap().len()
    }

    /// Every post in order, replaced or not.
    pub fn posted(&self) -> Vec<PostedNotification> {
        self.posted.lock().unwrap().clone()
    }

    /// What is currently on screen: the last post per `(channel, id)` pair.
    pub fn visible(&self) -> Vec<Notification> {
        let mut on_screen: HashMap<(String, u32), Notification> = HashMap::new();
        for post in self.posted.lock().unwrap().iter() {
            on_screen.insert(
                (post.channel_id.clone(), post.notification_id),
                post.notification.clone(),
            );
        }
        on_screen.into_values().collect()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBackend for MemoryBackend {
    fn create_channel(&self, spec: &ChannelSpec) -> Result<(), BackendError> {
        if !self.available {
            return Err(BackendError::Unavailable);
        }
        self.channels
            .lock()
            .unwrap()
            .entry(spec.id.clone())
            .or_insert_with(|| spec.clone());
        Ok(())
    }

    fn delete_channel(&self, channel_id: &str) -> Result<(), BackendError> {
        if !self.available {
            return Err(BackendError::Unavailable);
        }
        self.channels.lock().unwrap().remove(channel_id);
        Ok(())
    }

    fn post(
        &self,
        channel_id: &str,
        notification_id: u32,
        notification: Notification,
    ) -> Result<(), BackendError> {
        if !self.available {
            return Err(BackendError::Unavailable);
        }
        self.posted.lock().unwrap().push(PostedNotification {
            channel_id: channel_id.to_string(),
            notification_id,
            notification,
        });
        Ok(())
    }
}

/// Delegate recording the messages handed to it, by path.
pub struct RecordingDelegate {
    handled: Mutex<Vec<InboundMessage>>,
    forwarded: Mutex<Vec<InboundMessage>>,
}

impl RecordingDelegate {
    pub fn new() -> Self {
        Self {
            handled: Mutex::new(Vec::new()),
            forwarded: Mutex::new(Vec::new()),
        }
    }

    pub fn handled_count(&self) -> usize {
        self.handled.lock().unwrap().len()
    }

    pub fn forwarded_count(&self) -> usize {
        self.forwarded.lock().unwrap().len()
    }

    /// Data-only messages forwarded after rendering, in order.
    pub fn forwarded(&self) -> Vec<InboundMessage> {
        self.forwarded.lock().unwrap().clone()
    }
}

impl Default for RecordingDelegate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl StandardNotificationDelegate for RecordingDelegate {
    async fn handle(&self, message: InboundMessage) {
        self.handled.lock().unwrap().push(message);
    }

    async fn forward(&self, message: InboundMessage) {
        self.forwarded.lock().unwrap().push(message);
    }
}

enum StubFetchOutcome {
    Succeed,
    Fail,
    Stall,
}

/// Fetcher with a scripted outcome; counts calls.
pub struct StubFetcher {
    outcome: StubFetchOutcome,
    fetches: AtomicUsize,
}

impl StubFetcher {
    pub fn succeeding() -> Self {
        Self {
            outcome: StubFetchOutcome::Succeed,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: StubFetchOutcome::Fail,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Never resolves, for cancellation tests.
    pub fn stalling() -> Self {
        Self {
            outcome: StubFetchOutcome::Stall,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> Result<DynamicImage, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            StubFetchOutcome::Succeed => Ok(test_image()),
            StubFetchOutcome::Fail => Err(FetchError::Status(StatusCode::NOT_FOUND)),
            StubFetchOutcome::Stall => std::future::pending().await,
        }
    }
}

/// Id scheme that always yields the same id, for collision tests.
pub struct FixedIdScheme {
    id: u32,
}

impl FixedIdScheme {
    pub fn new(id: u32) -> Self {
        Self { id }
    }
}

impl NotificationIdScheme for FixedIdScheme {
    fn next_id(&self) -> u32 {
        self.id
    }
}

/// Id scheme handing out consecutive ids, for collision-free tests.
pub struct SequentialIdScheme {
    next: AtomicU32,
}

impl SequentialIdScheme {
    pub fn new(start: u32) -> Self {
        Self {
            next: AtomicU32::new(start),
        }
    }
}

impl NotificationIdScheme for SequentialIdScheme {
    fn next_id(&self) -> u32 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

/// A 1x1 PNG, the smallest body the fetcher can decode.
pub fn png_bytes() -> Vec<u8> {
    let picture = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(picture)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("encoding a 1x1 png cannot fail");
    buf.into_inner()
}

/// The decoded form of [`png_bytes`].
pub fn test_image() -> DynamicImage {
    image::load_from_memory(&png_bytes()).expect("test png decodes")
}
