//! Built notification model and id assignment

use chrono::Utc;
use image::DynamicImage;

/// Expanded presentation variant.
#[derive(Debug, Clone)]
pub enum NotificationStyle {
    /// Extended text when the user expands the notification.
    BigText,
    /// Fetched image attached as the expanded view.
    BigPicture(DynamicImage),
}

impl NotificationStyle {
    pub fn is_big_picture(&self) -> bool {
        matches!(self, NotificationStyle::BigPicture(_))
    }
}

/// Priority hint for platforms that predate channels. Every notification
/// this crate builds is heads-up, so only the high hint exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
}

/// One notification, ready to post. Ephemeral; gone once dismissed or
/// replaced by a later post under the same id.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub style: NotificationStyle,
    /// Carried as an extra on the tap intent so the host activity can route
    /// navigation; no extra is attached when absent.
    pub action_url: Option<String>,
    pub auto_cancel: bool,
    pub priority: Priority,
}

/// Source of notification ids.
///
/// Replaceable so hosts can swap in a collision-free scheme; the default
/// reproduces the original wall-clock scheme, collisions included.
pub trait NotificationIdScheme: Send + Sync {
    fn next_id(&self) -> u32;
}

/// `base + (now_millis % modulus)`.
///
/// Low-cardinality by construction: two notifications landing in the same
/// modulo bucket share an id and the later one replaces the earlier.
#[derive(Debug, Clone)]
pub struct WallClockIdScheme {
    base: u32,
    modulus: u32,
}

impl WallClockIdScheme {
    pub fn new(base: u32, modulus: u32) -> Self {
        Self {
            base,
            // a zero modulus would divide by zero below
            modulus: modulus.max(1),
        }
    }
}

impl NotificationIdScheme for WallClockIdScheme {
    fn next_id(&self) -> u32 {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        self.base + (millis % u64::from(self.modulus)) as u32
    }
}
