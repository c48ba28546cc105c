//! Notification rendering
//!
//! The renderer is the single entry point the transport invokes per
//! delivery. Standard payloads are delegated wholesale; data-only payloads
//! are rendered into a big-text or big-picture notification and posted
//! through the backend. Nothing on this path returns an error to the
//! caller: every failure degrades to "show less" (text fallback) or "show
//! nothing" (logged drop).

use crate::backend::{NotificationBackend, StandardNotificationDelegate};
use crate::channel::ChannelSpec;
use crate::config::RendererConfig;
use crate::fetch::{HttpImageFetcher, ImageFetcher};
use crate::message::{Classification, InboundMessage, RenderFields};
use crate::notification::{
    Notification, NotificationIdScheme, NotificationStyle, Priority, WallClockIdScheme,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct NotificationRenderer {
    config: RendererConfig,
    backend: Arc<dyn NotificationBackend>,
    delegate: Arc<dyn StandardNotificationDelegate>,
    fetcher: Arc<dyn ImageFetcher>,
    id_scheme: Arc<dyn NotificationIdScheme>,
}

impl NotificationRenderer {
    /// Create a renderer with the default HTTP fetcher and wall-clock id
    /// scheme derived from `config`.
    pub fn new(
        config: RendererConfig,
        backend: Arc<dyn NotificationBackend>,
        delegate: Arc<dyn StandardNotificationDelegate>,
    ) -> Self {
        let fetcher = Arc::new(HttpImageFetcher::new(config.fetch_timeout));
        let id_scheme = Arc::new(WallClockIdScheme::new(
            config.base_notification_id,
            config.id_modulus,
        ));
        Self {
            config,
            backend,
            delegate,
            fetcher,
            id_scheme,
        }
    }

    /// Replace the image fetcher.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace the notification id scheme.
    pub fn with_id_scheme(mut self, id_scheme: Arc<dyn NotificationIdScheme>) -> Self {
        self.id_scheme = id_scheme;
        self
    }

    /// Handle one delivery: delegate standard payloads to the transport,
    /// render data-only payloads. Data-only messages are still forwarded to
    /// the transport afterwards so its plugin layer receives the payload.
    pub async fn handle_message(&self, message: InboundMessage) {
        match message.classify() {
            Classification::Standard => {
                tracing::debug!("standard notification payload, delegating to transport");
                self.delegate.handle(message).await;
            }
            Classification::DataOnly(fields) => {
                self.present(fields).await;
                self.delegate.forward(message).await;
            }
        }
    }

    /// Handle one delivery on a detached task and return a token that
    /// abandons it. Cancellation mid-fetch leaves no partial notification.
    pub fn handle_detached(self: &Arc<Self>, message: InboundMessage) -> CancellationToken {
        let renderer = Arc::clone(self);
        Self::spawn_cancellable(async move { renderer.handle_message(message).await })
    }

    /// Present already-classified fields on a detached task.
    pub fn present_detached(self: &Arc<Self>, fields: RenderFields) -> CancellationToken {
        let renderer = Arc::clone(self);
        Self::spawn_cancellable(async move { renderer.present(fields).await })
    }

    fn spawn_cancellable(work: impl std::future::Future<Output = ()> + Send + 'static) -> CancellationToken {
        let token = CancellationToken::new();
        let task_token = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;

                _ = task_token.cancelled() => {
                    tracing::debug!("presentation cancelled before completion");
                }

                _ = work => {}
            }
        });
        token
    }

    /// Build and post a notification for the given fields.
    pub async fn present(&self, fields: RenderFields) {
        self.ensure_channel();

        let style = match fields.image_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => match self.fetcher.fetch(url).await {
                Ok(picture) => NotificationStyle::BigPicture(picture),
                Err(e) => {
                    tracing::debug!(error = %e, url = %url, "image fetch failed, falling back to big-text style");
                    NotificationStyle::BigText
                }
            },
            None => NotificationStyle::BigText,
        };

        let notification = Notification {
            title: fields.title,
            body: fields.body,
            style,
            action_url: fields.action_url,
            auto_cancel: true,
            priority: Priority::High,
        };

        let notification_id = self.id_scheme.next_id();
        if let Err(e) =
            self.backend
                .post(&self.config.channel_id, notification_id, notification)
        {
            tracing::warn!(error = %e, notification_id, "notification backend unavailable, dropping notification");
        }
    }

    // Create-if-absent; the destructive delete-then-recreate pass belongs to
    // startup provisioning, not the per-message path.
    fn ensure_channel(&self) {
        let spec = ChannelSpec::high_importance(&self.config);
        if let Err(e) = self.backend.create_channel(&spec) {
            tracing::warn!(error = %e, channel_id = %spec.id, "could not ensure notification channel");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Importance;
    use crate::test_helpers::{
        test_image, FixedIdScheme, MemoryBackend, RecordingDelegate, SequentialIdScheme,
        StubFetcher,
    };
    use std::collections::HashMap;
    use std::time::Duration;

    fn renderer_with(
        backend: Arc<MemoryBackend>,
        delegate: Arc<RecordingDelegate>,
        fetcher: Arc<StubFetcher>,
    ) -> Arc<NotificationRenderer> {
        Arc::new(
            NotificationRenderer::new(RendererConfig::default(), backend, delegate)
                .with_fetcher(fetcher)
                .with_id_scheme(Arc::new(SequentialIdScheme::new(1000))),
        )
    }

    fn fields(entries: &[(&str, &str)]) -> RenderFields {
        let data: HashMap<String, String> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RenderFields::from_data(&data)
    }

    #[tokio::test]
    async fn standard_payload_is_delegated_and_nothing_is_posted() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::succeeding());
        let renderer = renderer_with(backend.clone(), delegate.clone(), fetcher.clone());

        let message = InboundMessage {
            notification: Some(crate::message::StandardNotification {
                title: Some("hi".to_string()),
                body: None,
            }),
            data: HashMap::new(),
        };
        renderer.handle_message(message).await;

        assert_eq!(delegate.handled_count(), 1);
        assert_eq!(delegate.forwarded_count(), 0);
        assert!(backend.posted().is_empty());
        assert_eq!(backend.channel_count(), 0);
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn data_only_message_is_forwarded_to_transport_after_rendering() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::succeeding());
        let renderer = renderer_with(backend.clone(), delegate.clone(), fetcher);

        let message = InboundMessage {
            notification: None,
            data: [
                ("title".to_string(), "T".to_string()),
                ("action_url".to_string(), "/orders/42".to_string()),
            ]
            .into_iter()
            .collect(),
        };
        renderer.handle_message(message).await;

        // Rendered by this crate, and the transport's plugin layer still
        // receives the payload data.
        assert_eq!(backend.posted().len(), 1);
        assert_eq!(delegate.handled_count(), 0);
        assert_eq!(delegate.forwarded_count(), 1);
        let forwarded = delegate.forwarded();
        assert_eq!(
            forwarded[0].data.get("action_url").map(String::as_str),
            Some("/orders/42")
        );
    }

    #[tokio::test]
    async fn data_only_without_image_posts_big_text_without_fetching() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::succeeding());
        let renderer = renderer_with(backend.clone(), delegate.clone(), fetcher.clone());

        let message = InboundMessage {
            notification: None,
            data: [
                ("title".to_string(), "T".to_string()),
                ("body".to_string(), "B".to_string()),
            ]
            .into_iter()
            .collect(),
        };
        renderer.handle_message(message).await;

        let posted = backend.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].notification.title, "T");
        assert_eq!(posted[0].notification.body, "B");
        assert!(!posted[0].notification.style.is_big_picture());
        assert_eq!(posted[0].notification.priority, Priority::High);
        assert!(posted[0].notification.auto_cancel);
        assert_eq!(fetcher.fetch_count(), 0);
        assert_eq!(delegate.handled_count(), 0);
    }

    #[tokio::test]
    async fn presenting_ensures_the_high_importance_channel() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::succeeding());
        let renderer = renderer_with(backend.clone(), delegate, fetcher);

        renderer.present(fields(&[("title", "T")])).await;

        let channel = backend.channel("default_high").expect("channel created");
        assert_eq!(channel.importance, Importance::High);
    }

    #[tokio::test]
    async fn successful_fetch_posts_big_picture_style() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::succeeding());
        let renderer = renderer_with(backend.clone(), delegate, fetcher.clone());

        renderer
            .present(fields(&[
                ("title", "T"),
                ("image", "https://cdn.example.com/a.png"),
            ]))
            .await;

        let posted = backend.posted();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].notification.style.is_big_picture());
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_falls_back_to_big_text_with_same_fields() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::failing());
        let renderer = renderer_with(backend.clone(), delegate, fetcher.clone());

        renderer
            .present(fields(&[
                ("title", "T"),
                ("body", "B"),
                ("image", "https://cdn.example.com/a.png"),
            ]))
            .await;

        let posted = backend.posted();
        assert_eq!(posted.len(), 1);
        assert!(!posted[0].notification.style.is_big_picture());
        assert_eq!(posted[0].notification.title, "T");
        assert_eq!(posted[0].notification.body, "B");
        assert_eq!(fetcher.fetch_count(), 1);
    }

    #[tokio::test]
    async fn empty_image_url_is_treated_as_absent() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::succeeding());
        let renderer = renderer_with(backend.clone(), delegate, fetcher.clone());

        renderer
            .present(fields(&[("title", "T"), ("image", "")]))
            .await;

        let posted = backend.posted();
        assert_eq!(posted.len(), 1);
        assert!(!posted[0].notification.style.is_big_picture());
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn action_url_is_carried_on_the_notification() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::succeeding());
        let renderer = renderer_with(backend.clone(), delegate, fetcher);

        renderer
            .present(fields(&[("title", "T"), ("action_url", "/orders/42")]))
            .await;
        renderer.present(fields(&[("title", "T")])).await;

        let posted = backend.posted();
        assert_eq!(posted[0].notification.action_url.as_deref(), Some("/orders/42"));
        assert!(posted[1].notification.action_url.is_none());
    }

    #[tokio::test]
    async fn colliding_ids_leave_one_visible_notification() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::succeeding());
        let renderer = Arc::new(
            NotificationRenderer::new(RendererConfig::default(), backend.clone(), delegate)
                .with_fetcher(fetcher)
                .with_id_scheme(Arc::new(FixedIdScheme::new(1234))),
        );

        renderer.present(fields(&[("title", "first")])).await;
        renderer.present(fields(&[("title", "second")])).await;

        assert_eq!(backend.posted().len(), 2);
        let visible = backend.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "second");
    }

    #[tokio::test]
    async fn unavailable_backend_drops_the_notification_silently() {
        let backend = Arc::new(MemoryBackend::unavailable());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::succeeding());
        let renderer = renderer_with(backend.clone(), delegate, fetcher);

        renderer.present(fields(&[("title", "T")])).await;
        assert!(backend.posted().is_empty());
    }

    #[tokio::test]
    async fn adversarial_payloads_never_panic() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        // Real fetcher, bogus URLs: the fetch errors without touching the
        // network and the present path must absorb it.
        let renderer = Arc::new(NotificationRenderer::new(
            RendererConfig::default(),
            backend.clone(),
            delegate,
        ));

        renderer.handle_message(InboundMessage::default()).await;
        renderer
            .present(fields(&[("image", "not a url"), ("title", "")]))
            .await;
        renderer
            .present(fields(&[("image", "htp://bad.scheme/x.png")]))
            .await;

        // One notification per call, all degraded to big-text.
        let posted = backend.posted();
        assert_eq!(posted.len(), 3);
        assert!(posted.iter().all(|p| !p.notification.style.is_big_picture()));
    }

    #[tokio::test]
    async fn cancelling_a_detached_presentation_posts_nothing() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::stalling());
        let renderer = renderer_with(backend.clone(), delegate, fetcher);

        let token = renderer.present_detached(fields(&[
            ("title", "T"),
            ("image", "https://cdn.example.com/a.png"),
        ]));
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(backend.posted().is_empty());
    }

    #[tokio::test]
    async fn detached_presentation_completes_when_not_cancelled() {
        let backend = Arc::new(MemoryBackend::new());
        let delegate = Arc::new(RecordingDelegate::new());
        let fetcher = Arc::new(StubFetcher::succeeding());
        let renderer = renderer_with(backend.clone(), delegate, fetcher);

        let _token = renderer.handle_detached(InboundMessage {
            notification: None,
            data: [("title".to_string(), "T".to_string())].into_iter().collect(),
        });

        // Detached work lands on the runtime; give it a moment.
        for _ in 0..50 {
            if !backend.posted().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(backend.posted().len(), 1);
    }

    #[test]
    fn stub_image_decodes() {
        let picture = test_image();
        assert_eq!(picture.width(), 1);
    }
}
