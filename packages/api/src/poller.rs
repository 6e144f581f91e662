//! # Client poller
//!
//! A [`Poller`] reads one session on a fixed interval and tells a [`Notifier`]
//! when content first moves away from the creation placeholder: once for text,
//! once for images. The two latches live in [`PollState`] and never reset.
//!
//! Reads go through a [`ClipSource`], implemented by [`ClipService`] (same
//! process) and [`ClipClient`] (over HTTP). A failed read is a
//! [`TickOutcome::Ignored`] value; the next tick simply tries again.
//!
//! The local [`Draft`] is the text the user is editing. When the text latch
//! fires the remote text is adopted into it, unless the draft holds unsaved
//! edits and the notifier answers [`DraftResolution::KeepLocal`].

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use store::{ClipInfo, ClipStore, PLACEHOLDER_TEXT};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::clip::ClipService;
use crate::client::{ClientError, ClipClient};
use crate::error::ClipError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Shortest interval [`Poller::with_interval`] accepts.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Somewhere a clip can be read from.
pub trait ClipSource: Send + Sync {
    type Error: std::fmt::Display + Send;

    fn fetch(&self, session_id: &str)
        -> impl Future<Output = Result<ClipInfo, Self::Error>> + Send;
}

impl<S: ClipStore> ClipSource for ClipService<S> {
    type Error = ClipError;

    async fn fetch(&self, session_id: &str) -> Result<ClipInfo, ClipError> {
        self.get_clip(session_id).await
    }
}

impl ClipSource for ClipClient {
    type Error = ClientError;

    async fn fetch(&self, session_id: &str) -> Result<ClipInfo, ClientError> {
        self.get_clip(session_id).await
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DraftResolution {
    #[default]
    AdoptRemote,
    KeepLocal,
}

/// Receives the one-shot notifications.
pub trait Notifier: Send {
    fn text_arrived(&mut self, clip: &ClipInfo);

    fn images_arrived(&mut self, clip: &ClipInfo);

    /// Called when remote text arrives while the draft has unsaved edits.
    fn resolve_draft(&mut self, _local: &str, _remote: &str) -> DraftResolution {
        DraftResolution::AdoptRemote
    }
}

#[derive(Debug, Default)]
struct DraftInner {
    text: String,
    dirty: bool,
}

/// The locally edited text, shared between the poller and whatever edits it.
#[derive(Clone, Debug, Default)]
pub struct Draft(Arc<Mutex<DraftInner>>);

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DraftInner> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    /// Record a user edit that has not been saved yet.
    pub fn edit(&self, text: impl Into<String>) {
        let mut inner = self.lock();
        inner.text = text.into();
        inner.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    fn adopt(&self, text: &str) {
        let mut inner = self.lock();
        inner.text = text.to_string();
        inner.dirty = false;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollEvent {
    TextArrived { text: String, draft: DraftResolution },
    ImagesArrived { count: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Observed(Vec<PollEvent>),
    Ignored(String),
}

/// Latches and last-seen values for one poller.
#[derive(Clone, Debug, Default)]
pub struct PollState {
    text_notified: bool,
    images_notified: bool,
    last_seen_images: usize,
    draft: Draft,
}

impl PollState {
    pub fn new(draft: Draft) -> Self {
        Self {
            draft,
            ..Self::default()
        }
    }

    pub fn text_notified(&self) -> bool {
        self.text_notified
    }

    pub fn images_notified(&self) -> bool {
        self.images_notified
    }

    pub fn last_seen_images(&self) -> usize {
        self.last_seen_images
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_latched(&self) -> bool {
        self.text_notified && self.images_notified
    }

    /// Compare a fetched clip against the latches and fire what is due.
    pub fn observe<N: Notifier>(&mut self, clip: &ClipInfo, notifier: &mut N) -> Vec<PollEvent> {
        let mut events = Vec::new();

        // Empty text is as good as no text yet
        if !self.text_notified && !clip.text.is_empty() && clip.text != PLACEHOLDER_TEXT {
            self.text_notified = true;
            notifier.text_arrived(clip);

            let local = self.draft.text();
            let resolution = if self.draft.is_dirty() && local != clip.text {
                notifier.resolve_draft(&local, &clip.text)
            } else {
                DraftResolution::AdoptRemote
            };
            if resolution == DraftResolution::AdoptRemote {
                self.draft.adopt(&clip.text);
            }
            events.push(PollEvent::TextArrived {
                text: clip.text.clone(),
                draft: resolution,
            });
        }

        if !self.images_notified && !clip.images.is_empty() {
            self.images_notified = true;
            notifier.images_arrived(clip);
            events.push(PollEvent::ImagesArrived {
                count: clip.images.len(),
            });
        }

        self.last_seen_images = clip.images.len();
        events
    }
}

pub struct Poller<C, N> {
    source: C,
    notifier: N,
    session_id: String,
    interval: Duration,
    stop_when_latched: bool,
    state: PollState,
}

impl<C: ClipSource, N: Notifier> Poller<C, N> {
    pub fn new(source: C, session_id: impl Into<String>, notifier: N) -> Self {
        Self {
            source,
            notifier,
            session_id: session_id.into(),
            interval: DEFAULT_POLL_INTERVAL,
            stop_when_latched: false,
            state: PollState::default(),
        }
    }

    /// Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Stop the loop once both latches are set instead of polling forever.
    pub fn stop_when_latched(mut self, stop: bool) -> Self {
        self.stop_when_latched = stop;
        self
    }

    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.state = PollState::new(draft);
        self
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// One read-and-compare cycle.
    pub async fn tick(&mut self) -> TickOutcome {
        match self.source.fetch(&self.session_id).await {
            Ok(clip) => TickOutcome::Observed(self.state.observe(&clip, &mut self.notifier)),
            Err(e) => {
                tracing::debug!(session_id = %self.session_id, "poll ignored: {}", e);
                TickOutcome::Ignored(e.to_string())
            }
        }
    }

    /// Poll until cancelled. The first read happens one interval after start.
    pub async fn run(mut self, cancel: CancellationToken) -> PollState {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() completes its first tick immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(session_id = %self.session_id, "poller cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                    if self.stop_when_latched && self.state.is_latched() {
                        break;
                    }
                }
            }
        }

        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use store::{ClipSession, ClipUpdate, ImagesUpdate, MemoryStore};

    const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[derive(Clone, Default)]
    struct Recorder {
        log: Arc<Mutex<Vec<String>>>,
        resolution: DraftResolution,
    }

    impl Recorder {
        fn entries(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl Notifier for Recorder {
        fn text_arrived(&mut self, clip: &ClipInfo) {
            self.log.lock().unwrap().push(format!("text:{}", clip.text));
        }

        fn images_arrived(&mut self, clip: &ClipInfo) {
            self.log
                .lock()
                .unwrap()
                .push(format!("images:{}", clip.images.len()));
        }

        fn resolve_draft(&mut self, _local: &str, _remote: &str) -> DraftResolution {
            self.resolution
        }
    }

    async fn service_with(id: &str) -> (ClipService<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        store.insert(ClipSession::new(id)).await.unwrap();
        (ClipService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_text_notifies_exactly_once() {
        let (service, store) = service_with("s").await;
        let recorder = Recorder::default();
        let mut poller = Poller::new(service, "s", recorder.clone());

        assert_eq!(poller.tick().await, TickOutcome::Observed(vec![]));

        store.apply("s", &ClipUpdate::text("shared!")).await.unwrap();
        assert_eq!(
            poller.tick().await,
            TickOutcome::Observed(vec![PollEvent::TextArrived {
                text: "shared!".into(),
                draft: DraftResolution::AdoptRemote,
            }])
        );
        assert_eq!(poller.state().draft().text(), "shared!");

        store.apply("s", &ClipUpdate::text("changed again")).await.unwrap();
        assert_eq!(poller.tick().await, TickOutcome::Observed(vec![]));
        assert_eq!(recorder.entries(), vec!["text:shared!"]);
    }

    #[tokio::test]
    async fn test_empty_text_does_not_notify() {
        let (service, store) = service_with("s").await;
        let recorder = Recorder::default();
        let mut poller = Poller::new(service, "s", recorder.clone());

        store.apply("s", &ClipUpdate::text("")).await.unwrap();
        assert_eq!(poller.tick().await, TickOutcome::Observed(vec![]));
        assert!(!poller.state().text_notified());
        assert!(recorder.entries().is_empty());

        store.apply("s", &ClipUpdate::text("now real")).await.unwrap();
        poller.tick().await;
        assert_eq!(recorder.entries(), vec!["text:now real"]);
        assert_eq!(poller.state().draft().text(), "now real");
    }

    #[tokio::test]
    async fn test_image_latch_independent_of_text() {
        let (service, store) = service_with("s").await;
        let recorder = Recorder::default();
        let mut poller = Poller::new(service, "s", recorder.clone());

        let images = ClipUpdate::default().with_images(ImagesUpdate::Replace(vec![PNG_URI.into()]));
        store.apply("s", &images).await.unwrap();
        poller.tick().await;
        assert!(poller.state().images_notified());
        assert!(!poller.state().text_notified());
        assert_eq!(poller.state().last_seen_images(), 1);

        let more = ClipUpdate::default().with_images(ImagesUpdate::Append(PNG_URI.into()));
        store.apply("s", &more).await.unwrap();
        poller.tick().await;
        assert_eq!(poller.state().last_seen_images(), 2);
        assert_eq!(recorder.entries(), vec!["images:1"]);
    }

    struct FlakySource {
        inner: ClipService<MemoryStore>,
        calls: AtomicUsize,
    }

    impl ClipSource for FlakySource {
        type Error = ClipError;

        async fn fetch(&self, session_id: &str) -> Result<ClipInfo, ClipError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ClipError::Persistence("connection reset".into()));
            }
            self.inner.fetch(session_id).await
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_is_ignored() {
        let (service, store) = service_with("s").await;
        store.apply("s", &ClipUpdate::text("hello")).await.unwrap();
        let recorder = Recorder::default();
        let source = FlakySource {
            inner: service,
            calls: AtomicUsize::new(0),
        };
        let mut poller = Poller::new(source, "s", recorder.clone());

        assert!(matches!(poller.tick().await, TickOutcome::Ignored(msg) if msg.contains("connection reset")));
        assert!(recorder.entries().is_empty());

        poller.tick().await;
        assert_eq!(recorder.entries(), vec!["text:hello"]);
    }

    #[tokio::test]
    async fn test_unknown_session_is_ignored() {
        let mut poller = Poller::new(ClipService::new(MemoryStore::new()), "gone", Recorder::default());
        assert!(matches!(poller.tick().await, TickOutcome::Ignored(_)));
        assert!(!poller.state().text_notified());
    }

    #[tokio::test]
    async fn test_dirty_draft_resolution() {
        let (service, store) = service_with("s").await;
        store.apply("s", &ClipUpdate::text("remote")).await.unwrap();

        let draft = Draft::new();
        draft.edit("typing locally");
        let recorder = Recorder {
            resolution: DraftResolution::KeepLocal,
            ..Recorder::default()
        };
        let mut poller = Poller::new(service.clone(), "s", recorder).with_draft(draft.clone());
        poller.tick().await;
        assert_eq!(draft.text(), "typing locally");
        assert!(draft.is_dirty());

        let draft = Draft::new();
        draft.edit("typing locally");
        let mut poller = Poller::new(service, "s", Recorder::default()).with_draft(draft.clone());
        poller.tick().await;
        assert_eq!(draft.text(), "remote");
        assert!(!draft.is_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_cancelled() {
        let (service, store) = service_with("s").await;
        let recorder = Recorder::default();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(
            Poller::new(service, "s", recorder.clone())
                .with_interval(Duration::from_secs(3))
                .run(cancel.clone()),
        );

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(recorder.entries().is_empty());

        store.apply("s", &ClipUpdate::text("shared!")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(recorder.entries(), vec!["text:shared!"]);

        store.apply("s", &ClipUpdate::text("again")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;
        cancel.cancel();

        let state = handle.await.unwrap();
        assert!(state.text_notified());
        assert_eq!(recorder.entries(), vec!["text:shared!"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_when_latched() {
        let (service, store) = service_with("s").await;
        let update = ClipUpdate::text("done")
            .with_images(ImagesUpdate::Replace(vec![PNG_URI.into()]));
        store.apply("s", &update).await.unwrap();

        let state = Poller::new(service, "s", Recorder::default())
            .stop_when_latched(true)
            .run(CancellationToken::new())
            .await;
        assert!(state.is_latched());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let (service, store) = service_with("s").await;
        let update = ClipUpdate::text("done")
            .with_images(ImagesUpdate::Replace(vec![PNG_URI.into()]));
        store.apply("s", &update).await.unwrap();

        let poller = Poller::new(service, "s", Recorder::default())
            .with_interval(Duration::ZERO)
            .stop_when_latched(true);
        assert_eq!(poller.interval, MIN_POLL_INTERVAL);

        let state = poller.run(CancellationToken::new()).await;
        assert!(state.is_latched());
    }
}
