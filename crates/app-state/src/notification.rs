//! Auto-dismissing notification channels
//!
//! The UI shows transient notifications on two channels, error and success.
//! Each channel owns at most one pending auto-dismiss timer: showing a new
//! notification on a channel aborts the previous timer and starts a fresh
//! one, so a burst of notifications stays visible for a full duration after
//! the last one.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default time a notification stays visible
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

/// Notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Failures the user should notice (invalid room, failed save)
    Error,
    /// Confirmations (theme saved)
    Success,
}

#[derive(Default)]
struct ChannelSlot {
    message: Option<String>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl ChannelSlot {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[derive(Default)]
struct Channels {
    error: ChannelSlot,
    success: ChannelSlot,
}

impl Channels {
    fn slot_mut(&mut self, channel: Channel) -> &mut ChannelSlot {
        match channel {
            Channel::Error => &mut self.error,
            Channel::Success => &mut self.success,
        }
    }

    fn slot(&self, channel: Channel) -> &ChannelSlot {
        match channel {
            Channel::Error => &self.error,
            Channel::Success => &self.success,
        }
    }
}

/// Notification state shared between the UI and background work
///
/// Cloning is cheap; clones share the same channels.
#[derive(Clone)]
pub struct Notifier {
    channels: Arc<Mutex<Channels>>,
    duration: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_DURATION)
    }
}

impl Notifier {
    /// Create a notifier whose notifications last `duration`
    pub fn new(duration: Duration) -> Self {
        Self { channels: Arc::new(Mutex::new(Channels::default())), duration }
    }

    /// How long notifications stay visible
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Show a notification, replacing any pending one on the same channel
    ///
    /// Outside a tokio runtime the notification is shown without a timer and
    /// stays until [`Notifier::dismiss`] is called.
    pub fn notify(&self, channel: Channel, message: impl Into<String>) {
        let message = message.into();
        let mut channels = self.channels.lock();
        let slot = channels.slot_mut(channel);

        slot.cancel_timer();
        slot.generation += 1;
        slot.message = Some(message);

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(?channel, "No runtime; notification will not auto-dismiss");
            return;
        };

        let generation = slot.generation;
        let shared = Arc::clone(&self.channels);
        let duration = self.duration;
        slot.timer = Some(handle.spawn(async move {
            tokio::time::sleep(duration).await;
            let mut channels = shared.lock();
            let slot = channels.slot_mut(channel);
            // A newer notification owns the channel now
            if slot.generation == generation {
                slot.message = None;
                slot.timer = None;
            }
        }));
    }

    /// Show an error notification
    pub fn error(&self, message: impl Into<String>) {
        self.notify(Channel::Error, message);
    }

    /// Show a success notification
    pub fn success(&self, message: impl Into<String>) {
        self.notify(Channel::Success, message);
    }

    /// Hide a channel immediately and cancel its timer
    pub fn dismiss(&self, channel: Channel) {
        let mut channels = self.channels.lock();
        let slot = channels.slot_mut(channel);
        slot.cancel_timer();
        slot.generation += 1;
        slot.message = None;
    }

    /// Message currently shown on a channel
    pub fn current(&self, channel: Channel) -> Option<String> {
        self.channels.lock().slot(channel).message.clone()
    }

    /// Whether a channel is showing a notification
    pub fn is_visible(&self, channel: Channel) -> bool {
        self.channels.lock().slot(channel).message.is_some()
    }

    /// Whether a channel has a pending auto-dismiss timer
    pub fn has_pending_timer(&self, channel: Channel) -> bool {
        self.channels.lock().slot(channel).timer.as_ref().is_some_and(|t| !t.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_notification_auto_dismisses() {
        let notifier = Notifier::default();
        notifier.error("Invalid room number");

        assert_eq!(notifier.current(Channel::Error), Some("Invalid room number".to_string()));
        assert!(notifier.has_pending_timer(Channel::Error));

        sleep(Duration::from_millis(2_999)).await;
        assert!(notifier.is_visible(Channel::Error));

        sleep(Duration::from_millis(2)).await;
        assert!(!notifier.is_visible(Channel::Error));
        assert!(!notifier.has_pending_timer(Channel::Error));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_notification_replaces_timer() {
        let notifier = Notifier::default();
        notifier.success("Saved");

        sleep(Duration::from_secs(2)).await;
        notifier.success("Saved again");

        // The first timer would have fired at 3s
        sleep(Duration::from_secs(2)).await;
        assert_eq!(notifier.current(Channel::Success), Some("Saved again".to_string()));

        sleep(Duration::from_millis(1_001)).await;
        assert!(!notifier.is_visible(Channel::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn test_channels_are_independent() {
        let notifier = Notifier::new(Duration::from_secs(1));
        notifier.error("boom");
        sleep(Duration::from_millis(500)).await;
        notifier.success("ok");

        sleep(Duration::from_millis(600)).await;
        assert!(!notifier.is_visible(Channel::Error));
        assert!(notifier.is_visible(Channel::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_cancels_timer() {
        let notifier = Notifier::default();
        notifier.error("boom");
        notifier.dismiss(Channel::Error);

        assert!(!notifier.is_visible(Channel::Error));
        assert!(!notifier.has_pending_timer(Channel::Error));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_state() {
        let notifier = Notifier::default();
        let clone = notifier.clone();
        clone.success("from clone");
        assert!(notifier.is_visible(Channel::Success));
    }

    #[test]
    fn test_notify_without_runtime() {
        let notifier = Notifier::default();
        notifier.error("no runtime");
        assert!(notifier.is_visible(Channel::Error));
        assert!(!notifier.has_pending_timer(Channel::Error));

        notifier.dismiss(Channel::Error);
        assert!(!notifier.is_visible(Channel::Error));
    }
}
