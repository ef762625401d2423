use log::debug;
use serde::Serialize;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 32;

/// Why widget surfaces are being asked to re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RefreshReason {
    Created,
    Updated,
    Deleted,
    Reordered,
    SelectionChanged,
    DayRolledOver,
    Manual,
}

/// Fan-out of "reload your timelines" signals to any number of listeners.
#[derive(Clone)]
pub struct WidgetNotifier {
    sender: broadcast::Sender<RefreshReason>,
}

impl Default for WidgetNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshReason> {
        self.sender.subscribe()
    }

    /// Returns how many listeners were reached. Having none is fine.
    pub fn notify(&self, reason: RefreshReason) -> usize {
        let reached = self.sender.send(reason).unwrap_or(0);
        debug!("Widget refresh requested ({reason:?}), {reached} listener(s)");
        reached
    }
}
