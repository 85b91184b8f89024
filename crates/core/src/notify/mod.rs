use serde::{Deserialize, Serialize};

use crate::ManipulatorKind;

/// State change that external observers (toolbar buttons, sliders, status
/// lines) may want to mirror.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    /// The brightness value moved; a slider should follow.
    BrightnessChanged(u32),
    /// The brightness heuristic was switched on or off.
    HeuristicToggled(bool),
    ManipulatorChanged(ManipulatorKind),
    PlaybackChanged { playing: bool },
    /// Whether the play/pause control should be enabled.
    PauseAvailability(bool),
}

/// Outbox of notifications raised since the host last drained it.
#[derive(Debug, Default, Clone)]
pub struct NotificationQueue {
    pending: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        self.pending.push(notification);
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Hands every queued notification to the caller, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_in_order() {
        let mut queue = NotificationQueue::new();
        queue.push(Notification::BrightnessChanged(40));
        queue.push(Notification::HeuristicToggled(false));

        assert_eq!(queue.pending().len(), 2);
        assert_eq!(
            queue.drain(),
            vec![
                Notification::BrightnessChanged(40),
                Notification::HeuristicToggled(false)
            ]
        );
        assert!(queue.is_empty());
    }
}
