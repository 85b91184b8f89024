//! Camera manipulators and the controller that routes input to them.
//!
//! The set of manipulators is closed and owned for the whole lifetime of the
//! surface. Switching only changes which one is active; the newcomer starts
//! from the outgoing manipulator's transform so the camera never jumps.

mod free;
mod spin;
mod trackball;

use std::{fmt, str::FromStr};

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::{InputEvent, Notification, NotificationQueue, TrigramVizError};

pub use free::FreeManipulator;
pub use spin::{SpinManipulator, SPIN_DEG_PER_SECOND};
pub use trackball::TrackballManipulator;

/// Camera strategy that turns input into a model-view transform.
pub trait Manipulator: fmt::Debug {
    fn kind(&self) -> ManipulatorKind;

    /// Human readable name, e.g. for a toolbar tooltip.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn transform(&self) -> Mat4;

    /// Integrates continuous motion over `dt` seconds of wall-clock time.
    fn advance(&mut self, dt: f32);

    /// Returns `true` if the event was used.
    fn handle_event(&mut self, event: &InputEvent) -> bool;

    /// Whether pausing the animation should freeze this manipulator.
    fn handles_pause(&self) -> bool;

    /// Resets internal state so that [`Manipulator::transform`] continues
    /// from `matrix`.
    fn init_from_matrix(&mut self, matrix: Mat4);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManipulatorKind {
    #[default]
    Spin,
    Trackball,
    Free,
}

impl ManipulatorKind {
    pub const ALL: [ManipulatorKind; 3] = [
        ManipulatorKind::Spin,
        ManipulatorKind::Trackball,
        ManipulatorKind::Free,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ManipulatorKind::Spin => "Spin",
            ManipulatorKind::Trackball => "Trackball",
            ManipulatorKind::Free => "Free",
        }
    }
}

impl fmt::Display for ManipulatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ManipulatorKind {
    type Err = TrigramVizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ManipulatorKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| TrigramVizError::msg(format!("unknown manipulator `{s}`")))
    }
}

/// Owns every manipulator and forwards input to exactly one of them.
///
/// Also holds the play/pause state, since switching manipulators resumes
/// playback and decides whether pausing is available at all.
#[derive(Debug)]
pub struct ManipulatorController {
    spin: SpinManipulator,
    trackball: TrackballManipulator,
    free: FreeManipulator,
    active: ManipulatorKind,
    playing: bool,
    pause_enabled: bool,
}

impl Default for ManipulatorController {
    fn default() -> Self {
        Self::new(ManipulatorKind::Spin)
    }
}

impl ManipulatorController {
    pub fn new(initial: ManipulatorKind) -> Self {
        let mut controller = Self {
            spin: SpinManipulator::new(),
            trackball: TrackballManipulator::new(),
            free: FreeManipulator::new(),
            active: initial,
            playing: true,
            pause_enabled: false,
        };
        controller.pause_enabled = controller.active().handles_pause();
        controller
    }

    pub fn active_kind(&self) -> ManipulatorKind {
        self.active
    }

    pub fn active(&self) -> &dyn Manipulator {
        self.get(self.active)
    }

    pub fn get(&self, kind: ManipulatorKind) -> &dyn Manipulator {
        match kind {
            ManipulatorKind::Spin => &self.spin,
            ManipulatorKind::Trackball => &self.trackball,
            ManipulatorKind::Free => &self.free,
        }
    }

    pub fn get_mut(&mut self, kind: ManipulatorKind) -> &mut dyn Manipulator {
        match kind {
            ManipulatorKind::Spin => &mut self.spin,
            ManipulatorKind::Trackball => &mut self.trackball,
            ManipulatorKind::Free => &mut self.free,
        }
    }

    pub fn free(&self) -> &FreeManipulator {
        &self.free
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the play/pause control should be enabled.
    pub fn pause_enabled(&self) -> bool {
        self.pause_enabled
    }

    pub fn transform(&self) -> Mat4 {
        self.active().transform()
    }

    /// Makes `next` the active manipulator. Switching to the one already
    /// active is a no-op. Returns `true` on an actual switch.
    pub fn set_manipulator(&mut self, next: ManipulatorKind, notes: &mut NotificationQueue) -> bool {
        if next == self.active {
            return false;
        }

        let pose = self.active().transform();
        self.get_mut(next).init_from_matrix(pose);
        tracing::debug!(from = %self.active, to = %next, "switching manipulator");
        self.active = next;

        if !self.playing {
            self.playing = true;
            notes.push(Notification::PlaybackChanged { playing: true });
        }

        self.pause_enabled = self.active().handles_pause();
        notes.push(Notification::PauseAvailability(self.pause_enabled));
        notes.push(Notification::ManipulatorChanged(next));
        true
    }

    /// Flips play/pause. Ignored while the active manipulator has no use for
    /// pausing.
    pub fn toggle_playing(&mut self, notes: &mut NotificationQueue) -> bool {
        if !self.pause_enabled {
            return false;
        }
        self.playing = !self.playing;
        notes.push(Notification::PlaybackChanged {
            playing: self.playing,
        });
        true
    }

    /// Routes one input event, applying the automatic promotions first:
    ///
    /// * a primary-button drag while spinning switches to the trackball, which
    ///   then receives the same event so the gesture is not lost;
    /// * the free manipulator's modifier key while spinning or using the
    ///   trackball switches to free flight. The triggering key press goes to
    ///   the trackball, not to the free manipulator.
    ///
    /// Every other event reaches only the active manipulator.
    pub fn dispatch(&mut self, event: &InputEvent, notes: &mut NotificationQueue) -> bool {
        match *event {
            InputEvent::PointerMove { .. }
                if event.is_primary_drag() && self.active == ManipulatorKind::Spin =>
            {
                self.set_manipulator(ManipulatorKind::Trackball, notes);
                self.trackball.handle_event(event)
            }
            InputEvent::KeyPress { key, .. }
                if FreeManipulator::is_modifier_key(key)
                    && matches!(
                        self.active,
                        ManipulatorKind::Spin | ManipulatorKind::Trackball
                    ) =>
            {
                self.set_manipulator(ManipulatorKind::Free, notes);
                self.trackball.handle_event(event)
            }
            _ => {
                let active = self.active;
                self.get_mut(active).handle_event(event)
            }
        }
    }

    /// Advances the active manipulator unless it is paused.
    pub fn advance(&mut self, dt: f32) {
        if self.playing || !self.active().handles_pause() {
            let active = self.active;
            self.get_mut(active).advance(dt);
        }
    }
}
