use glam::{Mat4, Quat, Vec2, Vec3};

use super::{Manipulator, ManipulatorKind};
use crate::{InputEvent, PointerButton};

const RADIANS_PER_PIXEL: f32 = 0.01;
/// Fraction of momentum left after one second of coasting.
const MOMENTUM_RETAINED_PER_SECOND: f32 = 0.05;
const MOMENTUM_GAIN: f32 = 20.0;
const ZOOM_STEP: f32 = 0.25;
const MIN_DISTANCE: f32 = 1.2;
const MAX_DISTANCE: f32 = 20.0;

/// Drag-to-rotate camera that keeps coasting briefly after release.
#[derive(Debug, Clone)]
pub struct TrackballManipulator {
    rotation: Quat,
    translation: Vec3,
    last_pointer: Option<Vec2>,
    /// Axis scaled by angular speed in rad/s.
    momentum: Vec3,
}

impl Default for TrackballManipulator {
    fn default() -> Self {
        Self {
            rotation: Quat::from_rotation_x(-60f32.to_radians()),
            translation: Vec3::new(0.0, 0.0, -3.5),
            last_pointer: None,
            momentum: Vec3::ZERO,
        }
    }
}

impl TrackballManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.last_pointer.is_some()
    }

    fn drag(&mut self, position: Vec2) {
        let Some(last) = self.last_pointer.replace(position) else {
            return;
        };
        let delta = position - last;
        if delta == Vec2::ZERO {
            return;
        }

        // Screen-space drag: x turns about the view's up axis, y about its right axis.
        let turn = Vec3::new(delta.y, delta.x, 0.0) * RADIANS_PER_PIXEL;
        self.rotate_view(turn);
        self.momentum = turn * MOMENTUM_GAIN;
    }

    fn rotate_view(&mut self, turn: Vec3) {
        let angle = turn.length();
        if angle <= f32::EPSILON {
            return;
        }
        self.rotation = (Quat::from_axis_angle(turn / angle, angle) * self.rotation).normalize();
    }
}

impl Manipulator for TrackballManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::Trackball
    }

    fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }

    fn advance(&mut self, dt: f32) {
        if self.is_dragging() || self.momentum == Vec3::ZERO {
            return;
        }
        self.rotate_view(self.momentum * dt);
        self.momentum *= MOMENTUM_RETAINED_PER_SECOND.powf(dt);
        if self.momentum.length_squared() < 1e-6 {
            self.momentum = Vec3::ZERO;
        }
    }

    fn handle_event(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::PointerPress {
                button: PointerButton::Primary,
                position,
            } => {
                self.last_pointer = Some(position);
                self.momentum = Vec3::ZERO;
                true
            }
            InputEvent::PointerRelease {
                button: PointerButton::Primary,
                ..
            } => {
                self.last_pointer = None;
                true
            }
            InputEvent::PointerMove { position, buttons } if buttons.primary => {
                if self.last_pointer.is_none() {
                    // Drag started under another manipulator; pick it up from here.
                    self.last_pointer = Some(position);
                    self.momentum = Vec3::ZERO;
                } else {
                    self.drag(position);
                }
                true
            }
            InputEvent::Wheel { delta } => {
                let distance =
                    (-self.translation.z - delta * ZOOM_STEP).clamp(MIN_DISTANCE, MAX_DISTANCE);
                self.translation.z = -distance;
                true
            }
            _ => false,
        }
    }

    fn handles_pause(&self) -> bool {
        false
    }

    fn init_from_matrix(&mut self, matrix: Mat4) {
        let (_, rotation, translation) = matrix.to_scale_rotation_translation();
        self.rotation = rotation.normalize();
        self.translation = translation;
        self.last_pointer = None;
        self.momentum = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Buttons;

    #[test]
    fn drag_rotates_and_coasts() {
        let mut ball = TrackballManipulator::new();
        let start = ball.transform();

        ball.handle_event(&InputEvent::PointerPress {
            button: PointerButton::Primary,
            position: Vec2::new(10.0, 10.0),
        });
        assert!(ball.handle_event(&InputEvent::drag_to(40.0, 10.0)));
        let dragged = ball.transform();
        assert!(!dragged.abs_diff_eq(start, 1e-4));

        ball.handle_event(&InputEvent::PointerRelease {
            button: PointerButton::Primary,
            position: Vec2::new(40.0, 10.0),
        });
        ball.advance(0.016);
        assert!(!ball.transform().abs_diff_eq(dragged, 1e-6));

        for _ in 0..2000 {
            ball.advance(0.016);
        }
        let settled = ball.transform();
        ball.advance(0.016);
        assert!(ball.transform().abs_diff_eq(settled, 1e-6));
    }

    #[test]
    fn first_move_without_press_only_anchors() {
        let mut ball = TrackballManipulator::new();
        let start = ball.transform();
        assert!(ball.handle_event(&InputEvent::drag_to(5.0, 5.0)));
        assert!(ball.is_dragging());
        assert!(ball.transform().abs_diff_eq(start, 1e-6));
    }

    #[test]
    fn wheel_zooms_within_bounds() {
        let mut ball = TrackballManipulator::new();
        for _ in 0..100 {
            ball.handle_event(&InputEvent::Wheel { delta: 1.0 });
        }
        let (_, _, t) = ball.transform().to_scale_rotation_translation();
        assert!((t.z + MIN_DISTANCE).abs() < 1e-5);
    }

    #[test]
    fn ignores_unbuttoned_moves() {
        let mut ball = TrackballManipulator::new();
        let handled = ball.handle_event(&InputEvent::PointerMove {
            position: Vec2::ONE,
            buttons: Buttons::NONE,
        });
        assert!(!handled);
    }

    #[test]
    fn continues_from_rigid_pose() {
        let pose = Mat4::from_translation(Vec3::new(0.5, 0.0, -4.0))
            * Mat4::from_rotation_y(0.7)
            * Mat4::from_rotation_x(-0.3);
        let mut ball = TrackballManipulator::new();
        ball.init_from_matrix(pose);
        assert!(ball.transform().abs_diff_eq(pose, 1e-5));
    }
}
