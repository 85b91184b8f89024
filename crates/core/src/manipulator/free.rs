use std::{collections::HashSet, f32::consts::FRAC_PI_2};

use glam::{Mat4, Quat, Vec2, Vec3};

use super::{Manipulator, ManipulatorKind};
use crate::{InputEvent, KeyCode, PointerButton};

/// Units per second; the data cube spans two units.
const MOVE_SPEED: f32 = 1.5;
const BOOST_FACTOR: f32 = 4.0;
const LOOK_RADIANS_PER_PIXEL: f32 = 0.0025;
const MAX_PITCH: f32 = FRAC_PI_2 - 0.01;

/// First-person fly camera: WASD to move, Q/E for down/up, drag or hold
/// Control to look around, Shift to go faster.
#[derive(Debug, Clone)]
pub struct FreeManipulator {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    /// Orientation left over from `init_from_matrix` that yaw/pitch are applied on top of.
    base: Quat,
    held: HashSet<KeyCode>,
    last_pointer: Option<Vec2>,
    dragging: bool,
}

impl Default for FreeManipulator {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.5),
            yaw: 0.0,
            pitch: 0.0,
            base: Quat::IDENTITY,
            held: HashSet::new(),
            last_pointer: None,
            dragging: false,
        }
    }
}

impl FreeManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key that switches other manipulators over to free flight.
    pub fn is_modifier_key(key: KeyCode) -> bool {
        key == KeyCode::Control
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    fn orientation(&self) -> Quat {
        self.base * Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    fn looking(&self) -> bool {
        self.dragging || self.held.iter().any(|key| Self::is_modifier_key(*key))
    }

    fn look(&mut self, position: Vec2) {
        let Some(last) = self.last_pointer.replace(position) else {
            return;
        };
        let delta = (position - last) * LOOK_RADIANS_PER_PIXEL;
        self.yaw -= delta.x;
        self.pitch = (self.pitch - delta.y).clamp(-MAX_PITCH, MAX_PITCH);
    }

    fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        let mut value = 0.0;
        if self.held.contains(&negative) {
            value -= 1.0;
        }
        if self.held.contains(&positive) {
            value += 1.0;
        }
        value
    }
}

impl Manipulator for FreeManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::Free
    }

    fn transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }

    fn advance(&mut self, dt: f32) {
        let local = Vec3::new(
            self.axis(KeyCode::A, KeyCode::D),
            self.axis(KeyCode::Q, KeyCode::E),
            self.axis(KeyCode::W, KeyCode::S),
        );
        if local == Vec3::ZERO {
            return;
        }
        let mut speed = MOVE_SPEED;
        if self.held.contains(&KeyCode::Shift) {
            speed *= BOOST_FACTOR;
        }
        self.position += self.orientation() * local.normalize() * speed * dt;
    }

    fn handle_event(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::KeyPress { key, .. } => {
                self.held.insert(key);
                if Self::is_modifier_key(key) {
                    self.last_pointer = None;
                }
                true
            }
            InputEvent::KeyRelease { key } => self.held.remove(&key),
            InputEvent::PointerPress {
                button: PointerButton::Primary,
                position,
            } => {
                self.dragging = true;
                self.last_pointer = Some(position);
                true
            }
            InputEvent::PointerRelease {
                button: PointerButton::Primary,
                ..
            } => {
                self.dragging = false;
                self.last_pointer = None;
                true
            }
            InputEvent::PointerMove { position, buttons } => {
                if buttons.primary {
                    self.dragging = true;
                }
                if !self.looking() {
                    return false;
                }
                self.look(position);
                true
            }
            _ => false,
        }
    }

    fn handles_pause(&self) -> bool {
        false
    }

    fn init_from_matrix(&mut self, matrix: Mat4) {
        let (_, orientation, position) = matrix.inverse().to_scale_rotation_translation();
        self.position = position;
        self.base = orientation.normalize();
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.last_pointer = None;
        self.dragging = false;
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Buttons;

    #[test]
    fn control_is_the_modifier() {
        assert!(FreeManipulator::is_modifier_key(KeyCode::Control));
        assert!(!FreeManipulator::is_modifier_key(KeyCode::Shift));
        assert!(!FreeManipulator::is_modifier_key(KeyCode::Other(0x1234)));
    }

    #[test]
    fn walks_forward_along_view_direction() {
        let mut free = FreeManipulator::new();
        free.handle_event(&InputEvent::key_press(KeyCode::W));
        free.advance(1.0);
        assert!((free.position().z - (3.5 - MOVE_SPEED)).abs() < 1e-5);

        free.handle_event(&InputEvent::KeyRelease { key: KeyCode::W });
        let before = free.position();
        free.advance(1.0);
        assert_eq!(free.position(), before);
    }

    #[test]
    fn shift_boosts_speed() {
        let mut free = FreeManipulator::new();
        free.handle_event(&InputEvent::key_press(KeyCode::Shift));
        free.handle_event(&InputEvent::key_press(KeyCode::D));
        free.advance(0.5);
        assert!((free.position().x - MOVE_SPEED * BOOST_FACTOR * 0.5).abs() < 1e-5);
    }

    #[test]
    fn looks_around_only_when_asked() {
        let mut free = FreeManipulator::new();
        let start = free.transform();
        let hover = InputEvent::PointerMove {
            position: Vec2::new(100.0, 0.0),
            buttons: Buttons::NONE,
        };
        assert!(!free.handle_event(&hover));

        free.handle_event(&InputEvent::key_press(KeyCode::Control));
        free.handle_event(&hover);
        free.handle_event(&InputEvent::PointerMove {
            position: Vec2::new(300.0, 0.0),
            buttons: Buttons::NONE,
        });
        assert!(!free.transform().abs_diff_eq(start, 1e-4));
    }

    #[test]
    fn round_trips_a_view_matrix() {
        let view = Mat4::from_rotation_x(0.4) * Mat4::from_translation(Vec3::new(-1.0, 0.5, -6.0));
        let mut free = FreeManipulator::new();
        free.init_from_matrix(view);
        assert!(free.transform().abs_diff_eq(view, 1e-4));
    }
}
