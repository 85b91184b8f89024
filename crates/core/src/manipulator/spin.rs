use glam::{Mat4, Vec3};

use super::{Manipulator, ManipulatorKind};
use crate::InputEvent;

/// Turntable speed in degrees per second.
pub const SPIN_DEG_PER_SECOND: f32 = 30.0;

/// Turns the cloud around its own vertical axis on top of a fixed base pose.
#[derive(Debug, Clone)]
pub struct SpinManipulator {
    base: Mat4,
    angle_deg: f32,
}

impl Default for SpinManipulator {
    fn default() -> Self {
        Self {
            base: Mat4::from_translation(Vec3::new(0.0, 0.0, -3.5))
                * Mat4::from_rotation_x(-60f32.to_radians()),
            angle_deg: 0.0,
        }
    }
}

impl SpinManipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angle_deg(&self) -> f32 {
        self.angle_deg
    }
}

impl Manipulator for SpinManipulator {
    fn kind(&self) -> ManipulatorKind {
        ManipulatorKind::Spin
    }

    fn transform(&self) -> Mat4 {
        self.base * Mat4::from_rotation_z(self.angle_deg.to_radians())
    }

    fn advance(&mut self, dt: f32) {
        self.angle_deg = (self.angle_deg + SPIN_DEG_PER_SECOND * dt) % 360.0;
    }

    fn handle_event(&mut self, _event: &InputEvent) -> bool {
        false
    }

    fn handles_pause(&self) -> bool {
        true
    }

    fn init_from_matrix(&mut self, matrix: Mat4) {
        self.base = matrix;
        self.angle_deg = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spins_at_constant_rate() {
        let mut spin = SpinManipulator::new();
        spin.advance(0.5);
        spin.advance(0.5);
        assert!((spin.angle_deg() - 30.0).abs() < 1e-4);

        spin.advance(12.0);
        assert!(spin.angle_deg() < 360.0);
    }

    #[test]
    fn adopts_incoming_pose() {
        let pose = Mat4::from_translation(Vec3::new(1.0, 2.0, -5.0));
        let mut spin = SpinManipulator::new();
        spin.advance(3.0);
        spin.init_from_matrix(pose);
        assert!(spin.transform().abs_diff_eq(pose, 1e-6));
    }
}
