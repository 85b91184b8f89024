use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::TrigramVizError;

/// Degrees added to [`MorphState::angle`] on every tick while playing.
pub const ANGLE_STEP_DEG: f32 = 0.5;

/// Target topology of the point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Cube,
    Cylinder,
    Sphere,
}

/// How consecutive bytes are turned into point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Three consecutive bytes give x, y and z.
    #[default]
    Trigram,
    /// Two consecutive bytes give x and y; z is the offset in the buffer.
    LayeredDigram,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Cube => "cube",
            Shape::Cylinder => "cylinder",
            Shape::Sphere => "sphere",
        })
    }
}

impl FromStr for Shape {
    type Err = TrigramVizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cube" => Ok(Shape::Cube),
            "cylinder" => Ok(Shape::Cylinder),
            "sphere" => Ok(Shape::Sphere),
            other => Err(TrigramVizError::msg(format!("unknown shape `{other}`"))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Trigram => "trigram",
            Mode::LayeredDigram => "layered_digram",
        })
    }
}

impl FromStr for Mode {
    type Err = TrigramVizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "trigram" => Ok(Mode::Trigram),
            "layered_digram" | "digram" => Ok(Mode::LayeredDigram),
            other => Err(TrigramVizError::msg(format!("unknown mode `{other}`"))),
        }
    }
}

/// Blend factor in `[0, 1]`, kept as whole hundredths so that a run of
/// `STEPS` ticks lands exactly on either end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Blend(u8);

impl Blend {
    pub const STEPS: u8 = 100;
    pub const ZERO: Blend = Blend(0);
    pub const ONE: Blend = Blend(Self::STEPS);

    /// Builds a blend from a step count, saturating at [`Blend::ONE`].
    pub fn from_steps(steps: u8) -> Self {
        Blend(steps.min(Self::STEPS))
    }

    pub fn steps(self) -> u8 {
        self.0
    }

    pub fn value(self) -> f32 {
        f32::from(self.0) / f32::from(Self::STEPS)
    }

    fn step_up(self) -> Self {
        Blend((self.0 + 1).min(Self::STEPS))
    }

    fn step_down(self) -> Self {
        Blend(self.0.saturating_sub(1))
    }

    fn toward(self, target_one: bool) -> Self {
        if target_one {
            self.step_up()
        } else {
            self.step_down()
        }
    }
}

/// Morph scalars fed to the vertex program plus the free-running angle.
///
/// The scalars only ever move one step per [`MorphState::tick`] or snap to an
/// end point through a non-animated setter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MorphState {
    shape: Shape,
    mode: Mode,
    cyl: Blend,
    sph: Blend,
    pos: Blend,
    angle: f32,
}

impl MorphState {
    pub fn new(shape: Shape, mode: Mode) -> Self {
        let mut state = Self::default();
        state.set_shape(shape, false);
        state.set_mode(mode, false);
        state
    }

    /// Rebuilds a state from explicit blend positions.
    pub fn with_blends(shape: Shape, mode: Mode, cyl: Blend, sph: Blend, pos: Blend) -> Self {
        Self {
            shape,
            mode,
            cyl,
            sph,
            pos,
            angle: 0.0,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cyl_blend(&self) -> f32 {
        self.cyl.value()
    }

    pub fn sph_blend(&self) -> f32 {
        self.sph.value()
    }

    pub fn pos_blend(&self) -> f32 {
        self.pos.value()
    }

    pub fn blends(&self) -> (Blend, Blend, Blend) {
        (self.cyl, self.sph, self.pos)
    }

    /// Degrees; only ever grows and is consumed through trigonometry.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Selects the target shape. With `animate == false` both shape blends
    /// jump to their end points instead of easing there.
    pub fn set_shape(&mut self, shape: Shape, animate: bool) {
        self.shape = shape;
        if !animate {
            self.cyl = if shape == Shape::Cylinder { Blend::ONE } else { Blend::ZERO };
            self.sph = if shape == Shape::Sphere { Blend::ONE } else { Blend::ZERO };
        }
    }

    /// Selects the coordinate mode. With `animate == false` the position blend
    /// jumps to its end point.
    pub fn set_mode(&mut self, mode: Mode, animate: bool) {
        self.mode = mode;
        if !animate {
            self.pos = match mode {
                Mode::LayeredDigram => Blend::ONE,
                Mode::Trigram => Blend::ZERO,
            };
        }
    }

    /// Advances one fixed animation period. Not scaled by wall-clock time.
    pub fn tick(&mut self, playing: bool) {
        if playing {
            self.angle += ANGLE_STEP_DEG;
        }

        self.cyl = self.cyl.toward(self.shape == Shape::Cylinder);
        self.sph = self.sph.toward(self.shape == Shape::Sphere);
        self.pos = self.pos.toward(self.mode == Mode::LayeredDigram);
    }
}
