//! Contract between the visualisation and whatever GPU backend draws it.
//!
//! The backend compiles one fixed program, holds the data bytes in a buffer
//! texture and draws one point per byte window with the uniforms in
//! [`FrameUniforms`]. [`RecordingBackend`] implements the contract in memory.

use std::{collections::BTreeMap, fmt};

use glam::Mat4;

use crate::{Result, TrigramVizError};

/// Narrowest vertical field of view, used as-is for landscape viewports.
pub const MIN_FOV_DEG: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.01;
pub const FAR_PLANE: f32 = 100.0;

/// Texture unit the data buffer is bound to.
pub const DATA_TEXTURE_UNIT: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSource {
    pub stage: ShaderStage,
    /// Fixed resource identifier the source is registered under.
    pub resource: &'static str,
    pub code: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramSource {
    pub vertex: ShaderSource,
    pub fragment: ShaderSource,
}

impl ProgramSource {
    /// The point-cloud program shipped with the crate.
    pub fn trigram() -> Self {
        Self {
            vertex: ShaderSource {
                stage: ShaderStage::Vertex,
                resource: ":/trigram/vshader.glsl",
                code: include_str!("../../shaders/trigram.vert"),
            },
            fragment: ShaderSource {
                stage: ShaderStage::Fragment,
                resource: ":/trigram/fshader.glsl",
                code: include_str!("../../shaders/trigram.frag"),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// `src + dst` on every channel; overlapping points accumulate.
    #[default]
    Additive,
}

/// Everything the program needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// `tx`
    pub texture_unit: i32,
    /// `c_cyl`
    pub cyl_blend: f32,
    /// `c_sph`
    pub sph_blend: f32,
    /// `c_pos`
    pub pos_blend: f32,
    /// `xfrm`: projection × camera.
    pub transform: Mat4,
    /// `c_brightness`
    pub intensity: f32,
    /// `sz`: number of bytes in the data buffer.
    pub data_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub first: u32,
    pub count: u32,
    pub blend: BlendMode,
}

/// GPU collaborator consumed by the surface.
pub trait GpuBackend {
    /// Compiles and links both stages. Any error is fatal for the surface.
    fn compile_program(&mut self, program: &ProgramSource) -> Result<()>;

    /// Uploads `bytes` into a new buffer texture.
    fn create_data_buffer(&mut self, bytes: &[u8]) -> Result<BufferHandle>;

    fn destroy_data_buffer(&mut self, handle: BufferHandle);

    /// Clears colour and depth.
    fn clear(&mut self);

    fn bind_program(&mut self);

    fn bind_data_texture(&mut self, handle: BufferHandle, unit: i32);

    fn set_uniforms(&mut self, uniforms: &FrameUniforms);

    fn draw_points(&mut self, call: DrawCall) -> Result<()>;
}

impl<B: GpuBackend + ?Sized> GpuBackend for &mut B {
    fn compile_program(&mut self, program: &ProgramSource) -> Result<()> {
        (**self).compile_program(program)
    }

    fn create_data_buffer(&mut self, bytes: &[u8]) -> Result<BufferHandle> {
        (**self).create_data_buffer(bytes)
    }

    fn destroy_data_buffer(&mut self, handle: BufferHandle) {
        (**self).destroy_data_buffer(handle)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn bind_program(&mut self) {
        (**self).bind_program()
    }

    fn bind_data_texture(&mut self, handle: BufferHandle, unit: i32) {
        (**self).bind_data_texture(handle, unit)
    }

    fn set_uniforms(&mut self, uniforms: &FrameUniforms) {
        (**self).set_uniforms(uniforms)
    }

    fn draw_points(&mut self, call: DrawCall) -> Result<()> {
        (**self).draw_points(call)
    }
}

/// Vertical field of view in degrees for a viewport of `aspect_ratio`.
///
/// Landscape viewports use `min_fov_deg`. Portrait ones widen the vertical
/// angle so the horizontal field of view stays at `min_fov_deg`.
pub fn vfov_deg(min_fov_deg: f32, aspect_ratio: f32) -> f32 {
    if aspect_ratio >= 1.0 {
        return min_fov_deg;
    }
    let min_fov = min_fov_deg.to_radians();
    (2.0 * ((min_fov * 0.5).tan() / aspect_ratio).atan()).to_degrees()
}

/// OpenGL-style right-handed perspective projection.
pub fn projection(min_fov_deg: f32, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(
        vfov_deg(min_fov_deg, aspect_ratio).to_radians(),
        aspect_ratio,
        near,
        far,
    )
}

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CompileProgram {
        vertex: &'static str,
        fragment: &'static str,
    },
    CreateBuffer {
        handle: BufferHandle,
        len: usize,
    },
    DestroyBuffer(BufferHandle),
    Clear,
    BindProgram,
    BindTexture {
        handle: BufferHandle,
        unit: i32,
    },
    SetUniforms(FrameUniforms),
    Draw(DrawCall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InjectedFailure {
    Compile(ShaderStage),
    Link,
}

/// In-memory backend that records every call. Used for headless runs and
/// as the GPU stand-in in tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    live: BTreeMap<BufferHandle, usize>,
    next_handle: u64,
    linked: bool,
    bound: Option<BufferHandle>,
    failure: Option<InjectedFailure>,
    frames: u64,
    last_uniforms: Option<FrameUniforms>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `stage` never compiles.
    pub fn failing_compile(stage: ShaderStage) -> Self {
        Self {
            failure: Some(InjectedFailure::Compile(stage)),
            ..Self::default()
        }
    }

    /// A backend whose program never links.
    pub fn failing_link() -> Self {
        Self {
            failure: Some(InjectedFailure::Link),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Buffers created and not yet destroyed, with their byte length.
    pub fn live_buffers(&self) -> impl Iterator<Item = (BufferHandle, usize)> + '_ {
        self.live.iter().map(|(handle, len)| (*handle, *len))
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    pub fn last_uniforms(&self) -> Option<&FrameUniforms> {
        self.last_uniforms.as_ref()
    }
}

impl GpuBackend for RecordingBackend {
    fn compile_program(&mut self, program: &ProgramSource) -> Result<()> {
        self.calls.push(BackendCall::CompileProgram {
            vertex: program.vertex.resource,
            fragment: program.fragment.resource,
        });
        match self.failure {
            Some(InjectedFailure::Compile(stage)) => Err(TrigramVizError::ShaderCompile {
                stage,
                log: "injected compile failure".to_string(),
            }),
            Some(InjectedFailure::Link) => {
                Err(TrigramVizError::ShaderLink("injected link failure".to_string()))
            }
            None => {
                self.linked = true;
                Ok(())
            }
        }
    }

    fn create_data_buffer(&mut self, bytes: &[u8]) -> Result<BufferHandle> {
        self.next_handle += 1;
        let handle = BufferHandle(self.next_handle);
        self.live.insert(handle, bytes.len());
        self.calls.push(BackendCall::CreateBuffer {
            handle,
            len: bytes.len(),
        });
        Ok(handle)
    }

    fn destroy_data_buffer(&mut self, handle: BufferHandle) {
        self.live.remove(&handle);
        if self.bound == Some(handle) {
            self.bound = None;
        }
        self.calls.push(BackendCall::DestroyBuffer(handle));
    }

    fn clear(&mut self) {
        self.calls.push(BackendCall::Clear);
    }

    fn bind_program(&mut self) {
        self.calls.push(BackendCall::BindProgram);
    }

    fn bind_data_texture(&mut self, handle: BufferHandle, unit: i32) {
        self.bound = Some(handle);
        self.calls.push(BackendCall::BindTexture { handle, unit });
    }

    fn set_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.last_uniforms = Some(*uniforms);
        self.calls.push(BackendCall::SetUniforms(*uniforms));
    }

    fn draw_points(&mut self, call: DrawCall) -> Result<()> {
        if !self.linked {
            return Err(TrigramVizError::msg("draw issued without a linked program"));
        }
        match self.bound {
            Some(handle) if self.live.contains_key(&handle) => {}
            _ => return Err(TrigramVizError::msg("draw issued without a bound data texture")),
        }
        self.frames += 1;
        self.calls.push(BackendCall::Draw(call));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn landscape_keeps_minimum_fov() {
        assert_eq!(vfov_deg(45.0, 1.0), 45.0);
        assert_eq!(vfov_deg(45.0, 16.0 / 9.0), 45.0);
    }

    #[test]
    fn portrait_keeps_horizontal_fov() {
        for aspect in [0.25f32, 0.5, 0.75, 0.99] {
            let vfov = vfov_deg(45.0, aspect).to_radians();
            let hfov = 2.0 * ((vfov * 0.5).tan() * aspect).atan();
            assert_relative_eq!(hfov.to_degrees(), 45.0, epsilon = 1e-3);
            assert!(vfov.to_degrees() > 45.0);
        }
    }

    #[test]
    fn projection_uses_widened_fov() {
        let tall = projection(MIN_FOV_DEG, 0.5, NEAR_PLANE, FAR_PLANE);
        let expected = Mat4::perspective_rh_gl(
            vfov_deg(MIN_FOV_DEG, 0.5).to_radians(),
            0.5,
            NEAR_PLANE,
            FAR_PLANE,
        );
        assert_eq!(tall, expected);
    }

    #[test]
    fn program_sources_are_embedded() {
        let program = ProgramSource::trigram();
        assert_eq!(program.vertex.resource, ":/trigram/vshader.glsl");
        assert_eq!(program.fragment.resource, ":/trigram/fshader.glsl");
        for uniform in ["tx", "c_cyl", "c_sph", "c_pos", "xfrm", "sz"] {
            assert!(program.vertex.code.contains(uniform), "missing {uniform}");
        }
        assert!(program.fragment.code.contains("c_brightness"));
    }

    #[test]
    fn recording_backend_tracks_buffers() {
        let mut backend = RecordingBackend::new();
        let a = backend.create_data_buffer(&[1, 2, 3]).unwrap();
        let b = backend.create_data_buffer(&[4; 10]).unwrap();
        backend.destroy_data_buffer(a);

        assert_eq!(backend.live_buffers().collect::<Vec<_>>(), vec![(b, 10)]);
    }

    #[test]
    fn recording_backend_rejects_incomplete_pipeline() {
        let mut backend = RecordingBackend::new();
        let call = DrawCall {
            first: 0,
            count: 1,
            blend: BlendMode::Additive,
        };
        assert!(backend.draw_points(call).is_err());

        backend.compile_program(&ProgramSource::trigram()).unwrap();
        assert!(backend.draw_points(call).is_err());

        let handle = backend.create_data_buffer(&[0; 8]).unwrap();
        backend.bind_data_texture(handle, DATA_TEXTURE_UNIT);
        assert!(backend.draw_points(call).is_ok());
        assert_eq!(backend.frames_drawn(), 1);
    }

    #[test]
    fn injected_failures_surface_as_pipeline_errors() {
        let err = RecordingBackend::failing_compile(ShaderStage::Vertex)
            .compile_program(&ProgramSource::trigram())
            .unwrap_err();
        assert!(matches!(
            err,
            TrigramVizError::ShaderCompile {
                stage: ShaderStage::Vertex,
                ..
            }
        ));

        let err = RecordingBackend::failing_link()
            .compile_program(&ProgramSource::trigram())
            .unwrap_err();
        assert!(err.is_pipeline_failure());
    }
}
