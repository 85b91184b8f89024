//! Core library for the Trigram Visualiser application.
//!
//! A byte blob is drawn as a point cloud: every window of three consecutive
//! bytes (or two bytes plus the offset, in layered digram mode) becomes one
//! point. Each module owns one piece of that pipeline. `analysis` picks a
//! brightness from the byte histogram, `scene` morphs the cloud between
//! shapes, `manipulator` moves the camera, and `buffer`/`render` hand the
//! data and uniforms to a GPU backend. [`VisualizationSurface`] ties them
//! together frame by frame.

pub mod analysis;
pub mod buffer;
pub mod config;
pub mod error;
pub mod input;
pub mod manipulator;
pub mod notify;
pub mod render;
pub mod scene;
pub mod source;
pub mod surface;
pub mod timeline;

pub use analysis::{intensity, suggest_brightness, BrightnessState};
pub use buffer::{DataBufferBridge, DataSnapshot};
pub use config::{AppConfig, BrightnessConfig, SurfaceConfig};
pub use error::{Result, TrigramVizError};
pub use input::{Buttons, InputEvent, KeyCode, Modifiers, PointerButton};
pub use manipulator::{
    FreeManipulator, Manipulator, ManipulatorController, ManipulatorKind, SpinManipulator,
    TrackballManipulator,
};
pub use notify::{Notification, NotificationQueue};
pub use render::{
    BackendCall, BufferHandle, FrameUniforms, GpuBackend, ProgramSource, RecordingBackend,
    ShaderStage,
};
pub use scene::{Blend, Mode, MorphState, Shape};
pub use source::{ByteBlob, DataSource};
pub use surface::VisualizationSurface;
pub use timeline::AnimationClock;
