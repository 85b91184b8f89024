use std::time::{Duration, Instant};

use crate::{
    buffer::{self, DataBufferBridge, DataSnapshot},
    render::{projection, BlendMode, DrawCall, FrameUniforms, ProgramSource, DATA_TEXTURE_UNIT},
    AnimationClock, AppConfig, BrightnessState, DataSource, GpuBackend, InputEvent, KeyCode,
    ManipulatorController, ManipulatorKind, Mode, MorphState, Notification, NotificationQueue,
    Result, Shape, SurfaceConfig, TrigramVizError,
};

/// One visualisation instance: owns the animation state, the manipulators,
/// the GPU copy of the data and the backend that draws it.
///
/// The host drives it from a single thread: input goes to
/// [`VisualizationSurface::handle_event`], and [`VisualizationSurface::poll`]
/// is called from the event loop to tick and redraw at the fixed period.
pub struct VisualizationSurface<S: DataSource, B: GpuBackend> {
    config: SurfaceConfig,
    source: S,
    backend: B,
    bridge: DataBufferBridge,
    brightness: BrightnessState,
    morph: MorphState,
    clock: AnimationClock,
    manipulators: ManipulatorController,
    notes: NotificationQueue,
    width: u32,
    height: u32,
    initialized: bool,
    closed: bool,
    /// The source was handed out mutably and may differ from the GPU copy.
    stale: bool,
}

impl<S: DataSource, B: GpuBackend> VisualizationSurface<S, B> {
    /// Builds the surface without touching the GPU; see [`Self::initialize`].
    pub fn new(config: &AppConfig, source: S, backend: B, now: Instant) -> Self {
        let surface = &config.surface;
        Self {
            config: surface.clone(),
            source,
            backend,
            bridge: DataBufferBridge::new(),
            brightness: BrightnessState::new(
                config.brightness.initial,
                config.brightness.heuristic,
            ),
            morph: MorphState::new(surface.shape, surface.mode),
            clock: AnimationClock::new(surface.tick_period(), now),
            manipulators: ManipulatorController::new(surface.manipulator),
            notes: NotificationQueue::new(),
            width: surface.width,
            height: surface.height,
            initialized: false,
            closed: false,
            stale: false,
        }
    }

    /// Applies the brightness heuristic, compiles the program, uploads the
    /// data and starts the tick source. A program that fails to compile or
    /// link closes the surface for good.
    pub fn initialize(&mut self, now: Instant) -> Result<()> {
        if self.closed {
            return Err(TrigramVizError::SurfaceClosed);
        }

        self.brightness.auto_apply(self.source.data(), &mut self.notes);

        if let Err(err) = self.backend.compile_program(&ProgramSource::trigram()) {
            return Err(self.close(err));
        }
        tracing::debug!("trigram program linked");

        self.bridge
            .rebuild(&mut self.backend, DataSnapshot::of(&self.source))?;
        self.brightness
            .apply(self.brightness.value(), self.source.data_size());
        self.clock.start(now);
        self.initialized = true;
        self.stale = false;
        Ok(())
    }

    /// Re-reads the data source: re-runs the heuristic, replaces the GPU
    /// copy and recomputes the intensity for the new size.
    pub fn refresh(&mut self) -> Result<()> {
        if self.closed {
            return Err(TrigramVizError::SurfaceClosed);
        }

        self.brightness.auto_apply(self.source.data(), &mut self.notes);
        self.brightness
            .apply(self.brightness.value(), self.source.data_size());
        self.bridge
            .rebuild(&mut self.backend, DataSnapshot::of(&self.source))?;
        self.stale = false;
        Ok(())
    }

    /// Runs one tick and redraw if the tick period has elapsed. Returns
    /// whether a frame was drawn.
    pub fn poll(&mut self, now: Instant) -> Result<bool> {
        if self.closed || !self.initialized || !self.clock.poll(now) {
            return Ok(false);
        }
        self.tick();
        self.redraw_at(now)?;
        Ok(true)
    }

    /// How long the host may wait before calling [`Self::poll`] again.
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        if self.closed {
            return None;
        }
        self.clock.time_until_next(now)
    }

    /// Advances the morph animation by one fixed period.
    pub fn tick(&mut self) {
        if self.closed {
            return;
        }
        self.morph.tick(self.manipulators.is_playing());
    }

    /// Draws one frame; `now` feeds the manipulator's wall-clock delta.
    pub fn redraw_at(&mut self, now: Instant) -> Result<()> {
        if self.closed {
            return Err(TrigramVizError::SurfaceClosed);
        }
        let handle = self
            .bridge
            .handle()
            .ok_or(TrigramVizError::InvalidInput("surface drawn before initialisation"))?;

        let dt = self.clock.frame_delta(now);

        self.backend.clear();
        self.backend.bind_program();
        self.backend.bind_data_texture(handle, DATA_TEXTURE_UNIT);

        let projection = projection(
            self.config.min_fov_deg,
            self.aspect_ratio(),
            self.config.near,
            self.config.far,
        );
        self.manipulators.advance(dt);

        let size = self.bridge.size();
        let uniforms = FrameUniforms {
            texture_unit: DATA_TEXTURE_UNIT,
            cyl_blend: self.morph.cyl_blend(),
            sph_blend: self.morph.sph_blend(),
            pos_blend: self.morph.pos_blend(),
            transform: projection * self.manipulators.transform(),
            intensity: self.brightness.intensity(),
            data_size: u32::try_from(size).unwrap_or(u32::MAX),
        };
        self.backend.set_uniforms(&uniforms);
        self.backend.draw_points(DrawCall {
            first: 0,
            count: u32::try_from(self.point_count()).unwrap_or(u32::MAX),
            blend: BlendMode::Additive,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Width over height, with both sides clamped to at least one pixel.
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// Points drawn per frame for the data currently on the GPU.
    pub fn point_count(&self) -> usize {
        buffer::point_count(self.bridge.size())
    }

    /// Routes an input event: manipulator shortcuts first, then the
    /// controller with its promotion rules.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        if self.closed {
            return false;
        }
        if let Some(kind) = shortcut(event) {
            self.set_manipulator(kind);
            return true;
        }
        self.manipulators.dispatch(event, &mut self.notes)
    }

    pub fn set_manipulator(&mut self, kind: ManipulatorKind) -> bool {
        self.manipulators.set_manipulator(kind, &mut self.notes)
    }

    pub fn active_manipulator(&self) -> ManipulatorKind {
        self.manipulators.active_kind()
    }

    pub fn manipulators(&self) -> &ManipulatorController {
        &self.manipulators
    }

    pub fn set_shape(&mut self, shape: Shape, animate: bool) {
        self.morph.set_shape(shape, animate);
    }

    pub fn set_mode(&mut self, mode: Mode, animate: bool) {
        self.morph.set_mode(mode, animate);
    }

    pub fn morph(&self) -> &MorphState {
        &self.morph
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.manipulators.toggle_playing(&mut self.notes)
    }

    pub fn is_playing(&self) -> bool {
        self.manipulators.is_playing()
    }

    /// Brightness slider moved by the user. The intensity is computed for
    /// the data on the GPU, not for unrefreshed edits to the source.
    pub fn brightness_slider_moved(&mut self, value: u32) {
        let size = self.bridge.size();
        self.brightness.slider_moved(value, size, &mut self.notes);
    }

    /// Heuristic checkbox toggled by the user. With unrefreshed edits pending
    /// the suggestion waits for [`Self::refresh`].
    pub fn set_use_brightness_heuristic(&mut self, enabled: bool) {
        self.brightness.set_heuristic_enabled(enabled);
        if enabled && !self.stale {
            self.brightness.auto_apply(self.source.data(), &mut self.notes);
        }
    }

    pub fn brightness(&self) -> &BrightnessState {
        &self.brightness
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notes.drain()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the data; call [`Self::refresh`] afterwards.
    pub fn source_mut(&mut self) -> &mut S {
        self.stale = true;
        &mut self.source
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn close(&mut self, err: TrigramVizError) -> TrigramVizError {
        tracing::error!(error = %err, "closing visualisation surface");
        self.closed = true;
        self.initialized = false;
        self.bridge.release(&mut self.backend);
        err
    }
}

impl<S: DataSource, B: GpuBackend> Drop for VisualizationSurface<S, B> {
    fn drop(&mut self) {
        self.bridge.release(&mut self.backend);
    }
}

fn shortcut(event: &InputEvent) -> Option<ManipulatorKind> {
    let InputEvent::KeyPress { key, modifiers } = *event else {
        return None;
    };
    match (key, modifiers.ctrl) {
        (KeyCode::Escape, _) | (KeyCode::Digit1, true) => Some(ManipulatorKind::Spin),
        (KeyCode::Digit2, true) => Some(ManipulatorKind::Trackball),
        (KeyCode::Digit3, true) => Some(ManipulatorKind::Free),
        _ => None,
    }
}
