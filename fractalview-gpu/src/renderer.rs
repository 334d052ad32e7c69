//! Interactive fractal renderer: session, kernel, surface and view state.

use crate::buffers::{check_color_budget, max_color_entries, ColorTableBuffer};
use crate::device::GpuSession;
use crate::dispatcher::ComputeDispatcher;
use crate::error::PipelineError;
use crate::present::Presenter;
use crate::program::{KernelProgram, KernelSource};
use crate::surface::InteropSurface;
use fractalview_core::{
    ColorTable, ConfigError, DeviceView, FrameDiagnostics, IterationBudget, NavigationEffect,
    NavigationInput, Palette, RenderConfig, Supersampling, ViewRect, ViewerState,
};
use std::time::Duration;

/// Owns every GPU resource needed to compute and show one fractal view.
///
/// Errors from [`frame`](Self::frame) are kept until the next frame. Errors
/// from [`resize`](Self::resize) are kept until a resize succeeds, and color
/// table errors until a table is uploaded; both block frames while present.
pub struct FractalRenderer {
    // Dropped before the session that created them.
    surface: Option<InteropSurface>,
    colors: Option<ColorTableBuffer>,
    program: KernelProgram,
    session: GpuSession,
    color_table: ColorTable,
    state: ViewerState,
    base_size: Option<(u32, u32)>,
    max_color_entries: u32,
    frame_error: Option<PipelineError>,
    surface_error: Option<PipelineError>,
    color_error: Option<PipelineError>,
    last_frame_time: Option<Duration>,
}

impl FractalRenderer {
    /// Build the kernel and upload the initial color table. No surface exists
    /// until the first [`resize`](Self::resize).
    pub fn new(session: GpuSession, config: &RenderConfig) -> Result<Self, PipelineError> {
        let state = config.viewer_state()?;

        let source = match &config.kernel_path {
            Some(path) => KernelSource::File(path.clone()),
            None => KernelSource::bundled(),
        };
        let program = KernelProgram::build(&session, &source, &config.entry_point)?;

        let max_color_entries = max_color_entries(&session.device);
        check_color_budget(state.budget, max_color_entries)?;
        let color_table = ColorTable::generate(state.palette, state.budget);
        let colors = ColorTableBuffer::upload(&session, &color_table)?;

        Ok(Self {
            surface: None,
            colors: Some(colors),
            program,
            session,
            color_table,
            state,
            base_size: None,
            max_color_entries,
            frame_error: None,
            surface_error: None,
            color_error: None,
            last_frame_time: None,
        })
    }

    /// Recreate the surface for a new displayed size.
    ///
    /// The old surface is released first, so on failure no surface is bound
    /// and the error stays visible until a later resize succeeds.
    pub fn resize(&mut self, width: u32, height: u32) -> Option<&PipelineError> {
        self.base_size = Some((width, height));
        self.rebuild_surface();
        self.surface_error.as_ref()
    }

    pub fn set_supersampling(&mut self, supersampling: Supersampling) -> Option<&PipelineError> {
        if supersampling != self.state.supersampling {
            self.state.supersampling = supersampling;
            self.rebuild_surface();
        }
        self.surface_error.as_ref()
    }

    /// Set the iteration budget. Values below the minimum are ignored and
    /// `Ok(false)` is returned. A budget whose color table the device cannot
    /// hold is rejected with [`PipelineError::Buffer`] and nothing changes.
    pub fn set_iteration_budget(&mut self, value: u32) -> Result<bool, PipelineError> {
        let Some(budget) = IterationBudget::new(value) else {
            log::debug!("Ignoring iteration budget {value}");
            return Ok(false);
        };
        check_color_budget(budget, self.max_color_entries)?;

        self.state.budget = budget;
        self.regenerate_colors();
        Ok(true)
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.state.palette = palette;
        self.regenerate_colors();
    }

    pub fn toggle_palette(&mut self) {
        self.set_palette(self.state.palette.toggled());
    }

    /// Replace the logical view. Empty or non-finite rectangles are rejected
    /// and the current view is kept.
    pub fn set_view(&mut self, view: ViewRect) -> Result<(), ConfigError> {
        if view.is_degenerate() {
            return Err(ConfigError::DegenerateView(view));
        }
        self.state.view = view;
        Ok(())
    }

    /// Logical view before aspect fitting.
    pub fn view(&self) -> ViewRect {
        self.state.view
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Apply a navigation input and rebuild what it invalidated.
    pub fn apply(&mut self, input: NavigationInput) -> NavigationEffect {
        let viewport = self.base_size.unwrap_or((0, 0));
        let effect = self.state.apply(input, viewport);

        match effect {
            NavigationEffect::RegenerateColors => self.regenerate_colors(),
            NavigationEffect::Resize => self.rebuild_surface(),
            NavigationEffect::Redraw | NavigationEffect::Unchanged => {}
        }
        effect
    }

    /// Compute one frame, without touching the stored error state.
    pub fn run_frame(&mut self) -> Result<Duration, PipelineError> {
        let (width, height) = self.base_size.unwrap_or((0, 0));
        let view = DeviceView::from_rect(&self.state.view.fit_aspect(width, height));

        let elapsed = ComputeDispatcher::run_frame(
            &self.session,
            &self.program,
            self.surface.as_mut(),
            self.colors.as_ref(),
            &view,
            self.state.budget,
        )?;
        self.last_frame_time = Some(elapsed);
        Ok(elapsed)
    }

    /// Compute one frame and return the error to display, if any.
    pub fn frame(&mut self) -> Option<&PipelineError> {
        self.frame_error = None;

        if self.surface_error.is_none() && self.color_error.is_none() {
            if let Err(e) = self.run_frame() {
                log::warn!("Frame failed: {e}");
                self.frame_error = Some(e);
            }
        }
        self.error()
    }

    /// Draw the current surface to `target`.
    pub fn present(
        &self,
        presenter: &Presenter,
        target: &wgpu::TextureView,
    ) -> Result<(), PipelineError> {
        let surface = self
            .surface
            .as_ref()
            .ok_or(PipelineError::NotBound("Texture buffer"))?;
        presenter.draw(&self.session, surface, target)
    }

    pub fn session(&self) -> &GpuSession {
        &self.session
    }

    /// Rendering-side texture handle.
    pub fn texture(&self) -> Option<&wgpu::Texture> {
        self.surface.as_ref().map(InteropSurface::texture)
    }

    pub fn surface(&self) -> Option<&InteropSurface> {
        self.surface.as_ref()
    }

    pub fn color_table(&self) -> &ColorTable {
        &self.color_table
    }

    pub fn iteration_budget(&self) -> u32 {
        self.state.budget.get()
    }

    /// "Single" or "Double".
    pub fn precision(&self) -> &'static str {
        self.program.precision().label()
    }

    pub fn last_frame_time(&self) -> Option<Duration> {
        self.last_frame_time
    }

    /// Error to display: a failed resize, then a failed color table upload,
    /// then a failed frame.
    pub fn error(&self) -> Option<&PipelineError> {
        self.surface_error
            .as_ref()
            .or(self.color_error.as_ref())
            .or(self.frame_error.as_ref())
    }

    pub fn diagnostics(&self) -> FrameDiagnostics {
        FrameDiagnostics {
            iteration_budget: self.state.budget.get(),
            supersampling_factor: self.state.supersampling.factor(),
            frame_time: self.last_frame_time,
            precision: self.program.precision(),
        }
    }

    /// Release GPU resources and shut the session down.
    pub fn shutdown(self) {
        let Self {
            surface,
            colors,
            program,
            session,
            ..
        } = self;
        drop(surface);
        drop(colors);
        drop(program);
        session.shutdown();
    }

    fn rebuild_surface(&mut self) {
        let Some((width, height)) = self.base_size else {
            return;
        };

        self.surface = None;
        match InteropSurface::create(&self.session, width, height, self.state.supersampling) {
            Ok(surface) => {
                self.surface = Some(surface);
                self.surface_error = None;
            }
            Err(e) => {
                log::warn!("Surface allocation failed: {e}");
                self.surface_error = Some(e);
            }
        }
    }

    fn regenerate_colors(&mut self) {
        let (palette, budget) = (self.state.palette, self.state.budget);
        if self
            .colors
            .as_ref()
            .is_some_and(|colors| colors.is_current(palette, budget))
        {
            return;
        }

        self.colors = None;
        if let Err(e) = check_color_budget(budget, self.max_color_entries) {
            log::warn!("Color table rejected: {e}");
            self.color_error = Some(e);
            return;
        }

        self.color_table = ColorTable::generate(palette, budget);
        match ColorTableBuffer::upload(&self.session, &self.color_table) {
            Ok(colors) => {
                self.colors = Some(colors);
                self.color_error = None;
            }
            Err(e) => {
                log::warn!("Color table upload failed: {e}");
                self.color_error = Some(e);
            }
        }
    }
}
