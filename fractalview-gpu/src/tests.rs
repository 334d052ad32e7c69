//! GPU tests. Each one skips when no GPU adapter is available.

use crate::{
    read_surface_pixels, ColorTableBuffer, ComputeDispatcher, FractalRenderer, FrameArgs,
    GpuSession, InteropSurface, KernelProgram, KernelSource, Ownership, PipelineError, Presenter,
    SessionAvailability,
};
use fractalview_core::{
    ColorTable, ConfigError, DeviceView, IterationBudget, NavigationEffect, NavigationInput,
    Palette, Precision, RenderConfig, Supersampling, ViewRect,
};

fn session() -> Option<GpuSession> {
    match GpuSession::try_init() {
        SessionAvailability::Available(session) => Some(session),
        SessionAvailability::Unavailable(reason) => {
            println!("Skipping test: no GPU available ({reason})");
            None
        }
    }
}

fn renderer() -> Option<FractalRenderer> {
    let session = session()?;
    match FractalRenderer::new(session, &RenderConfig::default()) {
        Ok(renderer) => Some(renderer),
        Err(e) => panic!("renderer setup failed: {e}"),
    }
}

#[test]
fn gpu_init_does_not_panic() {
    match GpuSession::try_init() {
        SessionAvailability::Available(session) => {
            println!("GPU available: {}", session.adapter_info().name);
            assert!(session.capabilities().supports_interop);
            session.shutdown();
        }
        SessionAvailability::Unavailable(reason) => println!("GPU unavailable: {reason}"),
    }
}

#[test]
fn renders_800x600_frame() {
    let Some(mut renderer) = renderer() else {
        return;
    };

    assert!(renderer.resize(800, 600).is_none());
    assert!(renderer.frame().is_none(), "{:?}", renderer.error());

    let surface = renderer.surface().expect("surface bound after resize");
    assert_eq!(surface.size(), (800, 600));
    assert_eq!(surface.ownership(), Ownership::RenderingOwned);
    assert_eq!(renderer.iteration_budget(), 500);
    assert!(renderer.last_frame_time().is_some());
    assert!(renderer.texture().is_some());

    let lines = renderer.diagnostics().lines();
    assert_eq!(lines[0], "Max iterations (+/-): 500");
    assert_eq!(lines[1], "Supersampling (a/d): 1x");
    assert!(lines[4] == "Precision: Single" || lines[4] == "Precision: Double");

    renderer.shutdown();
}

#[test]
fn view_buffer_matches_device_precision() {
    let Some(session) = session() else {
        return;
    };

    let precision = session.precision();
    let view = DeviceView::from_rect(&ViewRect::default());
    let args = FrameArgs::new(&session, (16, 16), &view, precision, 500).unwrap();

    let expected = match precision {
        Precision::Double => 32,
        Precision::Single => 16,
    };
    assert_eq!(args.view_size(), expected);
}

#[test]
fn supersampling_scales_the_surface() {
    let Some(mut renderer) = renderer() else {
        return;
    };

    renderer.resize(200, 100);
    assert!(renderer.set_supersampling(Supersampling::new(2).unwrap()).is_none());
    assert_eq!(renderer.surface().map(InteropSurface::size), Some((800, 400)));
    assert_eq!(renderer.surface().unwrap().base_size(), (200, 100));

    assert_eq!(
        renderer.apply(NavigationInput::LessSupersampling),
        NavigationEffect::Resize
    );
    assert_eq!(renderer.surface().map(InteropSurface::size), Some((400, 200)));
    assert!(renderer.frame().is_none());
}

#[test]
fn failed_resize_leaves_no_surface_until_next_resize() {
    let Some(mut renderer) = renderer() else {
        return;
    };

    renderer.resize(64, 64);
    assert!(renderer.surface().is_some());

    let err = renderer.resize(u32::MAX / 2, 64);
    assert!(matches!(err, Some(PipelineError::Allocation(_))));
    assert!(renderer.surface().is_none());

    // Sticky: frames keep showing the resize error and do not dispatch.
    assert!(matches!(renderer.frame(), Some(PipelineError::Allocation(_))));
    assert!(matches!(renderer.frame(), Some(PipelineError::Allocation(_))));

    assert!(renderer.resize(64, 64).is_none());
    assert!(renderer.frame().is_none());
}

#[test]
fn dispatch_requires_bound_resources() {
    let Some(session) = session() else {
        return;
    };

    let program = KernelProgram::build(&session, &KernelSource::bundled(), "mandelbrot").unwrap();
    let table = ColorTable::generate(Palette::Fire, IterationBudget::default());
    let colors = ColorTableBuffer::upload(&session, &table).unwrap();
    let view = DeviceView::from_rect(&ViewRect::default());

    let err = ComputeDispatcher::run_frame(
        &session,
        &program,
        None,
        Some(&colors),
        &view,
        IterationBudget::default(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Texture buffer not bound");

    let mut surface = InteropSurface::create(&session, 32, 32, Supersampling::default()).unwrap();
    let err = ComputeDispatcher::run_frame(
        &session,
        &program,
        Some(&mut surface),
        None,
        &view,
        IterationBudget::default(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Color buffer not bound");
    assert_eq!(surface.ownership(), Ownership::RenderingOwned);
}

#[test]
fn budget_below_minimum_is_ignored() {
    let Some(mut renderer) = renderer() else {
        return;
    };

    assert!(!renderer.set_iteration_budget(99).unwrap());
    assert_eq!(renderer.iteration_budget(), 500);
    assert_eq!(renderer.color_table().len(), 500);

    assert!(renderer.set_iteration_budget(100).unwrap());
    assert_eq!(renderer.color_table().len(), 100);

    renderer.toggle_palette();
    assert_eq!(renderer.color_table().palette(), Palette::Ocean);
}

#[test]
fn budget_beyond_device_limit_is_rejected() {
    let Some(mut renderer) = renderer() else {
        return;
    };

    let err = renderer.set_iteration_budget(u32::MAX).unwrap_err();
    assert!(matches!(err, PipelineError::Buffer(_)));
    assert_eq!(renderer.iteration_budget(), 500);
    assert_eq!(renderer.color_table().len(), 500);
    assert!(renderer.error().is_none());
}

#[test]
fn degenerate_view_is_rejected() {
    let Some(mut renderer) = renderer() else {
        return;
    };

    let before = renderer.view();
    let inverted = ViewRect::new(1.0, -1.0, -1.0, 1.0);
    let err = renderer.set_view(inverted).unwrap_err();
    assert!(matches!(err, ConfigError::DegenerateView(_)));
    assert!(renderer.set_view(ViewRect::new(f64::NAN, 1.0, -1.0, 1.0)).is_err());
    assert_eq!(renderer.view(), before);

    let wide = ViewRect::new(-2.0, 1.0, -1.0, 1.0);
    renderer.set_view(wide).unwrap();
    assert_eq!(renderer.view(), wide);
}

#[test]
fn surface_cannot_be_acquired_twice() {
    let Some(session) = session() else {
        return;
    };

    let mut surface = InteropSurface::create(&session, 16, 16, Supersampling::default()).unwrap();
    let access = surface.acquire(&session).unwrap();
    std::mem::forget(access);

    assert_eq!(surface.ownership(), Ownership::ComputeOwned);
    assert!(matches!(surface.acquire(&session), Err(PipelineError::Acquire(_))));
    assert!(surface.ensure_rendering_owned().is_err());

    // Balance the scope pushed by the leaked guard.
    let _ = pollster::block_on(session.device.pop_error_scope());
}

#[test]
fn released_surface_returns_to_rendering() {
    let Some(session) = session() else {
        return;
    };

    let mut surface = InteropSurface::create(&session, 16, 16, Supersampling::default()).unwrap();
    {
        let _access = surface.acquire(&session).unwrap();
    }
    assert_eq!(surface.ownership(), Ownership::RenderingOwned);

    let access = surface.acquire(&session).unwrap();
    assert_eq!(access.size(), (16, 16));
    access.release().unwrap();
    assert_eq!(surface.ownership(), Ownership::RenderingOwned);
}

#[test]
fn build_error_carries_compiler_log() {
    let Some(session) = session() else {
        return;
    };

    let source = KernelSource::Text {
        name: "broken.wgsl".to_string(),
        text: "fn mandelbrot( {".to_string(),
    };
    match KernelProgram::build(&session, &source, "mandelbrot") {
        Err(PipelineError::ProgramBuild { log }) => assert!(!log.is_empty()),
        Err(e) => panic!("expected a build error, got {e}"),
        Ok(_) => panic!("broken kernel compiled"),
    }
}

#[test]
fn unknown_entry_point_fails_resolution() {
    let Some(session) = session() else {
        return;
    };

    match KernelProgram::build(&session, &KernelSource::bundled(), "julia") {
        Err(PipelineError::KernelResolution { entry_point, .. }) => {
            assert_eq!(entry_point, "julia")
        }
        Err(e) => panic!("expected a resolution error, got {e}"),
        Ok(_) => panic!("resolved a missing entry point"),
    }
}

#[test]
fn rendered_pixels_are_opaque_and_colored() {
    let Some(mut renderer) = renderer() else {
        return;
    };

    renderer.resize(64, 48);
    assert!(renderer.frame().is_none());

    let surface = renderer.surface().unwrap();
    let pixels = read_surface_pixels(renderer.session(), surface).unwrap();
    assert_eq!(pixels.len(), 64 * 48 * 4);
    assert!(pixels.chunks_exact(4).all(|p| p[3] == 255));
    // [-1, 1] x [-0.75, 0.75] has both escaping and bounded points.
    assert!(pixels.chunks_exact(4).any(|p| p[..3] != [0, 0, 0]));
    assert!(pixels.chunks_exact(4).any(|p| p[..3] == [0, 0, 0]));
}

#[test]
fn presenter_draws_into_offscreen_target() {
    let Some(mut renderer) = renderer() else {
        return;
    };

    renderer.resize(32, 32);
    assert!(renderer.frame().is_none());

    let presenter = Presenter::new(renderer.session(), wgpu::TextureFormat::Rgba8Unorm);
    let target = renderer
        .session()
        .device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("present_target"),
            size: wgpu::Extent3d {
                width: 64,
                height: 64,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    renderer.present(&presenter, &view).unwrap();
    renderer.session().wait_idle();
}
