//! Drives the GPU-free half of an interactive session: config, navigation,
//! color table regeneration and view fitting, the way the renderer sequences
//! them each frame.

use fractalview_core::{
    ColorTable, DeviceView, LaunchGeometry, NavigationEffect, NavigationInput, Precision,
    RenderConfig, ViewRect, ViewerState,
};

const VIEWPORT: (u32, u32) = (200, 100);

fn start() -> (ViewerState, ColorTable) {
    let state = RenderConfig::default().viewer_state().unwrap();
    let table = ColorTable::generate(state.palette, state.budget);
    (state, table)
}

fn apply(
    state: &mut ViewerState,
    table: &mut ColorTable,
    input: NavigationInput,
) -> NavigationEffect {
    let effect = state.apply(input, VIEWPORT);
    if effect == NavigationEffect::RegenerateColors {
        *table = ColorTable::generate(state.palette, state.budget);
    }
    effect
}

#[test]
fn rejected_budget_change_leaves_table_untouched() {
    let (mut state, mut table) = start();
    for _ in 0..4 {
        apply(&mut state, &mut table, NavigationInput::FewerIterations);
    }
    assert_eq!(state.budget.get(), 100);
    let before = table.clone();

    let effect = apply(&mut state, &mut table, NavigationInput::FewerIterations);

    assert_eq!(effect, NavigationEffect::Unchanged);
    assert_eq!(state.budget.get(), 100);
    assert_eq!(table, before);
}

#[test]
fn table_follows_budget_and_palette() {
    let (mut state, mut table) = start();

    apply(&mut state, &mut table, NavigationInput::MoreIterations);
    apply(&mut state, &mut table, NavigationInput::TogglePalette);

    assert_eq!(table.len(), 600);
    assert!(table.is_current(state.palette, state.budget));
}

#[test]
fn frame_view_is_aspect_fitted_before_upload() {
    let (mut state, _) = start();
    assert_eq!(state.view, ViewRect::new(-1.0, 1.0, -1.0, 1.0));

    let fitted = state.view.fit_aspect(VIEWPORT.0, VIEWPORT.1);
    assert!((fitted.span_im() - 1.0).abs() < 1e-12);

    let device = DeviceView::from_rect(&fitted);
    assert_eq!(device.single(), [-1.0, 1.0, -0.5, 0.5]);
    assert_eq!(device.as_bytes(Precision::Single).len(), 16);

    state.apply(NavigationInput::Zoom { steps: 3 }, VIEWPORT);
    let fitted = state.view.fit_aspect(VIEWPORT.0, VIEWPORT.1);
    assert!((fitted.span_re() / fitted.span_im() - 2.0).abs() < 1e-9);
}

#[test]
fn configured_wide_view_is_not_stretched() {
    let json = r#"{ "view": { "min_re": -2.0, "max_re": 1.0, "min_im": -1.0, "max_im": 1.0 } }"#;
    let state = RenderConfig::from_json_str(json).unwrap().viewer_state().unwrap();

    let fitted = state.view.fit_aspect(800, 600);
    assert!((fitted.span_re() / fitted.span_im() - 800.0 / 600.0).abs() < 1e-9);
    assert_eq!(DeviceView::from_rect(&fitted).double(), [-2.0, 1.0, -1.125, 1.125]);
}

#[test]
fn supersampled_surface_geometry() {
    let (mut state, mut table) = start();
    apply(&mut state, &mut table, NavigationInput::MoreSupersampling);
    apply(&mut state, &mut table, NavigationInput::MoreSupersampling);

    let (w, h) = state.supersampling.scale(VIEWPORT.0, VIEWPORT.1);
    assert_eq!((w, h), (800, 400));
    assert_eq!(LaunchGeometry::for_surface(w, h).workgroups(), (50, 25));
}
