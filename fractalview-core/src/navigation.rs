//! User navigation inputs and the interactive state they mutate.
//!
//! The input layer (window events, key bindings) lives outside this crate;
//! it translates its events into [`NavigationInput`] values. Applying one
//! reports which GPU resources the renderer has to rebuild.

use crate::budget::IterationBudget;
use crate::palette::Palette;
use crate::supersampling::Supersampling;
use crate::view::ViewRect;

/// A single navigation command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NavigationInput {
    /// Drag by a screen-space delta in pixels.
    Pan { dx: f64, dy: f64 },
    /// Wheel notches; positive zooms in.
    Zoom { steps: i32 },
    MoreIterations,
    FewerIterations,
    MoreSupersampling,
    LessSupersampling,
    TogglePalette,
}

/// What has to happen after an input was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationEffect {
    /// Input was rejected or had no effect.
    Unchanged,
    /// Only the view moved; the next frame picks it up.
    Redraw,
    /// Budget or palette changed; the color table must be regenerated.
    RegenerateColors,
    /// Supersampling changed; the interop surface must be recreated.
    Resize,
}

/// Interactive render settings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewerState {
    pub view: ViewRect,
    pub budget: IterationBudget,
    pub palette: Palette,
    pub supersampling: Supersampling,
}

impl ViewerState {
    /// Apply `input` given the displayed viewport size in pixels.
    pub fn apply(&mut self, input: NavigationInput, viewport: (u32, u32)) -> NavigationEffect {
        match input {
            NavigationInput::Pan { dx, dy } => {
                if (dx == 0.0 && dy == 0.0) || viewport.0 == 0 || viewport.1 == 0 {
                    return NavigationEffect::Unchanged;
                }
                self.view.pan(dx, dy, viewport.0, viewport.1);
                NavigationEffect::Redraw
            }
            NavigationInput::Zoom { steps } => {
                if self.view.zoom(steps) {
                    NavigationEffect::Redraw
                } else {
                    NavigationEffect::Unchanged
                }
            }
            NavigationInput::MoreIterations => {
                self.budget = self.budget.increased();
                NavigationEffect::RegenerateColors
            }
            NavigationInput::FewerIterations => match self.budget.decreased() {
                Some(budget) => {
                    self.budget = budget;
                    NavigationEffect::RegenerateColors
                }
                None => NavigationEffect::Unchanged,
            },
            NavigationInput::MoreSupersampling => {
                let next = self.supersampling.increased();
                self.step_supersampling(next)
            }
            NavigationInput::LessSupersampling => {
                let next = self.supersampling.decreased();
                self.step_supersampling(next)
            }
            NavigationInput::TogglePalette => {
                self.palette = self.palette.toggled();
                NavigationEffect::RegenerateColors
            }
        }
    }

    fn step_supersampling(&mut self, next: Option<Supersampling>) -> NavigationEffect {
        match next {
            Some(level) => {
                self.supersampling = level;
                NavigationEffect::Resize
            }
            None => NavigationEffect::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::MIN_ITERATIONS;

    const VIEWPORT: (u32, u32) = (800, 600);

    #[test]
    fn iteration_inputs_step_and_floor() {
        let mut state = ViewerState::default();
        assert_eq!(
            state.apply(NavigationInput::MoreIterations, VIEWPORT),
            NavigationEffect::RegenerateColors
        );
        assert_eq!(state.budget.get(), 600);

        for _ in 0..5 {
            state.apply(NavigationInput::FewerIterations, VIEWPORT);
        }
        assert_eq!(state.budget.get(), MIN_ITERATIONS);

        assert_eq!(
            state.apply(NavigationInput::FewerIterations, VIEWPORT),
            NavigationEffect::Unchanged
        );
        assert_eq!(state.budget.get(), MIN_ITERATIONS);
    }

    #[test]
    fn supersampling_inputs_request_resize_within_range() {
        let mut state = ViewerState::default();
        assert_eq!(
            state.apply(NavigationInput::LessSupersampling, VIEWPORT),
            NavigationEffect::Unchanged
        );

        for expected in 1..=3 {
            assert_eq!(
                state.apply(NavigationInput::MoreSupersampling, VIEWPORT),
                NavigationEffect::Resize
            );
            assert_eq!(state.supersampling.exponent(), expected);
        }
        assert_eq!(
            state.apply(NavigationInput::MoreSupersampling, VIEWPORT),
            NavigationEffect::Unchanged
        );
    }

    #[test]
    fn palette_toggle_regenerates_colors() {
        let mut state = ViewerState::default();
        assert_eq!(
            state.apply(NavigationInput::TogglePalette, VIEWPORT),
            NavigationEffect::RegenerateColors
        );
        assert_eq!(state.palette, Palette::Ocean);
    }

    #[test]
    fn pan_and_zoom_only_redraw() {
        let mut state = ViewerState::default();
        let before = state.view;

        assert_eq!(
            state.apply(NavigationInput::Pan { dx: 10.0, dy: -4.0 }, VIEWPORT),
            NavigationEffect::Redraw
        );
        assert_ne!(state.view, before);

        assert_eq!(
            state.apply(NavigationInput::Zoom { steps: 1 }, VIEWPORT),
            NavigationEffect::Redraw
        );
        assert_eq!(
            state.apply(NavigationInput::Pan { dx: 0.0, dy: 0.0 }, VIEWPORT),
            NavigationEffect::Unchanged
        );
    }
}
