//! Visible complex-plane rectangle and its device-side representation.

use crate::precision::Precision;
use serde::{Deserialize, Serialize};

/// Fraction of the span each edge travels per zoom step.
pub const ZOOM_STEP_FRACTION: f64 = 0.05;

/// Rectangle in the complex plane.
///
/// The real axis runs horizontally, the imaginary axis vertically. Bounds are
/// kept in f64; [`DeviceView`] narrows them for single precision devices.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewRect {
    pub min_re: f64,
    pub max_re: f64,
    pub min_im: f64,
    pub max_im: f64,
}

impl Default for ViewRect {
    fn default() -> Self {
        Self::new(-1.0, 1.0, -1.0, 1.0)
    }
}

impl ViewRect {
    pub fn new(min_re: f64, max_re: f64, min_im: f64, max_im: f64) -> Self {
        Self {
            min_re,
            max_re,
            min_im,
            max_im,
        }
    }

    /// Width of the rectangle along the real axis.
    pub fn span_re(&self) -> f64 {
        self.max_re - self.min_re
    }

    /// Height of the rectangle along the imaginary axis.
    pub fn span_im(&self) -> f64 {
        self.max_im - self.min_im
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_re + self.max_re) * 0.5,
            (self.min_im + self.max_im) * 0.5,
        )
    }

    /// True when a bound is not finite or a span is not positive.
    pub fn is_degenerate(&self) -> bool {
        let bounds = [self.min_re, self.max_re, self.min_im, self.max_im];
        bounds.iter().any(|b| !b.is_finite()) || self.span_re() <= 0.0 || self.span_im() <= 0.0
    }

    /// Fit the rectangle to a viewport's aspect ratio.
    ///
    /// A viewport wider than tall keeps the real span and sets the imaginary
    /// span to `span_re * height / width` about its center. Otherwise the
    /// imaginary span is kept and the real span becomes
    /// `span_im * width / height`. Zero-sized viewports leave the rectangle
    /// untouched.
    pub fn fit_aspect(&self, viewport_width: u32, viewport_height: u32) -> Self {
        if viewport_width == 0 || viewport_height == 0 {
            return *self;
        }

        let w = viewport_width as f64;
        let h = viewport_height as f64;
        let (center_re, center_im) = self.center();

        if w > h {
            let half = self.span_re() * h / w * 0.5;
            Self::new(self.min_re, self.max_re, center_im - half, center_im + half)
        } else {
            let half = self.span_im() * w / h * 0.5;
            Self::new(center_re - half, center_re + half, self.min_im, self.max_im)
        }
    }

    /// Pan by a screen-space delta.
    ///
    /// The delta is converted to complex-plane units proportional to the
    /// current span. Dragging right moves the view left along the real axis;
    /// dragging down moves it up along the imaginary axis.
    pub fn pan(&mut self, dx: f64, dy: f64, viewport_width: u32, viewport_height: u32) {
        if viewport_width == 0 || viewport_height == 0 {
            return;
        }

        let scaled_x = dx / viewport_width as f64 * self.span_re();
        let scaled_y = dy / viewport_height as f64 * self.span_im();

        self.min_re -= scaled_x;
        self.max_re -= scaled_x;
        self.min_im += scaled_y;
        self.max_im += scaled_y;
    }

    /// Zoom by `steps` wheel notches about the current center.
    ///
    /// Every edge moves toward the opposite edge by `ZOOM_STEP_FRACTION * steps`
    /// of the span; negative steps zoom out. Returns false when the step was
    /// ignored because it would collapse or invert the rectangle.
    pub fn zoom(&mut self, steps: i32) -> bool {
        let t = ZOOM_STEP_FRACTION * steps as f64;
        if steps == 0 || t >= 0.5 {
            return false;
        }

        let zoomed = Self::new(
            lerp(self.min_re, self.max_re, t),
            lerp(self.max_re, self.min_re, t),
            lerp(self.min_im, self.max_im, t),
            lerp(self.max_im, self.min_im, t),
        );
        if zoomed.is_degenerate() {
            return false;
        }

        *self = zoomed;
        true
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// View bounds as uploaded to the device, kept in both precisions.
///
/// Order is `[min_re, max_re, min_im, max_im]`, matching the kernel's
/// four-scalar view buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeviceView {
    double: [f64; 4],
    single: [f32; 4],
}

impl DeviceView {
    pub fn from_rect(rect: &ViewRect) -> Self {
        let double = [rect.min_re, rect.max_re, rect.min_im, rect.max_im];
        Self {
            double,
            single: double.map(|v| v as f32),
        }
    }

    pub fn double(&self) -> [f64; 4] {
        self.double
    }

    pub fn single(&self) -> [f32; 4] {
        self.single
    }

    /// Raw bytes of the representation matching `precision`.
    pub fn as_bytes(&self, precision: Precision) -> &[u8] {
        match precision {
            Precision::Double => bytemuck::cast_slice(&self.double),
            Precision::Single => bytemuck::cast_slice(&self.single),
        }
    }
}

impl From<ViewRect> for DeviceView {
    fn from(rect: ViewRect) -> Self {
        Self::from_rect(&rect)
    }
}
