//! Plot geometry: points, pie arcs and axis scales.

use std::f64::consts::PI;

/// 2D point in SVG user space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Arc geometry for pie charts.
///
/// Angles are radians measured clockwise from twelve o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center: Point2D,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl ArcGeometry {
    #[must_use]
    pub const fn new(center: Point2D, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
        }
    }

    /// Sweep angle.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Whether the arc covers the whole circle.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.sweep() >= 2.0f64.mul_add(PI, -1e-9)
    }

    /// Point on the arc at `angle`.
    #[must_use]
    pub fn point_at_angle(&self, angle: f64) -> Point2D {
        Point2D::new(
            self.radius.mul_add(angle.sin(), self.center.x),
            self.radius.mul_add(-angle.cos(), self.center.y),
        )
    }

    /// Midpoint of the arc, pushed out by `factor` of the radius.
    #[must_use]
    pub fn label_point(&self, factor: f64) -> Point2D {
        let mid = (self.start_angle + self.end_angle) / 2.0;
        Self {
            radius: self.radius * factor,
            ..*self
        }
        .point_at_angle(mid)
    }

    /// SVG path data for the pie slice (center, arc, back to center).
    #[must_use]
    pub fn to_svg_path(&self) -> String {
        let start = self.point_at_angle(self.start_angle);
        let end = self.point_at_angle(self.end_angle);
        let large_arc = u8::from(self.sweep() > PI);
        format!(
            "M{:.2},{:.2} L{:.2},{:.2} A{:.2},{:.2} 0 {large_arc} 1 {:.2},{:.2} Z",
            self.center.x, self.center.y, start.x, start.y, self.radius, self.radius, end.x, end.y
        )
    }
}

/// Linear value scale for a chart axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataNormalizer {
    pub min: f64,
    pub max: f64,
}

impl DataNormalizer {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Count axis from zero to the nice bound above `max`.
    #[must_use]
    pub fn counts(max: usize) -> Self {
        let (_, nice_max) = Self::new(0.0, max.max(1) as f64).nice_bounds();
        Self::new(0.0, nice_max)
    }

    /// Normalize a value to [0, 1].
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range.abs() < 1e-10 {
            return 0.5;
        }
        (value - self.min) / range
    }

    /// Bounds rounded outward to the order of magnitude of the range.
    #[must_use]
    pub fn nice_bounds(&self) -> (f64, f64) {
        let range = self.max - self.min;
        if range.abs() < 1e-10 {
            return (self.min - 1.0, self.max + 1.0);
        }
        let magnitude = 10.0_f64.powf(range.log10().floor());
        let nice_min = (self.min / magnitude).floor() * magnitude;
        let nice_max = (self.max / magnitude).ceil() * magnitude;
        (nice_min, nice_max)
    }

    /// `n + 1` evenly spaced tick values from `min` to `max`.
    #[must_use]
    pub fn ticks(&self, n: usize) -> Vec<f64> {
        let n = n.max(1);
        (0..=n)
            .map(|i| (self.max - self.min).mul_add(i as f64 / n as f64, self.min))
            .collect()
    }
}
