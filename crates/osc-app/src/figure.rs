//! Spring drawing geometry.
//!
//! Pure layout of the spring-and-mass picture for a given displacement, in
//! canvas coordinates (origin top-left, y growing downwards). Any renderer
//! can stroke the polyline and the mass box; nothing here draws.

/// Canvas the layout is designed for.
pub const CANVAS_WIDTH: f64 = 400.0;
pub const CANVAS_HEIGHT: f64 = 300.0;

const ANCHOR_X: f64 = 200.0;
const COIL_COUNT: usize = 20;
const COIL_HALF_WIDTH: f64 = 20.0;
const MASS_SIZE: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpringFigure {
    /// Zig-zag from the ceiling anchor down to the top of the mass.
    pub coil: Vec<Point>,
    pub mass: Rect,
}

impl SpringFigure {
    /// Lay out the figure for displacement `position` (nominally in [-1, 1]).
    pub fn layout(position: f64) -> Self {
        let stretch = position + 1.0;
        let mut coil = Vec::with_capacity(COIL_COUNT + 2);
        coil.push(Point { x: ANCHOR_X, y: 0.0 });

        // Each coil point is offset by the previous coil index doubled.
        let mut prev = 0.0;
        for k in 0..COIL_COUNT {
            let side = if k % 2 == 0 { -1.0 } else { 1.0 };
            coil.push(Point {
                x: ANCHOR_X + side * COIL_HALF_WIDTH,
                y: k as f64 * 5.0 * stretch + prev,
            });
            prev = (k * 2) as f64;
        }

        let mass_top = 100.0 * stretch + prev;
        coil.push(Point {
            x: ANCHOR_X,
            y: mass_top,
        });

        Self {
            coil,
            mass: Rect {
                x: ANCHOR_X - MASS_SIZE / 2.0,
                y: mass_top,
                width: MASS_SIZE,
                height: MASS_SIZE,
            },
        }
    }

    /// Bottom edge of the mass box.
    pub fn extent(&self) -> f64 {
        self.mass.y + self.mass.height
    }

    /// Mass top as a fraction of its travel for positions in [-1, 1].
    pub fn travel_fraction(&self) -> f64 {
        let top = Self::mass_top(-1.0);
        let bottom = Self::mass_top(1.0);
        ((self.mass.y - top) / (bottom - top)).clamp(0.0, 1.0)
    }

    fn mass_top(position: f64) -> f64 {
        100.0 * (position + 1.0) + ((COIL_COUNT - 1) * 2) as f64
    }
}
