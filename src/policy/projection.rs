use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Normalized two-axis action, each component in `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlVector {
    pub input_x: f64,
    pub input_y: f64,
}

impl ControlVector {
    pub const IDLE: Self = Self {
        input_x: 0.0,
        input_y: 0.0,
    };

    pub fn magnitude(&self) -> f64 {
        (self.input_x * self.input_x + self.input_y * self.input_y).sqrt()
    }

    pub fn clamped(self) -> Self {
        Self {
            input_x: self.input_x.clamp(-1.0, 1.0),
            input_y: self.input_y.clamp(-1.0, 1.0),
        }
    }
}

/// Maps a point of an `N x N` view onto a control vector pointing from the view
/// center `(N/2, N/2)` toward it. Magnitude saturates at `N/4` cells.
///
/// `x` is the column and `y` the row of the point. The center here is `N/2`,
/// not the `(N-1)/2` the spatial index measures from.
pub fn project(x: f64, y: f64, size: usize) -> ControlVector {
    let center = size as f64 / 2.0;
    let dx = x - center;
    let dy = y - center;

    let max_distance = size as f64 / 4.0;
    let mut distance = (dx * dx + dy * dy).sqrt();
    if distance >= max_distance {
        distance = max_distance;
    }

    let angle = if dx == 0.0 { FRAC_PI_2 } else { (dy / dx).atan() };

    let mut projection_x = angle.cos() * distance;
    let mut projection_y = angle.sin() * distance;

    // atan only covers the right half-plane.
    if dx < 0.0 {
        projection_x = -projection_x;
        projection_y = -projection_y;
    }

    ControlVector {
        input_x: projection_x / max_distance,
        input_y: projection_y / max_distance,
    }
}
