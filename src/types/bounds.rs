//! 3D domain bounds.

use std::fmt;

/// Axis-aligned box domain.
///
/// The extent in each direction is also the period of the fully periodic
/// domain.
///
/// # Example
///
/// ```
/// use dg_hex::types::Bounds3D;
///
/// let bounds = Bounds3D::cube(std::f64::consts::PI);
/// assert_eq!(bounds.center(), [0.0, 0.0, 0.0]);
/// assert!((bounds.volume() - 8.0 * std::f64::consts::PI.powi(3)).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds3D {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl Bounds3D {
    /// Create new domain bounds.
    ///
    /// # Panics
    ///
    /// Panics if any maximum is not greater than the matching minimum.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64, z_min: f64, z_max: f64) -> Self {
        assert!(
            x_max > x_min,
            "x_max ({}) must be greater than x_min ({})",
            x_max,
            x_min
        );
        assert!(
            y_max > y_min,
            "y_max ({}) must be greater than y_min ({})",
            y_max,
            y_min
        );
        assert!(
            z_max > z_min,
            "z_max ({}) must be greater than z_min ({})",
            z_max,
            z_min
        );

        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            z_min,
            z_max,
        }
    }

    /// Create the unit cube [0, 1]^3.
    pub fn unit_cube() -> Self {
        Self::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0)
    }

    /// Create a cube centered at the origin.
    pub fn cube(half_width: f64) -> Self {
        Self::new(
            -half_width,
            half_width,
            -half_width,
            half_width,
            -half_width,
            half_width,
        )
    }

    /// Whether every extent is positive and finite.
    ///
    /// Fields are public, so bounds built by struct literal are checked here
    /// rather than in `new`.
    pub fn is_valid(&self) -> bool {
        self.periods()
            .iter()
            .all(|&p| p.is_finite() && p > 0.0)
    }

    /// Lower corner.
    #[inline]
    pub fn min(&self) -> [f64; 3] {
        [self.x_min, self.y_min, self.z_min]
    }

    /// Upper corner.
    #[inline]
    pub fn max(&self) -> [f64; 3] {
        [self.x_max, self.y_max, self.z_max]
    }

    /// Domain extents (DX, DY, DZ), i.e. the periods.
    #[inline]
    pub fn periods(&self) -> [f64; 3] {
        [
            self.x_max - self.x_min,
            self.y_max - self.y_min,
            self.z_max - self.z_min,
        ]
    }

    /// Domain center point.
    #[inline]
    pub fn center(&self) -> [f64; 3] {
        [
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
            (self.z_min + self.z_max) / 2.0,
        ]
    }

    /// Domain volume.
    #[inline]
    pub fn volume(&self) -> f64 {
        let [dx, dy, dz] = self.periods();
        dx * dy * dz
    }

    /// Check if a point is inside the domain (inclusive).
    #[inline]
    pub fn contains(&self, x: f64, y: f64, z: f64) -> bool {
        x >= self.x_min
            && x <= self.x_max
            && y >= self.y_min
            && y <= self.y_max
            && z >= self.z_min
            && z <= self.z_max
    }

    /// Smallest axis-aligned box containing all points.
    ///
    /// Returns `None` for empty input.
    pub fn enclosing(x: &[f64], y: &[f64], z: &[f64]) -> Option<Self> {
        if x.is_empty() {
            return None;
        }
        let fold = |v: &[f64]| {
            v.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| {
                    (lo.min(c), hi.max(c))
                })
        };
        let (x_min, x_max) = fold(x);
        let (y_min, y_max) = fold(y);
        let (z_min, z_max) = fold(z);
        Some(Self {
            x_min,
            x_max,
            y_min,
            y_max,
            z_min,
            z_max,
        })
    }
}

impl fmt::Display for Bounds3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.2}, {:.2}] × [{:.2}, {:.2}] × [{:.2}, {:.2}]",
            self.x_min, self.x_max, self.y_min, self.y_max, self.z_min, self.z_max
        )
    }
}

impl Default for Bounds3D {
    fn default() -> Self {
        Self::unit_cube()
    }
}
