//! Time-step selection from mesh geometry.
//!
//! ```text
//! h  = max J / max sJ
//! CN = dim (N+1)(N+2) / 2
//! dt = CFL h / CN
//! ```
//!
//! The step is then shrunk so that an integer number of steps lands exactly
//! on the final time.

use crate::error::{DgError, Result};
use crate::operators::GeometricFactors3D;

/// Spatial dimension.
const DIM: f64 = 3.0;

/// Number of reports over a run when no interval is given.
const REPORTS_PER_RUN: usize = 10;

/// Fixed time step and step count for a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeStepPlan {
    /// Characteristic length max J / max sJ
    pub h: f64,
    /// Trace-inequality constant dim (N+1)(N+2)/2
    pub cn: f64,
    pub dt: f64,
    pub n_steps: usize,
    /// Steps between diagnostic reports
    pub interval: usize,
    pub final_time: f64,
}

impl TimeStepPlan {
    /// Plan `final_time` with a step limited by `cfl`.
    pub fn new(max_j: f64, max_sj: f64, order: usize, cfl: f64, final_time: f64) -> Result<Self> {
        if !(cfl.is_finite() && cfl > 0.0) {
            return Err(DgError::config(format!("CFL must be positive, got {}", cfl)));
        }
        if !(final_time.is_finite() && final_time > 0.0) {
            return Err(DgError::config(format!(
                "final time must be positive, got {}",
                final_time
            )));
        }
        if !(max_j > 0.0 && max_sj > 0.0) {
            return Err(DgError::config(format!(
                "geometry scales must be positive, got max J {} and max sJ {}",
                max_j, max_sj
            )));
        }

        let h = max_j / max_sj;
        let n1 = (order + 1) as f64;
        let cn = DIM * n1 * (n1 + 1.0) / 2.0;
        let dt_stable = cfl * h / cn;
        let n_steps = (final_time / dt_stable).ceil().max(1.0) as usize;

        Ok(Self {
            h,
            cn,
            dt: final_time / n_steps as f64,
            n_steps,
            interval: (n_steps / REPORTS_PER_RUN).max(1),
            final_time,
        })
    }

    /// Plan from computed geometric factors.
    pub fn from_geometry(geo: &GeometricFactors3D, order: usize, cfl: f64, final_time: f64) -> Result<Self> {
        Self::new(
            geo.max_jacobian(),
            geo.max_face_jacobian(),
            order,
            cfl,
            final_time,
        )
    }

    /// Override the report interval (clamped to at least one step).
    pub fn with_interval(mut self, interval: usize) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Whether step `i` is reported.
    #[inline]
    pub fn is_report_step(&self, i: usize) -> bool {
        i % self.interval == 0
    }
}
