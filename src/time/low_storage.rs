//! Low-storage explicit Runge-Kutta schemes.
//!
//! A 2N-storage scheme keeps only the state and one residual register:
//!
//! ```text
//! for s in 0..n_stages:
//!     res = a[s] res + dt L(Q)
//!     Q   = Q + b[s] res
//! ```
//!
//! with stage s evaluated at time t + c[s] dt.

/// Non-generic information about a time integrator.
pub trait IntegratorInfo: Send + Sync {
    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy of the integrator.
    fn order(&self) -> usize;

    /// Number of stages in the integrator.
    fn n_stages(&self) -> usize;

    /// Times at which RHS is evaluated relative to current time.
    fn stage_times(&self, dt: f64) -> Vec<f64>;
}

/// Carpenter-Kennedy five-stage, fourth-order 2N-storage Runge-Kutta.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LowStorageRK45;

impl LowStorageRK45 {
    pub const RK4A: [f64; 5] = [
        0.0,
        -567301805773.0 / 1357537059087.0,
        -2404267990393.0 / 2016746695238.0,
        -3550918686646.0 / 2091501179385.0,
        -1275806237668.0 / 842570457699.0,
    ];

    pub const RK4B: [f64; 5] = [
        1432997174477.0 / 9575080441755.0,
        5161836677717.0 / 13612068292357.0,
        1720146321549.0 / 2090206949498.0,
        3134564353537.0 / 4481467310338.0,
        2277821191437.0 / 14882151754819.0,
    ];

    pub const RK4C: [f64; 5] = [
        0.0,
        1432997174477.0 / 9575080441755.0,
        2526269341429.0 / 6820363183127.0,
        2006345519317.0 / 3224310063776.0,
        2802321613138.0 / 2924317926251.0,
    ];

    /// Residual and update coefficients `(a, b)` of stage `s`.
    #[inline]
    pub fn stage(&self, s: usize) -> (f64, f64) {
        (Self::RK4A[s], Self::RK4B[s])
    }
}

impl IntegratorInfo for LowStorageRK45 {
    fn name(&self) -> &'static str {
        "LSRK45"
    }

    fn order(&self) -> usize {
        4
    }

    fn n_stages(&self) -> usize {
        5
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        Self::RK4C.iter().map(|c| c * dt).collect()
    }
}
