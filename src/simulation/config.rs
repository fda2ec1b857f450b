//! Run configuration.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::analysis::{AnalyticSolution, IsentropicVortex, TaylorGreenVortex};
use crate::error::{DgError, Result};
use crate::types::Bounds3D;

/// Test problem on the periodic box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProblemKind {
    /// Isentropic vortex on [0,10]×[0,20]×[0,10], exact reference available.
    #[default]
    Vortex,
    /// Taylor-Green vortex on [-π,π]^3, initial condition only.
    TaylorGreen,
}

impl ProblemKind {
    pub fn bounds(&self) -> Bounds3D {
        match self {
            ProblemKind::Vortex => Bounds3D::new(0.0, 10.0, 0.0, 20.0, 0.0, 10.0),
            ProblemKind::TaylorGreen => Bounds3D::cube(PI),
        }
    }

    /// Elements per direction for `k1d` elements along the short axis.
    pub fn counts(&self, k1d: usize) -> [usize; 3] {
        match self {
            ProblemKind::Vortex => [k1d, 2 * k1d, k1d],
            ProblemKind::TaylorGreen => [k1d, k1d, k1d],
        }
    }

    /// Warp wave numbers.
    pub fn modes(&self) -> [u32; 3] {
        match self {
            ProblemKind::Vortex => [1, 2, 1],
            ProblemKind::TaylorGreen => [1, 1, 1],
        }
    }

    pub fn analytic(&self, gamma: f64) -> Box<dyn AnalyticSolution> {
        match self {
            ProblemKind::Vortex => Box::new(IsentropicVortex::new(gamma)),
            ProblemKind::TaylorGreen => Box::new(TaylorGreenVortex::new(gamma)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemKind::Vortex => "vortex",
            ProblemKind::TaylorGreen => "taylor-green",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProblemKind {
    type Err = DgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vortex" => Ok(ProblemKind::Vortex),
            "taylor-green" | "taylor_green" | "tgv" => Ok(ProblemKind::TaylorGreen),
            other => Err(DgError::config(format!(
                "unknown problem `{}` (expected `vortex` or `taylor-green`)",
                other
            ))),
        }
    }
}

/// Parameters of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Polynomial order N
    pub order: usize,
    /// Elements along the short axis (K1D)
    pub elements_per_axis: usize,
    pub cfl: f64,
    pub final_time: f64,
    /// Warp amplitude; 0 keeps the mesh straight-sided
    pub amplitude: f64,
    pub problem: ProblemKind,
    /// Ratio of specific heats γ
    pub gamma: f64,
    /// Lax-Friedrichs penalty τ
    pub tau: f64,
    /// Compute the L2 error against the analytic field at the end
    pub verify: bool,
    /// Report every this many steps instead of `max(Nsteps/10, 1)`
    pub report_interval: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            order: 3,
            elements_per_axis: 8,
            cfl: 1.0,
            final_time: 1.0,
            amplitude: 0.5,
            problem: ProblemKind::Vortex,
            gamma: 1.4,
            tau: 1.0,
            verify: true,
            report_interval: None,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    pub fn with_elements_per_axis(mut self, k1d: usize) -> Self {
        self.elements_per_axis = k1d;
        self
    }

    pub fn with_cfl(mut self, cfl: f64) -> Self {
        self.cfl = cfl;
        self
    }

    pub fn with_final_time(mut self, final_time: f64) -> Self {
        self.final_time = final_time;
        self
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_problem(mut self, problem: ProblemKind) -> Self {
        self.problem = problem;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_report_interval(mut self, interval: usize) -> Self {
        self.report_interval = Some(interval);
        self
    }

    /// Element counts per direction.
    pub fn counts(&self) -> [usize; 3] {
        self.problem.counts(self.elements_per_axis)
    }

    /// Check ranges before anything is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(DgError::config("order must be at least 1"));
        }
        if self.elements_per_axis == 0 {
            return Err(DgError::config("elements_per_axis must be at least 1"));
        }
        if !(self.cfl.is_finite() && self.cfl > 0.0) {
            return Err(DgError::config(format!("cfl must be positive, got {}", self.cfl)));
        }
        if !(self.final_time.is_finite() && self.final_time > 0.0) {
            return Err(DgError::config(format!(
                "final_time must be positive, got {}",
                self.final_time
            )));
        }
        if !self.amplitude.is_finite() {
            return Err(DgError::config("amplitude must be finite"));
        }
        if !(self.gamma > 1.0) {
            return Err(DgError::config(format!(
                "gas constant ratio must exceed 1, got {}",
                self.gamma
            )));
        }
        if !(self.tau.is_finite() && self.tau >= 0.0) {
            return Err(DgError::config(format!(
                "flux penalty must be non-negative, got {}",
                self.tau
            )));
        }
        if self.report_interval == Some(0) {
            return Err(DgError::config("report interval must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.order, 3);
        assert_eq!(config.elements_per_axis, 8);
        assert_eq!(config.cfl, 1.0);
        assert_eq!(config.final_time, 1.0);
        assert_eq!(config.amplitude, 0.5);
        assert_eq!(config.problem, ProblemKind::Vortex);
        assert_eq!(config.counts(), [8, 16, 8]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_validation() {
        let config = RunConfig::new().with_order(0);
        assert!(matches!(config.validate(), Err(DgError::InvalidConfig(_))));
        assert!(RunConfig::new().with_cfl(-1.0).validate().is_err());
        assert!(RunConfig::new().with_final_time(0.0).validate().is_err());
        assert!(RunConfig::new().with_gamma(1.0).validate().is_err());
        assert!(RunConfig::new().with_report_interval(0).validate().is_err());
        assert!(RunConfig::new().with_amplitude(0.0).with_tau(0.0).validate().is_ok());
    }

    #[test]
    fn test_problem_parsing() {
        assert_eq!("vortex".parse::<ProblemKind>().unwrap(), ProblemKind::Vortex);
        assert_eq!(
            "Taylor-Green".parse::<ProblemKind>().unwrap(),
            ProblemKind::TaylorGreen
        );
        assert!("sod".parse::<ProblemKind>().is_err());
        assert_eq!(ProblemKind::TaylorGreen.to_string(), "taylor-green");
    }

    #[test]
    fn test_problem_geometry() {
        let tg = ProblemKind::TaylorGreen;
        assert_eq!(tg.counts(4), [4, 4, 4]);
        assert_eq!(tg.modes(), [1, 1, 1]);
        let p = tg.bounds().periods();
        assert!((p[0] - 2.0 * PI).abs() < 1e-14);
        assert!(!tg.analytic(1.4).is_exact());

        let v = ProblemKind::Vortex;
        assert_eq!(v.bounds().periods(), [10.0, 20.0, 10.0]);
        assert_eq!(v.modes(), [1, 2, 1]);
        assert!(v.analytic(1.4).is_exact());
    }
}
