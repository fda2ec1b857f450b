//! Accelerator abstraction for the five DG kernels.
//!
//! The time march is written against [`Accelerator`], which owns the device
//! representation of the solution buffers, the reference operators and the
//! geometry. Two implementations are provided:
//!
//! - [`CpuAccelerator`]: element-parallel loops over flat host vectors
//!   (rayon under the `parallel` feature)
//! - `burn::BurnAccelerator`: batched tensor kernels on any Burn backend
//!   (`burn` feature)
//!
//! # Kernels
//!
//! | kernel         | reads                 | writes       |
//! |----------------|-----------------------|--------------|
//! | `eval_surface` | Q                     | Qf           |
//! | `volume`       | Q, vgeo               | rhs, rhsf    |
//! | `surface`      | Qf, rhsf, fgeo, mapPq | rhs          |
//! | `update`       | rhs                   | res, Q       |
//! | `compute_aux`  | Q, wJq                | KE           |
//!
//! Every kernel must be built with [`Accelerator::build_kernel`] before it is
//! launched; launching an unbuilt kernel is a `KernelLaunch` error.
//!
//! # Layouts
//!
//! - Q, rhs, res: `[element][field][np]`
//! - Qf, rhsf: `[element][field][6 nfp]`
//! - KE: `[element]`

#[cfg(feature = "burn")]
pub mod burn;
mod cpu;

pub use cpu::{CpuAccelerator, CpuGeometry, CpuOperators};

use crate::connectivity::FaceNodeMap;
use crate::equations::N_FIELDS;
use crate::error::{DgError, Result};
use crate::operators::{GeometricFactors3D, HexOperators};
use std::fmt;

/// The kernels launched by the time march.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelName {
    EvalSurface,
    Volume,
    Surface,
    Update,
    ComputeAux,
}

impl KernelName {
    pub const ALL: [KernelName; 5] = [
        KernelName::EvalSurface,
        KernelName::Volume,
        KernelName::Surface,
        KernelName::Update,
        KernelName::ComputeAux,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KernelName::EvalSurface => "eval_surface",
            KernelName::Volume => "volume",
            KernelName::Surface => "surface",
            KernelName::Update => "update",
            KernelName::ComputeAux => "compute_aux",
        }
    }

    #[inline]
    fn slot(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for KernelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compile-time constants baked into every kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelConfig {
    /// Polynomial order N
    pub order: usize,
    /// Number of elements K
    pub n_elements: usize,
    /// Ratio of specific heats γ
    pub gamma: f64,
    /// Conserved fields per node (must be 5)
    pub n_fields: usize,
    /// Dissipation scaling of the Lax-Friedrichs flux
    pub tau: f64,
}

impl KernelConfig {
    pub fn new(order: usize, n_elements: usize, gamma: f64) -> Self {
        Self {
            order,
            n_elements,
            gamma,
            n_fields: N_FIELDS,
            tau: 1.0,
        }
    }

    /// Set the flux penalty τ.
    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    /// Build a config from named options.
    ///
    /// Recognised keys are `gas_constant_ratio`, `field_count` and
    /// `flux_penalty`; anything else is rejected.
    pub fn from_options(order: usize, n_elements: usize, options: &[(&str, f64)]) -> Result<Self> {
        let mut config = Self::new(order, n_elements, 1.4);
        for &(key, value) in options {
            match key {
                "gas_constant_ratio" => config.gamma = value,
                "field_count" => {
                    if value.fract() != 0.0 || value < 0.0 {
                        return Err(DgError::config(format!(
                            "field_count must be a whole number, got {}",
                            value
                        )));
                    }
                    config.n_fields = value as usize;
                }
                "flux_penalty" => config.tau = value,
                other => {
                    return Err(DgError::config(format!("unknown kernel option `{}`", other)));
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(DgError::config("kernel order must be at least 1"));
        }
        if self.n_elements == 0 {
            return Err(DgError::config("kernel element count must be positive"));
        }
        if !(self.gamma.is_finite() && self.gamma > 1.0) {
            return Err(DgError::config(format!(
                "gas constant ratio must be finite and > 1, got {}",
                self.gamma
            )));
        }
        if self.n_fields != N_FIELDS {
            return Err(DgError::config(format!(
                "field count must be {}, got {}",
                N_FIELDS, self.n_fields
            )));
        }
        if !(self.tau.is_finite() && self.tau >= 0.0) {
            return Err(DgError::config(format!(
                "flux penalty must be finite and non-negative, got {}",
                self.tau
            )));
        }
        Ok(())
    }

    /// Nodes per element (N+1)^3.
    #[inline]
    pub fn np(&self) -> usize {
        (self.order + 1).pow(3)
    }

    /// Face nodes per element 6 (N+1)^2.
    #[inline]
    pub fn n_face_nodes(&self) -> usize {
        6 * (self.order + 1).pow(2)
    }
}

/// Which kernels have been built, and with what constants.
#[derive(Clone, Debug, Default)]
pub struct KernelRegistry {
    built: [Option<KernelConfig>; 5],
}

impl KernelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `config` and record `name` as built.
    pub fn register(&mut self, name: KernelName, config: &KernelConfig) -> Result<()> {
        config
            .validate()
            .map_err(|e| DgError::kernel(name.as_str(), e.to_string()))?;
        self.built[name.slot()] = Some(*config);
        Ok(())
    }

    pub fn is_built(&self, name: KernelName) -> bool {
        self.built[name.slot()].is_some()
    }

    /// Constants of a built kernel, or a launch error if it was never built.
    pub fn config(&self, name: KernelName) -> Result<&KernelConfig> {
        self.built[name.slot()]
            .as_ref()
            .ok_or_else(|| DgError::kernel(name.as_str(), "kernel launched before it was built"))
    }
}

/// Check a host-visible buffer length at launch.
pub(crate) fn check_len(kernel: KernelName, what: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(DgError::kernel(
            kernel.as_str(),
            format!("{} has length {}, expected {}", what, actual, expected),
        ));
    }
    Ok(())
}

/// A compute device able to run the DG kernels.
///
/// Buffers, operators and geometry are opaque device handles; the host only
/// sees them through `upload`/`download`. Kernels run in launch order, so a
/// kernel observes every write of the kernels launched before it.
pub trait Accelerator {
    /// Flat device array of f64 values.
    type Buffer;
    /// Device copy of the reference operators.
    type Operators;
    /// Device copy of geometric factors, connectivity and quadrature weights.
    type Geometry;

    /// Short name for logging.
    fn name(&self) -> &'static str;

    fn upload(&self, data: &[f64]) -> Result<Self::Buffer>;
    fn download(&self, buffer: &Self::Buffer) -> Result<Vec<f64>>;

    /// A zero-filled buffer of length `len`.
    fn zeros(&self, len: usize) -> Result<Self::Buffer> {
        self.upload(&vec![0.0; len])
    }

    fn upload_operators(&self, ops: &HexOperators) -> Result<Self::Operators>;

    fn upload_geometry(
        &self,
        ops: &HexOperators,
        geo: &GeometricFactors3D,
        map: &FaceNodeMap,
    ) -> Result<Self::Geometry>;

    /// Compile `name` with the given constants.
    fn build_kernel(&mut self, name: KernelName, config: &KernelConfig) -> Result<()>;

    fn is_built(&self, name: KernelName) -> bool;

    /// Build all five kernels.
    fn build_all(&mut self, config: &KernelConfig) -> Result<()> {
        for name in KernelName::ALL {
            self.build_kernel(name, config)?;
        }
        Ok(())
    }

    /// Qf ← face traces of Q.
    fn eval_surface(
        &self,
        ops: &Self::Operators,
        q: &Self::Buffer,
        qf: &mut Self::Buffer,
    ) -> Result<()>;

    /// rhs ← -Σ_a D_a F̃_a, rhsf ← face values of F · nJ.
    fn volume(
        &self,
        ops: &Self::Operators,
        geo: &Self::Geometry,
        q: &Self::Buffer,
        rhs: &mut Self::Buffer,
        rhsf: &mut Self::Buffer,
    ) -> Result<()>;

    /// rhs ← (rhs - LIFT (sJ F* - rhsf)) / J.
    fn surface(
        &self,
        ops: &Self::Operators,
        geo: &Self::Geometry,
        qf: &Self::Buffer,
        rhsf: &Self::Buffer,
        rhs: &mut Self::Buffer,
    ) -> Result<()>;

    /// res ← a res + dt rhs, then Q ← Q + b res.
    fn update(
        &self,
        a: f64,
        b: f64,
        dt: f64,
        q: &mut Self::Buffer,
        rhs: &Self::Buffer,
        res: &mut Self::Buffer,
    ) -> Result<()>;

    /// KE[k] ← Σ_n wJq ½|ρu|²/ρ.
    fn compute_aux(
        &self,
        geo: &Self::Geometry,
        q: &Self::Buffer,
        ke: &mut Self::Buffer,
    ) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_names() {
        let names: Vec<&str> = KernelName::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["eval_surface", "volume", "surface", "update", "compute_aux"]
        );
        assert_eq!(KernelName::Surface.to_string(), "surface");
    }

    #[test]
    fn test_config_from_options() {
        let config = KernelConfig::from_options(
            3,
            8,
            &[
                ("gas_constant_ratio", 1.4),
                ("field_count", 5.0),
                ("flux_penalty", 0.5),
            ],
        )
        .unwrap();
        assert_eq!(config.np(), 64);
        assert_eq!(config.n_face_nodes(), 96);
        assert_eq!(config.tau, 0.5);
    }

    #[test]
    fn test_config_rejects_bad_options() {
        assert!(matches!(
            KernelConfig::from_options(3, 8, &[("viscosity", 0.1)]),
            Err(DgError::InvalidConfig(_))
        ));
        assert!(matches!(
            KernelConfig::from_options(3, 8, &[("field_count", 4.0)]),
            Err(DgError::InvalidConfig(_))
        ));
        assert!(matches!(
            KernelConfig::from_options(3, 8, &[("gas_constant_ratio", 1.0)]),
            Err(DgError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_registry_rejects_unbuilt_launch() {
        let mut registry = KernelRegistry::new();
        let err = registry.config(KernelName::Volume).unwrap_err();
        assert!(matches!(err, DgError::KernelLaunch { ref kernel, .. } if kernel == "volume"));

        registry
            .register(KernelName::Volume, &KernelConfig::new(2, 1, 1.4))
            .unwrap();
        assert!(registry.is_built(KernelName::Volume));
        assert!(!registry.is_built(KernelName::Surface));
    }

    #[test]
    fn test_registry_rejects_invalid_config() {
        let mut registry = KernelRegistry::new();
        let config = KernelConfig::new(2, 0, 1.4);
        let err = registry.register(KernelName::Update, &config).unwrap_err();
        assert!(matches!(err, DgError::KernelLaunch { .. }));
        assert!(!registry.is_built(KernelName::Update));
    }
}
