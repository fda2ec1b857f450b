//! One complete run: mesh → geometry → face map → time march → verification.

use tracing::{info, warn};

use super::config::RunConfig;
use crate::analysis::{AnalyticSolution, L2ErrorEstimator};
use crate::connectivity::{build_face_node_map, FaceNodeMap};
use crate::device::{Accelerator, CpuAccelerator, KernelConfig};
use crate::error::Result;
use crate::mesh::{apply_curved_warp, build_hex_mesh, HexMesh, WarpConfig};
use crate::operators::{GeometricFactors3D, HexOperators};
use crate::solver::{FieldArray, SolverContext};
use crate::time::{RunSummary, TimeStepDriver, TimeStepPlan};

/// Host-side setup shared by every backend.
pub struct RunSetup {
    pub mesh: HexMesh,
    pub ops: HexOperators,
    pub geometry: GeometricFactors3D,
    pub face_map: FaceNodeMap,
    pub reference: Box<dyn AnalyticSolution>,
    /// Reference field at the Gauss nodes at t = 0
    pub initial: FieldArray,
}

impl RunSetup {
    /// Build the warped mesh, its geometry and face map, and the initial state.
    pub fn new(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        let problem = config.problem;

        let mut mesh = build_hex_mesh(config.counts(), problem.bounds(), config.order)?;
        apply_curved_warp(&mut mesh, &WarpConfig::new(config.amplitude, problem.modes()))?;
        let ops = HexOperators::new(config.order)?;
        let geometry = GeometricFactors3D::compute(&mesh, &ops)?;
        let face_map = build_face_node_map(&mesh, &ops)?;

        let reference = problem.analytic(config.gamma);
        let [xq, yq, zq] = mesh.gauss_coordinates(&ops);
        let np = ops.np;
        let initial = FieldArray::from_fn(mesh.n_elements, np, |n, k| {
            let g = k * np + n;
            reference.evaluate(xq[g], yq[g], zq[g], 0.0)
        });

        Ok(Self {
            mesh,
            ops,
            geometry,
            face_map,
            reference,
            initial,
        })
    }

    /// Kernel options for `config` on this mesh.
    pub fn kernel_config(&self, config: &RunConfig) -> Result<KernelConfig> {
        KernelConfig::from_options(
            config.order,
            self.mesh.n_elements,
            &[
                ("gas_constant_ratio", config.gamma),
                ("flux_penalty", config.tau),
            ],
        )
    }

    /// Upload everything to `accelerator`.
    pub fn context<A: Accelerator>(
        &self,
        config: &RunConfig,
        accelerator: A,
    ) -> Result<SolverContext<A>> {
        SolverContext::new(
            accelerator,
            &self.ops,
            &self.geometry,
            &self.face_map,
            self.kernel_config(config)?,
            &self.initial,
        )
    }
}

/// K1D at which [`RunReport::regression_bound`] applies.
const REGRESSION_K1D: usize = 8;

/// Outcome of [`run_simulation`].
#[derive(Clone, Debug)]
pub struct RunReport {
    pub order: usize,
    /// K1D of the run
    pub elements_per_axis: usize,
    pub n_elements: usize,
    /// Face nodes paired across the periodic boundary
    pub n_periodic: usize,
    pub summary: RunSummary,
    /// L2 error at the final time, when verification ran
    pub l2_error: Option<f64>,
}

impl RunReport {
    /// Error bound of the vortex regression, `0.4 / 2^N`.
    pub fn regression_bound(&self) -> f64 {
        0.4 / 2f64.powi(self.order as i32)
    }

    /// Regression bound carried to this run's resolution.
    ///
    /// The bound holds at K1D = 8; coarser meshes widen it by
    /// `(8 / K1D)^(N+1)`, the h-convergence rate of the scheme.
    pub fn scaled_regression_bound(&self) -> f64 {
        let ratio = REGRESSION_K1D as f64 / self.elements_per_axis.max(1) as f64;
        self.regression_bound() * ratio.powi(self.order as i32 + 1)
    }
}

/// Run `config` on the host backend.
pub fn run_simulation(config: &RunConfig) -> Result<RunReport> {
    run_with(config, CpuAccelerator::new())
}

/// Run `config` on `accelerator`.
pub fn run_with<A: Accelerator>(config: &RunConfig, accelerator: A) -> Result<RunReport> {
    let setup = RunSetup::new(config)?;
    info!(
        problem = %config.problem,
        order = config.order,
        counts = ?config.counts(),
        amplitude = config.amplitude,
        n_periodic = setup.face_map.n_periodic(),
        "mesh ready"
    );

    let mut ctx = setup.context(config, accelerator)?;
    let mut plan =
        TimeStepPlan::from_geometry(&setup.geometry, config.order, config.cfl, config.final_time)?;
    if let Some(interval) = config.report_interval {
        plan = plan.with_interval(interval);
    }

    let summary = TimeStepDriver::new(&mut ctx, plan).run()?;

    let l2_error = if !config.verify {
        None
    } else if !setup.reference.is_exact() {
        warn!(
            problem = setup.reference.name(),
            "no exact solution for this problem, skipping L2 error"
        );
        None
    } else {
        let q = ctx.solution()?;
        let err = L2ErrorEstimator::new(&setup.ops).error(
            &setup.mesh,
            &setup.geometry,
            &q,
            setup.reference.as_ref(),
            summary.final_time,
        )?;
        Some(err)
    };

    Ok(RunReport {
        order: config.order,
        elements_per_axis: config.elements_per_axis,
        n_elements: setup.mesh.n_elements,
        n_periodic: setup.face_map.n_periodic(),
        summary,
        l2_error,
    })
}
