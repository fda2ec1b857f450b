//! Explicit time march over the accelerator kernels.
//!
//! One step of the driver:
//!
//! ```text
//! for each of the five stages:
//!     volume        (Q          -> rhs, rhsf)
//!     surface       (Qf, rhsf   -> rhs)
//!     update        (rhs        -> res, Q)
//!     eval_surface  (Q          -> Qf)
//! compute_aux       (Q          -> KE), download, sum, record
//! ```
//!
//! Face traces are staged once before the first step and re-staged after
//! every update, so each stage sees traces of the state it differentiates.
//! The only per-step host transfer is the per-element kinetic energy.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::low_storage::{IntegratorInfo, LowStorageRK45};
use super::step_size::TimeStepPlan;
use crate::analysis::KineticEnergyHistory;
use crate::device::Accelerator;
use crate::error::{DgError, Result};
use crate::solver::SolverContext;

/// Relative kinetic-energy growth above which a warning is logged once.
const GROWTH_WARNING: f64 = 0.1;

/// Where the driver is in its step cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepPhase {
    /// Not started.
    Idle,
    /// Evaluating face traces.
    Staging,
    /// Volume and surface right-hand side.
    Computing,
    /// Low-storage stage update.
    Updating,
    /// Kinetic-energy reduction at the end of a step.
    Diagnosing,
    /// All steps taken.
    Done,
}

/// Outcome of a completed run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub n_steps: usize,
    pub dt: f64,
    pub final_time: f64,
    pub elapsed: Duration,
    pub history: KineticEnergyHistory,
}

type PhaseObserver<'a> = Box<dyn FnMut(StepPhase, usize) + 'a>;

/// Sequences kernel launches for a fixed-step run.
pub struct TimeStepDriver<'a, A: Accelerator> {
    ctx: &'a mut SolverContext<A>,
    plan: TimeStepPlan,
    scheme: LowStorageRK45,
    phase: StepPhase,
    step: usize,
    staged: bool,
    warned: bool,
    history: KineticEnergyHistory,
    observer: Option<PhaseObserver<'a>>,
}

impl<'a, A: Accelerator> TimeStepDriver<'a, A> {
    pub fn new(ctx: &'a mut SolverContext<A>, plan: TimeStepPlan) -> Self {
        Self {
            ctx,
            plan,
            scheme: LowStorageRK45,
            phase: StepPhase::Idle,
            step: 0,
            staged: false,
            warned: false,
            history: KineticEnergyHistory::with_capacity(plan.n_steps),
            observer: None,
        }
    }

    /// Call `observer(phase, step)` on every phase transition.
    pub fn with_phase_observer(mut self, observer: impl FnMut(StepPhase, usize) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    /// Steps completed so far.
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    /// Simulated time reached.
    pub fn time(&self) -> f64 {
        self.step as f64 * self.plan.dt
    }

    pub fn plan(&self) -> &TimeStepPlan {
        &self.plan
    }

    pub fn history(&self) -> &KineticEnergyHistory {
        &self.history
    }

    fn enter(&mut self, phase: StepPhase) {
        self.phase = phase;
        if let Some(observer) = self.observer.as_mut() {
            observer(phase, self.step);
        }
    }

    fn stage_traces(&mut self) -> Result<()> {
        self.enter(StepPhase::Staging);
        let ctx = &mut *self.ctx;
        ctx.accelerator.eval_surface(&ctx.ops, &ctx.q, &mut ctx.qf)
    }

    /// Take one full step: all stages plus the kinetic-energy diagnostic.
    ///
    /// Returns the domain kinetic energy after the step.
    pub fn advance(&mut self) -> Result<f64> {
        if self.step >= self.plan.n_steps {
            if self.phase != StepPhase::Done {
                self.enter(StepPhase::Done);
            }
            return Err(DgError::config("time march already finished"));
        }
        if !self.staged {
            self.stage_traces()?;
            self.staged = true;
        }

        let dt = self.plan.dt;
        for s in 0..self.scheme.n_stages() {
            let (a, b) = self.scheme.stage(s);

            self.enter(StepPhase::Computing);
            {
                let ctx = &mut *self.ctx;
                ctx.accelerator
                    .volume(&ctx.ops, &ctx.geometry, &ctx.q, &mut ctx.rhs, &mut ctx.rhsf)?;
                ctx.accelerator
                    .surface(&ctx.ops, &ctx.geometry, &ctx.qf, &ctx.rhsf, &mut ctx.rhs)?;
            }

            self.enter(StepPhase::Updating);
            {
                let ctx = &mut *self.ctx;
                ctx.accelerator
                    .update(a, b, dt, &mut ctx.q, &ctx.rhs, &mut ctx.res)?;
            }

            self.stage_traces()?;
        }

        self.enter(StepPhase::Diagnosing);
        let energy = {
            let ctx = &mut *self.ctx;
            ctx.accelerator
                .compute_aux(&ctx.geometry, &ctx.q, &mut ctx.ke)?;
            ctx.kinetic_energy()?.iter().sum::<f64>()
        };

        let i = self.step;
        if !energy.is_finite() {
            return Err(DgError::Divergence {
                step: i,
                value: energy,
            });
        }
        self.history.push(energy);

        if self.plan.is_report_step(i) {
            info!(step = i, time = self.time() + dt, kinetic_energy = energy, "report");
        }
        if !self.warned && self.history.max_growth() > GROWTH_WARNING {
            warn!(
                step = i,
                growth = self.history.max_growth(),
                "kinetic energy grew more than {:.0}% over its initial value",
                GROWTH_WARNING * 100.0
            );
            self.warned = true;
        }

        self.step += 1;
        if self.step >= self.plan.n_steps {
            self.enter(StepPhase::Done);
        }
        Ok(energy)
    }

    /// Run every remaining step.
    pub fn run(mut self) -> Result<RunSummary> {
        info!(
            integrator = self.scheme.name(),
            backend = self.ctx.accelerator.name(),
            dt = self.plan.dt,
            n_steps = self.plan.n_steps,
            final_time = self.plan.final_time,
            "starting time march"
        );
        let start = Instant::now();
        while self.step < self.plan.n_steps {
            self.advance()?;
        }
        if self.phase != StepPhase::Done {
            self.enter(StepPhase::Done);
        }
        let elapsed = start.elapsed();
        debug!(elapsed_s = elapsed.as_secs_f64(), "time march finished");

        Ok(RunSummary {
            n_steps: self.step,
            dt: self.plan.dt,
            final_time: self.time(),
            elapsed,
            history: self.history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::build_face_node_map;
    use crate::device::{CpuAccelerator, KernelConfig};
    use crate::equations::EulerState;
    use crate::mesh::build_hex_mesh;
    use crate::operators::{GeometricFactors3D, HexOperators};
    use crate::solver::FieldArray;
    use crate::types::Bounds3D;

    fn context(state: EulerState) -> (SolverContext<CpuAccelerator>, TimeStepPlan) {
        let mesh = build_hex_mesh([2, 2, 2], Bounds3D::unit_cube(), 2).unwrap();
        let ops = HexOperators::new(2).unwrap();
        let geo = GeometricFactors3D::compute(&mesh, &ops).unwrap();
        let map = build_face_node_map(&mesh, &ops).unwrap();
        let q = FieldArray::from_fn(mesh.n_elements, ops.np, |_, _| state);
        let plan = TimeStepPlan::from_geometry(&geo, 2, 0.5, 0.05).unwrap();
        let ctx = SolverContext::new(
            CpuAccelerator::new(),
            &ops,
            &geo,
            &map,
            KernelConfig::new(2, mesh.n_elements, 1.4),
            &q,
        )
        .unwrap();
        (ctx, plan)
    }

    #[test]
    fn test_phase_sequence() {
        let (mut ctx, plan) = context(EulerState::from_primitives(1.0, 0.1, 0.0, 0.0, 1.0, 1.4));
        let mut phases = Vec::new();
        {
            let mut driver = TimeStepDriver::new(&mut ctx, plan)
                .with_phase_observer(|phase, _| phases.push(phase));
            assert_eq!(driver.phase(), StepPhase::Idle);
            driver.advance().unwrap();
        }

        use StepPhase::*;
        let mut expected = vec![Staging];
        for _ in 0..5 {
            expected.extend([Computing, Updating, Staging]);
        }
        expected.push(Diagnosing);
        assert_eq!(phases, expected);
    }

    #[test]
    fn test_uniform_flow_runs_to_completion() {
        let state = EulerState::from_primitives(1.0, 0.3, -0.1, 0.2, 1.0, 1.4);
        let (mut ctx, plan) = context(state);
        let summary = TimeStepDriver::new(&mut ctx, plan).run().unwrap();

        assert_eq!(summary.n_steps, plan.n_steps);
        assert_eq!(summary.history.len(), plan.n_steps);
        assert!((summary.final_time - 0.05).abs() < 1e-12);
        assert!(summary.history.max_growth().abs() < 1e-10);

        let q = ctx.solution().unwrap();
        for k in 0..q.n_elements() {
            for n in 0..q.n_nodes() {
                assert!(q.state(n, k).max_abs_diff(&state) < 1e-10);
            }
        }
    }

    #[test]
    fn test_advance_after_done_is_rejected() {
        let (mut ctx, plan) = context(EulerState::from_primitives(1.0, 0.0, 0.0, 0.0, 1.0, 1.4));
        let plan = TimeStepPlan { n_steps: 1, ..plan };
        let mut driver = TimeStepDriver::new(&mut ctx, plan);
        driver.advance().unwrap();
        assert_eq!(driver.phase(), StepPhase::Done);
        assert!(driver.advance().is_err());
    }

    #[test]
    fn test_empty_plan_finishes_without_stepping() {
        let (mut ctx, plan) = context(EulerState::from_primitives(1.0, 0.0, 0.0, 0.0, 1.0, 1.4));
        let plan = TimeStepPlan { n_steps: 0, ..plan };
        let summary = TimeStepDriver::new(&mut ctx, plan).run().unwrap();
        assert_eq!(summary.n_steps, 0);
        assert!(summary.history.is_empty());

        let mut driver = TimeStepDriver::new(&mut ctx, plan);
        assert!(driver.advance().is_err());
        assert_eq!(driver.phase(), StepPhase::Done);
    }

    #[test]
    fn test_non_finite_energy_is_divergence() {
        let (mut ctx, plan) = context(EulerState::from_primitives(1.0, 0.1, 0.0, 0.0, 1.0, 1.4));
        let mut q = ctx.solution().unwrap();
        q.set(crate::solver::Field::MomentumX, 0, 0, f64::NAN);
        ctx.set_solution(&q).unwrap();
        let err = TimeStepDriver::new(&mut ctx, plan).run().unwrap_err();
        assert!(matches!(err, DgError::Divergence { step: 0, .. }));
    }
}
