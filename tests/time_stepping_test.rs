//! Time-stepping behaviour of the full kernel pipeline.

use dg_hex::connectivity::{build_face_node_map, FaceNodeMap};
use dg_hex::device::{Accelerator, CpuAccelerator, KernelConfig, KernelName};
use dg_hex::equations::EulerState;
use dg_hex::error::{DgError, Result};
use dg_hex::mesh::{apply_curved_warp, build_hex_mesh, HexMesh, WarpConfig};
use dg_hex::operators::{GeometricFactors3D, HexOperators};
use dg_hex::simulation::{RunConfig, RunSetup};
use dg_hex::solver::{FieldArray, SolverContext};
use dg_hex::time::{TimeStepDriver, TimeStepPlan};
use dg_hex::types::Bounds3D;

/// Host backend whose right-hand side is identically zero.
struct ZeroRhs(CpuAccelerator);

impl Accelerator for ZeroRhs {
    type Buffer = <CpuAccelerator as Accelerator>::Buffer;
    type Operators = <CpuAccelerator as Accelerator>::Operators;
    type Geometry = <CpuAccelerator as Accelerator>::Geometry;

    fn name(&self) -> &'static str {
        "zero-rhs"
    }

    fn upload(&self, data: &[f64]) -> Result<Self::Buffer> {
        self.0.upload(data)
    }

    fn download(&self, buffer: &Self::Buffer) -> Result<Vec<f64>> {
        self.0.download(buffer)
    }

    fn upload_operators(&self, ops: &HexOperators) -> Result<Self::Operators> {
        self.0.upload_operators(ops)
    }

    fn upload_geometry(
        &self,
        ops: &HexOperators,
        geo: &GeometricFactors3D,
        map: &FaceNodeMap,
    ) -> Result<Self::Geometry> {
        self.0.upload_geometry(ops, geo, map)
    }

    fn build_kernel(&mut self, name: KernelName, config: &KernelConfig) -> Result<()> {
        self.0.build_kernel(name, config)
    }

    fn is_built(&self, name: KernelName) -> bool {
        self.0.is_built(name)
    }

    fn eval_surface(
        &self,
        ops: &Self::Operators,
        q: &Self::Buffer,
        qf: &mut Self::Buffer,
    ) -> Result<()> {
        self.0.eval_surface(ops, q, qf)
    }

    fn volume(
        &self,
        _ops: &Self::Operators,
        _geo: &Self::Geometry,
        _q: &Self::Buffer,
        rhs: &mut Self::Buffer,
        rhsf: &mut Self::Buffer,
    ) -> Result<()> {
        rhs.iter_mut().for_each(|v| *v = 0.0);
        rhsf.iter_mut().for_each(|v| *v = 0.0);
        Ok(())
    }

    fn surface(
        &self,
        _ops: &Self::Operators,
        _geo: &Self::Geometry,
        _qf: &Self::Buffer,
        _rhsf: &Self::Buffer,
        rhs: &mut Self::Buffer,
    ) -> Result<()> {
        rhs.iter_mut().for_each(|v| *v = 0.0);
        Ok(())
    }

    fn update(
        &self,
        a: f64,
        b: f64,
        dt: f64,
        q: &mut Self::Buffer,
        rhs: &Self::Buffer,
        res: &mut Self::Buffer,
    ) -> Result<()> {
        self.0.update(a, b, dt, q, rhs, res)
    }

    fn compute_aux(
        &self,
        geo: &Self::Geometry,
        q: &Self::Buffer,
        ke: &mut Self::Buffer,
    ) -> Result<()> {
        self.0.compute_aux(geo, q, ke)
    }
}

fn curved_box(order: usize) -> HexMesh {
    let bounds = Bounds3D::new(0.0, 2.0, 0.0, 2.0, 0.0, 2.0);
    let mut mesh = build_hex_mesh([2, 2, 2], bounds, order).unwrap();
    apply_curved_warp(&mut mesh, &WarpConfig::new(0.1, [1, 1, 1])).unwrap();
    mesh
}

#[test]
fn test_zero_rhs_leaves_state_unchanged() {
    let config = RunConfig::new()
        .with_order(2)
        .with_elements_per_axis(2)
        .with_final_time(0.1);
    let setup = RunSetup::new(&config).unwrap();
    let mut ctx = setup.context(&config, ZeroRhs(CpuAccelerator::new())).unwrap();
    let plan = TimeStepPlan::from_geometry(&setup.geometry, 2, 1.0, 0.1).unwrap();

    let summary = TimeStepDriver::new(&mut ctx, plan).run().unwrap();
    assert!(summary.n_steps >= 1);

    let q = ctx.solution().unwrap();
    assert_eq!(q.as_slice(), setup.initial.as_slice());
    let ke = summary.history.values();
    assert!(ke.iter().all(|v| *v == ke[0]));
}

#[test]
fn test_free_stream_preserved_on_curved_mesh() {
    let order = 3;
    let mesh = curved_box(order);
    let ops = HexOperators::new(order).unwrap();
    let geo = GeometricFactors3D::compute(&mesh, &ops).unwrap();
    let map = build_face_node_map(&mesh, &ops).unwrap();
    let state = EulerState::from_primitives(1.2, 0.4, -0.3, 0.2, 0.9, 1.4);
    let q0 = FieldArray::from_fn(mesh.n_elements, ops.np, |_, _| state);

    let mut ctx = SolverContext::new(
        CpuAccelerator::new(),
        &ops,
        &geo,
        &map,
        KernelConfig::new(order, mesh.n_elements, 1.4),
        &q0,
    )
    .unwrap();
    let plan = TimeStepPlan::from_geometry(&geo, order, 1.0, 0.1).unwrap();
    TimeStepDriver::new(&mut ctx, plan).run().unwrap();

    let q = ctx.solution().unwrap();
    assert!(q.max_abs_diff(&q0) < 1e-10, "drift {}", q.max_abs_diff(&q0));
}

#[test]
fn test_unbuilt_kernel_aborts_run() {
    let order = 2;
    let mesh = curved_box(order);
    let ops = HexOperators::new(order).unwrap();
    let geo = GeometricFactors3D::compute(&mesh, &ops).unwrap();
    let map = build_face_node_map(&mesh, &ops).unwrap();
    let config = KernelConfig::new(order, mesh.n_elements, 1.4);

    let mut cpu = CpuAccelerator::new();
    for name in KernelName::ALL {
        if name != KernelName::Surface {
            cpu.build_kernel(name, &config).unwrap();
        }
    }
    assert!(!cpu.is_built(KernelName::Surface));

    let cpu_ops = cpu.upload_operators(&ops).unwrap();
    let cpu_geo = cpu.upload_geometry(&ops, &geo, &map).unwrap();
    let q = cpu.upload(&vec![1.0; mesh.n_elements * 5 * ops.np]).unwrap();
    let qf = cpu.zeros(mesh.n_elements * 5 * ops.n_face_nodes()).unwrap();
    let rhsf = qf.clone();
    let mut rhs = cpu.zeros(q.len()).unwrap();

    let err = cpu.surface(&cpu_ops, &cpu_geo, &qf, &rhsf, &mut rhs).unwrap_err();
    match err {
        DgError::KernelLaunch { kernel, .. } => assert_eq!(kernel, "surface"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_kinetic_energy_stays_bounded() {
    let config = RunConfig::new()
        .with_order(2)
        .with_elements_per_axis(2)
        .with_final_time(0.5)
        .with_amplitude(0.25)
        .with_verify(false);
    let report = dg_hex::simulation::run_simulation(&config).unwrap();
    let history = &report.summary.history;
    assert_eq!(history.len(), report.summary.n_steps);
    assert!(history.is_bounded(1.1), "max growth {}", history.max_growth());
}

#[cfg(feature = "burn-ndarray")]
#[test]
fn test_burn_backend_matches_host_run() {
    use burn_ndarray::NdArray;
    use dg_hex::device::burn::BurnAccelerator;

    let config = RunConfig::new()
        .with_order(2)
        .with_elements_per_axis(2)
        .with_final_time(0.05)
        .with_amplitude(0.2);
    let host = dg_hex::simulation::run_with(&config, CpuAccelerator::new()).unwrap();
    let burn = dg_hex::simulation::run_with(&config, BurnAccelerator::<NdArray<f64>>::default())
        .unwrap();

    assert_eq!(host.summary.n_steps, burn.summary.n_steps);
    let (a, b) = (host.l2_error.unwrap(), burn.l2_error.unwrap());
    assert!((a - b).abs() < 1e-8 * a.max(1.0), "host {} vs burn {}", a, b);
}
