//! Device-resident solver state.

use crate::connectivity::FaceNodeMap;
use crate::device::{Accelerator, KernelConfig};
use crate::error::{DgError, Result};
use crate::operators::{GeometricFactors3D, HexOperators};
use tracing::debug;

use super::FieldArray;

/// Everything the kernels touch, owned in one place.
///
/// Operators, geometry and the face-node map are read-only after
/// construction. `q` is the only state carried between steps; `qf`, `rhs`,
/// `rhsf` and `res` are work buffers and `ke` receives the per-element
/// kinetic energy.
pub struct SolverContext<A: Accelerator> {
    pub accelerator: A,
    pub ops: A::Operators,
    pub geometry: A::Geometry,
    pub q: A::Buffer,
    pub qf: A::Buffer,
    pub rhs: A::Buffer,
    pub rhsf: A::Buffer,
    pub res: A::Buffer,
    pub ke: A::Buffer,
    pub config: KernelConfig,
    np: usize,
    n_face_nodes: usize,
}

impl<A: Accelerator> SolverContext<A> {
    /// Build every kernel, upload operators, geometry and the initial state,
    /// and allocate zeroed work buffers.
    pub fn new(
        mut accelerator: A,
        ops: &HexOperators,
        geo: &GeometricFactors3D,
        map: &FaceNodeMap,
        config: KernelConfig,
        initial: &FieldArray,
    ) -> Result<Self> {
        if config.order != ops.order || config.n_elements != geo.n_elements {
            return Err(DgError::config(format!(
                "kernel config (order {}, {} elements) does not match mesh (order {}, {} elements)",
                config.order, config.n_elements, ops.order, geo.n_elements
            )));
        }
        if initial.n_elements() != geo.n_elements || initial.n_nodes() != ops.np {
            return Err(DgError::config(format!(
                "initial state has {} elements x {} nodes, expected {} x {}",
                initial.n_elements(),
                initial.n_nodes(),
                geo.n_elements,
                ops.np
            )));
        }

        accelerator.build_all(&config)?;
        let k = geo.n_elements;
        let n_face_nodes = ops.n_face_nodes();
        let volume_len = initial.len();
        let face_len = k * config.n_fields * n_face_nodes;

        let ctx = Self {
            ops: accelerator.upload_operators(ops)?,
            geometry: accelerator.upload_geometry(ops, geo, map)?,
            q: accelerator.upload(initial.as_slice())?,
            qf: accelerator.zeros(face_len)?,
            rhs: accelerator.zeros(volume_len)?,
            rhsf: accelerator.zeros(face_len)?,
            res: accelerator.zeros(volume_len)?,
            ke: accelerator.zeros(k)?,
            accelerator,
            config,
            np: ops.np,
            n_face_nodes,
        };
        debug!(
            backend = ctx.accelerator.name(),
            elements = k,
            volume_len,
            face_len,
            "solver context ready"
        );
        Ok(ctx)
    }

    pub fn n_elements(&self) -> usize {
        self.config.n_elements
    }

    /// Download the current state.
    pub fn solution(&self) -> Result<FieldArray> {
        let data = self.accelerator.download(&self.q)?;
        FieldArray::from_vec(data, self.config.n_elements, self.np)
    }

    /// Download the current face traces.
    pub fn face_traces(&self) -> Result<FieldArray> {
        let data = self.accelerator.download(&self.qf)?;
        FieldArray::from_vec(data, self.config.n_elements, self.n_face_nodes)
    }

    /// Replace the device state.
    pub fn set_solution(&mut self, q: &FieldArray) -> Result<()> {
        if q.n_elements() != self.config.n_elements || q.n_nodes() != self.np {
            return Err(DgError::config("state does not match the solver layout"));
        }
        self.q = self.accelerator.upload(q.as_slice())?;
        Ok(())
    }

    /// Download the per-element kinetic energy written by `compute_aux`.
    pub fn kinetic_energy(&self) -> Result<Vec<f64>> {
        self.accelerator.download(&self.ke)
    }
}
