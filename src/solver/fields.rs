//! Nodal storage for the conserved fields.

use crate::equations::{EulerState, N_FIELDS};
use crate::error::{DgError, Result};

/// A conserved field of the Euler system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Density = 0,
    MomentumX = 1,
    MomentumY = 2,
    MomentumZ = 3,
    Energy = 4,
}

impl Field {
    pub const ALL: [Field; N_FIELDS] = [
        Field::Density,
        Field::MomentumX,
        Field::MomentumY,
        Field::MomentumZ,
        Field::Energy,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Density => "rho",
            Field::MomentumX => "rho_u",
            Field::MomentumY => "rho_v",
            Field::MomentumZ => "rho_w",
            Field::Energy => "E",
        }
    }
}

/// Values of all five fields at `n_nodes` nodes of each element.
///
/// Stored element-major, `data[(k * 5 + field) * n_nodes + node]`, which is
/// the layout every accelerator kernel consumes. Used for the volume state Q
/// and right-hand side (`n_nodes = np`) as well as face traces
/// (`n_nodes = 6 nfp`).
#[derive(Clone, Debug, PartialEq)]
pub struct FieldArray {
    data: Vec<f64>,
    n_elements: usize,
    n_nodes: usize,
}

impl FieldArray {
    /// Zero-initialized storage.
    pub fn zeros(n_elements: usize, n_nodes: usize) -> Self {
        Self {
            data: vec![0.0; n_elements * N_FIELDS * n_nodes],
            n_elements,
            n_nodes,
        }
    }

    /// Wrap a flat vector in the element-major layout.
    pub fn from_vec(data: Vec<f64>, n_elements: usize, n_nodes: usize) -> Result<Self> {
        if data.len() != n_elements * N_FIELDS * n_nodes {
            return Err(DgError::config(format!(
                "field data has length {}, expected {} elements x {} fields x {} nodes",
                data.len(),
                n_elements,
                N_FIELDS,
                n_nodes
            )));
        }
        Ok(Self {
            data,
            n_elements,
            n_nodes,
        })
    }

    /// Fill from `f(node, element)`.
    pub fn from_fn<F>(n_elements: usize, n_nodes: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> EulerState,
    {
        let mut out = Self::zeros(n_elements, n_nodes);
        for k in 0..n_elements {
            for n in 0..n_nodes {
                out.set_state(n, k, &f(n, k));
            }
        }
        out
    }

    #[inline]
    fn index(&self, field: usize, node: usize, element: usize) -> usize {
        (element * N_FIELDS + field) * self.n_nodes + node
    }

    /// Value of `field` at `node` of `element`.
    #[inline]
    pub fn get(&self, field: Field, node: usize, element: usize) -> f64 {
        self.data[self.index(field.index(), node, element)]
    }

    #[inline]
    pub fn set(&mut self, field: Field, node: usize, element: usize, value: f64) {
        let i = self.index(field.index(), node, element);
        self.data[i] = value;
    }

    /// All five fields at one node.
    pub fn state(&self, node: usize, element: usize) -> EulerState {
        EulerState::from_array(std::array::from_fn(|f| {
            self.data[self.index(f, node, element)]
        }))
    }

    pub fn set_state(&mut self, node: usize, element: usize, state: &EulerState) {
        for (f, value) in state.to_array().into_iter().enumerate() {
            let i = self.index(f, node, element);
            self.data[i] = value;
        }
    }

    /// Values of one field of one element.
    pub fn element_field(&self, field: Field, element: usize) -> &[f64] {
        let start = self.index(field.index(), 0, element);
        &self.data[start..start + self.n_nodes]
    }

    pub fn n_elements(&self) -> usize {
        self.n_elements
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat view in the kernel layout.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Whether every value is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Largest absolute difference to `other` over all entries.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}
