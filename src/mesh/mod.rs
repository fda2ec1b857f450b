//! Mesh representation.
//!
//! Provides the structured hexahedral mesh of a periodic box:
//! - Cartesian tiling with trilinear element maps (`HexMesh`, `HexMeshBuilder`)
//! - High-order GLL geometry nodes per element
//! - Smooth volume warping that keeps the periodic boundary fixed

mod hex_mesh;
mod warp;

pub use hex_mesh::{build_hex_mesh, HexMesh, HexMeshBuilder};
pub use warp::{apply_curved_warp, WarpConfig};
