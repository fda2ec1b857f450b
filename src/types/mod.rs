//! Strongly-typed domain types for safer APIs.
//!
//! - **Named fields over positional**: `Bounds3D { x_min, x_max, .. }` rather
//!   than a bare six-tuple
//! - **Reference-cube topology**: `Axis` names the three reference directions
//!   so face and tensor-product code cannot mix them up
//!
//! # Example
//!
//! ```
//! use dg_hex::types::{Axis, Bounds3D};
//!
//! let bounds = Bounds3D::new(0.0, 10.0, 0.0, 20.0, 0.0, 10.0);
//! assert_eq!(bounds.periods(), [10.0, 20.0, 10.0]);
//! assert_eq!(Axis::from_face(3), Axis::S);
//! ```

mod axis;
mod bounds;

pub use axis::{face_side, Axis};
pub use bounds::Bounds3D;
