//! Reference-cube directions and face numbering.

/// A direction of the reference cube [-1, 1]^3.
///
/// Faces are numbered `2 * axis + side`: face 0 is r = -1, face 1 is r = +1,
/// face 2 is s = -1 and so on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    R = 0,
    S = 1,
    T = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::R, Axis::S, Axis::T];

    /// Axis index 0, 1 or 2.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Axis normal to face `face` (0..6).
    #[inline]
    pub fn from_face(face: usize) -> Self {
        Self::ALL[face / 2]
    }
}

/// Side of face `face`: 0 for the r/s/t = -1 face, 1 for the +1 face.
#[inline]
pub fn face_side(face: usize) -> usize {
    face % 2
}
