use ndarray::Array3;

use crate::model::SkyAxis;

/// A fixed sequence of axis swaps applied to a 3D array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisPermutation {
    swaps: [(usize, usize); 2],
}

/// FITS storage order (Velocity, Dec, RA) to viewer order (RA, Velocity, Dec):
/// swap axes 0 and 1, then 0 and 2 of the result.
pub const VIEWER_ORDER: AxisPermutation = AxisPermutation {
    swaps: [(0, 1), (0, 2)],
};

impl AxisPermutation {
    pub fn swaps(&self) -> &[(usize, usize)] {
        &self.swaps
    }

    /// Strides-only; no samples are copied.
    pub fn apply<T>(&self, mut data: Array3<T>) -> Array3<T> {
        for (first, second) in self.swaps {
            data.swap_axes(first, second);
        }
        data
    }

    pub fn permute_shape(&self, shape: [usize; 3]) -> [usize; 3] {
        let mut shape = shape;
        for (first, second) in self.swaps {
            shape.swap(first, second);
        }
        shape
    }

    /// Output slot of every source slot.
    pub fn destination(&self, source: usize) -> usize {
        let mut slots = [0usize, 1, 2];
        for (first, second) in self.swaps {
            slots.swap(first, second);
        }
        slots
            .iter()
            .position(|slot| *slot == source)
            .unwrap_or(source)
    }
}

pub fn reorder<T>(data: Array3<T>) -> Array3<T> {
    debug_assert!(
        SkyAxis::ALL
            .iter()
            .all(|axis| VIEWER_ORDER.destination(axis.source_position()) == axis.target_position())
    );
    VIEWER_ORDER.apply(data)
}
