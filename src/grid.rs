//! Grid geometry for the divergence simulator
//!
//! Follows CUDA-style launch conventions: a domain is covered by a grid
//! of fixed-size blocks, with as many blocks per axis as needed to reach
//! the domain edge (the last block may hang past it). Coordinates are
//! enumerated lazily in row-major order, dimension 0 fastest.
//!
//! # Example
//!
//! ```
//! use divergir::grid::BlockGrid;
//!
//! let grid = BlockGrid::new([4, 4], [6, 6]).unwrap();
//! assert_eq!(grid.num_blocks(), [2, 2]);
//! assert_eq!(grid.total_threads(), 64);
//! ```

use crate::error::{DivergirError, Result};

/// Convert a raw caller-supplied integer into a positive extent component.
///
/// # Errors
///
/// Returns `InvalidExtent` when `value` is zero, negative, or does not
/// fit in a `u32`.
pub fn checked_positive(name: &'static str, value: i64) -> Result<u32> {
    if value <= 0 {
        return Err(DivergirError::InvalidExtent { name, value });
    }
    u32::try_from(value).map_err(|_| DivergirError::InvalidExtent { name, value })
}

/// Lazy row-major walk over every coordinate of an N-dimensional extent.
///
/// Dimension 0 is the fastest-varying axis: for a 3D extent the outer
/// loop runs over dimension 2, the middle over dimension 1, and the
/// inner over dimension 0. A zero component anywhere yields an empty
/// walk.
///
/// # Example
///
/// ```
/// use divergir::grid::RowMajorWalk;
///
/// let coords: Vec<[u32; 2]> = RowMajorWalk::new([2, 2]).collect();
/// assert_eq!(coords, vec![[0, 0], [1, 0], [0, 1], [1, 1]]);
/// ```
#[derive(Debug, Clone)]
pub struct RowMajorWalk<const N: usize> {
    extent: [u32; N],
    cursor: [u32; N],
    exhausted: bool,
}

impl<const N: usize> RowMajorWalk<N> {
    /// Start a walk over `extent`
    #[must_use]
    pub fn new(extent: [u32; N]) -> Self {
        Self {
            extent,
            cursor: [0; N],
            exhausted: extent.iter().any(|&e| e == 0),
        }
    }
}

impl<const N: usize> Iterator for RowMajorWalk<N> {
    type Item = [u32; N];

    fn next(&mut self) -> Option<[u32; N]> {
        if self.exhausted {
            return None;
        }
        let current = self.cursor;
        self.exhausted = true;
        for d in 0..N {
            self.cursor[d] += 1;
            if self.cursor[d] < self.extent[d] {
                self.exhausted = false;
                break;
            }
            self.cursor[d] = 0;
        }
        Some(current)
    }
}

/// Block/domain geometry for one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid<const N: usize> {
    /// Threads per block, per dimension
    pub block: [u32; N],
    /// Total domain size, per dimension
    pub domain: [u32; N],
}

impl<const N: usize> BlockGrid<N> {
    /// Create a grid covering `domain` with blocks of size `block`
    ///
    /// # Errors
    ///
    /// Returns `InvalidExtent` if any component of either extent is zero.
    pub fn new(block: [u32; N], domain: [u32; N]) -> Result<Self> {
        if block.contains(&0) {
            return Err(DivergirError::InvalidExtent {
                name: "block",
                value: 0,
            });
        }
        if domain.contains(&0) {
            return Err(DivergirError::InvalidExtent {
                name: "domain",
                value: 0,
            });
        }
        Ok(Self { block, domain })
    }

    /// Blocks per axis: `ceil(domain[d] / block[d])`
    #[must_use]
    pub fn num_blocks(&self) -> [u32; N] {
        let mut blocks = [0; N];
        for d in 0..N {
            blocks[d] = self.domain[d].div_ceil(self.block[d]);
        }
        blocks
    }

    /// Threads in one block
    #[must_use]
    pub fn threads_per_block(&self) -> u64 {
        self.block.iter().map(|&b| u64::from(b)).product()
    }

    /// Threads across the whole grid, partial blocks included
    #[must_use]
    pub fn total_threads(&self) -> u64 {
        let grid: u64 = self.num_blocks().iter().map(|&b| u64::from(b)).product();
        grid * self.threads_per_block()
    }
}
