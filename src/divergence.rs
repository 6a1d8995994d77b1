//! Warp-divergence simulation over a blocked 2D or 3D grid
//!
//! Walks every (block, thread) pair of a synthetic execution grid in
//! deterministic row-major order, evaluates an activity predicate per
//! thread, and flags each warp whose threads disagree with the warp's
//! first (reference) thread. Threads are grouped into warps by a single
//! flat counter: warp index = `counter / warp_size`.
//!
//! # Example
//!
//! ```
//! use divergir::divergence::DivergenceSimulator;
//!
//! // Second block along x straddles the domain edge at 6, so every
//! // row-of-4 warp in that block diverges.
//! let sim = DivergenceSimulator::new([4, 4], [6, 6], 4).unwrap();
//! let report = sim.run();
//! assert_eq!(report.divergent_warps, vec![4, 5, 6, 7, 12, 13]);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{DivergirError, Result};
use crate::grid::{BlockGrid, RowMajorWalk};
use crate::report::{MetricReport, MetricValue};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Metric name for the divergent-warp count
pub const DIVERGENT_COUNT_METRIC: &str = "Number of Divergent Warps";
/// Metric name for the divergent-warp index list
pub const DIVERGENT_WARPS_METRIC: &str = "Divergent Warps";

/// Per-thread activity predicate evaluated during the grid walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityPredicate {
    /// Plain bounds check: the thread's global position must lie inside
    /// the domain on every axis. Historical default for 2D grids.
    InBounds,
    /// Two-iteration unrolling along dimension 0: the thread covers
    /// positions `x = block[0]*blockExtent[0]*2 + thread[0]` and
    /// `x + blockExtent[0]`, and is active only when both land inside
    /// the domain. Axes 1 and 2 do not participate. Historical default
    /// for 3D grids.
    LoopSkip,
}

impl ActivityPredicate {
    /// Historical default predicate for a grid of `dims` dimensions
    #[must_use]
    pub fn default_for_dims(dims: usize) -> Self {
        if dims >= 3 {
            Self::LoopSkip
        } else {
            Self::InBounds
        }
    }

    /// Evaluate for one thread of one block
    ///
    /// Arithmetic is widened to `u64` so extreme-but-valid extents
    /// cannot overflow.
    #[must_use]
    pub fn is_active<const N: usize>(
        self,
        thread: [u32; N],
        block: [u32; N],
        block_extent: [u32; N],
        domain: [u32; N],
    ) -> bool {
        match self {
            Self::InBounds => (0..N).all(|d| {
                u64::from(block[d]) * u64::from(block_extent[d]) + u64::from(thread[d])
                    < u64::from(domain[d])
            }),
            Self::LoopSkip => {
                let x = u64::from(block[0]) * u64::from(block_extent[0]) * 2
                    + u64::from(thread[0]);
                let x2 = x + u64::from(block_extent[0]);
                x < u64::from(domain[0]) && x2 < u64::from(domain[0])
            }
        }
    }
}

/// Outcome of one simulation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceReport {
    /// Indices of divergent warps, in order of first detection
    pub divergent_warps: Vec<u64>,
    /// Warps the grid produces in total (`ceil(threads / warp_size)`)
    pub total_warps: u64,
}

impl DivergenceReport {
    /// Number of divergent warps
    #[must_use]
    pub fn divergent_count(&self) -> usize {
        self.divergent_warps.len()
    }

    /// Convert into the printable two-entry metric report
    #[must_use]
    pub fn to_metrics(&self) -> MetricReport {
        let mut report = MetricReport::new();
        report.push(
            DIVERGENT_COUNT_METRIC,
            MetricValue::Count(self.divergent_warps.len() as u64),
        );
        report.push(
            DIVERGENT_WARPS_METRIC,
            MetricValue::Indices(self.divergent_warps.clone()),
        );
        report
    }
}

/// Simulator configuration: grid geometry, warp size, and predicate
#[derive(Debug, Clone)]
pub struct DivergenceSimulator<const N: usize> {
    grid: BlockGrid<N>,
    warp_size: u32,
    predicate: ActivityPredicate,
}

impl<const N: usize> DivergenceSimulator<N> {
    /// Create a simulator with the historical default predicate for N
    ///
    /// # Errors
    ///
    /// Returns `InvalidExtent` if any block or domain component, or the
    /// warp size, is zero.
    pub fn new(block: [u32; N], domain: [u32; N], warp_size: u32) -> Result<Self> {
        let grid = BlockGrid::new(block, domain)?;
        if warp_size == 0 {
            return Err(DivergirError::InvalidExtent {
                name: "warp-sz",
                value: 0,
            });
        }
        Ok(Self {
            grid,
            warp_size,
            predicate: ActivityPredicate::default_for_dims(N),
        })
    }

    /// Replace the default predicate
    #[must_use]
    pub fn with_predicate(mut self, predicate: ActivityPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// The predicate this simulator will evaluate
    #[must_use]
    pub fn predicate(&self) -> ActivityPredicate {
        self.predicate
    }

    /// Walk every (block, thread) pair and classify warps
    ///
    /// A warp starts whenever `counter % warp_size == 0`; its first
    /// thread's outcome is the reference. The warp is recorded as
    /// divergent on the first later thread that disagrees, and never
    /// re-recorded.
    #[cfg_attr(
        feature = "tracing",
        instrument(skip(self), fields(
            threads = self.grid.total_threads(),
            warp_size = self.warp_size
        ))
    )]
    #[must_use]
    pub fn run(&self) -> DivergenceReport {
        let warp_size = u64::from(self.warp_size);
        let mut divergent_warps = Vec::new();
        let mut counter: u64 = 0;
        let mut reference = false;
        let mut counted = false;

        for block in RowMajorWalk::new(self.grid.num_blocks()) {
            for thread in RowMajorWalk::new(self.grid.block) {
                let active =
                    self.predicate
                        .is_active(thread, block, self.grid.block, self.grid.domain);
                if counter % warp_size == 0 {
                    reference = active;
                    counted = false;
                } else if active != reference && !counted {
                    counted = true;
                    divergent_warps.push(counter / warp_size);
                }
                counter += 1;
            }
        }

        DivergenceReport {
            divergent_warps,
            total_warps: counter.div_ceil(warp_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_2d_boundary_straddle() {
        // Blocks of 4x4 over a 6x6 image, warp = one row of 4. Rows with
        // global x in 4..8 mix in-bounds (4, 5) and out-of-bounds (6, 7)
        // threads; rows that are fully out along y stay uniform.
        let report = DivergenceSimulator::new([4, 4], [6, 6], 4).unwrap().run();
        assert_eq!(report.divergent_warps, vec![4, 5, 6, 7, 12, 13]);
        assert_eq!(report.divergent_count(), 6);
        assert_eq!(report.total_warps, 16);
    }

    #[test]
    fn test_2d_exact_cover_no_divergence() {
        let report = DivergenceSimulator::new([4, 4], [8, 8], 4).unwrap().run();
        assert!(report.divergent_warps.is_empty());
    }

    #[test]
    fn test_3d_loop_skip_exact_cover_no_divergence() {
        // blockExtent=(8,1,1), domain=(64,1,1), warp=8: every warp's
        // unrolled pair lands entirely inside or entirely outside.
        let report = DivergenceSimulator::new([8, 1, 1], [64, 1, 1], 8)
            .unwrap()
            .run();
        assert!(report.divergent_warps.is_empty());
        assert_eq!(report.total_warps, 8);
    }

    #[test]
    fn test_3d_loop_skip_divergence_in_first_block() {
        // x = t, x2 = t + 4, active iff t < 2: threads 0,1 active and
        // 2,3 inactive inside warp 0.
        let report = DivergenceSimulator::new([4, 1, 1], [6, 1, 1], 4)
            .unwrap()
            .run();
        assert_eq!(report.divergent_warps, vec![0]);
    }

    #[test]
    fn test_3d_loop_skip_multi_axis_blocks() {
        // Predicate only reads axis 0, so the y-split blocks repeat the
        // same divergence pattern at higher warp indices.
        let report = DivergenceSimulator::new([4, 2, 1], [6, 4, 1], 4)
            .unwrap()
            .run();
        assert_eq!(report.divergent_warps, vec![0, 1, 4, 5]);
    }

    #[test]
    fn test_3d_in_bounds_override() {
        // Same geometry as the loop-skip first-block test, but the plain
        // bounds predicate only splits the second block (x = 4..8).
        let report = DivergenceSimulator::new([4, 1, 1], [6, 1, 1], 4)
            .unwrap()
            .with_predicate(ActivityPredicate::InBounds)
            .run();
        assert_eq!(report.divergent_warps, vec![1]);
    }

    #[test]
    fn test_2d_loop_skip_override() {
        let sim = DivergenceSimulator::new([4, 1], [6, 1], 4)
            .unwrap()
            .with_predicate(ActivityPredicate::LoopSkip);
        assert_eq!(sim.predicate(), ActivityPredicate::LoopSkip);
        assert_eq!(sim.run().divergent_warps, vec![0]);
    }

    #[test]
    fn test_warp_larger_than_grid_uniform_domain() {
        // One warp covering the whole exactly-tiled grid: every thread
        // is active, so nothing can disagree with the reference.
        let report = DivergenceSimulator::new([2, 2], [4, 4], 100)
            .unwrap()
            .run();
        assert_eq!(report.total_warps, 1);
        assert!(report.divergent_warps.is_empty());
    }

    #[test]
    fn test_warp_size_one_never_diverges() {
        // Every thread is its own reference.
        let report = DivergenceSimulator::new([4, 4], [6, 6], 1).unwrap().run();
        assert!(report.divergent_warps.is_empty());
        assert_eq!(report.total_warps, 64);
    }

    #[test]
    fn test_run_is_idempotent() {
        let sim = DivergenceSimulator::new([4, 4, 2], [6, 6, 3], 8).unwrap();
        assert_eq!(sim.run(), sim.run());
    }

    #[test]
    fn test_default_predicates_by_dimensionality() {
        assert_eq!(
            ActivityPredicate::default_for_dims(2),
            ActivityPredicate::InBounds
        );
        assert_eq!(
            ActivityPredicate::default_for_dims(3),
            ActivityPredicate::LoopSkip
        );
    }

    #[test]
    fn test_rejects_zero_warp_size() {
        let err = DivergenceSimulator::new([4, 4], [6, 6], 0).unwrap_err();
        assert!(matches!(
            err,
            DivergirError::InvalidExtent { name: "warp-sz", .. }
        ));
    }

    #[test]
    fn test_rejects_zero_extents() {
        assert!(DivergenceSimulator::new([0, 4], [6, 6], 4).is_err());
        assert!(DivergenceSimulator::new([4, 4], [0, 6], 4).is_err());
    }

    #[test]
    fn test_to_metrics_order_and_values() {
        let report = DivergenceSimulator::new([4, 4], [6, 6], 4).unwrap().run();
        let metrics = report.to_metrics();
        let names: Vec<&str> = metrics.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec![DIVERGENT_COUNT_METRIC, DIVERGENT_WARPS_METRIC]);
        assert_eq!(
            metrics.get(DIVERGENT_COUNT_METRIC),
            Some(&MetricValue::Count(6))
        );
    }

    #[test]
    fn test_loop_skip_ignores_higher_axes() {
        let a = ActivityPredicate::LoopSkip.is_active([2, 0, 0], [0, 0, 0], [4, 2, 2], [10, 4, 4]);
        let b = ActivityPredicate::LoopSkip.is_active([2, 1, 1], [0, 0, 0], [4, 2, 2], [10, 4, 4]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_in_bounds_checks_every_axis() {
        // Global position (1, 3) with domain (4, 3): second axis is out.
        let active = ActivityPredicate::InBounds.is_active([1, 1], [0, 1], [2, 2], [4, 3]);
        assert!(!active);
    }
}
