//! Data-reuse factor for an internal convolution tile
//!
//! For a tile fully surrounded by valid input (no boundary padding),
//! every tile element is read once per mask position that touches it,
//! while the tile contributes to `tile + mask - 1` output positions per
//! axis. The ratio of the two products is the steady-state reuse:
//!
//! ```text
//! reuse = prod_d(tile[d] * mask[d]) / prod_d(tile[d] + mask[d] - 1)
//! ```
//!
//! # Example
//!
//! ```
//! use divergir::reuse::reuse_factor;
//!
//! let reuse = reuse_factor(&[16], &[3]).unwrap();
//! assert!((reuse - 48.0 / 18.0).abs() < 1e-12);
//! ```

use crate::error::{DivergirError, Result};
use crate::report::{MetricReport, MetricValue};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Metric name for the reuse factor
pub const REUSE_METRIC: &str = "Average Data Reuse for internal node";

/// Average data reuse for an internal tile, per-dimension extents
///
/// # Errors
///
/// - `DimensionMismatch` when `tile` and `mask` differ in length
/// - `EmptyExtent` when the vectors are empty
/// - `InvalidExtent` when any component is zero
#[cfg_attr(
    feature = "tracing",
    instrument(skip(tile, mask), fields(dims = tile.len()))
)]
pub fn reuse_factor(tile: &[u32], mask: &[u32]) -> Result<f64> {
    if tile.len() != mask.len() {
        return Err(DivergirError::DimensionMismatch {
            tile: tile.len(),
            mask: mask.len(),
        });
    }
    if tile.is_empty() {
        return Err(DivergirError::EmptyExtent);
    }

    let mut accesses: u128 = 1;
    let mut outputs: u128 = 1;
    for (&t, &m) in tile.iter().zip(mask) {
        if t == 0 {
            return Err(DivergirError::InvalidExtent {
                name: "tile-dims",
                value: 0,
            });
        }
        if m == 0 {
            return Err(DivergirError::InvalidExtent {
                name: "mask-dims",
                value: 0,
            });
        }
        accesses *= u128::from(t) * u128::from(m);
        outputs *= u128::from(t) + u128::from(m) - 1;
    }

    Ok(accesses as f64 / outputs as f64)
}

/// Uniform-width convenience: every dimension shares one tile and mask width
///
/// Computes `(tw*mw)^dims / (tw+mw-1)^dims` by delegating to
/// [`reuse_factor`] with replicated vectors.
///
/// # Errors
///
/// Same conditions as [`reuse_factor`]; `dims == 0` is `EmptyExtent`.
pub fn uniform_reuse_factor(tile_width: u32, mask_width: u32, dims: usize) -> Result<f64> {
    reuse_factor(&vec![tile_width; dims], &vec![mask_width; dims])
}

/// Compute the reuse factor and wrap it in a printable report
///
/// # Errors
///
/// Same conditions as [`reuse_factor`].
pub fn reuse_report(tile: &[u32], mask: &[u32]) -> Result<MetricReport> {
    let factor = reuse_factor(tile, mask)?;
    let mut report = MetricReport::new();
    report.push(REUSE_METRIC, MetricValue::Ratio(factor));
    Ok(report)
}
