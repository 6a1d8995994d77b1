//! divergir: pedagogical GPU warp-divergence and data-reuse metrics
//!
//! Computes two course-scale GPU performance metrics without touching
//! real hardware:
//!
//! - **Warp divergence**: walk a synthetic 2D or 3D grid of blocks in
//!   deterministic row-major order, evaluate a per-thread activity
//!   predicate, and flag every warp whose threads disagree with the
//!   warp's first thread.
//! - **Data reuse**: closed-form reuse factor for an internal tile of
//!   an N-dimensional convolution.
//!
//! # Example
//!
//! ```
//! use divergir::DivergenceSimulator;
//!
//! // 4x4 blocks over a 6x6 image, warps of 4: the blocks straddling
//! // the x = 6 edge produce mixed-activity warps.
//! let sim = DivergenceSimulator::new([4, 4], [6, 6], 4).unwrap();
//! let report = sim.run();
//! assert_eq!(report.divergent_count(), 6);
//! ```

// Allow some pedantic lints for this CLI tool
#![allow(clippy::cast_precision_loss)] // u128 -> f64 for the reuse ratio
#![allow(clippy::uninlined_format_args)] // Style preference

pub mod divergence;
pub mod error;
pub mod grid;
pub mod output;
pub mod report;
pub mod reuse;

pub use divergence::{ActivityPredicate, DivergenceReport, DivergenceSimulator};
pub use error::{DivergirError, Result};
pub use grid::{checked_positive, BlockGrid, RowMajorWalk};
pub use output::{format_json, format_text, write_report, OutputFormat};
pub use report::{MetricReport, MetricValue};
pub use reuse::{reuse_factor, reuse_report, uniform_reuse_factor};
