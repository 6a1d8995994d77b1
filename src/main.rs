//! divergir CLI
//!
//! Course-scale GPU metric calculators: warp-divergence simulation over
//! a blocked 2D/3D grid, and convolution data reuse for an internal
//! tile. All validation happens here, before the computational
//! components run; the components receive plain, already-checked
//! values and never read process state.

use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;

use divergir::grid::checked_positive;
use divergir::{
    output, reuse, ActivityPredicate, DivergenceSimulator, DivergirError, MetricReport,
    OutputFormat, Result,
};

#[derive(Parser)]
#[command(name = "divergir")]
#[command(version, about = "Pedagogical GPU warp-divergence and data-reuse calculator")]
#[command(long_about = "
Computes course-scale GPU performance metrics on a synthetic grid:

  conv-reuse       average data reuse for an internal convolution tile
  warp-divergence  count and identify divergent warps under a fixed
                   activity predicate

No real GPU is involved; both metrics are deterministic functions of
their integer arguments.
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Average data reuse for an internal convolution tile
    ConvReuse {
        /// Comma-separated tile extents, e.g. "16,16,8"
        #[arg(value_name = "tile-dims")]
        tile: String,

        /// Comma-separated mask extents, same length as the tile list
        #[arg(value_name = "mask-dims")]
        mask: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count divergent warps for a blocked 2D or 3D grid
    WarpDivergence {
        /// <block-x> <block-y> [<block-z>] <img-x> <img-y> [<img-z>] <warp-sz>
        ///
        /// 5 integers run the 2D simulator, 7 the 3D one.
        #[arg(value_name = "DIM", num_args = 5..=7, allow_negative_numbers = true)]
        dims: Vec<i64>,

        /// Activity predicate (defaults to in-bounds for 2D, loop-skip for 3D)
        #[arg(long, value_enum)]
        predicate: Option<PredicateArg>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// CLI-facing predicate names
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PredicateArg {
    /// Thread's global position inside the domain on every axis
    InBounds,
    /// Two-iteration unrolling along x: both strided positions in bounds
    LoopSkip,
}

impl From<PredicateArg> for ActivityPredicate {
    fn from(arg: PredicateArg) -> Self {
        match arg {
            PredicateArg::InBounds => ActivityPredicate::InBounds,
            PredicateArg::LoopSkip => ActivityPredicate::LoopSkip,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::ConvReuse { tile, mask, json } => {
            let tile = parse_dim_list("tile-dims", &tile)?;
            let mask = parse_dim_list("mask-dims", &mask)?;
            let report = reuse::reuse_report(&tile, &mask)?;
            output::write_report(&report, format_for(json))
        }

        Commands::WarpDivergence {
            dims,
            predicate,
            json,
        } => {
            let report = simulate(&dims, predicate.map(ActivityPredicate::from))?;
            output::write_report(&report, format_for(json))
        }
    }
}

fn format_for(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    }
}

/// Dispatch on argument arity: 5 integers -> 2D, 7 -> 3D
fn simulate(dims: &[i64], predicate: Option<ActivityPredicate>) -> Result<MetricReport> {
    match dims.len() {
        5 => {
            let block = [
                checked_positive("block-x", dims[0])?,
                checked_positive("block-y", dims[1])?,
            ];
            let domain = [
                checked_positive("img-x", dims[2])?,
                checked_positive("img-y", dims[3])?,
            ];
            let warp_size = checked_positive("warp-sz", dims[4])?;
            let mut sim = DivergenceSimulator::new(block, domain, warp_size)?;
            if let Some(predicate) = predicate {
                sim = sim.with_predicate(predicate);
            }
            Ok(sim.run().to_metrics())
        }
        7 => {
            let block = [
                checked_positive("block-x", dims[0])?,
                checked_positive("block-y", dims[1])?,
                checked_positive("block-z", dims[2])?,
            ];
            let domain = [
                checked_positive("img-x", dims[3])?,
                checked_positive("img-y", dims[4])?,
                checked_positive("img-z", dims[5])?,
            ];
            let warp_size = checked_positive("warp-sz", dims[6])?;
            let mut sim = DivergenceSimulator::new(block, domain, warp_size)?;
            if let Some(predicate) = predicate {
                sim = sim.with_predicate(predicate);
            }
            Ok(sim.run().to_metrics())
        }
        n => Err(DivergirError::InvalidArguments(format!(
            "warp-divergence takes 5 (2D) or 7 (3D) integer arguments, got {}",
            n
        ))),
    }
}

/// Parse a comma-separated list of positive extents
fn parse_dim_list(name: &'static str, raw: &str) -> Result<Vec<u32>> {
    raw.split(',')
        .map(str::trim)
        .map(|token| {
            let value: i64 = token.parse().map_err(|_| {
                DivergirError::InvalidArguments(format!(
                    "{} entry {:?} is not an integer",
                    name, token
                ))
            })?;
            checked_positive(name, value)
        })
        .collect()
}
