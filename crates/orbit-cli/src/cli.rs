//! Command line definition and helpers
//!
//! ORBIT uses the `clap` crate to parse command line arguments. Besides the
//! argument types this module contains the logger setup, the parsers turning
//! textual box and constraint descriptions into kernel types, the bundled
//! demo systems and the result printer.

use std::path::PathBuf;

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{LevelFilter, info};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config, Root},
};

use orbit_cegar::cegar;
use orbit_cegar::locator::AllButTerminal;
use orbit_kernel::constraint::{AxisRange, Bound, ConstraintSet};
use orbit_kernel::enclosure::Enclosure;
use orbit_kernel::interval::Interval;
use orbit_kernel::logic::{Effort, Kleenean};
use orbit_kernel::map::AffineMap;
use orbit_kernel::scalar::{Scalar, fraction, integer, parse_decimal};
use orbit_refinement::RefinementTree;
use orbit_refinement::strategy::Bisection;

/// Verifier for safety of discrete-time dynamical systems
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(flatten)]
    pub log_config: LoggerConfig,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify an affine system described on the command line
    Check {
        /// Box bounding the analysed state space, e.g. "-2:2,-2:2"
        #[arg(long)]
        root: String,

        /// Box of initial states, e.g. "0:0.5,0:0.5"
        #[arg(long)]
        initial: String,

        /// Safe region, one range per axis with "_" for an unbounded side,
        /// e.g. "-1:1,0:_"
        #[arg(long)]
        safe: String,

        /// Diagonal of the system matrix, e.g. "0.5,0.5"
        #[arg(long)]
        scale: String,

        /// Offset added after scaling, e.g. "0,1"
        #[arg(long)]
        offset: String,

        /// Number of abstraction cells after which the verifier gives up
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Effort for the three-valued predicates of the kernel
        #[arg(long)]
        effort: Option<u32>,

        /// Configuration file with verification options
        #[arg(long)]
        config_file: Option<PathBuf>,
    },

    /// Run one of the bundled demo systems
    Demo {
        /// Demo system to run
        #[arg(value_enum)]
        system: DemoSystem,

        /// Number of abstraction cells after which the verifier gives up
        #[arg(long)]
        max_nodes: Option<usize>,
    },
}

/// Bundled demo systems
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum DemoSystem {
    /// Halving map on the line, proved safe after a few refinements
    Contraction,
    /// Identity on a box far away from the safe set, proved unsafe
    Escape,
    /// Quarter turn with halving in the plane
    Spiral,
    /// Drift by one per step with a positivity constraint, typically
    /// exhausts the budget
    Drift,
}

/// Logger configuration
#[derive(Args, Debug)]
pub struct LoggerConfig {
    /// Logger configuration in the log4rs file format
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Log debug information to stdout
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Initialize the logger
///
/// By default the logger writes info-level messages to stdout. If a log4rs
/// configuration file is supplied it takes precedence over the built-in
/// configuration.
pub fn initialize_logger(cfg: LoggerConfig) -> Result<(), anyhow::Error> {
    if let Some(f) = cfg.log_file {
        log4rs::init_file(f, Default::default())
            .context("Failed to initialize logger from the supplied file")?;
        return Ok(());
    }

    let stdout = ConsoleAppender::builder().build();
    let level = if cfg.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .context("Failed to build console logger configuration")?;
    log4rs::init_config(log_config).context("Failed to initialize console logger")?;
    Ok(())
}

/// Parse a box description of the form `lo:hi,lo:hi,...`
pub fn parse_enclosure(input: &str) -> Result<Enclosure, anyhow::Error> {
    let intervals = input
        .split(',')
        .map(|axis| {
            let (lo, hi) = axis
                .split_once(':')
                .ok_or_else(|| anyhow!("expected 'lo:hi' but got '{axis}'"))?;
            let lo = parse_decimal(lo).with_context(|| format!("lower bound of '{axis}'"))?;
            let hi = parse_decimal(hi).with_context(|| format!("upper bound of '{axis}'"))?;
            if lo > hi {
                bail!("the range '{axis}' is empty");
            }
            Ok(Interval::new(lo, hi))
        })
        .collect::<Result<Vec<_>, anyhow::Error>>()?;
    Ok(Enclosure::new(intervals))
}

/// Parse a constraint description of the form `lo:hi,...` with `_` standing
/// for an unbounded side
pub fn parse_constraints(input: &str) -> Result<ConstraintSet, anyhow::Error> {
    let ranges = input
        .split(',')
        .map(|axis| {
            let (lo, hi) = axis
                .split_once(':')
                .ok_or_else(|| anyhow!("expected 'lo:hi' but got '{axis}'"))?;
            let lower = parse_bound(lo).with_context(|| format!("lower bound of '{axis}'"))?;
            let upper = parse_bound(hi).with_context(|| format!("upper bound of '{axis}'"))?;
            AxisRange::new(lower, upper).map_err(anyhow::Error::from)
        })
        .collect::<Result<Vec<_>, anyhow::Error>>()?;
    ConstraintSet::new(ranges).map_err(anyhow::Error::from)
}

fn parse_bound(input: &str) -> Result<Bound, anyhow::Error> {
    if input.trim() == "_" {
        return Ok(Bound::Unbounded);
    }
    Ok(Bound::At(parse_decimal(input)?))
}

/// Parse a comma-separated list of decimals
pub fn parse_scalars(input: &str) -> Result<Vec<Scalar>, anyhow::Error> {
    input
        .split(',')
        .map(|entry| parse_decimal(entry).map_err(anyhow::Error::from))
        .collect()
}

/// A fully described verification problem
pub struct System {
    pub root: Enclosure,
    pub initial: Enclosure,
    pub constraints: ConstraintSet,
    pub dynamics: AffineMap,
}

impl System {
    /// Build the system from the textual descriptions of the `check` command
    pub fn from_descriptions(
        root: &str,
        initial: &str,
        safe: &str,
        scale: &str,
        offset: &str,
    ) -> Result<Self, anyhow::Error> {
        let root = parse_enclosure(root).context("Failed to parse the root box")?;
        let initial = parse_enclosure(initial).context("Failed to parse the initial box")?;
        let constraints = parse_constraints(safe).context("Failed to parse the safe region")?;

        let scale = parse_scalars(scale).context("Failed to parse the scaling factors")?;
        let offset = parse_scalars(offset).context("Failed to parse the offsets")?;
        if scale.len() != offset.len() {
            bail!(
                "got {} scaling factors but {} offsets",
                scale.len(),
                offset.len()
            );
        }
        let dynamics = diagonal_with_offset(scale, offset)?;

        if initial.dimension() != root.dimension() {
            bail!(
                "the initial box has dimension {} but the root box has dimension {}",
                initial.dimension(),
                root.dimension()
            );
        }

        Ok(System {
            root,
            initial,
            constraints,
            dynamics,
        })
    }

    /// One of the bundled demo systems
    pub fn demo(which: DemoSystem) -> Self {
        match which {
            DemoSystem::Contraction => System {
                root: Enclosure::new(vec![Interval::new(integer(-2), integer(2))]),
                initial: Enclosure::new(vec![Interval::new(integer(0), fraction(1, 2))]),
                constraints: ConstraintSet::new(vec![
                    AxisRange::between(integer(-1), integer(1)).expect("bounds are ordered"),
                ])
                .expect("one axis"),
                dynamics: AffineMap::line(fraction(1, 2), integer(0)),
            },
            DemoSystem::Escape => System {
                root: Enclosure::new(vec![Interval::new(integer(0), integer(1))]),
                initial: Enclosure::new(vec![Interval::new(integer(0), integer(1))]),
                constraints: ConstraintSet::new(vec![
                    AxisRange::between(integer(2), integer(3)).expect("bounds are ordered"),
                ])
                .expect("one axis"),
                dynamics: AffineMap::identity(1),
            },
            DemoSystem::Spiral => System {
                root: Enclosure::new(vec![
                    Interval::new(integer(-2), integer(2)),
                    Interval::new(integer(-2), integer(2)),
                ]),
                initial: Enclosure::new(vec![
                    Interval::new(integer(0), fraction(1, 2)),
                    Interval::new(integer(0), fraction(1, 2)),
                ]),
                constraints: ConstraintSet::new(vec![
                    AxisRange::between(integer(-1), integer(1)).expect("bounds are ordered"),
                    AxisRange::between(integer(-1), integer(1)).expect("bounds are ordered"),
                ])
                .expect("two axes"),
                dynamics: AffineMap::new(
                    vec![
                        vec![integer(0), fraction(-1, 2)],
                        vec![fraction(1, 2), integer(0)],
                    ],
                    vec![integer(0), integer(0)],
                )
                .expect("the matrix is square"),
            },
            DemoSystem::Drift => System {
                root: Enclosure::new(vec![Interval::new(integer(-10), integer(10))]),
                initial: Enclosure::new(vec![Interval::new(integer(0), fraction(1, 10))]),
                constraints: ConstraintSet::new(vec![AxisRange::at_least(integer(0))])
                    .expect("one axis"),
                dynamics: AffineMap::line(integer(1), integer(1)),
            },
        }
    }
}

/// The map `x ↦ D·x + b` for a diagonal `D` given by `scale`
fn diagonal_with_offset(
    scale: Vec<Scalar>,
    offset: Vec<Scalar>,
) -> Result<AffineMap, anyhow::Error> {
    let dimension = scale.len();
    let matrix = scale
        .iter()
        .enumerate()
        .map(|(i, factor)| {
            let mut row = vec![integer(0); dimension];
            row[i] = factor.clone();
            row
        })
        .collect();
    AffineMap::new(matrix, offset).map_err(anyhow::Error::from)
}

/// Run the verifier on a system and print the result
pub fn run_system(system: System, effort: Effort, max_nodes: usize) -> Result<(), anyhow::Error> {
    info!(
        "verifying {} with safe region {} and cell budget {max_nodes}",
        system.root, system.constraints
    );

    let mut rtree: RefinementTree<2> = RefinementTree::new(
        system.root,
        system.constraints,
        Box::new(system.dynamics),
        effort,
    )?;

    let (verdict, path) = cegar(
        &mut rtree,
        &system.initial,
        effort,
        &Bisection,
        &AllButTerminal,
        max_nodes,
    );

    display_result(&rtree, verdict, &path);
    Ok(())
}

/// Print the verification result
pub fn display_result<const N: usize>(
    rtree: &RefinementTree<N>,
    verdict: Kleenean,
    path: &[orbit_refinement::graph::VertexId],
) {
    match verdict {
        Kleenean::True => println!(
            "SAFE: every trajectory from the initial region stays in the safe set ({} cells)",
            rtree.node_count()
        ),
        Kleenean::False => {
            println!("UNSAFE: a concrete trajectory reaches an unsafe region via");
            for &vertex in path {
                match rtree.node_value(vertex) {
                    Some(value) => println!("  {}", value.enclosure()),
                    None => println!("  outside the root box {}", rtree.root_enclosure()),
                }
            }
        }
        Kleenean::Indeterminate => println!(
            "INCONCLUSIVE: no proof within the cell budget ({} cells)",
            rtree.node_count()
        ),
    }
}
