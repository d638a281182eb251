//! u-tsp CLI: solve a small TSP instance from a cached matrix.

use clap::{Parser, Subcommand, ValueEnum};
use env_logger::{fmt::Formatter, Builder, Target};
use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use u_tsp::aco::{AcoConfig, AcoRunner};
use u_tsp::exact::{BnbConfig, BnbRunner, BnbStatistics, BruteForceConfig, BruteForceRunner, SearchStatus};
use u_tsp::matrix::{MatrixOptions, SymmetryPolicy};
use u_tsp::{DistanceMatrix, Result, Solution, TspError};

#[derive(Parser)]
#[command(name = "u-tsp")]
#[command(about = "Shortest closed tour over a small distance matrix")]
#[command(version)]
struct Cli {
    /// Log verbosity (written to stderr)
    #[arg(long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Prefix log lines with a millisecond timestamp
    #[arg(long, global = true)]
    log_timestamp: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance read from a CSV table or a JSON mapping
    Solve {
        /// Matrix file (`.csv` table or `.json` nested mapping)
        matrix: PathBuf,

        /// Start node name (defaults to the first node)
        #[arg(short, long)]
        start: Option<String>,

        /// Solver to run
        #[arg(long, value_enum, default_value = "bnb")]
        solver: SolverKind,

        #[command(flatten)]
        symmetry: SymmetryArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Branch-and-bound wall-clock limit in milliseconds
        #[arg(long)]
        time_limit_ms: Option<u64>,

        /// Branch-and-bound node limit
        #[arg(long)]
        node_limit: Option<u64>,

        /// Explore in parallel (branch-and-bound root split, ACO ants)
        #[arg(long)]
        parallel: bool,

        /// Skip mirror tours in brute force
        #[arg(long)]
        prune_reflections: bool,

        #[command(flatten)]
        aco: AcoArgs,
    },

    /// Convert a JSON nested mapping to a CSV table
    Convert {
        /// Input JSON mapping
        input: PathBuf,

        /// Output CSV table
        output: PathBuf,

        #[command(flatten)]
        symmetry: SymmetryArgs,
    },
}

#[derive(clap::Args)]
struct SymmetryArgs {
    /// How to reconcile the two directions of an edge
    #[arg(long, value_enum, default_value = "strict")]
    symmetry: SymmetryKind,

    /// Tolerance in km for `--symmetry strict`
    #[arg(long, default_value_t = 1e-9)]
    tolerance: f64,
}

impl SymmetryArgs {
    fn options(&self) -> MatrixOptions {
        let policy = match self.symmetry {
            SymmetryKind::Strict => SymmetryPolicy::Strict {
                tolerance: self.tolerance,
            },
            SymmetryKind::Shorter => SymmetryPolicy::Shorter,
            SymmetryKind::Directed => SymmetryPolicy::Directed,
        };
        MatrixOptions::default().with_symmetry(policy)
    }
}

/// Colony parameters. The five shape parameters have no defaults and must
/// all be given with `--solver aco`.
#[derive(clap::Args)]
struct AcoArgs {
    /// ACO ants per iteration
    #[arg(long, required_if_eq("solver", "aco"))]
    ants: Option<usize>,

    /// ACO iterations
    #[arg(long, required_if_eq("solver", "aco"))]
    iterations: Option<usize>,

    /// ACO evaporation rate in [0, 1)
    #[arg(long, required_if_eq("solver", "aco"))]
    evaporation: Option<f64>,

    /// ACO pheromone exponent
    #[arg(long, required_if_eq("solver", "aco"))]
    alpha: Option<f64>,

    /// ACO inverse-distance exponent
    #[arg(long, required_if_eq("solver", "aco"))]
    beta: Option<f64>,

    /// ACO deposit constant Q
    #[arg(long, default_value_t = 1.0)]
    deposit: f64,

    /// ACO initial pheromone level
    #[arg(long, default_value_t = 1.0)]
    initial_pheromone: f64,

    /// ACO random seed
    #[arg(long)]
    seed: Option<u64>,
}

impl AcoArgs {
    fn config(&self, parallel: bool) -> Result<AcoConfig> {
        let (Some(ants), Some(iterations), Some(evaporation), Some(alpha), Some(beta)) =
            (self.ants, self.iterations, self.evaporation, self.alpha, self.beta)
        else {
            return Err(TspError::invalid_config(
                "--solver aco needs --ants, --iterations, --evaporation, --alpha and --beta",
            ));
        };
        let config = AcoConfig::new(ants, iterations, evaporation, alpha, beta)
            .with_deposit_constant(self.deposit)
            .with_initial_pheromone(self.initial_pheromone)
            .with_parallel(parallel);
        Ok(match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }
}

#[derive(Clone, Copy, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum SolverKind {
    Brute,
    Bnb,
    Aco,
}

impl SolverKind {
    fn label(self) -> &'static str {
        match self {
            SolverKind::Brute => "Brute Force",
            SolverKind::Bnb => "Branch and Bound",
            SolverKind::Aco => "ACO",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SymmetryKind {
    Strict,
    Shorter,
    Directed,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// JSON matrix file: a bare `from -> to -> km` mapping, or the mapping
/// with an explicit node order.
#[derive(Deserialize)]
#[serde(untagged)]
enum MatrixFile {
    Ordered {
        nodes: Vec<String>,
        distances: BTreeMap<String, BTreeMap<String, f64>>,
    },
    Nested(BTreeMap<String, BTreeMap<String, f64>>),
}

#[derive(Serialize)]
struct Report {
    solver: SolverKind,
    start: String,
    found: bool,
    route: Option<Vec<String>>,
    total_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<SearchStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<BnbStatistics>,
}

fn main() {
    let cli = Cli::parse();

    let result = init_logger(cli.log_level, cli.log_timestamp).and_then(|()| match cli.command {
        Commands::Solve {
            matrix,
            start,
            solver,
            symmetry,
            json,
            time_limit_ms,
            node_limit,
            parallel,
            prune_reflections,
            aco,
        } => {
            let mut bnb = BnbConfig::default().with_parallel(parallel);
            if let Some(ms) = time_limit_ms {
                bnb = bnb.with_time_limit_ms(ms);
            }
            if let Some(nodes) = node_limit {
                bnb = bnb.with_node_limit(nodes);
            }
            let brute = BruteForceConfig::default().with_prune_reflections(prune_reflections);
            let aco = match solver {
                SolverKind::Aco => Some(aco.config(parallel)?),
                SolverKind::Brute | SolverKind::Bnb => None,
            };
            cmd_solve(
                &matrix,
                start.as_deref(),
                solver,
                symmetry.options(),
                json,
                &brute,
                &bnb,
                aco.as_ref(),
            )
        }
        Commands::Convert {
            input,
            output,
            symmetry,
        } => cmd_convert(&input, &output, symmetry.options()),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logger(level: LogLevel, timestamp: bool) -> Result<()> {
    let mut builder = Builder::new();
    builder
        .filter_level(level.to_filter())
        .write_style(env_logger::WriteStyle::Never)
        .target(Target::Stderr)
        .format(move |buf: &mut Formatter, record| {
            if timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            writeln!(buf, "{} {}", level_tag(record.level()), record.args())
        });

    builder
        .try_init()
        .map_err(|e| TspError::invalid_config(format!("logger init failed: {e}")))
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn load_matrix(path: &Path, options: MatrixOptions) -> Result<DistanceMatrix> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let matrix = if is_json {
        let file: MatrixFile = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        match file {
            MatrixFile::Ordered { nodes, distances } => {
                DistanceMatrix::from_nested_ordered(&nodes, &distances, options)?
            }
            MatrixFile::Nested(distances) => DistanceMatrix::from_nested(&distances, options)?,
        }
    } else {
        DistanceMatrix::load_csv(path, options)?
    };

    log::info!(
        "cli: loaded matrix path={} nodes={} symmetric={}",
        path.display(),
        matrix.node_count(),
        matrix.is_symmetric()
    );
    Ok(matrix)
}

#[allow(clippy::too_many_arguments)]
fn cmd_solve(
    path: &Path,
    start: Option<&str>,
    solver: SolverKind,
    options: MatrixOptions,
    json: bool,
    brute: &BruteForceConfig,
    bnb: &BnbConfig,
    aco: Option<&AcoConfig>,
) -> Result<()> {
    let matrix = load_matrix(path, options)?;
    if matrix.is_empty() {
        return Err(TspError::invalid_input("matrix has no nodes"));
    }
    let start = match start {
        Some(name) => matrix.index_of(name)?,
        None => 0,
    };

    let (solution, status, stats): (Solution, _, _) = match solver {
        SolverKind::Brute => (
            BruteForceRunner::run_with_config(&matrix, start, brute)?.into(),
            None,
            None,
        ),
        SolverKind::Bnb => {
            let result = BnbRunner::run(&matrix, start, bnb)?;
            let status = result.status;
            let stats = result.stats.clone();
            (result.into(), Some(status), Some(stats))
        }
        SolverKind::Aco => {
            let config = aco.ok_or_else(|| TspError::invalid_config("missing colony parameters"))?;
            (AcoRunner::run(&matrix, start, config)?.into(), None, None)
        }
    };

    if json {
        let report = Report {
            solver,
            start: matrix.name(start).to_string(),
            found: solution.is_found(),
            route: solution.route(&matrix),
            total_distance: solution.is_found().then(|| round2(solution.cost)),
            status,
            stats,
        };
        let out = serde_json::to_string_pretty(&report)?;
        println!("{out}");
        return Ok(());
    }

    if let Some(SearchStatus::Feasible) = status {
        println!("(search stopped early; the route may not be optimal)");
    }
    let route = solution.route(&matrix);
    let (_, cost) = solution.into_found(&matrix, start)?;
    println!("Best Route ({}):", solver.label());
    println!("{}", route.unwrap_or_default().join(" -> "));
    println!("Total Distance: {} km", round2(cost));
    Ok(())
}

fn cmd_convert(input: &Path, output: &Path, options: MatrixOptions) -> Result<()> {
    let matrix = load_matrix(input, options)?;
    matrix.save_csv(output)?;
    println!(
        "Wrote {} nodes to {}",
        matrix.node_count(),
        output.display()
    );
    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("u-tsp").chain(args.iter().copied()))
    }

    fn solve_aco(cli: Cli) -> AcoArgs {
        match cli.command {
            Commands::Solve { aco, .. } => aco,
            Commands::Convert { .. } => panic!("expected solve"),
        }
    }

    #[test]
    fn test_aco_requires_colony_parameters() {
        let err = parse(&["solve", "kenya.csv", "--solver", "aco"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let partial = parse(&["solve", "kenya.csv", "--solver", "aco", "--ants", "10", "--iterations", "100"]);
        assert!(partial.is_err());
    }

    #[test]
    fn test_aco_parameters_reach_config() {
        let cli = parse(&[
            "solve", "kenya.csv", "--solver", "aco", "--ants", "12", "--iterations", "50",
            "--evaporation", "0.2", "--alpha", "1.5", "--beta", "3", "--seed", "7",
        ])
        .unwrap();
        let config = solve_aco(cli).config(false).unwrap();
        assert_eq!(config.ant_count, 12);
        assert_eq!(config.iteration_count, 50);
        assert_eq!(config.evaporation_rate, 0.2);
        assert_eq!(config.alpha, 1.5);
        assert_eq!(config.beta, 3.0);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_exact_solvers_need_no_colony_parameters() {
        let cli = parse(&["solve", "kenya.csv", "--solver", "bnb"]).unwrap();
        assert!(solve_aco(cli).config(false).is_err());
        assert!(parse(&["solve", "kenya.csv"]).is_ok());
    }
}
