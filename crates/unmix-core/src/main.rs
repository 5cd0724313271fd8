//! unmix - EM deconvolution from the command line
//!
//! The main entry point for the `unmix` binary, handling:
//! - Multinomial de-coarsening of `pattern,count` files
//! - Gaussian and exponential mixture fits of value files
//! - Inspection of the resolved solver settings

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use unmix_common::{EmConfig, Error, OutputFormat, ProblemKind, StructuredError};
use unmix_core::config::{load_config, ConfigOptions};
use unmix_core::em::{
    solve_exponential_mixture, solve_gaussian_mixture, solve_multinomial, ConvergenceStatus,
};
use unmix_core::exit_codes::ExitCode;
use unmix_core::input::{parse_compat_counts, parse_values};
use unmix_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use unmix_core::output::write_result;

/// Seed used when `--seed` is not given, so repeated runs agree.
const DEFAULT_SEED: u64 = 42;

/// unmix - maximum-likelihood deconvolution by Expectation-Maximization
#[derive(Parser)]
#[command(name = "unmix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Settings file (overrides UNMIX_CONFIG and the XDG location)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    format: OutputFormat,

    /// Per-iteration trace (-v); more detail with -vv, -vvv
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recover category abundances from compatibility counts
    Multinomial(MultinomialArgs),

    /// Fit a univariate Gaussian mixture
    Gaussian(MixtureArgs),

    /// Fit a univariate exponential mixture
    Exponential(MixtureArgs),

    /// Settings management
    Config(ConfigArgs),
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Solver overrides shared by every solve command
#[derive(Args, Debug)]
struct SolveOpts {
    /// Maximum number of EM passes
    #[arg(long, value_name = "N")]
    max_iterations: Option<usize>,

    /// Relative tolerance on the RMS parameter change
    #[arg(long, value_name = "TOL")]
    rtole: Option<f64>,

    /// Write results to this file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MultinomialArgs {
    /// CSV file of `pattern,count` rows
    #[arg(long, short = 'i', value_name = "FILE")]
    input: PathBuf,

    #[command(flatten)]
    solve: SolveOpts,
}

#[derive(Args, Debug)]
struct MixtureArgs {
    /// File with one observation per line
    #[arg(long, short = 'i', value_name = "FILE")]
    input: PathBuf,

    /// Number of mixture components
    #[arg(long, short = 'k', value_name = "K")]
    components: usize,

    /// Seed for the random starting point
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    #[command(flatten)]
    solve: SolveOpts,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the resolved per-problem settings as JSON
    Show,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if err.use_stderr() {
                let _ = err.print();
                std::process::exit(ExitCode::ArgsError.as_i32());
            }
            err.exit()
        }
    };

    init_logging(&log_config(&cli.global));

    let exit_code = match &cli.command {
        Commands::Multinomial(args) => run_multinomial(&cli.global, args),
        Commands::Gaussian(args) => run_gaussian(&cli.global, args),
        Commands::Exponential(args) => run_exponential(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
    };

    std::process::exit(exit_code.as_i32());
}

fn log_config(global: &GlobalOpts) -> LogConfig {
    let from_flags = if global.quiet {
        Some(LogLevel::Error)
    } else if global.verbose > 0 {
        let steps = global.verbose;
        Some((0..steps).fold(LogLevel::Warn, |level, _| level.louder()))
    } else {
        None
    };
    LogConfig::from_env(global.log_level.or(from_flags), global.log_format)
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_multinomial(global: &GlobalOpts, args: &MultinomialArgs) -> ExitCode {
    let cfg = match solver_config(global, ProblemKind::Multinomial, &args.solve) {
        Ok(cfg) => cfg,
        Err(err) => return fail(global, &err),
    };

    let outcome = parse_compat_counts(&args.input)
        .and_then(|data| solve_multinomial(&data, Some(&cfg)))
        .and_then(|result| {
            write_result(&result, global.format, args.solve.output.as_deref())?;
            Ok(result.status)
        });
    finish(global, outcome)
}

fn run_gaussian(global: &GlobalOpts, args: &MixtureArgs) -> ExitCode {
    let (cfg, mut rng) = match mixture_setup(global, ProblemKind::Gaussian, args) {
        Ok(setup) => setup,
        Err(err) => return fail(global, &err),
    };

    let outcome = parse_values(&args.input).and_then(|values| {
        let result = solve_gaussian_mixture(&values, args.components, Some(&cfg), &mut rng)?;
        write_result(&result, global.format, args.solve.output.as_deref())?;
        Ok(result.status)
    });
    finish(global, outcome)
}

fn run_exponential(global: &GlobalOpts, args: &MixtureArgs) -> ExitCode {
    let (cfg, mut rng) = match mixture_setup(global, ProblemKind::Exponential, args) {
        Ok(setup) => setup,
        Err(err) => return fail(global, &err),
    };

    let outcome = parse_values(&args.input).and_then(|values| {
        let result = solve_exponential_mixture(&values, args.components, Some(&cfg), &mut rng)?;
        write_result(&result, global.format, args.solve.output.as_deref())?;
        Ok(result.status)
    });
    finish(global, outcome)
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> ExitCode {
    match args.command {
        ConfigCommands::Show => {
            let resolved = match load_config(&ConfigOptions::from_env(global.config.clone())) {
                Ok(resolved) => resolved,
                Err(err) => return fail(global, &Error::InvalidConfig(err.to_string())),
            };
            match serde_json::to_string_pretty(&resolved.snapshot()) {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::Converged
                }
                Err(err) => fail(global, &Error::Json(err)),
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Settings file first, then individual flags.
fn solver_config(
    global: &GlobalOpts,
    kind: ProblemKind,
    opts: &SolveOpts,
) -> Result<EmConfig, Error> {
    let resolved = load_config(&ConfigOptions::from_env(global.config.clone()))
        .map_err(|err| Error::InvalidConfig(err.to_string()))?;
    let mut cfg = resolved.for_problem(kind);
    if let Some(max_iterations) = opts.max_iterations {
        cfg.max_iterations = max_iterations;
    }
    if let Some(rtole) = opts.rtole {
        cfg.relative_tolerance = rtole;
    }
    if global.verbose > 0 {
        cfg.verbose = true;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn mixture_setup(
    global: &GlobalOpts,
    kind: ProblemKind,
    args: &MixtureArgs,
) -> Result<(EmConfig, StdRng), Error> {
    let cfg = solver_config(global, kind, &args.solve)?;
    tracing::debug!(
        seed = args.seed,
        components = args.components,
        "mixture run"
    );
    Ok((cfg, StdRng::seed_from_u64(args.seed)))
}

fn finish(global: &GlobalOpts, outcome: Result<ConvergenceStatus, Error>) -> ExitCode {
    match outcome {
        Ok(ConvergenceStatus::Converged) => ExitCode::Converged,
        Ok(ConvergenceStatus::MaxIterationsReached) => {
            tracing::warn!("iteration cap reached; estimates are provisional");
            ExitCode::MaxIterations
        }
        Err(err) => fail(global, &err),
    }
}

fn fail(global: &GlobalOpts, err: &Error) -> ExitCode {
    match global.format {
        OutputFormat::Json => eprintln!("{}", StructuredError::from(err).to_json()),
        OutputFormat::Text => eprintln!("{}", err.to_human()),
    }
    ExitCode::for_error(err)
}
