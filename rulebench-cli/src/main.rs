use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rulebench::{
    runner, BenchConfig, BenchReport, BenchState, ConfigOverrides, Fixture, Strategy,
};
use std::{num::NonZeroUsize, path::PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of non-matching patterns in the fixture
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Worker threads in each executor pool
    #[arg(short = 'j', long)]
    pool_size: Option<NonZeroUsize>,

    /// String every pattern is matched against
    #[arg(short, long)]
    target: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Time one or more strategies against a fresh fixture
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Strategy to measure (can be specified multiple times, default: all)
        #[arg(short, long = "strategy")]
        strategies: Vec<Strategy>,

        /// Unmeasured invocations per strategy
        #[arg(short, long)]
        warmup: Option<usize>,

        /// Measured invocations per strategy
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check every strategy finds the match, and reports none when it is absent
    Verify {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// List available strategies
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            common,
            strategies,
            warmup,
            iterations,
            json,
        } => {
            let config = load_config(
                &common,
                ConfigOverrides {
                    warmup_iterations: warmup,
                    measurement_iterations: iterations,
                    ..Default::default()
                },
            )?;
            init_tracing(&config);

            let strategies = if strategies.is_empty() {
                Strategy::ALL.to_vec()
            } else {
                strategies
            };

            let state = BenchState::setup(&config).context("failed to set up fixture")?;
            let report = runner::run_benchmark(&strategies, &state, &config)?;

            if json {
                println!("{}", report.to_json(&config)?);
            } else {
                print_report(&report, &config);
            }

            if !report.all_matched() {
                bail!("at least one strategy failed to find the match");
            }
            Ok(())
        }
        Commands::Verify { common } => {
            let config = load_config(&common, ConfigOverrides::default())?;
            init_tracing(&config);
            verify(&config)
        }
        Commands::List => {
            for strategy in Strategy::ALL {
                let exit = if strategy.exits_early() {
                    "early exit"
                } else {
                    "full pass"
                };
                println!("{:<22} {}", strategy.name(), exit);
            }
            Ok(())
        }
    }
}

fn load_config(common: &CommonArgs, overrides: ConfigOverrides) -> Result<BenchConfig> {
    let config = BenchConfig::load_from(common.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(ConfigOverrides {
            pattern_count: common.count,
            pool_size: common.pool_size,
            target: common.target.clone(),
            log_level: common.log_level.clone(),
            ..overrides
        });
    config.validate()?;
    Ok(config)
}

fn init_tracing(config: &BenchConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    debug!("Loaded configuration: {:?}", config);
}

fn verify(config: &BenchConfig) -> Result<()> {
    let with_match = Fixture::build(config)?;
    let without_match = Fixture::build_without_match(config)?;
    let mut failures = 0;

    for strategy in Strategy::ALL {
        for (fixture, expected, label) in [
            (&with_match, true, "match present"),
            (&without_match, false, "match absent"),
        ] {
            let outcome = strategy.run(fixture, config);
            let passed = matches!(outcome, Ok(found) if found == expected);
            let status = if passed { "PASS".green() } else { "FAIL".red() };

            match outcome {
                Ok(found) => println!(
                    "{} {:<22} {:<14} found: {}",
                    status,
                    strategy.name(),
                    label,
                    found
                ),
                Err(e) => println!("{} {:<22} {:<14} error: {}", status, strategy.name(), label, e),
            }

            if !passed {
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} verification checks failed", failures);
    }
    Ok(())
}

fn print_report(report: &BenchReport, config: &BenchConfig) {
    println!(
        "{} {} patterns, target {:?}, pool size {}, {} CPUs",
        "#".blue(),
        config.pattern_count + 1,
        config.target,
        config.pool_size,
        num_cpus::get()
    );
    println!(
        "{} warmup {} iterations, measurement {} iterations, average time (ms/op)",
        "#".blue(),
        config.warmup_iterations,
        config.measurement_iterations
    );

    let fastest = report.fastest().map(|m| m.strategy);
    for measurement in &report.measurements {
        let line = measurement.to_string();
        if !measurement.matched {
            println!("{} {}", line.red(), "(no match)".red());
        } else if Some(measurement.strategy) == fastest {
            println!("{}", line.green());
        } else {
            println!("{}", line);
        }
    }
}
