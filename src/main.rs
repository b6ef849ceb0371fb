//! *This binary is available only if built with the `"cli"` feature.*
use clap::{Parser, Subcommand};
use color_eyre::config::HookBuilder;
use color_eyre::eyre::{Report, WrapErr};
use env_logger::Env;
use hgql_bench::bench::{QueryPair, Runner};
use hgql_bench::fixture::{self, ChainTarget};
use hgql_bench::query::{self, Dialect, Shape};
use hgql_bench::report::{self, ChartLabels, Series};
use hgql_bench::BenchConfig;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

/// Generate fixtures and queries for a GraphQL-over-RDF service, time it against a SPARQL endpoint
/// and chart the results
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// write a random Turtle fixture
    #[command(subcommand)]
    Fixture(FixtureCommand),
    /// write queries of depth 1 to N, one file each
    Queries {
        /// hgql1, hgql2, sparql or json
        #[arg(short, long)]
        dialect: Dialect,
        /// nested or flat
        #[arg(short, long, default_value = "nested")]
        shape: Shape,
        /// maximum depth, 0 writes the query without any level
        #[arg(short = 'n', long)]
        depth: usize,
        /// target directory, created if missing
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// time generated query pairs against both endpoints
    Run(RunArgs),
    /// draw a line chart from amount;time CSV files
    Diagrams {
        /// label=path.csv, once per line of the chart
        #[arg(short, long, required = true, value_parser = parse_series)]
        series: Vec<(String, PathBuf)>,
        /// SVG file to create
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        x_label: Option<String>,
        #[arg(long)]
        y_label: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum FixtureCommand {
    /// persons with a growing number of literal fields
    Wide {
        #[arg(short, long, default_value_t = 1000)]
        entities: usize,
        #[arg(short, long, default_value_t = 1000)]
        fields: usize,
        #[arg(short, long, default_value = fixture::WIDE_FILE)]
        output: PathBuf,
        /// seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// persons linked by ex:relatedWith
    Chain {
        #[arg(short, long, default_value_t = 50)]
        entities: usize,
        /// draw link targets from [0, n) instead of [1, n]
        #[arg(long)]
        zero_based: bool,
        #[arg(short, long, default_value = fixture::CHAIN_FILE)]
        output: PathBuf,
        /// seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// directory with the native queries
    #[arg(long)]
    native_dir: PathBuf,
    /// dialect of the native queries
    #[arg(long, default_value = "hgql2")]
    native_dialect: Dialect,
    /// directory with the SPARQL queries
    #[arg(long)]
    sparql_dir: PathBuf,
    /// number of query pairs, starting at depth 1
    #[arg(short = 'n', long)]
    depth: usize,
    /// JSON configuration, defaults are used for missing keys
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    native_url: Option<String>,
    #[arg(long)]
    sparql_url: Option<String>,
    #[arg(short, long)]
    iterations: Option<usize>,
    #[arg(long)]
    delay_ms: Option<u64>,
    /// semicolon separated result table
    #[arg(long, default_value = "summary.csv")]
    summary: PathBuf,
    /// directory for one box plot per query and a depth comparison chart
    #[arg(long)]
    plots: Option<PathBuf>,
    /// directory for results_sparql.csv and results_native.csv, amount;time tables usable by `diagrams`
    #[arg(long)]
    series_dir: Option<PathBuf>,
}

fn parse_series(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((label, path)) if !label.is_empty() && !path.is_empty() => Ok((label.to_owned(), path.into())),
        _ => Err(format!("expected label=path.csv, got '{s}'")),
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn run(args: RunArgs) -> Result<(), Report> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::from_path(path)
            .with_context(|| format!("Error loading benchmark configuration {}", path.display()))?,
        None => BenchConfig::default(),
    };
    if let Some(url) = args.native_url {
        config.native_url = url;
    }
    if let Some(url) = args.sparql_url {
        config.sparql_url = url;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.delay_ms = delay_ms;
    }
    config.validate().wrap_err("invalid command line options")?;

    let pairs = QueryPair::load_depths(&args.native_dir, args.native_dialect, &args.sparql_dir, args.depth)
        .wrap_err("Error loading query files")?;
    let runner = Runner::from_config(&config).wrap_err("Error setting up endpoints")?;
    let results = runner.run(&pairs).wrap_err("benchmark run aborted")?;

    report::write_summary_csv(&args.summary, &results)
        .with_context(|| format!("Error writing summary {}", args.summary.display()))?;
    if let Some(dir) = args.series_dir {
        write_series(&dir, &results)?;
    }
    if let Some(dir) = args.plots {
        plot_all(&dir, &results)?;
    }
    Ok(())
}

fn write_series(dir: &Path, results: &[hgql_bench::AggregateResult]) -> Result<(), Report> {
    fs_err::create_dir_all(dir)?;
    let [sparql, native] = report::depth_series(results);
    for (name, series) in [("results_sparql.csv", sparql), ("results_native.csv", native)] {
        let path = dir.join(name);
        report::write_series_csv(&path, &series.points)
            .with_context(|| format!("Error writing series {}", path.display()))?;
    }
    info!("wrote depth series to {}", dir.display());
    Ok(())
}

fn plot_all(dir: &Path, results: &[hgql_bench::AggregateResult]) -> Result<(), Report> {
    fs_err::create_dir_all(dir)?;
    for result in results {
        let path = dir.join(format!("{}.svg", result.query));
        report::plot_boxplot(&path, result).with_context(|| format!("Error drawing {}", path.display()))?;
    }
    let path = dir.join("depth_comparison.svg");
    report::plot_depth_comparison(&path, results).with_context(|| format!("Error drawing {}", path.display()))?;
    info!("wrote {} charts to {}", results.len() + 1, dir.display());
    Ok(())
}

fn main() -> Result<(), Report> {
    HookBuilder::default().display_env_section(false).install()?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match args.command {
        Command::Fixture(FixtureCommand::Wide { entities, fields, output, seed }) => {
            fixture::write_wide(&output, &mut rng(seed), entities, fields)
                .with_context(|| format!("Error writing fixture {}", output.display()))?;
        }
        Command::Fixture(FixtureCommand::Chain { entities, zero_based, output, seed }) => {
            let target = if zero_based { ChainTarget::ZeroBased } else { ChainTarget::OneBased };
            fixture::write_chain(&output, &mut rng(seed), entities, target)
                .with_context(|| format!("Error writing fixture {}", output.display()))?;
        }
        Command::Queries { dialect, shape, depth, out_dir } => {
            query::write_queries(&out_dir, dialect, shape, depth)
                .with_context(|| format!("Error writing queries to {}", out_dir.display()))?;
        }
        Command::Run(args) => run(args)?,
        Command::Diagrams { series, output, title, x_label, y_label } => {
            let defaults = ChartLabels::default();
            let labels = ChartLabels {
                title: title.unwrap_or(defaults.title),
                x_label: x_label.unwrap_or(defaults.x_label),
                y_label: y_label.unwrap_or(defaults.y_label),
            };
            let series = series
                .into_iter()
                .map(|(label, path)| {
                    let points = report::read_series_csv(&path)
                        .with_context(|| format!("Error reading series {}", path.display()))?;
                    Ok(Series::new(label, points))
                })
                .collect::<Result<Vec<_>, Report>>()?;
            report::plot_series(&output, &labels, &series)
                .with_context(|| format!("Error drawing {}", output.display()))?;
        }
    }
    Ok(())
}
