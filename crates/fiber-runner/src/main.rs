//! Fiber Optic Performance Engine CLI
//!
//! Usage:
//!   fo validate  --in links.csv
//!   fo run       --in links.csv --out results.csv [--rtb] [--summary report.json]
//!   fo sweep     --in links.csv --out results.csv --vary system_margin_db=3,6 \
//!                [--vary fiber_length_km=5,10,20]
//!   fo summarize --results results.csv --out report.json [--worst-n 10]
//!   fo generate  --n 1000 --out links.csv [--seed 42] [--scenario base]

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use fiber_runner::generator::{write_generated, GeneratorConfig};
use fiber_runner::report::{AnalysisReport, DEFAULT_WORST_N};
use fiber_runner::validate::validate_links;
use fiber_runner::{loader, writer, RunConfig};
use link_budget::sweep::combination_count;
use link_budget::variation::parse_variations;
use link_budget::{run_batch, run_sweep, LinkInput, LinkOutput, RunnerOptions};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "fo",
    about = "FTTH / fiber optic link power and rise time budget engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON run configuration (flags override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// CSV field delimiter
    #[arg(long, global = true)]
    delimiter: Option<char>,

    /// Read `,` as the decimal separator in input tables
    #[arg(long, global = true)]
    decimal_comma: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check an input table without computing anything
    Validate {
        /// Input links CSV
        #[arg(long = "in")]
        input: PathBuf,
    },
    /// Compute every link once
    Run {
        /// Input links CSV
        #[arg(long = "in")]
        input: PathBuf,

        /// Output results CSV
        #[arg(long = "out", default_value = "results.csv")]
        output: PathBuf,

        #[command(flatten)]
        rtb: RtbArgs,

        /// Also write a JSON analysis report
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Compute every link under every combination of variations
    Sweep {
        /// Input links CSV
        #[arg(long = "in")]
        input: PathBuf,

        /// Output results CSV
        #[arg(long = "out", default_value = "result_sweep.csv")]
        output: PathBuf,

        /// Variation spec, e.g. system_margin_db=3,6 (repeatable)
        #[arg(long = "vary", required = true)]
        vary: Vec<String>,

        #[command(flatten)]
        rtb: RtbArgs,

        /// Refuse sweeps that would produce more records than this
        #[arg(long)]
        max_combinations: Option<usize>,

        /// Also write a JSON analysis report
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Summarize an existing results CSV
    Summarize {
        /// Results CSV from `run` or `sweep`
        #[arg(long)]
        results: PathBuf,

        /// Output JSON report
        #[arg(long = "out", default_value = "analysis_report.json")]
        output: PathBuf,

        /// Number of lowest-margin links to list
        #[arg(long, default_value_t = DEFAULT_WORST_N)]
        worst_n: usize,
    },
    /// Write a seeded synthetic link table
    Generate {
        /// Number of links
        #[arg(long = "n", default_value_t = 1000)]
        n_links: usize,

        /// Output links CSV
        #[arg(long = "out", visible_alias = "output", default_value = "links_generated.csv")]
        output: PathBuf,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Scenario label for every link
        #[arg(long, default_value = "base")]
        scenario: String,
    },
}

/// Rise time budget flags
#[derive(Args, Debug)]
struct RtbArgs {
    /// Enable the rise time budget
    #[arg(long)]
    rtb: bool,

    /// Bitrate (Gbps)
    #[arg(long = "bitrate-gbps")]
    bitrate_gbps: Option<f64>,

    /// Transmitter rise time (ns)
    #[arg(long = "tx-rt-ns")]
    tx_rise_time_ns: Option<f64>,

    /// Receiver rise time (ns)
    #[arg(long = "rx-rt-ns")]
    rx_rise_time_ns: Option<f64>,

    /// Dispersion (ns/km)
    #[arg(long = "disp-ns-km")]
    dispersion_ns_per_km: Option<f64>,
}

impl RtbArgs {
    fn apply(&self, mut options: RunnerOptions) -> RunnerOptions {
        if self.rtb {
            options.rtb_enabled = true;
        }
        if let Some(v) = self.bitrate_gbps {
            options.bitrate_gbps = v;
        }
        if let Some(v) = self.tx_rise_time_ns {
            options.tx_rise_time_ns = v;
        }
        if let Some(v) = self.rx_rise_time_ns {
            options.rx_rise_time_ns = v;
        }
        if let Some(v) = self.dispersion_ns_per_km {
            options.dispersion_ns_per_km = v;
        }
        options
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "fo=debug,fiber_runner=debug,link_budget=debug,info"
    } else {
        "fo=info,fiber_runner=info,link_budget=info,warn"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("failed to load configuration {:?}", path))?,
        None => RunConfig::default(),
    };
    if let Some(delimiter) = cli.delimiter {
        config.csv.delimiter = delimiter;
    }
    if cli.decimal_comma {
        config.csv.decimal_comma = true;
    }

    match cli.command {
        Command::Validate { input } => {
            let links = load_validated(&input, &config)?;
            info!("OK - {} rows validated", links.len());
        }
        Command::Run {
            input,
            output,
            rtb,
            summary,
        } => {
            let options = rtb.apply(config.runner);
            let links = load_validated(&input, &config)?;

            let results = run_batch(&links, &options).context("link computation failed")?;
            emit(&output, summary.as_deref(), &results, &config)?;
            info!("DONE - {} links written to {:?}", results.len(), output);
        }
        Command::Sweep {
            input,
            output,
            vary,
            rtb,
            max_combinations,
            summary,
        } => {
            let options = rtb.apply(config.runner);
            let cap = max_combinations.unwrap_or(config.max_combinations);
            let axes = parse_variations(&vary).context("bad --vary specification")?;
            let links = load_validated(&input, &config)?;

            let planned = combination_count(&axes).and_then(|n| n.checked_mul(links.len()));
            match planned {
                Some(n) if n <= cap => info!("Sweep will produce up to {} records", n),
                Some(n) => bail!("sweep would produce {} records, above the cap of {}", n, cap),
                None => bail!("sweep size overflows; reduce the number of variation values"),
            }

            let outcome = run_sweep(&links, &axes, &options).context("sweep aborted")?;
            if outcome.skip_count() > 0 {
                warn!("{} link/combination pairs skipped", outcome.skip_count());
            }
            emit(&output, summary.as_deref(), &outcome.records, &config)?;
            info!(
                "DONE - {} swept links written to {:?}",
                outcome.records.len(),
                output
            );
        }
        Command::Summarize {
            results,
            output,
            worst_n,
        } => {
            let records = writer::read_results(&results, config.csv.delimiter_byte()?)
                .with_context(|| format!("failed to read results {:?}", results))?;
            AnalysisReport::build(&results.display().to_string(), &records, worst_n)
                .write(&output)?;
            info!("DONE - summary of {} records written to {:?}", records.len(), output);
        }
        Command::Generate {
            n_links,
            output,
            seed,
            scenario,
        } => {
            let generator = GeneratorConfig::new()
                .links(n_links)
                .seed(seed)
                .scenario(scenario);
            let written = write_generated(&output, &generator, config.csv.delimiter_byte()?)
                .with_context(|| format!("failed to write links {:?}", output))?;
            info!("DONE - {} links written to {:?}", written, output);
        }
    }

    Ok(())
}

/// Load an input table and refuse it if any row is unusable
fn load_validated(path: &Path, config: &RunConfig) -> Result<Vec<LinkInput>> {
    let loaded = loader::load_links(path, &config.csv)
        .with_context(|| format!("failed to read links {:?}", path))?;

    if !loaded.row_errors.is_empty() {
        for e in &loaded.row_errors {
            error!("{}", e);
        }
        bail!("{} unreadable rows in {:?}", loaded.row_errors.len(), path);
    }

    let problems = validate_links(&loaded.links, &config.validation);
    if !problems.is_empty() {
        for e in &problems {
            error!("{}", e);
        }
        bail!("{} validation errors in {:?}", problems.len(), path);
    }

    Ok(loaded.links)
}

/// Write the results table and, when asked, the analysis report
fn emit(
    output: &Path,
    summary: Option<&Path>,
    records: &[LinkOutput],
    config: &RunConfig,
) -> Result<()> {
    writer::write_results(output, records, config.csv.delimiter_byte()?)
        .with_context(|| format!("failed to write results {:?}", output))?;

    if let Some(path) = summary {
        AnalysisReport::build(&output.display().to_string(), records, DEFAULT_WORST_N)
            .write(path)?;
    }
    Ok(())
}
