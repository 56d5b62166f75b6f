//! chromwin: chromosome window streaming toolkit
//!
//! Usage: chromwin <COMMAND> [OPTIONS]

use clap::{ArgAction, Parser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use chromwin::commands::{ChromosomeSummaryCommand, InputFormat, ValidateCommand};
use chromwin::genome::Genome;
use chromwin::WindowError;

#[derive(Parser)]
#[command(name = "chromwin")]
#[command(version)]
#[command(about = "Stream sorted genome-position files one chromosome at a time", long_about = None)]
struct Cli {
    /// Input positions are 0-based (converted to 1-based on read)
    #[arg(long, global = true)]
    zero_based: bool,

    /// Log window progress to stderr (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize each chromosome: bounds, site count, coverage and depth
    Summary {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Genome file (.genome, .fai or .dict) for chromosome lengths
        #[arg(short = 'g', long)]
        genome: Option<PathBuf>,

        /// Input format (default: from file extension)
        #[arg(short = 'f', long, value_parser = ["sync", "locus"])]
        format: Option<String>,

        /// Minimum total depth for a site to be counted (sync input)
        #[arg(long, default_value = "0")]
        min_depth: u64,

        /// Print a header line
        #[arg(long)]
        header: bool,

        /// Print streaming statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Check that an input is sorted and consistent with a genome file
    Validate {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Genome file (.genome, .fai or .dict) for chromosome lengths
        #[arg(short = 'g', long)]
        genome: Option<PathBuf>,

        /// Input format (default: from file extension)
        #[arg(short = 'f', long, value_parser = ["sync", "locus"])]
        format: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // This must be set before any parsing occurs
    if cli.zero_based {
        chromwin::config::set_zero_based(true);
    }

    let result = match cli.command {
        Commands::Summary {
            input,
            genome,
            format,
            min_depth,
            header,
            stats,
        } => run_summary(input, genome, format, min_depth, header, stats),

        Commands::Validate {
            input,
            genome,
            format,
        } => run_validate(input, genome, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Writes `log` records to stderr, one line each.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // Only fails if a logger is already installed
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn resolve_format(input: &Path, format: Option<String>) -> Result<InputFormat, WindowError> {
    match format {
        Some(name) => InputFormat::from_str(&name)
            .ok_or_else(|| WindowError::InvalidFormat(format!("Unknown input format '{}'", name))),
        None => Ok(InputFormat::from_path(input)),
    }
}

fn load_genome(genome_path: Option<PathBuf>) -> Result<Option<Genome>, WindowError> {
    genome_path
        .map(|gp| {
            Genome::from_file(&gp).map_err(|e| {
                WindowError::InvalidFormat(format!("Failed to load genome file: {}", e))
            })
        })
        .transpose()
}

fn run_summary(
    input: PathBuf,
    genome_path: Option<PathBuf>,
    format: Option<String>,
    min_depth: u64,
    header: bool,
    stats: bool,
) -> Result<(), WindowError> {
    let format = resolve_format(&input, format)?;
    let genome = load_genome(genome_path)?;

    let cmd = ChromosomeSummaryCommand::new()
        .with_min_depth(min_depth)
        .with_header(header);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let result = cmd.run(&input, format, genome.as_ref(), &mut handle)?;
    if stats {
        eprintln!("Summary stats: {}", result);
        if let Some(genome) = &genome {
            eprintln!(
                "Genome: {} chromosomes, {} bp",
                genome.len(),
                genome.total_length()
            );
        }
    }
    Ok(())
}

fn run_validate(
    input: PathBuf,
    genome_path: Option<PathBuf>,
    format: Option<String>,
) -> Result<(), WindowError> {
    let format = resolve_format(&input, format)?;
    let genome = load_genome(genome_path)?;

    let result = ValidateCommand::new().run(&input, format, genome.as_ref())?;
    println!(
        "OK: {} chromosomes, {} positions",
        result.chromosomes, result.records_yielded
    );
    Ok(())
}
