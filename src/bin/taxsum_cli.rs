use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

use taxsum_rs::classifications_stats::write_report;
use taxsum_rs::{summarise_reads, SummaryOptions};

/// Summarise per-read taxonomic classifications to one rank and report
/// relative abundance.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// nodes.dmp filepath (may be gzipped)
    #[arg(long = "nodes", alias = "nodes_fp", value_parser = existing_file)]
    nodes: PathBuf,

    /// names.dmp filepath (may be gzipped)
    #[arg(long = "names", alias = "names_fp", value_parser = existing_file)]
    names: PathBuf,

    /// Per-read classification table (e.g. Centrifuge output)
    #[arg(long = "classifications", alias = "centrifuge_fp", value_parser = existing_file)]
    classifications: PathBuf,

    /// Rank every read is resolved to
    #[arg(long, default_value = "species")]
    rank: String,

    /// seqID value marking unclassified reads
    #[arg(long, default_value = "unclassified")]
    unclassified_label: String,

    /// Worker threads for read aggregation
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Reads per parallel batch
    #[arg(long, default_value_t = 100_000)]
    chunk_size: usize,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn existing_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("Input file {} does not exist", path.display()))
    }
}

fn spinner(color: &str, msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{}}} {{msg}}", color);
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template(&template)
    {
        spinner.set_style(style);
    }
    spinner.set_message(msg);
    spinner
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = SummaryOptions {
        target_rank: cli.rank,
        unclassified_label: cli.unclassified_label,
        threads: cli.threads.max(1),
        chunk_size: cli.chunk_size,
    };

    // 1. Load taxonomy and summarise reads
    let progress = spinner("green", "Summarising classified reads...");
    let results = match summarise_reads(&cli.nodes, &cli.names, &cli.classifications, &options) {
        Ok(results) => results,
        Err(e) => {
            progress.abandon_with_message("Summary failed.");
            return Err(e.into());
        }
    };
    progress.finish_with_message(format!(
        "{} of {} classified reads resolved to {}.",
        results.resolved, results.total_classified, results.target_rank
    ));

    // 2. Write the report
    match cli.output {
        Some(path) => {
            let file = File::create(&path)?;
            write_report(&results.records, BufWriter::new(file))?;
            log::info!("Wrote {} rows to {}", results.records.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            write_report(&results.records, stdout.lock())?;
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
