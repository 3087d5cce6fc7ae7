use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use primerscout::biochem::StandardPredicates;
use primerscout::config::{Config, ConfigFile};
use primerscout::pair_filter::Ranking;
use primerscout::sequence::SequenceProvider;
use primerscout::{report, seqio};

/// primerscout CLI
#[derive(Parser)]
#[command(name = "primerscout")]
#[command(version)]
#[command(about = "PCR primer discovery for single genomes", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Design ranked primer pairs for a genome
    Design {
        #[command(flatten)]
        run: RunArgs,
        /// Smallest amplicon in bp
        #[arg(long)]
        min_amplicon: Option<usize>,
        /// Largest amplicon in bp
        #[arg(long)]
        max_amplicon: Option<usize>,
        /// Number of pairs to report
        #[arg(long)]
        top: Option<usize>,
        /// Pair ranking (discovery, tm_balance, gc_deviation)
        #[arg(long)]
        ranking: Option<Ranking>,
        /// Comma-separated enzyme names to avoid (default: built-in panel)
        #[arg(long, value_delimiter = ',')]
        enzymes: Option<Vec<String>>,
        /// Also print the per-stage filter summary
        #[arg(long)]
        stages: bool,
    },

    /// List filtered candidate primers without pairing
    Candidates {
        #[command(flatten)]
        run: RunArgs,
    },

    /// List the built-in restriction enzyme panel
    ListEnzymes {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Genome FASTA/FASTQ (optionally gzipped); defaults to the first file listed in the config
    genome: Option<PathBuf>,
    /// JSON config, flat or {"settings": .., "files": ..}
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Primer length
    #[arg(long)]
    length: Option<usize>,
    /// Minimum GC fraction
    #[arg(long)]
    gc_min: Option<f64>,
    /// Maximum GC fraction
    #[arg(long)]
    gc_max: Option<f64>,
    /// GC masking window (default: primer length)
    #[arg(long)]
    gc_window: Option<usize>,
    /// Minimum melting temperature (°C)
    #[arg(long)]
    t_min: Option<f64>,
    /// Maximum melting temperature (°C)
    #[arg(long)]
    t_max: Option<f64>,
    /// Hamming radius for the similarity filter
    #[arg(long)]
    max_mismatches: Option<usize>,
    /// Treat the genome as circular
    #[arg(long)]
    circular: bool,
    /// Threads (default: all)
    #[arg(long)]
    threads: Option<usize>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Design { run, min_amplicon, max_amplicon, top, ranking, enzymes, stages } => {
            let (mut config, genome_path) = load_config(&run)?;
            if let Some(v) = min_amplicon {
                config.min_amplicon = v;
            }
            if let Some(v) = max_amplicon {
                config.max_amplicon = v;
            }
            if let Some(v) = top {
                config.top_n_pairs = v;
            }
            if let Some(v) = ranking {
                config.ranking = v;
            }
            if enzymes.is_some() {
                config.enzymes = enzymes;
            }
            cmd_design(&run, &config, &genome_path, stages)
        }
        Commands::Candidates { run } => {
            let (config, genome_path) = load_config(&run)?;
            cmd_candidates(&run, &config, &genome_path)
        }
        Commands::ListEnzymes { format } => cmd_list_enzymes(format),
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Config file (if any) with command-line overrides applied, plus the genome path.
fn load_config(run: &RunArgs) -> Result<(Config, PathBuf)> {
    let file = match &run.config {
        Some(p) => ConfigFile::from_path(p).with_context(|| format!("reading config {}", p.display()))?,
        None => ConfigFile::default(),
    };
    let mut config = file.settings;
    if let Some(v) = run.length {
        config.primer_length = v;
    }
    if let Some(v) = run.gc_min {
        config.gc_min = v;
    }
    if let Some(v) = run.gc_max {
        config.gc_max = v;
    }
    if let Some(v) = run.gc_window {
        config.gc_window = Some(v);
    }
    if let Some(v) = run.t_min {
        config.t_min = v;
    }
    if let Some(v) = run.t_max {
        config.t_max = v;
    }
    if let Some(v) = run.max_mismatches {
        config.max_mismatches = v;
    }
    if run.circular {
        config.is_circular = true;
    }
    if run.threads.is_some() {
        config.threads = run.threads;
    }
    config.validate()?;

    let genome = match (&run.genome, file.files.values().next()) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => p.clone(),
        (None, None) => bail!("no genome given on the command line or in the config \"files\""),
    };
    init_threads(config.threads);
    Ok((config, genome))
}

fn init_threads(threads: Option<usize>) {
    let n = threads.unwrap_or_else(num_cpus::get).max(1);
    match rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
        Ok(()) => log::debug!("rayon pool: {} threads", n),
        Err(e) => log::warn!("could not configure rayon pool ({}), using defaults", e),
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let out: Box<dyn Write> = match path {
        Some(p) => Box::new(BufWriter::new(File::create(p).with_context(|| format!("creating {}", p.display()))?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    Ok(out)
}

fn cmd_design(run: &RunArgs, config: &Config, genome_path: &Path, show_stages: bool) -> Result<()> {
    let genome = seqio::load_genome(genome_path, config.topology())
        .with_context(|| format!("loading genome {}", genome_path.display()))?;
    let predicates = StandardPredicates;
    let design = primerscout::design_primers(&genome, config, &predicates)?;
    let rows = report::pair_rows(&design.pairs, &predicates);

    let mut out = open_output(run.output.as_deref())?;
    match run.format {
        OutputFormat::Table => {
            report::configure_table_display();
            if show_stages {
                writeln!(out, "{}", report::stages_frame(&design.stages)?)?;
            }
            writeln!(
                out,
                "{} ({} bp, {}): {} pairs found, {} after GC filter, {} after restriction filter",
                genome.id(),
                design.genome_length,
                design.topology,
                design.pairs_found,
                design.pairs_after_gc,
                design.pairs_after_restriction
            )?;
            writeln!(out, "{}", report::pairs_frame(&rows)?)?;
        }
        OutputFormat::Csv => report::write_csv(&mut out, &rows)?,
        OutputFormat::Json => report::write_json(&mut out, &design)?,
    }
    out.flush()?;
    Ok(())
}

fn cmd_candidates(run: &RunArgs, config: &Config, genome_path: &Path) -> Result<()> {
    let genome = seqio::load_genome(genome_path, config.topology())
        .with_context(|| format!("loading genome {}", genome_path.display()))?;
    let predicates = StandardPredicates;
    let (candidates, stages) = primerscout::find_candidates(&genome, config, &predicates)?;
    let rows = report::candidate_rows(&candidates, genome.length(), &predicates);

    let mut out = open_output(run.output.as_deref())?;
    match run.format {
        OutputFormat::Table => {
            report::configure_table_display();
            writeln!(out, "{}", report::stages_frame(&stages)?)?;
            writeln!(out, "{}", report::candidates_frame(&rows)?)?;
        }
        OutputFormat::Csv => report::write_csv(&mut out, &rows)?,
        OutputFormat::Json => report::write_json(&mut out, &rows)?,
    }
    out.flush()?;
    Ok(())
}

fn cmd_list_enzymes(format: OutputFormat) -> Result<()> {
    use primerscout::data::enzymes::PANEL;

    let mut out = open_output(None)?;
    match format {
        OutputFormat::Table => {
            report::configure_table_display();
            writeln!(out, "{}", report::enzymes_frame(PANEL)?)?;
        }
        OutputFormat::Csv => report::write_csv(&mut out, PANEL)?,
        OutputFormat::Json => report::write_json(&mut out, PANEL)?,
    }
    out.flush()?;
    Ok(())
}
