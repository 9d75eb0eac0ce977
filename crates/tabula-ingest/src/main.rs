//! Tabula CLI
//!
//! Query, export and inspect CSV/TSV/JSON/JSONL files from the terminal.

#![allow(clippy::pedantic)]

mod output;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tabula_core::{RowStore, TabulaConfig};
use tabula_ingest::{
    estimate_row_count, strategy::resolve_strategy, FileDataSource, FileFormat, Hooks,
    LoadOptions, LoadReport, LoadingStrategy,
};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(version)]
#[command(about = "Filter, sort and page through tabular files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true, default_value = "tabula.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of a file
    Query {
        /// Input file
        file: PathBuf,

        /// Filter expression, e.g. "age >= 30 AND name CONTAINS 'a'"
        #[arg(short, long)]
        filter: Option<String>,

        /// Sort expression, e.g. "age DESC, name"
        #[arg(short, long)]
        sort: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Rows per page (overrides the config)
        #[arg(long)]
        page_size: Option<usize>,

        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: String,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Export matching rows to CSV
    Export {
        /// Input file
        file: PathBuf,

        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,

        /// Filter expression
        #[arg(short, long)]
        filter: Option<String>,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Show format, size estimate, strategy and columns of a file
    Inspect {
        /// Input file
        file: PathBuf,

        #[command(flatten)]
        load: LoadArgs,
    },
}

#[derive(Args)]
struct LoadArgs {
    /// Input format (auto, csv, tsv, json, jsonl)
    #[arg(long, value_name = "FORMAT")]
    input_format: Option<FileFormat>,

    /// Field delimiter for CSV/TSV
    #[arg(long)]
    delimiter: Option<char>,

    /// Text encoding (utf-8, utf-8-sig, latin-1)
    #[arg(long)]
    encoding: Option<String>,

    /// Loading strategy (auto, eager, chunked, lazy, hybrid)
    #[arg(long, value_name = "STRATEGY")]
    strategy: Option<LoadingStrategy>,

    /// Load on a background thread
    #[arg(long)]
    threaded: bool,

    /// Keep CSV/TSV fields as text instead of inferring numbers and booleans
    #[arg(long)]
    raw_strings: bool,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

impl LoadArgs {
    fn apply(&self, options: &mut LoadOptions) {
        if let Some(format) = self.input_format {
            options.file_format = format;
        }
        if let Some(delimiter) = self.delimiter {
            options.delimiter = Some(delimiter);
        }
        if let Some(encoding) = &self.encoding {
            options.encoding.clone_from(encoding);
        }
        if let Some(strategy) = self.strategy {
            options.loading_strategy = strategy;
        }
        options.use_threading |= self.threaded;
        if self.raw_strings {
            options.infer_types = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = TabulaConfig::load_from_path(&cli.config)
        .with_context(|| format!("reading {}", cli.config.display()))?;
    config.validate()?;
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Query {
            file,
            filter,
            sort,
            page,
            page_size,
            format,
            load,
        } => {
            let mut store = load_file(&cli.config, &config, &file, &load)?;
            if let Some(size) = page_size {
                store.set_page_size(size)?;
            }
            apply_query(&mut store, filter.as_deref(), sort.as_deref())?;

            let rows = store.get_page(Some(page.saturating_sub(1)));
            output::print_rows(&rows, &store.columns(), &format)?;
            if !format.eq_ignore_ascii_case("json") {
                println!(
                    "page {} of {} ({} matching rows)",
                    page.max(1),
                    store.page_count().max(1),
                    store.total_count()
                );
            }
        }
        Commands::Export {
            file,
            output,
            filter,
            load,
        } => {
            // Export keeps insertion order; only the filter applies.
            let mut store = load_file(&cli.config, &config, &file, &load)?;
            apply_query(&mut store, filter.as_deref(), None)?;

            let selected = store.select_all(false);
            let written = store.export_to_csv(&output, false)?;
            info!(selected, written, "export finished");
            println!("Exported {} rows to {}", written, output.display());
        }
        Commands::Inspect { file, load } => {
            inspect(&cli.config, &file, &load)?;
        }
    }

    Ok(())
}

fn init_logging(config: &TabulaConfig, verbose: bool) {
    let default = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_env("TABULA_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.logging.format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_options(config_path: &Path, args: &LoadArgs) -> anyhow::Result<LoadOptions> {
    // Inference is on unless the config or `--raw-strings` turns it off.
    let base = LoadOptions {
        infer_types: true,
        ..LoadOptions::default()
    };
    let mut options = LoadOptions::load_over(config_path, base)?;
    args.apply(&mut options);
    Ok(options)
}

fn load_file(
    config_path: &Path,
    config: &TabulaConfig,
    file: &Path,
    args: &LoadArgs,
) -> anyhow::Result<RowStore> {
    let options = load_options(config_path, args)?;
    let (source, report) = run_load(file, options, args.quiet, RowStore::from_config(&config.store)?)?;
    if report.field_error_count > 0 {
        tracing::warn!(
            count = report.field_error_count,
            "some fields could not be converted and kept their original value"
        );
    }
    let store = source.into_store();
    Ok(store)
}

fn run_load(
    file: &Path,
    options: LoadOptions,
    quiet: bool,
    store: RowStore,
) -> anyhow::Result<(FileDataSource, LoadReport)> {
    let pb = output::load_progress_bar(quiet);
    let bar = pb.clone();
    let hooks = Hooks::new().on_progress(move |done, total| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    });

    let threaded = options.use_threading;
    let mut source = FileDataSource::new(file, options, hooks)?.with_store(store);
    source.load()?;
    if threaded {
        while !source.wait_for_load(Duration::from_millis(100)) {
            pb.tick();
        }
    }
    pb.finish_and_clear();

    if let Some(err) = source.last_error() {
        anyhow::bail!("loading {} failed: {err}", file.display());
    }
    let report = source
        .last_report()
        .with_context(|| format!("no load report for {}", file.display()))?;
    info!(
        rows = report.rows_loaded,
        strategy = %report.strategy,
        rows_per_sec = report.throughput(),
        "file loaded"
    );
    Ok((source, report))
}

fn apply_query(store: &mut RowStore, filter: Option<&str>, sort: Option<&str>) -> anyhow::Result<()> {
    if let Some(filter) = filter {
        store.set_filter(filter).context("invalid filter")?;
    }
    if let Some(sort) = sort {
        store.set_sort(sort).context("invalid sort")?;
    }
    Ok(())
}

fn inspect(config_path: &Path, file: &Path, args: &LoadArgs) -> anyhow::Result<()> {
    let options = load_options(config_path, args)?;
    let format = options.file_format.resolve(file, options.json_lines);
    let size = std::fs::metadata(file)
        .with_context(|| format!("reading {}", file.display()))?
        .len();
    let estimate = estimate_row_count(file, format, &options)?;
    let (resolved, executed) =
        resolve_strategy(options.loading_strategy, estimate, options.max_memory_rows);

    let (source, report) = run_load(file, options, args.quiet, RowStore::new())?;
    let store = source.store();

    println!("File:        {}", file.display());
    println!("Format:      {format}");
    println!("Size:        {size} bytes");
    println!("Estimated:   {estimate} rows");
    if resolved == executed {
        println!("Strategy:    {resolved}");
    } else {
        println!("Strategy:    {resolved} (runs as {executed})");
    }
    println!("Rows:        {} loaded, {} filtered", report.rows_loaded, report.rows_filtered);
    println!("Elapsed:     {:.2}s", report.elapsed.as_secs_f64());
    println!("Columns:");
    for column in store.columns() {
        println!("  - {column}");
    }
    if report.field_error_count > 0 {
        println!("Field errors: {}", report.field_error_count);
        for err in report.field_errors.iter().take(5) {
            println!("  - {err}");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
