use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use icon_bg_removal::{collect_jobs, BackgroundRemover, Job, Mode, ProcessResult, RemovalOptions};

#[derive(Parser)]
#[command(
    name = "icon-bg",
    about = "Remove near-white icon backgrounds while keeping white details inside the subject",
    version,
    after_help = "Simple usage: icon-bg <icon.png>  (cleans the file in place)\n\n\
                  WARNING: without --output, PNG files are OVERWRITTEN and cannot be restored."
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Input image file or directory
    input: PathBuf,

    /// Output file or directory (default: overwrite the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Edge strength (0-255) a pixel must exceed to count as an edge
    #[arg(long, default_value_t = 20)]
    edge_threshold: u8,

    /// Number of dilation passes used to close gaps in the subject outline
    #[arg(long, default_value_t = 3)]
    dilate_iterations: u32,

    /// Per-channel value at or above which a pixel counts as background white
    #[arg(short, long, default_value_t = 240)]
    white_threshold: u8,

    /// Clear every near-white pixel, skipping subject detection
    #[arg(long)]
    naive: bool,

    /// Run the pipeline and report, but write nothing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let opts = RemovalOptions {
        edge_threshold: cli.edge_threshold,
        dilate_iterations: cli.dilate_iterations,
        white_threshold: cli.white_threshold,
        mode: if cli.naive { Mode::Naive } else { Mode::Smart },
        dry_run: cli.dry_run,
    };

    let remover = match BackgroundRemover::new(opts) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Fatal: {e}");
            process::exit(1);
        }
    };

    if !cli.input.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input.display());
        process::exit(1);
    }

    let jobs = if cli.input.is_dir() {
        match collect_jobs(&cli.input, cli.output.as_deref()) {
            Ok(jobs) => jobs,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    } else {
        match &cli.output {
            Some(o) => vec![Job::to(cli.input.clone(), o.clone())],
            None => vec![Job::in_place(cli.input.clone())],
        }
    };

    if jobs.is_empty() {
        if !cli.quiet {
            eprintln!("No supported images found in {}", cli.input.display());
        }
        return;
    }

    if !cli.quiet {
        let mode = if cli.naive { "naive" } else { "smart" };
        eprintln!(
            "Found {} image(s). Mode: {mode}, white >= {}{}",
            jobs.len(),
            cli.white_threshold,
            if cli.dry_run { " (dry run)" } else { "" }
        );
        if cli.output.is_none() && !cli.dry_run {
            eprintln!("WARNING: Overwriting originals in place!");
        }
        eprintln!();
    }

    let results = remover.process_batch(&jobs);

    let mut success_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, cli.verbose, cli.quiet);
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !cli.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}

fn print_result(result: &ProcessResult, verbose: bool, quiet: bool) {
    let filename = display_name(&result.path);

    if !result.success {
        eprintln!("[FAIL] {filename}: {}", result.message);
        return;
    }
    if quiet {
        return;
    }

    eprintln!("[OK] {filename}: {}", result.message);

    if verbose {
        if let Some(stats) = &result.stats {
            eprintln!(
                "  -> {}x{}, {} edge px, {} region(s), subject {} px, written to {}",
                stats.width,
                stats.height,
                stats.edge_pixels,
                stats.components,
                stats.subject_pixels,
                result.output.display()
            );
        }
    }
}
