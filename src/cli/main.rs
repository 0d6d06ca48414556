use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use ai_image_prep::{config, info, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "ai-image-prep",
    version,
    about = "Check JPEG/PNG images against upload limits and strip EXIF without re-encoding"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Report what would change without writing to files
    #[arg(long)]
    dry_run: bool,

    /// Write cleaned images to this directory instead of in place
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Display format, dimensions and EXIF presence, then exit
    #[arg(long = "show-info")]
    show_info: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    let images = pipeline::collect_image_entries(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    // Handle --show-info
    if cli.show_info {
        for image in &images {
            print_info(&image.path, cli.json)?;
        }
        return Ok(());
    }

    // Load config
    let mut config = config::Config::load(cli.config.as_deref())?;

    // Override from CLI flags
    if cli.dry_run {
        config.output.dry_run = true;
    }
    if let Some(dir) = cli.output_dir {
        config.output.output_dir = Some(dir);
    }

    log::info!("Found {} image(s) to process", images.len());
    if config.output.dry_run {
        log::info!("DRY RUN: no files will be modified");
    }

    let mut results = Vec::new();
    let mut claims = pipeline::OutputClaims::new();
    let total = images.len();

    for (i, image) in images.iter().enumerate() {
        log::info!(
            "[{}/{}] Processing: {}",
            i + 1,
            total,
            image.path.display()
        );

        let result = pipeline::process_entry(image, &config, &mut claims);

        if let Some(ref err) = result.error {
            log::error!("  Rejected: {err}");
        } else {
            if let Some(ref meta) = result.metadata {
                log::info!("  {} {}x{}", meta.format, meta.width, meta.height);
            }
            if result.exif_segments_removed > 0 {
                log::info!(
                    "  Removed {} EXIF segment(s), {} → {} bytes",
                    result.exif_segments_removed,
                    result.original_size,
                    result.cleaned_size
                );
            }
            if let Some(ref out) = result.output_path {
                log::info!("  Written: {}", out.display());
            }
        }

        results.push(result);
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let stripped = results.iter().filter(|r| r.exif_segments_removed > 0).count();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!(
            "\nDone: {} accepted ({} stripped), {} rejected",
            total - failed,
            stripped,
            failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn print_info(path: &Path, json: bool) -> Result<()> {
    let bytes = std::fs::read(path)?;
    let meta = info::get_image_info(&bytes);

    if json {
        println!(
            "{}",
            serde_json::json!({ "path": path, "size": bytes.len(), "info": meta })
        );
    } else {
        println!("{}", path.display());
        println!("  Format:   {}", meta.format);
        if meta.has_dimensions() {
            println!("  Size:     {}x{} ({} bytes)", meta.width, meta.height, bytes.len());
        } else {
            println!("  Size:     unknown ({} bytes)", bytes.len());
        }
        println!("  EXIF:     {}", if meta.has_exif { "yes" } else { "no" });
    }

    Ok(())
}
