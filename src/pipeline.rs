use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::format::ImageFormat;
use crate::info::ImageMetadata;
use crate::jpeg::{Passthrough, StripOutcome};
use crate::validate::{self, PreparedImage};

/// The result of running a single file through the gate.
///
/// Serialized as-is for `--json` output.
#[derive(Debug, Default, Serialize)]
pub struct ProcessResult {
    pub path: PathBuf,
    /// Metadata of the bytes that were (or would be) written.
    pub metadata: Option<ImageMetadata>,
    pub original_size: u64,
    pub cleaned_size: u64,
    pub exif_segments_removed: usize,
    /// Set when a JPEG was left untouched because its markers could not be walked.
    pub passthrough: Option<String>,
    /// Where the cleaned bytes were written. `None` for dry runs and unchanged files.
    pub output_path: Option<PathBuf>,
    pub backup_path: Option<PathBuf>,
    pub error: Option<String>,
}

/// An input image together with its path relative to the argument it was
/// found under.
///
/// `relative` is the file name for a file argument and the path below the
/// directory for a directory argument. It decides where the image lands
/// inside `output.output_dir`, so `a/photo.jpg` and `b/photo.jpg` under one
/// input directory keep separate outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub relative: PathBuf,
}

impl ImageEntry {
    /// Entry for a file given on its own: lands directly in the output directory.
    pub fn from_file(path: &Path) -> Self {
        let relative = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf());
        Self {
            path: path.to_path_buf(),
            relative,
        }
    }
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks). Only `.jpg`, `.jpeg` and `.png` files
/// are included.
///
/// # Example
///
/// ```rust,no_run
/// use ai_image_prep::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[
///     PathBuf::from("photo.jpg"),       // single file
///     PathBuf::from("./uploads/"),      // entire directory
/// ]);
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    collect_image_entries(paths)
        .into_iter()
        .map(|entry| entry.path)
        .collect()
}

/// Like [`collect_images`], but keeps each file's path relative to the
/// argument it came from.
pub fn collect_image_entries(paths: &[PathBuf]) -> Vec<ImageEntry> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if ImageFormat::from_path(path).is_some() {
                images.push(ImageEntry::from_file(path));
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && ImageFormat::from_path(p).is_some() {
                    let relative = match p.strip_prefix(path) {
                        Ok(rel) => rel.to_path_buf(),
                        Err(_) => ImageEntry::from_file(p).relative,
                    };
                    images.push(ImageEntry {
                        path: p.to_path_buf(),
                        relative,
                    });
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Output paths already handed out during one run, keyed by target with the
/// source that claimed it.
///
/// Share one set across every [`process_entry`] call of a run so two inputs
/// never write the same file.
#[derive(Debug, Default)]
pub struct OutputClaims {
    claimed: HashMap<PathBuf, PathBuf>,
}

impl OutputClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `target` as written by `source`. Fails when a different source
    /// already claimed it.
    pub fn claim(&mut self, target: &Path, source: &Path) -> Result<()> {
        match self.claimed.get(target) {
            Some(owner) if owner != source => anyhow::bail!(
                "Output {} already written for {}",
                target.display(),
                owner.display()
            ),
            Some(_) => Ok(()),
            None => {
                self.claimed
                    .insert(target.to_path_buf(), source.to_path_buf());
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// Create a backup of the original file.
fn backup_file(path: &Path) -> Result<PathBuf> {
    let backup_path = path.with_extension(format!(
        "{}.bak",
        path.extension().unwrap_or_default().to_string_lossy()
    ));

    if !backup_path.exists() {
        std::fs::copy(path, &backup_path).context("Failed to create backup")?;
        log::debug!("Backup created: {}", backup_path.display());
    }

    Ok(backup_path)
}

/// Where cleaned bytes for `entry` go: `output_dir/<relative path>` or the
/// input path itself.
fn destination(entry: &ImageEntry, config: &Config) -> PathBuf {
    match &config.output.output_dir {
        Some(dir) => dir.join(&entry.relative),
        None => entry.path.clone(),
    }
}

/// Check a single image against the configured limits and, unless
/// `processing.strip_exif` is off, write an EXIF-free copy.
///
/// In-place rewrites only happen when something was actually removed; with an
/// `output_dir` every accepted image is written so the directory is complete.
///
/// # Example
///
/// ```rust,no_run
/// use ai_image_prep::config::Config;
/// use ai_image_prep::pipeline::process_image;
/// use std::path::Path;
///
/// let config = Config::default();
/// let result = process_image(Path::new("photo.jpg"), &config);
/// match result.error {
///     Some(err) => eprintln!("rejected: {err}"),
///     None => println!("removed {} EXIF segment(s)", result.exif_segments_removed),
/// }
/// ```
pub fn process_image(path: &Path, config: &Config) -> ProcessResult {
    process_entry(&ImageEntry::from_file(path), config, &mut OutputClaims::new())
}

/// Process one collected image, refusing to write an output another input of
/// the same run already wrote.
pub fn process_entry(
    entry: &ImageEntry,
    config: &Config,
    claims: &mut OutputClaims,
) -> ProcessResult {
    let mut result = ProcessResult {
        path: entry.path.clone(),
        ..Default::default()
    };

    if let Err(e) = run(entry, config, claims, &mut result) {
        result.error = Some(format!("{e:#}"));
    }

    result
}

fn run(
    entry: &ImageEntry,
    config: &Config,
    claims: &mut OutputClaims,
    result: &mut ProcessResult,
) -> Result<()> {
    let path = entry.path.as_path();
    let bytes = std::fs::read(path).context("Failed to read file")?;
    result.original_size = bytes.len() as u64;

    if !config.processing.strip_exif {
        let metadata = validate::check_image(&bytes, &config.limits)?;
        result.metadata = Some(metadata);
        result.cleaned_size = result.original_size;
        return Ok(());
    }

    let prepared = validate::prepare_image(&bytes, &config.limits)?;
    record(result, &prepared);

    let changed = prepared.data.len() != bytes.len();
    if !changed && config.output.output_dir.is_none() {
        return Ok(());
    }

    let target = destination(entry, config);
    if config.output.output_dir.is_some() {
        claims.claim(&target, path)?;
    }
    if config.output.dry_run {
        return Ok(());
    }

    if target == path && config.output.backup_originals {
        match backup_file(path) {
            Ok(backup) => result.backup_path = Some(backup),
            Err(e) => log::warn!("Failed to backup {}: {e}", path.display()),
        }
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    std::fs::write(&target, &prepared.data).context("Failed to write cleaned image")?;
    result.output_path = Some(target);

    Ok(())
}

fn record(result: &mut ProcessResult, prepared: &PreparedImage) {
    result.metadata = Some(prepared.metadata);
    result.cleaned_size = prepared.data.len() as u64;
    match prepared.strip {
        StripOutcome::Stripped { segments, .. } => result.exif_segments_removed = segments,
        StripOutcome::Clean | StripOutcome::Passthrough(Passthrough::NotJpeg(_)) => {}
        StripOutcome::Passthrough(reason @ Passthrough::Anomaly(_)) => {
            log::warn!("  Left unmodified: {reason}");
            result.passthrough = Some(reason.to_string());
        }
    }
}
