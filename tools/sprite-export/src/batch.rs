//! Batch conversion of a PNG folder into RGB565 headers
//!
//! Setup problems (missing input folder, output folder cannot be created)
//! abort the run. Everything that goes wrong with a single file is logged,
//! counted and skipped.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::color::Rgba;
use crate::config::ExportConfig;
use crate::header::{build_header, HeaderArtifact, HeaderError, HeaderOptions, HeaderSource};
use crate::naming::{self, has_png_extension, AnimationMap, NamingError, NamingMode, ResolvedName};

/// Per-file failure. Never aborts the batch.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("File name is not valid UTF-8")]
    NonUtf8Name,

    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ItemError {
    /// True for inputs that were never converted (bad name, unreadable image),
    /// false for failures during conversion or writing.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            ItemError::NonUtf8Name | ItemError::Naming(_) | ItemError::Decode(_)
        )
    }
}

/// Decoded RGBA8 image
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
}

/// Result of converting one file
#[derive(Debug)]
pub struct ItemReport {
    pub input: PathBuf,
    pub outcome: Result<PathBuf, ItemError>,
}

/// Totals for a finished batch
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub items: Vec<ItemReport>,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_ok()).count()
    }

    pub fn errors(&self) -> usize {
        self.items.len() - self.processed()
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Path> {
        self.items
            .iter()
            .filter_map(|i| i.outcome.as_ref().ok().map(PathBuf::as_path))
    }
}

/// Run one batch over `config.input_dir`
pub fn run_batch(config: &ExportConfig, mode: NamingMode, parallel: bool) -> Result<BatchSummary> {
    let files = find_png_files(&config.input_dir)?;
    prepare_output_dir(&config.output_dir)?;

    tracing::info!("Input folder: {}", config.input_dir.display());
    tracing::info!("Output folder: {}", config.output_dir.display());

    if files.is_empty() {
        tracing::warn!(
            "No PNG files found in '{}' matching '*.png'",
            config.input_dir.display()
        );
    } else {
        tracing::info!("Found {} PNG files. Starting conversion...", files.len());
    }

    let convert = |path: &PathBuf| ItemReport {
        input: path.clone(),
        outcome: convert_file(path, mode, config),
    };

    let items: Vec<ItemReport> = if parallel {
        use rayon::prelude::*;
        files.par_iter().map(convert).collect()
    } else {
        files.iter().map(convert).collect()
    };

    let summary = BatchSummary { items };
    warn_on_collisions(&summary);

    tracing::info!(
        "Conversion finished. Processed {} files. Encountered {} errors or skipped files.",
        summary.processed(),
        summary.errors()
    );

    Ok(summary)
}

/// List `*.png` files (any extension case) directly inside `dir`, sorted by name
pub fn find_png_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", dir.display());
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory: {}", dir.display()))?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in '{}': {}", dir.display(), e);
                None
            }
        })
        .filter(|p| p.is_file() && has_png_extension(p))
        .collect();

    files.sort();
    Ok(files)
}

/// Create the output directory if needed
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        tracing::debug!("Output directory found: {}", dir.display());
        return Ok(());
    }

    tracing::info!(
        "Output directory not found, attempting to create: {}",
        dir.display()
    );
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create output directory: {}", dir.display()))
}

/// Convert one file in a batch, logging the outcome
pub fn convert_file(
    path: &Path,
    mode: NamingMode,
    config: &ExportConfig,
) -> Result<PathBuf, ItemError> {
    let result = try_convert_file(
        path,
        mode,
        &config.animations,
        &config.header,
        &config.output_dir,
    );

    let label = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    match &result {
        Ok(output) => {
            tracing::info!("Generated '{}' from '{}'", output.display(), label);
        }
        Err(e) if e.is_skip() => {
            tracing::warn!("Skipping '{}': {}", label, e);
        }
        Err(e) => {
            tracing::error!("ERROR processing '{}': {}", label, e);
        }
    }

    result
}

fn try_convert_file(
    path: &Path,
    mode: NamingMode,
    animations: &AnimationMap,
    options: &HeaderOptions,
    output_dir: &Path,
) -> Result<PathBuf, ItemError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(ItemError::NonUtf8Name)?;

    let resolved = naming::resolve(mode, file_name, animations)?;
    tracing::debug!(
        "Processing '{}' -> logical name '{}'",
        file_name,
        resolved.logical_name
    );

    let image = load_image(path)?;
    tracing::debug!("  Image size: {}x{}", image.width, image.height);

    let artifact = build_artifact(&image, file_name, &resolved, options)?;
    write_header(&artifact, &output_dir.join(artifact.file_name()))
}

/// Convert a single image outside of a batch.
///
/// Uses generic naming unless `name` is given. `output` defaults to
/// `<LogicalName>.h` next to the input. Any failure is returned as an error.
pub fn convert_single(
    input: &Path,
    output: Option<&Path>,
    name: Option<&str>,
    options: &HeaderOptions,
) -> Result<PathBuf> {
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(ItemError::NonUtf8Name)
        .with_context(|| format!("Invalid input path: {}", input.display()))?;

    let resolved = match name {
        Some(name) => naming::resolve_explicit(name),
        None => naming::resolve_generic(file_name),
    };

    let image = load_image(input)
        .with_context(|| format!("Failed to load image: {}", input.display()))?;
    let artifact = build_artifact(&image, file_name, &resolved, options)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_file_name(artifact.file_name()),
    };

    Ok(write_header(&artifact, &output)?)
}

/// Decode any image the `image` crate understands into RGBA8
pub fn load_image(path: &Path) -> Result<DecodedImage, ItemError> {
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba.pixels().map(|p| Rgba::from(p.0)).collect();

    Ok(DecodedImage {
        width,
        height,
        pixels,
    })
}

/// Build the header for a decoded image
pub fn build_artifact(
    image: &DecodedImage,
    source_label: &str,
    resolved: &ResolvedName,
    options: &HeaderOptions,
) -> Result<HeaderArtifact, HeaderError> {
    let source = HeaderSource {
        logical_name: &resolved.logical_name,
        source_label,
        annotation: resolved.annotation.as_deref(),
        width: image.width,
        height: image.height,
        pixels: &image.pixels,
    };
    build_header(&source, options)
}

/// Write a header atomically: the target is either fully replaced or untouched
pub fn write_header(artifact: &HeaderArtifact, output: &Path) -> Result<PathBuf, ItemError> {
    write_atomic(output, artifact.text.as_bytes()).map_err(|source| ItemError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(output.to_path_buf())
}

fn write_atomic(output: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = tempfile::Builder::new();
    // New headers get the usual 0o666 minus umask instead of tempfile's 0o600
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    let mut tmp = builder.tempfile_in(dir)?;
    if let Ok(existing) = std::fs::metadata(output) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(output).map_err(|e| e.error)?;
    Ok(())
}

/// Pairs of inputs whose headers landed on the same path: (output, first, second)
fn shared_outputs(summary: &BatchSummary) -> Vec<(&Path, &Path, &Path)> {
    let mut seen: HashMap<&Path, &Path> = HashMap::new();
    let mut shared = Vec::new();
    for item in &summary.items {
        if let Ok(output) = &item.outcome {
            if let Some(previous) = seen.insert(output.as_path(), item.input.as_path()) {
                shared.push((output.as_path(), previous, item.input.as_path()));
            }
        }
    }
    shared
}

/// Only one header survives when two inputs share an output name
fn warn_on_collisions(summary: &BatchSummary) {
    for (output, first, second) in shared_outputs(summary) {
        tracing::warn!(
            "'{}' and '{}' both resolve to '{}'; only one of them is kept",
            first.display(),
            second.display(),
            output.display()
        );
    }
}
