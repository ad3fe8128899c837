//! Core background removal engine.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::components;
use crate::edges;
use crate::error::{Error, Result};
use crate::mask::Mask;
use crate::morphology;
use crate::transparency;

/// Upper bound on dilation iterations accepted by [`RemovalOptions::validate`].
pub const MAX_DILATE_ITERATIONS: u32 = 64;

/// How near-white pixels are chosen for clearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Protect the largest edge-bounded region and clear white only outside it.
    #[default]
    Smart,
    /// Clear every near-white pixel in the image.
    Naive,
}

/// Options controlling background removal.
#[derive(Debug, Clone)]
pub struct RemovalOptions {
    /// Edge strength (0-255) a pixel must exceed to count as an edge.
    pub edge_threshold: u8,
    /// Number of cross-shaped dilation passes applied to the edge mask.
    pub dilate_iterations: u32,
    /// Per-channel value at or above which a pixel counts as background white.
    pub white_threshold: u8,
    /// Selection mode.
    pub mode: Mode,
    /// Run the pipeline but never write output files.
    pub dry_run: bool,
}

impl Default for RemovalOptions {
    fn default() -> Self {
        Self {
            edge_threshold: 20,
            dilate_iterations: 3,
            white_threshold: 240,
            mode: Mode::Smart,
            dry_run: false,
        }
    }
}

impl RemovalOptions {
    /// Check that the options are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] if `dilate_iterations` exceeds
    /// [`MAX_DILATE_ITERATIONS`].
    pub fn validate(&self) -> Result<()> {
        if self.dilate_iterations > MAX_DILATE_ITERATIONS {
            return Err(Error::InvalidOption(format!(
                "dilate iterations must be at most {MAX_DILATE_ITERATIONS}, got {}",
                self.dilate_iterations
            )));
        }
        Ok(())
    }
}

/// The protected region found in an image.
#[derive(Debug, Clone)]
pub struct SubjectDetection {
    /// Cells of the largest consolidated region.
    pub mask: Mask,
    /// Number of pixels above the edge threshold.
    pub edge_pixels: usize,
    /// Number of connected regions after consolidation.
    pub components: u32,
}

/// Statistics gathered while cleaning one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemovalStats {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Number of pixels above the edge threshold.
    pub edge_pixels: usize,
    /// Number of connected regions after consolidation.
    pub components: u32,
    /// Number of pixels in the protected subject.
    pub subject_pixels: usize,
    /// Number of pixels whose alpha was cleared.
    pub cleared_pixels: usize,
}

/// One unit of batch work: read `input`, write the cleaned PNG to `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Source image.
    pub input: PathBuf,
    /// Destination PNG; may equal `input` for in-place cleaning.
    pub output: PathBuf,
}

impl Job {
    /// A job that overwrites its input (or its `.png` sibling for other formats).
    #[must_use]
    pub fn in_place(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let output = default_output_path(&input);
        Self { input, output }
    }

    /// A job writing `input` to `output`.
    ///
    /// If `output` is an existing directory, the cleaned image lands inside it
    /// as `<stem>.png`.
    #[must_use]
    pub fn to(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let mut output = output.into();
        if output.is_dir() {
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            output = output.join(format!("{stem}.png"));
        }
        Self { input, output }
    }
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Where the output was (or would have been) written.
    pub output: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Pipeline statistics, present on success.
    pub stats: Option<RemovalStats>,
    /// Human-readable status message.
    pub message: String,
}

/// The background remover holding validated options.
///
/// Create once with [`BackgroundRemover::new()`] and reuse for any number of
/// images; no state is carried from one image to the next.
#[derive(Debug, Clone)]
pub struct BackgroundRemover {
    options: RemovalOptions,
}

impl BackgroundRemover {
    /// Create a remover after validating `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] if the options are out of range.
    pub fn new(options: RemovalOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The options this remover was built with.
    #[must_use]
    pub fn options(&self) -> &RemovalOptions {
        &self.options
    }

    /// Find the subject: edges, dilation, hole filling, largest component.
    #[must_use]
    pub fn detect_subject(&self, image: &RgbaImage) -> SubjectDetection {
        let gray = edges::luminance(image);
        let edge_map = edges::find_edges(&gray);
        let edge_mask = edges::edge_mask(&edge_map, self.options.edge_threshold);
        let consolidated = morphology::consolidate(&edge_mask, self.options.dilate_iterations);
        let (mask, components) = components::select_largest(&consolidated);

        SubjectDetection {
            mask,
            edge_pixels: edge_mask.count(),
            components,
        }
    }

    /// Produce a copy of `image` with its background made transparent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyImage`] if the image has zero width or height.
    pub fn remove(&self, image: &RgbaImage) -> Result<(RgbaImage, RemovalStats)> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage { width, height });
        }

        let mut stats = RemovalStats {
            width,
            height,
            ..RemovalStats::default()
        };

        let output = match self.options.mode {
            Mode::Smart => {
                let subject = self.detect_subject(image);
                stats.edge_pixels = subject.edge_pixels;
                stats.components = subject.components;
                stats.subject_pixels = subject.mask.count();
                transparency::apply_selective(image, &subject.mask, self.options.white_threshold)
            }
            Mode::Naive => transparency::apply_naive(image, self.options.white_threshold),
        };

        stats.cleared_pixels = image
            .pixels()
            .zip(output.pixels())
            .filter(|(before, after)| before[3] != after[3])
            .count();

        log::debug!(
            "{width}x{height}: {} edge px, {} regions, subject {} px, cleared {} px",
            stats.edge_pixels,
            stats.components,
            stats.subject_pixels,
            stats.cleared_pixels
        );

        Ok((output, stats))
    }

    /// Load, clean and save one image, reporting failures as typed errors.
    ///
    /// Nothing is written when [`RemovalOptions::dry_run`] is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputNotFound`], [`Error::Decode`], [`Error::EmptyImage`],
    /// [`Error::Encode`] or [`Error::Write`] depending on the failing step.
    pub fn try_process_file(&self, input: &Path, output: &Path) -> Result<RemovalStats> {
        let image = load_rgba(input)?;
        let (cleaned, stats) = self.remove(&image)?;
        if !self.options.dry_run {
            save_png(&cleaned, output)?;
        }
        Ok(stats)
    }

    /// Process a single image file: load, detect, clear, save.
    ///
    /// Never fails; the outcome is reported through [`ProcessResult`].
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            output: output.to_path_buf(),
            success: false,
            stats: None,
            message: String::new(),
        };

        match self.try_process_file(input, output) {
            Ok(stats) => {
                log::info!(
                    "{} -> {} ({} px cleared)",
                    input.display(),
                    output.display(),
                    stats.cleared_pixels
                );
                result.success = true;
                result.message = if self.options.dry_run {
                    format!("Would clear {} pixels", stats.cleared_pixels)
                } else {
                    format!("Cleared {} pixels", stats.cleared_pixels)
                };
                result.stats = Some(stats);
            }
            Err(e) => {
                log::warn!("{}: {e}", input.display());
                result.message = e.to_string();
            }
        }

        result
    }

    /// Process every job, isolating failures per image.
    ///
    /// Uses parallel iteration when the `cli` feature is enabled (via rayon).
    /// Results are returned in the same order as `jobs`.
    #[must_use]
    pub fn process_batch(&self, jobs: &[Job]) -> Vec<ProcessResult> {
        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            jobs.par_iter()
                .map(|job| self.process_file(&job.input, &job.output))
                .collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            jobs.iter()
                .map(|job| self.process_file(&job.input, &job.output))
                .collect()
        }
    }
}

/// List the supported images directly inside `input_dir` as batch jobs.
///
/// With `output_dir`, each image `name.ext` maps to `output_dir/name.png`;
/// without it, each image is cleaned in place (see [`default_output_path`]).
/// Jobs are sorted by input path.
///
/// No two jobs share an output, and no job writes over another job's input.
/// PNG inputs keep their natural name; any other input whose `name.png` is
/// taken falls back to `name.ext.png` (e.g. `cup.bmp` next to `cup.png`
/// becomes `cup.bmp.png`).
///
/// # Errors
///
/// Returns [`Error::InputNotFound`] if the directory does not exist,
/// [`Error::Io`] if it cannot be read, or [`Error::OutputConflict`] if an
/// input has no free output name.
pub fn collect_jobs(input_dir: &Path, output_dir: Option<&Path>) -> Result<Vec<Job>> {
    if !input_dir.is_dir() {
        return Err(Error::InputNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    let mut inputs: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| is_supported_image(p))
        .collect();
    inputs.sort();

    let target = |input: &Path, name: String| match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    };
    let natural_output = |input: &Path| match output_dir {
        Some(_) => {
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            target(input, format!("{stem}.png"))
        }
        None => default_output_path(input),
    };

    // PNG inputs claim their names first so a sibling never displaces them.
    let mut order: Vec<usize> = (0..inputs.len()).collect();
    order.sort_by_key(|&i| !is_png(&inputs[i]));

    let mut claimed: HashSet<PathBuf> = HashSet::with_capacity(inputs.len());
    let mut outputs: Vec<PathBuf> = vec![PathBuf::new(); inputs.len()];
    for i in order {
        let input = &inputs[i];
        let free = |candidate: &PathBuf| {
            !claimed.contains(candidate) && (candidate == input || !inputs.contains(candidate))
        };
        let natural = natural_output(input);
        let output = if free(&natural) {
            natural
        } else {
            let name = input.file_name().unwrap_or_default().to_string_lossy();
            let fallback = target(input, format!("{name}.png"));
            if !free(&fallback) {
                return Err(Error::OutputConflict {
                    input: input.clone(),
                    output: fallback,
                });
            }
            log::debug!(
                "{} would collide at {}, writing {} instead",
                input.display(),
                natural.display(),
                fallback.display()
            );
            fallback
        };
        claimed.insert(output.clone());
        outputs[i] = output;
    }

    let jobs = inputs
        .into_iter()
        .zip(outputs)
        .map(|(input, output)| Job { input, output })
        .collect();
    Ok(jobs)
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "png" | "jpg" | "jpeg" | "webp" | "bmp"
        ),
        None => false,
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Read and decode an image file into RGBA.
///
/// # Errors
///
/// Returns [`Error::InputNotFound`] if the file cannot be read and
/// [`Error::Decode`] if its content is not a decodable image.
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let bytes = std::fs::read(path).map_err(|_| Error::InputNotFound {
        path: path.to_path_buf(),
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decoded.to_rgba8())
}

/// Encode `img` as PNG and atomically replace `path` with it.
///
/// The data is written to a temporary file next to `path` and renamed over
/// it, so a failed write leaves any existing file untouched. Missing parent
/// directories are created.
///
/// # Errors
///
/// Returns [`Error::Encode`] if encoding fails or [`Error::Write`] if the
/// file cannot be written.
pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    let mut encoded = Vec::new();
    img.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .map_err(Error::Encode)?;

    let write_err = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(write_err)?;
    }

    let mut tmp = tempfile::Builder::new()
        .prefix(".icon-bg-")
        .suffix(".png")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(&encoded).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}

/// Output path for in-place cleaning.
///
/// PNG inputs map to themselves; other formats map to a `.png` sibling so
/// the alpha channel survives. Example: `"cup.jpg"` becomes `"cup.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    if is_png(input) {
        input.to_path_buf()
    } else {
        input.with_extension("png")
    }
}
