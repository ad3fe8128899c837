//! Remove near-white backgrounds from icons without erasing white subject details.
//!
//! Making every bright pixel transparent also punches holes into white parts
//! of the icon itself. This crate first finds the subject geometrically and
//! only clears white pixels outside it:
//!
//! 1. **Edges**: luminance, then a 3x3 find-edges Laplacian.
//! 2. **Edge mask**: edge strength above a threshold (default 20).
//! 3. **Consolidation**: cross-shaped dilation (default 3 passes) and hole filling.
//! 4. **Subject**: the largest 4-connected region.
//! 5. **Transparency**: alpha 0 for pixels outside the subject whose R, G and B
//!    are all at or above the whiteness threshold (default 240).
//!
//! # Quick Start
//!
//! ```no_run
//! use icon_bg_removal::{BackgroundRemover, RemovalOptions};
//!
//! let remover = BackgroundRemover::new(RemovalOptions::default()).expect("valid options");
//! let img = image::open("icon.png").unwrap().to_rgba8();
//! let (cleaned, stats) = remover.remove(&img).unwrap();
//! println!("cleared {} pixels", stats.cleared_pixels);
//! cleaned.save("icon_clean.png").unwrap();
//! ```
//!
//! # Batches
//!
//! ```no_run
//! use std::path::Path;
//! use icon_bg_removal::{collect_jobs, BackgroundRemover, RemovalOptions};
//!
//! let remover = BackgroundRemover::new(RemovalOptions::default()).unwrap();
//! let jobs = collect_jobs(Path::new("public/icons"), None).unwrap();
//! for result in remover.process_batch(&jobs) {
//!     if !result.success {
//!         eprintln!("{}: {}", result.path.display(), result.message);
//!     }
//! }
//! ```

#![deny(missing_docs)]

pub mod components;
pub mod edges;
mod engine;
pub mod error;
pub mod mask;
pub mod morphology;
pub mod transparency;

pub use engine::{
    collect_jobs, default_output_path, is_supported_image, load_rgba, save_png,
    BackgroundRemover, Job, Mode, ProcessResult, RemovalOptions, RemovalStats, SubjectDetection,
    MAX_DILATE_ITERATIONS,
};
pub use error::{Error, Result};
pub use mask::{Mask, CONNECTIVITY};
