//! # npufw-core
//!
//! Core library for extracting Samsung NPU firmware from boot images.
//!
//! The firmware is not wrapped in any container, so its boundaries are
//! inferred from byte patterns:
//!
//! 1. a build banner `[... YYYY/MM/DD HH:MM:SS]` marks the end of the firmware
//! 2. the start is resolved with a heuristic specific to the NPU core
//!    generation ([`FirmwareVariant`])
//! 3. the bytes in between are copied out
//!
//! ```no_run
//! use npufw_core::{BootImageSource, FileSource, FirmwareVariant, extract};
//!
//! let image = FileSource::new("boot.img").acquire_boot_image()?;
//! let firmware = extract(&image, FirmwareVariant::CortexA)?;
//! std::fs::write("NPU.bin", firmware.as_bytes())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `debug-tools`: Enables diagnostics (marker listing, hexdumps) for boot
//!   images the heuristics fail on.

#[cfg(feature = "debug-tools")]
pub mod debug;
pub mod error;
pub mod extract;
pub mod layout;
pub mod offset;
pub mod prelude;
pub mod report;
pub mod source;
pub mod variant;

#[cfg(test)]
pub mod mock;

pub use error::{Error, Result};
pub use extract::{ExtractedFirmware, FirmwareRegion, extract, locate_region};
pub use offset::{Signature, find_markers, locate, resolve};
pub use report::{ExtractionReport, SpanValues, parse_build_time};
pub use source::{BootImageSource, FileSource};
pub use variant::FirmwareVariant;

#[cfg(feature = "debug-tools")]
pub use debug::{MarkerCandidate, VariantProbe, hex_dump_lines, probe_variants, scan_markers};
