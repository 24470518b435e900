//! Prelude module for convenient imports
//!
//! ```ignore
//! use npufw_core::prelude::*;
//! ```

pub use crate::error::{Error, Result};
pub use crate::extract::{ExtractedFirmware, FirmwareRegion, extract};
pub use crate::offset::Signature;
pub use crate::report::ExtractionReport;
pub use crate::source::{BootImageSource, FileSource};
pub use crate::variant::FirmwareVariant;
