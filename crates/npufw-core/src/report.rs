use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::extract::ExtractedFirmware;
use crate::layout::signature::TIMESTAMP_FORMAT;
use crate::variant::FirmwareVariant;

/// Extraction summary written next to the firmware
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub tool_version: String,
    pub variant: FirmwareVariant,
    pub image_size: usize,
    pub signature: SpanValues,
    pub firmware: SpanValues,
    pub firmware_size: usize,
    /// Raw timestamp text from the signature
    pub timestamp: Option<String>,
    /// Parsed timestamp, absent when the text is not a real date
    pub build_time: Option<NaiveDateTime>,
}

/// Byte range in hex string format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanValues {
    pub start: String,
    pub end: String,
}

impl SpanValues {
    fn new(start: usize, end: usize) -> Self {
        Self {
            start: format!("0x{:X}", start),
            end: format!("0x{:X}", end),
        }
    }
}

impl ExtractionReport {
    /// Create a report for firmware extracted from an image of `image_size` bytes
    pub fn from_extraction(firmware: &ExtractedFirmware, image_size: usize) -> Self {
        let timestamp = firmware.timestamp().map(str::to_string);
        let build_time = timestamp.as_deref().and_then(parse_build_time);

        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            variant: firmware.variant,
            image_size,
            signature: SpanValues::new(firmware.signature.start, firmware.signature.end),
            firmware: SpanValues::new(firmware.region.start, firmware.region.end),
            firmware_size: firmware.len(),
            timestamp,
            build_time,
        }
    }

    /// Save report to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        info!("Saved extraction report to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Parse signature timestamp text (`YYYY/MM/DD HH:MM:SS`).
pub fn parse_build_time(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}
