//! Firmware extraction
//!
//! Ties signature detection and start resolution together and copies the
//! firmware bytes out of the boot image. Nothing here writes to disk.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::offset::{Signature, locate, resolve, timestamp_before};
use crate::variant::FirmwareVariant;

/// Half-open byte range `[start, end)` of the firmware in the boot image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FirmwareRegion {
    pub start: usize,
    pub end: usize,
}

impl FirmwareRegion {
    /// Build a region, enforcing `start < end <= buffer_len`.
    pub fn new(start: usize, end: usize, buffer_len: usize) -> Result<Self> {
        if start >= end || end > buffer_len {
            return Err(Error::InvalidFirmwareRegion {
                start,
                end,
                len: buffer_len,
            });
        }
        Ok(Self { start, end })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Firmware bytes copied out of a boot image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFirmware {
    pub variant: FirmwareVariant,
    pub signature: Signature,
    pub region: FirmwareRegion,
    bytes: Vec<u8>,
}

impl ExtractedFirmware {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Build timestamp text closing the firmware
    ///
    /// `None` when the resolved start falls inside the banner itself.
    pub fn timestamp(&self) -> Option<&str> {
        timestamp_before(&self.bytes)
    }
}

/// Locate the firmware without copying it.
pub fn locate_region(
    buffer: &[u8],
    variant: FirmwareVariant,
) -> Result<(Signature, FirmwareRegion)> {
    let signature = locate(buffer)?;
    let start = resolve(buffer, &signature, variant)?;
    let region = FirmwareRegion::new(start, signature.end, buffer.len())?;
    debug!(
        "Firmware region [0x{:X}, 0x{:X}) ({} bytes)",
        region.start,
        region.end,
        region.len()
    );
    Ok((signature, region))
}

/// Extract the NPU firmware for `variant` from a boot image.
pub fn extract(buffer: &[u8], variant: FirmwareVariant) -> Result<ExtractedFirmware> {
    let (signature, region) = locate_region(buffer, variant)?;
    let bytes = buffer[region.as_range()].to_vec();

    info!(
        "Extracted {} firmware: {} bytes at 0x{:X}",
        variant,
        bytes.len(),
        region.start
    );

    Ok(ExtractedFirmware {
        variant,
        signature,
        region,
        bytes,
    })
}
