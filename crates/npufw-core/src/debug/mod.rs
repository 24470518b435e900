//! Diagnostics for boot images the heuristics fail on
//!
//! Requires the `debug-tools` feature.

use serde::Serialize;

use crate::error::Result;
use crate::extract::{FirmwareRegion, locate_region};
use crate::layout::cortex_m::PADDING_LEN;
use crate::offset::find_markers;
use crate::variant::FirmwareVariant;

/// Cortex-M marker occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerCandidate {
    pub offset: usize,
    /// Firmware start this marker would yield
    pub firmware_start: usize,
    /// Whether the marker lies at or before the signature end
    pub qualifies: bool,
}

/// List every Cortex-M marker, flagging those at or before `limit`.
pub fn scan_markers(buffer: &[u8], limit: usize) -> Vec<MarkerCandidate> {
    find_markers(buffer)
        .map(|offset| MarkerCandidate {
            offset,
            firmware_start: offset + PADDING_LEN,
            qualifies: offset <= limit,
        })
        .collect()
}

/// Outcome of running one variant's heuristic
#[derive(Debug)]
pub struct VariantProbe {
    pub variant: FirmwareVariant,
    pub region: Result<FirmwareRegion>,
}

/// Run both heuristics against `buffer`.
pub fn probe_variants(buffer: &[u8]) -> Vec<VariantProbe> {
    FirmwareVariant::ALL
        .into_iter()
        .map(|variant| VariantProbe {
            variant,
            region: locate_region(buffer, variant).map(|(_, region)| region),
        })
        .collect()
}

/// Format bytes as hexdump lines
///
/// ```text
/// 0x000400: 5B 4E 50 55 20 32 30 31  39 2F 31 31 2F 32 31 20  |[NPU 2019/11/21 |
/// ```
pub fn hex_dump_lines(bytes: &[u8], base: usize) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let mut line = format!("0x{:06X}: ", base + i * 16);

            for j in 0..16 {
                if j == 8 {
                    line.push(' ');
                }
                match chunk.get(j) {
                    Some(byte) => line.push_str(&format!("{:02X} ", byte)),
                    None => line.push_str("   "),
                }
            }

            line.push_str(" |");
            line.extend(chunk.iter().map(|&b| {
                if (0x20..0x7F).contains(&b) {
                    b as char
                } else {
                    '.'
                }
            }));
            line.push('|');
            line
        })
        .collect()
}
