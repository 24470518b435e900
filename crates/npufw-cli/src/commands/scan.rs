//! Scan command implementation.
//!
//! Prints what each heuristic sees in a boot image: the signature, the region
//! each variant resolves to (or why it fails), every Cortex-M marker and a
//! hexdump around the signature.

use std::path::Path;

use anyhow::{Context, Result};
use npufw_core::{
    BootImageSource, FileSource, hex_dump_lines, locate, parse_build_time, probe_variants,
    scan_markers,
};

/// Run the scan command
pub fn run(boot_img: &Path, context: usize) -> Result<()> {
    let image = FileSource::new(boot_img)
        .acquire_boot_image()
        .with_context(|| format!("Could not read {}", boot_img.display()))?;

    println!("Boot image: {} ({} bytes)", boot_img.display(), image.len());

    let signature = locate(&image).context("Could not find the NPU firmware signature")?;
    let timestamp = signature.timestamp(&image).unwrap_or_default();
    println!(
        "Signature: [0x{:X}, 0x{:X}) {}",
        signature.start, signature.end, timestamp
    );
    match parse_build_time(timestamp) {
        Some(build_time) => println!("Build time: {}", build_time),
        None => println!("Build time: (not a valid date)"),
    }

    println!();
    println!("=== Heuristics ===");
    for probe in probe_variants(&image) {
        match probe.region {
            Ok(region) => println!(
                "  {:<8} [0x{:X}, 0x{:X}) {} bytes",
                probe.variant,
                region.start,
                region.end,
                region.len()
            ),
            Err(e) => println!("  {:<8} {}", probe.variant, e),
        }
    }

    let markers = scan_markers(&image, signature.end);
    println!();
    println!("=== Cortex-M Markers ({} total) ===", markers.len());
    for marker in &markers {
        println!(
            "  0x{:X} -> start 0x{:X}{}",
            marker.offset,
            marker.firmware_start,
            if marker.qualifies { "" } else { " (after signature)" }
        );
    }

    let (from, to) = context_window(signature.start, signature.end, context, image.len());
    println!();
    println!("=== Signature Context ===");
    for line in hex_dump_lines(&image[from..to], from) {
        println!("  {}", line);
    }

    Ok(())
}

/// Byte window around `[start, end)`, with the lower bound aligned to 16
fn context_window(start: usize, end: usize, context: usize, len: usize) -> (usize, usize) {
    let from = start.saturating_sub(context) & !0xF;
    let to = end.saturating_add(context).min(len);
    (from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_window() {
        assert_eq!(context_window(0x105, 0x120, 0x10, 0x1000), (0xF0, 0x130));
        assert_eq!(context_window(0x8, 0x20, 0x40, 0x30), (0, 0x30));
        assert_eq!(context_window(0x100, 0x120, 0, 0x200), (0x100, 0x120));
    }

    #[test]
    fn test_scan_runs_on_valid_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boot.img");
        let mut image = vec![0u8; 0x40];
        image.extend_from_slice(b"[NPU 2019/11/21 15:02:33]");
        std::fs::write(&path, &image).unwrap();

        run(&path, 32).unwrap();
    }

    #[test]
    fn test_scan_without_signature_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boot.img");
        std::fs::write(&path, [0u8; 0x40]).unwrap();

        let err = run(&path, 32).unwrap_err();
        assert!(format!("{:#}", err).contains("signature"));
    }
}
