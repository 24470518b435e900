//! Extract command implementation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use npufw_core::{BootImageSource, ExtractionReport, FileSource, FirmwareVariant, extract};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::adb::{AdbConfig, AdbSource};
use crate::status;

/// Firmware file written to the output directory
pub const FIRMWARE_FILE: &str = "NPU.bin";
/// Report file written with `--report`
pub const REPORT_FILE: &str = "NPU.json";

pub struct ExtractOptions {
    pub variant: FirmwareVariant,
    pub directory: PathBuf,
    pub boot_img: Option<PathBuf>,
    pub report: bool,
    pub adb: AdbConfig,
}

/// Run the extract command
pub fn run(options: ExtractOptions) -> Result<()> {
    fs::create_dir_all(&options.directory).with_context(|| {
        format!(
            "Could not create output directory {}",
            options.directory.display()
        )
    })?;

    let source: Box<dyn BootImageSource> = match options.boot_img {
        Some(ref path) => Box::new(FileSource::new(path)),
        None => {
            status::step("Connection to the device using ADB.");
            let source = AdbSource::connect(options.adb, &options.directory)?;
            status::step(&format!(
                "Pulling the kernel from device {} to the host.",
                source.serial()
            ));
            Box::new(source)
        }
    };

    let path = extract_from_source(
        source.as_ref(),
        options.variant,
        &options.directory,
        options.report,
    )?;

    info!("Firmware written to {}", path.display());
    status::step("Done.");
    Ok(())
}

/// Acquire, extract and persist; returns the firmware path.
pub fn extract_from_source(
    source: &dyn BootImageSource,
    variant: FirmwareVariant,
    directory: &Path,
    report: bool,
) -> Result<PathBuf> {
    let image = source
        .acquire_boot_image()
        .with_context(|| format!("Could not read the boot image from {}", source.describe()))?;
    debug!("Boot image from {}: {} bytes", source.describe(), image.len());

    status::step("Extracting the firmware.");
    let firmware = extract(&image, variant).context("Could not extract the NPU firmware")?;

    let path = write_atomic(directory, FIRMWARE_FILE, firmware.as_bytes())?;

    if report {
        let report = ExtractionReport::from_extraction(&firmware, image.len());
        report.save(directory.join(REPORT_FILE))?;
    }

    Ok(path)
}

/// Write `bytes` to `directory/name` without leaving partial files behind.
fn write_atomic(directory: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = directory.join(name);

    let mut temp_file = NamedTempFile::new_in(directory)?;
    temp_file.write_all(bytes)?;
    temp_file.flush()?;
    temp_file
        .persist(&path)
        .with_context(|| format!("Could not write {}", path.display()))?;

    Ok(path)
}
