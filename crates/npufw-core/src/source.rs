//! Boot image acquisition
//!
//! The extractor only needs the boot image bytes. Where they come from (a
//! local file, a device over adb, ...) is supplied by the application through
//! [`BootImageSource`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Capability that yields a full boot image
pub trait BootImageSource {
    fn acquire_boot_image(&self) -> Result<Vec<u8>>;

    /// Human-readable origin for log messages
    fn describe(&self) -> String;
}

impl<S: BootImageSource + ?Sized> BootImageSource for &S {
    fn acquire_boot_image(&self) -> Result<Vec<u8>> {
        (**self).acquire_boot_image()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<S: BootImageSource + ?Sized> BootImageSource for Box<S> {
    fn acquire_boot_image(&self) -> Result<Vec<u8>> {
        (**self).acquire_boot_image()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Boot image stored in a local file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BootImageSource for FileSource {
    fn acquire_boot_image(&self) -> Result<Vec<u8>> {
        debug!("Reading boot image from {}", self.path.display());
        let bytes = fs::read(&self.path)?;
        if bytes.is_empty() {
            return Err(Error::Acquisition(format!(
                "boot image {} is empty",
                self.path.display()
            )));
        }
        info!("Loaded boot image: {} bytes", bytes.len());
        Ok(bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
