//! Synthetic boot images for tests

use crate::error::{Error, Result};
use crate::layout::cortex_m::MARKER;
use crate::source::BootImageSource;

/// Builds boot image buffers piece by piece.
#[derive(Debug, Default, Clone)]
pub struct BootImageBuilder {
    bytes: Vec<u8>,
}

impl BootImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current write offset
    pub fn position(&self) -> usize {
        self.bytes.len()
    }

    pub fn fill(mut self, len: usize, byte: u8) -> Self {
        self.bytes.resize(self.bytes.len() + len, byte);
        self
    }

    /// Pad with `byte` up to absolute offset `offset`
    pub fn fill_to(self, offset: usize, byte: u8) -> Self {
        let len = offset.saturating_sub(self.position());
        self.fill(len, byte)
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn u32_le(self, value: u32) -> Self {
        self.bytes(&value.to_le_bytes())
    }

    /// Cortex-M vector table marker (zero padding + stack address)
    pub fn marker(self) -> Self {
        self.bytes(&MARKER)
    }

    /// `[<prefix><timestamp>]`
    pub fn banner(self, prefix: &str, timestamp: &str) -> Self {
        self.bytes(b"[")
            .bytes(prefix.as_bytes())
            .bytes(timestamp.as_bytes())
            .bytes(b"]")
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// In-memory boot image source.
#[derive(Debug, Clone)]
pub struct MockSource {
    image: Option<Vec<u8>>,
}

impl MockSource {
    pub fn new(image: Vec<u8>) -> Self {
        Self { image: Some(image) }
    }

    /// A source whose acquisition always fails
    pub fn unavailable() -> Self {
        Self { image: None }
    }
}

impl BootImageSource for MockSource {
    fn acquire_boot_image(&self) -> Result<Vec<u8>> {
        self.image
            .clone()
            .ok_or_else(|| Error::Acquisition("mock device disconnected".to_string()))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
