//! Boot image layout constants
//!
//! Offsets here are relative to the firmware signature and were derived from
//! Exynos boot images. They are heuristics, not a documented format.

/// Timestamp signature closing the firmware region: `[... YYYY/MM/DD HH:MM:SS]`
pub mod signature {
    pub const OPEN: u8 = b'[';
    pub const CLOSE: u8 = b']';
    /// Byte the free-form run between `[` and the timestamp may not contain
    pub const LINE_BREAK: u8 = b'\n';

    /// Shape of the timestamp tail; `#` stands for an ASCII digit.
    pub const TIMESTAMP_TEMPLATE: &[u8; 20] = b"####/##/## ##:##:##]";
    pub const TIMESTAMP_TAIL_LEN: usize = TIMESTAMP_TEMPLATE.len();
    /// Length of the timestamp text without the closing bracket
    pub const TIMESTAMP_LEN: usize = TIMESTAMP_TAIL_LEN - 1;
    pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
}

/// Cortex-A firmware (newer SoCs, e.g. S20)
pub mod cortex_a {
    /// Distance from the signature start back to the little-endian size field
    pub const SIZE_FIELD_BACKOFF: usize = 0x30;
    pub const SIZE_FIELD_LEN: usize = 4;
    /// Distance from the signature start back to the end of the firmware body
    pub const BODY_END_BACKOFF: usize = 0x28;
}

/// Cortex-M firmware (older SoCs, e.g. S10)
pub mod cortex_m {
    /// Initial stack pointer at the head of the vector table
    pub const STACK_ADDR: u32 = 0x0007_1000;

    /// Zero padding followed by the stack address. The padding filters out
    /// the many unrelated occurrences of the bare value.
    pub const MARKER: [u8; 8] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x07, 0x00];
    pub const PADDING_LEN: usize = 4;
}
