//! Firmware start resolution
//!
//! Both heuristics anchor on the signature found by [`locate`](super::locate):
//!
//! ```text
//!  Cortex-A                                   signature.start
//!  ┌──────────── size ────────────┐                │
//!  │        firmware body         │ .. │size│ ..   ▼
//!  ▲                              ▲    ▲           [ ... YYYY/MM/DD HH:MM:SS]
//!  start          start + size ───┘    └── start - 0x30
//!                 == signature.start - 0x28
//!
//!  Cortex-M
//!  .. 00 00 00 00 │ 00 10 07 00 │ vector table ... [ ... YYYY/MM/DD HH:MM:SS]
//!                 ▲
//!                 start (last marker at or before signature.end, + 4)
//! ```

use memchr::memmem;
use tracing::debug;

use super::Signature;
use crate::error::{Error, Result};
use crate::layout::{cortex_a, cortex_m};
use crate::variant::FirmwareVariant;

/// Compute the firmware start offset for `variant`.
pub fn resolve(buffer: &[u8], signature: &Signature, variant: FirmwareVariant) -> Result<usize> {
    let start = match variant {
        FirmwareVariant::CortexA => resolve_cortex_a(buffer, signature)?,
        FirmwareVariant::CortexM => resolve_cortex_m(buffer, signature)?,
    };
    debug!("Resolved {} firmware start: 0x{:X}", variant, start);
    Ok(start)
}

/// All Cortex-M marker offsets in ascending, non-overlapping order
pub fn find_markers(buffer: &[u8]) -> impl Iterator<Item = usize> + '_ {
    memmem::find_iter(buffer, &cortex_m::MARKER)
}

fn resolve_cortex_a(buffer: &[u8], signature: &Signature) -> Result<usize> {
    let out_of_bounds = |size| Error::SizeFieldOutOfBounds {
        signature_start: signature.start,
        size,
    };

    let field = signature
        .start
        .checked_sub(cortex_a::SIZE_FIELD_BACKOFF)
        .ok_or_else(|| out_of_bounds(None))?;
    let size = read_u32_le(buffer, field).ok_or_else(|| out_of_bounds(None))?;
    debug!("Cortex-A size field at 0x{:X}: 0x{:X}", field, size);

    signature
        .start
        .checked_sub(cortex_a::BODY_END_BACKOFF)
        .and_then(|body_end| body_end.checked_sub(size as usize))
        .ok_or_else(|| out_of_bounds(Some(size)))
}

fn resolve_cortex_m(buffer: &[u8], signature: &Signature) -> Result<usize> {
    let limit = signature.end;

    // Matches arrive in ascending order, so the last one before the first
    // match past the limit is the closest to the signature.
    let marker = find_markers(buffer)
        .take_while(|&offset| offset <= limit)
        .inspect(|offset| debug!("Cortex-M marker candidate at 0x{:X}", offset))
        .last()
        .ok_or(Error::MarkerNotFound { limit })?;

    Ok(marker + cortex_m::PADDING_LEN)
}

fn read_u32_le(buffer: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(cortex_a::SIZE_FIELD_LEN)?;
    let bytes: [u8; 4] = buffer.get(offset..end)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::BootImageBuilder;
    use crate::offset::locate;

    const TIMESTAMP: &str = "2020/03/04 05:06:07";

    /// Image with a Cortex-A size field `size` placed before a banner at `banner_at`
    fn cortex_a_image(banner_at: usize, size: u32) -> Vec<u8> {
        BootImageBuilder::new()
            .fill_to(banner_at - cortex_a::SIZE_FIELD_BACKOFF, 0x11)
            .u32_le(size)
            .fill_to(banner_at, 0x22)
            .banner("NPU ", TIMESTAMP)
            .fill(0x20, 0x33)
            .build()
    }

    #[test]
    fn test_cortex_a_golden() {
        let image = cortex_a_image(0x400, 0x100);
        let signature = locate(&image).unwrap();
        assert_eq!(signature.start, 0x400);

        let start = resolve(&image, &signature, FirmwareVariant::CortexA).unwrap();
        assert_eq!(start, 0x400 - 0x28 - 0x100);
    }

    #[test]
    fn test_cortex_a_zero_size() {
        let image = cortex_a_image(0x100, 0);
        let signature = locate(&image).unwrap();
        let start = resolve(&image, &signature, FirmwareVariant::CortexA).unwrap();
        assert_eq!(start, 0x100 - 0x28);
    }

    #[test]
    fn test_cortex_a_start_exactly_zero() {
        let image = cortex_a_image(0x200, 0x200 - 0x28);
        let signature = locate(&image).unwrap();
        let start = resolve(&image, &signature, FirmwareVariant::CortexA).unwrap();
        assert_eq!(start, 0);
    }

    #[test]
    fn test_cortex_a_size_underflows() {
        let image = cortex_a_image(0x200, 0x200);
        let signature = locate(&image).unwrap();
        let err = resolve(&image, &signature, FirmwareVariant::CortexA).unwrap_err();
        assert!(matches!(
            err,
            Error::SizeFieldOutOfBounds {
                signature_start: 0x200,
                size: Some(0x200)
            }
        ));

        let image = cortex_a_image(0x200, u32::MAX);
        let signature = locate(&image).unwrap();
        assert!(resolve(&image, &signature, FirmwareVariant::CortexA).is_err());
    }

    #[test]
    fn test_cortex_a_size_field_before_buffer() {
        let image = BootImageBuilder::new()
            .fill(0x10, 0)
            .banner("", TIMESTAMP)
            .build();
        let signature = locate(&image).unwrap();
        let err = resolve(&image, &signature, FirmwareVariant::CortexA).unwrap_err();
        assert!(matches!(
            err,
            Error::SizeFieldOutOfBounds {
                signature_start: 0x10,
                size: None
            }
        ));
    }

    #[test]
    fn test_cortex_a_signature_past_buffer() {
        let signature = Signature {
            start: 0x100,
            end: 0x120,
        };
        let err = resolve(&[0u8; 0x20], &signature, FirmwareVariant::CortexA).unwrap_err();
        assert!(matches!(err, Error::SizeFieldOutOfBounds { size: None, .. }));
    }

    #[test]
    fn test_cortex_m_golden() {
        let image = BootImageBuilder::new()
            .fill(0x80, 0xFF)
            .marker()
            .fill(0x200, 0x44)
            .banner("", TIMESTAMP)
            .build();
        let signature = locate(&image).unwrap();
        let start = resolve(&image, &signature, FirmwareVariant::CortexM).unwrap();
        assert_eq!(start, 0x80 + 4);
    }

    #[test]
    fn test_cortex_m_picks_last_marker_before_signature() {
        let image = BootImageBuilder::new()
            .fill(0x40, 0xFF)
            .marker()
            .fill(0x40, 0xEE)
            .marker()
            .fill(0x40, 0xDD)
            .banner("", TIMESTAMP)
            .fill(0x10, 0xCC)
            .marker()
            .build();
        let signature = locate(&image).unwrap();
        let start = resolve(&image, &signature, FirmwareVariant::CortexM).unwrap();
        assert_eq!(start, 0x40 + 8 + 0x40 + 4);
    }

    #[test]
    fn test_cortex_m_marker_at_signature_end_qualifies() {
        let image = BootImageBuilder::new()
            .fill(0x20, 0xFF)
            .banner("", TIMESTAMP)
            .marker()
            .build();
        let signature = locate(&image).unwrap();
        let start = resolve(&image, &signature, FirmwareVariant::CortexM).unwrap();
        assert_eq!(start, signature.end + 4);
    }

    #[test]
    fn test_cortex_m_without_marker() {
        let image = BootImageBuilder::new()
            .fill(0x20, 0xFF)
            .banner("", TIMESTAMP)
            .fill(0x10, 0)
            .marker()
            .build();
        let signature = locate(&image).unwrap();
        let err = resolve(&image, &signature, FirmwareVariant::CortexM).unwrap_err();
        assert!(matches!(err, Error::MarkerNotFound { limit } if limit == signature.end));
    }

    #[test]
    fn test_cortex_m_ignores_bare_stack_addr() {
        let image = BootImageBuilder::new()
            .fill(0x20, 0xFF)
            .u32_le(cortex_m::STACK_ADDR)
            .fill(0x20, 0xFF)
            .banner("", TIMESTAMP)
            .build();
        let signature = locate(&image).unwrap();
        assert!(resolve(&image, &signature, FirmwareVariant::CortexM).is_err());
    }

    #[test]
    fn test_find_markers_skips_overlaps() {
        // Two markers sharing one zero byte; only the first is reported.
        let image = BootImageBuilder::new()
            .marker()
            .bytes(&[0x00, 0x00, 0x00, 0x00, 0x10, 0x07, 0x00])
            .marker()
            .build();
        let markers: Vec<usize> = find_markers(&image).collect();
        assert_eq!(markers, vec![0, 15]);
    }

    #[test]
    fn test_read_u32_le_bounds() {
        assert_eq!(read_u32_le(&[1, 0, 0, 0], 0), Some(1));
        assert_eq!(read_u32_le(&[1, 0, 0], 0), None);
        assert_eq!(read_u32_le(&[1, 0, 0, 0], usize::MAX), None);
    }
}
