//! Timestamp signature closing the NPU firmware region
//!
//! The firmware ends with a build banner such as
//! `[NPU firmware v1.2 2019/11/21 15:02:33]`. The banner is matched with
//! these rules:
//!
//! - it starts at a `[` and ends at the `]` closing the timestamp
//! - the free-form run between them never crosses a `\n`
//! - the run is greedy: the last timestamp on the line closes the match
//! - digits are checked for shape only (`2019/13/45` is accepted)

use memchr::{memchr, memchr_iter, memrchr_iter};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::layout::signature::{
    CLOSE, LINE_BREAK, OPEN, TIMESTAMP_LEN, TIMESTAMP_TAIL_LEN, TIMESTAMP_TEMPLATE,
};

/// Half-open byte range `[start, end)` of the signature banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub start: usize,
    pub end: usize,
}

impl Signature {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Timestamp text (`YYYY/MM/DD HH:MM:SS`) of this signature in `buffer`
    pub fn timestamp<'a>(&self, buffer: &'a [u8]) -> Option<&'a str> {
        timestamp_before(buffer.get(..self.end)?)
    }
}

/// Read the timestamp text from a slice ending with the banner's `]`.
pub fn timestamp_before(bytes: &[u8]) -> Option<&str> {
    let tail_start = bytes.len().checked_sub(TIMESTAMP_TAIL_LEN)?;
    let tail = &bytes[tail_start..];
    if !matches_timestamp_tail(tail) {
        return None;
    }
    std::str::from_utf8(&tail[..TIMESTAMP_LEN]).ok()
}

/// Find the first signature in `buffer`.
///
/// Candidates are tried in ascending order of their `[`. Once a line holds no
/// timestamp after a given `[`, the remaining brackets on that line are
/// skipped, so the scan stays linear in the buffer length.
pub fn locate(buffer: &[u8]) -> Result<Signature> {
    let mut skip_until = 0;

    for start in memchr_iter(OPEN, buffer) {
        if start < skip_until {
            continue;
        }

        let run_start = start + 1;
        let line_end = memchr(LINE_BREAK, &buffer[run_start..])
            .map_or(buffer.len(), |pos| run_start + pos);

        match last_timestamp_tail(&buffer[run_start..line_end]) {
            Some(tail) => {
                let signature = Signature {
                    start,
                    end: run_start + tail + TIMESTAMP_TAIL_LEN,
                };
                debug!(
                    "Signature found at [0x{:X}, 0x{:X})",
                    signature.start, signature.end
                );
                return Ok(signature);
            }
            None => skip_until = line_end,
        }
    }

    Err(Error::SignatureNotFound {
        scanned: buffer.len(),
    })
}

/// Offset of the rightmost timestamp tail within `segment`
fn last_timestamp_tail(segment: &[u8]) -> Option<usize> {
    memrchr_iter(CLOSE, segment)
        .filter_map(|close| close.checked_sub(TIMESTAMP_TAIL_LEN - 1))
        .find(|&tail| matches_timestamp_tail(&segment[tail..tail + TIMESTAMP_TAIL_LEN]))
}

fn matches_timestamp_tail(window: &[u8]) -> bool {
    window.len() == TIMESTAMP_TAIL_LEN
        && window
            .iter()
            .zip(TIMESTAMP_TEMPLATE)
            .all(|(&byte, &expected)| match expected {
                b'#' => byte.is_ascii_digit(),
                literal => byte == literal,
            })
}
