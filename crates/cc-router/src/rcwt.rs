//! RCWT (Raw Captions With Time) pass-through codec (spec.md §6.3).
//!
//! A bit-exact snapshot container: an 11-byte header followed by a
//! stream of `(fts_ms: u64, count: u16, records: count * 3 bytes)`
//! frames. The reader tolerates arbitrary whole-frame alignment and a
//! zero record count (keep-alive frame).

use crate::error::{Result, RouterError};

pub const MAGIC: [u8; 3] = [0xCC, 0xCC, 0xED];
pub const CREATING_PROGRAM_ID: u8 = 0xCC;
pub const PROGRAM_VERSION: u16 = 80;
pub const FILE_FORMAT_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 11;

/// Write the fixed 11-byte RCWT header (spec.md §6.3).
pub fn write_header(out: &mut Vec<u8>) {
    out.extend_from_slice(&MAGIC);
    out.push(CREATING_PROGRAM_ID);
    out.extend_from_slice(&PROGRAM_VERSION.to_le_bytes());
    out.extend_from_slice(&FILE_FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&[0x00, 0x00, 0x00]);
}

/// Append one frame: `fts_ms` plus the raw `(flags, byte_a, byte_b)`
/// records observed at that timestamp. `records` may be empty
/// (keep-alive frame, spec.md §6.3).
pub fn write_frame(out: &mut Vec<u8>, fts_ms: u64, records: &[(u8, u8, u8)]) {
    out.extend_from_slice(&fts_ms.to_le_bytes());
    out.extend_from_slice(&(records.len() as u16).to_le_bytes());
    for &(flags, a, b) in records {
        out.push(flags);
        out.push(a);
        out.push(b);
    }
}

/// One decoded RCWT frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcwtFrame {
    pub fts_ms: u64,
    pub records: Vec<(u8, u8, u8)>,
}

/// Validate the 11-byte header and return the offset of the first
/// frame.
pub fn read_header(buf: &[u8]) -> Result<usize> {
    if buf.len() < HEADER_LEN {
        return Err(RouterError::RcwtTruncated {
            need: HEADER_LEN,
            got: buf.len(),
        });
    }
    if buf[0..3] != MAGIC {
        return Err(RouterError::RcwtBadMagic);
    }
    Ok(HEADER_LEN)
}

/// Parse every whole frame starting at `offset`. A trailing partial
/// frame (fewer bytes than its header or declared record count) is
/// silently ignored rather than erroring, per spec.md §6.3 ("reader
/// must tolerate arbitrary whole-frame alignment").
pub fn read_frames(buf: &[u8], mut offset: usize) -> Vec<RcwtFrame> {
    let mut frames = Vec::new();
    while offset + 10 <= buf.len() {
        let fts_ms = u64::from_le_bytes(buf[offset..offset + 8].try_into().unwrap());
        let count = u16::from_le_bytes(buf[offset + 8..offset + 10].try_into().unwrap()) as usize;
        let body_start = offset + 10;
        let body_len = count * 3;
        if body_start + body_len > buf.len() {
            break;
        }
        let mut records = Vec::with_capacity(count);
        for i in 0..count {
            let rec = &buf[body_start + i * 3..body_start + i * 3 + 3];
            records.push((rec[0], rec[1], rec[2]));
        }
        frames.push(RcwtFrame { fts_ms, records });
        offset = body_start + body_len;
    }
    frames
}
