//! SPU RLE pixel-plane decoding (spec.md §4.5).
//!
//! The plane is interlaced: field 1 fills odd display lines (0, 2, 4,
//! …), field 2 fills even display lines (1, 3, 5, …), each field's own
//! nibble stream byte-aligning at the end of every line. Offsets are
//! absolute byte positions within the whole SPU packet (the reference
//! decoder never rebases them past the 4-byte packet header).

use crate::nibble::NibbleReader;

/// One decoded RLE run: `color` (0..3) repeated `len` times. A `len` of
/// 0 with a fully-zero leading code means "fill to end of line"; the
/// caller resolves that against the line's remaining width.
struct Run {
    color: u8,
    len: u16,
    fill_to_end: bool,
}

/// Decode one variable-length RLE code per spec.md §4.5: a 2-bit colour
/// plus a run length built up from 2, 6, 10, or 14 bits depending on how
/// many leading zero-producing nibbles are consumed.
fn read_run(r: &mut NibbleReader) -> Option<Run> {
    let mut code = r.next4()? as u16;
    if code >= 0x4 {
        let color = (code & 0x3) as u8;
        let len = (code >> 2) & 0x3;
        return Some(Run {
            color,
            len,
            fill_to_end: false,
        });
    }
    code = (code << 4) | r.next4()? as u16;
    if code >= 0x10 {
        let color = (code & 0x3) as u8;
        let len = (code >> 2) & 0x3F;
        return Some(Run {
            color,
            len,
            fill_to_end: false,
        });
    }
    code = (code << 4) | r.next4()? as u16;
    if code >= 0x40 {
        let color = (code & 0x3) as u8;
        let len = (code >> 2) & 0x3FF;
        return Some(Run {
            color,
            len,
            fill_to_end: false,
        });
    }
    code = (code << 4) | r.next4()? as u16;
    let color = (code & 0x3) as u8;
    let len = (code >> 2) & 0x3FFF;
    if len == 0 {
        return Some(Run {
            color,
            len: 0,
            fill_to_end: true,
        });
    }
    Some(Run {
        color,
        len,
        fill_to_end: false,
    })
}

/// Decode both interlaced fields of the RLE plane into a `w * h`
/// indexed byte plane (row-major, 2-bit colour indices widened to
/// bytes). Field 1 (`offsets[0]`) fills rows `0, 2, 4, …`; field 2
/// (`offsets[1]`) fills rows `1, 3, 5, …`. Returns `true` if any run
/// overran its line (spec.md §7 `BitmapOutOfBounds`, tracked by the
/// caller rather than aborting the whole plane).
pub fn decode_planes(buf: &[u8], offsets: [u16; 2], w: usize, h: usize) -> (Vec<u8>, bool) {
    let mut plane = vec![0u8; w * h];
    let mut overrun = false;

    for (field_idx, &offset) in offsets.iter().enumerate() {
        let mut r = NibbleReader::new(buf, offset as usize);
        let mut row = field_idx;
        while row < h {
            let mut col = 0usize;
            while col < w {
                let run = match read_run(&mut r) {
                    Some(run) => run,
                    None => {
                        overrun = true;
                        break;
                    }
                };
                let len = if run.fill_to_end {
                    w - col
                } else {
                    run.len as usize
                };
                let take = len.min(w - col);
                if take < len {
                    overrun = true;
                }
                let base = row * w + col;
                for px in &mut plane[base..base + take] {
                    *px = run.color;
                }
                col += take;
                if take == 0 {
                    overrun = true;
                    break;
                }
            }
            r.align_to_byte();
            row += 2;
        }
    }

    (plane, overrun)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A single-pixel (1x1) plane: one run of length 1, colour 1,
    /// encoded in the short 2-bit-length form (code >= 0x4).
    /// code = (len<<2)|color = (1<<2)|1 = 0x5.
    #[test]
    fn single_pixel_short_form_decodes() {
        // field 1 fills row 0 (the only row); nibble 0x5, then pad.
        let buf = [0x50u8];
        let (plane, overrun) = decode_planes(&buf, [0, 0], 1, 1);
        assert!(!overrun);
        assert_eq!(plane, vec![1]);
    }

    #[test]
    fn fill_to_end_of_line_fills_remaining_width() {
        // code 0x0000 (all zero nibbles) -> fill_to_end, color 0.
        let buf = [0x00u8, 0x00];
        let (plane, _overrun) = decode_planes(&buf, [0, 0], 4, 1);
        assert_eq!(plane, vec![0, 0, 0, 0]);
    }
}
