//! DVD/VOBSUB SPU (SubPicture Unit) bitmap subtitle decoder (spec.md §4.5).
//!
//! A single entry point, [`decode_spu`], turns one concatenated SPU
//! packet into a `Subtitle{kind=Bitmap}` record: it reads the 4-byte
//! header, walks the control-sequence chain ([`control`]), decodes the
//! interlaced RLE pixel planes ([`rle`]), and builds the RGBA palette
//! ([`palette`]).
//!
//! # Example
//!
//! ```ignore
//! use cc_vobsub::decode_spu;
//! use cc_timing::TimingContext;
//!
//! let mut timing = TimingContext::new();
//! let sub = decode_spu(&spu_bytes, None, &mut timing, 1)?;
//! ```

pub mod control;
pub mod error;
pub mod nibble;
pub mod palette;
pub mod rle;

pub use error::{Result, VobsubError};

use cc_core::{BitmapPayload, DecoderStats, Subtitle, SubtitleKind, SubtitlePayload};
use cc_timing::TimingContext;
use tracing::warn;

/// Logical screen bounds an SPU's display area must fit within
/// (spec.md §3.5, §8.1 invariant 5): 720x{480,576}. 576 (PAL) is the
/// more permissive bound; callers targeting NTSC-only input may want a
/// tighter check, but the shared decoder uses the union so it never
/// rejects a valid stream of either kind.
pub const SCREEN_WIDTH: u32 = 720;
pub const SCREEN_HEIGHT: u32 = 576;

/// Stateful wrapper around [`decode_spu`] that accumulates
/// [`DecoderStats`] across many packets from the same stream, matching
/// the per-decoder diagnostics convention used by `cc608`/`cc708`
/// (spec.md §7: "caller may sample for a diagnostic report at stream
/// end").
#[derive(Debug, Default)]
pub struct VobsubDecoder {
    external_palette: Option<[[u8; 3]; 16]>,
    stats: DecoderStats,
}

impl VobsubDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the 16-entry external RGB palette carried by a VOBSUB
    /// `.idx` sidecar (spec.md §4.5 "Palette generation").
    pub fn set_external_palette(&mut self, palette: [[u8; 3]; 16]) {
        self.external_palette = Some(palette);
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Decode one SPU packet, tracking any `BitmapOutOfBounds`
    /// recoverable error in this decoder's stats instead of
    /// propagating it further than `Ok(None)` (spec.md §7).
    pub fn decode(&mut self, buf: &[u8], timing: &mut TimingContext) -> Result<Option<Subtitle>> {
        decode_spu(buf, self.external_palette.as_ref(), timing, 1).map(Some)
    }
}

/// Decode one concatenated SPU packet into a `Subtitle{kind=Bitmap}`
/// record (spec.md §4.5). `field` selects which timing field
/// `get_visible_start` draws its FTS from, per spec.md §4.5's output
/// contract ("start_ms = get_visible_start(field 1)").
pub fn decode_spu(
    buf: &[u8],
    external_palette: Option<&[[u8; 3]; 16]>,
    timing: &mut TimingContext,
    field: u8,
) -> Result<Subtitle> {
    if buf.len() < 4 {
        return Err(VobsubError::Truncated { len: buf.len() });
    }
    let spu_size = u16::from_be_bytes([buf[0], buf[1]]) as usize;
    let ctrl_offset = u16::from_be_bytes([buf[2], buf[3]]) as usize;
    let packet = if spu_size <= buf.len() { &buf[..spu_size] } else { buf };

    if ctrl_offset >= packet.len() {
        return Err(VobsubError::Truncated { len: packet.len() });
    }

    let state = control::parse_control_sequence(packet, ctrl_offset)?;
    let area = state.area;

    let mut w = area.width();
    let mut h = area.height();
    let mut out_of_bounds = false;
    if area.x1 + w > SCREEN_WIDTH || area.y1 + h > SCREEN_HEIGHT || w == 0 || h == 0 {
        out_of_bounds = true;
        w = w.min(SCREEN_WIDTH.saturating_sub(area.x1)).max(1);
        h = h.min(SCREEN_HEIGHT.saturating_sub(area.y1)).max(1);
    }

    // Pixel-offset commands (§4.5 `0x06`) index from the start of the
    // whole SPU packet, not from the start of the RLE region (matches
    // the reference decoder, which never subtracts the 4-byte header).
    let (pixels, overran) = rle::decode_planes(packet, state.rle_offsets, w as usize, h as usize);
    if overran {
        out_of_bounds = true;
    }

    let rgba_palette = palette::build_palette(state.colors, state.alphas, external_palette);

    let start_ms = timing.get_visible_start(field);
    let stop_ms = match (state.start_date, state.stop_date) {
        (Some(start), Some(stop)) => ((stop.wrapping_sub(start)) as i64 * 1024) / 90,
        _ => 0,
    };
    let end_ms = start_ms + stop_ms.max(0);

    if out_of_bounds {
        warn!(x = area.x1, y = area.y1, w, h, "VOBSUB bitmap clamped to screen bounds");
    }

    Ok(Subtitle {
        kind: SubtitleKind::Bitmap,
        start_ms,
        end_ms,
        payload: SubtitlePayload::Bitmap(BitmapPayload {
            x: area.x1,
            y: area.y1,
            w,
            h,
            pixels,
            palette: rgba_palette,
            ocr_text: None,
        }),
        language_hint: None,
        channel: None,
        field: Some(field),
        mode: None,
        prev: None,
        next: None,
    })
}
