//! CC data router: `process_cc_data` (spec.md §4.6) plus the RCWT
//! pass-through codec (spec.md §6.3).
//!
//! [`CcRouter`] owns the single [`TimingContext`] for one program and
//! wires it to a field-1 and field-2 [`cc608::Cc608Decoder`], a
//! [`cc708::Cc708Decoder`], and a [`cc_xds::XdsDecoder`] — the four
//! collaborators spec.md §2's data-flow diagram names. It is the one
//! entry point a demuxer drives.
//!
//! # Example
//!
//! ```ignore
//! use cc_router::CcRouter;
//!
//! let mut router = CcRouter::new();
//! router.set_current_pts(90_000);
//! router.set_fts();
//! let subs = router.process_cc_data(&[(0x04, 0x94, 0x20)]).unwrap();
//! ```

pub mod error;
pub mod rcwt;

pub use error::{Result, RouterError};

use cc608::Cc608Decoder;
use cc708::Cc708Decoder;
use cc_core::{DecoderStats, Subtitle};
use cc_timing::TimingContext;
use cc_xds::XdsDecoder;

/// `(flags, byte_a, byte_b)` as emitted by the demuxer (spec.md §6.1).
/// `flags` bit 0 carries `cc_valid`; bits 1-2 carry `cc_type`.
pub type CcRecord = (u8, u8, u8);

fn cc_valid(flags: u8) -> bool {
    flags & 0x01 != 0
}

fn cc_type(flags: u8) -> u8 {
    (flags >> 1) & 0x03
}

/// Wires the timing engine to the 608/708/XDS decoders and implements
/// the top-level `process_cc_data` entry point (spec.md §4.6, §6.1).
pub struct CcRouter {
    timing: TimingContext,
    field1: Cc608Decoder,
    field2: Cc608Decoder,
    cc708: Cc708Decoder,
    xds: XdsDecoder,
    fix_padding: bool,
    extraction_start: Option<i64>,
    extraction_end: Option<i64>,
    processed_enough: bool,
    rcwt: Option<Vec<u8>>,
}

impl Default for CcRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl CcRouter {
    pub fn new() -> Self {
        Self {
            timing: TimingContext::new(),
            field1: Cc608Decoder::new(1),
            field2: Cc608Decoder::new(2),
            cc708: Cc708Decoder::new(),
            xds: XdsDecoder::new(),
            fix_padding: false,
            extraction_start: None,
            extraction_end: None,
            processed_enough: false,
            rcwt: None,
        }
    }

    /// Borrow the timing context (e.g. to inspect `fts_max` for a
    /// diagnostic report).
    pub fn timing(&self) -> &TimingContext {
        &self.timing
    }

    /// When set, a 608 padding record whose data bytes are `(0, 0)` is
    /// replaced with `(0x80, 0x80)` so downstream timing counters still
    /// advance for it (spec.md §4.6).
    pub fn set_fix_padding(&mut self, enabled: bool) {
        self.fix_padding = enabled;
    }

    /// Restrict processing to an FTS window; records outside it are
    /// dropped, and crossing `end` sets `processed_enough` (spec.md
    /// §4.6, §6.1).
    pub fn set_extraction_window(&mut self, start: Option<i64>, end: Option<i64>) {
        self.extraction_start = start;
        self.extraction_end = end;
    }

    /// True once an `extraction_end` boundary has been crossed; the
    /// demuxer is expected to stop feeding records after this (spec.md
    /// §5 "Cancellation").
    pub fn processed_enough(&self) -> bool {
        self.processed_enough
    }

    /// Switch on RCWT pass-through serialisation; every subsequent
    /// `process_cc_data` call also appends a frame per spec.md §6.3.
    pub fn enable_rcwt(&mut self) {
        if self.rcwt.is_none() {
            let mut buf = Vec::new();
            rcwt::write_header(&mut buf);
            self.rcwt = Some(buf);
        }
    }

    /// The accumulated RCWT byte stream, if pass-through is enabled.
    pub fn rcwt_bytes(&self) -> Option<&[u8]> {
        self.rcwt.as_deref()
    }

    pub fn set_current_pts(&mut self, pts: u64) {
        self.timing.set_current_pts(pts);
    }

    pub fn add_current_pts(&mut self, delta: i64) {
        self.timing.add_current_pts(delta);
    }

    pub fn set_fts(&mut self) {
        self.timing.set_fts();
    }

    /// Input-file boundary: accumulates `fts_global`, resets per-file
    /// counters, keeps XDS in-flight buffers intact (spec.md §6.1).
    /// Per spec.md §9's Open Question, channel buffers are
    /// deliberately *not* cleared here either — only the timing state
    /// resets.
    pub fn notify_new_file(&mut self) {
        self.timing.notify_new_file();
    }

    /// Recoverable-error counters accumulated across every
    /// collaborator (spec.md §7).
    pub fn stats(&self) -> DecoderStats {
        let mut total = self.field1.stats();
        total.merge(&self.field2.stats());
        total.merge(&self.cc708.stats());
        total.merge(&self.xds.stats());
        total
    }

    /// Process a batch of `(flags, byte_a, byte_b)` records (spec.md
    /// §4.6, §6.1).
    pub fn process_cc_data(&mut self, records: &[CcRecord]) -> Result<Vec<Subtitle>> {
        let mut out = Vec::new();
        for &(flags, byte_a, byte_b) in records {
            if self.processed_enough {
                break;
            }
            let valid = cc_valid(flags);
            let kind = cc_type(flags);
            if !valid && kind != 3 {
                continue;
            }

            let (byte_a, byte_b) = if self.fix_padding
                && matches!(kind, 0 | 1)
                && byte_a == 0
                && byte_b == 0
            {
                (0x80, 0x80)
            } else {
                (byte_a, byte_b)
            };

            let field = match kind {
                0 => 1,
                1 => 2,
                _ => 3,
            };

            // Probe the FTS the decoders would see without advancing
            // any per-field counter, so the extraction window can be
            // checked before we commit to bumping it (spec.md §4.6).
            let probe_fts = self.timing.fts_now + self.timing.fts_global;
            if let Some(start) = self.extraction_start {
                if probe_fts < start {
                    continue;
                }
            }
            if let Some(end) = self.extraction_end {
                if probe_fts > end {
                    self.processed_enough = true;
                    continue;
                }
            }

            // spec.md §4.6 "bump the appropriate counter" and §8.1
            // invariant 8: even a dropped (0,0) pair still advances the
            // field-block counter by exactly one.
            let fts_for_frame = self.timing.get_fts(field);

            if let Some(rcwt) = self.rcwt.as_mut() {
                rcwt::write_frame(rcwt, fts_for_frame.max(0) as u64, &[(flags, byte_a, byte_b)]);
            }

            match kind {
                0 => {
                    let subs = self
                        .field1
                        .process(&[byte_a, byte_b], &mut self.timing, &mut |_, _| {})?;
                    out.extend(subs);
                }
                1 => {
                    let mut xds_pairs = Vec::new();
                    let subs = self.field2.process(
                        &[byte_a, byte_b],
                        &mut self.timing,
                        &mut |hi, lo| xds_pairs.push((hi, lo)),
                    )?;
                    out.extend(subs);
                    for (hi, lo) in xds_pairs {
                        out.extend(self.xds.process_pair(hi, lo, &mut self.timing));
                    }
                }
                2 | 3 => {
                    let subs = self.cc708.process(kind, byte_a, byte_b, &mut self.timing)?;
                    out.extend(subs);
                }
                _ => unreachable!("cc_type is masked to 2 bits"),
            }
        }
        Ok(out)
    }

    /// Flush every decoder's in-progress state (stream end).
    pub fn flush(&mut self) -> Vec<Subtitle> {
        let mut out = self.field1.flush(&mut self.timing);
        out.extend(self.field2.flush(&mut self.timing));
        out.extend(self.cc708.flush(&mut self.timing));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_core::parity::add_parity;

    fn pair(hi: u8, lo: u8) -> (u8, u8) {
        (add_parity(hi), add_parity(lo))
    }

    /// spec.md §8.2 scenario S1 driven end to end through the router:
    /// flags `0x04` is `cc_valid=0, cc_type=2`... no — field-1 608 data
    /// needs `cc_valid=1, cc_type=0`, i.e. flags bit0=1, bits1-2=00 ->
    /// flags = 0x01.
    #[test]
    fn pop_on_caption_round_trips_through_the_router() {
        let mut router = CcRouter::new();
        router.set_current_pts(90_000);
        router.set_fts();

        let mut records = Vec::new();
        let (a, b) = pair(0x14, 0x20); // RCL
        records.push((0x01u8, a, b));
        let (a, b) = pair(0x14, 0x60); // PAC
        records.push((0x01, a, b));
        let (a, b) = pair(b'H', b'I');
        records.push((0x01, a, b));
        let (a, b) = pair(0x14, 0x2C); // EDM
        records.push((0x01, a, b));

        let subs = router.process_cc_data(&records).unwrap();
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn invalid_non_start_records_are_dropped() {
        let mut router = CcRouter::new();
        router.set_current_pts(90_000);
        router.set_fts();
        // cc_valid=0, cc_type=0 (bits 1-2 = 00): flags = 0x00.
        let subs = router.process_cc_data(&[(0x00, 0x80, 0x80)]).unwrap();
        assert!(subs.is_empty());
    }

    /// spec.md §8.1 invariant 8: a (0,0) byte-pair within the
    /// extraction window produces no output but still bumps the
    /// field-block counter.
    #[test]
    fn padding_pair_bumps_counter_without_output() {
        let mut router = CcRouter::new();
        router.set_current_pts(90_000);
        router.set_fts();
        let before = router.timing().cb_field1;
        let subs = router.process_cc_data(&[(0x01, 0x00, 0x00)]).unwrap();
        assert!(subs.is_empty());
        assert_eq!(router.timing().cb_field1, before + 1);
    }

    #[test]
    fn extraction_window_end_sets_processed_enough_and_stops() {
        let mut router = CcRouter::new();
        router.set_extraction_window(None, Some(0));
        // The first `set_current_pts` call seeds `sync_pts` to that
        // value, so fts starts at 0 regardless of the PTS given here.
        // Advance the clock with a second call to actually cross the
        // `end = 0` boundary.
        router.set_current_pts(90_000);
        router.set_fts();
        router.add_current_pts(90_000 * 10);
        router.set_fts();
        let _ = router.process_cc_data(&[(0x01, 0x80, 0x80)]).unwrap();
        assert!(router.processed_enough());
    }

    #[test]
    fn rcwt_pass_through_records_every_frame() {
        let mut router = CcRouter::new();
        router.enable_rcwt();
        router.set_current_pts(90_000);
        router.set_fts();
        let _ = router
            .process_cc_data(&[(0x01, 0x80, 0x80), (0x01, 0x80, 0x80)])
            .unwrap();
        let bytes = router.rcwt_bytes().unwrap();
        let offset = rcwt::read_header(bytes).unwrap();
        let frames = rcwt::read_frames(bytes, offset);
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn fix_padding_substitutes_zero_pair() {
        let mut router = CcRouter::new();
        router.set_fix_padding(true);
        router.enable_rcwt();
        router.set_current_pts(90_000);
        router.set_fts();
        let _ = router.process_cc_data(&[(0x01, 0x00, 0x00)]).unwrap();
        let bytes = router.rcwt_bytes().unwrap();
        let offset = rcwt::read_header(bytes).unwrap();
        let frames = rcwt::read_frames(bytes, offset);
        assert_eq!(frames[0].records[0], (0x01, 0x80, 0x80));
    }

    /// spec.md §4.3.1-routed 708 data: `cc_type` 2/3 dispatch to the
    /// 708 decoder regardless of field-counter bookkeeping.
    #[test]
    fn cc708_start_record_is_routed_without_panicking() {
        let mut router = CcRouter::new();
        router.set_current_pts(90_000);
        router.set_fts();
        // cc_valid=1, cc_type=3 (start): flags bits = (3<<1)|1 = 0x07.
        let subs = router.process_cc_data(&[(0x07, 0x01, 0x00)]).unwrap();
        assert!(subs.is_empty());
    }
}
