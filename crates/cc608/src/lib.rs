//! EIA/CEA-608 line-21 closed caption decoder.
//!
//! A `Cc608Decoder` owns the two logical channels multiplexed onto one
//! physical field (CC1/CC2 on field 1, CC3/CC4 on field 2) and dispatches
//! each incoming byte pair by `hi` per the table in spec.md §4.2. XDS
//! byte pairs are recognized but not parsed here: they are handed to the
//! caller's `xds_out` callback, keeping this crate free of a dependency
//! on `cc-xds` (the CC data router owns that wiring — see §4.6).
//!
//! # Example
//!
//! ```ignore
//! use cc608::Cc608Decoder;
//! use cc_timing::TimingContext;
//!
//! let mut decoder = Cc608Decoder::new(1);
//! let mut timing = TimingContext::new();
//! let subs = decoder.process(&[0x94, 0x20, 0xc8, 0xc9], &mut timing, &mut |_, _| {});
//! ```

pub mod channel;
pub mod error;
pub mod tables;

pub use channel::Mode as Cc608Mode;
pub use error::{Cc608Error, Result};

use cc_core::{
    parity::{check_parity, strip_parity, BAD_PARITY_SUBSTITUTE},
    DecoderStats, Subtitle,
};
use cc_timing::TimingContext;

use channel::ChannelState;

/// Control-code low byte constants, channel 1 header (spec.md §4.2.2).
/// Channel 2 shares these same `lo` values under header `0x1C/0x1D`.
mod lo {
    pub const RCL: u8 = 0x20;
    pub const BS: u8 = 0x21;
    pub const DER: u8 = 0x24;
    pub const RU2: u8 = 0x25;
    pub const RU3: u8 = 0x26;
    pub const RU4: u8 = 0x27;
    pub const RDC: u8 = 0x29;
    pub const RTD: u8 = 0x2B;
    pub const EDM: u8 = 0x2C;
    pub const CR: u8 = 0x2D;
    pub const ENM: u8 = 0x2E;
    pub const EOC: u8 = 0x2F;
}

/// Decodes one physical field's worth of line-21 data: its two
/// multiplexed channels, plus XDS-range recognition (spec.md §4.2,
/// §4.2.4).
pub struct Cc608Decoder {
    field: u8,
    channel1: ChannelState,
    channel2: ChannelState,
    /// Which channel the most recent control code addressed; printable
    /// pairs (no channel header of their own) follow this (spec.md
    /// §4.2.4: "a decoder instance filters to its own channel" — here
    /// one instance serves both channels of a field, so it tracks which
    /// one is currently selected instead).
    active_channel: u8,
    in_xds_mode: bool,
    last_pair: Option<(u8, u8)>,
    force_rollup: bool,
    stats: DecoderStats,
}

impl Cc608Decoder {
    /// `field` is 1 or 2 (which physical CC field this decoder reads).
    pub fn new(field: u8) -> Self {
        let (ch1, ch2) = if field == 1 { (1, 2) } else { (3, 4) };
        Self {
            field,
            channel1: ChannelState::new(ch1, field),
            channel2: ChannelState::new(ch2, field),
            active_channel: 1,
            in_xds_mode: false,
            last_pair: None,
            force_rollup: false,
            stats: DecoderStats::new(),
        }
    }

    /// Recoverable-error counters accumulated since construction
    /// (spec.md §7: bad parity substitutions and dropped pairs).
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Enable transcript mode: CR also flushes the current cursor line
    /// (spec.md §4.2.2 edge cases).
    pub fn set_transcript_mode(&mut self, enabled: bool) {
        self.channel1.transcript_mode = enabled;
        self.channel2.transcript_mode = enabled;
    }

    /// When set, `RU2` is treated as the non-standard `FakeRU1` (roll-up
    /// 1) instead of roll-up 2 (spec.md §4.2.2).
    pub fn set_force_rollup(&mut self, enabled: bool) {
        self.force_rollup = enabled;
    }

    /// Flush any in-progress screen on both channels (stream end).
    pub fn flush(&mut self, timing: &mut TimingContext) -> Vec<Subtitle> {
        let now = timing.get_fts(self.field);
        [self.channel1.flush(now), self.channel2.flush(now)]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Process a buffer of raw (still parity-bit-carrying) byte pairs.
    /// `xds_out` receives every byte pair recognized as XDS data or an
    /// XDS end-of-packet marker, forwarded verbatim for `cc-xds` to
    /// parse (spec.md §4.2, XDS bullets).
    pub fn process(
        &mut self,
        data: &[u8],
        timing: &mut TimingContext,
        xds_out: &mut dyn FnMut(u8, u8),
    ) -> Result<Vec<Subtitle>> {
        if data.len() % 2 != 0 {
            return Err(Cc608Error::OddLength(data.len()));
        }
        let mut out = Vec::new();
        for pair in data.chunks(2) {
            let (raw_hi, raw_lo) = (pair[0], pair[1]);
            // spec.md §7 BadParity: a bad byte_b drops the whole pair;
            // a bad byte_a alone is substituted with the solid-block
            // glyph and byte_b is still processed normally.
            if !check_parity(raw_lo) {
                self.stats.bad_parity += 1;
                self.stats.dropped_pairs += 1;
                continue;
            }
            let hi = if check_parity(raw_hi) {
                strip_parity(raw_hi)
            } else {
                self.stats.bad_parity += 1;
                BAD_PARITY_SUBSTITUTE
            };
            let lo = strip_parity(raw_lo);
            if let Some(sub) = self.process_pair(hi, lo, timing, xds_out) {
                out.push(sub);
            }
        }
        Ok(out)
    }

    fn process_pair(
        &mut self,
        hi: u8,
        lo: u8,
        timing: &mut TimingContext,
        xds_out: &mut dyn FnMut(u8, u8),
    ) -> Option<Subtitle> {
        if hi == 0 && lo == 0 {
            return None;
        }

        if self.in_xds_mode {
            if hi == 0x0F {
                self.in_xds_mode = false;
            }
            xds_out(hi, lo);
            return None;
        }

        if (0x01..=0x0E).contains(&hi) && self.field == 2 {
            self.in_xds_mode = true;
            xds_out(hi, lo);
            return None;
        }

        if (0x10..=0x1F).contains(&hi) {
            if self.last_pair == Some((hi, lo)) {
                self.last_pair = None;
                return None;
            }
            self.last_pair = Some((hi, lo));
            return self.dispatch_control(hi, lo, timing);
        }
        self.last_pair = None;

        if (0x20..=0x7F).contains(&hi) {
            self.write_printable_pair(hi, lo, timing);
        }

        None
    }

    fn active_channel_mut(&mut self) -> &mut ChannelState {
        if self.active_channel == 1 {
            &mut self.channel1
        } else {
            &mut self.channel2
        }
    }

    fn write_printable_pair(&mut self, hi: u8, lo: u8, timing: &mut TimingContext) {
        let field = self.field;
        if hi != 0 {
            let now = timing.get_fts(field);
            self.active_channel_mut()
                .write_char(hi as char, now, || timing.get_visible_start(field));
        }
        if lo != 0 {
            let now = timing.get_fts(field);
            self.active_channel_mut()
                .write_char(lo as char, now, || timing.get_visible_start(field));
        }
    }

    /// True when `hi` addresses channel 1 (0x10-0x17); false for
    /// channel 2 (0x18-0x1F). Extended-character codes (0x12/0x13) are
    /// channel-1-only per spec.md §4.2.4.
    fn channel_of(hi: u8) -> u8 {
        if (0x10..=0x17).contains(&hi) {
            1
        } else {
            2
        }
    }

    fn dispatch_control(&mut self, hi: u8, lo: u8, timing: &mut TimingContext) -> Option<Subtitle> {
        let field = self.field;
        let channel_no = Self::channel_of(hi);

        // Mid-row code: 0x10..0x17/0x18..0x1F, lo in 0x20..0x2F.
        // Tab offsets: 0x17/0x1F, lo in 0x21..0x23. Checked before the
        // broader mid-row range since both share header 0x17/0x1F.
        if (hi == 0x17 || hi == 0x1F) && (0x21..=0x23).contains(&lo) {
            self.active_channel = channel_no;
            let n = (lo - 0x20) as usize;
            self.active_channel_mut().tab_offset(n);
            return None;
        }

        if (0x20..=0x2F).contains(&lo) && !matches!(hi, 0x14 | 0x15 | 0x1C | 0x1D) {
            self.active_channel = channel_no;
            let attrs = tables::mid_row_attrs(lo);
            let now = timing.get_fts(field);
            let ch = self.active_channel_mut();
            ch.set_color_font(attrs);
            ch.write_transparent_space(now, || timing.get_visible_start(field));
            return None;
        }

        // Special character: hi in 0x11..0x17, lo in 0x30..0x3F.
        if (0x11..=0x17).contains(&hi) && (0x30..=0x3F).contains(&lo) {
            self.active_channel = channel_no;
            let idx = (lo - 0x30) as usize;
            let sym = tables::SPECIAL_CHARS[idx];
            let now = timing.get_fts(field);
            self.active_channel_mut()
                .write_char(sym, now, || timing.get_visible_start(field));
            return None;
        }

        // Extended character set: 0x12/0x13, lo in 0x20..0x3F (channel 1 only).
        if (hi == 0x12 || hi == 0x13) && (0x20..=0x3F).contains(&lo) {
            self.active_channel = 1;
            let idx = (lo - 0x20) as usize;
            let sym = if hi == 0x12 {
                tables::EXTENDED_CHARS_12[idx]
            } else {
                tables::EXTENDED_CHARS_13[idx]
            };
            let now = timing.get_fts(field);
            let ch = &mut self.channel1;
            ch.backspace();
            ch.write_char(sym, now, || timing.get_visible_start(field));
            return None;
        }

        // PAC: 0x10..0x17/0x18..0x1F, lo in 0x40..0x7F.
        if (0x40..=0x7F).contains(&lo) {
            self.active_channel = channel_no;
            if let Some(row) = tables::pac_row(hi, lo) {
                let attrs = tables::pac_attrs(lo);
                self.active_channel_mut().set_pac(row, attrs);
            }
            return None;
        }

        // Global commands: 0x14/0x15 (channel 1) / 0x1C/0x1D (channel
        // 2), lo in 0x20..0x2F.
        if matches!(hi, 0x14 | 0x15 | 0x1C | 0x1D) && (0x20..=0x2F).contains(&lo) {
            let channel_no = if matches!(hi, 0x14 | 0x15) { 1 } else { 2 };
            self.active_channel = channel_no;
            return self.dispatch_command(channel_no, lo, timing);
        }

        None
    }

    fn dispatch_command(&mut self, channel_no: u8, code: u8, timing: &mut TimingContext) -> Option<Subtitle> {
        let field = self.field;
        let force_rollup = self.force_rollup;
        let now = timing.get_fts(field);
        let ch = if channel_no == 1 {
            &mut self.channel1
        } else {
            &mut self.channel2
        };
        match code {
            lo::RCL => {
                ch.resume_caption_loading();
                None
            }
            lo::BS => {
                ch.backspace();
                None
            }
            lo::DER => {
                ch.delete_to_end_of_row();
                None
            }
            lo::RU2 => {
                if force_rollup {
                    ch.roll_up(1, now)
                } else {
                    ch.roll_up(2, now)
                }
            }
            lo::RU3 => ch.roll_up(3, now),
            lo::RU4 => ch.roll_up(4, now),
            lo::RDC => {
                ch.resume_direct_captioning();
                None
            }
            lo::RTD => {
                ch.resume_text_display();
                None
            }
            lo::EDM => ch.erase_displayed_memory(now),
            lo::CR => ch.carriage_return(now),
            lo::ENM => {
                ch.erase_non_displayed_memory();
                None
            }
            lo::EOC => {
                ch.end_of_caption(|| now);
                None
            }
            _ => None,
        }
    }
}
