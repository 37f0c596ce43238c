//! Per-service decoder: up to 8 windows plus the composed TV screen
//! (spec.md §3.3, §4.3.2–§4.3.4).

use cc_core::{Cc708Payload, Cc708Symbol, DecoderStats, Subtitle, SubtitleKind, SubtitlePayload};
use cc_timing::TimingContext;

use crate::charset;
use crate::error::{Cc708Error, Result};
use crate::pen::{PenAttrs, PenColor, WindowAttrs};
use crate::window::{DefineWindowParams, Window};

const NUM_WINDOWS: usize = 8;

mod c1 {
    pub const CW0: u8 = 0x80;
    pub const CW7: u8 = 0x87;
    pub const CLW: u8 = 0x88;
    pub const DSW: u8 = 0x89;
    pub const HDW: u8 = 0x8A;
    pub const TGW: u8 = 0x8B;
    pub const DLW: u8 = 0x8C;
    pub const DLY: u8 = 0x8D;
    pub const DLC: u8 = 0x8E;
    pub const RST: u8 = 0x8F;
    pub const SPA: u8 = 0x90;
    pub const SPC: u8 = 0x91;
    pub const SPL: u8 = 0x92;
    pub const SWA: u8 = 0x93;
    pub const DF0: u8 = 0x98;
    pub const DF7: u8 = 0x9F;
}

mod c0 {
    pub const NUL: u8 = 0x00;
    pub const ETX: u8 = 0x03;
    pub const BS: u8 = 0x08;
    pub const FF: u8 = 0x0C;
    pub const CR: u8 = 0x0D;
    pub const HCR: u8 = 0x0E;
    pub const EXT1: u8 = 0x10;
    pub const P16: u8 = 0x18;
}

/// One DTVCC service (up to 63 per decoder): its 8 windows, the
/// composited TV screen, and accumulated recoverable-error counters
/// (spec.md §3.3).
pub struct ServiceDecoder {
    pub service_number: u8,
    windows: Vec<Window>,
    current_window: Option<usize>,
    tv_screen: Cc708Payload,
    tv_screen_start_ms: Option<i64>,
    no_rollup: bool,
    stats: DecoderStats,
}

impl ServiceDecoder {
    pub fn new(service_number: u8) -> Self {
        Self {
            service_number,
            windows: (0..NUM_WINDOWS as u8).map(Window::new).collect(),
            current_window: None,
            tv_screen: Cc708Payload::blank(service_number),
            tv_screen_start_ms: None,
            no_rollup: false,
            stats: DecoderStats::new(),
        }
    }

    pub fn set_no_rollup(&mut self, enabled: bool) {
        self.no_rollup = enabled;
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// `RST`: full decoder reset (spec.md SPEC_FULL.md §4.3 supplement).
    pub fn reset(&mut self) {
        self.windows = (0..NUM_WINDOWS as u8).map(Window::new).collect();
        self.current_window = None;
        self.tv_screen = Cc708Payload::blank(self.service_number);
        self.tv_screen_start_ms = None;
    }

    fn current_window_mut(&mut self) -> Option<&mut Window> {
        self.current_window.map(|i| &mut self.windows[i])
    }

    /// Process one service block's bytes, emitting any subtitle that
    /// results from a window-hide compositing pass (spec.md §4.3.2).
    pub fn process_block(
        &mut self,
        block: &[u8],
        timing: &mut TimingContext,
    ) -> Result<Vec<Subtitle>> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < block.len() {
            let byte = block[i];
            i += 1;
            match byte {
                0x00..=0x1F => {
                    i = self.handle_c0(byte, block, i)?;
                }
                0x20..=0x7F => {
                    let ch = charset::g0(byte);
                    self.write_char(ch);
                }
                0x80..=0x9F => {
                    i = self.handle_c1(byte, block, i, timing, &mut out);
                }
                0xA0..=0xFF => {
                    let ch = charset::g1(byte);
                    self.write_char(ch);
                }
            }
        }
        Ok(out)
    }

    fn write_char(&mut self, ch: char) {
        if let Some(win) = self.current_window_mut() {
            win.write_symbol(ch as u16, 1);
        }
    }

    fn handle_c0(&mut self, byte: u8, block: &[u8], mut i: usize) -> Result<usize> {
        match byte {
            c0::NUL | c0::ETX => {}
            c0::BS => {
                if let Some(win) = self.current_window_mut() {
                    if win.pen_col > 0 {
                        win.pen_col -= 1;
                    }
                }
            }
            c0::FF => {
                if let Some(win) = self.current_window_mut() {
                    win.pen_row = 0;
                    win.pen_col = 0;
                }
            }
            c0::CR => {
                let no_rollup = self.no_rollup;
                if let Some(win) = self.current_window_mut() {
                    if win.pen_row + 1 < win.row_count as usize {
                        win.pen_row += 1;
                    } else {
                        win.scroll(no_rollup);
                    }
                    win.pen_col = 0;
                }
            }
            c0::HCR => {
                if let Some(win) = self.current_window_mut() {
                    let row = win.pen_row.min(crate::window::MAX_ROWS - 1);
                    if win.allocated {
                        win.rows[row]
                            .iter_mut()
                            .for_each(|c| *c = Cc708Symbol::default());
                    }
                    win.pen_col = 0;
                }
            }
            c0::P16 => {
                if i + 1 < block.len() {
                    let sym = ((block[i] as u16) << 8) | block[i + 1] as u16;
                    i += 2;
                    if let Some(win) = self.current_window_mut() {
                        win.write_symbol(sym, 2);
                    }
                } else {
                    self.stats.malformed_packets += 1;
                }
            }
            c0::EXT1 => {
                if i < block.len() {
                    let ext_byte = block[i];
                    i += 1;
                    i = self.handle_extended(ext_byte, block, i)?;
                }
            }
            _ => {
                self.stats.unknown_command += 1;
            }
        }
        Ok(i)
    }

    fn handle_extended(&mut self, ext_byte: u8, block: &[u8], mut i: usize) -> Result<usize> {
        match ext_byte {
            // C2: reserved, length 1/2/3/4 bytes based on sub-range
            // (spec.md §4.3.2 table, byte value already consumed above).
            0x00..=0x1F => {
                let extra = match ext_byte {
                    0x00..=0x07 => 0,
                    0x08..=0x0F => 1,
                    0x10..=0x17 => 2,
                    _ => 3,
                };
                i = (i + extra).min(block.len());
                self.stats.unknown_command += 1;
            }
            // G2: extended misc glyphs, one byte each.
            0x20..=0x7F => {
                let ch = charset::g2(ext_byte);
                self.write_char(ch);
            }
            // C3: reserved, variable length (spec.md §4.3.2 table,
            // §7 UnknownCommand). 0x80-0x87 => 4 extra bytes,
            // 0x88-0x8F => 5 extra bytes, 0x90-0x9F => an explicit
            // length byte follows.
            0x80..=0x9F => {
                let extra = match ext_byte {
                    0x80..=0x87 => 4,
                    0x88..=0x8F => 5,
                    _ => {
                        if i >= block.len() {
                            return Err(Cc708Error::UnsupportedSample {
                                service: self.service_number,
                            });
                        }
                        let len = block[i] as usize;
                        i += 1;
                        len
                    }
                };
                if i + extra > block.len() {
                    return Err(Cc708Error::UnsupportedSample {
                        service: self.service_number,
                    });
                }
                i += extra;
                self.stats.unknown_command += 1;
            }
            // G3: CC logo at 0xA0, everything else reserved.
            0xA0..=0xFF => {
                let ch = charset::g3(ext_byte);
                self.write_char(ch);
            }
        }
        Ok(i)
    }

    fn handle_c1(
        &mut self,
        byte: u8,
        block: &[u8],
        mut i: usize,
        timing: &mut TimingContext,
        out: &mut Vec<Subtitle>,
    ) -> usize {
        let remaining = block.len() - i;
        match byte {
            c1::CW0..=c1::CW7 => {
                let n = (byte - c1::CW0) as usize;
                self.current_window = Some(n);
            }
            c1::CLW | c1::DSW | c1::HDW | c1::TGW | c1::DLW => {
                if remaining < 1 {
                    self.stats.malformed_packets += 1;
                    return block.len();
                }
                let bitmap = block[i];
                i += 1;
                self.apply_window_bitmap(byte, bitmap, timing, out);
            }
            c1::DLY => {
                if remaining < 1 {
                    self.stats.malformed_packets += 1;
                    return block.len();
                }
                // spec.md §9 Open Question: DLY/DLC accepted, never
                // enforced.
                i += 1;
            }
            c1::DLC | c1::RST => {
                if byte == c1::RST {
                    self.reset();
                }
            }
            c1::SPA => {
                if remaining < 2 {
                    self.stats.malformed_packets += 1;
                    return block.len();
                }
                let attrs = PenAttrs::parse(block[i], block[i + 1]);
                i += 2;
                if let Some(win) = self.current_window_mut() {
                    win.current_pen_attrs = attrs;
                }
            }
            c1::SPC => {
                if remaining < 3 {
                    self.stats.malformed_packets += 1;
                    return block.len();
                }
                let color = PenColor::parse(block[i], block[i + 1], block[i + 2]);
                i += 3;
                if let Some(win) = self.current_window_mut() {
                    win.current_pen_color = color;
                }
            }
            c1::SPL => {
                if remaining < 2 {
                    self.stats.malformed_packets += 1;
                    return block.len();
                }
                let (row, col) = (block[i] & 0x0F, block[i + 1] & 0x3F);
                i += 2;
                if let Some(win) = self.current_window_mut() {
                    win.pen_row = (row as usize).min(crate::window::MAX_ROWS - 1);
                    win.pen_col = (col as usize).min(crate::window::MAX_COLS - 1);
                }
            }
            c1::SWA => {
                if remaining < 4 {
                    self.stats.malformed_packets += 1;
                    return block.len();
                }
                let attrs = WindowAttrs::parse(block[i], block[i + 1], block[i + 2], block[i + 3]);
                i += 4;
                if let Some(win) = self.current_window_mut() {
                    win.attrs = attrs;
                }
            }
            c1::DF0..=c1::DF7 => {
                if remaining < 6 {
                    self.stats.malformed_packets += 1;
                    return block.len();
                }
                let n = (byte - c1::DF0) as usize;
                let mut raw = [0u8; 6];
                raw.copy_from_slice(&block[i..i + 6]);
                i += 6;
                let params = DefineWindowParams::parse(raw);
                self.windows[n].define(params);
                self.current_window = Some(n);
            }
            _ => {
                self.stats.unknown_command += 1;
            }
        }
        i
    }

    fn apply_window_bitmap(
        &mut self,
        op: u8,
        bitmap: u8,
        timing: &mut TimingContext,
        out: &mut Vec<Subtitle>,
    ) {
        for n in 0..NUM_WINDOWS {
            if (bitmap >> n) & 1 == 0 {
                continue;
            }
            let was_visible = self.windows[n].visible;
            let target_visible = match op {
                c1::DSW => true,
                c1::HDW => false,
                c1::TGW => !was_visible,
                c1::CLW => {
                    self.windows[n].clear();
                    continue;
                }
                c1::DLW => {
                    let number = self.windows[n].number;
                    self.windows[n] = Window::new(number);
                    continue;
                }
                _ => was_visible,
            };
            if target_visible == was_visible {
                continue;
            }
            self.windows[n].visible = target_visible;
            if target_visible {
                self.windows[n].time_ms_show = Some(timing.get_visible_start(3));
            } else {
                self.windows[n].time_ms_hide = Some(timing.get_visible_end(3));
                self.composite_window(n, timing, out);
            }
        }
    }

    /// Copy a hidden window's rows into the TV grid (spec.md §4.3.4);
    /// if no window remains visible afterwards, emit the grid.
    fn composite_window(&mut self, n: usize, timing: &mut TimingContext, out: &mut Vec<Subtitle>) {
        let win = &self.windows[n];
        if win.is_empty() {
            return;
        }
        let (top, left) = win.composited_origin();
        if self.tv_screen_start_ms.is_none() {
            self.tv_screen_start_ms = win.time_ms_show;
        }
        for (r, row) in win.rows.iter().take(win.row_count as usize).enumerate() {
            for (c, sym) in row.iter().take(win.col_count as usize).enumerate() {
                if sym.len == 0 {
                    continue;
                }
                let (tr, tc) = (top + r, left + c);
                if tr < self.tv_screen.rows.len() && tc < self.tv_screen.rows[0].len() {
                    self.tv_screen.rows[tr][tc] = *sym;
                }
            }
        }
        if self.windows.iter().all(|w| !w.visible) {
            self.flush_tv_screen(timing, out);
        }
    }

    fn flush_tv_screen(&mut self, timing: &mut TimingContext, out: &mut Vec<Subtitle>) {
        if self.tv_screen.rows.iter().all(|r| r.iter().all(|c| c.len == 0)) {
            self.tv_screen = Cc708Payload::blank(self.service_number);
            self.tv_screen_start_ms = None;
            return;
        }
        let start = self.tv_screen_start_ms.unwrap_or_else(|| timing.get_fts(3));
        let end = timing.get_visible_end(3);
        let payload = std::mem::replace(&mut self.tv_screen, Cc708Payload::blank(self.service_number));
        self.tv_screen_start_ms = None;
        let mut sub = Subtitle::new(SubtitleKind::Cc708, start, end, SubtitlePayload::Cc708(payload));
        sub.channel = Some(self.service_number);
        sub.field = Some(3);
        out.push(sub);
    }

    /// Explicit flush: emit whatever is currently composited (stream
    /// end / service teardown).
    pub fn flush(&mut self, timing: &mut TimingContext) -> Vec<Subtitle> {
        let mut out = Vec::new();
        for n in 0..NUM_WINDOWS {
            if self.windows[n].visible {
                self.windows[n].time_ms_hide = Some(timing.get_visible_end(3));
                self.composite_window(n, timing, &mut out);
            }
        }
        self.flush_tv_screen(timing, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_hello() -> Vec<u8> {
        let mut b = vec![0x98u8]; // DF0
        b.extend_from_slice(&[0x38, 0x00, 0x00, 0x00, 0x3F, 0x00]);
        b.push(0x80); // CW0
        b.extend_from_slice(b"Hello");
        b
    }

    /// spec.md §8.2 scenario S3: define a window, select it, write
    /// "Hello", then hide it and expect exactly one emitted subtitle.
    #[test]
    fn hello_window_emits_on_hide() {
        let mut svc = ServiceDecoder::new(1);
        let mut timing = TimingContext::new();
        timing.set_current_pts(90_000);
        timing.set_fts();

        let block = block_hello();
        let subs = svc.process_block(&block, &mut timing).unwrap();
        assert!(subs.is_empty(), "writing text alone doesn't emit");

        // HDW bitmap 0x01 (window 0)
        let hide = [c1::HDW, 0x01];
        let subs = svc.process_block(&hide, &mut timing).unwrap();
        assert_eq!(subs.len(), 1);
        match &subs[0].payload {
            cc_core::SubtitlePayload::Cc708(p) => assert!(p.to_text().contains("Hello")),
            _ => panic!("expected Cc708 payload"),
        }
    }

    #[test]
    fn rst_clears_all_windows() {
        let mut svc = ServiceDecoder::new(1);
        let mut timing = TimingContext::new();
        timing.set_current_pts(90_000);
        timing.set_fts();
        let _ = svc.process_block(&block_hello(), &mut timing).unwrap();
        let rst = [c1::RST];
        let _ = svc.process_block(&rst, &mut timing).unwrap();
        assert!(svc.current_window.is_none());
        assert!(!svc.windows[0].allocated);
    }

    #[test]
    fn p16_writes_two_byte_symbol() {
        let mut svc = ServiceDecoder::new(1);
        let mut timing = TimingContext::new();
        timing.set_current_pts(90_000);
        timing.set_fts();
        let mut block = vec![0x98u8, 0x38, 0x00, 0x00, 0x00, 0x3F, 0x00, 0x80]; // DF0 + CW0
        block.push(c0::P16);
        block.push(0x30);
        block.push(0x42);
        let _ = svc.process_block(&block, &mut timing).unwrap();
        let win = &svc.windows[0];
        assert_eq!(win.rows[0][0].len, 2);
        assert_eq!(win.rows[0][0].sym, 0x3042);
    }
}
