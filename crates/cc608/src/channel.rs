//! Per-channel screen-buffer state machine (spec.md §3.2, §4.2.2,
//! §4.2.3). A `ChannelState` owns the two 15x32 grids for one logical
//! channel (CC1/CC2 on field 1, CC3/CC4 on field 2) and every piece of
//! state the command table in §4.2.2 mutates.

use cc_core::{
    Cc608Cell, Cc608Color, Cc608Font, Cc608Payload, Subtitle, SubtitleKind, SubtitlePayload,
    CC608_COLS, CC608_ROWS,
};

use crate::tables::PacAttrs;

pub const ROWS: usize = CC608_ROWS;
pub const COLS: usize = CC608_COLS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    PopOn,
    RollUp(u8),
    PaintOn,
    Text,
}

pub struct ChannelState {
    pub channel: u8,
    pub field: u8,
    buffer1: Cc608Payload,
    buffer2: Cc608Payload,
    /// Which buffer is currently on screen: 1 or 2.
    visible_buffer: u8,
    pub mode: Mode,
    cursor_row: usize,
    cursor_column: usize,
    cursor_set_by_pac: bool,
    current_color: Cc608Color,
    current_font: Cc608Font,
    /// Set right after a pop-on -> roll-up transition so the first
    /// written character does not re-derive `current_visible_start_ms`
    /// (spec.md §4.2.3 step 4).
    rollup_from_popon: bool,
    current_visible_start_ms: i64,
    ts_start_of_current_line: i64,
    ts_last_char_received: i64,
    pub transcript_mode: bool,
}

impl ChannelState {
    pub fn new(channel: u8, field: u8) -> Self {
        Self {
            channel,
            field,
            buffer1: Cc608Payload::blank(),
            buffer2: Cc608Payload::blank(),
            visible_buffer: 1,
            mode: Mode::PopOn,
            cursor_row: 14,
            cursor_column: 0,
            cursor_set_by_pac: false,
            current_color: Cc608Color::White,
            current_font: Cc608Font::Regular,
            rollup_from_popon: false,
            current_visible_start_ms: -1,
            ts_start_of_current_line: -1,
            ts_last_char_received: -1,
            transcript_mode: false,
        }
    }

    fn visible(&self) -> &Cc608Payload {
        if self.visible_buffer == 1 {
            &self.buffer1
        } else {
            &self.buffer2
        }
    }

    fn visible_mut(&mut self) -> &mut Cc608Payload {
        if self.visible_buffer == 1 {
            &mut self.buffer1
        } else {
            &mut self.buffer2
        }
    }

    fn writing_mut(&mut self) -> &mut Cc608Payload {
        match self.mode {
            Mode::PopOn => {
                if self.visible_buffer == 1 {
                    &mut self.buffer2
                } else {
                    &mut self.buffer1
                }
            }
            Mode::RollUp(_) | Mode::PaintOn | Mode::Text => self.visible_mut(),
        }
    }

    fn emit_screen(&self, payload: Cc608Payload, start_ms: i64, end_ms: i64) -> Option<Subtitle> {
        if payload.is_empty() {
            return None;
        }
        let mut sub = Subtitle::new(SubtitleKind::Cc608, start_ms, end_ms, SubtitlePayload::Cc608(payload));
        sub.channel = Some(self.channel);
        sub.field = Some(self.field);
        sub.mode = Some(match self.mode {
            Mode::PopOn => "pop-on".into(),
            Mode::RollUp(n) => format!("roll-up-{n}"),
            Mode::PaintOn => "paint-on".into(),
            Mode::Text => "text".into(),
        });
        Some(sub)
    }

    /// §4.2.3 character write. `now_ms` is the FTS at the current field.
    pub fn write_char(&mut self, ch: char, now_ms: i64, visible_start_fn: impl FnOnce() -> i64) {
        if self.cursor_row >= ROWS || self.cursor_column >= COLS {
            return;
        }
        let was_empty = self.visible().is_empty();
        let (row, col, color, font) = (self.cursor_row, self.cursor_column, self.current_color, self.current_font);
        {
            let buf = self.writing_mut();
            buf.rows[row].used = true;
            buf.rows[row].cells[col] = Cc608Cell { ch, color, font };
        }
        if was_empty && self.mode != Mode::PopOn && !self.rollup_from_popon {
            self.current_visible_start_ms = visible_start_fn();
        }
        self.rollup_from_popon = false;
        if self.cursor_column < COLS - 1 {
            self.cursor_column += 1;
        }
        if self.ts_start_of_current_line < 0 {
            self.ts_start_of_current_line = now_ms;
        }
        self.ts_last_char_received = now_ms;
    }

    /// Write a transparent space (mid-row codes still move the cursor).
    pub fn write_transparent_space(&mut self, now_ms: i64, visible_start_fn: impl FnOnce() -> i64) {
        self.write_char(' ', now_ms, visible_start_fn);
    }

    pub fn set_color_font(&mut self, attrs: PacAttrs) {
        self.current_color = attrs.color;
        self.current_font = attrs.font;
    }

    pub fn set_pac(&mut self, row: u8, attrs: PacAttrs) {
        self.cursor_row = (row.saturating_sub(1)) as usize;
        self.cursor_column = attrs.indent as usize;
        self.cursor_set_by_pac = true;
        self.current_color = attrs.color;
        self.current_font = attrs.font;
        if let Mode::RollUp(_) = self.mode {
            let row_idx = self.cursor_row;
            let buf = self.visible_mut();
            for r in (row_idx + 1)..ROWS {
                buf.rows[r] = cc_core::Cc608Row::blank();
            }
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor_column > 0 {
            self.cursor_column -= 1;
        }
        let (row, col) = (self.cursor_row, self.cursor_column);
        if row < ROWS {
            let buf = self.writing_mut();
            buf.rows[row].cells[col] = Cc608Cell::default();
        }
    }

    pub fn delete_to_end_of_row(&mut self) {
        let (row, col) = (self.cursor_row, self.cursor_column);
        if row < ROWS {
            let buf = self.writing_mut();
            for c in col..COLS {
                buf.rows[row].cells[c] = Cc608Cell::default();
            }
        }
    }

    pub fn tab_offset(&mut self, n: usize) {
        self.cursor_column = (self.cursor_column + n).min(COLS - 1);
    }

    /// EDM: emit the visible screen (if non-empty), then clear it.
    pub fn erase_displayed_memory(&mut self, now_ms: i64) -> Option<Subtitle> {
        let start = if self.current_visible_start_ms >= 0 {
            self.current_visible_start_ms
        } else {
            now_ms
        };
        let screen = self.visible().clone();
        let sub = self.emit_screen(screen, start, now_ms);
        *self.visible_mut() = Cc608Payload::blank();
        self.current_visible_start_ms = -1;
        sub
    }

    /// ENM: clear the non-displayed (writing, in pop-on) buffer.
    pub fn erase_non_displayed_memory(&mut self) {
        match self.mode {
            Mode::PopOn => {
                if self.visible_buffer == 1 {
                    self.buffer2 = Cc608Payload::blank();
                } else {
                    self.buffer1 = Cc608Payload::blank();
                }
            }
            _ => {
                *self.visible_mut() = Cc608Payload::blank();
            }
        }
    }

    /// EOC: swap buffers, returning the new visible-start timestamp.
    pub fn end_of_caption(&mut self, visible_start_fn: impl FnOnce() -> i64) {
        self.visible_buffer = if self.visible_buffer == 1 { 2 } else { 1 };
        self.current_visible_start_ms = visible_start_fn();
        self.cursor_row = 14;
        self.cursor_column = 0;
        self.cursor_set_by_pac = false;
    }

    fn flush_and_clear_both(&mut self, now_ms: i64) -> Option<Subtitle> {
        let start = if self.current_visible_start_ms >= 0 {
            self.current_visible_start_ms
        } else {
            now_ms
        };
        let screen = self.visible().clone();
        let sub = self.emit_screen(screen, start, now_ms);
        self.buffer1 = Cc608Payload::blank();
        self.buffer2 = Cc608Payload::blank();
        self.current_visible_start_ms = -1;
        sub
    }

    /// RCL: resume caption loading (pop-on).
    pub fn resume_caption_loading(&mut self) {
        self.mode = Mode::PopOn;
    }

    /// RDC: resume direct captioning (paint-on).
    pub fn resume_direct_captioning(&mut self) {
        self.mode = Mode::PaintOn;
    }

    /// RTD: resume text display.
    pub fn resume_text_display(&mut self) {
        self.mode = Mode::Text;
    }

    /// RUx / FakeRU1: roll-up N, per spec.md §4.2.2's edge case that
    /// pop-on/paint-on -> roll-up erases previously displayed text.
    pub fn roll_up(&mut self, n: u8, now_ms: i64) -> Option<Subtitle> {
        let prior_was_pop_or_paint = matches!(self.mode, Mode::PopOn | Mode::PaintOn);
        let sub = if prior_was_pop_or_paint {
            self.flush_and_clear_both(now_ms)
        } else {
            None
        };
        self.mode = Mode::RollUp(n);
        if prior_was_pop_or_paint {
            self.rollup_from_popon = true;
        }
        if !self.cursor_set_by_pac {
            self.cursor_row = 14;
            self.cursor_column = 0;
        }
        sub
    }

    /// CR (roll-up only): scroll the visible buffer up by the active
    /// roll-up count, emitting the outgoing screen first.
    pub fn carriage_return(&mut self, now_ms: i64) -> Option<Subtitle> {
        let n = match self.mode {
            Mode::RollUp(n) => n as usize,
            _ => return None,
        };
        let bottom_used = self.visible().rows[14].used;
        let sub = if bottom_used {
            let start = if self.current_visible_start_ms >= 0 {
                self.current_visible_start_ms
            } else {
                now_ms
            };
            let screen = self.visible().clone();
            self.emit_screen(screen, start, now_ms)
        } else {
            None
        };
        let buf = self.visible_mut();
        for _ in 0..n.max(1) {
            buf.rows.remove(0);
            buf.rows.push(cc_core::Cc608Row::blank());
        }
        self.cursor_column = 0;
        self.current_visible_start_ms = now_ms;
        self.ts_start_of_current_line = -1;
        sub
    }

    /// Explicit flush for stream end / file boundary.
    pub fn flush(&mut self, now_ms: i64) -> Option<Subtitle> {
        match self.mode {
            Mode::PopOn => self.emit_screen(self.visible().clone(), self.current_visible_start_ms.max(0), now_ms),
            _ => self.flush_and_clear_both(now_ms),
        }
        .filter(|s| !matches!(&s.payload, SubtitlePayload::Cc608(p) if p.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_on_writes_to_hidden_buffer() {
        let mut ch = ChannelState::new(1, 1);
        ch.write_char('H', 100, || 100);
        assert!(ch.visible().is_empty());
    }

    #[test]
    fn eoc_reveals_written_text() {
        let mut ch = ChannelState::new(1, 1);
        ch.set_pac(15, PacAttrs { color: Cc608Color::White, font: Cc608Font::Regular, indent: 0 });
        ch.write_char('H', 100, || 100);
        ch.write_char('I', 100, || 100);
        ch.end_of_caption(|| 150);
        assert_eq!(ch.visible().rows[14].text(), "HI");
    }

    #[test]
    fn roll_up_writes_directly_to_visible_buffer() {
        let mut ch = ChannelState::new(1, 1);
        ch.roll_up(2, 0);
        ch.write_char('A', 10, || 10);
        assert!(!ch.visible().is_empty());
    }

    #[test]
    fn backspace_clears_previous_cell() {
        let mut ch = ChannelState::new(1, 1);
        ch.roll_up(2, 0);
        ch.write_char('A', 10, || 10);
        ch.backspace();
        assert_eq!(ch.visible().rows[14].text(), "");
    }
}
