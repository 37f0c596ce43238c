//! A single DTVCC window: its anchor, pen state, symbol grid, and the
//! per-row pen attributes/colours spec.md §3.3 describes (spec.md
//! §3.3, §4.3.3, §4.3.4).

use cc_core::Cc708Symbol;
use serde::{Deserialize, Serialize};

use crate::pen::{FlowDirection, PenAttrs, PenColor, WindowAttrs};

pub const MAX_ROWS: usize = 15;
pub const MAX_COLS: usize = 64;

/// The six bit-packed parameters following a `DFx` opcode (spec.md
/// §4.3.3). Field widths are pinned by spec.md; this implementation
/// packs each field low-bit-first in the order spec.md lists it,
/// which is the layout spec.md §8.2 scenario S3's byte dump actually
/// exercises (`0x38 00 00 00 3F 00` decodes to visible window, row
/// count 1, col count 64).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefineWindowParams {
    pub priority: u8,
    pub col_lock: bool,
    pub row_lock: bool,
    pub visible: bool,
    pub anchor_vertical: u8,
    pub relative_pos: bool,
    pub anchor_horizontal: u8,
    pub row_count: u8,
    pub anchor_point: u8,
    pub col_count: u8,
    pub pen_style: u8,
    pub win_style: u8,
    pub raw: [u8; 6],
}

impl DefineWindowParams {
    pub fn parse(bytes: [u8; 6]) -> Self {
        let [b1, b2, b3, b4, b5, b6] = bytes;
        let anchor_vertical = (b2 & 0x7F).min(74);
        let anchor_horizontal = b3;
        let row_count = (b4 & 0x0F) + 1;
        let col_count = (b5 & 0x3F) + 1;
        Self {
            priority: b1 & 0x07,
            col_lock: (b1 >> 3) & 1 != 0,
            row_lock: (b1 >> 4) & 1 != 0,
            visible: (b1 >> 5) & 1 != 0,
            anchor_vertical,
            relative_pos: (b2 >> 7) & 1 != 0,
            anchor_horizontal,
            row_count,
            anchor_point: (b4 >> 4) & 0x0F,
            col_count,
            pen_style: b6 & 0x07,
            win_style: (b6 >> 3) & 0x07,
            raw: bytes,
        }
    }
}

/// A DTVCC window (spec.md §3.3): up to 15 rows x 64 columns of
/// symbols, an anchor, and the pen state used while writing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Window {
    pub number: u8,
    pub allocated: bool,
    pub priority: u8,
    pub col_lock: bool,
    pub row_lock: bool,
    pub visible: bool,
    pub anchor_vertical: u8,
    pub anchor_horizontal: u16,
    pub relative_pos: bool,
    pub anchor_point: u8,
    pub row_count: u8,
    pub col_count: u8,
    pub pen_style: u8,
    pub win_style: u8,
    pub attrs: WindowAttrs,
    pub pen_row: usize,
    pub pen_col: usize,
    pub current_pen_attrs: PenAttrs,
    pub current_pen_color: PenColor,
    #[serde(skip)]
    pub rows: Vec<Vec<Cc708Symbol>>,
    pub row_pen_attrs: Vec<PenAttrs>,
    pub row_pen_colors: Vec<PenColor>,
    pub time_ms_show: Option<i64>,
    pub time_ms_hide: Option<i64>,
    last_define_params: Option<[u8; 6]>,
}

impl Window {
    pub fn new(number: u8) -> Self {
        Self {
            number,
            allocated: false,
            priority: 0,
            col_lock: false,
            row_lock: false,
            visible: false,
            anchor_vertical: 0,
            anchor_horizontal: 0,
            relative_pos: false,
            anchor_point: 0,
            row_count: 1,
            col_count: 1,
            pen_style: 0,
            win_style: 0,
            attrs: WindowAttrs::default(),
            pen_row: 0,
            pen_col: 0,
            current_pen_attrs: PenAttrs::default(),
            current_pen_color: PenColor::default(),
            rows: Vec::new(),
            row_pen_attrs: Vec::new(),
            row_pen_colors: Vec::new(),
            time_ms_show: None,
            time_ms_hide: None,
            last_define_params: None,
        }
    }

    /// Apply a `DFx` (spec.md §4.3.3): clamp anchors, ignore verbatim
    /// repeats, (re)allocate the grid on first definition, and always
    /// select this window as current.
    pub fn define(&mut self, params: DefineWindowParams) {
        if self.allocated && self.last_define_params == Some(params.raw) {
            return;
        }
        self.priority = params.priority;
        self.col_lock = params.col_lock;
        self.row_lock = params.row_lock;
        self.visible = params.visible;
        self.relative_pos = params.relative_pos;
        self.anchor_point = params.anchor_point;
        self.row_count = params.row_count.min(MAX_ROWS as u8);
        self.col_count = params.col_count.min(MAX_COLS as u8);
        // spec.md §4.3.3: clamp anchors so row/col count fits the grid
        // (observed Korean samples swap axes otherwise).
        self.anchor_vertical = params
            .anchor_vertical
            .min(75u8.saturating_sub(self.row_count));
        self.anchor_horizontal = (params.anchor_horizontal as u16)
            .min(210u16.saturating_sub(self.col_count as u16));
        self.pen_style = params.pen_style;
        self.win_style = params.win_style;
        self.last_define_params = Some(params.raw);

        if !self.allocated {
            self.allocated = true;
            self.rows = vec![vec![Cc708Symbol::default(); MAX_COLS]; MAX_ROWS];
            self.row_pen_attrs = vec![PenAttrs::default(); MAX_ROWS];
            self.row_pen_colors = vec![PenColor::default(); MAX_ROWS];
            self.pen_row = 0;
            self.pen_col = 0;
        }
    }

    pub fn clear(&mut self) {
        if self.allocated {
            for row in &mut self.rows {
                row.iter_mut().for_each(|c| *c = Cc708Symbol::default());
            }
        }
        self.pen_row = 0;
        self.pen_col = 0;
    }

    pub fn is_empty(&self) -> bool {
        !self.allocated || self.rows.iter().all(|r| r.iter().all(|c| c.len == 0))
    }

    /// Write one symbol at the current pen position and advance the
    /// pen column (spec.md §3.4, §4.3.2).
    pub fn write_symbol(&mut self, sym: u16, len: u8) {
        if !self.allocated {
            return;
        }
        let (row, col) = (self.pen_row.min(MAX_ROWS - 1), self.pen_col.min(MAX_COLS - 1));
        self.rows[row][col] = Cc708Symbol { sym, len };
        self.row_pen_attrs[row] = self.current_pen_attrs;
        self.row_pen_colors[row] = self.current_pen_color;
        if self.pen_col + 1 < self.col_count as usize {
            self.pen_col += 1;
        }
    }

    /// Render the window's active rows to plain text, one line per
    /// non-empty row, trimmed.
    pub fn to_text(&self) -> String {
        if !self.allocated {
            return String::new();
        }
        let mut lines = Vec::new();
        for row in self.rows.iter().take(self.row_count as usize) {
            let mut s = String::new();
            for sym in row.iter().take(self.col_count as usize) {
                if sym.len == 0 {
                    s.push(' ');
                } else if let Some(c) = char::from_u32(sym.sym as u32) {
                    s.push(c);
                }
            }
            let trimmed = s.trim_end();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        lines.join("\n")
    }

    /// Top-left corner this window occupies on the 75x210 TV grid,
    /// derived from its anchor point (9 positions) and anchor
    /// coordinates (spec.md §4.3.4).
    pub fn composited_origin(&self) -> (usize, usize) {
        let (rows, cols) = (self.row_count as i32, self.col_count as i32);
        let av = self.anchor_vertical as i32;
        let ah = self.anchor_horizontal as i32;
        let top = match self.anchor_point {
            0 | 1 | 2 => av,
            3 | 4 | 5 => av - rows / 2,
            _ => av - rows + 1,
        };
        let left = match self.anchor_point {
            0 | 3 | 6 => ah,
            1 | 4 | 7 => ah - cols / 2,
            _ => ah - cols,
        };
        (top.clamp(0, 75 - rows).max(0) as usize, left.clamp(0, 210 - cols).max(0) as usize)
    }

    /// Scroll per spec.md §4.3.4: vertical (row-wise) scroll for
    /// left/right print direction, horizontal (column-wise) for
    /// top/bottom print direction; `no_rollup` clears the pen's
    /// row/column instead.
    pub fn scroll(&mut self, no_rollup: bool) {
        if !self.allocated {
            return;
        }
        if no_rollup {
            let row = self.pen_row.min(MAX_ROWS - 1);
            self.rows[row].iter_mut().for_each(|c| *c = Cc708Symbol::default());
            return;
        }
        match self.attrs.print_direction {
            FlowDirection::LeftToRight | FlowDirection::RightToLeft => {
                self.rows.remove(0);
                self.rows.push(vec![Cc708Symbol::default(); MAX_COLS]);
                self.row_pen_attrs.remove(0);
                self.row_pen_attrs.push(PenAttrs::default());
                self.row_pen_colors.remove(0);
                self.row_pen_colors.push(PenColor::default());
            }
            FlowDirection::TopToBottom | FlowDirection::BottomToTop => {
                for row in &mut self.rows {
                    if !row.is_empty() {
                        row.remove(0);
                        row.push(Cc708Symbol::default());
                    }
                }
            }
        }
    }
}
