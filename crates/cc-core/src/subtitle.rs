//! The `Subtitle` record: the only type that crosses the core boundary.
//!
//! Every decoder (608, 708, VOBSUB, XDS, the sentence re-chunker) speaks
//! this type and nothing else to its caller. See the component design
//! docs for which crate produces which `SubtitlePayload` variant.

use serde::{Deserialize, Serialize};

/// Number of rows in a CC608 screen buffer (CEA-608-C Table 6).
pub const CC608_ROWS: usize = 15;
/// Number of columns in a CC608 screen buffer.
pub const CC608_COLS: usize = 32;

/// Rows in a CEA-708 TV screen composition grid.
pub const CC708_TV_ROWS: usize = 75;
/// Columns in a CEA-708 TV screen composition grid.
pub const CC708_TV_COLS: usize = 210;

/// Tag identifying which decoder produced a `Subtitle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubtitleKind {
    /// EIA/CEA-608 line-21 screen.
    Cc608,
    /// CEA-708 (DTVCC) composed TV screen.
    Cc708,
    /// DVD/VOBSUB indexed bitmap.
    Bitmap,
    /// Plain UTF-8 text (e.g. sentence re-chunker output).
    Text,
    /// Raw byte blob, used for RCWT pass-through.
    Raw,
    /// XDS (eXtended Data Services) metadata event.
    Xds,
}

/// CEA-608 4-bit colour index (CEA-608-C Table 6/68).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cc608Color {
    White,
    Green,
    Blue,
    Cyan,
    Red,
    Yellow,
    Magenta,
    UserDefined,
    Black,
    Transparent,
}

impl Default for Cc608Color {
    fn default() -> Self {
        Cc608Color::White
    }
}

/// CEA-608 2-bit font/style index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cc608Font {
    Regular,
    Italics,
    Underlined,
    UnderlinedItalics,
}

impl Default for Cc608Font {
    fn default() -> Self {
        Cc608Font::Regular
    }
}

/// A single CC608 screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cc608Cell {
    pub ch: char,
    pub color: Cc608Color,
    pub font: Cc608Font,
}

impl Default for Cc608Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            color: Cc608Color::default(),
            font: Cc608Font::default(),
        }
    }
}

/// One row of a CC608 screen buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cc608Row {
    pub used: bool,
    pub cells: Vec<Cc608Cell>,
}

impl Cc608Row {
    pub fn blank() -> Self {
        Self {
            used: false,
            cells: vec![Cc608Cell::default(); CC608_COLS],
        }
    }

    /// Render the row, trimming trailing spaces.
    pub fn text(&self) -> String {
        let s: String = self.cells.iter().map(|c| c.ch).collect();
        s.trim_end().to_string()
    }
}

/// A completed CC608 screen, emitted on EOC / erase-displayed-memory /
/// a roll-up scroll / explicit flush (spec.md §3.2, §4.2.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cc608Payload {
    pub rows: Vec<Cc608Row>,
}

impl Cc608Payload {
    pub fn blank() -> Self {
        Self {
            rows: (0..CC608_ROWS).map(|_| Cc608Row::blank()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| !r.used)
    }
}

/// A single CEA-708 composition cell (spec.md §3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cc708Symbol {
    pub sym: u16,
    pub len: u8,
}

impl Default for Cc708Symbol {
    fn default() -> Self {
        Self { sym: 0, len: 0 }
    }
}

/// A composed CEA-708 TV screen, emitted when a window-copy occludes
/// every visible window (spec.md §4.3.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cc708Payload {
    pub service_number: u8,
    pub rows: Vec<Vec<Cc708Symbol>>,
}

impl Cc708Payload {
    pub fn blank(service_number: u8) -> Self {
        Self {
            service_number,
            rows: vec![vec![Cc708Symbol::default(); CC708_TV_COLS]; CC708_TV_ROWS],
        }
    }

    /// Render the grid to plain text, one line per non-empty row, trimmed.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        for row in &self.rows {
            let mut s = String::new();
            for sym in row {
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
}

/// A DVD/VOBSUB indexed bitmap (spec.md §3.5, §4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitmapPayload {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    /// Indexed pixel plane, `w * h` bytes, row-major.
    pub pixels: Vec<u8>,
    /// RGBA palette, up to 256 entries.
    pub palette: Vec<[u8; 4]>,
    /// OCR text, populated by an external collaborator.
    pub ocr_text: Option<String>,
}

/// One typed XDS event (spec.md §4.4). `cc-xds` owns the class/type
/// semantics and the suppress-if-unchanged cache; this crate only
/// carries the rendered result across the core boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XdsPayload {
    /// e.g. "current", "future", "channel", "misc", "reserved", "private".
    pub class: String,
    /// e.g. "program_name", "network_name", "time_of_day".
    pub event: String,
    pub text: Option<String>,
}

/// The payload carried by a `Subtitle`, tagged by `SubtitleKind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubtitlePayload {
    Cc608(Cc608Payload),
    Cc708(Cc708Payload),
    Bitmap(BitmapPayload),
    Text { text: String, encoding: String },
    Raw(Vec<u8>),
    Xds(XdsPayload),
}

/// The single record type crossing the core boundary (spec.md §3.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtitle {
    pub kind: SubtitleKind,
    /// Milliseconds since start of stream, on the FTS timeline.
    pub start_ms: i64,
    pub end_ms: i64,
    pub payload: SubtitlePayload,
    pub language_hint: Option<String>,
    pub channel: Option<u8>,
    pub field: Option<u8>,
    pub mode: Option<String>,
    /// Arena index of the previous cue in a split multi-cue sequence.
    pub prev: Option<usize>,
    /// Arena index of the next cue in a split multi-cue sequence.
    pub next: Option<usize>,
}

impl Subtitle {
    pub fn new(kind: SubtitleKind, start_ms: i64, end_ms: i64, payload: SubtitlePayload) -> Self {
        Self {
            kind,
            start_ms,
            end_ms,
            payload,
            language_hint: None,
            channel: None,
            field: None,
            mode: None,
            prev: None,
            next: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_cc608_payload_is_empty() {
        let payload = Cc608Payload::blank();
        assert!(payload.is_empty());
        assert_eq!(payload.rows.len(), CC608_ROWS);
        assert_eq!(payload.rows[0].cells.len(), CC608_COLS);
    }

    #[test]
    fn cc608_row_text_trims_trailing_spaces() {
        let mut row = Cc608Row::blank();
        row.cells[0].ch = 'H';
        row.cells[1].ch = 'I';
        assert_eq!(row.text(), "HI");
    }

    #[test]
    fn subtitle_new_has_no_links_by_default() {
        let sub = Subtitle::new(
            SubtitleKind::Text,
            0,
            1000,
            SubtitlePayload::Text {
                text: "hi".into(),
                encoding: "utf-8".into(),
            },
        );
        assert!(sub.prev.is_none());
        assert!(sub.next.is_none());
    }
}
