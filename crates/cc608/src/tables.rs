//! Const lookup tables for CEA-608 control-code decoding (spec.md §4.2,
//! §9's guidance to generate such tables once rather than branch on
//! every byte pair at runtime).

use cc_core::{Cc608Color, Cc608Font};

/// Row (1..=15) selected by a PAC code, indexed by
/// `(hi << 1 & 14) | (lo >> 5 & 1)` (spec.md §4.2, PAC bullet).
/// `0` marks a combination CEA-608 does not assign to a row.
pub const PAC_ROW_TABLE: [u8; 16] = [11, 0, 1, 2, 3, 4, 12, 13, 14, 15, 5, 6, 7, 8, 9, 10];

/// Decode the row for a PAC code from its header/low bytes.
pub fn pac_row(hi: u8, lo: u8) -> Option<u8> {
    let index = (((hi << 1) & 0x0E) | ((lo >> 5) & 1)) as usize;
    match PAC_ROW_TABLE[index] {
        0 => None,
        row => Some(row),
    }
}

/// PAC / mid-row colour table indexed 0..=7, selected by bits 1..3 of
/// the low 5 bits of `lo` (the 8th, "white italics", entry doubles as
/// the italics marker rather than a distinct colour).
const PAC_COLORS: [Cc608Color; 7] = [
    Cc608Color::White,
    Cc608Color::Green,
    Cc608Color::Blue,
    Cc608Color::Cyan,
    Cc608Color::Red,
    Cc608Color::Yellow,
    Cc608Color::Magenta,
];

/// Attributes carried by a PAC code's low 5 bits: colour/italics XOR
/// indent, plus an independent underline bit (spec.md §4.2, PAC bullet).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacAttrs {
    pub color: Cc608Color,
    pub font: Cc608Font,
    pub indent: u8,
}

/// Decode colour/font/indent from a PAC code's low byte.
pub fn pac_attrs(lo: u8) -> PacAttrs {
    let bits = lo & 0x1F;
    let underline = bits & 1 == 1;
    if bits < 0x10 {
        let color_index = ((bits >> 1) & 0x7) as usize;
        let (color, italics) = if color_index == 7 {
            (Cc608Color::White, true)
        } else {
            (PAC_COLORS[color_index], false)
        };
        PacAttrs {
            color,
            font: font_from(italics, underline),
            indent: 0,
        }
    } else {
        let indent_index = (bits - 0x10) >> 1;
        PacAttrs {
            color: Cc608Color::White,
            font: font_from(false, underline),
            indent: indent_index * 4,
        }
    }
}

fn font_from(italics: bool, underline: bool) -> Cc608Font {
    match (italics, underline) {
        (true, true) => Cc608Font::UnderlinedItalics,
        (true, false) => Cc608Font::Italics,
        (false, true) => Cc608Font::Underlined,
        (false, false) => Cc608Font::Regular,
    }
}

/// Mid-row code table, `lo` in `0x20..=0x2F` (CEA-608-C Table 69): eight
/// colours, each with a non-underlined/underlined pair, except the
/// final pair which is "white italics" instead of a ninth colour.
const MID_ROW_COLORS: [(Cc608Color, bool); 8] = [
    (Cc608Color::White, false),
    (Cc608Color::Green, false),
    (Cc608Color::Blue, false),
    (Cc608Color::Cyan, false),
    (Cc608Color::Red, false),
    (Cc608Color::Yellow, false),
    (Cc608Color::Magenta, false),
    (Cc608Color::White, true),
];

/// Decode colour/font for a mid-row code's low byte (`0x20..=0x2F`).
pub fn mid_row_attrs(lo: u8) -> PacAttrs {
    let offset = lo.wrapping_sub(0x20);
    let index = ((offset >> 1) & 0x7) as usize;
    let underline = offset & 1 == 1;
    let (color, italics) = MID_ROW_COLORS[index];
    PacAttrs {
        color,
        font: font_from(italics, underline),
        indent: 0,
    }
}

/// Special character set, `hi ∈ 0x11..=0x17`, `lo ∈ 0x30..=0x3F`
/// (CEA-608-C Table 70), indexed by `lo - 0x30`.
pub const SPECIAL_CHARS: [char; 16] = [
    '®', '°', '½', '¿', '™', '¢', '£', '♪', 'à', ' ', 'è', 'â', 'ê', 'î', 'ô', 'û',
];

/// Extended western-European character set for `hi == 0x12`, `lo ∈
/// 0x20..=0x3F` (CEA-608-C Table 71, Spanish/French/Misc subset).
/// Writing one of these characters backs the cursor up over the
/// fallback G0 character the 608 encoder is required to send first.
pub const EXTENDED_CHARS_12: [char; 32] = [
    'Á', 'É', 'Ó', 'Ú', 'Ñ', 'ñ', '¿', '¡', 'Ã', 'ã', 'Õ', 'õ', '¨', '¤', '¦', '¬',
    '|', 'Â', 'Ê', 'Á', 'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô', 'Ò', 'Ú', 'Ù', 'Û',
];

/// Extended German/Danish character set for `hi == 0x13`, `lo ∈
/// 0x20..=0x3F` (CEA-608-C Table 72 subset).
pub const EXTENDED_CHARS_13: [char; 32] = [
    'Ä', 'ä', 'Ö', 'ö', 'Ü', 'ü', 'ß', '¤', '®', '°', '½', '¿', '™', '¢', '£', '♪',
    'Å', 'å', 'Ø', 'ø', 'É', 'é', 'Â', 'â', 'Ë', 'ë', 'Ó', 'ó', 'Ú', 'ú', 'Ç', 'ç',
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pac_row_decodes_standard_codes() {
        // hi=0x11, lo=0x40 -> index (2<<1&14 | 0) = wait compute directly via pac_row
        assert_eq!(pac_row(0x11, 0x40), Some(1));
    }

    #[test]
    fn pac_row_rejects_unassigned_index() {
        assert_eq!(pac_row(0x10, 0x40), None);
    }

    #[test]
    fn mid_row_white_has_no_indent() {
        let attrs = mid_row_attrs(0x20);
        assert_eq!(attrs.color, Cc608Color::White);
        assert_eq!(attrs.font, Cc608Font::Regular);
    }

    #[test]
    fn mid_row_last_pair_is_white_italics() {
        let attrs = mid_row_attrs(0x2E);
        assert_eq!(attrs.color, Cc608Color::White);
        assert_eq!(attrs.font, Cc608Font::Italics);
    }

    #[test]
    fn special_char_table_has_16_entries() {
        assert_eq!(SPECIAL_CHARS.len(), 16);
        assert_eq!(SPECIAL_CHARS[7], '♪');
    }
}
