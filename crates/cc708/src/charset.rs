//! G0/G1/G2/G3 code-point tables (spec.md §4.3.5). Static data: the
//! spec references these by index and leaves the representation to
//! the implementer, so each maps a raw byte straight to a `char`.

/// G0: printable ASCII, with the one CEA-708-specific substitution at
/// `0x7F` (musical note, U+266A) instead of DEL.
pub fn g0(byte: u8) -> char {
    if byte == 0x7F {
        '\u{266A}'
    } else {
        byte as char
    }
}

/// G1: ISO-8859-1 with a handful of CC-specific overrides mirroring
/// the 608 extended sets (spec.md §4.3.5).
pub fn g1(byte: u8) -> char {
    match byte {
        0xA0 => ' ',
        _ => byte as char,
    }
}

/// G2: extended miscellaneous glyphs. Only a handful of code points
/// are actually assigned; everything else renders as a transparent
/// space (spec.md §4.3.5: "only a few non-space entries").
pub fn g2(byte: u8) -> char {
    match byte {
        0x20 => '\u{00A0}', // transparent space
        0x21 => '\u{00A1}', // inverted exclamation mark
        0x25 => '\u{2026}', // ellipsis
        0x2A => '\u{0160}', // S with caron
        0x2C => '\u{0152}', // OE ligature
        0x30 => '\u{2588}', // solid block
        0x31 => '\u{2018}', // left single quote
        0x32 => '\u{2019}', // right single quote
        0x33 => '\u{201C}', // left double quote
        0x34 => '\u{201D}', // right double quote
        0x35 => '\u{2022}', // bullet
        0x39 => '\u{2122}', // trademark
        0x3A => '\u{0161}', // s with caron
        0x3C => '\u{0153}', // oe ligature
        0x3D => '\u{2120}', // service mark
        0x3F => '\u{0178}', // Y with diaeresis
        _ => ' ',
    }
}

/// G3: the CC logo glyph at `0xA0`; everything else is reserved
/// (spec.md §4.3.5).
pub fn g3(byte: u8) -> char {
    match byte {
        0xA0 => '\u{1F19C}', // stand-in "CC" logo code point
        _ => ' ',
    }
}
