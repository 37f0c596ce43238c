//! Pen and window attribute types (spec.md §3.3). Byte layouts for
//! `SPA`/`SPC`/`SWA` are not pinned to specific hex values by spec.md,
//! only to field widths; this implementation packs each field's bits
//! low-to-high in the order spec.md lists them, which is the
//! convention spec.md §8.2 scenario S3's `DFx` byte dump actually
//! exercises (see `window::DefineWindowParams::parse`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenSize {
    Small,
    Standard,
    Large,
    ExtraLarge,
}

impl PenSize {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => PenSize::Small,
            1 => PenSize::Standard,
            2 => PenSize::Large,
            _ => PenSize::ExtraLarge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenOffset {
    Subscript,
    Normal,
    Superscript,
    Reserved,
}

impl PenOffset {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => PenOffset::Subscript,
            1 => PenOffset::Normal,
            2 => PenOffset::Superscript,
            _ => PenOffset::Reserved,
        }
    }
}

/// Six edge types (spec.md §3.3 pen attributes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeType {
    None,
    Raised,
    Depressed,
    Uniform,
    ShadowLeft,
    ShadowRight,
}

impl EdgeType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x7 {
            0 => EdgeType::None,
            1 => EdgeType::Raised,
            2 => EdgeType::Depressed,
            3 => EdgeType::Uniform,
            4 => EdgeType::ShadowLeft,
            _ => EdgeType::ShadowRight,
        }
    }
}

/// Pen attributes set by `SPA` (spec.md §3.3, §4.3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenAttrs {
    pub pen_size: PenSize,
    pub offset: PenOffset,
    pub text_tag: u8,
    pub font_tag: u8,
    pub edge_type: EdgeType,
    pub underline: bool,
    pub italic: bool,
}

impl Default for PenAttrs {
    fn default() -> Self {
        Self {
            pen_size: PenSize::Standard,
            offset: PenOffset::Normal,
            text_tag: 0,
            font_tag: 0,
            edge_type: EdgeType::None,
            underline: false,
            italic: false,
        }
    }
}

impl PenAttrs {
    /// Parse the two data bytes following the `SPA` opcode.
    pub fn parse(b1: u8, b2: u8) -> Self {
        Self {
            pen_size: PenSize::from_bits(b1),
            offset: PenOffset::from_bits(b1 >> 2),
            text_tag: (b1 >> 4) & 0x0F,
            font_tag: b2 & 0x07,
            edge_type: EdgeType::from_bits(b2 >> 3),
            underline: (b2 >> 6) & 1 != 0,
            italic: (b2 >> 7) & 1 != 0,
        }
    }
}

/// 6-bit colour + 2-bit opacity, the unit `SPC` packs three of
/// (spec.md §3.3 pen colour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColorOpacity {
    pub color: u8,
    pub opacity: u8,
}

impl ColorOpacity {
    pub fn from_byte(b: u8) -> Self {
        Self {
            color: b & 0x3F,
            opacity: (b >> 6) & 0x3,
        }
    }
}

/// Pen colour set by `SPC`: foreground + background + edge colour
/// (spec.md §3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PenColor {
    pub fg: ColorOpacity,
    pub bg: ColorOpacity,
    pub edge_color: u8,
}

impl PenColor {
    /// Parse the three data bytes following the `SPC` opcode.
    pub fn parse(b1: u8, b2: u8, b3: u8) -> Self {
        Self {
            fg: ColorOpacity::from_byte(b1),
            bg: ColorOpacity::from_byte(b2),
            edge_color: b3 & 0x3F,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Justify {
    Left,
    Right,
    Center,
    Full,
}

impl Justify {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Justify::Left,
            1 => Justify::Right,
            2 => Justify::Center,
            _ => Justify::Full,
        }
    }
}

/// Shared by scroll direction and print direction: both are one of
/// the four cardinal text-flow directions (spec.md §3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowDirection {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

impl FlowDirection {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => FlowDirection::LeftToRight,
            1 => FlowDirection::RightToLeft,
            2 => FlowDirection::TopToBottom,
            _ => FlowDirection::BottomToTop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderType {
    None,
    Raised,
    Depressed,
    Uniform,
}

impl BorderType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => BorderType::None,
            1 => BorderType::Raised,
            2 => BorderType::Depressed,
            _ => BorderType::Uniform,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayEffect {
    Snap,
    Fade,
    Wipe,
    Reserved,
}

impl DisplayEffect {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => DisplayEffect::Snap,
            1 => DisplayEffect::Fade,
            2 => DisplayEffect::Wipe,
            _ => DisplayEffect::Reserved,
        }
    }
}

/// Window attributes set by `SWA` (spec.md §3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowAttrs {
    pub fill: ColorOpacity,
    pub border_color: u8,
    pub border_type: BorderType,
    pub justify: Justify,
    pub print_direction: FlowDirection,
    pub scroll_direction: FlowDirection,
    pub word_wrap: bool,
    pub display_effect: DisplayEffect,
    pub effect_direction: FlowDirection,
    /// Tenths of a second.
    pub effect_speed: u8,
}

impl Default for WindowAttrs {
    fn default() -> Self {
        Self {
            fill: ColorOpacity::default(),
            border_color: 0,
            border_type: BorderType::None,
            justify: Justify::Left,
            print_direction: FlowDirection::LeftToRight,
            scroll_direction: FlowDirection::TopToBottom,
            word_wrap: false,
            display_effect: DisplayEffect::Snap,
            effect_direction: FlowDirection::LeftToRight,
            effect_speed: 0,
        }
    }
}

impl WindowAttrs {
    /// Parse the four data bytes following the `SWA` opcode.
    pub fn parse(b1: u8, b2: u8, b3: u8, b4: u8) -> Self {
        Self {
            fill: ColorOpacity::from_byte(b1),
            border_color: b2 & 0x3F,
            border_type: BorderType::from_bits(b2 >> 6),
            justify: Justify::from_bits(b3),
            print_direction: FlowDirection::from_bits(b3 >> 2),
            scroll_direction: FlowDirection::from_bits(b3 >> 4),
            word_wrap: (b3 >> 6) & 1 != 0,
            display_effect: DisplayEffect::from_bits(b4),
            effect_direction: FlowDirection::from_bits(b4 >> 2),
            effect_speed: (b4 >> 4) & 0x0F,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pen_attrs_parses_underline_and_italic_high_bits() {
        let attrs = PenAttrs::parse(0x00, 0xC0);
        assert!(attrs.underline);
        assert!(attrs.italic);
    }

    #[test]
    fn pen_color_parses_three_bytes() {
        let color = PenColor::parse(0x3F, 0x00, 0x15);
        assert_eq!(color.fg.color, 0x3F);
        assert_eq!(color.fg.opacity, 0);
        assert_eq!(color.edge_color, 0x15);
    }

    #[test]
    fn window_attrs_parses_word_wrap_bit() {
        let attrs = WindowAttrs::parse(0, 0, 0x40, 0);
        assert!(attrs.word_wrap);
    }
}
