//! Shared types crossing the caption-decoding core boundary.
//!
//! This crate holds the one type every decoder produces (`Subtitle`),
//! the `SubtitleSink` trait an encoder implements to receive them, and a
//! handful of lookup tables (odd parity, XDS checksum) shared by more
//! than one decoder crate.

pub mod checksum;
pub mod parity;
pub mod sink;
pub mod stats;
pub mod subtitle;

pub use sink::{SubtitleSink, VecSink};
pub use stats::DecoderStats;
pub use subtitle::{
    BitmapPayload, Cc608Cell, Cc608Color, Cc608Font, Cc608Payload, Cc608Row, Cc708Payload,
    Cc708Symbol, Subtitle, SubtitleKind, SubtitlePayload, XdsPayload,
};
