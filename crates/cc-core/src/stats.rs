//! `DecoderStats`: plain counters a decoder bumps on every recovered
//! error instead of propagating it (spec.md §7: "decoders NEVER
//! propagate errors upward; they recover locally and set per-decoder
//! counters that a caller may sample for a diagnostic report at stream
//! end"). Mirrors the teacher's `HrdStatistics` shape: a flat struct of
//! `u64` counts with no behaviour beyond accumulation.

use serde::{Deserialize, Serialize};

/// Recoverable-error counters, shared across the 608/708/XDS/VOBSUB
/// decoders. Not every field applies to every decoder; each one only
/// increments the counters relevant to the errors it can hit (spec.md
/// §7's error kind list).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderStats {
    /// 608 `BadParity`: a byte's parity bit was wrong.
    pub bad_parity: u64,
    /// 608 `BadParity` escalated to a fully dropped byte-pair (bad
    /// `byte_b`, per spec.md §7).
    pub dropped_pairs: u64,
    /// 708 `MalformedPacket`: size mismatch, bad header, truncated command.
    pub malformed_packets: u64,
    /// 708 `UnexpectedSequence`: packet sequence number skipped.
    pub unexpected_sequence: u64,
    /// 708 `UnknownCommand`: reserved/variable-length command consumed
    /// and skipped.
    pub unknown_command: u64,
    /// XDS `XDSChecksumFail`: packet dropped silently.
    pub checksum_failures: u64,
    /// VOBSUB `BitmapOutOfBounds`: coordinates or RLE overran the plane.
    pub bitmap_out_of_bounds: u64,
}

impl DecoderStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every counter, for a quick "were there any issues" check.
    pub fn total(&self) -> u64 {
        self.bad_parity
            + self.dropped_pairs
            + self.malformed_packets
            + self.unexpected_sequence
            + self.unknown_command
            + self.checksum_failures
            + self.bitmap_out_of_bounds
    }

    pub fn merge(&mut self, other: &DecoderStats) {
        self.bad_parity += other.bad_parity;
        self.dropped_pairs += other.dropped_pairs;
        self.malformed_packets += other.malformed_packets;
        self.unexpected_sequence += other.unexpected_sequence;
        self.unknown_command += other.unknown_command;
        self.checksum_failures += other.checksum_failures;
        self.bitmap_out_of_bounds += other.bitmap_out_of_bounds;
    }
}
