//! CEA-708 (DTVCC) digital closed-caption decoder.
//!
//! A `Cc708Decoder` reassembles DTVCC packets from the 3-byte
//! `(cc_type, byte_a, byte_b)` records the CC data router hands it,
//! walks each completed packet's service blocks, and dispatches every
//! block to the right per-service [`service::ServiceDecoder`] (up to
//! 63 of them, created lazily).
//!
//! # Example
//!
//! ```ignore
//! use cc708::Cc708Decoder;
//! use cc_timing::TimingContext;
//!
//! let mut decoder = Cc708Decoder::new();
//! let mut timing = TimingContext::new();
//! let subs = decoder.process(3, 0x02, 0xAA, &mut timing).unwrap();
//! ```

pub mod charset;
pub mod error;
pub mod packet;
pub mod pen;
pub mod service;
pub mod window;

pub use error::{Cc708Error, Result};
pub use service::ServiceDecoder;

use std::collections::HashMap;

use cc_core::{DecoderStats, Subtitle};
use cc_timing::TimingContext;
use tracing::debug;

use packet::{packet_sequence, Packetizer, ServiceBlockIter};

/// Top-level DTVCC decoder: the packetiser plus the set of live
/// per-service decoders (spec.md §3.3, §4.3.1).
pub struct Cc708Decoder {
    packetizer: Packetizer,
    last_sequence: Option<u8>,
    services: HashMap<u8, ServiceDecoder>,
    no_rollup: bool,
    stats: DecoderStats,
}

impl Default for Cc708Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Cc708Decoder {
    pub fn new() -> Self {
        Self {
            packetizer: Packetizer::new(),
            last_sequence: None,
            services: HashMap::new(),
            no_rollup: false,
            stats: DecoderStats::new(),
        }
    }

    /// Propagated to every service decoder, existing and future
    /// (spec.md §4.3.4 scrolling edge case).
    pub fn set_no_rollup(&mut self, enabled: bool) {
        self.no_rollup = enabled;
        for svc in self.services.values_mut() {
            svc.set_no_rollup(enabled);
        }
    }

    /// Recoverable-error counters accumulated across the packetiser
    /// and every service decoder (spec.md §7).
    pub fn stats(&self) -> DecoderStats {
        let mut total = self.stats;
        for svc in self.services.values() {
            total.merge(&svc.stats());
        }
        total
    }

    fn service_mut(&mut self, service_no: u8) -> &mut ServiceDecoder {
        let no_rollup = self.no_rollup;
        self.services.entry(service_no).or_insert_with(|| {
            let mut svc = ServiceDecoder::new(service_no);
            svc.set_no_rollup(no_rollup);
            svc
        })
    }

    /// Feed one 3-byte record from the router (spec.md §4.3.1). Only
    /// `cc_type` 2 (continuation) and 3 (start) carry DTVCC data; the
    /// router is expected to have already filtered on `cc_valid`.
    pub fn process(
        &mut self,
        cc_type: u8,
        byte_a: u8,
        byte_b: u8,
        timing: &mut TimingContext,
    ) -> Result<Vec<Subtitle>> {
        let mut out = Vec::new();
        if let Some(packet) = self.packetizer.push(cc_type, byte_a, byte_b) {
            out.extend(self.process_packet(&packet, timing)?);
        }
        Ok(out)
    }

    fn process_packet(&mut self, packet: &[u8], timing: &mut TimingContext) -> Result<Vec<Subtitle>> {
        let sequence = packet_sequence(packet[0]);
        if let Some(last) = self.last_sequence {
            if (last + 1) % 4 != sequence {
                // spec.md §7 UnexpectedSequence: log and continue, do
                // not reset any service decoder.
                debug!(last, sequence, "708 packet sequence discrepancy");
                self.stats.unexpected_sequence += 1;
            }
        }
        self.last_sequence = Some(sequence);

        let mut out = Vec::new();
        for (service_no, block) in ServiceBlockIter::new(packet) {
            let subs = self.service_mut(service_no).process_block(block, timing)?;
            out.extend(subs);
        }
        Ok(out)
    }

    /// Flush every live service decoder (stream end).
    pub fn flush(&mut self, timing: &mut TimingContext) -> Vec<Subtitle> {
        let mut out = Vec::new();
        for svc in self.services.values_mut() {
            out.extend(svc.flush(timing));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// spec.md §8.2 scenario S3, driven through the packetiser end to
    /// end: define window 0 on service 1, select it, write "Hello",
    /// then hide it and expect one composited subtitle.
    #[test]
    fn s3_hello_round_trips_through_the_packetizer() {
        let mut decoder = Cc708Decoder::new();
        let mut timing = TimingContext::new();
        timing.set_current_pts(90_000);
        timing.set_fts();

        // Service block: service_no=1, block_len=13 (DF0 + 6 params +
        // CW0 + "Hello") -> header (1<<5)|13 = 0x2D.
        let mut payload = vec![0x2Du8, 0x98, 0x38, 0x00, 0x00, 0x00, 0x3F, 0x00, 0x80];
        payload.extend_from_slice(b"Hello");
        // Packet is header + 14 payload bytes = 15 bytes; size must be
        // even, so size_code 8 (size 16 bytes) with one pad byte.
        let header = 0x08u8;
        let mut full = vec![header];
        full.extend_from_slice(&payload);
        while full.len() < 16 {
            full.push(0x00);
        }

        let mut subs = Vec::new();
        let mut it = full.chunks(2);
        let first = it.next().unwrap();
        subs.extend(decoder.process(3, first[0], first[1], &mut timing).unwrap());
        for pair in it {
            subs.extend(decoder.process(2, pair[0], pair[1], &mut timing).unwrap());
        }
        assert!(subs.is_empty(), "writing text alone doesn't emit");

        // Second packet: header (size_code 2 -> 4 bytes), service block
        // header 0x22 (service 1, len 2), HDW bitmap 0x01.
        let hide = [0x02u8, 0x22, 0x8A, 0x01];
        let mut it = hide.chunks(2);
        let first = it.next().unwrap();
        subs.extend(decoder.process(3, first[0], first[1], &mut timing).unwrap());
        for pair in it {
            subs.extend(decoder.process(2, pair[0], pair[1], &mut timing).unwrap());
        }
        assert_eq!(subs.len(), 1);
        match &subs[0].payload {
            cc_core::SubtitlePayload::Cc708(p) => assert!(p.to_text().contains("Hello")),
            _ => panic!("expected Cc708 payload"),
        }
    }

    #[test]
    fn sequence_discrepancy_is_logged_not_fatal() {
        let mut decoder = Cc708Decoder::new();
        let mut timing = TimingContext::new();
        timing.set_current_pts(90_000);
        timing.set_fts();

        // Two minimal packets (service_no 0 terminates immediately),
        // sequence 0 then sequence 2 (skipping 1): header bits
        // (seq:2, size_code:6). size_code=1 -> 2 bytes.
        let p1 = [0x01u8, 0x00]; // seq 0, size 2
        let p2 = [0b10_000001u8, 0x00]; // seq 2, size 2
        let _ = decoder.process(3, p1[0], p1[1], &mut timing).unwrap();
        let subs = decoder.process(3, p2[0], p2[1], &mut timing).unwrap();
        assert!(subs.is_empty());
        assert_eq!(decoder.stats().unexpected_sequence, 1);
    }
}
