//! XDS (eXtended Data Services) side-channel parser.
//!
//! XDS packets are interleaved with CC608 field-2 data; `cc608`
//! forwards every byte pair it sees while `in_xds_mode` to this
//! crate's [`XdsDecoder::process_pair`] (spec.md §4.4). Up to 8
//! packets can be in flight at once, keyed by `(class, type)`, so an
//! interrupted packet can resume once its class/type pair recurs.
//!
//! # Example
//!
//! ```ignore
//! use cc_xds::XdsDecoder;
//! use cc_timing::TimingContext;
//!
//! let mut decoder = XdsDecoder::new();
//! let mut timing = TimingContext::new();
//! let subs = decoder.process_pair(0x01, 0x03, &mut timing);
//! ```

pub mod error;
pub mod event;
pub mod types;

pub use error::{Result, XdsError};
pub use types::{ProgramType, XdsClass};

use std::collections::{HashMap, VecDeque};

use cc_core::{checksum::xds_checksum_valid, DecoderStats, Subtitle, SubtitleKind, SubtitlePayload, XdsPayload};
use cc_timing::TimingContext;

const MAX_INFLIGHT: usize = 8;

type PacketKey = (XdsClass, u8);

/// Accumulates interleaved XDS packets, validates their checksum, and
/// emits typed metadata events as `Subtitle{kind=Xds}` (spec.md §4.4).
pub struct XdsDecoder {
    order: VecDeque<PacketKey>,
    buffers: HashMap<PacketKey, Vec<u8>>,
    current: Option<PacketKey>,
    last_emitted: HashMap<PacketKey, String>,
    stats: DecoderStats,
}

impl Default for XdsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl XdsDecoder {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
            buffers: HashMap::new(),
            current: None,
            last_emitted: HashMap::new(),
            stats: DecoderStats::new(),
        }
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Feed one byte pair (spec.md §4.4 framing). `cc608` calls this
    /// for every pair while `in_xds_mode`, including the packet-start
    /// header pair and the `(0x0F, checksum)` terminator.
    pub fn process_pair(&mut self, hi: u8, lo: u8, timing: &mut TimingContext) -> Vec<Subtitle> {
        if let Some(class) = XdsClass::from_header_hi(hi) {
            let key = (class, lo);
            self.begin_or_resume(key, hi, lo);
            return Vec::new();
        }
        if hi == 0x0F {
            return self.finish(lo, timing).into_iter().collect();
        }
        if let Some(key) = self.current {
            self.append(key, hi, lo);
        }
        Vec::new()
    }

    /// Switch the active buffer to `key`. A first occurrence of this
    /// `(class, type)` allocates a fresh buffer seeded with the header
    /// pair; a recurrence (the packet's redundant re-transmission, or
    /// resuming one interleaved with another class) just re-selects
    /// the existing buffer without re-appending the header.
    fn begin_or_resume(&mut self, key: PacketKey, hi: u8, lo: u8) {
        if !self.buffers.contains_key(&key) {
            if self.order.len() >= MAX_INFLIGHT {
                if let Some(evicted) = self.order.pop_front() {
                    self.buffers.remove(&evicted);
                }
            }
            self.order.push_back(key);
            self.buffers.insert(key, vec![hi, lo]);
        }
        self.current = Some(key);
    }

    fn append(&mut self, key: PacketKey, a: u8, b: u8) {
        if let Some(buf) = self.buffers.get_mut(&key) {
            buf.push(a);
            buf.push(b);
        }
    }

    fn finish(&mut self, checksum: u8, timing: &mut TimingContext) -> Option<Subtitle> {
        let key = self.current.take()?;
        self.order.retain(|k| *k != key);
        let mut body = self.buffers.remove(&key)?;
        body.push(0x0F);

        if !xds_checksum_valid(&body, checksum) {
            self.stats.checksum_failures += 1;
            return None;
        }

        let (class, type_byte) = key;
        let data = &body[2..body.len() - 1];
        let (event_name, text) = event::decode(class, type_byte, data);

        if self.last_emitted.get(&key).map(|s| s.as_str()) == text.as_deref() {
            return None;
        }
        match &text {
            Some(t) => {
                self.last_emitted.insert(key, t.clone());
            }
            None => {
                self.last_emitted.remove(&key);
            }
        }

        let now = timing.get_fts(2);
        let payload = XdsPayload {
            class: class.name().to_string(),
            event: event_name.to_string(),
            text,
        };
        let mut sub = Subtitle::new(SubtitleKind::Xds, now, now, SubtitlePayload::Xds(payload));
        sub.field = Some(2);
        Some(sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_core::checksum::xds_checksum;

    /// Builds the byte-pair stream and checksum for a packet, padding
    /// `data` to an even length the way a real wire capture would (the
    /// padding byte is part of the checksum, per spec.md §8.2 S4's
    /// literal `6b 00` pair).
    fn build_packet(hi: u8, lo: u8, data: &[u8]) -> (Vec<(u8, u8)>, u8) {
        let mut rest = data.to_vec();
        if rest.len() % 2 != 0 {
            rest.push(0x00);
        }
        let mut body = vec![hi, lo];
        body.extend_from_slice(&rest);
        body.push(0x0F);
        let checksum = xds_checksum(&body);

        let mut pairs = vec![(hi, lo)];
        for chunk in rest.chunks(2) {
            pairs.push((chunk[0], chunk[1]));
        }
        (pairs, checksum)
    }

    /// spec.md §8.2 scenario S4: "Star Trek" program name.
    #[test]
    fn program_name_is_emitted_on_valid_checksum() {
        let mut decoder = XdsDecoder::new();
        let mut timing = TimingContext::new();
        timing.set_current_pts(90_000);
        timing.set_fts();

        let (pairs, checksum) = build_packet(0x01, 0x03, b"Star Trek");
        let mut subs = Vec::new();
        for (hi, lo) in pairs {
            subs.extend(decoder.process_pair(hi, lo, &mut timing));
        }
        subs.extend(decoder.process_pair(0x0F, checksum, &mut timing));

        assert_eq!(subs.len(), 1);
        match &subs[0].payload {
            SubtitlePayload::Xds(p) => {
                assert_eq!(p.event, "program_name");
                assert_eq!(p.text.as_deref(), Some("Star Trek"));
            }
            _ => panic!("expected Xds payload"),
        }
    }

    #[test]
    fn bad_checksum_is_dropped_silently() {
        let mut decoder = XdsDecoder::new();
        let mut timing = TimingContext::new();
        timing.set_current_pts(90_000);
        timing.set_fts();

        let (pairs, checksum) = build_packet(0x01, 0x03, b"Star Trek");
        for (hi, lo) in pairs {
            let _ = decoder.process_pair(hi, lo, &mut timing);
        }
        let subs = decoder.process_pair(0x0F, checksum.wrapping_add(1), &mut timing);
        assert!(subs.is_empty());
        assert_eq!(decoder.stats().checksum_failures, 1);
    }

    #[test]
    fn unchanged_event_is_suppressed_on_repeat() {
        let mut decoder = XdsDecoder::new();
        let mut timing = TimingContext::new();
        timing.set_current_pts(90_000);
        timing.set_fts();

        let (pairs, checksum) = build_packet(0x01, 0x03, b"Star Trek");
        for (hi, lo) in &pairs {
            let _ = decoder.process_pair(*hi, *lo, &mut timing);
        }
        let first = decoder.process_pair(0x0F, checksum, &mut timing);
        assert_eq!(first.len(), 1);

        for (hi, lo) in &pairs {
            let _ = decoder.process_pair(*hi, *lo, &mut timing);
        }
        let second = decoder.process_pair(0x0F, checksum, &mut timing);
        assert!(second.is_empty(), "identical program name must be suppressed");
    }

    #[test]
    fn ninth_interleaved_class_evicts_the_oldest_buffer() {
        let mut decoder = XdsDecoder::new();
        let mut timing = TimingContext::new();
        timing.set_current_pts(90_000);
        timing.set_fts();

        for n in 0..MAX_INFLIGHT {
            let _ = decoder.process_pair(0x01, n as u8, &mut timing);
        }
        assert_eq!(decoder.buffers.len(), MAX_INFLIGHT);
        let _ = decoder.process_pair(0x01, 0xFF, &mut timing);
        assert_eq!(decoder.buffers.len(), MAX_INFLIGHT);
        assert!(!decoder.buffers.contains_key(&(XdsClass::Current, 0)));
    }
}
