//! `SubtitleSink`: the trait form of the `emit()` interface (spec.md §6.2).
//!
//! Decoders in this workspace return `Vec<Subtitle>` from their
//! `process`/`flush` methods rather than calling back into a sink —
//! see SPEC_FULL.md §6 for why. `SubtitleSink` is provided for callers
//! that want to wire the decoders into an existing callback-based
//! encoder instead of draining a `Vec`.

use crate::subtitle::Subtitle;

/// Receives completed subtitle records, as spec.md §6.2's `emit()`.
pub trait SubtitleSink {
    /// Returns whether anything was written.
    fn emit(&mut self, sub: Subtitle) -> bool;
}

/// A `SubtitleSink` that simply collects every record it receives.
#[derive(Debug, Default)]
pub struct VecSink {
    pub subtitles: Vec<Subtitle>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<Subtitle> {
        self.subtitles
    }
}

impl SubtitleSink for VecSink {
    fn emit(&mut self, sub: Subtitle) -> bool {
        self.subtitles.push(sub);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::{SubtitleKind, SubtitlePayload};

    #[test]
    fn vec_sink_collects_in_order() {
        let mut sink = VecSink::new();
        for i in 0..3 {
            sink.emit(Subtitle::new(
                SubtitleKind::Text,
                i * 1000,
                i * 1000 + 500,
                SubtitlePayload::Text {
                    text: format!("cue {i}"),
                    encoding: "utf-8".into(),
                },
            ));
        }
        let subs = sink.into_inner();
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[1].start_ms, 1000);
    }
}
