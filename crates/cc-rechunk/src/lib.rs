//! Optional sentence re-chunker (spec.md §4.7).
//!
//! Buffers incoming text cues into one expanding string, deduplicating
//! OCR/teletext repeats at the seam between consecutive cues, then
//! re-splits the buffer into sentence-terminated `Subtitle{kind=Text}`
//! records with linearly interpolated timestamps. This module is never
//! invoked implicitly by `cc-router` — a host wires it in explicitly
//! (SPEC_FULL.md §4.7), matching spec.md §9's guidance that the
//! splitter heuristics are "best-effort" and should stay an opt-in
//! module rather than a core invariant.

pub mod dedup;
pub mod normalize;

use cc_core::{Subtitle, SubtitleKind, SubtitlePayload};

/// One contributing cue's span within the deduplicated buffer:
/// characters up to (but not including) `end_offset` were supplied by
/// this cue's time range.
#[derive(Debug, Clone, Copy)]
struct Span {
    end_offset: usize,
    start_ms: i64,
    end_ms: i64,
}

/// Buffers and re-splits text cues by sentence (spec.md §4.7).
#[derive(Debug, Default)]
pub struct SentenceRechunker {
    buffer: String,
    spans: Vec<Span>,
    /// Char offset into `buffer` up to which sentences have already
    /// been emitted.
    emitted_chars: usize,
    encoding: String,
}

impl SentenceRechunker {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            spans: Vec::new(),
            emitted_chars: 0,
            encoding: "utf-8".to_string(),
        }
    }

    /// Feed one text cue. Does not itself emit anything — call
    /// [`drain_sentences`](Self::drain_sentences) afterward to collect
    /// any complete sentences the merge exposed.
    pub fn push_cue(&mut self, text: &str, start_ms: i64, end_ms: i64) {
        let text = normalize::normalize(text);
        if text.is_empty() {
            return;
        }

        if self.buffer.is_empty() {
            self.buffer = text;
            self.spans.push(Span {
                end_offset: self.buffer.chars().count(),
                start_ms,
                end_ms,
            });
            return;
        }

        let cut = dedup::find_insert_point(&self.buffer, &text);
        self.truncate_to_char(cut);
        self.spans.retain(|s| s.end_offset <= cut);
        self.buffer.push_str(&text);
        self.spans.push(Span {
            end_offset: self.buffer.chars().count(),
            start_ms,
            end_ms,
        });
        self.emitted_chars = self.emitted_chars.min(cut);
    }

    fn truncate_to_char(&mut self, char_count: usize) {
        let byte_idx = self
            .buffer
            .char_indices()
            .nth(char_count)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len());
        self.buffer.truncate(byte_idx);
    }

    /// Scan forward from the last emitted position for sentence
    /// terminators (`.`, `!`, `?`) not immediately followed by another
    /// terminator, emitting a `Subtitle{kind=Text}` per hit (spec.md
    /// §4.7). Safe to call after every `push_cue`, or once at the end
    /// of the stream (the trailing partial sentence, if any, is left
    /// in the buffer until [`flush`](Self::flush)).
    pub fn drain_sentences(&mut self) -> Vec<Subtitle> {
        let chars: Vec<char> = self.buffer.chars().collect();
        let mut out = Vec::new();
        let mut i = self.emitted_chars;

        while i < chars.len() {
            let c = chars[i];
            if matches!(c, '.' | '!' | '?') {
                let next = chars.get(i + 1).copied();
                let followed_by_terminator = matches!(next, Some('.') | Some('!') | Some('?'));
                if !followed_by_terminator {
                    let sentence_end = i + 1;
                    out.push(self.emit_range(self.emitted_chars, sentence_end));
                    self.emitted_chars = sentence_end;
                    // Don't let the next sentence start with the space
                    // that separated it from this one.
                    while self.emitted_chars < chars.len() && chars[self.emitted_chars].is_whitespace() {
                        self.emitted_chars += 1;
                    }
                }
            }
            i += 1;
        }
        out
    }

    /// Emit whatever remains in the buffer as one final cue (stream
    /// end), regardless of sentence terminators.
    pub fn flush(&mut self) -> Option<Subtitle> {
        let total = self.buffer.chars().count();
        if self.emitted_chars >= total {
            return None;
        }
        let sub = self.emit_range(self.emitted_chars, total);
        self.emitted_chars = total;
        Some(sub)
    }

    fn emit_range(&self, start_char: usize, end_char: usize) -> Subtitle {
        let chars: Vec<char> = self.buffer.chars().collect();
        let text: String = chars[start_char..end_char].iter().collect();
        let start_ms = self.time_at(start_char);
        let end_ms = self.time_at(end_char);
        Subtitle {
            kind: SubtitleKind::Text,
            start_ms,
            end_ms,
            payload: SubtitlePayload::Text {
                text,
                encoding: self.encoding.clone(),
            },
            language_hint: None,
            channel: None,
            field: None,
            mode: Some("rechunked".to_string()),
            prev: None,
            next: None,
        }
    }

    /// Linearly interpolate a timestamp for char offset `offset` across
    /// the span covering it, weighting by alphanumeric character count
    /// within the span (falling back to plain char count if the span
    /// has none, per spec.md §4.7).
    fn time_at(&self, offset: usize) -> i64 {
        let chars: Vec<char> = self.buffer.chars().collect();
        let offset = offset.min(chars.len());

        let span_idx = self
            .spans
            .iter()
            .position(|s| offset <= s.end_offset)
            .unwrap_or(self.spans.len().saturating_sub(1));
        let span = match self.spans.get(span_idx) {
            Some(s) => *s,
            None => return 0,
        };
        let span_start = if span_idx == 0 {
            0
        } else {
            self.spans[span_idx - 1].end_offset
        };
        let span_end = span.end_offset.max(span_start + 1);

        let window = &chars[span_start.min(chars.len())..span_end.min(chars.len())];
        let alnum_total = window.iter().filter(|c| c.is_alphanumeric()).count();
        let local_offset = offset.saturating_sub(span_start).min(window.len());

        let fraction = if alnum_total > 0 {
            let alnum_before = window[..local_offset].iter().filter(|c| c.is_alphanumeric()).count();
            alnum_before as f64 / alnum_total as f64
        } else if !window.is_empty() {
            local_offset as f64 / window.len() as f64
        } else {
            0.0
        };

        span.start_ms + ((span.end_ms - span.start_ms) as f64 * fraction).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cue_splits_on_sentence_terminator() {
        let mut rc = SentenceRechunker::new();
        rc.push_cue("Hello there. How are you", 0, 2000);
        let subs = rc.drain_sentences();
        assert_eq!(subs.len(), 1);
        match &subs[0].payload {
            SubtitlePayload::Text { text, .. } => assert_eq!(text, "Hello there."),
            _ => panic!("expected text payload"),
        }
        assert_eq!(subs[0].start_ms, 0);
    }

    #[test]
    fn ellipsis_is_not_split_as_three_sentences() {
        // A run of terminators only ever yields one split, right after
        // the run ends -- never one split per dot.
        let mut rc = SentenceRechunker::new();
        rc.push_cue("Wait... what happened?", 0, 1000);
        let subs = rc.drain_sentences();
        assert_eq!(subs.len(), 2);
        match &subs[0].payload {
            SubtitlePayload::Text { text, .. } => assert_eq!(text, "Wait..."),
            _ => panic!("expected text payload"),
        }
        match &subs[1].payload {
            SubtitlePayload::Text { text, .. } => assert_eq!(text, "what happened?"),
            _ => panic!("expected text payload"),
        }
    }

    #[test]
    fn overlapping_ocr_repeat_is_deduplicated() {
        let mut rc = SentenceRechunker::new();
        rc.push_cue("the quick brown", 0, 1000);
        rc.push_cue("brown fox jumps over.", 1000, 2000);
        let subs = rc.drain_sentences();
        assert_eq!(subs.len(), 1);
        match &subs[0].payload {
            SubtitlePayload::Text { text, .. } => {
                assert_eq!(text, "the quick brown fox jumps over.")
            }
            _ => panic!("expected text payload"),
        }
    }

    #[test]
    fn flush_emits_trailing_partial_sentence() {
        let mut rc = SentenceRechunker::new();
        rc.push_cue("no terminator here", 0, 500);
        assert!(rc.drain_sentences().is_empty());
        let sub = rc.flush().unwrap();
        match sub.payload {
            SubtitlePayload::Text { text, .. } => assert_eq!(text, "no terminator here"),
            _ => panic!("expected text payload"),
        }
        assert!(rc.flush().is_none());
    }

    #[test]
    fn pipe_misread_is_repaired_before_merge() {
        let mut rc = SentenceRechunker::new();
        rc.push_cue("| am ready.", 0, 1000);
        let subs = rc.drain_sentences();
        match &subs[0].payload {
            SubtitlePayload::Text { text, .. } => assert_eq!(text, "I am ready."),
            _ => panic!("expected text payload"),
        }
    }
}
