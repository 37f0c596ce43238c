//! PTS -> FTS timing engine (spec.md §3.6, §4.1).
//!
//! `TimingContext` is mutated by demuxer calls (`set_current_pts`,
//! `add_current_pts`, `notify_new_file`) and by decoder calls
//! (`set_fts`, `get_fts`, `get_visible_start`, `get_visible_end`). It
//! allocates nothing after construction; every field is a plain scalar
//! updated in place (spec.md §5 "no operation allocates").

mod error;

pub use error::{Result, TimingError};

use serde::{Deserialize, Serialize};

/// MPEG presentation clock rate.
pub const MPEG_CLOCK_HZ: i64 = 90_000;
/// Default tolerance before a PTS jump is treated as a discontinuity.
pub const DEFAULT_MAX_DIF_SECONDS: i64 = 5;
/// Spacing, in milliseconds, between successive `get_fts()` calls within
/// one video frame: roughly half an NTSC field period, so that two
/// byte-pairs delivered for the same frame still receive strictly
/// increasing timestamps (spec.md §4.1 `get_fts`).
pub const FIELD_SUBSTEP_MS: f64 = 1000.0 / 59.94 / 2.0;

/// Coding type of the picture `current_pts` currently refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PictureCodingType {
    I,
    P,
    B,
    D,
    Unknown,
}

impl Default for PictureCodingType {
    fn default() -> Self {
        PictureCodingType::Unknown
    }
}

/// Lifecycle state of PTS tracking (spec.md §3.6 `pts_set`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PtsSetState {
    None,
    GotFirst,
    MinPtsSet,
}

/// GOP time code carried by formats that encode one (spec.md §3.6,
/// SPEC_FULL.md §3.6 supplement). Advisory only: FTS derivation never
/// reads from this, it stays PTS-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GopTimeCode {
    pub drop_frame: bool,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub pictures: u8,
}

/// Per-stream timing state (spec.md §3.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingContext {
    pub current_pts: i64,
    pub min_pts: i64,
    pub max_pts: i64,
    pub sync_pts: i64,
    pub pts_reset: bool,

    pub fts_offset: i64,
    pub fts_global: i64,
    pub fts_now: i64,
    pub fts_max: i64,
    pub minimum_fts: i64,

    pub current_picture_coding_type: PictureCodingType,
    pub current_tref: i64,
    pub frames_since_ref_time: u32,
    pub current_fps: f64,

    pub cb_field1: u64,
    pub cb_field2: u64,
    pub cb_708: u64,

    pub gop_time_code: Option<GopTimeCode>,
    pub pts_set: PtsSetState,

    max_dif_ticks: i64,
    sync_check_enabled: bool,
}

impl Default for TimingContext {
    fn default() -> Self {
        Self {
            current_pts: 0,
            min_pts: 0,
            max_pts: 0,
            sync_pts: 0,
            pts_reset: false,
            fts_offset: 0,
            fts_global: 0,
            fts_now: 0,
            fts_max: 0,
            minimum_fts: -1,
            current_picture_coding_type: PictureCodingType::default(),
            current_tref: 0,
            frames_since_ref_time: 0,
            current_fps: 29.97,
            cb_field1: 0,
            cb_field2: 0,
            cb_708: 0,
            gop_time_code: None,
            pts_set: PtsSetState::None,
            max_dif_ticks: DEFAULT_MAX_DIF_SECONDS * MPEG_CLOCK_HZ,
            sync_check_enabled: true,
        }
    }
}

impl TimingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable the PTS-discontinuity check (for elementary streams that
    /// legitimately restart PTS without it indicating a problem).
    pub fn set_sync_check_enabled(&mut self, enabled: bool) {
        self.sync_check_enabled = enabled;
    }

    /// Override the discontinuity tolerance (default 5 seconds, per
    /// spec.md §4.1).
    pub fn try_set_max_dif_seconds(&mut self, seconds: i64) -> Result<()> {
        if seconds <= 0 {
            return Err(TimingError::InvalidMaxDif(seconds));
        }
        self.max_dif_ticks = seconds * MPEG_CLOCK_HZ;
        Ok(())
    }

    pub fn set_gop_time_code(&mut self, code: GopTimeCode) {
        self.gop_time_code = Some(code);
    }

    pub fn set_picture_coding_type(&mut self, kind: PictureCodingType) {
        self.current_picture_coding_type = kind;
    }

    pub fn set_current_fps(&mut self, fps: f64) {
        if fps > 0.0 {
            self.current_fps = fps;
        }
    }

    /// Set the absolute PTS (spec.md §4.1 `set_current_pts`). `pts` is
    /// masked to 33 bits, matching the MPEG PTS field width.
    pub fn set_current_pts(&mut self, pts: u64) {
        let pts = (pts & 0x1_FFFF_FFFF) as i64;

        if self.sync_check_enabled && self.pts_set != PtsSetState::None {
            let diff = pts - self.current_pts;
            if diff < -self.max_dif_ticks || diff > self.max_dif_ticks {
                tracing::warn!(
                    old_pts = self.current_pts,
                    new_pts = pts,
                    "PTS discontinuity detected, resetting FTS offset"
                );
                self.pts_reset = true;
                self.fts_offset = self.fts_max;
                self.sync_pts = pts;
            }
        }

        self.current_pts = pts;

        if self.pts_set == PtsSetState::None {
            self.pts_set = PtsSetState::GotFirst;
            self.sync_pts = pts;
            self.min_pts = pts;
            self.max_pts = pts;
        } else {
            if pts < self.min_pts {
                self.min_pts = pts;
            }
            if pts > self.max_pts {
                self.max_pts = pts;
            }
        }
    }

    /// Advance `current_pts` by `delta` ticks of the 90kHz clock
    /// (spec.md §4.1 `add_current_pts`). No discontinuity check: the
    /// caller is asserting this is a continuation, not a new sample.
    pub fn add_current_pts(&mut self, delta: i64) {
        let next = self.current_pts + delta;
        self.set_raw_pts_no_sync_check(next);
    }

    fn set_raw_pts_no_sync_check(&mut self, pts: i64) {
        self.current_pts = pts;
        if self.pts_set == PtsSetState::None {
            self.pts_set = PtsSetState::GotFirst;
            self.sync_pts = pts;
            self.min_pts = pts;
            self.max_pts = pts;
        } else {
            if pts < self.min_pts {
                self.min_pts = pts;
            }
            if pts > self.max_pts {
                self.max_pts = pts;
            }
        }
    }

    /// Recompute `fts_now` from the current PTS (spec.md §4.1
    /// `set_fts`). Resets the per-field block counters, since a new
    /// frame's worth of byte-pairs starts here.
    pub fn set_fts(&mut self) {
        let computed = (self.current_pts - self.sync_pts) / 90 + self.fts_offset;
        // Clamp against regression: FTS never goes backwards within a
        // stream, even if the PTS math would produce a smaller value.
        self.fts_now = computed.max(self.fts_now);
        if self.fts_now > self.fts_max {
            self.fts_max = self.fts_now;
        }
        if self.pts_set == PtsSetState::GotFirst {
            self.pts_set = PtsSetState::MinPtsSet;
        }
        self.cb_field1 = 0;
        self.cb_field2 = 0;
        self.cb_708 = 0;
    }

    /// FTS for the given field (1, 2, or 3 for field-independent 708
    /// data), advancing that field's per-frame block counter so
    /// consecutive byte-pairs within one frame get strictly increasing
    /// timestamps (spec.md §4.1 `get_fts`).
    pub fn get_fts(&mut self, field: u8) -> i64 {
        let counter = match field {
            1 => {
                let c = self.cb_field1;
                self.cb_field1 += 1;
                c
            }
            2 => {
                let c = self.cb_field2;
                self.cb_field2 += 1;
                c
            }
            _ => {
                let c = self.cb_708;
                self.cb_708 += 1;
                c
            }
        };
        let substep = (counter as f64 * FIELD_SUBSTEP_MS) as i64;
        self.fts_now + self.fts_global + substep
    }

    /// FTS for a cue about to start, guaranteed strictly greater than
    /// the end of the previous screen (spec.md §4.1
    /// `get_visible_start`).
    pub fn get_visible_start(&mut self, field: u8) -> i64 {
        let fts = self.get_fts(field);
        if fts <= self.minimum_fts {
            self.minimum_fts + 1
        } else {
            fts
        }
    }

    /// FTS for a cue about to end; also raises `minimum_fts` so the
    /// next cue's start never overlaps it (spec.md §4.1
    /// `get_visible_end`).
    pub fn get_visible_end(&mut self, field: u8) -> i64 {
        let fts = self.get_visible_start(field);
        if fts > self.minimum_fts {
            self.minimum_fts = fts;
        }
        fts
    }

    /// Called on an input-file boundary: accumulates elapsed time into
    /// `fts_global` and resets the per-file counters, but preserves
    /// `fts_global` and `minimum_fts` so concatenated output never
    /// regresses or overlaps (spec.md §3.6, §6.1 `notify_new_file`).
    pub fn notify_new_file(&mut self) {
        self.fts_global += self.fts_max;
        self.fts_offset = 0;
        self.fts_max = 0;
        self.fts_now = 0;
        self.cb_field1 = 0;
        self.cb_field2 = 0;
        self.cb_708 = 0;
        self.pts_set = PtsSetState::None;
        self.pts_reset = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fts_is_monotonic_within_a_frame() {
        let mut ctx = TimingContext::new();
        ctx.set_current_pts(90_000);
        ctx.set_fts();
        let a = ctx.get_fts(1);
        let b = ctx.get_fts(1);
        let c = ctx.get_fts(1);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn visible_start_never_overlaps_previous_end() {
        let mut ctx = TimingContext::new();
        ctx.set_current_pts(90_000);
        ctx.set_fts();
        let end1 = ctx.get_visible_end(1);
        let start2 = ctx.get_visible_start(1);
        assert!(start2 > end1);
    }

    #[test]
    fn pts_wraparound_triggers_reset_and_monotonic_fts() {
        let mut ctx = TimingContext::new();
        ctx.set_current_pts(0x1FFFF_FFFF);
        ctx.set_fts();
        let fts_before_wrap = ctx.get_fts(1);
        assert!(fts_before_wrap >= 0);

        ctx.set_current_pts(0x0);
        assert!(ctx.pts_reset);
        assert_eq!(ctx.fts_offset, ctx.fts_max);

        ctx.set_fts();
        let fts_after_wrap = ctx.get_fts(1);
        assert!(fts_after_wrap >= ctx.fts_max - 1);
    }

    #[test]
    fn notify_new_file_preserves_fts_global_and_minimum_fts() {
        let mut ctx = TimingContext::new();
        ctx.set_current_pts(90_000 * 10);
        ctx.set_fts();
        ctx.get_visible_end(1);
        let max_before = ctx.fts_max;
        let minimum_before = ctx.minimum_fts;

        ctx.notify_new_file();

        assert_eq!(ctx.fts_global, max_before);
        assert_eq!(ctx.minimum_fts, minimum_before);
        assert_eq!(ctx.fts_max, 0);
        assert_eq!(ctx.pts_set, PtsSetState::None);
    }

    #[test]
    fn add_current_pts_advances_without_discontinuity_flag() {
        let mut ctx = TimingContext::new();
        ctx.set_current_pts(1000);
        ctx.add_current_pts(3003); // ~ one NTSC frame at 90kHz
        assert_eq!(ctx.current_pts, 4003);
        assert!(!ctx.pts_reset);
    }

    #[test]
    fn try_set_max_dif_rejects_non_positive() {
        let mut ctx = TimingContext::new();
        assert!(ctx.try_set_max_dif_seconds(0).is_err());
        assert!(ctx.try_set_max_dif_seconds(-1).is_err());
        assert!(ctx.try_set_max_dif_seconds(10).is_ok());
    }
}
