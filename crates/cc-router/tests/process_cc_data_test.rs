//! Black-box integration tests for `cc_router::CcRouter`.

use cc_core::parity::add_parity;
use cc_core::{SubtitleKind, SubtitlePayload};
use cc_router::CcRouter;

fn field1(hi: u8, lo: u8) -> (u8, u8, u8) {
    (0x01, add_parity(hi), add_parity(lo))
}

/// A full pop-on caption cycle (RCL, PAC, two text bytes, EDM) driven
/// end to end through the router should surface exactly one decoded
/// cue with the expected text.
#[test]
fn pop_on_cycle_yields_one_cc608_cue() {
    let mut router = CcRouter::new();
    router.set_current_pts(90_000);
    router.set_fts();

    let records = vec![
        field1(0x14, 0x20), // RCL
        field1(0x14, 0x60), // PAC, row/indent/style
        field1(b'H', b'I'),
        field1(0x14, 0x2C), // EDM
    ];

    let subs = router.process_cc_data(&records).unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].kind, SubtitleKind::Cc608);
    match &subs[0].payload {
        SubtitlePayload::Cc608(screen) => {
            let text: String = screen.rows.iter().map(|r| r.text()).collect();
            assert!(text.contains("HI"));
        }
        _ => panic!("expected a 608 payload"),
    }
}

/// A stream that never sets an extraction window processes every
/// record and never reports `processed_enough`.
#[test]
fn without_a_window_the_router_never_stops_early() {
    let mut router = CcRouter::new();
    router.set_current_pts(90_000);
    router.set_fts();
    for _ in 0..5 {
        let _ = router.process_cc_data(&[field1(0x80, 0x80)]).unwrap();
        router.add_current_pts(3000);
        router.set_fts();
    }
    assert!(!router.processed_enough());
}

/// RCWT pass-through, once enabled, reproduces exactly the records fed
/// to the router, in order, through the public reader API.
#[test]
fn rcwt_round_trips_every_fed_record() {
    let mut router = CcRouter::new();
    router.enable_rcwt();
    router.set_current_pts(90_000);
    router.set_fts();

    let records = vec![field1(0x80, 0x80), field1(b'H', b'I')];
    let _ = router.process_cc_data(&records).unwrap();

    let bytes = router.rcwt_bytes().unwrap();
    let offset = cc_router::rcwt::read_header(bytes).unwrap();
    let frames = cc_router::rcwt::read_frames(bytes, offset);
    assert_eq!(frames.len(), records.len());
    for (frame, rec) in frames.iter().zip(records.iter()) {
        assert_eq!(frame.records[0], *rec);
    }
}

/// Accumulated stats across collaborators surface a bad-parity byte
/// fed through the field-1 decoder.
#[test]
fn bad_parity_byte_is_reflected_in_router_stats() {
    let mut router = CcRouter::new();
    router.set_current_pts(90_000);
    router.set_fts();
    // 0x81 has even parity (two set bits including bit 7) -- invalid.
    let _ = router.process_cc_data(&[(0x01, 0x81, add_parity(0x80))]).unwrap();
    assert!(router.stats().bad_parity >= 1);
}
