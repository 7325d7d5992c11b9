use super::*;

#[test]
fn advance_rolls_frames_into_seconds() {
    let mut tc = Timecode::new(30).unwrap();
    assert_eq!(tc.frame_num(), 1);
    assert!(!tc.is_running());

    for _ in 0..30 {
        tc.advance();
    }
    assert!(tc.is_running());
    assert_eq!(tc.frame_num(), 31);
    assert_eq!(tc.current().second_of_day(), 1);
    assert_eq!(tc.current().frame(), 0);
}

#[test]
fn advance_cascades_across_midnight() {
    let mut tc = Timecode::new(30).unwrap();
    tc.set("23:59:59:29").unwrap();
    tc.advance();
    assert_eq!(tc.current().day(), 1);
    assert_eq!(tc.current().second_of_day(), 0);
    assert_eq!(tc.current().frame(), 0);
}

#[test]
fn set_fails_once_running() {
    let mut tc = Timecode::new(30).unwrap();
    tc.set("01:00:00").unwrap();
    assert_eq!(tc.start(), tc.current());

    tc.advance();
    let err = tc.set("02:00:00").unwrap_err();
    assert!(matches!(err, crate::FrameryError::Timecode(_)));
}

#[test]
fn for_frames_runs_through_the_target_frame() {
    let cases = [
        ("00:00:00:00", 10, "00:00:00:10"),
        ("00:00:00:00", 30, "00:00:01:00"),
        ("00:00:00:00", 90, "00:00:03:00"),
        ("23:59:59:10", 30, "01:00:00:00:10"),
        ("23:59:59:20", 90, "01:00:00:02:20"),
    ];
    for (start, count, expect) in cases {
        let mut tc = Timecode::new(30).unwrap();
        tc.set(start).unwrap();
        let last = tc.for_frames(count).last().unwrap();
        let expect = TimecodeFragment::parse(expect, 30).unwrap();
        assert_eq!(last, expect, "start {start}, count {count}");
    }
}

#[test]
fn until_is_inclusive_and_crosses_midnight() {
    let cases = [
        ("00:00:00:00", "00:00:00:10", "00:00:00:10"),
        ("00:00:00:00", "00:00:02:00", "00:00:02:00"),
        ("23:59:59:20", "00:00:01:00", "01:00:00:01:00"),
        ("23:59:59:20", "00:00:03:00", "01:00:00:03:00"),
    ];
    for (start, until, expect) in cases {
        let mut tc = Timecode::new(30).unwrap();
        tc.set(start).unwrap();
        let last = tc.until(until).unwrap().last().unwrap();
        let expect = TimecodeFragment::parse(expect, 30).unwrap();
        assert_eq!(last, expect, "start {start}, until {until}");
    }
}

#[test]
fn iterator_advances_the_cursor_once_per_frame() {
    let mut tc = Timecode::new(30).unwrap();
    let yielded: Vec<_> = tc.for_frames(4).collect();
    assert_eq!(yielded.len(), 5);
    assert_eq!(tc.frame_num(), 1 + 5);
    assert_eq!(tc.current(), yielded[4].add_frames(1));
}
