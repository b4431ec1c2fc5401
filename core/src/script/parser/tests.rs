use super::*;

// parse_timecode
#[test]
fn test_timecode_hours_minutes_seconds() {
    assert_eq!(parse_timecode("01:02:03"), 3723.0);
}

#[test]
fn test_timecode_minutes_seconds() {
    assert_eq!(parse_timecode("02:03"), 123.0);
}

#[test]
fn test_timecode_seconds_only() {
    assert_eq!(parse_timecode("5"), 5.0);
}

#[test]
fn test_timecode_fractional_segments() {
    assert_eq!(parse_timecode("1:30.5"), 90.5);
    assert_eq!(parse_timecode("0.5:00"), 30.0);
}

#[test]
fn test_timecode_malformed_segment_counts_as_zero() {
    assert_eq!(parse_timecode("bad:03"), 3.0);
    assert_eq!(parse_timecode("01:xx:10"), 3610.0);
    assert_eq!(parse_timecode(""), 0.0);
    assert_eq!(parse_timecode("::"), 0.0);
}

#[test]
fn test_timecode_ignores_extra_segments() {
    assert_eq!(parse_timecode("9:01:00:00"), 3600.0);
}

// parse_number
#[test]
fn test_number_leading_prefix() {
    assert_eq!(parse_number("1.5x"), Some(1.5));
    assert_eq!(parse_number(".25"), Some(0.25));
    assert_eq!(parse_number("-2"), Some(-2.0));
    assert_eq!(parse_number("3e2"), Some(300.0));
    assert_eq!(parse_number("3e"), Some(3.0));
}

#[test]
fn test_number_rejects_non_numeric() {
    assert_eq!(parse_number("abc"), None);
    assert_eq!(parse_number("."), None);
    assert_eq!(parse_number("-"), None);
    assert_eq!(parse_number("inf"), None);
    assert_eq!(parse_number("NaN"), None);
    assert_eq!(parse_number("1e999"), None);
}

// parse_script
#[test]
fn test_full_line() {
    let cues = parse_script("10 0.5 1.2 Hello world");
    assert_eq!(cues.len(), 1);

    let cue = &cues[0];
    assert_eq!(cue.trigger_time(), 10.0);
    assert_eq!(cue.pause_duration(), 0.5);
    assert_eq!(cue.speech_rate(), 1.2);
    assert_eq!(cue.text(), "Hello world");
}

#[test]
fn test_timecode_only_line_uses_defaults() {
    let cues = parse_script("5");
    assert_eq!(cues, vec![Cue::new(5.0, 0.0, 1.0, "")]);
}

#[test]
fn test_skips_comments_and_blank_lines() {
    let script = "; intro\n\n   \n  ; indented comment\n1 0 1 First\n\n2 0 1 Second\n";
    let cues = parse_script(script);

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text(), "First");
    assert_eq!(cues[1].text(), "Second");
}

#[test]
fn test_keeps_source_order() {
    let cues = parse_script("30 0 1 late\n10 0 1 early\n20 0 1 middle");
    let times: Vec<f64> = cues.iter().map(Cue::trigger_time).collect();
    assert_eq!(times, vec![30.0, 10.0, 20.0]);
}

#[test]
fn test_malformed_pause_and_rate_fall_back() {
    let cues = parse_script("00:10 soon fast Look out");
    let cue = &cues[0];
    assert_eq!(cue.trigger_time(), 10.0);
    assert_eq!(cue.pause_duration(), 0.0);
    assert_eq!(cue.speech_rate(), 1.0);
    assert_eq!(cue.text(), "Look out");
}

#[test]
fn test_non_positive_rate_and_negative_pause_fall_back() {
    let cues = parse_script("4 -1 0 zero rate\n5 2 -3 negative rate");
    assert_eq!(cues[0].pause_duration(), 0.0);
    assert_eq!(cues[0].speech_rate(), 1.0);
    assert_eq!(cues[1].pause_duration(), 2.0);
    assert_eq!(cues[1].speech_rate(), 1.0);
}

#[test]
fn test_negative_timecode_clamps_to_zero() {
    let cues = parse_script("-5 0 1 before start");
    assert_eq!(cues[0].trigger_time(), 0.0);
}

#[test]
fn test_whitespace_runs_collapse_in_text() {
    let cues = parse_script("  7  1   1.5   Two   spaces  here  \r\n");
    let cue = &cues[0];
    assert_eq!(cue.trigger_time(), 7.0);
    assert_eq!(cue.pause_duration(), 1.0);
    assert_eq!(cue.speech_rate(), 1.5);
    assert_eq!(cue.text(), "Two spaces here");
}

#[test]
fn test_crlf_line_endings() {
    let cues = parse_script("1 0 1 a\r\n; note\r\n2 0 1 b\r\n");
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[1].text(), "b");
}

#[test]
fn test_empty_script() {
    assert!(parse_script("").is_empty());
    assert!(parse_script("; only comments\n;\n").is_empty());
}
