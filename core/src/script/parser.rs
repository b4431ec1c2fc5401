use super::Cue;

#[cfg(test)]
mod tests;

const COMMENT_PREFIX: char = ';';

/// Multipliers for timecode segments, read right to left (SS, MM, HH)
const TIMECODE_UNITS: [f64; 3] = [1.0, 60.0, 3600.0];

/// Parse a whole script into cues, in line order.
///
/// Blank lines and `;` comments are skipped. Malformed numbers degrade to
/// their defaults instead of failing, so this never rejects input.
pub fn parse_script(raw: &str) -> Vec<Cue> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_PREFIX))
        .map(parse_line)
        .collect()
}

// timecode [pause] [rate] [text...]
fn parse_line(line: &str) -> Cue {
    // runs of spaces yield empty tokens; dropping them collapses the text
    let mut tokens = line.split(' ').filter(|t| !t.is_empty());

    let trigger_time = tokens.next().map(parse_timecode).unwrap_or_default();
    let pause = tokens
        .next()
        .and_then(parse_number)
        .filter(|p| *p >= 0.0)
        .unwrap_or(0.0);
    let rate = tokens
        .next()
        .and_then(parse_number)
        .filter(|r| *r > 0.0)
        .unwrap_or(1.0);
    let text = tokens.collect::<Vec<_>>().join(" ");

    Cue::new(trigger_time, pause, rate as f32, text)
}

/// Convert `HH:MM:SS`, `MM:SS` or `SS` to seconds.
///
/// Segments may be fractional. A malformed segment counts as zero and
/// anything left of the hours segment is ignored.
pub fn parse_timecode(code: &str) -> f64 {
    code.rsplit(':')
        .zip(TIMECODE_UNITS)
        .map(|(segment, unit)| parse_number(segment).unwrap_or(0.0) * unit)
        .sum()
}

/// Read the longest leading decimal number of `token` (`"1.5x"` → 1.5).
///
/// Returns `None` when there is no numeric prefix or the value is not finite.
fn parse_number(token: &str) -> Option<f64> {
    let b = token.as_bytes();
    let mut end = 0;

    if matches!(b.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < b.len() && b[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < b.len() && b[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < b.len() && b[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // exponent only counts when at least one digit follows it
    if end < b.len() && matches!(b[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(b.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < b.len() && b[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    token[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
