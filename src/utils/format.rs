//! Time display formatting and parsing

use std::time::Duration;

/// Format a duration as `MM:SS.CC` (zero-padded minutes, seconds and
/// centiseconds). Minutes grow past two digits rather than wrapping.
pub fn format_time(duration: Duration) -> String {
    let ms = duration.as_millis();
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let centiseconds = (ms % 1000) / 10;
    format!("{:02}:{:02}.{:02}", minutes, seconds, centiseconds)
}

/// Format a duration as `MM:SS`, without centiseconds.
pub fn format_time_short(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Parse `MM:SS` or `MM:SS.CC` into a duration. Returns `None` when the
/// string has no minute/second structure.
pub fn parse_time_string(text: &str) -> Option<Duration> {
    let (minutes, rest) = text.split_once(':')?;
    let minutes: u64 = minutes.trim().parse().ok()?;
    let (seconds, centis) = match rest.split_once('.') {
        Some((seconds, centis)) => (seconds, Some(centis)),
        None => (rest, None),
    };
    let seconds: u64 = seconds.trim().parse().ok()?;
    let centis: u64 = match centis {
        Some(centis) => centis.trim().parse().ok()?,
        None => 0,
    };
    Some(Duration::from_millis(
        (minutes * 60 + seconds) * 1000 + centis * 10,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn formats_zero_padded_centiseconds() {
        assert_eq!(format_time(Duration::ZERO), "00:00.00");
        assert_eq!(format_time(ms(65_432)), "01:05.43");
        assert_eq!(format_time(ms(3_599_990)), "59:59.99");
    }

    #[test]
    fn long_durations_do_not_wrap() {
        assert_eq!(format_time(Duration::from_secs(7200)), "120:00.00");
    }

    #[test]
    fn short_format_drops_centiseconds() {
        assert_eq!(format_time_short(ms(65_432)), "01:05");
        assert_eq!(format_time_short(Duration::ZERO), "00:00");
    }

    #[test]
    fn parses_both_accepted_shapes() {
        assert_eq!(parse_time_string("01:05.43"), Some(ms(65_432)));
        assert_eq!(parse_time_string("10:00"), Some(ms(600_000)));
        assert_eq!(parse_time_string("junk"), None);
        assert_eq!(parse_time_string("1:xx"), None);
    }

    #[test]
    fn parse_inverts_format() {
        let value = ms(83_710);
        assert_eq!(parse_time_string(&format_time(value)), Some(value));
    }
}
