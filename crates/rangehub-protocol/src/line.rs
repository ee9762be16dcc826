//! Inbound telemetry line grammar.
//!
//! The device streams one reading per line:
//!
//! ```text
//! distance:<integer>     ; millimeters, payload whitespace-trimmed
//! alert:<integer>        ; 1 = active, any other integer = inactive
//! ```
//!
//! Keywords match case-insensitively. The protocol is intentionally lossy:
//! malformed payloads and unrecognized lines parse to `None` and are dropped
//! by the caller without surfacing an error.

/// One recognized inbound telemetry line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryLine {
    /// A distance reading in millimeters.
    Distance(i64),

    /// The device's alert flag. Only an exact payload of `1` is active.
    Alert(bool),
}

impl TelemetryLine {
    /// Parse a single non-blank line.
    ///
    /// Returns `None` for unrecognized keywords and unparsable payloads;
    /// the telemetry protocol is best-effort and such lines are silently
    /// ignored upstream.
    ///
    /// # Example
    ///
    /// ```
    /// use rangehub_protocol::TelemetryLine;
    ///
    /// assert_eq!(TelemetryLine::parse("distance:1500"), Some(TelemetryLine::Distance(1500)));
    /// assert_eq!(TelemetryLine::parse("alert:2"), Some(TelemetryLine::Alert(false)));
    /// assert_eq!(TelemetryLine::parse("distance:abc"), None);
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        if let Some(payload) = strip_keyword(line, "distance:") {
            let mm = payload.trim().parse::<i64>().ok()?;
            return Some(Self::Distance(mm));
        }

        if let Some(payload) = strip_keyword(line, "alert:") {
            let value = payload.trim().parse::<i64>().ok()?;
            return Some(Self::Alert(value == 1));
        }

        None
    }
}

/// Case-insensitive prefix match returning the remainder of the line.
///
/// `split_at_checked` keeps this panic-free on lines containing multi-byte
/// characters (the codec decodes lossily, so they can occur).
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let (head, rest) = line.split_at_checked(keyword.len())?;
    head.eq_ignore_ascii_case(keyword).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("distance:1500", 1500)]
    #[case("distance: 1500", 1500)]
    #[case("distance:  42  ", 42)]
    #[case("DISTANCE:3000", 3000)]
    #[case("Distance:0", 0)]
    #[case("distance:-5", -5)]
    fn distance_lines_parse(#[case] line: &str, #[case] expected: i64) {
        assert_eq!(TelemetryLine::parse(line), Some(TelemetryLine::Distance(expected)));
    }

    #[rstest]
    #[case("alert:1", true)]
    #[case("ALERT:1", true)]
    #[case("alert: 1 ", true)]
    #[case("alert:0", false)]
    #[case("alert:2", false)] // only exactly 1 is active
    #[case("alert:-1", false)]
    fn alert_lines_parse(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(TelemetryLine::parse(line), Some(TelemetryLine::Alert(expected)));
    }

    #[rstest]
    #[case("distance:abc")] // non-integer payload
    #[case("distance:")] // empty payload
    #[case("alert:yes")]
    #[case("temperature:20")] // unknown keyword
    #[case("distance 1500")] // missing colon
    #[case("PING")]
    #[case("")]
    #[case("дistance:5")] // multi-byte garbage from lossy decode
    fn unrecognized_lines_parse_to_none(#[case] line: &str) {
        assert_eq!(TelemetryLine::parse(line), None);
    }
}
