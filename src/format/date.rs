//! Pattern-based date formatting (`yyyy-MM-dd hh:mm:ss.i`).

use chrono::{Datelike, Local, Timelike};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Pattern used when none is given.
pub const DEFAULT_DATE_PATTERN: &str = "yyyy-MM-dd hh:mm:ss.i";

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new("(?i)y+").expect("valid regex"));

/// Field letters in replacement order. `h` is the 24-hour clock, `i` is milliseconds.
static FIELDS: LazyLock<Vec<(char, Regex)>> = LazyLock::new(|| {
    ['M', 'd', 'h', 'm', 's', 'i']
        .into_iter()
        .map(|letter| (letter, Regex::new(&format!("{}+", letter)).expect("valid regex")))
        .collect()
});

/// Format `date` with `pattern` (or [`DEFAULT_DATE_PATTERN`]).
///
/// A run of `y` (any case) becomes the last N digits of the year. Runs of
/// `M`, `d`, `h`, `m`, `s`, `i` become month, day, hour, minute, second and
/// millisecond; values below 10 get one leading zero when the run is longer
/// than one letter. Everything else is copied through.
pub fn format_date<T>(date: &T, pattern: Option<&str>) -> String
where
    T: Datelike + Timelike,
{
    let pattern = pattern.unwrap_or(DEFAULT_DATE_PATTERN);
    let year = date.year().to_string();

    let mut out = YEAR
        .replace_all(pattern, |caps: &Captures| {
            let run = caps[0].len().min(4);
            year.chars().skip(4 - run).collect::<String>()
        })
        .into_owned();

    // Leap seconds report nanoseconds past one second
    let millis = (date.nanosecond() / 1_000_000).min(999);

    for (letter, regex) in FIELDS.iter() {
        let value = match *letter {
            'M' => date.month(),
            'd' => date.day(),
            'h' => date.hour(),
            'm' => date.minute(),
            's' => date.second(),
            _ => millis,
        };
        out = regex
            .replace_all(&out, |caps: &Captures| {
                let prefix = if value < 10 && caps[0].len() > 1 { "0" } else { "" };
                format!("{}{}", prefix, value)
            })
            .into_owned();
    }

    out
}

/// Format the current local time.
pub fn format_now(pattern: Option<&str>) -> String {
    format_date(&Local::now(), pattern)
}
