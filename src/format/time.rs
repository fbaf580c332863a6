//! Zero padding and `h:mm:ss` media time.

use std::fmt::Display;

/// Render `num`, left-pad it with zeros to `width` characters, then keep the
/// first `width` characters.
///
/// Without a width the rendered value is returned as is.
pub fn str_repeat<T: Display>(num: T, width: Option<usize>) -> String {
    let rendered = num.to_string();
    let Some(width) = width else {
        return rendered;
    };

    let len = rendered.chars().count();
    let mut padded = "0".repeat(width.saturating_sub(len));
    padded.push_str(&rendered);
    padded.chars().take(width).collect()
}

/// Format a playback position in seconds as `mm:ss`, or `h:mm:ss` from one
/// hour on. Fractions are dropped; negative or NaN input counts as zero.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };

    let hours = total / 3600;
    let minutes = str_repeat((total % 3600) / 60, Some(2));
    let secs = str_repeat(total % 60, Some(2));

    if hours >= 1 {
        format!("{}:{}:{}", hours, minutes, secs)
    } else {
        format!("{}:{}", minutes, secs)
    }
}
