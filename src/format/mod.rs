//! Number padding, media time and date formatting.

mod date;
mod time;

pub use date::{format_date, format_now, DEFAULT_DATE_PATTERN};
pub use time::{format_time, str_repeat};
