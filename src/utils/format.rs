//! Human-readable duration strings

/// Render a number of seconds the way the dashboard displays delays
///
/// Values under a minute render as `"{s}s"`. Longer values render as
/// `"{m}m {s}s"`, dropping the seconds part when it is zero.
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{}s", seconds);
    }

    let minutes = seconds / 60;
    let remainder = seconds % 60;
    if remainder == 0 {
        format!("{}m", minutes)
    } else {
        format!("{}m {}s", minutes, remainder)
    }
}
