//! Helpers shared by backend listings.

use chrono::{DateTime, Local, Utc};
use ossgate_core::models::ObjectEntry;

const KB: f64 = 1024.0;
const MB: f64 = KB * 1024.0;
const GB: f64 = MB * 1024.0;

/// Format a byte count for listings.
///
/// The unit is picked from the number of decimal digits of `size` (up to three
/// digits is bytes, up to six KB, up to nine MB, beyond that GB) and the value
/// is divided by powers of 1024. So 1000 bytes renders as `0.98KB`.
pub fn human_readable_size(size: u64) -> String {
    let digits = size.to_string().len();
    let value = size as f64;
    if digits < 4 {
        format!("{}B", size)
    } else if digits < 7 {
        format!("{:.2}KB", value / KB)
    } else if digits < 10 {
        format!("{:.2}MB", value / MB)
    } else {
        format!("{:.2}GB", value / GB)
    }
}

/// Format a modification time as `yyyy-MM-dd` in the server's time zone.
pub fn format_last_modified(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

pub(crate) fn object_entry(
    name: String,
    url: String,
    size: u64,
    last_modified: DateTime<Utc>,
) -> ObjectEntry {
    ObjectEntry {
        name,
        url,
        size: human_readable_size(size),
        last_modified: format_last_modified(last_modified),
    }
}
