// File: ./src/view/format.rs
use chrono::{DateTime, Duration, Utc};
use ratatui::style::Color;
use std::hash::{Hash, Hasher};

/// Format used by the form's date inputs, e.g. `18/03/24 10:30`.
pub const FORM_DATE_FORMAT: &str = "%d/%m/%y %H:%M";

pub fn format_day(dt: DateTime<Utc>) -> String {
    dt.format("%b %d").to_string().to_uppercase()
}

pub fn format_time(dt: DateTime<Utc>) -> String {
    dt.format("%H:%M").to_string()
}

pub fn format_form_date(dt: DateTime<Utc>) -> String {
    dt.format(FORM_DATE_FORMAT).to_string()
}

/// `45M`, `02H 10M` or `03D 02H 10M`, depending on the largest unit present.
pub fn format_duration(d: Duration) -> String {
    let total = d.num_minutes().max(0);
    let days = total / (24 * 60);
    let hours = (total % (24 * 60)) / 60;
    let mins = total % 60;

    if days > 0 {
        format!("{:02}D {:02}H {:02}M", days, hours, mins)
    } else if hours > 0 {
        format!("{:02}H {:02}M", hours, mins)
    } else {
        format!("{:02}M", mins)
    }
}

/// Stable color per event type so the same kind of leg always looks the same.
pub fn type_color(kind: &str) -> Color {
    const PALETTE: [Color; 6] = [
        Color::LightBlue,
        Color::LightGreen,
        Color::LightMagenta,
        Color::LightCyan,
        Color::LightYellow,
        Color::LightRed,
    ];
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    kind.hash(&mut hasher);
    PALETTE[(hasher.finish() % PALETTE.len() as u64) as usize]
}
