//! Display conversions for raw item values
//!
//! Metric snapshots carry the backend's unconverted `lastvalue` strings. These
//! helpers turn them into what a dashboard shows. Non-numeric input is passed
//! through unchanged.

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Percentage with two decimals; values within `[-1, 1]` are treated as fractions.
pub fn format_percent(raw: &str) -> String {
    match parse_finite(raw) {
        Some(n) if n.abs() <= 1.0 => format!("{:.2}", n * 100.0),
        Some(n) => format!("{:.2}", n),
        None => raw.to_string(),
    }
}

pub fn bytes_to_gb(raw: &str) -> String {
    match parse_finite(raw) {
        Some(n) => format!("{:.2} GB", n / BYTES_PER_GB),
        None => raw.to_string(),
    }
}

/// Uptime such as `3d 4h 12m`; under a minute renders as seconds.
pub fn seconds_to_human(raw: &str) -> String {
    let Some(n) = parse_finite(raw) else {
        return raw.to_string();
    };

    let mut seconds = n.floor().max(0.0) as u64;
    let days = seconds / 86_400;
    seconds -= days * 86_400;
    let hours = seconds / 3_600;
    seconds -= hours * 3_600;
    let minutes = seconds / 60;

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (minutes, "m")]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    if parts.is_empty() {
        format!("{:.0}s", n)
    } else {
        parts.join(" ")
    }
}

pub fn format_cpu_count(raw: &str) -> String {
    match parse_finite(raw) {
        Some(n) => format!("{}", n.trunc() as i64),
        None => raw.to_string(),
    }
}
