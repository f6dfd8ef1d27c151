use std::time::Duration;

/// Formats an elapsed duration as `HH:MM:SS` for the run summary.
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn mb_from_bytes(bytes: u64) -> f64 {
    bytes as f64 / 1_048_576.0
}

pub fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn format_duration_renders_hours_minutes_seconds() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_duration(Duration::from_secs(59)), "00:00:59");
        assert_eq!(format_duration(Duration::from_secs(3725)), "01:02:05");
    }

    #[test]
    fn mb_from_bytes_converts_mebibytes() {
        assert_eq!(mb_from_bytes(0), 0.0);
        assert_eq!(mb_from_bytes(2 * 1_048_576), 2.0);
        assert_eq!(round_two_decimals(mb_from_bytes(1_572_864)), 1.5);
    }

    #[test]
    fn round_two_decimals_truncates_to_cents() {
        assert_eq!(round_two_decimals(12.3456), 12.35);
        assert_eq!(round_two_decimals(0.004), 0.0);
    }
}
