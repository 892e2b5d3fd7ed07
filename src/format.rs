//! Human-readable numbers and durations for logs and offline reports.

const SUFFIXES: [&str; 12] = ["", "K", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "Oc", "No", "Dc"];

/// Short-scale number: `999`, `1.5K`, `2.00M`, ... and scientific notation
/// past decillions. `decimals` applies to the scaled mantissa.
pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    if n < 1000.0 {
        return format!("{:.*}", decimals, n);
    }
    let mut tier = (n.log10() / 3.0).floor() as usize;
    let mut scaled = n / 10f64.powi(tier as i32 * 3);
    // 999.95K at one decimal prints as 1000.0K; bump to the next tier
    let step = 10f64.powi(decimals as i32);
    if (scaled * step).round() / step >= 1000.0 {
        tier += 1;
        scaled /= 1000.0;
    }
    if tier >= SUFFIXES.len() {
        return format!("{:.2e}", n);
    }
    format!("{:.*}{}", decimals, scaled, SUFFIXES[tier])
}

/// `1h 5m`, `5m 3s` or `3s`.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Long form for "while you were away" messages: `2 days 3 hours`,
/// `1 hour 5 minutes`, `12 minutes`, `40 seconds`.
pub fn format_offline_time(ms: f64) -> String {
    let seconds = (ms.max(0.0) / 1000.0).floor() as u64;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if days > 0 {
        format!("{} {}", plural(days, "day"), plural(hours % 24, "hour"))
    } else if hours > 0 {
        format!("{} {}", plural(hours, "hour"), plural(minutes % 60, "minute"))
    } else if minutes > 0 {
        plural(minutes, "minute")
    } else {
        plural(seconds, "second")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_numbers_are_plain() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(12.5, 1), "12.5");
    }

    #[test]
    fn large_numbers_get_suffixes() {
        assert_eq!(format_number(1_500.0, 1), "1.5K");
        assert_eq!(format_number(2_000_000.0, 2), "2.00M");
        assert_eq!(format_number(3e9, 0), "3B");
        assert_eq!(format_number(4.5e15, 1), "4.5Qa");
        assert_eq!(format_number(5e33, 0), "5Dc");
    }

    #[test]
    fn rounding_up_moves_to_next_suffix() {
        assert_eq!(format_number(999_999.9, 1), "1.0M");
        assert_eq!(format_number(999_940.0, 1), "999.9K");
        assert_eq!(format_number(999_999.0, 0), "1M");
    }

    #[test]
    fn huge_numbers_use_exponent() {
        assert_eq!(format_number(1.234e40, 0), "1.23e40");
    }

    #[test]
    fn duration_forms() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(65), "1m 5s");
        assert_eq!(format_duration(3_900), "1h 5m");
    }

    #[test]
    fn offline_time_forms() {
        assert_eq!(format_offline_time(999.0), "0 seconds");
        assert_eq!(format_offline_time(1_000.0), "1 second");
        assert_eq!(format_offline_time(40_000.0), "40 seconds");
        assert_eq!(format_offline_time(60_000.0), "1 minute");
        assert_eq!(format_offline_time(12.0 * 60_000.0), "12 minutes");
        assert_eq!(format_offline_time(3_660_000.0), "1 hour 1 minute");
        assert_eq!(format_offline_time(2.0 * 3_600_000.0 + 3.0 * 60_000.0), "2 hours 3 minutes");
        assert_eq!(format_offline_time(24.0 * 3_600_000.0), "1 day 0 hours");
        assert_eq!(format_offline_time(-5.0), "0 seconds");
    }
}
