//! Human-readable labels for minute counts and countdowns.

const MINUTES_PER_HOUR: u64 = 60;
const HOURS_PER_DAY: u64 = 24;

/// `X天Y小时` from one day up, `X小时Y分钟` from one hour up, else `X分钟`.
#[must_use]
pub fn format_duration(minutes: u64) -> String {
    let hours = minutes / MINUTES_PER_HOUR;
    let days = hours / HOURS_PER_DAY;

    if days > 0 {
        return format!("{days}天{}小时", hours % HOURS_PER_DAY);
    }
    if hours > 0 {
        return format!("{hours}小时{}分钟", minutes % MINUTES_PER_HOUR);
    }
    format!("{minutes}分钟")
}

/// Banner for the all-time total shown on the home screen.
#[must_use]
pub fn total_time_label(minutes: u64) -> String {
    let hours = minutes / MINUTES_PER_HOUR;
    let days = hours / HOURS_PER_DAY;
    if days > 0 {
        return format!("总共陪伴了 {days} 天 {} 小时", hours % HOURS_PER_DAY);
    }
    format!("总共陪伴了 {hours} 小时 {} 分钟", minutes % MINUTES_PER_HOUR)
}

/// Compact label used in the history list; drops a zero minute part.
#[must_use]
pub fn history_duration_label(minutes: u64) -> String {
    if minutes < MINUTES_PER_HOUR {
        return format!("{minutes}分钟");
    }
    let hours = minutes / MINUTES_PER_HOUR;
    match minutes % MINUTES_PER_HOUR {
        0 => format!("{hours}小时"),
        rest => format!("{hours}小时 {rest}分钟"),
    }
}

/// `MM:SS`; minutes are not wrapped into hours.
#[must_use]
pub fn countdown_label(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_minutes_has_no_larger_units() {
        assert_eq!(format_duration(0), "0分钟");
    }

    #[test]
    fn ninety_minutes_shows_hours_and_minutes() {
        assert_eq!(format_duration(90), "1小时30分钟");
    }

    #[test]
    fn long_durations_show_days() {
        assert_eq!(format_duration(1500), "1天1小时");
        assert_eq!(format_duration(24 * 60), "1天0小时");
    }

    #[test]
    fn total_label_switches_to_days() {
        assert_eq!(total_time_label(125), "总共陪伴了 2 小时 5 分钟");
        assert_eq!(total_time_label(3000), "总共陪伴了 2 天 2 小时");
    }

    #[test]
    fn history_label_drops_zero_minutes() {
        assert_eq!(history_duration_label(45), "45分钟");
        assert_eq!(history_duration_label(120), "2小时");
        assert_eq!(history_duration_label(135), "2小时 15分钟");
    }

    #[test]
    fn countdown_pads_both_fields() {
        assert_eq!(countdown_label(25 * 60), "25:00");
        assert_eq!(countdown_label(61), "01:01");
        assert_eq!(countdown_label(0), "00:00");
    }
}
