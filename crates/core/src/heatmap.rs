//! Read-only views over daily progress: today's summary and the month grid.

use chrono::{Datelike, Duration, NaiveDate};

use crate::model::DailyProgress;

/// One day in the month grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    /// Day total relative to the busiest day of the month, 0.0..=1.0.
    pub intensity: f64,
    pub progress: Option<DailyProgress>,
}

/// Today's record, or an empty one.
#[must_use]
pub fn today_summary(progress: &[DailyProgress], today: NaiveDate) -> DailyProgress {
    progress
        .iter()
        .find(|p| p.date() == today)
        .copied()
        .unwrap_or_else(|| DailyProgress::empty(today))
}

/// One cell per calendar day of `year`-`month`; empty for an invalid month.
#[must_use]
pub fn month_cells(progress: &[DailyProgress], year: i32, month: u32) -> Vec<HeatmapCell> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let in_month: Vec<&DailyProgress> = progress
        .iter()
        .filter(|p| p.date().year() == year && p.date().month() == month)
        .collect();
    let max_total = in_month
        .iter()
        .map(|p| p.total_duration())
        .max()
        .unwrap_or(0)
        .max(1);

    (0..31)
        .map(|offset| first + Duration::days(offset))
        .take_while(|date| date.month() == month)
        .map(|date| {
            let day = in_month.iter().find(|p| p.date() == date).copied().copied();
            let intensity = day.map_or(0.0, |p| {
                f64::from(p.total_duration()) / f64::from(max_total)
            });
            HeatmapCell {
                date,
                intensity,
                progress: day,
            }
        })
        .collect()
}

/// Fixed shade bucket for a day's total minutes: 0 for nothing, then one
/// step per started hour up to four hours, 5 beyond that.
#[must_use]
pub fn bucket_level(total_minutes: u32) -> u8 {
    match total_minutes {
        0 => 0,
        1..=60 => 1,
        61..=120 => 2,
        121..=180 => 3,
        181..=240 => 4,
        _ => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_defaults_to_empty_record() {
        let today = day(2024, 3, 9);
        let summary = today_summary(&[], today);
        assert_eq!(summary, DailyProgress::empty(today));

        let progress = vec![DailyProgress::from_persisted(today, 3, 75)];
        assert_eq!(today_summary(&progress, today).sessions_count(), 3);
    }

    #[test]
    fn month_grid_has_one_cell_per_day() {
        assert_eq!(month_cells(&[], 2024, 2).len(), 29);
        assert_eq!(month_cells(&[], 2023, 2).len(), 28);
        assert_eq!(month_cells(&[], 2024, 12).len(), 31);
        assert!(month_cells(&[], 2024, 13).is_empty());
    }

    #[test]
    fn intensity_is_relative_to_busiest_day() {
        let progress = vec![
            DailyProgress::from_persisted(day(2024, 3, 1), 1, 30),
            DailyProgress::from_persisted(day(2024, 3, 2), 2, 120),
            DailyProgress::from_persisted(day(2024, 4, 1), 9, 999),
        ];
        let cells = month_cells(&progress, 2024, 3);

        assert!((cells[0].intensity - 0.25).abs() < 1e-9);
        assert!((cells[1].intensity - 1.0).abs() < 1e-9);
        assert!(cells[2].intensity.abs() < 1e-9);
        assert!(cells[2].progress.is_none());
    }

    #[test]
    fn bucket_levels_step_by_hour() {
        assert_eq!(bucket_level(0), 0);
        assert_eq!(bucket_level(60), 1);
        assert_eq!(bucket_level(61), 2);
        assert_eq!(bucket_level(180), 3);
        assert_eq!(bucket_level(240), 4);
        assert_eq!(bucket_level(241), 5);
    }
}
