use chrono::{FixedOffset, NaiveDate};

use crate::model::StudySession;

/// Per-calendar-day roll-up of archived sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyProgress {
    date: NaiveDate,
    sessions_count: u32,
    total_duration: u32,
}

impl DailyProgress {
    /// An empty record for `date`.
    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sessions_count: 0,
            total_duration: 0,
        }
    }

    #[must_use]
    pub fn from_persisted(date: NaiveDate, sessions_count: u32, total_duration: u32) -> Self {
        Self {
            date,
            sessions_count,
            total_duration,
        }
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn sessions_count(&self) -> u32 {
        self.sessions_count
    }

    /// Total focused minutes on this day.
    #[must_use]
    pub fn total_duration(&self) -> u32 {
        self.total_duration
    }

    fn accumulate(&mut self, minutes: u32) {
        self.sessions_count = self.sessions_count.saturating_add(1);
        self.total_duration = self.total_duration.saturating_add(minutes);
    }
}

/// Fold one session into the per-day list.
///
/// Looks the date up by equality and accumulates in place, or appends a new record.
/// Existing records keep their position.
pub fn record_session(
    progress: &mut Vec<DailyProgress>,
    session: &StudySession,
    offset: FixedOffset,
) -> DailyProgress {
    let date = session.date_key(offset);
    let minutes = session.duration_minutes();

    if let Some(existing) = progress.iter_mut().find(|p| p.date == date) {
        existing.accumulate(minutes);
        return *existing;
    }

    let mut fresh = DailyProgress::empty(date);
    fresh.accumulate(minutes);
    progress.push(fresh);
    fresh
}

/// Rebuild the per-day list from scratch.
#[must_use]
pub fn aggregate_sessions(sessions: &[StudySession], offset: FixedOffset) -> Vec<DailyProgress> {
    let mut progress = Vec::new();
    for session in sessions {
        record_session(&mut progress, session, offset);
    }
    progress
}

/// Sum of all session durations, in minutes.
#[must_use]
pub fn total_minutes(sessions: &[StudySession]) -> u64 {
    sessions
        .iter()
        .map(|s| u64::from(s.duration_minutes()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SessionId, StudySessionDraft, Task, TaskDraft, TaskId};
    use crate::time::fixed_now;
    use chrono::{DateTime, Duration, Utc};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn session_at(start: DateTime<Utc>, minutes: u32) -> StudySession {
        let finish = |content: &str| -> Task {
            let mut task = TaskDraft::new(content, minutes)
                .validate(TaskId::generate(), start)
                .unwrap();
            task.mark_completed(start + Duration::minutes(i64::from(minutes)))
                .unwrap();
            task
        };
        StudySessionDraft {
            id: SessionId::generate(),
            start_time: start,
            end_time: start + Duration::minutes(i64::from(minutes)),
            duration_minutes: minutes,
            user_task: finish("read"),
            companion_task: finish("写技术文档"),
            user_reflection: String::new(),
            companion_reflection: "完成了部分功能，明天继续加油".into(),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn first_session_of_a_day_appends_record() {
        let mut progress = Vec::new();
        let record = record_session(&mut progress, &session_at(fixed_now(), 25), utc());

        assert_eq!(progress.len(), 1);
        assert_eq!(record.sessions_count(), 1);
        assert_eq!(record.total_duration(), 25);
        assert_eq!(record.date(), NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
    }

    #[test]
    fn same_day_accumulates_in_place() {
        let earlier = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap();
        let mut progress = vec![DailyProgress::from_persisted(earlier, 2, 50)];
        let today = DailyProgress::from_persisted(
            NaiveDate::from_ymd_opt(2023, 11, 14).unwrap(),
            1,
            30,
        );
        progress.push(today);

        record_session(&mut progress, &session_at(fixed_now(), 45), utc());

        assert_eq!(progress.len(), 2);
        assert_eq!(progress[0].date(), earlier);
        assert_eq!(progress[1].sessions_count(), 2);
        assert_eq!(progress[1].total_duration(), 75);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let a = session_at(fixed_now(), 25);
        let b = session_at(fixed_now() + Duration::hours(1), 40);

        let forward = aggregate_sessions(&[a.clone(), b.clone()], utc());
        let backward = aggregate_sessions(&[b, a], utc());

        assert_eq!(forward, backward);
        assert_eq!(forward[0].total_duration(), 65);
    }

    #[test]
    fn date_key_follows_offset() {
        // 22:13 UTC is already the next day at UTC+8.
        let session = session_at(fixed_now(), 10);
        let progress = aggregate_sessions(&[session], FixedOffset::east_opt(8 * 3600).unwrap());
        assert_eq!(
            progress[0].date(),
            NaiveDate::from_ymd_opt(2023, 11, 15).unwrap()
        );
    }

    #[test]
    fn total_minutes_sums_durations() {
        let sessions = vec![session_at(fixed_now(), 25), session_at(fixed_now(), 1)];
        assert_eq!(total_minutes(&sessions), 26);
        assert_eq!(total_minutes(&[]), 0);
    }
}
