use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use focus_core::catalog::{Catalog, Character, CompletionLevel};
use focus_core::countdown::{Countdown, TickOutcome};
use focus_core::format::total_time_label;
use focus_core::message::pick_message;
use focus_core::model::{
    AudioSettings, AudioSettingsDraft, CompanionState, DailyProgress, SessionId, StudySession,
    StudySessionDraft, TagName, Task, TaskDraft, TaskId,
};
use focus_core::scheduler::{TimerId, TimerScheduler};
use focus_core::time::Clock;
use storage::repository::FocusStore;

use super::journal::SessionJournal;
use super::phase::{ExitOutcome, LifecycleEvent, Phase, ReflectionOutcome, TimerEvent};
use crate::config::LifecycleTimings;
use crate::error::LifecycleError;

/// Shown while the companion deliberates.
pub const THOUGHT_PROCESS: &str = "思考中...";

#[derive(Debug, Clone, Copy)]
enum Lines {
    Tasks,
    Thinking,
    Reflection(CompletionLevel),
}

/// Drives one user task from submission to an archived session.
///
/// Time only moves through [`FocusController::advance`]: the controller owns a
/// virtual timer scheduler and moves its `Clock` along with it, so a fixed
/// clock stays consistent with the timers that fire.
pub struct FocusController {
    clock: Clock,
    catalog: Catalog,
    character_id: String,
    store: FocusStore,
    journal: SessionJournal,
    tags: Vec<String>,
    audio: AudioSettings,
    rng: StdRng,
    timings: LifecycleTimings,
    scheduler: TimerScheduler<TimerEvent, Phase>,
    phase: Phase,
    companion: CompanionState,
    user_task: Option<Task>,
    companion_task: Option<Task>,
    focus_started_at: Option<DateTime<Utc>>,
    countdown: Option<Countdown>,
    tick_timer: Option<TimerId>,
    early_exit_session: Option<SessionId>,
}

impl FocusController {
    /// Load persisted state and start idle with the catalog's default character.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Storage` if the backend fails.
    pub async fn load(
        clock: Clock,
        catalog: Catalog,
        store: FocusStore,
        offset: FixedOffset,
    ) -> Result<Self, LifecycleError> {
        let journal = SessionJournal::load(store.clone(), offset).await?;
        let tags = store.load_tags().await?;
        let audio = store.load_audio_settings().await?;
        let character = catalog.default_character();
        let character_id = character.id.clone();
        let companion = CompanionState::idle(character.first_thinking());

        Ok(Self {
            clock,
            catalog,
            character_id,
            store,
            journal,
            tags,
            audio,
            rng: StdRng::from_os_rng(),
            timings: LifecycleTimings::default(),
            scheduler: TimerScheduler::new(),
            phase: Phase::Idle,
            companion,
            user_task: None,
            companion_task: None,
            focus_started_at: None,
            countdown: None,
            tick_timer: None,
            early_exit_session: None,
        })
    }

    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn with_timings(mut self, timings: LifecycleTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Switch companions. Only allowed while idle.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Busy` outside idle, or
    /// `LifecycleError::UnknownCharacter` if the catalog has no such id.
    pub fn select_character(&mut self, id: &str) -> Result<(), LifecycleError> {
        if self.phase != Phase::Idle {
            return Err(LifecycleError::Busy);
        }
        let character = self
            .catalog
            .get(id)
            .ok_or_else(|| LifecycleError::UnknownCharacter(id.to_string()))?;
        self.companion = CompanionState::idle(character.first_thinking());
        self.character_id = character.id.clone();
        info!(character = id, "character selected");
        Ok(())
    }

    /// Stamp the user's task and let the companion start deliberating.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Busy` if a focus period is already under way,
    /// or `LifecycleError::Task` if the draft is invalid.
    pub fn submit_task(&mut self, draft: TaskDraft) -> Result<TaskId, LifecycleError> {
        if self.phase != Phase::Idle {
            return Err(LifecycleError::Busy);
        }
        let task = draft.validate(TaskId::generate(), self.clock.now())?;
        let id = task.id().clone();
        info!(task = %id, minutes = task.duration_minutes(), "task submitted");

        self.companion =
            CompanionState::preparing(self.character().first_thinking(), THOUGHT_PROCESS);
        self.user_task = Some(task);
        self.enter_phase(Phase::Preparing);
        self.scheduler.schedule_once(
            Phase::Preparing,
            self.timings.deliberation,
            TimerEvent::CompanionReady,
        );
        Ok(id)
    }

    /// Move time forward by `elapsed`, firing due timers in deadline order.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Task` if the companion task cannot be built.
    pub fn advance(&mut self, elapsed: Duration) -> Result<Vec<LifecycleEvent>, LifecycleError> {
        let deadline = self.scheduler.now().saturating_add(elapsed);
        let mut cursor = self.scheduler.now();
        let mut events = Vec::new();

        while let Some(fired) = self.scheduler.pop_due(deadline) {
            self.clock.advance_std(fired.at.saturating_sub(cursor));
            cursor = fired.at;
            debug!(timer = fired.id.value(), event = ?fired.event, "timer fired");
            if let Some(event) = self.on_timer(fired.event)? {
                events.push(event);
            }
        }

        self.clock.advance_std(deadline.saturating_sub(cursor));
        self.scheduler.settle(deadline);
        Ok(events)
    }

    /// Leave the focus view, measuring elapsed minutes from the focus start.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError` if the partial session cannot be archived.
    pub async fn exit_focus(&mut self) -> Result<ExitOutcome, LifecycleError> {
        let Some(started) = self.focus_started_at else {
            return Ok(ExitOutcome::Ignored);
        };
        let elapsed = self.clock.whole_minutes_since(started);
        self.exit_focus_after(elapsed).await
    }

    /// Leave the focus view after `elapsed_minutes` of focus.
    ///
    /// Under a minute discards both tasks. Otherwise a partial session is
    /// archived right away and the reflection prompt opens; a later
    /// reflection updates that record instead of creating another.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError` if the partial session cannot be archived.
    pub async fn exit_focus_after(
        &mut self,
        elapsed_minutes: u32,
    ) -> Result<ExitOutcome, LifecycleError> {
        if self.phase != Phase::Working {
            return Ok(ExitOutcome::Ignored);
        }
        let (Some(user), Some(companion)) = (self.user_task.clone(), self.companion_task.clone())
        else {
            return Ok(ExitOutcome::Ignored);
        };

        if elapsed_minutes < 1 {
            info!("focus exited before a minute, discarding");
            self.reset_to_idle();
            return Ok(ExitOutcome::Discarded);
        }

        let companion_reflection = self.pick(Lines::Reflection(CompletionLevel::Partial));
        let session = self.build_session(
            user,
            companion,
            elapsed_minutes,
            "",
            companion_reflection.clone(),
        )?;
        let id = session.id().clone();
        self.journal.record(session).await?;

        self.early_exit_session = Some(id.clone());
        self.companion = CompanionState::reflecting(companion_reflection);
        self.enter_phase(Phase::Reflecting);
        Ok(ExitOutcome::Recorded(id))
    }

    /// Close the reflection prompt with the user's note.
    ///
    /// A non-empty note picks a `completed` companion line, an empty one a
    /// `partial` line.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError` if the session cannot be archived.
    pub async fn submit_reflection(
        &mut self,
        reflection: &str,
    ) -> Result<ReflectionOutcome, LifecycleError> {
        if self.phase != Phase::Reflecting {
            return Ok(ReflectionOutcome::Ignored);
        }

        if let Some(id) = self.early_exit_session.clone() {
            let reflection = reflection.trim();
            let outcome = if reflection.is_empty() {
                ReflectionOutcome::Unchanged(id)
            } else {
                self.journal.amend_reflection(&id, reflection).await?;
                ReflectionOutcome::Amended(id)
            };
            self.start_settling();
            return Ok(outcome);
        }

        let (Some(mut user), Some(companion)) =
            (self.user_task.clone(), self.companion_task.clone())
        else {
            return Ok(ReflectionOutcome::Ignored);
        };

        let level = CompletionLevel::from_reflection(reflection);
        let companion_reflection = self.pick(Lines::Reflection(level));
        user.set_reflection(reflection);
        let planned = user.duration_minutes();
        let session =
            self.build_session(user, companion, planned, reflection, companion_reflection)?;
        let id = session.id().clone();
        self.journal.record(session).await?;

        self.start_settling();
        Ok(ReflectionOutcome::Recorded(id))
    }

    /// Same as submitting an empty reflection.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError` if the session cannot be archived.
    pub async fn skip_reflection(&mut self) -> Result<ReflectionOutcome, LifecycleError> {
        self.submit_reflection("").await
    }

    /// Freeze the countdown. Returns false outside a running focus period.
    pub fn pause_focus(&mut self) -> bool {
        if self.phase != Phase::Working {
            return false;
        }
        let Some(countdown) = self.countdown.as_mut() else {
            return false;
        };
        if !countdown.pause() {
            return false;
        }
        if let Some(id) = self.tick_timer.take() {
            self.scheduler.cancel(id);
        }
        info!(remaining = countdown.remaining_secs(), "focus paused");
        true
    }

    /// Restart a paused countdown. Returns false if nothing was paused.
    pub fn resume_focus(&mut self) -> bool {
        if self.phase != Phase::Working {
            return false;
        }
        let Some(countdown) = self.countdown.as_mut() else {
            return false;
        };
        if !countdown.resume() {
            return false;
        }
        info!(remaining = countdown.remaining_secs(), "focus resumed");
        self.arm_tick();
        true
    }

    /// Append a tag to the available list and persist it. Duplicates are kept.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Tag` for a blank tag, or `Storage` if it cannot be saved.
    pub async fn add_tag(&mut self, tag: &str) -> Result<TagName, LifecycleError> {
        let tag = TagName::new(tag)?;
        self.tags.push(tag.as_str().to_string());
        self.store.save_tags(&self.tags).await?;
        Ok(tag)
    }

    /// # Errors
    ///
    /// Returns `LifecycleError::Audio` for an out-of-range volume, or
    /// `Storage` if the settings cannot be saved.
    pub async fn change_audio_settings(
        &mut self,
        draft: AudioSettingsDraft,
    ) -> Result<&AudioSettings, LifecycleError> {
        let settings = draft.validate()?;
        self.store.save_audio_settings(&settings).await?;
        self.audio = settings;
        Ok(&self.audio)
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn companion(&self) -> &CompanionState {
        &self.companion
    }

    #[must_use]
    pub fn user_task(&self) -> Option<&Task> {
        self.user_task.as_ref()
    }

    #[must_use]
    pub fn companion_task(&self) -> Option<&Task> {
        self.companion_task.as_ref()
    }

    #[must_use]
    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    /// Share of the focus period done, 0..=100.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        match self.phase {
            Phase::Working => self.countdown.as_ref().map_or(0, Countdown::progress_percent),
            Phase::Reflecting | Phase::Settling => 100,
            Phase::Idle | Phase::Preparing => 0,
        }
    }

    #[must_use]
    pub fn is_reflection_open(&self) -> bool {
        self.phase == Phase::Reflecting
    }

    #[must_use]
    pub fn sessions(&self) -> &[StudySession] {
        self.journal.sessions()
    }

    #[must_use]
    pub fn daily_progress(&self) -> &[DailyProgress] {
        self.journal.daily_progress()
    }

    #[must_use]
    pub fn total_minutes(&self) -> u64 {
        self.journal.total_minutes()
    }

    #[must_use]
    pub fn total_time_label(&self) -> String {
        total_time_label(self.journal.total_minutes())
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn audio_settings(&self) -> &AudioSettings {
        &self.audio
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The selected companion.
    #[must_use]
    pub fn character(&self) -> &Character {
        self.catalog
            .get(&self.character_id)
            .unwrap_or_else(|| self.catalog.default_character())
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    fn on_timer(&mut self, event: TimerEvent) -> Result<Option<LifecycleEvent>, LifecycleError> {
        match (event, self.phase) {
            (TimerEvent::CompanionReady, Phase::Preparing) => self.start_focus(),
            (TimerEvent::CountdownTick, Phase::Working) => Ok(self.tick()),
            (TimerEvent::RotateMessage, Phase::Working) => Ok(Some(self.rotate_message())),
            (TimerEvent::ResetToIdle, Phase::Settling) => {
                self.reset_to_idle();
                Ok(Some(LifecycleEvent::ReturnedToIdle))
            }
            (event, phase) => {
                debug!(?event, phase = phase.as_str(), "stale timer ignored");
                Ok(None)
            }
        }
    }

    fn start_focus(&mut self) -> Result<Option<LifecycleEvent>, LifecycleError> {
        let Some(minutes) = self.user_task.as_ref().map(Task::duration_minutes) else {
            return Ok(None);
        };
        let now = self.clock.now();
        let content = self.pick(Lines::Tasks);
        let task = Task::companion(TaskId::generate(), content.as_str(), minutes, now)?;
        info!(task = %content, minutes, "companion assigned");

        self.companion =
            CompanionState::working(format!("我要{content}，让我们一起加油吧！"), task.clone());
        self.companion_task = Some(task);
        self.enter_phase(Phase::Working);
        self.focus_started_at = Some(now);
        self.countdown = Some(Countdown::from_minutes(minutes));
        self.arm_tick();
        self.arm_rotation();
        Ok(Some(LifecycleEvent::CompanionAssigned { task: content }))
    }

    fn tick(&mut self) -> Option<LifecycleEvent> {
        let outcome = self.countdown.as_mut()?.tick();
        match outcome {
            TickOutcome::Running(remaining_secs) => {
                Some(LifecycleEvent::FocusTick { remaining_secs })
            }
            TickOutcome::Completed => {
                info!("focus period completed");
                self.companion = CompanionState::reflecting(self.character().first_completed());
                self.enter_phase(Phase::Reflecting);
                Some(LifecycleEvent::FocusCompleted)
            }
            TickOutcome::Idle => None,
        }
    }

    fn rotate_message(&mut self) -> LifecycleEvent {
        let character = self
            .catalog
            .get(&self.character_id)
            .unwrap_or_else(|| self.catalog.default_character());
        let message = pick_message(&character.rotation_messages(), &mut self.rng)
            .unwrap_or_default()
            .to_string();
        self.companion.set_message(message.as_str());
        self.arm_rotation();
        LifecycleEvent::MessageRotated { message }
    }

    fn start_settling(&mut self) {
        self.enter_phase(Phase::Settling);
        self.scheduler.schedule_once(
            Phase::Settling,
            self.timings.reset_delay,
            TimerEvent::ResetToIdle,
        );
    }

    fn reset_to_idle(&mut self) {
        self.user_task = None;
        self.companion_task = None;
        self.focus_started_at = None;
        self.countdown = None;
        self.early_exit_session = None;
        self.companion = CompanionState::idle(self.pick(Lines::Thinking));
        self.enter_phase(Phase::Idle);
    }

    // Every transition drops the timers the previous phase armed.
    fn enter_phase(&mut self, next: Phase) {
        let dropped = self.scheduler.cancel_owned_by(self.phase);
        if self.phase == Phase::Working {
            self.tick_timer = None;
        }
        info!(
            from = self.phase.as_str(),
            to = next.as_str(),
            dropped_timers = dropped,
            "phase changed"
        );
        self.phase = next;
    }

    fn arm_tick(&mut self) {
        let id =
            self.scheduler
                .schedule_every(Phase::Working, self.timings.tick, TimerEvent::CountdownTick);
        self.tick_timer = Some(id);
    }

    fn arm_rotation(&mut self) {
        let low = self.timings.rotation_min.min(self.timings.rotation_max);
        let high = self.timings.rotation_min.max(self.timings.rotation_max);
        let low_ms = u64::try_from(low.as_millis()).unwrap_or(u64::MAX);
        let high_ms = u64::try_from(high.as_millis()).unwrap_or(u64::MAX);
        let delay = Duration::from_millis(self.rng.random_range(low_ms..=high_ms));
        self.scheduler
            .schedule_once(Phase::Working, delay, TimerEvent::RotateMessage);
    }

    fn pick(&mut self, lines: Lines) -> String {
        let character = self
            .catalog
            .get(&self.character_id)
            .unwrap_or_else(|| self.catalog.default_character());
        let pool: &[String] = match lines {
            Lines::Tasks => &character.tasks,
            Lines::Thinking => &character.progress_reports.thinking,
            Lines::Reflection(level) => character.reflection_templates.for_level(level),
        };
        pick_message(pool, &mut self.rng)
            .unwrap_or_default()
            .to_string()
    }

    // Both tasks are closed at the current instant; the session starts when
    // the user task was created.
    fn build_session(
        &self,
        mut user: Task,
        mut companion: Task,
        duration_minutes: u32,
        user_reflection: &str,
        companion_reflection: String,
    ) -> Result<StudySession, LifecycleError> {
        let now = self.clock.now();
        if !user.is_completed() {
            user.mark_completed(now)?;
        }
        if !companion.is_completed() {
            companion.mark_completed(now)?;
        }
        let start_time = user.created_at();
        Ok(StudySessionDraft {
            id: SessionId::generate(),
            start_time,
            end_time: now.max(start_time),
            duration_minutes,
            user_task: user,
            companion_task: companion,
            user_reflection: user_reflection.to_string(),
            companion_reflection,
        }
        .validate()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_core::catalog::PROGRAMMING_CAT;
    use focus_core::time::{fixed_clock, utc_offset};

    async fn controller() -> FocusController {
        FocusController::load(
            fixed_clock(),
            Catalog::builtin(),
            FocusStore::in_memory(),
            utc_offset(),
        )
        .await
        .unwrap()
        .with_seed(7)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[tokio::test]
    async fn starts_idle_with_first_thinking_line() {
        let ctl = controller().await;
        assert_eq!(ctl.phase(), Phase::Idle);
        assert_eq!(ctl.character().id, PROGRAMMING_CAT);
        assert_eq!(ctl.companion().message(), ctl.character().first_thinking());
        assert_eq!(ctl.pending_timers(), 0);
    }

    #[tokio::test]
    async fn deliberation_assigns_companion_task_after_delay() {
        let mut ctl = controller().await;
        ctl.submit_task(TaskDraft::new("写周报", 1)).unwrap();
        assert_eq!(ctl.phase(), Phase::Preparing);
        assert_eq!(ctl.companion().thought_process(), Some(THOUGHT_PROCESS));

        assert!(ctl.advance(Duration::from_millis(1999)).unwrap().is_empty());
        let events = ctl.advance(Duration::from_millis(1)).unwrap();

        let [LifecycleEvent::CompanionAssigned { task }] = events.as_slice() else {
            panic!("unexpected events: {events:?}");
        };
        assert!(ctl.character().tasks.contains(task));
        assert_eq!(ctl.phase(), Phase::Working);
        assert_eq!(ctl.companion().message(), format!("我要{task}，让我们一起加油吧！"));
        let companion = ctl.companion_task().unwrap();
        assert_eq!(companion.category(), "companion");
        assert_eq!(companion.duration_minutes(), 1);
    }

    #[tokio::test]
    async fn submitting_while_busy_is_rejected() {
        let mut ctl = controller().await;
        ctl.submit_task(TaskDraft::new("a", 5)).unwrap();
        let err = ctl.submit_task(TaskDraft::new("b", 5)).unwrap_err();
        assert!(matches!(err, LifecycleError::Busy));
        assert!(matches!(
            ctl.select_character("writing_dog"),
            Err(LifecycleError::Busy)
        ));
    }

    #[tokio::test]
    async fn pause_freezes_countdown() {
        let mut ctl = controller().await;
        ctl.submit_task(TaskDraft::new("读书", 1)).unwrap();
        ctl.advance(secs(2)).unwrap();
        ctl.advance(secs(10)).unwrap();
        assert_eq!(ctl.countdown().unwrap().remaining_secs(), 50);

        assert!(ctl.pause_focus());
        assert!(!ctl.pause_focus());
        ctl.advance(secs(120)).unwrap();
        assert_eq!(ctl.phase(), Phase::Working);
        assert_eq!(ctl.countdown().unwrap().remaining_secs(), 50);

        assert!(ctl.resume_focus());
        let events = ctl.advance(secs(50)).unwrap();
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == LifecycleEvent::FocusCompleted)
                .count(),
            1
        );
        assert_eq!(ctl.phase(), Phase::Reflecting);
    }

    #[tokio::test]
    async fn working_timers_never_fire_after_completion() {
        let mut ctl = controller().await;
        ctl.submit_task(TaskDraft::new("读书", 1)).unwrap();
        ctl.advance(secs(62)).unwrap();
        assert_eq!(ctl.phase(), Phase::Reflecting);
        assert_eq!(ctl.pending_timers(), 0);
        assert_eq!(ctl.progress_percent(), 100);
        assert!(ctl.advance(secs(600)).unwrap().is_empty());
        assert_eq!(ctl.companion().message(), ctl.character().first_completed());
    }

    #[tokio::test]
    async fn messages_rotate_while_working() {
        let mut ctl = controller().await;
        ctl.submit_task(TaskDraft::new("读书", 5)).unwrap();
        let events = ctl.advance(secs(2 + 60)).unwrap();

        let rotated: Vec<&String> = events
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::MessageRotated { message } => Some(message),
                _ => None,
            })
            .collect();
        assert!((2..=6).contains(&rotated.len()));
        let pool = ctl.character().rotation_messages();
        assert!(rotated.iter().all(|m| pool.contains(&m.as_str())));
    }

    #[tokio::test]
    async fn reflection_outside_prompt_is_ignored() {
        let mut ctl = controller().await;
        assert_eq!(
            ctl.submit_reflection("x").await.unwrap(),
            ReflectionOutcome::Ignored
        );
        assert_eq!(ctl.exit_focus().await.unwrap(), ExitOutcome::Ignored);
        assert!(ctl.sessions().is_empty());
    }

    #[tokio::test]
    async fn select_character_switches_idle_message() {
        let mut ctl = controller().await;
        ctl.select_character("writing_dog").unwrap();
        assert_eq!(ctl.character().id, "writing_dog");
        assert_eq!(ctl.companion().message(), ctl.character().first_thinking());
        assert!(matches!(
            ctl.select_character("robot"),
            Err(LifecycleError::UnknownCharacter(_))
        ));
    }

    #[tokio::test]
    async fn companion_status_follows_phase() {
        let mut ctl = controller().await;
        ctl.submit_task(TaskDraft::new("读书", 1)).unwrap();
        assert_eq!(ctl.companion().status(), ctl.phase().companion_status());
        ctl.advance(secs(2)).unwrap();
        assert_eq!(ctl.companion().status(), ctl.phase().companion_status());
        ctl.advance(secs(60)).unwrap();
        assert_eq!(ctl.companion().status(), ctl.phase().companion_status());
        ctl.submit_reflection("ok").await.unwrap();
        assert_eq!(ctl.companion().status(), ctl.phase().companion_status());
    }

    #[tokio::test]
    async fn tags_are_trimmed_and_kept_in_order() {
        let mut ctl = controller().await;
        ctl.add_tag(" 阅读 ").await.unwrap();
        ctl.add_tag("阅读").await.unwrap();
        assert!(ctl.add_tag("  ").await.is_err());
        assert_eq!(ctl.tags(), ["阅读".to_string(), "阅读".to_string()]);
    }

    #[tokio::test]
    async fn audio_settings_are_validated() {
        let mut ctl = controller().await;
        let mut draft = ctl.audio_settings().to_draft();
        draft.volume = 1.5;
        assert!(matches!(
            ctl.change_audio_settings(draft).await,
            Err(LifecycleError::Audio(_))
        ));

        let mut draft = ctl.audio_settings().to_draft();
        draft.enabled = false;
        let settings = ctl.change_audio_settings(draft).await.unwrap();
        assert!(!settings.enabled());
    }
}
