use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::FixedOffset;
use focus_core::catalog::Catalog;
use focus_core::model::{TaskDraft, aggregate_sessions, total_minutes};
use focus_core::time::fixed_clock;
use services::{ExitOutcome, FocusController, LifecycleEvent, Phase, ReflectionOutcome};
use storage::repository::{FocusStore, InMemoryStore, KeyValueStore, StorageError};

/// Backend that lets `allowed` writes through, then fails the next `failures`.
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryStore,
    allowed: AtomicUsize,
    failures: AtomicUsize,
}

impl FlakyStore {
    fn fail_after(&self, allowed: usize, failures: usize) {
        self.allowed.store(allowed, Ordering::SeqCst);
        self.failures.store(failures, Ordering::SeqCst);
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        if !take_one(&self.allowed) && take_one(&self.failures) {
            return Err(StorageError::Connection("disk full".into()));
        }
        self.inner.set(key, value).await
    }
}

fn offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

async fn controller(store: &FocusStore) -> FocusController {
    FocusController::load(fixed_clock(), Catalog::builtin(), store.clone(), offset())
        .await
        .unwrap()
        .with_seed(42)
}

async fn start_focus(ctl: &mut FocusController, content: &str, minutes: u32) {
    ctl.submit_task(TaskDraft::new(content, minutes).with_category("工作"))
        .unwrap();
    ctl.advance(Duration::from_secs(2)).unwrap();
    assert_eq!(ctl.phase(), Phase::Working);
}

#[tokio::test]
async fn twenty_five_minute_focus_completes_once_and_records_session() {
    let store = FocusStore::in_memory();
    let mut ctl = controller(&store).await;

    let task_id = ctl
        .submit_task(TaskDraft::new("写周报", 25).with_category("工作"))
        .unwrap();
    assert_eq!(ctl.user_task().unwrap().status().as_str(), "pending");

    let assigned = ctl.advance(Duration::from_secs(2)).unwrap();
    assert!(matches!(
        assigned.as_slice(),
        [LifecycleEvent::CompanionAssigned { .. }]
    ));

    let events = ctl.advance(Duration::from_secs(25 * 60)).unwrap();
    let completions = events
        .iter()
        .filter(|e| **e == LifecycleEvent::FocusCompleted)
        .count();
    assert_eq!(completions, 1);
    assert_eq!(ctl.phase(), Phase::Reflecting);
    assert!(ctl.is_reflection_open());

    let more = ctl.advance(Duration::from_secs(60)).unwrap();
    assert!(!more.contains(&LifecycleEvent::FocusCompleted));

    let outcome = ctl.submit_reflection("写完了初稿").await.unwrap();
    let ReflectionOutcome::Recorded(session_id) = outcome else {
        panic!("expected a recorded session");
    };
    assert_eq!(ctl.phase(), Phase::Settling);

    let sessions = store.load_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    let session = &sessions[0];
    assert_eq!(session.id(), &session_id);
    assert_eq!(session.duration_minutes(), 25);
    assert_eq!(session.user_task().id(), &task_id);
    assert_eq!(session.user_task().reflection(), Some("写完了初稿"));
    assert_eq!(session.user_reflection(), "写完了初稿");
    assert!(session.user_task().is_completed());
    assert!(session.companion_task().is_completed());
    assert!(
        ctl.character()
            .reflection_templates
            .completed
            .iter()
            .any(|t| t == session.companion_reflection())
    );

    let reset = ctl.advance(Duration::from_secs(2)).unwrap();
    assert_eq!(reset, vec![LifecycleEvent::ReturnedToIdle]);
    assert_eq!(ctl.phase(), Phase::Idle);
    assert!(ctl.user_task().is_none());
    assert!(ctl.companion_task().is_none());
}

#[tokio::test]
async fn skipped_reflection_uses_partial_template() {
    let store = FocusStore::in_memory();
    let mut ctl = controller(&store).await;
    start_focus(&mut ctl, "背单词", 1).await;
    ctl.advance(Duration::from_secs(60)).unwrap();

    ctl.skip_reflection().await.unwrap();

    let session = &store.load_sessions().await.unwrap()[0];
    assert_eq!(session.user_reflection(), "");
    assert!(
        ctl.character()
            .reflection_templates
            .partial
            .iter()
            .any(|t| t == session.companion_reflection())
    );
}

#[tokio::test]
async fn early_exit_under_a_minute_records_nothing() {
    let store = FocusStore::in_memory();
    let mut ctl = controller(&store).await;
    start_focus(&mut ctl, "读论文", 25).await;
    ctl.advance(Duration::from_secs(59)).unwrap();

    assert_eq!(ctl.exit_focus().await.unwrap(), ExitOutcome::Discarded);
    assert_eq!(ctl.phase(), Phase::Idle);
    assert!(ctl.user_task().is_none());
    assert!(store.load_sessions().await.unwrap().is_empty());
    assert_eq!(ctl.pending_timers(), 0);
}

#[tokio::test]
async fn early_exit_after_one_minute_records_exactly_one_session() {
    let store = FocusStore::in_memory();
    let mut ctl = controller(&store).await;
    start_focus(&mut ctl, "读论文", 25).await;

    let ExitOutcome::Recorded(id) = ctl.exit_focus_after(1).await.unwrap() else {
        panic!("expected a recorded session");
    };
    assert!(ctl.is_reflection_open());

    let sessions = store.load_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].duration_minutes(), 1);
    assert_eq!(sessions[0].user_reflection(), "");

    let outcome = ctl.submit_reflection("只读了摘要").await.unwrap();
    assert_eq!(outcome, ReflectionOutcome::Amended(id.clone()));

    let sessions = store.load_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id(), &id);
    assert_eq!(sessions[0].user_reflection(), "只读了摘要");

    let progress = store.load_daily_progress().await.unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].sessions_count(), 1);
    assert_eq!(progress[0].total_duration(), 1);
}

#[tokio::test]
async fn exit_measures_elapsed_from_focus_start() {
    let store = FocusStore::in_memory();
    let mut ctl = controller(&store).await;
    start_focus(&mut ctl, "整理笔记", 25).await;
    ctl.advance(Duration::from_secs(7 * 60 + 30)).unwrap();

    assert!(matches!(
        ctl.exit_focus().await.unwrap(),
        ExitOutcome::Recorded(_)
    ));
    assert_eq!(ctl.sessions()[0].duration_minutes(), 7);

    assert_eq!(
        ctl.skip_reflection().await.unwrap(),
        ReflectionOutcome::Unchanged(ctl.sessions()[0].id().clone())
    );
    assert_eq!(ctl.sessions().len(), 1);
}

#[tokio::test]
async fn totals_match_persisted_sessions_after_every_write() {
    let store = FocusStore::in_memory();
    let mut ctl = controller(&store).await;

    for (minutes, exit_after) in [(1, None), (25, Some(3)), (2, None)] {
        start_focus(&mut ctl, "练习", minutes).await;
        match exit_after {
            Some(elapsed) => {
                ctl.exit_focus_after(elapsed).await.unwrap();
            }
            None => {
                ctl.advance(Duration::from_secs(u64::from(minutes) * 60))
                    .unwrap();
            }
        }
        ctl.submit_reflection("").await.unwrap();
        ctl.advance(Duration::from_secs(2)).unwrap();
        assert_eq!(ctl.phase(), Phase::Idle);

        let persisted = store.load_sessions().await.unwrap();
        assert_eq!(ctl.total_minutes(), total_minutes(&persisted));
        assert_eq!(
            store.load_daily_progress().await.unwrap(),
            aggregate_sessions(&persisted, offset())
        );
    }
    assert_eq!(ctl.total_minutes(), 1 + 3 + 2);
}

#[tokio::test]
async fn reloaded_controller_sees_previous_history() {
    let store = FocusStore::in_memory();
    {
        let mut ctl = controller(&store).await;
        start_focus(&mut ctl, "写代码", 1).await;
        ctl.advance(Duration::from_secs(60)).unwrap();
        ctl.submit_reflection("done").await.unwrap();
    }

    let ctl = controller(&store).await;
    assert_eq!(ctl.sessions().len(), 1);
    assert_eq!(ctl.total_minutes(), 1);
    assert_eq!(ctl.total_time_label(), "总共陪伴了 0 小时 1 分钟");
}

#[tokio::test]
async fn failed_reflection_write_can_be_retried_without_duplicates() {
    let flaky = Arc::new(FlakyStore::default());
    let store = FocusStore::new(flaky.clone());
    let mut ctl = controller(&store).await;
    start_focus(&mut ctl, "整理笔记", 1).await;
    ctl.advance(Duration::from_secs(60)).unwrap();
    assert_eq!(ctl.phase(), Phase::Reflecting);

    flaky.fail_after(0, 1);
    assert!(ctl.submit_reflection("ok").await.is_err());
    assert_eq!(ctl.phase(), Phase::Reflecting);
    assert!(ctl.sessions().is_empty());
    assert_eq!(ctl.total_minutes(), 0);

    let outcome = ctl.submit_reflection("ok").await.unwrap();
    assert!(matches!(outcome, ReflectionOutcome::Recorded(_)));

    let sessions = store.load_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(ctl.sessions().len(), 1);
    assert_eq!(ctl.total_minutes(), 1);
    let daily = store.load_daily_progress().await.unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].sessions_count(), 1);
    assert_eq!(daily[0].total_duration(), 1);
}

#[tokio::test]
async fn failed_daily_write_leaves_history_untouched() {
    let flaky = Arc::new(FlakyStore::default());
    let store = FocusStore::new(flaky.clone());
    let mut ctl = controller(&store).await;
    start_focus(&mut ctl, "读论文", 10).await;
    ctl.advance(Duration::from_secs(3 * 60)).unwrap();

    // The session list is written, then the daily write fails.
    flaky.fail_after(1, 1);
    assert!(ctl.exit_focus_after(3).await.is_err());
    assert_eq!(ctl.phase(), Phase::Working);
    assert!(store.load_sessions().await.unwrap().is_empty());
    assert!(store.load_daily_progress().await.unwrap().is_empty());

    let ExitOutcome::Recorded(_) = ctl.exit_focus_after(3).await.unwrap() else {
        panic!("expected a recorded session");
    };
    let sessions = store.load_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(total_minutes(&sessions), 3);
    assert_eq!(
        store.load_daily_progress().await.unwrap(),
        aggregate_sessions(&sessions, offset())
    );
}
