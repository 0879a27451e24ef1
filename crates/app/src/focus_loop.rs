use std::time::Duration;

use focus_core::format::countdown_label;
use focus_core::model::TaskDraft;
use services::{AppServices, ExitOutcome, FocusController, LifecycleEvent, Phase, ReflectionOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};

const FRAME: Duration = Duration::from_millis(250);

/// Drive one focus period in the terminal until the controller is idle again.
pub async fn run_focus(
    services: &AppServices,
    draft: TaskDraft,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = services.load_controller().await?;
    let minutes = draft.duration_minutes;
    controller.submit_task(draft)?;
    say(&controller);
    if let Some(thought) = controller.companion().thought_process() {
        println!("   ({thought})");
    }

    let mut frames = tokio::time::interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = frames.tick() => {
                let now = Instant::now();
                let events = controller.advance(now.duration_since(last))?;
                last = now;
                for event in &events {
                    render(&controller, event, minutes);
                }
                if events.contains(&LifecycleEvent::ReturnedToIdle) {
                    break;
                }
                if !stdin_open && controller.phase() == Phase::Reflecting {
                    controller.skip_reflection().await?;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => handle_line(&mut controller, line.trim()).await?,
                    None => stdin_open = false,
                }
                if controller.phase() == Phase::Idle {
                    break;
                }
            }
        }
    }

    println!("{}", controller.total_time_label());
    Ok(())
}

async fn handle_line(
    controller: &mut FocusController,
    line: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match controller.phase() {
        Phase::Working => match line {
            "q" | "quit" => match controller.exit_focus().await? {
                ExitOutcome::Discarded => {
                    println!("不到一分钟，这次不记录。");
                    say(controller);
                }
                ExitOutcome::Recorded(_) => {
                    say(controller);
                    println!("写下这次的收获（直接回车跳过）：");
                }
                ExitOutcome::Ignored => {}
            },
            "p" | "pause" => {
                if controller.pause_focus() {
                    println!("⏸  已暂停，输入 p 继续");
                } else if controller.resume_focus() {
                    println!("▶  继续专注");
                }
            }
            _ => print_remaining(controller),
        },
        Phase::Reflecting => match controller.submit_reflection(line).await? {
            ReflectionOutcome::Recorded(_) | ReflectionOutcome::Amended(_) => {
                println!("已记录。");
            }
            ReflectionOutcome::Unchanged(_) | ReflectionOutcome::Ignored => {}
        },
        Phase::Idle | Phase::Preparing | Phase::Settling => {}
    }
    Ok(())
}

fn render(controller: &FocusController, event: &LifecycleEvent, minutes: u32) {
    match event {
        LifecycleEvent::CompanionAssigned { .. } => {
            say(controller);
            println!("开始专注 {minutes} 分钟。q 提前结束，p 暂停/继续，回车查看剩余时间。");
        }
        LifecycleEvent::FocusTick { remaining_secs } => {
            if remaining_secs % 60 == 0 {
                print_remaining(controller);
            }
        }
        LifecycleEvent::MessageRotated { .. } => say(controller),
        LifecycleEvent::FocusCompleted => {
            println!("⏰ 时间到！");
            say(controller);
            println!("写下这次的收获（直接回车跳过）：");
        }
        LifecycleEvent::ReturnedToIdle => say(controller),
    }
}

fn say(controller: &FocusController) {
    println!(
        "{} {}",
        controller.character().emoji,
        controller.companion().message()
    );
}

fn print_remaining(controller: &FocusController) {
    if let Some(countdown) = controller.countdown() {
        println!(
            "⏳ {} ({}%)",
            countdown_label(countdown.remaining_secs()),
            controller.progress_percent()
        );
    }
}
