use chrono::Datelike;

use focus_core::catalog::Catalog;
use focus_core::format::{format_duration, history_duration_label};
use focus_core::heatmap::bucket_level;
use focus_core::model::AudioSettings;
use focus_core::time::date_key;
use services::AppServices;

const SHADES: [char; 6] = ['·', '░', '▒', '▓', '█', '■'];

pub async fn history(
    services: &AppServices,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let history = services.history();
    let offset = services.config().utc_offset;
    let sessions = history.recent_sessions(limit).await?;
    if sessions.is_empty() {
        println!("还没有专注记录。");
    }
    for session in &sessions {
        let shade = SHADES[usize::from(bucket_level(session.duration_minutes()))];
        println!(
            "{shade} {}  {}  {} | {}",
            session.start_time().with_timezone(&offset).format("%Y-%m-%d %H:%M"),
            history_duration_label(u64::from(session.duration_minutes())),
            session.user_task().content(),
            session.companion_task().content(),
        );
        if !session.user_reflection().is_empty() {
            println!("    我：{}", session.user_reflection());
        }
        println!("    伙伴：{}", session.companion_reflection());
    }
    println!("{}", history.total_label().await?);
    Ok(())
}

pub async fn heatmap(
    services: &AppServices,
    month: Option<(i32, u32)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let history = services.history();
    let now = services.clock().now();
    let today = date_key(now, services.config().utc_offset);
    let (year, month) = month.unwrap_or((today.year(), today.month()));

    let summary = history.today(now).await?;
    println!(
        "今天：{} 次专注，共 {}",
        summary.sessions_count(),
        format_duration(u64::from(summary.total_duration()))
    );
    println!("{year}-{month:02}");

    let cells = history.month(year, month).await?;
    for week in cells.chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|cell| {
                let total = cell.progress.map_or(0, |p| p.total_duration());
                let shade = SHADES[usize::from(bucket_level(total))];
                format!("{:02}{shade}{:>3}%", cell.date.day(), percent(cell.intensity))
            })
            .collect();
        println!("{}", row.join("  "));
    }
    Ok(())
}

fn percent(intensity: f64) -> u32 {
    (intensity * 100.0).round().clamp(0.0, 100.0) as u32
}

pub fn tags(tags: &[String]) {
    if tags.is_empty() {
        println!("还没有标签。");
        return;
    }
    for tag in tags {
        println!("# {tag}");
    }
}

pub fn audio(settings: &AudioSettings) {
    println!(
        "音频：{}，音量 {:.0}%，曲目 {}",
        if settings.enabled() { "开" } else { "关" },
        settings.volume() * 100.0,
        settings.current_track().unwrap_or("未选择"),
    );
}

pub fn characters(catalog: &Catalog, selected: &str) {
    for character in catalog.characters() {
        let marker = if character.id == selected { '*' } else { ' ' };
        println!(
            "{marker} {} {:<16} {} - {}",
            character.emoji, character.id, character.name, character.description
        );
    }
}
