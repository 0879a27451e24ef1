use std::fmt;

use focus_core::model::{AudioSettingsDraft, DEFAULT_CATEGORY, TaskDraft};
use services::{AppServices, Clock, FocusConfig};
use tracing_subscriber::EnvFilter;

mod focus_loop;
mod report;

const DEFAULT_MINUTES: u32 = 25;
const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    MissingTask,
    InvalidNumber { flag: &'static str, raw: String },
    InvalidBool { flag: &'static str, raw: String },
    InvalidMonth { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::MissingTask => write!(f, "run requires --task <text>"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidBool { flag, raw } => {
                write!(f, "invalid {flag} value: {raw} (expected true or false)")
            }
            ArgsError::InvalidMonth { raw } => {
                write!(f, "invalid --month value: {raw} (expected YYYY-MM)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  focus run --task <text> [--minutes <n>] [--category <c>] [--tag <t>]...");
    eprintln!("  focus history [--limit <n>]");
    eprintln!("  focus heatmap [--month YYYY-MM]");
    eprintln!("  focus tags [add <tag>]");
    eprintln!("  focus audio [--enabled true|false] [--volume <0..1>] [--track <name>]");
    eprintln!("  focus characters");
    eprintln!();
    eprintln!("Global flags:");
    eprintln!("  --db <sqlite_url>      default sqlite://focus.sqlite3");
    eprintln!("  --character <id>       default programming_cat");
    eprintln!();
    eprintln!("While focusing: q + Enter exits early, p + Enter pauses or resumes.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FOCUS_DB_URL, FOCUS_CHARACTER, FOCUS_UTC_OFFSET_MINUTES, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Run {
        task: String,
        minutes: u32,
        category: String,
        tags: Vec<String>,
    },
    History {
        limit: usize,
    },
    Heatmap {
        month: Option<(i32, u32)>,
    },
    Tags {
        add: Option<String>,
    },
    Audio {
        enabled: Option<bool>,
        volume: Option<f32>,
        track: Option<String>,
    },
    Characters,
}

#[derive(Debug, Default)]
struct Globals {
    db_url: Option<String>,
    character: Option<String>,
    help: bool,
}

impl Globals {
    /// Consume `arg` if it is a global flag. Returns false otherwise.
    fn accept(
        &mut self,
        arg: &str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<bool, ArgsError> {
        match arg {
            "--db" => {
                let value = require_value(args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                self.db_url = Some(value);
            }
            "--character" => {
                self.character = Some(require_value(args, "--character")?);
            }
            "--help" | "-h" => self.help = true,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

struct Args {
    globals: Globals,
    command: Command,
}

/// `--help` anywhere wins over whatever else was parsed.
enum Parsed {
    Help,
    Args(Args),
}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Parsed, ArgsError> {
        let mut globals = Globals::default();
        let mut iter = argv.into_iter();

        let name = loop {
            let Some(arg) = iter.next() else {
                if globals.help {
                    return Ok(Parsed::Help);
                }
                return Err(ArgsError::UnknownCommand(String::new()));
            };
            if !globals.accept(&arg, &mut iter)? {
                break arg;
            }
        };

        let command = match name.as_str() {
            "run" => parse_run(&mut iter, &mut globals),
            "history" => parse_history(&mut iter, &mut globals),
            "heatmap" => parse_heatmap(&mut iter, &mut globals),
            "tags" => parse_tags(&mut iter, &mut globals),
            "audio" => parse_audio(&mut iter, &mut globals),
            "characters" => reject_rest(&mut iter, &mut globals).map(|()| Command::Characters),
            _ => Err(ArgsError::UnknownCommand(name)),
        };
        if globals.help {
            return Ok(Parsed::Help);
        }
        Ok(Parsed::Args(Self {
            globals,
            command: command?,
        }))
    }
}

fn parse_run(
    args: &mut impl Iterator<Item = String>,
    globals: &mut Globals,
) -> Result<Command, ArgsError> {
    let mut task = None;
    let mut minutes = DEFAULT_MINUTES;
    let mut category = DEFAULT_CATEGORY.to_string();
    let mut tags = Vec::new();

    while let Some(arg) = args.next() {
        if globals.accept(&arg, args)? {
            continue;
        }
        match arg.as_str() {
            "--task" => task = Some(require_value(args, "--task")?),
            "--minutes" => minutes = parse_number(require_value(args, "--minutes")?, "--minutes")?,
            "--category" => category = require_value(args, "--category")?,
            "--tag" => tags.push(require_value(args, "--tag")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    let task = task
        .filter(|t| !t.trim().is_empty())
        .ok_or(ArgsError::MissingTask)?;
    Ok(Command::Run {
        task,
        minutes,
        category,
        tags,
    })
}

fn parse_history(
    args: &mut impl Iterator<Item = String>,
    globals: &mut Globals,
) -> Result<Command, ArgsError> {
    let mut limit = DEFAULT_HISTORY_LIMIT;
    while let Some(arg) = args.next() {
        if globals.accept(&arg, args)? {
            continue;
        }
        match arg.as_str() {
            "--limit" => limit = parse_number(require_value(args, "--limit")?, "--limit")?,
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::History { limit })
}

fn parse_heatmap(
    args: &mut impl Iterator<Item = String>,
    globals: &mut Globals,
) -> Result<Command, ArgsError> {
    let mut month = None;
    while let Some(arg) = args.next() {
        if globals.accept(&arg, args)? {
            continue;
        }
        match arg.as_str() {
            "--month" => month = Some(parse_month(require_value(args, "--month")?)?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Heatmap { month })
}

fn parse_month(raw: String) -> Result<(i32, u32), ArgsError> {
    let parsed = raw.trim().split_once('-').and_then(|(year, month)| {
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        (1..=12).contains(&month).then_some((year, month))
    });
    parsed.ok_or(ArgsError::InvalidMonth { raw })
}

fn parse_tags(
    args: &mut impl Iterator<Item = String>,
    globals: &mut Globals,
) -> Result<Command, ArgsError> {
    let mut add = None;
    while let Some(arg) = args.next() {
        if globals.accept(&arg, args)? {
            continue;
        }
        match arg.as_str() {
            "add" => add = Some(require_value(args, "add")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Tags { add })
}

fn parse_audio(
    args: &mut impl Iterator<Item = String>,
    globals: &mut Globals,
) -> Result<Command, ArgsError> {
    let mut enabled = None;
    let mut volume = None;
    let mut track = None;
    while let Some(arg) = args.next() {
        if globals.accept(&arg, args)? {
            continue;
        }
        match arg.as_str() {
            "--enabled" => {
                let raw = require_value(args, "--enabled")?;
                enabled = Some(match raw.trim() {
                    "true" | "on" | "1" => true,
                    "false" | "off" | "0" => false,
                    _ => {
                        return Err(ArgsError::InvalidBool {
                            flag: "--enabled",
                            raw,
                        });
                    }
                });
            }
            "--volume" => volume = Some(parse_number(require_value(args, "--volume")?, "--volume")?),
            "--track" => track = Some(require_value(args, "--track")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Audio {
        enabled,
        volume,
        track,
    })
}

fn reject_rest(
    args: &mut impl Iterator<Item = String>,
    globals: &mut Globals,
) -> Result<(), ArgsError> {
    while let Some(arg) = args.next() {
        if !globals.accept(&arg, args)? {
            return Err(ArgsError::UnknownArg(arg));
        }
    }
    Ok(())
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.is_empty() {
        print_usage();
        return Ok(());
    }

    let args = match Args::parse(argv) {
        Ok(Parsed::Args(args)) => args,
        Ok(Parsed::Help) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return Err(e.into());
        }
    };

    let mut config = FocusConfig::from_env()?;
    if let Some(db_url) = args.globals.db_url {
        config.db_url = db_url;
    }
    if let Some(character) = args.globals.character {
        config.character_id = character;
    }
    config.db_url = normalize_sqlite_url(config.db_url);
    tracing::debug!(db = %config.db_url, character = %config.character_id, "starting");

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&config.db_url)?;
    let services = AppServices::new_sqlite(config, Clock::default_clock()).await?;

    match args.command {
        Command::Run {
            task,
            minutes,
            category,
            tags,
        } => {
            let draft = TaskDraft::new(task, minutes)
                .with_category(category)
                .with_tags(tags);
            focus_loop::run_focus(&services, draft).await
        }
        Command::History { limit } => report::history(&services, limit).await,
        Command::Heatmap { month } => report::heatmap(&services, month).await,
        Command::Tags { add } => {
            let mut controller = services.load_controller().await?;
            if let Some(tag) = add {
                let tag = controller.add_tag(&tag).await?;
                println!("已添加标签：{tag}");
            }
            report::tags(controller.tags());
            Ok(())
        }
        Command::Audio {
            enabled,
            volume,
            track,
        } => {
            let mut controller = services.load_controller().await?;
            if enabled.is_some() || volume.is_some() || track.is_some() {
                let current = controller.audio_settings();
                let draft = AudioSettingsDraft {
                    enabled: enabled.unwrap_or(current.enabled()),
                    volume: volume.unwrap_or(current.volume()),
                    current_track: track.or_else(|| current.current_track().map(str::to_owned)),
                };
                controller.change_audio_settings(draft).await?;
            }
            report::audio(controller.audio_settings());
            Ok(())
        }
        Command::Characters => {
            report::characters(services.catalog(), &services.config().character_id);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
