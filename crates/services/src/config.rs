//! Runtime configuration for the focus services.

use std::time::Duration;

use chrono::FixedOffset;
use focus_core::catalog::PROGRAMMING_CAT;
use focus_core::time::local_offset;

use crate::error::ConfigError;

pub const DB_URL_VAR: &str = "FOCUS_DB_URL";
pub const CHARACTER_VAR: &str = "FOCUS_CHARACTER";
pub const UTC_OFFSET_VAR: &str = "FOCUS_UTC_OFFSET_MINUTES";

pub const DEFAULT_DB_URL: &str = "sqlite://focus.sqlite3";

/// Delays driving the focus lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTimings {
    /// Companion deliberation before it picks its task.
    pub deliberation: Duration,
    /// Countdown resolution.
    pub tick: Duration,
    pub rotation_min: Duration,
    pub rotation_max: Duration,
    /// Pause after a reflection before returning to idle.
    pub reset_delay: Duration,
}

impl Default for LifecycleTimings {
    fn default() -> Self {
        Self {
            deliberation: Duration::from_millis(2000),
            tick: Duration::from_millis(1000),
            rotation_min: Duration::from_secs(10),
            rotation_max: Duration::from_secs(30),
            reset_delay: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusConfig {
    pub db_url: String,
    pub character_id: String,
    /// Offset used to bucket sessions into calendar days.
    pub utc_offset: FixedOffset,
    pub timings: LifecycleTimings,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.to_string(),
            character_id: PROGRAMMING_CAT.to_string(),
            utc_offset: local_offset(),
            timings: LifecycleTimings::default(),
        }
    }
}

impl FocusConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `FOCUS_UTC_OFFSET_MINUTES` is not a valid offset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`FocusConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the offset variable is not a valid offset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = non_blank(lookup(DB_URL_VAR)) {
            config.db_url = url;
        }
        if let Some(character) = non_blank(lookup(CHARACTER_VAR)) {
            config.character_id = character;
        }
        if let Some(raw) = non_blank(lookup(UTC_OFFSET_VAR)) {
            config.utc_offset = parse_offset_minutes(&raw)?;
        }
        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_offset_minutes(raw: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        var: UTC_OFFSET_VAR,
        raw: raw.to_string(),
    };
    let minutes: i32 = raw.parse().map_err(|_| invalid())?;
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(invalid)
}
