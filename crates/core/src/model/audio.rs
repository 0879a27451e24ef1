use thiserror::Error;

/// Background audio preferences. Independent of the session lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSettings {
    enabled: bool,
    volume: f32,
    current_track: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AudioSettingsDraft {
    pub enabled: bool,
    pub volume: f32,
    pub current_track: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum AudioSettingsError {
    #[error("volume must be between 0 and 1, got {0}")]
    VolumeOutOfRange(f32),
}

pub const DEFAULT_VOLUME: f32 = 0.5;

impl AudioSettingsDraft {
    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `AudioSettingsError::VolumeOutOfRange` if the volume is not a finite value in `[0, 1]`.
    pub fn validate(self) -> Result<AudioSettings, AudioSettingsError> {
        if !self.volume.is_finite() || !(0.0..=1.0).contains(&self.volume) {
            return Err(AudioSettingsError::VolumeOutOfRange(self.volume));
        }
        let current_track = self
            .current_track
            .map(|track| track.trim().to_string())
            .filter(|track| !track.is_empty());

        Ok(AudioSettings {
            enabled: self.enabled,
            volume: self.volume,
            current_track,
        })
    }
}

impl AudioSettings {
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    #[must_use]
    pub fn current_track(&self) -> Option<&str> {
        self.current_track.as_deref()
    }

    /// Start an edit from the current values.
    #[must_use]
    pub fn to_draft(&self) -> AudioSettingsDraft {
        AudioSettingsDraft {
            enabled: self.enabled,
            volume: self.volume,
            current_track: self.current_track.clone(),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: DEFAULT_VOLUME,
            current_track: None,
        }
    }
}
