//! Game settings
//!
//! One section per game plus an optional fixed seed. Read from the JSON file
//! named by `PLAYROOM_SETTINGS`; any missing field takes its default.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::games::counting::CountingDifficulty;
use crate::games::jigsaw::JigsawDifficulty;
use crate::games::math::{self, MathOperation, MathRange};
use crate::games::maze::MazeDifficulty;
use crate::games::words::{self, WordLanguage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CountingSettings {
    pub difficulty: CountingDifficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LettersSettings {
    /// Mix Greek capitals into the character pool
    pub include_greek: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeSettings {
    pub difficulty: MazeDifficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JigsawSettings {
    pub difficulty: JigsawDifficulty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MathSettings {
    pub range: MathRange,
    pub operations: BTreeSet<MathOperation>,
    pub option_count: usize,
}

impl Default for MathSettings {
    fn default() -> Self {
        Self {
            range: MathRange::default(),
            operations: MathOperation::ALL.into_iter().collect(),
            option_count: math::DEFAULT_OPTIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordsSettings {
    pub language: WordLanguage,
    pub timer_secs: u32,
    pub option_count: usize,
}

impl Default for WordsSettings {
    fn default() -> Self {
        Self {
            language: WordLanguage::default(),
            timer_secs: words::DEFAULT_TIMER_SECS,
            option_count: words::DEFAULT_OPTIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed session seed; a clock-derived one is used when absent
    pub seed: Option<u64>,
    pub counting: CountingSettings,
    pub letters: LettersSettings,
    pub maze: MazeSettings,
    pub jigsaw: JigsawSettings,
    pub math: MathSettings,
    pub words: WordsSettings,
}

impl Settings {
    /// Environment variable holding the settings file path
    pub const ENV_VAR: &'static str = "PLAYROOM_SETTINGS";

    /// Load from `$PLAYROOM_SETTINGS`, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = std::env::var_os(Self::ENV_VAR) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", Path::new(&path).display());
                settings
            }
            Err(err) => {
                log::warn!("Ignoring settings file: {err}");
                Self::default()
            }
        }
    }

    /// Read and validate a settings file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject combinations no engine can be built from
    pub fn validate(&self) -> Result<(), ConfigError> {
        math::check_option_count(self.math.option_count)?;
        if self.math.operations.is_empty() {
            return Err(ConfigError::NoOperations);
        }
        words::check_timer(self.words.timer_secs)?;
        words::check_option_count(self.words.language, self.words.option_count)?;
        Ok(())
    }

    /// Seed for this session
    pub fn session_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.words.language, WordLanguage::Greek);
        assert_eq!(settings.words.timer_secs, 30);
        assert_eq!(settings.math.operations.len(), 2);
        assert_eq!(settings.counting.difficulty, CountingDifficulty::Medium);
        assert_eq!(settings.maze.difficulty, MazeDifficulty::Easy);
        assert_eq!(settings.jigsaw.difficulty, JigsawDifficulty::Easy);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "seed": 9, "maze": { "difficulty": "Hard" } }"#).unwrap();
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.session_seed(), 9);
        assert_eq!(settings.maze.difficulty, MazeDifficulty::Hard);
        assert_eq!(settings.math, MathSettings::default());
    }

    #[test]
    fn test_validation_errors() {
        let mut settings = Settings::default();
        settings.math.operations.clear();
        assert!(matches!(settings.validate(), Err(ConfigError::NoOperations)));

        let mut settings = Settings::default();
        settings.words.timer_secs = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidTimer { .. })
        ));

        let mut settings = Settings::default();
        settings.math.option_count = 9;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidOptionCount { .. })
        ));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("playroom-settings-{}.json", std::process::id()));
        let mut settings = Settings::default();
        settings.seed = Some(77);
        settings.letters.include_greek = true;
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::Io(_))
        ));
    }
}
