//! Tela configuration system
//!
//! Centralized configuration for the scene library, loaded from `tela.toml`
//! with `TELA_*` environment variables as temporary overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from explicit config-file loads. `load_or_default` swallows these
/// and falls back to defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure for Tela
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TelaConfig {
    /// Stage defaults (frame rate, clearing, buffering)
    pub stage: StageConfig,
    /// Animation defaults (duration, easing)
    pub animation: AnimationConfig,
    /// Keyboard input defaults
    pub input: InputConfig,
}

/// Stage construction defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Target frames per second for the scheduler's pacing floor
    pub fps: u32,
    /// Register the frame task as soon as the stage is built
    pub auto_start: bool,
    /// Clear each layer before redrawing it
    pub clear: bool,
    /// Clear to this color instead of transparent (any CSS-like color string)
    pub clear_color: Option<String>,
    /// Give layers an offscreen back buffer composited per frame
    pub back_buffer: bool,
}

/// Animation defaults applied to tweens that don't specify their own
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Default tween duration in milliseconds
    pub duration_ms: f64,
    /// Default timing function name (e.g. "linear", "sine-out", "bounce")
    pub easing: String,
}

/// Keyboard input defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Mark every key event as default-prevented
    pub prevent_all: bool,
    /// Key names to default-prevent (ignored when `prevent_all` is set)
    pub prevent_keys: Vec<String>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            auto_start: true,
            clear: true,
            clear_color: None,
            back_buffer: false,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 500.0,
            easing: "linear".to_string(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            prevent_all: false,
            prevent_keys: Vec::new(),
        }
    }
}

fn env_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl TelaConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from the default location (tela.toml in the
    /// current directory) or return default configuration if it's missing
    /// or malformed
    pub fn load_or_default() -> Self {
        Self::load_from_file("tela.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values,
    /// allowing temporary overrides without modifying the config file.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("TELA_FPS") {
            if let Ok(fps) = val.parse::<u32>() {
                self.stage.fps = fps;
            }
        }
        if let Ok(val) = std::env::var("TELA_AUTO_START") {
            self.stage.auto_start = env_bool(&val);
        }
        if let Ok(val) = std::env::var("TELA_CLEAR") {
            self.stage.clear = env_bool(&val);
        }
        if let Ok(val) = std::env::var("TELA_CLEAR_COLOR") {
            self.stage.clear_color = Some(val);
        }
        if let Ok(val) = std::env::var("TELA_BACK_BUFFER") {
            self.stage.back_buffer = env_bool(&val);
        }

        if let Ok(val) = std::env::var("TELA_ANIMATION_DURATION") {
            if let Ok(ms) = val.parse::<f64>() {
                self.animation.duration_ms = ms;
            }
        }
        if let Ok(easing) = std::env::var("TELA_EASING") {
            self.animation.easing = easing;
        }

        if let Ok(val) = std::env::var("TELA_PREVENT_ALL") {
            self.input.prevent_all = env_bool(&val);
        }
        if let Ok(val) = std::env::var("TELA_PREVENT_KEYS") {
            self.input.prevent_keys = val
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from tela.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelaConfig::default();
        assert_eq!(config.stage.fps, 30);
        assert!(config.stage.auto_start);
        assert!(config.stage.clear);
        assert!(!config.stage.back_buffer);
        assert_eq!(config.animation.duration_ms, 500.0);
        assert_eq!(config.animation.easing, "linear");
        assert!(!config.input.prevent_all);
    }

    #[test]
    fn test_toml_serialization() {
        let config = TelaConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: TelaConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.stage.fps, 30);
    }

    #[test]
    fn test_partial_toml() {
        let parsed: TelaConfig = toml::from_str(
            r#"
            [stage]
            fps = 60
            back_buffer = true

            [animation]
            easing = "bounce-out"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.stage.fps, 60);
        assert!(parsed.stage.back_buffer);
        assert!(parsed.stage.auto_start); // untouched defaults survive
        assert_eq!(parsed.animation.easing, "bounce-out");
        assert_eq!(parsed.animation.duration_ms, 500.0);
    }

    #[test]
    fn test_load_or_default() {
        // Should not panic even if tela.toml doesn't exist
        let config = TelaConfig::load_or_default();
        assert_eq!(config.stage.fps, 30);
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("TELA_FPS", "24");
            std::env::set_var("TELA_PREVENT_KEYS", "space, enter");
        }

        let mut config = TelaConfig::default();
        config.merge_with_env();

        assert_eq!(config.stage.fps, 24);
        assert_eq!(config.input.prevent_keys, vec!["space", "enter"]);

        unsafe {
            std::env::remove_var("TELA_FPS");
            std::env::remove_var("TELA_PREVENT_KEYS");
        }
    }
}
