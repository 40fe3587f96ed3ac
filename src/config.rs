//! Game configuration
//!
//! Loaded once at startup (JSON) and threaded through the engine read-only.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::audio::AudioConfig;
use crate::error::ConfigError;
use crate::sprite::SpriteSheetInfo;

/// Inclusive-exclusive float range used for randomized values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::invalid(field, "range bounds must be finite"));
        }
        if self.min > self.max {
            return Err(ConfigError::invalid(
                field,
                format!("min {} exceeds max {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Visible play area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Randomization ranges applied on every spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Keep spawn x this far from either viewport edge
    pub margin: f32,
    /// Lateral speed magnitude (px/frame); direction is a coin flip
    pub x_speed: ValueRange,
    /// Initial descent speed (px/frame)
    pub y_speed: ValueRange,
    /// Brake height as a fraction of viewport height
    pub brake_height_ratio: ValueRange,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            margin: 50.0,
            x_speed: ValueRange::new(1.0, 3.0),
            y_speed: ValueRange::new(2.0, 4.0),
            brake_height_ratio: ValueRange::new(0.25, 0.5),
        }
    }
}

/// Dropper container and its attachments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropperLayout {
    /// Full container (parachute + avatar)
    pub size: Vec2,
    /// Visible avatar box, relative to the container's top-left
    pub hitbox_offset: Vec2,
    pub hitbox_size: Vec2,
    /// Parachute position relative to the container
    pub chute_offset: Vec2,
    /// Emote bubble position relative to the container
    pub emote_offset: Vec2,
}

impl Default for DropperLayout {
    fn default() -> Self {
        Self {
            size: Vec2::new(120.0, 162.0),
            hitbox_offset: Vec2::new(32.0, 106.0),
            hitbox_size: Vec2::new(56.0, 56.0),
            chute_offset: Vec2::ZERO,
            emote_offset: Vec2::new(76.0, 90.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetLayout {
    pub size: Vec2,
    /// Keep the target this far from either viewport edge when placing it
    pub margin: f32,
}

impl Default for TargetLayout {
    fn default() -> Self {
        Self {
            size: Vec2::new(200.0, 60.0),
            margin: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub dropper: SpriteSheetInfo,
    pub parachute: SpriteSheetInfo,
    pub emote: SpriteSheetInfo,
    pub target: SpriteSheetInfo,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            dropper: SpriteSheetInfo::builtin("dropper", 560, 56, 56, 56, 10),
            parachute: SpriteSheetInfo::builtin("parachute", 480, 100, 120, 100, 4),
            emote: SpriteSheetInfo::builtin("emote", 256, 256, 32, 32, 64),
            target: SpriteSheetInfo::builtin("target", 200, 60, 200, 60, 1),
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub viewport: Viewport,

    // === Engine ===
    /// Suspend after this much idle time (ms); 0 disables
    pub idle_timeout_ms: f32,

    // === Cut ===
    pub cut_enabled: bool,
    /// Reaction delay between a cut command and the release (ms); `None` cuts instantly
    pub cut_delay_ms: Option<ValueRange>,
    /// Cuts are refused once y passes this fraction of viewport height
    pub cut_lockout_ratio: f32,

    // === Target ===
    pub abdication_enabled: bool,

    // === Layout ===
    pub spawn: SpawnConfig,
    pub dropper: DropperLayout,
    pub target: TargetLayout,
    /// Fade-out duration after a drop completes (ms)
    pub fade_ms: f32,
    pub sheets: SheetConfig,

    // === Audio ===
    pub audio: AudioConfig,

    /// Entries kept on the session leaderboard
    pub leaderboard_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport: Viewport {
                width: 1920.0,
                height: 1080.0,
            },
            idle_timeout_ms: 60_000.0,
            cut_enabled: true,
            cut_delay_ms: Some(ValueRange::new(750.0, 1500.0)),
            cut_lockout_ratio: 0.75,
            abdication_enabled: true,
            spawn: SpawnConfig::default(),
            dropper: DropperLayout::default(),
            target: TargetLayout::default(),
            fade_ms: 1000.0,
            sheets: SheetConfig::default(),
            audio: AudioConfig::default(),
            leaderboard_size: 10,
        }
    }
}

impl Config {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// y coordinate past which cut commands are refused
    pub fn cut_lockout_y(&self) -> f32 {
        self.viewport.height * self.cut_lockout_ratio
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("viewport", self.viewport.width.min(self.viewport.height))?;
        non_negative("idle_timeout_ms", self.idle_timeout_ms)?;
        non_negative("fade_ms", self.fade_ms)?;
        unit_interval("cut_lockout_ratio", self.cut_lockout_ratio)?;

        if let Some(delay) = &self.cut_delay_ms {
            delay.check("cut_delay_ms")?;
            non_negative("cut_delay_ms", delay.min)?;
        }

        let spawn = &self.spawn;
        non_negative("spawn.margin", spawn.margin)?;
        spawn.x_speed.check("spawn.x_speed")?;
        non_negative("spawn.x_speed", spawn.x_speed.min)?;
        spawn.y_speed.check("spawn.y_speed")?;
        positive("spawn.y_speed", spawn.y_speed.min)?;
        spawn.brake_height_ratio.check("spawn.brake_height_ratio")?;
        unit_interval("spawn.brake_height_ratio", spawn.brake_height_ratio.min)?;
        unit_interval("spawn.brake_height_ratio", spawn.brake_height_ratio.max)?;

        let dropper = &self.dropper;
        positive("dropper.size", dropper.size.min_element())?;
        positive("dropper.hitbox_size", dropper.hitbox_size.min_element())?;
        non_negative("dropper.hitbox_offset", dropper.hitbox_offset.min_element())?;
        let hitbox_end = dropper.hitbox_offset + dropper.hitbox_size;
        if hitbox_end.x > dropper.size.x || hitbox_end.y > dropper.size.y {
            return Err(ConfigError::invalid(
                "dropper.hitbox_offset",
                "hitbox extends outside the container",
            ));
        }
        if dropper.size.x + 2.0 * spawn.margin > self.viewport.width {
            return Err(ConfigError::invalid(
                "spawn.margin",
                "viewport too narrow for dropper plus margins",
            ));
        }

        positive("target.size", self.target.size.min_element())?;
        non_negative("target.margin", self.target.margin)?;
        if self.target.size.x + 2.0 * self.target.margin > self.viewport.width
            || self.target.size.y > self.viewport.height
        {
            return Err(ConfigError::invalid(
                "target.size",
                "target does not fit the viewport",
            ));
        }

        unit_interval("audio.master_volume", self.audio.master_volume)?;
        for settings in self.audio.cues.values() {
            unit_interval("audio.cues.volume", settings.volume)?;
            ValueRange::new(settings.pitch[0], settings.pitch[1]).check("audio.cues.pitch")?;
            positive("audio.cues.pitch", settings.pitch[0])?;
        }

        if self.leaderboard_size == 0 {
            return Err(ConfigError::invalid("leaderboard_size", "must be at least 1"));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be positive")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must not be negative")))
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is outside 0..=1")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = Config::from_json(r#"{ "idle_timeout_ms": 1000, "cut_delay_ms": null }"#).unwrap();
        assert_eq!(config.idle_timeout_ms, 1000.0);
        assert!(config.cut_delay_ms.is_none());
        assert_eq!(config.viewport, Config::default().viewport);
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::default();
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_inverted_cut_delay() {
        let config = Config {
            cut_delay_ms: Some(ValueRange::new(1500.0, 750.0)),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cut_delay_ms", .. }));
    }

    #[test]
    fn test_rejects_hitbox_outside_container() {
        let mut config = Config::default();
        config.dropper.hitbox_offset = Vec2::new(100.0, 0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_viewport() {
        let mut config = Config::default();
        config.viewport.width = -10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_sheet_in_json() {
        let json = r#"{ "sheets": {
            "dropper":   {"tag":"d","sheet_width":56,"sheet_height":56,"frame_width":56,"frame_height":56,"frame_count":2},
            "parachute": {"tag":"p","sheet_width":120,"sheet_height":100,"frame_width":120,"frame_height":100,"frame_count":1},
            "emote":     {"tag":"e","sheet_width":32,"sheet_height":32,"frame_width":32,"frame_height":32,"frame_count":1},
            "target":    {"tag":"t","sheet_width":200,"sheet_height":60,"frame_width":200,"frame_height":60,"frame_count":1}
        } }"#;
        assert!(matches!(Config::from_json(json), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_builtin_sheets_pass_validation() {
        let sheets = SheetConfig::default();
        for sheet in [&sheets.dropper, &sheets.parachute, &sheets.emote, &sheets.target] {
            let size = sheet.sheet_size();
            let frame = sheet.frame_size();
            let checked = SpriteSheetInfo::new(
                sheet.tag(),
                size.x as u32,
                size.y as u32,
                frame.x as u32,
                frame.y as u32,
                sheet.frame_count(),
            );
            assert_eq!(checked.ok().as_ref(), Some(sheet));
        }
    }

    #[test]
    fn test_single_sheet_override_keeps_other_defaults() {
        let json = r#"{ "sheets": {
            "target": {"tag":"pad","sheet_width":400,"sheet_height":60,"frame_width":200,"frame_height":60,"frame_count":2}
        } }"#;
        let config = Config::from_json(json).unwrap();
        assert_eq!(config.sheets.target.tag(), "pad");
        assert_eq!(config.sheets.target.frame_count(), 2);
        assert_eq!(config.sheets.dropper, SheetConfig::default().dropper);
        assert_eq!(config.sheets.emote, SheetConfig::default().emote);
    }

    #[test]
    fn test_cut_lockout_y() {
        let config = Config::default();
        assert_eq!(config.cut_lockout_y(), 810.0);
    }
}
