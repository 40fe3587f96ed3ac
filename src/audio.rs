//! Sound cue selection
//!
//! The simulation decides *which* sound plays and how loud; the host owns
//! the actual playback. Each cue maps to a configured clip with a pitch
//! range so repeated cues don't sound identical.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::random::RandomSource;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Parachute opens
    Deploy,
    /// Parachute released after a cut
    Cut,
    /// Cut command refused (too late, already cut, already landed)
    CutRejected,
    /// Landed on the target
    Win,
    /// Landed off the target
    Lose,
    /// Knocked off the target by a better landing
    Displaced,
}

/// Per-cue playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSettings {
    /// Clip the host should play
    pub file: String,
    /// Playback rate range, picked uniformly per play
    pub pitch: [f32; 2],
    /// Clip volume (0.0 - 1.0) before master volume
    pub volume: f32,
    /// Restart the clip if it is already playing
    #[serde(default)]
    pub restart: bool,
}

impl SoundSettings {
    pub fn new(file: impl Into<String>, volume: f32) -> Self {
        Self {
            file: file.into(),
            pitch: [1.0, 1.0],
            volume,
            restart: false,
        }
    }

    pub fn with_pitch(mut self, min: f32, max: f32) -> Self {
        self.pitch = [min, max];
        self
    }

    pub fn restarting(mut self) -> Self {
        self.restart = true;
        self
    }
}

/// Audio section of the config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub muted: bool,
    pub cues: HashMap<SoundCue, SoundSettings>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        let cues = HashMap::from([
            (SoundCue::Deploy, SoundSettings::new("deploy.ogg", 0.6).with_pitch(0.9, 1.1)),
            (SoundCue::Cut, SoundSettings::new("cut.ogg", 0.8)),
            (
                SoundCue::CutRejected,
                SoundSettings::new("denied.ogg", 0.5).restarting(),
            ),
            (SoundCue::Win, SoundSettings::new("win.ogg", 0.9)),
            (SoundCue::Lose, SoundSettings::new("thud.ogg", 0.7).with_pitch(0.8, 1.2)),
            (SoundCue::Displaced, SoundSettings::new("displaced.ogg", 0.7)),
        ]);
        Self {
            master_volume: 0.8,
            muted: false,
            cues,
        }
    }
}

/// A resolved play request handed to the host
#[derive(Debug, Clone, PartialEq)]
pub struct SoundRequest {
    pub cue: SoundCue,
    pub file: String,
    pub volume: f32,
    pub pitch: f32,
    pub restart: bool,
}

/// Turns cues into play requests using the configured settings
#[derive(Debug, Clone)]
pub struct Mixer {
    cues: HashMap<SoundCue, SoundSettings>,
    master_volume: f32,
    muted: bool,
}

impl Mixer {
    pub fn new(config: &AudioConfig) -> Self {
        Self {
            cues: config.cues.clone(),
            master_volume: config.master_volume.clamp(0.0, 1.0),
            muted: config.muted,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self, settings: &SoundSettings) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * settings.volume
        }
    }

    /// Resolve a cue. `None` when muted, silent, or not configured.
    pub fn request(&self, cue: SoundCue, rng: &mut RandomSource) -> Option<SoundRequest> {
        let settings = self.cues.get(&cue)?;
        let volume = self.effective_volume(settings);
        if volume <= 0.0 {
            return None;
        }
        let [low, high] = settings.pitch;
        Some(SoundRequest {
            cue,
            file: settings.file.clone(),
            volume,
            pitch: rng.float(low, high),
            restart: settings.restart,
        })
    }
}
