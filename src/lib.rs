//! Parachute Drop - a falling-avatar landing game
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (dropper physics, target arbitration, engine loop)
//! - `presenter`: Side-effect interface implemented by the rendering/audio host
//! - `config`: Data-driven game configuration loaded once at startup
//! - `audio`: Sound cue selection (playback itself belongs to the host)
//! - `platform`: Browser bridge (wasm32 only)

pub mod audio;
pub mod config;
pub mod error;
pub mod platform;
pub mod presenter;
pub mod random;
pub mod scores;
pub mod sim;
pub mod sprite;

pub use config::Config;
pub use error::ConfigError;
pub use presenter::{DropResolved, Part, Presenter, Visual, VisualState};
pub use scores::SessionScores;
pub use sim::Engine;

/// Physics and timing constants
pub mod consts {
    /// Descent speed is divided by this every frame while braking
    pub const BRAKE_DIVISOR: f32 = 1.05;
    /// Braking stops once descent speed is at or below this (px/frame)
    pub const MIN_DESCENT_SPEED: f32 = 0.5;
    /// Descent speed is multiplied by this every frame after a cut
    pub const CUT_ACCELERATION: f32 = 1.08;
    /// Free-fall speed cap after a cut (px/frame)
    pub const TERMINAL_VELOCITY: f32 = 12.0;

    /// Time a landed non-winner lingers before fading out (ms)
    pub const DEATH_CLOCK_MS: f32 = 5000.0;
    /// Landing plane sits this fraction of the target height above the floor
    pub const LANDING_PLANE_RATIO: f32 = 0.25;

    /// Score for a dead-center landing
    pub const MAX_SCORE: f32 = 100.0;

    /// Largest frame delta fed to the simulation (ms); longer gaps are clamped
    pub const MAX_FRAME_DELTA_MS: f32 = 1000.0;
}
