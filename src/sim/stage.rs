//! Everything an entity update may touch besides the entity itself
//!
//! Kept separate from the entity list so the engine can lend both out at
//! once: `&mut entities[i]` alongside `&mut stage`.

use super::entity::{Bounds, EntityId};
use crate::audio::{Mixer, SoundCue};
use crate::config::Config;
use crate::presenter::Presenter;
use crate::random::RandomSource;

/// Where the target sits this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub id: EntityId,
    pub bounds: Bounds,
}

pub struct Stage<P: Presenter> {
    pub config: Config,
    pub rng: RandomSource,
    pub mixer: Mixer,
    pub presenter: P,
    /// Refreshed by the engine at the start of every frame
    pub target: Option<TargetInfo>,
}

impl<P: Presenter> Stage<P> {
    pub fn new(config: Config, seed: u64, presenter: P) -> Self {
        let mixer = Mixer::new(&config.audio);
        Self {
            config,
            rng: RandomSource::new(seed),
            mixer,
            presenter,
            target: None,
        }
    }

    /// Fire a sound cue through the mixer
    pub fn play(&mut self, cue: SoundCue) {
        if let Some(request) = self.mixer.request(cue, &mut self.rng) {
            self.presenter.play_sound(&request);
        }
    }
}
