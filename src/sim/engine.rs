//! Engine loop
//!
//! Owns the active entity set and drives it once per host frame:
//! delta time → entity updates (reverse order) → target arbitration →
//! dead entities back to the pool. Commands (spawn, cut, abdicate) are
//! plain method calls made between frames.

use std::sync::Arc;

use super::clock::FrameClock;
use super::dropper::{self, Dropper, Landing};
use super::entity::{Entity, EntityId};
use super::pool::EntityPool;
use super::stage::{Stage, TargetInfo};
use super::target::{self, Target};
use crate::config::Config;
use crate::error::ConfigError;
use crate::presenter::Presenter;
use crate::scores::SessionScores;
use crate::sprite::SpriteSheetInfo;

pub struct Engine<P: Presenter> {
    stage: Stage<P>,
    /// Target first, droppers in spawn order
    entities: Vec<Entity>,
    pool: EntityPool<Entity>,
    clock: FrameClock,
    idle_ms: f32,
    suspended: bool,
    /// Simulated time since start (ms)
    elapsed_ms: f64,
    scores: SessionScores,
    dropper_sheet: Arc<SpriteSheetInfo>,
    target_id: EntityId,
    next_id: EntityId,
}

impl<P: Presenter> Engine<P> {
    /// Validate the config and put the target on screen
    pub fn new(config: Config, seed: u64, presenter: P) -> Result<Self, ConfigError> {
        config.validate()?;

        let dropper_sheet = Arc::new(config.sheets.dropper.clone());
        let target_sheet = Arc::new(config.sheets.target.clone());
        let scores = SessionScores::new(config.leaderboard_size);
        let mut stage = Stage::new(config, seed, presenter);

        let target_id = 1;
        let mut target = Entity::target(target_id, &stage.config, target_sheet);
        target::reveal(&mut target, &mut stage);

        log::info!(
            "Engine started ({}x{}, seed {})",
            stage.config.viewport.width,
            stage.config.viewport.height,
            seed
        );

        Ok(Self {
            stage,
            entities: vec![target],
            pool: EntityPool::new(),
            clock: FrameClock::new(),
            idle_ms: 0.0,
            suspended: false,
            elapsed_ms: 0.0,
            scores,
            dropper_sheet,
            target_id,
            next_id: target_id + 1,
        })
    }

    /// Host frame callback with a wall-clock timestamp (ms)
    pub fn frame(&mut self, now_ms: f64) {
        if self.suspended {
            return;
        }
        let delta = self.clock.tick(now_ms);
        self.step(delta);
    }

    /// Advance the simulation by `delta` ms
    pub fn step(&mut self, delta: f32) {
        if self.suspended {
            return;
        }
        self.elapsed_ms += delta as f64;

        if self.track_idle(delta) {
            self.suspend();
            return;
        }

        self.stage.target = self.target_info();

        // Reverse order so removal never skips an entity
        for i in (0..self.entities.len()).rev() {
            if self.entities[i].as_target().is_some() {
                let displaced = target::update(&mut self.entities[i]);
                for id in displaced {
                    if let Some(loser) = self.entities.iter_mut().find(|e| e.id == id) {
                        dropper::demote(loser, false, &mut self.stage);
                    }
                }
            } else if let Some(landing) =
                dropper::update(&mut self.entities[i], delta, &mut self.stage)
            {
                self.register_landing(i, landing);
            }

            if !self.entities[i].alive {
                let entity = self.entities.remove(i);
                self.recycle(entity);
            }
        }
    }

    /// Launch a dropper. Refused while a live dropper already has `name`;
    /// droppers that are fading out no longer hold their name.
    pub fn spawn(&mut self, name: &str, emote: Option<u32>) -> bool {
        if self.find(name).is_some() {
            log::debug!("{name} is already dropping");
            return false;
        }
        if self.suspended {
            self.resume();
        }

        let mut entity = match self.pool.get() {
            Some(entity) => entity,
            None => {
                let id = self.next_entity_id();
                Entity::dropper(id, &self.stage.config, self.dropper_sheet.clone())
            }
        };
        dropper::randomize(&mut entity, name, emote, &mut self.stage);
        log::info!("{name} dropping (entity {})", entity.id);
        self.entities.push(entity);
        true
    }

    /// Ask `name` to cut their parachute
    pub fn request_cut(&mut self, name: &str) -> bool {
        match self.find(name) {
            Some(i) => dropper::cut_chute(&mut self.entities[i], &mut self.stage),
            None => false,
        }
    }

    /// Let the current winner give up the target
    pub fn abdicate(&mut self, name: &str) -> bool {
        if !self.stage.config.abdication_enabled {
            return false;
        }
        let Some(i) = self.find(name) else {
            return false;
        };
        let id = self.entities[i].id;
        if self.target_mut().and_then(|t| t.abdicate(id)).is_none() {
            log::debug!("{name} is not on the target");
            return false;
        }
        dropper::demote(&mut self.entities[i], true, &mut self.stage);
        true
    }

    /// Move the target so its left edge sits at `left`
    pub fn place_target(&mut self, left: f32) {
        if let Some(i) = self.target_index() {
            target::place(&mut self.entities[i], left, &mut self.stage);
        }
    }

    fn register_landing(&mut self, index: usize, landing: Landing) {
        if !landing.on_target {
            return;
        }
        let id = self.entities[index].id;
        if let Some(name) = self.entities[index].name() {
            if let Some(rank) = self.scores.record(name, landing.score, self.elapsed_ms) {
                log::debug!("{name} is #{rank} this session");
            }
        }
        if let Some(target) = self.target_mut() {
            target.land(id, landing.score);
        }
    }

    /// Accumulate idle time; true once the timeout has passed
    fn track_idle(&mut self, delta: f32) -> bool {
        let idle = match self.entities.len() {
            1 => true,
            2 => self
                .entities
                .iter()
                .any(|e| e.as_dropper().is_some_and(|d| d.landed)),
            _ => false,
        };
        if idle {
            self.idle_ms += delta;
        } else {
            self.idle_ms = 0.0;
        }

        let timeout = self.stage.config.idle_timeout_ms;
        timeout > 0.0 && self.idle_ms > timeout
    }

    fn suspend(&mut self) {
        log::info!("Idle for {:.0} ms, suspending", self.idle_ms);

        let (droppers, rest): (Vec<Entity>, Vec<Entity>) = std::mem::take(&mut self.entities)
            .into_iter()
            .partition(|e| e.as_dropper().is_some());
        self.entities = rest;
        for entity in droppers {
            self.recycle(entity);
        }

        if let Some(i) = self.target_index() {
            let entity = &mut self.entities[i];
            if let Some(target) = entity.as_target_mut() {
                target.clear();
            }
            for visual in entity.visuals() {
                self.stage.presenter.hide(visual);
            }
        }

        self.suspended = true;
        self.idle_ms = 0.0;
    }

    fn resume(&mut self) {
        log::info!("Resuming");
        self.suspended = false;
        self.idle_ms = 0.0;
        self.clock.reset();
        if let Some(i) = self.target_index() {
            target::reveal(&mut self.entities[i], &mut self.stage);
        }
    }

    /// Hide a dead entity and park it in the pool
    fn recycle(&mut self, entity: Entity) {
        for visual in entity.visuals() {
            self.stage.presenter.hide(visual);
        }
        if let Some(target) = self.target_mut() {
            target.abdicate(entity.id);
        }
        log::trace!("Entity {} recycled", entity.id);
        self.pool.add(entity);
    }

    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Index of the live (not yet completed) dropper called `name`
    fn find(&self, name: &str) -> Option<usize> {
        self.entities.iter().position(|e| {
            e.as_dropper()
                .is_some_and(|d| d.name == name && !d.drop_complete)
        })
    }

    fn target_index(&self) -> Option<usize> {
        self.entities.iter().position(|e| e.id == self.target_id)
    }

    fn target_mut(&mut self) -> Option<&mut Target> {
        let i = self.target_index()?;
        self.entities[i].as_target_mut()
    }

    fn target_info(&self) -> Option<TargetInfo> {
        let i = self.target_index()?;
        Some(TargetInfo {
            id: self.target_id,
            bounds: self.entities[i].bounds(),
        })
    }

    // === Accessors ===

    pub fn config(&self) -> &Config {
        &self.stage.config
    }

    pub fn presenter(&self) -> &P {
        &self.stage.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.stage.presenter
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Live dropper entity called `name`
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.find(name).map(|i| &self.entities[i])
    }

    pub fn entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.find(name).map(|i| &mut self.entities[i])
    }

    pub fn dropper(&self, name: &str) -> Option<&Dropper> {
        self.entity(name).and_then(Entity::as_dropper)
    }

    pub fn target(&self) -> Option<&Entity> {
        self.target_index().map(|i| &self.entities[i])
    }

    /// Dropper currently holding the target
    pub fn winner(&self) -> Option<&Dropper> {
        let entrant = self.target()?.as_target()?.winner()?;
        self.entities
            .iter()
            .find(|e| e.id == entrant.id)
            .and_then(Entity::as_dropper)
    }

    pub fn scores(&self) -> &SessionScores {
        &self.scores
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn idle_ms(&self) -> f32 {
        self.idle_ms
    }

    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.stage.mixer.set_muted(muted);
    }

    pub fn set_master_volume(&mut self, vol: f32) {
        self.stage.mixer.set_master_volume(vol);
    }
}
