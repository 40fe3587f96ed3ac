//! Entity descriptor shared by everything in the active set
//!
//! Common fields live on `Entity`; per-kind behavior lives in `EntityKind`
//! and is dispatched by the engine with a plain `match`.

use std::sync::Arc;

use glam::Vec2;

use super::dropper::Dropper;
use super::target::Target;
use crate::config::Config;
use crate::presenter::{Part, Visual};
use crate::sprite::SpriteSheetInfo;

/// Stable entity identifier. Survives pool recycling.
pub type EntityId = u32;

/// Axis-aligned box in screen space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            left: pos.x,
            top: pos.y,
            width: size.x,
            height: size.y,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }

    /// Horizontal spans share at least some width
    pub fn overlaps_x(&self, other: &Bounds) -> bool {
        self.left < other.right() && self.right() > other.left
    }
}

pub enum EntityKind {
    Target(Target),
    Dropper(Dropper),
}

/// A member of the engine's active set
pub struct Entity {
    pub id: EntityId,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub sheet: Option<Arc<SpriteSheetInfo>>,
    /// Cleared by the entity's own update when it is ready for removal
    pub alive: bool,
    pub kind: EntityKind,
}

const DROPPER_PARTS: [Part; 3] = [Part::Body, Part::Chute, Part::Emote];
const TARGET_PARTS: [Part; 1] = [Part::Body];

impl Entity {
    pub fn target(id: EntityId, config: &Config, sheet: Arc<SpriteSheetInfo>) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            size: config.target.size,
            sheet: Some(sheet),
            alive: true,
            kind: EntityKind::Target(Target::default()),
        }
    }

    pub fn dropper(id: EntityId, config: &Config, sheet: Arc<SpriteSheetInfo>) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            size: config.dropper.size,
            sheet: Some(sheet),
            alive: true,
            kind: EntityKind::Dropper(Dropper::new(&config.dropper)),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.pos, self.size)
    }

    /// Every visual handle this entity owns
    pub fn visuals(&self) -> impl Iterator<Item = Visual> + use<> {
        let id = self.id;
        let parts: &'static [Part] = match self.kind {
            EntityKind::Target(_) => &TARGET_PARTS,
            EntityKind::Dropper(_) => &DROPPER_PARTS,
        };
        parts.iter().map(move |&part| Visual::new(id, part))
    }

    pub fn name(&self) -> Option<&str> {
        self.as_dropper().map(|d| d.name.as_str())
    }

    pub fn as_dropper(&self) -> Option<&Dropper> {
        match &self.kind {
            EntityKind::Dropper(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dropper_mut(&mut self) -> Option<&mut Dropper> {
        match &mut self.kind {
            EntityKind::Dropper(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_target(&self) -> Option<&Target> {
        match &self.kind {
            EntityKind::Target(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_target_mut(&mut self) -> Option<&mut Target> {
        match &mut self.kind {
            EntityKind::Target(t) => Some(t),
            _ => None,
        }
    }
}
