//! Landing target
//!
//! Holds the droppers that landed on it and keeps at most one of them, the
//! best scorer, after every update.

use glam::Vec2;

use super::entity::{Entity, EntityId};
use super::stage::Stage;
use crate::presenter::{Presenter, Visual};

/// A dropper registered on the target with its frozen score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entrant {
    pub id: EntityId,
    pub score: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Target {
    landed: Vec<Entrant>,
}

impl Target {
    /// Register a dropper that landed on the target this frame
    pub fn land(&mut self, id: EntityId, score: f32) {
        self.landed.push(Entrant { id, score });
    }

    pub fn landed(&self) -> &[Entrant] {
        &self.landed
    }

    /// Current holder of the winning spot
    pub fn winner(&self) -> Option<Entrant> {
        self.landed.first().copied()
    }

    /// Take a specific entrant off the target
    pub fn abdicate(&mut self, id: EntityId) -> Option<Entrant> {
        let index = self.landed.iter().position(|e| e.id == id)?;
        Some(self.landed.remove(index))
    }

    /// Empty the target (idle suspension)
    pub fn clear(&mut self) -> Vec<Entrant> {
        std::mem::take(&mut self.landed)
    }

    /// Reduce the landed set to its best entrant.
    ///
    /// Returns the displaced ids in the order they lost. Ties keep the
    /// entrant registered first. The engine updates droppers in reverse
    /// spawn order, so of two droppers landing on the same frame the
    /// later-spawned one registers first.
    pub fn arbitrate(&mut self) -> Vec<EntityId> {
        let mut entrants = self.landed.drain(..);
        let Some(mut high) = entrants.next() else {
            return Vec::new();
        };

        let mut displaced = Vec::new();
        for entrant in entrants {
            if entrant.score > high.score {
                displaced.push(high.id);
                high = entrant;
            } else {
                displaced.push(entrant.id);
            }
        }

        self.landed.push(high);
        displaced
    }
}

/// Per-frame target update; returns droppers that lost their spot
pub fn update(entity: &mut Entity) -> Vec<EntityId> {
    match entity.as_target_mut() {
        Some(target) if target.landed.len() > 1 => target.arbitrate(),
        _ => Vec::new(),
    }
}

/// Move the target to a random spot along the floor and show it
pub fn reveal<P: Presenter>(entity: &mut Entity, stage: &mut Stage<P>) {
    let viewport = stage.config.viewport;
    let margin = stage.config.target.margin;
    let left = stage
        .rng
        .float(margin, viewport.width - entity.size.x - margin);
    place(entity, left, stage);

    let body = Visual::body(entity.id);
    if let Some(sheet) = &entity.sheet {
        if let Some(offset) = sheet.frame_offset(0) {
            stage.presenter.set_frame(body, sheet, 0, offset);
        }
    }
    stage.presenter.display(body);
}

/// Put the target's left edge at `left`, resting on the floor
pub fn place<P: Presenter>(entity: &mut Entity, left: f32, stage: &mut Stage<P>) {
    let floor = stage.config.viewport.height;
    entity.pos = Vec2::new(left, floor - entity.size.y);
    stage.presenter.reposition(Visual::body(entity.id), entity.pos);
}
