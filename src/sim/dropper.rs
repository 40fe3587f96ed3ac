//! Dropper state machine
//!
//! A dropper spawns above the viewport, opens its parachute once visible,
//! drifts and bounces between the side walls, and lands on the floor. A
//! landing that overlaps the target scores by distance from its center.
//!
//! Motion is per frame (px/frame); timers (cut delay, death clock, fade)
//! run on the frame delta in ms.

use glam::Vec2;

use super::entity::{Bounds, Entity, EntityId, EntityKind};
use super::stage::Stage;
use crate::audio::SoundCue;
use crate::config::DropperLayout;
use crate::consts::*;
use crate::presenter::{DropResolved, Part, Presenter, Visual, VisualState};

/// A child visual carried at a fixed offset from the dropper
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub offset: Vec2,
    pub attached: bool,
    pub frame: u32,
}

impl Attachment {
    fn new(offset: Vec2) -> Self {
        Self {
            offset,
            attached: true,
            frame: 0,
        }
    }
}

/// Result of the frame a dropper touched down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub on_target: bool,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dropper {
    pub name: String,
    /// px/frame
    pub vel: Vec2,
    /// Descent brakes once y passes this
    pub brake_height: f32,
    /// Remaining cut delay (ms)
    pub cut_clock: f32,

    pub deployed: bool,
    pub landed: bool,
    pub cut_requested: bool,
    pub cut_triggered: bool,
    pub winner: bool,
    pub drop_complete: bool,

    /// Time spent landed as a non-winner (ms)
    pub death_clock: f32,
    /// Time spent fading after completion (ms)
    pub fade_clock: f32,
    pub drop_score: f32,

    pub avatar_frame: u32,
    pub hitbox_offset: Vec2,
    pub hitbox_size: Vec2,
    pub chute: Attachment,
    pub emote: Attachment,
    /// Target this dropper is registered on, if any
    pub target: Option<EntityId>,
}

impl Dropper {
    pub fn new(layout: &DropperLayout) -> Self {
        Self {
            name: String::new(),
            vel: Vec2::ZERO,
            brake_height: 0.0,
            cut_clock: 0.0,
            deployed: false,
            landed: false,
            cut_requested: false,
            cut_triggered: false,
            winner: false,
            drop_complete: false,
            death_clock: 0.0,
            fade_clock: 0.0,
            drop_score: 0.0,
            avatar_frame: 0,
            hitbox_offset: layout.hitbox_offset,
            hitbox_size: layout.hitbox_size,
            chute: Attachment::new(layout.chute_offset),
            emote: Attachment::new(layout.emote_offset),
            target: None,
        }
    }

    /// Visible avatar box for a container at `pos`
    pub fn hitbox(&self, pos: Vec2) -> Bounds {
        Bounds::new(pos + self.hitbox_offset, self.hitbox_size)
    }
}

/// Score for a hitbox landing against a target.
///
/// 100 at dead center, falling linearly to 0 where the spans stop overlapping.
pub fn drop_score(hitbox: &Bounds, target: &Bounds) -> f32 {
    let max_distance = target.width / 2.0 + hitbox.width / 2.0;
    let distance = (target.center_x() - hitbox.center_x()).abs();
    (MAX_SCORE * (1.0 - distance / max_distance)).max(0.0)
}

/// Reset a fresh or recycled dropper and put it at the top of the screen
pub fn randomize<P: Presenter>(
    entity: &mut Entity,
    name: &str,
    emote: Option<u32>,
    stage: &mut Stage<P>,
) {
    let Entity {
        id,
        pos,
        size,
        sheet,
        alive,
        kind: EntityKind::Dropper(d),
    } = entity
    else {
        return;
    };
    let id = *id;
    let config = &stage.config;
    let body_sheet = sheet.as_deref().unwrap_or(&config.sheets.dropper);
    let spawn = &config.spawn;
    let rng = &mut stage.rng;

    *alive = true;
    *size = config.dropper.size;
    *pos = Vec2::new(
        rng.float(spawn.margin, config.viewport.width - size.x - spawn.margin),
        -size.y,
    );

    let mut fresh = Dropper::new(&config.dropper);
    fresh.name.push_str(name);
    fresh.vel = Vec2::new(
        rng.float(spawn.x_speed.min, spawn.x_speed.max) * rng.sign(),
        rng.float(spawn.y_speed.min, spawn.y_speed.max),
    );
    fresh.brake_height = config.viewport.height
        * rng.float(spawn.brake_height_ratio.min, spawn.brake_height_ratio.max);
    fresh.cut_clock = config
        .cut_delay_ms
        .map_or(0.0, |delay| rng.float(delay.min, delay.max));

    let avatar_count = body_sheet.frame_count();
    fresh.avatar_frame = rng.int(0, avatar_count as i32 - 1) as u32;

    let emote_count = config.sheets.emote.frame_count();
    fresh.emote.frame = match emote {
        Some(frame) if frame < emote_count => frame,
        Some(frame) => {
            log::warn!("Emote {frame} out of range for {name}, picking one at random");
            rng.int(0, emote_count as i32 - 1) as u32
        }
        None => rng.int(0, emote_count as i32 - 1) as u32,
    };
    *d = fresh;

    for part in [Part::Body, Part::Chute, Part::Emote] {
        let visual = Visual::new(id, part);
        for state in VisualState::ALL {
            stage.presenter.apply_visual_state(visual, state, false);
        }
        stage.presenter.display(visual);
    }
    let sheets = &stage.config.sheets;
    let frames = [
        (Part::Body, body_sheet, d.avatar_frame),
        (Part::Chute, &sheets.parachute, d.chute.frame),
        (Part::Emote, &sheets.emote, d.emote.frame),
    ];
    for (part, info, frame) in frames {
        if let Some(offset) = info.frame_offset(frame) {
            stage
                .presenter
                .set_frame(Visual::new(id, part), info, frame, offset);
        }
    }
    reposition(id, *pos, d, &mut stage.presenter);
}

/// Advance one frame. Returns the landing on the frame it happens.
pub fn update<P: Presenter>(
    entity: &mut Entity,
    delta: f32,
    stage: &mut Stage<P>,
) -> Option<Landing> {
    let Entity {
        id,
        pos,
        alive,
        kind: EntityKind::Dropper(d),
        ..
    } = entity
    else {
        return None;
    };

    if d.landed {
        landed_update(*id, alive, d, delta, stage);
        return None;
    }

    let id = *id;
    *pos += d.vel;

    if d.cut_requested && !d.cut_triggered {
        d.cut_clock -= delta;
        if d.cut_clock <= 0.0 {
            trigger_cut(id, d, stage);
        }
    }

    // Parachute drag
    if !d.cut_triggered && pos.y >= d.brake_height && d.vel.y > MIN_DESCENT_SPEED {
        d.vel.y /= BRAKE_DIVISOR;
    }

    // Free fall
    if d.cut_triggered && d.vel.y < TERMINAL_VELOCITY {
        d.vel.y = (d.vel.y * CUT_ACCELERATION).min(TERMINAL_VELOCITY);
    }

    if !d.deployed && !d.cut_requested && pos.y >= 0.0 {
        deploy(id, d, stage);
    }

    // Sign flip only; the next frame carries the box back inside
    let hitbox = d.hitbox(*pos);
    if hitbox.left < 0.0 || hitbox.right() > stage.config.viewport.width {
        d.vel.x = -d.vel.x;
    }

    let target_height = stage.target.map_or(0.0, |t| t.bounds.height);
    let plane = stage.config.viewport.height - hitbox.height - LANDING_PLANE_RATIO * target_height;
    let result = if hitbox.top >= plane {
        Some(land(id, *pos, d, stage))
    } else {
        None
    };

    reposition(id, *pos, d, &mut stage.presenter);
    result
}

/// Cut command. Returns whether the cut was accepted.
pub fn cut_chute<P: Presenter>(entity: &mut Entity, stage: &mut Stage<P>) -> bool {
    let Entity {
        id,
        pos,
        kind: EntityKind::Dropper(d),
        ..
    } = entity
    else {
        return false;
    };
    if !stage.config.cut_enabled {
        return false;
    }

    if d.landed || d.cut_requested || pos.y > stage.config.cut_lockout_y() {
        log::debug!(
            "Cut refused for {} (landed={}, requested={}, y={:.0})",
            d.name,
            d.landed,
            d.cut_requested,
            pos.y
        );
        stage.play(SoundCue::CutRejected);
        return false;
    }

    d.cut_requested = true;
    log::debug!("{} cut requested, {:.0} ms delay", d.name, d.cut_clock.max(0.0));
    if d.cut_clock <= 0.0 {
        trigger_cut(*id, d, stage);
    }
    true
}

/// Knock a winner off the target. `voluntary` marks an abdication, which
/// also starts the fade-out right away.
pub fn demote<P: Presenter>(entity: &mut Entity, voluntary: bool, stage: &mut Stage<P>) {
    let Entity {
        id,
        kind: EntityKind::Dropper(d),
        ..
    } = entity
    else {
        return;
    };
    if !d.winner {
        return;
    }
    let id = *id;

    d.winner = false;
    d.target = None;
    let body = Visual::body(id);
    stage.presenter.apply_visual_state(body, VisualState::Winner, false);
    stage.presenter.apply_visual_state(body, VisualState::Loser, true);
    stage.presenter.apply_visual_state(body, VisualState::Ghosted, true);
    if !voluntary {
        stage.play(SoundCue::Displaced);
    }

    stage.presenter.drop_resolved(&DropResolved {
        name: d.name.clone(),
        on_target: true,
        winner: false,
        voluntary,
        score: d.drop_score,
    });
    log::info!(
        "{} {} the target ({:.1})",
        d.name,
        if voluntary { "left" } else { "was knocked off" },
        d.drop_score
    );

    if voluntary {
        complete(id, d, &mut stage.presenter);
    }
}

fn deploy<P: Presenter>(id: EntityId, d: &mut Dropper, stage: &mut Stage<P>) {
    d.deployed = true;
    stage
        .presenter
        .apply_visual_state(Visual::new(id, Part::Chute), VisualState::Deployed, true);
    stage
        .presenter
        .apply_visual_state(Visual::body(id), VisualState::Swaying, true);
    stage.play(SoundCue::Deploy);
}

fn trigger_cut<P: Presenter>(id: EntityId, d: &mut Dropper, stage: &mut Stage<P>) {
    d.cut_triggered = true;
    release_chute(id, d, &mut stage.presenter);
    stage
        .presenter
        .apply_visual_state(Visual::body(id), VisualState::Swaying, false);
    stage.play(SoundCue::Cut);
    log::debug!("{} cut away", d.name);
}

fn release_chute<P: Presenter>(id: EntityId, d: &mut Dropper, presenter: &mut P) {
    if !d.chute.attached {
        return;
    }
    d.chute.attached = false;
    let chute = Visual::new(id, Part::Chute);
    if d.deployed {
        presenter.apply_visual_state(chute, VisualState::Deployed, false);
    }
    presenter.hide(chute);
}

fn land<P: Presenter>(id: EntityId, pos: Vec2, d: &mut Dropper, stage: &mut Stage<P>) -> Landing {
    d.landed = true;
    d.vel = Vec2::ZERO;
    release_chute(id, d, &mut stage.presenter);

    let body = Visual::body(id);
    stage
        .presenter
        .apply_visual_state(body, VisualState::Swaying, false);

    let hitbox = d.hitbox(pos);
    let on_target = match stage.target {
        Some(target) if hitbox.overlaps_x(&target.bounds) => {
            d.winner = true;
            d.drop_score = drop_score(&hitbox, &target.bounds);
            d.target = Some(target.id);
            true
        }
        _ => false,
    };

    if on_target {
        stage
            .presenter
            .apply_visual_state(body, VisualState::Winner, true);
        stage.play(SoundCue::Win);
        log::info!("{} landed on target, score {:.1}", d.name, d.drop_score);
    } else {
        stage
            .presenter
            .apply_visual_state(body, VisualState::Loser, true);
        stage.play(SoundCue::Lose);
        log::info!("{} missed the target", d.name);
    }

    stage.presenter.drop_resolved(&DropResolved {
        name: d.name.clone(),
        on_target,
        winner: on_target,
        voluntary: false,
        score: d.drop_score,
    });

    Landing {
        on_target,
        score: d.drop_score,
    }
}

/// Death clock for non-winners, then the fade-out
fn landed_update<P: Presenter>(
    id: EntityId,
    alive: &mut bool,
    d: &mut Dropper,
    delta: f32,
    stage: &mut Stage<P>,
) {
    if d.drop_complete {
        d.fade_clock += delta;
        if d.fade_clock >= stage.config.fade_ms {
            *alive = false;
        }
        return;
    }
    if d.winner {
        return;
    }

    d.death_clock += delta;
    if d.death_clock >= DEATH_CLOCK_MS {
        complete(id, d, &mut stage.presenter);
    }
}

fn complete<P: Presenter>(id: EntityId, d: &mut Dropper, presenter: &mut P) {
    d.drop_complete = true;
    d.fade_clock = 0.0;
    for part in [Part::Body, Part::Emote] {
        presenter.apply_visual_state(Visual::new(id, part), VisualState::Fading, true);
    }
}

fn reposition<P: Presenter>(id: EntityId, pos: Vec2, d: &Dropper, presenter: &mut P) {
    presenter.reposition(Visual::body(id), pos);
    if d.chute.attached {
        presenter.reposition(Visual::new(id, Part::Chute), pos + d.chute.offset);
    }
    presenter.reposition(Visual::new(id, Part::Emote), pos + d.emote.offset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use crate::config::ValueRange;
    use crate::presenter::{Call, Recorder};
    use crate::sim::stage::TargetInfo;
    use proptest::prelude::*;
    use std::sync::Arc;

    const FRAME_MS: f32 = 16.0;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.viewport.width = 1200.0;
        config.viewport.height = 800.0;
        config
    }

    /// Stage with a 200x60 target centered at x=600 on the floor
    fn stage(config: Config) -> Stage<Recorder> {
        let floor = config.viewport.height;
        let mut stage = Stage::new(config, 7, Recorder::default());
        stage.target = Some(TargetInfo {
            id: 1,
            bounds: Bounds::new(Vec2::new(500.0, floor - 60.0), Vec2::new(200.0, 60.0)),
        });
        stage
    }

    fn spawn(stage: &mut Stage<Recorder>, name: &str) -> Entity {
        let sheet = Arc::new(stage.config.sheets.dropper.clone());
        let mut entity = Entity::dropper(2, &stage.config, sheet);
        randomize(&mut entity, name, None, stage);
        entity
    }

    fn d(entity: &Entity) -> &Dropper {
        entity.as_dropper().unwrap()
    }

    fn run_until_landed(entity: &mut Entity, stage: &mut Stage<Recorder>) -> Landing {
        for _ in 0..20_000 {
            if let Some(landing) = update(entity, FRAME_MS, stage) {
                return landing;
            }
        }
        panic!("dropper never landed");
    }

    #[test]
    fn test_spawn_starts_above_viewport() {
        let mut stage = stage(test_config());
        let entity = spawn(&mut stage, "alice");
        let dropper = d(&entity);

        assert_eq!(entity.pos.y, -162.0);
        assert!(entity.pos.x >= 50.0 && entity.pos.x < 1200.0 - 120.0 - 50.0);
        assert!(dropper.vel.x.abs() >= 1.0 && dropper.vel.x.abs() < 3.0);
        assert!(dropper.vel.y >= 2.0 && dropper.vel.y < 4.0);
        assert!(dropper.cut_clock >= 750.0 && dropper.cut_clock < 1500.0);
        assert!(!dropper.landed && !dropper.deployed);
        assert_eq!(dropper.name, "alice");
    }

    #[test]
    fn test_deploys_on_entering_viewport() {
        let mut stage = stage(test_config());
        let mut entity = spawn(&mut stage, "a");
        entity.pos.y = -5.0;
        entity.as_dropper_mut().unwrap().vel = Vec2::new(0.0, 3.0);

        update(&mut entity, FRAME_MS, &mut stage);
        assert!(!d(&entity).deployed);
        update(&mut entity, FRAME_MS, &mut stage);
        assert!(d(&entity).deployed);
        assert!(stage.presenter.sounds().contains(&SoundCue::Deploy));
        assert!(
            stage
                .presenter
                .state_set(Visual::new(entity.id, Part::Chute), VisualState::Deployed)
        );
    }

    #[test]
    fn test_brakes_toward_floor_speed() {
        let mut stage = stage(test_config());
        let mut entity = spawn(&mut stage, "a");
        entity.pos.y = 0.0;
        {
            let dropper = entity.as_dropper_mut().unwrap();
            dropper.vel = Vec2::new(0.0, 4.0);
            dropper.brake_height = 0.0;
        }
        update(&mut entity, FRAME_MS, &mut stage);
        assert!((d(&entity).vel.y - 4.0 / 1.05).abs() < 1e-5);

        for _ in 0..200 {
            update(&mut entity, FRAME_MS, &mut stage);
        }
        let vy = d(&entity).vel.y;
        assert!(vy <= MIN_DESCENT_SPEED && vy > MIN_DESCENT_SPEED / BRAKE_DIVISOR);
    }

    #[test]
    fn test_bounces_off_side_walls() {
        let mut stage = stage(test_config());
        let mut entity = spawn(&mut stage, "a");
        // hitbox left edge at x + 32
        entity.pos = Vec2::new(-30.0, 100.0);
        entity.as_dropper_mut().unwrap().vel = Vec2::new(-3.0, 0.5);
        update(&mut entity, FRAME_MS, &mut stage);
        assert_eq!(d(&entity).vel.x, 3.0);
        // Overshoot is tolerated, not clamped
        assert_eq!(entity.pos.x, -33.0);
        update(&mut entity, FRAME_MS, &mut stage);
        assert_eq!(entity.pos.x, -30.0);

        // right wall: hitbox right edge at x + 88
        entity.pos = Vec2::new(1200.0 - 89.0, 100.0);
        entity.as_dropper_mut().unwrap().vel = Vec2::new(2.0, 0.5);
        update(&mut entity, FRAME_MS, &mut stage);
        assert_eq!(d(&entity).vel.x, -2.0);
    }

    #[test]
    fn test_center_landing_scores_100() {
        let mut stage = stage(test_config());
        let mut entity = spawn(&mut stage, "bullseye");
        // hitbox center = x + 32 + 28 = 600 = target center
        entity.pos = Vec2::new(540.0, -162.0);
        entity.as_dropper_mut().unwrap().vel = Vec2::new(0.0, 3.0);

        let landing = run_until_landed(&mut entity, &mut stage);
        let dropper = d(&entity);
        assert!(landing.on_target);
        assert_eq!(landing.score, 100.0);
        assert_eq!(dropper.drop_score, 100.0);
        assert!(dropper.winner && dropper.landed);
        assert_eq!(dropper.target, Some(1));
        assert_eq!(dropper.vel, Vec2::ZERO);

        // plane = 800 - 56 - 0.25 * 60; hitbox top = y + 106
        assert!(entity.pos.y + 106.0 >= 800.0 - 56.0 - 15.0);

        let resolved = stage.presenter.resolutions();
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].on_target && resolved[0].winner && !resolved[0].voluntary);
        assert!(stage.presenter.calls.contains(&Call::Hide(Visual::new(entity.id, Part::Chute))));
    }

    #[test]
    fn test_miss_is_loser_and_fades_out() {
        let mut stage = stage(test_config());
        let mut entity = spawn(&mut stage, "wide");
        entity.pos = Vec2::new(100.0, 600.0);
        entity.as_dropper_mut().unwrap().vel = Vec2::new(0.0, 3.0);

        let landing = run_until_landed(&mut entity, &mut stage);
        assert!(!landing.on_target);
        assert!(!d(&entity).winner);
        assert_eq!(d(&entity).drop_score, 0.0);
        assert!(stage.presenter.sounds().contains(&SoundCue::Lose));

        // 5000 ms of death clock
        for _ in 0..312 {
            update(&mut entity, FRAME_MS, &mut stage);
        }
        assert!(!d(&entity).drop_complete);
        update(&mut entity, FRAME_MS, &mut stage);
        assert!(d(&entity).drop_complete);
        assert!(entity.alive);

        // then the fade
        for _ in 0..63 {
            update(&mut entity, FRAME_MS, &mut stage);
        }
        assert!(!entity.alive);
    }

    #[test]
    fn test_winner_never_expires() {
        let mut stage = stage(test_config());
        let mut entity = spawn(&mut stage, "champ");
        entity.pos = Vec2::new(540.0, 600.0);
        entity.as_dropper_mut().unwrap().vel = Vec2::new(0.0, 3.0);
        run_until_landed(&mut entity, &mut stage);

        for _ in 0..1000 {
            update(&mut entity, FRAME_MS, &mut stage);
        }
        assert!(entity.alive);
        assert!(!d(&entity).drop_complete);
        assert_eq!(d(&entity).death_clock, 0.0);
    }

    #[test]
    fn test_cut_waits_for_delay() {
        let mut config = test_config();
        config.cut_delay_ms = Some(ValueRange::new(750.0, 1500.0));
        let mut stage = stage(config);
        let mut entity = spawn(&mut stage, "cutter");
        assert!(cut_chute(&mut entity, &mut stage));

        let mut elapsed = 0.0;
        while !d(&entity).cut_triggered {
            assert!(d(&entity).chute.attached);
            update(&mut entity, FRAME_MS, &mut stage);
            elapsed += FRAME_MS;
            assert!(elapsed <= 1500.0 + FRAME_MS, "cut never triggered");
        }
        assert!(elapsed >= 750.0);
        assert!(!d(&entity).chute.attached);
        assert!(stage.presenter.sounds().contains(&SoundCue::Cut));

        let before = d(&entity).vel.y;
        update(&mut entity, FRAME_MS, &mut stage);
        assert!(d(&entity).vel.y > before || d(&entity).vel.y == TERMINAL_VELOCITY);
    }

    #[test]
    fn test_instant_cut_without_delay() {
        let mut config = test_config();
        config.cut_delay_ms = None;
        let mut stage = stage(config);
        let mut entity = spawn(&mut stage, "now");
        assert!(cut_chute(&mut entity, &mut stage));
        assert!(d(&entity).cut_triggered && d(&entity).cut_requested);
    }

    #[test]
    fn test_cut_rejections() {
        let mut stage = stage(test_config());

        // past lockout (0.75 * 800 = 600)
        let mut low = spawn(&mut stage, "low");
        low.pos.y = 650.0;
        assert!(!cut_chute(&mut low, &mut stage));
        assert!(!d(&low).cut_requested);

        // twice
        let mut twice = spawn(&mut stage, "twice");
        assert!(cut_chute(&mut twice, &mut stage));
        stage.presenter.clear();
        assert!(!cut_chute(&mut twice, &mut stage));
        assert_eq!(stage.presenter.sounds(), vec![SoundCue::CutRejected]);

        // landed
        let mut down = spawn(&mut stage, "down");
        down.pos = Vec2::new(100.0, 600.0);
        down.as_dropper_mut().unwrap().vel = Vec2::new(0.0, 3.0);
        run_until_landed(&mut down, &mut stage);
        assert!(!cut_chute(&mut down, &mut stage));
    }

    #[test]
    fn test_cut_disabled_is_silent() {
        let mut config = test_config();
        config.cut_enabled = false;
        let mut stage = stage(config);
        let mut entity = spawn(&mut stage, "x");
        stage.presenter.clear();
        assert!(!cut_chute(&mut entity, &mut stage));
        assert!(stage.presenter.sounds().is_empty());
    }

    #[test]
    fn test_cut_before_viewport_never_deploys() {
        let mut config = test_config();
        config.cut_delay_ms = None;
        let mut stage = stage(config);
        let mut entity = spawn(&mut stage, "early");
        cut_chute(&mut entity, &mut stage);
        run_until_landed(&mut entity, &mut stage);
        assert!(!d(&entity).deployed);
    }

    #[test]
    fn test_demote_voluntary_completes() {
        let mut stage = stage(test_config());
        let mut entity = spawn(&mut stage, "quitter");
        entity.pos = Vec2::new(540.0, 600.0);
        entity.as_dropper_mut().unwrap().vel = Vec2::new(0.0, 3.0);
        run_until_landed(&mut entity, &mut stage);
        stage.presenter.clear();

        demote(&mut entity, true, &mut stage);
        let dropper = d(&entity);
        assert!(!dropper.winner && dropper.drop_complete && dropper.landed);
        let resolved = stage.presenter.resolutions();
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].voluntary && resolved[0].on_target && !resolved[0].winner);

        // second demotion is a no-op
        stage.presenter.clear();
        demote(&mut entity, false, &mut stage);
        assert!(stage.presenter.calls.is_empty());
    }

    #[test]
    fn test_randomize_clears_previous_run() {
        let mut stage = stage(test_config());
        let mut entity = spawn(&mut stage, "old");
        entity.pos = Vec2::new(540.0, 600.0);
        entity.as_dropper_mut().unwrap().vel = Vec2::new(0.0, 3.0);
        cut_chute(&mut entity, &mut stage);
        run_until_landed(&mut entity, &mut stage);
        entity.alive = false;

        randomize(&mut entity, "new", Some(3), &mut stage);
        let dropper = d(&entity);
        assert!(entity.alive);
        assert_eq!(dropper.name, "new");
        assert!(!dropper.winner && !dropper.landed && !dropper.drop_complete);
        assert!(!dropper.cut_requested && !dropper.cut_triggered && !dropper.deployed);
        assert_eq!(dropper.drop_score, 0.0);
        assert_eq!(dropper.death_clock, 0.0);
        assert!(dropper.chute.attached);
        assert_eq!(dropper.emote.frame, 3);
        assert_eq!(dropper.target, None);
    }

    #[test]
    fn test_spawn_sets_frames_from_sheets() {
        let mut stage = stage(test_config());
        let entity = spawn(&mut stage, "framed");
        let dropper = d(&entity);
        let frames: Vec<_> = stage
            .presenter
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::SetFrame(v, tag, frame, _) => Some((v.part, tag.as_str(), *frame)),
                _ => None,
            })
            .collect();
        assert_eq!(
            frames,
            vec![
                (Part::Body, "dropper", dropper.avatar_frame),
                (Part::Chute, "parachute", 0),
                (Part::Emote, "emote", dropper.emote.frame),
            ]
        );
    }

    #[test]
    fn test_out_of_range_emote_falls_back() {
        let mut stage = stage(test_config());
        let sheet = Arc::new(stage.config.sheets.dropper.clone());
        let mut entity = Entity::dropper(2, &stage.config, sheet);
        randomize(&mut entity, "e", Some(10_000), &mut stage);
        assert!(d(&entity).emote.frame < stage.config.sheets.emote.frame_count());
    }

    #[test]
    fn test_score_edges() {
        let target = Bounds::new(Vec2::new(500.0, 0.0), Vec2::new(200.0, 60.0));
        let centered = Bounds::new(Vec2::new(572.0, 0.0), Vec2::new(56.0, 56.0));
        assert_eq!(drop_score(&centered, &target), 100.0);

        // just overlapping on the right edge
        let edge = Bounds::new(Vec2::new(699.0, 0.0), Vec2::new(56.0, 56.0));
        let score = drop_score(&edge, &target);
        assert!(score > 0.0 && score < 1.0);
    }

    proptest! {
        #[test]
        fn score_decreases_with_distance(a in 0.0f32..127.0, b in 0.0f32..127.0) {
            let target = Bounds::new(Vec2::new(500.0, 0.0), Vec2::new(200.0, 60.0));
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let at = |offset: f32| Bounds::new(Vec2::new(572.0 + offset, 0.0), Vec2::new(56.0, 56.0));
            let near_score = drop_score(&at(near), &target);
            let far_score = drop_score(&at(far), &target);
            prop_assert!(near_score >= far_score);
            prop_assert!(far_score > 0.0 && near_score <= 100.0);
        }

        #[test]
        fn cut_fall_never_exceeds_terminal_velocity(start in 0.1f32..12.0, frames in 1usize..400) {
            let mut config = test_config();
            config.cut_delay_ms = None;
            let mut stage = stage(config);
            let mut entity = spawn(&mut stage, "faller");
            entity.pos.y = -10_000.0;
            entity.as_dropper_mut().unwrap().vel = Vec2::new(0.0, start);
            cut_chute(&mut entity, &mut stage);
            for _ in 0..frames {
                update(&mut entity, FRAME_MS, &mut stage);
                prop_assert!(d(&entity).vel.y <= TERMINAL_VELOCITY);
            }
        }
    }
}
