//! Presentation interface
//!
//! The simulation never touches the DOM, a canvas, or an audio device.
//! It describes what changed through a `Presenter`, and the host decides
//! how that looks and sounds.

use glam::Vec2;

use crate::audio::SoundRequest;
use crate::sim::EntityId;
use crate::sprite::SpriteSheetInfo;

/// Which piece of an entity a call refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    /// The entity itself (dropper avatar, target)
    Body,
    /// Parachute attached to a dropper
    Chute,
    /// Emote bubble attached to a dropper
    Emote,
}

/// Handle for one visible element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Visual {
    pub entity: EntityId,
    pub part: Part,
}

impl Visual {
    pub const fn new(entity: EntityId, part: Part) -> Self {
        Self { entity, part }
    }

    pub const fn body(entity: EntityId) -> Self {
        Self::new(entity, Part::Body)
    }
}

/// Named visual states toggled by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualState {
    /// Parachute open
    Deployed,
    /// Swinging under an open parachute
    Swaying,
    /// Landed on the target and currently winning
    Winner,
    /// Landed off the target, or displaced
    Loser,
    /// Knocked off the winning spot
    Ghosted,
    /// Fading out before despawn
    Fading,
}

impl VisualState {
    pub const ALL: [VisualState; 6] = [
        VisualState::Deployed,
        VisualState::Swaying,
        VisualState::Winner,
        VisualState::Loser,
        VisualState::Ghosted,
        VisualState::Fading,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisualState::Deployed => "deployed",
            VisualState::Swaying => "swaying",
            VisualState::Winner => "winner",
            VisualState::Loser => "loser",
            VisualState::Ghosted => "ghosted",
            VisualState::Fading => "fading",
        }
    }
}

/// Outcome notification for one dropper
#[derive(Debug, Clone, PartialEq)]
pub struct DropResolved {
    pub name: String,
    /// Landed overlapping the target
    pub on_target: bool,
    /// Currently holds the winning spot
    pub winner: bool,
    /// Gave up the winning spot by choice
    pub voluntary: bool,
    /// Frozen landing score (0 when off target)
    pub score: f32,
}

/// Side effects the simulation asks the host to perform
pub trait Presenter {
    fn display(&mut self, visual: Visual);
    fn hide(&mut self, visual: Visual);
    fn reposition(&mut self, visual: Visual, pos: Vec2);
    /// Show `frame` of `sheet`; the frame's top-left inside the sheet is `offset`
    fn set_frame(&mut self, visual: Visual, sheet: &SpriteSheetInfo, frame: u32, offset: Vec2);
    fn play_sound(&mut self, sound: &SoundRequest);
    /// Turn a named visual state on or off
    fn apply_visual_state(&mut self, visual: Visual, state: VisualState, on: bool);
    fn drop_resolved(&mut self, result: &DropResolved);
}

/// Presenter that only logs; used by the headless runner
#[derive(Debug, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn display(&mut self, visual: Visual) {
        log::trace!("display {:?}", visual);
    }

    fn hide(&mut self, visual: Visual) {
        log::trace!("hide {:?}", visual);
    }

    fn reposition(&mut self, _visual: Visual, _pos: Vec2) {}

    fn set_frame(&mut self, visual: Visual, sheet: &SpriteSheetInfo, frame: u32, _offset: Vec2) {
        log::trace!("frame {:?} -> {}[{}]", visual, sheet.tag(), frame);
    }

    fn play_sound(&mut self, sound: &SoundRequest) {
        log::debug!("sound {:?} ({}, vol {:.2})", sound.cue, sound.file, sound.volume);
    }

    fn apply_visual_state(&mut self, visual: Visual, state: VisualState, on: bool) {
        log::trace!("{:?} {} {}", visual, if on { "+" } else { "-" }, state.as_str());
    }

    fn drop_resolved(&mut self, result: &DropResolved) {
        log::info!(
            "{} resolved: on_target={} winner={} voluntary={} score={:.1}",
            result.name,
            result.on_target,
            result.winner,
            result.voluntary,
            result.score
        );
    }
}

/// One captured presenter call (tests)
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Display(Visual),
    Hide(Visual),
    Reposition(Visual, Vec2),
    /// Sheet tag, frame index, offset
    SetFrame(Visual, String, u32, Vec2),
    Sound(SoundRequest),
    State(Visual, VisualState, bool),
    Resolved(DropResolved),
}

/// Presenter that records every call for later inspection (tests)
#[cfg(test)]
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<Call>,
}

#[cfg(test)]
impl Recorder {
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn resolutions(&self) -> Vec<&DropResolved> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Resolved(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn sounds(&self) -> Vec<crate::audio::SoundCue> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Sound(s) => Some(s.cue),
                _ => None,
            })
            .collect()
    }

    /// Was `state` switched on for `visual`
    pub fn state_set(&self, visual: Visual, state: VisualState) -> bool {
        self.calls
            .iter()
            .any(|c| *c == Call::State(visual, state, true))
    }
}

#[cfg(test)]
impl Presenter for Recorder {
    fn display(&mut self, visual: Visual) {
        self.calls.push(Call::Display(visual));
    }

    fn hide(&mut self, visual: Visual) {
        self.calls.push(Call::Hide(visual));
    }

    fn reposition(&mut self, visual: Visual, pos: Vec2) {
        self.calls.push(Call::Reposition(visual, pos));
    }

    fn set_frame(&mut self, visual: Visual, sheet: &SpriteSheetInfo, frame: u32, offset: Vec2) {
        self.calls
            .push(Call::SetFrame(visual, sheet.tag().to_string(), frame, offset));
    }

    fn play_sound(&mut self, sound: &SoundRequest) {
        self.calls.push(Call::Sound(sound.clone()));
    }

    fn apply_visual_state(&mut self, visual: Visual, state: VisualState, on: bool) {
        self.calls.push(Call::State(visual, state, on));
    }

    fn drop_resolved(&mut self, result: &DropResolved) {
        self.calls.push(Call::Resolved(result.clone()));
    }
}
