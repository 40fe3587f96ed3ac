//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module renders, plays
//! audio, or reads the clock:
//! - Time comes in as frame deltas (ms)
//! - Randomness comes from the seeded `RandomSource`
//! - Side effects go out through the `Presenter`

pub mod clock;
pub mod dropper;
pub mod engine;
pub mod entity;
pub mod pool;
pub mod stage;
pub mod target;

pub use clock::FrameClock;
pub use dropper::{Attachment, Dropper, Landing, drop_score};
pub use engine::Engine;
pub use entity::{Bounds, Entity, EntityId, EntityKind};
pub use pool::EntityPool;
pub use stage::{Stage, TargetInfo};
pub use target::{Entrant, Target};
