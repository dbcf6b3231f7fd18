//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied dt, clamped
//! - Seeded RNG only, owned by the state
//! - No rendering or platform dependencies

pub mod attraction;
pub mod collision;
pub mod input;
pub mod integrate;
pub mod maze;
pub mod merge;
pub mod phase;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod wormhole;

pub use collision::{CollisionResult, reflect_velocity};
pub use maze::{MazeGeometry, WallSegment};
pub use snapshot::{HudView, Snapshot};
pub use state::{
    Body, BodyKind, GameEvent, GameOver, GameOverStage, GameState, Intermission,
    IntermissionStage, Phase, Ship,
};
pub use tick::tick;
