//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Explicit delta-time only, no wall clock
//! - Seeded RNG only
//! - No rendering, audio or storage dependencies

pub mod anim;
pub mod bonus;
pub mod layout;
pub mod mechanics;
pub mod name_entry;
pub mod state;
pub mod symbol;
pub mod tick;
pub mod timer;

pub use anim::{AnimEvent, AnimationSequencer, CenterVisual, CommitIntent, SwapTarget};
pub use bonus::{BonusCharge, BonusPhase, BonusStage, BonusTransition};
pub use layout::{MatchMode, RingAssignment, RingLayout, SlotRole};
pub use mechanics::{MechanicBanner, MechanicScheduler, MechanicType, MemoryVeil, RemapPair};
pub use name_entry::{NameEntry, NameEntryOutcome};
pub use state::{GameEvent, GamePhase, GameState, Puzzle, SessionResult};
pub use symbol::{Rgb, Shape, Symbol};
pub use tick::{Direction, InputAction, InputOutcome, TickOutcome, handle_input, resolve, tick};
pub use timer::{PauseGuard, PauseLayers, TimerEconomy};
