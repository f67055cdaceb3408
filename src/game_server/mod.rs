//! Game Server Module
//!
//! Race session core: roster generation, round timing and the race
//! lifecycle state machine, plus the async command surface a UI drives.

pub mod color;
pub mod error;
pub mod horse;
pub mod race;
pub mod session;
pub mod simulation;

pub use error::RaceError;
pub use horse::{Horse, RaceEntry};
pub use race::{RaceResult, RaceRound, RaceSnapshot};
pub use session::RaceSession;
pub use simulation::{RaceStatus, RaceStore, RoundInfo, SessionConfig, SessionSnapshot};
