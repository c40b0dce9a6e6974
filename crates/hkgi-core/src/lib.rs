//! hkgi Core - Stead Simulation Engine
//!
//! Owns every user's stead and drives them with a fixed-period tick. Player
//! actions (signup, using items, crafting, gifting) run against the same
//! store from any thread.
//!
//! # Architecture
//!
//! - **Store**: username → `Arc<Mutex<Stead>>`, behind a `RwLock`
//! - **Tick**: expires effects, grows plants, pays out yields, prunes activity
//! - **Actions**: validate-then-apply under the stead's lock
//! - **Persistence**: bincode snapshots of every stead
//!
//! # Example
//!
//! ```rust,no_run
//! use hkgi_core::prelude::*;
//!
//! let manifest = Manifest::bundled().unwrap();
//! let engine = Engine::new(EngineConfig::default(), manifest).unwrap();
//! engine.signup("orpheus").unwrap();
//!
//! let mut rng = rand::thread_rng();
//! engine.craft("orpheus", 0, 0, &mut rng).unwrap(); // plant a bractus
//! loop {
//!     engine.tick(&mut rng); // every 500 ms
//! }
//! ```

pub mod actions;
pub mod activity;
pub mod engine;
pub mod persistence;
pub mod snapshot;
pub mod tick;

/// Errors returned by engine operations
pub use hkgi_logic::GameError as EngineError;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::activity::{ActivityEntry, ActivityKind};
    pub use crate::engine::{Engine, SteadHandle};
    pub use crate::persistence::{SaveData, SaveError};
    pub use crate::snapshot::{PlantView, SteadView};
    pub use crate::tick::TickReport;
    pub use crate::EngineError;
    pub use hkgi_logic::config::EngineConfig;
    pub use hkgi_logic::kinds::{Family, ItemKind, PlantKind, Tier};
    pub use hkgi_logic::manifest::Manifest;
    pub use hkgi_logic::recipes::{CraftOutcome, UseOutcome};
}
