//! quackdom — a turn-based duck-kingdom simulation engine.
//!
//! Players queue commands (build, hire, upgrade, move, attack, defend,
//! siege, sally-out) against a shared world of lands, armies and economies.
//! Once per game-day [`Engine::run_tick`] resolves the queue through seven
//! strictly ordered phases, advances the economy, and produces the day's
//! notifications. The engine is deterministic given its rng seed; all
//! randomness flows through a single seeded generator.

pub mod catalog;
pub mod db;
pub mod engine;
pub mod model;
pub mod notify;
pub mod sim;
pub mod store;
pub mod testutil;

pub use engine::{CommandError, CommandRequest, Engine, command};
pub use model::{
    GlobalConfig, Land, LandId, Season, Task, TaskKind, Unit, User, UserId, World,
};
pub use notify::{BufferNotifier, Notice, Notifier, NullNotifier};
pub use store::{JsonStore, MemStore, StoreError, WorldStore};
