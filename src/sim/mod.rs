//! The turn engine: seven strictly ordered command phases wrapped around an
//! economic update, executed once per game-day against a whole-world
//! snapshot.

mod battle;
mod conquest;
mod context;
mod economy;
mod encirclement;
mod legality;
mod phases;
mod queue;
mod runner;

pub use battle::{BattleReport, Coalition, Company, CompanyState, RoundReport, resolve_battle};
pub use context::TickContext;
pub use encirclement::is_surrounded;
pub use legality::{
    MobilityGate, allied_vassals, can_move_to, check_hostile_target, check_season_mobility,
};
pub use queue::Outcome;
pub use runner::run_tick;
