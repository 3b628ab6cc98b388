pub mod config;
pub mod ids;
pub mod land;
pub mod season;
pub mod task;
pub mod user;
pub mod world;

pub use config::{GlobalConfig, QuackRank};
pub use ids::{LandId, UserId};
pub use land::{Army, ArmyKind, Land, Unit};
pub use season::{Season, SeasonSpan, season_on_day};
pub use task::{Task, TaskKind};
pub use user::User;
pub use world::World;
