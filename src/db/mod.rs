//! Postgres archival export.
//!
//! Day-to-day persistence is the world store; this module bulk-loads a
//! snapshot into Postgres for offline analysis (leaderboards, war history,
//! economy dashboards) using COPY FROM STDIN.

mod load;
mod migrate;

pub use load::load_world;
pub use migrate::migrate;
