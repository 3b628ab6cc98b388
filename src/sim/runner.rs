use rand::RngCore;

use crate::catalog::Catalogs;
use crate::model::World;
use crate::notify::Notice;

use super::battle;
use super::context::TickContext;
use super::economy;
use super::phases;
use super::queue;

/// Resolve one full game-day against an in-memory world snapshot.
///
/// Sequencing is fixed: the economy runs first so the day's income can pay
/// for queued work, then the seven command phases drain the queue in strict
/// order, stale tasks are swept, and the calendar advances. Everything is
/// deterministic given the rng; the returned notices are the day's entire
/// outbound mail, to be delivered only once the snapshot commits.
pub fn run_tick(world: &mut World, catalogs: &Catalogs, rng: &mut dyn RngCore) -> Vec<Notice> {
    let day = world.config.day_counter;
    let queued = world.config.task_queue.len();
    tracing::info!(day, queued, "tick started");

    let mut notices = Vec::new();
    let mut ctx = TickContext {
        world,
        catalogs,
        rng,
        notices: &mut notices,
    };

    economy::run_economy(&mut ctx);

    phases::run_siege_phase(&mut ctx);
    battle::run_assault_phase(&mut ctx);
    battle::run_sallyout_phase(&mut ctx);
    phases::run_move_phase(&mut ctx);
    phases::run_upgrade_phase(&mut ctx);
    phases::run_hire_phase(&mut ctx);
    phases::run_build_phase(&mut ctx);
    queue::discard_stale(&mut ctx);

    economy::advance_calendar(&mut ctx);

    tracing::info!(
        day = world.config.day_counter,
        season = %world.config.current_season,
        notices = notices.len(),
        "tick finished"
    );
    notices
}
