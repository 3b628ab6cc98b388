use crate::model::{Task, TaskKind};

use super::context::TickContext;

/// What a phase decided about one task it examined.
pub enum Outcome {
    /// The task ran (or was silently absorbed); it leaves the queue.
    Consumed,
    /// The task failed a check; it leaves the queue and the actor is told
    /// why.
    Rejected(String),
    /// Not this phase's business (or a build still counting down); the task
    /// is kept, in its original position relative to other deferred tasks.
    Deferred(Task),
}

/// Run one phase over the whole queue: every task is classified exactly
/// once and the queue is rebuilt from the deferred set, preserving
/// insertion order. Phases never index into the live queue.
pub fn drain(ctx: &mut TickContext, mut classify: impl FnMut(&mut TickContext, Task) -> Outcome) {
    let tasks = std::mem::take(&mut ctx.world.config.task_queue);
    let mut deferred = Vec::with_capacity(tasks.len());
    for task in tasks {
        let actor = task.user_id;
        match classify(ctx, task) {
            Outcome::Consumed => {}
            Outcome::Rejected(reason) => ctx.notify(actor, reason),
            Outcome::Deferred(task) => deferred.push(task),
        }
    }
    ctx.world.config.task_queue = deferred;
}

/// End-of-tick sweep: everything still queued except in-progress builds is
/// stale and silently dropped.
pub fn discard_stale(ctx: &mut TickContext) {
    ctx.world
        .config
        .task_queue
        .retain(|task| task.kind == TaskKind::Build);
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::catalog::Catalogs;
    use crate::model::{TaskKind, World};

    fn queue_of(kinds: &[TaskKind]) -> World {
        let mut world = World::new();
        for (i, kind) in kinds.iter().enumerate() {
            world
                .config
                .task_queue
                .push(Task::new(i as u64, *kind, "Footman", 1));
        }
        world
    }

    #[test]
    fn drain_keeps_deferred_order_and_notifies_rejections() {
        let mut world = queue_of(&[TaskKind::Siege, TaskKind::Move, TaskKind::Siege, TaskKind::Hire]);
        let catalogs = Catalogs::default();
        let mut rng = SmallRng::seed_from_u64(0);
        let mut notices = Vec::new();
        let mut ctx = TickContext {
            world: &mut world,
            catalogs: &catalogs,
            rng: &mut rng,
            notices: &mut notices,
        };

        drain(&mut ctx, |_, task| match task.kind {
            TaskKind::Siege => Outcome::Consumed,
            TaskKind::Move => Outcome::Rejected("no".to_string()),
            _ => Outcome::Deferred(task),
        });

        let kinds: Vec<_> = world.config.task_queue.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TaskKind::Hire]);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].user_id, 1);
    }

    #[test]
    fn stale_sweep_spares_only_builds() {
        let mut world = queue_of(&[TaskKind::Defend, TaskKind::Build, TaskKind::Attack]);
        let catalogs = Catalogs::default();
        let mut rng = SmallRng::seed_from_u64(0);
        let mut notices = Vec::new();
        let mut ctx = TickContext {
            world: &mut world,
            catalogs: &catalogs,
            rng: &mut rng,
            notices: &mut notices,
        };
        discard_stale(&mut ctx);
        assert_eq!(world.config.task_queue.len(), 1);
        assert_eq!(world.config.task_queue[0].kind, TaskKind::Build);
    }
}
