//! The public face of the simulation: command submission, the daily tick,
//! and the interactive verbs that bypass the queue.
//!
//! The engine owns the store and the notifier. Every mutating entry point
//! takes `&mut self`, so exclusive access to the world is the type system's
//! guarantee — callers sharing an engine across threads bring their own
//! lock. A tick mutates a loaded snapshot in memory and commits the whole
//! of it at the end; a store failure before that point leaves the previous
//! day untouched and the tick is simply retried on the next schedule.

mod actions;
mod admission;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::model::{LandId, Task, TaskKind, UserId, World};
use crate::notify::{Notice, Notifier};
use crate::store::{StoreError, WorldStore};

pub use admission::CommandRequest;

const NEW_DAY_BROADCAST: &str =
    "A new day has arrived and the ducks feel refreshed from their slumber.";

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The command was refused; the text is the player-facing explanation.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommandError {
    fn rejected(text: impl Into<String>) -> Self {
        CommandError::Rejected(text.into())
    }
}

pub struct Engine<S, N> {
    store: S,
    notifier: N,
    rng: SmallRng,
}

impl<S: WorldStore, N: Notifier> Engine<S, N> {
    pub fn new(store: S, notifier: N, seed: u64) -> Self {
        Self {
            store,
            notifier,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load_world(&self) -> Result<World, StoreError> {
        Ok(World {
            users: self.store.load_users()?,
            lands: self.store.load_lands()?,
            config: self.store.load_global_config()?,
        })
    }

    fn commit(&self, world: &World) -> Result<(), StoreError> {
        self.store.save_users(&world.users)?;
        self.store.save_lands(&world.lands)?;
        self.store.save_global_config(&world.config)
    }

    /// Resolve one game-day and commit the result. Notices are delivered
    /// only after the snapshot is safely saved; the closing broadcast is
    /// best-effort by the notifier's contract.
    pub fn run_tick(&mut self) -> Result<Vec<Notice>, StoreError> {
        let catalogs = self.store.load_catalogs()?;
        let mut world = self.load_world()?;
        let notices = crate::sim::run_tick(&mut world, &catalogs, &mut self.rng);
        if let Err(err) = self.commit(&world) {
            tracing::warn!(error = %err, "tick commit failed; world rolled back to yesterday");
            return Err(err);
        }
        for notice in &notices {
            self.notifier.notify(notice.user_id, &notice.text);
        }
        self.notifier.broadcast(NEW_DAY_BROADCAST);
        Ok(notices)
    }

    /// Validate a command against the current snapshot and queue it for the
    /// next tick. Returns the acknowledgement text shown to the actor.
    pub fn submit_command(&mut self, request: CommandRequest) -> Result<String, CommandError> {
        let catalogs = self.store.load_catalogs()?;
        let mut world = self.load_world()?;
        let (task, ack) = admission::validate(&world, &catalogs, &request)
            .map_err(CommandError::Rejected)?;
        world.config.task_queue.push(task);
        self.store.save_global_config(&world.config)?;
        Ok(ack)
    }

    /// The pending queue, read-only, for display.
    pub fn peek_queue(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.store.load_global_config()?.task_queue)
    }

    /// Top quackers, strongest first.
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<(UserId, u64)>, StoreError> {
        let users = self.store.load_users()?;
        let mut entries: Vec<(UserId, u64)> =
            users.iter().map(|(id, u)| (*id, u.quacks)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(limit);
        Ok(entries)
    }
}

/// Convenience constructor for queue submissions.
pub fn command(
    kind: TaskKind,
    actor_id: UserId,
    item: impl Into<String>,
    location_id: LandId,
) -> CommandRequest {
    CommandRequest {
        kind,
        actor_id,
        item: item.into(),
        location_id,
        target_land_id: None,
        amount: 1,
    }
}
