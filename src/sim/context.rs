use rand::RngCore;

use crate::catalog::Catalogs;
use crate::model::{Season, UserId, World};
use crate::notify::Notice;

/// Context threaded through every phase of a tick.
///
/// Bundled so phases gain fields without signature churn. Notices are
/// buffered here and delivered by the engine only after the snapshot
/// commits.
pub struct TickContext<'a> {
    pub world: &'a mut World,
    pub catalogs: &'a Catalogs,
    pub rng: &'a mut dyn RngCore,
    pub notices: &'a mut Vec<Notice>,
}

impl TickContext<'_> {
    pub fn season(&self) -> Season {
        self.world.config.current_season
    }

    /// Queue a DM-style notice for delivery after the tick commits.
    pub fn notify(&mut self, user_id: UserId, text: impl Into<String>) {
        self.notices.push(Notice {
            user_id,
            text: text.into(),
        });
    }
}
