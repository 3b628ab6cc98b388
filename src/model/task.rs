use serde::{Deserialize, Serialize};

use super::ids::{LandId, UserId};

/// The command verbs a player can queue for the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Build,
    Hire,
    Upgrade,
    Move,
    Attack,
    Defend,
    Siege,
    SallyOut,
}

impl TaskKind {
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Build => "build",
            TaskKind::Hire => "hire",
            TaskKind::Upgrade => "upgrade",
            TaskKind::Move => "move",
            TaskKind::Attack => "attack",
            TaskKind::Defend => "defend",
            TaskKind::Siege => "siege",
            TaskKind::SallyOut => "sallyout",
        }
    }
}

/// One queued command.
///
/// Everything except `build` resolves (or fails) within a single tick;
/// `build` tasks stay queued while `time_remaining` counts down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub user_id: UserId,
    #[serde(rename = "task")]
    pub kind: TaskKind,
    /// Troop or building name this command acts on.
    pub item: String,
    /// Land the command originates from (or builds/hires at).
    pub location_id: LandId,
    pub amount: u32,
    #[serde(rename = "time")]
    pub time_remaining: u32,
    pub target_land_id: Option<LandId>,
}

impl Task {
    pub fn new(user_id: UserId, kind: TaskKind, item: impl Into<String>, location_id: LandId) -> Self {
        Self {
            user_id,
            kind,
            item: item.into(),
            location_id,
            amount: 1,
            time_remaining: 1,
            target_land_id: None,
        }
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_target(mut self, target_land_id: LandId) -> Self {
        self.target_land_id = Some(target_land_id);
        self
    }

    pub fn with_time(mut self, time_remaining: u32) -> Self {
        self.time_remaining = time_remaining;
        self
    }
}
