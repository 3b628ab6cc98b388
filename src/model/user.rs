use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ids::{LandId, UserId};

/// One player record.
///
/// The liege/vassal pointers form a forest: `accept_vassal` refuses any oath
/// that would close a cycle, so walking `liege_id` upward always terminates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub quacks: u64,
    #[serde(rename = "quackStreak")]
    pub quack_streak: u32,
    #[serde(rename = "quackedToday")]
    pub quacked_today: bool,
    #[serde(rename = "quackRank")]
    pub quack_rank: String,
    #[serde(rename = "spentQuacks")]
    pub spent_quacks: u64,
    pub quackerinos: i64,
    pub species: String,

    pub liege_id: Option<UserId>,
    pub ally_ids: BTreeSet<UserId>,
    #[serde(rename = "vassalWaitlistIds")]
    pub vassal_waitlist_ids: BTreeSet<UserId>,
    #[serde(rename = "taxPerVassalLand")]
    pub tax_per_vassal_land: i64,

    pub homeland_id: Option<LandId>,
    pub land_ids: BTreeSet<LandId>,

    /// Remaining days of post-homeland attack/siege immunity.
    #[serde(rename = "safetyCount")]
    pub safety_count: u32,
    /// Support banked by other players today; pays out at the next tick.
    pub support: u32,
    /// Whom this player is supporting today, if anyone.
    #[serde(rename = "supporteeId")]
    pub supportee_id: Option<UserId>,
}

impl User {
    /// A brand-new player record as created by their first quack.
    pub fn first_quack() -> Self {
        Self {
            quacks: 1,
            quack_streak: 1,
            quacked_today: true,
            ..Self::default()
        }
    }

    /// Quacks still available to spend on the exchange.
    pub fn unspent_quacks(&self) -> u64 {
        self.quacks.saturating_sub(self.spent_quacks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_quack_starts_the_streak() {
        let user = User::first_quack();
        assert_eq!(user.quacks, 1);
        assert_eq!(user.quack_streak, 1);
        assert!(user.quacked_today);
        assert_eq!(user.quackerinos, 0);
        assert!(user.land_ids.is_empty());
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        // Old records predate several fields; they must still load.
        let user: User = serde_json::from_str(r#"{"quacks": 12}"#).unwrap();
        assert_eq!(user.quacks, 12);
        assert_eq!(user.safety_count, 0);
        assert_eq!(user.liege_id, None);
        assert_eq!(user.unspent_quacks(), 12);
    }
}
