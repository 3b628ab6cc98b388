use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::GlobalConfig;
use super::ids::{LandId, UserId};
use super::land::Land;
use super::user::User;

/// The whole mutable world: every player, every land, and the global config
/// (which carries the task queue). Catalogs are deliberately not part of the
/// world — they are read-only content loaded alongside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub users: BTreeMap<UserId, User>,
    pub lands: BTreeMap<LandId, Land>,
    pub config: GlobalConfig,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.get_mut(&id)
    }

    pub fn land(&self, id: LandId) -> Option<&Land> {
        self.lands.get(&id)
    }

    pub fn land_mut(&mut self, id: LandId) -> Option<&mut Land> {
        self.lands.get_mut(&id)
    }

    /// Register a new land under its owner, keeping the two-way ownership
    /// records in step.
    ///
    /// # Panics
    /// Panics if the owner does not exist or the id is already taken.
    pub fn insert_land(&mut self, id: LandId, land: Land) {
        assert!(
            !self.lands.contains_key(&id),
            "insert_land: land {id} already exists"
        );
        let owner = self
            .users
            .get_mut(&land.owner_id)
            .unwrap_or_else(|| panic!("insert_land: owner {} not found", land.owner_id));
        owner.land_ids.insert(id);
        self.lands.insert(id, land);
    }

    /// Move a land to a new owner, updating both user records and the land.
    ///
    /// # Panics
    /// Panics if the land or the new owner does not exist.
    pub fn transfer_land(&mut self, land_id: LandId, new_owner: UserId) {
        let old_owner = self
            .lands
            .get(&land_id)
            .unwrap_or_else(|| panic!("transfer_land: land {land_id} not found"))
            .owner_id;
        assert!(
            self.users.contains_key(&new_owner),
            "transfer_land: new owner {new_owner} not found"
        );
        if let Some(user) = self.users.get_mut(&old_owner) {
            user.land_ids.remove(&land_id);
        }
        self.users
            .get_mut(&new_owner)
            .expect("checked above")
            .land_ids
            .insert(land_id);
        self.lands
            .get_mut(&land_id)
            .expect("checked above")
            .owner_id = new_owner;
    }

    /// True when every land's owner lists it and every listed land points
    /// back. Tests pin this invariant after every tick.
    pub fn ownership_consistent(&self) -> bool {
        let forward = self.lands.iter().all(|(id, land)| {
            self.users
                .get(&land.owner_id)
                .is_some_and(|u| u.land_ids.contains(id))
        });
        let backward = self.users.iter().all(|(user_id, user)| {
            user.land_ids
                .iter()
                .all(|id| self.lands.get(id).is_some_and(|l| l.owner_id == *user_id))
        });
        forward && backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_two_users() -> World {
        let mut world = World::new();
        world.users.insert(1, User::default());
        world.users.insert(2, User::default());
        world.insert_land(10, Land::new("Pondholm", 1, "duck"));
        world
    }

    #[test]
    fn insert_land_records_ownership_both_ways() {
        let world = world_with_two_users();
        assert!(world.user(1).unwrap().land_ids.contains(&10));
        assert_eq!(world.land(10).unwrap().owner_id, 1);
        assert!(world.ownership_consistent());
    }

    #[test]
    fn transfer_land_updates_both_user_records() {
        let mut world = world_with_two_users();
        world.transfer_land(10, 2);
        assert!(!world.user(1).unwrap().land_ids.contains(&10));
        assert!(world.user(2).unwrap().land_ids.contains(&10));
        assert_eq!(world.land(10).unwrap().owner_id, 2);
        assert!(world.ownership_consistent());
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn insert_land_rejects_duplicate_ids() {
        let mut world = world_with_two_users();
        world.insert_land(10, Land::new("Again", 2, "duck"));
    }
}
