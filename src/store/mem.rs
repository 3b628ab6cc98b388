use std::sync::Mutex;

use super::{LandMap, StoreError, UserMap, WorldStore};
use crate::catalog::Catalogs;
use crate::model::{GlobalConfig, World};

/// An in-memory store for tests and ephemeral worlds.
#[derive(Debug, Default)]
pub struct MemStore {
    users: Mutex<UserMap>,
    lands: Mutex<LandMap>,
    config: Mutex<GlobalConfig>,
    catalogs: Catalogs,
}

impl MemStore {
    pub fn new(world: World, catalogs: Catalogs) -> Self {
        Self {
            users: Mutex::new(world.users),
            lands: Mutex::new(world.lands),
            config: Mutex::new(world.config),
            catalogs,
        }
    }

    /// A copy of the currently committed world, for assertions.
    pub fn snapshot(&self) -> World {
        World {
            users: self.users.lock().expect("store lock").clone(),
            lands: self.lands.lock().expect("store lock").clone(),
            config: self.config.lock().expect("store lock").clone(),
        }
    }
}

impl WorldStore for MemStore {
    fn load_users(&self) -> Result<UserMap, StoreError> {
        Ok(self.users.lock().expect("store lock").clone())
    }

    fn load_lands(&self) -> Result<LandMap, StoreError> {
        Ok(self.lands.lock().expect("store lock").clone())
    }

    fn load_catalogs(&self) -> Result<Catalogs, StoreError> {
        Ok(self.catalogs.clone())
    }

    fn load_global_config(&self) -> Result<GlobalConfig, StoreError> {
        Ok(self.config.lock().expect("store lock").clone())
    }

    fn save_users(&self, users: &UserMap) -> Result<(), StoreError> {
        *self.users.lock().expect("store lock") = users.clone();
        Ok(())
    }

    fn save_lands(&self, lands: &LandMap) -> Result<(), StoreError> {
        *self.lands.lock().expect("store lock") = lands.clone();
        Ok(())
    }

    fn save_global_config(&self, config: &GlobalConfig) -> Result<(), StoreError> {
        *self.config.lock().expect("store lock") = config.clone();
        Ok(())
    }
}
