//! Whole-world persistence boundary.
//!
//! The store deals only in complete collections: load everything, save
//! everything. Catalogs are load-only content. The tick holds its mutated
//! snapshot in memory and saves at the very end, so a failure mid-tick
//! leaves the previously committed day untouched.

mod json;
mod mem;

use std::collections::BTreeMap;

use crate::catalog::Catalogs;
use crate::model::{GlobalConfig, Land, LandId, User, UserId};

pub use json::JsonStore;
pub use mem::MemStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("world store i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed {document} document: {source}")]
    Malformed {
        document: &'static str,
        source: serde_json::Error,
    },
}

pub type UserMap = BTreeMap<UserId, User>;
pub type LandMap = BTreeMap<LandId, Land>;

/// Typed access to the persisted world, keyed collections in, keyed
/// collections out. There is intentionally no `save_catalogs`.
pub trait WorldStore {
    fn load_users(&self) -> Result<UserMap, StoreError>;
    fn load_lands(&self) -> Result<LandMap, StoreError>;
    fn load_catalogs(&self) -> Result<Catalogs, StoreError>;
    fn load_global_config(&self) -> Result<GlobalConfig, StoreError>;

    fn save_users(&self, users: &UserMap) -> Result<(), StoreError>;
    fn save_lands(&self, lands: &LandMap) -> Result<(), StoreError>;
    fn save_global_config(&self, config: &GlobalConfig) -> Result<(), StoreError>;
}
