use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{LandMap, StoreError, UserMap, WorldStore};
use crate::catalog::Catalogs;
use crate::model::GlobalConfig;

const USERS_FILE: &str = "users.json";
const LANDS_FILE: &str = "lands.json";
const GLOBAL_FILE: &str = "global.json";
const TROOPS_FILE: &str = "troops.json";
const BUILDINGS_FILE: &str = "buildings.json";
const SPECIES_FILE: &str = "species.json";

/// A directory of JSON documents, one per collection.
///
/// Writes go through a sibling temp file and an atomic rename, so a reader
/// never observes a half-written document.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned + Default>(
        &self,
        file: &str,
        document: &'static str,
    ) -> Result<T, StoreError> {
        let path = self.dir.join(file);
        if !path.exists() {
            // A collection that was never written is an empty collection.
            return Ok(T::default());
        }
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader).map_err(|source| StoreError::Malformed { document, source })
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!("{file}.tmp"));
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, value)
                .map_err(|source| StoreError::Malformed {
                    document: "outgoing",
                    source,
                })?;
            writer.flush()?;
        }
        fs::rename(&tmp, self.dir.join(file))?;
        Ok(())
    }
}

impl WorldStore for JsonStore {
    fn load_users(&self) -> Result<UserMap, StoreError> {
        self.read(USERS_FILE, "users")
    }

    fn load_lands(&self) -> Result<LandMap, StoreError> {
        self.read(LANDS_FILE, "lands")
    }

    fn load_catalogs(&self) -> Result<Catalogs, StoreError> {
        Ok(Catalogs {
            troops: self.read(TROOPS_FILE, "troops")?,
            buildings: self.read(BUILDINGS_FILE, "buildings")?,
            species: self.read(SPECIES_FILE, "species")?,
        })
    }

    fn load_global_config(&self) -> Result<GlobalConfig, StoreError> {
        self.read(GLOBAL_FILE, "global config")
    }

    fn save_users(&self, users: &UserMap) -> Result<(), StoreError> {
        self.write(USERS_FILE, users)
    }

    fn save_lands(&self, lands: &LandMap) -> Result<(), StoreError> {
        self.write(LANDS_FILE, lands)
    }

    fn save_global_config(&self, config: &GlobalConfig) -> Result<(), StoreError> {
        self.write(GLOBAL_FILE, config)
    }
}
