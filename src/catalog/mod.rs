//! Read-only content catalogs and their overlay resolver.
//!
//! Catalog files are sparse: a named troop inherits everything its
//! `default_tier{n}` template defines except the fields it overrides, a
//! building inherits from the `default` building, and a species overlays the
//! `default` species attribute-by-attribute per season table. Resolution is
//! a pure merge — looking an entry up never mutates the stored templates.

pub mod building;
pub mod species;
pub mod troop;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use building::{Building, BuildingSpec};
pub use species::{SeasonTable, Species, SpeciesSpec};
pub use troop::{Troop, TroopSpec};

/// Catalog entry names reserved for templates rather than real content.
pub fn is_template(name: &str) -> bool {
    name == "default" || name.starts_with("default_tier")
}

/// Every content catalog the engine consults, loaded together from the
/// world store and never written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalogs {
    pub troops: BTreeMap<String, TroopSpec>,
    pub buildings: BTreeMap<String, BuildingSpec>,
    pub species: BTreeMap<String, SpeciesSpec>,
}

impl Catalogs {
    /// Resolve a troop by name. `None` when the name is absent — an
    /// unknown name is a caller-visible miss, never a crash.
    pub fn troop(&self, name: &str) -> Option<Troop> {
        let spec = self.troops.get(name)?;
        let base = self.troops.get(&format!("default_tier{}", spec.tier));
        Some(troop::resolve(base, spec))
    }

    pub fn building(&self, name: &str) -> Option<Building> {
        let spec = self.buildings.get(name)?;
        Some(building::resolve(self.buildings.get("default"), spec))
    }

    pub fn species(&self, name: &str) -> Option<Species> {
        let spec = self.species.get(name)?;
        Some(species::resolve(self.species.get("default"), spec))
    }

    /// The species a troop fights as, when both lookups land.
    pub fn troop_species(&self, troop_name: &str) -> Option<Species> {
        let troop = self.troop(troop_name)?;
        self.species(&troop.species)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn troop_inherits_its_tier_template() {
        let mut catalogs = Catalogs::default();
        catalogs.troops.insert(
            "default_tier2".to_string(),
            TroopSpec {
                tier: 2,
                atk: Some(2),
                ap: Some(1),
                hp: Some(5),
                cost: Some(20),
                upkeep: Some(2),
                ..TroopSpec::default()
            },
        );
        catalogs.troops.insert(
            "Spearman".to_string(),
            TroopSpec {
                tier: 2,
                ap: Some(3),
                ..TroopSpec::default()
            },
        );

        let spearman = catalogs.troop("Spearman").unwrap();
        assert_eq!(spearman.ap, 3);
        assert_eq!(spearman.atk, 2);
        assert_eq!(spearman.cost, 20);
    }

    #[test]
    fn unknown_names_are_misses_not_errors() {
        let catalogs = Catalogs::default();
        assert!(catalogs.troop("Wyvern").is_none());
        assert!(catalogs.building("Ziggurat").is_none());
        assert!(catalogs.species("kraken").is_none());
    }

    #[test]
    fn template_names_are_recognized() {
        assert!(is_template("default"));
        assert!(is_template("default_tier3"));
        assert!(!is_template("Spearman"));
    }
}
