//! Shared builders and tick helpers for unit and integration tests.

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::catalog::{BuildingSpec, Catalogs, SeasonTable, SpeciesSpec, TroopSpec};
use crate::model::{Land, LandId, Season, User, UserId, World};
use crate::notify::Notice;
use crate::sim;

/// A small but complete content set: duck and goose species over a shared
/// default, a three-tier troop ladder, and a two-step building chain.
pub fn test_catalogs() -> Catalogs {
    let mut catalogs = Catalogs::default();

    catalogs.troops.insert(
        "default_tier1".to_string(),
        TroopSpec {
            tier: 1,
            atk: Some(2),
            ap: Some(1),
            hp: Some(5),
            upkeep: Some(1),
            cost: Some(10),
            refund_percent_on_disband: Some(0.5),
            ..TroopSpec::default()
        },
    );
    catalogs.troops.insert(
        "default_tier2".to_string(),
        TroopSpec {
            tier: 2,
            atk: Some(4),
            ap: Some(2),
            hp: Some(8),
            upkeep: Some(2),
            cost: Some(25),
            refund_percent_on_disband: Some(0.5),
            ..TroopSpec::default()
        },
    );
    catalogs.troops.insert(
        "default_tier3".to_string(),
        TroopSpec {
            tier: 3,
            atk: Some(6),
            ap: Some(3),
            hp: Some(12),
            upkeep: Some(3),
            cost: Some(60),
            refund_percent_on_disband: Some(0.5),
            ..TroopSpec::default()
        },
    );
    catalogs.troops.insert(
        "Footman".to_string(),
        TroopSpec {
            tier: 1,
            species: Some("duck".to_string()),
            upgrades_to: Some("Spearman".to_string()),
            ..TroopSpec::default()
        },
    );
    catalogs.troops.insert(
        "Archer".to_string(),
        TroopSpec {
            tier: 1,
            atk: Some(3),
            ap: Some(0),
            hp: Some(3),
            species: Some("duck".to_string()),
            ..TroopSpec::default()
        },
    );
    catalogs.troops.insert(
        "Spearman".to_string(),
        TroopSpec {
            tier: 2,
            species: Some("duck".to_string()),
            from_upgrade_only: Some(true),
            upgrades_to: Some("Halberdier".to_string()),
            ..TroopSpec::default()
        },
    );
    catalogs.troops.insert(
        "Halberdier".to_string(),
        TroopSpec {
            tier: 3,
            species: Some("duck".to_string()),
            from_upgrade_only: Some(true),
            ..TroopSpec::default()
        },
    );
    catalogs.troops.insert(
        "Drake Levy".to_string(),
        TroopSpec {
            tier: 1,
            species: Some("duck".to_string()),
            requires_species_match: Some(true),
            ..TroopSpec::default()
        },
    );

    catalogs.buildings.insert(
        "default".to_string(),
        BuildingSpec {
            enabled: Some(true),
            cost: Some(100),
            construction_time: Some(1),
            refund_percent: Some(0.5),
            atk_bonus: Some(0),
            ap_bonus: Some(0),
            hp_bonus: Some(0),
            atk_bonus_per_troop: Some(0.0),
            ap_bonus_per_troop: Some(0.0),
            hp_bonus_per_troop: Some(0.0),
            max_atk_bonus: Some(0),
            max_ap_bonus: Some(0),
            max_hp_bonus: Some(0),
            max_quality_bonus: Some(0),
            ..BuildingSpec::default()
        },
    );
    catalogs.buildings.insert(
        "Palisade".to_string(),
        BuildingSpec {
            cost: Some(120),
            construction_time: Some(3),
            upgrades_to: Some("Keep".to_string()),
            ap_bonus: Some(2),
            hp_bonus: Some(4),
            ap_bonus_per_troop: Some(0.5),
            hp_bonus_per_troop: Some(0.5),
            max_ap_bonus: Some(10),
            max_hp_bonus: Some(12),
            max_quality_bonus: Some(1),
            ..BuildingSpec::default()
        },
    );
    catalogs.buildings.insert(
        "Keep".to_string(),
        BuildingSpec {
            cost: Some(400),
            construction_time: Some(5),
            from_upgrade_only: Some(true),
            demolished_to: Some("Palisade".to_string()),
            ap_bonus: Some(6),
            hp_bonus: Some(10),
            max_ap_bonus: Some(20),
            max_hp_bonus: Some(25),
            max_quality_bonus: Some(2),
            ..BuildingSpec::default()
        },
    );

    catalogs.species.insert(
        "default".to_string(),
        SpeciesSpec {
            enabled: Some(false),
            mischief: Some(false),
            all_season: SeasonTable {
                bonus_income_per_quality: Some(0.0),
                can_move: Some(true),
                can_attack: Some(true),
                upkeep_discount_per_troop: Some(0.0),
                percent_buildings_destroyed_on_conquest: Some(0.0),
                ..SeasonTable::default()
            },
            ..SpeciesSpec::default()
        },
    );
    catalogs.species.insert(
        "duck".to_string(),
        SpeciesSpec {
            enabled: Some(true),
            all_season: SeasonTable {
                bonus_income_per_quality: Some(0.5),
                ..SeasonTable::default()
            },
            ..SpeciesSpec::default()
        },
    );
    catalogs.species.insert(
        "goose".to_string(),
        SpeciesSpec {
            enabled: Some(true),
            all_season: SeasonTable {
                bonus_income_per_quality: Some(0.25),
                ..SeasonTable::default()
            },
            winter: SeasonTable {
                can_move: Some(false),
                can_attack: Some(false),
                ..SeasonTable::default()
            },
            ..SpeciesSpec::default()
        },
    );

    catalogs
}

/// A world with deterministic economics: all probabilistic knobs pinned so
/// tests opt into randomness explicitly.
pub fn test_world() -> World {
    let mut world = World::new();
    world.config.quality_improvement_probability = 0.0;
    world.config.quality_decay_probability = 0.0;
    world.config.quality_drain_on_hire_probability = 0.0;
    world.config.support_income_bonus = 1;
    world.config.current_season = Season::Summer;
    world
}

pub fn add_user(world: &mut World, id: UserId, quackerinos: i64) {
    world.users.insert(
        id,
        User {
            quackerinos,
            ..User::default()
        },
    );
}

pub fn add_land(world: &mut World, id: LandId, owner: UserId, name: &str) {
    let mut land = Land::new(name, owner, "duck");
    land.quality = 5;
    land.max_quality = 10;
    world.insert_land(id, land);
    world.config.land_counter = world.config.land_counter.max(id + 1);
}

/// Run a single tick against the world with a seeded rng; returns the
/// notices the engine would deliver.
pub fn run_single_tick(world: &mut World, catalogs: &Catalogs, seed: u64) -> Vec<Notice> {
    let mut rng = SmallRng::seed_from_u64(seed);
    sim::run_tick(world, catalogs, &mut rng)
}
