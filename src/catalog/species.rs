use serde::{Deserialize, Serialize};

use crate::model::Season;

/// One season's worth of species modifiers, all optional.
///
/// A resolved [`Species`] keeps these sparse: a per-season lookup falls back
/// to the `all-season` table attribute by attribute, so a species can tweak
/// a single winter value without restating everything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonTable {
    #[serde(rename = "bonusIncomePerQuality")]
    pub bonus_income_per_quality: Option<f64>,
    #[serde(rename = "canMove")]
    pub can_move: Option<bool>,
    #[serde(rename = "canAttack")]
    pub can_attack: Option<bool>,
    #[serde(rename = "bonusATKPerTroop")]
    pub bonus_atk_per_troop: Option<i64>,
    #[serde(rename = "bonusDEFPerTroop")]
    pub bonus_def_per_troop: Option<i64>,
    #[serde(rename = "bonusHPPerTroop")]
    pub bonus_hp_per_troop: Option<i64>,
    #[serde(rename = "upkeepDiscountPerTroop")]
    pub upkeep_discount_per_troop: Option<f64>,
    #[serde(rename = "upkeepSurchargePercentInSiegeCamp")]
    pub upkeep_surcharge_percent_in_siege_camp: Option<f64>,
    #[serde(rename = "percentBuildingsDestroyedOnConquest")]
    pub percent_buildings_destroyed_on_conquest: Option<f64>,
    #[serde(rename = "percentDesertsOnOathbreaker")]
    pub percent_deserts_on_oathbreaker: Option<f64>,
    #[serde(rename = "incomePenaltyPercentInSiege")]
    pub income_penalty_percent_in_siege: Option<f64>,
    #[serde(rename = "landQualityIncreasePerTurn")]
    pub land_quality_increase_per_turn: Option<u32>,
}

/// A species catalog record: the `default` species or a named override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesSpec {
    pub enabled: Option<bool>,
    pub mischief: Option<bool>,
    pub description: Option<String>,
    #[serde(rename = "all-season")]
    pub all_season: SeasonTable,
    pub spring: SeasonTable,
    pub summer: SeasonTable,
    pub fall: SeasonTable,
    pub winter: SeasonTable,
}

/// A resolved species: default overlaid attribute-by-attribute, per table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Species {
    pub enabled: bool,
    pub mischief: bool,
    pub all_season: SeasonTable,
    pub spring: SeasonTable,
    pub summer: SeasonTable,
    pub fall: SeasonTable,
    pub winter: SeasonTable,
}

macro_rules! seasonal_accessor {
    ($name:ident, $field:ident, $ty:ty, $default:expr) => {
        pub fn $name(&self, season: Season) -> $ty {
            self.table(season)
                .$field
                .or(self.all_season.$field)
                .unwrap_or($default)
        }
    };
}

impl Species {
    fn table(&self, season: Season) -> &SeasonTable {
        match season {
            Season::Spring => &self.spring,
            Season::Summer => &self.summer,
            Season::Fall => &self.fall,
            Season::Winter => &self.winter,
        }
    }

    seasonal_accessor!(bonus_income_per_quality, bonus_income_per_quality, f64, 0.0);
    seasonal_accessor!(can_move, can_move, bool, true);
    seasonal_accessor!(can_attack, can_attack, bool, true);
    seasonal_accessor!(bonus_atk_per_troop, bonus_atk_per_troop, i64, 0);
    seasonal_accessor!(bonus_def_per_troop, bonus_def_per_troop, i64, 0);
    seasonal_accessor!(bonus_hp_per_troop, bonus_hp_per_troop, i64, 0);
    seasonal_accessor!(upkeep_discount_per_troop, upkeep_discount_per_troop, f64, 0.0);
    seasonal_accessor!(
        upkeep_surcharge_percent_in_siege_camp,
        upkeep_surcharge_percent_in_siege_camp,
        f64,
        0.0
    );
    seasonal_accessor!(
        percent_buildings_destroyed_on_conquest,
        percent_buildings_destroyed_on_conquest,
        f64,
        0.0
    );
    seasonal_accessor!(
        percent_deserts_on_oathbreaker,
        percent_deserts_on_oathbreaker,
        f64,
        0.0
    );
    seasonal_accessor!(
        income_penalty_percent_in_siege,
        income_penalty_percent_in_siege,
        f64,
        0.0
    );
    seasonal_accessor!(
        land_quality_increase_per_turn,
        land_quality_increase_per_turn,
        u32,
        0
    );
}

fn overlay(base: &SeasonTable, over: &SeasonTable) -> SeasonTable {
    SeasonTable {
        bonus_income_per_quality: over.bonus_income_per_quality.or(base.bonus_income_per_quality),
        can_move: over.can_move.or(base.can_move),
        can_attack: over.can_attack.or(base.can_attack),
        bonus_atk_per_troop: over.bonus_atk_per_troop.or(base.bonus_atk_per_troop),
        bonus_def_per_troop: over.bonus_def_per_troop.or(base.bonus_def_per_troop),
        bonus_hp_per_troop: over.bonus_hp_per_troop.or(base.bonus_hp_per_troop),
        upkeep_discount_per_troop: over
            .upkeep_discount_per_troop
            .or(base.upkeep_discount_per_troop),
        upkeep_surcharge_percent_in_siege_camp: over
            .upkeep_surcharge_percent_in_siege_camp
            .or(base.upkeep_surcharge_percent_in_siege_camp),
        percent_buildings_destroyed_on_conquest: over
            .percent_buildings_destroyed_on_conquest
            .or(base.percent_buildings_destroyed_on_conquest),
        percent_deserts_on_oathbreaker: over
            .percent_deserts_on_oathbreaker
            .or(base.percent_deserts_on_oathbreaker),
        income_penalty_percent_in_siege: over
            .income_penalty_percent_in_siege
            .or(base.income_penalty_percent_in_siege),
        land_quality_increase_per_turn: over
            .land_quality_increase_per_turn
            .or(base.land_quality_increase_per_turn),
    }
}

/// Merge a named species over the catalog default: one overlay for the flags
/// plus a separate attribute-level overlay per season table.
pub fn resolve(base: Option<&SpeciesSpec>, spec: &SpeciesSpec) -> Species {
    let empty = SpeciesSpec::default();
    let base = base.unwrap_or(&empty);
    Species {
        enabled: spec.enabled.or(base.enabled).unwrap_or(false),
        mischief: spec.mischief.or(base.mischief).unwrap_or(false),
        all_season: overlay(&base.all_season, &spec.all_season),
        spring: overlay(&base.spring, &spec.spring),
        summer: overlay(&base.summer, &spec.summer),
        fall: overlay(&base.fall, &spec.fall),
        winter: overlay(&base.winter, &spec.winter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_species() -> SpeciesSpec {
        SpeciesSpec {
            enabled: Some(true),
            mischief: Some(false),
            all_season: SeasonTable {
                bonus_income_per_quality: Some(0.5),
                can_move: Some(true),
                can_attack: Some(true),
                percent_buildings_destroyed_on_conquest: Some(0.25),
                ..SeasonTable::default()
            },
            ..SpeciesSpec::default()
        }
    }

    #[test]
    fn season_lookup_falls_back_to_all_season() {
        let goose = SpeciesSpec {
            winter: SeasonTable {
                can_attack: Some(false),
                ..SeasonTable::default()
            },
            ..SpeciesSpec::default()
        };
        let resolved = resolve(Some(&default_species()), &goose);
        assert!(!resolved.can_attack(Season::Winter));
        assert!(resolved.can_attack(Season::Summer));
        assert_eq!(resolved.bonus_income_per_quality(Season::Winter), 0.5);
    }

    #[test]
    fn flags_overlay_separately_from_tables() {
        let magpie = SpeciesSpec {
            mischief: Some(true),
            all_season: SeasonTable {
                bonus_income_per_quality: Some(1.0),
                ..SeasonTable::default()
            },
            ..SpeciesSpec::default()
        };
        let resolved = resolve(Some(&default_species()), &magpie);
        assert!(resolved.enabled);
        assert!(resolved.mischief);
        assert_eq!(resolved.bonus_income_per_quality(Season::Fall), 1.0);
        // Untouched attributes keep the default's value.
        assert_eq!(
            resolved.percent_buildings_destroyed_on_conquest(Season::Fall),
            0.25
        );
    }

    #[test]
    fn absent_attributes_resolve_to_neutral_defaults() {
        let bare = resolve(None, &SpeciesSpec::default());
        assert!(!bare.enabled);
        assert!(bare.can_move(Season::Spring));
        assert_eq!(bare.bonus_atk_per_troop(Season::Fall), 0);
        assert_eq!(bare.land_quality_increase_per_turn(Season::Winter), 0);
    }
}
