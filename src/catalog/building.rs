use serde::{Deserialize, Serialize};

/// A fully resolved building definition.
///
/// Buildings form a promotion/demotion chain: `upgrades_to` points one step
/// up, `demolished_to` one step down. The `*_bonus`/`*_bonus_per_troop`/
/// `max_*_bonus` triples feed battles and the encirclement score.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub enabled: bool,
    pub cost: i64,
    pub construction_time: u32,
    pub refund_percent: f64,
    pub from_upgrade_only: bool,
    pub upgrades_to: Option<String>,
    pub demolished_to: Option<String>,

    pub atk_bonus: i64,
    pub ap_bonus: i64,
    pub hp_bonus: i64,
    pub atk_bonus_per_troop: f64,
    pub ap_bonus_per_troop: f64,
    pub hp_bonus_per_troop: f64,
    pub max_atk_bonus: i64,
    pub max_ap_bonus: i64,
    pub max_hp_bonus: i64,

    /// Added to the land's recomputed `maxQuality` while the building stands.
    pub max_quality_bonus: u32,
}

impl Building {
    /// The capped ATK contribution to the defending side for a garrison of
    /// `troops`.
    pub fn atk_bonus_for(&self, troops: u32) -> i64 {
        capped(self.atk_bonus, self.atk_bonus_per_troop, self.max_atk_bonus, troops)
    }

    pub fn ap_bonus_for(&self, troops: u32) -> i64 {
        capped(self.ap_bonus, self.ap_bonus_per_troop, self.max_ap_bonus, troops)
    }

    pub fn hp_bonus_for(&self, troops: u32) -> i64 {
        capped(self.hp_bonus, self.hp_bonus_per_troop, self.max_hp_bonus, troops)
    }
}

fn capped(flat: i64, per_troop: f64, max: i64, troops: u32) -> i64 {
    let raw = flat as f64 + per_troop * f64::from(troops);
    (raw as i64).min(max)
}

/// A catalog record: the `default` template or a named building overriding
/// part of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingSpec {
    pub enabled: Option<bool>,
    pub cost: Option<i64>,
    #[serde(rename = "constructionTime")]
    pub construction_time: Option<u32>,
    #[serde(rename = "refundPercent")]
    pub refund_percent: Option<f64>,
    #[serde(rename = "fromUpgradeOnly")]
    pub from_upgrade_only: Option<bool>,
    #[serde(rename = "upgradesTo")]
    pub upgrades_to: Option<String>,
    #[serde(rename = "demolishedTo")]
    pub demolished_to: Option<String>,

    #[serde(rename = "ATKbonus")]
    pub atk_bonus: Option<i64>,
    #[serde(rename = "APbonus")]
    pub ap_bonus: Option<i64>,
    #[serde(rename = "HPbonus")]
    pub hp_bonus: Option<i64>,
    #[serde(rename = "ATKbonusPerTroop")]
    pub atk_bonus_per_troop: Option<f64>,
    #[serde(rename = "APbonusPerTroop")]
    pub ap_bonus_per_troop: Option<f64>,
    #[serde(rename = "HPbonusPerTroop")]
    pub hp_bonus_per_troop: Option<f64>,
    #[serde(rename = "maxATKbonus")]
    pub max_atk_bonus: Option<i64>,
    #[serde(rename = "maxAPbonus")]
    pub max_ap_bonus: Option<i64>,
    #[serde(rename = "maxHPbonus")]
    pub max_hp_bonus: Option<i64>,

    #[serde(rename = "maxQualityBonus")]
    pub max_quality_bonus: Option<u32>,
}

/// Merge a named record over the catalog's default template.
pub fn resolve(base: Option<&BuildingSpec>, spec: &BuildingSpec) -> Building {
    let empty = BuildingSpec::default();
    let base = base.unwrap_or(&empty);
    Building {
        enabled: spec.enabled.or(base.enabled).unwrap_or(true),
        cost: spec.cost.or(base.cost).unwrap_or(0),
        construction_time: spec.construction_time.or(base.construction_time).unwrap_or(1),
        refund_percent: spec.refund_percent.or(base.refund_percent).unwrap_or(0.0),
        from_upgrade_only: spec.from_upgrade_only.or(base.from_upgrade_only).unwrap_or(false),
        upgrades_to: spec.upgrades_to.clone().or_else(|| base.upgrades_to.clone()),
        demolished_to: spec
            .demolished_to
            .clone()
            .or_else(|| base.demolished_to.clone()),
        atk_bonus: spec.atk_bonus.or(base.atk_bonus).unwrap_or(0),
        ap_bonus: spec.ap_bonus.or(base.ap_bonus).unwrap_or(0),
        hp_bonus: spec.hp_bonus.or(base.hp_bonus).unwrap_or(0),
        atk_bonus_per_troop: spec
            .atk_bonus_per_troop
            .or(base.atk_bonus_per_troop)
            .unwrap_or(0.0),
        ap_bonus_per_troop: spec
            .ap_bonus_per_troop
            .or(base.ap_bonus_per_troop)
            .unwrap_or(0.0),
        hp_bonus_per_troop: spec
            .hp_bonus_per_troop
            .or(base.hp_bonus_per_troop)
            .unwrap_or(0.0),
        max_atk_bonus: spec.max_atk_bonus.or(base.max_atk_bonus).unwrap_or(i64::MAX),
        max_ap_bonus: spec.max_ap_bonus.or(base.max_ap_bonus).unwrap_or(i64::MAX),
        max_hp_bonus: spec.max_hp_bonus.or(base.max_hp_bonus).unwrap_or(i64::MAX),
        max_quality_bonus: spec.max_quality_bonus.or(base.max_quality_bonus).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_troop_bonus_is_capped() {
        let spec = BuildingSpec {
            hp_bonus: Some(2),
            hp_bonus_per_troop: Some(1.5),
            max_hp_bonus: Some(10),
            ..BuildingSpec::default()
        };
        let building = resolve(None, &spec);
        assert_eq!(building.hp_bonus_for(0), 2);
        assert_eq!(building.hp_bonus_for(4), 8);
        assert_eq!(building.hp_bonus_for(100), 10);
    }

    #[test]
    fn named_record_overrides_the_default() {
        let default = BuildingSpec {
            cost: Some(100),
            construction_time: Some(3),
            refund_percent: Some(0.5),
            ..BuildingSpec::default()
        };
        let keep = BuildingSpec {
            cost: Some(250),
            upgrades_to: Some("Castle".to_string()),
            ..BuildingSpec::default()
        };
        let building = resolve(Some(&default), &keep);
        assert_eq!(building.cost, 250);
        assert_eq!(building.construction_time, 3);
        assert_eq!(building.refund_percent, 0.5);
        assert_eq!(building.upgrades_to.as_deref(), Some("Castle"));
        assert!(building.enabled);
    }
}
