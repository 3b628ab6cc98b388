use serde::{Deserialize, Serialize};

/// A fully resolved troop definition: the tier's default template with the
/// named record's overrides merged on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Troop {
    pub tier: u32,
    pub atk: i64,
    /// Armor points; the defensive stat the battle resolver pools as DEF.
    pub ap: i64,
    pub hp: i64,
    pub upkeep: i64,
    pub cost: i64,
    pub species: String,
    pub requires_species_match: bool,
    pub from_upgrade_only: bool,
    pub upgrades_to: Option<String>,
    pub refund_percent_on_disband: f64,
}

/// A catalog record: either a `default_tier{n}` template or a named troop
/// that overrides some of its tier template's fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TroopSpec {
    pub tier: u32,
    #[serde(rename = "ATK")]
    pub atk: Option<i64>,
    #[serde(rename = "AP")]
    pub ap: Option<i64>,
    #[serde(rename = "HP")]
    pub hp: Option<i64>,
    pub upkeep: Option<i64>,
    pub cost: Option<i64>,
    pub species: Option<String>,
    #[serde(rename = "requiresSpeciesMatch")]
    pub requires_species_match: Option<bool>,
    #[serde(rename = "fromUpgradeOnly")]
    pub from_upgrade_only: Option<bool>,
    #[serde(rename = "upgradesTo")]
    pub upgrades_to: Option<String>,
    #[serde(rename = "refundPercentOnDisband")]
    pub refund_percent_on_disband: Option<f64>,
}

/// Merge a named record over its tier template. Both layers are sparse;
/// any field absent from both falls back to a neutral zero/false value.
pub fn resolve(base: Option<&TroopSpec>, spec: &TroopSpec) -> Troop {
    let empty = TroopSpec::default();
    let base = base.unwrap_or(&empty);
    Troop {
        tier: spec.tier,
        atk: spec.atk.or(base.atk).unwrap_or(0),
        ap: spec.ap.or(base.ap).unwrap_or(0),
        hp: spec.hp.or(base.hp).unwrap_or(0),
        upkeep: spec.upkeep.or(base.upkeep).unwrap_or(0),
        cost: spec.cost.or(base.cost).unwrap_or(0),
        species: spec
            .species
            .clone()
            .or_else(|| base.species.clone())
            .unwrap_or_default(),
        requires_species_match: spec
            .requires_species_match
            .or(base.requires_species_match)
            .unwrap_or(false),
        from_upgrade_only: spec.from_upgrade_only.or(base.from_upgrade_only).unwrap_or(false),
        upgrades_to: spec.upgrades_to.clone().or_else(|| base.upgrades_to.clone()),
        refund_percent_on_disband: spec
            .refund_percent_on_disband
            .or(base.refund_percent_on_disband)
            .unwrap_or(0.0),
    }
}
