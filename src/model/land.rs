use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// A company of identical troops inside one army list.
///
/// There is at most one `Unit` per `(troop_name, owner_id)` pair in a given
/// army; merging on insert and deleting at zero keep the amount strictly
/// positive for every persisted unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub troop_name: String,
    pub amount: u32,
    #[serde(rename = "user_id")]
    pub owner_id: UserId,
}

/// Which of a land's two army lists a unit sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmyKind {
    Garrison,
    SiegeCamp,
}

/// An ordered list of units: a garrison or a siege camp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Army(pub Vec<Unit>);

impl Army {
    pub fn total(&self) -> u32 {
        self.0.iter().map(|u| u.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, troop_name: &str, owner_id: UserId) -> Option<&Unit> {
        self.0
            .iter()
            .find(|u| u.troop_name == troop_name && u.owner_id == owner_id)
    }

    /// Merge `amount` troops into the matching unit, creating it if absent.
    pub fn add(&mut self, troop_name: &str, owner_id: UserId, amount: u32) {
        if amount == 0 {
            return;
        }
        match self
            .0
            .iter_mut()
            .find(|u| u.troop_name == troop_name && u.owner_id == owner_id)
        {
            Some(unit) => unit.amount += amount,
            None => self.0.push(Unit {
                troop_name: troop_name.to_string(),
                amount,
                owner_id,
            }),
        }
    }

    /// Split `amount` troops out of the matching unit, deleting it when it
    /// reaches zero. Returns false (and changes nothing) if the unit is
    /// missing or holds fewer troops than requested.
    pub fn remove(&mut self, troop_name: &str, owner_id: UserId, amount: u32) -> bool {
        let Some(index) = self
            .0
            .iter()
            .position(|u| u.troop_name == troop_name && u.owner_id == owner_id)
        else {
            return false;
        };
        if self.0[index].amount < amount {
            return false;
        }
        self.0[index].amount -= amount;
        if self.0[index].amount == 0 {
            self.0.remove(index);
        }
        true
    }

    /// Like [`Army::remove`] but tolerates over-subtraction: removes at most
    /// `amount`, deleting the unit when it empties. Used when reconciling
    /// battle losses, where several companies may have drawn on one unit.
    pub fn remove_up_to(&mut self, troop_name: &str, owner_id: UserId, amount: u32) {
        let Some(index) = self
            .0
            .iter()
            .position(|u| u.troop_name == troop_name && u.owner_id == owner_id)
        else {
            return;
        };
        self.0[index].amount = self.0[index].amount.saturating_sub(amount);
        if self.0[index].amount == 0 {
            self.0.remove(index);
        }
    }
}

/// One land parcel: a named territory with an owner, a quality score, a
/// building list, and the two armies stationed at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Land {
    pub name: String,
    pub owner_id: UserId,
    pub species: String,
    pub quality: u32,
    #[serde(rename = "maxQuality")]
    pub max_quality: u32,
    pub buildings: Vec<String>,
    pub garrison: Army,
    #[serde(rename = "siegeCamp")]
    pub siege_camp: Army,
}

impl Land {
    pub fn new(name: impl Into<String>, owner_id: UserId, species: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner_id,
            species: species.into(),
            quality: 0,
            max_quality: 0,
            buildings: Vec::new(),
            garrison: Army::default(),
            siege_camp: Army::default(),
        }
    }

    pub fn army(&self, kind: ArmyKind) -> &Army {
        match kind {
            ArmyKind::Garrison => &self.garrison,
            ArmyKind::SiegeCamp => &self.siege_camp,
        }
    }

    pub fn army_mut(&mut self, kind: ArmyKind) -> &mut Army {
        match kind {
            ArmyKind::Garrison => &mut self.garrison,
            ArmyKind::SiegeCamp => &mut self.siege_camp,
        }
    }

    /// The army a departure draws troops from: the siege camp when it can
    /// cover the request, otherwise the garrison.
    pub fn source_army(&self, troop_name: &str, owner_id: UserId, amount: u32) -> Option<ArmyKind> {
        for kind in [ArmyKind::SiegeCamp, ArmyKind::Garrison] {
            if self
                .army(kind)
                .get(troop_name, owner_id)
                .is_some_and(|u| u.amount >= amount)
            {
                return Some(kind);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_merges_and_remove_deletes_at_zero() {
        let mut army = Army::default();
        army.add("Footman", 1, 5);
        army.add("Footman", 1, 3);
        army.add("Footman", 2, 4);
        assert_eq!(army.0.len(), 2);
        assert_eq!(army.get("Footman", 1).unwrap().amount, 8);
        assert_eq!(army.total(), 12);

        assert!(army.remove("Footman", 1, 8));
        assert!(army.get("Footman", 1).is_none());
        assert_eq!(army.total(), 4);
    }

    #[test]
    fn remove_refuses_shortfalls() {
        let mut army = Army::default();
        army.add("Archer", 7, 2);
        assert!(!army.remove("Archer", 7, 3));
        assert!(!army.remove("Archer", 8, 1));
        assert_eq!(army.get("Archer", 7).unwrap().amount, 2);
    }

    #[test]
    fn source_army_prefers_the_siege_camp() {
        let mut land = Land::new("Pondholm", 1, "duck");
        land.garrison.add("Footman", 1, 10);
        land.siege_camp.add("Footman", 1, 4);

        assert_eq!(
            land.source_army("Footman", 1, 4),
            Some(ArmyKind::SiegeCamp)
        );
        // Camp cannot cover five, so the garrison is drawn on instead.
        assert_eq!(land.source_army("Footman", 1, 5), Some(ArmyKind::Garrison));
        assert_eq!(land.source_army("Footman", 1, 11), None);
    }

    #[test]
    fn unit_serializes_with_original_field_names() {
        let unit = Unit {
            troop_name: "Spearman".to_string(),
            amount: 3,
            owner_id: 42,
        };
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["troop_name"], "Spearman");
        assert_eq!(json["user_id"], 42);
    }
}
