use crate::catalog::Catalogs;
use crate::model::Land;

/// Whether a land is fully surrounded: the siege camp strictly outnumbers
/// the garrison plus the capped defensive bonuses of every building.
///
/// Recomputed on demand, never cached — army counts change between checks
/// within a single tick.
pub fn is_surrounded(land: &Land, catalogs: &Catalogs) -> bool {
    let defenders = land.garrison.total();
    let siegers = i64::from(land.siege_camp.total());

    let mut defender_score = i64::from(defenders);
    for building_name in &land.buildings {
        let Some(building) = catalogs.building(building_name) else {
            continue;
        };
        defender_score += building.ap_bonus_for(defenders) + building.hp_bonus_for(defenders);
    }

    siegers > defender_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuildingSpec;
    use crate::model::Land;

    fn land_with_counts(garrison: u32, camp: u32) -> Land {
        let mut land = Land::new("Reedmarsh", 1, "duck");
        if garrison > 0 {
            land.garrison.add("Footman", 1, garrison);
        }
        if camp > 0 {
            land.siege_camp.add("Footman", 2, camp);
        }
        land
    }

    #[test]
    fn garrison_alone_is_never_surrounded() {
        // Ten footmen, no siege camp.
        let land = land_with_counts(10, 0);
        assert!(!is_surrounded(&land, &Catalogs::default()));
    }

    #[test]
    fn camp_must_strictly_exceed_the_garrison() {
        assert!(!is_surrounded(&land_with_counts(10, 10), &Catalogs::default()));
        assert!(is_surrounded(&land_with_counts(10, 11), &Catalogs::default()));
    }

    #[test]
    fn buildings_raise_the_defender_score() {
        let mut catalogs = Catalogs::default();
        catalogs.buildings.insert(
            "Palisade".to_string(),
            BuildingSpec {
                ap_bonus: Some(2),
                hp_bonus: Some(3),
                max_ap_bonus: Some(10),
                max_hp_bonus: Some(10),
                ..BuildingSpec::default()
            },
        );
        let mut land = land_with_counts(10, 11);
        land.buildings.push("Palisade".to_string());
        // 10 + 2 + 3 = 15 >= 11 siegers.
        assert!(!is_surrounded(&land, &catalogs));
        land.siege_camp.add("Footman", 2, 5);
        assert!(is_surrounded(&land, &catalogs));
    }

    #[test]
    fn growing_the_camp_never_unsurrounds() {
        let mut land = land_with_counts(8, 0);
        let catalogs = Catalogs::default();
        let mut was_surrounded = false;
        for extra in 1..=20 {
            land.siege_camp.add("Footman", 2, 1);
            let now = is_surrounded(&land, &catalogs);
            assert!(now || !was_surrounded, "flipped back at camp size {extra}");
            was_surrounded = now;
        }
        assert!(was_surrounded);
    }

    #[test]
    fn unknown_buildings_contribute_nothing() {
        let mut land = land_with_counts(5, 6);
        land.buildings.push("Mirage".to_string());
        assert!(is_surrounded(&land, &Catalogs::default()));
    }
}
