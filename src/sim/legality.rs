use std::collections::BTreeSet;

use crate::catalog::Catalogs;
use crate::model::{Season, UserId, World};

/// Which seasonal mobility flag a command is gated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobilityGate {
    /// siege / sally-out / move use the species' `canMove` flag.
    Move,
    /// attack / defend use the species' `canAttack` flag.
    Attack,
}

/// Everyone sharing the actor's cause: declared allies, fellow vassals of
/// the same liege, the liege, and the actor's own vassals.
pub fn allied_vassals(world: &World, user_id: UserId) -> BTreeSet<UserId> {
    let Some(user) = world.user(user_id) else {
        return BTreeSet::new();
    };
    let mut allies: BTreeSet<UserId> = user.ally_ids.clone();
    if let Some(liege_id) = user.liege_id {
        allies.insert(liege_id);
        for (other_id, other) in &world.users {
            if *other_id != user_id && other.liege_id == Some(liege_id) {
                allies.insert(*other_id);
            }
        }
    }
    for (other_id, other) in &world.users {
        if other.liege_id == Some(user_id) {
            allies.insert(*other_id);
        }
    }
    allies
}

/// Whether a hostile command (attack or siege) from `actor_id` against a
/// land owned by `target_owner` is legal. The returned error is the exact
/// text to DM back.
pub fn check_hostile_target(
    world: &World,
    verb: &str,
    actor_id: UserId,
    target_owner: UserId,
) -> Result<(), String> {
    if target_owner == actor_id {
        return Err(format!("You can't {verb} yourself."));
    }

    let actor_has_liege = world.user(actor_id).is_some_and(|u| u.liege_id.is_some());
    if actor_has_liege {
        let target_is_vassal = world
            .user(target_owner)
            .is_some_and(|t| t.liege_id == Some(actor_id));
        if allied_vassals(world, actor_id).contains(&target_owner) || target_is_vassal {
            return Err(format!(
                "You can't {verb} this person for one of the following reasons: \
                 they are your liege, fellow vassal, or your vassal."
            ));
        }
    }

    // Post-homeland grace: neither a protected newcomer nor their lands can
    // be drawn into attack or siege while the period runs.
    let safety = |id: UserId| world.user(id).is_some_and(|u| u.safety_count > 0);
    if safety(actor_id) || safety(target_owner) {
        return Err(format!(
            "You can't {verb} while a post-homeland safety period protects one of you."
        ));
    }

    Ok(())
}

/// Whether a land owned by `target_owner` counts as friendly ground the
/// actor may move troops onto.
pub fn can_move_to(world: &World, actor_id: UserId, target_owner: UserId) -> bool {
    if target_owner == actor_id {
        return true;
    }
    let actor_has_liege = world.user(actor_id).is_some_and(|u| u.liege_id.is_some());
    let target_is_vassal = world
        .user(target_owner)
        .is_some_and(|t| t.liege_id == Some(actor_id));
    actor_has_liege && (allied_vassals(world, actor_id).contains(&target_owner) || target_is_vassal)
}

/// Whether the troop's species may act this season, falling back to the
/// all-season table when the season-specific flag is absent.
pub fn check_season_mobility(
    catalogs: &Catalogs,
    season: Season,
    troop_name: &str,
    gate: MobilityGate,
    land_name: &str,
) -> Result<(), String> {
    let Some(troop) = catalogs.troop(troop_name) else {
        return Err("Troop not found.".to_string());
    };
    let allowed = catalogs.species(&troop.species).is_none_or(|s| match gate {
        MobilityGate::Move => s.can_move(season),
        MobilityGate::Attack => s.can_attack(season),
    });
    if allowed {
        Ok(())
    } else {
        Err(format!(
            "You cannot move {} troops out of {} during the {}.",
            troop.species, land_name, season
        ))
    }
}
