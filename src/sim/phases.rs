//! The non-battle phases of the daily tick: siege, move, upgrade, hire and
//! build. Each drains the queue through [`queue::drain`], classifying every
//! task it owns and leaving the rest untouched.

use rand::Rng;

use crate::model::{ArmyKind, Task, TaskKind};

use super::context::TickContext;
use super::encirclement::is_surrounded;
use super::legality::{MobilityGate, can_move_to, check_hostile_target, check_season_mobility};
use super::queue::{self, Outcome};

// --- Phase 1: siege -------------------------------------------------------

pub fn run_siege_phase(ctx: &mut TickContext) {
    queue::drain(ctx, |ctx, task| {
        if task.kind != TaskKind::Siege {
            return Outcome::Deferred(task);
        }
        match resolve_siege(ctx, &task) {
            Ok(ack) => {
                ctx.notify(task.user_id, ack);
                Outcome::Consumed
            }
            Err(reason) => Outcome::Rejected(reason),
        }
    });
}

fn resolve_siege(ctx: &mut TickContext, task: &Task) -> Result<String, String> {
    let target_id = task.target_land_id.ok_or("Target land doesn't exist.")?;
    let land = ctx
        .world
        .land(task.location_id)
        .ok_or("Land not found.")?;
    let land_name = land.name.clone();
    let source = land
        .source_army(&task.item, task.user_id, task.amount)
        .ok_or("You don't have enough of that troop from that location to send to the siege camp.")?;
    let target = ctx
        .world
        .land(target_id)
        .ok_or("Target land doesn't exist.")?;
    let target_name = target.name.clone();

    check_hostile_target(ctx.world, "siege", task.user_id, target.owner_id)?;
    check_season_mobility(
        ctx.catalogs,
        ctx.season(),
        &task.item,
        MobilityGate::Move,
        &land_name,
    )?;
    if is_surrounded(ctx.world.land(task.location_id).expect("checked above"), ctx.catalogs) {
        return Err(format!(
            "You cannot move troops out of {land_name} because it is fully surrounded."
        ));
    }

    relocate(ctx, task, source, target_id, ArmyKind::SiegeCamp);
    Ok(format!(
        "{} {}s were sent to siege {}.",
        task.amount, task.item, target_name
    ))
}

// --- Phase 4: move --------------------------------------------------------

pub fn run_move_phase(ctx: &mut TickContext) {
    queue::drain(ctx, |ctx, task| {
        if task.kind != TaskKind::Move {
            return Outcome::Deferred(task);
        }
        match resolve_move(ctx, &task) {
            Ok(ack) => {
                ctx.notify(task.user_id, ack);
                Outcome::Consumed
            }
            Err(reason) => Outcome::Rejected(reason),
        }
    });
}

fn resolve_move(ctx: &mut TickContext, task: &Task) -> Result<String, String> {
    let target_id = task.target_land_id.ok_or("Target land doesn't exist.")?;
    let land = ctx
        .world
        .land(task.location_id)
        .ok_or("Land not found.")?;
    let land_name = land.name.clone();
    let target = ctx
        .world
        .land(target_id)
        .ok_or("Target land doesn't exist.")?;
    let target_name = target.name.clone();
    let target_owner = target.owner_id;

    let source = ctx
        .world
        .land(task.location_id)
        .expect("checked above")
        .source_army(&task.item, task.user_id, task.amount)
        .ok_or(format!(
            "You don't have enough of that troop from that location to send to {target_name}."
        ))?;
    if task.location_id == target_id && source == ArmyKind::Garrison {
        return Err("The developers stopped you from taking a useless action.".to_string());
    }
    if !can_move_to(ctx.world, task.user_id, target_owner) {
        return Err(
            "You can only move troops to lands that belong to you, your liege, \
             a vassal of your liege, or your vassal."
                .to_string(),
        );
    }
    check_season_mobility(
        ctx.catalogs,
        ctx.season(),
        &task.item,
        MobilityGate::Move,
        &land_name,
    )?;
    if is_surrounded(ctx.world.land(task.location_id).expect("checked above"), ctx.catalogs) {
        return Err(format!(
            "You cannot move troops out of {land_name} because it is fully surrounded."
        ));
    }
    // Withdrawing out of the siege camp is the one way past an encircled
    // destination.
    if source != ArmyKind::SiegeCamp
        && is_surrounded(ctx.world.land(target_id).expect("checked above"), ctx.catalogs)
    {
        return Err(format!(
            "You cannot move troops into {target_name} because it is fully surrounded."
        ));
    }

    relocate(ctx, task, source, target_id, ArmyKind::SiegeCamp);
    Ok(format!(
        "{} {}s were sent to {}.",
        task.amount, task.item, target_name
    ))
}

/// Pull the committed troops out of the source army and land them in the
/// destination army, tagged with the mover's id.
fn relocate(
    ctx: &mut TickContext,
    task: &Task,
    source: ArmyKind,
    target_id: crate::model::LandId,
    destination: ArmyKind,
) {
    let removed = ctx
        .world
        .land_mut(task.location_id)
        .expect("source land checked")
        .army_mut(source)
        .remove(&task.item, task.user_id, task.amount);
    debug_assert!(removed, "relocate: availability was checked");
    ctx.world
        .land_mut(target_id)
        .expect("target land checked")
        .army_mut(destination)
        .add(&task.item, task.user_id, task.amount);
}

// --- Phase 5: upgrade -----------------------------------------------------

/// Upgrades resolve in descending troop-tier order so a tier-3 upgrade is
/// never invalidated by a tier-2 upgrade consuming its garrison first.
pub fn run_upgrade_phase(ctx: &mut TickContext) {
    // Unknown troops can never resolve a tier; reject them up front.
    queue::drain(ctx, |ctx, task| {
        if task.kind == TaskKind::Upgrade && ctx.catalogs.troop(&task.item).is_none() {
            Outcome::Rejected("Troop not found.".to_string())
        } else {
            Outcome::Deferred(task)
        }
    });

    while let Some(tier) = highest_queued_upgrade_tier(ctx) {
        queue::drain(ctx, |ctx, task| {
            if task.kind != TaskKind::Upgrade {
                return Outcome::Deferred(task);
            }
            match ctx.catalogs.troop(&task.item) {
                Some(troop) if troop.tier == tier => match resolve_upgrade(ctx, &task, &troop) {
                    Ok(ack) => {
                        ctx.notify(task.user_id, ack);
                        Outcome::Consumed
                    }
                    Err(reason) => Outcome::Rejected(reason),
                },
                _ => Outcome::Deferred(task),
            }
        });
    }
}

fn highest_queued_upgrade_tier(ctx: &TickContext) -> Option<u32> {
    ctx.world
        .config
        .task_queue
        .iter()
        .filter(|t| t.kind == TaskKind::Upgrade)
        .filter_map(|t| ctx.catalogs.troop(&t.item))
        .map(|troop| troop.tier)
        .max()
}

fn resolve_upgrade(
    ctx: &mut TickContext,
    task: &Task,
    troop: &crate::catalog::Troop,
) -> Result<String, String> {
    let owns = ctx
        .world
        .user(task.user_id)
        .is_some_and(|u| u.land_ids.contains(&task.location_id));
    if !owns {
        return Err("That land doesn't belong to you.".to_string());
    }
    let land = ctx.world.land(task.location_id).ok_or("Land not found.")?;
    let land_name = land.name.clone();
    if !land
        .garrison
        .get(&task.item, task.user_id)
        .is_some_and(|u| u.amount >= task.amount)
    {
        return Err(format!(
            "You don't have enough of that troop to upgrade {} of them.",
            task.amount
        ));
    }
    let next_name = troop
        .upgrades_to
        .clone()
        .ok_or("That troop can't be upgraded.")?;
    let next = ctx.catalogs.troop(&next_name).ok_or("Troop not found.")?;
    let cost = next.cost * i64::from(task.amount);
    let user = ctx.world.user_mut(task.user_id).expect("checked above");
    if user.quackerinos < cost {
        return Err("You don't have enough quackerinos for that.".to_string());
    }
    user.quackerinos -= cost;

    let garrison = &mut ctx
        .world
        .land_mut(task.location_id)
        .expect("checked above")
        .garrison;
    garrison.remove(&task.item, task.user_id, task.amount);
    garrison.add(&next_name, task.user_id, task.amount);

    Ok(format!(
        "{} {}s were upgraded to {}s at {}'s garrison.",
        task.amount, task.item, next_name, land_name
    ))
}

// --- Phase 6: hire --------------------------------------------------------

pub fn run_hire_phase(ctx: &mut TickContext) {
    queue::drain(ctx, |ctx, task| {
        if task.kind != TaskKind::Hire {
            return Outcome::Deferred(task);
        }
        match resolve_hire(ctx, &task) {
            Ok(ack) => {
                ctx.notify(task.user_id, ack);
                Outcome::Consumed
            }
            Err(reason) => Outcome::Rejected(reason),
        }
    });
}

fn resolve_hire(ctx: &mut TickContext, task: &Task) -> Result<String, String> {
    if crate::catalog::is_template(&task.item) {
        return Err("Troop not found.".to_string());
    }
    let troop = ctx.catalogs.troop(&task.item).ok_or("Troop not found.")?;
    let owns = ctx
        .world
        .user(task.user_id)
        .is_some_and(|u| u.land_ids.contains(&task.location_id));
    if !owns {
        return Err("That land doesn't belong to you.".to_string());
    }
    let land = ctx.world.land(task.location_id).ok_or("Land not found.")?;
    let land_name = land.name.clone();
    if troop.requires_species_match && troop.species != land.species {
        return Err("You can't hire that troop there.".to_string());
    }
    if troop.from_upgrade_only {
        return Err("That troop requires that you upgrade from a lower tier.".to_string());
    }
    let cost = troop.cost * i64::from(task.amount);
    let user = ctx.world.user_mut(task.user_id).expect("checked above");
    if user.quackerinos < cost {
        return Err("You don't have enough quackerinos for that.".to_string());
    }
    user.quackerinos -= cost;

    // Native levies are drawn from the land itself; each recruit may work
    // a point of quality out of it.
    let mut drained = 0;
    if troop.requires_species_match {
        let p = ctx.world.config.quality_drain_on_hire_probability;
        for _ in 0..task.amount {
            if p > 0.0 && ctx.rng.random_range(0.0..1.0) < p {
                drained += 1;
            }
        }
    }
    let land = ctx.world.land_mut(task.location_id).expect("checked above");
    land.quality = land.quality.saturating_sub(drained);
    land.garrison.add(&task.item, task.user_id, task.amount);

    Ok(format!(
        "You hired {} {}s at {}'s garrison.",
        task.amount, task.item, land_name
    ))
}

// --- Phase 7: build -------------------------------------------------------

/// Builds pay once (on the tick where the countdown still equals the full
/// construction time), then count down; at zero the building lands and its
/// upgrade predecessor is removed.
pub fn run_build_phase(ctx: &mut TickContext) {
    queue::drain(ctx, |ctx, task| {
        if task.kind != TaskKind::Build {
            return Outcome::Deferred(task);
        }
        resolve_build(ctx, task)
    });
}

fn resolve_build(ctx: &mut TickContext, mut task: Task) -> Outcome {
    let building = match ctx.catalogs.building(&task.item) {
        Some(b) if b.enabled => b,
        _ => return Outcome::Rejected("Building not found.".to_string()),
    };
    let owns = ctx
        .world
        .user(task.user_id)
        .is_some_and(|u| u.land_ids.contains(&task.location_id));
    if !owns {
        return Outcome::Rejected("That land doesn't belong to you.".to_string());
    }
    let Some(land) = ctx.world.land(task.location_id) else {
        return Outcome::Rejected("Land not found.".to_string());
    };
    let land_name = land.name.clone();
    if land.buildings.iter().any(|b| *b == task.item) {
        return Outcome::Rejected("That building has already been built there.".to_string());
    }
    if building.from_upgrade_only && predecessor_of(ctx, &task.item, &land.buildings).is_none() {
        return Outcome::Rejected(
            "That building needs to be built by upgrading a lower tier one.".to_string(),
        );
    }
    if upper_tier_present(ctx, &building, &land.buildings) {
        return Outcome::Rejected(
            "There is already an upper tier equivalent of that building in that location."
                .to_string(),
        );
    }

    if task.time_remaining == building.construction_time {
        let user = ctx.world.user_mut(task.user_id).expect("checked above");
        if user.quackerinos < building.cost {
            return Outcome::Rejected("You don't have enough quackerinos for that.".to_string());
        }
        user.quackerinos -= building.cost;
        ctx.notify(
            task.user_id,
            format!(
                "The labourers have started building {} at {}, costing {}.",
                task.item, land_name, building.cost
            ),
        );
    }

    task.time_remaining = task.time_remaining.saturating_sub(1);
    if task.time_remaining > 0 {
        return Outcome::Deferred(task);
    }

    let predecessor = {
        let land = ctx.world.land(task.location_id).expect("checked above");
        if building.from_upgrade_only {
            predecessor_of(ctx, &task.item, &land.buildings)
        } else {
            None
        }
    };
    let land = ctx.world.land_mut(task.location_id).expect("checked above");
    land.buildings.push(task.item.clone());
    if let Some(old) = predecessor {
        if let Some(pos) = land.buildings.iter().position(|b| *b == old) {
            land.buildings.remove(pos);
        }
    }
    ctx.notify(
        task.user_id,
        format!("{} has been built at {}.", task.item, land_name),
    );
    Outcome::Consumed
}

/// The building already standing that upgrades into `item`, if any.
fn predecessor_of(ctx: &TickContext, item: &str, standing: &[String]) -> Option<String> {
    standing
        .iter()
        .find(|name| {
            ctx.catalogs
                .building(name)
                .is_some_and(|b| b.upgrades_to.as_deref() == Some(item))
        })
        .cloned()
}

/// Walk the upgrade chain upward from `building`; true if any ancestor is
/// already standing. Bounded by a visited set in case catalog data loops.
fn upper_tier_present(
    ctx: &TickContext,
    building: &crate::catalog::Building,
    standing: &[String],
) -> bool {
    let mut visited = std::collections::BTreeSet::new();
    let mut cursor = building.upgrades_to.clone();
    while let Some(next) = cursor {
        if standing.iter().any(|b| *b == next) {
            return true;
        }
        if !visited.insert(next.clone()) {
            break;
        }
        cursor = ctx.catalogs.building(&next).and_then(|b| b.upgrades_to);
    }
    false
}
