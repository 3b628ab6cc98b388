//! Submission-time validation: every queued command is checked against the
//! current world snapshot before it is admitted, mirroring the checks the
//! resolving phase will repeat at tick time (the world can change in
//! between, so neither side trusts the other).

use crate::catalog::{Catalogs, is_template};
use crate::model::{ArmyKind, Land, LandId, Task, TaskKind, UserId, World};
use crate::sim::{
    MobilityGate, can_move_to, check_hostile_target, check_season_mobility, is_surrounded,
};

/// A command as the front end hands it over, before validation.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub kind: TaskKind,
    pub actor_id: UserId,
    pub item: String,
    pub location_id: LandId,
    pub target_land_id: Option<LandId>,
    pub amount: u32,
}

impl CommandRequest {
    pub fn with_target(mut self, target_land_id: LandId) -> Self {
        self.target_land_id = Some(target_land_id);
        self
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }
}

/// Validate and shape a request into a queueable task plus its
/// acknowledgement text. The error is the player-facing rejection.
pub fn validate(
    world: &World,
    catalogs: &Catalogs,
    request: &CommandRequest,
) -> Result<(Task, String), String> {
    if !world.users.contains_key(&request.actor_id) {
        return Err("You have not quacked yet.".to_string());
    }
    if request.amount < 1 {
        return Err("Nice try.".to_string());
    }
    match request.kind {
        TaskKind::Attack => validate_attack(world, catalogs, request),
        TaskKind::Defend => validate_defend(world, catalogs, request),
        TaskKind::Siege => validate_siege(world, catalogs, request),
        TaskKind::SallyOut => validate_sallyout(world, catalogs, request),
        TaskKind::Move => validate_move(world, catalogs, request),
        TaskKind::Hire => validate_hire(world, catalogs, request),
        TaskKind::Upgrade => validate_upgrade(world, catalogs, request),
        TaskKind::Build => validate_build(world, catalogs, request),
    }
}

fn task_from(request: &CommandRequest) -> Task {
    Task {
        user_id: request.actor_id,
        kind: request.kind,
        item: request.item.clone(),
        location_id: request.location_id,
        amount: request.amount,
        time_remaining: 1,
        target_land_id: request.target_land_id,
    }
}

fn source_land<'a>(world: &'a World, request: &CommandRequest) -> Result<&'a Land, String> {
    world
        .land(request.location_id)
        .ok_or_else(|| "Land not found.".to_string())
}

fn target_land<'a>(world: &'a World, request: &CommandRequest) -> Result<&'a Land, String> {
    request
        .target_land_id
        .and_then(|id| world.land(id))
        .ok_or_else(|| "Target land doesn't exist.".to_string())
}

fn require_troops(
    land: &Land,
    request: &CommandRequest,
    shortfall: &str,
) -> Result<ArmyKind, String> {
    land.source_army(&request.item, request.actor_id, request.amount)
        .ok_or_else(|| shortfall.to_string())
}

fn require_ownership(world: &World, request: &CommandRequest) -> Result<(), String> {
    let owns = world
        .user(request.actor_id)
        .is_some_and(|u| u.land_ids.contains(&request.location_id));
    if owns {
        Ok(())
    } else {
        Err("That land doesn't belong to you.".to_string())
    }
}

fn require_not_surrounded(catalogs: &Catalogs, land: &Land) -> Result<(), String> {
    if is_surrounded(land, catalogs) {
        Err(format!(
            "You cannot move troops out of {} because it is fully surrounded.",
            land.name
        ))
    } else {
        Ok(())
    }
}

// --- Battle and movement verbs --------------------------------------------

fn validate_attack(
    world: &World,
    catalogs: &Catalogs,
    request: &CommandRequest,
) -> Result<(Task, String), String> {
    let land = source_land(world, request)?;
    let target = target_land(world, request)?;
    require_troops(
        land,
        request,
        "You don't have enough of that troop from that location to send on an attack.",
    )?;
    check_hostile_target(world, "attack", request.actor_id, target.owner_id)?;
    if request.target_land_id != Some(request.location_id) {
        require_not_surrounded(catalogs, land)?;
    }
    check_season_mobility(
        catalogs,
        world.config.current_season,
        &request.item,
        MobilityGate::Attack,
        &land.name,
    )?;
    let ack = format!(
        "{} {}s were sent to attack {}.",
        request.amount, request.item, target.name
    );
    Ok((task_from(request), ack))
}

fn validate_defend(
    world: &World,
    catalogs: &Catalogs,
    request: &CommandRequest,
) -> Result<(Task, String), String> {
    let land = source_land(world, request)?;
    let target = target_land(world, request)?;
    require_troops(
        land,
        request,
        "You don't have enough of that troop from that location to send on an attack.",
    )?;
    if request.target_land_id == Some(request.location_id) {
        return Err(
            "You don't need to use this command for troops in the garrison of a land being attacked."
                .to_string(),
        );
    }
    require_not_surrounded(catalogs, land)?;
    check_season_mobility(
        catalogs,
        world.config.current_season,
        &request.item,
        MobilityGate::Attack,
        &land.name,
    )?;
    let ack = format!(
        "{} {}s were sent to defend {}.",
        request.amount, request.item, target.name
    );
    Ok((task_from(request), ack))
}

fn validate_siege(
    world: &World,
    catalogs: &Catalogs,
    request: &CommandRequest,
) -> Result<(Task, String), String> {
    let land = source_land(world, request)?;
    let target = target_land(world, request)?;
    require_troops(
        land,
        request,
        "You don't have enough of that troop from that location to send to the siege camp.",
    )?;
    check_hostile_target(world, "siege", request.actor_id, target.owner_id)?;
    require_not_surrounded(catalogs, land)?;
    check_season_mobility(
        catalogs,
        world.config.current_season,
        &request.item,
        MobilityGate::Move,
        &land.name,
    )?;
    let ack = format!(
        "{} {}s were sent to siege {}.",
        request.amount, request.item, target.name
    );
    Ok((task_from(request), ack))
}

fn validate_sallyout(
    world: &World,
    catalogs: &Catalogs,
    request: &CommandRequest,
) -> Result<(Task, String), String> {
    let land = source_land(world, request)?;
    let target = target_land(world, request)?;
    require_troops(
        land,
        request,
        "You don't have enough of that troop from that location to send on an attack.",
    )?;
    if request.target_land_id != Some(request.location_id) {
        require_not_surrounded(catalogs, land)?;
    }
    check_season_mobility(
        catalogs,
        world.config.current_season,
        &request.item,
        MobilityGate::Move,
        &land.name,
    )?;
    let ack = format!(
        "{} {}s were sent to attack the siege camp at {}.",
        request.amount, request.item, target.name
    );
    Ok((task_from(request), ack))
}

fn validate_move(
    world: &World,
    catalogs: &Catalogs,
    request: &CommandRequest,
) -> Result<(Task, String), String> {
    let land = source_land(world, request)?;
    let target = target_land(world, request)?;
    require_troops(
        land,
        request,
        &format!(
            "You don't have enough of that troop from that location to send to {}.",
            target.name
        ),
    )?;
    if request.target_land_id == Some(request.location_id) {
        return Err("The developers stopped you from taking a useless action.".to_string());
    }
    if !can_move_to(world, request.actor_id, target.owner_id) {
        return Err(
            "You can only move troops to lands that belong to you, your liege, \
             a vassal of your liege, or your vassal."
                .to_string(),
        );
    }
    require_not_surrounded(catalogs, land)?;
    if is_surrounded(target, catalogs) {
        return Err(format!(
            "You cannot move troops into {} because it is fully surrounded.",
            target.name
        ));
    }
    check_season_mobility(
        catalogs,
        world.config.current_season,
        &request.item,
        MobilityGate::Move,
        &land.name,
    )?;
    let ack = format!(
        "{} {}s were sent to {}.",
        request.amount, request.item, target.name
    );
    Ok((task_from(request), ack))
}

// --- Production verbs -----------------------------------------------------

fn validate_hire(
    world: &World,
    catalogs: &Catalogs,
    request: &CommandRequest,
) -> Result<(Task, String), String> {
    if is_template(&request.item) {
        return Err("Troop not found.".to_string());
    }
    let troop = catalogs
        .troop(&request.item)
        .ok_or("Troop not found.")?;
    let land = source_land(world, request)?;
    require_ownership(world, request)?;
    if troop.requires_species_match && troop.species != land.species {
        return Err("You can't hire that troop there.".to_string());
    }
    if troop.from_upgrade_only {
        return Err("That troop requires that you upgrade from a lower tier.".to_string());
    }
    let ack = format!(
        "You have started to hire {} {}s in {}.",
        request.amount, request.item, land.name
    );
    Ok((task_from(request), ack))
}

fn validate_upgrade(
    world: &World,
    catalogs: &Catalogs,
    request: &CommandRequest,
) -> Result<(Task, String), String> {
    let troop = catalogs
        .troop(&request.item)
        .ok_or("Troop not found.")?;
    let land = source_land(world, request)?;
    require_ownership(world, request)?;
    if troop.upgrades_to.is_none() {
        return Err("That troop can't be upgraded.".to_string());
    }
    if !land
        .garrison
        .get(&request.item, request.actor_id)
        .is_some_and(|u| u.amount >= request.amount)
    {
        return Err(format!(
            "You don't have enough of that troop to upgrade {} of them.",
            request.amount
        ));
    }
    let ack = format!(
        "You have started to upgrade {} {}s in {}.",
        request.amount, request.item, land.name
    );
    Ok((task_from(request), ack))
}

fn validate_build(
    world: &World,
    catalogs: &Catalogs,
    request: &CommandRequest,
) -> Result<(Task, String), String> {
    let building = match catalogs.building(&request.item) {
        Some(b) if b.enabled => b,
        _ => return Err("Building not found.".to_string()),
    };
    let land = source_land(world, request)?;
    require_ownership(world, request)?;
    if land.buildings.iter().any(|b| *b == request.item) {
        return Err("That building has already been built there.".to_string());
    }
    if building.from_upgrade_only {
        let satisfied = land.buildings.iter().any(|name| {
            catalogs
                .building(name)
                .is_some_and(|b| b.upgrades_to.as_deref() == Some(request.item.as_str()))
        });
        if !satisfied {
            return Err(
                "That building needs to be built by upgrading a lower tier one.".to_string(),
            );
        }
    }
    let mut task = task_from(request);
    task.time_remaining = building.construction_time;
    let ack = format!(
        "You have started building a {} at {}.",
        request.item, land.name
    );
    Ok((task, ack))
}
