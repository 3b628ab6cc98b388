//! Coalition assembly and the stochastic battle resolver behind the two
//! battle phases.
//!
//! A coalition is the merged set of units from every queued command sharing
//! a battle target. Companies keep a reference to the army they were drawn
//! from; the troops never relocate for a battle — losses are reconciled
//! back into the source armies once the fighting ends.

use std::collections::BTreeSet;
use std::fmt;

use rand::{Rng, RngCore};

use crate::catalog::Catalogs;
use crate::model::{ArmyKind, GlobalConfig, LandId, Season, Task, TaskKind, UserId};

use super::conquest;
use super::context::TickContext;
use super::encirclement::is_surrounded;
use super::legality::{MobilityGate, check_hostile_target, check_season_mobility};
use super::queue::{self, Outcome};

// --- Coalitions -----------------------------------------------------------

/// One contribution to a coalition: `committed` troops drawn (on paper)
/// from a specific army. `amount` drops as casualties land; the company is
/// never removed so the loss stays accountable.
#[derive(Debug, Clone)]
pub struct Company {
    pub troop_name: String,
    pub owner_id: UserId,
    pub committed: u32,
    pub amount: u32,
    pub source_land: LandId,
    pub source_army: ArmyKind,
}

#[derive(Debug, Clone, Default)]
pub struct Coalition {
    pub companies: Vec<Company>,
}

impl Coalition {
    pub fn total(&self) -> u32 {
        self.companies.iter().map(|c| c.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn push(
        &mut self,
        troop_name: impl Into<String>,
        owner_id: UserId,
        amount: u32,
        source_land: LandId,
        source_army: ArmyKind,
    ) {
        self.companies.push(Company {
            troop_name: troop_name.into(),
            owner_id,
            committed: amount,
            amount,
            source_land,
            source_army,
        });
    }

    pub fn owner_ids(&self) -> BTreeSet<UserId> {
        self.companies.iter().map(|c| c.owner_id).collect()
    }

    /// Subtract every company's losses from the army it was drawn from.
    pub fn apply_losses(&self, ctx: &mut TickContext) {
        for company in &self.companies {
            let lost = company.committed - company.amount;
            if lost == 0 {
                continue;
            }
            if let Some(land) = ctx.world.land_mut(company.source_land) {
                land.army_mut(company.source_army).remove_up_to(
                    &company.troop_name,
                    company.owner_id,
                    lost,
                );
            }
        }
    }

    fn snapshot(&self) -> Vec<CompanyState> {
        self.companies
            .iter()
            .filter(|c| c.amount > 0)
            .map(|c| CompanyState {
                troop_name: c.troop_name.clone(),
                owner_id: c.owner_id,
                amount: c.amount,
            })
            .collect()
    }
}

// --- Battle report --------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyState {
    pub troop_name: String,
    pub owner_id: UserId,
    pub amount: u32,
}

/// One resolved round. The die totals (`*_score`) are carried for the
/// record but only the spite counts drive casualties; wiring the totals
/// into damage is a deliberate policy choice that has not been made.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub attacker_score: i64,
    pub defender_score: i64,
    pub attacker_spite: i64,
    pub defender_spite: i64,
    pub attackers: Vec<CompanyState>,
    pub defenders: Vec<CompanyState>,
}

#[derive(Debug, Clone)]
pub struct BattleReport {
    pub location: String,
    pub opening_attackers: Vec<CompanyState>,
    pub opening_defenders: Vec<CompanyState>,
    pub rounds: Vec<RoundReport>,
}

fn write_army(f: &mut fmt::Formatter<'_>, companies: &[CompanyState]) -> fmt::Result {
    for company in companies {
        writeln!(
            f,
            "• {} {} (user {})",
            company.amount, company.troop_name, company.owner_id
        )?;
    }
    Ok(())
}

impl fmt::Display for BattleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "__**Battle Report @ {}**__", self.location)?;
        writeln!(f, "**Round 0**")?;
        writeln!(f, "Attackers:")?;
        write_army(f, &self.opening_attackers)?;
        writeln!(f, "Defenders:")?;
        write_army(f, &self.opening_defenders)?;
        for (i, round) in self.rounds.iter().enumerate() {
            writeln!(f, "\n**Round {}**", i + 1)?;
            writeln!(f, "Attackers:")?;
            write_army(f, &round.attackers)?;
            writeln!(f, "Defenders:")?;
            write_army(f, &round.defenders)?;
        }
        Ok(())
    }
}

// --- Resolver -------------------------------------------------------------

struct DiceScore {
    score: i64,
    spite: i64,
}

/// One d6 per point of pooled ATK; fives and sixes feed the spite counter.
fn battle_score(rng: &mut dyn RngCore, atk: i64) -> DiceScore {
    let mut score = 0;
    let mut spite = 0;
    for _ in 0..atk.max(0) {
        let die = rng.random_range(1..=6);
        score += die;
        if die >= 5 {
            spite += 1;
        }
    }
    DiceScore { score, spite }
}

fn pooled_atk(catalogs: &Catalogs, season: Season, coalition: &Coalition) -> i64 {
    coalition
        .companies
        .iter()
        .filter_map(|c| {
            let troop = catalogs.troop(&c.troop_name)?;
            let bonus = catalogs
                .species(&troop.species)
                .map_or(0, |s| s.bonus_atk_per_troop(season));
            Some((troop.atk + bonus) * i64::from(c.amount))
        })
        .sum()
}

fn pooled_def(catalogs: &Catalogs, season: Season, coalition: &Coalition) -> i64 {
    coalition
        .companies
        .iter()
        .filter_map(|c| {
            let troop = catalogs.troop(&c.troop_name)?;
            let bonus = catalogs
                .species(&troop.species)
                .map_or(0, |s| s.bonus_def_per_troop(season));
            Some((troop.ap + bonus) * i64::from(c.amount))
        })
        .sum()
}

fn pooled_hp(catalogs: &Catalogs, season: Season, coalition: &Coalition) -> i64 {
    coalition
        .companies
        .iter()
        .filter_map(|c| {
            let troop = catalogs.troop(&c.troop_name)?;
            let bonus = catalogs
                .species(&troop.species)
                .map_or(0, |s| s.bonus_hp_per_troop(season));
            Some((troop.hp + bonus) * i64::from(c.amount))
        })
        .sum()
}

/// Remove one troop from a uniformly-random surviving company.
fn remove_casualty(rng: &mut dyn RngCore, coalition: &mut Coalition) {
    let survivors: Vec<usize> = coalition
        .companies
        .iter()
        .enumerate()
        .filter(|(_, c)| c.amount > 0)
        .map(|(i, _)| i)
        .collect();
    if survivors.is_empty() {
        return;
    }
    let target = survivors[rng.random_range(0..survivors.len())];
    coalition.companies[target].amount -= 1;
}

/// Fight until either side's casualty fraction reaches its configured cap.
///
/// Each round both sides roll dice per pooled ATK point. A side's HP pool
/// absorbs the opponent's full spite (floored at zero); whatever spite
/// overflows DEF + HP converts into individual casualty rolls. HP pools are
/// computed once up front — building HP (capped, scaled by the initial
/// defender count) included — and only ever shrink. Building ATK/DEF
/// bonuses rescale every round against the current defender count.
///
/// Both coalitions must be non-empty; the caller reports the degenerate
/// cases instead of fighting them.
pub fn resolve_battle(
    catalogs: &Catalogs,
    config: &GlobalConfig,
    rng: &mut dyn RngCore,
    location: &str,
    fortifications: &[String],
    attackers: &mut Coalition,
    defenders: &mut Coalition,
) -> BattleReport {
    let season = config.current_season;
    let initial_attackers = attackers.total();
    let initial_defenders = defenders.total();
    assert!(
        initial_attackers > 0 && initial_defenders > 0,
        "resolve_battle: both coalitions must be non-empty"
    );

    let mut attacker_hp = pooled_hp(catalogs, season, attackers);
    let mut defender_hp = pooled_hp(catalogs, season, defenders);
    for name in fortifications {
        if let Some(building) = catalogs.building(name) {
            defender_hp += building.hp_bonus_for(initial_defenders);
        }
    }

    let mut report = BattleReport {
        location: location.to_string(),
        opening_attackers: attackers.snapshot(),
        opening_defenders: defenders.snapshot(),
        rounds: Vec::new(),
    };

    loop {
        let attacker_casualties =
            1.0 - f64::from(attackers.total()) / f64::from(initial_attackers);
        let defender_casualties =
            1.0 - f64::from(defenders.total()) / f64::from(initial_defenders);
        if attacker_casualties >= config.max_casualties_attackers
            || defender_casualties >= config.max_casualties_defenders
        {
            break;
        }

        let current_defenders = defenders.total();
        let attacker_atk = pooled_atk(catalogs, season, attackers);
        let attacker_def = pooled_def(catalogs, season, attackers);
        let mut defender_atk = pooled_atk(catalogs, season, defenders);
        let mut defender_def = pooled_def(catalogs, season, defenders);
        for name in fortifications {
            if let Some(building) = catalogs.building(name) {
                defender_atk += building.atk_bonus_for(current_defenders);
                defender_def += building.ap_bonus_for(current_defenders);
            }
        }

        // Neither side can ever roll a die again: the field is frozen.
        if attacker_atk <= 0 && defender_atk <= 0 {
            break;
        }

        let attacker_roll = battle_score(rng, attacker_atk);
        let defender_roll = battle_score(rng, defender_atk);

        // DEF plus the pre-round HP pool shields against casualties; the HP
        // pool itself soaks the full spite.
        let attacker_casualty_rolls = defender_roll.spite - (attacker_def + attacker_hp);
        let defender_casualty_rolls = attacker_roll.spite - (defender_def + defender_hp);
        defender_hp = (defender_hp - attacker_roll.spite).max(0);
        attacker_hp = (attacker_hp - defender_roll.spite).max(0);

        for _ in 0..defender_casualty_rolls.max(0) {
            remove_casualty(rng, defenders);
        }
        for _ in 0..attacker_casualty_rolls.max(0) {
            remove_casualty(rng, attackers);
        }

        report.rounds.push(RoundReport {
            attacker_score: attacker_roll.score,
            defender_score: defender_roll.score,
            attacker_spite: attacker_roll.spite,
            defender_spite: defender_roll.spite,
            attackers: attackers.snapshot(),
            defenders: defenders.snapshot(),
        });
    }

    report
}

// --- Phase 2: attack/defend battles ---------------------------------------

/// Resolve every queued assault. For each attack target, all defend tasks
/// on that target join the defender coalition (and pull the target's siege
/// camp into the attacker coalition, exactly once), the garrison always
/// defends, and every attack task on the target joins the attackers. All
/// matched tasks are consumed.
pub fn run_assault_phase(ctx: &mut TickContext) {
    reject_unreachable_targets(ctx, &[TaskKind::Attack, TaskKind::Defend]);
    while let Some(target_id) = next_target(ctx, TaskKind::Attack) {
        resolve_assault_at(ctx, target_id);
    }
}

/// Drop battle tasks whose target is missing or unset before grouping by
/// target.
fn reject_unreachable_targets(ctx: &mut TickContext, kinds: &[TaskKind]) {
    queue::drain(ctx, |ctx, task| {
        if !kinds.contains(&task.kind) {
            return Outcome::Deferred(task);
        }
        match task.target_land_id {
            Some(id) if ctx.world.land(id).is_some() => Outcome::Deferred(task),
            _ => Outcome::Rejected("Target land doesn't exist.".to_string()),
        }
    });
}

fn next_target(ctx: &TickContext, kind: TaskKind) -> Option<LandId> {
    ctx.world
        .config
        .task_queue
        .iter()
        .find(|t| t.kind == kind)
        .and_then(|t| t.target_land_id)
}

fn resolve_assault_at(ctx: &mut TickContext, target_id: LandId) {
    let mut attackers = Coalition::default();
    let mut defenders = Coalition::default();
    let mut include_siege_camp = false;
    let mut participants: BTreeSet<UserId> = BTreeSet::new();

    let (target_name, target_owner) = {
        let target = ctx.world.land(target_id).expect("pre-checked");
        (target.name.clone(), target.owner_id)
    };

    // Defend commands on this target.
    queue::drain(ctx, |ctx, task| {
        if task.kind != TaskKind::Defend || task.target_land_id != Some(target_id) {
            return Outcome::Deferred(task);
        }
        match admit_defender(ctx, &task, target_owner) {
            Ok(source) => {
                participants.insert(task.user_id);
                defenders.push(
                    task.item.clone(),
                    task.user_id,
                    task.amount,
                    task.location_id,
                    source,
                );
                include_siege_camp = true;
                Outcome::Consumed
            }
            Err(reason) => Outcome::Rejected(reason),
        }
    });

    // The garrison always stands with the defenders.
    {
        let target = ctx.world.land(target_id).expect("pre-checked");
        for unit in &target.garrison.0 {
            defenders.push(
                unit.troop_name.clone(),
                unit.owner_id,
                unit.amount,
                target_id,
                ArmyKind::Garrison,
            );
        }
        if include_siege_camp {
            for unit in &target.siege_camp.0 {
                attackers.push(
                    unit.troop_name.clone(),
                    unit.owner_id,
                    unit.amount,
                    target_id,
                    ArmyKind::SiegeCamp,
                );
            }
        }
    }

    // Attack commands on this target.
    queue::drain(ctx, |ctx, task| {
        if task.kind != TaskKind::Attack || task.target_land_id != Some(target_id) {
            return Outcome::Deferred(task);
        }
        // The camp already fights as a whole; a second commitment of camp
        // troops would double-count them.
        if include_siege_camp && task.location_id == target_id {
            return Outcome::Consumed;
        }
        match admit_attacker(ctx, &task, target_id) {
            Ok(source) => {
                participants.insert(task.user_id);
                attackers.push(
                    task.item.clone(),
                    task.user_id,
                    task.amount,
                    task.location_id,
                    source,
                );
                Outcome::Consumed
            }
            Err(reason) => Outcome::Rejected(reason),
        }
    });

    participants.extend(attackers.owner_ids());
    participants.extend(defenders.owner_ids());

    if attackers.is_empty() || defenders.is_empty() {
        for user_id in participants {
            ctx.notify(
                user_id,
                format!("The battle at {target_name} was called off: not enough troops."),
            );
        }
        return;
    }

    let fortifications = ctx.world.land(target_id).expect("pre-checked").buildings.clone();
    let config = ctx.world.config.clone();
    let report = resolve_battle(
        ctx.catalogs,
        &config,
        ctx.rng,
        &target_name,
        &fortifications,
        &mut attackers,
        &mut defenders,
    );
    attackers.apply_losses(ctx);
    defenders.apply_losses(ctx);

    let mut message = report.to_string();
    if defenders.total() == 0 {
        message.push_str(&conquest::resolve_conquest(ctx, target_id, &attackers));
    }
    for user_id in participants {
        ctx.notify(user_id, message.clone());
    }
}

fn admit_defender(
    ctx: &TickContext,
    task: &Task,
    target_owner: UserId,
) -> Result<ArmyKind, String> {
    let land = ctx.world.land(task.location_id).ok_or("Land not found.")?;
    let source = land
        .source_army(&task.item, task.user_id, task.amount)
        .ok_or("You don't have enough of that troop from that location to send on an attack.")?;
    if target_owner == task.user_id {
        return Err(
            "You don't need to use this command for troops in the garrison of a land being attacked."
                .to_string(),
        );
    }
    check_season_mobility(
        ctx.catalogs,
        ctx.world.config.current_season,
        &task.item,
        MobilityGate::Attack,
        &land.name,
    )?;
    if is_surrounded(land, ctx.catalogs) {
        return Err(format!(
            "You cannot move troops out of {} because it is fully surrounded.",
            land.name
        ));
    }
    Ok(source)
}

fn admit_attacker(ctx: &TickContext, task: &Task, target_id: LandId) -> Result<ArmyKind, String> {
    let land = ctx.world.land(task.location_id).ok_or("Land not found.")?;
    let source = land
        .source_army(&task.item, task.user_id, task.amount)
        .ok_or("You don't have enough of that troop from that location to send on an attack.")?;
    let target_owner = ctx.world.land(target_id).expect("pre-checked").owner_id;
    check_hostile_target(ctx.world, "attack", task.user_id, target_owner)?;
    check_season_mobility(
        ctx.catalogs,
        ctx.world.config.current_season,
        &task.item,
        MobilityGate::Attack,
        &land.name,
    )?;
    // Attacking out of your own encircled land is the self-siege exception.
    if task.location_id != target_id && is_surrounded(land, ctx.catalogs) {
        return Err(format!(
            "You cannot move troops out of {} because it is fully surrounded.",
            land.name
        ));
    }
    Ok(source)
}

// --- Phase 3: sally-out battles -------------------------------------------

/// The sallying troops storm the camp: sally-out tasks form the attacker
/// coalition and the target's entire siege camp defends. The garrison is
/// not involved, and no fortification bonuses apply in the camp fight.
pub fn run_sallyout_phase(ctx: &mut TickContext) {
    reject_unreachable_targets(ctx, &[TaskKind::SallyOut]);
    while let Some(target_id) = next_target(ctx, TaskKind::SallyOut) {
        resolve_sallyout_at(ctx, target_id);
    }
}

fn resolve_sallyout_at(ctx: &mut TickContext, target_id: LandId) {
    let mut attackers = Coalition::default();
    let mut participants: BTreeSet<UserId> = BTreeSet::new();
    let target_name = ctx.world.land(target_id).expect("pre-checked").name.clone();

    queue::drain(ctx, |ctx, task| {
        if task.kind != TaskKind::SallyOut || task.target_land_id != Some(target_id) {
            return Outcome::Deferred(task);
        }
        match admit_sallier(ctx, &task, target_id) {
            Ok(source) => {
                participants.insert(task.user_id);
                attackers.push(
                    task.item.clone(),
                    task.user_id,
                    task.amount,
                    task.location_id,
                    source,
                );
                Outcome::Consumed
            }
            Err(reason) => Outcome::Rejected(reason),
        }
    });

    let mut defenders = Coalition::default();
    for unit in &ctx.world.land(target_id).expect("pre-checked").siege_camp.0 {
        defenders.push(
            unit.troop_name.clone(),
            unit.owner_id,
            unit.amount,
            target_id,
            ArmyKind::SiegeCamp,
        );
    }

    participants.extend(attackers.owner_ids());
    participants.extend(defenders.owner_ids());

    if attackers.is_empty() || defenders.is_empty() {
        for user_id in participants {
            ctx.notify(
                user_id,
                format!("The sally at {target_name} was called off: not enough troops."),
            );
        }
        return;
    }

    let config = ctx.world.config.clone();
    let report = resolve_battle(
        ctx.catalogs,
        &config,
        ctx.rng,
        &target_name,
        &[],
        &mut attackers,
        &mut defenders,
    );
    attackers.apply_losses(ctx);
    defenders.apply_losses(ctx);

    let message = report.to_string();
    for user_id in participants {
        ctx.notify(user_id, message.clone());
    }
}

fn admit_sallier(ctx: &TickContext, task: &Task, target_id: LandId) -> Result<ArmyKind, String> {
    let land = ctx.world.land(task.location_id).ok_or("Land not found.")?;
    let source = land
        .source_army(&task.item, task.user_id, task.amount)
        .ok_or("You don't have enough of that troop from that location to send on an attack.")?;
    check_season_mobility(
        ctx.catalogs,
        ctx.world.config.current_season,
        &task.item,
        MobilityGate::Move,
        &land.name,
    )?;
    if task.location_id != target_id && is_surrounded(land, ctx.catalogs) {
        return Err(format!(
            "You cannot move troops out of {} because it is fully surrounded.",
            land.name
        ));
    }
    Ok(source)
}
