//! The per-day economic update: land income, quality drift, liege tax,
//! upkeep (with whole-unit desertion on default), and the end-of-day
//! bookkeeping that resets streaks, ranks, safety counters and the
//! exchange rate.

use rand::Rng;

use crate::model::{ArmyKind, LandId, UserId};

use super::context::TickContext;
use super::encirclement::is_surrounded;

/// Run the whole economic pass for every user and land. Executes before the
/// command phases so the day's income is available to pay for them.
pub fn run_economy(ctx: &mut TickContext) {
    let user_ids: Vec<UserId> = ctx.world.users.keys().copied().collect();
    for user_id in &user_ids {
        collect_land_income(ctx, *user_id);
    }
    for user_id in &user_ids {
        pay_liege_tax(ctx, *user_id);
    }
    pay_upkeep(ctx);
    for user_id in &user_ids {
        reset_daily_bookkeeping(ctx, *user_id);
    }
}

// --- Income and quality ---------------------------------------------------

fn collect_land_income(ctx: &mut TickContext, user_id: UserId) {
    let season = ctx.season();
    let Some(user) = ctx.world.user(user_id) else {
        return;
    };
    let land_ids: Vec<LandId> = user.land_ids.iter().copied().collect();
    let land_count = land_ids.len();
    let support = i64::from(user.support);
    let quacked_today = user.quacked_today;

    let improve_p = ctx.world.config.quality_improvement_probability;
    let decay_p = ctx.world.config.quality_decay_probability;

    for land_id in land_ids {
        let (quality, species, max_quality, surrounded) = {
            let Some(land) = ctx.world.land(land_id) else {
                continue;
            };
            let species = ctx.catalogs.species(&land.species).unwrap_or_default();
            // maxQuality is derived state: a base plus whatever the
            // standing buildings grant, refreshed every day.
            let mut max_quality = ctx.world.config.base_max_quality;
            for building_name in &land.buildings {
                if let Some(building) = ctx.catalogs.building(building_name) {
                    max_quality += building.max_quality_bonus;
                }
            }
            (
                land.quality,
                species,
                max_quality,
                is_surrounded(land, ctx.catalogs),
            )
        };

        let mut income = i64::from(quality)
            + (species.bonus_income_per_quality(season) * f64::from(quality)).floor() as i64;
        income += ctx.world.config.support_income_bonus * support;
        if land_count > ctx.world.config.land_limit {
            let excess = (land_count - ctx.world.config.land_limit) as f64;
            let penalty = ctx.world.config.land_income_penalty_percent_per_land;
            income -= (income as f64 * penalty * excess) as i64;
        }
        if surrounded {
            income -= (income as f64 * species.income_penalty_percent_in_siege(season)) as i64;
        }
        let income = income.max(0);

        // Quality drifts up for the diligent and down for the silent.
        let mut quality = quality;
        if quacked_today {
            if quality < max_quality && roll(ctx, improve_p) {
                quality += 1;
            }
            quality += species.land_quality_increase_per_turn(season);
        } else if quality > 0 && roll(ctx, decay_p) {
            quality -= 1;
        }
        let quality = quality.min(max_quality);

        if let Some(user) = ctx.world.users.get_mut(&user_id) {
            user.quackerinos += income;
        }
        if let Some(land) = ctx.world.land_mut(land_id) {
            land.quality = quality;
            land.max_quality = max_quality;
        }
    }
}

fn roll(ctx: &mut TickContext, probability: f64) -> bool {
    probability > 0.0 && ctx.rng.random_range(0.0..1.0) < probability
}

// --- Liege tax ------------------------------------------------------------

/// After income lands, a sworn vassal owes their liege a per-land tax,
/// capped at whatever the vassal can actually pay.
fn pay_liege_tax(ctx: &mut TickContext, user_id: UserId) {
    let Some(user) = ctx.world.user(user_id) else {
        return;
    };
    let Some(liege_id) = user.liege_id else {
        return;
    };
    if liege_id == user_id || !ctx.world.users.contains_key(&liege_id) {
        return;
    }
    let rate = ctx
        .world
        .user(liege_id)
        .map_or(0, |l| l.tax_per_vassal_land)
        .max(0);
    let owed = rate * user.land_ids.len() as i64;
    let tax = owed.clamp(0, user.quackerinos.max(0));
    if tax == 0 {
        return;
    }
    ctx.world.users.get_mut(&user_id).expect("checked above").quackerinos -= tax;
    ctx.world.users.get_mut(&liege_id).expect("checked above").quackerinos += tax;
}

// --- Upkeep ---------------------------------------------------------------

/// Every stationed unit bills its owner. Troops on the offensive (in a
/// siege camp) cost extra per the species' seasonal surcharge. An owner who
/// cannot cover a unit loses the whole unit; partial pay is not a thing.
fn pay_upkeep(ctx: &mut TickContext) {
    let season = ctx.season();
    let land_ids: Vec<LandId> = ctx.world.lands.keys().copied().collect();
    for land_id in land_ids {
        for kind in [ArmyKind::Garrison, ArmyKind::SiegeCamp] {
            let (land_name, units) = {
                let land = ctx.world.land(land_id).expect("iterating known ids");
                (land.name.clone(), land.army(kind).0.clone())
            };
            for unit in units {
                let Some(troop) = ctx.catalogs.troop(&unit.troop_name) else {
                    continue;
                };
                let species = ctx.catalogs.species(&troop.species).unwrap_or_default();
                let mut per_troop =
                    troop.upkeep as f64 * (1.0 - species.upkeep_discount_per_troop(season));
                if kind == ArmyKind::SiegeCamp {
                    per_troop *= 1.0 + species.upkeep_surcharge_percent_in_siege_camp(season);
                }
                let cost = ((per_troop * f64::from(unit.amount)) as i64).max(0);

                let Some(owner) = ctx.world.users.get_mut(&unit.owner_id) else {
                    continue;
                };
                if owner.quackerinos >= cost {
                    owner.quackerinos -= cost;
                } else {
                    ctx.world
                        .land_mut(land_id)
                        .expect("iterating known ids")
                        .army_mut(kind)
                        .remove_up_to(&unit.troop_name, unit.owner_id, unit.amount);
                    tracing::warn!(
                        user = unit.owner_id,
                        land = land_id,
                        troop = %unit.troop_name,
                        amount = unit.amount,
                        "unit disbanded over unpaid upkeep"
                    );
                    ctx.notify(
                        unit.owner_id,
                        format!(
                            "You couldn't pay the upkeep for {} {}s at {}; the whole company has disbanded.",
                            unit.amount, unit.troop_name, land_name
                        ),
                    );
                }
            }
        }
    }
}

// --- End-of-day bookkeeping -----------------------------------------------

fn reset_daily_bookkeeping(ctx: &mut TickContext, user_id: UserId) {
    let rank = {
        let Some(user) = ctx.world.user(user_id) else {
            return;
        };
        ctx.world
            .config
            .rank_for_quacks(user.quacks)
            .map(|r| r.name.clone())
            .unwrap_or_default()
    };
    let user = ctx.world.users.get_mut(&user_id).expect("checked above");
    if !user.quacked_today {
        user.quack_streak = 0;
    }
    user.quacked_today = false;
    user.quack_rank = rank;
    user.safety_count = user.safety_count.saturating_sub(1);
    user.support = 0;
    user.supportee_id = None;
}

// --- Calendar -------------------------------------------------------------

/// Close the day out: re-roll the exchange rate inside its configured range
/// and advance the day counter and season. Runs after the command phases.
pub fn advance_calendar(ctx: &mut TickContext) {
    let (low, high) = ctx.world.config.qq_exchange_rate_range;
    if low <= high {
        ctx.world.config.qq_exchange_rate = ctx.rng.random_range(low..=high);
    }
    ctx.world.config.day_counter += 1;
    if !ctx.world.config.seasons.is_empty() {
        ctx.world.config.current_season = ctx
            .world
            .config
            .season_for_day(ctx.world.config.day_counter);
    }
}
