use std::collections::BTreeMap;

use rand::Rng;

use crate::model::{LandId, UserId};

use super::battle::Coalition;
use super::context::TickContext;

/// Resolve a total defeat of the defense: burn part of the building stock,
/// hand the land to the strongest surviving attacker, and promote the siege
/// camp to the new garrison. Returns the lines appended to the battle
/// report.
///
/// Ties on the surviving troop count break to the lowest user id.
pub fn resolve_conquest(ctx: &mut TickContext, land_id: LandId, attackers: &Coalition) -> String {
    let season = ctx.season();
    let mut message = String::new();

    // Strongest surviving attacker. BTreeMap iteration is id-ascending, so
    // requiring a strictly greater total keeps the lowest id on a tie.
    let mut totals: BTreeMap<UserId, u32> = BTreeMap::new();
    for company in &attackers.companies {
        *totals.entry(company.owner_id).or_default() += company.amount;
    }
    let mut winner: Option<(UserId, u32)> = None;
    for (user_id, total) in totals {
        if total > 0 && winner.is_none_or(|(_, best)| total > best) {
            winner = Some((user_id, total));
        }
    }

    // Building destruction: the attackers' pooled appetite for burning,
    // weighted by surviving troop counts.
    let total_troops = attackers.total();
    let mut destroy_weight = 0.0;
    for company in &attackers.companies {
        let percent = ctx
            .catalogs
            .troop_species(&company.troop_name)
            .map_or(0.0, |s| s.percent_buildings_destroyed_on_conquest(season));
        destroy_weight += percent * f64::from(company.amount);
    }
    let building_count = ctx
        .world
        .land(land_id)
        .map_or(0, |land| land.buildings.len());
    let destroyed = if total_troops > 0 {
        (building_count as f64 * destroy_weight / f64::from(total_troops)).round() as usize
    } else {
        0
    };

    for _ in 0..destroyed {
        let Some(land) = ctx.world.land_mut(land_id) else {
            break;
        };
        if land.buildings.is_empty() {
            break;
        }
        let index = ctx.rng.random_range(0..land.buildings.len());
        let razed = land.buildings.remove(index);
        if let Some(remains) = ctx
            .catalogs
            .building(&razed)
            .and_then(|b| b.demolished_to)
        {
            ctx.world
                .land_mut(land_id)
                .expect("checked above")
                .buildings
                .push(remains);
        }
    }

    if let Some((new_owner, _)) = winner
        && ctx.world.users.contains_key(&new_owner)
    {
        ctx.world.transfer_land(land_id, new_owner);
        let land_name = ctx.world.land(land_id).expect("transferred").name.clone();
        message.push_str(&format!(
            "\n\n{land_name} has been taken by user {new_owner}."
        ));
    }
    message.push_str(&format!("\n{destroyed} buildings were burned."));

    // The besiegers walk in: the camp becomes the garrison.
    if let Some(land) = ctx.world.land_mut(land_id) {
        land.garrison = std::mem::take(&mut land.siege_camp);
    }

    message
}
