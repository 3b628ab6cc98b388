//! Interactive verbs that resolve immediately instead of joining the task
//! queue: daily quacks, the quack exchange, payments, homeland founding,
//! demolition, disbanding, support, and the vassalage oaths.

use crate::model::{ArmyKind, Land, LandId, User, UserId};
use crate::notify::Notifier;
use crate::store::WorldStore;

use super::{CommandError, Engine};

impl<S: WorldStore, N: Notifier> Engine<S, N> {
    /// The daily quack. Creates the player record on first use; quacking
    /// twice in one day accomplishes nothing but a sore throat.
    pub fn record_quack(&mut self, user_id: UserId) -> Result<String, CommandError> {
        let mut users = self.store.load_users()?;
        let config = self.store.load_global_config()?;

        if !users.contains_key(&user_id) {
            users.insert(user_id, User::first_quack());
            self.store.save_users(&users)?;
            return Ok("You quacked for the first time!".to_string());
        }
        let user = users.get_mut(&user_id).expect("checked above");
        if user.quacked_today {
            return Ok("You tried to quack but your throat is too sore today.".to_string());
        }
        user.quacked_today = true;
        user.quacks += 1;
        user.quack_streak += 1;

        let mut message = if user.species == "penguin" {
            "Noot noot!".to_string()
        } else {
            "You quacked loudly.".to_string()
        };
        if config.max_quack_streak_length > 0 && user.quack_streak >= config.max_quack_streak_length
        {
            user.quack_streak -= config.max_quack_streak_length;
            user.quacks += config.quack_streak_reward;
            message.push_str(&format!(
                "\nYou finished a streak and got an extra {} quacks.",
                config.quack_streak_reward
            ));
        }
        self.store.save_users(&users)?;
        Ok(message)
    }

    /// Spend unspent quacks on quackerinos at today's exchange rate.
    pub fn buy_quackerinos(&mut self, user_id: UserId, quacks: u64) -> Result<String, CommandError> {
        if quacks < 1 {
            return Err(CommandError::rejected("Nice try."));
        }
        let mut users = self.store.load_users()?;
        let config = self.store.load_global_config()?;
        let user = users
            .get_mut(&user_id)
            .ok_or_else(|| CommandError::rejected("You have not quacked yet."))?;
        if user.unspent_quacks() < quacks {
            return Err(CommandError::rejected("You don't have enough quacks for that."));
        }
        user.spent_quacks += quacks;
        let bought = config.qq_exchange_rate * quacks as i64;
        user.quackerinos += bought;
        let message = format!(
            "You bought {} quackerinos using {} quacks. You now have {} qq and {} unspent quacks.",
            bought,
            quacks,
            user.quackerinos,
            user.unspent_quacks()
        );
        self.store.save_users(&users)?;
        Ok(message)
    }

    /// Hand another player some quackerinos.
    pub fn transfer_quackerinos(
        &mut self,
        from: UserId,
        to: UserId,
        amount: i64,
    ) -> Result<String, CommandError> {
        if amount < 1 {
            return Err(CommandError::rejected("Nice try."));
        }
        let mut users = self.store.load_users()?;
        if !users.contains_key(&from) {
            return Err(CommandError::rejected("You have not quacked yet."));
        }
        if from == to {
            return Err(CommandError::rejected(
                "You can't give quackerinos to yourself.",
            ));
        }
        if !users.contains_key(&to) {
            return Err(CommandError::rejected("Target has not quacked yet."));
        }
        if users[&from].quackerinos < amount {
            return Err(CommandError::rejected(
                "You don't have enough quackerinos for that.",
            ));
        }
        users.get_mut(&from).expect("checked above").quackerinos -= amount;
        users.get_mut(&to).expect("checked above").quackerinos += amount;
        let message = format!(
            "You transferred {} quackerinos to user {}. They now have {} qq and you now have {} qq.",
            amount, to, users[&to].quackerinos, users[&from].quackerinos
        );
        self.store.save_users(&users)?;
        Ok(message)
    }

    /// Found the player's one and only homeland, opening their post-landing
    /// safety grace period.
    pub fn establish_homeland(
        &mut self,
        user_id: UserId,
        name: &str,
        species_name: &str,
    ) -> Result<String, CommandError> {
        let catalogs = self.store.load_catalogs()?;
        let mut world = self.load_world()?;

        if !world.users.contains_key(&user_id) {
            return Err(CommandError::rejected("You have not quacked yet."));
        }
        let species = catalogs
            .species(species_name)
            .ok_or_else(|| CommandError::rejected("Species not found."))?;
        if !species.enabled {
            return Err(CommandError::rejected("This species is not enabled."));
        }
        if world.user(user_id).expect("checked above").homeland_id.is_some() {
            return Err(CommandError::rejected("You already have a homeland."));
        }

        let land_id = world.config.allocate_land_id();
        let mut land = Land::new(name, user_id, species_name);
        land.quality = 1;
        land.max_quality = world.config.base_max_quality;
        world.insert_land(land_id, land);
        let safety_period_days = world.config.safety_period_days;
        {
            let user = world.user_mut(user_id).expect("checked above");
            user.homeland_id = Some(land_id);
            user.species = species_name.to_string();
            user.safety_count = safety_period_days;
        }

        self.commit(&world)?;
        Ok(format!(
            "{name} has been founded as your homeland (land {land_id})."
        ))
    }

    /// Tear a building down immediately for a partial refund.
    pub fn demolish(
        &mut self,
        user_id: UserId,
        location_id: LandId,
        building_name: &str,
    ) -> Result<String, CommandError> {
        let catalogs = self.store.load_catalogs()?;
        let mut world = self.load_world()?;

        if !world.users.contains_key(&user_id) {
            return Err(CommandError::rejected("You have not quacked yet."));
        }
        let building = catalogs
            .building(building_name)
            .ok_or_else(|| CommandError::rejected("Building not found."))?;
        let land = world
            .land(location_id)
            .ok_or_else(|| CommandError::rejected("Land not found."))?;
        if land.owner_id != user_id {
            return Err(CommandError::rejected("That land doesn't belong to you."));
        }
        let Some(position) = land.buildings.iter().position(|b| b == building_name) else {
            return Err(CommandError::rejected(
                "That building has not been built there yet.",
            ));
        };

        let refund = (building.refund_percent * building.cost as f64) as i64;
        let land = world.land_mut(location_id).expect("checked above");
        land.buildings.remove(position);
        let message = if let Some(remains) = building.demolished_to {
            land.buildings.push(remains.clone());
            format!(
                "The {building_name} was demolished into a {remains} and you were refunded {refund} qq."
            )
        } else {
            format!("The {building_name} was destroyed and you were refunded {refund} qq.")
        };
        world.user_mut(user_id).expect("checked above").quackerinos += refund;

        self.commit(&world)?;
        Ok(message)
    }

    /// Release troops from service immediately, with whatever refund the
    /// troop's contract allows.
    pub fn disband(
        &mut self,
        user_id: UserId,
        location_id: LandId,
        troop_name: &str,
        amount: u32,
    ) -> Result<String, CommandError> {
        if amount < 1 {
            return Err(CommandError::rejected("Nice try."));
        }
        let catalogs = self.store.load_catalogs()?;
        let mut world = self.load_world()?;

        if !world.users.contains_key(&user_id) {
            return Err(CommandError::rejected("You have not quacked yet."));
        }
        let troop = catalogs
            .troop(troop_name)
            .ok_or_else(|| CommandError::rejected("Troop not found."))?;
        let land = world
            .land(location_id)
            .ok_or_else(|| CommandError::rejected("Land not found."))?;
        if land.owner_id != user_id {
            return Err(CommandError::rejected("That land doesn't belong to you."));
        }
        if !land
            .garrison
            .get(troop_name, user_id)
            .is_some_and(|u| u.amount >= amount)
        {
            return Err(CommandError::rejected(format!(
                "You don't have enough of that troop to disband {amount} of them."
            )));
        }

        world
            .land_mut(location_id)
            .expect("checked above")
            .garrison
            .remove(troop_name, user_id, amount);
        let refund =
            (troop.refund_percent_on_disband * troop.cost as f64 * f64::from(amount)) as i64;
        world.user_mut(user_id).expect("checked above").quackerinos += refund;

        self.commit(&world)?;
        Ok(format!(
            "{amount} {troop_name}s were disbanded and {refund} qq were refunded."
        ))
    }

    /// Bank one point of support behind another player for today; it pays
    /// out as bonus land income at the next tick.
    pub fn support(&mut self, user_id: UserId, target_id: UserId) -> Result<String, CommandError> {
        let mut users = self.store.load_users()?;
        if !users.contains_key(&user_id) {
            return Err(CommandError::rejected("You have not quacked yet."));
        }
        if user_id == target_id {
            return Err(CommandError::rejected("You can't support yourself."));
        }
        if !users.contains_key(&target_id) {
            return Err(CommandError::rejected("Target has not quacked yet."));
        }
        if users[&user_id].supportee_id.is_some() {
            return Err(CommandError::rejected(
                "You are already supporting someone today.",
            ));
        }
        users.get_mut(&user_id).expect("checked above").supportee_id = Some(target_id);
        users.get_mut(&target_id).expect("checked above").support += 1;
        self.store.save_users(&users)?;
        Ok(format!("You are supporting user {target_id} today."))
    }

    // --- Diplomacy --------------------------------------------------------

    /// Offer an oath of fealty; it binds only once the liege accepts.
    pub fn swear_fealty(&mut self, user_id: UserId, liege_id: UserId) -> Result<String, CommandError> {
        let mut users = self.store.load_users()?;
        if !users.contains_key(&user_id) {
            return Err(CommandError::rejected("You have not quacked yet."));
        }
        if user_id == liege_id {
            return Err(CommandError::rejected("You can't swear fealty to yourself."));
        }
        if !users.contains_key(&liege_id) {
            return Err(CommandError::rejected("Target has not quacked yet."));
        }
        if users[&user_id].liege_id.is_some() {
            return Err(CommandError::rejected("You already have a liege."));
        }
        users
            .get_mut(&liege_id)
            .expect("checked above")
            .vassal_waitlist_ids
            .insert(user_id);
        self.store.save_users(&users)?;
        Ok(format!("Your oath has been offered to user {liege_id}."))
    }

    /// Accept an offered oath. The liege/vassal pointers must stay a
    /// forest, so an oath that would close a cycle is refused here — this
    /// is the only place the pointer is ever set.
    pub fn accept_vassal(
        &mut self,
        user_id: UserId,
        vassal_id: UserId,
    ) -> Result<String, CommandError> {
        let mut users = self.store.load_users()?;
        if !users.contains_key(&user_id) {
            return Err(CommandError::rejected("You have not quacked yet."));
        }
        if !users
            .get(&user_id)
            .is_some_and(|u| u.vassal_waitlist_ids.contains(&vassal_id))
        {
            return Err(CommandError::rejected(
                "That player has not offered you an oath.",
            ));
        }
        if users.get(&vassal_id).is_none_or(|v| v.liege_id.is_some()) {
            users
                .get_mut(&user_id)
                .expect("checked above")
                .vassal_waitlist_ids
                .remove(&vassal_id);
            self.store.save_users(&users)?;
            return Err(CommandError::rejected(
                "That player has already sworn to another liege.",
            ));
        }

        // Walk upward from the accepting liege; finding the vassal there
        // means the oath would close a loop.
        let mut cursor = Some(user_id);
        while let Some(current) = cursor {
            if current == vassal_id {
                return Err(CommandError::rejected(
                    "That oath would make your own liege chain circular.",
                ));
            }
            cursor = users.get(&current).and_then(|u| u.liege_id);
        }

        users
            .get_mut(&user_id)
            .expect("checked above")
            .vassal_waitlist_ids
            .remove(&vassal_id);
        users.get_mut(&vassal_id).expect("checked above").liege_id = Some(user_id);
        self.store.save_users(&users)?;
        Ok(format!("User {vassal_id} is now your vassal."))
    }

    /// Forsake the liege. Word travels fast: a species-dependent share of
    /// the oathbreaker's troops deserts on the spot.
    pub fn break_oath(&mut self, user_id: UserId) -> Result<String, CommandError> {
        let catalogs = self.store.load_catalogs()?;
        let mut world = self.load_world()?;

        let Some(user) = world.user(user_id) else {
            return Err(CommandError::rejected("You have not quacked yet."));
        };
        if user.liege_id.is_none() {
            return Err(CommandError::rejected("You have no liege to forsake."));
        }
        world.user_mut(user_id).expect("checked above").liege_id = None;

        let season = world.config.current_season;
        let mut deserted_total: u32 = 0;
        let land_ids: Vec<LandId> = world.lands.keys().copied().collect();
        for land_id in land_ids {
            for kind in [ArmyKind::Garrison, ArmyKind::SiegeCamp] {
                let units: Vec<(String, u32)> = world
                    .land(land_id)
                    .map(|land| {
                        land.army(kind)
                            .0
                            .iter()
                            .filter(|u| u.owner_id == user_id)
                            .map(|u| (u.troop_name.clone(), u.amount))
                            .collect()
                    })
                    .unwrap_or_default();
                for (troop_name, amount) in units {
                    let percent = catalogs
                        .troop_species(&troop_name)
                        .map_or(0.0, |s| s.percent_deserts_on_oathbreaker(season));
                    let deserting = (f64::from(amount) * percent).round() as u32;
                    if deserting == 0 {
                        continue;
                    }
                    world
                        .land_mut(land_id)
                        .expect("iterating known ids")
                        .army_mut(kind)
                        .remove_up_to(&troop_name, user_id, deserting);
                    deserted_total += deserting;
                }
            }
        }

        self.commit(&world)?;
        Ok(format!(
            "You have forsaken your liege. {deserted_total} of your troops deserted in disgust."
        ))
    }

    /// Count another player as an ally for legality purposes.
    pub fn declare_ally(&mut self, user_id: UserId, ally_id: UserId) -> Result<String, CommandError> {
        let mut users = self.store.load_users()?;
        if !users.contains_key(&user_id) {
            return Err(CommandError::rejected("You have not quacked yet."));
        }
        if user_id == ally_id {
            return Err(CommandError::rejected("You are already your own ally."));
        }
        if !users.contains_key(&ally_id) {
            return Err(CommandError::rejected("Target has not quacked yet."));
        }
        users.get_mut(&user_id).expect("checked above").ally_ids.insert(ally_id);
        self.store.save_users(&users)?;
        Ok(format!("User {ally_id} is now counted among your allies."))
    }

    pub fn revoke_ally(&mut self, user_id: UserId, ally_id: UserId) -> Result<String, CommandError> {
        let mut users = self.store.load_users()?;
        let Some(user) = users.get_mut(&user_id) else {
            return Err(CommandError::rejected("You have not quacked yet."));
        };
        if !user.ally_ids.remove(&ally_id) {
            return Err(CommandError::rejected("That player is not your ally."));
        }
        self.store.save_users(&users)?;
        Ok(format!("User {ally_id} is no longer counted among your allies."))
    }
}
